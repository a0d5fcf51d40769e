use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file read from the working directory on native builds.
pub const SETTINGS_FILE: &str = "topomap_editor.json";

/// Common slider metadata so bounds live in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

// Scene sizes, in meters
pub const VERTEX_RADIUS_RANGE: SliderRange = SliderRange::new(0.1, 2.0, 0.05);
pub const EDGE_WIDTH_RANGE: SliderRange = SliderRange::new(0.02, 1.0, 0.01);
pub const EDGE_OFFSET_RANGE: SliderRange = SliderRange::new(0.0, 1.0, 0.05);
pub const ARROW_SIZE_RANGE: SliderRange = SliderRange::new(0.1, 1.5, 0.05);
pub const GRID_SPACING_RANGE: SliderRange = SliderRange::new(0.5, 10.0, 0.5);
pub const GRID_EXTENT_RANGE: SliderRange =
    SliderRange::new(10.0, 500.0, 10.0);

// Screen
pub const ZOOM_RANGE: SliderRange = SliderRange::new(2.0, 200.0, 1.0);
pub const LABEL_FONT_RANGE: SliderRange = SliderRange::new(8.0, 32.0, 1.0);

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub vertex_radius: f32,
    pub edge_width: f32,
    /// Sideways shift of an edge so both directions stay visible.
    pub edge_offset: f32,
    pub arrow_size: f32,
    pub grid_spacing: f32,
    pub grid_extent: f32,
    /// Pixels per meter when the viewport is reset.
    pub default_zoom: f32,
    pub label_font_size: f32,
    pub show_labels: bool,
    pub export_file_name: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            vertex_radius: 0.6,
            edge_width: 0.2,
            edge_offset: 0.3,
            arrow_size: 0.5,
            grid_spacing: 1.0,
            grid_extent: 200.0,
            default_zoom: 20.0,
            label_font_size: 13.0,
            show_labels: true,
            export_file_name: String::from("topology_map.yaml"),
        }
    }
}

impl EditorSettings {
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: EditorSettings = serde_json::from_str(text)?;
        Ok(settings.clamped())
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Read `path` if it exists, falling back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => {
                log::info!("using settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!(
                    "{}: {}. Using default settings.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Pull every numeric field back into its slider range.
    pub fn clamped(mut self) -> Self {
        self.vertex_radius = VERTEX_RADIUS_RANGE.clamp(self.vertex_radius);
        self.edge_width = EDGE_WIDTH_RANGE.clamp(self.edge_width);
        self.edge_offset = EDGE_OFFSET_RANGE.clamp(self.edge_offset);
        self.arrow_size = ARROW_SIZE_RANGE.clamp(self.arrow_size);
        self.grid_spacing = GRID_SPACING_RANGE.clamp(self.grid_spacing);
        self.grid_extent = GRID_EXTENT_RANGE.clamp(self.grid_extent);
        self.default_zoom = ZOOM_RANGE.clamp(self.default_zoom);
        self.label_font_size = LABEL_FONT_RANGE.clamp(self.label_font_size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_within_ranges() {
        let defaults = EditorSettings::default();
        assert_eq!(defaults.clone().clamped(), defaults);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            EditorSettings::from_json(r#"{ "vertex_radius": 1.2 }"#).unwrap();
        assert!((settings.vertex_radius - 1.2).abs() < 1e-6);
        assert_eq!(settings.grid_extent, 200.0);
        assert_eq!(settings.export_file_name, "topology_map.yaml");
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let settings = EditorSettings::from_json(
            r#"{ "default_zoom": 5000.0, "grid_spacing": 0.0 }"#,
        )
        .unwrap();
        assert_eq!(settings.default_zoom, ZOOM_RANGE.max);
        assert_eq!(settings.grid_spacing, GRID_SPACING_RANGE.min);
    }

    #[test]
    fn test_bad_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("topomap_editor_bad.json");
        std::fs::write(&path, "{ not json").expect("Failed to write file");
        assert_eq!(
            EditorSettings::load_or_default(&path),
            EditorSettings::default()
        );
        assert!(matches!(
            EditorSettings::load(&path),
            Err(SettingsError::Parse(_))
        ));
        std::fs::remove_file(&path).ok();
    }
}
