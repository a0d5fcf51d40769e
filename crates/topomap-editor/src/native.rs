#![cfg(not(target_arch = "wasm32"))]

use crate::create_app;
use std::path::PathBuf;
use topomap::FileFormat;

/// Entry point used by the native executable.
pub fn run() -> eframe::Result<()> {
    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Topology Map Editor",
        native_options,
        Box::new(|cc| Ok(Box::new(create_app(cc)))),
    )
}

fn map_dialog() -> rfd::FileDialog {
    let extensions: Vec<&str> = [FileFormat::Yaml, FileFormat::Json]
        .iter()
        .flat_map(|f| f.extensions().iter().copied())
        .collect();
    rfd::FileDialog::new().add_filter("Topology map", &extensions)
}

pub fn pick_map_file() -> Option<PathBuf> {
    map_dialog().pick_file()
}

pub fn pick_save_path(file_name: &str) -> Option<PathBuf> {
    map_dialog().set_file_name(file_name).save_file()
}
