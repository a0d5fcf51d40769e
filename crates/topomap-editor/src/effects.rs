use crate::store::Store;
use std::path::PathBuf;

/// Deferred effects that must run outside the main reducer (e.g., file IO)
#[derive(Debug, Clone)]
pub enum Effect {
    /// Save the current map to disk
    SaveToFile { path: PathBuf },
    /// Load a map from disk
    LoadFromFile { path: PathBuf },
    /// Hand the rendered map to the browser as a download
    #[cfg(target_arch = "wasm32")]
    DownloadMap { file_name: String },
}

/// Execute a single effect against the store
pub fn run(store: &mut Store, effect: Effect) {
    match effect {
        Effect::SaveToFile { path } => {
            if let Err(e) = store.save_to_file(&path) {
                log::error!("{e}");
                store.error_message = Some(format!("Failed to save: {e}"));
            }
        }
        Effect::LoadFromFile { path } => {
            if let Err(e) = store.load_from_file(&path) {
                log::error!("{e}");
                store.error_message = Some(format!("Failed to load: {e}"));
            }
        }
        #[cfg(target_arch = "wasm32")]
        Effect::DownloadMap { file_name } => {
            let format = topomap::FileFormat::from_path(std::path::Path::new(&file_name));
            let result = topomap::format::render(store.graph.get(), format)
                .map_err(|e| e.to_string())
                .and_then(|text| {
                    crate::web::download_map(&file_name, &text)
                        .map_err(|e| format!("{e:?}"))
                });
            match result {
                Ok(()) => store.status_message = Some(format!("Downloaded {file_name}")),
                Err(e) => {
                    log::error!("download failed: {e}");
                    store.error_message = Some(format!("Failed to save: {e}"));
                }
            }
        }
    }
}
