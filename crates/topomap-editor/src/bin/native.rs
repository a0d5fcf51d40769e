#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    topomap_editor::native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser build starts through the library's `start()` instead.
}
