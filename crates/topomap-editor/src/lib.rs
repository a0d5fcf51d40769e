pub mod actions;
pub mod cache;
pub mod effects;
pub mod heatmap;
pub mod panels;
pub mod settings;
pub mod state;
pub mod store;
pub mod versioned;
pub mod viewport;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::actions::Action;
use crate::panels::MenuCommand;
use crate::settings::EditorSettings;
use crate::state::State;
use crate::store::Store;
use eframe::egui;

pub struct TopologyEditorApp {
    state: State,
}

/// Build the editor, reading settings from the working directory on
/// native targets.
pub fn create_app(_cc: &eframe::CreationContext<'_>) -> TopologyEditorApp {
    #[cfg(not(target_arch = "wasm32"))]
    let settings =
        EditorSettings::load_or_default(std::path::Path::new(settings::SETTINGS_FILE));
    #[cfg(target_arch = "wasm32")]
    let settings = EditorSettings::default();

    TopologyEditorApp {
        state: State::new(Store::new(settings)),
    }
}

impl TopologyEditorApp {
    #[cfg(not(target_arch = "wasm32"))]
    fn run_command(&mut self, _ctx: &egui::Context, command: MenuCommand) {
        match command {
            MenuCommand::Load => {
                if let Some(path) = native::pick_map_file() {
                    self.state.dispatch(Action::LoadFromFile { path });
                }
            }
            MenuCommand::Save => {
                let file_name = self.state.store.export_file_name();
                if let Some(path) = native::pick_save_path(&file_name) {
                    self.state.dispatch(Action::SaveToFile { path });
                }
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn run_command(&mut self, ctx: &egui::Context, command: MenuCommand) {
        match command {
            MenuCommand::Load => web::open_map_dialog(ctx.clone(), self.state.sender()),
            MenuCommand::Save => self.state.dispatch(Action::DownloadMap),
        }
    }
}

impl eframe::App for TopologyEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = Vec::new();
        let mut commands = Vec::new();
        {
            let store = &self.state.store;
            let cache = &mut self.state.cache;

            panels::menu_bar(ctx, store, &mut actions, &mut commands);
            panels::status_bar(ctx, store);
            panels::side_panel(ctx, store, cache, &mut actions);
            panels::canvas(ctx, store, cache, &mut actions);
            panels::preview_window(ctx, store, cache, &mut actions, &mut commands);
            panels::settings_window(ctx, store, &mut actions);
            panels::error_window(ctx, store, &mut actions);
        }

        for command in commands {
            self.run_command(ctx, command);
        }
        for action in actions {
            self.state.dispatch(action);
        }
        self.state.flush_actions();
        self.state.flush_effects();
    }
}
