use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub mod generator_ui;

pub use generator_ui::GeneratorUiState;

/// Editor plugin for Worldsmith.
/// Provides the egui-based world generation settings panel.
pub struct WsEditorPlugin;

impl Plugin for WsEditorPlugin {
    fn build(&self, app: &mut App) {
        // Only add EguiPlugin if not already added
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin);
        }

        app.init_resource::<GeneratorUiState>().add_systems(
            Update,
            (
                generator_ui::generator_ui_system,
                generator_ui::sync_preview_system.after(generator_ui::generator_ui_system),
                generator_ui::status_message_system,
            ),
        );
    }
}
