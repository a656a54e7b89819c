use bevy::prelude::*;

pub mod preset_io;

pub use preset_io::{preset_filename, PresetIoError, PresetStore, SavedPreset, PRESETS_DIR};

/// Persistence plugin for Worldsmith.
/// Saves and loads generation presets as RON files.
pub struct WsPersistencePlugin;

impl Plugin for WsPersistencePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PresetStore>();
    }
}
