use bevy::prelude::*;

pub mod preset;
pub mod stages;
pub mod world;

pub use preset::{
    GenerationPreset, COMMONALITY_RANGE, DEFAULT_COMMONALITY, DEFAULT_SCORE_OFFSET, DENSITY_RANGE,
    SCORE_OFFSET_RANGE,
};
pub use stages::{LayerStage, SetupStage, StageError, StageRegistry};
pub use ws_core::AxialTilt;
pub use world::{PaletteEntry, PlanetLayer, PreviewWorld, Tile, TileFlags};

/// World plugin for Worldsmith.
/// Owns the preset being edited on the configuration screen.
pub struct WsWorldPlugin;

impl Plugin for WsWorldPlugin {
    fn build(&self, app: &mut App) {
        let registry = app
            .world()
            .get_resource::<ws_core::BiomeRegistry>()
            .cloned()
            .unwrap_or_default();
        app.insert_resource(GenerationPreset::new(&registry));
    }
}
