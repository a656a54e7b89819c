use bevy::prelude::*;

pub mod biome;
pub mod hash;
pub mod mode;
pub mod tilt;

pub use biome::{BiomeDef, BiomeRegistry};
pub use hash::{combine_seed, stable_string_hash};
pub use mode::{program_mode, ModeGuard, ProgramMode};
pub use tilt::AxialTilt;

/// Core plugin providing foundational types for Worldsmith.
pub struct WsCorePlugin;

impl Plugin for WsCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BiomeRegistry>();
    }
}
