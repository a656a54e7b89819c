use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use ws_core::BiomeRegistry;

use super::{LayerStage, StageError};
use crate::preset::GenerationPreset;
use crate::world::PreviewWorld;

/// How far the sea-level slider shifts elevations per unit.
const SEA_LEVEL_SHIFT: f32 = 0.35;

/// Elevation pass: fractal noise shaped by the mountain-density and
/// sea-level sliders. Elevation below zero is ocean.
pub struct Terrain;

impl LayerStage for Terrain {
    fn name(&self) -> &'static str {
        "Terrain"
    }

    fn seed_part(&self) -> u64 {
        0x10
    }

    fn run(
        &self,
        world: &mut PreviewWorld,
        _layer: usize,
        preset: &GenerationPreset,
        _registry: &BiomeRegistry,
        rng: &mut ChaCha8Rng,
    ) -> Result<(), StageError> {
        if !world.has_grid() {
            return Err(StageError::MissingGrid(self.name()));
        }

        let elevation_noise = Fbm::<Perlin>::new(rng.gen()).set_octaves(6);
        let width = world.width;
        // Slider midpoint (1.0) is the stock planet; 0.0 flattens all
        // relief, 2.0 roughly doubles it.
        let relief = 0.25 + 0.75 * preset.mountain_density;
        let sea_offset = (preset.sea_level - 1.0) * SEA_LEVEL_SHIFT;

        world
            .tiles
            .par_iter_mut()
            .enumerate()
            .for_each(|(index, tile)| {
                let x = index % width;
                let y = index / width;
                let base = elevation_noise.get([x as f64 / 40.0, y as f64 / 40.0]) as f32;
                let shaped = if base > 0.0 { base * relief } else { base };
                tile.elevation = shaped - sea_offset;
            });

        Ok(())
    }
}
