use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use ws_core::BiomeRegistry;

use super::{SetupStage, StageError};
use crate::preset::GenerationPreset;
use crate::world::PreviewWorld;

/// Baseline rainfall at the equator (mm) before preset scaling.
const EQUATOR_RAINFALL: f32 = 1800.0;
/// Mean temperature at the equator (degrees C) before preset scaling.
const EQUATOR_TEMPERATURE: f32 = 32.0;
/// Temperature drop from equator to pole.
const POLAR_DROP: f32 = 62.0;

/// Seeds the per-tile climate fields: latitude-banded temperature with
/// axial-tilt adjustment, and rainfall with a noise component.
pub struct SeedClimate;

impl SetupStage for SeedClimate {
    fn name(&self) -> &'static str {
        "SeedClimate"
    }

    fn seed_part(&self) -> u64 {
        0x02
    }

    fn run(
        &self,
        world: &mut PreviewWorld,
        preset: &GenerationPreset,
        _registry: &BiomeRegistry,
        rng: &mut ChaCha8Rng,
    ) -> Result<(), StageError> {
        if !world.has_grid() {
            return Err(StageError::MissingGrid(self.name()));
        }

        let rain_noise = Fbm::<Perlin>::new(rng.gen()).set_octaves(4);
        let width = world.width;
        let height = world.height;
        let tilt = preset.axial_tilt;
        let temperature_scale = preset.temperature;
        let rainfall_scale = preset.rainfall;

        // Latitude distances precomputed per row; tiles fill in parallel.
        let equator_distance: Vec<f32> =
            (0..height).map(|y| world.distance_from_equator(y)).collect();

        world
            .tiles
            .par_iter_mut()
            .enumerate()
            .for_each(|(index, tile)| {
                let x = index % width;
                let y = index / width;
                let d = equator_distance[y];

                let base = EQUATOR_TEMPERATURE - POLAR_DROP * d.powf(1.3);
                // High tilt pushes mean temperatures at high latitudes
                // further toward the extremes of the seasonal swing.
                let seasonal = tilt.seasonal_amplitude(d) * 0.25;
                tile.temperature = base * temperature_scale - seasonal;

                let n = rain_noise.get([x as f64 / 24.0, y as f64 / 24.0]) as f32;
                let banded = EQUATOR_RAINFALL * (1.0 - 0.65 * d);
                tile.rainfall = ((banded + n * 600.0) * rainfall_scale).max(0.0);
            });

        Ok(())
    }
}
