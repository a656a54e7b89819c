use rand_chacha::ChaCha8Rng;
use ws_core::BiomeRegistry;

use super::{SetupStage, StageError};
use crate::preset::GenerationPreset;
use crate::world::{PlanetLayer, PreviewWorld};

/// Allocates the tile grid and the planet layer list. Must run first;
/// every later stage assumes the grid exists.
pub struct BuildGrid;

impl SetupStage for BuildGrid {
    fn name(&self) -> &'static str {
        "BuildGrid"
    }

    fn seed_part(&self) -> u64 {
        0x01
    }

    fn run(
        &self,
        world: &mut PreviewWorld,
        preset: &GenerationPreset,
        _registry: &BiomeRegistry,
        _rng: &mut ChaCha8Rng,
    ) -> Result<(), StageError> {
        if !preset.planet_coverage.is_finite() || preset.planet_coverage <= 0.0 {
            return Err(StageError::Failed(
                self.name(),
                format!("invalid planet coverage {}", preset.planet_coverage),
            ));
        }

        let width = PreviewWorld::grid_width_for_coverage(preset.planet_coverage);
        let height = width / 2;
        world.allocate_grid(width, height);
        world.layers = vec![PlanetLayer {
            name: "Surface".to_string(),
        }];
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn builds_grid_and_surface_layer() {
        let mut world = PreviewWorld::new("w".into(), "s".into(), 1);
        let preset = GenerationPreset::default();
        let registry = BiomeRegistry::with_defaults();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        BuildGrid.run(&mut world, &preset, &registry, &mut rng).unwrap();
        assert!(world.has_grid());
        assert_eq!(world.height, world.width / 2);
        assert_eq!(world.layers.len(), 1);
    }

    #[test]
    fn rejects_invalid_coverage() {
        let mut world = PreviewWorld::new("w".into(), "s".into(), 1);
        let mut preset = GenerationPreset::default();
        preset.planet_coverage = f32::NAN;
        let registry = BiomeRegistry::with_defaults();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert!(BuildGrid.run(&mut world, &preset, &registry, &mut rng).is_err());
        assert!(!world.has_grid());
    }
}
