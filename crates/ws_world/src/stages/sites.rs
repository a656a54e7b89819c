use rand::Rng;
use rand_chacha::ChaCha8Rng;
use ws_core::BiomeRegistry;

use super::{LayerStage, StageError};
use crate::preset::GenerationPreset;
use crate::world::{PreviewWorld, TileFlags};

/// One ancient site per this many land tiles at density 1.0.
const LAND_TILES_PER_SITE: usize = 350;

/// Scatters ancient sites over land; the road stages connect them.
pub struct AncientSites;

impl LayerStage for AncientSites {
    fn name(&self) -> &'static str {
        "AncientSites"
    }

    fn seed_part(&self) -> u64 {
        0x14
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

        let land: Vec<usize> = world
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.elevation >= 0.0)
            .map(|(i, _)| i)
            .collect();
        if land.is_empty() {
            return Ok(());
        }

        // Site density follows the ancient-road slider: a world with no
        // ancient roads also has few ruins to connect.
        let density = (preset.ancient_road_density + preset.population) / 2.0;
        let count = ((land.len() / LAND_TILES_PER_SITE) as f32 * density).ceil() as usize;
        for _ in 0..count {
            let index = land[rng.gen_range(0..land.len())];
            world.tiles[index].flags |= TileFlags::ANCIENT_SITE;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{BuildGrid, SetupStage, Terrain};
    use rand::SeedableRng;

    fn site_world(preset: &GenerationPreset) -> PreviewWorld {
        let mut world = PreviewWorld::new("w".into(), "s".into(), 1);
        let registry = BiomeRegistry::with_defaults();
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        BuildGrid.run(&mut world, preset, &registry, &mut rng).unwrap();
        Terrain.run(&mut world, 0, preset, &registry, &mut rng).unwrap();
        AncientSites.run(&mut world, 0, preset, &registry, &mut rng).unwrap();
        world
    }

    #[test]
    fn sites_only_appear_on_land() {
        let world = site_world(&GenerationPreset::default());
        let mut sites = 0;
        for tile in &world.tiles {
            if tile.flags.contains(TileFlags::ANCIENT_SITE) {
                assert!(tile.elevation >= 0.0);
                sites += 1;
            }
        }
        assert!(sites > 0);
    }
}
