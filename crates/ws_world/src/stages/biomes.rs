use rand_chacha::ChaCha8Rng;
use ws_core::{BiomeDef, BiomeRegistry};

use super::{LayerStage, StageError};
use crate::preset::GenerationPreset;
use crate::world::PreviewWorld;

/// Assigns a biome to every tile by scoring each registered biome
/// against the tile climate, scaled by the preset's per-biome
/// commonality multiplier and score offset. Highest score wins.
pub struct Biomes;

fn adjusted_score(def: &BiomeDef, preset: &GenerationPreset, temperature: f32, rainfall: f32) -> f32 {
    let multiplier = preset.commonality_multiplier(&def.id);
    if multiplier == 0.0 {
        // Slider at zero disables the biome outright.
        return f32::MIN;
    }
    def.score(temperature, rainfall) * multiplier + preset.score_offset(&def.id)
}

impl LayerStage for Biomes {
    fn name(&self) -> &'static str {
        "Biomes"
    }

    fn seed_part(&self) -> u64 {
        0x11
    }

    fn run(
        &self,
        world: &mut PreviewWorld,
        _layer: usize,
        preset: &GenerationPreset,
        registry: &BiomeRegistry,
        _rng: &mut ChaCha8Rng,
    ) -> Result<(), StageError> {
        if !world.has_grid() {
            return Err(StageError::MissingGrid(self.name()));
        }
        if registry.is_empty() {
            return Err(StageError::Failed(self.name(), "no biomes registered".into()));
        }

        for index in 0..world.tiles.len() {
            let tile = world.tiles[index];
            let wants_water = tile.elevation < 0.0;

            let mut best: Option<(&BiomeDef, f32)> = None;
            let mut fallback: Option<&BiomeDef> = None;
            for def in registry.iter().filter(|d| d.is_water == wants_water) {
                fallback.get_or_insert(def);
                let score = adjusted_score(def, preset, tile.temperature, tile.rainfall);
                if score > 0.0 && best.map_or(true, |(_, s)| score > s) {
                    best = Some((def, score));
                }
            }

            // A tile where nothing scores positive still needs a biome.
            let chosen = best.map(|(def, _)| def).or(fallback);
            if let Some(def) = chosen {
                let color = def.color;
                let id = def.id.clone();
                world.tiles[index].biome = Some(world.intern_biome(&id, color));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{BuildGrid, SeedClimate, SetupStage, Terrain};
    use rand::SeedableRng;

    fn biome_world(preset: &GenerationPreset) -> PreviewWorld {
        let mut world = PreviewWorld::new("w".into(), "s".into(), 1);
        let registry = BiomeRegistry::with_defaults();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        BuildGrid.run(&mut world, preset, &registry, &mut rng).unwrap();
        SeedClimate.run(&mut world, preset, &registry, &mut rng).unwrap();
        Terrain.run(&mut world, 0, preset, &registry, &mut rng).unwrap();
        Biomes.run(&mut world, 0, preset, &registry, &mut rng).unwrap();
        world
    }

    fn count_biome(world: &PreviewWorld, id: &str) -> usize {
        let Some(index) = world.biome_palette.iter().position(|e| e.id == id) else {
            return 0;
        };
        world
            .tiles
            .iter()
            .filter(|t| t.biome == Some(index as u16))
            .count()
    }

    #[test]
    fn every_tile_gets_a_biome() {
        let registry = BiomeRegistry::with_defaults();
        let world = biome_world(&GenerationPreset::new(&registry));
        assert!(world.tiles.iter().all(|t| t.biome.is_some()));
    }

    #[test]
    fn zero_commonality_disables_a_biome() {
        let registry = BiomeRegistry::with_defaults();
        let mut preset = GenerationPreset::new(&registry);
        let baseline = count_biome(&biome_world(&preset), "grassland");
        assert!(baseline > 0, "grassland should occur at defaults");

        preset.biome_commonalities.insert("grassland".into(), 0);
        assert_eq!(count_biome(&biome_world(&preset), "grassland"), 0);
    }

    #[test]
    fn large_offset_spreads_a_biome() {
        let registry = BiomeRegistry::with_defaults();
        let mut preset = GenerationPreset::new(&registry);
        let baseline = count_biome(&biome_world(&preset), "desert");

        preset.biome_score_offsets.insert("desert".into(), 99);
        let boosted = count_biome(&biome_world(&preset), "desert");
        assert!(boosted > baseline);
    }
}
