use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use ws_core::BiomeRegistry;

use super::{LayerStage, StageError};
use crate::preset::GenerationPreset;
use crate::world::{PreviewWorld, TileFlags};

fn site_coords(world: &PreviewWorld) -> Vec<(usize, usize)> {
    world
        .tiles
        .iter()
        .enumerate()
        .filter(|(_, t)| t.flags.contains(TileFlags::ANCIENT_SITE))
        .map(|(i, _)| (i % world.width, i / world.width))
        .collect()
}

/// Marks a straight line of tiles between two points, skipping water.
fn trace_segment(world: &mut PreviewWorld, from: (usize, usize), to: (usize, usize), flag: TileFlags) {
    let (mut x, mut y) = (from.0 as i32, from.1 as i32);
    let (tx, ty) = (to.0 as i32, to.1 as i32);
    loop {
        let tile = world.tile_mut(x as usize, y as usize);
        if tile.elevation >= 0.0 {
            tile.flags |= flag;
        }
        if (x, y) == (tx, ty) {
            break;
        }
        x += (tx - x).signum();
        y += (ty - y).signum();
    }
}

fn connect_sites(
    world: &mut PreviewWorld,
    density: f32,
    flag: TileFlags,
    rng: &mut ChaCha8Rng,
) -> Result<(), StageError> {
    if density <= 0.0 {
        return Ok(());
    }
    let mut sites = site_coords(world);
    if sites.len() < 2 {
        return Ok(());
    }
    sites.shuffle(rng);

    // Sites chain in shuffled order; at density 2.0 the whole chain is
    // linked, lower densities drop links from the end.
    let links = ((sites.len() - 1) as f32 * density.min(2.0) / 2.0).ceil() as usize;
    for pair in sites.windows(2).take(links) {
        trace_segment(world, pair[0], pair[1], flag);
    }
    Ok(())
}

/// Connects ancient sites with pre-collapse road lines.
pub struct AncientRoads;

impl LayerStage for AncientRoads {
    fn name(&self) -> &'static str {
        "AncientRoads"
    }

    fn seed_part(&self) -> u64 {
        0x15
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
        connect_sites(world, preset.ancient_road_density, TileFlags::ANCIENT_ROAD, rng)
    }
}

/// Connects sites with present-day faction roads.
pub struct FactionRoads;

impl LayerStage for FactionRoads {
    fn name(&self) -> &'static str {
        "Roads"
    }

    fn seed_part(&self) -> u64 {
        0x16
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
        connect_sites(world, preset.faction_road_density, TileFlags::ROAD, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{AncientSites, BuildGrid, SetupStage, Terrain};
    use rand::SeedableRng;

    fn road_world(preset: &GenerationPreset) -> PreviewWorld {
        let mut world = PreviewWorld::new("w".into(), "s".into(), 1);
        let registry = BiomeRegistry::with_defaults();
        let mut rng = ChaCha8Rng::seed_from_u64(41);
        BuildGrid.run(&mut world, preset, &registry, &mut rng).unwrap();
        Terrain.run(&mut world, 0, preset, &registry, &mut rng).unwrap();
        AncientSites.run(&mut world, 0, preset, &registry, &mut rng).unwrap();
        AncientRoads.run(&mut world, 0, preset, &registry, &mut rng).unwrap();
        FactionRoads.run(&mut world, 0, preset, &registry, &mut rng).unwrap();
        world
    }

    fn count_flag(world: &PreviewWorld, flag: TileFlags) -> usize {
        world.tiles.iter().filter(|t| t.flags.contains(flag)).count()
    }

    #[test]
    fn default_densities_build_roads() {
        let world = road_world(&GenerationPreset::default());
        assert!(count_flag(&world, TileFlags::ANCIENT_ROAD) > 0);
        assert!(count_flag(&world, TileFlags::ROAD) > 0);
    }

    #[test]
    fn zero_density_builds_nothing() {
        let mut preset = GenerationPreset::default();
        preset.ancient_road_density = 0.0;
        preset.faction_road_density = 0.0;
        let world = road_world(&preset);
        assert_eq!(count_flag(&world, TileFlags::ANCIENT_ROAD), 0);
        assert_eq!(count_flag(&world, TileFlags::ROAD), 0);
    }

    #[test]
    fn roads_avoid_water() {
        let world = road_world(&GenerationPreset::default());
        for tile in &world.tiles {
            if tile.flags.intersects(TileFlags::ANCIENT_ROAD | TileFlags::ROAD) {
                assert!(tile.elevation >= 0.0);
            }
        }
    }
}
