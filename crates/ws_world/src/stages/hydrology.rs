use rand::Rng;
use rand_chacha::ChaCha8Rng;
use ws_core::BiomeRegistry;

use super::{LayerStage, StageError};
use crate::preset::GenerationPreset;
use crate::world::{PreviewWorld, TileFlags};

/// One river source per this many tiles at density 1.0.
const TILES_PER_RIVER: usize = 500;
/// One lake per this many tiles at density 1.0.
const TILES_PER_LAKE: usize = 900;
/// Longest downhill walk before a river gives up.
const MAX_RIVER_LENGTH: usize = 400;

fn land_tiles(world: &PreviewWorld) -> Vec<usize> {
    world
        .tiles
        .iter()
        .enumerate()
        .filter(|(_, t)| t.elevation >= 0.0)
        .map(|(i, _)| i)
        .collect()
}

/// Scatters lakes into low-lying land tiles.
pub struct Lakes;

impl LayerStage for Lakes {
    fn name(&self) -> &'static str {
        "Lakes"
    }

    fn seed_part(&self) -> u64 {
        0x12
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

        let candidates: Vec<usize> = land_tiles(world)
            .into_iter()
            .filter(|&i| world.tiles[i].elevation < 0.25)
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let count =
            ((world.tiles.len() / TILES_PER_LAKE) as f32 * preset.river_density) as usize;
        for _ in 0..count {
            let index = candidates[rng.gen_range(0..candidates.len())];
            world.tiles[index].flags |= TileFlags::LAKE;
        }
        Ok(())
    }
}

/// Carves rivers: pick high-elevation sources, walk downhill to the
/// sea (or a dead end) marking every tile on the way.
pub struct Rivers;

impl Rivers {
    fn lowest_neighbor(world: &PreviewWorld, x: usize, y: usize) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), f32)> = None;
        for (dx, dy) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= world.width as i32 || ny >= world.height as i32 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let elevation = world.tile(nx, ny).elevation;
            if best.map_or(true, |(_, e)| elevation < e) {
                best = Some(((nx, ny), elevation));
            }
        }
        best.map(|(coord, _)| coord)
    }
}

impl LayerStage for Rivers {
    fn name(&self) -> &'static str {
        "Rivers"
    }

    fn seed_part(&self) -> u64 {
        0x13
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

        let sources: Vec<usize> = land_tiles(world)
            .into_iter()
            .filter(|&i| world.tiles[i].elevation > 0.3)
            .collect();
        if sources.is_empty() {
            return Ok(());
        }

        let count =
            ((world.tiles.len() / TILES_PER_RIVER) as f32 * preset.river_density) as usize;
        for _ in 0..count {
            let source = sources[rng.gen_range(0..sources.len())];
            let mut x = source % world.width;
            let mut y = source / world.width;

            for _ in 0..MAX_RIVER_LENGTH {
                let tile = world.tile_mut(x, y);
                if tile.elevation < 0.0 {
                    break; // reached the sea
                }
                let previous = tile.flags;
                tile.flags |= TileFlags::RIVER;
                if previous.contains(TileFlags::RIVER) {
                    break; // joined an existing river
                }
                let Some((nx, ny)) = Self::lowest_neighbor(world, x, y) else {
                    break;
                };
                x = nx;
                y = ny;
            }
        }
        Ok(())
    }
}
