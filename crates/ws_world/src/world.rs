use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Grid size bounds; the preview trades fidelity for latency.
pub const MIN_GRID_WIDTH: usize = 48;
pub const MAX_GRID_WIDTH: usize = 256;

bitflags! {
    /// Per-tile surface features painted by the later stages.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct TileFlags: u8 {
        const LAKE = 1 << 0;
        const RIVER = 1 << 1;
        const ANCIENT_SITE = 1 << 2;
        const ANCIENT_ROAD = 1 << 3;
        const ROAD = 1 << 4;
    }
}

/// One grid cell of a preview world.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Tile {
    /// Elevation in abstract units; negative is below sea level.
    pub elevation: f32,
    /// Mean annual temperature (degrees C).
    pub temperature: f32,
    /// Annual rainfall (mm).
    pub rainfall: f32,
    /// Index into the world's biome palette, if assigned yet.
    pub biome: Option<u16>,
    /// Surface features.
    pub flags: TileFlags,
}

/// A biome palette entry captured at generation time, so a finished
/// world renders consistently even if the registry changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub id: String,
    pub color: [u8; 3],
}

/// One planet layer; stages that qualify for the preview run once per
/// layer, in layer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetLayer {
    pub name: String,
}

/// A fully generated throwaway world, as handed from the worker to the
/// render thread. Built incrementally by the stages but only ever
/// published whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewWorld {
    pub name: String,
    pub seed_string: String,
    /// Resolved numeric seed (stable hash of `seed_string`).
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<Tile>,
    pub layers: Vec<PlanetLayer>,
    pub biome_palette: Vec<PaletteEntry>,
}

impl PreviewWorld {
    /// Empty shell; the grid stage gives it real dimensions and tiles.
    pub fn new(name: String, seed_string: String, seed: u64) -> Self {
        Self {
            name,
            seed_string,
            seed,
            width: 0,
            height: 0,
            tiles: Vec::new(),
            layers: Vec::new(),
            biome_palette: Vec::new(),
        }
    }

    /// Grid width for a planet coverage fraction.
    pub fn grid_width_for_coverage(coverage: f32) -> usize {
        let width = (MAX_GRID_WIDTH as f32 * coverage.clamp(0.05, 1.0).sqrt()) as usize;
        width.clamp(MIN_GRID_WIDTH, MAX_GRID_WIDTH)
    }

    /// Allocate the tile grid. Called once, by the grid stage.
    pub fn allocate_grid(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.tiles = vec![Tile::default(); width * height];
    }

    pub fn has_grid(&self) -> bool {
        !self.tiles.is_empty()
    }

    pub fn tile(&self, x: usize, y: usize) -> &Tile {
        &self.tiles[y * self.width + x]
    }

    pub fn tile_mut(&mut self, x: usize, y: usize) -> &mut Tile {
        &mut self.tiles[y * self.width + x]
    }

    /// Normalized distance of a row from the equator (0 = equator,
    /// 1 = pole).
    pub fn distance_from_equator(&self, y: usize) -> f32 {
        if self.height <= 1 {
            return 0.0;
        }
        let half = (self.height - 1) as f32 / 2.0;
        ((y as f32 - half) / half).abs()
    }

    /// Palette index for a biome id, interning it on first use.
    pub fn intern_biome(&mut self, id: &str, color: [u8; 3]) -> u16 {
        if let Some(index) = self.biome_palette.iter().position(|e| e.id == id) {
            return index as u16;
        }
        self.biome_palette.push(PaletteEntry {
            id: id.to_string(),
            color,
        });
        (self.biome_palette.len() - 1) as u16
    }
}
