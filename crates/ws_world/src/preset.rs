use std::collections::BTreeMap;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use ws_core::{AxialTilt, BiomeRegistry};

/// Default per-biome commonality multiplier (slider midpoint; the
/// effective multiplier is `value / 10`).
pub const DEFAULT_COMMONALITY: i32 = 10;
/// Default per-biome selection score offset.
pub const DEFAULT_SCORE_OFFSET: i32 = 0;

/// Slider bounds.
pub const COMMONALITY_RANGE: (i32, i32) = (0, 20);
pub const SCORE_OFFSET_RANGE: (i32, i32) = (-99, 99);
pub const DENSITY_RANGE: (f32, f32) = (0.0, 2.0);

/// A complete bundle of world-generation parameters.
///
/// This is a plain value object: the UI mutates one instance in place,
/// the scheduler clones snapshots of it for change detection and hands
/// an owned copy to each worker run, and the preset store serializes
/// it to RON. Equality is field-for-field and drives "did anything
/// change since the last preview" checks.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationPreset {
    /// Seed text; hashed with `stable_string_hash` to get the world seed.
    pub seed_string: String,
    /// Fraction of the planet covered by the generated grid.
    pub planet_coverage: f32,
    /// Overall rainfall multiplier.
    pub rainfall: f32,
    /// Overall temperature offset multiplier.
    pub temperature: f32,
    /// Overall settlement population multiplier.
    pub population: f32,
    /// Overall pollution level.
    pub pollution: f32,
    /// Density sliders, all 0.0..=2.0 with 1.0 meaning "stock".
    pub river_density: f32,
    pub mountain_density: f32,
    pub sea_level: f32,
    pub ancient_road_density: f32,
    pub faction_road_density: f32,
    /// Planet axial tilt.
    pub axial_tilt: AxialTilt,
    /// Per-biome commonality multiplier, 0..=20, default 10.
    pub biome_commonalities: BTreeMap<String, i32>,
    /// Per-biome selection score offset, -99..=99, default 0.
    pub biome_score_offsets: BTreeMap<String, i32>,
    /// Enabled faction def names.
    pub factions: Vec<String>,
}

impl Default for GenerationPreset {
    fn default() -> Self {
        Self {
            seed_string: "worldsmith".to_string(),
            planet_coverage: 0.3,
            rainfall: 1.0,
            temperature: 1.0,
            population: 1.0,
            pollution: 0.05,
            river_density: 1.0,
            mountain_density: 1.0,
            sea_level: 1.0,
            ancient_road_density: 1.0,
            faction_road_density: 1.0,
            axial_tilt: AxialTilt::default(),
            biome_commonalities: BTreeMap::new(),
            biome_score_offsets: BTreeMap::new(),
            factions: Vec::new(),
        }
    }
}

impl GenerationPreset {
    /// Default preset with biome maps populated for every registered biome.
    pub fn new(registry: &BiomeRegistry) -> Self {
        let mut preset = Self::default();
        preset.ensure_biome_entries(registry);
        preset
    }

    /// Backfill missing biome entries with defaults.
    ///
    /// Invariant: after this call both maps contain an entry for every
    /// biome in `registry`, including biomes registered after this
    /// preset was created. Existing entries are left untouched.
    pub fn ensure_biome_entries(&mut self, registry: &BiomeRegistry) {
        for id in registry.ids() {
            self.biome_commonalities
                .entry(id.to_string())
                .or_insert(DEFAULT_COMMONALITY);
            self.biome_score_offsets
                .entry(id.to_string())
                .or_insert(DEFAULT_SCORE_OFFSET);
        }
    }

    /// Restore every field to its default, keeping the biome maps
    /// populated for the given registry.
    pub fn reset(&mut self, registry: &BiomeRegistry) {
        *self = Self::new(registry);
    }

    pub fn reset_biome_commonalities(&mut self) {
        for value in self.biome_commonalities.values_mut() {
            *value = DEFAULT_COMMONALITY;
        }
    }

    pub fn reset_biome_score_offsets(&mut self) {
        for value in self.biome_score_offsets.values_mut() {
            *value = DEFAULT_SCORE_OFFSET;
        }
    }

    /// True when any biome slider differs from its default; controls
    /// whether the "reset biomes" button is shown.
    pub fn has_biome_tweaks(&self) -> bool {
        self.biome_commonalities
            .values()
            .any(|v| *v != DEFAULT_COMMONALITY)
            || self
                .biome_score_offsets
                .values()
                .any(|v| *v != DEFAULT_SCORE_OFFSET)
    }

    /// Effective commonality multiplier for a biome (1.0 = stock).
    pub fn commonality_multiplier(&self, biome_id: &str) -> f32 {
        let value = self
            .biome_commonalities
            .get(biome_id)
            .copied()
            .unwrap_or(DEFAULT_COMMONALITY);
        value as f32 / DEFAULT_COMMONALITY as f32
    }

    /// Score offset for a biome.
    pub fn score_offset(&self, biome_id: &str) -> f32 {
        self.biome_score_offsets
            .get(biome_id)
            .copied()
            .unwrap_or(DEFAULT_SCORE_OFFSET) as f32
    }

    /// Randomize the slider values (the Randomize button). Biome maps
    /// and factions are left alone; only the scalar dials move.
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        self.seed_string = format!("{:08x}", rng.gen::<u32>());
        self.river_density = rng.gen_range(DENSITY_RANGE.0..=DENSITY_RANGE.1);
        self.mountain_density = rng.gen_range(DENSITY_RANGE.0..=DENSITY_RANGE.1);
        self.sea_level = rng.gen_range(DENSITY_RANGE.0..=DENSITY_RANGE.1);
        self.ancient_road_density = rng.gen_range(DENSITY_RANGE.0..=DENSITY_RANGE.1);
        self.faction_road_density = rng.gen_range(DENSITY_RANGE.0..=DENSITY_RANGE.1);
        self.axial_tilt = AxialTilt::from_index(rng.gen_range(0..AxialTilt::all().len()));
    }
}
