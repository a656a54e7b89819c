use bevy::prelude::*;

/// A registered biome: identity, display data, and climate scoring.
///
/// The registry is open: mods or later startup code may register
/// additional biomes after presets referencing the registry already
/// exist, so preset biome maps are backfilled lazily.
#[derive(Debug, Clone)]
pub struct BiomeDef {
    /// Stable string id used as the key in preset maps.
    pub id: String,
    /// Display name for UI.
    pub label: String,
    /// RGB color used by the preview renderer.
    pub color: [u8; 3],
    /// Preferred temperature band (degrees C).
    pub min_temperature: f32,
    pub max_temperature: f32,
    /// Minimum annual rainfall (mm) for a nonzero score.
    pub min_rainfall: f32,
    /// Whether this biome covers water tiles rather than land.
    pub is_water: bool,
}

impl BiomeDef {
    /// Base suitability score for a tile's climate, before preset
    /// commonality multipliers and score offsets are applied.
    /// Negative means the biome cannot occur there.
    pub fn score(&self, temperature: f32, rainfall: f32) -> f32 {
        if rainfall < self.min_rainfall {
            return -100.0;
        }
        let mid = (self.min_temperature + self.max_temperature) / 2.0;
        let half_band = (self.max_temperature - self.min_temperature) / 2.0;
        if half_band <= 0.0 {
            return -100.0;
        }
        // Peaks at the band midpoint, reaches zero at the band edges.
        10.0 * (1.0 - ((temperature - mid) / half_band).abs())
    }
}

/// Ordered collection of all known biomes.
#[derive(Resource, Debug, Clone)]
pub struct BiomeRegistry {
    defs: Vec<BiomeDef>,
}

impl Default for BiomeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BiomeRegistry {
    /// Empty registry, used by tests that register their own biomes.
    pub fn empty() -> Self {
        Self { defs: Vec::new() }
    }

    /// Registry pre-populated with the stock biome set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for def in default_biomes() {
            registry.register(def);
        }
        registry
    }

    /// Register a biome. Re-registering an existing id replaces it.
    pub fn register(&mut self, def: BiomeDef) {
        if let Some(existing) = self.defs.iter_mut().find(|d| d.id == def.id) {
            *existing = def;
        } else {
            self.defs.push(def);
        }
    }

    pub fn get(&self, id: &str) -> Option<&BiomeDef> {
        self.defs.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BiomeDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Biome ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().map(|d| d.id.as_str())
    }
}

fn biome(
    id: &str,
    label: &str,
    color: [u8; 3],
    temp: (f32, f32),
    min_rainfall: f32,
    is_water: bool,
) -> BiomeDef {
    BiomeDef {
        id: id.to_string(),
        label: label.to_string(),
        color,
        min_temperature: temp.0,
        max_temperature: temp.1,
        min_rainfall,
        is_water,
    }
}

/// The stock biome set with preview colors.
fn default_biomes() -> Vec<BiomeDef> {
    vec![
        biome("sea", "Sea", [0, 191, 255], (-15.0, 60.0), 0.0, true),
        biome("ice_sheet", "Ice Sheet", [255, 255, 255], (-60.0, -15.0), 0.0, true),
        biome("tundra", "Tundra", [211, 211, 211], (-40.0, 3.0), 0.0, false),
        biome("boreal_forest", "Boreal Forest", [60, 100, 60], (-20.0, 10.0), 600.0, false),
        biome("temperate_forest", "Temperate Forest", [0, 100, 0], (0.0, 25.0), 800.0, false),
        biome("grassland", "Grassland", [50, 205, 50], (0.0, 30.0), 300.0, false),
        biome("arid_shrubland", "Arid Shrubland", [189, 183, 107], (10.0, 40.0), 150.0, false),
        biome("desert", "Desert", [255, 215, 0], (15.0, 50.0), 0.0, false),
        biome("extreme_desert", "Extreme Desert", [255, 165, 0], (30.0, 60.0), 0.0, false),
        biome("tropical_rainforest", "Tropical Rainforest", [0, 70, 0], (20.0, 40.0), 1600.0, false),
    ]
}
