//! World-generation stages.
//!
//! A run is a fixed sequence: every setup stage once, then every layer
//! stage once per planet layer. Setup stages are mandatory; a failing
//! layer stage is skipped. Each stage draws from its own RNG seeded
//! from the world seed and the stage's seed part, so editing one
//! parameter only reshuffles the stages that read it.

use rand_chacha::ChaCha8Rng;
use ws_core::BiomeRegistry;

use crate::preset::GenerationPreset;
use crate::world::PreviewWorld;

mod biomes;
mod climate;
mod grid;
mod hydrology;
mod roads;
mod sites;
mod terrain;

pub use biomes::Biomes;
pub use climate::SeedClimate;
pub use grid::BuildGrid;
pub use hydrology::{Lakes, Rivers};
pub use roads::{AncientRoads, FactionRoads};
pub use sites::AncientSites;
pub use terrain::Terrain;

/// Error from a single generation stage.
#[derive(Debug)]
pub enum StageError {
    /// The stage needs a grid that does not exist or is malformed.
    MissingGrid(&'static str),
    /// Stage-specific failure; the message names what went wrong.
    Failed(&'static str, String),
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingGrid(stage) => write!(f, "stage {stage}: grid not built"),
            Self::Failed(stage, msg) => write!(f, "stage {stage}: {msg}"),
        }
    }
}

impl std::error::Error for StageError {}

/// A mandatory setup stage. Failure aborts the whole run.
pub trait SetupStage: Send + Sync {
    fn name(&self) -> &'static str;
    /// Seed part mixed into the world seed for this stage's RNG.
    fn seed_part(&self) -> u64;
    fn run(
        &self,
        world: &mut PreviewWorld,
        preset: &GenerationPreset,
        registry: &BiomeRegistry,
        rng: &mut ChaCha8Rng,
    ) -> Result<(), StageError>;
}

/// A per-planet-layer stage. Failure is logged and the stage skipped.
pub trait LayerStage: Send + Sync {
    fn name(&self) -> &'static str;
    fn seed_part(&self) -> u64;
    fn run(
        &self,
        world: &mut PreviewWorld,
        layer: usize,
        preset: &GenerationPreset,
        registry: &BiomeRegistry,
        rng: &mut ChaCha8Rng,
    ) -> Result<(), StageError>;
}

/// Ordered list of the stages a worker run executes.
pub struct StageRegistry {
    setup: Vec<Box<dyn SetupStage>>,
    layer: Vec<Box<dyn LayerStage>>,
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl StageRegistry {
    pub fn empty() -> Self {
        Self {
            setup: Vec::new(),
            layer: Vec::new(),
        }
    }

    /// The stock stage order.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.push_setup(Box::new(BuildGrid));
        registry.push_setup(Box::new(SeedClimate));
        registry.push_layer(Box::new(Terrain));
        registry.push_layer(Box::new(Biomes));
        registry.push_layer(Box::new(Lakes));
        registry.push_layer(Box::new(Rivers));
        registry.push_layer(Box::new(AncientSites));
        registry.push_layer(Box::new(AncientRoads));
        registry.push_layer(Box::new(FactionRoads));
        registry
    }

    pub fn push_setup(&mut self, stage: Box<dyn SetupStage>) {
        self.setup.push(stage);
    }

    pub fn push_layer(&mut self, stage: Box<dyn LayerStage>) {
        self.layer.push(stage);
    }

    pub fn setup_stages(&self) -> &[Box<dyn SetupStage>] {
        &self.setup
    }

    pub fn layer_stages(&self) -> &[Box<dyn LayerStage>] {
        &self.layer
    }

    /// Seed parts for the layer stages, disambiguated so that two
    /// stages sharing a seed part still get distinct RNG streams: the
    /// n-th stage with a given part gets `part + n`.
    pub fn layer_seed_parts(&self) -> Vec<u64> {
        let mut parts = Vec::with_capacity(self.layer.len());
        for (index, stage) in self.layer.iter().enumerate() {
            let part = stage.seed_part();
            let dupes = self.layer[..index]
                .iter()
                .filter(|s| s.seed_part() == part)
                .count() as u64;
            parts.push(part + dupes);
        }
        parts
    }
}
