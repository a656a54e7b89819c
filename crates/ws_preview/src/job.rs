use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bevy::log::{error, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ws_core::{combine_seed, stable_string_hash, BiomeRegistry, ModeGuard, ProgramMode};
use ws_world::{GenerationPreset, PreviewWorld, StageRegistry};

/// State shared between the worker thread and the polling thread.
///
/// The cancel flag is a one-way signal written by the polling thread
/// and read by the worker at its checkpoints. The counters are written
/// by the worker and read by the UI for the progress bar; Relaxed
/// loads are fine since slightly stale values only affect the display.
#[derive(Default)]
pub struct JobShared {
    cancel: AtomicBool,
    done: AtomicUsize,
    total: AtomicUsize,
}

impl JobShared {
    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn add_total(&self, steps: usize) {
        self.total.fetch_add(steps, Ordering::Relaxed);
    }

    fn step_done(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }

    fn finish(&self) {
        self.done.store(self.total.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    fn progress(&self) -> (usize, usize) {
        (
            self.done.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }
}

/// One background generation run.
///
/// The run owns its preset snapshot and its dedicated thread; the
/// finished world travels back as the thread's return value, so the
/// handoff slot is written exactly once and read exactly once (by
/// `join`, only after the thread has been observed finished).
pub struct GenerationJob {
    shared: Arc<JobShared>,
    handle: Option<JoinHandle<Option<PreviewWorld>>>,
}

impl GenerationJob {
    /// Spawn a worker thread for one end-to-end generation pass.
    pub fn spawn(
        preset: GenerationPreset,
        stages: Arc<StageRegistry>,
        biomes: BiomeRegistry,
    ) -> std::io::Result<Self> {
        let shared = Arc::new(JobShared::default());
        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("worldsmith-preview".to_string())
            .spawn(move || run_generation(preset, &stages, &biomes, &worker_shared))?;
        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Signal cooperative cancellation. The worker stops at its next
    /// checkpoint; there is no forced termination.
    pub fn request_cancel(&self) {
        self.shared.cancel.store(true, Ordering::Relaxed);
    }

    pub fn cancel_requested(&self) -> bool {
        self.shared.cancelled()
    }

    /// Non-blocking liveness check for the polling thread.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    pub fn progress(&self) -> (usize, usize) {
        self.shared.progress()
    }

    /// Consume the run and take its result. Only called after
    /// `is_finished()` returned true, so this never blocks the caller
    /// for more than thread teardown.
    pub fn join(mut self) -> Option<PreviewWorld> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(world) => world,
            Err(_) => {
                error!("preview worker panicked; discarding the run");
                None
            }
        }
    }
}

/// The worker body: setup stages, then layer stages per planet layer,
/// with cancellation checkpoints between every step.
fn run_generation(
    preset: GenerationPreset,
    stages: &StageRegistry,
    biomes: &BiomeRegistry,
    shared: &JobShared,
) -> Option<PreviewWorld> {
    // Restored on every exit path, including unwinding.
    let _mode = ModeGuard::enter(ProgramMode::CreatingWorld);

    let seed = stable_string_hash(&preset.seed_string);
    let mut world = PreviewWorld::new(
        format!("Preview {:08x}", seed as u32),
        preset.seed_string.clone(),
        seed,
    );

    info!(seed_string = %preset.seed_string, "preview generation started");
    shared.add_total(stages.setup_stages().len());

    for stage in stages.setup_stages() {
        if shared.cancelled() {
            return cancelled_exit(shared);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(combine_seed(seed, stage.seed_part()));
        if let Err(err) = stage.run(&mut world, &preset, biomes, &mut rng) {
            error!("mandatory setup stage failed, aborting preview: {err}");
            return None;
        }
        shared.step_done();
    }

    // The grid now exists, so the per-layer step count is known.
    let layer_parts = stages.layer_seed_parts();
    shared.add_total(world.layers.len() * stages.layer_stages().len());

    for layer in 0..world.layers.len() {
        for (stage, part) in stages.layer_stages().iter().zip(&layer_parts) {
            if shared.cancelled() {
                return cancelled_exit(shared);
            }
            let stage_seed = combine_seed(combine_seed(seed, *part), layer as u64);
            let mut rng = ChaCha8Rng::seed_from_u64(stage_seed);
            if let Err(err) = stage.run(&mut world, layer, &preset, biomes, &mut rng) {
                // Step-level fault isolation: a broken optional stage
                // costs its own output, not the whole preview.
                error!("generation step failed, skipping: {err}");
            }
            shared.step_done();
        }
    }

    if shared.cancelled() {
        return cancelled_exit(shared);
    }

    shared.finish();
    info!(tiles = world.tiles.len(), "preview generation finished");
    Some(world)
}

fn cancelled_exit(shared: &JobShared) -> Option<PreviewWorld> {
    let (done, total) = shared.progress();
    info!("preview generation cancelled after {done} of {total} steps");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use ws_world::stages::{BuildGrid, SeedClimate, StageError};

    fn wait_finished(job: &GenerationJob) {
        while !job.is_finished() {
            thread::sleep(std::time::Duration::from_millis(1));
        }
    }

    fn quick_registry() -> Arc<StageRegistry> {
        Arc::new(StageRegistry::standard())
    }

    fn small_preset() -> GenerationPreset {
        let mut preset = GenerationPreset::new(&BiomeRegistry::with_defaults());
        preset.planet_coverage = 0.05;
        preset
    }

    #[test]
    fn successful_run_completes_progress() {
        let job = GenerationJob::spawn(
            small_preset(),
            quick_registry(),
            BiomeRegistry::with_defaults(),
        )
        .unwrap();
        wait_finished(&job);

        let (done, total) = job.progress();
        assert_eq!(done, total);
        assert!(total > 0);

        let world = job.join().expect("run should produce a world");
        assert!(world.has_grid());
        assert!(world.tiles.iter().all(|t| t.biome.is_some()));
    }

    #[test]
    fn same_preset_generates_identical_worlds() {
        let run = || {
            let job = GenerationJob::spawn(
                small_preset(),
                quick_registry(),
                BiomeRegistry::with_defaults(),
            )
            .unwrap();
            wait_finished(&job);
            job.join().unwrap()
        };
        let a = run();
        let b = run();
        assert_eq!(a.seed, b.seed);
        assert!(a
            .tiles
            .iter()
            .zip(&b.tiles)
            .all(|(ta, tb)| ta.biome == tb.biome && ta.flags == tb.flags));
    }

    #[test]
    fn extreme_slider_values_still_complete() {
        let mut preset = small_preset();
        preset.mountain_density = 0.0;
        preset.sea_level = 2.0;
        assert!(!preset.has_biome_tweaks());

        let job = GenerationJob::spawn(
            preset,
            quick_registry(),
            BiomeRegistry::with_defaults(),
        )
        .unwrap();
        wait_finished(&job);

        let (done, total) = job.progress();
        assert_eq!(done, total);
        assert!(job.join().is_some());
    }

    /// Layer stage that spins until the test releases it, giving the
    /// test a window where the worker is reliably mid-run.
    struct Block(Arc<AtomicBool>);

    impl ws_world::LayerStage for Block {
        fn name(&self) -> &'static str {
            "Block"
        }
        fn seed_part(&self) -> u64 {
            0xb0
        }
        fn run(
            &self,
            _world: &mut PreviewWorld,
            _layer: usize,
            _preset: &GenerationPreset,
            _registry: &BiomeRegistry,
            _rng: &mut ChaCha8Rng,
        ) -> Result<(), StageError> {
            while !self.0.load(Ordering::Relaxed) {
                thread::sleep(std::time::Duration::from_millis(1));
            }
            Ok(())
        }
    }

    #[test]
    fn cancel_mid_run_yields_no_world() {
        let gate = Arc::new(AtomicBool::new(false));
        let mut registry = StageRegistry::empty();
        registry.push_setup(Box::new(BuildGrid));
        registry.push_layer(Box::new(Block(Arc::clone(&gate))));
        registry.push_layer(Box::new(Block(Arc::clone(&gate))));

        let job = GenerationJob::spawn(
            small_preset(),
            Arc::new(registry),
            BiomeRegistry::with_defaults(),
        )
        .unwrap();

        // Worker is inside the first blocking stage; cancel, then let
        // it reach the checkpoint before the second stage.
        job.request_cancel();
        gate.store(true, Ordering::Relaxed);
        wait_finished(&job);
        assert!(job.join().is_none());
    }

    struct FailingSetup;

    impl ws_world::SetupStage for FailingSetup {
        fn name(&self) -> &'static str {
            "FailingSetup"
        }
        fn seed_part(&self) -> u64 {
            0xff
        }
        fn run(
            &self,
            _world: &mut PreviewWorld,
            _preset: &GenerationPreset,
            _registry: &BiomeRegistry,
            _rng: &mut ChaCha8Rng,
        ) -> Result<(), StageError> {
            Err(StageError::Failed("FailingSetup", "forced".into()))
        }
    }

    #[test]
    fn failing_setup_stage_aborts_the_job() {
        let mut registry = StageRegistry::empty();
        registry.push_setup(Box::new(BuildGrid));
        registry.push_setup(Box::new(FailingSetup));
        registry.push_setup(Box::new(SeedClimate));

        let job = GenerationJob::spawn(
            small_preset(),
            Arc::new(registry),
            BiomeRegistry::with_defaults(),
        )
        .unwrap();
        wait_finished(&job);
        assert!(job.join().is_none());
    }
}
