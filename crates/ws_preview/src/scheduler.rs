use std::sync::Arc;

use bevy::log::error;
use ws_core::BiomeRegistry;
use ws_world::{GenerationPreset, PreviewWorld, StageRegistry};

use crate::job::GenerationJob;

/// Frames to wait after the last parameter edit before starting a run,
/// so a slider drag coalesces into one regeneration.
pub const DEBOUNCE_TICKS: u32 = 60;

/// Externally visible scheduler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Counting down after an edit before starting a run.
    Debouncing,
    /// A worker thread is alive and generating.
    Running,
    /// Running, but a newer edit arrived; cancellation signalled.
    CancelRequested,
    /// The worker finished; its world awaits pickup.
    ReadyToSwap,
}

/// Single-threaded control loop for the preview worker.
///
/// All scheduler state lives in this one owned struct; `tick` is called
/// once per UI frame and only ever performs non-blocking checks. At
/// most one worker thread is alive at any instant: a new run starts
/// only after the previous thread was observed finished and joined.
pub struct SchedulerState {
    /// Latest preset snapshot seen from the UI.
    latest: Option<GenerationPreset>,
    /// The latest snapshot has not been generated yet.
    needs_run: bool,
    debounce: u32,
    job: Option<GenerationJob>,
    ready: Option<PreviewWorld>,
    /// The preview display must be re-captured.
    dirty: bool,
    /// False while the preview pane is hidden; suppresses new runs.
    enabled: bool,
    /// Progress of the most recent run, retained after it ends.
    last_progress: (usize, usize),
    /// Total worker runs started, for tests and diagnostics.
    runs_started: usize,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            latest: None,
            needs_run: false,
            debounce: 0,
            job: None,
            ready: None,
            dirty: false,
            enabled: true,
            last_progress: (0, 0),
            runs_started: 0,
        }
    }
}

impl SchedulerState {
    pub fn phase(&self) -> Phase {
        if let Some(job) = &self.job {
            if job.cancel_requested() {
                Phase::CancelRequested
            } else {
                Phase::Running
            }
        } else if self.ready.is_some() {
            Phase::ReadyToSwap
        } else if self.needs_run && self.debounce > 0 {
            Phase::Debouncing
        } else {
            Phase::Idle
        }
    }

    /// Feed the current preset in; detects changes against the last
    /// snapshot, resets the debounce window, and signals cancellation
    /// to an in-flight run. Called every frame by the UI.
    pub fn preset_changed(&mut self, preset: &GenerationPreset) {
        if self.latest.as_ref() == Some(preset) {
            return;
        }
        self.latest = Some(preset.clone());
        self.needs_run = true;
        self.debounce = DEBOUNCE_TICKS;
        if let Some(job) = &self.job {
            job.request_cancel();
        }
    }

    /// Regenerate as soon as possible with the latest snapshot,
    /// skipping the debounce window (the manual regenerate button and
    /// screen-open refresh).
    pub fn request_refresh(&mut self) {
        if self.latest.is_some() {
            self.needs_run = true;
        }
        self.debounce = 0;
        if let Some(job) = &self.job {
            job.request_cancel();
        }
    }

    /// Show or hide the preview. Hidden previews stop starting new
    /// runs; an in-flight run is left to finish and be discarded or
    /// swapped as usual.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            // Re-showing the pane warrants a fresh preview.
            self.request_refresh();
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `(done, total)` of the in-flight run, or of the last finished
    /// run when idle.
    pub fn progress(&self) -> (usize, usize) {
        self.job
            .as_ref()
            .map(|job| job.progress())
            .unwrap_or(self.last_progress)
    }

    pub fn is_generating(&self) -> bool {
        self.job.is_some()
    }

    /// Take the finished world, exactly once, and mark the display
    /// dirty. Returns None unless the scheduler is in ReadyToSwap.
    pub fn take_world(&mut self) -> Option<PreviewWorld> {
        let world = self.ready.take();
        if world.is_some() {
            self.dirty = true;
        }
        world
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Force a display re-capture without regenerating.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn runs_started(&self) -> usize {
        self.runs_started
    }

    /// Advance the state machine by one frame. Never blocks: worker
    /// liveness is checked with `is_finished`, and `join` is only
    /// called after that check.
    pub fn tick(&mut self, stages: &Arc<StageRegistry>, biomes: &BiomeRegistry) {
        self.reap_finished_job();

        if self.job.is_some() || !self.needs_run {
            return;
        }

        if self.debounce > 0 {
            self.debounce -= 1;
        }
        if self.debounce > 0 || !self.enabled {
            return;
        }

        let Some(preset) = self.latest.clone() else {
            self.needs_run = false;
            return;
        };
        match GenerationJob::spawn(preset, Arc::clone(stages), biomes.clone()) {
            Ok(job) => {
                self.job = Some(job);
                self.runs_started += 1;
                self.needs_run = false;
            }
            Err(err) => {
                error!("could not spawn preview worker: {err}");
                // Retry after another settling period.
                self.debounce = DEBOUNCE_TICKS;
            }
        }
    }

    fn reap_finished_job(&mut self) {
        let finished = self.job.as_ref().is_some_and(|job| job.is_finished());
        if !finished {
            return;
        }
        let Some(job) = self.job.take() else { return };

        self.last_progress = job.progress();
        let cancelled = job.cancel_requested();
        match job.join() {
            Some(world) if !cancelled => {
                // Running -> ReadyToSwap.
                self.ready = Some(world);
            }
            _ => {
                // Cancelled or failed: back to Idle. If an edit set
                // needs_run, the countdown resumes on the next ticks.
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn registry() -> Arc<StageRegistry> {
        Arc::new(StageRegistry::standard())
    }

    fn biomes() -> BiomeRegistry {
        BiomeRegistry::with_defaults()
    }

    fn small_preset(seed: &str) -> GenerationPreset {
        let mut preset = GenerationPreset::new(&biomes());
        preset.planet_coverage = 0.05;
        preset.seed_string = seed.to_string();
        preset
    }

    /// Tick until the scheduler reaches the wanted phase, asserting
    /// the progress invariant at every observation point.
    fn tick_until(
        scheduler: &mut SchedulerState,
        stages: &Arc<StageRegistry>,
        biomes: &BiomeRegistry,
        phase: Phase,
    ) {
        for _ in 0..20_000 {
            scheduler.tick(stages, biomes);
            let (done, total) = scheduler.progress();
            assert!(done <= total, "done {done} exceeded total {total}");
            if scheduler.phase() == phase {
                return;
            }
            if scheduler.is_generating() {
                thread::sleep(Duration::from_millis(1));
            }
        }
        panic!("never reached {phase:?}, stuck at {:?}", scheduler.phase());
    }

    #[test]
    fn rapid_edits_coalesce_into_one_run() {
        let stages = registry();
        let biomes = biomes();
        let mut scheduler = SchedulerState::default();

        // Three edits, each well inside the debounce window.
        for (ticks, seed) in [(5, "one"), (5, "two"), (5, "three")] {
            scheduler.preset_changed(&small_preset(seed));
            for _ in 0..ticks {
                scheduler.tick(&stages, &biomes);
            }
            assert_eq!(scheduler.phase(), Phase::Debouncing);
        }

        tick_until(&mut scheduler, &stages, &biomes, Phase::ReadyToSwap);
        assert_eq!(scheduler.runs_started(), 1);

        let world = scheduler.take_world().unwrap();
        assert_eq!(world.seed_string, "three");
        assert_eq!(scheduler.phase(), Phase::Idle);
        assert!(scheduler.is_dirty());

        let (done, total) = scheduler.progress();
        assert_eq!(done, total);
    }

    #[test]
    fn edit_during_run_cancels_and_latest_snapshot_wins() {
        let stages = registry();
        let biomes = biomes();
        let mut scheduler = SchedulerState::default();

        scheduler.preset_changed(&small_preset("first"));
        scheduler.request_refresh();
        tick_until(&mut scheduler, &stages, &biomes, Phase::Running);

        // Two more edits while the worker is alive.
        scheduler.preset_changed(&small_preset("second"));
        assert!(matches!(
            scheduler.phase(),
            Phase::CancelRequested | Phase::Idle
        ));
        scheduler.preset_changed(&small_preset("third"));

        tick_until(&mut scheduler, &stages, &biomes, Phase::ReadyToSwap);
        let world = scheduler.take_world().unwrap();
        assert_eq!(world.seed_string, "third");
        // Intermediate snapshots were coalesced away, never generated.
        assert!(scheduler.runs_started() <= 2);
    }

    #[test]
    fn at_most_one_worker_thread_alive() {
        let stages = registry();
        let biomes = biomes();
        let mut scheduler = SchedulerState::default();

        scheduler.preset_changed(&small_preset("a"));
        scheduler.request_refresh();

        let mut max_alive = 0usize;
        for _ in 0..2_000 {
            scheduler.tick(&stages, &biomes);
            let alive = usize::from(scheduler.is_generating());
            max_alive = max_alive.max(alive);
            // Hammer the scheduler with edits to force restarts.
            if scheduler.runs_started() < 3 && !scheduler.is_generating() {
                scheduler.preset_changed(&small_preset(&format!("b{}", scheduler.runs_started())));
                scheduler.request_refresh();
            }
            if scheduler.runs_started() >= 3 && scheduler.phase() == Phase::ReadyToSwap {
                break;
            }
            thread::sleep(Duration::from_micros(200));
        }
        assert!(max_alive <= 1);
        assert!(scheduler.runs_started() >= 2);
    }

    #[test]
    fn disabled_scheduler_never_starts_runs() {
        let stages = registry();
        let biomes = biomes();
        let mut scheduler = SchedulerState::default();
        scheduler.set_enabled(false);

        scheduler.preset_changed(&small_preset("hidden"));
        for _ in 0..(DEBOUNCE_TICKS * 3) {
            scheduler.tick(&stages, &biomes);
        }
        assert_eq!(scheduler.runs_started(), 0);
        assert_eq!(scheduler.phase(), Phase::Idle);

        // Re-enabling picks the pending snapshot back up.
        scheduler.set_enabled(true);
        tick_until(&mut scheduler, &stages, &biomes, Phase::ReadyToSwap);
        assert_eq!(scheduler.runs_started(), 1);
    }

    #[test]
    fn identical_preset_does_not_retrigger() {
        let stages = registry();
        let biomes = biomes();
        let mut scheduler = SchedulerState::default();

        let preset = small_preset("same");
        scheduler.preset_changed(&preset);
        tick_until(&mut scheduler, &stages, &biomes, Phase::ReadyToSwap);
        scheduler.take_world().unwrap();

        // Re-submitting the unchanged preset must stay Idle.
        for _ in 0..(DEBOUNCE_TICKS * 2) {
            scheduler.preset_changed(&preset);
            scheduler.tick(&stages, &biomes);
        }
        assert_eq!(scheduler.phase(), Phase::Idle);
        assert_eq!(scheduler.runs_started(), 1);
    }
}
