use std::sync::Arc;

use bevy::prelude::*;
use ws_core::BiomeRegistry;
use ws_world::{PreviewWorld, StageRegistry};

pub mod job;
pub mod render;
pub mod scheduler;

pub use job::GenerationJob;
pub use render::{render_preview, PreviewImage, MAX_CAPTURE_ATTEMPTS};
pub use scheduler::{Phase, SchedulerState, DEBOUNCE_TICKS};

/// Everything the live preview needs between frames: the scheduler, the
/// shared stage registry, and the last good capture.
#[derive(Resource)]
pub struct PreviewState {
    pub scheduler: SchedulerState,
    pub stages: Arc<StageRegistry>,
    pub image: Option<PreviewImage>,
    /// World awaiting a successful capture, with its attempt count.
    pending: Option<(PreviewWorld, u32)>,
}

impl Default for PreviewState {
    fn default() -> Self {
        Self {
            scheduler: SchedulerState::default(),
            stages: Arc::new(StageRegistry::standard()),
            image: None,
            pending: None,
        }
    }
}

impl PreviewState {
    /// One capture attempt per frame. A freshly finished world replaces
    /// any world still waiting on a retry; a failed capture keeps the
    /// previous image and retries next frame, up to
    /// [`MAX_CAPTURE_ATTEMPTS`] per world.
    pub fn capture_if_ready(&mut self) -> bool {
        if let Some(world) = self.scheduler.take_world() {
            self.pending = Some((world, 0));
        }
        let Some((world, attempts)) = self.pending.take() else {
            return false;
        };

        match render_preview(&world) {
            Some(image) => {
                self.image = Some(image);
                self.scheduler.mark_clean();
                true
            }
            None if attempts + 1 < MAX_CAPTURE_ATTEMPTS => {
                self.pending = Some((world, attempts + 1));
                false
            }
            None => {
                warn!("preview capture kept failing, keeping the old image");
                self.scheduler.mark_clean();
                false
            }
        }
    }
}

/// Preview plugin for Worldsmith.
/// Drives the background generation scheduler once per frame.
pub struct WsPreviewPlugin;

impl Plugin for WsPreviewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PreviewState>()
            .add_systems(Update, tick_preview_scheduler);
    }
}

fn tick_preview_scheduler(mut state: ResMut<PreviewState>, biomes: Res<BiomeRegistry>) {
    let stages = Arc::clone(&state.stages);
    state.scheduler.tick(&stages, &biomes);
}
