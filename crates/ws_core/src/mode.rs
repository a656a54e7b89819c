use std::sync::atomic::{AtomicU8, Ordering};

/// Coarse process-wide state: whether a throwaway preview world is
/// currently being generated. The worker thread flips this for the
/// duration of a run; everything else only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramMode {
    /// Normal configuration-screen state.
    Entry,
    /// A background worker is generating a preview world.
    CreatingWorld,
}

static PROGRAM_MODE: AtomicU8 = AtomicU8::new(0);

fn encode(mode: ProgramMode) -> u8 {
    match mode {
        ProgramMode::Entry => 0,
        ProgramMode::CreatingWorld => 1,
    }
}

fn decode(raw: u8) -> ProgramMode {
    match raw {
        1 => ProgramMode::CreatingWorld,
        _ => ProgramMode::Entry,
    }
}

/// Current process-wide program mode.
pub fn program_mode() -> ProgramMode {
    decode(PROGRAM_MODE.load(Ordering::Acquire))
}

/// Scoped program-mode transition with guaranteed rollback.
///
/// The previous mode is restored when the guard drops, which covers
/// every exit path of the worker: completion, cooperative cancel, and
/// unwinding after a panic.
#[must_use = "dropping the guard immediately reverts the mode"]
pub struct ModeGuard {
    previous: u8,
}

impl ModeGuard {
    pub fn enter(mode: ProgramMode) -> Self {
        let previous = PROGRAM_MODE.swap(encode(mode), Ordering::AcqRel);
        Self { previous }
    }
}

impl Drop for ModeGuard {
    fn drop(&mut self) {
        PROGRAM_MODE.store(self.previous, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // The mode is process-global, so these tests must not interleave.
    static LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn guard_restores_previous_mode() {
        let _lock = LOCK.lock().unwrap();
        let before = program_mode();
        {
            let _guard = ModeGuard::enter(ProgramMode::CreatingWorld);
            assert_eq!(program_mode(), ProgramMode::CreatingWorld);
        }
        assert_eq!(program_mode(), before);
    }

    #[test]
    fn guard_restores_on_panic() {
        let _lock = LOCK.lock().unwrap();
        let before = program_mode();
        let result = std::panic::catch_unwind(|| {
            let _guard = ModeGuard::enter(ProgramMode::CreatingWorld);
            panic!("stage blew up");
        });
        assert!(result.is_err());
        assert_eq!(program_mode(), before);
    }
}
