use rustc_hash::FxHashMap;

use super::process::Phase;
use super::state::{Engine, ProcId, ProcState};

/// Cross-checks engine bookkeeping after every step. Only active in debug
/// builds.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, engine: &Engine) {
        self.step += 1;
        if cfg!(debug_assertions) {
            check(engine);
        }
    }
}

/// Each process must sit in exactly one of pending, ready, running, io wait
/// or completed.
pub fn check(engine: &Engine) {
    let mut seen: FxHashMap<ProcId, ProcState> = FxHashMap::default();
    let mut place = |id: ProcId, state: ProcState| {
        let prev = seen.insert(id, state);
        assert!(
            prev.is_none(),
            "process {id:?} tracked as both {prev:?} and {state:?}"
        );
    };

    for &id in engine.not_arrived() {
        place(id, ProcState::Pending);
    }
    for id in engine.ready_ids() {
        place(id, ProcState::Ready);
    }
    if let Some(id) = engine.running_id() {
        place(id, ProcState::Running);
    }
    for &id in engine.io_waiting() {
        place(id, ProcState::Blocked);
    }

    for (id, process) in engine.processes() {
        let expected_phase = match seen.get(&id) {
            None => {
                assert!(
                    process.is_complete(),
                    "process {} is untracked but not complete",
                    process.name()
                );
                continue;
            }
            Some(ProcState::Pending) => {
                assert_eq!(process.arrival_time(), None);
                Phase::Cpu
            }
            Some(ProcState::Blocked) => Phase::Io,
            Some(_) => Phase::Cpu,
        };
        assert_eq!(
            process.phase(),
            expected_phase,
            "process {} is in the wrong phase for its queue",
            process.name()
        );
        assert_eq!(seen[&id], engine.state_of(id));
    }
}
