use super::Policy;
use crate::core::{Engine, Selection};

/// First come, first served. Never preempts.
pub struct FifoScheduler;

impl Policy for FifoScheduler {
    fn name(&self) -> &str {
        "FCFS"
    }

    fn decide(&mut self, engine: &mut Engine, _context_switch: bool) {
        engine.dispatch_if_idle(Selection::Head);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Process;

    #[test]
    fn runs_in_arrival_order() {
        let mut engine = Engine::new();
        engine.load(vec![
            Process::new("a", vec![3]).unwrap(),
            Process::new("b", vec![1]).unwrap(),
        ]);
        let mut policy = FifoScheduler;
        policy.decide(&mut engine, true);
        assert_eq!(engine.running_process().unwrap().name(), "a");

        engine.tick();
        policy.decide(&mut engine, true);
        assert_eq!(engine.running_process().unwrap().name(), "a");
    }
}
