use super::Policy;
use crate::core::{Engine, Selection, Ticks};

/// Time-sliced FIFO. The running process goes to the back of the queue once it
/// has used `quantum` ticks and someone else is waiting. Without context
/// switching this is plain FCFS.
pub struct RoundRobinScheduler {
    quantum: Ticks,
    // Carries the quantum so runs with different slices stay distinguishable
    name: String,
}

impl RoundRobinScheduler {
    pub fn new(quantum: Ticks) -> Self {
        let quantum = quantum.max(1);
        Self {
            quantum,
            name: format!("Round Robin (q={quantum})"),
        }
    }

    pub fn quantum(&self) -> Ticks {
        self.quantum
    }
}

impl Policy for RoundRobinScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, engine: &mut Engine, context_switch: bool) {
        if engine.idle() {
            engine.dispatch_if_idle(Selection::Head);
            return;
        }
        if !context_switch {
            return;
        }

        if engine.running_slice() >= self.quantum && !engine.ready_is_empty() {
            engine.preempt_running();
            engine.dispatch_preempt(Selection::Head);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Process;

    #[test]
    fn rotates_after_quantum() {
        let mut engine = Engine::new();
        engine.load(vec![
            Process::new("a", vec![5]).unwrap(),
            Process::new("b", vec![5]).unwrap(),
        ]);
        let mut policy = RoundRobinScheduler::new(2);
        policy.decide(&mut engine, true);

        let mut order = Vec::new();
        while !engine.all_complete() {
            order.push(engine.running_process().unwrap().name().to_owned());
            engine.tick();
            policy.decide(&mut engine, true);
        }
        assert_eq!(order, ["a", "a", "b", "b", "a", "a", "b", "b", "a", "b"]);
    }

    #[test]
    fn lone_process_keeps_the_cpu() {
        let mut engine = Engine::new();
        engine.load(vec![Process::new("a", vec![4]).unwrap()]);
        let mut policy = RoundRobinScheduler::new(1);
        policy.decide(&mut engine, true);
        for _ in 0..3 {
            engine.tick();
            policy.decide(&mut engine, true);
            assert_eq!(engine.running_process().unwrap().name(), "a");
        }
    }

    #[test]
    fn zero_quantum_is_clamped() {
        let policy = RoundRobinScheduler::new(0);
        assert_eq!(policy.quantum(), 1);
        assert_eq!(policy.name(), "Round Robin (q=1)");
    }

    #[test]
    fn quantum_expiry_with_empty_queue_keeps_running() {
        let mut engine = Engine::new();
        engine.load(vec![
            Process::new("a", vec![3]).unwrap(),
            Process::new("b", vec![2]).unwrap().with_release_time(2),
        ]);
        let mut policy = RoundRobinScheduler::new(1);
        policy.decide(&mut engine, true);
        engine.tick();
        policy.decide(&mut engine, true);
        assert!(engine.ready_is_empty());
        assert_eq!(engine.running_process().unwrap().name(), "a");

        engine.tick();
        policy.decide(&mut engine, true);
        assert_eq!(engine.running_process().unwrap().name(), "b");
    }
}
