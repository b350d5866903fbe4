use super::Policy;
use crate::core::{Engine, Selection};

/// Shortest next CPU burst first. With context switching enabled this becomes
/// shortest-remaining-time-first.
pub struct ShortestJobScheduler;

impl Policy for ShortestJobScheduler {
    fn name(&self) -> &str {
        "SJF"
    }

    fn decide(&mut self, engine: &mut Engine, context_switch: bool) {
        let Some(remaining) = engine.running_process().map(|p| p.remaining_time()) else {
            engine.dispatch_if_idle(Selection::ShortestRemaining);
            return;
        };
        if !context_switch {
            return;
        }

        let shorter = engine
            .ready_snapshot()
            .any(|p| p.remaining_time() < remaining);
        if shorter {
            engine.preempt_running();
            engine.dispatch_preempt(Selection::ShortestRemaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Process;

    #[test]
    fn preempts_for_strictly_shorter_burst() {
        let mut engine = Engine::new();
        engine.load(vec![
            Process::new("long", vec![8]).unwrap(),
            Process::new("short", vec![2]).unwrap().with_release_time(1),
        ]);
        let mut policy = ShortestJobScheduler;
        policy.decide(&mut engine, true);
        engine.tick();
        policy.decide(&mut engine, true);
        assert_eq!(engine.running_process().unwrap().name(), "short");

        engine.restart();
        policy.decide(&mut engine, false);
        engine.tick();
        policy.decide(&mut engine, false);
        assert_eq!(engine.running_process().unwrap().name(), "long");
    }
}
