use super::Policy;
use crate::core::{Engine, Selection};

/// Lowest priority value runs first. With context switching enabled a newly
/// ready process with a strictly better priority evicts the running one.
pub struct PriorityScheduler;

impl Policy for PriorityScheduler {
    fn name(&self) -> &str {
        "Priority"
    }

    fn decide(&mut self, engine: &mut Engine, context_switch: bool) {
        if !context_switch {
            engine.dispatch_if_idle(Selection::Priority);
            return;
        }

        // The engine vacates the slot on the tick a burst drains, so a
        // finished burst shows up here as an idle CPU.
        let Some(running_priority) = engine.running_process().map(|p| p.priority()) else {
            engine.dispatch_preempt(Selection::Priority);
            return;
        };

        // First match in queue order, not the global minimum.
        let better = engine
            .ready_snapshot()
            .position(|p| p.priority() < running_priority);
        if let Some(pos) = better {
            engine.preempt_running();
            engine.dispatch_preempt(Selection::At(pos));
        }
    }
}
