pub mod fifo;
pub mod priority;
pub mod round_robin;
pub mod shortest_job;

use serde::{Deserialize, Serialize};

use crate::core::{Engine, Ticks};
pub use fifo::FifoScheduler;
pub use priority::PriorityScheduler;
pub use round_robin::RoundRobinScheduler;
pub use shortest_job::ShortestJobScheduler;

pub const DEFAULT_QUANTUM: Ticks = 3;

/// Per-tick dispatch decision. Called once at tick 0 and after every tick;
/// reads the engine and issues dispatch/preempt calls on it.
pub trait Policy {
    fn name(&self) -> &str;

    fn decide(&mut self, engine: &mut Engine, context_switch: bool);
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn decide(&mut self, engine: &mut Engine, context_switch: bool) {
        (**self).decide(engine, context_switch)
    }
}

/// Serializable tag naming one of the built-in policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyKind {
    Fcfs,
    ShortestJob,
    RoundRobin {
        #[serde(default = "default_quantum")]
        quantum: Ticks,
    },
    Priority,
}

fn default_quantum() -> Ticks {
    DEFAULT_QUANTUM
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Fcfs,
        PolicyKind::ShortestJob,
        PolicyKind::RoundRobin {
            quantum: DEFAULT_QUANTUM,
        },
        PolicyKind::Priority,
    ];

    pub fn build(self) -> Box<dyn Policy> {
        match self {
            PolicyKind::Fcfs => Box::new(FifoScheduler),
            PolicyKind::ShortestJob => Box::new(ShortestJobScheduler),
            PolicyKind::RoundRobin { quantum } => Box::new(RoundRobinScheduler::new(quantum)),
            PolicyKind::Priority => Box::new(PriorityScheduler),
        }
    }
}
