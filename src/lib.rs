pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use crate::core::{Engine, Process, ProcessMetrics, SchedEvent, Selection, Ticks};
pub use error::SimError;
pub use scheduler::{Policy, PolicyKind};
pub use sim::{Report, Sim, SimConfig};
