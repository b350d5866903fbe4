pub mod driver;
pub mod event;
pub mod observer;
pub mod process;
pub mod state;

pub use driver::SchedCore;
pub use event::SchedEvent;
pub use process::{Phase, Priority, Process, ProcessMetrics};
pub use state::{Engine, ProcId, ProcState, Selection, Ticks};
