use thiserror::Error;

use crate::core::Ticks;

/// Errors surfaced by workload construction, process bookkeeping and runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("trace tape for {name} is empty")]
    EmptyTape { name: String },

    #[error("trace tape for {name} has even length {len}; it must start and end with a CPU burst")]
    EvenTape { name: String, len: usize },

    #[error("trace tape for {name} has a zero-length entry at index {index}")]
    ZeroEntry { name: String, index: usize },

    #[error("trace tape for {name} sums past the representable tick range")]
    DemandOverflow { name: String },

    #[error("{name}: one or more fields have not been set yet")]
    FieldsNotSet { name: String },

    #[error("{name}: {field} time already recorded")]
    TimestampAlreadySet { name: String, field: &'static str },

    #[error("{name}: exit at {exit} precedes arrival {arrival} plus total demand {demand}")]
    InvalidTimeline {
        name: String,
        arrival: Ticks,
        exit: Ticks,
        demand: Ticks,
    },

    #[error("must complete execution before generating metrics")]
    MetricsNotReady,

    #[error("no processes loaded")]
    NotLoaded,

    #[error("invalid configuration: {0}")]
    Config(String),
}
