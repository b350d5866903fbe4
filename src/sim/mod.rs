pub mod config;
pub mod driver;
pub mod report;
pub mod workload;

pub use config::SimConfig;
pub use driver::{Sim, compare};
pub use report::{Report, Summary};
pub use workload::{WorkloadConfig, generate};
