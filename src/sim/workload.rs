use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    core::{Priority, Process, Ticks},
    error::SimError,
};

/// Parameters for a synthetic Bernoulli-arrival workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Arrivals are drawn for ticks `0..ticks`.
    pub ticks: Ticks,
    /// Probability that a process arrives on a given tick.
    pub p_arrival: f64,
    /// Inclusive bounds for each CPU burst.
    pub cpu_burst: (Ticks, Ticks),
    /// Inclusive bounds for each IO wait.
    pub io_burst: (Ticks, Ticks),
    pub max_cpu_bursts: usize,
    /// Priorities are drawn from `0..priority_levels`.
    pub priority_levels: Priority,
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            ticks: 50,
            p_arrival: 0.2,
            cpu_burst: (1, 8),
            io_burst: (1, 5),
            max_cpu_bursts: 3,
            priority_levels: 5,
            seed: 0,
        }
    }
}

impl WorkloadConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(0.0..=1.0).contains(&self.p_arrival) {
            return Err(SimError::Config(format!(
                "p_arrival must lie in [0, 1], got {}",
                self.p_arrival
            )));
        }
        for (what, (lo, hi)) in [("cpu_burst", self.cpu_burst), ("io_burst", self.io_burst)] {
            if lo == 0 || lo > hi {
                return Err(SimError::Config(format!(
                    "{what} bounds must satisfy 1 <= min <= max, got ({lo}, {hi})"
                )));
            }
        }
        if self.max_cpu_bursts == 0 {
            return Err(SimError::Config("max_cpu_bursts must be positive".into()));
        }
        if self.priority_levels <= 0 {
            return Err(SimError::Config("priority_levels must be positive".into()));
        }
        Ok(())
    }
}

/// Generates a deterministic workload for `config.seed`. Process names are
/// `P0`, `P1`, ... in arrival order.
pub fn generate(config: &WorkloadConfig) -> Result<Vec<Process>, SimError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut processes = Vec::new();

    for t in 0..config.ticks {
        if rng.random::<f64>() >= config.p_arrival {
            continue;
        }

        let cpu_bursts = rng.random_range(1..=config.max_cpu_bursts);
        let mut tape = Vec::with_capacity(cpu_bursts * 2 - 1);
        for i in 0..cpu_bursts {
            if i > 0 {
                tape.push(rng.random_range(config.io_burst.0..=config.io_burst.1));
            }
            tape.push(rng.random_range(config.cpu_burst.0..=config.cpu_burst.1));
        }
        let priority = rng.random_range(0..config.priority_levels);

        let process = Process::new(format!("P{}", processes.len()), tape)?
            .with_priority(priority)
            .with_release_time(t);
        processes.push(process);
    }

    Ok(processes)
}
