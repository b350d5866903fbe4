use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument};

use super::report::Report;
use crate::{
    core::{
        driver::SchedCore,
        event::SchedEvent,
        process::Process,
        state::{ProcId, Ticks},
    },
    error::SimError,
    scheduler::{Policy, PolicyKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Empty,
    Loaded,
    Executed { total_time: Ticks },
}

/// Runs one policy over one workload: load, execute, then read the report.
pub struct Sim<P: Policy> {
    pub core: SchedCore<P>,
    state: RunState,
    // (tick, event) for the latest execution
    trace: Vec<(Ticks, SchedEvent)>,
}

impl<P: Policy> Sim<P> {
    pub fn new(policy: P) -> Self {
        Self {
            core: SchedCore::new(policy),
            state: RunState::Empty,
            trace: Vec::new(),
        }
    }

    pub fn load(&mut self, processes: Vec<Process>) {
        self.core.load(processes);
        self.trace.clear();
        self.state = RunState::Loaded;
    }

    /// Runs the loaded workload to completion and returns the final clock.
    /// Executing again replays the same workload from tick 0.
    #[instrument(skip(self), fields(policy = self.core.policy.name()))]
    pub fn execute(&mut self, context_switch: bool) -> Result<Ticks, SimError> {
        if self.state == RunState::Empty {
            return Err(SimError::NotLoaded);
        }
        // A previous run may have stopped part way through on an error.
        self.core.engine.restart();
        self.trace.clear();
        self.state = RunState::Loaded;
        info!(processes = self.core.engine.len(), "execution started");

        self.core.decide(context_switch);
        self.record_events(0);

        while !self.core.engine.all_complete() {
            let completed = self.core.step(context_switch);
            let now = self.core.now();
            for id in completed {
                self.core.engine.process_mut(id).set_exit_time(now)?;
            }
            self.record_events(now);
        }

        let total_time = self.core.now();
        self.state = RunState::Executed { total_time };
        info!(total_time, "execution finished");
        Ok(total_time)
    }

    fn record_events(&mut self, now: Ticks) {
        for event in self.core.take_events() {
            debug!(tick = now, ?event);
            self.trace.push((now, event));
        }
    }

    pub fn metrics(&self) -> Result<Report, SimError> {
        let RunState::Executed { total_time } = self.state else {
            return Err(SimError::MetricsNotReady);
        };
        let processes = self
            .core
            .engine
            .processes()
            .map(|(_, p)| p.metrics())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Report {
            algorithm: self.core.policy.name().to_owned(),
            total_time,
            processes,
        })
    }

    pub fn is_executed(&self) -> bool {
        matches!(self.state, RunState::Executed { .. })
    }

    pub fn events(&self) -> &[(Ticks, SchedEvent)] {
        &self.trace
    }

    pub fn process(&self, id: ProcId) -> &Process {
        self.core.engine.process(id)
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.core.engine.processes().map(|(_, p)| p)
    }

    /// Ticks at which the named process was dispatched.
    pub fn dispatches_of(&self, name: &str) -> Vec<Ticks> {
        self.trace
            .iter()
            .filter_map(|&(tick, event)| match event {
                SchedEvent::Dispatched { proc } if self.process(proc).name() == name => Some(tick),
                _ => None,
            })
            .collect()
    }

    /// Ticks at which the named process was preempted.
    pub fn preemptions_of(&self, name: &str) -> Vec<Ticks> {
        self.trace
            .iter()
            .filter_map(|&(tick, event)| match event {
                SchedEvent::Preempted { proc } if self.process(proc).name() == name => Some(tick),
                _ => None,
            })
            .collect()
    }
}

/// Runs every policy over its own copy of `processes` and returns the reports
/// keyed by algorithm name.
pub fn compare(
    processes: &[Process],
    policies: &[PolicyKind],
    context_switch: bool,
) -> Result<FxHashMap<String, Report>, SimError> {
    let mut reports = FxHashMap::default();
    for &kind in policies {
        let mut sim = Sim::new(kind.build());
        sim.load(processes.to_vec());
        sim.execute(context_switch)?;
        let report = sim.metrics()?;
        if reports.contains_key(&report.algorithm) {
            return Err(SimError::Config(format!(
                "policy {} listed more than once",
                report.algorithm
            )));
        }
        reports.insert(report.algorithm.clone(), report);
    }
    Ok(reports)
}
