use std::{fs, path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use sched_sim::{
    PolicyKind, SchedEvent, Sim, SimConfig, SimError, Ticks,
    scheduler::DEFAULT_QUANTUM,
    sim::generate,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Runs CPU scheduling policies over a synthetic trace-tape workload.
#[derive(Debug, Parser)]
#[command(name = "sched_sim", version)]
struct Cli {
    /// JSON run configuration; built-in defaults when omitted.
    config: Option<PathBuf>,

    /// Enable or disable preemption, overriding the config.
    #[arg(long, value_name = "BOOL")]
    context_switch: Option<bool>,

    /// Policies to run, in order; repeat the flag to run several.
    #[arg(long = "policy", value_enum)]
    policies: Vec<PolicyArg>,

    /// Round-robin time slice used by `--policy rr`.
    #[arg(long, default_value_t = DEFAULT_QUANTUM)]
    quantum: Ticks,

    /// Workload seed, overriding the config.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Fcfs,
    Sjf,
    Rr,
    Priority,
}

impl Cli {
    fn apply(&self, mut config: SimConfig) -> SimConfig {
        if let Some(context_switch) = self.context_switch {
            config.context_switch = context_switch;
        }
        if !self.policies.is_empty() {
            config.policies = self
                .policies
                .iter()
                .map(|policy| match policy {
                    PolicyArg::Fcfs => PolicyKind::Fcfs,
                    PolicyArg::Sjf => PolicyKind::ShortestJob,
                    PolicyArg::Rr => PolicyKind::RoundRobin {
                        quantum: self.quantum,
                    },
                    PolicyArg::Priority => PolicyKind::Priority,
                })
                .collect();
        }
        if let Some(seed) = self.seed {
            config.workload.seed = seed;
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .map_err(|e| SimError::Config(format!("reading {}: {e}", path.display())))?;
            SimConfig::from_json(&json)?
        }
        None => SimConfig::default(),
    };
    let config = cli.apply(config);

    let processes = generate(&config.workload)?;
    info!(
        processes = processes.len(),
        context_switch = config.context_switch,
        "generated workload"
    );

    for &kind in &config.policies {
        let mut sim = Sim::new(kind.build());
        sim.load(processes.clone());
        sim.execute(config.context_switch)?;

        let report = sim.metrics()?;
        let summary = report.summary();
        println!(
            "{}: total_time={} avg_response={:.2} avg_waiting={:.2} avg_turnaround={:.2} throughput={:.3}",
            report.algorithm,
            report.total_time,
            summary.avg_response_time,
            summary.avg_waiting_time,
            summary.avg_turnaround_time,
            summary.throughput,
        );
        println!("Longest idle stretch: {} ticks", longest_idle(sim.events()));
    }

    Ok(())
}

fn longest_idle(events: &[(Ticks, SchedEvent)]) -> Ticks {
    let mut current = 0;
    let mut max_idle = 0;
    let mut last_tick = None;

    for &(tick, event) in events {
        if event != SchedEvent::CpuIdle {
            continue;
        }
        // Idle events are recorded against the tick that closes the idle unit
        current = if last_tick == Some(tick.saturating_sub(1)) {
            current + 1
        } else {
            1
        };
        last_tick = Some(tick);
        max_idle = max_idle.max(current);
    }

    max_idle
}
