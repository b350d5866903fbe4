use average::{Estimate, Mean};
use serde::Serialize;

use crate::core::{ProcessMetrics, Ticks};

/// Outcome of one executed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub algorithm: String,
    /// Clock value when the last process completed.
    pub total_time: Ticks,
    /// In load order.
    pub processes: Vec<ProcessMetrics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub avg_response_time: f64,
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    /// Completed processes per tick.
    pub throughput: f64,
}

impl Report {
    pub fn process(&self, name: &str) -> Option<&ProcessMetrics> {
        self.processes.iter().find(|p| p.name == name)
    }

    pub fn summary(&self) -> Summary {
        let throughput = if self.total_time == 0 {
            0.0
        } else {
            self.processes.len() as f64 / self.total_time as f64
        };
        Summary {
            avg_response_time: self.mean(|p| p.response_time),
            avg_waiting_time: self.mean(|p| p.waiting_time),
            avg_turnaround_time: self.mean(|p| p.turnaround_time),
            throughput,
        }
    }

    fn mean(&self, field: impl Fn(&ProcessMetrics) -> Ticks) -> f64 {
        self.processes
            .iter()
            .map(|p| field(p) as f64)
            .collect::<Mean>()
            .estimate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(name: &str, response: Ticks, waiting: Ticks, turnaround: Ticks) -> ProcessMetrics {
        ProcessMetrics {
            name: name.to_owned(),
            priority: 0,
            arrival_time: 0,
            start_time: response,
            exit_time: turnaround,
            response_time: response,
            waiting_time: waiting,
            turnaround_time: turnaround,
        }
    }

    #[test]
    fn summary_averages_per_process_metrics() {
        let report = Report {
            algorithm: "FCFS".into(),
            total_time: 10,
            processes: vec![metrics("a", 0, 0, 4), metrics("b", 4, 4, 10)],
        };
        let summary = report.summary();
        assert_eq!(summary.avg_response_time, 2.0);
        assert_eq!(summary.avg_waiting_time, 2.0);
        assert_eq!(summary.avg_turnaround_time, 7.0);
        assert_eq!(summary.throughput, 0.2);
        assert_eq!(report.process("b").unwrap().turnaround_time, 10);
    }

    #[test]
    fn empty_report_has_zero_throughput() {
        let report = Report {
            algorithm: "FCFS".into(),
            total_time: 0,
            processes: Vec::new(),
        };
        assert_eq!(report.summary().throughput, 0.0);
    }
}
