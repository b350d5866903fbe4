use serde::Serialize;

use super::state::Ticks;
use crate::error::SimError;

/// Lower value = higher scheduling priority.
pub type Priority = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Cpu,
    Io,
    Complete,
}

/// Per-process scheduling metrics, available once arrival, start and exit
/// have all been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessMetrics {
    pub name: String,
    pub priority: Priority,
    pub arrival_time: Ticks,
    pub start_time: Ticks,
    pub exit_time: Ticks,
    pub response_time: Ticks,
    pub waiting_time: Ticks,
    pub turnaround_time: Ticks,
}

/// One workload: a trace tape of alternating CPU bursts and IO waits,
/// plus the per-run bookkeeping the engine drives through it.
#[derive(Debug, Clone)]
pub struct Process {
    name: String,
    // CPU, IO, CPU, ..., CPU
    tape: Vec<Ticks>,
    cursor: usize,
    remaining: Ticks,
    total_cpu_time: Ticks,
    total_io_time: Ticks,
    priority: Priority,
    release_time: Ticks,
    arrival_time: Option<Ticks>,
    start_time: Option<Ticks>,
    exit_time: Option<Ticks>,
    complete: bool,
}

impl Process {
    /// Builds a process from its trace tape. The tape must be non-empty, of
    /// odd length and contain only positive entries.
    pub fn new(name: impl Into<String>, tape: Vec<Ticks>) -> Result<Self, SimError> {
        let name = name.into();
        if tape.is_empty() {
            return Err(SimError::EmptyTape { name });
        }
        if tape.len() % 2 == 0 {
            let len = tape.len();
            return Err(SimError::EvenTape { name, len });
        }
        if let Some(index) = tape.iter().position(|&entry| entry == 0) {
            return Err(SimError::ZeroEntry { name, index });
        }

        let (mut total_cpu_time, mut total_io_time): (Ticks, Ticks) = (0, 0);
        for (i, &entry) in tape.iter().enumerate() {
            let total = if i % 2 == 0 {
                &mut total_cpu_time
            } else {
                &mut total_io_time
            };
            match total.checked_add(entry) {
                Some(sum) => *total = sum,
                None => return Err(SimError::DemandOverflow { name }),
            }
        }
        // total_time() must stay representable too
        if total_cpu_time.checked_add(total_io_time).is_none() {
            return Err(SimError::DemandOverflow { name });
        }

        Ok(Self {
            name,
            remaining: tape[0],
            tape,
            cursor: 0,
            total_cpu_time,
            total_io_time,
            priority: 0,
            release_time: 0,
            arrival_time: None,
            start_time: None,
            exit_time: None,
            complete: false,
        })
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Tick at which the engine admits this process into the ready queue.
    pub fn with_release_time(mut self, release_time: Ticks) -> Self {
        self.release_time = release_time;
        self
    }

    /// Moves to the next tape entry. Returns false, and marks the process
    /// complete, when the current entry was the last one.
    pub fn advance_tape(&mut self) -> bool {
        if self.complete {
            return false;
        }
        if self.cursor + 1 == self.tape.len() {
            self.complete = true;
            return false;
        }
        self.cursor += 1;
        self.remaining = self.tape[self.cursor];
        true
    }

    /// Consumes one tick of the current entry. Returns true when the entry
    /// finished this tick, in which case the tape has already advanced.
    pub fn tick_active(&mut self) -> bool {
        if self.complete || self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.advance_tape();
            return true;
        }
        false
    }

    pub fn remaining_time(&self) -> Ticks {
        self.remaining
    }

    pub fn phase(&self) -> Phase {
        if self.complete {
            Phase::Complete
        } else if self.cursor % 2 == 0 {
            Phase::Cpu
        } else {
            Phase::Io
        }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.remaining = self.tape[0];
        self.arrival_time = None;
        self.start_time = None;
        self.exit_time = None;
        self.complete = false;
    }

    pub fn set_arrival_time(&mut self, arrival_time: Ticks) -> Result<(), SimError> {
        if self.arrival_time.is_some() {
            return Err(self.already_set("arrival"));
        }
        self.arrival_time = Some(arrival_time);
        Ok(())
    }

    /// First dispatch wins; later calls leave the recorded value intact.
    pub fn set_start_time(&mut self, start_time: Ticks) {
        self.start_time.get_or_insert(start_time);
    }

    /// Records the exit time. Requires arrival and start to be set, and the
    /// resulting timeline to leave room for the whole tape.
    pub fn set_exit_time(&mut self, exit_time: Ticks) -> Result<(), SimError> {
        if self.exit_time.is_some() {
            return Err(self.already_set("exit"));
        }
        let (Some(arrival), Some(_)) = (self.arrival_time, self.start_time) else {
            return Err(self.fields_not_set());
        };
        let earliest = arrival.checked_add(self.total_time());
        if earliest.is_none_or(|earliest| exit_time < earliest) {
            return Err(SimError::InvalidTimeline {
                name: self.name.clone(),
                arrival,
                exit: exit_time,
                demand: self.total_time(),
            });
        }
        self.exit_time = Some(exit_time);
        Ok(())
    }

    pub fn metrics(&self) -> Result<ProcessMetrics, SimError> {
        let (arrival_time, start_time, exit_time) = self.timestamps()?;
        Ok(ProcessMetrics {
            name: self.name.clone(),
            priority: self.priority,
            arrival_time,
            start_time,
            exit_time,
            response_time: start_time - arrival_time,
            waiting_time: exit_time - arrival_time - self.total_cpu_time - self.total_io_time,
            turnaround_time: exit_time - arrival_time,
        })
    }

    pub fn response_time(&self) -> Result<Ticks, SimError> {
        self.metrics().map(|m| m.response_time)
    }

    pub fn waiting_time(&self) -> Result<Ticks, SimError> {
        self.metrics().map(|m| m.waiting_time)
    }

    pub fn turnaround_time(&self) -> Result<Ticks, SimError> {
        self.metrics().map(|m| m.turnaround_time)
    }

    fn timestamps(&self) -> Result<(Ticks, Ticks, Ticks), SimError> {
        match (self.arrival_time, self.start_time, self.exit_time) {
            (Some(arrival), Some(start), Some(exit)) => Ok((arrival, start, exit)),
            _ => Err(self.fields_not_set()),
        }
    }

    fn fields_not_set(&self) -> SimError {
        SimError::FieldsNotSet {
            name: self.name.clone(),
        }
    }

    fn already_set(&self, field: &'static str) -> SimError {
        SimError::TimestampAlreadySet {
            name: self.name.clone(),
            field,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tape(&self) -> &[Ticks] {
        &self.tape
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub fn release_time(&self) -> Ticks {
        self.release_time
    }

    pub fn arrival_time(&self) -> Option<Ticks> {
        self.arrival_time
    }

    pub fn start_time(&self) -> Option<Ticks> {
        self.start_time
    }

    pub fn exit_time(&self) -> Option<Ticks> {
        self.exit_time
    }

    pub fn total_cpu_time(&self) -> Ticks {
        self.total_cpu_time
    }

    pub fn total_io_time(&self) -> Ticks {
        self.total_io_time
    }

    pub fn total_time(&self) -> Ticks {
        self.total_cpu_time + self.total_io_time
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}
