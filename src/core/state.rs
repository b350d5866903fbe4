use slotmap::{SlotMap, new_key_type};
use std::collections::VecDeque;
use tracing::debug;

use super::event::SchedEvent;
use super::process::{Phase, Process};

pub type Ticks = u64;

new_key_type! {
    pub struct ProcId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    // Release time not reached yet
    Pending,
    Ready,
    Running,
    // In an IO phase
    Blocked,
    Completed,
}

/// Which ready process a dispatch picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Front of the ready queue.
    Head,
    /// Lowest priority value, then earliest arrival, then queue order.
    #[default]
    Priority,
    /// Shortest remaining CPU burst, then earliest arrival, then queue order.
    ShortestRemaining,
    /// A specific ready-queue position.
    At(usize),
}

/// Simulated single CPU: the process set, the ready queue, the running slot,
/// the processes waiting on IO and the logical clock.
#[derive(Debug, Default)]
pub struct Engine {
    processes: SlotMap<ProcId, Process>,
    ready: VecDeque<ProcId>,
    running: Option<ProcId>,
    // Ticks the running process has held the CPU since its dispatch
    slice: Ticks,
    io_wait: Vec<ProcId>,
    // Sorted by release time, ties in load order
    pending: Vec<ProcId>,
    pending_cursor: usize,
    clock: Ticks,
    events: Vec<SchedEvent>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a fresh process set and admits everything released at tick 0.
    pub fn load(&mut self, processes: Vec<Process>) {
        self.processes = SlotMap::with_capacity_and_key(processes.len());
        for process in processes {
            self.processes.insert(process);
        }
        self.restart();
    }

    /// Rewinds the loaded process set to tick 0. Process ids stay valid.
    pub fn restart(&mut self) {
        for process in self.processes.values_mut() {
            process.reset();
        }
        self.ready.clear();
        self.running = None;
        self.slice = 0;
        self.io_wait.clear();
        self.events.clear();
        self.clock = 0;

        let processes = &self.processes;
        self.pending = processes.keys().collect();
        self.pending.sort_by_key(|&id| processes[id].release_time());
        self.pending_cursor = 0;

        self.admit_arrivals();
    }

    /// Advances the clock by one tick and returns the processes that
    /// completed during it.
    pub fn tick(&mut self) -> Vec<ProcId> {
        let finished = match self.running {
            Some(id) => {
                self.slice += 1;
                self.processes[id].tick_active().then_some(id)
            }
            None => {
                self.events.push(SchedEvent::CpuIdle);
                None
            }
        };

        // IO runs alongside the CPU, one unit per tick for every waiter.
        let processes = &mut self.processes;
        let mut returned = Vec::new();
        self.io_wait.retain(|&id| {
            if processes[id].tick_active() {
                returned.push(id);
                false
            } else {
                true
            }
        });

        self.clock += 1;

        let mut completed = Vec::new();
        if let Some(id) = finished {
            self.running = None;
            self.slice = 0;
            let process = &self.processes[id];
            if process.is_complete() {
                debug!(clock = self.clock, process = process.name(), "completed");
                self.events.push(SchedEvent::Completed { proc: id });
                completed.push(id);
            } else {
                debug!(clock = self.clock, process = process.name(), "blocked on io");
                self.events.push(SchedEvent::BlockedOnIo { proc: id });
                self.io_wait.push(id);
            }
        }

        for id in returned {
            debug!(
                clock = self.clock,
                process = self.processes[id].name(),
                "io complete"
            );
            self.events.push(SchedEvent::IoComplete { proc: id });
            self.ready.push_back(id);
        }

        self.admit_arrivals();
        completed
    }

    fn admit_arrivals(&mut self) {
        while let Some(&id) = self.pending.get(self.pending_cursor) {
            let process = &mut self.processes[id];
            if process.release_time() > self.clock {
                break;
            }
            process
                .set_arrival_time(self.clock)
                .expect("Pending process already carries an arrival time");
            debug!(clock = self.clock, process = process.name(), "arrived");

            self.events.push(SchedEvent::Arrived { proc: id });
            self.ready.push_back(id);
            self.pending_cursor += 1;
        }
    }

    pub fn all_complete(&self) -> bool {
        self.processes.values().all(Process::is_complete)
    }

    pub fn idle(&self) -> bool {
        self.running.is_none()
    }

    /// Dispatches a ready process if the CPU is idle; no-op otherwise.
    pub fn dispatch_if_idle(&mut self, selection: Selection) -> Option<ProcId> {
        if !self.idle() {
            return None;
        }
        let pos = self.pick(selection)?;
        self.dispatch(pos)
    }

    /// Dispatches a ready process into a slot the caller has just vacated.
    pub fn dispatch_preempt(&mut self, selection: Selection) -> Option<ProcId> {
        debug_assert!(
            self.running.is_none(),
            "dispatch_preempt called with an occupied CPU"
        );
        if self.running.is_some() {
            return None;
        }
        let pos = self.pick(selection)?;
        self.dispatch(pos)
    }

    /// Sends the running process back to the tail of the ready queue.
    pub fn preempt_running(&mut self) -> Option<ProcId> {
        let id = self.running.take()?;
        self.slice = 0;
        debug!(
            clock = self.clock,
            process = self.processes[id].name(),
            "preempted"
        );
        self.events.push(SchedEvent::Preempted { proc: id });
        self.ready.push_back(id);
        Some(id)
    }

    fn pick(&self, selection: Selection) -> Option<usize> {
        match selection {
            Selection::Head => (!self.ready.is_empty()).then_some(0),
            Selection::At(pos) => (pos < self.ready.len()).then_some(pos),
            Selection::Priority => self.position_min_by_key(|p| i64::from(p.priority())),
            Selection::ShortestRemaining => {
                self.position_min_by_key(|p| i64::try_from(p.remaining_time()).unwrap_or(i64::MAX))
            }
        }
    }

    fn position_min_by_key(&self, key: impl Fn(&Process) -> i64) -> Option<usize> {
        self.ready
            .iter()
            .enumerate()
            .min_by_key(|&(pos, &id)| {
                let process = &self.processes[id];
                (key(process), process.arrival_time(), pos)
            })
            .map(|(pos, _)| pos)
    }

    fn dispatch(&mut self, pos: usize) -> Option<ProcId> {
        let id = self.ready.remove(pos)?;
        debug_assert_eq!(self.processes[id].phase(), Phase::Cpu);

        self.running = Some(id);
        self.slice = 0;
        let process = &mut self.processes[id];
        process.set_start_time(self.clock);
        debug!(clock = self.clock, process = process.name(), "dispatched");
        self.events.push(SchedEvent::Dispatched { proc: id });
        Some(id)
    }

    pub fn ready_snapshot(&self) -> impl ExactSizeIterator<Item = &Process> + '_ {
        self.ready.iter().map(|&id| &self.processes[id])
    }

    pub fn ready_is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    pub fn ready_ids(&self) -> impl ExactSizeIterator<Item = ProcId> + '_ {
        self.ready.iter().copied()
    }

    pub fn io_waiting(&self) -> &[ProcId] {
        &self.io_wait
    }

    pub fn not_arrived(&self) -> &[ProcId] {
        &self.pending[self.pending_cursor..]
    }

    pub fn running_id(&self) -> Option<ProcId> {
        self.running
    }

    pub fn running_process(&self) -> Option<&Process> {
        self.running.map(|id| &self.processes[id])
    }

    pub fn running_slice(&self) -> Ticks {
        self.slice
    }

    pub fn clock_value(&self) -> Ticks {
        self.clock
    }

    pub fn process(&self, id: ProcId) -> &Process {
        &self.processes[id]
    }

    pub fn process_mut(&mut self, id: ProcId) -> &mut Process {
        &mut self.processes[id]
    }

    /// Processes in load order.
    pub fn processes(&self) -> impl Iterator<Item = (ProcId, &Process)> {
        self.processes.iter()
    }

    pub fn find(&self, name: &str) -> Option<ProcId> {
        self.processes
            .iter()
            .find(|(_, p)| p.name() == name)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn state_of(&self, id: ProcId) -> ProcState {
        if self.processes[id].is_complete() {
            ProcState::Completed
        } else if self.running == Some(id) {
            ProcState::Running
        } else if self.ready.contains(&id) {
            ProcState::Ready
        } else if self.io_wait.contains(&id) {
            ProcState::Blocked
        } else {
            ProcState::Pending
        }
    }

    pub fn take_events(&mut self) -> Vec<SchedEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(name: &str, tape: &[Ticks], priority: i32, release: Ticks) -> Process {
        Process::new(name, tape.to_vec())
            .unwrap()
            .with_priority(priority)
            .with_release_time(release)
    }

    fn names(engine: &Engine) -> Vec<&str> {
        engine.ready_snapshot().map(Process::name).collect()
    }

    #[test]
    fn load_admits_tick_zero_releases() {
        let mut engine = Engine::new();
        engine.load(vec![proc("a", &[3], 0, 0), proc("b", &[3], 0, 2)]);

        assert_eq!(engine.clock_value(), 0);
        assert!(engine.idle());
        assert_eq!(names(&engine), ["a"]);
        assert_eq!(engine.not_arrived().len(), 1);

        let b = engine.find("b").unwrap();
        assert_eq!(engine.state_of(b), ProcState::Pending);
        engine.tick();
        engine.tick();
        assert_eq!(engine.state_of(b), ProcState::Ready);
        assert_eq!(engine.process(b).arrival_time(), Some(2));
    }

    #[test]
    fn dispatch_records_start_once() {
        let mut engine = Engine::new();
        engine.load(vec![proc("a", &[5], 0, 0)]);
        let a = engine.dispatch_if_idle(Selection::Head).unwrap();
        engine.tick();
        engine.tick();
        engine.preempt_running();
        assert!(engine.idle());
        assert_eq!(engine.dispatch_preempt(Selection::Head), Some(a));
        assert_eq!(engine.process(a).start_time(), Some(0));
    }

    #[test]
    fn dispatch_if_idle_leaves_running_alone() {
        let mut engine = Engine::new();
        engine.load(vec![proc("a", &[5], 3, 0), proc("b", &[5], 1, 0)]);
        let first = engine.dispatch_if_idle(Selection::Head).unwrap();
        assert_eq!(engine.dispatch_if_idle(Selection::Priority), None);
        assert_eq!(engine.running_id(), Some(first));
        assert_eq!(names(&engine), ["b"]);
    }

    #[test]
    fn priority_selection_breaks_ties_by_arrival_then_queue_order() {
        let mut engine = Engine::new();
        engine.load(vec![
            proc("late", &[4], 1, 1),
            proc("low", &[4], 7, 0),
            proc("early", &[4], 1, 0),
            proc("early2", &[4], 1, 0),
        ]);
        engine.tick();
        assert_eq!(names(&engine), ["low", "early", "early2", "late"]);

        let picked = engine.dispatch_if_idle(Selection::Priority).unwrap();
        assert_eq!(engine.process(picked).name(), "early");
        engine.preempt_running();
        // "early" now sits behind "late" but arrived first.
        assert_eq!(names(&engine), ["low", "early2", "late", "early"]);
        let picked = engine.dispatch_preempt(Selection::Priority).unwrap();
        assert_eq!(engine.process(picked).name(), "early2");
    }

    #[test]
    fn shortest_remaining_selection() {
        let mut engine = Engine::new();
        engine.load(vec![proc("long", &[9], 0, 0), proc("short", &[2], 0, 0)]);
        let picked = engine.dispatch_if_idle(Selection::ShortestRemaining).unwrap();
        assert_eq!(engine.process(picked).name(), "short");
    }

    #[test]
    fn cpu_burst_end_moves_process_to_io_then_back() {
        let mut engine = Engine::new();
        engine.load(vec![proc("a", &[1, 2, 1], 0, 0)]);
        let a = engine.dispatch_if_idle(Selection::Head).unwrap();

        assert!(engine.tick().is_empty());
        assert!(engine.idle());
        assert_eq!(engine.state_of(a), ProcState::Blocked);
        assert_eq!(engine.io_waiting(), &[a]);

        engine.tick();
        assert_eq!(engine.state_of(a), ProcState::Blocked);
        engine.tick();
        assert_eq!(engine.state_of(a), ProcState::Ready);

        engine.dispatch_if_idle(Selection::Head);
        assert_eq!(engine.tick(), vec![a]);
        assert_eq!(engine.clock_value(), 4);
        assert!(engine.all_complete());
        assert_eq!(engine.state_of(a), ProcState::Completed);
    }

    #[test]
    fn io_progresses_while_another_process_runs() {
        let mut engine = Engine::new();
        engine.load(vec![proc("io", &[1, 2, 1], 0, 0), proc("cpu", &[4], 0, 0)]);
        engine.dispatch_if_idle(Selection::Head);
        engine.tick();
        engine.dispatch_if_idle(Selection::Head);
        engine.tick();
        engine.tick();
        let io = engine.find("io").unwrap();
        assert_eq!(engine.state_of(io), ProcState::Ready);
        assert_eq!(engine.running_process().unwrap().name(), "cpu");
        assert_eq!(engine.running_slice(), 2);
    }

    #[test]
    fn idle_ticks_are_reported() {
        let mut engine = Engine::new();
        engine.load(vec![proc("a", &[1], 0, 2)]);
        engine.tick();
        assert_eq!(engine.take_events(), vec![SchedEvent::CpuIdle]);
        assert!(engine.take_events().is_empty());
    }

    #[test]
    fn restart_keeps_ids_and_rewinds() {
        let mut engine = Engine::new();
        engine.load(vec![proc("a", &[1], 0, 0)]);
        let a = engine.dispatch_if_idle(Selection::Head).unwrap();
        engine.tick();
        assert!(engine.all_complete());

        engine.restart();
        assert_eq!(engine.clock_value(), 0);
        assert!(!engine.all_complete());
        assert_eq!(engine.ready_ids().collect::<Vec<_>>(), vec![a]);
        assert_eq!(engine.process(a).start_time(), None);
    }
}
