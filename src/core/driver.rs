use super::{
    event::SchedEvent,
    observer::Observer,
    process::Process,
    state::{Engine, ProcId},
};
use crate::scheduler::Policy;

/// The engine paired with the policy that drives it. One `step` is one tick
/// followed by one policy decision.
pub struct SchedCore<P: Policy> {
    pub engine: Engine,
    pub policy: P,
    observer: Observer,
}

impl<P: Policy> SchedCore<P> {
    pub fn new(policy: P) -> Self {
        Self {
            engine: Engine::new(),
            policy,
            observer: Observer::new(),
        }
    }

    pub fn load(&mut self, processes: Vec<Process>) {
        self.engine.load(processes);
    }

    /// Decision at the current clock without advancing time. Used once at
    /// tick 0, before the first `step`.
    pub fn decide(&mut self, context_switch: bool) {
        self.policy.decide(&mut self.engine, context_switch);
        self.observer.observe(&self.engine);
    }

    // Return the processes that completed during this tick
    pub fn step(&mut self, context_switch: bool) -> Vec<ProcId> {
        let completed = self.engine.tick();
        self.decide(context_switch);
        completed
    }

    pub fn take_events(&mut self) -> Vec<SchedEvent> {
        self.engine.take_events()
    }

    pub fn now(&self) -> super::Ticks {
        self.engine.clock_value()
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}
