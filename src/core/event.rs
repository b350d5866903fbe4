use crate::core::ProcId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedEvent {
    Arrived { proc: ProcId },
    Dispatched { proc: ProcId },
    Preempted { proc: ProcId },
    // CPU burst finished, process moved to IO wait
    BlockedOnIo { proc: ProcId },
    IoComplete { proc: ProcId },
    Completed { proc: ProcId },
    // CPU had nothing to run during the tick
    CpuIdle,
}
