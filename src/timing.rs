//! Timing seam
//!
//! Periodic animation is driven by the host's scheduler: the crate
//! supplies callback bodies and the tree's monotonic tick clock, and
//! never spawns threads or timers of its own.

/// Opaque handle identifying a registered task within a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub u64);

/// A periodic callback body.
pub trait TimingTask {
    /// Run one step. `tick` is the owning graph's modification clock at
    /// call time.
    fn execute(&mut self, tick: u64);
}

/// Host-provided scheduler for [`TimingTask`]s.
///
/// Implementations decide threading and timer resolution; the graph
/// core only registers tasks and queries their state.
pub trait TimingService {
    /// Register a task, returning its handle.
    fn register(&mut self, task: Box<dyn TimingTask>) -> TaskHandle;

    /// Remove a task. Stops it first if it is running.
    fn unregister(&mut self, handle: TaskHandle);

    /// Start running a task with the given period.
    fn run(&mut self, handle: TaskHandle, period_ms: u64);

    /// Stop a running task, keeping the registration.
    fn stop(&mut self, handle: TaskHandle);

    /// Whether the task is currently scheduled.
    fn is_active(&self, handle: TaskHandle) -> bool;
}
