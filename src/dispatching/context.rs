//! Scheduling context for dispatching rule evaluation.

/// Runtime state passed to dispatching rules.
///
/// Everything a rule needs beyond the candidate's own [`ProcessState`]:
/// the simulation clock and the core asking for work.
///
/// [`ProcessState`]: crate::scheduler::ProcessState
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SchedulingContext {
    /// Current simulation time (ticks).
    pub now: f64,
    /// Core the decision is made for.
    pub core_id: usize,
}

impl SchedulingContext {
    /// Creates a context at the given time for core 0.
    pub fn at_time(now: f64) -> Self {
        Self { now, core_id: 0 }
    }

    /// Sets the deciding core.
    pub fn on_core(mut self, core_id: usize) -> Self {
        self.core_id = core_id;
        self
    }
}
