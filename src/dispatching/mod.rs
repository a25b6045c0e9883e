//! Dispatching rules and rule engine for process selection.
//!
//! Every comparator-driven policy (FCFS, SJF, SRTF, priority, HRRN, LJF,
//! LRTF, RMS) is a [`RuleEngine`] built from the rules in [`rules`]:
//! one primary rule followed by tie-breakers, with input order as the
//! final, total tie-breaker.
//!
//! # Usage
//!
//! ```
//! use u_cpusched::dispatching::{RuleEngine, SchedulingContext};
//! use u_cpusched::dispatching::rules;
//! use u_cpusched::models::Process;
//! use u_cpusched::scheduler::ProcessTable;
//!
//! let table = ProcessTable::new(&[
//!     Process::new("P1", 0.0, 4.0).with_priority(2),
//!     Process::new("P2", 0.0, 4.0).with_priority(1),
//! ]);
//! let engine = RuleEngine::new()
//!     .with_rule(rules::LowestPriorityNumber)
//!     .with_tie_breaker(rules::EarliestArrival);
//!
//! let context = SchedulingContext::at_time(0.0);
//! let order = engine.sort_indices(&[0, 1], &table, &context);
//! assert_eq!(table.pids(order), vec!["P2", "P1"]);
//! ```
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::SchedulingContext;
pub use engine::RuleEngine;
pub(crate) use engine::format_value;

use crate::scheduler::ProcessState;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (dispatched first).
pub type RuleScore = f64;

/// A dispatching rule that ranks ready processes.
///
/// # Score Convention
/// **Lower score = higher priority.** Maximizing rules (LJF, LRTF, HRRN)
/// negate their metric and report the un-negated value through
/// [`DispatchingRule::metric_value`].
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SJF", "HRRN").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of a process given the current context.
    ///
    /// Returns a score where lower = higher priority.
    fn evaluate(&self, process: &ProcessState, context: &SchedulingContext) -> RuleScore;

    /// Name of the compared quantity, used in decision logs.
    fn metric(&self) -> &'static str;

    /// Human-facing value of the compared quantity.
    fn metric_value(&self, process: &ProcessState, context: &SchedulingContext) -> f64 {
        self.evaluate(process, context)
    }

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
