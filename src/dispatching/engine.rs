//! Rule engine for multi-criteria dispatching.
//!
//! Applies rules in sequence: a later rule is consulted only when every
//! earlier rule ties. Input order is the final tie-breaker, so the
//! ordering is total and reproducible.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::scheduler::{ProcessState, ProcessTable};

#[derive(Clone)]
struct RankedRule {
    rule: Arc<dyn DispatchingRule>,
    /// Primary rules decide preemption; tie-breakers only order.
    primary: bool,
}

/// A composable rule engine for process selection.
///
/// # Example
/// ```
/// use u_cpusched::dispatching::{RuleEngine, SchedulingContext};
/// use u_cpusched::dispatching::rules;
/// use u_cpusched::models::Process;
/// use u_cpusched::scheduler::ProcessTable;
///
/// let table = ProcessTable::new(&[
///     Process::new("long", 0.0, 8.0),
///     Process::new("short", 1.0, 2.0),
/// ]);
/// let engine = RuleEngine::new()
///     .with_rule(rules::ShortestBurst)
///     .with_tie_breaker(rules::EarliestArrival);
///
/// let best = engine.select_best(&[0, 1], &table, &SchedulingContext::at_time(1.0));
/// assert_eq!(best, Some(1));
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<RankedRule>,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine (pure input order).
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// Adds a primary rule.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(RankedRule {
            rule: Arc::new(rule),
            primary: true,
        });
        self
    }

    /// Adds a tie-breaking rule.
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(RankedRule {
            rule: Arc::new(rule),
            primary: false,
        });
        self
    }

    /// Compares two processes; `Less` means `a` is dispatched first.
    pub fn compare(
        &self,
        a: &ProcessState,
        b: &ProcessState,
        context: &SchedulingContext,
    ) -> Ordering {
        for rr in &self.rules {
            let ord = self.compare_rule(rr.rule.as_ref(), a, b, context);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.index.cmp(&b.index)
    }

    /// Whether `challenger` beats `incumbent` on the primary rules alone.
    ///
    /// Tie-breakers never justify a preemption.
    pub fn strictly_better(
        &self,
        challenger: &ProcessState,
        incumbent: &ProcessState,
        context: &SchedulingContext,
    ) -> bool {
        for rr in self.rules.iter().filter(|r| r.primary) {
            match self.compare_rule(rr.rule.as_ref(), challenger, incumbent, context) {
                Ordering::Less => return true,
                Ordering::Greater => return false,
                Ordering::Equal => {}
            }
        }
        false
    }

    /// Sorts candidate indices by priority (dispatched first → first).
    pub fn sort_indices(
        &self,
        candidates: &[usize],
        table: &ProcessTable,
        context: &SchedulingContext,
    ) -> Vec<usize> {
        let mut indices = candidates.to_vec();
        indices.sort_by(|&a, &b| self.compare(&table[a], &table[b], context));
        indices
    }

    /// Returns the table index of the highest-priority candidate.
    pub fn select_best(
        &self,
        candidates: &[usize],
        table: &ProcessTable,
        context: &SchedulingContext,
    ) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.compare(&table[a], &table[b], context))
    }

    /// Evaluates a single process and returns scores from each rule.
    pub fn evaluate(&self, process: &ProcessState, context: &SchedulingContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|rr| rr.rule.evaluate(process, context))
            .collect()
    }

    /// Justification for selecting `process`, naming the deciding value.
    pub fn justify(&self, process: &ProcessState, context: &SchedulingContext) -> String {
        match self.rules.iter().find(|r| r.primary) {
            Some(rr) => format!(
                "{}: {} {} = {}",
                rr.rule.description(),
                process.pid,
                rr.rule.metric(),
                format_value(rr.rule.metric_value(process, context))
            ),
            None => format!("input order: {} first", process.pid),
        }
    }

    fn compare_rule(
        &self,
        rule: &dyn DispatchingRule,
        a: &ProcessState,
        b: &ProcessState,
        context: &SchedulingContext,
    ) -> Ordering {
        let score_a = rule.evaluate(a, context);
        let score_b = rule.evaluate(b, context);
        if (score_a - score_b).abs() > self.epsilon {
            score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal)
        } else {
            Ordering::Equal
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| {
                        if r.primary {
                            r.rule.name().to_string()
                        } else {
                            format!("{}(tie)", r.rule.name())
                        }
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Formats a metric for logs: integers without a fraction, otherwise 2 places.
pub(crate) fn format_value(v: f64) -> String {
    if v == f64::MAX {
        "none".to_string()
    } else if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules;
    use crate::models::Process;

    fn table(specs: &[(&str, f64, f64)]) -> ProcessTable {
        let procs: Vec<Process> = specs
            .iter()
            .map(|&(pid, a, b)| Process::new(pid, a, b))
            .collect();
        ProcessTable::new(&procs)
    }

    #[test]
    fn test_sjf_ordering() {
        let t = table(&[("long", 0.0, 5.0), ("short", 0.0, 1.0), ("medium", 0.0, 3.0)]);
        let ctx = SchedulingContext::at_time(0.0);
        let engine = RuleEngine::new().with_rule(rules::ShortestBurst);

        let order = engine.sort_indices(&[0, 1, 2], &t, &ctx);
        assert_eq!(t.pids(order), vec!["short", "medium", "long"]);
    }

    #[test]
    fn test_tie_breaker_then_input_order() {
        let t = table(&[("A", 2.0, 3.0), ("B", 1.0, 3.0), ("C", 1.0, 3.0)]);
        let ctx = SchedulingContext::at_time(2.0);
        let engine = RuleEngine::new()
            .with_rule(rules::ShortestBurst)
            .with_tie_breaker(rules::EarliestArrival);

        // Burst ties → arrival → B and C tie → input order → B
        let order = engine.sort_indices(&[0, 1, 2], &t, &ctx);
        assert_eq!(t.pids(order), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_strictly_better_ignores_tie_breakers() {
        let mut t = table(&[("running", 0.0, 5.0), ("other", 0.0, 3.0)]);
        t[0].remaining = 3.0;
        let ctx = SchedulingContext::at_time(2.0);
        let engine = RuleEngine::new()
            .with_rule(rules::ShortestRemaining)
            .with_tie_breaker(rules::EarliestArrival);

        assert!(!engine.strictly_better(&t[1], &t[0], &ctx));
        t[1].remaining = 2.0;
        assert!(engine.strictly_better(&t[1], &t[0], &ctx));
    }

    #[test]
    fn test_empty_candidates() {
        let t = table(&[]);
        let ctx = SchedulingContext::at_time(0.0);
        let engine = RuleEngine::new().with_rule(rules::ShortestBurst);
        assert!(engine.sort_indices(&[], &t, &ctx).is_empty());
        assert!(engine.select_best(&[], &t, &ctx).is_none());
    }

    #[test]
    fn test_justify_names_metric() {
        let t = table(&[("P2", 1.0, 2.0)]);
        let ctx = SchedulingContext::at_time(3.0);
        let engine = RuleEngine::new().with_rule(rules::HighestResponseRatio);
        let reason = engine.justify(&t[0], &ctx);
        assert!(reason.contains("response ratio = 2"), "{reason}");
    }

    #[test]
    fn test_evaluate_scores() {
        let t = table(&[("T1", 4.0, 3.0)]);
        let ctx = SchedulingContext::at_time(4.0);
        let engine = RuleEngine::new()
            .with_rule(rules::ShortestBurst)
            .with_tie_breaker(rules::EarliestArrival);

        let scores = engine.evaluate(&t[0], &ctx);
        assert_eq!(scores.len(), 2);
        assert!((scores[0] - 3.0).abs() < 1e-10);
        assert!((scores[1] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(1.25), "1.25");
        assert_eq!(format_value(f64::MAX), "none");
    }
}
