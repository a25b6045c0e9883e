//! Round Robin.
//!
//! FIFO ready queue; a process runs at most one quantum and then goes to
//! the tail. New arrivals at the same instant are queued ahead of the
//! expired process.

use std::collections::VecDeque;

use crate::dispatching::format_value;
use crate::scheduler::simulator::{DispatchPolicy, SelectRequest, Selection};
use crate::scheduler::state::{ProcessTable, SliceEnd};

/// Round-robin policy with a fixed quantum.
#[derive(Debug, Clone)]
pub struct RoundRobinPolicy {
    quantum: f64,
    queue: VecDeque<usize>,
}

impl RoundRobinPolicy {
    /// Creates a policy with the given quantum.
    pub fn new(quantum: f64) -> Self {
        Self {
            quantum,
            queue: VecDeque::new(),
        }
    }
}

impl DispatchPolicy for RoundRobinPolicy {
    fn name(&self) -> &'static str {
        "RR"
    }

    fn admit(&mut self, index: usize, _table: &ProcessTable, _now: f64) {
        self.queue.push_back(index);
    }

    fn requeue(&mut self, index: usize, _reason: SliceEnd, _table: &ProcessTable, _now: f64) {
        self.queue.push_back(index);
    }

    fn ready(&self) -> Vec<usize> {
        self.queue.iter().copied().collect()
    }

    fn select(&mut self, request: &SelectRequest<'_>) -> Option<Selection> {
        let index = self.queue.pop_front()?;
        let reason = format!(
            "Round Robin: {} at head of queue, quantum = {}",
            request.table.pid(index),
            format_value(self.quantum)
        );
        Some(Selection::new(index, reason))
    }

    fn quantum(&self, _index: usize, _table: &ProcessTable) -> Option<f64> {
        Some(self.quantum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Process;

    #[test]
    fn test_fifo_with_requeue_to_tail() {
        let table =
            ProcessTable::new(&[Process::new("P1", 0.0, 4.0), Process::new("P2", 0.0, 3.0)]);
        let mut rr = RoundRobinPolicy::new(2.0);
        rr.admit(0, &table, 0.0);
        rr.admit(1, &table, 0.0);

        let req = SelectRequest {
            now: 0.0,
            core_id: 0,
            incumbent: None,
            table: &table,
        };
        assert_eq!(rr.select(&req).unwrap().index, 0);
        rr.requeue(0, SliceEnd::QuantumExpired, &table, 2.0);
        assert_eq!(rr.ready(), vec![1, 0]);
        assert_eq!(rr.quantum(0, &table), Some(2.0));
    }
}
