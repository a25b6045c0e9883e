//! Multilevel queue policies.
//!
//! - [`MultilevelQueuePolicy`]: two fixed queues. Priority-1 processes go
//!   to the high queue (round robin); everyone else to the low queue
//!   (FCFS). A low-queue process loses its core whenever the high queue
//!   has a waiting process.
//! - [`MlfqPolicy`]: three feedback queues. Every process enters queue 0;
//!   using up a queue's whole quantum demotes it one level. There is no
//!   promotion or aging. A process waiting in a higher queue preempts a
//!   running lower-queue process.
//!
//! # Reference
//! Corbató et al. (1962), "An Experimental Time-Sharing System"

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

use crate::dispatching::format_value;
use crate::models::SimulationOptions;
use crate::scheduler::simulator::{DispatchPolicy, SelectRequest, Selection};
use crate::scheduler::state::{ProcessTable, SliceEnd};

/// Priority value routed to the high MQ queue.
pub const HIGH_QUEUE_PRIORITY: i32 = 1;

/// Number of MLFQ levels.
pub const MLFQ_LEVELS: usize = 3;

/// Two-level fixed multilevel queue.
#[derive(Debug, Clone)]
pub struct MultilevelQueuePolicy {
    quantum: f64,
    high: VecDeque<usize>,
    /// Kept in FCFS order (arrival, then input position).
    low: Vec<usize>,
}

impl MultilevelQueuePolicy {
    /// Creates the policy; `quantum` applies to the high queue only.
    pub fn new(quantum: f64) -> Self {
        Self {
            quantum,
            high: VecDeque::new(),
            low: Vec::new(),
        }
    }

    fn is_high(table: &ProcessTable, index: usize) -> bool {
        table[index].priority == Some(HIGH_QUEUE_PRIORITY)
    }

    fn push_low(&mut self, index: usize, table: &ProcessTable) {
        let arrival = table[index].arrival;
        let pos = self.low.partition_point(|&i| {
            table[i]
                .arrival
                .total_cmp(&arrival)
                .then(i.cmp(&index))
                .is_lt()
        });
        self.low.insert(pos, index);
    }
}

impl DispatchPolicy for MultilevelQueuePolicy {
    fn name(&self) -> &'static str {
        "MQ"
    }

    fn admit(&mut self, index: usize, table: &ProcessTable, _now: f64) {
        if Self::is_high(table, index) {
            self.high.push_back(index);
        } else {
            self.push_low(index, table);
        }
    }

    fn requeue(&mut self, index: usize, reason: SliceEnd, table: &ProcessTable, _now: f64) {
        if !Self::is_high(table, index) {
            self.push_low(index, table);
        } else if reason == SliceEnd::Checkpoint {
            // Interrupted mid-quantum: resume first.
            self.high.push_front(index);
        } else {
            self.high.push_back(index);
        }
    }

    fn ready(&self) -> Vec<usize> {
        self.high.iter().chain(&self.low).copied().collect()
    }

    fn select(&mut self, request: &SelectRequest<'_>) -> Option<Selection> {
        let table = request.table;

        if let Some(inc) = request.incumbent {
            if Self::is_high(table, inc) {
                if let Some(pos) = self.high.iter().position(|&i| i == inc) {
                    self.high.remove(pos);
                    return Some(Selection::new(inc, "high queue: quantum continues"));
                }
            } else if self.high.is_empty() {
                if let Some(pos) = self.low.iter().position(|&i| i == inc) {
                    self.low.remove(pos);
                    return Some(Selection::new(inc, "low queue: continues (FCFS)"));
                }
            }
        }

        if let Some(index) = self.high.pop_front() {
            let reason = format!(
                "high queue (priority {HIGH_QUEUE_PRIORITY}, RR): {} at head, quantum = {}",
                table.pid(index),
                format_value(self.quantum)
            );
            return Some(Selection::new(index, reason));
        }

        if self.low.is_empty() {
            return None;
        }
        let index = self.low.remove(0);
        let reason = format!(
            "low queue (FCFS): {} arrival = {}",
            table.pid(index),
            format_value(table[index].arrival)
        );
        Some(Selection::new(index, reason))
    }

    fn compare_running(&self, a: usize, b: usize, table: &ProcessTable, _now: f64) -> Ordering {
        Self::is_high(table, b).cmp(&Self::is_high(table, a))
    }

    fn quantum(&self, index: usize, table: &ProcessTable) -> Option<f64> {
        Self::is_high(table, index).then_some(self.quantum)
    }

    fn preemptive(&self) -> bool {
        true
    }
}

/// Three-level feedback queue with demotion only.
#[derive(Debug, Clone)]
pub struct MlfqPolicy {
    /// Quantum per level; `None` = run to completion.
    quanta: [Option<f64>; MLFQ_LEVELS],
    queues: [VecDeque<usize>; MLFQ_LEVELS],
    /// Current level per table index.
    levels: HashMap<usize, usize>,
}

impl MlfqPolicy {
    /// Creates the policy from `options.mlfq_quanta` (`[q0, q1, ∞]`).
    pub fn new(options: &SimulationOptions) -> Self {
        Self {
            quanta: [Some(options.mlfq_quanta[0]), Some(options.mlfq_quanta[1]), None],
            queues: Default::default(),
            levels: HashMap::new(),
        }
    }

    /// Current level of a process (0 = highest).
    pub fn level(&self, index: usize) -> usize {
        self.levels.get(&index).copied().unwrap_or(0)
    }

    fn top_level(&self) -> Option<usize> {
        (0..MLFQ_LEVELS).find(|&l| !self.queues[l].is_empty())
    }

    fn quantum_label(&self, level: usize) -> String {
        match self.quanta[level] {
            Some(q) => format!("quantum = {}", format_value(q)),
            None => "runs to completion".to_string(),
        }
    }
}

impl DispatchPolicy for MlfqPolicy {
    fn name(&self) -> &'static str {
        "MLFQ"
    }

    fn admit(&mut self, index: usize, _table: &ProcessTable, _now: f64) {
        self.levels.insert(index, 0);
        self.queues[0].push_back(index);
    }

    fn requeue(&mut self, index: usize, reason: SliceEnd, _table: &ProcessTable, _now: f64) {
        let level = self.level(index);
        match reason {
            SliceEnd::QuantumExpired => {
                let lower = (level + 1).min(MLFQ_LEVELS - 1);
                self.levels.insert(index, lower);
                self.queues[lower].push_back(index);
            }
            _ => self.queues[level].push_front(index),
        }
    }

    fn ready(&self) -> Vec<usize> {
        self.queues.iter().flatten().copied().collect()
    }

    fn select(&mut self, request: &SelectRequest<'_>) -> Option<Selection> {
        let top = self.top_level()?;

        if let Some(inc) = request.incumbent {
            let level = self.level(inc);
            if level == top {
                if let Some(pos) = self.queues[level].iter().position(|&i| i == inc) {
                    self.queues[level].remove(pos);
                    return Some(Selection::new(inc, format!("queue {level}: continues")));
                }
            }
        }

        let index = self.queues[top].pop_front()?;
        let reason = format!(
            "queue {top} is the highest non-empty queue: {} at head, {}",
            request.table.pid(index),
            self.quantum_label(top)
        );
        Some(Selection::new(index, reason))
    }

    fn compare_running(&self, a: usize, b: usize, _table: &ProcessTable, _now: f64) -> Ordering {
        self.level(a).cmp(&self.level(b))
    }

    fn quantum(&self, index: usize, _table: &ProcessTable) -> Option<f64> {
        self.quanta[self.level(index)]
    }

    fn preemptive(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Process;

    fn request(table: &ProcessTable, incumbent: Option<usize>) -> SelectRequest<'_> {
        SelectRequest {
            now: 0.0,
            core_id: 0,
            incumbent,
            table,
        }
    }

    #[test]
    fn test_mq_high_queue_first() {
        let table = ProcessTable::new(&[
            Process::new("low", 0.0, 5.0).with_priority(2),
            Process::new("high", 1.0, 3.0).with_priority(1),
        ]);
        let mut mq = MultilevelQueuePolicy::new(2.0);
        mq.admit(0, &table, 0.0);
        assert_eq!(mq.select(&request(&table, None)).unwrap().index, 0);
        mq.admit(1, &table, 1.0);

        // Running low-queue incumbent is displaced by the waiting high process
        mq.requeue(0, SliceEnd::Checkpoint, &table, 1.0);
        let sel = mq.select(&request(&table, Some(0))).unwrap();
        assert_eq!(table.pid(sel.index), "high");
        assert_eq!(mq.quantum(1, &table), Some(2.0));
        assert_eq!(mq.quantum(0, &table), None);
    }

    #[test]
    fn test_mq_low_incumbent_continues_without_high() {
        let table = ProcessTable::new(&[
            Process::new("a", 0.0, 5.0),
            Process::new("b", 0.0, 5.0),
        ]);
        let mut mq = MultilevelQueuePolicy::new(2.0);
        mq.admit(1, &table, 0.0);
        assert_eq!(mq.select(&request(&table, None)).unwrap().index, 1);

        // "a" ranks first in FCFS order, but "b" already holds the core
        mq.admit(0, &table, 0.0);
        mq.requeue(1, SliceEnd::Checkpoint, &table, 1.0);
        assert_eq!(mq.select(&request(&table, Some(1))).unwrap().index, 1);
        assert_eq!(mq.ready(), vec![0]);
    }

    #[test]
    fn test_mq_ready_lists_low_queue_in_arrival_order() {
        let table = ProcessTable::new(&[
            Process::new("late", 4.0, 2.0),
            Process::new("early", 1.0, 2.0),
            Process::new("high", 2.0, 2.0).with_priority(1),
            Process::new("first", 0.0, 2.0).with_priority(3),
        ]);
        let mut mq = MultilevelQueuePolicy::new(2.0);
        for i in 0..table.len() {
            mq.admit(i, &table, 4.0);
        }

        assert_eq!(table.pids(mq.ready()), vec!["high", "first", "early", "late"]);
        assert_eq!(mq.select(&request(&table, None)).unwrap().index, 2);
        let sel = mq.select(&request(&table, None)).unwrap();
        assert_eq!(table.pid(sel.index), "first");
        assert_eq!(table.pids(mq.ready()), vec!["early", "late"]);
    }

    #[test]
    fn test_running_order_ranks_by_queue() {
        let table = ProcessTable::new(&[
            Process::new("low", 0.0, 5.0),
            Process::new("high", 0.0, 5.0).with_priority(1),
        ]);
        let mq = MultilevelQueuePolicy::new(2.0);
        assert_eq!(mq.compare_running(0, 1, &table, 0.0), Ordering::Greater);

        let mut mlfq = MlfqPolicy::new(&SimulationOptions::default());
        mlfq.admit(0, &table, 0.0);
        mlfq.admit(1, &table, 0.0);
        mlfq.select(&request(&table, None));
        mlfq.requeue(0, SliceEnd::QuantumExpired, &table, 2.0);
        assert_eq!(mlfq.compare_running(0, 1, &table, 2.0), Ordering::Greater);
    }

    #[test]
    fn test_mlfq_demotion() {
        let table = ProcessTable::new(&[Process::new("P", 0.0, 20.0)]);
        let mut mlfq = MlfqPolicy::new(&SimulationOptions::default());
        mlfq.admit(0, &table, 0.0);
        assert_eq!(mlfq.quantum(0, &table), Some(2.0));

        assert_eq!(mlfq.select(&request(&table, None)).unwrap().index, 0);
        mlfq.requeue(0, SliceEnd::QuantumExpired, &table, 2.0);
        assert_eq!(mlfq.level(0), 1);
        assert_eq!(mlfq.quantum(0, &table), Some(4.0));

        assert_eq!(mlfq.select(&request(&table, None)).unwrap().index, 0);
        mlfq.requeue(0, SliceEnd::QuantumExpired, &table, 6.0);
        assert_eq!(mlfq.level(0), 2);
        assert_eq!(mlfq.quantum(0, &table), None);

        // Bottom queue is sticky
        mlfq.select(&request(&table, None));
        mlfq.requeue(0, SliceEnd::QuantumExpired, &table, 7.0);
        assert_eq!(mlfq.level(0), 2);
    }

    #[test]
    fn test_mlfq_higher_queue_preempts() {
        let table =
            ProcessTable::new(&[Process::new("old", 0.0, 10.0), Process::new("new", 3.0, 2.0)]);
        let mut mlfq = MlfqPolicy::new(&SimulationOptions::default());
        mlfq.admit(0, &table, 0.0);
        mlfq.select(&request(&table, None));
        mlfq.requeue(0, SliceEnd::QuantumExpired, &table, 2.0);
        mlfq.select(&request(&table, None));

        // "old" at level 1 reaches the arrival checkpoint of "new"
        mlfq.admit(1, &table, 3.0);
        mlfq.requeue(0, SliceEnd::Checkpoint, &table, 3.0);
        let sel = mlfq.select(&request(&table, Some(0))).unwrap();
        assert_eq!(table.pid(sel.index), "new");
        assert_eq!(mlfq.ready(), vec![0]);
    }
}
