//! Per-run working state.
//!
//! A run never touches the caller's [`Process`] slice: it builds a
//! [`ProcessTable`] arena indexed by input position and mutates that.
//! Core states are owned by the simulator and die with the run.

use std::ops::{Index, IndexMut};

use crate::models::Process;

/// Tolerance for time comparisons.
pub(crate) const EPSILON: f64 = 1e-9;

/// Working copy of a process inside one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessState {
    /// Position in the caller's input (final tie-breaker).
    pub index: usize,
    /// Process identifier.
    pub pid: String,
    /// Arrival time.
    pub arrival: f64,
    /// Total CPU demand.
    pub burst: f64,
    /// Static priority (lower = more important).
    pub priority: Option<i32>,
    /// Lottery tickets (≥ 1).
    pub tickets: u32,
    /// Fair-share group.
    pub share_group: String,
    /// Fair-share weight (> 0).
    pub share_weight: f64,
    /// Rate-monotonic period (`period` or `burst`).
    pub period: f64,
    /// Work left. Reaches 0 exactly when the process completes.
    pub remaining: f64,
    /// Core the process last executed on.
    pub last_core: Option<usize>,
}

impl ProcessState {
    /// Derives the working state from an input record.
    pub fn from_process(index: usize, process: &Process) -> Self {
        Self {
            index,
            pid: process.pid.clone(),
            arrival: process.arrival,
            burst: process.burst,
            priority: process.priority,
            tickets: process.effective_tickets(),
            share_group: process.effective_share_group().to_string(),
            share_weight: process.effective_share_weight(),
            period: process.effective_period(),
            remaining: process.burst,
            last_core: None,
        }
    }

    /// CPU time received so far.
    #[inline]
    pub fn served(&self) -> f64 {
        self.burst - self.remaining
    }

    /// Time spent ready but not running, as of `now`.
    #[inline]
    pub fn waited(&self, now: f64) -> f64 {
        (now - self.arrival - self.served()).max(0.0)
    }

    /// Whether all work is done.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.remaining <= EPSILON
    }
}

/// Arena of working process states, indexed by input position.
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    processes: Vec<ProcessState>,
}

impl ProcessTable {
    /// Copies the input into a fresh arena.
    pub fn new(processes: &[Process]) -> Self {
        Self {
            processes: processes
                .iter()
                .enumerate()
                .map(|(i, p)| ProcessState::from_process(i, p))
                .collect(),
        }
    }

    /// Number of processes.
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Pid of the process at `index`.
    pub fn pid(&self, index: usize) -> &str {
        &self.processes[index].pid
    }

    /// Pids of the given indices, in the given order.
    pub fn pids(&self, indices: impl IntoIterator<Item = usize>) -> Vec<String> {
        indices
            .into_iter()
            .map(|i| self.processes[i].pid.clone())
            .collect()
    }

    /// Indices sorted by arrival, then input position.
    pub(crate) fn arrival_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.processes.len()).collect();
        order.sort_by(|&a, &b| {
            self.processes[a]
                .arrival
                .total_cmp(&self.processes[b].arrival)
                .then(a.cmp(&b))
        });
        order
    }
}

impl Index<usize> for ProcessTable {
    type Output = ProcessState;

    fn index(&self, index: usize) -> &ProcessState {
        &self.processes[index]
    }
}

impl IndexMut<usize> for ProcessTable {
    fn index_mut(&mut self, index: usize) -> &mut ProcessState {
        &mut self.processes[index]
    }
}

/// What occupied a core most recently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LastOccupant {
    /// Core has not run anything yet.
    Nothing,
    /// Core sat idle.
    Idle,
    /// Core ran the process at this index.
    Process(usize),
}

/// Why a slice stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceEnd {
    /// The process finished its burst.
    Completion,
    /// The policy's quantum ran out.
    QuantumExpired,
    /// A preemption checkpoint (next arrival or re-check interval).
    Checkpoint,
}

/// A slice currently executing on a core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RunningSlice {
    pub index: usize,
    pub end: f64,
    pub ending: SliceEnd,
    /// False when an arrival during the context switch left no time to run.
    pub ran: bool,
}

/// Process that reached a checkpoint on a core and waits for that core's
/// next decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Incumbent {
    pub index: usize,
    /// Whether it executed at all since the core switched to it.
    pub ran: bool,
}

/// State of one simulated core.
#[derive(Debug, Clone)]
pub(crate) struct CoreState {
    pub id: usize,
    pub last: LastOccupant,
    pub running: Option<RunningSlice>,
    /// Process that reached a checkpoint on this core and may keep it.
    pub incumbent: Option<Incumbent>,
    /// Quantum consumed by the current (possibly continued) dispatch.
    pub quantum_used: f64,
}

impl CoreState {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            last: LastOccupant::Nothing,
            running: None,
            incumbent: None,
            quantum_used: 0.0,
        }
    }

    /// Pid of the process last run here, if the core did not idle since.
    pub fn last_process(&self) -> Option<usize> {
        match self.last {
            LastOccupant::Process(i) => Some(i),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_copies_input() {
        let input = vec![
            Process::new("B", 3.0, 2.0),
            Process::new("A", 1.0, 4.0).with_tickets(5),
        ];
        let mut table = ProcessTable::new(&input);
        table[1].remaining = 1.0;

        assert_eq!(table.len(), 2);
        assert_eq!(table[1].tickets, 5);
        assert!((table[1].served() - 3.0).abs() < 1e-9);
        assert!((input[1].burst - 4.0).abs() < 1e-9);
        assert_eq!(table.arrival_order(), vec![1, 0]);
        assert_eq!(table.pids([0, 1]), vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn test_waited() {
        let mut p = ProcessState::from_process(0, &Process::new("P", 2.0, 5.0));
        assert!((p.waited(6.0) - 4.0).abs() < 1e-9);
        p.remaining = 3.0;
        assert!((p.waited(6.0) - 2.0).abs() < 1e-9);
        assert!(!p.is_finished());
    }

    #[test]
    fn test_core_last_process() {
        let mut core = CoreState::new(0);
        assert_eq!(core.last_process(), None);
        core.last = LastOccupant::Process(3);
        assert_eq!(core.last_process(), Some(3));
        core.last = LastOccupant::Idle;
        assert_eq!(core.last_process(), None);
    }
}
