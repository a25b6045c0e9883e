//! Core allocation loop.
//!
//! One discrete-event loop serves every policy. Per iteration:
//!
//! 1. Admit processes whose arrival ≤ now.
//! 2. Retire slices that ended: record completions, hand unfinished
//!    processes back to the policy (quantum expiry or checkpoint).
//! 3. Ask the policy for a process for every free core, emitting a `CS`
//!    interval first when the core switches between two processes. Idle
//!    cores pick first; only then is each checkpointed process challenged,
//!    weakest first, on its own core.
//! 4. Advance to the next interesting time: earliest slice end or next
//!    arrival. Idle cores get `IDLE` up to that time.
//!
//! A slice lasts until completion, quantum expiry, or (for preemptive
//! policies) the next arrival or re-check interval, whichever is first.
//! At a checkpoint the running process stays the core's *incumbent*; the
//! policy keeps it unless a ready process is strictly better. Processes
//! running on other cores are never candidates. An arrival during a
//! context switch ends the switch with a fresh decision instead of a
//! zero-length slice.
//!
//! # Termination
//! The clock strictly increases every iteration and every dispatch
//! consumes work, so the loop ends once all remaining work reaches 0.
//! If a policy ever stops selecting while work remains, the loop stops
//! with an error log instead of spinning.

use std::cmp::Ordering;
use std::fmt::Debug;

use log::{debug, error, trace, warn};

use super::decision::DecisionRecorder;
use super::result::SimulationResult;
use super::state::{
    CoreState, Incumbent, LastOccupant, ProcessTable, RunningSlice, SliceEnd, EPSILON,
};
use super::timeline::Timeline;
use crate::models::{EventPid, Process, SimulationOptions};

/// Clock advance used when no later event time is known.
pub const MIN_CLOCK_ADVANCE: f64 = 0.1;

/// Input to [`DispatchPolicy::select`].
#[derive(Debug, Clone, Copy)]
pub struct SelectRequest<'a> {
    /// Decision time.
    pub now: f64,
    /// Core asking for work.
    pub core_id: usize,
    /// Process that reached a checkpoint on this core, if any.
    pub incumbent: Option<usize>,
    /// Working process states.
    pub table: &'a ProcessTable,
}

/// A policy's choice.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Table index of the chosen process.
    pub index: usize,
    /// Justification for decision logs.
    pub reason: String,
}

impl Selection {
    /// Creates a selection.
    pub fn new(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index,
            reason: reason.into(),
        }
    }
}

/// Strategy plugged into the core allocation loop.
///
/// A policy owns its ready structure(s). The loop hands processes in via
/// [`admit`](Self::admit) and [`requeue`](Self::requeue) and takes them out
/// via [`select`](Self::select); a selected process is no longer ready.
pub trait DispatchPolicy: Debug {
    /// Policy name (e.g., "SRTF").
    fn name(&self) -> &'static str;

    /// A process arrived.
    fn admit(&mut self, index: usize, table: &ProcessTable, now: f64);

    /// An unfinished process left its core.
    fn requeue(&mut self, index: usize, reason: SliceEnd, table: &ProcessTable, now: f64);

    /// Ready processes in the policy's queue order.
    fn ready(&self) -> Vec<usize>;

    /// Removes and returns the next process for a core, if any is ready.
    fn select(&mut self, request: &SelectRequest<'_>) -> Option<Selection>;

    /// Maximum contiguous run for `index` before it is requeued.
    fn quantum(&self, _index: usize, _table: &ProcessTable) -> Option<f64> {
        None
    }

    /// Whether slices stop at every arrival so the policy can preempt.
    fn preemptive(&self) -> bool {
        false
    }

    /// Re-check interval for preemptive policies whose ranking drifts
    /// while a process runs.
    fn checkpoint_interval(&self) -> Option<f64> {
        None
    }

    /// Orders two running processes by their claim on a core. `Greater`
    /// means `a` is the weaker one and is challenged first at a shared
    /// checkpoint.
    fn compare_running(&self, _a: usize, _b: usize, _table: &ProcessTable, _now: f64) -> Ordering {
        Ordering::Equal
    }

    /// Called after `index` is granted `duration` of CPU.
    fn on_run(&mut self, _index: usize, _duration: f64, _table: &ProcessTable) {}
}

/// Runs `policy` over `processes` and assembles the full result.
pub fn run_policy<P: DispatchPolicy>(
    policy: P,
    processes: &[Process],
    options: &SimulationOptions,
) -> SimulationResult {
    let options = options.normalized();
    let mut simulator = Simulator::new(policy, processes, &options);
    simulator.run();
    let Simulator {
        timeline, recorder, ..
    } = simulator;
    let (logs, step_logs) = recorder.into_parts();
    SimulationResult::assemble(timeline.into_events(), processes, &options, logs, step_logs)
}

/// Working state of one run.
#[derive(Debug)]
struct Simulator<P: DispatchPolicy> {
    policy: P,
    table: ProcessTable,
    cores: Vec<CoreState>,
    timeline: Timeline,
    recorder: DecisionRecorder,
    /// Table indices sorted by arrival.
    arrivals: Vec<usize>,
    next_arrival: usize,
    now: f64,
    finished: usize,
    overhead: f64,
}

impl<P: DispatchPolicy> Simulator<P> {
    fn new(policy: P, processes: &[Process], options: &SimulationOptions) -> Self {
        let table = ProcessTable::new(processes);
        let arrivals = table.arrival_order();
        Self {
            policy,
            table,
            cores: (0..options.core_count).map(CoreState::new).collect(),
            timeline: Timeline::new(options.core_count),
            recorder: DecisionRecorder::new(options.enable_logging),
            arrivals,
            next_arrival: 0,
            now: 0.0,
            finished: 0,
            overhead: options.context_switch_overhead,
        }
    }

    fn run(&mut self) {
        let total = self.table.len();
        debug!(
            "{}: simulating {} processes on {} cores",
            self.policy.name(),
            total,
            self.cores.len()
        );

        loop {
            self.admit_arrivals();
            self.retire_slices();
            if self.finished == total {
                break;
            }
            self.dispatch_free_cores();

            let Some(next) = self.next_event_time() else {
                error!(
                    "{}: {} processes left but nothing running or arriving at t={}",
                    self.policy.name(),
                    total - self.finished,
                    self.now
                );
                break;
            };
            self.fill_idle(next);

            if next > self.now {
                trace!("clock {} -> {}", self.now, next);
                self.now = next;
            } else {
                warn!(
                    "{}: no clock progress at t={}, forcing +{}",
                    self.policy.name(),
                    self.now,
                    MIN_CLOCK_ADVANCE
                );
                self.now += MIN_CLOCK_ADVANCE;
            }
        }

        debug!("{}: finished at t={}", self.policy.name(), self.now);
    }

    fn admit_arrivals(&mut self) {
        while let Some(&index) = self.arrivals.get(self.next_arrival) {
            if self.table[index].arrival > self.now + EPSILON {
                break;
            }
            trace!("t={}: {} arrives", self.now, self.table.pid(index));
            self.policy.admit(index, &self.table, self.now);
            self.next_arrival += 1;
        }
    }

    fn retire_slices(&mut self) {
        for core in &mut self.cores {
            let Some(slice) = core.running else {
                continue;
            };
            if slice.end > self.now + EPSILON {
                continue;
            }
            core.running = None;

            let process = &mut self.table[slice.index];
            if process.is_finished() {
                process.remaining = 0.0;
                self.finished += 1;
                core.quantum_used = 0.0;
                debug!("t={}: {} completes on core {}", slice.end, process.pid, core.id);
                self.recorder.completion(slice.end, core.id, &process.pid);
            } else if slice.ending == SliceEnd::Checkpoint {
                // Requeued right before its own core decides.
                core.incumbent = Some(Incumbent {
                    index: slice.index,
                    ran: slice.ran,
                });
            } else {
                self.policy
                    .requeue(slice.index, SliceEnd::QuantumExpired, &self.table, self.now);
                core.quantum_used = 0.0;
            }
        }
    }

    fn dispatch_free_cores(&mut self) {
        self.dispatch_idle_cores();
        self.challenge_incumbents();
        // A displaced process may fit a core that found nothing earlier.
        self.dispatch_idle_cores();
    }

    fn dispatch_idle_cores(&mut self) {
        for c in 0..self.cores.len() {
            let core = &self.cores[c];
            if core.running.is_none() && core.incumbent.is_none() {
                self.decide(c, None);
            }
        }
    }

    fn challenge_incumbents(&mut self) {
        let mut order: Vec<(usize, usize)> = self
            .cores
            .iter()
            .filter_map(|core| core.incumbent.map(|inc| (core.id, inc.index)))
            .collect();
        order.sort_by(|&(c1, a), &(c2, b)| {
            self.policy
                .compare_running(b, a, &self.table, self.now)
                .then(c1.cmp(&c2))
        });

        for (c, _) in order {
            let Some(incumbent) = self.cores[c].incumbent.take() else {
                continue;
            };
            self.policy
                .requeue(incumbent.index, SliceEnd::Checkpoint, &self.table, self.now);
            self.decide(c, Some(incumbent));
        }
    }

    fn decide(&mut self, c: usize, incumbent: Option<Incumbent>) {
        let queue_state = if self.recorder.is_enabled() {
            self.table.pids(self.policy.ready())
        } else {
            Vec::new()
        };

        let request = SelectRequest {
            now: self.now,
            core_id: c,
            incumbent: incumbent.map(|inc| inc.index),
            table: &self.table,
        };
        let Some(selection) = self.policy.select(&request) else {
            return;
        };

        if request.incumbent == Some(selection.index) {
            self.start_slice(c, selection.index);
            return;
        }

        let pid = self.table.pid(selection.index).to_string();
        match incumbent {
            Some(Incumbent { index, ran: true }) => {
                debug!(
                    "t={}: {} preempts {} on core {}",
                    self.now,
                    pid,
                    self.table.pid(index),
                    c
                );
                self.recorder
                    .preemption(self.now, c, self.table.pid(index), &pid);
            }
            Some(Incumbent { index, ran: false }) => {
                debug!(
                    "t={}: switch to {} redirected to {} on core {}",
                    self.now,
                    self.table.pid(index),
                    pid,
                    c
                );
                self.recorder
                    .redirect(self.now, c, self.table.pid(index), &pid);
            }
            None => {}
        }
        debug!(
            "t={}: {} dispatches {} on core {} ({})",
            self.now,
            self.policy.name(),
            pid,
            c,
            selection.reason
        );
        self.recorder
            .dispatch(self.now, c, &pid, selection.reason, queue_state);
        self.cores[c].quantum_used = 0.0;
        self.start_slice(c, selection.index);
    }

    fn start_slice(&mut self, c: usize, index: usize) {
        let mut start = self.now;

        if self.overhead > 0.0 {
            if let Some(prev) = self.cores[c].last_process() {
                if prev != index {
                    self.timeline
                        .push(EventPid::ContextSwitch, start, start + self.overhead, c);
                    self.recorder.context_switch(
                        start,
                        c,
                        self.table.pid(prev),
                        self.table.pid(index),
                    );
                    start += self.overhead;
                }
            }
        }

        let (len, ending) = self.slice_length(c, index, start);
        let end = start + len;

        let process = &mut self.table[index];
        process.remaining -= len;
        if process.remaining <= EPSILON {
            process.remaining = 0.0;
        }
        process.last_core = Some(c);
        let pid = EventPid::Process(process.pid.clone());

        self.policy.on_run(index, len, &self.table);
        self.timeline.push(pid, start, end, c);

        let core = &mut self.cores[c];
        core.running = Some(RunningSlice {
            index,
            end,
            ending,
            ran: len > EPSILON,
        });
        core.quantum_used += len;
        core.last = LastOccupant::Process(index);
    }

    /// Length and end reason of a slice for `index` starting at `start`.
    fn slice_length(&self, c: usize, index: usize, start: f64) -> (f64, SliceEnd) {
        let mut len = self.table[index].remaining;
        let mut ending = SliceEnd::Completion;

        if let Some(quantum) = self.policy.quantum(index, &self.table) {
            let mut left = quantum - self.cores[c].quantum_used;
            if left <= EPSILON {
                left = quantum;
            }
            if left < len - EPSILON {
                len = left;
                ending = SliceEnd::QuantumExpired;
            }
        }

        if self.policy.preemptive() {
            // An arrival during a context switch leaves a zero-length slice;
            // the core decides again when the switch ends.
            if let Some(&next) = self.arrivals.get(self.next_arrival) {
                let bound = (self.table[next].arrival - start).max(0.0);
                if bound < len - EPSILON {
                    len = bound;
                    ending = SliceEnd::Checkpoint;
                }
            }
            if let Some(interval) = self.policy.checkpoint_interval() {
                if interval < len - EPSILON {
                    len = interval;
                    ending = SliceEnd::Checkpoint;
                }
            }
        }

        (len, ending)
    }

    fn next_event_time(&self) -> Option<f64> {
        let slice_end = self
            .cores
            .iter()
            .filter_map(|c| c.running.map(|s| s.end))
            .min_by(f64::total_cmp);
        let arrival = self
            .arrivals
            .get(self.next_arrival)
            .map(|&i| self.table[i].arrival);

        match (slice_end, arrival) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn fill_idle(&mut self, until: f64) {
        if until - self.now <= EPSILON {
            return;
        }
        for core in &mut self.cores {
            if core.running.is_none() {
                self.timeline.push(EventPid::Idle, self.now, until, core.id);
                core.last = LastOccupant::Idle;
            }
        }
    }
}
