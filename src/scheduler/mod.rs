//! CPU scheduling simulation.
//!
//! Replays a set of processes through one dispatch policy on one or more
//! simulated cores and reports the resulting Gantt timeline, metrics,
//! per-tick snapshots and (optionally) decision logs.
//!
//! # Algorithm
//!
//! A single discrete-event loop ([`run_policy`]) drives every policy. The
//! policy owns its ready structures and answers "who runs next on this
//! core"; the loop owns time, cores, context switches and the timeline.
//! Runs are deterministic: the same input always yields the same output.
//!
//! # Policies
//!
//! FCFS, SJF, SRTF, RR, PRIORITY, PRIORITY_P, HRRN, LJF, LRTF, MQ, MLFQ,
//! FAIR_SHARE, LOTTERY and RMS, each with a `run_*` entry point and an
//! [`Algorithm`] variant for [`simulate`].
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5
//! - Arpaci-Dusseau (2018), "Operating Systems: Three Easy Pieces", Ch. 7-9

mod algorithm;
mod decision;
mod metrics;
pub mod policies;
mod result;
mod simulator;
mod snapshot;
mod state;
mod timeline;


pub use algorithm::{
    run_fair_share, run_fcfs, run_hrrn, run_ljf, run_lottery, run_lrtf, run_mlfq,
    run_multilevel_queue, run_priority, run_priority_preemptive, run_rate_monotonic,
    run_round_robin, run_round_robin_with_quantum, run_sjf, run_srtf, simulate,
    simulate_checked, Algorithm,
};
pub use decision::{DecisionLog, DecisionRecorder};
pub use metrics::{EnergyMetrics, Metrics, Summary};
pub use result::SimulationResult;
pub use simulator::{run_policy, DispatchPolicy, SelectRequest, Selection, MIN_CLOCK_ADVANCE};
pub use snapshot::{generate_snapshots, Snapshot};
pub use state::{ProcessState, ProcessTable, SliceEnd};
pub use timeline::Timeline;
