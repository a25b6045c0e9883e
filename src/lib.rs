//! Deterministic CPU-scheduling simulation engine.
//!
//! Replays a list of processes through a classic dispatch policy on one or
//! more simulated cores and reports a Gantt timeline, per-process and
//! aggregate metrics, per-tick snapshots and optional decision logs.
//!
//! # Modules
//!
//! - **`models`**: Input and output records: `Process`, `GanttEvent`,
//!   `SimulationOptions`, `EnergyConfig`
//! - **`dispatching`**: Priority rules and the rule engine that ranks ready
//!   processes for the comparator-driven policies
//! - **`scheduler`**: The core allocation loop, the policies, metrics,
//!   snapshots and the `run_*` entry points
//! - **`validation`**: Input integrity checks (duplicate or reserved pids,
//!   bad numbers, unusable options)
//!
//! # Example
//!
//! ```
//! use u_cpusched::models::{Process, SimulationOptions};
//! use u_cpusched::scheduler::run_srtf;
//!
//! let processes = vec![
//!     Process::new("P1", 0.0, 10.0),
//!     Process::new("P2", 2.0, 2.0),
//! ];
//! let result = run_srtf(&processes, &SimulationOptions::default());
//!
//! assert_eq!(result.metrics.completion["P2"], 4.0);
//! assert_eq!(result.metrics.completion["P1"], 12.0);
//! ```
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts"
//! - Tanenbaum & Bos (2014), "Modern Operating Systems", Ch. 2.4

pub mod dispatching;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::SimulationError;
pub use scheduler::{simulate, simulate_checked, Algorithm, SimulationResult};
