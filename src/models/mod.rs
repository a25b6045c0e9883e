//! CPU-scheduling domain models.
//!
//! Input records, timeline events and simulation options. These types are
//! plain data; the simulation itself lives in [`crate::scheduler`].
//!
//! # Domain Mappings
//!
//! | u-cpusched | Operating system |
//! |------------|------------------|
//! | Process | Task / thread |
//! | GanttEvent | Run interval on a CPU |
//! | core | CPU |

mod event;
mod options;
mod process;

pub use event::{EventPid, GanttEvent, CONTEXT_SWITCH_PID, IDLE_PID};
pub use options::{
    EnergyConfig, SimulationOptions, DEFAULT_CORE_COUNT, DEFAULT_MLFQ_QUANTA, DEFAULT_QUANTUM,
    DEFAULT_RANDOM_SEED,
};
pub use process::{Process, DEFAULT_SHARE_GROUP, DEFAULT_SHARE_WEIGHT, DEFAULT_TICKETS};
