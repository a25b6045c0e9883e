//! Dispatch policies plugged into the core allocation loop.
//!
//! | Policy | Type | Preemption | Queues |
//! |--------|------|------------|--------|
//! | FCFS, SJF, PRIORITY, HRRN, LJF | [`RankedPolicy`] | none | single |
//! | SRTF, PRIORITY_P | [`RankedPolicy`] | at arrivals | single |
//! | LRTF | [`RankedPolicy`] | at arrivals + every tick | single |
//! | RMS | [`RankedPolicy`] | every tick | single |
//! | RR | [`RoundRobinPolicy`] | quantum expiry | FIFO |
//! | MQ | [`MultilevelQueuePolicy`] | high queue preempts low | 2 fixed |
//! | MLFQ | [`MlfqPolicy`] | higher queue preempts lower | 3 feedback |
//! | FAIR_SHARE | [`FairSharePolicy`] | round length | per group |
//! | LOTTERY | [`LotteryPolicy`] | every tick | ticket-weighted |

mod fair_share;
mod lottery;
mod multilevel;
mod ranked;
mod round_robin;

pub use fair_share::FairSharePolicy;
pub use lottery::{Lcg, LotteryPolicy, LOTTERY_TICK};
pub use multilevel::{MlfqPolicy, MultilevelQueuePolicy, HIGH_QUEUE_PRIORITY, MLFQ_LEVELS};
pub use ranked::RankedPolicy;
pub use round_robin::RoundRobinPolicy;
