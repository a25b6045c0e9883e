//! Simulation options.

use serde::{Deserialize, Serialize};

/// Default round-robin / multilevel-queue quantum (ticks).
pub const DEFAULT_QUANTUM: f64 = 2.0;

/// Default number of simulated cores.
pub const DEFAULT_CORE_COUNT: usize = 1;

/// Default lottery seed.
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Default MLFQ quanta for queues 0 and 1. Queue 2 is unbounded.
pub const DEFAULT_MLFQ_QUANTA: [f64; 2] = [2.0, 4.0];

/// Power model for energy accounting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnergyConfig {
    /// Power drawn while a core executes a process (W).
    pub active_watts: f64,
    /// Power drawn while a core is idle (W).
    pub idle_watts: f64,
    /// Energy cost of one context switch (J).
    pub switch_joules: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            active_watts: 20.0,
            idle_watts: 5.0,
            switch_joules: 0.1,
        }
    }
}

/// Configuration shared by every policy.
///
/// Fields a policy does not use are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationOptions {
    /// Time slice for RR and the high MQ queue.
    pub quantum: f64,
    /// Duration of a context switch. 0 disables `CS` events.
    pub context_switch_overhead: f64,
    /// Record structured decision logs and step logs.
    pub enable_logging: bool,
    /// Number of simulated cores.
    pub core_count: usize,
    /// Prefer the process that last ran on a core among equal candidates.
    pub enable_affinity: bool,
    /// Fair-share round length. `None` uses `quantum`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fair_share_quantum: Option<f64>,
    /// Seed for the lottery generator.
    pub random_seed: u64,
    /// Quanta of MLFQ queues 0 and 1.
    pub mlfq_quanta: [f64; 2],
    /// Power model.
    pub energy_config: EnergyConfig,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            context_switch_overhead: 0.0,
            enable_logging: false,
            core_count: DEFAULT_CORE_COUNT,
            enable_affinity: false,
            fair_share_quantum: None,
            random_seed: DEFAULT_RANDOM_SEED,
            mlfq_quanta: DEFAULT_MLFQ_QUANTA,
            energy_config: EnergyConfig::default(),
        }
    }
}

/// Bare-number shorthand: a quantum with every other option defaulted.
impl From<f64> for SimulationOptions {
    fn from(quantum: f64) -> Self {
        Self::default().with_quantum(quantum)
    }
}

impl SimulationOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the quantum.
    pub fn with_quantum(mut self, quantum: f64) -> Self {
        self.quantum = quantum;
        self
    }

    /// Sets the context-switch overhead.
    pub fn with_context_switch_overhead(mut self, overhead: f64) -> Self {
        self.context_switch_overhead = overhead;
        self
    }

    /// Enables decision logging.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Sets the number of cores.
    pub fn with_core_count(mut self, cores: usize) -> Self {
        self.core_count = cores;
        self
    }

    /// Enables core affinity tie-breaking.
    pub fn with_affinity(mut self, enabled: bool) -> Self {
        self.enable_affinity = enabled;
        self
    }

    /// Sets the fair-share round length.
    pub fn with_fair_share_quantum(mut self, quantum: f64) -> Self {
        self.fair_share_quantum = Some(quantum);
        self
    }

    /// Sets the lottery seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Sets the MLFQ quanta for queues 0 and 1.
    pub fn with_mlfq_quanta(mut self, q0: f64, q1: f64) -> Self {
        self.mlfq_quanta = [q0, q1];
        self
    }

    /// Sets the power model.
    pub fn with_energy_config(mut self, config: EnergyConfig) -> Self {
        self.energy_config = config;
        self
    }

    /// Effective fair-share round length.
    pub fn effective_fair_share_quantum(&self) -> f64 {
        self.fair_share_quantum.unwrap_or(self.quantum)
    }

    /// Returns a copy safe to drive the simulation loop.
    ///
    /// Zero cores become one, unusable quanta fall back to their defaults and
    /// negative or non-finite overhead becomes zero.
    pub fn normalized(&self) -> Self {
        let quantum = positive_or(self.quantum, DEFAULT_QUANTUM);
        let fair_share_quantum = self.fair_share_quantum.map(|q| positive_or(q, quantum));
        let overhead = if self.context_switch_overhead.is_finite() {
            self.context_switch_overhead.max(0.0)
        } else {
            0.0
        };

        Self {
            quantum,
            context_switch_overhead: overhead,
            enable_logging: self.enable_logging,
            core_count: self.core_count.max(1),
            enable_affinity: self.enable_affinity,
            fair_share_quantum,
            random_seed: self.random_seed,
            mlfq_quanta: [
                positive_or(self.mlfq_quanta[0], DEFAULT_MLFQ_QUANTA[0]),
                positive_or(self.mlfq_quanta[1], DEFAULT_MLFQ_QUANTA[1]),
            ],
            energy_config: self.energy_config,
        }
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}
