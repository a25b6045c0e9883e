//! Lottery scheduling.
//!
//! Every tick is a fresh draw: a ticket number is drawn uniformly from the
//! total tickets held by ready processes and the holder runs one tick.
//!
//! The generator is a 64-bit linear congruential generator owned by the
//! policy instance and seeded from `random_seed`, so identical inputs give
//! identical schedules. It is meant for reproducible replays, not for
//! statistical quality.
//!
//! # Reference
//! Waldspurger & Weihl (1994), "Lottery Scheduling: Flexible
//! Proportional-Share Resource Management"

use rand::{Rng, RngCore};

use crate::scheduler::simulator::{DispatchPolicy, SelectRequest, Selection};
use crate::scheduler::state::{ProcessTable, SliceEnd};

/// Run length granted per draw.
pub const LOTTERY_TICK: f64 = 1.0;

/// Seeded linear congruential generator (Knuth MMIX constants).
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const MULTIPLIER: u64 = 6_364_136_223_846_793_005;
    const INCREMENT: u64 = 1_442_695_040_888_963_407;

    /// Creates a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn step(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        // Low bits of an LCG are weak; use the high half.
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.next_u32());
        let lo = u64::from(self.next_u32());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

/// Ticket-weighted lottery policy.
#[derive(Debug, Clone)]
pub struct LotteryPolicy {
    rng: Lcg,
    /// Ready set in input order, so draws do not depend on requeue order.
    ready: Vec<usize>,
}

impl LotteryPolicy {
    /// Creates a policy with its own generator.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Lcg::new(seed),
            ready: Vec::new(),
        }
    }

    fn insert(&mut self, index: usize) {
        let pos = self.ready.partition_point(|&i| i < index);
        self.ready.insert(pos, index);
    }
}

impl DispatchPolicy for LotteryPolicy {
    fn name(&self) -> &'static str {
        "LOTTERY"
    }

    fn admit(&mut self, index: usize, _table: &ProcessTable, _now: f64) {
        self.insert(index);
    }

    fn requeue(&mut self, index: usize, _reason: SliceEnd, _table: &ProcessTable, _now: f64) {
        self.insert(index);
    }

    fn ready(&self) -> Vec<usize> {
        self.ready.clone()
    }

    fn select(&mut self, request: &SelectRequest<'_>) -> Option<Selection> {
        let table = request.table;
        if self.ready.is_empty() {
            return None;
        }

        let total: u64 = self
            .ready
            .iter()
            .map(|&i| u64::from(table[i].tickets))
            .sum();
        let draw = self.rng.random_range(0..total);

        let mut cumulative = 0u64;
        let mut pos = self.ready.len() - 1;
        for (p, &i) in self.ready.iter().enumerate() {
            cumulative += u64::from(table[i].tickets);
            if draw < cumulative {
                pos = p;
                break;
            }
        }
        let index = self.ready.remove(pos);

        let reason = format!(
            "Lottery: drew ticket {draw} of {total}; {} holds {}",
            table.pid(index),
            table[index].tickets
        );
        Some(Selection::new(index, reason))
    }

    fn quantum(&self, _index: usize, _table: &ProcessTable) -> Option<f64> {
        Some(LOTTERY_TICK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Process;

    #[test]
    fn test_lcg_is_reproducible() {
        let mut a = Lcg::new(7);
        let mut b = Lcg::new(7);
        let xs: Vec<u64> = (0..8).map(|_| a.next_u64()).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.next_u64()).collect();
        assert_eq!(xs, ys);

        let mut c = Lcg::new(8);
        assert_ne!(xs[0], c.next_u64());
    }

    #[test]
    fn test_fill_bytes_partial_chunk() {
        let mut rng = Lcg::new(1);
        let mut buf = [0u8; 7];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_single_holder_always_wins() {
        let table = ProcessTable::new(&[Process::new("only", 0.0, 3.0).with_tickets(5)]);
        let mut lottery = LotteryPolicy::new(42);
        lottery.admit(0, &table, 0.0);
        let req = SelectRequest {
            now: 0.0,
            core_id: 0,
            incumbent: None,
            table: &table,
        };
        let sel = lottery.select(&req).unwrap();
        assert_eq!(sel.index, 0);
        assert!(sel.reason.contains("of 5"));
        assert!(lottery.select(&req).is_none());
    }

    #[test]
    fn test_ready_kept_in_input_order() {
        let table = ProcessTable::new(&[
            Process::new("a", 0.0, 1.0),
            Process::new("b", 0.0, 1.0),
            Process::new("c", 0.0, 1.0),
        ]);
        let mut lottery = LotteryPolicy::new(1);
        lottery.admit(2, &table, 0.0);
        lottery.admit(0, &table, 0.0);
        lottery.requeue(1, SliceEnd::QuantumExpired, &table, 1.0);
        assert_eq!(lottery.ready(), vec![0, 1, 2]);
    }
}
