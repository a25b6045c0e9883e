//! Fair-share scheduling.
//!
//! Processes are grouped by `share_group`. Each decision picks the group
//! with the lowest `served / weight` ratio among groups with ready work,
//! then the earliest-arriving ready member of that group. A round lasts
//! at most `fair_share_quantum`.
//!
//! # Reference
//! Kay & Lauder (1988), "A Fair Share Scheduler"

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::dispatching::format_value;
use crate::scheduler::simulator::{DispatchPolicy, SelectRequest, Selection};
use crate::scheduler::state::{ProcessTable, SliceEnd, EPSILON};

#[derive(Debug, Clone)]
struct GroupShare {
    name: String,
    /// Weight of the first member seen.
    weight: f64,
    served: f64,
}

impl GroupShare {
    fn ratio(&self) -> f64 {
        self.served / self.weight
    }
}

/// Weighted fair-share policy.
#[derive(Debug, Clone)]
pub struct FairSharePolicy {
    quantum: f64,
    ready: Vec<usize>,
    /// Groups in order of first appearance.
    groups: Vec<GroupShare>,
    group_by_name: HashMap<String, usize>,
    group_of: HashMap<usize, usize>,
}

impl FairSharePolicy {
    /// Creates a policy with the given round length.
    pub fn new(quantum: f64) -> Self {
        Self {
            quantum,
            ready: Vec::new(),
            groups: Vec::new(),
            group_by_name: HashMap::new(),
            group_of: HashMap::new(),
        }
    }

    /// CPU time served to a group so far.
    pub fn served(&self, group: &str) -> Option<f64> {
        self.group_by_name.get(group).map(|&g| self.groups[g].served)
    }

    fn group_for(&mut self, index: usize, table: &ProcessTable) -> usize {
        let process = &table[index];
        let next_id = self.groups.len();
        let gid = *self
            .group_by_name
            .entry(process.share_group.clone())
            .or_insert(next_id);
        if gid == next_id {
            self.groups.push(GroupShare {
                name: process.share_group.clone(),
                weight: process.share_weight,
                served: 0.0,
            });
        }
        self.group_of.insert(index, gid);
        gid
    }

    /// Group with ready work and the lowest served/weight ratio.
    fn neediest_group(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for &index in &self.ready {
            let gid = self.group_of[&index];
            best = match best {
                None => Some(gid),
                Some(b) => {
                    let diff = self.groups[gid].ratio() - self.groups[b].ratio();
                    let better = diff < -EPSILON || (diff.abs() <= EPSILON && gid < b);
                    Some(if better { gid } else { b })
                }
            };
        }
        best
    }
}

impl DispatchPolicy for FairSharePolicy {
    fn name(&self) -> &'static str {
        "FAIR_SHARE"
    }

    fn admit(&mut self, index: usize, table: &ProcessTable, _now: f64) {
        self.group_for(index, table);
        self.ready.push(index);
    }

    fn requeue(&mut self, index: usize, _reason: SliceEnd, _table: &ProcessTable, _now: f64) {
        self.ready.push(index);
    }

    fn ready(&self) -> Vec<usize> {
        self.ready.clone()
    }

    fn select(&mut self, request: &SelectRequest<'_>) -> Option<Selection> {
        let table = request.table;
        let gid = self.neediest_group()?;

        let index = self
            .ready
            .iter()
            .copied()
            .filter(|i| self.group_of[i] == gid)
            .min_by(|&a, &b| {
                table[a]
                    .arrival
                    .partial_cmp(&table[b].arrival)
                    .unwrap_or(Ordering::Equal)
                    .then(a.cmp(&b))
            })?;
        self.ready.retain(|&i| i != index);

        let group = &self.groups[gid];
        let reason = format!(
            "Fair Share: group {} served {} / weight {} = {} is lowest; {} arrived first",
            group.name,
            format_value(group.served),
            format_value(group.weight),
            format_value(group.ratio()),
            table.pid(index)
        );
        Some(Selection::new(index, reason))
    }

    fn quantum(&self, _index: usize, _table: &ProcessTable) -> Option<f64> {
        Some(self.quantum)
    }

    fn on_run(&mut self, index: usize, duration: f64, _table: &ProcessTable) {
        if let Some(&gid) = self.group_of.get(&index) {
            self.groups[gid].served += duration;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Process;

    #[test]
    fn test_lowest_ratio_group_wins() {
        let table = ProcessTable::new(&[
            Process::new("a1", 0.0, 10.0).with_share_group("A").with_share_weight(2.0),
            Process::new("b1", 0.0, 10.0).with_share_group("B"),
        ]);
        let mut fs = FairSharePolicy::new(2.0);
        fs.admit(0, &table, 0.0);
        fs.admit(1, &table, 0.0);
        let req = SelectRequest {
            now: 0.0,
            core_id: 0,
            incumbent: None,
            table: &table,
        };

        // Both at 0 → tie → first-seen group A
        let first = fs.select(&req).unwrap();
        assert_eq!(first.index, 0);
        fs.on_run(0, 2.0, &table);
        fs.requeue(0, SliceEnd::QuantumExpired, &table, 2.0);

        // A: 2/2 = 1, B: 0/1 = 0 → B
        assert_eq!(fs.select(&req).unwrap().index, 1);
        fs.on_run(1, 2.0, &table);
        fs.requeue(1, SliceEnd::QuantumExpired, &table, 4.0);

        // A: 1, B: 2 → A
        assert_eq!(fs.select(&req).unwrap().index, 0);
        assert_eq!(fs.served("B"), Some(2.0));
    }

    #[test]
    fn test_earliest_arrival_within_group() {
        let table = ProcessTable::new(&[
            Process::new("late", 3.0, 2.0),
            Process::new("early", 1.0, 2.0),
        ]);
        let mut fs = FairSharePolicy::new(2.0);
        fs.admit(0, &table, 3.0);
        fs.admit(1, &table, 3.0);
        let req = SelectRequest {
            now: 3.0,
            core_id: 0,
            incumbent: None,
            table: &table,
        };
        let sel = fs.select(&req).unwrap();
        assert_eq!(table.pid(sel.index), "early");
        assert!(sel.reason.contains("group default"));
    }
}
