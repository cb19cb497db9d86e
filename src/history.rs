// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Append-only refill history with duplicate detection.
//!
//! Combines a [`DashMap`] for O(1) duplicate checking with a
//! lock-guarded chronological log and a per-machine index. Records are
//! never mutated or evicted; the log grows for the life of the process,
//! which is acceptable for an in-memory session store that resets on
//! restart.

use crate::RefillError;
use crate::base::{MachineId, RefillId};
use crate::refill::RefillTransaction;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe, append-only store of committed refill transactions.
#[derive(Debug, Default)]
pub struct RefillHistory {
    /// Records indexed by refill ID for O(1) duplicate detection.
    records: DashMap<RefillId, Arc<RefillTransaction>>,

    /// Refill IDs per machine, oldest first.
    by_machine: DashMap<MachineId, Vec<RefillId>>,

    /// Global chronological log, oldest first.
    log: RwLock<Vec<RefillId>>,
}

impl RefillHistory {
    /// Creates a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a committed refill.
    ///
    /// # Errors
    ///
    /// Returns [`RefillError::DuplicateRefill`] if a transaction with
    /// the same ID was already recorded.
    pub fn record(&self, transaction: Arc<RefillTransaction>) -> Result<(), RefillError> {
        let id = transaction.id;
        let machine_id = transaction.machine_id.clone();

        // Entry API for atomic check-and-insert.
        match self.records.entry(id) {
            Entry::Occupied(_) => Err(RefillError::DuplicateRefill),
            Entry::Vacant(entry) => {
                entry.insert(transaction);
                self.by_machine.entry(machine_id).or_default().push(id);
                self.log.write().push(id);
                Ok(())
            }
        }
    }

    /// All transactions for a machine, most recent first.
    pub fn for_machine(&self, machine_id: &MachineId) -> Vec<Arc<RefillTransaction>> {
        self.by_machine
            .get(machine_id)
            .map(|ids| {
                ids.iter()
                    .rev()
                    .filter_map(|id| self.records.get(id).map(|r| Arc::clone(&r)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every recorded transaction across all machines, most recent first.
    pub fn all(&self) -> Vec<Arc<RefillTransaction>> {
        self.log
            .read()
            .iter()
            .rev()
            .filter_map(|id| self.records.get(id).map(|r| Arc::clone(&r)))
            .collect()
    }

    /// Looks up a single transaction by ID.
    pub fn get(&self, id: &RefillId) -> Option<Arc<RefillTransaction>> {
        self.records.get(id).map(|r| Arc::clone(&r))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refill::DeliveryDetails;
    use chrono::Utc;

    fn make_transaction(id: u64, machine: &str) -> Arc<RefillTransaction> {
        Arc::new(RefillTransaction {
            id: RefillId(id),
            machine_id: MachineId::new(machine),
            timestamp: Utc::now(),
            details: DeliveryDetails::new("John Smith"),
            product_updates: Vec::new(),
        })
    }

    #[test]
    fn query_returns_most_recent_first() {
        let history = RefillHistory::new();
        history.record(make_transaction(1, "M0001")).unwrap();
        history.record(make_transaction(2, "M0001")).unwrap();

        let records = history.for_machine(&MachineId::new("M0001"));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, RefillId(2));
        assert_eq!(records[1].id, RefillId(1));
    }

    #[test]
    fn machines_are_indexed_separately() {
        let history = RefillHistory::new();
        history.record(make_transaction(1, "M0001")).unwrap();
        history.record(make_transaction(2, "M0002")).unwrap();

        assert_eq!(history.for_machine(&MachineId::new("M0001")).len(), 1);
        assert_eq!(history.for_machine(&MachineId::new("M0002")).len(), 1);
        assert!(history.for_machine(&MachineId::new("M0003")).is_empty());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn duplicate_refill_id_is_rejected() {
        let history = RefillHistory::new();
        history.record(make_transaction(1, "M0001")).unwrap();

        let result = history.record(make_transaction(1, "M0002"));
        assert_eq!(result, Err(RefillError::DuplicateRefill));
        // The rejected record must not leak into any index.
        assert!(history.for_machine(&MachineId::new("M0002")).is_empty());
        assert_eq!(history.all().len(), 1);
    }

    #[test]
    fn global_log_interleaves_machines_by_recency() {
        let history = RefillHistory::new();
        history.record(make_transaction(1, "M0001")).unwrap();
        history.record(make_transaction(2, "M0002")).unwrap();
        history.record(make_transaction(3, "M0001")).unwrap();

        let ids: Vec<u64> = history.all().iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
