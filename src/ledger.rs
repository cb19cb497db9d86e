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

//! The stock ledger.
//!
//! In-memory table of product stock levels and capacities. All stock
//! mutation funnels through [`StockLedger::apply_delta`], which clamps
//! the result into `[0, capacity]` — even if an upstream computation
//! under- or over-shoots, the ledger never stores an out-of-range level.

use crate::RefillError;
use crate::base::{MachineId, ProductId};
use crate::product::Product;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// In-memory table of products keyed by product id.
///
/// Uses [`DashMap`] so the REST demo can share one ledger across
/// request handlers; within a single interaction thread all operations
/// are plain synchronous calls.
#[derive(Debug, Default)]
pub struct StockLedger {
    products: DashMap<ProductId, Product>,
}

impl StockLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a product.
    ///
    /// # Errors
    ///
    /// Returns [`RefillError::DuplicateProduct`] if the id is already
    /// registered.
    pub fn insert(&self, product: Product) -> Result<(), RefillError> {
        match self.products.entry(product.id()) {
            Entry::Occupied(_) => Err(RefillError::DuplicateProduct),
            Entry::Vacant(entry) => {
                entry.insert(product);
                Ok(())
            }
        }
    }

    /// Snapshot of a product by id.
    pub fn get(&self, id: &ProductId) -> Option<Product> {
        self.products.get(id).map(|p| p.clone())
    }

    /// Applies a signed stock change and returns the new stock level.
    ///
    /// The change is clamped into `[0, capacity]`; an out-of-range delta
    /// is absorbed, not rejected. Callers that need the discrepancy
    /// surfaced must reconcile before applying.
    ///
    /// # Errors
    ///
    /// Returns [`RefillError::ProductNotFound`] for an unknown id.
    pub fn apply_delta(&self, id: &ProductId, delta: i64) -> Result<u32, RefillError> {
        let mut product = self
            .products
            .get_mut(id)
            .ok_or(RefillError::ProductNotFound)?;
        Ok(product.apply_delta(delta))
    }

    /// Snapshot of every product in a machine, ordered by product id.
    pub fn for_machine(&self, machine_id: &MachineId) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.machine_id() == machine_id)
            .map(|p| p.clone())
            .collect();
        products.sort_by_key(|p| p.id());
        products
    }

    /// Snapshot of every product, ordered by machine then product id.
    pub fn all(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.products.iter().map(|p| p.clone()).collect();
        products.sort_by(|a, b| {
            a.machine_id()
                .cmp(b.machine_id())
                .then(a.id().cmp(&b.id()))
        });
        products
    }

    /// Machine ids present in the ledger, sorted.
    pub fn machine_ids(&self) -> Vec<MachineId> {
        let mut ids: Vec<MachineId> = self.products.iter().map(|p| p.machine_id().clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(id: u32, machine: &str, stock: u32, capacity: u32) -> Product {
        Product::new(
            ProductId(id),
            MachineId::new(machine),
            format!("Product {id}"),
            stock,
            capacity,
        )
        .unwrap()
    }

    #[test]
    fn duplicate_product_id_is_rejected() {
        let ledger = StockLedger::new();
        ledger.insert(make_product(1, "M0001", 10, 50)).unwrap();

        let result = ledger.insert(make_product(1, "M0002", 5, 30));
        assert_eq!(result, Err(RefillError::DuplicateProduct));
        // The original registration survives.
        assert_eq!(ledger.get(&ProductId(1)).unwrap().machine_id().0, "M0001");
    }

    #[test]
    fn apply_delta_clamps_into_range() {
        let ledger = StockLedger::new();
        ledger.insert(make_product(1, "M0001", 45, 50)).unwrap();

        assert_eq!(ledger.apply_delta(&ProductId(1), 100).unwrap(), 50);
        assert_eq!(ledger.apply_delta(&ProductId(1), -100).unwrap(), 0);
    }

    #[test]
    fn apply_delta_unknown_product() {
        let ledger = StockLedger::new();
        let result = ledger.apply_delta(&ProductId(9), 1);
        assert_eq!(result, Err(RefillError::ProductNotFound));
    }

    #[test]
    fn for_machine_is_sorted_and_scoped() {
        let ledger = StockLedger::new();
        ledger.insert(make_product(3, "M0001", 1, 50)).unwrap();
        ledger.insert(make_product(1, "M0001", 1, 50)).unwrap();
        ledger.insert(make_product(2, "M0002", 1, 50)).unwrap();

        let products = ledger.for_machine(&MachineId::new("M0001"));
        let ids: Vec<u32> = products.iter().map(|p| p.id().0).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn machine_ids_are_deduplicated() {
        let ledger = StockLedger::new();
        ledger.insert(make_product(1, "M0002", 1, 50)).unwrap();
        ledger.insert(make_product(2, "M0001", 1, 50)).unwrap();
        ledger.insert(make_product(3, "M0001", 1, 50)).unwrap();

        let ids: Vec<String> = ledger.machine_ids().into_iter().map(|m| m.0).collect();
        assert_eq!(ids, vec!["M0001", "M0002"]);
    }
}
