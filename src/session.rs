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

//! In-flight refill entry.
//!
//! A [`RefillSession`] holds the transient per-product quantity entries
//! for one machine's refill dialog. Edits recompute the derived overflow
//! column; quick-fill codes bulk-replace the entry set. Nothing here
//! touches the ledger — dropping a session (dialog cancel) has no side
//! effect, and stock changes happen only when the engine commits.

use crate::RefillError;
use crate::base::{MachineId, ProductId};
use crate::product::Product;
use crate::quickfill::QuickFillCode;
use crate::reconcile::{QuantityEntry, preview_overflow};
use std::collections::BTreeMap;

/// One machine's pending refill entries.
///
/// Holds a snapshot of the machine's products taken when the session
/// began; previews are computed against that snapshot, while the commit
/// step re-reads the authoritative ledger.
#[derive(Debug, Clone)]
pub struct RefillSession {
    machine_id: MachineId,
    products: Vec<Product>,
    entries: BTreeMap<ProductId, QuantityEntry>,
}

impl RefillSession {
    pub(crate) fn new(machine_id: MachineId, products: Vec<Product>) -> Self {
        Self {
            machine_id,
            products,
            entries: BTreeMap::new(),
        }
    }

    pub fn machine_id(&self) -> &MachineId {
        &self.machine_id
    }

    /// Product snapshot the session was opened with, ordered by id.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Current pending entries, ordered by product id.
    pub fn entries(&self) -> &BTreeMap<ProductId, QuantityEntry> {
        &self.entries
    }

    /// Pending entry for one product; all-zero when untouched.
    pub fn entry(&self, id: ProductId) -> QuantityEntry {
        self.entries.get(&id).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discards all pending entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sets the incoming quantity for a product and recomputes overflow.
    ///
    /// # Errors
    ///
    /// Returns [`RefillError::ProductNotFound`] if the product is not in
    /// this machine's snapshot.
    pub fn set_in(&mut self, id: ProductId, in_qty: u32) -> Result<(), RefillError> {
        self.edit(id, |entry| entry.in_qty = in_qty)
    }

    /// Sets the outgoing quantity for a product and recomputes overflow.
    ///
    /// # Errors
    ///
    /// Returns [`RefillError::ProductNotFound`] if the product is not in
    /// this machine's snapshot.
    pub fn set_out(&mut self, id: ProductId, out_qty: u32) -> Result<(), RefillError> {
        self.edit(id, |entry| entry.out_qty = out_qty)
    }

    fn edit(&mut self, id: ProductId, apply: impl FnOnce(&mut QuantityEntry)) -> Result<(), RefillError> {
        let product = self.product(id).ok_or(RefillError::ProductNotFound)?;
        let (current, capacity) = (product.current_stock(), product.capacity());

        let entry = self.entries.entry(id).or_default();
        apply(entry);
        // Overflow is derived, recomputed on every in/out change.
        entry.overflow = preview_overflow(current, capacity, entry.in_qty, entry.out_qty);
        Ok(())
    }

    /// Applies a quick-fill code.
    ///
    /// A recognized code replaces the whole pending entry set (CLEAR
    /// replaces it with nothing); an unrecognized code leaves it
    /// untouched. Returns whether the code was recognized.
    pub fn apply_code(&mut self, code: QuickFillCode) -> bool {
        match code.apply(&self.products) {
            Some(entries) => {
                self.entries = entries;
                true
            }
            None => false,
        }
    }

    /// The `current / projected / capacity` preview shown per row.
    ///
    /// Computed as `current + in - out - overflow` against the session
    /// snapshot; can go negative when the outgoing count exceeds what is
    /// available, which the commit step rejects.
    pub fn projected_stock(&self, id: ProductId) -> Result<i64, RefillError> {
        let product = self.product(id).ok_or(RefillError::ProductNotFound)?;
        let entry = self.entry(id);
        Ok(i64::from(product.current_stock()) + i64::from(entry.in_qty)
            - i64::from(entry.out_qty)
            - i64::from(entry.overflow))
    }

    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }
}
