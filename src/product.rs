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

//! Product stock tracking.
//!
//! A [`Product`] is one restockable slot in a vending machine. Its stock
//! level is bounded by its capacity; every mutation goes through
//! [`Product::apply_delta`], which clamps the result into `[0, capacity]`.
//!
//! # Example
//!
//! ```
//! use restock_rs::{MachineId, Product, ProductId};
//!
//! let product = Product::new(ProductId(1), MachineId::new("M0001"), "Cola", 12, 50).unwrap();
//! assert_eq!(product.current_stock(), 12);
//! assert_eq!(product.remaining_capacity(), 38);
//! ```

use crate::RefillError;
use crate::base::{MachineId, ProductId};
use serde::{Deserialize, Serialize};

/// Stock ratio below which a product counts as low on stock.
pub const LOW_STOCK_RATIO: f64 = 0.3;

/// A single restockable item slot within a vending machine.
///
/// # Invariants
///
/// - `capacity > 0` (enforced at construction).
/// - `current_stock <= capacity` after every mutation. The clamp in
///   [`apply_delta`](Product::apply_delta) is the authoritative ceiling
///   enforcement, the last line of defense behind the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "machine")]
    machine_id: MachineId,
    #[serde(rename = "product")]
    id: ProductId,
    name: String,
    #[serde(rename = "stock")]
    current_stock: u32,
    capacity: u32,
}

impl Product {
    /// Creates a product with the given initial stock level.
    ///
    /// An initial stock above capacity is clamped down to capacity.
    ///
    /// # Errors
    ///
    /// Returns [`RefillError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(
        id: ProductId,
        machine_id: MachineId,
        name: impl Into<String>,
        current_stock: u32,
        capacity: u32,
    ) -> Result<Self, RefillError> {
        if capacity == 0 {
            return Err(RefillError::InvalidCapacity);
        }
        Ok(Self {
            machine_id,
            id,
            name: name.into(),
            current_stock: current_stock.min(capacity),
            capacity,
        })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn machine_id(&self) -> &MachineId {
        &self.machine_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_stock(&self) -> u32 {
        self.current_stock
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Units that still fit before the capacity ceiling.
    pub fn remaining_capacity(&self) -> u32 {
        self.capacity - self.current_stock
    }

    /// Current stock as a fraction of capacity, in `[0.0, 1.0]`.
    pub fn fill_ratio(&self) -> f64 {
        f64::from(self.current_stock) / f64::from(self.capacity)
    }

    /// Whether the slot is below the low-stock threshold.
    pub fn is_low_stock(&self) -> bool {
        self.fill_ratio() < LOW_STOCK_RATIO
    }

    /// Applies a signed stock change, clamping the result into
    /// `[0, capacity]`, and returns the new stock level.
    ///
    /// An out-of-range delta is silently clamped rather than rejected;
    /// callers that want an explicit error must validate before calling
    /// (see [`reconcile`](crate::reconcile())).
    pub fn apply_delta(&mut self, delta: i64) -> u32 {
        let next = i64::from(self.current_stock) + delta;
        self.current_stock = next.clamp(0, i64::from(self.capacity)) as u32;
        self.assert_invariants();
        self.current_stock
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.current_stock <= self.capacity,
            "Invariant violated: stock {} exceeds capacity {}",
            self.current_stock,
            self.capacity
        );
    }
}
