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

//! Quantity reconciliation.
//!
//! Given a product's current stock and capacity plus the technician's
//! entered incoming/outgoing unit counts, [`reconcile`] derives the
//! overflow correction and the net stock change:
//!
//! - `overflow = max(0, current + in - out - capacity)` — the amount by
//!   which the provisional total would exceed capacity. Overflow is
//!   always derived, never entered by the operator.
//! - `net_delta = in - out - overflow`
//! - `new_stock = current + net_delta`, guaranteed to land in
//!   `[0, capacity]`.
//!
//! An outgoing count larger than `current + in` is an error rather than
//! a silent clamp: removing units that are not in the machine means the
//! entry is wrong, and the discrepancy must be corrected at the form,
//! not absorbed by the ledger.

use crate::RefillError;
use serde::{Deserialize, Serialize};

/// One product's pending entry in a refill session.
///
/// Transient: lives only for the duration of one refill-entry session
/// and is discarded after commit or cancel. `overflow` is a derived
/// field, recomputed whenever `in` or `out` changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityEntry {
    /// Units the technician loads into the machine.
    #[serde(rename = "in")]
    pub in_qty: u32,
    /// Derived excess subtracted to keep stock within capacity.
    pub overflow: u32,
    /// Units removed from the machine (expired, damaged, recalled).
    #[serde(rename = "out")]
    pub out_qty: u32,
}

impl QuantityEntry {
    /// An entry that only loads units in.
    pub fn with_in(in_qty: u32) -> Self {
        Self {
            in_qty,
            overflow: 0,
            out_qty: 0,
        }
    }

    /// True when every column is zero; committing such an entry is a
    /// no-op on the ledger.
    pub fn is_empty(&self) -> bool {
        self.in_qty == 0 && self.overflow == 0 && self.out_qty == 0
    }
}

/// Outcome of reconciling one product's entry against its stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// Derived overflow correction.
    pub overflow: u32,
    /// Signed net stock change, `in - out - overflow`.
    pub net_delta: i64,
    /// Stock level after the change; always within `[0, capacity]`.
    pub new_stock: u32,
}

/// Reconciles an `{in, out}` pair against a product's stock and capacity.
///
/// # Errors
///
/// Returns [`RefillError::InsufficientStock`] when `out_qty` exceeds
/// `current_stock + in_qty`.
pub fn reconcile(
    current_stock: u32,
    capacity: u32,
    in_qty: u32,
    out_qty: u32,
) -> Result<Reconciliation, RefillError> {
    let available = i64::from(current_stock) + i64::from(in_qty);
    if i64::from(out_qty) > available {
        return Err(RefillError::InsufficientStock {
            available: available as u32,
            requested: out_qty,
        });
    }

    let provisional = available - i64::from(out_qty);
    let overflow = (provisional - i64::from(capacity)).max(0) as u32;
    let net_delta = i64::from(in_qty) - i64::from(out_qty) - i64::from(overflow);
    let new_stock = (i64::from(current_stock) + net_delta) as u32;
    debug_assert!(new_stock <= capacity);

    Ok(Reconciliation {
        overflow,
        net_delta,
        new_stock,
    })
}

/// Overflow preview used while an entry is being edited.
///
/// Same derivation as [`reconcile`] but without the insufficient-stock
/// check: during editing the form only shows the would-be overflow, and
/// a provisional total below zero simply previews as no overflow.
pub(crate) fn preview_overflow(current_stock: u32, capacity: u32, in_qty: u32, out_qty: u32) -> u32 {
    let provisional = i64::from(current_stock) + i64::from(in_qty) - i64::from(out_qty);
    (provisional - i64::from(capacity)).max(0) as u32
}
