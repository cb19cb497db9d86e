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

//! Quick-fill codes.
//!
//! A quick-fill code is a short operator-typed token that bulk-populates
//! refill quantities for every product of the active machine:
//!
//! | Code | Effect per product |
//! |------|--------------------|
//! | `FULL` / `F` | load up to capacity |
//! | `HALF` / `H` | load up to half capacity (rounded up) |
//! | `CLEAR` / `C` | discard all pending entries |
//! | integer `N` | load `N` units into every slot |
//!
//! Codes are case-insensitive and whitespace-trimmed. Anything else is
//! [`QuickFillCode::Unrecognized`], which leaves pending entries
//! untouched.

use crate::base::ProductId;
use crate::product::Product;
use crate::reconcile::QuantityEntry;
use std::collections::BTreeMap;

/// A parsed quick-fill code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickFillCode {
    /// Fill every product to full capacity.
    Full,
    /// Fill every product to half capacity, rounded up.
    Half,
    /// Discard all pending entries.
    Clear,
    /// Load the same number of units into every product.
    SetAll(u32),
    /// Not a known code; applying it is a no-op.
    Unrecognized,
}

impl QuickFillCode {
    /// Parses an operator-typed code.
    ///
    /// Parsing never fails: unknown input maps to
    /// [`QuickFillCode::Unrecognized`] so that a typo leaves the
    /// operator's pending entries alone instead of clearing them.
    pub fn parse(code: &str) -> Self {
        let code = code.trim().to_uppercase();
        match code.as_str() {
            "FULL" | "F" => Self::Full,
            "HALF" | "H" => Self::Half,
            "CLEAR" | "C" => Self::Clear,
            _ => match code.parse::<u32>() {
                Ok(n) => Self::SetAll(n),
                Err(_) => Self::Unrecognized,
            },
        }
    }

    /// Applies the code across a machine's products.
    ///
    /// Returns `None` for [`Unrecognized`](Self::Unrecognized) (pending
    /// entries stay as they are). Otherwise returns the full replacement
    /// entry set: prior unsaved entries are replaced, not merged.
    /// Products already at or above the code's target level are omitted.
    /// Entries produced here always carry `overflow = 0` and `out = 0`;
    /// both are recomputed by later per-product edits or at reconcile
    /// time.
    pub fn apply(&self, products: &[Product]) -> Option<BTreeMap<ProductId, QuantityEntry>> {
        match self {
            Self::Full => Some(fill_to_target(products, |p| p.capacity())),
            Self::Half => Some(fill_to_target(products, |p| p.capacity().div_ceil(2))),
            Self::Clear => Some(BTreeMap::new()),
            Self::SetAll(n) => Some(
                products
                    .iter()
                    .map(|p| (p.id(), QuantityEntry::with_in(*n)))
                    .collect(),
            ),
            Self::Unrecognized => None,
        }
    }
}

fn fill_to_target(
    products: &[Product],
    target: impl Fn(&Product) -> u32,
) -> BTreeMap<ProductId, QuantityEntry> {
    products
        .iter()
        .filter_map(|p| {
            let needed = target(p).saturating_sub(p.current_stock());
            (needed > 0).then(|| (p.id(), QuantityEntry::with_in(needed)))
        })
        .collect()
}
