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

//! Error types for refill processing.

use thiserror::Error;

/// Refill processing errors.
///
/// Every variant is recoverable by operator correction of the input;
/// nothing here is fatal to the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefillError {
    /// Product capacity must be at least one unit
    #[error("invalid capacity (must be positive)")]
    InvalidCapacity,

    /// Product id is already registered in the ledger
    #[error("duplicate product ID")]
    DuplicateProduct,

    /// Referenced product ID does not exist
    #[error("product not found")]
    ProductNotFound,

    /// Referenced machine ID does not exist
    #[error("machine not found")]
    MachineNotFound,

    /// Outgoing quantity exceeds current stock plus incoming units
    #[error("insufficient stock (requested {requested}, available {available})")]
    InsufficientStock {
        /// Units on hand after the incoming quantity is counted.
        available: u32,
        /// Units the entry tried to remove.
        requested: u32,
    },

    /// Neither a driver nor a backup name was supplied at commit
    #[error("missing driver name")]
    MissingDriverName,

    /// Duplicate refill transaction ID
    #[error("duplicate refill ID")]
    DuplicateRefill,

    /// Delivery order has no route name
    #[error("missing route name")]
    MissingRouteName,

    /// Delivery order has no machine name
    #[error("missing machine name")]
    MissingMachineName,

    /// Delivery order has no items
    #[error("delivery order has no items")]
    EmptyOrder,
}
