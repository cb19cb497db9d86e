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

//! Refill transaction records.
//!
//! A [`RefillTransaction`] is the immutable record of one completed
//! restocking event for a machine: who performed it, when, and the
//! per-product quantity breakdown with before/after stock levels.

use crate::base::{MachineId, RefillId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-product line of a committed refill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub product_name: String,
    #[serde(rename = "in")]
    pub in_qty: u32,
    pub overflow: u32,
    #[serde(rename = "out")]
    pub out_qty: u32,
    pub previous_stock: u32,
    pub new_stock: u32,
}

/// Who performed a refill and with what vehicle.
///
/// Either the driver or the backup name must be non-blank for a commit
/// to be accepted; all other fields are optional. Blank strings passed
/// to the setters are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub driver_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistance_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lorry_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DeliveryDetails {
    pub fn new(driver_name: impl Into<String>) -> Self {
        Self {
            driver_name: driver_name.into().trim().to_string(),
            ..Self::default()
        }
    }

    pub fn with_assistance(mut self, name: impl Into<String>) -> Self {
        self.assistance_name = non_blank(name.into());
        self
    }

    pub fn with_backup(mut self, name: impl Into<String>) -> Self {
        self.backup_name = non_blank(name.into());
        self
    }

    pub fn with_lorry(mut self, lorry: impl Into<String>) -> Self {
        self.lorry_number = non_blank(lorry.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = non_blank(notes.into());
        self
    }

    /// True when someone is named to sign off the refill.
    pub fn has_operator(&self) -> bool {
        !self.driver_name.trim().is_empty() || self.backup_name.is_some()
    }

    /// The person the refill is attributed to: the backup when one is
    /// named, otherwise the driver.
    pub fn active_name(&self) -> &str {
        self.backup_name.as_deref().unwrap_or(&self.driver_name)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Immutable record of one committed refill.
///
/// Created once per commit by the engine, then owned by the history
/// recorder; never mutated or deleted in-session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefillTransaction {
    pub id: RefillId,
    pub machine_id: MachineId,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub details: DeliveryDetails,
    pub product_updates: Vec<ProductUpdate>,
}

impl RefillTransaction {
    /// Name of the person the refill is attributed to.
    pub fn recorded_by(&self) -> &str {
        self.details.active_name()
    }

    /// Total units loaded in across all product lines.
    pub fn total_in(&self) -> u32 {
        self.product_updates.iter().map(|u| u.in_qty).sum()
    }

    /// Total units removed across all product lines.
    pub fn total_out(&self) -> u32 {
        self.product_updates.iter().map(|u| u.out_qty).sum()
    }
}
