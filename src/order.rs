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

//! Delivery orders.
//!
//! A delivery order is the load list a driver takes out: which products,
//! in what quantities, for which route and machine. Orders are built
//! incrementally (quantities adjusted line by line) and validated once
//! at build time.

use crate::RefillError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One product line on a delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_name: String,
    pub quantity: u32,
}

/// A validated delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOrder {
    pub order_number: String,
    pub route_name: String,
    pub machine_name: String,
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl DeliveryOrder {
    /// Total units across all lines.
    pub fn total_units(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Incrementally assembles a [`DeliveryOrder`].
#[derive(Debug, Clone, Default)]
pub struct DeliveryOrderBuilder {
    order_number: String,
    route_name: String,
    machine_name: String,
    quantities: BTreeMap<String, u32>,
    notes: Option<String>,
}

impl DeliveryOrderBuilder {
    pub fn new(order_number: impl Into<String>) -> Self {
        Self {
            order_number: order_number.into(),
            ..Self::default()
        }
    }

    pub fn route_name(mut self, name: impl Into<String>) -> Self {
        self.route_name = name.into();
        self
    }

    pub fn machine_name(mut self, name: impl Into<String>) -> Self {
        self.machine_name = name.into();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = (!notes.trim().is_empty()).then(|| notes.trim().to_string());
        self
    }

    /// Sets a product line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, product_name: impl Into<String>, quantity: u32) {
        let name = product_name.into();
        if quantity == 0 {
            self.quantities.remove(&name);
        } else {
            self.quantities.insert(name, quantity);
        }
    }

    /// Adjusts a product line by a signed step, flooring at zero; a line
    /// reaching zero is removed.
    pub fn adjust_quantity(&mut self, product_name: impl Into<String>, delta: i64) {
        let name = product_name.into();
        let current = self.quantities.get(&name).copied().unwrap_or(0);
        let next = (i64::from(current) + delta).max(0) as u32;
        self.set_quantity(name, next);
    }

    pub fn quantity(&self, product_name: &str) -> u32 {
        self.quantities.get(product_name).copied().unwrap_or(0)
    }

    /// Validates and stamps the order.
    ///
    /// # Errors
    ///
    /// - [`RefillError::MissingRouteName`] when the route name is blank.
    /// - [`RefillError::MissingMachineName`] when the machine name is blank.
    /// - [`RefillError::EmptyOrder`] when no line has a quantity.
    pub fn build(self) -> Result<DeliveryOrder, RefillError> {
        if self.route_name.trim().is_empty() {
            return Err(RefillError::MissingRouteName);
        }
        if self.machine_name.trim().is_empty() {
            return Err(RefillError::MissingMachineName);
        }
        if self.quantities.is_empty() {
            return Err(RefillError::EmptyOrder);
        }

        let items = self
            .quantities
            .into_iter()
            .map(|(product_name, quantity)| OrderItem {
                product_name,
                quantity,
            })
            .collect();

        Ok(DeliveryOrder {
            order_number: self.order_number,
            route_name: self.route_name.trim().to_string(),
            machine_name: self.machine_name.trim().to_string(),
            items,
            notes: self.notes,
            timestamp: Utc::now(),
        })
    }
}
