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

//! Derived statistics for machines and routes.

use crate::machine::{Machine, MachineStatus, Route};
use crate::product::Product;
use serde::Serialize;

/// Aggregate fill statistics for one machine's product snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineStats {
    pub total_stock: u32,
    pub total_capacity: u32,
    /// Overall fill level as a rounded percentage.
    pub stock_percentage: u32,
    /// Number of products below the low-stock threshold.
    pub low_stock_items: usize,
}

impl MachineStats {
    pub fn from_products(products: &[Product]) -> Self {
        let total_stock: u32 = products.iter().map(|p| p.current_stock()).sum();
        let total_capacity: u32 = products.iter().map(|p| p.capacity()).sum();
        let stock_percentage = if total_capacity == 0 {
            0
        } else {
            (f64::from(total_stock) / f64::from(total_capacity) * 100.0).round() as u32
        };
        let low_stock_items = products.iter().filter(|p| p.is_low_stock()).count();

        Self {
            total_stock,
            total_capacity,
            stock_percentage,
            low_stock_items,
        }
    }
}

/// Route card summary: machine count and how many need a refill visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    pub route: Route,
    pub machine_count: usize,
    pub needs_refill: usize,
}

impl RouteSummary {
    pub fn new(route: Route, machines: &[Machine]) -> Self {
        Self {
            machine_count: machines.len(),
            needs_refill: machines
                .iter()
                .filter(|m| m.status == MachineStatus::NeedsRefill)
                .count(),
            route,
        }
    }
}
