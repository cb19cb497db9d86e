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

//! Machines and routes.
//!
//! The [`MachineDirectory`] holds the fleet metadata: which machines
//! exist, where they are, which delivery route serves them, and when
//! they were last refilled. Stock levels live in the
//! [`StockLedger`](crate::StockLedger), not here.

use crate::base::{MachineId, RouteId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational state of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    Operational,
    NeedsRefill,
    Maintenance,
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Operational => "operational",
            Self::NeedsRefill => "needs_refill",
            Self::Maintenance => "maintenance",
        };
        write!(f, "{s}")
    }
}

/// How often a machine is scheduled for refill visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefillFrequency {
    Daily,
    Weekday,
    #[serde(rename = "Alt 1")]
    Alt1,
    #[serde(rename = "Alt 2")]
    Alt2,
}

impl fmt::Display for RefillFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Daily => "Daily",
            Self::Weekday => "Weekday",
            Self::Alt1 => "Alt 1",
            Self::Alt2 => "Alt 2",
        };
        write!(f, "{s}")
    }
}

/// A vending machine on a delivery route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    pub route_id: RouteId,
    pub location: String,
    pub status: MachineStatus,
    pub frequency: RefillFrequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refill: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_refill: Option<DateTime<Utc>>,
}

impl Machine {
    pub fn new(
        id: MachineId,
        route_id: RouteId,
        location: impl Into<String>,
        status: MachineStatus,
        frequency: RefillFrequency,
    ) -> Self {
        Self {
            id,
            route_id,
            location: location.into(),
            status,
            frequency,
            last_refill: None,
            next_refill: None,
        }
    }
}

/// A delivery route grouping machines by area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub description: String,
}

impl Route {
    pub fn new(id: RouteId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Registry of machines and routes.
///
/// Insertions replace any prior entry for the same id; machine
/// provisioning is an administrative action, not a guarded transaction.
#[derive(Debug, Default)]
pub struct MachineDirectory {
    machines: DashMap<MachineId, Machine>,
    routes: DashMap<RouteId, Route>,
}

impl MachineDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_machine(&self, machine: Machine) {
        self.machines.insert(machine.id.clone(), machine);
    }

    pub fn insert_route(&self, route: Route) {
        self.routes.insert(route.id.clone(), route);
    }

    pub fn machine(&self, id: &MachineId) -> Option<Machine> {
        self.machines.get(id).map(|m| m.clone())
    }

    pub fn route(&self, id: &RouteId) -> Option<Route> {
        self.routes.get(id).map(|r| r.clone())
    }

    pub fn contains_machine(&self, id: &MachineId) -> bool {
        self.machines.contains_key(id)
    }

    /// Machines served by a route, ordered by machine id.
    pub fn machines_on_route(&self, route_id: &RouteId) -> Vec<Machine> {
        let mut machines: Vec<Machine> = self
            .machines
            .iter()
            .filter(|m| &m.route_id == route_id)
            .map(|m| m.clone())
            .collect();
        machines.sort_by(|a, b| a.id.cmp(&b.id));
        machines
    }

    /// Stamps a completed refill and updates operational status.
    ///
    /// `Maintenance` is sticky: a refill visit does not clear a
    /// maintenance flag, only an explicit [`set_status`](Self::set_status)
    /// does.
    pub fn mark_refilled(&self, id: &MachineId, at: DateTime<Utc>, status: MachineStatus) {
        if let Some(mut machine) = self.machines.get_mut(id) {
            machine.last_refill = Some(at);
            if machine.status != MachineStatus::Maintenance {
                machine.status = status;
            }
        }
    }

    pub fn set_status(&self, id: &MachineId, status: MachineStatus) {
        if let Some(mut machine) = self.machines.get_mut(id) {
            machine.status = status;
        }
    }
}
