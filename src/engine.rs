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

//! Refill processing engine.
//!
//! The [`RefillEngine`] is the single ownership root for all in-memory
//! state: the stock ledger, the machine/route directory, and the refill
//! history. It is created at session start and passed to callers by
//! reference; there is no ambient global state.
//!
//! # Commit protocol
//!
//! [`RefillEngine::commit_refill`] is all-or-nothing. Validation (the
//! operator name check and per-product reconciliation) completes before
//! the first ledger write, so a failed commit leaves every stock level
//! untouched. Discarding a [`RefillSession`] without committing has no
//! effect at all.

use crate::RefillError;
use crate::base::{MachineId, ProductId, RefillId, RouteId};
use crate::history::RefillHistory;
use crate::ledger::StockLedger;
use crate::machine::{Machine, MachineDirectory, MachineStatus, Route};
use crate::product::Product;
use crate::reconcile::reconcile;
use crate::refill::{DeliveryDetails, ProductUpdate, RefillTransaction};
use crate::session::RefillSession;
use crate::stats::{MachineStats, RouteSummary};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Central state container for a refill-operations session.
///
/// # Invariants
///
/// - Refill ids are unique and assigned in commit order.
/// - Every product's stock stays within `[0, capacity]`.
/// - History is append-only; recorded transactions are never mutated.
pub struct RefillEngine {
    /// Product stock levels, keyed by product id.
    ledger: StockLedger,
    /// Fleet metadata: machines and routes.
    directory: MachineDirectory,
    /// Committed refill transactions.
    history: RefillHistory,
    /// Next refill transaction id.
    next_refill_id: AtomicU64,
}

impl RefillEngine {
    /// Creates an engine with no products, machines, or history.
    pub fn new() -> Self {
        Self {
            ledger: StockLedger::new(),
            directory: MachineDirectory::new(),
            history: RefillHistory::new(),
            next_refill_id: AtomicU64::new(1),
        }
    }

    // === Provisioning ===

    /// Registers a product in the stock ledger.
    ///
    /// # Errors
    ///
    /// Returns [`RefillError::DuplicateProduct`] on id reuse.
    pub fn add_product(&self, product: Product) -> Result<(), RefillError> {
        self.ledger.insert(product)
    }

    pub fn add_machine(&self, machine: Machine) {
        self.directory.insert_machine(machine);
    }

    pub fn add_route(&self, route: Route) {
        self.directory.insert_route(route);
    }

    // === Queries ===

    /// Snapshot of a product by id.
    pub fn get_product(&self, id: &ProductId) -> Option<Product> {
        self.ledger.get(id)
    }

    /// Snapshot of a machine's products, ordered by product id.
    pub fn products_for_machine(&self, machine_id: &MachineId) -> Vec<Product> {
        self.ledger.for_machine(machine_id)
    }

    /// Snapshot of every product, ordered by machine then product id.
    pub fn all_products(&self) -> Vec<Product> {
        self.ledger.all()
    }

    /// Machine ids known to the ledger, sorted.
    pub fn machine_ids(&self) -> Vec<MachineId> {
        self.ledger.machine_ids()
    }

    pub fn machine(&self, id: &MachineId) -> Option<Machine> {
        self.directory.machine(id)
    }

    pub fn set_machine_status(&self, id: &MachineId, status: MachineStatus) {
        self.directory.set_status(id, status);
    }

    /// Refill history for a machine, most recent first.
    pub fn refill_history(&self, machine_id: &MachineId) -> Vec<Arc<RefillTransaction>> {
        self.history.for_machine(machine_id)
    }

    /// Every recorded refill across all machines, most recent first.
    pub fn refill_log(&self) -> Vec<Arc<RefillTransaction>> {
        self.history.all()
    }

    /// Aggregate fill statistics for a machine.
    pub fn machine_stats(&self, machine_id: &MachineId) -> MachineStats {
        MachineStats::from_products(&self.ledger.for_machine(machine_id))
    }

    /// Route card summary, or `None` for an unknown route.
    pub fn route_summary(&self, route_id: &RouteId) -> Option<RouteSummary> {
        let route = self.directory.route(route_id)?;
        let machines = self.directory.machines_on_route(route_id);
        Some(RouteSummary::new(route, &machines))
    }

    // === Refill lifecycle ===

    /// Opens a refill session for a machine.
    ///
    /// # Errors
    ///
    /// Returns [`RefillError::MachineNotFound`] when the machine is
    /// neither registered in the directory nor present in the ledger.
    pub fn begin_refill(&self, machine_id: &MachineId) -> Result<RefillSession, RefillError> {
        let products = self.ledger.for_machine(machine_id);
        if products.is_empty() && !self.directory.contains_machine(machine_id) {
            return Err(RefillError::MachineNotFound);
        }
        Ok(RefillSession::new(machine_id.clone(), products))
    }

    /// Commits a refill session: reconciles every entry, applies the net
    /// stock changes, and records the transaction.
    ///
    /// Two-phase: every entry is reconciled against the live ledger
    /// before any stock is written, so an error leaves no state change.
    ///
    /// # Errors
    ///
    /// - [`RefillError::MissingDriverName`] when neither a driver nor a
    ///   backup name is supplied.
    /// - [`RefillError::InsufficientStock`] when an entry removes more
    ///   units than the slot holds after loading.
    /// - [`RefillError::ProductNotFound`] when an entry references a
    ///   product that is no longer in the ledger.
    pub fn commit_refill(
        &self,
        session: RefillSession,
        details: DeliveryDetails,
    ) -> Result<Arc<RefillTransaction>, RefillError> {
        if !details.has_operator() {
            return Err(RefillError::MissingDriverName);
        }

        // Phase 1: reconcile everything against the live ledger.
        let mut planned = Vec::with_capacity(session.entries().len());
        for (&product_id, entry) in session.entries() {
            let product = self
                .ledger
                .get(&product_id)
                .ok_or(RefillError::ProductNotFound)?;
            let outcome = reconcile(
                product.current_stock(),
                product.capacity(),
                entry.in_qty,
                entry.out_qty,
            )?;
            planned.push((product_id, product, *entry, outcome));
        }

        // Phase 2: apply deltas and assemble the record.
        let mut product_updates = Vec::with_capacity(planned.len());
        for (product_id, product, entry, outcome) in planned {
            // The ledger's clamped result is authoritative; under racing
            // commits it may differ from the planned value.
            let new_stock = self.ledger.apply_delta(&product_id, outcome.net_delta)?;
            product_updates.push(ProductUpdate {
                product_name: product.name().to_string(),
                in_qty: entry.in_qty,
                overflow: outcome.overflow,
                out_qty: entry.out_qty,
                previous_stock: product.current_stock(),
                new_stock,
            });
        }

        let machine_id = session.machine_id().clone();
        let timestamp = Utc::now();
        let transaction = Arc::new(RefillTransaction {
            id: RefillId(self.next_refill_id.fetch_add(1, Ordering::SeqCst)),
            machine_id: machine_id.clone(),
            timestamp,
            details,
            product_updates,
        });
        self.history.record(Arc::clone(&transaction))?;

        // Refresh the machine's status from its post-refill stock.
        let status = if self
            .ledger
            .for_machine(&machine_id)
            .iter()
            .any(|p| p.is_low_stock())
        {
            MachineStatus::NeedsRefill
        } else {
            MachineStatus::Operational
        };
        self.directory.mark_refilled(&machine_id, timestamp, status);

        Ok(transaction)
    }
}

impl Default for RefillEngine {
    fn default() -> Self {
        Self::new()
    }
}
