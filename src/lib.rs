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

//! # Restock
//!
//! This library provides a refill reconciliation engine for vending-machine
//! restock operations: per-machine stock refill entry, quantity
//! reconciliation against capacity ceilings, quick-fill codes, and an
//! in-memory refill history.
//!
//! ## Core Components
//!
//! - [`RefillEngine`]: Central state container owning ledger, directory, and history
//! - [`StockLedger`]: Bounded per-product stock table
//! - [`RefillSession`]: In-flight quantity entries for one machine's refill dialog
//! - [`QuickFillCode`]: Bulk quantity-assignment codes (`FULL`, `HALF`, `CLEAR`, `N`)
//! - [`RefillHistory`]: Append-only log of committed refill transactions
//! - [`RefillError`]: Error types for refill processing failures
//!
//! ## Example
//!
//! ```
//! use restock_rs::{DeliveryDetails, MachineId, Product, ProductId, RefillEngine};
//!
//! let engine = RefillEngine::new();
//! let machine = MachineId::new("M0001");
//!
//! engine
//!     .add_product(Product::new(ProductId(1), machine.clone(), "Coca Cola", 12, 50).unwrap())
//!     .unwrap();
//!
//! // Load 38 units in and commit.
//! let mut session = engine.begin_refill(&machine).unwrap();
//! session.set_in(ProductId(1), 38).unwrap();
//! let transaction = engine
//!     .commit_refill(session, DeliveryDetails::new("John Smith"))
//!     .unwrap();
//!
//! assert_eq!(engine.get_product(&ProductId(1)).unwrap().current_stock(), 50);
//! assert_eq!(transaction.product_updates[0].previous_stock, 12);
//! ```
//!
//! ## Thread Safety
//!
//! All state lives behind concurrent maps, so one engine can be shared
//! across threads (the REST demo does exactly that). Commits stay
//! all-or-nothing: nothing is written to the ledger until every entry in
//! the session has been reconciled.

pub mod error;

mod base;
mod engine;
mod history;
mod ledger;
mod machine;
mod order;
mod product;
mod quickfill;
mod reconcile;
mod refill;
mod session;
mod stats;

pub use base::{MachineId, ProductId, RefillId, RouteId};
pub use engine::RefillEngine;
pub use error::RefillError;
pub use history::RefillHistory;
pub use ledger::StockLedger;
pub use machine::{Machine, MachineDirectory, MachineStatus, RefillFrequency, Route};
pub use order::{DeliveryOrder, DeliveryOrderBuilder, OrderItem};
pub use product::{LOW_STOCK_RATIO, Product};
pub use quickfill::QuickFillCode;
pub use reconcile::{QuantityEntry, Reconciliation, reconcile};
pub use refill::{DeliveryDetails, ProductUpdate, RefillTransaction};
pub use session::RefillSession;
pub use stats::{MachineStats, RouteSummary};
