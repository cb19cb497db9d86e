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

//! Refill session public API integration tests.

use restock_rs::{
    DeliveryDetails, MachineId, Product, ProductId, QuantityEntry, QuickFillCode, RefillEngine,
    RefillError,
};

fn machine(id: &str) -> MachineId {
    MachineId::new(id)
}

/// Engine with one machine holding a 35/50 slot, an 8/40 slot, and a
/// 25/30 slot.
fn make_engine() -> RefillEngine {
    let engine = RefillEngine::new();
    let m = machine("M0001");
    engine
        .add_product(Product::new(ProductId(1), m.clone(), "Coca Cola", 35, 50).unwrap())
        .unwrap();
    engine
        .add_product(Product::new(ProductId(2), m.clone(), "Water", 8, 40).unwrap())
        .unwrap();
    engine
        .add_product(Product::new(ProductId(3), m.clone(), "Chips", 25, 30).unwrap())
        .unwrap();
    engine
}

#[test]
fn new_session_has_no_entries() {
    let engine = make_engine();
    let session = engine.begin_refill(&machine("M0001")).unwrap();
    assert!(session.is_empty());
    assert_eq!(session.products().len(), 3);
}

#[test]
fn overflow_recomputes_on_each_edit() {
    let engine = make_engine();
    let mut session = engine.begin_refill(&machine("M0001")).unwrap();

    session.set_in(ProductId(1), 20).unwrap();
    // 35 + 20 = 55 against capacity 50
    assert_eq!(session.entry(ProductId(1)).overflow, 5);

    session.set_out(ProductId(1), 4).unwrap();
    assert_eq!(session.entry(ProductId(1)).overflow, 1);

    session.set_out(ProductId(1), 10).unwrap();
    assert_eq!(session.entry(ProductId(1)).overflow, 0);
}

#[test]
fn full_code_loads_shortfall_only() {
    let engine = make_engine();
    let mut session = engine.begin_refill(&machine("M0001")).unwrap();

    session.apply_code(QuickFillCode::parse("FULL"));
    assert_eq!(session.entry(ProductId(1)), QuantityEntry::with_in(15));
    assert_eq!(session.entry(ProductId(2)), QuantityEntry::with_in(32));
    assert_eq!(session.entry(ProductId(3)), QuantityEntry::with_in(5));
}

#[test]
fn half_code_omits_slots_at_or_above_target() {
    let engine = make_engine();
    let mut session = engine.begin_refill(&machine("M0001")).unwrap();

    session.apply_code(QuickFillCode::parse("HALF"));
    // Slot 2: target ceil(40/2) = 20, needs 12.
    assert_eq!(session.entry(ProductId(2)), QuantityEntry::with_in(12));
    // Slot 3: target ceil(30/2) = 15 <= 25, omitted.
    assert!(session.entry(ProductId(3)).is_empty());
    // Slot 1: target 25 <= 35, omitted.
    assert!(session.entry(ProductId(1)).is_empty());
}

#[test]
fn clear_code_discards_pending_entries() {
    let engine = make_engine();
    let mut session = engine.begin_refill(&machine("M0001")).unwrap();

    session.apply_code(QuickFillCode::parse("FULL"));
    assert!(!session.is_empty());

    session.apply_code(QuickFillCode::parse("CLEAR"));
    assert!(session.is_empty());
}

#[test]
fn codes_replace_rather_than_merge() {
    let engine = make_engine();
    let mut session = engine.begin_refill(&machine("M0001")).unwrap();

    session.set_in(ProductId(1), 3).unwrap();
    session.set_out(ProductId(2), 2).unwrap();
    session.apply_code(QuickFillCode::parse("5"));

    // Every slot now has exactly in = 5, out = 0.
    for id in [1, 2, 3] {
        assert_eq!(session.entry(ProductId(id)), QuantityEntry::with_in(5));
    }
}

#[test]
fn typo_code_leaves_entries_untouched() {
    let engine = make_engine();
    let mut session = engine.begin_refill(&machine("M0001")).unwrap();

    session.set_in(ProductId(1), 3).unwrap();
    let recognized = session.apply_code(QuickFillCode::parse("FULLL"));

    assert!(!recognized);
    assert_eq!(session.entry(ProductId(1)).in_qty, 3);
}

#[test]
fn editing_an_unknown_product_fails() {
    let engine = make_engine();
    let mut session = engine.begin_refill(&machine("M0001")).unwrap();
    assert_eq!(
        session.set_in(ProductId(99), 1),
        Err(RefillError::ProductNotFound)
    );
}

#[test]
fn projected_stock_matches_committed_stock() {
    let engine = make_engine();
    let mut session = engine.begin_refill(&machine("M0001")).unwrap();

    session.set_in(ProductId(1), 20).unwrap();
    session.set_out(ProductId(1), 4).unwrap();
    let projected = session.projected_stock(ProductId(1)).unwrap();

    engine
        .commit_refill(session, DeliveryDetails::new("John Smith"))
        .unwrap();
    let committed = engine.get_product(&ProductId(1)).unwrap().current_stock();
    assert_eq!(projected, i64::from(committed));
}

#[test]
fn clear_then_commit_is_a_no_op_on_stock() {
    let engine = make_engine();
    let mut session = engine.begin_refill(&machine("M0001")).unwrap();

    session.apply_code(QuickFillCode::parse("FULL"));
    session.apply_code(QuickFillCode::parse("CLEAR"));
    engine
        .commit_refill(session, DeliveryDetails::new("John Smith"))
        .unwrap();

    assert_eq!(engine.get_product(&ProductId(1)).unwrap().current_stock(), 35);
    assert_eq!(engine.get_product(&ProductId(2)).unwrap().current_stock(), 8);
    assert_eq!(engine.get_product(&ProductId(3)).unwrap().current_stock(), 25);
}
