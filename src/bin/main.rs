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

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use restock_rs::{
    DeliveryDetails, MachineId, Product, ProductId, QuickFillCode, RefillEngine, RefillSession,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;

/// Restock - Apply vending machine refills from CSV files
///
/// Reads an inventory CSV, applies a refill plan (or a quick-fill code)
/// to every machine, and writes the updated inventory to stdout.
#[derive(Parser, Debug)]
#[command(name = "restock-rs")]
#[command(about = "A refill engine that processes machine inventory CSVs", long_about = None)]
struct Args {
    /// Path to inventory CSV
    ///
    /// Expected format: machine,product,name,stock,capacity
    #[arg(value_name = "INVENTORY")]
    inventory: PathBuf,

    /// Optional refill plan CSV
    ///
    /// Expected format: machine,product,in,out
    #[arg(value_name = "PLAN")]
    plan: Option<PathBuf>,

    /// Quick-fill code applied to every machine instead of a plan
    /// (FULL, HALF, CLEAR, or a number)
    #[arg(long, conflicts_with = "plan")]
    code: Option<String>,

    /// Driver performing the refills
    #[arg(long)]
    driver: Option<String>,

    /// Backup driver (takes over attribution when set)
    #[arg(long)]
    backup: Option<String>,

    /// Assistance crew name
    #[arg(long)]
    assist: Option<String>,

    /// Lorry number
    #[arg(long)]
    lorry: Option<String>,

    /// Free-form notes attached to each refill
    #[arg(long)]
    notes: Option<String>,

    /// Print the refill history instead of the updated inventory
    #[arg(long)]
    history: bool,
}

fn main() {
    let args = Args::parse();

    let file = match File::open(&args.inventory) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.inventory.display(), e);
            process::exit(1);
        }
    };

    let engine = match load_inventory(BufReader::new(file)) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error reading inventory: {}", e);
            process::exit(1);
        }
    };

    let sessions = if let Some(code) = &args.code {
        quick_fill_sessions(&engine, code)
    } else if let Some(plan_path) = &args.plan {
        let file = match File::open(plan_path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error opening file '{}': {}", plan_path.display(), e);
                process::exit(1);
            }
        };
        match load_plan(&engine, BufReader::new(file)) {
            Ok(sessions) => sessions,
            Err(e) => {
                eprintln!("Error reading refill plan: {}", e);
                process::exit(1);
            }
        }
    } else {
        Vec::new()
    };

    let details = DeliveryDetails::new(args.driver.unwrap_or_default())
        .with_backup(args.backup.unwrap_or_default())
        .with_assistance(args.assist.unwrap_or_default())
        .with_lorry(args.lorry.unwrap_or_default())
        .with_notes(args.notes.unwrap_or_default());

    commit_sessions(&engine, sessions, &details);

    let result = if args.history {
        write_history(&engine, std::io::stdout())
    } else {
        write_inventory(&engine, std::io::stdout())
    };
    if let Err(e) = result {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the inventory input format.
///
/// Fields: `machine, product, name, stock, capacity`
#[derive(Debug, Deserialize)]
struct InventoryRecord {
    machine: String,
    product: u32,
    name: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    stock: Option<i64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    capacity: Option<i64>,
}

impl InventoryRecord {
    /// Converts a CSV record into a Product.
    ///
    /// Returns `None` for rows with a missing or non-positive capacity.
    /// A missing or negative stock value coerces to 0.
    fn into_product(self) -> Option<Product> {
        let capacity = match self.capacity {
            Some(c) if c > 0 => c as u32,
            _ => return None,
        };
        let stock = self.stock.unwrap_or(0).max(0) as u32;
        Product::new(
            ProductId(self.product),
            MachineId::new(self.machine),
            self.name,
            stock,
            capacity,
        )
        .ok()
    }
}

/// Raw CSV record matching the refill plan format.
///
/// Fields: `machine, product, in, out`
#[derive(Debug, Deserialize)]
struct PlanRecord {
    machine: String,
    product: u32,
    #[serde(rename = "in", deserialize_with = "csv::invalid_option")]
    in_qty: Option<i64>,
    #[serde(rename = "out", deserialize_with = "csv::invalid_option")]
    out_qty: Option<i64>,
}

/// Loads machine inventory from a CSV reader.
///
/// Streaming parse; malformed rows and invalid products are silently
/// skipped. Negative quantity cells coerce to 0 at this boundary.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is
/// invalid.
pub fn load_inventory<R: Read>(reader: R) -> Result<RefillEngine, csv::Error> {
    let engine = RefillEngine::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<InventoryRecord>() {
        match result {
            Ok(record) => {
                let Some(product) = record.into_product() else {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping invalid inventory record");
                    continue;
                };

                if let Err(e) = engine.add_product(product) {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping product: {}", e);
                }
            }
            Err(e) => {
                // Skip malformed rows
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {}", e);
                continue;
            }
        }
    }

    Ok(engine)
}

/// Loads a refill plan, producing one session per machine.
///
/// Rows referencing unknown machines or products are skipped.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is
/// invalid.
pub fn load_plan<R: Read>(
    engine: &RefillEngine,
    reader: R,
) -> Result<Vec<RefillSession>, csv::Error> {
    let mut sessions: BTreeMap<MachineId, RefillSession> = BTreeMap::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<PlanRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {}", e);
                continue;
            }
        };

        let machine_id = MachineId::new(record.machine);
        let session = match sessions.entry(machine_id.clone()) {
            std::collections::btree_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::btree_map::Entry::Vacant(entry) => {
                match engine.begin_refill(&machine_id) {
                    Ok(session) => entry.insert(session),
                    Err(_e) => {
                        #[cfg(debug_assertions)]
                        eprintln!("Skipping row for {}: {}", machine_id, _e);
                        continue;
                    }
                }
            }
        };

        let product_id = ProductId(record.product);
        let in_qty = record.in_qty.unwrap_or(0).max(0) as u32;
        let out_qty = record.out_qty.unwrap_or(0).max(0) as u32;
        let applied = match session.set_in(product_id, in_qty) {
            Ok(()) => session.set_out(product_id, out_qty),
            Err(e) => Err(e),
        };
        if let Err(_e) = applied {
            #[cfg(debug_assertions)]
            eprintln!("Skipping row for product {}: {}", product_id, _e);
        }
    }

    Ok(sessions.into_values().collect())
}

/// Applies a quick-fill code to every machine in the ledger.
pub fn quick_fill_sessions(engine: &RefillEngine, code: &str) -> Vec<RefillSession> {
    let code = QuickFillCode::parse(code);
    engine
        .machine_ids()
        .into_iter()
        .filter_map(|machine_id| {
            let mut session = engine.begin_refill(&machine_id).ok()?;
            session.apply_code(code);
            Some(session)
        })
        .collect()
}

/// Commits each session with the given delivery details.
///
/// Sessions with no pending entries are skipped; commit failures are
/// reported on stderr and leave that machine's stock untouched.
pub fn commit_sessions(engine: &RefillEngine, sessions: Vec<RefillSession>, details: &DeliveryDetails) {
    for session in sessions {
        if session.is_empty() {
            continue;
        }
        let machine_id = session.machine_id().clone();
        if let Err(e) = engine.commit_refill(session, details.clone()) {
            eprintln!("Skipping refill for {}: {}", machine_id, e);
        }
    }
}

/// Writes the inventory snapshot as CSV.
///
/// Columns: `machine, product, name, stock, capacity`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_inventory<W: Write>(engine: &RefillEngine, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for product in engine.all_products() {
        wtr.serialize(&product)?;
    }

    wtr.flush()?;
    Ok(())
}

/// One output row per product line of a recorded refill.
#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    machine: &'a str,
    refill: u64,
    timestamp: String,
    driver: &'a str,
    product: &'a str,
    #[serde(rename = "in")]
    in_qty: u32,
    overflow: u32,
    #[serde(rename = "out")]
    out_qty: u32,
    previous: u32,
    new: u32,
}

/// Writes the refill history as CSV, most recent refill first.
///
/// Columns: `machine, refill, timestamp, driver, product, in, overflow,
/// out, previous, new`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_history<W: Write>(engine: &RefillEngine, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for transaction in engine.refill_log() {
        for update in &transaction.product_updates {
            wtr.serialize(HistoryRow {
                machine: &transaction.machine_id.0,
                refill: transaction.id.0,
                timestamp: transaction.timestamp.to_rfc3339(),
                driver: transaction.recorded_by(),
                product: &update.product_name,
                in_qty: update.in_qty,
                overflow: update.overflow,
                out_qty: update.out_qty,
                previous: update.previous_stock,
                new: update.new_stock,
            })?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const INVENTORY: &str = "machine,product,name,stock,capacity\n\
                             M0001,1,Coca Cola,12,50\n\
                             M0001,2,Water,5,40\n\
                             M0002,3,Chips,25,30\n";

    #[test]
    fn parse_inventory() {
        let engine = load_inventory(Cursor::new(INVENTORY)).unwrap();

        assert_eq!(engine.all_products().len(), 3);
        let product = engine.get_product(&ProductId(1)).unwrap();
        assert_eq!(product.current_stock(), 12);
        assert_eq!(product.capacity(), 50);
    }

    #[test]
    fn skip_malformed_inventory_rows() {
        let csv = "machine,product,name,stock,capacity\n\
                   M0001,1,Coca Cola,12,50\n\
                   M0001,not-a-number,Water,5,40\n\
                   M0001,3,Chips,25,0\n\
                   M0001,4,Candy Bar,18,30\n";
        let engine = load_inventory(Cursor::new(csv)).unwrap();

        // Bad product id and zero capacity are skipped.
        assert_eq!(engine.all_products().len(), 2);
    }

    #[test]
    fn negative_stock_coerces_to_zero() {
        let csv = "machine,product,name,stock,capacity\nM0001,1,Coca Cola,-7,50\n";
        let engine = load_inventory(Cursor::new(csv)).unwrap();
        assert_eq!(engine.get_product(&ProductId(1)).unwrap().current_stock(), 0);
    }

    #[test]
    fn plan_applies_with_overflow() {
        let engine = load_inventory(Cursor::new(
            "machine,product,name,stock,capacity\nM0001,1,Coca Cola,45,50\n",
        ))
        .unwrap();

        let plan = "machine,product,in,out\nM0001,1,10,0\n";
        let sessions = load_plan(&engine, Cursor::new(plan)).unwrap();
        commit_sessions(&engine, sessions, &DeliveryDetails::new("John Smith"));

        assert_eq!(engine.get_product(&ProductId(1)).unwrap().current_stock(), 50);
        let history = engine.refill_history(&MachineId::new("M0001"));
        assert_eq!(history[0].product_updates[0].overflow, 5);
    }

    #[test]
    fn negative_plan_quantities_coerce_to_zero() {
        let engine = load_inventory(Cursor::new(INVENTORY)).unwrap();

        let plan = "machine,product,in,out\nM0001,1,-3,-2\n";
        let sessions = load_plan(&engine, Cursor::new(plan)).unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].entry(ProductId(1)).is_empty());
    }

    #[test]
    fn quick_fill_code_fills_every_machine() {
        let engine = load_inventory(Cursor::new(INVENTORY)).unwrap();

        let sessions = quick_fill_sessions(&engine, "FULL");
        commit_sessions(&engine, sessions, &DeliveryDetails::new("John Smith"));

        for product in engine.all_products() {
            assert_eq!(product.current_stock(), product.capacity());
        }
    }

    #[test]
    fn commit_without_driver_leaves_stock_unchanged() {
        let engine = load_inventory(Cursor::new(INVENTORY)).unwrap();

        let sessions = quick_fill_sessions(&engine, "FULL");
        commit_sessions(&engine, sessions, &DeliveryDetails::new(""));

        assert_eq!(engine.get_product(&ProductId(1)).unwrap().current_stock(), 12);
        assert!(engine.refill_log().is_empty());
    }

    #[test]
    fn insufficient_out_skips_that_machine() {
        let engine = load_inventory(Cursor::new(INVENTORY)).unwrap();

        // Product 2 holds 5 units; removing 9 must abort machine M0001
        // entirely, including the valid entry for product 1.
        let plan = "machine,product,in,out\n\
                    M0001,1,10,0\n\
                    M0001,2,0,9\n\
                    M0002,3,5,0\n";
        let sessions = load_plan(&engine, Cursor::new(plan)).unwrap();
        commit_sessions(&engine, sessions, &DeliveryDetails::new("John Smith"));

        assert_eq!(engine.get_product(&ProductId(1)).unwrap().current_stock(), 12);
        assert_eq!(engine.get_product(&ProductId(2)).unwrap().current_stock(), 5);
        assert_eq!(engine.get_product(&ProductId(3)).unwrap().current_stock(), 30);
    }

    #[test]
    fn write_inventory_to_csv() {
        let engine = load_inventory(Cursor::new(INVENTORY)).unwrap();

        let mut output = Vec::new();
        write_inventory(&engine, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("machine,product,name,stock,capacity"));
        assert!(output_str.contains("M0001,1,Coca Cola,12,50"));
    }

    #[test]
    fn write_history_to_csv() {
        let engine = load_inventory(Cursor::new(INVENTORY)).unwrap();
        let sessions = quick_fill_sessions(&engine, "3");
        commit_sessions(
            &engine,
            sessions,
            &DeliveryDetails::new("John Smith").with_lorry("LRY-1234"),
        );

        let mut output = Vec::new();
        write_history(&engine, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("machine,refill,timestamp,driver,product,in,overflow,out,previous,new"));
        assert!(output_str.contains("John Smith"));
        assert!(output_str.contains("Coca Cola"));
    }
}
