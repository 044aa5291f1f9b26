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
use promopay_rs::{Engine, Order, PaymentInstrument};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// PromoPay - Allocate payment instruments across a batch of orders
///
/// Reads orders and payment instruments from two JSON files, runs the
/// allocation engine, and prints each instrument's consumed amount to
/// stdout, one "<id> <amount>" line per instrument in input order.
#[derive(Parser, Debug)]
#[command(name = "promopay-rs")]
#[command(about = "A payment allocator that maximizes promotion discounts", long_about = None)]
struct Args {
    /// Path to JSON file with orders
    ///
    /// Expected format: [{"id":"ORDER1","value":"100.00","promotions":["mZysk"]}, ...]
    #[arg(value_name = "ORDERS")]
    orders: PathBuf,

    /// Path to JSON file with payment instruments
    ///
    /// Expected format: [{"id":"PUNKTY","discount":"15","limit":"100.00"}, ...]
    #[arg(value_name = "INSTRUMENTS")]
    instruments: PathBuf,
}

fn main() {
    // Diagnostics go to stderr; stdout carries only the consumed amounts.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let orders: Vec<Order> = load_json(&args.orders);
    let instruments: Vec<PaymentInstrument> = load_json(&args.instruments);

    let mut engine = match Engine::new(orders, instruments) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = engine.run() {
        eprintln!("Allocation failed: {}", e);
        process::exit(1);
    }

    for (id, consumed) in engine.report() {
        println!("{} {}", id, consumed);
    }
}

/// Loads and deserializes a JSON file, exiting with status 2 on failure.
fn load_json<T: DeserializeOwned>(path: &Path) -> T {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", path.display(), e);
            process::exit(2);
        }
    };
    match serde_json::from_reader(BufReader::new(file)) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error parsing '{}': {}", path.display(), e);
            process::exit(2);
        }
    }
}
