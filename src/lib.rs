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

//! # PromoPay
//!
//! This library allocates a fixed set of payment instruments - one
//! loyalty-points account plus several card-like instruments, each with a
//! spending limit and a discount percentage - across a batch of independent
//! orders, maximizing total discount while guaranteeing every order is paid
//! exactly once and no instrument exceeds its limit.
//!
//! ## Core Components
//!
//! - [`Engine`]: orchestrates the allocation phases and the recovery path
//! - [`Ledger`]: instrument state with remaining-capacity queries
//! - [`Candidate`]: one proposed way to pay an order, discount applied
//! - [`AllocationError`]: error types for allocation failures
//!
//! ## Example
//!
//! ```
//! use promopay_rs::{Engine, InstrumentId, Order, OrderId, PaymentInstrument};
//! use rust_decimal_macros::dec;
//!
//! let orders = vec![Order::new(
//!     OrderId::from("O1"),
//!     dec!(100.00),
//!     vec![InstrumentId::from("CARD")],
//! )];
//! let instruments = vec![
//!     PaymentInstrument::new(InstrumentId::from("PUNKTY"), dec!(15), dec!(20.00)),
//!     PaymentInstrument::new(InstrumentId::from("CARD"), dec!(10), dec!(200.00)),
//! ];
//!
//! let mut engine = Engine::new(orders, instruments).unwrap();
//! engine.run().unwrap();
//!
//! // The 10% promotion pays the order: 90.00 drawn from the card.
//! let report = engine.report();
//! assert_eq!(report[1].1, dec!(90.00));
//! ```
//!
//! ## Concurrency
//!
//! The engine is a one-shot, single-threaded batch computation. A given
//! [`Ledger`] or [`Engine`] instance must not be shared across concurrent
//! allocation runs.

mod base;
pub mod candidate;
mod engine;
pub mod error;
mod instrument;
mod order;

pub use base::{InstrumentId, LOYALTY_ID, OrderId};
pub use candidate::{Candidate, generate_candidates};
pub use engine::Engine;
pub use error::AllocationError;
pub use instrument::{Ledger, PaymentInstrument};
pub use order::Order;
