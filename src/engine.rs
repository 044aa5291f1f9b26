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

//! Payment allocation engine.
//!
//! The [`Engine`] sequences the allocation phases over one batch of orders:
//!
//! 1. **Greedy pass**: candidates ranked by discount favorability, best
//!    affordable one committed per order.
//! 2. **Full-instrument fallback**: remaining orders paid entirely on the
//!    best-fit instrument, no discount.
//! 3. **Partial points fallback**: remaining orders paid by fully draining
//!    one instrument and covering the shortfall with points.
//!
//! Any failure during the optimized phases triggers a full recovery: the
//! ledger is reset, the paid-set cleared, and every order reprocessed in
//! input order under a flat, discount-free strategy. A failure during that
//! flat fallback is fatal and propagates to the caller.
//!
//! # Invariants
//!
//! - An order is paid at most once per attempt; the paid-set is cleared
//!   only by the recovery reset.
//! - No instrument's consumed amount ever exceeds its limit: every commit
//!   is preceded by a remaining-capacity check in the committing phase.
//! - Phases run strictly sequentially over ledger state; an `Engine` (and
//!   its ledger) must not be shared across concurrent allocation runs.

use crate::base::{InstrumentId, OrderId};
use crate::candidate::generate_candidates;
use crate::error::AllocationError;
use crate::instrument::{Ledger, PaymentInstrument};
use crate::order::Order;
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::{debug, warn};

/// One-shot allocation engine over a batch of orders and an instrument
/// ledger.
///
/// The engine owns the ledger exclusively for the duration of a run. The
/// computation is single-threaded and synchronous; it always terminates,
/// bounded by orders x instruments.
pub struct Engine {
    orders: Vec<Order>,
    ledger: Ledger,
    paid: HashSet<OrderId>,
}

impl Engine {
    /// Builds an engine from the two input collections.
    ///
    /// # Errors
    ///
    /// [`AllocationError::MissingLoyaltyInstrument`] if the instrument
    /// collection lacks the reserved loyalty instrument, which both the
    /// optimized strategy and the flat fallback depend on.
    pub fn new(
        orders: Vec<Order>,
        instruments: Vec<PaymentInstrument>,
    ) -> Result<Self, AllocationError> {
        Ok(Self {
            orders,
            ledger: Ledger::new(instruments)?,
            paid: HashSet::new(),
        })
    }

    /// Runs the full allocation.
    ///
    /// On success every order has been paid exactly once and the ledger
    /// holds the final consumed amounts. A failure inside the optimized
    /// phases is logged and silently downgraded to the flat no-discount
    /// strategy; only a failure of that last resort is returned.
    ///
    /// # Errors
    ///
    /// [`AllocationError::NoInstrumentForRemainder`] when even the flat
    /// fallback cannot place an order. There is no further recovery.
    pub fn run(&mut self) -> Result<(), AllocationError> {
        match self.run_optimized() {
            Ok(()) => {
                debug!(paid = self.paid.len(), "optimized allocation complete");
                Ok(())
            }
            Err(error) => {
                warn!(%error, "optimized allocation failed, retrying all orders without discounts");
                self.ledger.reset();
                self.paid.clear();
                self.flat_fallback()
            }
        }
    }

    fn run_optimized(&mut self) -> Result<(), AllocationError> {
        self.greedy_pass()?;
        self.full_fit_pass()?;
        self.partial_points_pass()
    }

    /// Phase 1: commits the most favorable affordable candidate per order.
    ///
    /// Candidates are sorted by discount ratio, then discount amount, both
    /// descending; the sort is stable so equally ranked candidates keep
    /// generation order. A single forward pass commits each order's first
    /// affordable candidate; rejected orders are not revisited here.
    pub fn greedy_pass(&mut self) -> Result<(), AllocationError> {
        let mut candidates = generate_candidates(&self.orders, &self.ledger);
        candidates.sort_by(|a, b| {
            b.discount_ratio()
                .cmp(&a.discount_ratio())
                .then_with(|| b.discount_amount().cmp(&a.discount_amount()))
        });

        for candidate in candidates {
            if self.paid.contains(candidate.order_id()) || !candidate.affordable(&self.ledger) {
                continue;
            }
            candidate.commit(&mut self.ledger)?;
            self.paid.insert(candidate.order_id().clone());
        }
        Ok(())
    }

    /// Phase 2: pays remaining orders entirely on the best-fit instrument.
    ///
    /// Orders are processed by amount descending so larger orders claim
    /// capacity first. Best-fit picks the smallest slack among instruments
    /// that fully cover the amount; orders with no fit are left for phase 3
    /// without error.
    pub fn full_fit_pass(&mut self) -> Result<(), AllocationError> {
        for idx in self.unpaid_by_amount_desc() {
            let order = &self.orders[idx];
            let amount = order.amount;
            let Some(id) = min_fit(&self.ledger, amount).map(|m| m.id().clone()) else {
                continue;
            };
            let order_id = order.id.clone();
            self.ledger.consume(&id, amount)?;
            self.paid.insert(order_id);
        }
        Ok(())
    }

    /// Phase 3: drains one instrument fully and covers the shortfall with
    /// points.
    ///
    /// Picks the instrument with the largest remaining capacity strictly
    /// below the order amount. Failing to find one, or lacking the points
    /// to cover the shortfall, aborts the optimized attempt.
    pub fn partial_points_pass(&mut self) -> Result<(), AllocationError> {
        for idx in self.unpaid_by_amount_desc() {
            let order_id = self.orders[idx].id.clone();
            let amount = self.orders[idx].amount;

            let (id, drained) = max_below(&self.ledger, amount)
                .map(|m| (m.id().clone(), m.remaining()))
                .ok_or_else(|| AllocationError::NoDrainableInstrument {
                    order: order_id.clone(),
                    amount,
                })?;

            let required_points = amount - drained;
            let available = self.ledger.loyalty().remaining();
            if required_points > available {
                return Err(AllocationError::InsufficientPoints {
                    order: order_id,
                    required: required_points,
                    available,
                });
            }

            self.ledger.consume(&id, drained)?;
            self.ledger.consume_points(required_points)?;
            self.paid.insert(order_id);
        }
        Ok(())
    }

    /// Phase 4: flat, discount-free recovery over every order in input
    /// order.
    ///
    /// Points are consumed first, capped at the remaining loyalty balance;
    /// any remainder goes to the smallest instrument that fully covers it.
    /// Runs only after [`Ledger::reset`] so no optimized-phase consumption
    /// leaks into the totals.
    pub fn flat_fallback(&mut self) -> Result<(), AllocationError> {
        for idx in 0..self.orders.len() {
            let order_id = self.orders[idx].id.clone();
            let mut remainder = self.orders[idx].amount;

            let use_points = self.ledger.loyalty().remaining().min(remainder);
            if use_points > Decimal::ZERO {
                self.ledger.consume_points(use_points)?;
                remainder -= use_points;
            }

            if remainder > Decimal::ZERO {
                let id = min_fit(&self.ledger, remainder)
                    .map(|m| m.id().clone())
                    .ok_or_else(|| AllocationError::NoInstrumentForRemainder {
                        order: order_id.clone(),
                        remainder,
                    })?;
                self.ledger.consume(&id, remainder)?;
            }

            self.paid.insert(order_id);
        }
        Ok(())
    }

    /// The ledger with the current consumed amounts.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Identifiers of orders committed in the current attempt.
    pub fn paid_orders(&self) -> &HashSet<OrderId> {
        &self.paid
    }

    /// Final consumed amounts in input order, rounded to 2 decimal places.
    pub fn report(&self) -> Vec<(InstrumentId, Decimal)> {
        self.ledger.report()
    }

    /// Indices of unpaid orders, largest amount first; ties keep input
    /// order.
    fn unpaid_by_amount_desc(&self) -> Vec<usize> {
        let mut unpaid: Vec<usize> = (0..self.orders.len())
            .filter(|&i| !self.paid.contains(&self.orders[i].id))
            .collect();
        unpaid.sort_by(|&a, &b| self.orders[b].amount.cmp(&self.orders[a].amount));
        unpaid
    }
}

/// Non-loyalty instrument fully covering `amount` with the smallest slack;
/// ties keep input order.
fn min_fit(ledger: &Ledger, amount: Decimal) -> Option<&PaymentInstrument> {
    ledger
        .instruments()
        .iter()
        .filter(|m| !m.id().is_loyalty())
        .filter(|m| m.remaining() >= amount)
        .min_by_key(|m| m.remaining() - amount)
}

/// Non-loyalty instrument with the largest remaining capacity strictly
/// below `amount`; ties keep input order.
fn max_below(ledger: &Ledger, amount: Decimal) -> Option<&PaymentInstrument> {
    ledger
        .instruments()
        .iter()
        .filter(|m| !m.id().is_loyalty())
        .filter(|m| m.remaining() < amount)
        .min_by_key(|m| Reverse(m.remaining()))
}
