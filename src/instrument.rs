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

//! Payment instruments and the instrument ledger.
//!
//! The [`Ledger`] is the only mutable state of an allocation run. It owns
//! the instrument collection in input order and exposes remaining-capacity
//! queries, the `consume` mutation, and the full reset used by the
//! recovery path.
//!
//! # Example
//!
//! ```
//! use promopay_rs::{InstrumentId, Ledger, PaymentInstrument};
//! use rust_decimal_macros::dec;
//!
//! let ledger = Ledger::new(vec![PaymentInstrument::new(
//!     InstrumentId::from("PUNKTY"),
//!     dec!(15),
//!     dec!(100.00),
//! )])
//! .unwrap();
//! assert_eq!(ledger.loyalty().remaining(), dec!(100.00));
//! ```

use crate::base::InstrumentId;
use crate::error::AllocationError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use std::collections::HashMap;

/// A payment instrument: the loyalty-points account or a card-like
/// instrument with a spending limit and a discount percentage.
///
/// `consumed` starts at zero and is monotonically non-decreasing within a
/// phase; only [`Ledger::reset`] sets it back to zero.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInstrument {
    id: InstrumentId,
    /// Discount percentage in the range 0-100.
    #[serde(rename = "discount")]
    discount_percent: Decimal,
    limit: Decimal,
    #[serde(skip)]
    consumed: Decimal,
}

impl PaymentInstrument {
    pub fn new(id: InstrumentId, discount_percent: Decimal, limit: Decimal) -> Self {
        Self {
            id,
            discount_percent,
            limit,
            consumed: Decimal::ZERO,
        }
    }

    pub fn id(&self) -> &InstrumentId {
        &self.id
    }

    pub fn limit(&self) -> Decimal {
        self.limit
    }

    pub fn consumed(&self) -> Decimal {
        self.consumed
    }

    /// Returns `limit - consumed`.
    pub fn remaining(&self) -> Decimal {
        self.limit - self.consumed
    }

    /// Discount percentage as a ratio, rounded to 2 decimal places
    /// (half-up). A 15% instrument yields `0.15`.
    pub fn discount_ratio(&self) -> Decimal {
        (self.discount_percent / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Adds `amount` to the consumed total.
    ///
    /// Rejects negative amounts before any state changes. Deliberately
    /// performs no capacity check: the portions of one candidate are
    /// committed in sequence and a partial commit must never be rolled
    /// back implicitly, so affordability is the caller's responsibility.
    pub fn consume(&mut self, amount: Decimal) -> Result<(), AllocationError> {
        if amount < Decimal::ZERO {
            return Err(AllocationError::NegativeAmount);
        }
        self.consumed += amount;
        debug_assert!(self.consumed >= Decimal::ZERO);
        Ok(())
    }

    fn reset(&mut self) {
        self.consumed = Decimal::ZERO;
    }
}

/// The instrument ledger for one allocation run.
///
/// Holds the instruments in input order and indexes them by identifier.
/// Construction fails if the loyalty instrument is absent, since both the
/// optimized strategy and the flat fallback depend on it.
///
/// A ledger must not be shared across concurrent allocation runs; the
/// engine owns it exclusively for the duration of a run.
#[derive(Debug, Clone)]
pub struct Ledger {
    instruments: Vec<PaymentInstrument>,
    index: HashMap<InstrumentId, usize>,
    loyalty: usize,
}

impl Ledger {
    /// Builds a ledger from the instrument collection, preserving input
    /// order.
    ///
    /// # Errors
    ///
    /// [`AllocationError::MissingLoyaltyInstrument`] if no instrument uses
    /// the reserved loyalty identifier.
    pub fn new(instruments: Vec<PaymentInstrument>) -> Result<Self, AllocationError> {
        let loyalty = instruments
            .iter()
            .position(|m| m.id.is_loyalty())
            .ok_or(AllocationError::MissingLoyaltyInstrument)?;
        let index = instruments
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        Ok(Self {
            instruments,
            index,
            loyalty,
        })
    }

    /// All instruments, in input order.
    pub fn instruments(&self) -> &[PaymentInstrument] {
        &self.instruments
    }

    pub fn get(&self, id: &InstrumentId) -> Option<&PaymentInstrument> {
        self.index.get(id).map(|&i| &self.instruments[i])
    }

    /// The loyalty-points instrument.
    pub fn loyalty(&self) -> &PaymentInstrument {
        &self.instruments[self.loyalty]
    }

    /// Remaining capacity of the instrument, if it exists.
    pub fn remaining(&self, id: &InstrumentId) -> Option<Decimal> {
        self.get(id).map(PaymentInstrument::remaining)
    }

    /// Consumes `amount` from the identified instrument.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::UnknownInstrument`] if the id is not in the
    ///   ledger.
    /// - [`AllocationError::NegativeAmount`] if the amount is negative; the
    ///   instrument is left untouched.
    pub fn consume(&mut self, id: &InstrumentId, amount: Decimal) -> Result<(), AllocationError> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| AllocationError::UnknownInstrument(id.clone()))?;
        self.instruments[idx].consume(amount)
    }

    /// Consumes `amount` from the loyalty-points instrument.
    pub fn consume_points(&mut self, amount: Decimal) -> Result<(), AllocationError> {
        self.instruments[self.loyalty].consume(amount)
    }

    /// Zeroes every instrument's consumed amount. Used only by the
    /// orchestrator's recovery path.
    pub fn reset(&mut self) {
        for instrument in &mut self.instruments {
            instrument.reset();
        }
    }

    /// Final consumed amounts in input order, rounded to 2 decimal places
    /// (half-up). This is the sole externally observed result of a run.
    pub fn report(&self) -> Vec<(InstrumentId, Decimal)> {
        self.instruments
            .iter()
            .map(|m| {
                let mut consumed = m
                    .consumed
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                consumed.rescale(2);
                (m.id.clone(), consumed)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::LOYALTY_ID;
    use rust_decimal_macros::dec;

    fn card(id: &str, discount: Decimal, limit: Decimal) -> PaymentInstrument {
        PaymentInstrument::new(id.into(), discount, limit)
    }

    #[test]
    fn initial_remaining_equals_limit() {
        let instrument = card("CARD", dec!(15), dec!(100.00));
        assert_eq!(instrument.remaining(), dec!(100.00));
        assert_eq!(instrument.consumed(), Decimal::ZERO);
    }

    #[test]
    fn consume_reduces_remaining() {
        let mut instrument = card("CARD", dec!(15), dec!(100.00));
        instrument.consume(dec!(30.50)).unwrap();
        assert_eq!(instrument.remaining(), dec!(69.50));
        instrument.consume(dec!(0.50)).unwrap();
        assert_eq!(instrument.remaining(), dec!(69.00));
    }

    #[test]
    fn negative_consume_rejected_and_state_unchanged() {
        let mut instrument = card("CARD", dec!(15), dec!(100.00));
        let result = instrument.consume(dec!(-1));
        assert_eq!(result, Err(AllocationError::NegativeAmount));
        assert_eq!(instrument.consumed(), Decimal::ZERO);
    }

    #[test]
    fn discount_ratio_rounds_half_up_to_two_places() {
        assert_eq!(card("A", dec!(15), dec!(100)).discount_ratio(), dec!(0.15));
        assert_eq!(card("B", dec!(7), dec!(50)).discount_ratio(), dec!(0.07));
        // 12.5% -> 0.125 -> 0.13 under half-up
        assert_eq!(card("C", dec!(12.5), dec!(50)).discount_ratio(), dec!(0.13));
    }

    #[test]
    fn ledger_requires_loyalty_instrument() {
        let result = Ledger::new(vec![card("CARD", dec!(10), dec!(100))]);
        assert_eq!(result.err(), Some(AllocationError::MissingLoyaltyInstrument));
    }

    #[test]
    fn ledger_consume_unknown_instrument() {
        let mut ledger = Ledger::new(vec![card(LOYALTY_ID, dec!(10), dec!(100))]).unwrap();
        let result = ledger.consume(&"GHOST".into(), dec!(5));
        assert_eq!(
            result,
            Err(AllocationError::UnknownInstrument("GHOST".into()))
        );
    }

    #[test]
    fn reset_zeroes_all_consumption() {
        let mut ledger = Ledger::new(vec![
            card(LOYALTY_ID, dec!(10), dec!(100)),
            card("CARD", dec!(5), dec!(200)),
        ])
        .unwrap();
        ledger.consume_points(dec!(40)).unwrap();
        ledger.consume(&"CARD".into(), dec!(150)).unwrap();

        ledger.reset();

        assert_eq!(ledger.loyalty().consumed(), Decimal::ZERO);
        assert_eq!(ledger.remaining(&"CARD".into()), Some(dec!(200)));
    }

    #[test]
    fn report_rounds_half_up_and_keeps_input_order() {
        let mut ledger = Ledger::new(vec![
            card("CARD", dec!(5), dec!(200)),
            card(LOYALTY_ID, dec!(10), dec!(100)),
        ])
        .unwrap();
        ledger.consume(&"CARD".into(), dec!(10.005)).unwrap();

        let report = ledger.report();
        assert_eq!(report[0], ("CARD".into(), dec!(10.01)));
        assert_eq!(report[1], (LOYALTY_ID.into(), dec!(0.00)));
    }
}
