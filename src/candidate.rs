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

//! Payment candidates and candidate generation.
//!
//! A [`Candidate`] is one proposed way to pay a single order: entirely on a
//! promotion-eligible instrument, entirely on loyalty points, or as a fixed
//! 10/90 points/instrument split. Candidates are ephemeral; they are
//! generated fresh per allocation attempt and discarded after the greedy
//! pass.
//!
//! Generation emits candidates in a fixed order per order (promotions in
//! listed order, then points-only, then mixed splits over the instrument
//! list). The greedy selector's sort is stable, so this order doubles as
//! the deterministic tie-break between candidates of equal discount.

use crate::base::{InstrumentId, OrderId};
use crate::instrument::Ledger;
use crate::order::Order;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Points share of the fixed mixed split.
const POINTS_SHARE: Decimal = dec!(0.10);
/// Instrument share of the fixed mixed split.
const INSTRUMENT_SHARE: Decimal = dec!(0.90);

/// A proposed way to pay one order, with the discount already applied.
///
/// On construction the discount amount is subtracted from whichever portion
/// is non-zero: from the points portion when the instrument portion is zero,
/// otherwise from the instrument portion. The stored portions are therefore
/// the actual post-discount draws that are checked against remaining
/// capacity and committed to the ledger.
#[derive(Debug, Clone)]
pub struct Candidate {
    order_id: OrderId,
    instrument_id: InstrumentId,
    points_portion: Decimal,
    instrument_portion: Decimal,
    discount_amount: Decimal,
    discount_ratio: Decimal,
}

impl Candidate {
    pub fn new(
        order_id: OrderId,
        instrument_id: InstrumentId,
        points_portion: Decimal,
        instrument_portion: Decimal,
        discount_amount: Decimal,
        discount_ratio: Decimal,
    ) -> Self {
        let mut candidate = Self {
            order_id,
            instrument_id,
            points_portion,
            instrument_portion,
            discount_amount,
            discount_ratio,
        };
        if candidate.instrument_portion.is_zero() {
            candidate.points_portion -= candidate.discount_amount;
        } else {
            candidate.instrument_portion -= candidate.discount_amount;
        }
        candidate
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn instrument_id(&self) -> &InstrumentId {
        &self.instrument_id
    }

    pub fn points_portion(&self) -> Decimal {
        self.points_portion
    }

    pub fn instrument_portion(&self) -> Decimal {
        self.instrument_portion
    }

    pub fn discount_amount(&self) -> Decimal {
        self.discount_amount
    }

    pub fn discount_ratio(&self) -> Decimal {
        self.discount_ratio
    }

    /// Whether both portions fit in the current remaining capacities.
    pub fn affordable(&self, ledger: &Ledger) -> bool {
        self.points_portion <= ledger.loyalty().remaining()
            && ledger
                .remaining(&self.instrument_id)
                .is_some_and(|remaining| self.instrument_portion <= remaining)
    }

    /// Commits both portions, points first, each only if positive.
    ///
    /// Callers must have verified [`affordable`](Self::affordable); a
    /// partial commit is never rolled back.
    pub fn commit(&self, ledger: &mut Ledger) -> Result<(), crate::error::AllocationError> {
        if self.points_portion > Decimal::ZERO {
            ledger.consume_points(self.points_portion)?;
        }
        if self.instrument_portion > Decimal::ZERO {
            ledger.consume(&self.instrument_id, self.instrument_portion)?;
        }
        Ok(())
    }
}

/// Enumerates every financially valid way to pay each order.
///
/// Per order, in this fixed order:
///
/// 1. One full-instrument candidate per listed promotion whose instrument
///    exists, is not the loyalty instrument, and whose limit covers the
///    order amount after that instrument's own discount.
/// 2. A points-only candidate when the loyalty limit covers the order
///    amount after the loyalty discount.
/// 3. One mixed 10/90 candidate per non-loyalty instrument, gated on the
///    loyalty limit covering the points share and the instrument limit
///    covering the post-discount instrument draw; the split carries a fixed
///    0.10 discount ratio.
///
/// All gates compare the instrument's total limit against the post-discount
/// draw, so an order whose amount exactly matches the discounted limit is
/// still eligible. An order failing every gate yields no candidates, which
/// is the expected trigger for the fallback phases.
pub fn generate_candidates(orders: &[Order], ledger: &Ledger) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let loyalty = ledger.loyalty();

    for order in orders {
        let amount = order.amount;

        for promotion in &order.promotions {
            let Some(instrument) = ledger.get(promotion) else {
                continue;
            };
            if instrument.id().is_loyalty() {
                continue;
            }
            let ratio = instrument.discount_ratio();
            let discount = amount * ratio;
            if instrument.limit() >= amount - discount {
                candidates.push(Candidate::new(
                    order.id.clone(),
                    instrument.id().clone(),
                    Decimal::ZERO,
                    amount,
                    discount,
                    ratio,
                ));
            }
        }

        let ratio = loyalty.discount_ratio();
        let discount = amount * ratio;
        if loyalty.limit() >= amount - discount {
            candidates.push(Candidate::new(
                order.id.clone(),
                loyalty.id().clone(),
                amount,
                Decimal::ZERO,
                discount,
                ratio,
            ));
        }

        let points_share = amount * POINTS_SHARE;
        let instrument_share = amount * INSTRUMENT_SHARE;
        for instrument in ledger.instruments() {
            if instrument.id().is_loyalty() {
                continue;
            }
            if loyalty.limit() >= points_share
                && instrument.limit() >= instrument_share - points_share
            {
                candidates.push(Candidate::new(
                    order.id.clone(),
                    instrument.id().clone(),
                    points_share,
                    instrument_share,
                    points_share,
                    POINTS_SHARE,
                ));
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::LOYALTY_ID;
    use crate::instrument::PaymentInstrument;
    use rust_decimal_macros::dec;

    fn instrument(id: &str, discount: Decimal, limit: Decimal) -> PaymentInstrument {
        PaymentInstrument::new(id.into(), discount, limit)
    }

    fn test_ledger() -> Ledger {
        Ledger::new(vec![
            instrument(LOYALTY_ID, dec!(10), dec!(80)),
            instrument("C1", dec!(20), dec!(120)),
            instrument("C2", dec!(5), dec!(39)),
        ])
        .unwrap()
    }

    #[test]
    fn full_instrument_candidate_discounts_instrument_portion() {
        let candidate = Candidate::new(
            "O1".into(),
            "CARD".into(),
            Decimal::ZERO,
            dec!(50.00),
            dec!(10.00),
            dec!(0.20),
        );
        assert_eq!(candidate.instrument_portion(), dec!(40.00));
        assert_eq!(candidate.points_portion(), Decimal::ZERO);
    }

    #[test]
    fn points_only_candidate_discounts_points_portion() {
        let candidate = Candidate::new(
            "O1".into(),
            LOYALTY_ID.into(),
            dec!(50.00),
            Decimal::ZERO,
            dec!(5.00),
            dec!(0.10),
        );
        assert_eq!(candidate.points_portion(), dec!(45.00));
        assert_eq!(candidate.instrument_portion(), Decimal::ZERO);
    }

    #[test]
    fn mixed_candidate_discounts_instrument_portion_only() {
        let candidate = Candidate::new(
            "O1".into(),
            "CARD".into(),
            dec!(5.00),
            dec!(45.00),
            dec!(5.00),
            dec!(0.10),
        );
        assert_eq!(candidate.points_portion(), dec!(5.00));
        assert_eq!(candidate.instrument_portion(), dec!(40.00));
    }

    #[test]
    fn affordable_respects_both_limits() {
        let mut ledger = Ledger::new(vec![
            instrument(LOYALTY_ID, dec!(10), dec!(100.00)),
            instrument("CARD", dec!(20), dec!(200.00)),
        ])
        .unwrap();
        let candidate = Candidate::new(
            "O1".into(),
            "CARD".into(),
            dec!(5.00),
            dec!(45.00),
            dec!(5.00),
            dec!(0.10),
        );
        assert!(candidate.affordable(&ledger));

        // Drain the card to just below the required portion.
        ledger.consume(&"CARD".into(), dec!(160.01)).unwrap();
        assert!(!candidate.affordable(&ledger));
    }

    #[test]
    fn affordable_is_inclusive_at_the_boundary() {
        let mut ledger = Ledger::new(vec![
            instrument(LOYALTY_ID, dec!(10), dec!(100.00)),
            instrument("CARD", dec!(20), dec!(200.00)),
        ])
        .unwrap();
        let candidate = Candidate::new(
            "O1".into(),
            LOYALTY_ID.into(),
            dec!(50.00),
            Decimal::ZERO,
            dec!(5.00),
            dec!(0.10),
        );
        // Exactly 45.00 points remain; the candidate needs exactly 45.00.
        ledger.consume_points(dec!(55.00)).unwrap();
        assert!(candidate.affordable(&ledger));
        ledger.consume_points(dec!(0.01)).unwrap();
        assert!(!candidate.affordable(&ledger));
    }

    #[test]
    fn commit_consumes_points_then_instrument() {
        let mut ledger = Ledger::new(vec![
            instrument(LOYALTY_ID, dec!(10), dec!(100.00)),
            instrument("CARD", dec!(20), dec!(200.00)),
        ])
        .unwrap();
        let candidate = Candidate::new(
            "O1".into(),
            "CARD".into(),
            dec!(5.00),
            dec!(45.00),
            dec!(5.00),
            dec!(0.10),
        );
        candidate.commit(&mut ledger).unwrap();
        assert_eq!(ledger.loyalty().remaining(), dec!(95.00));
        assert_eq!(ledger.remaining(&"CARD".into()), Some(dec!(160.00)));
    }

    #[test]
    fn generation_counts_per_order() {
        let ledger = test_ledger();
        let orders = vec![
            Order::new("O1".into(), dec!(100), vec!["C1".into()]),
            Order::new("O2".into(), dec!(50), vec![]),
        ];

        let candidates = generate_candidates(&orders, &ledger);

        // O1: full C1 (limit 120 >= 80) and mixed C1; mixed C2 fails its
        // gate (39 < 80), points-only fails (80 < 90).
        let o1 = candidates
            .iter()
            .filter(|c| c.order_id() == &"O1".into())
            .count();
        assert_eq!(o1, 2);

        // O2: points-only (80 >= 45) and mixed C1; mixed C2 fails (39 < 40).
        let o2 = candidates
            .iter()
            .filter(|c| c.order_id() == &"O2".into())
            .count();
        assert_eq!(o2, 2);
    }

    #[test]
    fn unknown_and_loyalty_promotions_are_skipped() {
        let ledger = test_ledger();
        let orders = vec![Order::new(
            "O1".into(),
            dec!(10),
            vec!["GHOST".into(), LOYALTY_ID.into()],
        )];

        let candidates = generate_candidates(&orders, &ledger);

        // Only points-only and the two mixed candidates survive.
        assert!(
            candidates
                .iter()
                .all(|c| c.points_portion() > Decimal::ZERO)
        );
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn no_candidates_without_capacity() {
        let ledger = Ledger::new(vec![
            instrument(LOYALTY_ID, dec!(10), dec!(5.00)),
            instrument("CARD", dec!(15), dec!(40.00)),
        ])
        .unwrap();
        let orders = vec![Order::new("X".into(), dec!(60.00), vec![])];

        // Points-only fails (5 < 54), mixed fails the points gate (5 < 6).
        assert!(generate_candidates(&orders, &ledger).is_empty());
    }
}
