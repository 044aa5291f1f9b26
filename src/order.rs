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

//! Order data type.

use crate::base::{InstrumentId, OrderId};
use rust_decimal::Decimal;
use serde::Deserialize;

/// A single order to be paid. Immutable once loaded.
///
/// The JSON wire format uses the key `value` for the amount; `promotions`
/// lists the instruments the order may combine with a promotion, in
/// preference order, and may be absent entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Amount to pay, exact and non-negative.
    #[serde(rename = "value")]
    pub amount: Decimal,
    /// Instrument identifiers eligible for a promotion, in listed order.
    #[serde(default)]
    pub promotions: Vec<InstrumentId>,
}

impl Order {
    pub fn new(id: OrderId, amount: Decimal, promotions: Vec<InstrumentId>) -> Self {
        Self {
            id,
            amount,
            promotions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn deserializes_wire_format() {
        let order: Order =
            serde_json::from_str(r#"{"id":"ORDER1","value":"100.00","promotions":["mZysk"]}"#)
                .unwrap();
        assert_eq!(order.id, "ORDER1".into());
        assert_eq!(order.amount, dec!(100.00));
        assert_eq!(order.promotions, vec![InstrumentId::from("mZysk")]);
    }

    #[test]
    fn missing_promotions_defaults_to_empty() {
        let order: Order = serde_json::from_str(r#"{"id":"ORDER4","value":"50.00"}"#).unwrap();
        assert!(order.promotions.is_empty());
    }
}
