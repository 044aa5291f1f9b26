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

//! Error types for payment allocation.

use crate::base::{InstrumentId, LOYALTY_ID, OrderId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Payment allocation errors.
///
/// Capacity errors raised during the optimized phases trigger the flat
/// no-discount recovery and are not surfaced to the caller; configuration
/// errors and recovery failures are fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// Negative amount passed to a ledger mutation; rejected before any
    /// state changes.
    #[error("amount must be non-negative")]
    NegativeAmount,

    /// Consume targeted an instrument that is not in the ledger.
    #[error("unknown payment instrument '{0}'")]
    UnknownInstrument(InstrumentId),

    /// The loyalty-points instrument is missing from the instrument list.
    #[error("loyalty instrument '{}' missing from instrument list", LOYALTY_ID)]
    MissingLoyaltyInstrument,

    /// Phase 3 found no instrument with remaining capacity below the order
    /// amount to drain.
    #[error("no drainable instrument with remaining capacity below {amount} for order {order}")]
    NoDrainableInstrument { order: OrderId, amount: Decimal },

    /// Phase 3 shortfall exceeds the remaining loyalty balance.
    #[error("order {order} needs {required} points but only {available} remain")]
    InsufficientPoints {
        order: OrderId,
        required: Decimal,
        available: Decimal,
    },

    /// The flat fallback could not place an order's remainder on any
    /// instrument. There is no further recovery.
    #[error("no instrument can cover remainder {remainder} for order {order}")]
    NoInstrumentForRemainder { order: OrderId, remainder: Decimal },
}
