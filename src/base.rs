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

//! Core identifier types for orders and payment instruments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved identifier of the loyalty-points instrument.
///
/// Every instrument collection must contain exactly one instrument with
/// this identifier; its absence is a configuration error.
pub const LOYALTY_ID: &str = "PUNKTY";

/// Unique identifier for an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        OrderId(id.to_owned())
    }
}

/// Unique identifier for a payment instrument.
///
/// The loyalty-points instrument uses the reserved identifier [`LOYALTY_ID`];
/// all other identifiers denote card-like instruments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    /// Returns `true` if this is the reserved loyalty-points identifier.
    pub fn is_loyalty(&self) -> bool {
        self.0 == LOYALTY_ID
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(id: &str) -> Self {
        InstrumentId(id.to_owned())
    }
}
