//! Threshold crossing rules

use crate::feed::Instrument;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the target the price must reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Fire when price rises past the target
    Above,
    /// Fire when price falls to or through the target
    Below,
}

impl Direction {
    /// Direction implied by where the target sits relative to the current price
    pub fn toward(target: Decimal, current: Decimal) -> Self {
        if target > current {
            Direction::Above
        } else {
            Direction::Below
        }
    }

    /// Arrow used in console and alert output
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Above => "⬆️",
            Direction::Below => "⬇️",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Above => f.write_str("above"),
            Direction::Below => f.write_str("below"),
        }
    }
}

/// What one monitoring session is waiting for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertTarget {
    pub instrument: Instrument,
    pub target_price: Decimal,
    pub direction: Direction,
}

impl AlertTarget {
    pub fn new(instrument: Instrument, target_price: Decimal, direction: Direction) -> Self {
        Self {
            instrument,
            target_price,
            direction,
        }
    }
}

/// `Below` fires on `<=`, `Above` only on a strict `>`.
pub fn crossed(last_price: Decimal, target: &AlertTarget) -> bool {
    match target.direction {
        Direction::Below => last_price <= target.target_price,
        Direction::Above => last_price > target.target_price,
    }
}
