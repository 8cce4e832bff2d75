//! # Pricing
//!
//! Money types and the booking cost calculator.
//!
//! A stay is billed as whole calendar months at the monthly rate plus the
//! remaining days at the daily rate:
//!
//! ```text
//!  start            +1 month          +2 months   end
//!    │─────────────────│─────────────────│─ ─ ─ ─ ─│
//!    └──── monthly ────┴──── monthly ────┴─ daily ─┘
//! ```

use crate::error::{BookingError, BookingResult};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
}

impl Currency {
    /// Returns the ISO 4217 currency code as the gateway expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
            Currency::CAD => "cad",
            Currency::AUD => "aud",
        }
    }

    /// Parse a currency code, case-insensitively
    pub fn parse(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "usd" => Some(Currency::USD),
            "eur" => Some(Currency::EUR),
            "gbp" => Some(Currency::GBP),
            "jpy" => Some(Currency::JPY),
            "cad" => Some(Currency::CAD),
            "aud" => Some(Currency::AUD),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for USD)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Create a price from smallest unit (cents)
    pub fn from_cents(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Zero in the given currency
    pub fn zero(currency: Currency) -> Self {
        Self::from_cents(0, currency)
    }

    /// Multiply by a unit count
    pub fn times(&self, count: u32) -> BookingResult<Price> {
        self.amount
            .checked_mul(count as i64)
            .map(|amount| Price::from_cents(amount, self.currency))
            .ok_or_else(|| BookingError::Validation("price overflow".to_string()))
    }

    /// Add two prices of the same currency
    pub fn checked_add(&self, other: &Price) -> BookingResult<Price> {
        if self.currency != other.currency {
            return Err(BookingError::Validation(format!(
                "cannot add {} to {}",
                other.currency, self.currency
            )));
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Price::from_cents(amount, self.currency))
            .ok_or_else(|| BookingError::Validation("price overflow".to_string()))
    }
}

/// Monthly and daily rate of a bookable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rates {
    pub monthly: Price,
    pub daily: Price,
}

impl Rates {
    pub fn new(monthly: Price, daily: Price) -> BookingResult<Self> {
        let rates = Self { monthly, daily };
        rates.validate()?;
        Ok(rates)
    }

    /// Both rates must be non-negative and share a currency
    pub fn validate(&self) -> BookingResult<()> {
        if self.monthly.currency != self.daily.currency {
            return Err(BookingError::Validation(
                "monthly and daily price must use the same currency".to_string(),
            ));
        }
        if self.monthly.amount < 0 || self.daily.amount < 0 {
            return Err(BookingError::Validation(
                "prices must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn currency(&self) -> Currency {
        self.monthly.currency
    }
}

/// Result of pricing a date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub count_month: u32,
    pub count_day: u32,
    pub booking_cost: Price,
}

/// Split `[start, end)` into whole calendar months plus leftover days.
///
/// Month addition clamps to the last day of shorter months, so a stay from
/// Jan 31 to Feb 29 (2024) is exactly one month.
///
/// The day remainder is always shorter than the next month step from the
/// anchor, which makes it at most 30: Jan 1 to Jan 31 is 30 days because
/// the next step lands on Feb 1.
pub fn split_stay(start: NaiveDate, end: NaiveDate) -> BookingResult<(u32, u32)> {
    if end <= start {
        return Err(BookingError::Validation(format!(
            "end date {} must be after start date {}",
            end, start
        )));
    }

    let estimate =
        (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let mut months = estimate.max(0) as u32;

    let anchor = loop {
        let anchor = start
            .checked_add_months(Months::new(months))
            .ok_or_else(|| BookingError::Validation("date range out of bounds".to_string()))?;
        if anchor <= end || months == 0 {
            break anchor;
        }
        months -= 1;
    };

    let days = (end - anchor).num_days() as u32;
    Ok((months, days))
}

/// Compute the cost of a stay at the given rates
pub fn calculate(start: NaiveDate, end: NaiveDate, rates: &Rates) -> BookingResult<CostBreakdown> {
    rates.validate()?;
    let (count_month, count_day) = split_stay(start, end)?;

    let booking_cost = rates
        .monthly
        .times(count_month)?
        .checked_add(&rates.daily.times(count_day)?)?;

    Ok(CostBreakdown {
        count_month,
        count_day,
        booking_cost,
    })
}
