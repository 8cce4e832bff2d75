//! # Invoice Types
//!
//! Invoices and their booking line items.

use crate::catalog::{Bookable, BookableRef};
use crate::pricing::{CostBreakdown, Price};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment lifecycle status of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Awaiting payment
    Pending,
    /// Payment confirmed by the gateway
    Paid,
    /// Payment never completed
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvoiceStatus::Pending)
    }

    /// Only `pending -> paid` and `pending -> cancelled` are allowed
    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        matches!(
            (self, next),
            (InvoiceStatus::Pending, InvoiceStatus::Paid)
                | (InvoiceStatus::Pending, InvoiceStatus::Cancelled)
        )
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Pending
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A billed stay for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Whole months in the stay
    pub count_month: u32,

    /// Remaining days after the whole months
    pub count_day: u32,

    /// Sum of all booking costs
    pub total_cost: Price,

    #[serde(default)]
    pub status: InvoiceStatus,

    /// Gateway identifier of the payment attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Create a pending invoice for a priced date range
    pub fn new(
        user_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        breakdown: &CostBreakdown,
        total_cost: Price,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            start_date,
            end_date,
            count_month: breakdown.count_month,
            count_day: breakdown.count_day,
            total_cost,
            status: InvoiceStatus::Pending,
            payment_reference: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: attach the gateway payment reference
    pub fn with_payment_reference(mut self, reference: impl Into<String>) -> Self {
        self.payment_reference = Some(reference.into());
        self
    }

    /// Builder: override the creation time
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvoiceStatus::Pending
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// A line item on an invoice with snapshotted prices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub bookable: BookableRef,

    /// Name at booking time
    pub name: String,

    pub original_monthly_price: Price,
    pub original_daily_price: Price,
    pub booking_cost: Price,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Snapshot the bookable's current rates into a line item
    pub fn snapshot(invoice_id: Uuid, bookable: &Bookable, breakdown: &CostBreakdown) -> Self {
        let rates = bookable.rates();
        Self {
            id: Uuid::new_v4(),
            invoice_id,
            bookable: bookable.reference(),
            name: bookable.display_name(),
            original_monthly_price: rates.monthly,
            original_daily_price: rates.daily,
            booking_cost: breakdown.booking_cost,
            created_at: Utc::now(),
        }
    }
}

/// Paid-event payload handed to notification sinks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePaid {
    pub invoice_id: Uuid,
    pub user_id: Uuid,
    pub total_cost: Price,
    pub paid_at: DateTime<Utc>,
}

impl InvoicePaid {
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            invoice_id: invoice.id,
            user_id: invoice.user_id,
            total_cost: invoice.total_cost,
            paid_at: invoice.updated_at,
        }
    }
}
