//! # Invoice Reconciliation
//!
//! Periodic sweep that settles invoices left `pending` after checkout, using
//! the gateway as the source of truth.
//!
//! ```text
//!                     ┌────────── succeeded ──────────► paid  (+ paid event)
//!  pending ── older ──┤
//!   than grace        ├── processing, younger than ───► pending (deferred)
//!                     │   processing_timeout, if set
//!                     └────────── anything else ──────► cancelled
//!
//!  gateway or storage failure ──► pending (retried next run)
//! ```
//!
//! Each invoice is handled on its own: a failure is logged and the sweep
//! moves on. Status writes are compare-and-set on `pending`, so re-running
//! the sweep, or racing it against a user confirmation, never writes twice.

use crate::billing::settle_paid;
use crate::error::{BookingError, BookingResult};
use crate::gateway::{BoxedPaymentGateway, IntentStatus};
use crate::invoice::{Invoice, InvoiceStatus};
use crate::notify::SharedSink;
use crate::repository::SharedInvoices;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

/// Sweep tuning
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Invoices younger than this are still in checkout and are skipped
    pub grace_period: Duration,

    /// Max invoices examined per run
    pub batch_size: usize,

    /// When set, a `processing` payment stays pending until the invoice is
    /// this old. Unset, it is cancelled like any other unpaid status.
    pub processing_timeout: Option<Duration>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::minutes(5),
            batch_size: 100,
            processing_timeout: None,
        }
    }
}

/// Counters for one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub examined: usize,
    pub paid: usize,
    pub cancelled: usize,
    pub deferred: usize,
    pub failed: usize,
}

impl ReconcileReport {
    /// Invoices that reached a terminal status in this run
    pub fn updated(&self) -> usize {
        self.paid + self.cancelled
    }
}

/// What happened to one invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Paid,
    Cancelled,
    Deferred,
    /// Another writer settled it first
    Skipped,
}

/// Reconciles pending invoices against the gateway
#[derive(Clone)]
pub struct Reconciler {
    invoices: SharedInvoices,
    gateway: BoxedPaymentGateway,
    events: SharedSink,
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(
        invoices: SharedInvoices,
        gateway: BoxedPaymentGateway,
        events: SharedSink,
        config: ReconcileConfig,
    ) -> Self {
        Self {
            invoices,
            gateway,
            events,
            config,
        }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Run one sweep now
    pub async fn run(&self) -> BookingResult<ReconcileReport> {
        self.run_at(Utc::now()).await
    }

    /// Run one sweep as of `now`.
    ///
    /// Only the initial selection can fail the run; per-invoice failures are
    /// counted in `failed`.
    #[instrument(skip(self), fields(provider = self.gateway.provider_name()))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> BookingResult<ReconcileReport> {
        let cutoff = now - self.config.grace_period;
        let batch = self
            .invoices
            .pending_created_before(cutoff, self.config.batch_size)
            .await?;

        let mut report = ReconcileReport {
            examined: batch.len(),
            ..Default::default()
        };

        for invoice in &batch {
            match self.reconcile_one(invoice, now).await {
                Ok(Outcome::Paid) => report.paid += 1,
                Ok(Outcome::Cancelled) => report.cancelled += 1,
                Ok(Outcome::Deferred) => report.deferred += 1,
                Ok(Outcome::Skipped) => {}
                Err(e) => {
                    report.failed += 1;
                    if e.is_gateway() {
                        warn!(invoice_id = %invoice.id, "Gateway unavailable, invoice stays pending: {}", e);
                    } else {
                        error!(invoice_id = %invoice.id, "Failed to reconcile invoice: {}", e);
                    }
                }
            }
        }

        info!(
            updated = report.updated(),
            examined = report.examined,
            paid = report.paid,
            cancelled = report.cancelled,
            deferred = report.deferred,
            failed = report.failed,
            "Invoice reconciliation finished"
        );
        Ok(report)
    }

    async fn reconcile_one(&self, invoice: &Invoice, now: DateTime<Utc>) -> BookingResult<Outcome> {
        let reference = invoice.payment_reference.as_deref().ok_or_else(|| {
            BookingError::Internal(format!("invoice {} has no payment reference", invoice.id))
        })?;

        let intent = self.gateway.retrieve(reference).await?;

        if intent.status.is_succeeded() {
            return Ok(match settle_paid(&self.invoices, &self.events, invoice.id).await? {
                Some(_) => {
                    info!(invoice_id = %invoice.id, "Invoice paid by reconciliation");
                    Outcome::Paid
                }
                None => Outcome::Skipped,
            });
        }

        let still_processing = match self.config.processing_timeout {
            Some(timeout) => {
                intent.status == IntentStatus::Processing && now - invoice.created_at < timeout
            }
            None => false,
        };
        if still_processing {
            debug!(invoice_id = %invoice.id, "Payment still processing, deferring");
            return Ok(Outcome::Deferred);
        }

        let updated = self
            .invoices
            .transition_from_pending(invoice.id, InvoiceStatus::Cancelled, now)
            .await?;

        Ok(match updated {
            Some(_) => {
                info!(invoice_id = %invoice.id, gateway_status = %intent.status, "Invoice cancelled");
                Outcome::Cancelled
            }
            None => Outcome::Skipped,
        })
    }
}
