//! # Billing Service
//!
//! Booking creation and synchronous payment confirmation.
//!
//! ```text
//!  create_booking ──► invoice (pending) ──► confirm_payment ──► paid
//!                            │                    │
//!                            │              not succeeded
//!                            │                    ▼
//!                            │          PaymentNotCompleted (unchanged)
//!                            ▼
//!                    reconciliation sweep ──► paid | cancelled
//! ```

use crate::catalog::{Bookable, BookableKind, BookableRef};
use crate::error::{BookingError, BookingResult};
use crate::gateway::{BoxedPaymentGateway, IntentRequest};
use crate::invoice::{Booking, Invoice, InvoicePaid, InvoiceStatus};
use crate::notify::SharedSink;
use crate::pricing::{calculate, CostBreakdown, Price};
use crate::repository::{SharedCatalog, SharedInvoices};
use crate::user::RequestContext;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Booking request: one invoice covering every item for the same dates
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub items: Vec<BookableRef>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Priced line before it is persisted
#[derive(Debug, Clone, Serialize)]
pub struct QuoteLine {
    pub bookable: BookableRef,
    pub name: String,
    pub monthly_price: Price,
    pub daily_price: Price,
    pub booking_cost: Price,
}

/// Cost breakdown for a booking request
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub count_month: u32,
    pub count_day: u32,
    pub lines: Vec<QuoteLine>,
    pub total_cost: Price,
}

/// Result of a successful booking
#[derive(Debug, Clone, Serialize)]
pub struct BookingReceipt {
    pub invoice: Invoice,
    pub bookings: Vec<Booking>,

    /// Handle the client uses to complete the payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// Invoice with its line items
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetails {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub bookings: Vec<Booking>,
}

/// Move a pending invoice to `paid` and publish the event after the write.
///
/// Returns `None` when another writer got there first; no event is emitted
/// in that case.
pub(crate) async fn settle_paid(
    invoices: &SharedInvoices,
    events: &SharedSink,
    invoice_id: Uuid,
) -> BookingResult<Option<Invoice>> {
    let updated = invoices
        .transition_from_pending(invoice_id, InvoiceStatus::Paid, Utc::now())
        .await?;

    if let Some(invoice) = &updated {
        events.publish(InvoicePaid::from_invoice(invoice)).await;
    }
    Ok(updated)
}

/// Creates bookings and confirms payments
#[derive(Clone)]
pub struct BillingService {
    invoices: SharedInvoices,
    catalog: SharedCatalog,
    gateway: BoxedPaymentGateway,
    events: SharedSink,
}

impl BillingService {
    pub fn new(
        invoices: SharedInvoices,
        catalog: SharedCatalog,
        gateway: BoxedPaymentGateway,
        events: SharedSink,
    ) -> Self {
        Self {
            invoices,
            catalog,
            gateway,
            events,
        }
    }

    async fn resolve(&self, reference: BookableRef) -> BookingResult<Bookable> {
        let entity = match reference.kind {
            BookableKind::Room => "Room",
            BookableKind::Service => "Service",
        };
        let bookable = self
            .catalog
            .find_bookable(reference)
            .await?
            .ok_or_else(|| BookingError::not_found(entity, reference.id))?;
        bookable.ensure_active()?;
        Ok(bookable)
    }

    /// Price a request without persisting anything
    pub async fn quote(&self, request: &BookingRequest) -> BookingResult<Quote> {
        Ok(self.price(request).await?.0)
    }

    async fn price(
        &self,
        request: &BookingRequest,
    ) -> BookingResult<(Quote, Vec<(Bookable, CostBreakdown)>)> {
        if request.items.is_empty() {
            return Err(BookingError::Validation(
                "booking must contain at least one item".to_string(),
            ));
        }

        let mut priced = Vec::with_capacity(request.items.len());
        for (i, reference) in request.items.iter().enumerate() {
            if request.items[..i].contains(reference) {
                return Err(BookingError::Validation(format!(
                    "duplicate item {:?} {}",
                    reference.kind, reference.id
                )));
            }
            let bookable = self.resolve(*reference).await?;
            let breakdown = calculate(request.start_date, request.end_date, bookable.rates())?;
            priced.push((bookable, breakdown));
        }

        let currency = priced[0].1.booking_cost.currency;
        let mut total = Price::zero(currency);
        for (_, breakdown) in &priced {
            total = total.checked_add(&breakdown.booking_cost)?;
        }

        let lines = priced
            .iter()
            .map(|(bookable, breakdown)| QuoteLine {
                bookable: bookable.reference(),
                name: bookable.display_name(),
                monthly_price: bookable.rates().monthly,
                daily_price: bookable.rates().daily,
                booking_cost: breakdown.booking_cost,
            })
            .collect();

        let quote = Quote {
            start_date: request.start_date,
            end_date: request.end_date,
            count_month: priced[0].1.count_month,
            count_day: priced[0].1.count_day,
            lines,
            total_cost: total,
        };
        Ok((quote, priced))
    }

    /// Create an invoice with its bookings and open a payment intent for it
    #[instrument(skip(self, ctx, request), fields(user_id = %ctx.user_id(), items = request.items.len()))]
    pub async fn create_booking(
        &self,
        ctx: &RequestContext,
        request: BookingRequest,
    ) -> BookingResult<BookingReceipt> {
        let (quote, priced) = self.price(&request).await?;

        if quote.total_cost.amount <= 0 {
            return Err(BookingError::Validation(
                "booking total must be greater than zero".to_string(),
            ));
        }

        let breakdown = priced[0].1;
        let invoice = Invoice::new(
            ctx.user_id(),
            request.start_date,
            request.end_date,
            &breakdown,
            quote.total_cost,
        );
        let bookings: Vec<Booking> = priced
            .iter()
            .map(|(bookable, breakdown)| Booking::snapshot(invoice.id, bookable, breakdown))
            .collect();

        let intent_request = IntentRequest::new(invoice.id, quote.total_cost)
            .with_email(ctx.user.email.clone())
            .with_metadata("user_id", ctx.user_id().to_string());
        let intent = self.gateway.create_intent(&intent_request).await?;

        let invoice = invoice.with_payment_reference(intent.id.clone());
        self.invoices.insert_invoice(&invoice, &bookings).await?;

        info!(
            invoice_id = %invoice.id,
            payment_reference = %intent.id,
            total = quote.total_cost.amount,
            currency = %quote.total_cost.currency,
            "Booking created"
        );

        Ok(BookingReceipt {
            invoice,
            bookings,
            client_secret: intent.client_secret,
        })
    }

    /// Confirm a client-side payment for one of the caller's invoices.
    ///
    /// Marks the invoice paid only when the gateway reports `succeeded`;
    /// never cancels.
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id()))]
    pub async fn confirm_payment(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
    ) -> BookingResult<Invoice> {
        let invoice = self.owned_invoice(ctx, invoice_id).await?;

        if !invoice.is_pending() {
            return Err(BookingError::InvoiceNotPending {
                invoice_id,
                status: invoice.status,
            });
        }

        let reference = invoice.payment_reference.as_deref().ok_or_else(|| {
            BookingError::Internal(format!("invoice {} has no payment reference", invoice_id))
        })?;

        let intent = self.gateway.retrieve(reference).await?;
        if !intent.status.is_succeeded() {
            info!(%invoice_id, status = %intent.status, "Payment not completed");
            return Err(BookingError::PaymentNotCompleted {
                status: intent.status.to_string(),
            });
        }

        match settle_paid(&self.invoices, &self.events, invoice_id).await? {
            Some(paid) => {
                info!(%invoice_id, "Invoice paid by confirmation");
                Ok(paid)
            }
            None => {
                // Lost the race with the reconciliation sweep.
                let current = self
                    .invoices
                    .find_invoice(invoice_id)
                    .await?
                    .ok_or_else(|| BookingError::not_found("Invoice", invoice_id))?;
                warn!(%invoice_id, status = %current.status, "Invoice settled concurrently");
                match current.status {
                    InvoiceStatus::Paid => Ok(current),
                    status => Err(BookingError::InvoiceNotPending { invoice_id, status }),
                }
            }
        }
    }

    async fn owned_invoice(&self, ctx: &RequestContext, invoice_id: Uuid) -> BookingResult<Invoice> {
        let invoice = self
            .invoices
            .find_invoice(invoice_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Invoice", invoice_id))?;

        if !invoice.is_owned_by(ctx.user_id()) {
            return Err(BookingError::NotOwner { invoice_id });
        }
        Ok(invoice)
    }

    /// Invoice with bookings; admins may read any invoice
    pub async fn invoice_details(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
    ) -> BookingResult<InvoiceDetails> {
        let invoice = if ctx.user.is_admin() {
            self.invoices
                .find_invoice(invoice_id)
                .await?
                .ok_or_else(|| BookingError::not_found("Invoice", invoice_id))?
        } else {
            self.owned_invoice(ctx, invoice_id).await?
        };
        let bookings = self.invoices.bookings_for(invoice_id).await?;
        Ok(InvoiceDetails { invoice, bookings })
    }

    /// The caller's invoices, newest first
    pub async fn invoices(&self, ctx: &RequestContext) -> BookingResult<Vec<Invoice>> {
        self.invoices.invoices_for_user(ctx.user_id()).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::{Room, RoomType, Service};
    use crate::gateway::{IntentStatus, PaymentGateway, PaymentIntent};
    use crate::memory::MemoryStore;
    use crate::notify::NotificationDispatcher;
    use crate::pricing::{Currency, Rates};
    use crate::repository::{CatalogRepository, InvoiceRepository, NotificationRepository};
    use crate::user::{Role, User};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    /// Gateway double with scripted statuses per payment reference
    #[derive(Default)]
    pub(crate) struct ScriptedGateway {
        statuses: Mutex<HashMap<String, IntentStatus>>,
        unreachable: Mutex<HashSet<String>>,
        created: Mutex<Vec<IntentRequest>>,
    }

    impl ScriptedGateway {
        pub(crate) fn set_status(&self, reference: &str, status: IntentStatus) {
            self.statuses
                .lock()
                .unwrap()
                .insert(reference.to_string(), status);
        }

        pub(crate) fn set_unreachable(&self, reference: &str, down: bool) {
            let mut unreachable = self.unreachable.lock().unwrap();
            if down {
                unreachable.insert(reference.to_string());
            } else {
                unreachable.remove(reference);
            }
        }

        pub(crate) fn created(&self) -> Vec<IntentRequest> {
            self.created.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for ScriptedGateway {
        async fn create_intent(&self, request: &IntentRequest) -> BookingResult<PaymentIntent> {
            let id = format!("pi_{}", request.invoice_id.simple());
            self.set_status(&id, IntentStatus::RequiresPaymentMethod);
            self.created.lock().unwrap().push(request.clone());
            Ok(PaymentIntent {
                client_secret: Some(format!("{}_secret", id)),
                id,
                status: IntentStatus::RequiresPaymentMethod,
                amount: Some(request.amount),
            })
        }

        async fn retrieve(&self, payment_reference: &str) -> BookingResult<PaymentIntent> {
            if self.unreachable.lock().unwrap().contains(payment_reference) {
                return Err(BookingError::Network("connection timed out".into()));
            }
            let status = self
                .statuses
                .lock()
                .unwrap()
                .get(payment_reference)
                .cloned()
                .ok_or_else(|| BookingError::Gateway {
                    provider: "scripted".into(),
                    message: format!("No such payment_intent: {}", payment_reference),
                })?;
            Ok(PaymentIntent {
                id: payment_reference.to_string(),
                status,
                client_secret: None,
                amount: None,
            })
        }

        fn provider_name(&self) -> &'static str {
            "scripted"
        }
    }

    pub(crate) struct Fixture {
        pub store: Arc<MemoryStore>,
        pub gateway: Arc<ScriptedGateway>,
        pub service: BillingService,
        pub guest: RequestContext,
        pub stranger: RequestContext,
        pub super_admin: User,
        pub room: Room,
        pub parking: Service,
    }

    fn usd(cents: i64) -> Price {
        Price::from_cents(cents, Currency::USD)
    }

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(ScriptedGateway::default());

        let guest = User::new("Guest", "guest@stay.io", Role::User);
        let stranger = User::new("Other", "other@stay.io", Role::User);
        let super_admin = User::new("Root", "root@stay.io", Role::SuperAdmin);
        for user in [&guest, &stranger, &super_admin] {
            store.add_user(user.clone()).await;
        }

        let room_type = store
            .insert_room_type(RoomType::new(
                "Standard",
                Rates::new(usd(90_000), usd(4_000)).unwrap(),
            ))
            .await
            .unwrap();
        let room = store.insert_room(Room::new(room_type.id, "101")).await.unwrap();
        let parking = store
            .insert_service(Service::new("Parking", Rates::new(usd(6_000), usd(500)).unwrap()))
            .await
            .unwrap();

        let dispatcher = Arc::new(NotificationDispatcher::new(store.clone(), store.clone()));
        let service = BillingService::new(store.clone(), store.clone(), gateway.clone(), dispatcher);

        Fixture {
            store,
            gateway,
            service,
            guest: RequestContext::new(guest),
            stranger: RequestContext::new(stranger),
            super_admin,
            room,
            parking,
        }
    }

    pub(crate) fn room_request(f: &Fixture) -> BookingRequest {
        BookingRequest {
            items: vec![BookableRef::room(f.room.id), BookableRef::service(f.parking.id)],
            start_date: date(2024, 1, 10),
            end_date: date(2024, 2, 15),
        }
    }

    #[tokio::test]
    async fn test_create_booking_prices_and_persists() {
        let f = fixture().await;
        let receipt = f.service.create_booking(&f.guest, room_request(&f)).await.unwrap();

        // 1 month + 5 days
        assert_eq!(receipt.invoice.count_month, 1);
        assert_eq!(receipt.invoice.count_day, 5);
        assert_eq!(receipt.bookings.len(), 2);
        assert_eq!(receipt.bookings[0].booking_cost.amount, 90_000 + 5 * 4_000);
        assert_eq!(receipt.bookings[1].booking_cost.amount, 6_000 + 5 * 500);
        assert_eq!(receipt.invoice.total_cost.amount, 110_000 + 8_500);
        assert_eq!(receipt.invoice.status, InvoiceStatus::Pending);
        assert!(receipt.client_secret.is_some());

        let stored = f.store.find_invoice(receipt.invoice.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_reference, receipt.invoice.payment_reference);
        assert_eq!(f.store.bookings_for(stored.id).await.unwrap().len(), 2);

        let created = f.gateway.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].idempotency_key, receipt.invoice.id.to_string());
        assert_eq!(created[0].amount.amount, 118_500);
    }

    #[tokio::test]
    async fn test_create_booking_rejects_bad_input() {
        let f = fixture().await;

        let mut reversed = room_request(&f);
        reversed.end_date = reversed.start_date;
        assert!(matches!(
            f.service.create_booking(&f.guest, reversed).await,
            Err(BookingError::Validation(_))
        ));

        let mut empty = room_request(&f);
        empty.items.clear();
        assert!(matches!(
            f.service.create_booking(&f.guest, empty).await,
            Err(BookingError::Validation(_))
        ));

        let mut duplicate = room_request(&f);
        duplicate.items.push(BookableRef::room(f.room.id));
        assert!(matches!(
            f.service.create_booking(&f.guest, duplicate).await,
            Err(BookingError::Validation(_))
        ));

        let mut missing = room_request(&f);
        missing.items = vec![BookableRef::service(Uuid::new_v4())];
        assert!(matches!(
            f.service.create_booking(&f.guest, missing).await,
            Err(BookingError::NotFound { entity: "Service", .. })
        ));

        assert!(f.gateway.created().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_service_cannot_be_booked() {
        let f = fixture().await;
        f.store
            .set_deleted(crate::catalog::CatalogKind::Service, f.parking.id, Some(Utc::now()))
            .await
            .unwrap();

        let result = f.service.create_booking(&f.guest, room_request(&f)).await;
        assert!(matches!(result, Err(BookingError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_quote_does_not_persist() {
        let f = fixture().await;
        let quote = f.service.quote(&room_request(&f)).await.unwrap();

        assert_eq!(quote.lines.len(), 2);
        assert_eq!(quote.total_cost.amount, 118_500);
        assert!(f.gateway.created().is_empty());
        assert!(f.service.invoices(&f.guest).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_succeeded_marks_paid_and_notifies() {
        let f = fixture().await;
        let receipt = f.service.create_booking(&f.guest, room_request(&f)).await.unwrap();
        let reference = receipt.invoice.payment_reference.clone().unwrap();
        f.gateway.set_status(&reference, IntentStatus::Succeeded);

        let invoice = f
            .service
            .confirm_payment(&f.guest, receipt.invoice.id)
            .await
            .unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);

        let owner_notes = f.store.notifications_for(f.guest.user_id()).await.unwrap();
        assert_eq!(owner_notes.len(), 1);
        assert_eq!(owner_notes[0].invoice_id, Some(receipt.invoice.id));
        assert_eq!(f.store.notifications_for(f.super_admin.id).await.unwrap().len(), 1);
        assert!(f.store.notifications_for(f.stranger.user_id()).await.unwrap().is_empty());
    }

    /// Reports `succeeded`, but lets the sweep settle the invoice first
    struct SweptFirstGateway {
        invoices: SharedInvoices,
        events: SharedSink,
        invoice_id: Uuid,
        sweep_to: InvoiceStatus,
    }

    #[async_trait]
    impl PaymentGateway for SweptFirstGateway {
        async fn create_intent(&self, _request: &IntentRequest) -> BookingResult<PaymentIntent> {
            Err(BookingError::Internal("not used".into()))
        }

        async fn retrieve(&self, payment_reference: &str) -> BookingResult<PaymentIntent> {
            match self.sweep_to {
                InvoiceStatus::Paid => {
                    settle_paid(&self.invoices, &self.events, self.invoice_id).await?;
                }
                status => {
                    self.invoices
                        .transition_from_pending(self.invoice_id, status, Utc::now())
                        .await?;
                }
            }
            Ok(PaymentIntent {
                id: payment_reference.to_string(),
                status: IntentStatus::Succeeded,
                client_secret: None,
                amount: None,
            })
        }

        fn provider_name(&self) -> &'static str {
            "swept-first"
        }
    }

    async fn confirm_after_sweep(
        f: &Fixture,
        sweep_to: InvoiceStatus,
    ) -> (Uuid, BookingResult<Invoice>) {
        let receipt = f.service.create_booking(&f.guest, room_request(f)).await.unwrap();
        let events: SharedSink =
            Arc::new(NotificationDispatcher::new(f.store.clone(), f.store.clone()));
        let gateway = Arc::new(SweptFirstGateway {
            invoices: f.store.clone(),
            events: events.clone(),
            invoice_id: receipt.invoice.id,
            sweep_to,
        });
        let service = BillingService::new(f.store.clone(), f.store.clone(), gateway, events);

        let result = service.confirm_payment(&f.guest, receipt.invoice.id).await;
        (receipt.invoice.id, result)
    }

    #[tokio::test]
    async fn test_confirm_after_sweep_paid_returns_paid_once() {
        let f = fixture().await;
        let (invoice_id, result) = confirm_after_sweep(&f, InvoiceStatus::Paid).await;

        let invoice = result.unwrap();
        assert_eq!(invoice.id, invoice_id);
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(f.store.notifications_for(f.guest.user_id()).await.unwrap().len(), 1);
        assert_eq!(f.store.notifications_for(f.super_admin.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_after_sweep_cancelled_is_not_pending() {
        let f = fixture().await;
        let (invoice_id, result) = confirm_after_sweep(&f, InvoiceStatus::Cancelled).await;

        assert!(matches!(
            result,
            Err(BookingError::InvoiceNotPending { invoice_id: id, status: InvoiceStatus::Cancelled })
                if id == invoice_id
        ));
        let stored = f.store.find_invoice(invoice_id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvoiceStatus::Cancelled);
        assert!(f.store.notifications_for(f.guest.user_id()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_not_succeeded_leaves_pending() {
        let f = fixture().await;
        let receipt = f.service.create_booking(&f.guest, room_request(&f)).await.unwrap();
        let reference = receipt.invoice.payment_reference.clone().unwrap();
        f.gateway.set_status(&reference, IntentStatus::RequiresAction);

        let result = f.service.confirm_payment(&f.guest, receipt.invoice.id).await;
        assert!(matches!(
            result,
            Err(BookingError::PaymentNotCompleted { ref status }) if status == "requires_action"
        ));

        let stored = f.store.find_invoice(receipt.invoice.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvoiceStatus::Pending);
        assert!(f.store.notifications_for(f.guest.user_id()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_by_non_owner_is_rejected() {
        let f = fixture().await;
        let receipt = f.service.create_booking(&f.guest, room_request(&f)).await.unwrap();
        let reference = receipt.invoice.payment_reference.clone().unwrap();
        f.gateway.set_status(&reference, IntentStatus::Succeeded);

        let result = f.service.confirm_payment(&f.stranger, receipt.invoice.id).await;
        assert!(matches!(result, Err(BookingError::NotOwner { .. })));

        let stored = f.store.find_invoice(receipt.invoice.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvoiceStatus::Pending);
    }

    #[tokio::test]
    async fn test_confirm_twice_reports_not_pending() {
        let f = fixture().await;
        let receipt = f.service.create_booking(&f.guest, room_request(&f)).await.unwrap();
        let reference = receipt.invoice.payment_reference.clone().unwrap();
        f.gateway.set_status(&reference, IntentStatus::Succeeded);

        f.service.confirm_payment(&f.guest, receipt.invoice.id).await.unwrap();
        let again = f.service.confirm_payment(&f.guest, receipt.invoice.id).await;
        assert!(matches!(
            again,
            Err(BookingError::InvoiceNotPending { status: InvoiceStatus::Paid, .. })
        ));
        assert_eq!(f.store.notifications_for(f.guest.user_id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_gateway_failure_surfaces() {
        let f = fixture().await;
        let receipt = f.service.create_booking(&f.guest, room_request(&f)).await.unwrap();
        let reference = receipt.invoice.payment_reference.clone().unwrap();
        f.gateway.set_unreachable(&reference, true);

        let result = f.service.confirm_payment(&f.guest, receipt.invoice.id).await;
        assert!(matches!(result, Err(BookingError::Network(_))));
    }

    #[tokio::test]
    async fn test_confirm_unknown_invoice() {
        let f = fixture().await;
        let result = f.service.confirm_payment(&f.guest, Uuid::new_v4()).await;
        assert!(matches!(result, Err(BookingError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_invoice_details_access() {
        let f = fixture().await;
        let receipt = f.service.create_booking(&f.guest, room_request(&f)).await.unwrap();

        let details = f.service.invoice_details(&f.guest, receipt.invoice.id).await.unwrap();
        assert_eq!(details.bookings.len(), 2);

        let admin_ctx = RequestContext::new(f.super_admin.clone());
        assert!(f.service.invoice_details(&admin_ctx, receipt.invoice.id).await.is_ok());

        assert!(matches!(
            f.service.invoice_details(&f.stranger, receipt.invoice.id).await,
            Err(BookingError::NotOwner { .. })
        ));
    }
}
