//! Invoice lifecycle operations.
//!
//! `Pending -> Sent -> Paid` is the happy path; `Cancelled` is reachable
//! from any non-terminal status. Generation from a booking is idempotent
//! here, centrally: callers may retry without ever producing a second
//! non-cancelled invoice for the same booking.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    activity::ActivityKind,
    bookings::Booking,
    customers::name_key,
    invoices::{
        Invoice, InvoiceItem, InvoiceKind, InvoicePatch, InvoiceStatus, NewInvoice, validate_items,
    },
    ledger::IncomeEntry,
    store::StoreKey,
};

use super::Engine;

/// Result of [`Engine::mark_invoice_paid`]: the paid invoice and the one
/// ledger entry the payment produced.
#[derive(Clone, Debug)]
pub struct PaidOutcome {
    pub invoice: Invoice,
    pub income_entry: IncomeEntry,
}

impl Engine {
    /// Generate the draft invoice backing a booking.
    ///
    /// Idempotent: if a non-cancelled invoice already exists for the booking
    /// it is returned unchanged and nothing is written.
    pub fn generate_invoice_from_booking(&mut self, booking_id: Uuid) -> ResultEngine<Invoice> {
        let booking = self.booking_ref(booking_id)?.clone();
        if let Some(existing) = self.open_invoice_for(booking_id) {
            return Ok(existing.clone());
        }

        let invoice = self.generate_invoice_inner(&booking);
        self.log(
            ActivityKind::InvoiceCreated,
            format!("Draft invoice created for {}", invoice.customer),
            Some(invoice.id),
        );
        self.sync_customer(&booking.customer);
        Ok(invoice)
    }

    /// Create an invoice with no backing booking.
    pub fn create_ad_hoc_invoice(&mut self, data: NewInvoice) -> ResultEngine<Invoice> {
        let invoice = Invoice::ad_hoc(data)?;
        self.ensure_customer(&invoice.customer);

        self.entities.upsert_invoice(invoice.clone());
        self.persist(StoreKey::Invoices);
        self.log(
            ActivityKind::InvoiceCreated,
            format!("Invoice created for {}", invoice.customer),
            Some(invoice.id),
        );
        self.sync_customer(&invoice.customer);
        Ok(invoice)
    }

    /// Send a pending invoice. The recipient falls back to the email on the
    /// invoice, then to the customer record.
    pub fn send_invoice(&mut self, id: Uuid, recipient: Option<String>) -> ResultEngine<Invoice> {
        let invoice = self.invoice_ref(id)?.clone();
        if invoice.status != InvoiceStatus::Pending {
            return Err(EngineError::StateInvariant(format!(
                "invoice is {}, only pending invoices can be sent",
                invoice.status.as_str()
            )));
        }
        self.dispatch_invoice(invoice, recipient, "Invoice sent to")
    }

    /// Send a sent invoice again, refreshing the dispatch record.
    pub fn resend_invoice(&mut self, id: Uuid, recipient: Option<String>) -> ResultEngine<Invoice> {
        let invoice = self.invoice_ref(id)?.clone();
        if invoice.status != InvoiceStatus::Sent {
            return Err(EngineError::StateInvariant(format!(
                "invoice is {}, only sent invoices can be resent",
                invoice.status.as_str()
            )));
        }
        self.dispatch_invoice(invoice, recipient, "Invoice resent to")
    }

    fn dispatch_invoice(
        &mut self,
        mut invoice: Invoice,
        recipient: Option<String>,
        what: &str,
    ) -> ResultEngine<Invoice> {
        let email = recipient
            .or_else(|| invoice.customer_email.clone())
            .or_else(|| self.customer_email_on_file(&invoice.customer))
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "no recipient email on file for {}",
                    invoice.customer
                ))
            })?;

        invoice.status = InvoiceStatus::Sent;
        invoice.sent_at = Some(Utc::now());
        invoice.sent_to = Some(email.clone());
        self.entities.upsert_invoice(invoice.clone());
        self.persist(StoreKey::Invoices);
        self.log(
            ActivityKind::InvoiceSent,
            format!("{what} {email} for {}", invoice.customer),
            Some(invoice.id),
        );
        self.sync_customer(&invoice.customer);
        Ok(invoice)
    }

    /// Mark an invoice paid and record the payment in the income ledger,
    /// exactly once.
    pub fn mark_invoice_paid(
        &mut self,
        id: Uuid,
        paid_date: Option<NaiveDate>,
    ) -> ResultEngine<PaidOutcome> {
        let mut invoice = self.invoice_ref(id)?.clone();
        if !matches!(
            invoice.status,
            InvoiceStatus::Pending | InvoiceStatus::Sent
        ) {
            return Err(EngineError::StateInvariant(format!(
                "invoice is {}, only pending or sent invoices can be paid",
                invoice.status.as_str()
            )));
        }

        let paid = paid_date.unwrap_or_else(|| Utc::now().date_naive());
        invoice.status = InvoiceStatus::Paid;
        invoice.paid_date = Some(paid);
        let income_entry = IncomeEntry::from_paid_invoice(&invoice, paid);

        self.entities.upsert_invoice(invoice.clone());
        self.entities.upsert_income_entry(income_entry.clone());
        self.persist(StoreKey::Invoices);
        self.persist(StoreKey::Income);
        self.log(
            ActivityKind::InvoicePaid,
            format!("Invoice paid by {}", invoice.customer),
            Some(id),
        );
        self.sync_customer(&invoice.customer);

        Ok(PaidOutcome {
            invoice,
            income_entry,
        })
    }

    /// Cancel a non-terminal invoice. The record stays on file, frozen.
    pub fn cancel_invoice(&mut self, id: Uuid) -> ResultEngine<Invoice> {
        let mut invoice = self.invoice_ref(id)?.clone();
        if invoice.status.is_terminal() {
            return Err(EngineError::StateInvariant(format!(
                "invoice is {}, terminal invoices cannot be cancelled",
                invoice.status.as_str()
            )));
        }

        invoice.status = InvoiceStatus::Cancelled;
        invoice.editable = false;
        self.entities.upsert_invoice(invoice.clone());
        self.persist(StoreKey::Invoices);
        self.log(
            ActivityKind::InvoiceCancelled,
            format!("Invoice cancelled for {}", invoice.customer),
            Some(id),
        );
        self.sync_customer(&invoice.customer);
        Ok(invoice)
    }

    /// Merge-patch an editable invoice. Paid and cancelled invoices are
    /// frozen.
    ///
    /// The only status a patch may set is `Overdue`, the one status no
    /// lifecycle transition produces; everything else must go through
    /// [`Engine::send_invoice`], [`Engine::mark_invoice_paid`] or
    /// [`Engine::cancel_invoice`] so their side effects cannot be skipped.
    pub fn update_invoice(&mut self, id: Uuid, patch: InvoicePatch) -> ResultEngine<Invoice> {
        let current = self.invoice_ref(id)?.clone();
        if current.status.is_terminal() || !current.editable {
            return Err(EngineError::StateInvariant(format!(
                "invoice is {}, paid or cancelled invoices cannot be edited",
                current.status.as_str()
            )));
        }
        if let Some(status) = patch.status
            && status != current.status
            && status != InvoiceStatus::Overdue
        {
            return Err(EngineError::StateInvariant(format!(
                "cannot patch status from {} to {}, use the lifecycle operations",
                current.status.as_str(),
                status.as_str()
            )));
        }
        if let Some(items) = &patch.items {
            validate_items(items)?;
        }
        if let Some(customer) = &patch.customer
            && name_key(customer).is_empty()
        {
            return Err(EngineError::Validation(
                "customer name needs at least one letter or digit".to_string(),
            ));
        }

        let mut invoice = current.clone();
        invoice.apply_patch(patch);
        self.ensure_customer(&invoice.customer);

        self.entities.upsert_invoice(invoice.clone());
        self.persist(StoreKey::Invoices);
        self.log(
            ActivityKind::InvoiceUpdated,
            format!("Invoice updated for {}", invoice.customer),
            Some(id),
        );
        self.sync_customer(&invoice.customer);
        if name_key(&current.customer) != name_key(&invoice.customer) {
            self.sync_customer(&current.customer);
        }
        Ok(invoice)
    }

    /// Build, store and write through the draft invoice for a booking.
    /// Callers guard the at-most-one invariant and describe the cascade in
    /// their own activity entry.
    pub(crate) fn generate_invoice_inner(&mut self, booking: &Booking) -> Invoice {
        let price = booking.effective_price_minor();
        let invoice = Invoice {
            id: Uuid::new_v4(),
            booking_id: Some(booking.id),
            customer: booking.customer.clone(),
            customer_email: self.customer_email_on_file(&booking.customer),
            kind: InvoiceKind::from(booking.kind),
            amount_minor: price,
            items: vec![InvoiceItem::new(
                format!("{} to {}, {}", booking.pickup, booking.destination, booking.date),
                1,
                price,
            )],
            date: Utc::now().date_naive(),
            status: InvoiceStatus::Pending,
            editable: true,
            sent_at: None,
            sent_to: None,
            paid_date: None,
        };
        self.entities.upsert_invoice(invoice.clone());
        self.persist(StoreKey::Invoices);
        invoice
    }

    /// Push a booking price change into its linked open invoice: new amount,
    /// single derived line item. Terminal invoices are left alone.
    pub(crate) fn reprice_linked_invoice(
        &mut self,
        booking_id: Uuid,
        price_minor: i64,
    ) -> Option<Invoice> {
        let mut invoice = self
            .open_invoice_for(booking_id)
            .filter(|invoice| !invoice.status.is_terminal())?
            .clone();

        let description = invoice
            .items
            .first()
            .map(|item| item.description.clone())
            .unwrap_or_else(|| String::from("Transport service"));
        invoice.items = vec![InvoiceItem::new(description, 1, price_minor)];
        invoice.recompute_amount();

        self.entities.upsert_invoice(invoice.clone());
        self.persist(StoreKey::Invoices);
        Some(invoice)
    }

    fn customer_email_on_file(&self, name: &str) -> Option<String> {
        let key = name_key(name);
        self.entities
            .customers()
            .find(|customer| name_key(&customer.name) == key)
            .and_then(|customer| customer.email.clone())
    }
}
