//! Booking lifecycle operations.
//!
//! ```text
//! Pending --confirm--> Confirmed --complete_pickup_leg--> Confirmed(pickup done)
//! Confirmed(pickup done, has_return) --complete_return_leg--> Completed
//! Confirmed(pickup done, !has_return) ----------------------> Completed
//! Pending|Confirmed --cancel--> Cancelled
//! ```
//!
//! Confirming cascades into draft-invoice generation; price edits cascade
//! into the linked invoice. Cascades are returned in named outcome structs
//! so callers and tests see them without inspecting engine state.

use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    activity::ActivityKind,
    bookings::{Booking, BookingPatch, BookingStatus, NewBooking},
    customers::name_key,
    invoices::Invoice,
    store::StoreKey,
};

use super::Engine;

/// Result of [`Engine::confirm_booking`], carrying the cascaded draft
/// invoice when one was generated by this call.
#[derive(Clone, Debug)]
pub struct ConfirmOutcome {
    pub booking: Booking,
    pub generated_invoice: Option<Invoice>,
}

/// Result of [`Engine::update_booking`]. At most one of the two cascade
/// fields is set: a confirmation patch generates a draft invoice, a price
/// patch repriced the already-linked one.
#[derive(Clone, Debug)]
pub struct UpdateBookingOutcome {
    pub booking: Booking,
    pub generated_invoice: Option<Invoice>,
    pub repriced_invoice: Option<Invoice>,
}

impl Engine {
    /// Create a booking. The stored status is always `Pending` and both leg
    /// flags start cleared, whatever the caller supplied.
    pub fn create_booking(&mut self, data: NewBooking) -> ResultEngine<Booking> {
        let booking = Booking::new(data)?;
        self.ensure_customer(&booking.customer);

        self.entities.upsert_booking(booking.clone());
        self.persist(StoreKey::Bookings);
        self.log(
            ActivityKind::BookingCreated,
            format!(
                "Booking created for {}: {} to {}",
                booking.customer, booking.pickup, booking.destination
            ),
            Some(booking.id),
        );
        self.sync_customer(&booking.customer);
        self.sync_driver(booking.driver.as_deref());
        Ok(booking)
    }

    /// Confirm a pending booking. Generates a draft invoice unless a
    /// non-cancelled one already backs the booking.
    pub fn confirm_booking(&mut self, id: Uuid) -> ResultEngine<ConfirmOutcome> {
        let mut booking = self.booking_ref(id)?.clone();
        if booking.status != BookingStatus::Pending {
            return Err(EngineError::StateInvariant(format!(
                "booking is {}, only pending bookings can be confirmed",
                booking.status.as_str()
            )));
        }

        booking.status = BookingStatus::Confirmed;
        self.entities.upsert_booking(booking.clone());
        self.persist(StoreKey::Bookings);

        let generated_invoice = if self.open_invoice_for(id).is_none() {
            Some(self.generate_invoice_inner(&booking))
        } else {
            None
        };

        let description = if generated_invoice.is_some() {
            format!(
                "Booking confirmed for {}, draft invoice created",
                booking.customer
            )
        } else {
            format!("Booking confirmed for {}", booking.customer)
        };
        self.log(ActivityKind::BookingConfirmed, description, Some(id));
        self.sync_customer(&booking.customer);
        self.sync_driver(booking.driver.as_deref());

        Ok(ConfirmOutcome {
            booking,
            generated_invoice,
        })
    }

    /// Complete the pickup leg. Single-leg bookings complete outright.
    pub fn complete_pickup_leg(&mut self, id: Uuid) -> ResultEngine<Booking> {
        let mut booking = self.booking_ref(id)?.clone();
        if booking.status != BookingStatus::Confirmed {
            return Err(EngineError::StateInvariant(format!(
                "booking is {}, only confirmed bookings have legs to complete",
                booking.status.as_str()
            )));
        }

        booking.pickup_completed = true;
        let completed = !booking.has_return;
        if completed {
            booking.status = BookingStatus::Completed;
        }
        self.finish_leg_update(booking, completed, "pickup leg completed")
    }

    /// Complete the return leg of a round trip; the booking completes.
    pub fn complete_return_leg(&mut self, id: Uuid) -> ResultEngine<Booking> {
        let mut booking = self.booking_ref(id)?.clone();
        if !booking.has_return {
            return Err(EngineError::StateInvariant(
                "booking has no return leg".to_string(),
            ));
        }
        if booking.status != BookingStatus::Confirmed || !booking.pickup_completed {
            return Err(EngineError::StateInvariant(
                "return leg requires a confirmed booking with the pickup leg completed".to_string(),
            ));
        }

        booking.return_completed = true;
        booking.status = BookingStatus::Completed;
        self.finish_leg_update(booking, true, "return leg completed")
    }

    /// Force-complete a confirmed booking, setting whichever leg flags its
    /// shape implies so completion always means completed legs.
    pub fn mark_booking_completed(&mut self, id: Uuid) -> ResultEngine<Booking> {
        let mut booking = self.booking_ref(id)?.clone();
        if booking.status != BookingStatus::Confirmed {
            return Err(EngineError::StateInvariant(format!(
                "booking is {}, only confirmed bookings can be completed",
                booking.status.as_str()
            )));
        }

        booking.pickup_completed = true;
        if booking.has_return {
            booking.return_completed = true;
        }
        booking.status = BookingStatus::Completed;
        self.finish_leg_update(booking, true, "marked completed")
    }

    fn finish_leg_update(
        &mut self,
        booking: Booking,
        completed: bool,
        what: &str,
    ) -> ResultEngine<Booking> {
        self.entities.upsert_booking(booking.clone());
        self.persist(StoreKey::Bookings);
        let kind = if completed {
            ActivityKind::BookingCompleted
        } else {
            ActivityKind::BookingUpdated
        };
        self.log(
            kind,
            format!("Booking for {}: {what}", booking.customer),
            Some(booking.id),
        );
        self.sync_customer(&booking.customer);
        self.sync_driver(booking.driver.as_deref());
        Ok(booking)
    }

    /// Merge-patch a booking.
    ///
    /// A `Pending -> Confirmed` status patch cascades exactly like
    /// [`Engine::confirm_booking`]; any other status change must go through
    /// the dedicated lifecycle operations. A price change pushes into the
    /// linked non-cancelled invoice (one-directional: invoice edits never
    /// push back).
    pub fn update_booking(
        &mut self,
        id: Uuid,
        patch: BookingPatch,
    ) -> ResultEngine<UpdateBookingOutcome> {
        let current = self.booking_ref(id)?.clone();
        let confirming = patch.status == Some(BookingStatus::Confirmed)
            && current.status == BookingStatus::Pending;
        if let Some(status) = patch.status
            && status != current.status
            && !confirming
        {
            return Err(EngineError::StateInvariant(format!(
                "cannot patch status from {} to {}, use the lifecycle operations",
                current.status.as_str(),
                status.as_str()
            )));
        }
        if let Some(customer) = &patch.customer
            && name_key(customer).is_empty()
        {
            return Err(EngineError::Validation(
                "customer name needs at least one letter or digit".to_string(),
            ));
        }

        let mut booking = current.clone();
        booking.apply_patch(&patch);
        if confirming {
            booking.status = BookingStatus::Confirmed;
        }
        self.ensure_customer(&booking.customer);

        self.entities.upsert_booking(booking.clone());
        self.persist(StoreKey::Bookings);

        let generated_invoice = if confirming && self.open_invoice_for(id).is_none() {
            Some(self.generate_invoice_inner(&booking))
        } else {
            None
        };

        let price_changed = patch.price_minor.is_some() && booking.price_minor != current.price_minor;
        let repriced_invoice = if generated_invoice.is_none() && price_changed {
            self.reprice_linked_invoice(id, booking.effective_price_minor())
        } else {
            None
        };

        self.log(
            ActivityKind::BookingUpdated,
            format!("Booking updated for {}", booking.customer),
            Some(id),
        );
        self.sync_customer(&booking.customer);
        if name_changed(&current.customer, &booking.customer) {
            self.sync_customer(&current.customer);
        }
        self.sync_driver(booking.driver.as_deref());
        if current.driver != booking.driver {
            self.sync_driver(current.driver.as_deref());
        }

        Ok(UpdateBookingOutcome {
            booking,
            generated_invoice,
            repriced_invoice,
        })
    }

    /// Cancel an open booking. Completed bookings stay completed, and the
    /// linked invoice (if any) is deliberately left untouched.
    pub fn cancel_booking(&mut self, id: Uuid) -> ResultEngine<Booking> {
        let mut booking = self.booking_ref(id)?.clone();
        if !booking.status.is_open() {
            return Err(EngineError::StateInvariant(format!(
                "booking is {}, only pending or confirmed bookings can be cancelled",
                booking.status.as_str()
            )));
        }

        booking.status = BookingStatus::Cancelled;
        self.entities.upsert_booking(booking.clone());
        self.persist(StoreKey::Bookings);
        self.log(
            ActivityKind::BookingCancelled,
            format!("Booking cancelled for {}", booking.customer),
            Some(id),
        );
        self.sync_customer(&booking.customer);
        self.sync_driver(booking.driver.as_deref());
        Ok(booking)
    }

    /// Remove a booking record. No cascade: invoices keep their
    /// `booking_id` as a dangling reference, matching the source system.
    pub fn delete_booking(&mut self, id: Uuid) -> ResultEngine<()> {
        let booking = self
            .entities
            .delete_booking(id)
            .ok_or_else(|| EngineError::NotFound("booking not exists".to_string()))?;

        self.persist(StoreKey::Bookings);
        self.log(
            ActivityKind::BookingDeleted,
            format!("Booking deleted for {}", booking.customer),
            Some(id),
        );
        self.sync_customer(&booking.customer);
        self.sync_driver(booking.driver.as_deref());
        Ok(())
    }
}

fn name_changed(before: &str, after: &str) -> bool {
    name_key(before) != name_key(after)
}
