//! Aggregate recomputation for customers and drivers.
//!
//! Deliberately non-incremental: every recompute is a full pass over the
//! current collections. Incremental counters drift under out-of-order
//! operations; a full pass always converges to the truth.

use crate::{
    bookings::BookingStatus,
    customers::name_key,
    drivers::DriverStatus,
    invoices::InvoiceStatus,
    state::EntityStore,
};

/// Recompute the aggregates of the customer matching `name`, if on file.
pub fn recompute_customer(entities: &mut EntityStore, name: &str) {
    let key = name_key(name);
    if key.is_empty() {
        return;
    }

    let mut total_bookings = 0u32;
    let mut last_booking = None;
    for booking in entities.bookings.values() {
        if name_key(&booking.customer) == key {
            total_bookings += 1;
            last_booking = last_booking.max(Some(booking.date));
        }
    }

    let mut total_invoices = 0u32;
    let mut total_spent_minor = 0i64;
    let mut last_invoice = None;
    for invoice in entities.invoices.values() {
        if name_key(&invoice.customer) != key {
            continue;
        }
        total_invoices += 1;
        last_invoice = last_invoice.max(Some(invoice.date));
        if invoice.status == InvoiceStatus::Paid {
            total_spent_minor += invoice.amount_minor;
        }
    }

    if let Some(customer) = entities
        .customers
        .values_mut()
        .find(|customer| name_key(&customer.name) == key)
    {
        customer.total_bookings = total_bookings;
        customer.total_invoices = total_invoices;
        customer.total_spent_minor = total_spent_minor;
        customer.last_booking = last_booking;
        customer.last_invoice = last_invoice;
    }
}

/// Recompute load and availability of the driver matching `name`, if on file.
pub fn recompute_driver(entities: &mut EntityStore, name: &str) {
    let key = name_key(name);
    if key.is_empty() {
        return;
    }

    let mut total_bookings = 0u32;
    let mut completed_bookings = 0u32;
    let mut busy = false;
    for booking in entities.bookings.values() {
        let Some(driver) = &booking.driver else {
            continue;
        };
        if name_key(driver) != key {
            continue;
        }
        total_bookings += 1;
        match booking.status {
            BookingStatus::Completed => completed_bookings += 1,
            BookingStatus::Confirmed => busy = true,
            BookingStatus::Pending | BookingStatus::Cancelled => {}
        }
    }

    if let Some(driver) = entities
        .drivers
        .values_mut()
        .find(|driver| name_key(&driver.name) == key)
    {
        driver.total_bookings = total_bookings;
        driver.completed_bookings = completed_bookings;
        driver.status = if busy {
            DriverStatus::Busy
        } else {
            DriverStatus::Available
        };
    }
}
