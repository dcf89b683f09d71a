use chrono::NaiveDate;

use engine::{
    Booking, BookingPatch, BookingStatus, CombinedStatus, DEFAULT_BOOKING_PRICE_MINOR, Engine,
    EngineError, FallbackStore, FileStore, InvoicePatch, InvoiceStatus, MemoryStore, NewBooking,
    NewInvoice, NewInvoiceItem, StoreKey, fixtures,
};

fn empty_engine() -> (Engine, MemoryStore) {
    let store = MemoryStore::new();
    let mut engine = Engine::builder().store(store.clone()).build();
    engine.clear_all_data();
    (engine, store)
}

fn new_booking(customer: &str) -> NewBooking {
    NewBooking {
        customer: customer.to_string(),
        pickup: String::from("Malpensa T1"),
        destination: String::from("Como"),
        date: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
        driver: Some(String::from("Marco Rossi")),
        ..NewBooking::default()
    }
}

fn confirmed_booking(engine: &mut Engine, customer: &str) -> Booking {
    let booking = engine.create_booking(new_booking(customer)).unwrap();
    engine.confirm_booking(booking.id).unwrap().booking
}

#[test]
fn created_booking_is_pending_whatever_the_caller_says() {
    let (mut engine, _) = empty_engine();
    let mut data = new_booking("Anna Bianchi");
    data.status = Some(BookingStatus::Completed);

    let booking = engine.create_booking(data).unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert!(!booking.pickup_completed);
    // The customer was auto-created on first reference.
    assert!(engine.customers().any(|c| c.name == "Anna Bianchi"));
}

#[test]
fn confirming_generates_one_draft_invoice_with_the_default_price() {
    let (mut engine, _) = empty_engine();
    let booking = engine.create_booking(new_booking("Anna Bianchi")).unwrap();

    let outcome = engine.confirm_booking(booking.id).unwrap();

    assert_eq!(outcome.booking.status, BookingStatus::Confirmed);
    let invoice = outcome.generated_invoice.unwrap();
    assert_eq!(invoice.booking_id, Some(booking.id));
    assert_eq!(invoice.status, InvoiceStatus::Pending);
    assert_eq!(invoice.amount_minor, DEFAULT_BOOKING_PRICE_MINOR);
    assert_eq!(engine.invoices().count(), 1);
}

#[test]
fn invoice_generation_is_idempotent() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");
    let first = engine.invoice_for_booking(booking.id).unwrap().clone();

    let second = engine.generate_invoice_from_booking(booking.id).unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(engine.invoices().count(), 1);
}

#[test]
fn cancelled_invoice_allows_a_fresh_draft() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");
    let first = engine.invoice_for_booking(booking.id).unwrap().clone();

    engine.cancel_invoice(first.id).unwrap();
    let second = engine.generate_invoice_from_booking(booking.id).unwrap();

    assert_ne!(second.id, first.id);
    assert_eq!(engine.invoices().count(), 2);
    assert_eq!(engine.invoice_for_booking(booking.id).unwrap().id, second.id);
}

#[test]
fn double_confirm_is_rejected() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");

    let err = engine.confirm_booking(booking.id).unwrap_err();
    assert!(matches!(err, EngineError::StateInvariant(_)));
    assert_eq!(engine.invoices().count(), 1);
}

#[test]
fn paying_creates_exactly_one_income_entry_and_recomputes_spend() {
    let (mut engine, _) = empty_engine();
    let mut data = new_booking("Anna Bianchi");
    data.price_minor = Some(12_000);
    let booking = engine.create_booking(data).unwrap();
    let invoice = engine.confirm_booking(booking.id).unwrap().generated_invoice.unwrap();
    engine
        .send_invoice(invoice.id, Some(String::from("anna@example.com")))
        .unwrap();

    let paid_on = NaiveDate::from_ymd_opt(2026, 9, 10).unwrap();
    let outcome = engine.mark_invoice_paid(invoice.id, Some(paid_on)).unwrap();

    assert_eq!(outcome.invoice.status, InvoiceStatus::Paid);
    assert_eq!(outcome.invoice.paid_date, Some(paid_on));
    assert_eq!(outcome.income_entry.amount_minor, 12_000);
    assert_eq!(outcome.income_entry.invoice_id, Some(invoice.id));
    assert_eq!(engine.income_entries().count(), 1);

    let customer = engine.customers().find(|c| c.name == "Anna Bianchi").unwrap();
    assert_eq!(customer.total_spent_minor, 12_000);
    assert_eq!(customer.last_invoice, Some(outcome.invoice.date));
}

#[test]
fn paying_twice_is_rejected() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");
    let invoice = engine.invoice_for_booking(booking.id).unwrap().clone();
    engine.mark_invoice_paid(invoice.id, None).unwrap();

    let err = engine.mark_invoice_paid(invoice.id, None).unwrap_err();

    assert!(matches!(err, EngineError::StateInvariant(_)));
    assert_eq!(engine.income_entries().count(), 1);
}

#[test]
fn sending_needs_a_resolvable_email() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");
    let invoice = engine.invoice_for_booking(booking.id).unwrap().clone();

    // No explicit recipient, nothing on the invoice, nothing on file.
    let err = engine.send_invoice(invoice.id, None).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let sent = engine
        .send_invoice(invoice.id, Some(String::from("anna@example.com")))
        .unwrap();
    assert_eq!(sent.status, InvoiceStatus::Sent);
    assert_eq!(sent.sent_to.as_deref(), Some("anna@example.com"));
}

#[test]
fn sending_an_unknown_invoice_is_not_found() {
    let (mut engine, _) = empty_engine();
    let err = engine
        .send_invoice(uuid::Uuid::new_v4(), Some(String::from("a@b.example")))
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[test]
fn round_trip_completes_after_both_legs() {
    let (mut engine, _) = empty_engine();
    let mut data = new_booking("Anna Bianchi");
    data.has_return = true;
    let booking = engine.create_booking(data).unwrap();
    engine.confirm_booking(booking.id).unwrap();

    let after_pickup = engine.complete_pickup_leg(booking.id).unwrap();
    assert_eq!(after_pickup.status, BookingStatus::Confirmed);
    assert!(after_pickup.pickup_completed);

    let done = engine.complete_return_leg(booking.id).unwrap();
    assert_eq!(done.status, BookingStatus::Completed);
    assert!(done.return_completed);
}

#[test]
fn single_trip_completes_on_pickup() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");

    let done = engine.complete_pickup_leg(booking.id).unwrap();

    assert_eq!(done.status, BookingStatus::Completed);
    assert!(matches!(
        engine.complete_return_leg(booking.id),
        Err(EngineError::StateInvariant(_))
    ));
}

#[test]
fn return_leg_requires_the_pickup_first() {
    let (mut engine, _) = empty_engine();
    let mut data = new_booking("Anna Bianchi");
    data.has_return = true;
    let booking = engine.create_booking(data).unwrap();
    engine.confirm_booking(booking.id).unwrap();

    let err = engine.complete_return_leg(booking.id).unwrap_err();
    assert!(matches!(err, EngineError::StateInvariant(_)));
}

#[test]
fn booking_price_change_pushes_into_the_linked_invoice() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");

    let outcome = engine
        .update_booking(
            booking.id,
            BookingPatch {
                price_minor: Some(20_000),
                ..BookingPatch::default()
            },
        )
        .unwrap();

    let invoice = outcome.repriced_invoice.unwrap();
    assert_eq!(invoice.amount_minor, 20_000);
    assert_eq!(invoice.items.len(), 1);
    assert_eq!(invoice.items[0].amount_minor, 20_000);
}

#[test]
fn invoice_edits_never_push_back_into_the_booking() {
    let (mut engine, _) = empty_engine();
    let mut data = new_booking("Anna Bianchi");
    data.price_minor = Some(12_000);
    let booking = engine.create_booking(data).unwrap();
    let invoice = engine.confirm_booking(booking.id).unwrap().generated_invoice.unwrap();

    engine
        .update_invoice(
            invoice.id,
            InvoicePatch {
                items: Some(vec![NewInvoiceItem {
                    description: String::from("Negotiated flat fee"),
                    quantity: 1,
                    rate_minor: 9_000,
                }]),
                ..InvoicePatch::default()
            },
        )
        .unwrap();

    assert_eq!(engine.booking(booking.id).unwrap().price_minor, Some(12_000));
}

#[test]
fn confirming_through_a_patch_cascades_like_confirm() {
    let (mut engine, _) = empty_engine();
    let booking = engine.create_booking(new_booking("Anna Bianchi")).unwrap();

    let outcome = engine
        .update_booking(
            booking.id,
            BookingPatch {
                status: Some(BookingStatus::Confirmed),
                ..BookingPatch::default()
            },
        )
        .unwrap();

    assert_eq!(outcome.booking.status, BookingStatus::Confirmed);
    assert!(outcome.generated_invoice.is_some());
    assert_eq!(engine.invoices().count(), 1);
}

#[test]
fn patching_other_status_changes_is_rejected() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");

    let err = engine
        .update_booking(
            booking.id,
            BookingPatch {
                status: Some(BookingStatus::Completed),
                ..BookingPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::StateInvariant(_)));
}

#[test]
fn completed_bookings_cannot_be_cancelled() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");
    engine.complete_pickup_leg(booking.id).unwrap();

    let err = engine.cancel_booking(booking.id).unwrap_err();
    assert!(matches!(err, EngineError::StateInvariant(_)));
    assert_eq!(
        engine.booking(booking.id).unwrap().status,
        BookingStatus::Completed
    );
}

#[test]
fn cancelling_a_booking_leaves_its_invoice_alone() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");
    let invoice = engine.invoice_for_booking(booking.id).unwrap().clone();

    engine.cancel_booking(booking.id).unwrap();

    assert_eq!(
        engine.invoice(invoice.id).unwrap().status,
        InvoiceStatus::Pending
    );
}

#[test]
fn editing_a_paid_invoice_is_rejected() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");
    let invoice = engine.invoice_for_booking(booking.id).unwrap().clone();
    engine.mark_invoice_paid(invoice.id, None).unwrap();

    let err = engine
        .update_invoice(invoice.id, InvoicePatch::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::StateInvariant(_)));
}

#[test]
fn status_patches_cannot_shortcut_the_invoice_lifecycle() {
    let (mut engine, _) = empty_engine();
    let invoice = engine
        .create_ad_hoc_invoice(NewInvoice {
            customer: String::from("Anna Bianchi"),
            items: vec![NewInvoiceItem {
                description: String::from("Transfer"),
                quantity: 1,
                rate_minor: 4_500,
            }],
            ..NewInvoice::default()
        })
        .unwrap();

    for target in [
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Cancelled,
    ] {
        let err = engine
            .update_invoice(
                invoice.id,
                InvoicePatch {
                    status: Some(target),
                    ..InvoicePatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::StateInvariant(_)));
    }

    // Nothing slipped through: no payment was recorded anywhere.
    assert_eq!(engine.invoice(invoice.id).unwrap().status, InvoiceStatus::Pending);
    assert_eq!(engine.income_entries().count(), 0);
    let customer = engine.customers().find(|c| c.name == "Anna Bianchi").unwrap();
    assert_eq!(customer.total_spent_minor, 0);
}

#[test]
fn overdue_is_the_one_status_an_edit_may_set() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");
    let invoice = engine.invoice_for_booking(booking.id).unwrap().clone();
    engine.complete_pickup_leg(booking.id).unwrap();

    let flagged = engine
        .update_invoice(
            invoice.id,
            InvoicePatch {
                status: Some(InvoiceStatus::Overdue),
                ..InvoicePatch::default()
            },
        )
        .unwrap();

    assert_eq!(flagged.status, InvoiceStatus::Overdue);
    assert_eq!(
        engine.combined_status(booking.id).unwrap(),
        CombinedStatus::Overdue
    );
    // Overdue is not terminal: the invoice can still be cancelled, but the
    // literal pay precondition no longer holds.
    assert!(matches!(
        engine.mark_invoice_paid(invoice.id, None),
        Err(EngineError::StateInvariant(_))
    ));
    engine.cancel_invoice(invoice.id).unwrap();
}

#[test]
fn mark_booking_completed_sets_both_leg_flags() {
    let (mut engine, _) = empty_engine();
    let mut data = new_booking("Anna Bianchi");
    data.has_return = true;
    let booking = engine.create_booking(data).unwrap();

    // Only confirmed bookings can be force-completed.
    assert!(matches!(
        engine.mark_booking_completed(booking.id),
        Err(EngineError::StateInvariant(_))
    ));
    engine.confirm_booking(booking.id).unwrap();

    let done = engine.mark_booking_completed(booking.id).unwrap();
    assert_eq!(done.status, BookingStatus::Completed);
    assert!(done.pickup_completed);
    assert!(done.return_completed);
}

#[test]
fn delete_booking_removes_the_record_without_cascade() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");
    let invoice = engine.invoice_for_booking(booking.id).unwrap().clone();

    engine.delete_booking(booking.id).unwrap();

    assert!(engine.booking(booking.id).is_none());
    assert!(matches!(
        engine.delete_booking(booking.id),
        Err(EngineError::NotFound(_))
    ));
    // The invoice stays on file, keeping its now-dangling booking reference.
    assert_eq!(
        engine.invoice(invoice.id).unwrap().booking_id,
        Some(booking.id)
    );
}

#[test]
fn resend_requires_a_sent_invoice_and_refreshes_the_record() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");
    let invoice = engine.invoice_for_booking(booking.id).unwrap().clone();

    let err = engine
        .resend_invoice(invoice.id, Some(String::from("anna@example.com")))
        .unwrap_err();
    assert!(matches!(err, EngineError::StateInvariant(_)));

    engine
        .send_invoice(invoice.id, Some(String::from("anna@example.com")))
        .unwrap();
    let resent = engine
        .resend_invoice(invoice.id, Some(String::from("booking@bellavista.example")))
        .unwrap();

    assert_eq!(resent.status, InvoiceStatus::Sent);
    assert_eq!(resent.sent_to.as_deref(), Some("booking@bellavista.example"));
}

#[test]
fn refresh_all_data_rereads_the_durable_store() {
    let (mut engine, store) = empty_engine();
    engine.create_booking(new_booking("Anna Bianchi")).unwrap();

    // Another writer replaced the bookings blob behind the engine's back.
    store.insert_blob(StoreKey::Bookings, b"[]".to_vec());
    engine.refresh_all_data();

    assert_eq!(engine.bookings().count(), 0);
    assert_eq!(engine.customers().count(), 1);
}

#[test]
fn invalid_item_patches_are_rejected() {
    let (mut engine, _) = empty_engine();
    let booking = confirmed_booking(&mut engine, "Anna Bianchi");
    let invoice = engine.invoice_for_booking(booking.id).unwrap().clone();

    let err = engine
        .update_invoice(
            invoice.id,
            InvoicePatch {
                items: Some(vec![NewInvoiceItem {
                    description: String::from("Refund"),
                    quantity: 1,
                    rate_minor: -4_500,
                }]),
                ..InvoicePatch::default()
            },
        )
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(engine.invoice(invoice.id).unwrap().amount_minor, DEFAULT_BOOKING_PRICE_MINOR);
}

#[test]
fn symbol_only_customer_names_are_rejected() {
    let (mut engine, _) = empty_engine();
    let err = engine.create_booking(new_booking("***")).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(engine.customers().count(), 0);
}

#[test]
fn ad_hoc_invoice_sums_its_items() {
    let (mut engine, _) = empty_engine();
    let invoice = engine
        .create_ad_hoc_invoice(NewInvoice {
            customer: String::from("Hotel Bellavista"),
            customer_email: Some(String::from("booking@bellavista.example")),
            items: vec![
                NewInvoiceItem {
                    description: String::from("Airport transfer"),
                    quantity: 2,
                    rate_minor: 4_500,
                },
                NewInvoiceItem {
                    description: String::from("Waiting time"),
                    quantity: 1,
                    rate_minor: 1_500,
                },
            ],
            ..NewInvoice::default()
        })
        .unwrap();

    assert_eq!(invoice.booking_id, None);
    assert_eq!(invoice.amount_minor, 10_500);
    assert!(engine.customers().any(|c| c.name == "Hotel Bellavista"));
}

#[test]
fn combined_status_follows_the_invoice_once_one_exists() {
    let (mut engine, _) = empty_engine();
    let booking = engine.create_booking(new_booking("Anna Bianchi")).unwrap();
    assert_eq!(
        engine.combined_status(booking.id).unwrap(),
        CombinedStatus::Pending
    );

    let invoice = engine.confirm_booking(booking.id).unwrap().generated_invoice.unwrap();
    assert_eq!(
        engine.combined_status(booking.id).unwrap(),
        CombinedStatus::Confirmed
    );

    engine.complete_pickup_leg(booking.id).unwrap();
    // Completed booking with a pending invoice reports Invoiced, not Completed.
    assert_eq!(
        engine.combined_status(booking.id).unwrap(),
        CombinedStatus::Invoiced
    );

    engine.mark_invoice_paid(invoice.id, None).unwrap();
    assert_eq!(
        engine.combined_status(booking.id).unwrap(),
        CombinedStatus::Paid
    );
}

#[test]
fn activity_log_caps_at_one_hundred_entries() {
    let (mut engine, _) = empty_engine();
    for i in 0..53 {
        let booking = engine.create_booking(new_booking(&format!("Customer {i}"))).unwrap();
        engine.confirm_booking(booking.id).unwrap();
    }

    // 53 creations + 53 confirmations, capped at 100, newest first.
    let entries: Vec<_> = engine.activity(200).collect();
    assert_eq!(entries.len(), 100);
    assert!(entries[0].description.contains("Customer 52"));
}

#[test]
fn file_store_round_trip_restores_the_same_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::builder().store(FileStore::new(dir.path())).build();
    engine.clear_all_data();
    let booking = engine.create_booking(new_booking("Anna Bianchi")).unwrap();
    let invoice = engine.confirm_booking(booking.id).unwrap().generated_invoice.unwrap();
    engine.mark_invoice_paid(invoice.id, None).unwrap();

    let restarted = Engine::builder().store(FileStore::new(dir.path())).build();

    assert_eq!(restarted.booking(booking.id), engine.booking(booking.id));
    assert_eq!(restarted.invoice(invoice.id), engine.invoice(invoice.id));
    assert_eq!(restarted.income_entries().count(), 1);
    let spent = |e: &Engine| {
        e.customers()
            .find(|c| c.name == "Anna Bianchi")
            .map(|c| c.total_spent_minor)
    };
    assert_eq!(spent(&restarted), spent(&engine));
    assert_eq!(restarted.activity(10).count(), engine.activity(10).count());
}

#[test]
fn corrupt_blob_reseeds_only_its_own_key() {
    let store = MemoryStore::new();
    let mut engine = Engine::builder().store(store.clone()).build();
    engine.clear_all_data();
    let booking = engine.create_booking(new_booking("Anna Bianchi")).unwrap();

    store.insert_blob(StoreKey::Invoices, b"{not json".to_vec());
    let restarted = Engine::builder().store(store).build();

    // Invoices fell back to the demo fixture; bookings loaded untouched.
    assert_eq!(restarted.invoices().count(), 1);
    assert!(restarted.invoice(fixtures::DEMO_INVOICE_BELLAVISTA).is_some());
    assert_eq!(restarted.booking(booking.id), engine.booking(booking.id));
}

#[test]
fn writes_survive_a_failing_primary() {
    let primary = MemoryStore::new();
    let secondary = MemoryStore::new();
    let mut engine = Engine::builder()
        .store(FallbackStore::new(primary.clone(), secondary.clone()))
        .build();
    engine.clear_all_data();
    primary.set_failing(true);

    let booking = engine.create_booking(new_booking("Anna Bianchi")).unwrap();

    // The write landed on the secondary and is readable through the chain.
    assert!(secondary.blob(StoreKey::Bookings).is_some());
    let restarted = Engine::builder()
        .store(FallbackStore::new(primary, secondary))
        .build();
    assert!(restarted.booking(booking.id).is_some());
}

#[test]
fn operations_succeed_when_every_medium_fails() {
    let store = MemoryStore::new();
    let mut engine = Engine::builder().store(store.clone()).build();
    engine.clear_all_data();
    store.set_failing(true);

    let booking = engine.create_booking(new_booking("Anna Bianchi")).unwrap();
    let outcome = engine.confirm_booking(booking.id).unwrap();

    // State advanced in memory even though nothing could be persisted.
    assert_eq!(outcome.booking.status, BookingStatus::Confirmed);
    assert!(engine.invoice_for_booking(booking.id).is_some());
    assert_eq!(engine.activity(10).count(), 2);
}

#[test]
fn reset_to_demo_reseeds_and_logs_once() {
    let (mut engine, _) = empty_engine();
    engine.create_booking(new_booking("Anna Bianchi")).unwrap();

    engine.reset_to_demo();

    assert_eq!(engine.bookings().count(), 2);
    assert!(engine.booking(fixtures::DEMO_BOOKING_AIRPORT).is_some());
    let entries: Vec<_> = engine.activity(10).collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].description, "Demo data restored");
}

#[test]
fn clear_all_data_wipes_everything_including_activity() {
    let (mut engine, store) = empty_engine();
    engine.create_booking(new_booking("Anna Bianchi")).unwrap();

    engine.clear_all_data();

    assert_eq!(engine.bookings().count(), 0);
    assert_eq!(engine.customers().count(), 0);
    assert_eq!(engine.activity(10).count(), 0);
    // The persisted blobs are empty lists, not absent, so a restart does
    // not reseed the demo fixtures.
    assert_eq!(store.blob(StoreKey::Bookings).as_deref(), Some(&b"[]"[..]));
    let restarted = Engine::builder().store(store).build();
    assert_eq!(restarted.bookings().count(), 0);
}
