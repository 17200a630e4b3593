//! Payment workflow integration tests
//!
//! Drives the portal facade end to end: review, simulated processing,
//! settlement, and the ledger/notification effects that follow.

use std::sync::Arc;
use std::time::Duration;

use fouryou_portal::{
    BillId, BillStatus, LocalIdentity, MemoryStore, Money, Portal, PortalConfig, PortalError,
    Role, Severity,
};

async fn customer_portal() -> Portal {
    let identity = LocalIdentity::new();
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let mut portal = Portal::new(PortalConfig::default());
    portal.initialize(&identity, store, None).await.unwrap();
    portal.login("9876543210", "password", Role::Customer).unwrap();
    portal
}

#[tokio::test(start_paused = true)]
async fn confirming_settles_exactly_once_within_the_deadline() {
    let mut portal = customer_portal().await;
    assert_eq!(portal.total_due(), Money::from_rupees(1179));

    portal.select_bill(BillId(101)).unwrap();
    let start = tokio::time::Instant::now();
    portal.confirm_payment().await.unwrap();
    let elapsed = start.elapsed();

    // Settlement comes from the 3.5 s deadline, not the message cycle.
    assert!(elapsed >= Duration::from_millis(3500), "settled early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(3600), "settled late: {elapsed:?}");

    assert_eq!(portal.bills().get(BillId(101)).unwrap().status, BillStatus::Paid);
    assert_eq!(portal.total_due(), Money::ZERO);

    let note = portal.notifier().current().unwrap();
    assert_eq!(note.severity, Severity::Success);
    assert!(note.message.contains("Payment successful"));

    // Settling happened exactly once; a second confirm has nothing to act on.
    let err = portal.confirm_payment().await.unwrap_err();
    assert!(matches!(err, PortalError::Validation(_)));
}

#[tokio::test(start_paused = true)]
async fn cancel_during_review_leaves_the_bill_unchanged() {
    let mut portal = customer_portal().await;
    portal.select_bill(BillId(101)).unwrap();
    portal.cancel_payment();

    assert_eq!(
        portal.bills().get(BillId(101)).unwrap().status,
        BillStatus::Overdue
    );
    assert_eq!(portal.total_due(), Money::from_rupees(1179));

    // After cancelling there is no review to confirm.
    assert!(portal.confirm_payment().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn paying_an_already_paid_bill_is_surfaced_as_an_error_notification() {
    let mut portal = customer_portal().await;
    let err = portal.select_bill(BillId(102)).unwrap_err();
    assert_eq!(err, PortalError::AlreadyPaid(BillId(102)));

    let note = portal.notifier().current().unwrap();
    assert_eq!(note.severity, Severity::Error);
    assert!(note.message.contains("already paid"));
}

#[tokio::test(start_paused = true)]
async fn unknown_bill_is_not_found_and_the_ledger_is_untouched() {
    let mut portal = customer_portal().await;
    let err = portal.select_bill(BillId(999)).unwrap_err();
    assert!(matches!(err, PortalError::NotFound(_)));
    assert_eq!(portal.total_due(), Money::from_rupees(1179));
}

#[tokio::test(start_paused = true)]
async fn the_seeded_scenario_plays_out() {
    // 5 bills, one overdue at 1179.00.
    let mut portal = customer_portal().await;
    assert_eq!(portal.bills().list_bills().len(), 5);
    assert_eq!(portal.total_due(), Money::from_rupees(1179));

    portal.select_bill(BillId(101)).unwrap();
    portal.confirm_payment().await.unwrap();

    assert_eq!(portal.total_due(), Money::ZERO);
    for bill in portal.bills().list_bills() {
        assert_eq!(bill.status, BillStatus::Paid);
    }
}

#[tokio::test(start_paused = true)]
async fn invoice_download_is_an_info_notification() {
    let mut portal = customer_portal().await;
    portal.download_invoice(BillId(103)).unwrap();
    let note = portal.notifier().current().unwrap();
    assert_eq!(note.severity, Severity::Info);
    assert!(note.message.contains("bill_aug.pdf"));
}
