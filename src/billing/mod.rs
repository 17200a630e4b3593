// Billing - bill ledger and the simulated payment workflow
//
// The ledger owns the billing records and their derived aggregates; the
// payment workflow drives a single overdue bill through review, a timed
// fake-processing phase, and settlement.

pub mod ledger;
pub mod payment;
pub mod seed;

pub use ledger::{Bill, BillId, BillLedger, BillStatus};
pub use payment::{
    PaymentEvent, PaymentMachine, PaymentPhase, ProcessingTimers, PROGRESS_MESSAGES,
};
pub use seed::{demo_customer, seed_bills, CustomerProfile};
