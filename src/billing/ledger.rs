use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Money;
use crate::errors::PortalError;

/// Unique, immutable bill identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillId(pub u64);

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillStatus {
    Paid,
    Overdue,
    Due,
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillStatus::Paid => write!(f, "Paid"),
            BillStatus::Overdue => write!(f, "Overdue"),
            BillStatus::Due => write!(f, "Due"),
        }
    }
}

/// One billing record. The amount is immutable once created; only the status
/// ever changes, and only towards `Paid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    /// Billing period label, e.g. "October 2023".
    pub month: String,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub status: BillStatus,
    /// Downloadable invoice document.
    pub pdf: String,
}

/// In-memory collection of billing records.
///
/// Append-only for status: there is no deletion and no amount mutation. The
/// outstanding balance is recomputed from the records on every read, never
/// cached.
#[derive(Debug, Default)]
pub struct BillLedger {
    bills: Vec<Bill>,
}

impl BillLedger {
    pub fn new(bills: Vec<Bill>) -> Self {
        Self { bills }
    }

    /// All bills in insertion order (most-recent-first as seeded).
    pub fn list_bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn get(&self, id: BillId) -> Option<&Bill> {
        self.bills.iter().find(|b| b.id == id)
    }

    /// Bills still awaiting payment.
    pub fn overdue_bills(&self) -> impl Iterator<Item = &Bill> {
        self.bills
            .iter()
            .filter(|b| b.status == BillStatus::Overdue)
    }

    /// Outstanding balance: sum of amounts over all overdue bills.
    /// Derive-on-read, zero when nothing is overdue.
    pub fn total_due(&self) -> Money {
        self.overdue_bills().map(|b| b.amount).sum()
    }

    /// Settle a bill. One-way: once a bill is `Paid` it stays paid, and
    /// paying it again is an error. The ledger is untouched on any failure.
    pub fn mark_paid(&mut self, id: BillId) -> Result<&Bill, PortalError> {
        let bill = self
            .bills
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| PortalError::NotFound(format!("Bill {id}")))?;

        if bill.status == BillStatus::Paid {
            return Err(PortalError::AlreadyPaid(id));
        }

        bill.status = BillStatus::Paid;
        tracing::info!(
            bill_id = %id,
            month = %bill.month,
            amount = %bill.amount,
            "Bill marked paid"
        );
        Ok(&*bill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::seed::seed_bills;

    #[test]
    fn total_due_is_the_sum_of_overdue_amounts() {
        let ledger = BillLedger::new(seed_bills());
        assert_eq!(ledger.total_due(), Money::from_rupees(1179));
        assert_eq!(ledger.overdue_bills().count(), 1);
    }

    #[test]
    fn paying_the_overdue_bill_zeroes_the_balance() {
        let mut ledger = BillLedger::new(seed_bills());
        let before = ledger.total_due();
        let paid_amount = ledger.get(BillId(101)).unwrap().amount;

        ledger.mark_paid(BillId(101)).unwrap();

        assert_eq!(ledger.get(BillId(101)).unwrap().status, BillStatus::Paid);
        assert_eq!(ledger.total_due(), Money::ZERO);
        assert_eq!(before, paid_amount);
        // Every other bill is untouched.
        for bill in ledger.list_bills().iter().filter(|b| b.id != BillId(101)) {
            assert_eq!(bill.status, BillStatus::Paid);
        }
    }

    #[test]
    fn mark_paid_on_unknown_id_fails_and_preserves_the_ledger() {
        let mut ledger = BillLedger::new(seed_bills());
        let err = ledger.mark_paid(BillId(999)).unwrap_err();
        assert_eq!(err, PortalError::NotFound("Bill 999".to_string()));
        assert_eq!(ledger.total_due(), Money::from_rupees(1179));
    }

    #[test]
    fn mark_paid_twice_is_rejected() {
        let mut ledger = BillLedger::new(seed_bills());
        ledger.mark_paid(BillId(101)).unwrap();
        let err = ledger.mark_paid(BillId(101)).unwrap_err();
        assert_eq!(err, PortalError::AlreadyPaid(BillId(101)));
        assert_eq!(ledger.total_due(), Money::ZERO);
    }

    #[test]
    fn due_bills_can_still_be_settled() {
        let mut bills = seed_bills();
        bills[1].status = BillStatus::Due;
        let mut ledger = BillLedger::new(bills);

        // `Due` does not count towards the outstanding balance.
        assert_eq!(ledger.total_due(), Money::from_rupees(1179));

        let id = ledger.list_bills()[1].id;
        ledger.mark_paid(id).unwrap();
        assert_eq!(ledger.get(id).unwrap().status, BillStatus::Paid);
    }
}
