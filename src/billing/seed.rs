use chrono::NaiveDate;

use super::ledger::{Bill, BillId, BillStatus};
use crate::currency::Money;

/// Demo customer shown on the dashboard.
#[derive(Debug, Clone)]
pub struct CustomerProfile {
    pub name: String,
    pub email: String,
    pub plan: String,
    pub address: String,
}

pub fn demo_customer() -> CustomerProfile {
    CustomerProfile {
        name: "Rahul Sharma".to_string(),
        email: "rahul.sharma@4you.in".to_string(),
        plan: "Unlimited Fiber Blast (300Mbps)".to_string(),
        address: "Flat 402, Krishna Residency, Indiranagar, Bengaluru".to_string(),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    // Seed dates are literals; a bad one is a programming error.
    NaiveDate::from_ymd_opt(y, m, d).expect("valid seed date")
}

/// Seeded billing history, most recent first. One overdue bill at ₹1,179.
pub fn seed_bills() -> Vec<Bill> {
    vec![
        Bill {
            id: BillId(101),
            month: "October 2023".to_string(),
            amount: Money::from_rupees(1179),
            due_date: date(2023, 11, 5),
            status: BillStatus::Overdue,
            pdf: "bill_oct.pdf".to_string(),
        },
        Bill {
            id: BillId(102),
            month: "September 2023".to_string(),
            amount: Money::from_rupees(1179),
            due_date: date(2023, 10, 5),
            status: BillStatus::Paid,
            pdf: "bill_sep.pdf".to_string(),
        },
        Bill {
            id: BillId(103),
            month: "August 2023".to_string(),
            amount: Money::from_rupees(1179),
            due_date: date(2023, 9, 5),
            status: BillStatus::Paid,
            pdf: "bill_aug.pdf".to_string(),
        },
        Bill {
            id: BillId(104),
            month: "July 2023".to_string(),
            amount: Money::from_rupees(1179),
            due_date: date(2023, 8, 5),
            status: BillStatus::Paid,
            pdf: "bill_jul.pdf".to_string(),
        },
        Bill {
            id: BillId(105),
            month: "June 2023".to_string(),
            amount: Money::from_rupees(1499),
            due_date: date(2023, 7, 5),
            status: BillStatus::Paid,
            pdf: "bill_jun.pdf".to_string(),
        },
    ]
}
