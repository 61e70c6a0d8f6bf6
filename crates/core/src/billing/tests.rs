//! Tests for billing logic: totals, numbering, reconciliation, aggregation.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use faktura_shared::types::InvoiceId;

use super::error::BillingError;
use super::numbering::{format_invoice_number, next_invoice_number, parse_invoice_number};
use super::reconcile::{
    aggregate_due, is_overdue, is_paid_in_full, outstanding_balance, reconcile_status,
};
use super::totals::{compute_line_items, compute_totals, verify_supplied_totals};
use super::types::{InvoiceStatus, InvoiceSummary, LineItemInput};

fn item(description: &str, quantity: Decimal, rate: Decimal) -> LineItemInput {
    LineItemInput {
        description: description.to_string(),
        quantity,
        rate,
    }
}

// ============================================================================
// Totals computation
// ============================================================================

#[test]
fn test_totals_round_trip() {
    // [qty=2, rate=50] + [qty=1, rate=25] at 10% tax
    let items = compute_line_items(&[
        item("Design work", dec!(2), dec!(50)),
        item("Hosting", dec!(1), dec!(25)),
    ])
    .unwrap();

    assert_eq!(items[0].amount, dec!(100.00));
    assert_eq!(items[1].amount, dec!(25.00));

    let totals = compute_totals(&items, dec!(10)).unwrap();
    assert_eq!(totals.subtotal, dec!(125.00));
    assert_eq!(totals.tax_amount, dec!(12.5));
    assert_eq!(totals.total, dec!(137.5));
}

#[test]
fn test_totals_zero_tax() {
    let items = compute_line_items(&[item("Consulting", dec!(3), dec!(100))]).unwrap();
    let totals = compute_totals(&items, Decimal::ZERO).unwrap();

    assert_eq!(totals.subtotal, dec!(300.00));
    assert_eq!(totals.tax_amount, Decimal::ZERO);
    assert_eq!(totals.total, dec!(300.00));
}

#[test]
fn test_tax_amount_rounds_to_cents() {
    // 33.33 * 7.5% = 2.49975 -> 2.50
    let items = compute_line_items(&[item("Widget", dec!(1), dec!(33.33))]).unwrap();
    let totals = compute_totals(&items, dec!(7.5)).unwrap();

    assert_eq!(totals.tax_amount, dec!(2.50));
    assert_eq!(totals.total, dec!(35.83));
}

#[test]
fn test_empty_items_rejected() {
    assert_eq!(compute_line_items(&[]), Err(BillingError::EmptyItems));
}

#[test]
fn test_blank_description_rejected() {
    let err = compute_line_items(&[item("   ", dec!(1), dec!(10))]).unwrap_err();
    assert_eq!(err, BillingError::EmptyDescription { index: 0 });
}

#[test]
fn test_non_positive_quantity_rejected() {
    let err = compute_line_items(&[
        item("ok", dec!(1), dec!(10)),
        item("bad", dec!(0), dec!(10)),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        BillingError::InvalidQuantity {
            index: 1,
            quantity: dec!(0),
        }
    );
}

#[test]
fn test_negative_rate_rejected() {
    let err = compute_line_items(&[item("bad", dec!(1), dec!(-5))]).unwrap_err();
    assert_eq!(
        err,
        BillingError::InvalidRate {
            index: 0,
            rate: dec!(-5),
        }
    );
}

#[test]
fn test_tax_rate_out_of_range_rejected() {
    let items = compute_line_items(&[item("x", dec!(1), dec!(10))]).unwrap();
    assert!(matches!(
        compute_totals(&items, dec!(-1)),
        Err(BillingError::InvalidTaxRate(_))
    ));
    assert!(matches!(
        compute_totals(&items, dec!(101)),
        Err(BillingError::InvalidTaxRate(_))
    ));
}

#[test]
fn test_supplied_totals_verified() {
    let items = compute_line_items(&[item("x", dec!(2), dec!(50))]).unwrap();
    let totals = compute_totals(&items, dec!(10)).unwrap();

    assert!(verify_supplied_totals(&totals, Some(dec!(100)), Some(dec!(10)), Some(dec!(110))).is_ok());
    assert!(verify_supplied_totals(&totals, None, None, None).is_ok());

    let err =
        verify_supplied_totals(&totals, Some(dec!(100)), None, Some(dec!(999))).unwrap_err();
    assert!(matches!(
        err,
        BillingError::TotalsMismatch { field: "total", .. }
    ));
}

// ============================================================================
// Invoice numbering
// ============================================================================

#[test]
fn test_first_number_in_empty_company() {
    assert_eq!(next_invoice_number([]), "INV-001");
}

#[test]
fn test_numbering_increments_max() {
    let existing = ["INV-001", "INV-002", "INV-003"];
    assert_eq!(next_invoice_number(existing), "INV-004");
}

#[test]
fn test_numbering_ignores_legacy_numbers() {
    let existing = ["INV-007", "LEGACY-9999", "DRAFT", "INV-3x"];
    assert_eq!(next_invoice_number(existing), "INV-008");
}

#[test]
fn test_numbering_handles_gaps() {
    let existing = ["INV-001", "INV-042"];
    assert_eq!(next_invoice_number(existing), "INV-043");
}

#[test]
fn test_numbering_grows_past_three_digits() {
    let existing = ["INV-999"];
    assert_eq!(next_invoice_number(existing), "INV-1000");
}

#[test]
fn test_parse_invoice_number() {
    assert_eq!(parse_invoice_number("INV-001"), Some(1));
    assert_eq!(parse_invoice_number("INV-1000"), Some(1000));
    assert_eq!(parse_invoice_number("INV-"), None);
    assert_eq!(parse_invoice_number("INV-12a"), None);
    assert_eq!(parse_invoice_number("inv-001"), None);
    assert_eq!(parse_invoice_number("LEGACY-9999"), None);
}

// ============================================================================
// Payment reconciliation
// ============================================================================

#[test]
fn test_full_payment_marks_paid() {
    let status = reconcile_status(InvoiceStatus::Sent, dec!(100.00), dec!(100.00));
    assert_eq!(status, InvoiceStatus::Paid);
}

#[test]
fn test_partial_payment_keeps_status() {
    let status = reconcile_status(InvoiceStatus::Sent, dec!(100.00), dec!(60.00));
    assert_eq!(status, InvoiceStatus::Sent);
}

#[test]
fn test_split_payments_mark_paid_in_either_order() {
    // 40 then 60, or 60 then 40: the cumulative sum is what matters
    for (first, second) in [(dec!(40.00), dec!(60.00)), (dec!(60.00), dec!(40.00))] {
        let after_first = reconcile_status(InvoiceStatus::Sent, dec!(100.00), first);
        assert_eq!(after_first, InvoiceStatus::Sent);

        let after_second = reconcile_status(after_first, dec!(100.00), first + second);
        assert_eq!(after_second, InvoiceStatus::Paid);
    }
}

#[test]
fn test_overpayment_marks_paid() {
    assert!(is_paid_in_full(dec!(100.00), dec!(120.00)));
    assert_eq!(outstanding_balance(dec!(100.00), dec!(120.00)), Decimal::ZERO);
}

#[test]
fn test_outstanding_balance() {
    assert_eq!(outstanding_balance(dec!(200), dec!(50)), dec!(150));
    assert_eq!(outstanding_balance(dec!(100), Decimal::ZERO), dec!(100));
}

#[test]
fn test_overdue_is_derived_from_due_date() {
    let due = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let before = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
    let after = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

    assert!(!is_overdue(InvoiceStatus::Sent, due, before));
    assert!(!is_overdue(InvoiceStatus::Sent, due, due));
    assert!(is_overdue(InvoiceStatus::Sent, due, after));
    // Paid and draft invoices are never overdue
    assert!(!is_overdue(InvoiceStatus::Paid, due, after));
    assert!(!is_overdue(InvoiceStatus::Draft, due, after));
}

// ============================================================================
// Due-amount aggregation
// ============================================================================

fn summary(id: InvoiceId, status: InvoiceStatus, total: Decimal) -> InvoiceSummary {
    InvoiceSummary { id, status, total }
}

#[test]
fn test_aggregate_due_with_partial_payment() {
    let a = InvoiceId::new();
    let b = InvoiceId::new();
    let invoices = vec![
        summary(a, InvoiceStatus::Sent, dec!(100)),
        summary(b, InvoiceStatus::Sent, dec!(200)),
    ];
    let mut paid = HashMap::new();
    paid.insert(b, dec!(50));

    let due = aggregate_due(&invoices, &paid);
    assert_eq!(due.due_amount, dec!(250));
    assert_eq!(due.due_count, 2);
}

#[test]
fn test_aggregate_due_excludes_paid_and_draft() {
    let invoices = vec![
        summary(InvoiceId::new(), InvoiceStatus::Paid, dec!(500)),
        summary(InvoiceId::new(), InvoiceStatus::Draft, dec!(300)),
        summary(InvoiceId::new(), InvoiceStatus::Sent, dec!(100)),
    ];

    let due = aggregate_due(&invoices, &HashMap::new());
    assert_eq!(due.due_amount, dec!(100));
    assert_eq!(due.due_count, 1);
}

#[test]
fn test_aggregate_due_skips_fully_covered_sent_invoice() {
    // Status still `sent` but payments already cover the total: contributes
    // nothing to the due figures.
    let id = InvoiceId::new();
    let invoices = vec![summary(id, InvoiceStatus::Sent, dec!(100))];
    let mut paid = HashMap::new();
    paid.insert(id, dec!(100));

    let due = aggregate_due(&invoices, &paid);
    assert_eq!(due.due_amount, Decimal::ZERO);
    assert_eq!(due.due_count, 0);
}

// ============================================================================
// Properties
// ============================================================================

/// Strategy for positive money-like decimals with 2 decimal places.
fn money_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Total always equals subtotal plus tax for any valid input.
    #[test]
    fn prop_total_is_subtotal_plus_tax(
        quantity in 1i64..10_000i64,
        rate in 0i64..1_000_000i64,
        tax in 0i64..10_000i64,
    ) {
        let items = compute_line_items(&[item(
            "line",
            Decimal::new(quantity, 2),
            Decimal::new(rate, 2),
        )]).unwrap();
        let totals = compute_totals(&items, Decimal::new(tax, 2)).unwrap();

        prop_assert_eq!(totals.total, totals.subtotal + totals.tax_amount);
    }

    /// The generated number always parses back to max + 1.
    #[test]
    fn prop_next_number_is_max_plus_one(max in 1u64..100_000u64) {
        let existing = vec![
            format_invoice_number(max),
            format_invoice_number(max / 2 + 1),
            "LEGACY-9999".to_string(),
        ];
        let next = next_invoice_number(existing.iter().map(String::as_str));

        prop_assert_eq!(parse_invoice_number(&next), Some(max + 1));
    }

    /// Reconciliation is idempotent: replaying the same cumulative payment
    /// set reaches the same status.
    #[test]
    fn prop_reconcile_idempotent(total in money_strategy(), paid in money_strategy()) {
        let once = reconcile_status(InvoiceStatus::Sent, total, paid);
        let twice = reconcile_status(once, total, paid);
        prop_assert_eq!(once, twice);
    }

    /// Outstanding balance is never negative.
    #[test]
    fn prop_outstanding_never_negative(total in money_strategy(), paid in money_strategy()) {
        prop_assert!(outstanding_balance(total, paid) >= Decimal::ZERO);
    }
}
