//! Tests for the pure parts of the dashboard aggregation.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use faktura_core::billing::aggregate_due;

use crate::entities::{invoices, payments, sea_orm_active_enums::InvoiceStatus};

use super::{build_recent, paid_by_invoice, to_summaries};

fn mock_invoice(client_id: Uuid, number: &str, status: InvoiceStatus, total: Decimal) -> invoices::Model {
    let now = Utc::now().into();
    invoices::Model {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        client_id,
        number: number.to_string(),
        status,
        subtotal: total,
        tax_rate: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        total,
        due_date: Utc::now().date_naive(),
        created_at: now,
        updated_at: now,
    }
}

fn mock_payment(invoice_id: Uuid, amount: Decimal, days_ago: i64) -> payments::Model {
    let when = (Utc.with_ymd_and_hms(2026, 3, 20, 12, 0, 0).unwrap()
        - chrono::Duration::days(days_ago))
    .into();
    payments::Model {
        id: Uuid::new_v4(),
        invoice_id,
        amount,
        payment_date: when,
        notes: None,
        created_at: when,
    }
}

#[test]
fn test_paid_by_invoice_sums_per_invoice() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let rows = vec![
        mock_payment(a, dec!(40), 3),
        mock_payment(a, dec!(60), 2),
        mock_payment(b, dec!(10), 1),
    ];

    let sums = paid_by_invoice(&rows);
    assert_eq!(
        sums.get(&faktura_shared::types::InvoiceId::from_uuid(a)),
        Some(&dec!(100))
    );
    assert_eq!(
        sums.get(&faktura_shared::types::InvoiceId::from_uuid(b)),
        Some(&dec!(10))
    );
}

#[test]
fn test_due_aggregation_over_models() {
    // Two sent invoices (100 and 200), 50 paid on the second:
    // due = 100 + 150 = 250 over 2 invoices
    let client_id = Uuid::new_v4();
    let inv_a = mock_invoice(client_id, "INV-001", InvoiceStatus::Sent, dec!(100));
    let inv_b = mock_invoice(client_id, "INV-002", InvoiceStatus::Sent, dec!(200));
    let paid_inv = mock_invoice(client_id, "INV-003", InvoiceStatus::Paid, dec!(999));

    let rows = vec![inv_a, inv_b.clone(), paid_inv];
    let payment_rows = vec![mock_payment(inv_b.id, dec!(50), 1)];

    let due = aggregate_due(&to_summaries(&rows), &paid_by_invoice(&payment_rows));
    assert_eq!(due.due_amount, dec!(250));
    assert_eq!(due.due_count, 2);
}

#[test]
fn test_recent_feed_sorted_and_limited() {
    let client_id = Uuid::new_v4();
    let invoice = mock_invoice(client_id, "INV-010", InvoiceStatus::Sent, dec!(1000));

    let rows: Vec<payments::Model> = (0..15)
        .map(|i| mock_payment(invoice.id, dec!(10), i64::from(i)))
        .collect();

    let invoice_by_id = HashMap::from([(invoice.id, invoice.clone())]);
    let client_names = HashMap::from([(client_id, "Acme Corp".to_string())]);

    let recent = build_recent(&rows, &invoice_by_id, &client_names, 10);

    assert_eq!(recent.len(), 10);
    // Newest first
    for pair in recent.windows(2) {
        assert!(pair[0].payment_date >= pair[1].payment_date);
    }
    assert_eq!(recent[0].invoice_number, "INV-010");
    assert_eq!(recent[0].client_name, "Acme Corp");
}

#[test]
fn test_recent_feed_unknown_client_placeholder() {
    let invoice = mock_invoice(Uuid::new_v4(), "INV-020", InvoiceStatus::Sent, dec!(50));
    let rows = vec![mock_payment(invoice.id, dec!(50), 0)];
    let invoice_by_id = HashMap::from([(invoice.id, invoice)]);

    let recent = build_recent(&rows, &invoice_by_id, &HashMap::new(), 10);
    assert_eq!(recent[0].client_name, "Unknown client");
}

mod props {
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::super::paid_by_invoice;
    use super::mock_payment;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Grouping payments per invoice never loses money: the grouped
        /// sums add back up to the flat total.
        #[test]
        fn prop_grouping_preserves_total(amounts in prop::collection::vec(1i64..1_000_000i64, 1..50)) {
            let invoices: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
            let rows: Vec<_> = amounts
                .iter()
                .enumerate()
                .map(|(i, n)| mock_payment(invoices[i % 3], Decimal::new(*n, 2), 0))
                .collect();

            let flat: Decimal = rows.iter().map(|p| p.amount).sum();
            let grouped: Decimal = paid_by_invoice(&rows).values().copied().sum();

            prop_assert_eq!(flat, grouped);
        }
    }
}
