//! Company-scoped invoice number derivation.
//!
//! Numbers look like `INV-001`. The next number is derived by scanning the
//! company's existing numbers for the highest conforming suffix; there is no
//! persisted counter, so the derivation is correct across restarts and
//! multiple instances. Non-conforming numbers (manually entered or legacy)
//! are kept as stored but ignored for the max computation.

/// Prefix every generated invoice number carries.
pub const INVOICE_NUMBER_PREFIX: &str = "INV-";

/// Parses the numeric suffix out of a conforming `INV-<digits>` number.
///
/// Returns `None` for anything that does not match the pattern exactly.
#[must_use]
pub fn parse_invoice_number(number: &str) -> Option<u64> {
    let suffix = number.strip_prefix(INVOICE_NUMBER_PREFIX)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Formats a numeric suffix as an invoice number, zero-padded to at least
/// three digits.
#[must_use]
pub fn format_invoice_number(suffix: u64) -> String {
    format!("{INVOICE_NUMBER_PREFIX}{suffix:03}")
}

/// Derives the next invoice number from a company's existing numbers.
///
/// The highest conforming suffix is incremented by one; with no conforming
/// numbers the sequence starts at `INV-001`.
pub fn next_invoice_number<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing
        .into_iter()
        .filter_map(parse_invoice_number)
        .max()
        .unwrap_or(0);

    format_invoice_number(max + 1)
}
