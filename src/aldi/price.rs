//! German-locale price parsing.

use crate::aldi::selectors::price::NUMBER;

/// Parses a price such as `"1.299,00 €"` into `1299.0`.
///
/// `.` is treated as a thousands separator and `,` as the decimal separator.
/// A price already written with a decimal point (`"1.99"`) therefore reads
/// as `199.0`. Returns `None` when no digits survive normalization or the
/// number is not finite.
pub fn parse_price(text: &str) -> Option<f64> {
    let normalized = text.replace('.', "").replace(',', ".");
    let number = NUMBER.find(&normalized)?;

    number.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}
