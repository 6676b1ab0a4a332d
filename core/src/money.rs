//! Currency arithmetic: rounding to cents and display formatting.
//!
//! RULE: every stored currency value passes through `round` first.
//! `format` is for presentation only and never feeds back into arithmetic.

/// Display symbol for the group's currency (Nigerian naira).
pub const CURRENCY_SYMBOL: &str = "₦";

/// Absorbs representation error such as `1.005 * 100 == 100.49999999999999`
/// before rounding. Far below one cent, so already-rounded values never move.
const ROUNDING_NUDGE: f64 = 1e-9;

/// Round to 2 decimal places, half away from zero.
///
/// Idempotent: `round(round(x)) == round(x)` for every finite `x`.
/// Non-finite input is returned unchanged.
pub fn round(amount: f64) -> f64 {
    if !amount.is_finite() {
        return amount;
    }
    let scaled = amount * 100.0;
    let rounded = (scaled + ROUNDING_NUDGE.copysign(scaled)).round() / 100.0;
    // Collapse -0.0 so it never renders as a negative balance.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// True when `a` and `b` differ by no more than `tolerance`.
pub fn within_tolerance(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Render as `₦12,345.67`: exactly 2 fraction digits, comma thousands separators.
pub fn format(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("{CURRENCY_SYMBOL}{amount}");
    }
    let cents = (round(amount) * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = group_thousands(&(cents / 100).to_string());
    format!("{sign}{CURRENCY_SYMBOL}{whole}.{:02}", cents % 100)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
