//! Number formatting for display.
//!
//! Missing values (None or NaN) render as an em dash placeholder.

pub const MISSING: &str = "—";

fn present(x: Option<f64>) -> Option<f64> {
    x.filter(|v| !v.is_nan())
}

/// Insert `,` every three digits of an unsigned integer string.
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

/// Whole currency units with thousands separators: `$1,234,567`.
pub fn fmt_money(x: Option<f64>, currency: &str) -> String {
    let Some(x) = present(x) else {
        return MISSING.to_string();
    };
    let rounded = format!("{:.0}", x.abs());
    // -0.4 rounds to "0"; don't print "-$0".
    let sign = if x < 0.0 && rounded != "0" { "-" } else { "" };
    format!("{sign}{currency}{}", group_thousands(&rounded))
}

/// A rate stored as a fraction, shown as a percentage: `0.0525 → 5.25%`.
pub fn fmt_pct_from_rate(x: Option<f64>, decimals: usize) -> String {
    match present(x) {
        Some(rate) => format!("{:.*}%", decimals, rate * 100.0),
        None => MISSING.to_string(),
    }
}

/// A share in [0, 1] shown as a percentage.
pub fn fmt_pct(x: Option<f64>, decimals: usize) -> String {
    fmt_pct_from_rate(x, decimals)
}

pub fn fmt_count(n: i64) -> String {
    let grouped = group_thousands(&n.unsigned_abs().to_string());
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// `D1` for the richest decile through `D10`.
pub fn decile_label(bucket_number: u8) -> String {
    format!("D{bucket_number}")
}
