// Display helpers shared by the CLI table output and the TUI.

use std::fmt::Write;

/// Salary range as a short label.
///
/// Zero bounds count as missing, the same as absent ones.
pub fn format_salary(from: Option<f64>, to: Option<f64>, currency: Option<&str>) -> String {
    let from = from.filter(|v| *v > 0.0);
    let to = to.filter(|v| *v > 0.0);
    let currency = currency.unwrap_or("");

    let mut out = String::new();
    match (from, to) {
        (Some(from), Some(to)) => {
            let _ = write!(out, "{from} - {to} {currency}");
        }
        (Some(from), None) => {
            let _ = write!(out, "from {from} {currency}");
        }
        (None, Some(to)) => {
            let _ = write!(out, "to {to} {currency}");
        }
        (None, None) => return "No data".into(),
    }
    out.trim().to_owned()
}

/// Thousands-separated integer, e.g. `125 000`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}
