//! Text bars and truncation for the overview histograms.

/// Proportional bar using eighth-block characters, padded to `max_chars`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::as_conversions
)]
pub fn count_bar(value: u64, max_value: u64, max_chars: u16) -> String {
    const FRACTIONAL: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

    let width = usize::from(max_chars);
    if max_value == 0 || width == 0 {
        return " ".repeat(width);
    }

    let fraction = (value as f64 / max_value as f64).min(1.0);
    let eighths = (fraction * f64::from(max_chars) * 8.0).round() as usize;
    let full = eighths / 8;
    let remainder = eighths % 8;

    let mut bar = "█".repeat(full);
    if let Some(&ch) = FRACTIONAL.get(remainder).filter(|_| remainder > 0) {
        bar.push(ch);
    }
    let used = full + usize::from(remainder > 0);
    bar.push_str(&" ".repeat(width.saturating_sub(used)));
    bar
}

/// Cut `value` to `max_chars`, ending in `…` when shortened.
pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_owned();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = value.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_and_empty_bars() {
        assert_eq!(count_bar(10, 10, 4), "████");
        assert_eq!(count_bar(0, 10, 4), "    ");
        assert_eq!(count_bar(5, 0, 3), "   ");
    }

    #[test]
    fn partial_bar_uses_eighths() {
        // 0.5 of 3 chars = 12 eighths = 1 full + half block.
        assert_eq!(count_bar(1, 2, 3), "█▌ ");
    }

    #[test]
    fn truncation_is_char_aware() {
        assert_eq!(truncate("Разработчик", 5), "Разр…");
        assert_eq!(truncate("Rust", 10), "Rust");
        assert_eq!(truncate("Rust", 0), "");
    }
}
