//! Number formatting for axis ticks and tooltips.

/// Group digits in threes: `27418000.0` → `"27,418,000"`. Fractional parts
/// are kept when present.
pub fn thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let negative = value < 0.0;
    let raw = value.abs().to_string();
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 2);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Millions with one decimal: `1_240_000` → `"1.2M"`.
pub fn millions(value: f64) -> String {
    format!("{:.1}M", value / 1_000_000.0)
}

/// Axis label in millions of acre-feet with a trailing `.0` dropped:
/// `25_000_000` → `"25M AF"`, `2_500_000` → `"2.5M AF"`.
pub fn millions_af(value: f64) -> String {
    let text = format!("{:.1}", value / 1_000_000.0);
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{text}M AF")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(27_418_000.0), "27,418,000");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(1000.0), "1,000");
        assert_eq!(thousands(-1234.5), "-1,234.5");
        assert_eq!(thousands(0.0), "0");
    }

    #[test]
    fn test_millions() {
        assert_eq!(millions(1_240_000.0), "1.2M");
        assert_eq!(millions(2_040_000.0), "2.0M");
        assert_eq!(millions_af(25_000_000.0), "25M AF");
        assert_eq!(millions_af(2_500_000.0), "2.5M AF");
    }
}
