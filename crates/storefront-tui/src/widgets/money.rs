//! Price formatting for table cells.

/// Formats a price with thousands separators. Whole amounts drop the
/// decimals; fractional ones keep two places.
pub fn fmt_price(value: f64) -> String {
    let negative = value < 0.0;
    let value = value.abs();

    let cents = (value * 100.0).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cents = cents as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let mut grouped = String::new();
    let digits = whole.to_string();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    if frac == 0 {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn whole_amounts_drop_the_decimals() {
        assert_eq!(fmt_price(0.0), "$0");
        assert_eq!(fmt_price(120.0), "$120");
        assert_eq!(fmt_price(1200.0), "$1,200");
    }

    #[test]
    fn fractional_amounts_keep_two_places() {
        assert_eq!(fmt_price(99.5), "$99.50");
        assert_eq!(fmt_price(1234.56), "$1,234.56");
    }

    #[test]
    fn large_amounts_group_every_three_digits() {
        assert_eq!(fmt_price(1_000_000.0), "$1,000,000");
        assert_eq!(fmt_price(98_765_432.1), "$98,765,432.10");
    }

    #[test]
    fn negative_amounts_carry_the_sign_outside() {
        assert_eq!(fmt_price(-50.0), "-$50");
    }
}
