use rust_decimal::{Decimal, RoundingStrategy};
use time::{macros::format_description, Date};

/// Formats a value as `1.234.567,89`: two decimals (half-up), comma decimal
/// separator, period thousands separator.
pub fn format_value(value: &Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = rounded.abs().to_string();
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{frac_part:0<2}")
}

pub fn format_date(date: &Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(&format).unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use time::macros::date;

    fn fmt(v: &str) -> String {
        format_value(&Decimal::from_str(v).unwrap())
    }

    #[test]
    fn formats_with_locale_separators() {
        assert_eq!(fmt("1500"), "1.500,00");
        assert_eq!(fmt("120.5"), "120,50");
        assert_eq!(fmt("0.01"), "0,01");
        assert_eq!(fmt("999"), "999,00");
        assert_eq!(fmt("1000"), "1.000,00");
        assert_eq!(fmt("99999999.99"), "99.999.999,99");
        assert_eq!(fmt("1234567.8"), "1.234.567,80");
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(fmt("2.345"), "2,35");
        assert_eq!(fmt("2.344"), "2,34");
        assert_eq!(fmt("999.995"), "1.000,00");
    }

    #[test]
    fn keeps_sign_for_negatives() {
        assert_eq!(fmt("-1500.5"), "-1.500,50");
        assert_eq!(fmt("-0.001"), "0,00");
    }

    #[test]
    fn dates_are_iso() {
        assert_eq!(format_date(&date!(2024 - 10 - 09)), "2024-10-09");
        assert_eq!(format_date(&date!(2024 - 01 - 01)), "2024-01-01");
    }
}
