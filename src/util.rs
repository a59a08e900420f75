// Utility helpers for parsing, rounding and formatting.
//
// The dataset carries its numbers as strings. Everything that turns those
// strings into display text lives here so the projector can stay a plain
// sequence of lookups.
use chrono::{Datelike, Month, NaiveDate};
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in hand-maintained exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Accepts exponent notation (`5e-1`).
/// - Strips commas only when they group the integer part in threes
///   (`1,250.5`); a decimal comma such as `0,5` does not parse.
/// - Returns `None` for anything that cannot be parsed or is not finite.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = if s.contains(',') { strip_thousands(s)? } else { s.to_string() };
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn strip_thousands(s: &str) -> Option<String> {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let int_part = unsigned.split(['.', 'e', 'E']).next().unwrap_or_default();
    let mut groups = int_part.split(',');
    let head = groups.next().unwrap_or_default();
    let head_ok = (1..=3).contains(&head.len()) && head.bytes().all(|b| b.is_ascii_digit());
    let rest_ok = groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()));
    let fraction_clean = !unsigned[int_part.len()..].contains(',');
    (head_ok && rest_ok && fraction_clean).then(|| s.replace(',', ""))
}

/// Unparsable or missing numbers count as zero.
pub fn parse_or_zero(s: Option<&str>) -> f64 {
    parse_f64_safe(s).unwrap_or(0.0)
}

/// Treat an empty string the same as an absent field.
pub fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}

/// Round half away from zero (`0.5 -> 1`, `12.5 -> 13`).
pub fn round_to_i64(n: f64) -> i64 {
    if !n.is_finite() {
        return 0;
    }
    n.round() as i64
}

/// `"0.8234"` -> `"82%"`. Unparsable input renders as `"0%"`.
pub fn format_percent(rate: &str) -> String {
    format!("{}%", round_to_i64(parse_or_zero(Some(rate)) * 100.0))
}

pub fn format_eur(amount: f64) -> String {
    format!("{} EUR", round_to_i64(amount))
}

/// Unrounded amount, e.g. `3200.5 EUR`; whole amounts print without a
/// fraction.
pub fn format_eur_raw(amount: f64) -> String {
    format!("{} EUR", amount)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g. `1,204 records loaded`).
    n.to_formatted_string(&Locale::en)
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Month labels derived from a reference date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthFrame {
    pub current_month_name: &'static str,
    pub previous_month_name: &'static str,
    /// `YYYY-MM` of the previous calendar month.
    pub previous_month_key: String,
}

impl MonthFrame {
    pub fn from_reference(date: NaiveDate) -> Self {
        let (prev_year, prev_month) = match date.month() {
            1 => (date.year() - 1, 12),
            m => (date.year(), m - 1),
        };
        Self {
            current_month_name: month_name(date.month()),
            previous_month_name: month_name(prev_month),
            previous_month_key: format!("{}-{:02}", prev_year, prev_month),
        }
    }
}

fn month_name(month: u32) -> &'static str {
    // `Datelike::month` is always 1..=12.
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parse_is_forgiving_but_strict_about_text() {
        assert_eq!(parse_f64_safe(Some(" 1,250.5 ")), Some(1250.5));
        assert_eq!(parse_f64_safe(Some("-12,000,000")), Some(-12000000.0));
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(Some("abc")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
        assert_eq!(parse_or_zero(Some("0.5x")), 0.0);
    }

    #[test]
    fn decimal_commas_do_not_parse() {
        assert_eq!(parse_f64_safe(Some("0,5")), None);
        assert_eq!(parse_f64_safe(Some("3500,40")), None);
        assert_eq!(parse_f64_safe(Some("1,25")), None);
        assert_eq!(parse_f64_safe(Some("1,250.5,0")), None);
        assert_eq!(format_percent("0,5"), "0%");
    }

    #[test]
    fn exponent_notation_parses() {
        assert_eq!(parse_f64_safe(Some("5e-1")), Some(0.5));
        assert_eq!(parse_f64_safe(Some("1E-7")), Some(1e-7));
        assert_eq!(format_percent("5e-1"), "50%");
    }

    #[test]
    fn percent_rounds_half_away_from_zero() {
        assert_eq!(format_percent("0.8234"), "82%");
        assert_eq!(format_percent("0.125"), "13%");
        assert_eq!(format_percent("1"), "100%");
        assert_eq!(format_percent("garbage"), "0%");
    }

    #[test]
    fn eur_rounds_to_whole_units() {
        assert_eq!(format_eur(3500.4), "3500 EUR");
        assert_eq!(format_eur(3500.5), "3501 EUR");
        assert_eq!(format_eur(-0.2), "0 EUR");
        assert_eq!(format_eur_raw(3200.0), "3200 EUR");
        assert_eq!(format_eur_raw(3200.5), "3200.5 EUR");
    }

    #[test]
    fn format_number_inserts_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-4000.0, 0), "-4,000");
        assert_eq!(format_int(12345usize), "12,345");
    }

    #[test]
    fn month_frame_mid_year() {
        let frame = MonthFrame::from_reference(date(2024, 5, 15));
        assert_eq!(frame.current_month_name, "May");
        assert_eq!(frame.previous_month_name, "April");
        assert_eq!(frame.previous_month_key, "2024-04");
    }

    #[test]
    fn month_frame_rolls_back_over_january() {
        let frame = MonthFrame::from_reference(date(2025, 1, 1));
        assert_eq!(frame.current_month_name, "January");
        assert_eq!(frame.previous_month_name, "December");
        assert_eq!(frame.previous_month_key, "2024-12");
    }

    #[test]
    fn parse_date_accepts_iso_dates_only() {
        assert_eq!(parse_date_safe(Some("2024-07-03")), Some(date(2024, 7, 3)));
        assert_eq!(parse_date_safe(Some("03/07/2024")), None);
    }
}
