//! Number formatting shared by the collector and the report pages.

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// English-locale thousands separators: `1234567` -> `1,234,567`.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Two decimals with a separated integer part: `12345.678` -> `12,345.68`.
pub fn decimal2(value: f64) -> String {
    let rounded = round2(value.abs());
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;
    let sign = if value < 0.0 && rounded > 0.0 { "-" } else { "" };
    format!("{sign}{}.{cents:02}", thousands(whole))
}

/// Currency symbol prefixed to a separated integer: `€24,000`.
pub fn money(symbol: &str, value: u64) -> String {
    format!("{symbol}{}", thousands(value))
}

/// A growth rate as a whole percentage, e.g. `0.0512` -> `5%`.
pub fn percent_rounded(rate: f64) -> String {
    format!("{}%", (rate * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_groups_by_three() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(12_000), "12,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn decimals_and_money() {
        assert_eq!(decimal2(2.0), "2.00");
        assert_eq!(decimal2(12_345.678), "12,345.68");
        assert_eq!(money("€", 24_000), "€24,000");
        assert_eq!(round2(1.005_1), 1.01);
    }

    #[test]
    fn percentages_round_to_whole_numbers() {
        assert_eq!(percent_rounded(0.0512), "5%");
        assert_eq!(percent_rounded(-0.126), "-13%");
        assert_eq!(percent_rounded(0.0), "0%");
    }
}
