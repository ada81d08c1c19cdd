//! Numeric coercion for report cells.
//!
//! Report cells carry display strings in accounting format. [`coerce`] is a
//! total function: anything it cannot read becomes `0.0`, so malformed cells
//! shrink an aggregate instead of aborting the report.

/// Parses an accounting-format cell value.
///
/// Rules, in order:
/// 1. absent, empty, or `-` → `0.0`
/// 2. thousands-separator commas are removed
/// 3. a value fully wrapped in parentheses is a negative magnitude
/// 4. otherwise the value is parsed as a decimal number
/// 5. anything unparsable or non-finite → `0.0`
pub fn coerce(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return 0.0;
    }

    let cleaned = trimmed.replace(',', "");
    let (negative, digits) = match cleaned
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
    {
        Some(inner) => (true, inner.trim()),
        None => (false, cleaned.as_str()),
    };

    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            if negative {
                -value
            } else {
                value
            }
        }
        _ => 0.0,
    }
}

/// Rounds to two decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_table() {
        let cases = [
            (Some("1,234.50"), 1234.50),
            (Some("(500)"), -500.0),
            (Some("-"), 0.0),
            (Some(""), 0.0),
            (Some("abc"), 0.0),
            (None, 0.0),
        ];
        for (raw, expected) in cases {
            assert_eq!(coerce(raw), expected, "coerce({raw:?})");
        }
    }

    #[test]
    fn test_coerce_variants() {
        assert_eq!(coerce(Some("  42.10 ")), 42.10);
        assert_eq!(coerce(Some("-17.25")), -17.25);
        assert_eq!(coerce(Some("(1,000.75)")), -1000.75);
        assert_eq!(coerce(Some("1,000,000")), 1_000_000.0);
    }

    #[test]
    fn test_coerce_rejects_non_finite_and_partial_parens() {
        assert_eq!(coerce(Some("NaN")), 0.0);
        assert_eq!(coerce(Some("inf")), 0.0);
        assert_eq!(coerce(Some("(500")), 0.0);
        assert_eq!(coerce(Some("()")), 0.0);
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(0.1 + 0.2), 0.3);
        assert_eq!(round_cents(10.005_1), 10.01);
        assert_eq!(round_cents(-3.333), -3.33);
    }
}
