//! Human-readable byte sizes
//!
//! `parse_size` turns user input such as `"2.4 GB"` or `"700mib"` into a byte
//! count, `format_size` renders a byte count for display.
//!
//! Decimal units (`KB`, `MB`, `GB`, `TB`) are powers of 1000 and binary units
//! (`KiB`, `MiB`, `GiB`, `TiB`) are powers of 1024. Formatting always uses the
//! decimal units. Parsing is done with integer arithmetic so decimal inputs
//! never pick up floating point error; fractional bytes are truncated.

use once_cell::sync::Lazy;
use regex::Regex;

/// `<number><unit>` once whitespace has been removed.
static SIZE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]*)(?:\.([0-9]+))?([A-Za-z]+)$").expect("size pattern is valid")
});

/// Display units, largest first.
const DISPLAY_UNITS: [(&str, u64); 4] = [
    ("TB", 1_000_000_000_000),
    ("GB", 1_000_000_000),
    ("MB", 1_000_000),
    ("KB", 1_000),
];

/// Fraction digits beyond this cannot change the truncated result for any
/// supported multiplier.
const MAX_FRACTION_DIGITS: usize = 24;

/// Error returned when a size string cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SizeError {
    #[error("Invalid size format: '{0}'. Use formats like 1 MB, 2.4GB, 700 MiB")]
    InvalidFormat(String),
}

/// Byte multiplier for a unit name, case-insensitive.
fn unit_multiplier(unit: &str) -> Option<u64> {
    let multiplier = match unit.to_ascii_lowercase().as_str() {
        "b" => 1,
        "kb" => 1_000,
        "mb" => 1_000_000,
        "gb" => 1_000_000_000,
        "tb" => 1_000_000_000_000,
        "kib" => 1 << 10,
        "mib" => 1 << 20,
        "gib" => 1 << 30,
        "tib" => 1 << 40,
        _ => return None,
    };
    Some(multiplier)
}

/// Parse a human-entered size into bytes.
///
/// Whitespace anywhere in the input is ignored.
///
/// ```
/// use frontpage::services::size::parse_size;
///
/// assert_eq!(parse_size("2.4GB").unwrap(), 2_400_000_000);
/// assert_eq!(parse_size("1 KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1 G B").unwrap(), 1_000_000_000);
/// ```
pub fn parse_size(input: &str) -> Result<u64, SizeError> {
    let invalid = || SizeError::InvalidFormat(input.to_string());
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    let caps = SIZE_PATTERN.captures(&compact).ok_or_else(invalid)?;
    let whole = caps.get(1).map_or("", |m| m.as_str());
    let fraction = caps.get(2).map_or("", |m| m.as_str());
    let unit = caps.get(3).map_or("", |m| m.as_str());

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }

    let multiplier = u128::from(unit_multiplier(unit).ok_or_else(invalid)?);

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };

    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    let fraction_bytes = if fraction.is_empty() {
        0
    } else {
        let numerator: u128 = fraction.parse().map_err(|_| invalid())?;
        let denominator = 10u128.pow(fraction.len() as u32);
        numerator * multiplier / denominator
    };

    let bytes = whole
        .checked_mul(multiplier)
        .and_then(|b| b.checked_add(fraction_bytes))
        .ok_or_else(invalid)?;

    u64::try_from(bytes).map_err(|_| invalid())
}

/// Format a byte count for display.
///
/// Values below 1000 are shown as whole bytes (`"512 B"`); larger values use
/// the largest decimal unit that keeps the magnitude under 1000, with two
/// decimals (`"2.40 GB"`).
pub fn format_size(bytes: u64) -> String {
    let Some(index) = DISPLAY_UNITS.iter().position(|(_, unit)| bytes >= *unit) else {
        return format!("{} B", bytes);
    };

    let (mut name, unit) = DISPLAY_UNITS[index];
    let mut value = bytes as f64 / unit as f64;

    // 999_999 bytes would print as "1000.00 KB"; promote it instead.
    if index > 0 && (value * 100.0).round() >= 100_000.0 {
        let (bigger_name, bigger_unit) = DISPLAY_UNITS[index - 1];
        name = bigger_name;
        value = bytes as f64 / bigger_unit as f64;
    }

    format!("{:.2} {}", value, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_decimal_units() {
        assert_eq!(parse_size("2.4GB").unwrap(), 2_400_000_000);
        assert_eq!(parse_size("1 KB").unwrap(), 1_000);
        assert_eq!(parse_size("1.5 MB").unwrap(), 1_500_000);
        assert_eq!(parse_size("3TB").unwrap(), 3_000_000_000_000);
        assert_eq!(parse_size("512 B").unwrap(), 512);
    }

    #[test]
    fn test_parse_binary_units() {
        assert_eq!(parse_size("1KiB").unwrap(), 1024);
        assert_eq!(parse_size("2.5 MiB").unwrap(), 2_621_440);
        assert_eq!(parse_size("1 GiB").unwrap(), 1_073_741_824);
        assert_eq!(parse_size("1 tib").unwrap(), 1_099_511_627_776);
    }

    #[test]
    fn test_parse_case_and_whitespace() {
        assert_eq!(parse_size("2.4gb").unwrap(), 2_400_000_000);
        assert_eq!(parse_size("  10 mB  ").unwrap(), 10_000_000);
        assert_eq!(parse_size("7kib").unwrap(), 7 * 1024);
    }

    #[test]
    fn test_parse_ignores_inner_whitespace() {
        assert_eq!(parse_size("1 G B").unwrap(), 1_000_000_000);
        assert_eq!(parse_size("2 . 5 M i B").unwrap(), 2_621_440);
        assert_eq!(parse_size("1 0\tKB").unwrap(), 10_000);
        assert!(parse_size("   ").is_err());
    }

    #[test]
    fn test_parse_leading_dot() {
        assert_eq!(parse_size(".5KB").unwrap(), 500);
    }

    #[test]
    fn test_parse_truncates_fractional_bytes() {
        assert_eq!(parse_size("1.9 B").unwrap(), 1);
        assert_eq!(parse_size("0.0015 KB").unwrap(), 1);
        assert_eq!(parse_size("1.0001 KiB").unwrap(), 1024);
    }

    #[test]
    fn test_parse_invalid_format() {
        for input in ["bogus", "", "GB", "12", "1.2.3 GB", "-1 GB", "1. GB", "1 PB", "1GBx!"] {
            assert_eq!(
                parse_size(input),
                Err(SizeError::InvalidFormat(input.to_string())),
                "input {:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_parse_overflow_is_invalid() {
        assert!(parse_size("99999999999999 TB").is_err());
        assert!(parse_size("340282366920938463463374607431768211456 B").is_err());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(999), "999 B");
        assert_eq!(format_size(1000), "1.00 KB");
        assert_eq!(format_size(1536), "1.54 KB");
        assert_eq!(format_size(2_400_000_000), "2.40 GB");
        assert_eq!(format_size(5_000_000_000_000), "5.00 TB");
    }

    #[test]
    fn test_format_size_promotes_rounded_magnitude() {
        assert_eq!(format_size(999_999), "1.00 MB");
        assert_eq!(format_size(999_994), "999.99 KB");
    }

    #[test]
    fn test_format_size_caps_at_largest_unit() {
        assert_eq!(format_size(2_500_000_000_000_000), "2500.00 TB");
    }

    #[test]
    fn test_error_message_mentions_input() {
        let err = parse_size("lots").unwrap_err();
        assert!(err.to_string().contains("lots"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_format_then_parse_within_rounding(n in 0u64..10_000_000_000_000_000) {
            let formatted = format_size(n);
            let parsed = parse_size(&formatted).unwrap();
            let tolerance = n / 100 + 1;
            prop_assert!(
                parsed.abs_diff(n) <= tolerance,
                "{} -> {} -> {}", n, formatted, parsed
            );
        }

        #[test]
        fn prop_whole_numbers_scale_exactly(n in 0u64..1_000_000, unit_index in 0usize..9) {
            let units = ["B", "KB", "MB", "GB", "TB", "KiB", "MiB", "GiB", "TiB"];
            let unit = units[unit_index];
            let expected = n * unit_multiplier(unit).unwrap();
            prop_assert_eq!(parse_size(&format!("{} {}", n, unit)).unwrap(), expected);
            prop_assert_eq!(parse_size(&format!("{}{}", n, unit.to_lowercase())).unwrap(), expected);
        }

        #[test]
        fn prop_garbage_without_unit_rejected(s in "[0-9]{1,10}") {
            prop_assert!(parse_size(&s).is_err());
        }
    }
}
