//! SI prefix handling for times and amplitudes.

/// Parse a value with an optional SI prefix and an optional unit.
///
/// Accepts `"3e-9"`, `"3n"`, `"3ns"`, `"-10ns"`, `"600mV"`, `"0.6V"`.
/// Recognised units are `s` and `V`; prefixes are
/// - G (giga, 1e9)
/// - M (mega, 1e6)
/// - k (kilo, 1e3)
/// - m (milli, 1e-3)
/// - u or µ (micro, 1e-6)
/// - n (nano, 1e-9)
/// - p (pico, 1e-12)
/// - f (femto, 1e-15)
///
/// Prefixes are case-sensitive so that `m` and `M` stay distinct.
pub fn parse_quantity(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(v) = s.parse::<f64>() {
        return Some(v);
    }

    let without_unit = s
        .strip_suffix('s')
        .or_else(|| s.strip_suffix('V'))
        .unwrap_or(s);
    if let Ok(v) = without_unit.parse::<f64>() {
        return Some(v);
    }

    let prefix = without_unit.chars().last()?;
    let number = &without_unit[..without_unit.len() - prefix.len_utf8()];
    let value: f64 = number.parse().ok()?;

    let multiplier = match prefix {
        'G' => 1e9,
        'M' => 1e6,
        'k' | 'K' => 1e3,
        'm' => 1e-3,
        'u' | 'µ' => 1e-6,
        'n' => 1e-9,
        'p' => 1e-12,
        'f' => 1e-15,
        _ => return None,
    };

    Some(value * multiplier)
}

/// Format a value with an engineering SI prefix and the given unit.
pub fn format_quantity(value: f64, unit: &str) -> String {
    const PREFIXES: [(f64, &str); 9] = [
        (1e9, "G"),
        (1e6, "M"),
        (1e3, "k"),
        (1.0, ""),
        (1e-3, "m"),
        (1e-6, "u"),
        (1e-9, "n"),
        (1e-12, "p"),
        (1e-15, "f"),
    ];

    let abs_value = value.abs();
    if abs_value == 0.0 || !abs_value.is_finite() {
        return format!("{value}{unit}");
    }

    let (scale, prefix) = PREFIXES
        .iter()
        .find(|(scale, _)| abs_value >= *scale)
        .copied()
        .unwrap_or((1.0, ""));

    format!("{:.4}{}{}", value / scale, prefix, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|v| (v - b).abs() < b.abs() * 1e-10 + 1e-24)
    }

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(parse_quantity("1.5"), Some(1.5));
        assert_eq!(parse_quantity("-2.5"), Some(-2.5));
        assert_eq!(parse_quantity("3e-9"), Some(3e-9));
    }

    #[test]
    fn test_parse_with_prefix_and_unit() {
        assert!(approx_eq(parse_quantity("3n"), 3e-9));
        assert!(approx_eq(parse_quantity("3ns"), 3e-9));
        assert!(approx_eq(parse_quantity("-10ns"), -10e-9));
        assert!(approx_eq(parse_quantity("600mV"), 0.6));
        assert!(approx_eq(parse_quantity("0.6V"), 0.6));
        assert!(approx_eq(parse_quantity("2s"), 2.0));
        assert!(approx_eq(parse_quantity("1.5us"), 1.5e-6));
        assert!(approx_eq(parse_quantity("4M"), 4e6));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity("3x"), None);
        assert_eq!(parse_quantity("n"), None);
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(3e-9, "s"), "3.0000ns");
        assert_eq!(format_quantity(0.6, "V"), "600.0000mV");
        assert_eq!(format_quantity(-1.5e-6, "s"), "-1.5000us");
        assert_eq!(format_quantity(0.0, "s"), "0s");
    }
}
