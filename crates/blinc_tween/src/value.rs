//! Tweenable property values
//!
//! A property is either a plain number or a number carrying a literal unit
//! suffix (`"20px"`, `"45deg"`). Tweens interpolate the numeric part and
//! re-attach the suffix when writing back to the target.

use std::fmt;

use indexmap::IndexMap;

/// A property value read from or written to a tween target
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    /// Any string; tweening uses its leading number and keeps the rest as a suffix
    Text(String),
}

impl PropertyValue {
    /// The leading number of this value, if there is one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) if !n.is_nan() => Some(*n),
            PropertyValue::Number(_) => None,
            PropertyValue::Text(s) => split_numeric_prefix(s).map(|(n, _)| n),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            PropertyValue::Number(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(n) => write!(f, "{}", normalize_zero(*n)),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<f32> for PropertyValue {
    fn from(n: f32) -> Self {
        PropertyValue::Number(n as f64)
    }
}

impl From<i32> for PropertyValue {
    fn from(n: i32) -> Self {
        PropertyValue::Number(n as f64)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

/// Insertion-ordered property name → value mapping
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// Build a [`PropertyMap`] from `(name, value)` pairs
///
/// ```
/// use blinc_tween::props;
///
/// let goals = props([("x", 100.into()), ("width", "240px".into())]);
/// assert_eq!(goals.len(), 2);
/// ```
pub fn props<K, I>(pairs: I) -> PropertyMap
where
    K: Into<String>,
    I: IntoIterator<Item = (K, PropertyValue)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// What a tween animates: goal values only, or explicit start and goal values
#[derive(Clone, Debug, PartialEq)]
pub enum PropertySpec {
    /// Animate from the target's current values
    To(PropertyMap),
    /// Animate from the first map (written onto the target at start) to the second
    FromTo(PropertyMap, PropertyMap),
}

impl PropertySpec {
    pub fn from_values(&self) -> Option<&PropertyMap> {
        match self {
            PropertySpec::To(_) => None,
            PropertySpec::FromTo(from, _) => Some(from),
        }
    }

    pub fn to_values(&self) -> &PropertyMap {
        match self {
            PropertySpec::To(to) | PropertySpec::FromTo(_, to) => to,
        }
    }
}

impl From<PropertyMap> for PropertySpec {
    fn from(to: PropertyMap) -> Self {
        PropertySpec::To(to)
    }
}

impl From<(PropertyMap, PropertyMap)> for PropertySpec {
    fn from((from, to): (PropertyMap, PropertyMap)) -> Self {
        PropertySpec::FromTo(from, to)
    }
}

// ============================================================================
// Endpoint parsing
// ============================================================================

/// A tween start or end point after coercion
#[derive(Clone, Debug, PartialEq)]
pub struct Endpoint {
    pub value: f64,
    /// Literal text that followed the number, e.g. `px`
    pub suffix: Option<String>,
    /// True when the raw value had no usable number and a default was substituted
    pub coerced: bool,
}

/// Fallback for a property whose value can't be read as a number.
///
/// Opacity defaults to fully visible, everything else to zero.
pub fn default_for(property: &str) -> f64 {
    if property == "opacity" {
        1.0
    } else {
        0.0
    }
}

/// Parse a tween endpoint for `property`.
///
/// This is the single place where numeric coercion happens:
/// - numbers are used as-is,
/// - strings contribute their leading number, and any trailing text becomes
///   the endpoint's suffix,
/// - missing or unparsable values become [`default_for`] the property.
///
/// Parsing never fails.
pub fn parse_endpoint(property: &str, raw: Option<&PropertyValue>) -> Endpoint {
    let parsed = match raw {
        Some(PropertyValue::Number(n)) if !n.is_nan() => Some((*n, None)),
        Some(PropertyValue::Text(s)) => split_numeric_prefix(s).map(|(n, rest)| {
            let suffix = (!rest.trim().is_empty()).then(|| rest.to_string());
            (n, suffix)
        }),
        _ => None,
    };

    match parsed {
        Some((value, suffix)) => Endpoint {
            value,
            suffix,
            coerced: false,
        },
        None => {
            let value = default_for(property);
            tracing::warn!(
                "Property '{}' has no numeric value ({:?}), using {}",
                property,
                raw,
                value
            );
            Endpoint {
                value,
                suffix: None,
                coerced: true,
            }
        }
    }
}

/// Split a string into its leading decimal number and the remaining text.
///
/// Accepts leading whitespace, a sign, digits with an optional fraction, an
/// optional exponent, and `Infinity`. Returns `None` when no number starts
/// the string.
pub fn split_numeric_prefix(s: &str) -> Option<(f64, &str)> {
    let trimmed = s.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if trimmed[end..].starts_with("Infinity") {
        end += "Infinity".len();
        let value = trimmed[..end].parse::<f64>().ok()?;
        return Some((value, &trimmed[end..]));
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let value = trimmed[..end].parse::<f64>().ok()?;
    Some((value, &trimmed[end..]))
}

// ============================================================================
// Output formatting
// ============================================================================

/// Round half up, toward positive infinity (`-2.5` rounds to `-2`)
pub fn round_half_up(n: f64) -> f64 {
    let floor = n.floor();
    if n - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

fn normalize_zero(n: f64) -> f64 {
    if n == 0.0 {
        0.0
    } else {
        n
    }
}

/// Build the value written to a target: a bare number, or number + suffix text
pub fn format_value(n: f64, suffix: Option<&str>) -> PropertyValue {
    match suffix {
        Some(suffix) => PropertyValue::Text(format!("{}{}", normalize_zero(n), suffix)),
        None => PropertyValue::Number(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(split_numeric_prefix("20px"), Some((20.0, "px")));
        assert_eq!(split_numeric_prefix("-1.5em"), Some((-1.5, "em")));
        assert_eq!(split_numeric_prefix(" .5"), Some((0.5, "")));
        assert_eq!(split_numeric_prefix("3e2deg"), Some((300.0, "deg")));
        assert_eq!(split_numeric_prefix("4em"), Some((4.0, "em")));
        assert_eq!(split_numeric_prefix("7."), Some((7.0, "")));
        assert_eq!(split_numeric_prefix("auto"), None);
        assert_eq!(split_numeric_prefix("-"), None);
        assert_eq!(split_numeric_prefix("."), None);
        assert_eq!(
            split_numeric_prefix("-Infinity"),
            Some((f64::NEG_INFINITY, ""))
        );
    }

    #[test]
    fn test_parse_endpoint_keeps_suffix() {
        let end = parse_endpoint("x", Some(&"45deg".into()));
        assert_eq!(end.value, 45.0);
        assert_eq!(end.suffix.as_deref(), Some("deg"));
        assert!(!end.coerced);

        let plain = parse_endpoint("x", Some(&"12".into()));
        assert_eq!(plain.value, 12.0);
        assert_eq!(plain.suffix, None);
    }

    #[test]
    fn test_parse_endpoint_defaults() {
        let missing = parse_endpoint("left", None);
        assert_eq!(missing.value, 0.0);
        assert!(missing.coerced);

        let opacity = parse_endpoint("opacity", Some(&"".into()));
        assert_eq!(opacity.value, 1.0);
        assert!(opacity.coerced);

        let nan = parse_endpoint("x", Some(&PropertyValue::Number(f64::NAN)));
        assert_eq!(nan.value, 0.0);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(49.9999), 50.0);
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(50.0, Some("px")), PropertyValue::from("50px"));
        assert_eq!(format_value(12.5, Some("%")), PropertyValue::from("12.5%"));
        assert_eq!(format_value(-0.0, Some("px")), PropertyValue::from("0px"));
        assert_eq!(format_value(3.0, None), PropertyValue::Number(3.0));
    }

    #[test]
    fn test_property_spec_sides() {
        let to = props([("x", 1.into())]);
        let spec: PropertySpec = (props([("x", 0.into())]), to.clone()).into();
        assert_eq!(spec.to_values(), &to);
        assert!(spec.from_values().is_some());
        assert!(PropertySpec::from(to).from_values().is_none());
    }
}
