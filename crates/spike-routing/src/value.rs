//! Parameter values extracted from paths and query strings.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Ordered map of parameter names to values.
///
/// Insertion order is kept so that query strings are rebuilt in the order
/// the parameters were supplied.
pub type ParamMap = IndexMap<String, ParamValue>;

/// A path or URL parameter value.
///
/// Numeric looking text is coerced to a number, except integers written
/// with a leading zero (`042`), which keep their text form. Exponent
/// notation is never coerced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
	/// Integral value.
	Int(i64),
	/// Non-integral value.
	Float(f64),
	/// Any other text.
	Text(String),
}

impl ParamValue {
	/// Parses raw path or query text, coercing numbers.
	pub fn parse(raw: &str) -> Self {
		if !looks_numeric(raw) {
			return Self::Text(raw.to_string());
		}

		let Ok(number) = raw.parse::<f64>() else {
			return Self::Text(raw.to_string());
		};

		if number.fract() != 0.0 {
			return Self::Float(number);
		}

		if raw.starts_with('0') && raw.len() > 1 {
			return Self::Text(raw.to_string());
		}

		// Integers past i64 keep their exact digits.
		let integral = raw.split('.').next().unwrap_or(raw);
		match integral.parse::<i64>() {
			Ok(int) => Self::Int(int),
			Err(_) => Self::Text(raw.to_string()),
		}
	}

	/// Returns the text form, if this is a text value.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			_ => None,
		}
	}

	/// Returns the integral value, if this is an integer.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Int(int) => Some(*int),
			_ => None,
		}
	}
}

/// Digits with an optional sign and decimal point, nothing else.
fn looks_numeric(raw: &str) -> bool {
	let unsigned = raw.strip_prefix(['-', '+']).unwrap_or(raw);
	let mut digits = 0;
	let mut dots = 0;

	for c in unsigned.chars() {
		match c {
			'0'..='9' => digits += 1,
			'.' => dots += 1,
			_ => return false,
		}
	}

	digits > 0 && dots <= 1
}

impl fmt::Display for ParamValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(int) => write!(f, "{}", int),
			Self::Float(float) => write!(f, "{}", float),
			Self::Text(text) => f.write_str(text),
		}
	}
}

impl From<i64> for ParamValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for ParamValue {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<f64> for ParamValue {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

/// Builds a [`ParamMap`] from `(name, value)` pairs.
///
/// ```
/// use spike_routing::{ParamValue, params};
///
/// let map = params([("id", ParamValue::from(7)), ("sort", "asc".into())]);
/// assert_eq!(map.len(), 2);
/// ```
pub fn params<K, V, I>(pairs: I) -> ParamMap
where
	K: Into<String>,
	V: Into<ParamValue>,
	I: IntoIterator<Item = (K, V)>,
{
	pairs
		.into_iter()
		.map(|(key, value)| (key.into(), value.into()))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("42", ParamValue::Int(42))]
	#[case("-7", ParamValue::Int(-7))]
	#[case("0", ParamValue::Int(0))]
	#[case("5.0", ParamValue::Int(5))]
	#[case("2.5", ParamValue::Float(2.5))]
	#[case("05.5", ParamValue::Float(5.5))]
	#[case("042", ParamValue::Text("042".into()))]
	#[case("0.0", ParamValue::Text("0.0".into()))]
	#[case("1e5", ParamValue::Text("1e5".into()))]
	#[case("inf", ParamValue::Text("inf".into()))]
	#[case("", ParamValue::Text("".into()))]
	#[case("john", ParamValue::Text("john".into()))]
	#[case("1.2.3", ParamValue::Text("1.2.3".into()))]
	#[case("99999999999999999999", ParamValue::Text("99999999999999999999".into()))]
	#[case("99999999999999999999.0", ParamValue::Text("99999999999999999999.0".into()))]
	fn test_parse(#[case] raw: &str, #[case] expected: ParamValue) {
		assert_eq!(ParamValue::parse(raw), expected);
	}

	#[rstest]
	fn test_serializes_numbers_as_numbers() {
		let map = params([("id", ParamValue::from(42)), ("name", "ann".into())]);
		let json = serde_json::to_string(&map).unwrap();
		assert_eq!(json, r#"{"id":42,"name":"ann"}"#);
	}

	#[rstest]
	fn test_display() {
		assert_eq!(ParamValue::Int(7).to_string(), "7");
		assert_eq!(ParamValue::Text("asc".into()).to_string(), "asc");
	}
}
