//! Path pattern compilation and matching.
//!
//! A route string such as `/person/:id/edit` compiles into an ordered list of
//! tokens, each either a literal segment or a placeholder:
//!
//! - `/persons` - one literal token
//! - `/person/:id` - a literal followed by a placeholder bound to `id`
//! - `/` or the empty string - no tokens, matches the root
//!
//! Query strings are ignored and empty segments (leading, trailing or
//! doubled slashes) are dropped, so `/person//42/?sort=asc` and `person/42`
//! compile to the same tokens.

use std::fmt;

use crate::value::{ParamMap, ParamValue};

/// Text used for placeholders when a pattern is rendered for diagnostics.
const PLACEHOLDER_LABEL: &str = "PATH_PARAM";

/// A single compiled path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
	/// A segment that must match exactly.
	Literal(String),
	/// A segment that matches anything and binds it to a parameter.
	Placeholder,
}

impl Token {
	/// Returns whether this token is a placeholder.
	pub fn is_placeholder(&self) -> bool {
		matches!(self, Self::Placeholder)
	}
}

/// A compiled path pattern.
#[derive(Debug, Clone, Default)]
pub struct PathPattern {
	tokens: Vec<Token>,
	param_names: Vec<String>,
}

impl PathPattern {
	/// Compiles the path portion of `raw` into a pattern.
	pub fn compile(raw: &str) -> Self {
		let mut tokens = Vec::new();
		let mut param_names = Vec::new();

		for segment in segments(raw) {
			if let Some(name) = segment.strip_prefix(':') {
				param_names.push(name.to_string());
				tokens.push(Token::Placeholder);
			} else {
				tokens.push(Token::Literal(segment.to_string()));
			}
		}

		Self {
			tokens,
			param_names,
		}
	}

	/// Compiles a location into a probe pattern.
	///
	/// Every segment of a probe is literal, a location segment that happens
	/// to start with `:` is data, not a placeholder.
	pub fn probe(location: &str) -> Self {
		Self {
			tokens: segments(location)
				.map(|segment| Token::Literal(segment.to_string()))
				.collect(),
			param_names: Vec::new(),
		}
	}

	/// Returns the compiled tokens.
	pub fn tokens(&self) -> &[Token] {
		&self.tokens
	}

	/// Returns the placeholder names in declaration order.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns the number of tokens.
	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	/// Returns whether the pattern matches only the root.
	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// Returns whether `other` has the same literal/placeholder shape.
	///
	/// Placeholder names are not compared, so `/person/:id` and
	/// `/person/:personId` share a shape.
	pub fn same_shape(&self, other: &PathPattern) -> bool {
		self.tokens == other.tokens
	}

	/// Checks whether a probe pattern compiled from a location matches.
	///
	/// Token counts must be equal and every literal token must equal the
	/// probe token at the same position.
	pub fn matches(&self, probe: &PathPattern) -> bool {
		self.tokens.len() == probe.tokens.len()
			&& self
				.tokens
				.iter()
				.zip(&probe.tokens)
				.all(|(own, seen)| own.is_placeholder() || own == seen)
	}

	/// Extracts path parameters from a matching probe.
	///
	/// Values are bound positionally to the declared names and numeric
	/// looking values are coerced.
	pub fn extract(&self, probe: &PathPattern) -> ParamMap {
		let mut names = self.param_names.iter();
		let mut params = ParamMap::new();

		for (own, seen) in self.tokens.iter().zip(&probe.tokens) {
			if !own.is_placeholder() {
				continue;
			}
			let Some(name) = names.next() else {
				break;
			};
			let raw = match seen {
				Token::Literal(text) => text.as_str(),
				// probes are all literal
				Token::Placeholder => "",
			};
			params.insert(name.clone(), ParamValue::parse(raw));
		}

		params
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.tokens == other.tokens && self.param_names == other.param_names
	}
}

impl Eq for PathPattern {}

impl fmt::Display for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.tokens.is_empty() {
			return f.write_str("/");
		}
		for token in &self.tokens {
			match token {
				Token::Literal(text) => write!(f, "/{}", text)?,
				Token::Placeholder => write!(f, "/{}", PLACEHOLDER_LABEL)?,
			}
		}
		Ok(())
	}
}

/// Non-empty segments of the path portion of `raw`.
fn segments(raw: &str) -> impl Iterator<Item = &str> {
	let path = raw.split_once('?').map_or(raw, |(path, _)| path);
	path.split('/').filter(|segment| !segment.trim().is_empty())
}

/// Returns the static prefix of a raw pattern, up to its first placeholder.
///
/// Used to find hyperlinks that point at the same route family.
pub fn static_prefix(raw: &str) -> &str {
	raw.find(':').map_or(raw, |idx| &raw[..idx])
}
