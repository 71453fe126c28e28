//! URL building and query string helpers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::value::{ParamMap, ParamValue};
use crate::warning::Warning;

static QUERY_PAIR: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"[?&]+([^=&]+)=([^&]*)").unwrap_or_else(|e| panic!("invalid query regex: {}", e))
});

/// Parses `key=value` pairs found after the first `?` of `url`.
///
/// Pairs without `=` are skipped. Values are numeric-coerced and a stray
/// `#/` left over from hash addressing is removed from text values.
pub fn parse_query(url: &str) -> ParamMap {
	let Some(start) = url.find('?') else {
		return ParamMap::new();
	};

	QUERY_PAIR
		.captures_iter(&url[start..])
		.map(|caps| {
			let value = match ParamValue::parse(&caps[2]) {
				ParamValue::Text(text) if text.contains("#/") => {
					ParamValue::Text(text.replacen("#/", "", 1))
				}
				other => other,
			};
			(caps[1].to_string(), value)
		})
		.collect()
}

/// Appends `params` to `path` as a query string.
pub fn append_query(path: &str, params: &ParamMap) -> String {
	let mut url = path.to_string();
	let mut separator = if path.contains('?') { '&' } else { '?' };

	for (key, value) in params {
		url.push(separator);
		url.push_str(key);
		url.push('=');
		url.push_str(&value.to_string());
		separator = '&';
	}

	url
}

/// Substitutes `:name` placeholders in `path` with values from `params`.
///
/// Longer names are substituted first so that `:id` never eats the prefix of
/// `:idx`. Placeholder segments left without a value are removed from the
/// path and reported as warnings. Substituted values are never mistaken for
/// placeholders, even when they start with `:`.
pub fn substitute_path_params(path: &str, params: &ParamMap) -> (String, Vec<Warning>) {
	let mut names: Vec<&String> = params.keys().collect();
	names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| b.cmp(a)));

	let (path, query) = match path.split_once('?') {
		Some((path, query)) => (path, Some(query)),
		None => (path, None),
	};

	let mut unresolved = Vec::new();
	let mut segments = Vec::new();
	for segment in path.split('/') {
		let Some(name) = segment.strip_prefix(':') else {
			segments.push(segment.to_string());
			continue;
		};
		if !names.iter().any(|known| name.starts_with(known.as_str())) {
			unresolved.push(name);
			continue;
		}
		segments.push(substitute_segment(segment, &names, params));
	}

	let mut url = segments.join("/");
	if url.is_empty() {
		url.push('/');
	}
	if let Some(query) = query {
		url.push('?');
		url.push_str(query);
	}

	let warnings = unresolved
		.into_iter()
		.map(|name| Warning::UnresolvedPathParam {
			name: name.to_string(),
			path: url.clone(),
		})
		.collect();

	(url, warnings)
}

/// Replaces every placeholder of one segment, longest name first.
///
/// Placeholders are located in the original segment, so text coming from a
/// value is copied verbatim.
fn substitute_segment(segment: &str, names: &[&String], params: &ParamMap) -> String {
	let mut spans: Vec<(usize, usize, String)> = Vec::new();
	for name in names {
		let placeholder = format!(":{}", name);
		let Some(at) = segment
			.match_indices(&placeholder)
			.map(|(at, _)| at)
			.find(|at| !spans.iter().any(|(start, end, _)| (*start..*end).contains(at)))
		else {
			continue;
		};
		if let Some(value) = params.get(name.as_str()) {
			spans.push((at, at + placeholder.len(), value.to_string()));
		}
	}
	spans.sort_by_key(|(start, _, _)| *start);

	let mut out = String::with_capacity(segment.len());
	let mut cursor = 0;
	for (start, end, value) in spans {
		out.push_str(&segment[cursor..start]);
		out.push_str(&value);
		cursor = end;
	}
	out.push_str(&segment[cursor..]);
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::value::params;
	use rstest::rstest;

	#[rstest]
	fn test_parse_query() {
		let parsed = parse_query("http://app.test/#/person/42?sort=asc&page=2&flag&ref=x#/");

		assert_eq!(parsed.get("sort"), Some(&ParamValue::Text("asc".into())));
		assert_eq!(parsed.get("page"), Some(&ParamValue::Int(2)));
		assert_eq!(parsed.get("ref"), Some(&ParamValue::Text("x".into())));
		assert!(!parsed.contains_key("flag"));
	}

	#[rstest]
	fn test_parse_query_without_query() {
		assert!(parse_query("http://app.test/person/42").is_empty());
	}

	#[rstest]
	#[case("/person/7", params([("sort", "asc")]), "/person/7?sort=asc")]
	#[case("/list", params([("a", 1), ("b", 2)]), "/list?a=1&b=2")]
	#[case("/list?a=1", params([("b", 2)]), "/list?a=1&b=2")]
	#[case("/list", ParamMap::new(), "/list")]
	fn test_append_query(#[case] path: &str, #[case] query: ParamMap, #[case] expected: &str) {
		assert_eq!(append_query(path, &query), expected);
	}

	#[rstest]
	fn test_substitute_longest_name_first() {
		let values = params([("id", ParamValue::from(1)), ("idx", ParamValue::from(2))]);

		let (url, warnings) = substitute_path_params("/item/:id/pos/:idx", &values);

		assert_eq!(url, "/item/1/pos/2");
		assert!(warnings.is_empty());
	}

	#[rstest]
	fn test_substitute_strips_unresolved_segments() {
		let values = params([("id", 7)]);

		let (url, warnings) = substitute_path_params("/person/:id/tab/:tab", &values);

		assert_eq!(url, "/person/7/tab");
		assert_eq!(
			warnings,
			vec![Warning::UnresolvedPathParam {
				name: "tab".into(),
				path: "/person/7/tab".into(),
			}]
		);
	}

	#[rstest]
	fn test_substitute_keeps_values_starting_with_colon() {
		let values = params([("tag", ":odd")]);

		let (url, warnings) = substitute_path_params("/tags/:tag", &values);

		assert_eq!(url, "/tags/:odd");
		assert!(warnings.is_empty());
	}

	#[rstest]
	fn test_substitute_leaves_query_untouched() {
		let values = params([("id", 7)]);

		let (url, warnings) = substitute_path_params("/person/:id?tab=info", &values);

		assert_eq!(url, "/person/7?tab=info");
		assert!(warnings.is_empty());
	}

	#[rstest]
	fn test_substitute_only_placeholder() {
		let (url, warnings) = substitute_path_params("/:id", &ParamMap::new());
		assert_eq!(url, "/");
		assert_eq!(warnings.len(), 1);
	}
}
