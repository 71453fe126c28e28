//! Hyperlink interception.

use std::fmt;

use crate::location::AddressingMode;

/// Browsing context a link opens in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
	/// `_blank`
	Blank,
	/// `_self`
	SelfFrame,
	/// `_parent`
	Parent,
	/// `_top`
	Top,
	/// Any other named context, passed through as given.
	Named(String),
}

impl LinkTarget {
	/// Normalizes a raw target attribute.
	///
	/// Matching is by case-insensitive substring, in the order `blank`,
	/// `self`, `parent`, `top`, so `Blank` and `new_blank` both open a new
	/// context.
	pub fn normalize(raw: &str) -> Self {
		let lowered = raw.to_lowercase();
		if lowered.contains("blank") {
			Self::Blank
		} else if lowered.contains("self") {
			Self::SelfFrame
		} else if lowered.contains("parent") {
			Self::Parent
		} else if lowered.contains("top") {
			Self::Top
		} else {
			Self::Named(raw.to_string())
		}
	}

	/// Returns the value passed to `window.open`.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Blank => "_blank",
			Self::SelfFrame => "_self",
			Self::Parent => "_parent",
			Self::Top => "_top",
			Self::Named(name) => name,
		}
	}
}

impl fmt::Display for LinkTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What a link click turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
	/// The link is marked plain and left to the browser.
	Ignore,
	/// The link leaves the application.
	Open {
		/// Destination URL.
		url: String,
		/// Browsing context.
		target: LinkTarget,
	},
	/// The link is routed inside the application.
	Redirect(String),
}

/// Decides how a click on a link with `href` is handled.
///
/// Hrefs mentioning `www` or `http` are external. External links without a
/// target open in a new context.
pub fn classify_link(href: &str, target: Option<&str>, plain: bool, mode: AddressingMode) -> LinkAction {
	if plain {
		return LinkAction::Ignore;
	}

	let link = match mode {
		AddressingMode::History => {
			let stripped = href.replacen('#', "", 1);
			if stripped.trim().is_empty() {
				"/".to_string()
			} else {
				stripped
			}
		}
		AddressingMode::Hash => {
			if href.trim().is_empty() {
				"/#/".to_string()
			} else {
				href.to_string()
			}
		}
	};

	if link.contains("www") || link.contains("http") {
		let target = target
			.filter(|target| !target.is_empty())
			.map_or(LinkTarget::Blank, LinkTarget::normalize);
		return LinkAction::Open { url: link, target };
	}

	LinkAction::Redirect(link)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("_blank", LinkTarget::Blank)]
	#[case("NEW_BLANK", LinkTarget::Blank)]
	#[case("_self", LinkTarget::SelfFrame)]
	#[case("_Parent", LinkTarget::Parent)]
	#[case("_top", LinkTarget::Top)]
	#[case("preview", LinkTarget::Named("preview".into()))]
	fn test_normalize_target(#[case] raw: &str, #[case] expected: LinkTarget) {
		assert_eq!(LinkTarget::normalize(raw), expected);
	}

	#[rstest]
	#[case("#/persons", None, false, AddressingMode::Hash, LinkAction::Redirect("#/persons".into()))]
	#[case("", None, false, AddressingMode::Hash, LinkAction::Redirect("/#/".into()))]
	#[case("#/persons", None, false, AddressingMode::History, LinkAction::Redirect("/persons".into()))]
	#[case("#", None, false, AddressingMode::History, LinkAction::Redirect("/".into()))]
	#[case("/persons", None, true, AddressingMode::History, LinkAction::Ignore)]
	#[case(
		"https://example.com",
		None,
		false,
		AddressingMode::Hash,
		LinkAction::Open { url: "https://example.com".into(), target: LinkTarget::Blank }
	)]
	#[case(
		"www.example.com",
		Some("_top"),
		false,
		AddressingMode::History,
		LinkAction::Open { url: "www.example.com".into(), target: LinkTarget::Top }
	)]
	fn test_classify_link(
		#[case] href: &str,
		#[case] target: Option<&str>,
		#[case] plain: bool,
		#[case] mode: AddressingMode,
		#[case] expected: LinkAction,
	) {
		assert_eq!(classify_link(href, target, plain, mode), expected);
	}
}
