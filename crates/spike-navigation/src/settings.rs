//! Router settings.
//!
//! Settings deserialize from TOML with every field optional:
//!
//! ```toml
//! routing_enabled = true
//! html5_mode = true
//! check_route_names_uniqueness = false
//! main_controller = "Dashboard"
//! cache_policy = "same-route"
//! ```

use serde::{Deserialize, Serialize};
use spike_routing::RouteRegistry;
use thiserror::Error;

/// Settings loading errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
	/// The TOML document could not be parsed.
	#[error("invalid router settings: {0}")]
	Parse(#[from] toml::de::Error),
}

/// When the resolved view data cache answers a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
	/// Answer from the cache only while the current route differs from the
	/// route the entry was computed for. Kept for compatibility with
	/// applications written against the historical behaviour.
	#[default]
	Legacy,
	/// Answer from the cache only while the current route equals the cached
	/// route.
	SameRoute,
}

impl CachePolicy {
	/// Returns whether an entry computed for `cached` answers a lookup for
	/// `current`.
	pub fn is_hit(self, cached: &str, current: &str) -> bool {
		match self {
			Self::Legacy => cached != current,
			Self::SameRoute => cached == current,
		}
	}
}

/// Router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
	/// Whether the router installs itself at startup.
	pub routing_enabled: bool,
	/// Use History API addressing when the browser supports it.
	pub html5_mode: bool,
	/// Reject a route name repeated under the same path.
	pub check_route_names_uniqueness: bool,
	/// Controller reported when nothing has rendered yet.
	pub main_controller: String,
	/// View data cache behaviour.
	pub cache_policy: CachePolicy,
}

impl Default for RouterSettings {
	fn default() -> Self {
		Self {
			routing_enabled: true,
			html5_mode: false,
			check_route_names_uniqueness: false,
			main_controller: "Home".to_string(),
			cache_policy: CachePolicy::default(),
		}
	}
}

impl RouterSettings {
	/// Creates settings with default values.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses settings from a TOML document.
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}

	/// Enables or disables routing.
	pub fn with_routing_enabled(mut self, enabled: bool) -> Self {
		self.routing_enabled = enabled;
		self
	}

	/// Enables or disables History API addressing.
	pub fn with_html5_mode(mut self, enabled: bool) -> Self {
		self.html5_mode = enabled;
		self
	}

	/// Enables or disables the per-path route name check.
	pub fn with_route_name_check(mut self, enabled: bool) -> Self {
		self.check_route_names_uniqueness = enabled;
		self
	}

	/// Sets the fallback controller name.
	pub fn with_main_controller(mut self, name: impl Into<String>) -> Self {
		self.main_controller = name.into();
		self
	}

	/// Sets the view data cache behaviour.
	pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
		self.cache_policy = policy;
		self
	}

	/// Creates an empty route registry configured by these settings.
	pub fn registry(&self) -> RouteRegistry {
		RouteRegistry::new().with_name_uniqueness(self.check_route_names_uniqueness)
	}
}
