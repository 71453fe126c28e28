//! Addressing modes.
//!
//! A [`LocationAdapter`] turns the browser location into the route string
//! matched against the registry and applies redirects in its own way:
//!
//! | Mode    | Route string          | Guard key         | Redirect            |
//! |---------|-----------------------|-------------------|---------------------|
//! | Hash    | fragment without `#/` | fragment w/o `#`  | set the fragment    |
//! | History | pathname              | pathname + search | push a history entry|

use std::fmt;
use std::sync::Arc;

use spike_routing::RouterResult;

use crate::window::BrowserWindow;

/// How routes are encoded in the browser location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
	/// Routes live in the fragment: `/#/person/7`.
	Hash,
	/// Routes live in the path: `/person/7`.
	History,
}

impl fmt::Display for AddressingMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Hash => f.write_str("hash"),
			Self::History => f.write_str("history"),
		}
	}
}

/// When a location change caused by a redirect must be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateOutcome {
	/// The caller must process the change now.
	Immediate,
	/// The browser reports the change later through an event.
	Deferred,
}

/// Mode specific view of the browser location.
pub trait LocationAdapter: Send + Sync {
	/// Returns the addressing mode.
	fn mode(&self) -> AddressingMode;

	/// Returns the underlying window.
	fn window(&self) -> &Arc<dyn BrowserWindow>;

	/// Returns the route string matched against the registry.
	fn current_route(&self) -> String;

	/// Returns the key compared with the prevent-reload guard.
	fn guard_key(&self) -> String;

	/// Returns the location recorded as the last path before a redirect.
	fn previous_location(&self) -> String;

	/// Moves the browser to `path`.
	fn navigate(&self, path: &str) -> RouterResult<NavigateOutcome>;

	/// Formats `path` as an href for links in this mode.
	fn link_href(&self, path: &str) -> String;

	/// Returns the full URL, query string included.
	fn href(&self) -> String {
		self.window().href()
	}
}

/// Fragment based addressing.
pub struct HashAdapter {
	window: Arc<dyn BrowserWindow>,
}

impl HashAdapter {
	/// Creates an adapter over `window`.
	pub fn new(window: Arc<dyn BrowserWindow>) -> Self {
		Self { window }
	}
}

impl LocationAdapter for HashAdapter {
	fn mode(&self) -> AddressingMode {
		AddressingMode::Hash
	}

	fn window(&self) -> &Arc<dyn BrowserWindow> {
		&self.window
	}

	fn current_route(&self) -> String {
		self.window.hash().replacen("#/", "", 1)
	}

	fn guard_key(&self) -> String {
		self.window.hash().replacen('#', "", 1)
	}

	fn previous_location(&self) -> String {
		self.window.hash().replacen("#/", "/", 1)
	}

	fn navigate(&self, path: &str) -> RouterResult<NavigateOutcome> {
		self.window.set_hash(path)?;
		Ok(NavigateOutcome::Deferred)
	}

	fn link_href(&self, path: &str) -> String {
		if path.starts_with('/') {
			format!("#{}", path)
		} else if path.starts_with('#') {
			path.to_string()
		} else {
			format!("#/{}", path)
		}
	}
}

/// History API addressing.
pub struct HistoryAdapter {
	window: Arc<dyn BrowserWindow>,
}

impl HistoryAdapter {
	/// Creates an adapter over `window`.
	pub fn new(window: Arc<dyn BrowserWindow>) -> Self {
		Self { window }
	}
}

impl LocationAdapter for HistoryAdapter {
	fn mode(&self) -> AddressingMode {
		AddressingMode::History
	}

	fn window(&self) -> &Arc<dyn BrowserWindow> {
		&self.window
	}

	fn current_route(&self) -> String {
		self.window.pathname()
	}

	fn guard_key(&self) -> String {
		format!("{}{}", self.window.pathname(), self.window.search())
	}

	fn previous_location(&self) -> String {
		self.window.pathname()
	}

	fn navigate(&self, path: &str) -> RouterResult<NavigateOutcome> {
		self.window.push_state(path)?;
		Ok(NavigateOutcome::Immediate)
	}

	fn link_href(&self, path: &str) -> String {
		path.to_string()
	}
}

/// Picks the addressing mode for `window`.
///
/// History addressing needs both browser support and `html5_mode`.
pub fn select_adapter(window: Arc<dyn BrowserWindow>, html5_mode: bool) -> Arc<dyn LocationAdapter> {
	let adapter: Arc<dyn LocationAdapter> = if html5_mode && window.supports_history() {
		Arc::new(HistoryAdapter::new(window))
	} else {
		Arc::new(HashAdapter::new(window))
	};
	tracing::info!(target: "spike::router", mode = %adapter.mode(), "addressing mode selected");
	adapter
}
