//! Non-fatal warning channel.
//!
//! Warnings report recoverable anomalies. Navigation always continues after
//! a warning is emitted.

use std::fmt;
use std::sync::Arc;

/// A recoverable routing anomaly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Warning {
	/// A `:name` placeholder had no value and its segment was stripped.
	UnresolvedPathParam {
		/// Placeholder name without the colon.
		name: String,
		/// Path after the segment was removed.
		path: String,
	},
	/// A route-change listener was registered over an existing name.
	ListenerReplaced(String),
	/// The current location matched no endpoint and no otherwise route exists.
	NoRouteMatched(String),
	/// A location change arrived mid-cycle and was queued.
	NavigationQueued(String),
}

impl fmt::Display for Warning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UnresolvedPathParam { name, path } => {
				write!(f, "path param {} is undefined, stripped from {}", name, path)
			}
			Self::ListenerReplaced(name) => {
				write!(f, "route event {} is already registered", name)
			}
			Self::NoRouteMatched(route) => write!(f, "no route matches {}", route),
			Self::NavigationQueued(route) => {
				write!(f, "navigation to {} queued until the current render finishes", route)
			}
		}
	}
}

/// Application supplied receiver for warnings.
pub type WarningHandler = Arc<dyn Fn(&Warning) + Send + Sync>;

/// Logs a warning and forwards it to the handler, if any.
pub fn emit(handler: Option<&WarningHandler>, warning: Warning) {
	tracing::warn!(target: "spike::router", "{}", warning);
	if let Some(handler) = handler {
		handler(&warning);
	}
}
