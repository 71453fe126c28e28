//! Error types for route registration and navigation.
//!
//! Every error is raised synchronously at the point of violation and is fatal
//! to the call that produced it. Registration errors abort application
//! startup, navigation errors abort the current render cycle.

use thiserror::Error;

/// Result type for routing operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Routing and navigation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RouterError {
	/// A route was registered with an empty pattern.
	#[error("path URI cannot be empty")]
	InvalidPathDefinition,

	/// The raw pattern is already registered.
	#[error("path {0} is already defined")]
	DuplicatePath(String),

	/// The compiled pattern collides with an already registered one.
	#[error("path {path} is already defined. Pattern {pattern} is duplicated")]
	DuplicatePattern {
		/// Raw pattern that was rejected.
		path: String,
		/// Human readable form of the colliding token pattern.
		pattern: String,
	},

	/// The route name is already used under the same path.
	#[error("route name {0} already exists, must be unique")]
	DuplicateRouteName(String),

	/// No endpoint carries the requested route name.
	#[error("route name {0} does not exist")]
	RouteNameNotFound(String),

	/// The registry no longer accepts registrations.
	#[error("route registry is sealed, cannot register {0}")]
	RegistrySealed(String),

	/// `redirect` was called without a path.
	#[error("tried to redirect but the path argument is empty")]
	RedirectNoPath,

	/// A controller or modal reference does not resolve to a registered view.
	#[error("tried rendering a module that does not exist: {0}")]
	ModuleNotFound(String),

	/// Routing is enabled but no endpoints were registered.
	#[error("routing is enabled but no routes are defined")]
	RoutingMisconfigured,

	/// An external view failed while rendering.
	#[error("view {view} failed to render: {message}")]
	RenderFailed {
		/// Name of the view that failed.
		view: String,
		/// Error reported by the view.
		message: String,
	},

	/// The browser rejected a location or history operation.
	#[error("browser operation failed: {0}")]
	Browser(String),
}
