//! Route registration and path matching for Spike applications.
//!
//! This crate holds the browser independent half of the router:
//!
//! - **Patterns**: route strings such as `/person/:id` compiled into literal
//!   and placeholder tokens
//! - **Registry**: endpoints kept in registration order, with duplicate
//!   detection and named routes
//! - **Parameters**: numeric-coerced path and query values and the helpers
//!   that build URLs from them
//!
//! # Example
//!
//! ```
//! use spike_routing::prelude::*;
//!
//! let mut registry = RouteRegistry::new();
//! registry
//! 	.path("/person/:id", RouteConfig::new().controller("Person"))?
//! 	.path("/person/:id/edit", RouteConfig::new().modal("PersonEdit").default_controller("Person"))?;
//!
//! let probe = PathPattern::probe("/person/42");
//! let endpoint = registry.match_probe(&probe).expect("route should match");
//! let params = endpoint.pattern().extract(&probe);
//!
//! assert_eq!(params.get("id"), Some(&ParamValue::Int(42)));
//! # Ok::<(), RouterError>(())
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod pattern;
pub mod query;
pub mod registry;
pub mod value;
pub mod warning;

pub use error::{RouterError, RouterResult};
pub use pattern::{PathPattern, Token, static_prefix};
pub use query::{append_query, parse_query, substitute_path_params};
pub use registry::{
	Endpoint, NameFn, OTHERWISE_PATH, PathHook, RouteCallback, RouteConfig, RouteName,
	RouteRegistry,
};
pub use value::{ParamMap, ParamValue, params};
pub use warning::{Warning, WarningHandler, emit};

/// Re-export commonly used types.
pub mod prelude {
	pub use crate::error::{RouterError, RouterResult};
	pub use crate::pattern::PathPattern;
	pub use crate::registry::{Endpoint, RouteConfig, RouteName, RouteRegistry};
	pub use crate::value::{ParamMap, ParamValue, params};
	pub use crate::warning::{Warning, WarningHandler};
}
