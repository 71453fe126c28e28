//! # Spike Router
//!
//! Client-side navigation for single-page applications.
//!
//! Spike maps the browser location to registered views. Routes are declared
//! up front in a [`RouteRegistry`](routing::RouteRegistry); the
//! [`Navigator`](navigation::Navigator) then resolves every location change
//! to a controller or modal view and renders it exactly once.
//!
//! ## Crates
//!
//! - [`routing`] - path patterns, typed parameters and the route registry
//! - [`navigation`] - location adapters, view resolution, render dispatch
//!   and the navigator itself
//!
//! ## Quick Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use spike_router::prelude::*;
//!
//! struct Persons;
//!
//! impl View for Persons {
//! 	fn render(&self, _data: &ViewData) -> anyhow::Result<()> {
//! 		Ok(())
//! 	}
//! }
//!
//! struct ConfirmDelete;
//!
//! impl View for ConfirmDelete {
//! 	fn render(&self, data: &ViewData) -> anyhow::Result<()> {
//! 		assert_eq!(data.path_params.get("id"), Some(&ParamValue::Int(3)));
//! 		Ok(())
//! 	}
//! }
//!
//! let mut routes = RouteRegistry::new();
//! routes
//! 	.path("/persons", RouteConfig::new().controller("Persons"))?
//! 	.path(
//! 		"/person/:id/delete",
//! 		RouteConfig::new()
//! 			.modal("ConfirmDelete")
//! 			.default_controller("Persons"),
//! 	)?;
//!
//! let window = Arc::new(MemoryWindow::new("http://app.test/#/persons"));
//! let navigator = Navigator::builder(window)
//! 	.routes(routes)
//! 	.controller("Persons", Persons)
//! 	.modal("ConfirmDelete", ConfirmDelete)
//! 	.build();
//!
//! navigator.start()?;
//! navigator.redirect("/person/:id/delete", &params([("id", 3)]), &ParamMap::new(), false)?;
//! navigator.on_location_change()?;
//! assert_eq!(navigator.current_controller(), "Persons");
//! # Ok::<(), RouterError>(())
//! ```

pub use spike_navigation as navigation;
pub use spike_routing as routing;

pub use spike_navigation::{
	AddressingMode, BrowserWindow, CachePolicy, LinkAction, MemoryWindow, Navigator,
	NavigatorBuilder, RenderOutcome, RouterSettings, View, ViewData,
};
pub use spike_routing::{
	ParamMap, ParamValue, PathPattern, RouteConfig, RouteRegistry, RouterError, RouterResult,
	Warning,
};

#[cfg(target_arch = "wasm32")]
pub use spike_navigation::web::{WebWindow, install};

/// Re-export commonly used types.
pub mod prelude {
	pub use spike_navigation::prelude::*;

	#[cfg(target_arch = "wasm32")]
	pub use spike_navigation::web::{WebWindow, install};
}
