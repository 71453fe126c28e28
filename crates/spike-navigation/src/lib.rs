//! Browser navigation for Spike applications.
//!
//! The [`Navigator`] maps the browser location to registered views and
//! renders them, once per location change. Two addressing modes exist:
//! fragment routes (`/#/person/7`) and History API routes (`/person/7`).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use spike_navigation::prelude::*;
//!
//! struct PersonView;
//!
//! impl View for PersonView {
//! 	fn render(&self, data: &ViewData) -> anyhow::Result<()> {
//! 		assert_eq!(data.path_params.get("id"), Some(&ParamValue::Int(42)));
//! 		Ok(())
//! 	}
//! }
//!
//! let settings = RouterSettings::default();
//! let mut routes = settings.registry();
//! routes.path("/person/:id", RouteConfig::new().controller("Person"))?;
//!
//! let window = Arc::new(MemoryWindow::new("http://app.test/#/person/42"));
//! let navigator = Navigator::builder(window)
//! 	.settings(settings)
//! 	.routes(routes)
//! 	.controller("Person", PersonView)
//! 	.build();
//!
//! navigator.start()?;
//! assert_eq!(navigator.current_controller(), "Person");
//! # Ok::<(), RouterError>(())
//! ```
//!
//! # Platforms
//!
//! Native builds drive a [`MemoryWindow`](window::MemoryWindow). On
//! `wasm32` the `web` module provides `WebWindow` and `install`, which hooks
//! `hashchange`, `popstate` and link clicks to the navigator.

#![warn(missing_docs)]

pub mod dispatcher;
pub mod links;
pub mod listeners;
pub mod location;
pub mod navigator;
pub mod resolver;
pub mod settings;
pub mod state;
pub mod window;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use dispatcher::{ArcView, RenderDispatcher, RenderOutcome, View};
pub use links::{LinkAction, LinkTarget, classify_link};
pub use listeners::{ListenerRegistry, RouteChangeEvent, RouteChangeListener};
pub use location::{
	AddressingMode, HashAdapter, HistoryAdapter, LocationAdapter, NavigateOutcome, select_adapter,
};
pub use navigator::{LastPathHook, LinkHook, Navigator, NavigatorBuilder, RedirectHook};
pub use resolver::{ViewData, ViewResolver, resolve_controller_for};
pub use settings::{CachePolicy, RouterSettings, SettingsError};
pub use state::{NavigationState, Phase};
pub use window::{BrowserWindow, MemoryWindow, OpenedUrl};

/// Re-export commonly used types.
pub mod prelude {
	pub use crate::dispatcher::{RenderOutcome, View};
	pub use crate::links::LinkAction;
	pub use crate::listeners::RouteChangeEvent;
	pub use crate::location::AddressingMode;
	pub use crate::navigator::Navigator;
	pub use crate::resolver::ViewData;
	pub use crate::settings::{CachePolicy, RouterSettings};
	pub use crate::window::{BrowserWindow, MemoryWindow};
	pub use spike_routing::prelude::*;
}
