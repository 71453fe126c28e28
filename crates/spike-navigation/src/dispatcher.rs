//! Render dispatch.
//!
//! Views are looked up by name in two catalogs, controllers and modals. A
//! dispatch renders one of three shapes:
//!
//! - a controller alone, for ordinary endpoints
//! - the default controller followed by the modal, when a modal endpoint is
//!   the first thing rendered
//! - the modal alone over whatever controller is already on screen

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use spike_routing::{Endpoint, RouterError, RouterResult, static_prefix};

use crate::resolver::ViewData;
use crate::window::BrowserWindow;

/// A renderable controller or modal.
pub trait View: Send + Sync {
	/// Renders the view for `data`.
	fn render(&self, data: &ViewData) -> anyhow::Result<()>;

	/// Discards rendered state. Called on modals after a controller render.
	fn invalidate(&self) {}
}

/// Shared view handle.
pub type ArcView = Arc<dyn View>;

/// What a dispatch rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
	/// A controller rendered alone.
	Controller(String),
	/// The default controller rendered, then the modal over it.
	ControllerThenModal {
		/// Controller name.
		controller: String,
		/// Modal name.
		modal: String,
	},
	/// The modal rendered over the current controller.
	Modal(String),
	/// Nothing matched the location.
	Unmatched,
}

/// Controller and modal catalogs.
#[derive(Default, Clone)]
pub struct RenderDispatcher {
	controllers: IndexMap<String, ArcView>,
	modals: IndexMap<String, ArcView>,
}

impl fmt::Debug for RenderDispatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RenderDispatcher")
			.field("controllers", &self.controllers.keys().collect::<Vec<_>>())
			.field("modals", &self.modals.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl RenderDispatcher {
	/// Creates empty catalogs.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a controller view.
	pub fn register_controller(&mut self, name: impl Into<String>, view: ArcView) {
		self.controllers.insert(name.into(), view);
	}

	/// Adds a modal view.
	pub fn register_modal(&mut self, name: impl Into<String>, view: ArcView) {
		self.modals.insert(name.into(), view);
	}

	/// Looks up a controller view.
	pub fn controller(&self, name: &str) -> Option<&ArcView> {
		self.controllers.get(name)
	}

	/// Looks up a modal view.
	pub fn modal(&self, name: &str) -> Option<&ArcView> {
		self.modals.get(name)
	}

	/// Renders `data`.
	///
	/// `previous` is the controller already on screen. Every referenced view
	/// is looked up before anything renders, so a missing view fails the
	/// dispatch without partial output.
	///
	/// # Errors
	///
	/// - [`RouterError::ModuleNotFound`] if a referenced view is missing.
	/// - [`RouterError::RenderFailed`] if a view fails; nothing after the
	///   failing view runs.
	pub fn dispatch(
		&self,
		data: &ViewData,
		previous: Option<&str>,
		window: &dyn BrowserWindow,
	) -> RouterResult<RenderOutcome> {
		let Some(endpoint) = data.endpoint.as_ref() else {
			return Ok(RenderOutcome::Unmatched);
		};

		if !data.is_modal {
			let (name, view) = self.lookup_controller(data, endpoint)?;
			self.render_controller(&name, view, data)?;
			run_on_route(endpoint);
			return Ok(RenderOutcome::Controller(name));
		}

		let modal_name = data.modal_name.clone().unwrap_or_default();
		let modal = self
			.modals
			.get(&modal_name)
			.ok_or_else(|| RouterError::ModuleNotFound(modal_name.clone()))?;

		let has_host = previous.is_some_and(|previous| !previous.is_empty());
		if !has_host {
			let (controller_name, view) = self.lookup_controller(data, endpoint)?;
			self.render_controller(&controller_name, view, data)?;
			render_view(&modal_name, modal, data)?;
			run_on_route(endpoint);
			return Ok(RenderOutcome::ControllerThenModal {
				controller: controller_name,
				modal: modal_name,
			});
		}

		render_view(&modal_name, modal, data)?;
		let stamp = chrono::Utc::now().timestamp_millis();
		window.refresh_links(static_prefix(endpoint.raw_pattern()), stamp)?;
		run_on_route(endpoint);
		Ok(RenderOutcome::Modal(modal_name))
	}

	fn lookup_controller(
		&self,
		data: &ViewData,
		endpoint: &Endpoint,
	) -> RouterResult<(String, &ArcView)> {
		let name = data
			.controller_name
			.clone()
			.unwrap_or_else(|| endpoint.raw_pattern().to_string());
		let view = self
			.controllers
			.get(&name)
			.ok_or_else(|| RouterError::ModuleNotFound(name.clone()))?;
		Ok((name, view))
	}

	fn render_controller(&self, name: &str, view: &ArcView, data: &ViewData) -> RouterResult<()> {
		render_view(name, view, data)?;
		for modal in self.modals.values() {
			modal.invalidate();
		}
		tracing::info!(target: "spike::router", controller = name, "controller rendered");
		Ok(())
	}
}

fn render_view(name: &str, view: &ArcView, data: &ViewData) -> RouterResult<()> {
	view.render(data).map_err(|err| RouterError::RenderFailed {
		view: name.to_string(),
		message: err.to_string(),
	})
}

fn run_on_route(endpoint: &Endpoint) {
	if let Some(callback) = endpoint.on_route() {
		callback();
	}
}
