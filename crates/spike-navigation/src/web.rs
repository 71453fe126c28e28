//! Browser bindings.
//!
//! [`WebWindow`] drives the real `window.location` and `window.history`.
//! [`install`] wires browser events to a [`Navigator`]: `hashchange` or
//! `popstate` depending on the addressing mode, and a delegated click
//! handler on the document that intercepts anchors not marked `plain-href`.

use std::sync::Arc;

use spike_routing::{RouterError, RouterResult, append_query, params};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::location::AddressingMode;
use crate::navigator::Navigator;
use crate::window::BrowserWindow;

/// Attribute marking links the router leaves alone.
pub const PLAIN_HREF_ATTRIBUTE: &str = "plain-href";

fn browser_err(err: JsValue) -> RouterError {
	RouterError::Browser(format!("{:?}", err))
}

fn global_window() -> RouterResult<web_sys::Window> {
	web_sys::window().ok_or_else(|| RouterError::Browser("no global window".to_string()))
}

/// The browser's own window.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebWindow;

impl WebWindow {
	/// Creates a handle to the global window.
	pub fn new() -> Self {
		Self
	}

	fn location(&self) -> Option<web_sys::Location> {
		web_sys::window().map(|window| window.location())
	}
}

impl BrowserWindow for WebWindow {
	fn href(&self) -> String {
		self.location()
			.and_then(|location| location.href().ok())
			.unwrap_or_default()
	}

	fn pathname(&self) -> String {
		self.location()
			.and_then(|location| location.pathname().ok())
			.unwrap_or_else(|| "/".to_string())
	}

	fn search(&self) -> String {
		self.location()
			.and_then(|location| location.search().ok())
			.unwrap_or_default()
	}

	fn hash(&self) -> String {
		self.location()
			.and_then(|location| location.hash().ok())
			.unwrap_or_default()
	}

	fn supports_history(&self) -> bool {
		web_sys::window().is_some_and(|window| window.history().is_ok())
	}

	fn set_hash(&self, hash: &str) -> RouterResult<()> {
		global_window()?.location().set_hash(hash).map_err(browser_err)
	}

	fn push_state(&self, url: &str) -> RouterResult<()> {
		let history = global_window()?.history().map_err(browser_err)?;
		let state = JsValue::from_str(url);
		history
			.push_state_with_url(&state, "", Some(url))
			.map_err(browser_err)
	}

	fn go_back(&self) -> RouterResult<()> {
		global_window()?
			.history()
			.and_then(|history| history.back())
			.map_err(browser_err)
	}

	fn open(&self, url: &str, target: &str) -> RouterResult<()> {
		global_window()?
			.open_with_url_and_target(url, target)
			.map(|_| ())
			.map_err(browser_err)
	}

	fn assign(&self, url: &str) -> RouterResult<()> {
		global_window()?.location().assign(url).map_err(browser_err)
	}

	fn refresh_links(&self, prefix: &str, stamp: i64) -> RouterResult<()> {
		let document = global_window()?
			.document()
			.ok_or_else(|| RouterError::Browser("no document".to_string()))?;
		let selector = format!("a[href*=\"{}\"]", prefix.replace('"', "\\\""));
		let anchors = document.query_selector_all(&selector).map_err(browser_err)?;
		let buster = params([("t", stamp)]);

		for idx in 0..anchors.length() {
			let Some(anchor) = anchors
				.item(idx)
				.and_then(|node| node.dyn_into::<web_sys::Element>().ok())
			else {
				continue;
			};
			if let Some(href) = anchor.get_attribute("href") {
				anchor
					.set_attribute("href", &append_query(&href, &buster))
					.map_err(browser_err)?;
			}
		}
		Ok(())
	}
}

/// Installs browser event listeners driving `navigator`.
///
/// The listeners live for the lifetime of the page.
pub fn install(navigator: Arc<Navigator>) -> RouterResult<()> {
	let window = global_window()?;

	let event_name = match navigator.mode() {
		AddressingMode::Hash => "hashchange",
		AddressingMode::History => "popstate",
	};
	let on_change = Arc::clone(&navigator);
	let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
		if let Err(err) = on_change.on_location_change() {
			tracing::error!(target: "spike::router", error = %err, "navigation failed");
		}
	}) as Box<dyn FnMut(_)>);
	window
		.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())
		.map_err(browser_err)?;
	closure.forget();

	let document = window
		.document()
		.ok_or_else(|| RouterError::Browser("no document".to_string()))?;
	let on_click = Arc::clone(&navigator);
	let closure = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
		let Some(anchor) = event
			.target()
			.and_then(|target| target.dyn_into::<web_sys::Element>().ok())
			.and_then(|element| element.closest("a").ok().flatten())
		else {
			return;
		};
		if anchor.has_attribute(PLAIN_HREF_ATTRIBUTE) {
			return;
		}
		event.prevent_default();

		let href = anchor.get_attribute("href").unwrap_or_default();
		let target = anchor.get_attribute("target");
		if let Err(err) = on_click.handle_link_click(&href, target.as_deref(), false) {
			tracing::error!(target: "spike::router", error = %err, href, "link navigation failed");
		}
	}) as Box<dyn FnMut(_)>);
	document
		.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
		.map_err(browser_err)?;
	closure.forget();

	tracing::info!(target: "spike::router", event = event_name, "browser listeners installed");
	Ok(())
}
