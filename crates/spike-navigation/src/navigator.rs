//! The navigator ties location, resolution and rendering together.
//!
//! Every location change goes through one pipeline:
//!
//! 1. the prevent-reload guard is checked, a match suppresses the render
//! 2. the view data cache is cleared
//! 3. route-change listeners fire
//! 4. view data is resolved and dispatched to the views
//!
//! Only one pipeline runs at a time. A change reported mid-cycle is queued,
//! a later one replacing an earlier one, and replayed once the cycle ends.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use spike_routing::{
	ParamMap, RouteRegistry, RouterError, RouterResult, Warning, WarningHandler, append_query,
	emit, substitute_path_params,
};

use crate::dispatcher::{RenderDispatcher, RenderOutcome, View};
use crate::links::{LinkAction, LinkTarget, classify_link};
use crate::listeners::{ListenerRegistry, RouteChangeEvent};
use crate::location::{AddressingMode, LocationAdapter, NavigateOutcome, select_adapter};
use crate::resolver::{ViewData, ViewResolver};
use crate::settings::RouterSettings;
use crate::state::{NavigationState, Phase};
use crate::window::BrowserWindow;

/// Rewrites the final redirect URL. Receives the URL, the path and URL
/// parameters and the prevent-reload flag.
pub type RedirectHook = Arc<dyn Fn(&str, &ParamMap, &ParamMap, bool) -> String + Send + Sync>;

/// Rewrites the location recorded as the last path.
pub type LastPathHook = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Rewrites hrefs built by [`Navigator::create_link`].
pub type LinkHook = Arc<dyn Fn(&str, &ParamMap, &ParamMap) -> String + Send + Sync>;

#[derive(Clone, Default)]
struct Hooks {
	redirect: Option<RedirectHook>,
	last_path: Option<LastPathHook>,
	link: Option<LinkHook>,
}

/// Builder for [`Navigator`].
pub struct NavigatorBuilder {
	window: Arc<dyn BrowserWindow>,
	settings: RouterSettings,
	registry: RouteRegistry,
	dispatcher: RenderDispatcher,
	hooks: Hooks,
	warning_handler: Option<WarningHandler>,
}

impl NavigatorBuilder {
	fn new(window: Arc<dyn BrowserWindow>) -> Self {
		Self {
			window,
			settings: RouterSettings::default(),
			registry: RouteRegistry::new(),
			dispatcher: RenderDispatcher::new(),
			hooks: Hooks::default(),
			warning_handler: None,
		}
	}

	/// Sets the router settings.
	pub fn settings(mut self, settings: RouterSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Sets the route registry. Deferred names are resolved on build.
	pub fn routes(mut self, registry: RouteRegistry) -> Self {
		self.registry = registry;
		self
	}

	/// Registers a controller view.
	pub fn controller<V: View + 'static>(mut self, name: impl Into<String>, view: V) -> Self {
		self.dispatcher.register_controller(name, Arc::new(view));
		self
	}

	/// Registers a modal view.
	pub fn modal<V: View + 'static>(mut self, name: impl Into<String>, view: V) -> Self {
		self.dispatcher.register_modal(name, Arc::new(view));
		self
	}

	/// Installs a hook rewriting redirect URLs.
	pub fn redirect_hook<F>(mut self, hook: F) -> Self
	where
		F: Fn(&str, &ParamMap, &ParamMap, bool) -> String + Send + Sync + 'static,
	{
		self.hooks.redirect = Some(Arc::new(hook));
		self
	}

	/// Installs a hook rewriting the recorded last path.
	pub fn last_path_hook<F>(mut self, hook: F) -> Self
	where
		F: Fn(&str) -> String + Send + Sync + 'static,
	{
		self.hooks.last_path = Some(Arc::new(hook));
		self
	}

	/// Installs a hook rewriting created links.
	pub fn link_hook<F>(mut self, hook: F) -> Self
	where
		F: Fn(&str, &ParamMap, &ParamMap) -> String + Send + Sync + 'static,
	{
		self.hooks.link = Some(Arc::new(hook));
		self
	}

	/// Installs a receiver for warnings.
	pub fn warning_handler<F>(mut self, handler: F) -> Self
	where
		F: Fn(&Warning) + Send + Sync + 'static,
	{
		self.warning_handler = Some(Arc::new(handler));
		self
	}

	/// Builds the navigator. The addressing mode is fixed here.
	pub fn build(self) -> Navigator {
		let mut registry = self.registry;
		registry.resolve_names();
		let registry = Arc::new(registry);

		let adapter = select_adapter(self.window, self.settings.html5_mode);
		let resolver = ViewResolver::new(Arc::clone(&registry), self.settings.cache_policy);

		Navigator {
			settings: self.settings,
			registry,
			adapter,
			resolver,
			dispatcher: self.dispatcher,
			listeners: ListenerRegistry::new(),
			state: Mutex::new(NavigationState::new()),
			hooks: self.hooks,
			warning_handler: self.warning_handler,
		}
	}
}

enum Admission {
	Queued,
	Suppressed,
	Proceed,
}

/// Single-page application navigator.
pub struct Navigator {
	settings: RouterSettings,
	registry: Arc<RouteRegistry>,
	adapter: Arc<dyn LocationAdapter>,
	resolver: ViewResolver,
	dispatcher: RenderDispatcher,
	listeners: ListenerRegistry,
	state: Mutex<NavigationState>,
	hooks: Hooks,
	warning_handler: Option<WarningHandler>,
}

impl fmt::Debug for Navigator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Navigator")
			.field("mode", &self.adapter.mode())
			.field("registry", &self.registry)
			.field("dispatcher", &self.dispatcher)
			.field("listeners", &self.listeners)
			.field("state", &*self.state.lock())
			.finish()
	}
}

impl Navigator {
	/// Starts building a navigator over `window`.
	pub fn builder(window: Arc<dyn BrowserWindow>) -> NavigatorBuilder {
		NavigatorBuilder::new(window)
	}

	/// Renders the initial view.
	///
	/// Does nothing when routing is disabled. In hash mode a location whose
	/// fragment does not start with `#/` is moved to `#/` first.
	///
	/// # Errors
	///
	/// [`RouterError::RoutingMisconfigured`] if routing is enabled but no
	/// route is registered, or any error of the first render.
	pub fn start(&self) -> RouterResult<()> {
		if !self.settings.routing_enabled {
			tracing::info!(target: "spike::router", "routing disabled");
			return Ok(());
		}
		if self.registry.is_empty() {
			return Err(RouterError::RoutingMisconfigured);
		}

		tracing::info!(target: "spike::router", mode = %self.adapter.mode(), "router started");

		let window = self.adapter.window();
		if self.adapter.mode() == AddressingMode::Hash && !window.hash().starts_with("#/") {
			window.set_hash("#/")?;
		}

		if !self.state.lock().begin() {
			return Ok(());
		}
		self.render_cycle()
	}

	/// Processes a browser reported location change.
	///
	/// Called for `hashchange` in hash mode and `popstate` in history mode,
	/// and internally after every history mode redirect.
	pub fn on_location_change(&self) -> RouterResult<()> {
		let route = self.adapter.current_route();
		let key = self.adapter.guard_key();

		let admission = {
			let mut state = self.state.lock();
			if state.is_busy() {
				state.queue(route.clone());
				Admission::Queued
			} else if state.take_guard(&key) {
				Admission::Suppressed
			} else {
				state.begin();
				Admission::Proceed
			}
		};

		match admission {
			Admission::Queued => {
				self.warn(Warning::NavigationQueued(route));
				Ok(())
			}
			Admission::Suppressed => {
				tracing::debug!(target: "spike::router", route, "render suppressed by prevent-reload guard");
				self.fire_listeners(true, &route);
				Ok(())
			}
			Admission::Proceed => {
				self.resolver.clear();
				self.fire_listeners(false, &route);
				self.render_cycle()
			}
		}
	}

	fn render_cycle(&self) -> RouterResult<()> {
		let previous = self.state.lock().previous_controller().map(str::to_string);
		let data = self.resolver.resolve(&*self.adapter, previous.as_deref());

		self.state.lock().rendering();
		let result = self
			.dispatcher
			.dispatch(&data, previous.as_deref(), &**self.adapter.window());

		let queued = {
			let mut state = self.state.lock();
			if matches!(&result, Ok(outcome) if *outcome != RenderOutcome::Unmatched) {
				state.record_render(data.controller_name.clone());
			}
			state.finish()
		};

		match result? {
			RenderOutcome::Unmatched => self.warn(Warning::NoRouteMatched(data.route.clone())),
			outcome => tracing::debug!(target: "spike::router", ?outcome, "render cycle complete"),
		}

		if let Some(route) = queued {
			tracing::debug!(target: "spike::router", route, "replaying queued navigation");
			return self.on_location_change();
		}
		Ok(())
	}

	fn fire_listeners(&self, suppressed: bool, route: &str) {
		let controller = self.state.lock().current_controller().map(str::to_string);
		let event = RouteChangeEvent {
			mode: self.adapter.mode(),
			suppressed,
		};
		self.listeners.fire(&event, route, controller.as_deref());
	}

	fn warn(&self, warning: Warning) {
		emit(self.warning_handler.as_ref(), warning);
	}

	/// Navigates to `path`.
	///
	/// `:name` placeholders are filled from `path_params`, longest name
	/// first. Placeholders without a value are dropped from the path with a
	/// warning. `url_params` become the query string. With `prevent_reload`
	/// the location changes without rendering, and a redirect to the current
	/// location does nothing.
	///
	/// # Errors
	///
	/// [`RouterError::RedirectNoPath`] if `path` is empty, or any error of
	/// the render when history addressing renders immediately.
	pub fn redirect(
		&self,
		path: &str,
		path_params: &ParamMap,
		url_params: &ParamMap,
		prevent_reload: bool,
	) -> RouterResult<()> {
		self.resolver.clear();

		if path.is_empty() {
			return Err(RouterError::RedirectNoPath);
		}

		let mut path = path.replacen("#/", "/", 1);
		if !path.starts_with('/') {
			path.insert(0, '/');
		}

		let (path, warnings) = substitute_path_params(&path, path_params);
		for warning in warnings {
			self.warn(warning);
		}
		let mut path = append_query(&path, url_params);

		if let Some(hook) = &self.hooks.redirect {
			path = hook(&path, path_params, url_params, prevent_reload);
		}

		let left = self.adapter.previous_location();
		let left = match &self.hooks.last_path {
			Some(hook) => hook(&left),
			None => left,
		};

		// The guard only holds for a change the browser will report.
		let target = with_leading_slash(&path);
		let unchanged = prevent_reload && self.adapter.guard_key() == target;
		{
			let mut state = self.state.lock();
			if prevent_reload && !unchanged {
				state.arm_guard(target);
			}
			state.set_last_path(left);
		}

		if unchanged {
			tracing::debug!(target: "spike::router", path, "location unchanged, nothing to update");
			return Ok(());
		}

		tracing::debug!(target: "spike::router", path, prevent_reload, "redirecting");
		match self.adapter.navigate(&path)? {
			NavigateOutcome::Immediate => self.on_location_change(),
			NavigateOutcome::Deferred => Ok(()),
		}
	}

	/// Navigates to the route named `name`.
	pub fn redirect_by_name(
		&self,
		name: &str,
		path_params: &ParamMap,
		url_params: &ParamMap,
		prevent_reload: bool,
	) -> RouterResult<()> {
		let path = self.registry.by_name(name)?.to_string();
		self.redirect(&path, path_params, url_params, prevent_reload)
	}

	/// Navigates to the shortest route rendering `controller`, if any.
	pub fn redirect_controller(&self, controller: &str) -> RouterResult<()> {
		let Some(endpoint) = self.registry.find_closest_for_controller(controller) else {
			return Ok(());
		};
		let path = endpoint.raw_pattern().to_string();
		self.redirect(&path, &ParamMap::new(), &ParamMap::new(), false)
	}

	/// Updates path parameters of the current route without rendering.
	///
	/// Only parameters the current route already binds are changed.
	pub fn set_path_params(&self, params: &ParamMap) -> RouterResult<()> {
		let data = self.view_data();
		let Some(target) = redirect_target(&data) else {
			self.warn(Warning::NoRouteMatched(data.route));
			return Ok(());
		};

		let mut merged = data.path_params.clone();
		for (name, value) in params {
			if let Some(slot) = merged.get_mut(name) {
				*slot = value.clone();
			}
		}
		self.redirect(&target, &merged, &data.url_params, true)
	}

	/// Replaces the query string of the current route without rendering.
	pub fn set_url_params(&self, params: &ParamMap) -> RouterResult<()> {
		let data = self.view_data();
		let Some(target) = redirect_target(&data) else {
			self.warn(Warning::NoRouteMatched(data.route));
			return Ok(());
		};
		self.redirect(&target, &data.path_params, params, true)
	}

	/// Renders the current location again.
	pub fn reload_view(&self) -> RouterResult<()> {
		let began = {
			let mut state = self.state.lock();
			let began = state.begin();
			if !began {
				state.queue(self.adapter.current_route());
			}
			began
		};
		if !began {
			self.warn(Warning::NavigationQueued(self.adapter.current_route()));
			return Ok(());
		}
		self.render_cycle()
	}

	/// Goes one entry back in history.
	pub fn back(&self) -> RouterResult<()> {
		self.adapter.window().go_back()
	}

	/// Leaves the application for `url`.
	///
	/// With a target the URL opens in the normalized browsing context,
	/// otherwise the current one navigates.
	pub fn location(&self, url: &str, target: Option<&str>) -> RouterResult<()> {
		self.resolver.clear();
		let window = self.adapter.window();
		match target.filter(|target| !target.is_empty()) {
			Some(target) => window.open(url, LinkTarget::normalize(target).as_str()),
			None => window.assign(url),
		}
	}

	/// Builds an href for `path` in the active addressing mode.
	pub fn create_link(&self, path: &str, path_params: &ParamMap, url_params: &ParamMap) -> String {
		let href = self.adapter.link_href(path);
		let (href, warnings) = substitute_path_params(&href, path_params);
		for warning in warnings {
			self.warn(warning);
		}
		let href = append_query(&href, url_params);

		match &self.hooks.link {
			Some(hook) => hook(&href, path_params, url_params),
			None => href,
		}
	}

	/// Handles a click on a link and reports what was done.
	pub fn handle_link_click(
		&self,
		href: &str,
		target: Option<&str>,
		plain: bool,
	) -> RouterResult<LinkAction> {
		let action = classify_link(href, target, plain, self.adapter.mode());
		match &action {
			LinkAction::Ignore => {}
			LinkAction::Open { url, target } => self.location(url, Some(target.as_str()))?,
			LinkAction::Redirect(path) => {
				self.redirect(path, &ParamMap::new(), &ParamMap::new(), false)?
			}
		}
		Ok(action)
	}

	/// Registers a route-change listener under `name`, replacing any
	/// listener with the same name.
	pub fn on_route_change<F>(&self, name: impl Into<String>, listener: F)
	where
		F: Fn(&RouteChangeEvent, &str, Option<&str>) + Send + Sync + 'static,
	{
		let name = name.into();
		if self.listeners.insert(name.clone(), Arc::new(listener)) {
			self.warn(Warning::ListenerReplaced(name));
		}
	}

	/// Removes the route-change listener named `name`.
	pub fn off_route_change(&self, name: &str) -> bool {
		self.listeners.remove(name)
	}

	/// Returns the view data for the current location.
	pub fn view_data(&self) -> ViewData {
		let previous = self.state.lock().previous_controller().map(str::to_string);
		self.resolver.resolve(&*self.adapter, previous.as_deref())
	}

	/// Returns the route string of the current location.
	pub fn current_route(&self) -> String {
		self.adapter.current_route()
	}

	/// Returns the current path parameters.
	pub fn path_params(&self) -> ParamMap {
		self.view_data().path_params
	}

	/// Returns the current URL parameters.
	pub fn url_params(&self) -> ParamMap {
		self.view_data().url_params
	}

	/// Returns the current endpoint's routing parameters.
	pub fn routing_params(&self) -> Value {
		self.view_data().routing_params
	}

	/// Returns the controller for the current location, falling back to the
	/// last rendered controller and then to the main controller.
	pub fn current_controller(&self) -> String {
		if let Some(controller) = self.view_data().controller_name {
			return controller;
		}
		self.state
			.lock()
			.current_controller()
			.map(str::to_string)
			.unwrap_or_else(|| self.settings.main_controller.clone())
	}

	/// Returns the location left by the last redirect.
	pub fn last_path(&self) -> Option<String> {
		self.state.lock().last_path().map(str::to_string)
	}

	/// Returns the addressing mode.
	pub fn mode(&self) -> AddressingMode {
		self.adapter.mode()
	}

	/// Returns the pipeline phase.
	pub fn phase(&self) -> Phase {
		self.state.lock().phase()
	}

	/// Returns the settings.
	pub fn settings(&self) -> &RouterSettings {
		&self.settings
	}

	/// Returns the route registry.
	pub fn registry(&self) -> &RouteRegistry {
		&self.registry
	}

	/// Returns the browser window.
	pub fn window(&self) -> &Arc<dyn BrowserWindow> {
		self.adapter.window()
	}
}

/// Path a parameter update redirects to.
///
/// The otherwise route has no pattern of its own, so the current route's
/// path is reused.
fn redirect_target(data: &ViewData) -> Option<String> {
	let endpoint = data.endpoint.as_ref()?;
	if endpoint.is_otherwise() {
		let path = data.route.split('?').next().unwrap_or_default();
		return Some(path.to_string());
	}
	Some(endpoint.raw_pattern().to_string())
}

fn with_leading_slash(path: &str) -> String {
	if path.starts_with('/') {
		path.to_string()
	} else {
		format!("/{}", path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::window::MemoryWindow;
	use rstest::rstest;
	use spike_routing::{ParamValue, RouteConfig, params};

	struct Blank;

	impl View for Blank {
		fn render(&self, _data: &ViewData) -> anyhow::Result<()> {
			Ok(())
		}
	}

	fn navigator(url: &str, settings: RouterSettings) -> (Arc<MemoryWindow>, Navigator) {
		let window = Arc::new(MemoryWindow::new(url));
		let mut registry = settings.registry();
		registry
			.path("/", RouteConfig::new().controller("Home"))
			.unwrap()
			.path("/person/:id", RouteConfig::new().controller("Person").name("person"))
			.unwrap();
		let navigator = Navigator::builder(window.clone())
			.settings(settings)
			.routes(registry)
			.controller("Home", Blank)
			.controller("Person", Blank)
			.build();
		(window, navigator)
	}

	#[rstest]
	fn test_start_normalizes_hash() {
		let (window, navigator) = navigator("http://app.test/", RouterSettings::default());

		navigator.start().unwrap();

		assert_eq!(window.hash(), "#/");
		assert_eq!(navigator.current_controller(), "Home");
	}

	#[rstest]
	fn test_start_without_routes() {
		let window = Arc::new(MemoryWindow::default());
		let navigator = Navigator::builder(window).build();

		assert_eq!(navigator.start().unwrap_err(), RouterError::RoutingMisconfigured);
	}

	#[rstest]
	fn test_start_with_routing_disabled() {
		let window = Arc::new(MemoryWindow::default());
		let navigator = Navigator::builder(window.clone())
			.settings(RouterSettings::new().with_routing_enabled(false))
			.build();

		navigator.start().unwrap();
		assert_eq!(window.hash(), "");
	}

	#[rstest]
	fn test_redirect_rejects_empty_path() {
		let (_, navigator) = navigator("http://app.test/#/", RouterSettings::default());
		let err = navigator
			.redirect("", &ParamMap::new(), &ParamMap::new(), false)
			.unwrap_err();
		assert_eq!(err, RouterError::RedirectNoPath);
	}

	#[rstest]
	#[case("#/person/:id", "#/person/3")]
	#[case("person/:id", "#/person/3")]
	fn test_redirect_normalizes_path(#[case] path: &str, #[case] expected: &str) {
		let (window, navigator) = navigator("http://app.test/#/", RouterSettings::default());

		navigator
			.redirect(path, &params([("id", 3)]), &ParamMap::new(), false)
			.unwrap();

		assert_eq!(window.hash(), expected);
	}

	#[rstest]
	fn test_last_path_hook() {
		let window = Arc::new(MemoryWindow::new("http://app.test/#/person/1"));
		let mut registry = RouteRegistry::new();
		registry.path("/person/:id", RouteConfig::new().controller("Person")).unwrap();
		let navigator = Navigator::builder(window)
			.routes(registry)
			.controller("Person", Blank)
			.last_path_hook(|path| format!("app:{}", path))
			.build();

		navigator
			.redirect("/person/2", &ParamMap::new(), &ParamMap::new(), false)
			.unwrap();

		assert_eq!(navigator.last_path().as_deref(), Some("app:/person/1"));
	}

	#[rstest]
	fn test_create_link_per_mode() {
		let (_, hash) = navigator("http://app.test/#/", RouterSettings::default());
		let (_, history) = navigator(
			"http://app.test/",
			RouterSettings::new().with_html5_mode(true),
		);
		let path_params = params([("id", ParamValue::from(5))]);
		let url_params = params([("tab", "info")]);

		assert_eq!(
			hash.create_link("/person/:id", &path_params, &url_params),
			"#/person/5?tab=info"
		);
		assert_eq!(
			history.create_link("/person/:id", &path_params, &url_params),
			"/person/5?tab=info"
		);
	}

	#[rstest]
	fn test_redirect_target_for_otherwise() {
		let mut registry = RouteRegistry::new();
		registry.other(RouteConfig::new().controller("NotFound")).unwrap();
		let data = ViewData {
			endpoint: registry.otherwise().cloned(),
			route: "missing/page?x=1".into(),
			..ViewData::default()
		};

		assert_eq!(redirect_target(&data).as_deref(), Some("missing/page"));
	}
}
