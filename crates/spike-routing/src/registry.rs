//! Endpoint registry.
//!
//! Endpoints are stored in registration order, which is also the order in
//! which locations are matched: the first endpoint whose pattern fits wins.
//! Register specific literal routes before general placeholder routes.
//!
//! # Example
//!
//! ```
//! use spike_routing::{RouteConfig, RouteRegistry};
//!
//! let mut registry = RouteRegistry::new();
//! registry
//! 	.path("/", RouteConfig::new().controller("Home"))?
//! 	.path("/person/:id", RouteConfig::new().controller("Person").name("person"))?
//! 	.other(RouteConfig::new().controller("NotFound"))?;
//! registry.resolve_names();
//!
//! assert_eq!(registry.by_name("person")?, "/person/:id");
//! # Ok::<(), spike_routing::RouterError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{RouterError, RouterResult};
use crate::pattern::PathPattern;

/// Raw pattern under which the otherwise route is registered.
pub const OTHERWISE_PATH: &str = "!";

/// Callback run after an endpoint's view has been rendered.
pub type RouteCallback = Arc<dyn Fn() + Send + Sync>;

/// Derives a route name once all endpoints are registered.
pub type NameFn = Arc<dyn Fn(&RouteRegistry) -> String + Send + Sync>;

/// Rewrites a raw pattern before it is registered.
pub type PathHook = Arc<dyn Fn(&str, &RouteConfig) -> String + Send + Sync>;

/// Name of a route, either known up front or derived after registration.
#[derive(Clone)]
pub enum RouteName {
	/// A fixed name.
	Literal(String),
	/// A name computed by [`RouteRegistry::resolve_names`].
	Deferred(NameFn),
}

impl RouteName {
	/// Returns the name if it is already known.
	pub fn as_literal(&self) -> Option<&str> {
		match self {
			Self::Literal(name) => Some(name),
			Self::Deferred(_) => None,
		}
	}
}

impl fmt::Debug for RouteName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal(name) => f.debug_tuple("Literal").field(name).finish(),
			Self::Deferred(_) => f.write_str("Deferred(..)"),
		}
	}
}

/// Route definition passed to [`RouteRegistry::path`] and [`RouteRegistry::other`].
#[derive(Clone, Default)]
pub struct RouteConfig {
	controller: Option<String>,
	modal: Option<String>,
	default_controller: Option<String>,
	routing_params: Value,
	on_route: Option<RouteCallback>,
	name: Option<RouteName>,
}

impl RouteConfig {
	/// Creates an empty route definition.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the controller rendered for this route.
	pub fn controller(mut self, name: impl Into<String>) -> Self {
		self.controller = Some(name.into());
		self
	}

	/// Makes this a modal route rendering `name` over a controller.
	pub fn modal(mut self, name: impl Into<String>) -> Self {
		self.modal = Some(name.into());
		self
	}

	/// Sets the controller rendered under the modal when no controller has
	/// been rendered yet.
	pub fn default_controller(mut self, name: impl Into<String>) -> Self {
		self.default_controller = Some(name.into());
		self
	}

	/// Sets opaque parameters passed through to the view.
	pub fn routing_params(mut self, params: Value) -> Self {
		self.routing_params = params;
		self
	}

	/// Sets the callback run after the route's view has rendered.
	pub fn on_route<F>(mut self, callback: F) -> Self
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.on_route = Some(Arc::new(callback));
		self
	}

	/// Names the route.
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(RouteName::Literal(name.into()));
		self
	}

	/// Names the route with a function evaluated after all routes are
	/// registered. The function may look up other endpoints.
	pub fn name_with<F>(mut self, name_fn: F) -> Self
	where
		F: Fn(&RouteRegistry) -> String + Send + Sync + 'static,
	{
		self.name = Some(RouteName::Deferred(Arc::new(name_fn)));
		self
	}
}

impl fmt::Debug for RouteConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteConfig")
			.field("controller", &self.controller)
			.field("modal", &self.modal)
			.field("default_controller", &self.default_controller)
			.field("name", &self.name)
			.field("has_on_route", &self.on_route.is_some())
			.finish()
	}
}

/// A registered endpoint.
#[derive(Clone)]
pub struct Endpoint {
	raw: String,
	pattern: PathPattern,
	controller: Option<String>,
	modal: Option<String>,
	default_controller: Option<String>,
	routing_params: Value,
	on_route: Option<RouteCallback>,
	name: Option<RouteName>,
}

impl Endpoint {
	fn new(raw: String, config: RouteConfig) -> Self {
		Self {
			pattern: PathPattern::compile(&raw),
			raw,
			controller: config.controller,
			modal: config.modal,
			default_controller: config.default_controller,
			routing_params: config.routing_params,
			on_route: config.on_route,
			name: config.name,
		}
	}

	/// Returns the pattern text the endpoint was registered under.
	pub fn raw_pattern(&self) -> &str {
		&self.raw
	}

	/// Returns the compiled pattern.
	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	/// Returns the registered controller.
	pub fn controller(&self) -> Option<&str> {
		self.controller.as_deref()
	}

	/// Returns the modal rendered by this endpoint.
	pub fn modal(&self) -> Option<&str> {
		self.modal.as_deref()
	}

	/// Returns the controller used under the modal on a first navigation.
	pub fn default_controller(&self) -> Option<&str> {
		self.default_controller.as_deref()
	}

	/// Returns the opaque routing parameters.
	pub fn routing_params(&self) -> &Value {
		&self.routing_params
	}

	/// Returns the post-render callback.
	pub fn on_route(&self) -> Option<&RouteCallback> {
		self.on_route.as_ref()
	}

	/// Returns the route name once it is known.
	pub fn route_name(&self) -> Option<&str> {
		self.name.as_ref().and_then(RouteName::as_literal)
	}

	/// Returns whether this endpoint renders a modal.
	pub fn is_modal(&self) -> bool {
		self.modal.as_deref().is_some_and(|modal| !modal.is_empty())
	}

	/// Returns whether this is the otherwise route.
	pub fn is_otherwise(&self) -> bool {
		self.raw == OTHERWISE_PATH
	}
}

impl fmt::Debug for Endpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Endpoint")
			.field("raw", &self.raw)
			.field("pattern", &self.pattern.to_string())
			.field("controller", &self.controller)
			.field("modal", &self.modal)
			.field("default_controller", &self.default_controller)
			.field("name", &self.name)
			.finish()
	}
}

/// Registry of endpoints in registration order.
#[derive(Clone, Default)]
pub struct RouteRegistry {
	endpoints: Vec<Endpoint>,
	otherwise: Option<Endpoint>,
	check_names_unique: bool,
	path_hook: Option<PathHook>,
	sealed: bool,
}

impl fmt::Debug for RouteRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteRegistry")
			.field("endpoints_count", &self.endpoints.len())
			.field("has_otherwise", &self.otherwise.is_some())
			.field("sealed", &self.sealed)
			.finish()
	}
}

impl RouteRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Enables rejection of a route name repeated under the same path.
	pub fn with_name_uniqueness(mut self, enabled: bool) -> Self {
		self.check_names_unique = enabled;
		self
	}

	/// Installs a hook that rewrites raw patterns before registration.
	pub fn with_path_hook<F>(mut self, hook: F) -> Self
	where
		F: Fn(&str, &RouteConfig) -> String + Send + Sync + 'static,
	{
		self.path_hook = Some(Arc::new(hook));
		self
	}

	/// Registers an endpoint for `pattern`.
	///
	/// # Errors
	///
	/// - [`RouterError::InvalidPathDefinition`] if `pattern` is empty.
	/// - [`RouterError::DuplicateRouteName`] if name checking is enabled and
	///   the endpoint under the same path already has this name.
	/// - [`RouterError::DuplicatePath`] if `pattern` is already registered.
	/// - [`RouterError::DuplicatePattern`] if another endpoint compiles to the
	///   same tokens.
	/// - [`RouterError::RegistrySealed`] after [`Self::resolve_names`].
	pub fn path(&mut self, pattern: &str, config: RouteConfig) -> RouterResult<&mut Self> {
		self.register(pattern, config)?;
		Ok(self)
	}

	/// Registers the otherwise route, matched when nothing else matches.
	pub fn other(&mut self, config: RouteConfig) -> RouterResult<&mut Self> {
		self.register(OTHERWISE_PATH, config)?;
		Ok(self)
	}

	fn register(&mut self, pattern: &str, config: RouteConfig) -> RouterResult<()> {
		if self.sealed {
			return Err(RouterError::RegistrySealed(pattern.to_string()));
		}
		if pattern.is_empty() {
			return Err(RouterError::InvalidPathDefinition);
		}

		let raw = match &self.path_hook {
			Some(hook) => hook(pattern, &config),
			None => pattern.to_string(),
		};

		if raw == OTHERWISE_PATH {
			if self.otherwise.is_some() {
				return Err(RouterError::DuplicatePath(raw));
			}
			tracing::debug!(target: "spike::router", "registering otherwise route");
			self.otherwise = Some(Endpoint::new(raw, config));
			return Ok(());
		}

		if self.check_names_unique {
			if let Some(name) = config.name.as_ref().and_then(RouteName::as_literal) {
				let taken = self
					.endpoints
					.iter()
					.any(|endpoint| endpoint.raw == raw && endpoint.route_name() == Some(name));
				if taken {
					return Err(RouterError::DuplicateRouteName(name.to_string()));
				}
			}
		}

		if self.get(&raw).is_some() {
			return Err(RouterError::DuplicatePath(raw));
		}

		let endpoint = Endpoint::new(raw, config);
		if self
			.endpoints
			.iter()
			.any(|existing| existing.pattern.same_shape(&endpoint.pattern))
		{
			return Err(RouterError::DuplicatePattern {
				pattern: endpoint.pattern.to_string(),
				path: endpoint.raw,
			});
		}

		tracing::debug!(target: "spike::router", path = %endpoint.raw, "registering route");
		self.endpoints.push(endpoint);
		Ok(())
	}

	/// Evaluates deferred route names and seals the registry.
	///
	/// Runs once; later calls do nothing. Registration fails afterwards.
	pub fn resolve_names(&mut self) {
		if self.sealed {
			return;
		}

		let resolved: Vec<(usize, String)> = self
			.endpoints
			.iter()
			.chain(self.otherwise.iter())
			.enumerate()
			.filter_map(|(idx, endpoint)| match &endpoint.name {
				Some(RouteName::Deferred(name_fn)) => Some((idx, name_fn(self))),
				_ => None,
			})
			.collect();

		for (idx, name) in resolved {
			let endpoint = if idx < self.endpoints.len() {
				self.endpoints.get_mut(idx)
			} else {
				self.otherwise.as_mut()
			};
			if let Some(endpoint) = endpoint {
				endpoint.name = Some(RouteName::Literal(name));
			}
		}

		self.sealed = true;
	}

	/// Returns whether [`Self::resolve_names`] has run.
	pub fn is_sealed(&self) -> bool {
		self.sealed
	}

	/// Returns the raw pattern of the endpoint named `name`.
	pub fn by_name(&self, name: &str) -> RouterResult<&str> {
		self.endpoints
			.iter()
			.chain(self.otherwise.iter())
			.find(|endpoint| endpoint.route_name() == Some(name))
			.map(Endpoint::raw_pattern)
			.ok_or_else(|| RouterError::RouteNameNotFound(name.to_string()))
	}

	/// Returns the endpoint with the shortest pattern rendering `controller`.
	///
	/// Ties go to the endpoint registered first.
	pub fn find_closest_for_controller(&self, controller: &str) -> Option<&Endpoint> {
		self.endpoints
			.iter()
			.chain(self.otherwise.iter())
			.filter(|endpoint| endpoint.controller() == Some(controller))
			.min_by_key(|endpoint| endpoint.pattern.len())
	}

	/// Returns the first endpoint, in registration order, matching `probe`.
	pub fn match_probe(&self, probe: &PathPattern) -> Option<&Endpoint> {
		self.endpoints
			.iter()
			.find(|endpoint| endpoint.pattern.matches(probe))
	}

	/// Returns the endpoint registered under `raw`.
	pub fn get(&self, raw: &str) -> Option<&Endpoint> {
		if raw == OTHERWISE_PATH {
			return self.otherwise.as_ref();
		}
		self.endpoints.iter().find(|endpoint| endpoint.raw == raw)
	}

	/// Returns the otherwise route.
	pub fn otherwise(&self) -> Option<&Endpoint> {
		self.otherwise.as_ref()
	}

	/// Iterates over endpoints in registration order, excluding the
	/// otherwise route.
	pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
		self.endpoints.iter()
	}

	/// Returns the number of registered endpoints, including the otherwise
	/// route.
	pub fn len(&self) -> usize {
		self.endpoints.len() + usize::from(self.otherwise.is_some())
	}

	/// Returns whether nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
