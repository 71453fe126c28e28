//! Resolves the current location into [`ViewData`].

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use spike_routing::{Endpoint, ParamMap, PathPattern, RouteRegistry, parse_query};

use crate::location::LocationAdapter;
use crate::settings::CachePolicy;

/// Everything a view needs to render the current location.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewData {
	/// Matched endpoint, `None` when nothing matched.
	#[serde(skip)]
	pub endpoint: Option<Endpoint>,
	/// Parameters bound by placeholders.
	pub path_params: ParamMap,
	/// Parameters from the query string.
	pub url_params: ParamMap,
	/// Controller to render.
	pub controller_name: Option<String>,
	/// Modal to render over the controller.
	pub modal_name: Option<String>,
	/// Controller used under the modal on a first navigation.
	pub default_controller_name: Option<String>,
	/// Whether the endpoint renders a modal.
	pub is_modal: bool,
	/// Opaque endpoint parameters.
	pub routing_params: Value,
	/// Route string the data was computed for.
	pub route: String,
}

impl ViewData {
	fn for_endpoint(
		endpoint: &Endpoint,
		path_params: ParamMap,
		url_params: ParamMap,
		previous: Option<&str>,
		route: String,
	) -> Self {
		Self {
			controller_name: resolve_controller_for(endpoint, previous),
			modal_name: endpoint.modal().map(str::to_string),
			default_controller_name: endpoint.default_controller().map(str::to_string),
			is_modal: endpoint.is_modal(),
			routing_params: endpoint.routing_params().clone(),
			endpoint: Some(endpoint.clone()),
			path_params,
			url_params,
			route,
		}
	}

	/// Returns whether a route matched.
	pub fn is_matched(&self) -> bool {
		self.endpoint.is_some()
	}
}

/// Picks the controller rendered for `endpoint`.
///
/// A modal renders over `previous` when a controller has already rendered,
/// over its default controller otherwise.
pub fn resolve_controller_for(endpoint: &Endpoint, previous: Option<&str>) -> Option<String> {
	if !endpoint.is_modal() {
		return endpoint.controller().map(str::to_string);
	}
	match previous {
		Some(previous) if !previous.is_empty() => Some(previous.to_string()),
		_ => endpoint.default_controller().map(str::to_string),
	}
}

#[derive(Debug)]
struct CachedView {
	route: String,
	data: ViewData,
}

/// Matches locations against the registry, keeping one cached result.
#[derive(Debug)]
pub struct ViewResolver {
	registry: Arc<RouteRegistry>,
	policy: CachePolicy,
	cache: Mutex<Option<CachedView>>,
}

impl ViewResolver {
	/// Creates a resolver over `registry`.
	pub fn new(registry: Arc<RouteRegistry>, policy: CachePolicy) -> Self {
		Self {
			registry,
			policy,
			cache: Mutex::new(None),
		}
	}

	/// Returns the registry.
	pub fn registry(&self) -> &RouteRegistry {
		&self.registry
	}

	/// Returns the cache policy.
	pub fn policy(&self) -> CachePolicy {
		self.policy
	}

	/// Resolves the current location, answering from the cache when the
	/// policy allows it.
	pub fn resolve(&self, adapter: &dyn LocationAdapter, previous: Option<&str>) -> ViewData {
		let route = adapter.current_route();

		if let Some(cached) = self.cache.lock().as_ref() {
			if self.policy.is_hit(&cached.route, &route) {
				tracing::debug!(target: "spike::router", route = %cached.route, "using cached view data");
				return cached.data.clone();
			}
		}

		let data = self.compute(&route, &adapter.href(), previous);
		*self.cache.lock() = Some(CachedView {
			route,
			data: data.clone(),
		});
		data
	}

	/// Drops the cached entry.
	pub fn clear(&self) {
		*self.cache.lock() = None;
	}

	/// Returns the cached entry.
	pub fn cached(&self) -> Option<ViewData> {
		self.cache.lock().as_ref().map(|cached| cached.data.clone())
	}

	fn compute(&self, route: &str, href: &str, previous: Option<&str>) -> ViewData {
		let probe = PathPattern::probe(route);
		let url_params = parse_query(href);

		if let Some(endpoint) = self.registry.match_probe(&probe) {
			let path_params = endpoint.pattern().extract(&probe);
			tracing::debug!(target: "spike::router", route, endpoint = endpoint.raw_pattern(), "route matched");
			return ViewData::for_endpoint(endpoint, path_params, url_params, previous, route.to_string());
		}

		if let Some(otherwise) = self.registry.otherwise() {
			tracing::debug!(target: "spike::router", route, "falling back to otherwise route");
			return ViewData::for_endpoint(
				otherwise,
				ParamMap::new(),
				ParamMap::new(),
				previous,
				route.to_string(),
			);
		}

		ViewData {
			url_params,
			route: route.to_string(),
			..ViewData::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::location::HashAdapter;
	use crate::window::MemoryWindow;
	use rstest::{fixture, rstest};
	use spike_routing::{ParamValue, RouteConfig};

	#[fixture]
	fn registry() -> Arc<RouteRegistry> {
		let mut registry = RouteRegistry::new();
		registry
			.path("/person/:id", RouteConfig::new().controller("Person"))
			.unwrap()
			.path(
				"/person/:id/delete",
				RouteConfig::new().modal("ConfirmDelete").default_controller("Persons"),
			)
			.unwrap();
		Arc::new(registry)
	}

	fn adapter(url: &str) -> (Arc<MemoryWindow>, HashAdapter) {
		let window = Arc::new(MemoryWindow::new(url));
		let adapter = HashAdapter::new(window.clone());
		(window, adapter)
	}

	#[rstest]
	fn test_resolve_extracts_params(registry: Arc<RouteRegistry>) {
		let resolver = ViewResolver::new(registry, CachePolicy::SameRoute);
		let (_, adapter) = adapter("http://app.test/#/person/42?sort=asc");

		let data = resolver.resolve(&adapter, None);

		assert_eq!(data.controller_name.as_deref(), Some("Person"));
		assert_eq!(data.path_params.get("id"), Some(&ParamValue::Int(42)));
		assert_eq!(data.url_params.get("sort"), Some(&ParamValue::Text("asc".into())));
		assert_eq!(data.route, "person/42?sort=asc");
	}

	#[rstest]
	#[case(None, "Persons")]
	#[case(Some(""), "Persons")]
	#[case(Some("Person"), "Person")]
	fn test_modal_controller(
		registry: Arc<RouteRegistry>,
		#[case] previous: Option<&str>,
		#[case] expected: &str,
	) {
		let endpoint = registry.get("/person/:id/delete").unwrap();
		assert_eq!(resolve_controller_for(endpoint, previous).as_deref(), Some(expected));
		assert_eq!(endpoint.controller(), None);
	}

	#[rstest]
	fn test_unmatched_without_otherwise(registry: Arc<RouteRegistry>) {
		let resolver = ViewResolver::new(registry, CachePolicy::SameRoute);
		let (_, adapter) = adapter("http://app.test/#/nowhere?x=1");

		let data = resolver.resolve(&adapter, None);

		assert!(!data.is_matched());
		assert_eq!(data.url_params.get("x"), Some(&ParamValue::Int(1)));
	}

	#[rstest]
	fn test_otherwise_gets_empty_params() {
		let mut registry = RouteRegistry::new();
		registry.other(RouteConfig::new().controller("NotFound")).unwrap();
		let resolver = ViewResolver::new(Arc::new(registry), CachePolicy::SameRoute);
		let (_, adapter) = adapter("http://app.test/#/nowhere?x=1");

		let data = resolver.resolve(&adapter, None);

		assert_eq!(data.controller_name.as_deref(), Some("NotFound"));
		assert!(data.url_params.is_empty());
	}

	#[rstest]
	fn test_legacy_cache_answers_only_for_other_routes(registry: Arc<RouteRegistry>) {
		let resolver = ViewResolver::new(registry, CachePolicy::Legacy);
		let (window, adapter) = adapter("http://app.test/#/person/1");

		let first = resolver.resolve(&adapter, None);
		window.visit("http://app.test/#/person/2");
		let stale = resolver.resolve(&adapter, None);

		assert_eq!(stale.path_params, first.path_params);

		resolver.clear();
		let fresh = resolver.resolve(&adapter, None);
		assert_eq!(fresh.path_params.get("id"), Some(&ParamValue::Int(2)));

		// Same route recomputes under the legacy policy.
		let again = resolver.resolve(&adapter, Some("Person"));
		assert_eq!(again.route, "person/2");
	}

	#[rstest]
	fn test_same_route_cache(registry: Arc<RouteRegistry>) {
		let resolver = ViewResolver::new(registry, CachePolicy::SameRoute);
		let (window, adapter) = adapter("http://app.test/#/person/1");

		resolver.resolve(&adapter, None);
		assert!(resolver.cached().is_some());

		window.visit("http://app.test/#/person/2");
		let data = resolver.resolve(&adapter, None);
		assert_eq!(data.path_params.get("id"), Some(&ParamValue::Int(2)));
	}
}
