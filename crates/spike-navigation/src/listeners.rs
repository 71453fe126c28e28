//! Named route-change listeners.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::location::AddressingMode;

/// Details of a location change passed to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChangeEvent {
	/// Addressing mode that reported the change.
	pub mode: AddressingMode,
	/// Whether the prevent-reload guard suppressed the render.
	pub suppressed: bool,
}

/// Listener called with the event, the current route and the controller on
/// screen.
pub type RouteChangeListener = Arc<dyn Fn(&RouteChangeEvent, &str, Option<&str>) + Send + Sync>;

/// Listeners keyed by name, fired in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
	listeners: RwLock<IndexMap<String, RouteChangeListener>>,
}

impl fmt::Debug for ListenerRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ListenerRegistry")
			.field("names", &self.listeners.read().keys().cloned().collect::<Vec<_>>())
			.finish()
	}
}

impl ListenerRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `listener` under `name`. Returns `true` if it replaced an
	/// existing listener.
	pub fn insert(&self, name: impl Into<String>, listener: RouteChangeListener) -> bool {
		self.listeners.write().insert(name.into(), listener).is_some()
	}

	/// Removes the listener named `name`, reporting whether one existed.
	pub fn remove(&self, name: &str) -> bool {
		self.listeners.write().shift_remove(name).is_some()
	}

	/// Returns whether a listener named `name` exists.
	pub fn contains(&self, name: &str) -> bool {
		self.listeners.read().contains_key(name)
	}

	/// Returns the number of listeners.
	pub fn len(&self) -> usize {
		self.listeners.read().len()
	}

	/// Returns whether no listener is registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Calls every listener.
	///
	/// Listeners run on a snapshot, so they may register or remove listeners.
	pub fn fire(&self, event: &RouteChangeEvent, route: &str, controller: Option<&str>) {
		let snapshot: Vec<RouteChangeListener> = self.listeners.read().values().cloned().collect();
		for listener in snapshot {
			listener(event, route, controller);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use parking_lot::Mutex;
	use rstest::rstest;

	fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> RouteChangeListener {
		let log = Arc::clone(log);
		Arc::new(move |event: &RouteChangeEvent, route: &str, controller: Option<&str>| {
			log.lock().push(format!(
				"{} {} {} {}",
				tag,
				route,
				controller.unwrap_or("-"),
				event.suppressed
			));
		})
	}

	#[rstest]
	fn test_fire_in_registration_order() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let listeners = ListenerRegistry::new();
		listeners.insert("b", recorder(&log, "b"));
		listeners.insert("a", recorder(&log, "a"));

		let event = RouteChangeEvent {
			mode: AddressingMode::Hash,
			suppressed: false,
		};
		listeners.fire(&event, "persons", Some("Home"));

		assert_eq!(*log.lock(), vec!["b persons Home false", "a persons Home false"]);
	}

	#[rstest]
	fn test_replace_and_remove() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let listeners = ListenerRegistry::new();

		assert!(!listeners.insert("menu", recorder(&log, "old")));
		assert!(listeners.insert("menu", recorder(&log, "new")));
		assert_eq!(listeners.len(), 1);

		let event = RouteChangeEvent {
			mode: AddressingMode::History,
			suppressed: true,
		};
		listeners.fire(&event, "/", None);
		assert_eq!(*log.lock(), vec!["new / - true"]);

		assert!(listeners.remove("menu"));
		assert!(!listeners.remove("menu"));
		assert!(listeners.is_empty());
	}

	#[rstest]
	fn test_listener_may_remove_itself() {
		let listeners = Arc::new(ListenerRegistry::new());
		let handle = Arc::clone(&listeners);
		listeners.insert(
			"once",
			Arc::new(move |_: &RouteChangeEvent, _: &str, _: Option<&str>| {
				handle.remove("once");
			}),
		);

		let event = RouteChangeEvent {
			mode: AddressingMode::Hash,
			suppressed: false,
		};
		listeners.fire(&event, "", None);

		assert!(!listeners.contains("once"));
	}
}
