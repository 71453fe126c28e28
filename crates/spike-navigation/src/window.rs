//! Browser window abstraction.
//!
//! The router never touches `window.location` or `window.history` directly.
//! It goes through [`BrowserWindow`], implemented by [`MemoryWindow`] on
//! native targets and by `WebWindow` in the browser.

use parking_lot::Mutex;
use spike_routing::{ParamValue, RouterResult, append_query, params};

/// Location and history operations the router needs from the browser.
pub trait BrowserWindow: Send + Sync {
	/// Returns the full URL.
	fn href(&self) -> String;

	/// Returns the path, starting with `/`.
	fn pathname(&self) -> String;

	/// Returns the query string including its `?`, or an empty string.
	fn search(&self) -> String;

	/// Returns the fragment including its `#`, or an empty string.
	fn hash(&self) -> String;

	/// Returns whether the History API is available.
	fn supports_history(&self) -> bool;

	/// Replaces the fragment. A leading `#` in `hash` is optional.
	fn set_hash(&self, hash: &str) -> RouterResult<()>;

	/// Pushes a new history entry for `url`.
	fn push_state(&self, url: &str) -> RouterResult<()>;

	/// Moves one entry back in history.
	fn go_back(&self) -> RouterResult<()>;

	/// Opens `url` in the browsing context named `target`.
	fn open(&self, url: &str, target: &str) -> RouterResult<()>;

	/// Navigates the current browsing context to `url`.
	fn assign(&self, url: &str) -> RouterResult<()>;

	/// Appends a `t=<stamp>` cache buster to every hyperlink whose href
	/// contains `prefix`.
	fn refresh_links(&self, prefix: &str, stamp: i64) -> RouterResult<()>;
}

/// A URL opened through [`BrowserWindow::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedUrl {
	/// The opened URL.
	pub url: String,
	/// The browsing context name.
	pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
	pathname: String,
	search: String,
	hash: String,
}

impl Entry {
	/// Splits a relative URL into its parts.
	fn parse(relative: &str) -> Self {
		let (rest, hash) = match relative.find('#') {
			Some(idx) => (&relative[..idx], relative[idx..].to_string()),
			None => (relative, String::new()),
		};
		let (path, search) = match rest.find('?') {
			Some(idx) => (&rest[..idx], rest[idx..].to_string()),
			None => (rest, String::new()),
		};
		let pathname = if path.starts_with('/') {
			path.to_string()
		} else {
			format!("/{}", path)
		};

		Self {
			pathname,
			search,
			hash,
		}
	}
}

#[derive(Debug)]
struct MemoryInner {
	origin: String,
	entries: Vec<Entry>,
	index: usize,
	opened: Vec<OpenedUrl>,
	links: Vec<String>,
}

impl MemoryInner {
	fn current(&self) -> &Entry {
		&self.entries[self.index]
	}

	fn push(&mut self, entry: Entry) {
		self.entries.truncate(self.index + 1);
		self.entries.push(entry);
		self.index = self.entries.len() - 1;
	}
}

/// In-memory browser window with a history stack.
///
/// Used on native targets and in tests. Nothing fires events on its own:
/// whoever drives the window tells the navigator when the location changed.
#[derive(Debug)]
pub struct MemoryWindow {
	inner: Mutex<MemoryInner>,
	supports_history: bool,
}

impl MemoryWindow {
	/// Creates a window showing `url`, with History API support.
	///
	/// ```
	/// use spike_navigation::window::{BrowserWindow, MemoryWindow};
	///
	/// let window = MemoryWindow::new("http://app.test/person/7?tab=info#top");
	/// assert_eq!(window.pathname(), "/person/7");
	/// assert_eq!(window.search(), "?tab=info");
	/// assert_eq!(window.hash(), "#top");
	/// ```
	pub fn new(url: &str) -> Self {
		let (origin, relative) = split_origin(url);
		Self {
			inner: Mutex::new(MemoryInner {
				origin: origin.to_string(),
				entries: vec![Entry::parse(relative)],
				index: 0,
				opened: Vec::new(),
				links: Vec::new(),
			}),
			supports_history: true,
		}
	}

	/// Sets whether the window reports History API support.
	pub fn with_history_support(mut self, supported: bool) -> Self {
		self.supports_history = supported;
		self
	}

	/// Navigates to `url` as if the user typed it, adding a history entry.
	pub fn visit(&self, url: &str) {
		let (origin, relative) = split_origin(url);
		let mut inner = self.inner.lock();
		if !origin.is_empty() {
			inner.origin = origin.to_string();
		}
		inner.push(Entry::parse(relative));
	}

	/// Adds a hyperlink to the simulated document.
	pub fn add_link(&self, href: impl Into<String>) {
		self.inner.lock().links.push(href.into());
	}

	/// Returns the hyperlinks of the simulated document.
	pub fn links(&self) -> Vec<String> {
		self.inner.lock().links.clone()
	}

	/// Returns the URLs opened through [`BrowserWindow::open`].
	pub fn opened(&self) -> Vec<OpenedUrl> {
		self.inner.lock().opened.clone()
	}

	/// Returns the number of history entries.
	pub fn history_len(&self) -> usize {
		self.inner.lock().entries.len()
	}
}

impl Default for MemoryWindow {
	fn default() -> Self {
		Self::new("http://localhost/")
	}
}

impl BrowserWindow for MemoryWindow {
	fn href(&self) -> String {
		let inner = self.inner.lock();
		let entry = inner.current();
		format!(
			"{}{}{}{}",
			inner.origin, entry.pathname, entry.search, entry.hash
		)
	}

	fn pathname(&self) -> String {
		self.inner.lock().current().pathname.clone()
	}

	fn search(&self) -> String {
		self.inner.lock().current().search.clone()
	}

	fn hash(&self) -> String {
		self.inner.lock().current().hash.clone()
	}

	fn supports_history(&self) -> bool {
		self.supports_history
	}

	fn set_hash(&self, hash: &str) -> RouterResult<()> {
		let fragment = hash.strip_prefix('#').unwrap_or(hash);
		let mut inner = self.inner.lock();
		let mut entry = inner.current().clone();
		entry.hash = format!("#{}", fragment);
		if entry != *inner.current() {
			inner.push(entry);
		}
		Ok(())
	}

	fn push_state(&self, url: &str) -> RouterResult<()> {
		self.inner.lock().push(Entry::parse(url));
		Ok(())
	}

	fn go_back(&self) -> RouterResult<()> {
		let mut inner = self.inner.lock();
		inner.index = inner.index.saturating_sub(1);
		Ok(())
	}

	fn open(&self, url: &str, target: &str) -> RouterResult<()> {
		self.inner.lock().opened.push(OpenedUrl {
			url: url.to_string(),
			target: target.to_string(),
		});
		Ok(())
	}

	fn assign(&self, url: &str) -> RouterResult<()> {
		self.visit(url);
		Ok(())
	}

	fn refresh_links(&self, prefix: &str, stamp: i64) -> RouterResult<()> {
		let buster = params([("t", ParamValue::Int(stamp))]);
		let mut inner = self.inner.lock();
		for link in inner.links.iter_mut().filter(|link| link.contains(prefix)) {
			*link = append_query(link, &buster);
		}
		Ok(())
	}
}

/// Splits `scheme://host` off an absolute URL.
fn split_origin(url: &str) -> (&str, &str) {
	let Some(scheme_end) = url.find("://") else {
		return ("", url);
	};
	let host_start = scheme_end + 3;
	match url[host_start..].find(['/', '?', '#']) {
		Some(offset) => url.split_at(host_start + offset),
		None => (url, "/"),
	}
}
