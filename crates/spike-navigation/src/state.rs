//! Navigation state machine.

/// Stage of the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
	/// No navigation in progress.
	#[default]
	Idle,
	/// Listeners are firing or view data is being computed.
	Resolving,
	/// Views are rendering.
	Rendering,
}

/// Mutable navigation state shared by the pipeline.
#[derive(Debug, Default)]
pub struct NavigationState {
	phase: Phase,
	queued: Option<String>,
	prevent_reload_target: Option<String>,
	last_path: Option<String>,
	current_controller: Option<String>,
	previous_controller: Option<String>,
}

impl NavigationState {
	/// Creates idle state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the current phase.
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Returns whether a cycle is running.
	pub fn is_busy(&self) -> bool {
		self.phase != Phase::Idle
	}

	/// Starts a cycle. Returns `false` if one is already running.
	pub fn begin(&mut self) -> bool {
		if self.is_busy() {
			return false;
		}
		self.phase = Phase::Resolving;
		true
	}

	/// Moves a running cycle to the render stage.
	pub fn rendering(&mut self) {
		self.phase = Phase::Rendering;
	}

	/// Ends the running cycle and hands back the queued change, if any.
	pub fn finish(&mut self) -> Option<String> {
		self.phase = Phase::Idle;
		self.queued.take()
	}

	/// Queues a change that arrived mid-cycle. A later change replaces an
	/// earlier one.
	pub fn queue(&mut self, route: String) {
		self.queued = Some(route);
	}

	/// Returns the queued change.
	pub fn queued(&self) -> Option<&str> {
		self.queued.as_deref()
	}

	/// Arms the one-shot prevent-reload guard.
	pub fn arm_guard(&mut self, target: String) {
		self.prevent_reload_target = Some(target);
	}

	/// Returns the armed guard target.
	pub fn guard(&self) -> Option<&str> {
		self.prevent_reload_target.as_deref()
	}

	/// Disarms the guard if it matches `key`, reporting whether it did.
	pub fn take_guard(&mut self, key: &str) -> bool {
		if self.prevent_reload_target.as_deref() == Some(key) {
			self.prevent_reload_target = None;
			return true;
		}
		false
	}

	/// Records the location left by a redirect.
	pub fn set_last_path(&mut self, path: String) {
		self.last_path = Some(path);
	}

	/// Returns the location left by the last redirect.
	pub fn last_path(&self) -> Option<&str> {
		self.last_path.as_deref()
	}

	/// Records a completed render of `controller`.
	pub fn record_render(&mut self, controller: Option<String>) {
		if let Some(controller) = controller {
			self.current_controller = Some(controller.clone());
			self.previous_controller = Some(controller);
		}
	}

	/// Returns the controller most recently rendered.
	pub fn current_controller(&self) -> Option<&str> {
		self.current_controller.as_deref()
	}

	/// Returns the controller a modal renders over.
	pub fn previous_controller(&self) -> Option<&str> {
		self.previous_controller.as_deref()
	}
}
