//! Native history capability.
//!
//! [`NativeHistory`] is the narrow surface of the browser History API the
//! router needs. [`MemoryNativeHistory`] implements it in memory, with the
//! asynchronous `popstate` delivery of a real browser made explicit through
//! [`MemoryNativeHistory::flush`].

use crate::error::NativeHistoryError;
use crate::subscription::Subscription;
use miniapp_router_core::NavigationState;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Payload of a native `popstate` event.
///
/// `state` is `None` for entries that were never written by the router,
/// such as the floor entry the application was loaded on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopStateEvent {
	/// State stored with the entry that became current.
	pub state: Option<NavigationState>,
}

/// Callback receiving native `popstate` events.
pub type PopStateHandler = Box<dyn Fn(&PopStateEvent)>;

/// Access to the platform history.
///
/// URLs passed to writes are encoded router URLs (`/view/panel...`); an
/// implementation decides how they map onto the real address bar.
pub trait NativeHistory {
	/// Pushes an entry, discarding forward entries.
	fn push_entry(&self, url: &str, state: &NavigationState) -> Result<(), NativeHistoryError>;

	/// Replaces the current entry.
	fn replace_entry(&self, url: &str, state: &NavigationState) -> Result<(), NativeHistoryError>;

	/// Goes back one entry.
	fn back(&self) -> Result<(), NativeHistoryError>;

	/// Moves by `delta` entries.
	fn go(&self, delta: isize) -> Result<(), NativeHistoryError>;

	/// Reads the fragment of the current URL, including the `#` marker.
	fn location_hash(&self) -> Result<String, NativeHistoryError>;

	/// Registers a `popstate` handler until the returned subscription is released.
	fn on_pop_state(&self, handler: PopStateHandler) -> Result<Subscription, NativeHistoryError>;
}

/// A call recorded by [`MemoryNativeHistory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
	/// `push_entry`, with the URL as written and the state index.
	Push {
		/// Written URL.
		url: String,
		/// Index of the written state.
		index: usize,
	},
	/// `replace_entry`, with the URL as written and the state index.
	Replace {
		/// Written URL.
		url: String,
		/// Index of the written state.
		index: usize,
	},
	/// `back`.
	Back,
	/// `go(delta)`.
	Go(isize),
}

struct NativeEntry {
	hash: String,
	state: Option<NavigationState>,
}

type SharedHandler = Rc<dyn Fn(&PopStateEvent)>;

struct NativeStack {
	entries: Vec<NativeEntry>,
	cursor: usize,
	calls: Vec<NativeCall>,
	handlers: Vec<(u64, SharedHandler)>,
	next_handler_id: u64,
	pending: VecDeque<PopStateEvent>,
	failing: bool,
}

impl NativeStack {
	fn check(&self) -> Result<(), NativeHistoryError> {
		if self.failing {
			return Err(NativeHistoryError::Unavailable(
				"memory native history is failing".to_string(),
			));
		}
		Ok(())
	}

	/// Moves the cursor like a browser traversal and returns the event a
	/// browser would fire, if the cursor moved.
	fn traverse(&mut self, delta: isize) -> Option<PopStateEvent> {
		let target = self
			.cursor
			.checked_add_signed(delta)
			.filter(|target| *target < self.entries.len())?;
		if target == self.cursor {
			return None;
		}
		self.cursor = target;
		Some(PopStateEvent {
			state: self.entries[target].state.clone(),
		})
	}
}

/// In-memory [`NativeHistory`] mimicking a browser tab.
///
/// - entries store the URL as `#` + router URL, like the browser adapter
/// - `back` and `go` queue the `popstate` event instead of firing it;
///   [`flush`](Self::flush) delivers queued events
/// - [`pop`](Self::pop) simulates the user pressing back / forward
/// - traversals past either end are ignored, as browsers do
#[derive(Clone)]
pub struct MemoryNativeHistory {
	inner: Rc<RefCell<NativeStack>>,
}

impl MemoryNativeHistory {
	/// Creates a history whose single entry has the given hash and no state.
	pub fn new(hash: impl Into<String>) -> Self {
		Self {
			inner: Rc::new(RefCell::new(NativeStack {
				entries: vec![NativeEntry {
					hash: hash.into(),
					state: None,
				}],
				cursor: 0,
				calls: Vec::new(),
				handlers: Vec::new(),
				next_handler_id: 0,
				pending: VecDeque::new(),
				failing: false,
			})),
		}
	}

	/// Calls made so far, oldest first.
	pub fn calls(&self) -> Vec<NativeCall> {
		self.inner.borrow().calls.clone()
	}

	/// Forgets recorded calls.
	pub fn clear_calls(&self) {
		self.inner.borrow_mut().calls.clear();
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.inner.borrow().entries.len()
	}

	/// Always `false`: the history holds at least one entry.
	pub fn is_empty(&self) -> bool {
		self.inner.borrow().entries.is_empty()
	}

	/// Position of the current entry.
	pub fn index(&self) -> usize {
		self.inner.borrow().cursor
	}

	/// State stored with the current entry.
	pub fn current_state(&self) -> Option<NavigationState> {
		let stack = self.inner.borrow();
		stack.entries[stack.cursor].state.clone()
	}

	/// Number of registered `popstate` handlers.
	pub fn handler_count(&self) -> usize {
		self.inner.borrow().handlers.len()
	}

	/// Makes every subsequent call fail with [`NativeHistoryError::Unavailable`].
	pub fn set_failing(&self, failing: bool) {
		self.inner.borrow_mut().failing = failing;
	}

	/// Simulates the user moving by `delta` entries and fires `popstate`
	/// synchronously. Returns `false` if the move is impossible.
	pub fn pop(&self, delta: isize) -> bool {
		let event = self.inner.borrow_mut().traverse(delta);
		match event {
			Some(event) => {
				self.dispatch(&event);
				true
			}
			None => false,
		}
	}

	/// Delivers `popstate` events queued by `back` and `go`. Returns the
	/// number of events delivered.
	pub fn flush(&self) -> usize {
		let mut delivered = 0;
		loop {
			let event = self.inner.borrow_mut().pending.pop_front();
			let Some(event) = event else {
				return delivered;
			};
			self.dispatch(&event);
			delivered += 1;
		}
	}

	fn dispatch(&self, event: &PopStateEvent) {
		let handlers: Vec<SharedHandler> = self
			.inner
			.borrow()
			.handlers
			.iter()
			.map(|(_, handler)| Rc::clone(handler))
			.collect();
		for handler in handlers {
			handler(event);
		}
	}

	fn write(&self, url: &str, state: &NavigationState, replace: bool) -> Result<(), NativeHistoryError> {
		let mut stack = self.inner.borrow_mut();
		stack.check()?;
		let entry = NativeEntry {
			hash: format!("#{}", url),
			state: Some(state.clone()),
		};
		let call = if replace {
			let cursor = stack.cursor;
			stack.entries[cursor] = entry;
			NativeCall::Replace {
				url: url.to_string(),
				index: state.index,
			}
		} else {
			let position = stack.cursor + 1;
			stack.entries.truncate(position);
			stack.entries.push(entry);
			stack.cursor = position;
			NativeCall::Push {
				url: url.to_string(),
				index: state.index,
			}
		};
		stack.calls.push(call);
		Ok(())
	}

	fn queue_traversal(&self, delta: isize, call: NativeCall) -> Result<(), NativeHistoryError> {
		let mut stack = self.inner.borrow_mut();
		stack.check()?;
		stack.calls.push(call);
		if let Some(event) = stack.traverse(delta) {
			stack.pending.push_back(event);
		}
		Ok(())
	}
}

impl NativeHistory for MemoryNativeHistory {
	fn push_entry(&self, url: &str, state: &NavigationState) -> Result<(), NativeHistoryError> {
		self.write(url, state, false)
	}

	fn replace_entry(&self, url: &str, state: &NavigationState) -> Result<(), NativeHistoryError> {
		self.write(url, state, true)
	}

	fn back(&self) -> Result<(), NativeHistoryError> {
		self.queue_traversal(-1, NativeCall::Back)
	}

	fn go(&self, delta: isize) -> Result<(), NativeHistoryError> {
		self.queue_traversal(delta, NativeCall::Go(delta))
	}

	fn location_hash(&self) -> Result<String, NativeHistoryError> {
		let stack = self.inner.borrow();
		stack.check()?;
		Ok(stack.entries[stack.cursor].hash.clone())
	}

	fn on_pop_state(&self, handler: PopStateHandler) -> Result<Subscription, NativeHistoryError> {
		let id = {
			let mut stack = self.inner.borrow_mut();
			stack.check()?;
			let id = stack.next_handler_id;
			stack.next_handler_id += 1;
			stack.handlers.push((id, Rc::from(handler)));
			id
		};

		let weak = Rc::downgrade(&self.inner);
		Ok(Subscription::new(move || {
			if let Some(inner) = weak.upgrade() {
				inner
					.borrow_mut()
					.handlers
					.retain(|(handler_id, _)| *handler_id != id);
			}
		}))
	}
}

impl fmt::Debug for MemoryNativeHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let stack = self.inner.borrow();
		f.debug_struct("MemoryNativeHistory")
			.field("len", &stack.entries.len())
			.field("cursor", &stack.cursor)
			.field("calls", &stack.calls)
			.field("handlers", &stack.handlers.len())
			.field("pending", &stack.pending.len())
			.finish()
	}
}
