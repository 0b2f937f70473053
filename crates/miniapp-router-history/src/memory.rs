//! In-memory history stack.
//!
//! [`MemoryHistory`] is the system of record for navigation: an ordered list
//! of [`HistoryEntry`] values with a cursor. It follows browser semantics:
//! pushing discards every entry after the cursor.
//!
//! The stack is a cheap, cloneable handle over shared single-threaded state.
//! Listeners run synchronously after each mutation, once the internal borrow
//! has been released, so they may freely read the stack (or mutate it).
//!
//! ```
//! use miniapp_router_core::NavigationState;
//! use miniapp_router_history::MemoryHistory;
//!
//! let history = MemoryHistory::new("/main/home", NavigationState::new("main", "home"));
//! history.push("/main/settings", NavigationState::new("main", "settings"));
//! history.push("/main/about", NavigationState::new("main", "about"));
//!
//! history.go(-2);
//! assert_eq!(history.index(), 0);
//!
//! history.push("/main/help", NavigationState::new("main", "help"));
//! assert_eq!(history.len(), 2);
//! assert_eq!(history.current().state.index, 1);
//! ```

use crate::subscription::Subscription;
use miniapp_router_core::{Location, NavigationState};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// One recorded location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
	/// URL of the entry, without any `#` marker.
	pub url: String,
	/// State of the entry. `state.index` equals the entry position.
	pub state: NavigationState,
}

impl HistoryEntry {
	/// Projects the entry URL into a [`Location`].
	pub fn location(&self) -> Location {
		Location::from_url(&self.url)
	}
}

type Listener = Rc<dyn Fn(&Location, &NavigationState)>;

struct Stack {
	entries: Vec<HistoryEntry>,
	cursor: usize,
	listeners: Vec<(u64, Listener)>,
	next_listener_id: u64,
}

/// Ordered, indexable sequence of states with a cursor.
///
/// The stack is never empty and `0 <= index() < len()` always holds. After
/// every operation the entry under the cursor has `state.index == index()`.
#[derive(Clone)]
pub struct MemoryHistory {
	inner: Rc<RefCell<Stack>>,
}

impl MemoryHistory {
	/// Creates a stack holding a single entry at index 0.
	pub fn new(url: impl Into<String>, mut state: NavigationState) -> Self {
		state.index = 0;
		Self {
			inner: Rc::new(RefCell::new(Stack {
				entries: vec![HistoryEntry {
					url: url.into(),
					state,
				}],
				cursor: 0,
				listeners: Vec::new(),
				next_listener_id: 0,
			})),
		}
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.inner.borrow().entries.len()
	}

	/// Always `false`: the stack holds at least one entry.
	pub fn is_empty(&self) -> bool {
		self.inner.borrow().entries.is_empty()
	}

	/// Position of the cursor.
	pub fn index(&self) -> usize {
		self.inner.borrow().cursor
	}

	/// Entry under the cursor.
	pub fn current(&self) -> HistoryEntry {
		let stack = self.inner.borrow();
		stack.entries[stack.cursor].clone()
	}

	/// Entry at a position, if any.
	pub fn entry(&self, index: usize) -> Option<HistoryEntry> {
		self.inner.borrow().entries.get(index).cloned()
	}

	/// Snapshot of every entry.
	pub fn entries(&self) -> Vec<HistoryEntry> {
		self.inner.borrow().entries.clone()
	}

	/// Location of the entry under the cursor.
	pub fn location(&self) -> Location {
		let stack = self.inner.borrow();
		stack.entries[stack.cursor].location()
	}

	/// Returns `true` if `go(delta)` would land exactly `delta` entries away.
	pub fn can_go(&self, delta: isize) -> bool {
		let stack = self.inner.borrow();
		stack
			.cursor
			.checked_add_signed(delta)
			.is_some_and(|target| target < stack.entries.len())
	}

	/// Discards entries after the cursor, appends a new entry and moves the
	/// cursor onto it. The stored index is the new position.
	pub fn push(&self, url: impl Into<String>, mut state: NavigationState) {
		let url = url.into();
		{
			let mut stack = self.inner.borrow_mut();
			let position = stack.cursor + 1;
			stack.entries.truncate(position);
			state.index = position;
			stack.entries.push(HistoryEntry { url, state });
			stack.cursor = position;
			tracing::trace!(index = position, "memory history push");
		}
		self.notify();
	}

	/// Overwrites the entry under the cursor. The stored index is the cursor.
	pub fn replace(&self, url: impl Into<String>, mut state: NavigationState) {
		let url = url.into();
		{
			let mut stack = self.inner.borrow_mut();
			let position = stack.cursor;
			state.index = position;
			stack.entries[position] = HistoryEntry { url, state };
			tracing::trace!(index = position, "memory history replace");
		}
		self.notify();
	}

	/// Moves the cursor by `delta`, clamped to the stack bounds.
	///
	/// Returns `false`, without notifying listeners, when the clamped target
	/// is the current position.
	pub fn go(&self, delta: isize) -> bool {
		{
			let mut stack = self.inner.borrow_mut();
			let last = stack.entries.len() - 1;
			let target = stack
				.cursor
				.saturating_add_signed(delta)
				.min(last);
			if target == stack.cursor {
				return false;
			}
			tracing::trace!(from = stack.cursor, to = target, "memory history go");
			stack.cursor = target;
		}
		self.notify();
		true
	}

	/// Moves the cursor back one entry.
	pub fn go_back(&self) -> bool {
		self.go(-1)
	}

	/// Moves the cursor forward one entry.
	pub fn go_forward(&self) -> bool {
		self.go(1)
	}

	/// Registers a listener invoked after every mutation with the resulting
	/// location and current state.
	pub fn listen(&self, listener: impl Fn(&Location, &NavigationState) + 'static) -> Subscription {
		let id = {
			let mut stack = self.inner.borrow_mut();
			let id = stack.next_listener_id;
			stack.next_listener_id += 1;
			stack.listeners.push((id, Rc::new(listener)));
			id
		};

		let weak: Weak<RefCell<Stack>> = Rc::downgrade(&self.inner);
		Subscription::new(move || {
			if let Some(inner) = weak.upgrade() {
				inner
					.borrow_mut()
					.listeners
					.retain(|(listener_id, _)| *listener_id != id);
			}
		})
	}

	/// Number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.borrow().listeners.len()
	}

	fn notify(&self) {
		let (listeners, location, state) = {
			let stack = self.inner.borrow();
			let entry = &stack.entries[stack.cursor];
			let listeners: Vec<Listener> = stack
				.listeners
				.iter()
				.map(|(_, listener)| Rc::clone(listener))
				.collect();
			(listeners, entry.location(), entry.state.clone())
		};

		for listener in listeners {
			listener(&location, &state);
		}
	}
}

impl fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let stack = self.inner.borrow();
		f.debug_struct("MemoryHistory")
			.field("entries", &stack.entries)
			.field("cursor", &stack.cursor)
			.field("listeners", &stack.listeners.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use std::cell::RefCell;

	fn state(panel: &str) -> NavigationState {
		NavigationState::new("main", panel)
	}

	/// Stack of five entries `p0..p4` with the cursor on the last one.
	#[fixture]
	fn history() -> MemoryHistory {
		let history = MemoryHistory::new("/main/p0", state("p0"));
		for i in 1..5 {
			history.push(format!("/main/p{}", i), state(&format!("p{}", i)));
		}
		history
	}

	#[rstest]
	fn test_new_forces_index_zero() {
		let history = MemoryHistory::new("/main/home", state("home").with_index(7));

		assert_eq!(history.len(), 1);
		assert!(!history.is_empty());
		assert_eq!(history.current().state.index, 0);
	}

	#[rstest]
	fn test_push_assigns_sequential_indices(history: MemoryHistory) {
		let indices: Vec<usize> = history.entries().iter().map(|e| e.state.index).collect();

		assert_eq!(indices, [0, 1, 2, 3, 4]);
		assert_eq!(history.index(), 4);
	}

	#[rstest]
	fn test_push_truncates_forward_entries(history: MemoryHistory) {
		// Arrange
		history.go(-2);
		assert_eq!(history.index(), 2);

		// Act
		history.push("/main/new", state("new").with_index(99));

		// Assert
		assert_eq!(history.len(), 4);
		assert_eq!(history.index(), 3);
		assert_eq!(history.current().url, "/main/new");
		assert_eq!(history.current().state.index, 3);
		assert!(history.entries().iter().all(|e| e.state.panel != "p3"));
	}

	#[rstest]
	fn test_replace_keeps_length_and_cursor(history: MemoryHistory) {
		history.go(-1);

		history.replace("/main/other", state("other"));

		assert_eq!(history.len(), 5);
		assert_eq!(history.index(), 3);
		assert_eq!(history.current().state, state("other").with_index(3));
		assert_eq!(history.entry(4).map(|e| e.state.panel), Some("p4".to_string()));
	}

	#[rstest]
	#[case(-1, 3, true)]
	#[case(-4, 0, true)]
	#[case(-10, 0, true)]
	#[case(0, 4, false)]
	#[case(1, 4, false)]
	fn test_go_clamps(
		history: MemoryHistory,
		#[case] delta: isize,
		#[case] expected_index: usize,
		#[case] moved: bool,
	) {
		assert_eq!(history.go(delta), moved);
		assert_eq!(history.index(), expected_index);
		assert_eq!(history.current().state.index, expected_index);
	}

	#[rstest]
	fn test_go_back_and_forward(history: MemoryHistory) {
		assert!(history.go_back());
		assert!(history.go_back());
		assert!(history.go_forward());
		assert_eq!(history.index(), 3);
	}

	#[rstest]
	#[case(0, true)]
	#[case(-4, true)]
	#[case(-5, false)]
	#[case(1, false)]
	fn test_can_go(history: MemoryHistory, #[case] delta: isize, #[case] expected: bool) {
		assert_eq!(history.can_go(delta), expected);
	}

	#[rstest]
	fn test_location_projection(history: MemoryHistory) {
		history.push("/main/search?q=1", state("search"));

		let location = history.location();

		assert_eq!(location.pathname, "/main/search");
		assert_eq!(location.search, "?q=1");
	}

	#[rstest]
	fn test_listeners_receive_resulting_state(history: MemoryHistory) {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		let _subscription = history.listen(move |location, state| {
			sink.borrow_mut().push((location.pathname.clone(), state.index));
		});

		history.go(-1);
		history.replace("/main/r", state("r"));
		history.push("/main/x", state("x"));

		assert_eq!(
			*seen.borrow(),
			[
				("/main/p3".to_string(), 3),
				("/main/r".to_string(), 3),
				("/main/x".to_string(), 4),
			]
		);
	}

	#[rstest]
	fn test_noop_go_does_not_notify(history: MemoryHistory) {
		let calls = Rc::new(RefCell::new(0));
		let counter = Rc::clone(&calls);
		let _subscription = history.listen(move |_, _| *counter.borrow_mut() += 1);

		history.go(1);
		history.go(0);

		assert_eq!(*calls.borrow(), 0);
	}

	#[rstest]
	fn test_multiple_listeners_and_unsubscribe(history: MemoryHistory) {
		let first = Rc::new(RefCell::new(0));
		let second = Rc::new(RefCell::new(0));
		let first_counter = Rc::clone(&first);
		let second_counter = Rc::clone(&second);

		let first_subscription = history.listen(move |_, _| *first_counter.borrow_mut() += 1);
		let _second_subscription = history.listen(move |_, _| *second_counter.borrow_mut() += 1);
		assert_eq!(history.listener_count(), 2);

		history.go_back();
		first_subscription.unsubscribe();
		history.go_back();

		assert_eq!(*first.borrow(), 1);
		assert_eq!(*second.borrow(), 2);
		assert_eq!(history.listener_count(), 1);
	}

	#[rstest]
	fn test_listener_may_read_history(history: MemoryHistory) {
		let previous = Rc::new(RefCell::new(None));
		let sink = Rc::clone(&previous);
		let reader = history.clone();
		let _subscription = history.listen(move |_, state| {
			let entry = state.index.checked_sub(1).and_then(|i| reader.entry(i));
			*sink.borrow_mut() = entry.map(|e| e.state.panel);
		});

		history.go(-2);

		assert_eq!(*previous.borrow(), Some("p1".to_string()));
	}
}
