//! Popstate reconciliation.

use miniapp_router_history::PopStateEvent;

/// Cursor delta that brings the memory history in line with a native
/// `popstate` event.
///
/// The event state carries the index of the entry that became current; an
/// event without state is the floor entry, index 0.
pub fn pop_state_delta(event: &PopStateEvent, cursor: usize) -> isize {
	let target = event.state.as_ref().map_or(0, |state| state.index);
	signed(target) - signed(cursor)
}

fn signed(index: usize) -> isize {
	isize::try_from(index).unwrap_or(isize::MAX)
}
