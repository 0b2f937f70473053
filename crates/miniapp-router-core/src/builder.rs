//! History state builder.

use crate::state::{NavigationState, NavigationUpdate, Query};

/// Merges a partial update into the current state.
///
/// The result starts from `current` with `popup` and `query` reset, then
/// takes every field present in `update`. `index` is `explicit_index` when
/// given, otherwise `current.index`. No validation is performed.
///
/// ```
/// use miniapp_router_core::{NavigationState, NavigationUpdate, build_state};
///
/// let current = NavigationState::new("main", "home")
/// 	.with_popup("confirm")
/// 	.with_param("q", "1");
///
/// let next = build_state(&current, &NavigationUpdate::for_panel("settings"), Some(1));
///
/// assert_eq!(next, NavigationState::new("main", "settings").with_index(1));
/// ```
pub fn build_state(
	current: &NavigationState,
	update: &NavigationUpdate,
	explicit_index: Option<usize>,
) -> NavigationState {
	NavigationState {
		view: update.view().unwrap_or(&current.view).to_string(),
		panel: update.panel().unwrap_or(&current.panel).to_string(),
		popup: update.popup().flatten().map(str::to_string),
		query: update.query().cloned().unwrap_or_else(Query::new),
		index: explicit_index.unwrap_or(current.index),
	}
}
