//! Navigation state types.
//!
//! [`NavigationState`] describes where the user is: a view, a panel inside it,
//! an optional global popup, query parameters and the position of the state
//! in the memory history. [`NavigationUpdate`] is the partial payload accepted
//! by navigation actions and merged into the current state by
//! [`build_state`](crate::build_state).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query parameters of a navigation state.
pub type Query = BTreeMap<String, QueryValue>;

/// A single query parameter value.
///
/// The query-string grammar supports arrays and nested keys, so values are
/// recursive: `a=1` is a string, `a[0]=1&a[1]=2` a list and `a[b]=1` a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
	/// A plain string value.
	Str(String),
	/// An ordered list of values.
	List(Vec<QueryValue>),
	/// A nested map of values.
	Map(BTreeMap<String, QueryValue>),
}

impl QueryValue {
	/// Returns the string value, if this is a plain string.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(s),
			_ => None,
		}
	}

	/// Returns the list items, if this is a list.
	pub fn as_list(&self) -> Option<&[QueryValue]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	/// Returns the nested map, if this is a map.
	pub fn as_map(&self) -> Option<&BTreeMap<String, QueryValue>> {
		match self {
			Self::Map(map) => Some(map),
			_ => None,
		}
	}
}

impl From<&str> for QueryValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_string())
	}
}

impl From<String> for QueryValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
	fn from(values: Vec<T>) -> Self {
		Self::List(values.into_iter().map(Into::into).collect())
	}
}

impl From<BTreeMap<String, QueryValue>> for QueryValue {
	fn from(map: BTreeMap<String, QueryValue>) -> Self {
		Self::Map(map)
	}
}

/// A complete navigation state.
///
/// `index` is the position of the state inside the memory history at the time
/// it was recorded. It is assigned by the history stack; values supplied by
/// callers are overwritten when the state is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
	/// Active view identifier.
	pub view: String,
	/// Active panel identifier inside `view`.
	pub panel: String,
	/// Open popup identifier, if any.
	#[serde(default)]
	pub popup: Option<String>,
	/// Query parameters.
	#[serde(default)]
	pub query: Query,
	/// Position inside the memory history.
	#[serde(default)]
	pub index: usize,
}

impl NavigationState {
	/// Creates a state for a view and panel, without popup or query.
	pub fn new(view: impl Into<String>, panel: impl Into<String>) -> Self {
		Self {
			view: view.into(),
			panel: panel.into(),
			popup: None,
			query: Query::new(),
			index: 0,
		}
	}

	/// Sets the popup.
	pub fn with_popup(mut self, popup: impl Into<String>) -> Self {
		self.popup = Some(popup.into());
		self
	}

	/// Replaces the query.
	pub fn with_query(mut self, query: Query) -> Self {
		self.query = query;
		self
	}

	/// Adds a single query parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
		self.query.insert(key.into(), value.into());
		self
	}

	/// Sets the history index.
	pub fn with_index(mut self, index: usize) -> Self {
		self.index = index;
		self
	}
}

/// A partial navigation update.
///
/// Fields left unset are taken from the current state, except `popup` and
/// `query` which reset to empty unless explicitly provided. The constructors
/// mirror the supported shapes of an update:
///
/// - [`for_view`](Self::for_view): view and panel, optional popup and query
/// - [`for_panel`](Self::for_panel): panel in the current view
/// - [`for_popup`](Self::for_popup): popup over the current panel
/// - [`for_query`](Self::for_query): query only
///
/// # Example
///
/// ```
/// use miniapp_router_core::NavigationUpdate;
///
/// let update = NavigationUpdate::for_view("main", "home").with_popup("confirm");
/// assert_eq!(update.view(), Some("main"));
/// assert_eq!(update.popup(), Some(Some("confirm")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationUpdate {
	view: Option<String>,
	panel: Option<String>,
	popup: Option<Option<String>>,
	query: Option<Query>,
}

impl NavigationUpdate {
	/// Navigates to a panel of another view.
	pub fn for_view(view: impl Into<String>, panel: impl Into<String>) -> Self {
		Self {
			view: Some(view.into()),
			panel: Some(panel.into()),
			..Self::default()
		}
	}

	/// Navigates to another panel of the current view.
	pub fn for_panel(panel: impl Into<String>) -> Self {
		Self {
			panel: Some(panel.into()),
			..Self::default()
		}
	}

	/// Opens a popup over the current panel.
	pub fn for_popup(popup: impl Into<String>) -> Self {
		Self {
			popup: Some(Some(popup.into())),
			..Self::default()
		}
	}

	/// Changes only the query of the current panel.
	pub fn for_query(query: Query) -> Self {
		Self {
			query: Some(query),
			..Self::default()
		}
	}

	/// Sets the popup to open.
	pub fn with_popup(mut self, popup: impl Into<String>) -> Self {
		self.popup = Some(Some(popup.into()));
		self
	}

	/// Explicitly closes any popup.
	pub fn without_popup(mut self) -> Self {
		self.popup = Some(None);
		self
	}

	/// Sets the query.
	pub fn with_query(mut self, query: Query) -> Self {
		self.query = Some(query);
		self
	}

	/// Adds a single query parameter, keeping previously added ones.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
		self.query
			.get_or_insert_with(Query::new)
			.insert(key.into(), value.into());
		self
	}

	/// Target view, if the update changes it.
	pub fn view(&self) -> Option<&str> {
		self.view.as_deref()
	}

	/// Target panel, if the update changes it.
	pub fn panel(&self) -> Option<&str> {
		self.panel.as_deref()
	}

	/// Target popup: `None` when unspecified, `Some(None)` when explicitly closed.
	pub fn popup(&self) -> Option<Option<&str>> {
		self.popup.as_ref().map(Option::as_deref)
	}

	/// Target query, if specified.
	pub fn query(&self) -> Option<&Query> {
		self.query.as_ref()
	}
}

/// A full state converts into an update that re-specifies every field except
/// the history index, which is never taken from an update.
impl From<NavigationState> for NavigationUpdate {
	fn from(state: NavigationState) -> Self {
		Self {
			view: Some(state.view),
			panel: Some(state.panel),
			popup: Some(state.popup),
			query: Some(state.query),
		}
	}
}

impl From<&NavigationState> for NavigationUpdate {
	fn from(state: &NavigationState) -> Self {
		Self::from(state.clone())
	}
}
