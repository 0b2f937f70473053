//! URL codec for navigation states.
//!
//! URL grammar: `"/" view "/" panel ["/" popup] ["?" query]`.
//!
//! ```
//! use miniapp_router_core::{NavigationState, decode, encode};
//!
//! let state = NavigationState::new("main", "home")
//! 	.with_popup("confirm")
//! 	.with_param("id", "7");
//!
//! let url = encode(&state);
//! assert_eq!(url, "/main/home/confirm?id=7");
//! assert_eq!(decode(&url), Some(state));
//! ```

use crate::query::{NestedQueryCodec, QueryCodec};
use crate::state::NavigationState;

/// Encodes a state into a URL with the default query codec.
///
/// The history index is not part of the URL.
pub fn encode(state: &NavigationState) -> String {
	encode_with(&NestedQueryCodec, state)
}

/// Encodes a state into a URL with a custom query codec.
///
/// The query part is omitted when it serializes to the empty string.
pub fn encode_with(codec: &dyn QueryCodec, state: &NavigationState) -> String {
	let mut url = format!("/{}/{}", state.view, state.panel);
	if let Some(popup) = &state.popup {
		url.push('/');
		url.push_str(popup);
	}

	let query = codec.stringify(&state.query);
	if !query.is_empty() {
		url.push('?');
		url.push_str(&query);
	}
	url
}

/// Brings a state's query to the form it reads back as from its URL, with
/// the default query codec.
///
/// `decode(&encode(&state))` equals `normalize(&state)` with index 0.
pub fn normalize(state: &NavigationState) -> NavigationState {
	normalize_with(&NestedQueryCodec, state)
}

/// Like [`normalize`] with a custom query codec.
pub fn normalize_with(codec: &dyn QueryCodec, state: &NavigationState) -> NavigationState {
	NavigationState {
		query: codec.normalize(&state.query),
		..state.clone()
	}
}

/// Decodes a URL into a state with the default query codec.
pub fn decode(url: &str) -> Option<NavigationState> {
	decode_with(&NestedQueryCodec, url)
}

/// Decodes a URL into a state with a custom query codec.
///
/// Everything up to and including the first `#` is ignored, so both a
/// location hash (`#/main/home`) and a full href decode. One leading `/` is
/// optional. Returns `None` when the view or panel segment is missing or
/// empty. An absent or empty third segment means no popup; further segments
/// are ignored. The decoded index is always 0.
///
/// Decoding an encoded state gives the state back when its query is
/// representable (see [`crate::query`]). Otherwise the query comes back
/// normalized: empty lists and maps are dropped, and nested maps keyed only
/// by list positions come back as lists.
pub fn decode_with(codec: &dyn QueryCodec, url: &str) -> Option<NavigationState> {
	let url = url.split_once('#').map_or(url, |(_, fragment)| fragment);
	let url = url.strip_prefix('/').unwrap_or(url);
	let (path, search) = url.split_once('?').unwrap_or((url, ""));

	let mut segments = path.split('/');
	let view = segments.next().filter(|s| !s.is_empty())?;
	let panel = segments.next().filter(|s| !s.is_empty())?;
	let popup = segments.next().filter(|s| !s.is_empty());

	Some(NavigationState {
		view: view.to_string(),
		panel: panel.to_string(),
		popup: popup.map(str::to_string),
		query: codec.parse(search),
		index: 0,
	})
}
