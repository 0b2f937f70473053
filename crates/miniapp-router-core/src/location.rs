//! Location projected from a history entry URL.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The `{ pathname, search, hash }` triple of a history entry.
///
/// `search` is empty or starts with `?`, `hash` is empty or starts with `#`.
/// Equality is field-wise, which is what observers use to skip updates when
/// a new snapshot describes the same location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
	/// Path part, e.g. `/main/home/confirm`.
	pub pathname: String,
	/// Query part including the leading `?`, or empty.
	pub search: String,
	/// Fragment part including the leading `#`, or empty.
	pub hash: String,
}

impl Location {
	/// Splits a URL into its location parts.
	///
	/// ```
	/// use miniapp_router_core::Location;
	///
	/// let location = Location::from_url("/main/home?tab=2");
	/// assert_eq!(location.pathname, "/main/home");
	/// assert_eq!(location.search, "?tab=2");
	/// assert_eq!(location.hash, "");
	/// ```
	pub fn from_url(url: &str) -> Self {
		let (rest, hash) = match url.find('#') {
			Some(pos) => url.split_at(pos),
			None => (url, ""),
		};
		let (pathname, search) = match rest.find('?') {
			Some(pos) => rest.split_at(pos),
			None => (rest, ""),
		};

		Self {
			pathname: pathname.to_string(),
			// A lone `?` or `#` carries nothing.
			search: if search == "?" { String::new() } else { search.to_string() },
			hash: if hash == "#" { String::new() } else { hash.to_string() },
		}
	}

	/// Joins the parts back into a URL.
	pub fn href(&self) -> String {
		format!("{}{}{}", self.pathname, self.search, self.hash)
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}{}", self.pathname, self.search, self.hash)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/main/home", "/main/home", "", "")]
	#[case("/main/home?a=1", "/main/home", "?a=1", "")]
	#[case("/main/home#top", "/main/home", "", "#top")]
	#[case("/main/home?a=1#top", "/main/home", "?a=1", "#top")]
	#[case("/main/home?#", "/main/home", "", "")]
	#[case("", "", "", "")]
	fn test_from_url(
		#[case] url: &str,
		#[case] pathname: &str,
		#[case] search: &str,
		#[case] hash: &str,
	) {
		let location = Location::from_url(url);

		assert_eq!(location.pathname, pathname);
		assert_eq!(location.search, search);
		assert_eq!(location.hash, hash);
	}

	#[rstest]
	fn test_href_and_display_agree() {
		let location = Location::from_url("/main/home?a=1#top");

		assert_eq!(location.href(), "/main/home?a=1#top");
		assert_eq!(location.to_string(), location.href());
	}

	#[rstest]
	fn test_shallow_equality() {
		assert_eq!(Location::from_url("/a/b?x=1"), Location::from_url("/a/b?x=1"));
		assert_ne!(Location::from_url("/a/b?x=1"), Location::from_url("/a/b?x=2"));
	}
}
