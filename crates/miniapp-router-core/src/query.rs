//! Query-string codec with nested keys.
//!
//! The grammar follows the widely used bracket notation:
//!
//! | Query string            | Parsed value                      |
//! |-------------------------|-----------------------------------|
//! | `a=1`                   | `{a: "1"}`                        |
//! | `a=1&a=2`, `a[]=1&a[]=2`| `{a: ["1", "2"]}`                 |
//! | `a[0]=1&a[1]=2`         | `{a: ["1", "2"]}`                 |
//! | `a[b]=1`                | `{a: {b: "1"}}`                   |
//! | `a[0][b]=1`             | `{a: [{b: "1"}]}`                 |
//!
//! Serialization always uses explicit indices for lists and percent-encodes
//! keys and values (brackets included), so `{a: ["x"]}` becomes `a%5B0%5D=x`.
//! Empty lists and maps produce no pairs.
//!
//! ## Representable queries
//!
//! The grammar cannot tell every query apart. A query reads back unchanged
//! from its serialization when:
//!
//! - it holds no empty list or map (they produce no pairs and disappear)
//! - map keys are non-empty and contain no `[` or `]`
//! - nesting stays within five bracket groups per key
//! - no nested map is keyed only by list positions (`{"0": x}` reads back
//!   as the list `[x]`)
//!
//! [`QueryCodec::normalize`] maps any query to the form it reads back as.

use crate::state::{Query, QueryValue};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Maximum number of bracket groups parsed per key. Deeper groups are kept
/// as one literal key.
const MAX_DEPTH: usize = 5;

/// Largest list index that may open a list or skip positions. Larger indices
/// are list positions only when they continue a list contiguously, and map
/// keys otherwise.
const ARRAY_LIMIT: usize = 20;

/// Maximum number of pairs parsed from one query string.
const PARAMETER_LIMIT: usize = 1000;

/// A pluggable query-string codec.
pub trait QueryCodec {
	/// Parses a query string (with or without the leading `?`).
	fn parse(&self, input: &str) -> Query;

	/// Serializes a query into a query string without the leading `?`.
	fn stringify(&self, query: &Query) -> String;

	/// The query as it reads back after a trip through a URL.
	///
	/// Normalizing twice gives the same query as normalizing once.
	fn normalize(&self, query: &Query) -> Query {
		self.parse(&self.stringify(query))
	}
}

/// The default codec, implementing the nested bracket grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NestedQueryCodec;

impl QueryCodec for NestedQueryCodec {
	fn parse(&self, input: &str) -> Query {
		parse_query(input)
	}

	fn stringify(&self, query: &Query) -> String {
		stringify_query(query)
	}
}

/// Serializes a query with the nested bracket grammar.
///
/// Empty lists and maps produce no pairs, so they are absent from the parsed
/// result, and a query made only of them serializes to the empty string.
///
/// # Example
///
/// ```
/// use miniapp_router_core::{Query, QueryValue, stringify_query};
///
/// let mut query = Query::new();
/// query.insert("tab".to_string(), QueryValue::from("news"));
/// query.insert("ids".to_string(), QueryValue::from(vec!["1", "2"]));
///
/// assert_eq!(stringify_query(&query), "ids%5B0%5D=1&ids%5B1%5D=2&tab=news");
/// ```
pub fn stringify_query(query: &Query) -> String {
	let mut pairs = Vec::new();
	for (key, value) in query {
		collect_pairs(&mut pairs, key.clone(), value);
	}
	pairs.join("&")
}

fn collect_pairs(pairs: &mut Vec<String>, prefix: String, value: &QueryValue) {
	match value {
		QueryValue::Str(s) => pairs.push(format!(
			"{}={}",
			urlencoding::encode(&prefix),
			urlencoding::encode(s)
		)),
		QueryValue::List(items) => {
			for (i, item) in items.iter().enumerate() {
				collect_pairs(pairs, format!("{}[{}]", prefix, i), item);
			}
		}
		QueryValue::Map(map) => {
			for (key, item) in map {
				collect_pairs(pairs, format!("{}[{}]", prefix, key), item);
			}
		}
	}
}

/// Parses a query string with the nested bracket grammar.
///
/// Parsing never fails: pairs with an empty key are skipped, a pair without
/// `=` has an empty value, and invalid percent-encoding is kept verbatim.
///
/// # Example
///
/// ```
/// use miniapp_router_core::{QueryValue, parse_query};
///
/// let query = parse_query("?user[name]=ann&tags[]=a&tags[]=b");
///
/// let name = query["user"].as_map().and_then(|m| m["name"].as_str());
/// assert_eq!(name, Some("ann"));
/// assert_eq!(query["tags"], QueryValue::from(vec!["a", "b"]));
/// ```
pub fn parse_query(input: &str) -> Query {
	let input = input.strip_prefix('?').unwrap_or(input);
	let mut root: BTreeMap<String, Node> = BTreeMap::new();

	for part in input
		.split('&')
		.filter(|part| !part.is_empty())
		.take(PARAMETER_LIMIT)
	{
		let (raw_key, raw_value) = part.split_once('=').unwrap_or((part, ""));
		let key = decode_component(raw_key);
		let (root_key, segments) = split_key(&key);
		if root_key.is_empty() {
			continue;
		}
		let value = decode_component(raw_value);

		match root.entry(root_key) {
			Entry::Vacant(entry) => {
				entry.insert(Node::build(&segments, value));
			}
			Entry::Occupied(mut entry) => entry.get_mut().merge(&segments, value),
		}
	}

	root.into_iter()
		.map(|(key, node)| (key, node.finish()))
		.collect()
}

fn decode_component(raw: &str) -> String {
	let replaced = raw.replace('+', " ");
	let decoded = urlencoding::decode(&replaced).map(|cow| cow.into_owned());
	decoded.unwrap_or(replaced)
}

/// One bracket group of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	/// `[]`
	Append,
	/// `[3]`
	Index(usize),
	/// `[name]`
	Key(String),
}

impl Segment {
	fn from_group(group: &str) -> Self {
		if group.is_empty() {
			return Self::Append;
		}
		match group.parse::<usize>() {
			Ok(index) if index.to_string() == group => Self::Index(index),
			_ => Self::Key(group.to_string()),
		}
	}
}

/// Splits `a[b][0]` into the root key `a` and its bracket segments.
fn split_key(key: &str) -> (String, Vec<Segment>) {
	let Some(open) = key.find('[') else {
		return (key.to_string(), Vec::new());
	};

	let mut groups = Vec::new();
	let mut rest = &key[open..];
	while groups.len() < MAX_DEPTH {
		let Some(group) = leading_group(rest) else {
			break;
		};
		groups.push(group);
		rest = &rest[group.len() + 2..];
	}

	// Unbalanced brackets: the whole key is literal.
	if groups.is_empty() {
		return (key.to_string(), Vec::new());
	}

	let mut groups = groups.into_iter();
	let mut root = key[..open].to_string();
	if root.is_empty() {
		root = groups.next().unwrap_or_default().to_string();
	}

	let mut segments: Vec<Segment> = groups.map(Segment::from_group).collect();
	if !rest.is_empty() {
		segments.push(Segment::Key(rest.to_string()));
	}
	(root, segments)
}

/// Returns the content of a leading `[...]` group without nested brackets.
fn leading_group(input: &str) -> Option<&str> {
	let inner = input.strip_prefix('[')?;
	let close = inner.find(']')?;
	let group = &inner[..close];
	(!group.contains('[')).then_some(group)
}

/// Intermediate parse tree. Lists are kept sparse until [`Node::finish`].
#[derive(Debug)]
enum Node {
	Leaf(String),
	Indexed(BTreeMap<usize, Node>),
	Keyed(BTreeMap<String, Node>),
}

impl Node {
	fn build(segments: &[Segment], value: String) -> Self {
		match segments.split_first() {
			None => Self::Leaf(value),
			Some((Segment::Append, rest)) => {
				Self::Indexed(BTreeMap::from([(0, Self::build(rest, value))]))
			}
			Some((Segment::Index(index), rest)) if *index <= ARRAY_LIMIT => {
				Self::Indexed(BTreeMap::from([(*index, Self::build(rest, value))]))
			}
			Some((Segment::Index(index), rest)) => {
				Self::Keyed(BTreeMap::from([(index.to_string(), Self::build(rest, value))]))
			}
			Some((Segment::Key(key), rest)) => {
				Self::Keyed(BTreeMap::from([(key.clone(), Self::build(rest, value))]))
			}
		}
	}

	fn merge(&mut self, segments: &[Segment], value: String) {
		let Some((head, rest)) = segments.split_first() else {
			self.push_leaf(value);
			return;
		};

		match head {
			Segment::Append => {
				self.promote_leaf();
				let slot = match self {
					Self::Indexed(map) => next_slot(map),
					Self::Keyed(map) => map.len(),
					Self::Leaf(_) => 0,
				};
				self.insert_index(slot, rest, value);
			}
			Segment::Index(index) => self.insert_index(*index, rest, value),
			Segment::Key(key) => self.insert_key(key, rest, value),
		}
	}

	fn push_leaf(&mut self, value: String) {
		self.promote_leaf();
		match self {
			Self::Indexed(map) => {
				let slot = next_slot(map);
				map.insert(slot, Self::Leaf(value));
			}
			Self::Keyed(map) => {
				map.entry(value)
					.or_insert_with(|| Self::Leaf(String::new()));
			}
			Self::Leaf(_) => {}
		}
	}

	fn insert_index(&mut self, index: usize, rest: &[Segment], value: String) {
		self.promote_leaf();
		match self {
			Self::Indexed(map) if accepts_index(map, index) => match map.entry(index) {
				Entry::Vacant(entry) => {
					entry.insert(Self::build(rest, value));
				}
				Entry::Occupied(mut entry) => entry.get_mut().merge(rest, value),
			},
			_ => self.insert_key(&index.to_string(), rest, value),
		}
	}

	fn insert_key(&mut self, key: &str, rest: &[Segment], value: String) {
		self.promote_to_map();
		if let Self::Keyed(map) = self {
			match map.entry(key.to_string()) {
				Entry::Vacant(entry) => {
					entry.insert(Self::build(rest, value));
				}
				Entry::Occupied(mut entry) => entry.get_mut().merge(rest, value),
			}
		}
	}

	/// A leaf merged with more values becomes the first list item.
	fn promote_leaf(&mut self) {
		if let Self::Leaf(value) = self {
			let leaf = Self::Leaf(std::mem::take(value));
			*self = Self::Indexed(BTreeMap::from([(0, leaf)]));
		}
	}

	/// Lists receiving a named key become maps keyed by their indices.
	fn promote_to_map(&mut self) {
		let map = match std::mem::replace(self, Self::Keyed(BTreeMap::new())) {
			Self::Keyed(map) => map,
			Self::Leaf(value) => BTreeMap::from([("0".to_string(), Self::Leaf(value))]),
			Self::Indexed(map) => map
				.into_iter()
				.map(|(index, node)| (index.to_string(), node))
				.collect(),
		};
		*self = Self::Keyed(map);
	}

	fn finish(self) -> QueryValue {
		match self {
			Self::Leaf(value) => QueryValue::Str(value),
			Self::Indexed(map) => QueryValue::List(map.into_values().map(Self::finish).collect()),
			Self::Keyed(map) => QueryValue::Map(
				map.into_iter()
					.map(|(key, node)| (key, node.finish()))
					.collect(),
			),
		}
	}
}

fn next_slot(map: &BTreeMap<usize, Node>) -> usize {
	map.keys().next_back().map_or(0, |last| last + 1)
}

/// Whether `index` is a list position of `map` rather than a map key.
fn accepts_index(map: &BTreeMap<usize, Node>, index: usize) -> bool {
	index <= ARRAY_LIMIT || index == next_slot(map) || map.contains_key(&index)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn map(pairs: &[(&str, QueryValue)]) -> QueryValue {
		QueryValue::Map(
			pairs
				.iter()
				.map(|(k, v)| (k.to_string(), v.clone()))
				.collect(),
		)
	}

	#[rstest]
	fn test_parse_flat() {
		let query = parse_query("a=1&b=two");
		assert_eq!(query.len(), 2);
		assert_eq!(query["a"], QueryValue::from("1"));
		assert_eq!(query["b"], QueryValue::from("two"));
	}

	#[rstest]
	#[case("a=1&a=2")]
	#[case("a[]=1&a[]=2")]
	#[case("a[0]=1&a[1]=2")]
	#[case("a%5B0%5D=1&a%5B1%5D=2")]
	#[case("a[1]=2&a[0]=1")]
	fn test_parse_list_forms(#[case] input: &str) {
		let query = parse_query(input);
		assert_eq!(query["a"], QueryValue::from(vec!["1", "2"]));
	}

	#[rstest]
	fn test_parse_sparse_indices_are_compacted() {
		let query = parse_query("a[0]=x&a[5]=y");
		assert_eq!(query["a"], QueryValue::from(vec!["x", "y"]));
	}

	#[rstest]
	fn test_parse_nested_map() {
		let query = parse_query("user[name]=ann&user[address][city]=rome");
		assert_eq!(
			query["user"],
			map(&[
				("address", map(&[("city", QueryValue::from("rome"))])),
				("name", QueryValue::from("ann")),
			])
		);
	}

	#[rstest]
	fn test_parse_list_of_maps() {
		let query = parse_query("items[0][id]=1&items[0][qty]=2&items[1][id]=3");
		assert_eq!(
			query["items"],
			QueryValue::List(vec![
				map(&[("id", "1".into()), ("qty", "2".into())]),
				map(&[("id", "3".into())]),
			])
		);
	}

	#[rstest]
	fn test_parse_index_over_limit_becomes_key() {
		let query = parse_query("a[21]=x");
		assert_eq!(query["a"], map(&[("21", "x".into())]));
	}

	#[rstest]
	#[case(22)]
	#[case(40)]
	fn test_parse_contiguous_indices_past_limit_stay_a_list(#[case] len: usize) {
		let input: Vec<String> = (0..len).map(|i| format!("a[{}]=v{}", i, i)).collect();

		let query = parse_query(&input.join("&"));

		let expected: Vec<String> = (0..len).map(|i| format!("v{}", i)).collect();
		assert_eq!(query["a"], QueryValue::from(expected));
	}

	#[rstest]
	fn test_parse_gap_past_limit_becomes_map() {
		let query = parse_query("a[0]=x&a[22]=y");
		assert_eq!(query["a"], map(&[("0", "x".into()), ("22", "y".into())]));
	}

	#[rstest]
	fn test_long_list_of_maps_reads_back() {
		let items: Vec<QueryValue> = (0..25)
			.map(|i| map(&[("id", QueryValue::from(i.to_string()))]))
			.collect();
		let mut query = Query::new();
		query.insert("items".to_string(), QueryValue::List(items));

		assert_eq!(parse_query(&stringify_query(&query)), query);
	}

	#[rstest]
	#[case::numeric_map_reads_as_list(
		map(&[("0", "x".into()), ("1", "y".into())]),
		Some(QueryValue::from(vec!["x", "y"]))
	)]
	#[case::empty_list_disappears(QueryValue::List(Vec::new()), None)]
	#[case::empty_map_disappears(QueryValue::Map(BTreeMap::new()), None)]
	#[case::named_map_is_kept(map(&[("0", "x".into()), ("b", "y".into())]), Some(map(&[("0", "x".into()), ("b", "y".into())])))]
	fn test_normalize(#[case] value: QueryValue, #[case] expected: Option<QueryValue>) {
		let mut query = Query::new();
		query.insert("a".to_string(), value);
		query.insert("b".to_string(), "1".into());

		let normalized = NestedQueryCodec.normalize(&query);

		assert_eq!(normalized.get("a"), expected.as_ref());
		assert_eq!(normalized["b"], QueryValue::from("1"));
		assert_eq!(NestedQueryCodec.normalize(&normalized), normalized);
	}

	#[rstest]
	fn test_parse_mixed_index_and_key_becomes_map() {
		let query = parse_query("a[0]=x&a[b]=y");
		assert_eq!(query["a"], map(&[("0", "x".into()), ("b", "y".into())]));
	}

	#[rstest]
	fn test_parse_depth_limit_keeps_remainder_literal() {
		let query = parse_query("a[b][c][d][e][f][g]=x");
		let mut value = &query["a"];
		for key in ["b", "c", "d", "e", "f"] {
			value = &value.as_map().unwrap()[key];
		}
		assert_eq!(value, &map(&[("[g]", "x".into())]));
	}

	#[rstest]
	#[case("a[b=1", "a[b")]
	#[case("a]b=1", "a]b")]
	fn test_parse_unbalanced_brackets_are_literal(#[case] input: &str, #[case] key: &str) {
		let query = parse_query(input);
		assert_eq!(query[key], QueryValue::from("1"));
	}

	#[rstest]
	fn test_parse_leading_bracket_key() {
		let query = parse_query("[a]=1");
		assert_eq!(query["a"], QueryValue::from("1"));
	}

	#[rstest]
	#[case("", 0)]
	#[case("?", 0)]
	#[case("&&", 0)]
	#[case("=1", 0)]
	#[case("flag", 1)]
	fn test_parse_degenerate_inputs(#[case] input: &str, #[case] expected_len: usize) {
		assert_eq!(parse_query(input).len(), expected_len);
	}

	#[rstest]
	fn test_parse_flag_without_value_is_empty_string() {
		assert_eq!(parse_query("flag")["flag"], QueryValue::from(""));
	}

	#[rstest]
	fn test_parse_decodes_plus_and_percent() {
		let query = parse_query("q=hello+world&r=a%26b%3Dc");
		assert_eq!(query["q"], QueryValue::from("hello world"));
		assert_eq!(query["r"], QueryValue::from("a&b=c"));
	}

	#[rstest]
	fn test_parse_invalid_percent_encoding_is_kept() {
		let query = parse_query("q=%FF");
		assert_eq!(query["q"], QueryValue::from("%FF"));
	}

	#[rstest]
	fn test_stringify_flat_and_nested() {
		let mut query = Query::new();
		query.insert("b".to_string(), map(&[("c", "d".into())]));
		query.insert("a".to_string(), QueryValue::from(vec!["x", "y"]));

		assert_eq!(
			stringify_query(&query),
			"a%5B0%5D=x&a%5B1%5D=y&b%5Bc%5D=d"
		);
	}

	#[rstest]
	fn test_stringify_encodes_reserved_characters() {
		let mut query = Query::new();
		query.insert("q".to_string(), QueryValue::from("a b&c=d"));

		assert_eq!(stringify_query(&query), "q=a%20b%26c%3Dd");
	}

	#[rstest]
	fn test_stringify_skips_empty_containers() {
		let mut query = Query::new();
		query.insert("list".to_string(), QueryValue::List(Vec::new()));
		query.insert("map".to_string(), QueryValue::Map(BTreeMap::new()));

		assert_eq!(stringify_query(&query), "");
	}

	#[rstest]
	fn test_codec_trait_delegates() {
		let codec = NestedQueryCodec;
		let query = codec.parse("a[x]=1");
		assert_eq!(codec.stringify(&query), "a%5Bx%5D=1");
	}
}
