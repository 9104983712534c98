//! Submitted form payload

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::option_key::{parse_key_path, OptionKey};
use crate::prelude::*;
use crate::utils::list_index;

/// Raw values posted by a settings form, keyed by container.
///
/// A container maps to a scalar, or to a mapping of subkeys. Group fields
/// post an ordered sequence of row mappings under their subkey.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmittedFieldSet(Map<String, Value>);

impl SubmittedFieldSet {
	pub fn new() -> Self {
		Self(Map::new())
	}

	pub fn from_map(map: Map<String, Value>) -> Self {
		Self(map)
	}

	/// Builds the payload from an `application/x-www-form-urlencoded` body
	pub fn from_urlencoded(body: &str) -> SkResult<Self> {
		let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body)
			.map_err(|e| Error::ValidationError(format!("invalid form body: {}", e)))?;
		Ok(Self::from_pairs(pairs))
	}

	/// Builds the payload from decoded name/value pairs.
	///
	/// Bracketed names nest (`a[b]=1`, `rows[0][name]=x`, `tags[]=y`). A level
	/// whose keys are exactly `0, 1, 2, ...` in submission order becomes a
	/// sequence; any other keys, sparse indices included, stay a mapping.
	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<String>,
	{
		let mut root: Vec<(String, Node)> = Vec::new();
		for (name, value) in pairs {
			let (base, segments) = parse_key_path(name.as_ref());
			if base.is_empty() {
				continue;
			}
			let mut path = Vec::with_capacity(segments.len() + 1);
			path.push(base);
			path.extend(segments);
			insert_node(&mut root, &path, value.into());
		}

		let mut map = Map::new();
		for (key, node) in root {
			map.insert(key, node.into_value());
		}
		Self(map)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn get(&self, container: &str) -> Option<&Value> {
		self.0.get(container)
	}

	pub fn insert(&mut self, container: impl Into<String>, value: Value) {
		self.0.insert(container.into(), value);
	}

	/// Raw value posted at `key`, `None` when nothing was posted there
	pub fn value_at(&self, key: &OptionKey) -> Option<&Value> {
		let container = self.0.get(&key.container)?;
		match &key.subkey {
			None => Some(container),
			Some(subkey) => match container {
				Value::Object(map) => map.get(subkey),
				Value::Array(items) => items.get(list_index(subkey)?),
				_ => None,
			},
		}
	}

	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}
}

impl From<Map<String, Value>> for SubmittedFieldSet {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

/// Order-preserving tree used while decoding form pairs
enum Node {
	Leaf(String),
	Branch(Vec<(String, Node)>),
}

impl Node {
	fn into_value(self) -> Value {
		match self {
			Node::Leaf(s) => Value::String(s),
			Node::Branch(children) => {
				let is_list = !children.is_empty()
					&& children.iter().enumerate().all(|(idx, (k, _))| list_index(k) == Some(idx));
				if is_list {
					Value::Array(children.into_iter().map(|(_, node)| node.into_value()).collect())
				} else {
					Value::Object(children.into_iter().map(|(k, node)| (k, node.into_value())).collect())
				}
			}
		}
	}
}

fn insert_node(children: &mut Vec<(String, Node)>, path: &[String], value: String) {
	let Some((head, tail)) = path.split_first() else {
		return;
	};

	// `[]` appends after the highest numeric key
	let key = if head.is_empty() {
		children
			.iter()
			.filter_map(|(k, _)| list_index(k))
			.max()
			.map_or(0, |max| max + 1)
			.to_string()
	} else {
		head.clone()
	};

	let pos = match children.iter().position(|(k, _)| *k == key) {
		Some(pos) => pos,
		None => {
			children.push((key, Node::Branch(Vec::new())));
			children.len() - 1
		}
	};
	let slot = &mut children[pos].1;

	if tail.is_empty() {
		*slot = Node::Leaf(value);
		return;
	}
	if let Node::Leaf(_) = slot {
		*slot = Node::Branch(Vec::new());
	}
	if let Node::Branch(grandchildren) = slot {
		insert_node(grandchildren, tail, value);
	}
}


// vim: ts=4
