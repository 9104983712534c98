//! Option key resolution
//!
//! A field id either names an option directly (`site_title`) or addresses one
//! entry inside an option's mapping (`colors[primary]`). The same parser is
//! used for form parameter names, so a posted `colors[primary]` lands exactly
//! where `resolve("colors[primary]", "")` points.
//!
//! Only one level of nesting is addressable: `a[b][c]` resolves to container
//! `a` and subkey `b`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prelude::*;
use crate::utils::list_index;
use setkit_types::store_adapter::OptionStore;

/// Storage address of one field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionKey {
	/// Store key holding the value (or the mapping containing it)
	pub container: String,
	/// Key inside the container's mapping, `None` when the field owns the whole container
	pub subkey: Option<String>,
}

impl OptionKey {
	/// Reads the addressed value, falling back to `default`.
	///
	/// A numeric subkey also indexes a stored sequence. Any other container
	/// shape yields `default` for a subkey.
	pub fn read(&self, store: &dyn OptionStore, default: Value) -> SkResult<Value> {
		match &self.subkey {
			None => store.get(&self.container, default),
			Some(subkey) => match store.read_option(&self.container)? {
				Some(Value::Object(mut map)) => Ok(map.remove(subkey).unwrap_or(default)),
				Some(Value::Array(mut items)) => Ok(list_index(subkey)
					.filter(|idx| *idx < items.len())
					.map_or(default, |idx| items.swap_remove(idx))),
				_ => Ok(default),
			},
		}
	}
}

impl std::fmt::Display for OptionKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.subkey {
			Some(subkey) => write!(f, "{}[{}]", self.container, subkey),
			None => write!(f, "{}", self.container),
		}
	}
}

/// Splits a parameter name into its base name and bracketed segments.
///
/// Follows query-string parameter parsing:
/// - leading whitespace is dropped, `.` and ` ` in the base name become `_`
/// - `a[b][c]` yields `("a", ["b", "c"])`, `a[]` yields `("a", [""])`
/// - an unmatched first `[` is kept literally as `_` (`a[b` → `a_b`)
/// - anything after the last matched `]` that does not open a new segment is ignored
pub fn parse_key_path(name: &str) -> (String, Vec<String>) {
	let name = name.trim_start();
	let Some(open) = name.find('[') else {
		return (normalize_base(name), Vec::new());
	};

	let mut segments = Vec::new();
	let mut rest = &name[open..];
	while let Some(inner) = rest.strip_prefix('[') {
		let Some(close) = inner.find(']') else {
			if segments.is_empty() {
				return (normalize_base(&name.replacen('[', "_", 1)), Vec::new());
			}
			break;
		};
		segments.push(inner[..close].to_string());
		rest = &inner[close + 1..];
	}

	(normalize_base(&name[..open]), segments)
}

fn normalize_base(name: &str) -> String {
	name.chars().map(|c| if c == '.' || c == ' ' { '_' } else { c }).collect()
}

/// Resolves where a field id is stored.
///
/// - `outer[inner]` → container `outer`, subkey `inner` (regardless of `option_name`)
/// - `outer[]` → container `outer`, no subkey
/// - plain id with a non-empty `option_name` → container `option_name`, subkey id
/// - plain id otherwise → container id, no subkey
pub fn resolve(id: &str, option_name: &str) -> OptionKey {
	let (base, segments) = parse_key_path(id);
	match segments.into_iter().next() {
		Some(subkey) if !subkey.is_empty() => OptionKey { container: base, subkey: Some(subkey) },
		Some(_) => OptionKey { container: base, subkey: None },
		None if !option_name.is_empty() => {
			OptionKey { container: option_name.to_string(), subkey: Some(base) }
		}
		None => OptionKey { container: base, subkey: None },
	}
}

/// Reads a setting the way field renderers see it.
///
/// With both names the field entry inside `option_name`'s mapping is returned;
/// with only one of them that key is read directly. With neither, `default`.
pub fn get_option(
	store: &dyn OptionStore,
	option_name: &str,
	field_id: &str,
	default: Value,
) -> SkResult<Value> {
	match (option_name.is_empty(), field_id.is_empty()) {
		(true, true) => Ok(default),
		(false, true) => store.get(option_name, default),
		_ => resolve(field_id, option_name).read(store, default),
	}
}


// vim: ts=4
