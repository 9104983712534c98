//! Utility functions

use serde_json::Value;

/// Turns a field id or type tag into a slug usable in hook names and CSS classes.
///
/// # Examples
/// - `"General Settings"` → `"general-settings"`
/// - `"radio_inline"` → `"radio_inline"`
/// - `"colors[primary]"` → `"colors-primary"`
pub fn slugify(input: &str) -> String {
	let mut slug = String::with_capacity(input.len());
	for c in input.trim().chars() {
		if c.is_ascii_alphanumeric() || c == '_' {
			slug.push(c.to_ascii_lowercase());
		} else if !slug.is_empty() && !slug.ends_with('-') {
			slug.push('-');
		}
	}
	while slug.ends_with('-') {
		slug.pop();
	}
	slug
}

/// Emptiness in the form-post sense: null, false, 0, "", "0", and empty collections.
pub fn is_empty_value(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::Bool(b) => !b,
		Value::Number(n) => n.as_f64() == Some(0.0),
		Value::String(s) => s.is_empty() || s == "0",
		Value::Array(a) => a.is_empty(),
		Value::Object(o) => o.is_empty(),
	}
}

/// Sequence index spelled by `key`, only in canonical form (`"5"`, not `"05"` or `"+5"`)
pub fn list_index(key: &str) -> Option<usize> {
	key.parse::<usize>().ok().filter(|idx| idx.to_string() == key)
}


// vim: ts=4
