//! Per-type value cleaning applied on save

use serde_json::{Map, Value};

use crate::dispatch::{self, Dispatch, SanitizeRule};
use crate::field::{FieldDescriptor, FieldKind};
use crate::hooks::TypeRegistry;
use crate::html::HtmlSanitizer;
use crate::prelude::*;
use crate::utils::is_empty_value;

#[derive(Debug)]
pub struct Sanitizer {
	html: HtmlSanitizer,
}

impl Sanitizer {
	pub fn new() -> SkResult<Self> {
		Ok(Self { html: HtmlSanitizer::new()? })
	}

	pub fn html(&self) -> &HtmlSanitizer {
		&self.html
	}

	/// Cleans the value posted for `field`. `None` means nothing is persisted.
	pub fn sanitize(
		&self,
		field: &FieldDescriptor,
		raw: Option<&Value>,
		types: &TypeRegistry,
	) -> SkResult<Option<Value>> {
		match dispatch::dispatch(&field.kind) {
			Dispatch::SectionStart { .. } | Dispatch::SectionEnd { .. } => Ok(None),
			Dispatch::Builtin(spec) => Ok(match spec.sanitize {
				SanitizeRule::Checkbox => Some(checkbox_value(raw, checkbox_cbvalue(field))),
				SanitizeRule::Html => Some(self.clean_html(raw)),
				SanitizeRule::Group => self.sanitize_group(field, raw),
				SanitizeRule::Generic => clean(raw),
			}),
			Dispatch::Custom(tag) => match types.get(tag) {
				Some(handler) => handler.sanitize(raw, field),
				None => Ok(clean(raw)),
			},
		}
	}

	/// Trims and keeps the safe HTML subset. Absent becomes `""`.
	pub fn clean_html(&self, raw: Option<&Value>) -> Value {
		match raw {
			None | Some(Value::Null) => Value::String(String::new()),
			Some(Value::String(s)) => Value::String(self.html.sanitize(s.trim())),
			Some(Value::Array(items)) => {
				Value::Array(items.iter().map(|item| self.clean_html(Some(item))).collect())
			}
			Some(Value::Object(map)) => Value::Object(
				map.iter().map(|(k, v)| (k.clone(), self.clean_html(Some(v)))).collect(),
			),
			Some(other) => Value::String(self.html.sanitize(other.to_string().trim())),
		}
	}

	/// Row-by-row cleaning of a group's posted rows.
	///
	/// Rows posted as a mapping with numeric keys (`levels[3][..]`,
	/// `levels[10][..]`) are ordered by index. Sub-fields missing from a row
	/// are left out of that row. Rows that are not mappings become empty rows.
	fn sanitize_group(&self, field: &FieldDescriptor, raw: Option<&Value>) -> Option<Value> {
		let FieldKind::Group { fields } = &field.kind else {
			return None;
		};
		let raw = raw.filter(|v| !is_empty_value(v))?;

		let rows: Vec<&Value> = match raw {
			Value::Array(rows) => rows.iter().collect(),
			Value::Object(rows) => {
				// numeric row keys keep their numeric order, not the map's string order
				let mut keyed: Vec<(Option<u64>, &Value)> =
					rows.iter().map(|(key, row)| (key.parse::<u64>().ok(), row)).collect();
				if keyed.iter().all(|(idx, _)| idx.is_some()) {
					keyed.sort_by_key(|(idx, _)| *idx);
				}
				keyed.into_iter().map(|(_, row)| row).collect()
			}
			_ => {
				debug!("Group {} posted a scalar, ignoring", field.id);
				return None;
			}
		};

		let cleaned = rows
			.into_iter()
			.map(|row| {
				let mut out = Map::new();
				let Some(row) = row.as_object() else {
					return Value::Object(out);
				};
				for sub in fields.iter().filter(|sub| !sub.id.is_empty() && !sub.is_structural()) {
					let Some(raw) = row.get(&sub.id).filter(|v| !v.is_null()) else {
						continue;
					};
					let value = match dispatch::dispatch(&sub.kind) {
						Dispatch::Builtin(spec) if spec.sanitize == SanitizeRule::Checkbox => {
							Some(checkbox_value(Some(raw), checkbox_cbvalue(sub)))
						}
						Dispatch::Builtin(spec) if spec.sanitize == SanitizeRule::Html => {
							Some(self.clean_html(Some(raw)))
						}
						_ => clean(Some(raw)),
					};
					if let Some(value) = value {
						out.insert(sub.id.clone(), value);
					}
				}
				Value::Object(out)
			})
			.collect();

		Some(Value::Array(cleaned))
	}
}

fn checkbox_cbvalue(field: &FieldDescriptor) -> Option<&str> {
	match &field.kind {
		FieldKind::Checkbox { cbvalue } => cbvalue.as_deref(),
		_ => None,
	}
}

/// Checkbox rule: unchecked clears the value, checked stores `cbvalue` or `"on"`
pub fn checkbox_value(raw: Option<&Value>, cbvalue: Option<&str>) -> Value {
	match raw {
		None | Some(Value::Null) => Value::String(String::new()),
		Some(_) => Value::String(cbvalue.filter(|v| !v.is_empty()).unwrap_or("on").to_string()),
	}
}

/// Generic cleaner: trims strings and normalizes line endings, recursing into
/// sequences and mappings. Absent and null stay absent.
pub fn clean(raw: Option<&Value>) -> Option<Value> {
	match raw? {
		Value::Null => None,
		value => Some(clean_value(value)),
	}
}

fn clean_value(value: &Value) -> Value {
	match value {
		Value::String(s) => Value::String(s.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()),
		Value::Array(items) => Value::Array(items.iter().map(clean_value).collect()),
		Value::Object(map) => Value::Object(map.iter().map(|(k, v)| (k.clone(), clean_value(v))).collect()),
		other => other.clone(),
	}
}


// vim: ts=4
