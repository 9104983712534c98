//! Field declarations and their normalized descriptors
//!
//! `FieldDecl` is the loose, declarative shape (every attribute optional)
//! loaded from YAML/JSON or built by hand. `FieldDescriptor` is the
//! normalized form the pipeline works on: defaults filled in and the type
//! tag turned into a `FieldKind`, which carries only what each kind needs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::prelude::*;

/// Raw field declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDecl {
	pub id: Option<String>,
	#[serde(rename = "type")]
	pub field_type: Option<String>,
	pub name: Option<String>,
	pub title: Option<String>,
	pub label: Option<String>,
	pub desc: Option<String>,
	pub description: Option<String>,
	pub default: Option<Value>,
	/// Pins the displayed value instead of reading the store
	pub value: Option<Value>,
	pub class: Option<String>,
	pub css: Option<String>,
	pub attributes: Map<String, Value>,
	/// Sub-fields, `group` only
	pub fields: Vec<FieldDecl>,
	/// Value written when checked, `checkbox` only
	pub cbvalue: Option<String>,
	/// Whether section markers open/close a table, `title`/`sectionend` only
	pub table_html: Option<bool>,
	pub before_field: Option<String>,
	pub after_field: Option<String>,
	pub before_field_label: Option<String>,
	pub after_field_label: Option<String>,
	/// Everything else (`options`, `url`, ...) is passed through to the renderer
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// What a field is, with the attributes only that kind uses
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
	Title { table_html: bool },
	SectionEnd { table_html: bool },
	Text,
	Email,
	Number,
	Password,
	Colorpicker,
	ApiKey,
	Textarea,
	Select,
	Multiselect,
	Radio,
	RadioInline,
	Checkbox { cbvalue: Option<String> },
	Multicheck,
	File,
	Wysiwyg,
	DocsLink,
	Group { fields: Vec<FieldDescriptor> },
	/// Type tag handled by a registered extension
	Custom(Box<str>),
}

impl FieldKind {
	/// Kind for a type tag, with kind-specific attributes at their defaults
	pub fn from_tag(tag: &str) -> Self {
		match tag {
			"title" => FieldKind::Title { table_html: true },
			"sectionend" => FieldKind::SectionEnd { table_html: true },
			"text" => FieldKind::Text,
			"email" => FieldKind::Email,
			"number" => FieldKind::Number,
			"password" => FieldKind::Password,
			"colorpicker" => FieldKind::Colorpicker,
			"api_key" => FieldKind::ApiKey,
			"textarea" => FieldKind::Textarea,
			"select" => FieldKind::Select,
			"multiselect" => FieldKind::Multiselect,
			"radio" => FieldKind::Radio,
			"radio_inline" => FieldKind::RadioInline,
			"checkbox" => FieldKind::Checkbox { cbvalue: None },
			"multicheck" => FieldKind::Multicheck,
			"file" => FieldKind::File,
			"wysiwyg" => FieldKind::Wysiwyg,
			"give_docs_link" => FieldKind::DocsLink,
			"group" => FieldKind::Group { fields: Vec::new() },
			other => FieldKind::Custom(other.into()),
		}
	}

	pub fn tag(&self) -> &str {
		match self {
			FieldKind::Title { .. } => "title",
			FieldKind::SectionEnd { .. } => "sectionend",
			FieldKind::Text => "text",
			FieldKind::Email => "email",
			FieldKind::Number => "number",
			FieldKind::Password => "password",
			FieldKind::Colorpicker => "colorpicker",
			FieldKind::ApiKey => "api_key",
			FieldKind::Textarea => "textarea",
			FieldKind::Select => "select",
			FieldKind::Multiselect => "multiselect",
			FieldKind::Radio => "radio",
			FieldKind::RadioInline => "radio_inline",
			FieldKind::Checkbox { .. } => "checkbox",
			FieldKind::Multicheck => "multicheck",
			FieldKind::File => "file",
			FieldKind::Wysiwyg => "wysiwyg",
			FieldKind::DocsLink => "give_docs_link",
			FieldKind::Group { .. } => "group",
			FieldKind::Custom(tag) => tag,
		}
	}

	/// Section markers carry no data and are never saved
	pub fn is_structural(&self) -> bool {
		matches!(self, FieldKind::Title { .. } | FieldKind::SectionEnd { .. })
	}
}

/// Normalized field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
	/// Empty when the declaration had no id; such fields render but never save
	pub id: String,
	pub kind: FieldKind,
	pub name: String,
	pub title: String,
	pub label: String,
	pub desc: String,
	pub default: Value,
	pub value: Option<Value>,
	pub class: String,
	pub css: String,
	pub attributes: Map<String, Value>,
	pub before_field: String,
	pub after_field: String,
	pub before_label: String,
	pub after_label: String,
	pub extra: Map<String, Value>,
}

impl FieldDescriptor {
	/// Field with every optional attribute at its default
	pub fn new(id: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			id: id.into(),
			kind,
			name: String::new(),
			title: String::new(),
			label: String::new(),
			desc: String::new(),
			default: Value::String(String::new()),
			value: None,
			class: String::new(),
			css: String::new(),
			attributes: Map::new(),
			before_field: String::new(),
			after_field: String::new(),
			before_label: String::new(),
			after_label: String::new(),
			extra: Map::new(),
		}
	}

	/// Normalizes a declaration. Declarations without a type yield `None`.
	pub fn normalize(decl: FieldDecl) -> Option<Self> {
		let tag = decl.field_type?;

		let kind = match FieldKind::from_tag(&tag) {
			FieldKind::Title { .. } => FieldKind::Title { table_html: decl.table_html.unwrap_or(true) },
			FieldKind::SectionEnd { .. } => {
				FieldKind::SectionEnd { table_html: decl.table_html.unwrap_or(true) }
			}
			FieldKind::Checkbox { .. } => {
				FieldKind::Checkbox { cbvalue: decl.cbvalue.filter(|v| !v.is_empty()) }
			}
			FieldKind::Group { .. } => FieldKind::Group { fields: normalize_fields(decl.fields) },
			kind => kind,
		};

		// `description` wins over `desc` when both are given
		let desc = decl.description.filter(|d| !d.is_empty()).or(decl.desc).unwrap_or_default();

		Some(Self {
			id: decl.id.unwrap_or_default(),
			kind,
			name: decl.name.unwrap_or_default(),
			title: decl.title.unwrap_or_default(),
			label: decl.label.unwrap_or_default(),
			desc,
			default: decl.default.unwrap_or_else(|| Value::String(String::new())),
			value: decl.value,
			class: decl.class.unwrap_or_default(),
			css: decl.css.unwrap_or_default(),
			attributes: decl.attributes,
			before_field: decl.before_field.unwrap_or_default(),
			after_field: decl.after_field.unwrap_or_default(),
			before_label: decl.before_field_label.unwrap_or_default(),
			after_label: decl.after_field_label.unwrap_or_default(),
			extra: decl.extra,
		})
	}

	pub fn tag(&self) -> &str {
		self.kind.tag()
	}

	pub fn is_structural(&self) -> bool {
		self.kind.is_structural()
	}

	/// Display title: `title`, else `name` for fields with an id; `label` otherwise
	pub fn display_title(&self) -> &str {
		if self.id.is_empty() {
			&self.label
		} else if self.title.is_empty() {
			&self.name
		} else {
			&self.title
		}
	}

	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}

	pub fn desc(mut self, desc: impl Into<String>) -> Self {
		self.desc = desc.into();
		self
	}

	pub fn default(mut self, default: Value) -> Self {
		self.default = default;
		self
	}

	pub fn class(mut self, class: impl Into<String>) -> Self {
		self.class = class.into();
		self
	}

	pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	/// Passes an extra renderer attribute through (`options`, `url`, ...)
	pub fn extra(mut self, name: impl Into<String>, value: Value) -> Self {
		self.extra.insert(name.into(), value);
		self
	}
}

/// Normalizes a field list, silently dropping declarations without a type
pub fn normalize_fields(decls: Vec<FieldDecl>) -> Vec<FieldDescriptor> {
	decls
		.into_iter()
		.filter_map(|decl| {
			let id = decl.id.clone();
			let field = FieldDescriptor::normalize(decl);
			if field.is_none() {
				debug!("Skipping field without type: {:?}", id);
			}
			field
		})
		.collect()
}


// vim: ts=4
