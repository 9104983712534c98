//! Field type dispatch table
//!
//! Each built-in type tag maps to a `TypeSpec`: the sanitize rule used on
//! save, where the displayed value comes from, the base type it renders as
//! and a list of attribute mutations applied to the render instruction.
//! Aliases (`colorpicker` → `text`, `radio_inline` → `radio`, ...) are rows
//! in this table rather than branches in the render code.
//!
//! Tags not in the table dispatch to a handler registered on the page.

use crate::field::FieldKind;

/// How a submitted value is cleaned before it is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeRule {
	/// Absent → `""`, present → `cbvalue` or `"on"`
	Checkbox,
	/// Trim, then keep only the safe HTML subset
	Html,
	/// Row-by-row cleaning of the group's sub-fields
	Group,
	/// Trim and normalize line endings
	Generic,
}

/// Where the displayed value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
	/// Stored value as-is
	Stored,
	/// Stored value through the generic cleaner
	Cleaned,
	/// Stored value through the safe HTML filter
	SafeHtml,
}

/// Adjustment applied to a render instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrMutation {
	/// Appends `<prefix>-<suffix>` to the field's class attribute
	FieldClass(&'static str),
	/// Appends `<prefix>-<suffix>` to the wrapper's class attribute
	WrapperClass(&'static str),
	/// Renders as `password` once a non-empty value is stored
	PasswordWhenSet,
	/// Sets `rows`/`cols` from the page options
	TextareaSize,
	/// Field cell wraps a fieldset and the description moves inside it
	FieldsetCell,
	/// Field cell spans both table columns and gets `<prefix>-<suffix>`
	FullWidthCell(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
	pub tag: &'static str,
	/// Base type the field renders as, `None` to render as itself
	pub alias_of: Option<&'static str>,
	pub sanitize: SanitizeRule,
	pub value: ValueSource,
	pub mutations: &'static [AttrMutation],
}

impl TypeSpec {
	/// Type tag handed to the renderer
	pub fn render_type(&self) -> &'static str {
		self.alias_of.unwrap_or(self.tag)
	}
}

const INPUT_FIELD: &[AttrMutation] = &[AttrMutation::FieldClass("input-field")];

const fn spec(
	tag: &'static str,
	sanitize: SanitizeRule,
	value: ValueSource,
	mutations: &'static [AttrMutation],
) -> TypeSpec {
	TypeSpec { tag, alias_of: None, sanitize, value, mutations }
}

const fn alias(
	tag: &'static str,
	alias_of: &'static str,
	value: ValueSource,
	mutations: &'static [AttrMutation],
) -> TypeSpec {
	TypeSpec { tag, alias_of: Some(alias_of), sanitize: SanitizeRule::Generic, value, mutations }
}

use SanitizeRule::{Checkbox, Generic, Group, Html};
use ValueSource::{Cleaned, SafeHtml, Stored};

pub static TYPE_TABLE: &[TypeSpec] = &[
	spec("text", Generic, Cleaned, INPUT_FIELD),
	spec("email", Generic, Cleaned, INPUT_FIELD),
	spec("number", Generic, Cleaned, INPUT_FIELD),
	spec("password", Generic, Cleaned, INPUT_FIELD),
	alias(
		"colorpicker",
		"text",
		Cleaned,
		&[AttrMutation::FieldClass("colorpicker"), AttrMutation::FieldClass("input-field")],
	),
	alias(
		"api_key",
		"text",
		Stored,
		&[AttrMutation::PasswordWhenSet, AttrMutation::FieldClass("input-field")],
	),
	spec("textarea", Html, Stored, &[AttrMutation::TextareaSize]),
	spec("select", Generic, Cleaned, &[AttrMutation::FieldsetCell]),
	spec("multiselect", Generic, Cleaned, &[AttrMutation::FieldsetCell]),
	spec("radio", Generic, Cleaned, &[AttrMutation::FieldsetCell]),
	alias(
		"radio_inline",
		"radio",
		Cleaned,
		&[AttrMutation::FieldsetCell, AttrMutation::WrapperClass("radio-inline")],
	),
	spec("checkbox", Checkbox, Cleaned, &[]),
	spec("multicheck", Generic, Cleaned, &[]),
	spec("file", Generic, Cleaned, &[]),
	spec("wysiwyg", Html, SafeHtml, &[]),
	spec("give_docs_link", Generic, Cleaned, &[AttrMutation::FullWidthCell("docs-link")]),
	spec("group", Group, Stored, &[]),
];

/// Looks up the spec of a built-in data type
pub fn lookup(tag: &str) -> Option<&'static TypeSpec> {
	TYPE_TABLE.iter().find(|spec| spec.tag == tag)
}

/// Whether a tag is reserved by a built-in type or a section marker
pub fn is_builtin(tag: &str) -> bool {
	matches!(tag, "title" | "sectionend") || lookup(tag).is_some()
}

/// Result of dispatching a field kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch<'a> {
	/// Section header
	SectionStart { table_html: bool },
	/// Section footer
	SectionEnd { table_html: bool },
	/// Built-in data type
	Builtin(&'static TypeSpec),
	/// Extension type, resolved against the type registry
	Custom(&'a str),
}

pub fn dispatch(kind: &FieldKind) -> Dispatch<'_> {
	match kind {
		FieldKind::Title { table_html } => Dispatch::SectionStart { table_html: *table_html },
		FieldKind::SectionEnd { table_html } => Dispatch::SectionEnd { table_html: *table_html },
		FieldKind::Custom(tag) => Dispatch::Custom(tag),
		kind => match lookup(kind.tag()) {
			Some(spec) => Dispatch::Builtin(spec),
			None => Dispatch::Custom(kind.tag()),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_every_builtin_kind_has_a_spec() {
		for tag in [
			"text",
			"email",
			"number",
			"password",
			"colorpicker",
			"api_key",
			"textarea",
			"select",
			"multiselect",
			"radio",
			"radio_inline",
			"checkbox",
			"multicheck",
			"file",
			"wysiwyg",
			"give_docs_link",
			"group",
		] {
			let kind = FieldKind::from_tag(tag);
			assert!(
				matches!(dispatch(&kind), Dispatch::Builtin(spec) if spec.tag == tag),
				"{} should dispatch to its own spec",
				tag
			);
		}
	}

	#[test]
	fn test_aliases() {
		assert_eq!(lookup("colorpicker").unwrap().render_type(), "text");
		assert_eq!(lookup("api_key").unwrap().render_type(), "text");
		assert_eq!(lookup("radio_inline").unwrap().render_type(), "radio");
		assert_eq!(lookup("textarea").unwrap().render_type(), "textarea");
	}

	#[test]
	fn test_radio_inline_sanitizes_like_radio() {
		assert_eq!(lookup("radio_inline").unwrap().sanitize, lookup("radio").unwrap().sanitize);
	}

	#[test]
	fn test_sanitize_rules() {
		assert_eq!(lookup("checkbox").unwrap().sanitize, SanitizeRule::Checkbox);
		assert_eq!(lookup("textarea").unwrap().sanitize, SanitizeRule::Html);
		assert_eq!(lookup("wysiwyg").unwrap().sanitize, SanitizeRule::Html);
		assert_eq!(lookup("group").unwrap().sanitize, SanitizeRule::Group);
		assert_eq!(lookup("select").unwrap().sanitize, SanitizeRule::Generic);
	}

	#[test]
	fn test_section_markers_and_custom() {
		assert_eq!(
			dispatch(&FieldKind::Title { table_html: false }),
			Dispatch::SectionStart { table_html: false }
		);
		assert_eq!(
			dispatch(&FieldKind::SectionEnd { table_html: true }),
			Dispatch::SectionEnd { table_html: true }
		);
		assert_eq!(dispatch(&FieldKind::Custom("gateways".into())), Dispatch::Custom("gateways"));
		assert!(is_builtin("title"));
		assert!(is_builtin("api_key"));
		assert!(!is_builtin("gateways"));
	}
}

// vim: ts=4
