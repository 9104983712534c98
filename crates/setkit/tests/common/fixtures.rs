//! Reusable field sets

use serde_json::{json, Value};
use setkit::field::{normalize_fields, FieldDecl, FieldDescriptor};

pub fn fields(decls: Value) -> Vec<FieldDescriptor> {
	let decls: Vec<FieldDecl> = serde_json::from_value(decls).unwrap_or_default();
	normalize_fields(decls)
}

/// A general tab covering every built-in type family
pub fn general_fields() -> Vec<FieldDescriptor> {
	fields(json!([
		{ "id": "general", "type": "title", "title": "General", "desc": "Site basics" },
		{ "id": "site_title", "type": "text", "title": "Site title", "default": "My Site" },
		{ "id": "contact", "type": "email" },
		{ "id": "columns", "type": "number", "default": "3" },
		{ "id": "brand[primary]", "type": "colorpicker" },
		{ "id": "brand[accent]", "type": "colorpicker" },
		{ "id": "stripe_key", "type": "api_key" },
		{ "id": "footer", "type": "textarea" },
		{ "id": "intro", "type": "wysiwyg" },
		{ "id": "mode", "type": "radio_inline", "options": { "live": "Live", "test": "Test" } },
		{ "id": "currency", "type": "select", "options": { "usd": "USD", "eur": "EUR" } },
		{ "id": "enabled", "type": "checkbox", "cbvalue": "yes" },
		{ "id": "methods", "type": "multicheck" },
		{ "id": "general", "type": "sectionend" }
	]))
}

/// Donation levels group
pub fn levels_field() -> Vec<FieldDescriptor> {
	fields(json!([{
		"id": "levels",
		"type": "group",
		"fields": [
			{ "id": "amount", "type": "text" },
			{ "id": "note", "type": "textarea" },
			{ "id": "default", "type": "checkbox" }
		]
	}]))
}

// vim: ts=4
