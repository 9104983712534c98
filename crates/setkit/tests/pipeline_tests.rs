//! Render/save pipeline tests
//!
//! Exercises the field pipeline end to end through a `SettingsPage` backed
//! by the JSON option store.

#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use common::fixtures::{fields, general_fields, levels_field};
use common::{setup_test_logging, RecordingStore};
use serde_json::{json, Value};
use setkit::option_key::resolve;
use setkit::prelude::*;
use setkit::{RenderPlan, SubmittedFieldSet};

fn page(store: &Arc<RecordingStore>) -> SettingsPage {
	setup_test_logging();
	let mut builder = SettingsPage::builder();
	builder.store(store.clone());
	builder.build().expect("page should build")
}

/// Form pairs a browser would post back for a rendered plan
fn resubmission(plan: &RenderPlan) -> SubmittedFieldSet {
	let mut pairs: Vec<(String, String)> = Vec::new();
	for field in plan.fields() {
		match &field.value {
			Value::String(s) if field.render_type == "checkbox" && s.is_empty() => {}
			Value::String(s) => pairs.push((field.id.clone(), s.clone())),
			Value::Array(items) => {
				for item in items {
					pairs.push((format!("{}[]", field.id), item.as_str().unwrap_or_default().to_string()));
				}
			}
			other => pairs.push((field.id.clone(), other.to_string())),
		}
	}
	SubmittedFieldSet::from_pairs(pairs)
}

#[test]
fn test_field_without_type_is_absent() {
	let store = Arc::new(RecordingStore::new());
	let mut page = page(&store);
	let fields = fields(json!([
		{ "id": "ghost", "default": "x" },
		{ "id": "real", "type": "text" }
	]));
	assert_eq!(fields.len(), 1);

	let mut plan = RenderPlan::new();
	page.render_fields(&fields, "", &mut plan).unwrap();
	assert_eq!(plan.ops().len(), 1);

	let submitted = SubmittedFieldSet::from_pairs([("ghost", "boo"), ("real", "value")]);
	page.save_fields(&fields, &submitted, None).unwrap();

	assert_eq!(store.writes(), vec!["real".to_string()]);
	assert_eq!(store.value("ghost"), None);
	assert!(page.notices().is_empty());
}

#[test]
fn test_render_then_resubmit_is_idempotent() {
	let store = Arc::new(RecordingStore::new());
	store.seed("site_title", json!("Hello"));
	store.seed("contact", json!("admin@example.com"));
	store.seed("columns", json!("4"));
	store.seed("brand", json!({ "primary": "#ffffff", "accent": "#000000" }));
	store.seed("stripe_key", json!("sk_test_123"));
	store.seed("footer", json!("<p>Thanks for <strong>giving</strong></p>"));
	store.seed("intro", json!("<p>Welcome</p>"));
	store.seed("mode", json!("live"));
	store.seed("currency", json!("eur"));
	store.seed("enabled", json!("yes"));
	store.seed("methods", json!(["card", "paypal"]));

	let keys = [
		"site_title", "contact", "columns", "brand", "stripe_key", "footer", "intro", "mode", "currency",
		"enabled", "methods",
	];
	let before: Vec<_> = keys.iter().map(|key| store.value(key)).collect();

	let mut page = page(&store);
	let fields = general_fields();
	let mut plan = RenderPlan::new();
	page.render_fields(&fields, "", &mut plan).unwrap();

	let submitted = resubmission(&plan);
	assert!(page.save_fields(&fields, &submitted, None).unwrap());

	let after: Vec<_> = keys.iter().map(|key| store.value(key)).collect();
	assert_eq!(before, after);
	assert!(!store.writes().is_empty());
}

#[test]
fn test_resolve_examples() {
	let parent = resolve("parent[child]", "");
	assert_eq!((parent.container.as_str(), parent.subkey.as_deref()), ("parent", Some("child")));

	let solo = resolve("solo", "");
	assert_eq!((solo.container.as_str(), solo.subkey.as_deref()), ("solo", None));

	let bucket = resolve("solo", "bucket");
	assert_eq!((bucket.container.as_str(), bucket.subkey.as_deref()), ("bucket", Some("solo")));
}

#[test]
fn test_checkbox_save() {
	let store = Arc::new(RecordingStore::new());
	store.seed("plain", json!("on"));
	let mut page = page(&store);
	let fields = fields(json!([
		{ "id": "plain", "type": "checkbox" },
		{ "id": "with_value", "type": "checkbox", "cbvalue": "yes" },
		{ "id": "no_value", "type": "checkbox" }
	]));

	let submitted = SubmittedFieldSet::from_pairs([("with_value", "1"), ("no_value", "1")]);
	page.save_fields(&fields, &submitted, None).unwrap();

	assert_eq!(store.value("plain"), Some(json!("")));
	assert_eq!(store.value("with_value"), Some(json!("yes")));
	assert_eq!(store.value("no_value"), Some(json!("on")));
}

#[test]
fn test_group_save() {
	let store = Arc::new(RecordingStore::new());
	let mut page = page(&store);

	let submitted = SubmittedFieldSet::from_pairs([
		("levels[0][amount]", " 10 "),
		("levels[0][note]", "  <script>x</script>hi  "),
		("levels[0][default]", "1"),
		("levels[1][amount]", "25"),
	]);
	page.save_fields(&levels_field(), &submitted, None).unwrap();

	let stored = store.value("levels").unwrap();
	let rows = stored.as_array().unwrap();
	assert_eq!(rows.len(), 2);
	assert_eq!(rows[0], json!({ "amount": "10", "note": "hi", "default": "on" }));
	assert_eq!(rows[1], json!({ "amount": "25" }));
}

#[test]
fn test_group_rows_replaced_wholesale() {
	let store = Arc::new(RecordingStore::new());
	store.seed("levels", json!([{ "amount": "1" }, { "amount": "2" }, { "amount": "3" }]));
	let mut page = page(&store);

	let submitted = SubmittedFieldSet::from_pairs([("levels[0][amount]", "9")]);
	page.save_fields(&levels_field(), &submitted, None).unwrap();
	assert_eq!(store.value("levels"), Some(json!([{ "amount": "9" }])));
}

#[test]
fn test_own_key_and_subkey_merge() {
	let store = Arc::new(RecordingStore::new());
	store.seed("b", json!({ "sibling": "kept", "c": "old" }));
	let mut page = page(&store);
	let fields = fields(json!([
		{ "id": "a", "type": "text" },
		{ "id": "b[c]", "type": "text" }
	]));

	let submitted = SubmittedFieldSet::from_urlencoded("a=first&b%5Bc%5D=second").unwrap();
	page.save_fields(&fields, &submitted, None).unwrap();

	assert_eq!(store.value("a"), Some(json!("first")));
	assert_eq!(store.value("b"), Some(json!({ "sibling": "kept", "c": "second" })));
}

#[test]
fn test_notice_same_code_overwrites() {
	let store = Arc::new(RecordingStore::new());
	let mut page = page(&store);
	page.notices_mut().add_message("x", "first");
	page.notices_mut().add_message("x", "second");

	let notices = page.flush_notices();
	assert_eq!(notices.len(), 1);
	assert_eq!(notices[0].code, "x");
	assert_eq!(notices[0].message, "second");
}

#[test]
fn test_empty_submission_fails_without_writes() {
	let store = Arc::new(RecordingStore::new());
	let mut page = page(&store);

	let saved = page.save_fields(&general_fields(), &SubmittedFieldSet::new(), None).unwrap();
	assert!(!saved);
	assert!(store.writes().is_empty());
}

// vim: ts=4
