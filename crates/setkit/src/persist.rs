//! Save path: extract, sanitize, stage and write submitted values
//!
//! Every field is resolved twice: the posted address (`resolve(id, "")`)
//! is where the value is read from the submission, the stored address is
//! where it ends up. A bracketed id (`outer[inner]`) is read-modify-written
//! into `outer`, keeping the sibling keys already stored there. Plain ids
//! are written under their own key, or merged into the bucket option when
//! one is given.
//!
//! All values are sanitized and staged before the first write, so a failing
//! sanitizer or hook aborts the save with nothing persisted.

use serde_json::{Map, Value};

use crate::field::FieldDescriptor;
use crate::hooks::{Listeners, SanitizeArgs, SanitizeHooks, SettingsEvent, TypeRegistry};
use crate::notice::Notices;
use crate::option_key::resolve;
use crate::prelude::*;
use crate::sanitize::Sanitizer;
use crate::submitted::SubmittedFieldSet;
use setkit_types::store_adapter::OptionStore;

#[derive(Debug, Clone, Copy)]
pub struct SettingsPersistor<'a> {
	pub store: &'a dyn OptionStore,
	pub sanitizer: &'a Sanitizer,
	pub types: &'a TypeRegistry,
	pub hooks: &'a SanitizeHooks,
	pub listeners: &'a Listeners,
}

/// Containers to write, in first-touched order
#[derive(Debug, Default)]
struct Staging {
	containers: Vec<(String, Value)>,
}

impl Staging {
	fn slot(&mut self, container: &str, store: &dyn OptionStore) -> SkResult<&mut Map<String, Value>> {
		let pos = match self.containers.iter().position(|(name, _)| name == container) {
			Some(pos) => pos,
			None => {
				let current = store.get(container, Value::Object(Map::new()))?;
				self.containers.push((container.to_string(), current));
				self.containers.len() - 1
			}
		};

		// a stored sequence is addressed by index, anything else starts over
		let value = &mut self.containers[pos].1;
		let replacement = match value {
			Value::Object(_) => None,
			Value::Array(items) => Some(
				std::mem::take(items).into_iter().enumerate().map(|(idx, v)| (idx.to_string(), v)).collect(),
			),
			_ => Some(Map::new()),
		};
		if let Some(map) = replacement {
			*value = Value::Object(map);
		}
		match value {
			Value::Object(map) => Ok(map),
			_ => Err(Error::Internal(format!("staged container {} is not a mapping", container))),
		}
	}

	fn replace(&mut self, container: &str, value: Value) {
		match self.containers.iter_mut().find(|(name, _)| name == container) {
			Some(entry) => entry.1 = value,
			None => self.containers.push((container.to_string(), value)),
		}
	}
}

impl SettingsPersistor<'_> {
	/// Saves `fields` from `submitted`.
	///
	/// Returns `Ok(false)` without touching the store when nothing was submitted.
	///
	/// With a bucket `option_name`, plain ids are merged into the bucket while
	/// bracketed ids (`outer[inner]`) are still written into their own `outer`
	/// option. One bucket save can therefore update several store keys, each
	/// with its own `OptionSaved` event before the final `BucketSaved`.
	pub fn save_fields(
		&self,
		fields: &[FieldDescriptor],
		submitted: &SubmittedFieldSet,
		option_name: Option<&str>,
		notices: &mut Notices,
	) -> SkResult<bool> {
		if submitted.is_empty() {
			debug!("Empty submission, nothing to save");
			return Ok(false);
		}
		let bucket_name = option_name.filter(|name| !name.is_empty());

		let mut staging = Staging::default();
		let mut bucket = Map::new();

		for field in fields {
			if field.id.is_empty() || field.is_structural() {
				continue;
			}

			let posted = resolve(&field.id, "");
			let raw = submitted.value_at(&posted);
			let value = self.sanitizer.sanitize(field, raw, self.types)?;

			let args = SanitizeArgs { field, raw, container: &posted.container };
			let Some(value) = self.hooks.apply(value, &args, notices)? else {
				debug!("Field {} sanitized to nothing, skipped", field.id);
				continue;
			};

			match (&posted.subkey, bucket_name) {
				(Some(subkey), _) => {
					staging.slot(&posted.container, self.store)?.insert(subkey.clone(), value);
				}
				(None, Some(_)) => {
					bucket.insert(posted.container.clone(), value);
				}
				(None, None) => staging.replace(&posted.container, value),
			}
		}

		for (name, value) in &staging.containers {
			self.store.update_option(name, value.clone())?;
			info!("Saved option {}", name);
			self.listeners.emit(&SettingsEvent::OptionSaved { name, value });
		}

		if let Some(name) = bucket_name.filter(|_| !bucket.is_empty()) {
			let mut merged = match self.store.read_option(name)? {
				Some(Value::Object(old)) => old,
				_ => Map::new(),
			};
			merged.extend(bucket);
			let merged = Value::Object(merged);

			self.store.update_option(name, merged.clone())?;
			info!("Saved settings bucket {}", name);
			self.listeners.emit(&SettingsEvent::BucketSaved { name, value: &merged });
		}

		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::field::FieldKind;
	use serde_json::json;
	use std::collections::HashMap;
	use std::sync::Mutex;

	#[derive(Debug, Default)]
	struct MapStore {
		options: Mutex<HashMap<String, Value>>,
		writes: Mutex<Vec<String>>,
	}

	impl OptionStore for MapStore {
		fn read_option(&self, key: &str) -> SkResult<Option<Value>> {
			Ok(self.options.lock().unwrap().get(key).cloned())
		}

		fn update_option(&self, key: &str, value: Value) -> SkResult<()> {
			self.writes.lock().unwrap().push(key.into());
			self.options.lock().unwrap().insert(key.into(), value);
			Ok(())
		}
	}

	struct Fixture {
		store: MapStore,
		sanitizer: Sanitizer,
		types: TypeRegistry,
		hooks: SanitizeHooks,
		listeners: Listeners,
	}

	impl Fixture {
		fn new() -> Self {
			Self {
				store: MapStore::default(),
				sanitizer: Sanitizer::new().unwrap(),
				types: TypeRegistry::new(),
				hooks: SanitizeHooks::new(),
				listeners: Listeners::new(),
			}
		}

		fn save(&self, fields: &[FieldDescriptor], submitted: Value, option_name: Option<&str>) -> bool {
			let persistor = SettingsPersistor {
				store: &self.store,
				sanitizer: &self.sanitizer,
				types: &self.types,
				hooks: &self.hooks,
				listeners: &self.listeners,
			};
			let submitted: SubmittedFieldSet = serde_json::from_value(submitted).unwrap();
			persistor
				.save_fields(fields, &submitted, option_name, &mut Notices::new())
				.unwrap()
		}

		fn stored(&self, key: &str) -> Option<Value> {
			self.store.read_option(key).unwrap()
		}
	}

	#[test]
	fn test_empty_submission_writes_nothing() {
		let fx = Fixture::new();
		let fields = [FieldDescriptor::new("a", FieldKind::Checkbox { cbvalue: None })];
		assert!(!fx.save(&fields, json!({}), None));
		assert!(fx.store.writes.lock().unwrap().is_empty());
	}

	#[test]
	fn test_own_key_and_subkey_merge() {
		let fx = Fixture::new();
		fx.store.update_option("b", json!({ "keep": 1, "c": "old" })).unwrap();

		let fields =
			[FieldDescriptor::new("a", FieldKind::Text), FieldDescriptor::new("b[c]", FieldKind::Text)];
		assert!(fx.save(&fields, json!({ "a": " one ", "b": { "c": "two" } }), None));

		assert_eq!(fx.stored("a"), Some(json!("one")));
		assert_eq!(fx.stored("b"), Some(json!({ "keep": 1, "c": "two" })));
	}

	#[test]
	fn test_subkeys_share_one_write() {
		let fx = Fixture::new();
		let fields = [
			FieldDescriptor::new("colors[primary]", FieldKind::Colorpicker),
			FieldDescriptor::new("colors[accent]", FieldKind::Colorpicker),
		];
		fx.save(&fields, json!({ "colors": { "primary": "#fff", "accent": "#000" } }), None);

		assert_eq!(fx.stored("colors"), Some(json!({ "primary": "#fff", "accent": "#000" })));
		assert_eq!(*fx.store.writes.lock().unwrap(), vec!["colors".to_string()]);
	}

	#[test]
	fn test_scalar_container_replaced_by_mapping() {
		let fx = Fixture::new();
		fx.store.update_option("b", json!("scalar")).unwrap();
		fx.save(&[FieldDescriptor::new("b[c]", FieldKind::Text)], json!({ "b": { "c": "x" } }), None);
		assert_eq!(fx.stored("b"), Some(json!({ "c": "x" })));
	}

	#[test]
	fn test_numeric_subkey_into_stored_sequence() {
		let fx = Fixture::new();
		fx.store.update_option("slots", json!(["a", "b"])).unwrap();

		let fields = [FieldDescriptor::new("slots[1]", FieldKind::Text)];
		assert!(fx.save(&fields, json!({ "slots": { "1": " z " } }), None));
		assert_eq!(fx.stored("slots"), Some(json!({ "0": "a", "1": "z" })));
	}

	#[test]
	fn test_bucket_mode() {
		let fx = Fixture::new();
		fx.store.update_option("bucket", json!({ "old": "kept", "a": "before" })).unwrap();

		let fields = [
			FieldDescriptor::new("a", FieldKind::Text),
			FieldDescriptor::new("b", FieldKind::Checkbox { cbvalue: None }),
			FieldDescriptor::new("own[key]", FieldKind::Text),
		];
		fx.save(&fields, json!({ "a": "after", "own": { "key": "v" } }), Some("bucket"));

		assert_eq!(fx.stored("bucket"), Some(json!({ "old": "kept", "a": "after", "b": "" })));
		assert_eq!(fx.stored("own"), Some(json!({ "key": "v" })));
		assert_eq!(fx.stored("a"), None);
	}

	#[test]
	fn test_absent_values_skipped() {
		let fx = Fixture::new();
		fx.store.update_option("untouched", json!("stays")).unwrap();
		let fields = [
			FieldDescriptor::new("untouched", FieldKind::Text),
			FieldDescriptor::new("", FieldKind::Text),
			FieldDescriptor::new("section", FieldKind::Title { table_html: true }),
			FieldDescriptor::new("posted", FieldKind::Text),
		];
		fx.save(&fields, json!({ "posted": "x", "section": "y" }), None);

		assert_eq!(fx.stored("untouched"), Some(json!("stays")));
		assert_eq!(fx.stored("section"), None);
		assert_eq!(*fx.store.writes.lock().unwrap(), vec!["untouched".to_string(), "posted".to_string()]);
	}

	#[test]
	fn test_hook_error_aborts_before_writes() {
		let mut fx = Fixture::new();
		fx.hooks.add_for("b", |_, _, _| Err(Error::ValidationError("bad".into())));

		let persistor = SettingsPersistor {
			store: &fx.store,
			sanitizer: &fx.sanitizer,
			types: &fx.types,
			hooks: &fx.hooks,
			listeners: &fx.listeners,
		};
		let fields = [FieldDescriptor::new("a", FieldKind::Text), FieldDescriptor::new("b", FieldKind::Text)];
		let submitted = SubmittedFieldSet::from_pairs([("a", "1"), ("b", "2")]);
		let result = persistor.save_fields(&fields, &submitted, None, &mut Notices::new());

		assert!(matches!(result, Err(Error::ValidationError(_))));
		assert!(fx.store.writes.lock().unwrap().is_empty());
	}
}

// vim: ts=4
