//! Extension points: custom field types, sanitize filters, lifecycle listeners

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch;
use crate::field::FieldDescriptor;
use crate::notice::Notices;
use crate::prelude::*;
use crate::render::FieldRenderer;
use crate::sanitize;

/// Render and sanitize behaviour for a custom field type
pub trait FieldTypeHandler: Send + Sync {
	/// Renders the field. `value` is the stored value (or the field default).
	fn render(
		&self,
		field: &FieldDescriptor,
		value: &Value,
		renderer: &mut dyn FieldRenderer,
	) -> SkResult<()>;

	/// Cleans a posted value. Defaults to the generic cleaner.
	fn sanitize(&self, raw: Option<&Value>, _field: &FieldDescriptor) -> SkResult<Option<Value>> {
		Ok(sanitize::clean(raw))
	}
}

/// Custom field types keyed by type tag
#[derive(Default)]
pub struct TypeRegistry {
	handlers: HashMap<Box<str>, Arc<dyn FieldTypeHandler>>,
}

impl TypeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a handler for a type tag. Built-in tags cannot be overridden.
	pub fn register(&mut self, tag: &str, handler: Arc<dyn FieldTypeHandler>) -> SkResult<()> {
		if dispatch::is_builtin(tag) {
			return Err(Error::ConfigError(format!("Field type '{}' is built in", tag)));
		}
		if self.handlers.contains_key(tag) {
			return Err(Error::ConfigError(format!("Field type '{}' is already registered", tag)));
		}

		debug!("Registering field type: {}", tag);
		self.handlers.insert(tag.into(), handler);
		Ok(())
	}

	pub fn get(&self, tag: &str) -> Option<&Arc<dyn FieldTypeHandler>> {
		self.handlers.get(tag)
	}

	pub fn len(&self) -> usize {
		self.handlers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}
}

impl std::fmt::Debug for TypeRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TypeRegistry").field("types", &self.handlers.keys().collect::<Vec<_>>()).finish()
	}
}

/// Context handed to sanitize filters
#[derive(Debug, Clone, Copy)]
pub struct SanitizeArgs<'a> {
	pub field: &'a FieldDescriptor,
	/// Value as posted, before cleaning
	pub raw: Option<&'a Value>,
	/// Posted container of the field (`outer` for `outer[inner]`)
	pub container: &'a str,
}

/// Post-sanitize transform. Returning `Ok(None)` drops the field from the save;
/// returning an error aborts the whole save.
pub type SanitizeFilter = Box<
	dyn Fn(Option<Value>, &SanitizeArgs<'_>, &mut Notices) -> SkResult<Option<Value>> + Send + Sync,
>;

/// Global filters run first, then the ones registered for the field's container
#[derive(Default)]
pub struct SanitizeHooks {
	global: Vec<SanitizeFilter>,
	by_container: HashMap<String, Vec<SanitizeFilter>>,
}

impl SanitizeHooks {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_global<F>(&mut self, f: F)
	where
		F: Fn(Option<Value>, &SanitizeArgs<'_>, &mut Notices) -> SkResult<Option<Value>>
			+ Send
			+ Sync
			+ 'static,
	{
		self.global.push(Box::new(f));
	}

	pub fn add_for<F>(&mut self, container: impl Into<String>, f: F)
	where
		F: Fn(Option<Value>, &SanitizeArgs<'_>, &mut Notices) -> SkResult<Option<Value>>
			+ Send
			+ Sync
			+ 'static,
	{
		self.by_container.entry(container.into()).or_default().push(Box::new(f));
	}

	pub fn apply(
		&self,
		value: Option<Value>,
		args: &SanitizeArgs<'_>,
		notices: &mut Notices,
	) -> SkResult<Option<Value>> {
		let mut value = value;
		for filter in &self.global {
			value = filter(value, args, notices)?;
		}
		if let Some(filters) = self.by_container.get(args.container) {
			for filter in filters {
				value = filter(value, args, notices)?;
			}
		}
		Ok(value)
	}
}

impl std::fmt::Debug for SanitizeHooks {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SanitizeHooks")
			.field("global", &self.global.len())
			.field("by_container", &self.by_container.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Lifecycle notifications fired while rendering and saving
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsEvent<'a> {
	/// Settings page output begins
	PageStart { page: &'a str },
	/// A titled section with an id opened
	SectionStart { section: &'a str },
	/// A section with an id is closing, before its footer
	SectionEnd { section: &'a str },
	/// A section with an id closed, after its footer
	SectionAfter { section: &'a str },
	/// The current tab is about to be saved
	SaveTab { page: &'a str, tab: &'a str },
	/// An option was written under its own key
	OptionSaved { name: &'a str, value: &'a Value },
	/// All fields of a tab were merged into one bucket option
	BucketSaved { name: &'a str, value: &'a Value },
	/// Save finished and the saved notice was added
	Saved { page: &'a str },
}

impl SettingsEvent<'_> {
	/// Stable name of the event, used for logging and listener matching
	pub fn hook_name(&self) -> String {
		use crate::utils::slugify;
		match self {
			SettingsEvent::PageStart { page } => format!("{}_start", page),
			SettingsEvent::SectionStart { section } => format!("settings_{}", slugify(section)),
			SettingsEvent::SectionEnd { section } => format!("settings_{}_end", slugify(section)),
			SettingsEvent::SectionAfter { section } => format!("settings_{}_after", slugify(section)),
			SettingsEvent::SaveTab { page, tab } => format!("{}_save_{}", page, tab),
			SettingsEvent::OptionSaved { name, .. } => format!("save_option_{}", name),
			SettingsEvent::BucketSaved { name, .. } => format!("save_settings_{}", name),
			SettingsEvent::Saved { page } => format!("{}_saved", page),
		}
	}
}

pub type EventListener = Box<dyn Fn(&SettingsEvent<'_>) + Send + Sync>;

/// Named listeners, notified in registration order
#[derive(Default)]
pub struct Listeners {
	listeners: Vec<(Box<str>, EventListener)>,
}

impl Listeners {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add<F>(&mut self, name: impl Into<Box<str>>, f: F)
	where
		F: Fn(&SettingsEvent<'_>) + Send + Sync + 'static,
	{
		self.listeners.push((name.into(), Box::new(f)));
	}

	pub fn emit(&self, event: &SettingsEvent<'_>) {
		debug!("Event {}", event.hook_name());
		for (name, listener) in &self.listeners {
			debug!("  -> listener {}", name);
			listener(event);
		}
	}

	pub fn len(&self) -> usize {
		self.listeners.len()
	}

	pub fn is_empty(&self) -> bool {
		self.listeners.is_empty()
	}
}

impl std::fmt::Debug for Listeners {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.listeners.iter().map(|(name, _)| name)).finish()
	}
}


// vim: ts=4
