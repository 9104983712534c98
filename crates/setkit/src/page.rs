//! Settings page context
//!
//! `SettingsPage` owns everything one request works with: the option store,
//! the registered field types, sanitize hooks and lifecycle listeners, the
//! request's notices and the page's tabs. Nothing is process-global; a host
//! builds one page per request (or clones the parts it shares).

use serde_json::Value;
use std::sync::Arc;

use crate::config::{PageDecl, SettingsOpts, TabDecl};
use crate::field::{normalize_fields, FieldDescriptor};
use crate::hooks::{
	FieldTypeHandler, Listeners, SanitizeArgs, SanitizeHooks, SettingsEvent, TypeRegistry,
};
use crate::notice::{Notice, Notices};
use crate::option_key;
use crate::persist::SettingsPersistor;
use crate::prelude::*;
use crate::render::{FieldRenderer, RenderContext};
use crate::sanitize::Sanitizer;
use crate::submitted::SubmittedFieldSet;
use setkit_types::store_adapter::OptionStore;

/// One tab: a field set saved per field, or into a bucket option
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsTab {
	pub id: String,
	pub label: String,
	pub option_name: Option<String>,
	pub fields: Vec<FieldDescriptor>,
}

impl SettingsTab {
	pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self { id: id.into(), label: label.into(), option_name: None, fields: Vec::new() }
	}

	pub fn option_name(mut self, option_name: impl Into<String>) -> Self {
		self.option_name = Some(option_name.into());
		self
	}

	pub fn field(mut self, field: FieldDescriptor) -> Self {
		self.fields.push(field);
		self
	}

	pub fn fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
		self.fields.extend(fields);
		self
	}
}

impl From<TabDecl> for SettingsTab {
	fn from(decl: TabDecl) -> Self {
		Self {
			id: decl.id,
			label: decl.label,
			option_name: decl.option_name.filter(|name| !name.is_empty()),
			fields: normalize_fields(decl.fields),
		}
	}
}

/// A submitted save request
#[derive(Debug, Clone, Default)]
pub struct SaveRequest {
	pub submitted: SubmittedFieldSet,
	/// Whether the host verified the request's anti-forgery token
	pub verified: bool,
}

impl SaveRequest {
	pub fn verified(submitted: SubmittedFieldSet) -> Self {
		Self { submitted, verified: true }
	}
}

/// Stages of a save, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStage {
	Idle,
	ValidatingRequest,
	DispatchSectionSave,
	Persist,
	Notify,
	DispatchSaved,
}

pub struct SettingsPage {
	opts: SettingsOpts,
	store: Arc<dyn OptionStore>,
	sanitizer: Sanitizer,
	types: TypeRegistry,
	hooks: SanitizeHooks,
	listeners: Listeners,
	notices: Notices,
	tabs: Vec<SettingsTab>,
	current_tab: Option<usize>,
}

impl std::fmt::Debug for SettingsPage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SettingsPage")
			.field("page", &self.opts.page)
			.field("types", &self.types)
			.field("listeners", &self.listeners)
			.field("tabs", &self.tabs.iter().map(|tab| &tab.id).collect::<Vec<_>>())
			.field("current_tab", &self.current_tab().map(|tab| &tab.id))
			.finish_non_exhaustive()
	}
}

impl SettingsPage {
	pub fn builder() -> SettingsPageBuilder {
		SettingsPageBuilder::new()
	}

	pub fn opts(&self) -> &SettingsOpts {
		&self.opts
	}

	pub fn store(&self) -> &Arc<dyn OptionStore> {
		&self.store
	}

	pub fn tabs(&self) -> &[SettingsTab] {
		&self.tabs
	}

	pub fn current_tab(&self) -> Option<&SettingsTab> {
		self.current_tab.and_then(|idx| self.tabs.get(idx))
	}

	pub fn set_current_tab(&mut self, id: &str) -> SkResult<()> {
		let idx = self
			.tabs
			.iter()
			.position(|tab| tab.id == id)
			.ok_or_else(|| Error::ConfigError(format!("Unknown settings tab: {}", id)))?;
		self.current_tab = Some(idx);
		Ok(())
	}

	pub fn notices(&self) -> &Notices {
		&self.notices
	}

	pub fn notices_mut(&mut self) -> &mut Notices {
		&mut self.notices
	}

	/// Filtered notices of this request, errors first
	pub fn flush_notices(&self) -> Vec<Notice> {
		self.notices.flush()
	}

	/// Reads a setting the way the render path does
	pub fn get_option(&self, option_name: &str, field_id: &str, default: Value) -> SkResult<Value> {
		option_key::get_option(self.store.as_ref(), option_name, field_id, default)
	}

	fn render_context<'a>(&'a self, tab: &'a str) -> RenderContext<'a> {
		RenderContext {
			store: self.store.as_ref(),
			opts: &self.opts,
			sanitizer: &self.sanitizer,
			types: &self.types,
			listeners: &self.listeners,
			tab,
		}
	}

	/// Renders a field list outside of any tab
	pub fn render_fields(
		&self,
		fields: &[FieldDescriptor],
		option_name: &str,
		renderer: &mut dyn FieldRenderer,
	) -> SkResult<()> {
		let tab = self.current_tab().map_or("", |tab| tab.id.as_str());
		self.render_context(tab).render_fields(fields, option_name, renderer)
	}

	/// Saves a field list directly, without request verification or page events.
	///
	/// In bucket mode bracketed ids still go to their own option, so more than
	/// one store key may be written.
	pub fn save_fields(
		&mut self,
		fields: &[FieldDescriptor],
		submitted: &SubmittedFieldSet,
		option_name: Option<&str>,
	) -> SkResult<bool> {
		let persistor = SettingsPersistor {
			store: self.store.as_ref(),
			sanitizer: &self.sanitizer,
			types: &self.types,
			hooks: &self.hooks,
			listeners: &self.listeners,
		};
		persistor.save_fields(fields, submitted, option_name, &mut self.notices)
	}

	/// Saves the current tab from a request.
	///
	/// An unverified request fails with `Error::RequestRejected` before any
	/// event fires or anything is written.
	pub fn save(&mut self, request: &SaveRequest) -> SkResult<bool> {
		let _span = debug_span!("save", page = %self.opts.page).entered();
		let mut stage = SaveStage::Idle;
		debug!(?stage, "save");

		let idx = self.current_tab.ok_or_else(|| Error::ConfigError("No settings tab selected".into()))?;

		stage = SaveStage::ValidatingRequest;
		debug!(?stage, "save");
		if !request.verified {
			warn!("Rejected unverified save request for page {}", self.opts.page);
			return Err(Error::RequestRejected(self.opts.rejected_text.clone()));
		}

		let Self { opts, store, sanitizer, types, hooks, listeners, notices, tabs, .. } = self;
		let tab = tabs.get(idx).ok_or_else(|| Error::Internal(format!("tab index {} out of range", idx)))?;

		stage = SaveStage::DispatchSectionSave;
		debug!(?stage, tab = %tab.id, "save");
		listeners.emit(&SettingsEvent::SaveTab { page: &opts.page, tab: &tab.id });

		stage = SaveStage::Persist;
		debug!(?stage, "save");
		let persistor = SettingsPersistor {
			store: store.as_ref(),
			sanitizer,
			types,
			hooks,
			listeners,
		};
		let saved =
			persistor.save_fields(&tab.fields, &request.submitted, tab.option_name.as_deref(), notices)?;

		stage = SaveStage::Notify;
		debug!(?stage, saved, "save");
		notices.add_message(opts.saved_notice_code.clone(), opts.saved_notice_text.clone());

		stage = SaveStage::DispatchSaved;
		debug!(?stage, "save");
		listeners.emit(&SettingsEvent::Saved { page: &opts.page });

		Ok(saved)
	}

	/// Page output: start event, save on a non-empty request, then the current tab's fields
	pub fn output(
		&mut self,
		request: Option<&SaveRequest>,
		renderer: &mut dyn FieldRenderer,
	) -> SkResult<()> {
		self.listeners.emit(&SettingsEvent::PageStart { page: &self.opts.page });

		if let Some(request) = request.filter(|request| !request.submitted.is_empty()) {
			self.save(request)?;
		}

		let Some(tab) = self.current_tab() else {
			debug!("No current tab, nothing to render");
			return Ok(());
		};
		let option_name = tab.option_name.as_deref().unwrap_or_default();
		self.render_context(&tab.id).render_fields(&tab.fields, option_name, renderer)
	}
}

/// Fluent constructor of a `SettingsPage`
#[derive(Default)]
pub struct SettingsPageBuilder {
	opts: SettingsOpts,
	store: Option<Arc<dyn OptionStore>>,
	field_types: Vec<(Box<str>, Arc<dyn FieldTypeHandler>)>,
	hooks: SanitizeHooks,
	listeners: Listeners,
	notices: Notices,
	tabs: Vec<SettingsTab>,
	current_tab: Option<String>,
}

impl SettingsPageBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder preloaded with a declarative page definition
	pub fn from_decl(decl: PageDecl) -> Self {
		let mut builder = Self::new();
		builder.opts(decl.options);
		for tab in decl.tabs {
			builder.tab(tab.into());
		}
		builder
	}

	pub fn opts(&mut self, opts: SettingsOpts) -> &mut Self {
		self.opts = opts;
		self
	}

	pub fn store(&mut self, store: Arc<dyn OptionStore>) -> &mut Self {
		self.store = Some(store);
		self
	}

	pub fn field_type(&mut self, tag: impl Into<Box<str>>, handler: Arc<dyn FieldTypeHandler>) -> &mut Self {
		self.field_types.push((tag.into(), handler));
		self
	}

	/// Sanitize filter run for every field
	pub fn sanitize_filter<F>(&mut self, f: F) -> &mut Self
	where
		F: Fn(Option<Value>, &SanitizeArgs<'_>, &mut Notices) -> SkResult<Option<Value>>
			+ Send
			+ Sync
			+ 'static,
	{
		self.hooks.add_global(f);
		self
	}

	/// Sanitize filter run for fields posted under `container`
	pub fn sanitize_filter_for<F>(&mut self, container: impl Into<String>, f: F) -> &mut Self
	where
		F: Fn(Option<Value>, &SanitizeArgs<'_>, &mut Notices) -> SkResult<Option<Value>>
			+ Send
			+ Sync
			+ 'static,
	{
		self.hooks.add_for(container, f);
		self
	}

	pub fn listener<F>(&mut self, name: impl Into<Box<str>>, f: F) -> &mut Self
	where
		F: Fn(&SettingsEvent<'_>) + Send + Sync + 'static,
	{
		self.listeners.add(name, f);
		self
	}

	pub fn error_filter<F>(&mut self, f: F) -> &mut Self
	where
		F: Fn(Vec<Notice>) -> Vec<Notice> + Send + Sync + 'static,
	{
		self.notices.add_error_filter(f);
		self
	}

	pub fn message_filter<F>(&mut self, f: F) -> &mut Self
	where
		F: Fn(Vec<Notice>) -> Vec<Notice> + Send + Sync + 'static,
	{
		self.notices.add_message_filter(f);
		self
	}

	pub fn tab(&mut self, tab: SettingsTab) -> &mut Self {
		self.tabs.push(tab);
		self
	}

	/// Selects the current tab; defaults to the first one
	pub fn current_tab(&mut self, id: impl Into<String>) -> &mut Self {
		self.current_tab = Some(id.into());
		self
	}

	pub fn build(self) -> SkResult<SettingsPage> {
		let Some(store) = self.store else {
			return Err(Error::ConfigError("No option store configured".into()));
		};

		let mut types = TypeRegistry::new();
		for (tag, handler) in self.field_types {
			types.register(&tag, handler)?;
		}

		let mut seen = std::collections::HashSet::new();
		for tab in &self.tabs {
			if !seen.insert(tab.id.as_str()) {
				return Err(Error::ConfigError(format!("Duplicate settings tab: {}", tab.id)));
			}
		}

		let current_tab = match &self.current_tab {
			Some(id) => Some(
				self.tabs
					.iter()
					.position(|tab| tab.id == *id)
					.ok_or_else(|| Error::ConfigError(format!("Unknown settings tab: {}", id)))?,
			),
			None if self.tabs.is_empty() => None,
			None => Some(0),
		};

		info!("Settings page {} ready with {} tabs", self.opts.page, self.tabs.len());
		Ok(SettingsPage {
			opts: self.opts,
			store,
			sanitizer: Sanitizer::new()?,
			types,
			hooks: self.hooks,
			listeners: self.listeners,
			notices: self.notices,
			tabs: self.tabs,
			current_tab,
		})
	}
}


// vim: ts=4
