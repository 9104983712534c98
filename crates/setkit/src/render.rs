//! Render path: stored value lookup, wrapper markup and render instructions
//!
//! The core never produces field markup itself. Every data field becomes a
//! `RenderInstruction` handed to a `FieldRenderer`; section markers become
//! `SectionBoundary` calls. Custom types are handed to their registered
//! handler together with the stored value.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::SettingsOpts;
use crate::dispatch::{self, AttrMutation, Dispatch, TypeSpec, ValueSource};
use crate::field::{FieldDescriptor, FieldKind};
use crate::hooks::{Listeners, SettingsEvent, TypeRegistry};
use crate::option_key::get_option;
use crate::prelude::*;
use crate::sanitize::{self, Sanitizer};
use crate::utils::{is_empty_value, slugify};
use setkit_types::store_adapter::OptionStore;

/// Normalized input for the external field renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderInstruction {
	#[serde(rename = "type")]
	pub render_type: String,
	pub id: String,
	pub title: String,
	pub value: Value,
	pub field_attributes: Map<String, Value>,
	pub wrapper_attributes: Map<String, Value>,
	pub before_field: String,
	pub after_field: String,
	pub before_label: String,
	pub after_label: String,
	pub wrapper_type: String,
	/// Column instructions of a group field
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub fields: Vec<RenderInstruction>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl RenderInstruction {
	/// Bare instruction without wrapper markup
	pub fn new(render_type: impl Into<String>, id: impl Into<String>, value: Value) -> Self {
		Self {
			render_type: render_type.into(),
			id: id.into(),
			title: String::new(),
			value,
			field_attributes: Map::new(),
			wrapper_attributes: Map::new(),
			before_field: String::new(),
			after_field: String::new(),
			before_label: String::new(),
			after_label: String::new(),
			wrapper_type: String::new(),
			fields: Vec::new(),
			extra: Map::new(),
		}
	}
}

/// Header or footer of a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionBoundary {
	pub id: String,
	pub title: String,
	/// Safe-HTML filtered description
	pub desc: String,
	/// Whether the section opens/closes a table
	pub table_html: bool,
	/// Tab the section belongs to
	pub tab: String,
}

/// External renderer
pub trait FieldRenderer {
	fn section_start(&mut self, section: &SectionBoundary) -> SkResult<()>;
	fn section_end(&mut self, section: &SectionBoundary) -> SkResult<()>;
	fn field(&mut self, instruction: &RenderInstruction) -> SkResult<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderOp {
	SectionStart(SectionBoundary),
	SectionEnd(SectionBoundary),
	Field(RenderInstruction),
}

/// Renderer collecting serializable operations, for hosts rendering client-side
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderPlan {
	ops: Vec<RenderOp>,
}

impl RenderPlan {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn ops(&self) -> &[RenderOp] {
		&self.ops
	}

	pub fn into_ops(self) -> Vec<RenderOp> {
		self.ops
	}

	/// Field instructions only, in render order
	pub fn fields(&self) -> impl Iterator<Item = &RenderInstruction> {
		self.ops.iter().filter_map(|op| match op {
			RenderOp::Field(instruction) => Some(instruction),
			_ => None,
		})
	}

	pub fn to_json(&self) -> SkResult<Value> {
		Ok(serde_json::to_value(self)?)
	}
}

impl FieldRenderer for RenderPlan {
	fn section_start(&mut self, section: &SectionBoundary) -> SkResult<()> {
		self.ops.push(RenderOp::SectionStart(section.clone()));
		Ok(())
	}

	fn section_end(&mut self, section: &SectionBoundary) -> SkResult<()> {
		self.ops.push(RenderOp::SectionEnd(section.clone()));
		Ok(())
	}

	fn field(&mut self, instruction: &RenderInstruction) -> SkResult<()> {
		self.ops.push(RenderOp::Field(instruction.clone()));
		Ok(())
	}
}

/// Everything the render path reads
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
	pub store: &'a dyn OptionStore,
	pub opts: &'a SettingsOpts,
	pub sanitizer: &'a Sanitizer,
	pub types: &'a TypeRegistry,
	pub listeners: &'a Listeners,
	/// Current tab id
	pub tab: &'a str,
}

impl RenderContext<'_> {
	/// Renders a field list. `option_name` is the bucket option, or `""`.
	pub fn render_fields(
		&self,
		fields: &[FieldDescriptor],
		option_name: &str,
		renderer: &mut dyn FieldRenderer,
	) -> SkResult<()> {
		for field in fields {
			match dispatch::dispatch(&field.kind) {
				Dispatch::SectionStart { table_html } => {
					renderer.section_start(&self.boundary(field, table_html))?;
					if !field.id.is_empty() {
						self.listeners.emit(&SettingsEvent::SectionStart { section: &field.id });
					}
				}
				Dispatch::SectionEnd { table_html } => {
					if !field.id.is_empty() {
						self.listeners.emit(&SettingsEvent::SectionEnd { section: &field.id });
					}
					renderer.section_end(&self.boundary(field, table_html))?;
					if !field.id.is_empty() {
						self.listeners.emit(&SettingsEvent::SectionAfter { section: &field.id });
					}
				}
				Dispatch::Builtin(spec) => {
					let instruction = self.instruction(field, spec, option_name)?;
					renderer.field(&instruction)?;
				}
				Dispatch::Custom(tag) => match self.types.get(tag) {
					Some(handler) => {
						let value = get_option(self.store, option_name, &field.id, field.default.clone())?;
						handler.render(field, &value, renderer)?;
					}
					None => warn!("No handler registered for field type '{}' ({})", tag, field.id),
				},
			}
		}
		Ok(())
	}

	/// Builds the render instruction of a built-in data field
	pub fn instruction(
		&self,
		field: &FieldDescriptor,
		spec: &TypeSpec,
		option_name: &str,
	) -> SkResult<RenderInstruction> {
		let prefix = &self.opts.class_prefix;
		let cell_class = format!("{0}-forminp {0}-forminp-{1}", prefix, slugify(field.tag()));
		let description = self.description(field);

		let value = self.value(field, spec, option_name)?;
		let mut instruction = RenderInstruction::new(spec.render_type(), field.id.clone(), value);
		instruction.title = field.display_title().to_string();
		instruction.wrapper_type = "tr".into();
		instruction.before_label = format!("<th scope=\"row\" class=\"titledesc\">{}", field.before_label);
		instruction.after_label = format!("{}</th>", field.after_label);
		instruction.before_field = format!("<td class=\"{}\">{}", cell_class, field.before_field);
		instruction.after_field = format!("{}{}</td>", description, field.after_field);
		instruction.extra = field.extra.clone();

		instruction.field_attributes = field.attributes.clone();
		if !field.class.trim().is_empty() {
			append_class(&mut instruction.field_attributes, field.class.trim());
		}
		if !field.css.is_empty() {
			instruction.field_attributes.insert("style".into(), Value::String(field.css.clone()));
		}

		for mutation in spec.mutations {
			match *mutation {
				AttrMutation::FieldClass(suffix) => {
					append_class(&mut instruction.field_attributes, &format!("{}-{}", prefix, suffix));
				}
				AttrMutation::WrapperClass(suffix) => {
					append_class(&mut instruction.wrapper_attributes, &format!("{}-{}", prefix, suffix));
				}
				AttrMutation::PasswordWhenSet => {
					if !is_empty_value(&instruction.value) {
						instruction.render_type = "password".into();
					}
				}
				AttrMutation::TextareaSize => {
					instruction.field_attributes.insert("rows".into(), self.opts.textarea_rows.into());
					instruction.field_attributes.insert("cols".into(), self.opts.textarea_cols.into());
				}
				AttrMutation::FieldsetCell => {
					instruction.before_field = format!("<td class=\"{}\"><fieldset>", cell_class);
					instruction.after_field = format!("{}</fieldset></td>", description);
				}
				AttrMutation::FullWidthCell(suffix) => {
					instruction.before_field =
						format!("<td class=\"{} {}-{}\" colspan=\"2\">", cell_class, prefix, suffix);
				}
			}
		}

		if let FieldKind::Group { fields } = &field.kind {
			instruction.fields = fields.iter().filter_map(|sub| self.column(sub)).collect();
		}

		Ok(instruction)
	}

	/// Displayed value: a non-empty pinned value, else the stored one
	fn value(&self, field: &FieldDescriptor, spec: &TypeSpec, option_name: &str) -> SkResult<Value> {
		if let Some(pinned) = field.value.as_ref().filter(|v| !is_empty_value(v)) {
			return Ok(pinned.clone());
		}

		let stored = get_option(self.store, option_name, &field.id, field.default.clone())?;
		Ok(match spec.value {
			ValueSource::Stored => stored,
			ValueSource::Cleaned => {
				sanitize::clean(Some(&stored)).unwrap_or_else(|| Value::String(String::new()))
			}
			ValueSource::SafeHtml => self.sanitizer.clean_html(Some(&stored)),
		})
	}

	/// Group column: type and defaults only, values come with the group's rows
	fn column(&self, sub: &FieldDescriptor) -> Option<RenderInstruction> {
		let Dispatch::Builtin(spec) = dispatch::dispatch(&sub.kind) else {
			return None;
		};
		let mut column = RenderInstruction::new(spec.render_type(), sub.id.clone(), sub.default.clone());
		column.title = sub.display_title().to_string();
		column.field_attributes = sub.attributes.clone();
		column.extra = sub.extra.clone();
		Some(column)
	}

	fn description(&self, field: &FieldDescriptor) -> String {
		if field.desc.is_empty() {
			return String::new();
		}
		format!(
			"<p class=\"{}-field-description\">{}</p>",
			self.opts.class_prefix,
			self.sanitizer.html().sanitize(&field.desc)
		)
	}

	fn boundary(&self, field: &FieldDescriptor, table_html: bool) -> SectionBoundary {
		SectionBoundary {
			id: field.id.clone(),
			title: field.display_title().to_string(),
			desc: self.sanitizer.html().sanitize(&field.desc),
			table_html,
			tab: self.tab.to_string(),
		}
	}
}

fn append_class(attributes: &mut Map<String, Value>, class: &str) {
	let merged = match attributes.get("class").and_then(Value::as_str).map(str::trim) {
		Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
		_ => class.to_string(),
	};
	attributes.insert("class".into(), Value::String(merged));
}


// vim: ts=4
