//! Page options and declarative tab definitions
//!
//! A page definition lists its tabs and their fields and can be written in
//! YAML or JSON:
//! ```text
//! options:
//!   page: give_settings
//!   class_prefix: give
//! tabs:
//!   - id: general
//!     label: General
//!     fields:
//!       - { id: general_options, type: title, title: General Options }
//!       - { id: site_title, type: text, default: My Site }
//!       - { id: general_options, type: sectionend }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::field::FieldDecl;
use crate::prelude::*;

/// Options of one settings page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsOpts {
	/// Page slug, used as the prefix of page-level event names
	pub page: String,
	/// Prefix of the CSS classes in generated wrapper markup
	pub class_prefix: String,
	pub saved_notice_code: String,
	pub saved_notice_text: String,
	/// Message carried by the error of a save that failed verification
	pub rejected_text: String,
	pub textarea_rows: u32,
	pub textarea_cols: u32,
}

impl Default for SettingsOpts {
	fn default() -> Self {
		Self {
			page: "settings".into(),
			class_prefix: "setkit".into(),
			saved_notice_code: "settings-updated".into(),
			saved_notice_text: "Your settings have been saved.".into(),
			rejected_text: "Action failed. Please refresh the page and retry.".into(),
			textarea_rows: 10,
			textarea_cols: 60,
		}
	}
}

/// One tab of a page: a field set saved either per field or into one bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabDecl {
	pub id: String,
	#[serde(default)]
	pub label: String,
	/// Bucket option all plain fields of the tab are merged into
	#[serde(default)]
	pub option_name: Option<String>,
	#[serde(default)]
	pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDecl {
	#[serde(default)]
	pub options: SettingsOpts,
	#[serde(default)]
	pub tabs: Vec<TabDecl>,
}

pub fn parse_page_yaml(content: &str) -> SkResult<PageDecl> {
	serde_yaml::from_str(content)
		.map_err(|e| Error::ConfigError(format!("invalid page definition: {}", e)))
}

pub fn parse_page_json(content: &str) -> SkResult<PageDecl> {
	serde_json::from_str(content)
		.map_err(|e| Error::ConfigError(format!("invalid page definition: {}", e)))
}

/// Loads a page definition, picking the format from the file extension
pub fn load_page(path: &Path) -> SkResult<PageDecl> {
	let content = std::fs::read_to_string(path)?;
	debug!("Loaded page definition: {}", path.display());
	match path.extension().and_then(|ext| ext.to_str()) {
		Some("yaml" | "yml") => parse_page_yaml(&content),
		Some("json") => parse_page_json(&content),
		_ => Err(Error::ConfigError(format!(
			"Unknown page definition format: {}",
			path.display()
		))),
	}
}


// vim: ts=4
