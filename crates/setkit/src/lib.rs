//! Declarative settings fields for admin configuration pages.
//!
//! A page is a set of tabs, each a list of field declarations. On render,
//! every field's stored value is looked up and turned into a render
//! instruction for an external renderer. On save, submitted values are
//! extracted, sanitized per field type, passed through sanitize hooks and
//! persisted into an option store.
//!
//! # Modules
//!
//! - `field`: declarations and normalized descriptors
//! - `dispatch`: type tag → sanitize rule, value source and render tweaks
//! - `option_key`: where a field id is stored
//! - `sanitize`, `html`: value cleaning
//! - `render`: render instructions and the `FieldRenderer` boundary
//! - `persist`: staging and writing submitted values
//! - `notice`: request-scoped messages and errors
//! - `hooks`: custom field types, sanitize filters, lifecycle listeners
//! - `page`: the `SettingsPage` context tying everything together

// Re-export shared types and the store adapter trait
pub use setkit_types::error;
pub use setkit_types::store_adapter;

pub mod config;
pub mod dispatch;
pub mod field;
pub mod hooks;
pub mod html;
pub mod notice;
pub mod option_key;
pub mod page;
pub mod persist;
pub mod prelude;
pub mod render;
pub mod sanitize;
pub mod submitted;
pub mod utils;

pub use crate::error::{Error, SkResult};
pub use crate::field::{FieldDecl, FieldDescriptor, FieldKind};
pub use crate::page::{SaveRequest, SettingsPage, SettingsPageBuilder, SettingsTab};
pub use crate::render::{FieldRenderer, RenderInstruction, RenderPlan, SectionBoundary};
pub use crate::submitted::SubmittedFieldSet;

// vim: ts=4
