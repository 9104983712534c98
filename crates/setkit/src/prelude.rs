pub use crate::page::{SettingsPage, SettingsTab};
pub use setkit_types::prelude::*;

// vim: ts=4
