//! Adapter trait for the key-value option store

use serde_json::Value;
use std::fmt::Debug;

use crate::prelude::*;

/// Key-value store the settings pipeline persists into.
///
/// Writes are last-write-wins per key. Implementations use interior
/// mutability so a shared reference is enough to update an option.
pub trait OptionStore: Debug + Send + Sync {
	/// Reads the value stored under `key`, `None` if nothing is stored
	fn read_option(&self, key: &str) -> SkResult<Option<Value>>;

	/// Replaces the value stored under `key`
	fn update_option(&self, key: &str, value: Value) -> SkResult<()>;

	/// Reads `key`, falling back to `default` when nothing is stored
	fn get(&self, key: &str, default: Value) -> SkResult<Value> {
		Ok(self.read_option(key)?.unwrap_or(default))
	}
}

// vim: ts=4
