//! Shared fixtures for the settings pipeline tests

#![allow(dead_code)]

pub mod fixtures;

use parking_lot::Mutex;
use serde_json::Value;
use setkit::prelude::*;
use setkit::store_adapter::OptionStore;
use setkit_store_adapter_json::OptionStoreJson;

/// Installs a test subscriber so `RUST_LOG`-style debugging output shows up
pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

/// JSON store recording every key written, in order
#[derive(Debug, Default)]
pub struct RecordingStore {
	inner: OptionStoreJson,
	writes: Mutex<Vec<String>>,
}

impl RecordingStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds a value without recording it as a write
	pub fn seed(&self, key: &str, value: Value) {
		let _ = self.inner.update_option(key, value);
	}

	pub fn writes(&self) -> Vec<String> {
		self.writes.lock().clone()
	}

	pub fn value(&self, key: &str) -> Option<Value> {
		self.inner.read_option(key).ok().flatten()
	}
}

impl OptionStore for RecordingStore {
	fn read_option(&self, key: &str) -> SkResult<Option<Value>> {
		self.inner.read_option(key)
	}

	fn update_option(&self, key: &str, value: Value) -> SkResult<()> {
		self.writes.lock().push(key.to_string());
		self.inner.update_option(key, value)
	}
}

// vim: ts=4
