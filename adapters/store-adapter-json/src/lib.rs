//! Option store adapter keeping all options in one JSON document.
//!
//! The document is held in memory. When opened on a file path every update
//! rewrites the file through a temporary file and a rename, so a crash never
//! leaves a half-written document behind.

use std::{
	fs,
	path::{Path, PathBuf},
};

use parking_lot::RwLock;
use serde_json::{Map, Value};

use setkit::{prelude::*, store_adapter::OptionStore};

#[derive(Debug)]
pub struct OptionStoreJson {
	path: Option<Box<Path>>,
	options: RwLock<Map<String, Value>>,
}

impl Default for OptionStoreJson {
	fn default() -> Self {
		Self::in_memory()
	}
}

impl OptionStoreJson {
	/// Store without a backing file. Contents live as long as the value.
	pub fn in_memory() -> Self {
		Self { path: None, options: RwLock::new(Map::new()) }
	}

	/// In-memory store seeded with existing options
	pub fn with_options(options: Map<String, Value>) -> Self {
		Self { path: None, options: RwLock::new(options) }
	}

	/// Opens (or creates) a file-backed store
	pub fn open(path: impl Into<PathBuf>) -> SkResult<Self> {
		let path: PathBuf = path.into();

		let options = if path.exists() {
			let data = fs::read_to_string(&path)?;
			if data.trim().is_empty() {
				Map::new()
			} else {
				match serde_json::from_str::<Value>(&data)
					.map_err(|e| Error::StoreError(format!("{}: {}", path.display(), e)))?
				{
					Value::Object(map) => map,
					_ => {
						return Err(Error::StoreError(format!(
							"{}: top level must be an object",
							path.display()
						)));
					}
				}
			}
		} else {
			if let Some(parent) = path.parent() {
				fs::create_dir_all(parent)?;
			}
			Map::new()
		};

		info!("Opened option store {} with {} options", path.display(), options.len());
		Ok(Self { path: Some(path.into_boxed_path()), options: RwLock::new(options) })
	}

	/// Copy of every stored option
	pub fn snapshot(&self) -> Map<String, Value> {
		self.options.read().clone()
	}

	pub fn len(&self) -> usize {
		self.options.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.options.read().is_empty()
	}

	fn flush(&self, options: &Map<String, Value>) -> SkResult<()> {
		let Some(path) = &self.path else {
			return Ok(());
		};

		let data = serde_json::to_string_pretty(options)
			.map_err(|e| Error::StoreError(format!("serialize options: {}", e)))?;

		let mut tmp_path = path.as_os_str().to_owned();
		tmp_path.push(".tmp");
		let tmp_path = PathBuf::from(tmp_path);

		fs::write(&tmp_path, data)?;
		fs::rename(&tmp_path, path)?;
		debug!("Flushed option store to {}", path.display());
		Ok(())
	}
}

impl OptionStore for OptionStoreJson {
	fn read_option(&self, key: &str) -> SkResult<Option<Value>> {
		Ok(self.options.read().get(key).cloned())
	}

	fn update_option(&self, key: &str, value: Value) -> SkResult<()> {
		let mut options = self.options.write();
		options.insert(key.to_string(), value);
		self.flush(&options)
	}
}

// vim: ts=4
