//! Error type shared by the settings pipeline and store adapters

use std::fmt;

pub type SkResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// The save request failed anti-forgery verification. Fatal for the whole request.
	RequestRejected(String),
	ValidationError(String),
	ConfigError(String),
	Parse,
	StoreError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::RequestRejected(msg) => write!(f, "request rejected: {}", msg),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "config error: {}", msg),
			Error::Parse => write!(f, "parse error"),
			Error::StoreError(msg) => write!(f, "store error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(e) => write!(f, "io error: {}", e),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::ConfigError(err.to_string())
	}
}


// vim: ts=4
