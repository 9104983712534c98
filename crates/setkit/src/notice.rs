//! Request-scoped user notices
//!
//! Messages and errors are keyed by a unique code; adding the same code again
//! replaces the text but keeps the original position. `flush` runs the
//! registered filters and lists errors before messages. It does not clear
//! anything, so flushing twice yields the same notices.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
	#[serde(rename = "message")]
	Message,
	#[serde(rename = "error")]
	Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
	pub code: String,
	pub message: String,
	pub severity: Severity,
}

/// Filter applied to one severity's notices on flush
pub type NoticeFilter = Box<dyn Fn(Vec<Notice>) -> Vec<Notice> + Send + Sync>;

#[derive(Default)]
pub struct Notices {
	errors: Vec<(String, String)>,
	messages: Vec<(String, String)>,
	error_filters: Vec<NoticeFilter>,
	message_filters: Vec<NoticeFilter>,
}

impl std::fmt::Debug for Notices {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Notices")
			.field("errors", &self.errors)
			.field("messages", &self.messages)
			.field("error_filters", &self.error_filters.len())
			.field("message_filters", &self.message_filters.len())
			.finish()
	}
}

fn upsert(entries: &mut Vec<(String, String)>, code: String, text: String) {
	match entries.iter_mut().find(|(c, _)| *c == code) {
		Some(entry) => entry.1 = text,
		None => entries.push((code, text)),
	}
}

fn to_notices(entries: &[(String, String)], severity: Severity) -> Vec<Notice> {
	entries
		.iter()
		.map(|(code, message)| Notice { code: code.clone(), message: message.clone(), severity })
		.collect()
}

impl Notices {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_message(&mut self, code: impl Into<String>, text: impl Into<String>) {
		upsert(&mut self.messages, code.into(), text.into());
	}

	pub fn add_error(&mut self, code: impl Into<String>, text: impl Into<String>) {
		upsert(&mut self.errors, code.into(), text.into());
	}

	pub fn add_error_filter<F>(&mut self, f: F)
	where
		F: Fn(Vec<Notice>) -> Vec<Notice> + Send + Sync + 'static,
	{
		self.error_filters.push(Box::new(f));
	}

	pub fn add_message_filter<F>(&mut self, f: F)
	where
		F: Fn(Vec<Notice>) -> Vec<Notice> + Send + Sync + 'static,
	{
		self.message_filters.push(Box::new(f));
	}

	pub fn has_errors(&self) -> bool {
		!self.errors.is_empty()
	}

	pub fn len(&self) -> usize {
		self.errors.len() + self.messages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Filtered notices, errors first
	pub fn flush(&self) -> Vec<Notice> {
		let errors = self
			.error_filters
			.iter()
			.fold(to_notices(&self.errors, Severity::Error), |notices, filter| filter(notices));
		let messages = self
			.message_filters
			.iter()
			.fold(to_notices(&self.messages, Severity::Message), |notices, filter| filter(notices));

		errors.into_iter().chain(messages).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_same_code_overwrites() {
		let mut notices = Notices::new();
		notices.add_message("x", "first");
		notices.add_message("x", "second");

		let flushed = notices.flush();
		assert_eq!(flushed.len(), 1);
		assert_eq!(flushed[0].code, "x");
		assert_eq!(flushed[0].message, "second");
	}

	#[test]
	fn test_overwrite_keeps_position() {
		let mut notices = Notices::new();
		notices.add_message("a", "1");
		notices.add_message("b", "2");
		notices.add_message("a", "3");

		let codes: Vec<_> = notices.flush().into_iter().map(|n| (n.code, n.message)).collect();
		assert_eq!(codes, vec![("a".into(), "3".into()), ("b".into(), "2".into())]);
	}

	#[test]
	fn test_errors_listed_first() {
		let mut notices = Notices::new();
		notices.add_message("saved", "Saved");
		notices.add_error("bad-key", "Invalid key");

		let flushed = notices.flush();
		assert_eq!(flushed[0].severity, Severity::Error);
		assert_eq!(flushed[1].severity, Severity::Message);
	}

	#[test]
	fn test_message_and_error_codes_are_independent() {
		let mut notices = Notices::new();
		notices.add_message("x", "message");
		notices.add_error("x", "error");
		assert_eq!(notices.len(), 2);
	}

	#[test]
	fn test_flush_is_repeatable() {
		let mut notices = Notices::new();
		notices.add_error("e", "Error");
		assert_eq!(notices.flush(), notices.flush());
		assert!(notices.has_errors());
	}

	#[test]
	fn test_filters_apply_per_severity() {
		let mut notices = Notices::new();
		notices.add_message("keep", "Keep");
		notices.add_message("drop", "Drop");
		notices.add_error("e", "Error");
		notices.add_message_filter(|list| list.into_iter().filter(|n| n.code != "drop").collect());

		let flushed = notices.flush();
		assert_eq!(flushed.len(), 2);
		assert!(flushed.iter().all(|n| n.code != "drop"));
	}
}

// vim: ts=4
