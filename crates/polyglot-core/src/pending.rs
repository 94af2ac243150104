// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Buffer for translations set before the owner has an identity.

use serde::{Deserialize, Serialize};

use crate::types::LocaleMap;

/// A translation waiting for its owner to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTranslation {
	pub key: String,
	pub searchable: bool,
	/// Already serialized content.
	pub content: String,
	pub locale: String,
}

impl PendingTranslation {
	pub fn new(
		key: impl Into<String>,
		locale: impl Into<String>,
		content: impl Into<String>,
		searchable: bool,
	) -> Self {
		Self {
			key: key.into(),
			searchable,
			content: content.into(),
			locale: locale.into(),
		}
	}
}

/// Ordered, append-only buffer scoped to one owner instance.
#[derive(Debug, Clone, Default)]
pub struct PendingTranslations {
	entries: Vec<PendingTranslation>,
}

impl PendingTranslations {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, entry: PendingTranslation) {
		self.entries.push(entry);
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &PendingTranslation> {
		self.entries.iter()
	}

	/// Drains the buffer for flushing.
	///
	/// Entries for the same `(key, locale)` collapse into one, kept at the
	/// position of its first occurrence and carrying the last value written.
	pub fn take(&mut self) -> Vec<PendingTranslation> {
		let mut flushed: Vec<PendingTranslation> = Vec::with_capacity(self.entries.len());
		for entry in self.entries.drain(..) {
			match flushed
				.iter_mut()
				.find(|existing| existing.key == entry.key && existing.locale == entry.locale)
			{
				Some(existing) => *existing = entry,
				None => flushed.push(entry),
			}
		}
		flushed
	}

	/// Puts unflushed entries back at the front of the buffer.
	pub fn restore(&mut self, entries: Vec<PendingTranslation>) {
		let appended = std::mem::replace(&mut self.entries, entries);
		self.entries.extend(appended);
	}

	/// Drops every entry for `(key, locale)`, returning how many were removed.
	pub fn remove(&mut self, key: &str, locale: &str) -> usize {
		let before = self.entries.len();
		self.entries
			.retain(|entry| !(entry.key == key && entry.locale == locale));
		before - self.entries.len()
	}

	/// The buffered `locale -> content` view of one attribute.
	pub fn locale_map(&self, key: &str) -> LocaleMap {
		self.entries
			.iter()
			.filter(|entry| entry.key == key)
			.map(|entry| (entry.locale.clone(), entry.content.clone()))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn buffer() -> PendingTranslations {
		let mut pending = PendingTranslations::new();
		pending.push(PendingTranslation::new("title", "en", "Hello", false));
		pending.push(PendingTranslation::new("body", "en", "Text", true));
		pending.push(PendingTranslation::new("title", "fr", "Bonjour", false));
		pending.push(PendingTranslation::new("title", "en", "Howdy", false));
		pending
	}

	#[test]
	fn test_take_coalesces_same_key_and_locale() {
		let mut pending = buffer();
		let flushed = pending.take();

		assert!(pending.is_empty());
		assert_eq!(flushed.len(), 3);
		assert_eq!(flushed[0].key, "title");
		assert_eq!(flushed[0].locale, "en");
		assert_eq!(flushed[0].content, "Howdy");
		assert_eq!(flushed[1].key, "body");
		assert_eq!(flushed[2].locale, "fr");
	}

	#[test]
	fn test_take_twice_yields_nothing() {
		let mut pending = buffer();
		pending.take();
		assert!(pending.take().is_empty());
	}

	#[test]
	fn test_locale_map_last_write_wins() {
		let map = buffer().locale_map("title");
		assert_eq!(map.len(), 2);
		assert_eq!(map["en"], "Howdy");
		assert_eq!(map["fr"], "Bonjour");
		assert!(buffer().locale_map("summary").is_empty());
	}

	#[test]
	fn test_remove_only_matching_entries() {
		let mut pending = buffer();
		assert_eq!(pending.remove("title", "en"), 2);
		assert_eq!(pending.len(), 2);
		assert_eq!(pending.remove("title", "de"), 0);
	}

	#[test]
	fn test_restore_puts_entries_first() {
		let mut pending = PendingTranslations::new();
		pending.push(PendingTranslation::new("body", "en", "Later", false));
		pending.restore(vec![PendingTranslation::new("title", "en", "Earlier", false)]);

		let keys: Vec<_> = pending.iter().map(|entry| entry.key.as_str()).collect();
		assert_eq!(keys, ["title", "body"]);
	}
}
