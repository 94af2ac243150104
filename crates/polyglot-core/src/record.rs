// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Capabilities an owning record exposes to the translation engine.
//!
//! The engine never depends on a concrete record type. A host model
//! implements [`TranslatableRecord`] over its raw attribute storage and,
//! optionally, a [`RecordPersister`] for its own save path.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::types::{OwnerRef, TranslationRow};

/// An owning record whose declared attributes hold one value per locale.
///
/// Raw attribute storage bypasses translation logic. For every translatable
/// attribute it holds the mirror of the default-locale value.
pub trait TranslatableRecord: Send + Sync {
	/// Fully-qualified owner type name stored with each translation row.
	fn owner_type(&self) -> &str;

	/// Durable primary key, `None` until the record is first persisted.
	fn identity(&self) -> Option<i64>;

	fn raw_attributes(&self) -> &Map<String, Value>;

	fn raw_attributes_mut(&mut self) -> &mut Map<String, Value>;

	fn translatable_attributes(&self) -> &[String];

	/// Subset of the translatable attributes flagged for search indexing.
	fn searchable_attributes(&self) -> &[String] {
		&[]
	}

	fn has_identity(&self) -> bool {
		self.identity().is_some()
	}

	fn owner_ref(&self) -> Option<OwnerRef> {
		self.identity().map(|id| OwnerRef::new(id, self.owner_type()))
	}

	fn get_raw(&self, key: &str) -> Option<&Value> {
		self.raw_attributes().get(key)
	}

	fn set_raw(&mut self, key: &str, value: Value) {
		self.raw_attributes_mut().insert(key.to_string(), value);
	}

	fn is_translatable_attribute(&self, key: &str) -> bool {
		self.translatable_attributes().iter().any(|attr| attr == key)
	}

	fn is_searchable_attribute(&self, key: &str) -> bool {
		self.searchable_attributes().iter().any(|attr| attr == key)
	}

	/// Host read path for non-translatable attributes.
	fn read_attribute(&self, key: &str) -> Option<Value> {
		self.get_raw(key).cloned()
	}

	/// Host write path for non-translatable attributes and the final mirror
	/// write of a translatable one.
	fn write_attribute(&mut self, key: &str, value: Value) {
		self.set_raw(key, value);
	}

	fn has_get_transform(&self, _key: &str) -> bool {
		false
	}

	/// Applied to resolved content before it is returned from a read.
	fn get_transform(&self, _key: &str, content: String) -> String {
		content
	}

	fn has_set_transform(&self, _key: &str) -> bool {
		false
	}

	/// Applied to a value before it is written for `locale`.
	///
	/// Must store its result in raw storage under `key`; the engine reads the
	/// transformed value back from there.
	fn set_transform(&mut self, key: &str, value: Value, _locale: &str) {
		self.set_raw(key, value);
	}

	/// Whether the record's generic export would be empty.
	///
	/// Changed translations are not persisted while this holds.
	fn is_export_empty(&self) -> bool {
		self.raw_attributes().is_empty()
	}

	/// Eagerly loaded translation rows for this record.
	///
	/// When `Some`, it is used instead of querying the store.
	fn loaded_translations(&self) -> Option<&[TranslationRow]> {
		None
	}

	/// Drops eagerly loaded rows once they may be stale.
	fn clear_loaded_translations(&mut self) {}
}

/// The host's own save path for a record.
#[async_trait]
pub trait RecordPersister<R: TranslatableRecord>: Send + Sync {
	/// Persists `record`, assigning its identity if it had none.
	///
	/// Returns whether anything was saved.
	async fn persist(&self, record: &mut R) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// A map-backed record for owners whose shape is only known at runtime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeRecord {
	owner_type: String,
	identity: Option<i64>,
	attributes: Map<String, Value>,
	translatable: Vec<String>,
	searchable: Vec<String>,
	loaded: Option<Vec<TranslationRow>>,
}

impl AttributeRecord {
	pub fn new(owner_type: impl Into<String>) -> Self {
		Self {
			owner_type: owner_type.into(),
			..Default::default()
		}
	}

	/// A record that already exists with primary key `id`.
	pub fn with_identity(mut self, id: i64) -> Self {
		self.set_identity(id);
		self
	}

	pub fn with_translatable<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.translatable = keys.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_searchable<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.searchable = keys.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attributes.insert(key.into(), value.into());
		self
	}

	pub fn with_loaded_translations(mut self, rows: Vec<TranslationRow>) -> Self {
		self.loaded = Some(rows);
		self
	}

	/// Assigns the primary key and mirrors it into the `id` attribute.
	pub fn set_identity(&mut self, id: i64) {
		self.identity = Some(id);
		self.attributes.insert("id".to_string(), Value::from(id));
	}
}

impl TranslatableRecord for AttributeRecord {
	fn owner_type(&self) -> &str {
		&self.owner_type
	}

	fn identity(&self) -> Option<i64> {
		self.identity
	}

	fn raw_attributes(&self) -> &Map<String, Value> {
		&self.attributes
	}

	fn raw_attributes_mut(&mut self) -> &mut Map<String, Value> {
		&mut self.attributes
	}

	fn translatable_attributes(&self) -> &[String] {
		&self.translatable
	}

	fn searchable_attributes(&self) -> &[String] {
		&self.searchable
	}

	fn loaded_translations(&self) -> Option<&[TranslationRow]> {
		self.loaded.as_deref()
	}

	fn clear_loaded_translations(&mut self) {
		self.loaded = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn article() -> AttributeRecord {
		AttributeRecord::new("app::Article")
			.with_translatable(["title", "body"])
			.with_searchable(["title"])
	}

	#[test]
	fn test_declared_attributes() {
		let record = article();
		assert!(record.is_translatable_attribute("title"));
		assert!(record.is_translatable_attribute("body"));
		assert!(!record.is_translatable_attribute("slug"));
		assert!(record.is_searchable_attribute("title"));
		assert!(!record.is_searchable_attribute("body"));
	}

	#[test]
	fn test_identity_sets_id_attribute() {
		let mut record = article();
		assert!(!record.has_identity());
		assert!(record.owner_ref().is_none());
		assert!(record.is_export_empty());

		record.set_identity(42);
		assert_eq!(record.owner_ref(), Some(OwnerRef::new(42, "app::Article")));
		assert_eq!(record.get_raw("id"), Some(&json!(42)));
		assert!(!record.is_export_empty());
	}

	#[test]
	fn test_default_pass_through() {
		let mut record = article().with_attribute("slug", "hello-world");
		assert_eq!(record.read_attribute("slug"), Some(json!("hello-world")));

		record.write_attribute("slug", json!("bonjour"));
		assert_eq!(record.get_raw("slug"), Some(&json!("bonjour")));

		record.set_transform("title", json!("Hi"), "en");
		assert_eq!(record.get_raw("title"), Some(&json!("Hi")));
		assert_eq!(record.get_transform("title", "Hi".to_string()), "Hi");
	}

	#[test]
	fn test_loaded_translations_cleared() {
		let owner = OwnerRef::new(1, "app::Article");
		let mut record = article()
			.with_identity(1)
			.with_loaded_translations(vec![TranslationRow::new(&owner, "en", "title", true)]);
		assert_eq!(record.loaded_translations().map(<[_]>::len), Some(1));

		record.clear_loaded_translations();
		assert!(record.loaded_translations().is_none());
	}
}
