// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-owner translation access.
//!
//! A [`Translatable`] pairs one owning record with the shared engine and the
//! record's pending-write buffer. Reads resolve the effective locale and go
//! through the cache; writes keep the store, cache and default-locale mirror
//! consistent.
//!
//! Owners without identity never touch the store or cache. Their writes are
//! buffered and become rows on the first [`Translatable::flush_pending`],
//! which [`Translatable::save`] runs after the host persists the record.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::instrument;

use crate::engine::TranslationEngine;
use crate::error::{Result, TranslationError};
use crate::listener::TranslationChanged;
use crate::locale::{normalize_locale, requested_or_current};
use crate::pending::{PendingTranslation, PendingTranslations};
use crate::record::{RecordPersister, TranslatableRecord};
use crate::settings::{ExportStyle, TranslationSettings};
use crate::types::{serialize_content, LocaleMap, TranslationRow};

#[derive(Debug)]
pub struct Translatable<R: TranslatableRecord> {
	engine: TranslationEngine,
	record: R,
	pending: PendingTranslations,
}

impl<R: TranslatableRecord> Translatable<R> {
	pub fn new(engine: TranslationEngine, record: R) -> Self {
		Self {
			engine,
			record,
			pending: PendingTranslations::new(),
		}
	}

	pub fn record(&self) -> &R {
		&self.record
	}

	/// Direct access to the record, bypassing translation logic.
	pub fn record_mut(&mut self) -> &mut R {
		&mut self.record
	}

	/// Unwraps the record. Unflushed pending translations are dropped.
	pub fn into_inner(self) -> R {
		if !self.pending.is_empty() {
			tracing::warn!(
				owner_type = self.record.owner_type(),
				dropped = self.pending.len(),
				"dropping unflushed pending translations"
			);
		}
		self.record
	}

	pub fn engine(&self) -> &TranslationEngine {
		&self.engine
	}

	pub fn settings(&self) -> &TranslationSettings {
		self.engine.settings()
	}

	pub fn pending(&self) -> &PendingTranslations {
		&self.pending
	}

	pub fn is_translatable_attribute(&self, key: &str) -> bool {
		self.record.is_translatable_attribute(key)
	}

	pub fn is_searchable_attribute(&self, key: &str) -> bool {
		self.record.is_searchable_attribute(key)
	}

	fn guard(&self, key: &str) -> Result<()> {
		if self.record.is_translatable_attribute(key) {
			Ok(())
		} else {
			Err(TranslationError::not_translatable(key, self.record.owner_type()))
		}
	}

	/// Locale map before the view-only default merge.
	async fn locale_map(&self, key: &str) -> Result<LocaleMap> {
		match self.record.owner_ref() {
			Some(owner) => self.engine.stored_locale_map(&self.record, &owner, key).await,
			None => {
				let mut map = self.pending.locale_map(key);
				self.engine.backfill_default(&self.record, key, &mut map);
				Ok(map)
			}
		}
	}

	/// Reads an attribute as the host would see it.
	///
	/// Non-translatable attributes pass through to the record. Translatable
	/// ones resolve in the current locale with fallback.
	pub async fn get_value(&self, key: &str) -> Result<Value> {
		if !self.record.is_translatable_attribute(key) {
			return Ok(self.record.read_attribute(key).unwrap_or(Value::Null));
		}

		let locale = self.settings().current_locale.clone();
		let content = self.get_translation(key, &locale, true).await?;
		Ok(Value::String(content))
	}

	/// Writes an attribute as the host would.
	///
	/// An object value is a `locale -> content` bulk write. Any other value is
	/// written for the current locale. The raw attribute then holds the
	/// resolved current-locale content.
	pub async fn set_value(&mut self, key: &str, value: Value) -> Result<()> {
		if !self.record.is_translatable_attribute(key) {
			self.record.write_attribute(key, value);
			return Ok(());
		}

		let locale = self.settings().current_locale.clone();
		match value {
			Value::Object(translations) => self.set_translations(key, translations).await?,
			other => self.set_translation(key, &locale, other).await?,
		}

		let resolved = self.get_translation(key, &locale, true).await?;
		self.record.write_attribute(key, Value::String(resolved));
		Ok(())
	}

	/// Content of `key` in `locale` with fallback. An empty locale means the
	/// current locale.
	pub async fn translate(&self, key: &str, locale: &str) -> Result<String> {
		self.get_translation(key, locale, true).await
	}

	/// Content of `key` in the effective locale, or the empty string.
	pub async fn get_translation(&self, key: &str, locale: &str, use_fallback: bool) -> Result<String> {
		let translations = self.get_translations(key).await?;
		let requested = requested_or_current(locale, &self.settings().current_locale);
		let effective = normalize_locale(
			requested,
			&translations,
			use_fallback,
			self.settings().fallback_locale.as_deref(),
		);

		let content = translations.get(&effective).cloned().unwrap_or_default();
		if self.record.has_get_transform(key) {
			return Ok(self.record.get_transform(key, content));
		}
		Ok(content)
	}

	pub async fn get_translation_with_fallback(&self, key: &str, locale: &str) -> Result<String> {
		self.get_translation(key, locale, true).await
	}

	pub async fn get_translation_without_fallback(&self, key: &str, locale: &str) -> Result<String> {
		self.get_translation(key, locale, false).await
	}

	/// Every stored translation of `key`.
	///
	/// When the default locale is absent but the record holds a raw value for
	/// `key`, that value is returned as the default-locale entry. The merge is
	/// not cached.
	pub async fn get_translations(&self, key: &str) -> Result<LocaleMap> {
		self.guard(key)?;
		let mut translations = self.locale_map(key).await?;

		let default_locale = &self.settings().default_locale;
		if !translations.contains_key(default_locale) {
			if let Some(raw) = self.record.get_raw(key) {
				translations.insert(default_locale.clone(), serialize_content(raw));
			}
		}
		Ok(translations)
	}

	/// Locale maps of every translatable attribute, keyed by attribute.
	pub async fn get_all_translations(&self) -> Result<BTreeMap<String, LocaleMap>> {
		let mut all = BTreeMap::new();
		for key in self.record.translatable_attributes() {
			all.insert(key.clone(), self.get_translations(key).await?);
		}
		Ok(all)
	}

	pub async fn get_translated_locales(&self, key: &str) -> Result<Vec<String>> {
		Ok(self.get_translations(key).await?.into_keys().collect())
	}

	/// Whether `key` has a translation in `locale`, or the current locale.
	pub async fn has_translation(&self, key: &str, locale: Option<&str>) -> Result<bool> {
		let current = &self.settings().current_locale;
		let locale = requested_or_current(locale.unwrap_or_default(), current);
		Ok(self.get_translations(key).await?.contains_key(locale))
	}

	pub async fn normalize_locale(&self, key: &str, locale: &str, use_fallback: bool) -> Result<String> {
		let translations = self.get_translations(key).await?;
		Ok(normalize_locale(
			locale,
			&translations,
			use_fallback,
			self.settings().fallback_locale.as_deref(),
		))
	}

	/// Sets the content of `key` in `locale`.
	///
	/// The default-locale mirror and the pending buffer are updated
	/// unconditionally. The store is written and listeners notified only when
	/// the serialized content differs from the current value.
	#[instrument(skip(self, value), fields(owner_type = self.record.owner_type(), owner_id = ?self.record.identity()))]
	pub async fn set_translation(&mut self, key: &str, locale: &str, value: impl Into<Value>) -> Result<()> {
		self.guard(key)?;

		let translations = self.get_translations(key).await?;
		let old_value = translations.get(locale).cloned().unwrap_or_default();

		let mut value = value.into();
		if self.record.has_set_transform(key) {
			self.record.set_transform(key, value, locale);
			value = self.record.get_raw(key).cloned().unwrap_or(Value::Null);
		}

		if self.settings().is_default_locale(locale) {
			self.record.set_raw(key, value.clone());
		}

		let content = serialize_content(&value);
		let searchable = self.record.is_searchable_attribute(key);

		let Some(owner) = self.record.owner_ref() else {
			tracing::debug!("owner has no identity, buffering translation");
			self.pending
				.push(PendingTranslation::new(key, locale, content, searchable));
			return Ok(());
		};

		if old_value == content {
			tracing::debug!("translation unchanged");
			return Ok(());
		}

		if self.record.is_export_empty() {
			tracing::warn!("record export is empty, changed translation not persisted");
			return Ok(());
		}

		self.record.clear_loaded_translations();
		self.engine
			.write_row(&self.record, &owner, locale, key, content.clone())
			.await?;
		self.engine
			.notify(TranslationChanged::new(owner, key, locale, old_value, content))
			.await;
		Ok(())
	}

	/// Applies [`Self::set_translation`] for each `(locale, value)` in order.
	pub async fn set_translations<I, L>(&mut self, key: &str, translations: I) -> Result<()>
	where
		I: IntoIterator<Item = (L, Value)>,
		L: AsRef<str>,
	{
		self.guard(key)?;
		for (locale, value) in translations {
			self.set_translation(key, locale.as_ref(), value).await?;
		}
		Ok(())
	}

	/// Turns buffered translations into rows once the owner has identity.
	///
	/// Returns the number of rows created. Does nothing, and keeps the buffer,
	/// while the owner still lacks identity. On a store failure the entries not
	/// yet written are kept for the next flush.
	#[instrument(skip(self), fields(owner_type = self.record.owner_type(), pending = self.pending.len()))]
	pub async fn flush_pending(&mut self) -> Result<usize> {
		if self.pending.is_empty() {
			return Ok(0);
		}

		let Some(owner) = self.record.owner_ref() else {
			tracing::debug!("owner has no identity yet, keeping pending translations");
			return Ok(0);
		};

		let mut entries = self.pending.take().into_iter();
		let mut flushed = 0;
		while let Some(entry) = entries.next() {
			if let Err(err) = self.engine.insert_pending(&owner, &entry).await {
				let mut unflushed = vec![entry];
				unflushed.extend(entries);
				self.pending.restore(unflushed);
				return Err(err);
			}
			flushed += 1;
		}

		self.record.clear_loaded_translations();
		tracing::debug!(owner = %owner, flushed, "pending translations flushed");
		Ok(flushed)
	}

	/// Saves the record through the host, then flushes pending translations.
	pub async fn save<P>(&mut self, persister: &P) -> Result<bool>
	where
		P: RecordPersister<R> + ?Sized,
	{
		let saved = persister
			.persist(&mut self.record)
			.await
			.map_err(TranslationError::Persist)?;
		self.flush_pending().await?;
		Ok(saved)
	}

	/// Deletes the translation of `key` in `locale`, returning how many rows
	/// (or buffered entries) were removed.
	#[instrument(skip(self), fields(owner_type = self.record.owner_type(), owner_id = ?self.record.identity()))]
	pub async fn forget_translation(&mut self, key: &str, locale: &str) -> Result<u64> {
		self.guard(key)?;

		let Some(owner) = self.record.owner_ref() else {
			return Ok(self.pending.remove(key, locale) as u64);
		};

		self.record.clear_loaded_translations();
		self.engine.forget(&owner, locale, key).await
	}

	/// Deletes the `locale` translation of every translatable attribute.
	pub async fn forget_all_translations(&mut self, locale: &str) -> Result<u64> {
		let keys = self.record.translatable_attributes().to_vec();
		let mut deleted = 0;
		for key in &keys {
			deleted += self.forget_translation(key, locale).await?;
		}
		Ok(deleted)
	}

	/// The stored row for `(key, locale)`, or a fresh unpersisted row.
	///
	/// `None` while the owner has no identity.
	pub async fn get_row_for_locale(&self, key: &str, locale: &str) -> Result<Option<TranslationRow>> {
		self.guard(key)?;
		match self.record.owner_ref() {
			Some(owner) => Ok(Some(
				self.engine
					.row_for_locale(&self.record, &owner, locale, key)
					.await?,
			)),
			None => Ok(None),
		}
	}

	/// Content of the current-locale row for `key`, without fallback.
	pub async fn get_row_content(&self, key: &str) -> Result<String> {
		let locale = self.settings().current_locale.clone();
		Ok(self
			.get_row_for_locale(key, &locale)
			.await?
			.map(|row| row.content)
			.unwrap_or_default())
	}

	/// Generic export of the record's raw attributes.
	///
	/// Translatable attributes present in raw storage are rendered per the
	/// configured [`ExportStyle`].
	pub async fn to_export(&self) -> Result<Map<String, Value>> {
		let mut exported = self.record.raw_attributes().clone();
		let keys: Vec<String> = exported
			.keys()
			.filter(|key| self.record.is_translatable_attribute(key))
			.cloned()
			.collect();

		for key in keys {
			let value = match self.settings().export_style {
				ExportStyle::Resolved => Value::String(self.get_translation(&key, "", true).await?),
				ExportStyle::AllLocales => Value::Object(
					self.get_translations(&key)
						.await?
						.into_iter()
						.map(|(locale, content)| (locale, Value::String(content)))
						.collect(),
				),
			};
			exported.insert(key, value);
		}
		Ok(exported)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cache::TranslationCache;
	use crate::record::AttributeRecord;
	use crate::store::{MemoryTranslationStore, StoreError, TranslationStore};
	use crate::types::OwnerRef;
	use async_trait::async_trait;
	use serde_json::json;
	use std::sync::Arc;

	fn engine() -> TranslationEngine {
		TranslationEngine::new(
			Arc::new(MemoryTranslationStore::new()),
			TranslationCache::new(),
			TranslationSettings::default().with_fallback_locale("en"),
		)
	}

	fn article() -> AttributeRecord {
		AttributeRecord::new("app::Article").with_translatable(["title", "body"])
	}

	#[tokio::test]
	async fn test_pass_through_for_plain_attributes() {
		let mut article = engine().attach(article().with_identity(1));
		article.set_value("slug", json!("hello")).await.unwrap();
		assert_eq!(article.get_value("slug").await.unwrap(), json!("hello"));
		assert_eq!(article.get_value("missing").await.unwrap(), Value::Null);
	}

	#[tokio::test]
	async fn test_guard_rejects_undeclared_key() {
		let mut article = engine().attach(article().with_identity(1));
		let err = article.set_translation("slug", "en", "x").await.unwrap_err();
		assert!(err.is_not_translatable());
		assert!(article.get_translations("slug").await.unwrap_err().is_not_translatable());
		assert!(article.forget_translation("slug", "en").await.unwrap_err().is_not_translatable());
		assert!(article.get_row_for_locale("slug", "en").await.unwrap_err().is_not_translatable());
		assert!(article.record().get_raw("slug").is_none());
	}

	#[tokio::test]
	async fn test_empty_locale_means_current() {
		let engine = engine().with_locale("fr");
		let mut article = engine.attach(article().with_identity(1));
		article.set_translation("title", "fr", "Bonjour").await.unwrap();
		assert_eq!(article.translate("title", "").await.unwrap(), "Bonjour");
	}

	#[tokio::test]
	async fn test_set_value_with_object_is_bulk_write() {
		let mut article = engine().attach(article().with_identity(1));
		article
			.set_value("title", json!({"en": "Hello", "fr": "Bonjour"}))
			.await
			.unwrap();

		let translations = article.get_translations("title").await.unwrap();
		assert_eq!(translations["en"], "Hello");
		assert_eq!(translations["fr"], "Bonjour");
		assert_eq!(article.record().get_raw("title"), Some(&json!("Hello")));
	}

	#[tokio::test]
	async fn test_set_value_mirrors_current_locale_content() {
		let engine = engine().with_locale("fr");
		let mut article = engine.attach(article().with_identity(1));
		article.set_value("title", json!("Bonjour")).await.unwrap();

		assert_eq!(article.record().get_raw("title"), Some(&json!("Bonjour")));
		assert_eq!(article.get_value("title").await.unwrap(), json!("Bonjour"));
	}

	#[tokio::test]
	async fn test_structured_values_serialized() {
		let mut article = engine().attach(article().with_identity(1));
		article
			.set_translation("body", "fr", json!(["a", "b"]))
			.await
			.unwrap();
		assert_eq!(
			article.get_translation("body", "fr", false).await.unwrap(),
			r#"["a","b"]"#
		);
	}

	#[tokio::test]
	async fn test_has_translation_and_locales() {
		let mut article = engine().attach(article().with_identity(1));
		article.set_translation("title", "en", "Hello").await.unwrap();
		article.set_translation("title", "fr", "Bonjour").await.unwrap();

		assert!(article.has_translation("title", None).await.unwrap());
		assert!(article.has_translation("title", Some("fr")).await.unwrap());
		assert!(!article.has_translation("title", Some("de")).await.unwrap());
		assert_eq!(
			article.get_translated_locales("title").await.unwrap(),
			vec!["en".to_string(), "fr".to_string()]
		);
	}

	#[tokio::test]
	async fn test_has_translation_empty_locale_means_current() {
		let engine = engine().with_locale("fr");
		let mut article = engine.attach(article().with_identity(1));
		assert!(!article.has_translation("title", Some("")).await.unwrap());

		article.set_translation("title", "fr", "Bonjour").await.unwrap();
		assert!(article.has_translation("title", Some("")).await.unwrap());
	}

	#[tokio::test]
	async fn test_view_merge_from_raw_without_caching() {
		let article = engine().attach(article().with_identity(1).with_attribute("title", ""));
		let translations = article.get_translations("title").await.unwrap();
		assert_eq!(translations.get("en").map(String::as_str), Some(""));

		let cached = article
			.engine()
			.cache()
			.peek_map(&crate::cache::MapCacheKey::new(&OwnerRef::new(1, "app::Article"), "title"))
			.unwrap();
		assert!(cached.is_empty());
	}

	#[tokio::test]
	async fn test_empty_export_suppresses_persist() {
		struct Bare {
			attributes: Map<String, Value>,
			translatable: Vec<String>,
		}

		impl TranslatableRecord for Bare {
			fn owner_type(&self) -> &str {
				"app::Bare"
			}
			fn identity(&self) -> Option<i64> {
				Some(5)
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
		}

		let store = Arc::new(MemoryTranslationStore::new());
		let engine = TranslationEngine::new(store.clone(), TranslationCache::new(), TranslationSettings::default());
		let mut bare = engine.attach(Bare {
			attributes: Map::new(),
			translatable: vec!["title".to_string()],
		});

		bare.set_translation("title", "fr", "Bonjour").await.unwrap();
		assert!(store.is_empty());
	}

	#[tokio::test]
	async fn test_forget_on_identity_less_owner_drops_buffered_entry() {
		let mut article = engine().attach(article());
		article.set_translation("title", "fr", "Bonjour").await.unwrap();
		article.set_translation("title", "en", "Hello").await.unwrap();

		assert_eq!(article.forget_translation("title", "fr").await.unwrap(), 1);
		assert_eq!(article.pending().len(), 1);
		assert!(article.get_row_for_locale("title", "en").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_flush_without_identity_keeps_buffer() {
		let mut article = engine().attach(article());
		article.set_translation("title", "en", "Hello").await.unwrap();
		assert_eq!(article.flush_pending().await.unwrap(), 0);
		assert_eq!(article.pending().len(), 1);
	}

	struct FailingStore;

	#[async_trait]
	impl TranslationStore for FailingStore {
		async fn find_rows(&self, _owner: &OwnerRef, _key: &str) -> std::result::Result<Vec<TranslationRow>, StoreError> {
			Ok(Vec::new())
		}
		async fn find_row(
			&self,
			_owner: &OwnerRef,
			_locale: &str,
			_key: &str,
		) -> std::result::Result<Option<TranslationRow>, StoreError> {
			Ok(None)
		}
		async fn find_owner_rows(&self, _owner: &OwnerRef) -> std::result::Result<Vec<TranslationRow>, StoreError> {
			Ok(Vec::new())
		}
		async fn insert_row(&self, _row: &TranslationRow) -> std::result::Result<TranslationRow, StoreError> {
			Err(StoreError::Invalid("read-only".to_string()))
		}
		async fn update_row(&self, _row: &TranslationRow) -> std::result::Result<TranslationRow, StoreError> {
			Err(StoreError::Invalid("read-only".to_string()))
		}
		async fn delete_rows(&self, _owner: &OwnerRef, _locale: &str, _key: &str) -> std::result::Result<u64, StoreError> {
			Ok(0)
		}
	}

	#[tokio::test]
	async fn test_failed_flush_keeps_entries() {
		let engine = TranslationEngine::new(Arc::new(FailingStore), TranslationCache::new(), TranslationSettings::default());
		let mut article = engine.attach(article());
		article.set_translation("title", "en", "Hello").await.unwrap();
		article.set_translation("title", "fr", "Bonjour").await.unwrap();
		article.record_mut().set_identity(9);

		let err = article.flush_pending().await.unwrap_err();
		assert!(matches!(err, TranslationError::Store(StoreError::Invalid(_))));
		assert_eq!(article.pending().len(), 2);
	}

	#[tokio::test]
	async fn test_failed_write_leaves_cache_invalidated() {
		let engine = TranslationEngine::new(Arc::new(FailingStore), TranslationCache::new(), TranslationSettings::default());
		let mut article = engine.attach(article().with_identity(3));
		article.get_translations("title").await.unwrap();

		let err = article.set_translation("title", "fr", "Bonjour").await.unwrap_err();
		assert!(matches!(err, TranslationError::Store(_)));
		let key = crate::cache::MapCacheKey::new(&OwnerRef::new(3, "app::Article"), "title");
		assert!(article.engine().cache().peek_map(&key).is_none());
	}

	#[tokio::test]
	async fn test_export_styles() {
		let mut article = engine().attach(article().with_identity(1).with_attribute("slug", "hello"));
		article.set_value("title", json!("Hello")).await.unwrap();
		article.set_translation("title", "fr", "Bonjour").await.unwrap();

		let resolved = article.to_export().await.unwrap();
		assert_eq!(resolved["title"], json!("Hello"));
		assert_eq!(resolved["slug"], json!("hello"));
		assert!(!resolved.contains_key("body"));

		let engine = article.engine().with_locale("fr");
		let french = engine.attach(article.into_inner());
		assert_eq!(french.to_export().await.unwrap()["title"], json!("Bonjour"));
	}

	#[tokio::test]
	async fn test_export_all_locales() {
		let engine = TranslationEngine::new(
			Arc::new(MemoryTranslationStore::new()),
			TranslationCache::new(),
			TranslationSettings::default().with_export_style(ExportStyle::AllLocales),
		);
		let mut article = engine.attach(article().with_identity(1).with_attribute("slug", "hello"));
		article.set_translation("title", "en", "Hello").await.unwrap();
		article.set_translation("title", "fr", "Bonjour").await.unwrap();

		let exported = article.to_export().await.unwrap();
		assert_eq!(exported["title"], json!({"en": "Hello", "fr": "Bonjour"}));
		assert_eq!(exported["slug"], json!("hello"));
		assert!(!exported.contains_key("body"));
	}
}
