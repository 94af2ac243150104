// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared translation engine.
//!
//! The engine owns the store, cache, listener and settings. It is cheap to
//! clone and is shared by every [`Translatable`] it hands out. Per-owner
//! state (the record and its pending buffer) lives in the wrapper.

use std::sync::Arc;

use tracing::instrument;

use crate::cache::{MapCacheKey, RowCacheKey, TranslationCache};
use crate::error::Result;
use crate::listener::{NoOpTranslationListener, SharedTranslationListener, TranslationChanged};
use crate::pending::PendingTranslation;
use crate::record::TranslatableRecord;
use crate::settings::TranslationSettings;
use crate::store::{CacheInvalidatingStore, SharedTranslationStore, StoreError, TranslationStore};
use crate::translatable::Translatable;
use crate::types::{locale_map_from_rows, serialize_content, LocaleMap, OwnerRef, TranslationRow};

#[derive(Clone)]
pub struct TranslationEngine {
	store: CacheInvalidatingStore,
	cache: TranslationCache,
	listener: SharedTranslationListener,
	settings: Arc<TranslationSettings>,
}

impl std::fmt::Debug for TranslationEngine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TranslationEngine")
			.field("cache", &self.cache)
			.field("settings", &self.settings)
			.finish_non_exhaustive()
	}
}

impl TranslationEngine {
	/// Creates an engine.
	///
	/// `settings.cache_disabled` disables `cache` for every engine sharing it.
	/// An engine with caching enabled never re-enables a shared cache.
	pub fn new(store: SharedTranslationStore, cache: TranslationCache, settings: TranslationSettings) -> Self {
		if settings.cache_disabled {
			cache.set_disabled(true);
		}
		Self {
			store: CacheInvalidatingStore::new(store, cache.clone()),
			cache,
			listener: Arc::new(NoOpTranslationListener),
			settings: Arc::new(settings),
		}
	}

	pub fn with_listener(mut self, listener: SharedTranslationListener) -> Self {
		self.listener = listener;
		self
	}

	/// An engine sharing this one's store and cache but reading and writing
	/// `locale` as the current locale.
	pub fn with_locale(&self, locale: impl Into<String>) -> Self {
		let settings = TranslationSettings {
			current_locale: locale.into(),
			..(*self.settings).clone()
		};
		Self {
			store: self.store.clone(),
			cache: self.cache.clone(),
			listener: self.listener.clone(),
			settings: Arc::new(settings),
		}
	}

	/// Wraps `record` so its translatable attributes go through this engine.
	pub fn attach<R: TranslatableRecord>(&self, record: R) -> Translatable<R> {
		Translatable::new(self.clone(), record)
	}

	pub fn settings(&self) -> &TranslationSettings {
		&self.settings
	}

	pub fn cache(&self) -> &TranslationCache {
		&self.cache
	}

	/// The engine's store. Creates and updates made through it invalidate
	/// this engine's cache, so hosts writing rows directly should use it.
	pub fn store(&self) -> &CacheInvalidatingStore {
		&self.store
	}

	/// Stored `locale -> content` map for one attribute, through the map cache.
	///
	/// The loaded association is preferred over a store query. An empty or
	/// missing default-locale entry is backfilled from a non-empty raw value.
	pub(crate) async fn stored_locale_map<R: TranslatableRecord>(
		&self,
		record: &R,
		owner: &OwnerRef,
		key: &str,
	) -> Result<LocaleMap> {
		let store = &self.store;
		let map = self
			.cache
			.map_or_compute(&MapCacheKey::new(owner, key), move || async move {
				let mut map = match record.loaded_translations() {
					Some(rows) => locale_map_from_rows(
						rows.iter().filter(|row| row.belongs_to(owner) && row.key == key),
					),
					None => locale_map_from_rows(&store.find_rows(owner, key).await?),
				};
				self.backfill_default(record, key, &mut map);
				Ok::<_, StoreError>(map)
			})
			.await?;
		Ok(map)
	}

	/// Fills the default-locale entry from raw storage when it is missing or
	/// empty and the raw value is not.
	pub(crate) fn backfill_default<R: TranslatableRecord>(&self, record: &R, key: &str, map: &mut LocaleMap) {
		let default_locale = &self.settings.default_locale;
		if map.get(default_locale).is_some_and(|content| !content.is_empty()) {
			return;
		}

		let raw = record.get_raw(key).map(serialize_content).unwrap_or_default();
		if !raw.is_empty() {
			map.insert(default_locale.clone(), raw);
		}
	}

	/// Existing row for `(owner, locale, key)` or a fresh unpersisted one,
	/// through the row cache.
	pub(crate) async fn row_for_locale<R: TranslatableRecord>(
		&self,
		record: &R,
		owner: &OwnerRef,
		locale: &str,
		key: &str,
	) -> Result<TranslationRow> {
		let store = &self.store;
		let row = self
			.cache
			.row_or_compute(&RowCacheKey::new(owner, locale, key), move || async move {
				let loaded = record
					.loaded_translations()
					.and_then(|rows| rows.iter().find(|row| row.matches(owner, locale, key)).cloned());
				let existing = match loaded {
					Some(row) => Some(row),
					None => store.find_row(owner, locale, key).await?,
				};
				Ok::<_, StoreError>(existing.unwrap_or_else(|| {
					TranslationRow::new(owner, locale, key, record.is_searchable_attribute(key))
				}))
			})
			.await?;
		Ok(row)
	}

	/// Creates or updates the row for `(owner, locale, key)` with `content`.
	///
	/// Both cache views are invalidated before the write, so a failed persist
	/// leaves nothing stale behind.
	#[instrument(skip(self, record, content), fields(owner = %owner))]
	pub(crate) async fn write_row<R: TranslatableRecord>(
		&self,
		record: &R,
		owner: &OwnerRef,
		locale: &str,
		key: &str,
		content: String,
	) -> Result<TranslationRow> {
		self.cache.invalidate_map(&MapCacheKey::new(owner, key));
		self.cache.invalidate_row(&RowCacheKey::new(owner, locale, key));

		let mut row = self.row_for_locale(record, owner, locale, key).await?;
		row.searchable = record.is_searchable_attribute(key);
		row.content = content;
		let saved = self.store.save_row(&row).await?;

		tracing::debug!(row_id = ?saved.id, "translation row saved");
		Ok(saved)
	}

	/// Persists one buffered translation for an owner that now has identity.
	pub(crate) async fn insert_pending(&self, owner: &OwnerRef, entry: &PendingTranslation) -> Result<TranslationRow> {
		let row = TranslationRow::new(owner, entry.locale.as_str(), entry.key.as_str(), entry.searchable)
			.with_content(entry.content.as_str());
		let saved = self.store.insert_row(&row).await?;
		self.cache.invalidate_row(&RowCacheKey::new(owner, entry.locale.as_str(), entry.key.as_str()));
		Ok(saved)
	}

	/// Deletes the rows for `(owner, locale, key)` and invalidates both views.
	#[instrument(skip(self), fields(owner = %owner))]
	pub(crate) async fn forget(&self, owner: &OwnerRef, locale: &str, key: &str) -> Result<u64> {
		let deleted = self.store.delete_rows(owner, locale, key).await?;
		self.cache.invalidate_map(&MapCacheKey::new(owner, key));
		self.cache.invalidate_row(&RowCacheKey::new(owner, locale, key));
		tracing::debug!(deleted, "translation forgotten");
		Ok(deleted)
	}

	pub(crate) async fn notify(&self, change: TranslationChanged) {
		self.listener.on_translation_changed(change).await;
	}
}
