// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Invalidation-on-write caches for translation rows and locale maps.
//!
//! Two views are kept over the same stored rows:
//!
//! - single rows keyed by [`RowCacheKey`] `(owner, locale, key)`
//! - full locale maps keyed by [`MapCacheKey`] `(owner, key)`
//!
//! Entries never expire. They are removed only by explicit invalidation, which
//! every mutation path performs. When the cache is disabled every read first
//! invalidates its entry and so always recomputes from the store.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::types::{LocaleMap, OwnerRef, TranslationRow};

/// Key of the single-row view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowCacheKey {
	pub owner_id: i64,
	pub owner_type: String,
	pub locale: String,
	pub key: String,
}

impl RowCacheKey {
	pub fn new(owner: &OwnerRef, locale: impl Into<String>, key: impl Into<String>) -> Self {
		Self {
			owner_id: owner.id,
			owner_type: owner.owner_type.clone(),
			locale: locale.into(),
			key: key.into(),
		}
	}

	pub fn for_row(row: &TranslationRow) -> Self {
		Self {
			owner_id: row.owner_id,
			owner_type: row.owner_type.clone(),
			locale: row.locale.clone(),
			key: row.key.clone(),
		}
	}

	/// Flat string form for string-keyed backends.
	pub fn cache_key(&self) -> String {
		format!(
			"translation_{}_{}_{}_{}",
			self.owner_id, self.owner_type, self.locale, self.key
		)
	}
}

/// Key of the full locale-map view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapCacheKey {
	pub owner_id: i64,
	pub owner_type: String,
	pub key: String,
}

impl MapCacheKey {
	pub fn new(owner: &OwnerRef, key: impl Into<String>) -> Self {
		Self {
			owner_id: owner.id,
			owner_type: owner.owner_type.clone(),
			key: key.into(),
		}
	}

	pub fn for_row(row: &TranslationRow) -> Self {
		Self {
			owner_id: row.owner_id,
			owner_type: row.owner_type.clone(),
			key: row.key.clone(),
		}
	}

	/// Flat string form for string-keyed backends.
	pub fn cache_key(&self) -> String {
		format!("translation_{}_{}_{}", self.owner_id, self.owner_type, self.key)
	}
}

/// Storage behind one cache view.
///
/// Implementations must be cheap and must not block on I/O; they are called
/// while the engine is between store round trips.
pub trait CacheBackend<K, V>: Send + Sync {
	fn get(&self, key: &K) -> Option<V>;
	fn put(&self, key: K, value: V);
	/// Returns whether an entry was removed.
	fn remove(&self, key: &K) -> bool;
	fn clear(&self);
	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Process-local backend over a `HashMap`.
#[derive(Debug)]
pub struct MemoryCacheBackend<K, V> {
	entries: RwLock<HashMap<K, V>>,
}

impl<K, V> MemoryCacheBackend<K, V> {
	pub fn new() -> Self {
		Self {
			entries: RwLock::new(HashMap::new()),
		}
	}
}

impl<K, V> Default for MemoryCacheBackend<K, V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K, V> CacheBackend<K, V> for MemoryCacheBackend<K, V>
where
	K: Eq + Hash + Send + Sync,
	V: Clone + Send + Sync,
{
	fn get(&self, key: &K) -> Option<V> {
		self.entries.read().get(key).cloned()
	}

	fn put(&self, key: K, value: V) {
		self.entries.write().insert(key, value);
	}

	fn remove(&self, key: &K) -> bool {
		self.entries.write().remove(key).is_some()
	}

	fn clear(&self) {
		self.entries.write().clear();
	}

	fn len(&self) -> usize {
		self.entries.read().len()
	}
}

#[derive(Debug, Default)]
struct CacheCounters {
	hits: AtomicU64,
	misses: AtomicU64,
	invalidations: AtomicU64,
}

/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
	pub hits: u64,
	pub misses: u64,
	/// Explicit invalidation requests, whether or not an entry was present.
	pub invalidations: u64,
}

type RowBackend = Box<dyn CacheBackend<RowCacheKey, TranslationRow>>;
type MapBackend = Box<dyn CacheBackend<MapCacheKey, LocaleMap>>;

struct CacheInner {
	rows: RowBackend,
	maps: MapBackend,
	disabled: AtomicBool,
	counters: CacheCounters,
}

/// Shared handle over both cache views.
///
/// Cloning is cheap; clones share the same entries.
#[derive(Clone)]
pub struct TranslationCache {
	inner: Arc<CacheInner>,
}

impl std::fmt::Debug for TranslationCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TranslationCache")
			.field("rows", &self.inner.rows.len())
			.field("maps", &self.inner.maps.len())
			.field("disabled", &self.is_disabled())
			.finish()
	}
}

impl Default for TranslationCache {
	fn default() -> Self {
		Self::new()
	}
}

impl TranslationCache {
	/// In-memory cache with both views enabled.
	pub fn new() -> Self {
		Self::with_backends(
			Box::new(MemoryCacheBackend::new()),
			Box::new(MemoryCacheBackend::new()),
		)
	}

	pub fn with_backends(rows: RowBackend, maps: MapBackend) -> Self {
		Self {
			inner: Arc::new(CacheInner {
				rows,
				maps,
				disabled: AtomicBool::new(false),
				counters: CacheCounters::default(),
			}),
		}
	}

	pub fn set_disabled(&self, disabled: bool) {
		self.inner.disabled.store(disabled, Ordering::SeqCst);
	}

	pub fn is_disabled(&self) -> bool {
		self.inner.disabled.load(Ordering::SeqCst)
	}

	/// Returns the cached row, or computes, stores and returns it.
	///
	/// Producer errors are returned unchanged and nothing is cached.
	pub async fn row_or_compute<F, Fut, E>(&self, key: &RowCacheKey, produce: F) -> Result<TranslationRow, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<TranslationRow, E>>,
	{
		if self.is_disabled() {
			self.inner.rows.remove(key);
		}

		if let Some(row) = self.inner.rows.get(key) {
			self.record_hit(&key.cache_key());
			return Ok(row);
		}

		self.record_miss(&key.cache_key());
		let row = produce().await?;
		self.inner.rows.put(key.clone(), row.clone());
		Ok(row)
	}

	/// Returns the cached locale map, or computes, stores and returns it.
	pub async fn map_or_compute<F, Fut, E>(&self, key: &MapCacheKey, produce: F) -> Result<LocaleMap, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<LocaleMap, E>>,
	{
		if self.is_disabled() {
			self.inner.maps.remove(key);
		}

		if let Some(map) = self.inner.maps.get(key) {
			self.record_hit(&key.cache_key());
			return Ok(map);
		}

		self.record_miss(&key.cache_key());
		let map = produce().await?;
		self.inner.maps.put(key.clone(), map.clone());
		Ok(map)
	}

	pub fn peek_row(&self, key: &RowCacheKey) -> Option<TranslationRow> {
		self.inner.rows.get(key)
	}

	pub fn peek_map(&self, key: &MapCacheKey) -> Option<LocaleMap> {
		self.inner.maps.get(key)
	}

	pub fn invalidate_row(&self, key: &RowCacheKey) {
		self.inner.counters.invalidations.fetch_add(1, Ordering::Relaxed);
		let removed = self.inner.rows.remove(key);
		tracing::debug!(cache_key = %key.cache_key(), removed, "invalidated translation row");
	}

	pub fn invalidate_map(&self, key: &MapCacheKey) {
		self.inner.counters.invalidations.fetch_add(1, Ordering::Relaxed);
		let removed = self.inner.maps.remove(key);
		tracing::debug!(cache_key = %key.cache_key(), removed, "invalidated translation map");
	}

	/// Invalidates both views derived from `row`'s owner, locale and key.
	pub fn invalidate_for_row(&self, row: &TranslationRow) {
		self.invalidate_row(&RowCacheKey::for_row(row));
		self.invalidate_map(&MapCacheKey::for_row(row));
	}

	pub fn clear(&self) {
		self.inner.rows.clear();
		self.inner.maps.clear();
	}

	pub fn len(&self) -> usize {
		self.inner.rows.len() + self.inner.maps.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn stats(&self) -> CacheStats {
		let counters = &self.inner.counters;
		CacheStats {
			hits: counters.hits.load(Ordering::Relaxed),
			misses: counters.misses.load(Ordering::Relaxed),
			invalidations: counters.invalidations.load(Ordering::Relaxed),
		}
	}

	fn record_hit(&self, cache_key: &str) {
		self.inner.counters.hits.fetch_add(1, Ordering::Relaxed);
		tracing::trace!(cache_key, "translation cache hit");
	}

	fn record_miss(&self, cache_key: &str) {
		self.inner.counters.misses.fetch_add(1, Ordering::Relaxed);
		tracing::debug!(cache_key, "translation cache miss");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::convert::Infallible;
	use std::sync::atomic::AtomicUsize;

	fn owner() -> OwnerRef {
		OwnerRef::new(42, "app::Article")
	}

	fn english() -> LocaleMap {
		let mut map = LocaleMap::new();
		map.insert("en".to_string(), "Hello".to_string());
		map
	}

	#[test]
	fn test_cache_key_strings() {
		let row_key = RowCacheKey::new(&owner(), "en", "title");
		assert_eq!(row_key.cache_key(), "translation_42_app::Article_en_title");

		let map_key = MapCacheKey::new(&owner(), "title");
		assert_eq!(map_key.cache_key(), "translation_42_app::Article_title");
	}

	#[test]
	fn test_keys_for_row_match_explicit_keys() {
		let row = TranslationRow::new(&owner(), "fr", "title", false);
		assert_eq!(RowCacheKey::for_row(&row), RowCacheKey::new(&owner(), "fr", "title"));
		assert_eq!(MapCacheKey::for_row(&row), MapCacheKey::new(&owner(), "title"));
	}

	#[tokio::test]
	async fn test_map_computed_once_then_hit() {
		let cache = TranslationCache::new();
		let key = MapCacheKey::new(&owner(), "title");
		let calls = AtomicUsize::new(0);
		let counter = &calls;

		for _ in 0..3 {
			let map = cache
				.map_or_compute(&key, move || async move {
					counter.fetch_add(1, Ordering::SeqCst);
					Ok::<_, Infallible>(english())
				})
				.await
				.unwrap();
			assert_eq!(map, english());
		}

		assert_eq!(calls.load(Ordering::SeqCst), 1);
		let stats = cache.stats();
		assert_eq!(stats.misses, 1);
		assert_eq!(stats.hits, 2);
	}

	#[tokio::test]
	async fn test_invalidate_forces_recompute() {
		let cache = TranslationCache::new();
		let key = MapCacheKey::new(&owner(), "title");

		cache
			.map_or_compute(&key, || async { Ok::<_, Infallible>(english()) })
			.await
			.unwrap();
		cache.invalidate_map(&key);
		assert!(cache.peek_map(&key).is_none());

		let map = cache
			.map_or_compute(&key, || async { Ok::<_, Infallible>(LocaleMap::new()) })
			.await
			.unwrap();
		assert!(map.is_empty());
		assert_eq!(cache.stats().invalidations, 1);
	}

	#[tokio::test]
	async fn test_invalidate_missing_entry_is_noop() {
		let cache = TranslationCache::new();
		cache.invalidate_row(&RowCacheKey::new(&owner(), "en", "title"));
		assert!(cache.is_empty());
	}

	#[tokio::test]
	async fn test_disabled_cache_always_recomputes() {
		let cache = TranslationCache::new();
		cache.set_disabled(true);
		let key = RowCacheKey::new(&owner(), "en", "title");
		let calls = AtomicUsize::new(0);
		let counter = &calls;

		for _ in 0..2 {
			cache
				.row_or_compute(&key, move || async move {
					counter.fetch_add(1, Ordering::SeqCst);
					Ok::<_, Infallible>(TranslationRow::new(&owner(), "en", "title", false))
				})
				.await
				.unwrap();
		}

		assert_eq!(calls.load(Ordering::SeqCst), 2);
		assert_eq!(cache.stats().hits, 0);
	}

	#[tokio::test]
	async fn test_producer_error_is_not_cached() {
		let cache = TranslationCache::new();
		let key = MapCacheKey::new(&owner(), "title");

		let result = cache
			.map_or_compute(&key, || async { Err::<LocaleMap, _>("boom") })
			.await;
		assert_eq!(result, Err("boom"));
		assert!(cache.peek_map(&key).is_none());
	}

	#[tokio::test]
	async fn test_invalidate_for_row_clears_both_views() {
		let cache = TranslationCache::new();
		let row = TranslationRow::new(&owner(), "en", "title", false).with_content("Hello");

		cache
			.row_or_compute(&RowCacheKey::for_row(&row), {
				let row = row.clone();
				move || async move { Ok::<_, Infallible>(row) }
			})
			.await
			.unwrap();
		cache
			.map_or_compute(&MapCacheKey::for_row(&row), || async { Ok::<_, Infallible>(english()) })
			.await
			.unwrap();
		assert_eq!(cache.len(), 2);

		cache.invalidate_for_row(&row);
		assert!(cache.is_empty());
	}

	#[test]
	fn test_memory_backend_remove_reports_presence() {
		let backend: MemoryCacheBackend<String, u32> = MemoryCacheBackend::new();
		backend.put("a".to_string(), 1);
		assert_eq!(backend.get(&"a".to_string()), Some(1));
		assert!(backend.remove(&"a".to_string()));
		assert!(!backend.remove(&"a".to_string()));
		assert!(backend.is_empty());
	}
}
