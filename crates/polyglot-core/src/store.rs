// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Durable translation row storage.
//!
//! [`TranslationStore`] is the seam to the relational backend. The engine only
//! ever talks to it through [`CacheInvalidatingStore`], which invalidates both
//! cache views for a row right after the row is created or updated.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::cache::TranslationCache;
use crate::types::{OwnerRef, TranslationRow};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("Store backend error: {0}")]
	Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

	#[error("Invalid translation row: {0}")]
	Invalid(String),

	#[error("Translation row not found: {0}")]
	NotFound(String),
}

impl StoreError {
	pub fn backend<E>(err: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		Self::Backend(Box::new(err))
	}
}

/// Access to persisted translation rows.
#[async_trait]
pub trait TranslationStore: Send + Sync {
	/// All rows for `(owner, key)`, ordered by id.
	async fn find_rows(&self, owner: &OwnerRef, key: &str) -> Result<Vec<TranslationRow>, StoreError>;

	/// The first row for `(owner, locale, key)`, if any.
	async fn find_row(
		&self,
		owner: &OwnerRef,
		locale: &str,
		key: &str,
	) -> Result<Option<TranslationRow>, StoreError>;

	/// All rows for `owner` across every key and locale, ordered by id.
	async fn find_owner_rows(&self, owner: &OwnerRef) -> Result<Vec<TranslationRow>, StoreError>;

	/// Persists a new row, returning it with id and timestamps assigned.
	async fn insert_row(&self, row: &TranslationRow) -> Result<TranslationRow, StoreError>;

	/// Updates searchable flag and content of an existing row.
	async fn update_row(&self, row: &TranslationRow) -> Result<TranslationRow, StoreError>;

	/// Deletes every row for `(owner, locale, key)`, returning the count.
	async fn delete_rows(&self, owner: &OwnerRef, locale: &str, key: &str) -> Result<u64, StoreError>;

	async fn save_row(&self, row: &TranslationRow) -> Result<TranslationRow, StoreError> {
		if row.is_persisted() {
			self.update_row(row).await
		} else {
			self.insert_row(row).await
		}
	}
}

pub type SharedTranslationStore = Arc<dyn TranslationStore>;

/// Process-local store, used in tests and by hosts without a database.
#[derive(Debug)]
pub struct MemoryTranslationStore {
	rows: RwLock<Vec<TranslationRow>>,
	next_id: AtomicI64,
}

impl Default for MemoryTranslationStore {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryTranslationStore {
	pub fn new() -> Self {
		Self {
			rows: RwLock::new(Vec::new()),
			next_id: AtomicI64::new(1),
		}
	}

	/// Snapshot of every stored row in insertion order.
	pub fn rows(&self) -> Vec<TranslationRow> {
		self.rows.read().clone()
	}

	pub fn len(&self) -> usize {
		self.rows.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.read().is_empty()
	}
}

#[async_trait]
impl TranslationStore for MemoryTranslationStore {
	async fn find_rows(&self, owner: &OwnerRef, key: &str) -> Result<Vec<TranslationRow>, StoreError> {
		Ok(self
			.rows
			.read()
			.iter()
			.filter(|row| row.belongs_to(owner) && row.key == key)
			.cloned()
			.collect())
	}

	async fn find_row(
		&self,
		owner: &OwnerRef,
		locale: &str,
		key: &str,
	) -> Result<Option<TranslationRow>, StoreError> {
		Ok(self
			.rows
			.read()
			.iter()
			.find(|row| row.matches(owner, locale, key))
			.cloned())
	}

	async fn find_owner_rows(&self, owner: &OwnerRef) -> Result<Vec<TranslationRow>, StoreError> {
		Ok(self
			.rows
			.read()
			.iter()
			.filter(|row| row.belongs_to(owner))
			.cloned()
			.collect())
	}

	async fn insert_row(&self, row: &TranslationRow) -> Result<TranslationRow, StoreError> {
		let now = Utc::now();
		let mut stored = row.clone();
		stored.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
		stored.created_at = Some(now);
		stored.updated_at = Some(now);
		self.rows.write().push(stored.clone());
		Ok(stored)
	}

	async fn update_row(&self, row: &TranslationRow) -> Result<TranslationRow, StoreError> {
		let id = row
			.id
			.ok_or_else(|| StoreError::Invalid("cannot update a row without id".to_string()))?;

		let mut rows = self.rows.write();
		let existing = rows
			.iter_mut()
			.find(|existing| existing.id == Some(id))
			.ok_or_else(|| StoreError::NotFound(format!("translation row {id}")))?;
		existing.searchable = row.searchable;
		existing.content = row.content.clone();
		existing.updated_at = Some(Utc::now());
		Ok(existing.clone())
	}

	async fn delete_rows(&self, owner: &OwnerRef, locale: &str, key: &str) -> Result<u64, StoreError> {
		let mut rows = self.rows.write();
		let before = rows.len();
		rows.retain(|row| !row.matches(owner, locale, key));
		Ok((before - rows.len()) as u64)
	}
}

/// Wraps a store so row creates and updates invalidate both cache views.
///
/// [`TranslationEngine::store`](crate::TranslationEngine::store) hands this
/// out, so writes made beside the engine do not leave cached maps stale.
/// Deletes are not invalidated here; callers that delete own that step.
#[derive(Clone)]
pub struct CacheInvalidatingStore {
	inner: SharedTranslationStore,
	cache: TranslationCache,
}

impl std::fmt::Debug for CacheInvalidatingStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CacheInvalidatingStore")
			.field("cache", &self.cache)
			.finish_non_exhaustive()
	}
}

impl CacheInvalidatingStore {
	pub fn new(inner: SharedTranslationStore, cache: TranslationCache) -> Self {
		Self { inner, cache }
	}

	pub fn inner(&self) -> &SharedTranslationStore {
		&self.inner
	}
}

#[async_trait]
impl TranslationStore for CacheInvalidatingStore {
	async fn find_rows(&self, owner: &OwnerRef, key: &str) -> Result<Vec<TranslationRow>, StoreError> {
		self.inner.find_rows(owner, key).await
	}

	async fn find_row(
		&self,
		owner: &OwnerRef,
		locale: &str,
		key: &str,
	) -> Result<Option<TranslationRow>, StoreError> {
		self.inner.find_row(owner, locale, key).await
	}

	async fn find_owner_rows(&self, owner: &OwnerRef) -> Result<Vec<TranslationRow>, StoreError> {
		self.inner.find_owner_rows(owner).await
	}

	async fn insert_row(&self, row: &TranslationRow) -> Result<TranslationRow, StoreError> {
		let stored = self.inner.insert_row(row).await?;
		self.cache.invalidate_for_row(&stored);
		Ok(stored)
	}

	async fn update_row(&self, row: &TranslationRow) -> Result<TranslationRow, StoreError> {
		let stored = self.inner.update_row(row).await?;
		self.cache.invalidate_for_row(&stored);
		Ok(stored)
	}

	async fn delete_rows(&self, owner: &OwnerRef, locale: &str, key: &str) -> Result<u64, StoreError> {
		self.inner.delete_rows(owner, locale, key).await
	}
}
