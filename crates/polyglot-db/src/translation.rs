// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Translation row repository over the `translations` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use polyglot_core::{OwnerRef, StoreError, TranslationCache, TranslationRow, TranslationStore};
use sqlx::{sqlite::SqlitePool, FromRow};

use crate::error::{DbError, Result};

pub const MAX_LOCALE_LEN: usize = 20;
pub const MAX_KEY_LEN: usize = 250;
pub const MAX_OWNER_TYPE_LEN: usize = 250;

const SELECT_COLUMNS: &str = "SELECT id, translatable_id, translatable_type, lang, searchable, content, \
	content_key, created_at, updated_at FROM translations";

#[derive(Debug, Clone, FromRow)]
struct TranslationRecordRow {
	id: i64,
	translatable_id: i64,
	translatable_type: String,
	lang: String,
	searchable: String,
	content: Option<String>,
	content_key: String,
	created_at: Option<String>,
	updated_at: Option<String>,
}

fn parse_timestamp(value: Option<String>, column: &str) -> Result<Option<DateTime<Utc>>> {
	value
		.map(|s| {
			DateTime::parse_from_rfc3339(&s)
				.map(|dt| dt.with_timezone(&Utc))
				.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
		})
		.transpose()
}

impl TryFrom<TranslationRecordRow> for TranslationRow {
	type Error = DbError;

	fn try_from(row: TranslationRecordRow) -> Result<Self> {
		Ok(TranslationRow {
			id: Some(row.id),
			owner_id: row.translatable_id,
			owner_type: row.translatable_type,
			locale: row.lang,
			key: row.content_key,
			content: row.content.unwrap_or_default(),
			searchable: row.searchable == "1",
			created_at: parse_timestamp(row.created_at, "created_at")?,
			updated_at: parse_timestamp(row.updated_at, "updated_at")?,
		})
	}
}

fn searchable_flag(searchable: bool) -> &'static str {
	if searchable {
		"1"
	} else {
		"0"
	}
}

/// Rejects rows whose columns would not fit the schema.
pub fn validate_row(row: &TranslationRow) -> Result<()> {
	let checks = [
		("lang", row.locale.as_str(), MAX_LOCALE_LEN),
		("content_key", row.key.as_str(), MAX_KEY_LEN),
		("translatable_type", row.owner_type.as_str(), MAX_OWNER_TYPE_LEN),
	];
	for (column, value, max) in checks {
		if value.chars().count() > max {
			return Err(DbError::Invalid(format!(
				"{column} exceeds {max} characters"
			)));
		}
	}
	Ok(())
}

#[derive(Clone)]
pub struct TranslationRepository {
	pool: SqlitePool,
	cache: Option<TranslationCache>,
}

impl TranslationRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool, cache: None }
	}

	/// Invalidates both views of `cache` after every row insert and update,
	/// for hosts that write rows without going through an engine.
	pub fn with_cache(mut self, cache: TranslationCache) -> Self {
		self.cache = Some(cache);
		self
	}

	fn invalidate(&self, row: &TranslationRow) {
		if let Some(cache) = &self.cache {
			cache.invalidate_for_row(row);
		}
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	#[tracing::instrument(skip(self, owner), fields(owner = %owner))]
	pub async fn find_rows(&self, owner: &OwnerRef, key: &str) -> Result<Vec<TranslationRow>> {
		let rows: Vec<TranslationRecordRow> = sqlx::query_as(&format!(
			"{SELECT_COLUMNS} WHERE translatable_id = ?1 AND translatable_type = ?2 AND content_key = ?3 ORDER BY id"
		))
		.bind(owner.id)
		.bind(&owner.owner_type)
		.bind(key)
		.fetch_all(&self.pool)
		.await?;

		tracing::debug!(count = rows.len(), "loaded translation rows");
		rows.into_iter().map(TranslationRow::try_from).collect()
	}

	#[tracing::instrument(skip(self, owner), fields(owner = %owner))]
	pub async fn find_row(&self, owner: &OwnerRef, locale: &str, key: &str) -> Result<Option<TranslationRow>> {
		let row: Option<TranslationRecordRow> = sqlx::query_as(&format!(
			"{SELECT_COLUMNS} WHERE translatable_id = ?1 AND translatable_type = ?2 AND lang = ?3 \
			 AND content_key = ?4 ORDER BY id LIMIT 1"
		))
		.bind(owner.id)
		.bind(&owner.owner_type)
		.bind(locale)
		.bind(key)
		.fetch_optional(&self.pool)
		.await?;

		row.map(TranslationRow::try_from).transpose()
	}

	#[tracing::instrument(skip(self, owner), fields(owner = %owner))]
	pub async fn find_owner_rows(&self, owner: &OwnerRef) -> Result<Vec<TranslationRow>> {
		let rows: Vec<TranslationRecordRow> = sqlx::query_as(&format!(
			"{SELECT_COLUMNS} WHERE translatable_id = ?1 AND translatable_type = ?2 ORDER BY id"
		))
		.bind(owner.id)
		.bind(&owner.owner_type)
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TranslationRow::try_from).collect()
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_by_id(&self, id: i64) -> Result<TranslationRow> {
		let row: Option<TranslationRecordRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		row.ok_or_else(|| DbError::NotFound(format!("translation row {id}")))?
			.try_into()
	}

	#[tracing::instrument(
		skip(self, row),
		fields(owner_id = row.owner_id, owner_type = %row.owner_type, lang = %row.locale, key = %row.key)
	)]
	pub async fn insert_row(&self, row: &TranslationRow) -> Result<TranslationRow> {
		validate_row(row)?;
		let now = Utc::now();

		let result = sqlx::query(
			r#"
			INSERT INTO translations
				(translatable_id, translatable_type, lang, searchable, content, content_key, created_at, updated_at)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
			"#,
		)
		.bind(row.owner_id)
		.bind(&row.owner_type)
		.bind(&row.locale)
		.bind(searchable_flag(row.searchable))
		.bind(&row.content)
		.bind(&row.key)
		.bind(now.to_rfc3339())
		.bind(now.to_rfc3339())
		.execute(&self.pool)
		.await?;

		let mut stored = row.clone();
		stored.id = Some(result.last_insert_rowid());
		stored.created_at = Some(now);
		stored.updated_at = Some(now);

		self.invalidate(&stored);
		tracing::debug!(id = ?stored.id, "translation row inserted");
		Ok(stored)
	}

	#[tracing::instrument(skip(self, row), fields(id = ?row.id))]
	pub async fn update_row(&self, row: &TranslationRow) -> Result<TranslationRow> {
		validate_row(row)?;
		let id = row
			.id
			.ok_or_else(|| DbError::Invalid("cannot update a translation row without id".to_string()))?;

		let result = sqlx::query(
			r#"
			UPDATE translations
			SET searchable = ?1, content = ?2, updated_at = ?3
			WHERE id = ?4
			"#,
		)
		.bind(searchable_flag(row.searchable))
		.bind(&row.content)
		.bind(Utc::now().to_rfc3339())
		.bind(id)
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("translation row {id}")));
		}

		let stored = self.get_by_id(id).await?;
		self.invalidate(&stored);
		Ok(stored)
	}

	#[tracing::instrument(skip(self, owner), fields(owner = %owner))]
	pub async fn delete_rows(&self, owner: &OwnerRef, locale: &str, key: &str) -> Result<u64> {
		let result = sqlx::query(
			r#"
			DELETE FROM translations
			WHERE translatable_id = ?1 AND translatable_type = ?2 AND lang = ?3 AND content_key = ?4
			"#,
		)
		.bind(owner.id)
		.bind(&owner.owner_type)
		.bind(locale)
		.bind(key)
		.execute(&self.pool)
		.await?;

		tracing::debug!(deleted = result.rows_affected(), "translation rows deleted");
		Ok(result.rows_affected())
	}

	#[tracing::instrument(skip(self))]
	pub async fn count(&self) -> Result<i64> {
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM translations")
			.fetch_one(&self.pool)
			.await?;
		Ok(count)
	}
}

#[async_trait]
impl TranslationStore for TranslationRepository {
	async fn find_rows(&self, owner: &OwnerRef, key: &str) -> std::result::Result<Vec<TranslationRow>, StoreError> {
		Ok(self.find_rows(owner, key).await?)
	}

	async fn find_row(
		&self,
		owner: &OwnerRef,
		locale: &str,
		key: &str,
	) -> std::result::Result<Option<TranslationRow>, StoreError> {
		Ok(self.find_row(owner, locale, key).await?)
	}

	async fn find_owner_rows(&self, owner: &OwnerRef) -> std::result::Result<Vec<TranslationRow>, StoreError> {
		Ok(self.find_owner_rows(owner).await?)
	}

	async fn insert_row(&self, row: &TranslationRow) -> std::result::Result<TranslationRow, StoreError> {
		Ok(self.insert_row(row).await?)
	}

	async fn update_row(&self, row: &TranslationRow) -> std::result::Result<TranslationRow, StoreError> {
		Ok(self.update_row(row).await?)
	}

	async fn delete_rows(
		&self,
		owner: &OwnerRef,
		locale: &str,
		key: &str,
	) -> std::result::Result<u64, StoreError> {
		Ok(self.delete_rows(owner, locale, key).await?)
	}
}
