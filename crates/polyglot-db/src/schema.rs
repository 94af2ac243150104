// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Translation table schema.
//!
//! `(translatable_id, translatable_type, lang, content_key)` identifies a
//! translation but is deliberately not a unique constraint.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

pub const TRANSLATIONS_TABLE: &str = "translations";

const CREATE_TRANSLATIONS: &str = r#"
	CREATE TABLE IF NOT EXISTS translations (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		translatable_id INTEGER NOT NULL,
		translatable_type VARCHAR(250) NOT NULL,
		lang VARCHAR(20) NOT NULL,
		searchable CHAR(1) NOT NULL DEFAULT '0',
		content TEXT,
		content_key VARCHAR(250) NOT NULL,
		created_at TEXT,
		updated_at TEXT
	)
"#;

const CREATE_OWNER_KEY_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_translations_owner_key \
	ON translations(translatable_id, translatable_type, content_key)";

/// Creates the translation table and its lookup index if missing.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	sqlx::query(CREATE_TRANSLATIONS).execute(pool).await?;
	sqlx::query(CREATE_OWNER_KEY_INDEX).execute(pool).await?;
	tracing::info!(table = TRANSLATIONS_TABLE, "translation schema ready");
	Ok(())
}

/// Drops the translation table.
#[tracing::instrument(skip(pool))]
pub async fn drop_schema(pool: &SqlitePool) -> Result<(), DbError> {
	sqlx::query("DROP TABLE IF EXISTS translations")
		.execute(pool)
		.await?;
	tracing::info!(table = TRANSLATIONS_TABLE, "translation schema dropped");
	Ok(())
}
