// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Connection pools for the translation store.
//!
//! File databases get a small WAL-mode pool. In-memory databases get a single
//! connection that is never recycled, since closing the last connection drops
//! the database and every translation in it.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};

use crate::error::DbError;
use crate::schema::run_migrations;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Writers wait this long on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn is_memory_url(database_url: &str) -> bool {
	database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, DbError> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
		.busy_timeout(BUSY_TIMEOUT)
		.create_if_missing(true);

	if is_memory_url(database_url) {
		return Ok(options);
	}
	Ok(options
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal))
}

/// Opens a pool for `database_url` (e.g. `sqlite:./polyglot.db` or
/// `sqlite::memory:`) without touching the schema.
///
/// # Errors
/// Returns `DbError::Internal` if the URL is invalid, `DbError::Sqlx` if the
/// connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, DbError> {
	let options = connect_options(database_url)?;

	let pool_options = if is_memory_url(database_url) {
		SqlitePoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
	} else {
		SqlitePoolOptions::new().max_connections(DEFAULT_MAX_CONNECTIONS)
	};
	let pool = pool_options.connect_with(options).await?;

	tracing::debug!(in_memory = is_memory_url(database_url), "translation store pool created");
	Ok(pool)
}

/// Opens a pool and applies the translation schema.
#[tracing::instrument(skip(database_url))]
pub async fn open_store(database_url: &str) -> Result<SqlitePool, DbError> {
	let pool = create_pool(database_url).await?;
	run_migrations(&pool).await?;
	Ok(pool)
}
