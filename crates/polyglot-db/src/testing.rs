// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;
use crate::pool::open_store;

/// Fresh in-memory translation store with the schema applied.
pub async fn create_test_pool() -> Result<SqlitePool, DbError> {
	open_store("sqlite::memory:").await
}
