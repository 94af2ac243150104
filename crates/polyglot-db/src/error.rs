// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use polyglot_core::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Invalid: {0}")]
	Invalid(String),

	#[error("Internal: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for StoreError {
	fn from(err: DbError) -> Self {
		match err {
			DbError::NotFound(message) => StoreError::NotFound(message),
			DbError::Invalid(message) => StoreError::Invalid(message),
			other => StoreError::backend(other),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_store_error_mapping() {
		assert!(matches!(
			StoreError::from(DbError::NotFound("row 1".to_string())),
			StoreError::NotFound(m) if m == "row 1"
		));
		assert!(matches!(
			StoreError::from(DbError::Invalid("lang".to_string())),
			StoreError::Invalid(_)
		));
		assert!(matches!(
			StoreError::from(DbError::Internal("bad timestamp".to_string())),
			StoreError::Backend(_)
		));
	}
}
