// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::store::StoreError;

/// Errors raised by translation operations.
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
	/// The attribute is not declared translatable on the owner type.
	///
	/// Always raised before any side effect takes place.
	#[error("Cannot translate attribute `{key}` as it is not one of the translatable attributes of `{owner_type}`")]
	AttributeNotTranslatable { key: String, owner_type: String },

	#[error("Store error: {0}")]
	Store(#[from] StoreError),

	/// The host persister failed to save the owning record.
	#[error("Failed to persist owning record: {0}")]
	Persist(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TranslationError {
	pub fn not_translatable(key: impl Into<String>, owner_type: impl Into<String>) -> Self {
		Self::AttributeNotTranslatable {
			key: key.into(),
			owner_type: owner_type.into(),
		}
	}

	pub fn is_not_translatable(&self) -> bool {
		matches!(self, Self::AttributeNotTranslatable { .. })
	}
}

pub type Result<T> = std::result::Result<T, TranslationError>;
