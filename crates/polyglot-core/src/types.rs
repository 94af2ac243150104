// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Translation rows and owner identities.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Locale code to translated content, for one attribute of one owner.
pub type LocaleMap = BTreeMap<String, String>;

/// Durable identity of an owning record: primary key plus owner type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
	pub id: i64,
	/// Fully-qualified owner type name, e.g. `app::models::Article`.
	pub owner_type: String,
}

impl OwnerRef {
	pub fn new(id: i64, owner_type: impl Into<String>) -> Self {
		Self {
			id,
			owner_type: owner_type.into(),
		}
	}
}

impl std::fmt::Display for OwnerRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}#{}", self.owner_type, self.id)
	}
}

/// One stored translation: the content of `key` in `locale` for one owner.
///
/// `(owner_id, owner_type, locale, key)` is the semantic uniqueness boundary.
/// The schema does not enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRow {
	/// `None` until the row has been persisted.
	pub id: Option<i64>,
	pub owner_id: i64,
	pub owner_type: String,
	pub locale: String,
	pub key: String,
	pub content: String,
	pub searchable: bool,
	pub created_at: Option<DateTime<Utc>>,
	pub updated_at: Option<DateTime<Utc>>,
}

impl TranslationRow {
	/// Creates an unpersisted row with empty content.
	pub fn new(
		owner: &OwnerRef,
		locale: impl Into<String>,
		key: impl Into<String>,
		searchable: bool,
	) -> Self {
		Self {
			id: None,
			owner_id: owner.id,
			owner_type: owner.owner_type.clone(),
			locale: locale.into(),
			key: key.into(),
			content: String::new(),
			searchable,
			created_at: None,
			updated_at: None,
		}
	}

	pub fn with_content(mut self, content: impl Into<String>) -> Self {
		self.content = content.into();
		self
	}

	pub fn owner(&self) -> OwnerRef {
		OwnerRef::new(self.owner_id, self.owner_type.clone())
	}

	pub fn is_persisted(&self) -> bool {
		self.id.is_some()
	}

	pub fn belongs_to(&self, owner: &OwnerRef) -> bool {
		self.owner_id == owner.id && self.owner_type == owner.owner_type
	}

	pub fn matches(&self, owner: &OwnerRef, locale: &str, key: &str) -> bool {
		self.belongs_to(owner) && self.locale == locale && self.key == key
	}
}

/// Serializes an attribute value into stored translation content.
///
/// Strings are stored verbatim, `null` becomes the empty string, and any
/// other value (numbers, booleans, arrays, objects) is stored as JSON text.
pub fn serialize_content(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Builds a locale map from stored rows for a single attribute.
///
/// Rows are applied in order, so a later duplicate for the same locale wins.
pub fn locale_map_from_rows<'a>(rows: impl IntoIterator<Item = &'a TranslationRow>) -> LocaleMap {
	rows
		.into_iter()
		.map(|row| (row.locale.clone(), row.content.clone()))
		.collect()
}
