// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale and caching settings consumed by the translation engine.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LOCALE: &str = "en";

/// How translatable attributes are rendered when exporting a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStyle {
	/// The resolved current-locale string.
	#[default]
	Resolved,
	/// The full `locale -> content` map.
	AllLocales,
}

impl ExportStyle {
	pub fn as_str(&self) -> &'static str {
		match self {
			ExportStyle::Resolved => "resolved",
			ExportStyle::AllLocales => "all_locales",
		}
	}
}

/// Settings passed explicitly to the engine instead of living in globals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSettings {
	/// Locale used for plain attribute reads and writes.
	pub current_locale: String,
	/// Locale whose value is mirrored onto the owner's raw attributes.
	pub default_locale: String,
	/// Locale substituted when the requested locale has no translation.
	pub fallback_locale: Option<String>,
	/// Forces every cached read to recompute from the store.
	pub cache_disabled: bool,
	pub export_style: ExportStyle,
}

impl Default for TranslationSettings {
	fn default() -> Self {
		Self {
			current_locale: DEFAULT_LOCALE.to_string(),
			default_locale: DEFAULT_LOCALE.to_string(),
			fallback_locale: None,
			cache_disabled: false,
			export_style: ExportStyle::Resolved,
		}
	}
}

impl TranslationSettings {
	/// Settings where the current and default locale are both `locale`.
	pub fn new(locale: impl Into<String>) -> Self {
		let locale = locale.into();
		Self {
			current_locale: locale.clone(),
			default_locale: locale,
			..Default::default()
		}
	}

	pub fn with_current_locale(mut self, locale: impl Into<String>) -> Self {
		self.current_locale = locale.into();
		self
	}

	pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
		self.default_locale = locale.into();
		self
	}

	pub fn with_fallback_locale(mut self, locale: impl Into<String>) -> Self {
		self.fallback_locale = Some(locale.into());
		self
	}

	pub fn with_cache_disabled(mut self, disabled: bool) -> Self {
		self.cache_disabled = disabled;
		self
	}

	pub fn with_export_style(mut self, style: ExportStyle) -> Self {
		self.export_style = style;
		self
	}

	pub fn is_default_locale(&self, locale: &str) -> bool {
		self.default_locale == locale
	}
}
