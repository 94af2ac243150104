// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale selection.

use polyglot_core::DEFAULT_LOCALE;
use serde::Deserialize;

use crate::error::ConfigError;

/// Longest locale code the translations table can hold.
pub const MAX_LOCALE_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleConfig {
	pub current: String,
	pub default_locale: String,
	pub fallback: Option<String>,
}

impl Default for LocaleConfig {
	fn default() -> Self {
		Self {
			current: DEFAULT_LOCALE.to_string(),
			default_locale: DEFAULT_LOCALE.to_string(),
			fallback: None,
		}
	}
}

impl LocaleConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		validate_locale("locale.current", &self.current)?;
		validate_locale("locale.default", &self.default_locale)?;
		if let Some(fallback) = &self.fallback {
			validate_locale("locale.fallback", fallback)?;
		}
		Ok(())
	}
}

fn validate_locale(key: &str, locale: &str) -> Result<(), ConfigError> {
	if locale.trim().is_empty() {
		return Err(ConfigError::Validation(format!("{key} must not be empty")));
	}
	if locale.chars().count() > MAX_LOCALE_LEN {
		return Err(ConfigError::Validation(format!(
			"{key} '{locale}' exceeds {MAX_LOCALE_LEN} characters"
		)));
	}
	Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocaleConfigLayer {
	#[serde(default)]
	pub current: Option<String>,
	#[serde(default, rename = "default")]
	pub default_locale: Option<String>,
	#[serde(default)]
	pub fallback: Option<String>,
}

impl LocaleConfigLayer {
	pub fn merge(&mut self, other: LocaleConfigLayer) {
		if other.current.is_some() {
			self.current = other.current;
		}
		if other.default_locale.is_some() {
			self.default_locale = other.default_locale;
		}
		if other.fallback.is_some() {
			self.fallback = other.fallback;
		}
	}

	pub fn finalize(self) -> LocaleConfig {
		LocaleConfig {
			current: self.current.unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
			default_locale: self
				.default_locale
				.unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
			fallback: self.fallback,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_defaults() {
		let config = LocaleConfigLayer::default().finalize();
		assert_eq!(config, LocaleConfig::default());
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_empty_locale_rejected() {
		let config = LocaleConfig {
			current: "  ".to_string(),
			..Default::default()
		};
		let err = config.validate().unwrap_err();
		assert!(err.to_string().contains("locale.current"));
	}

	#[test]
	fn test_fallback_validated() {
		let config = LocaleConfig {
			fallback: Some("x".repeat(21)),
			..Default::default()
		};
		assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
	}

	proptest! {
		#[test]
		fn locale_length_validation(locale in "[a-z]{1,30}") {
			let config = LocaleConfig {
				current: locale.clone(),
				..Default::default()
			};
			prop_assert_eq!(config.validate().is_ok(), locale.len() <= MAX_LOCALE_LEN);
		}
	}
}
