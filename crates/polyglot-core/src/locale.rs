// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale resolution logic.

use crate::types::LocaleMap;

/// Resolve the locale whose content should be returned for a read.
///
/// Resolution order:
/// 1. The requested locale, if it already has a stored translation
/// 2. The requested locale unchanged, when fallback is disabled
/// 3. The configured fallback locale (even if it has no translation either)
/// 4. The requested locale
///
/// # Example
///
/// ```
/// use polyglot_core::{normalize_locale, LocaleMap};
///
/// let mut translations = LocaleMap::new();
/// translations.insert("en".to_string(), "Hello".to_string());
///
/// assert_eq!(normalize_locale("en", &translations, true, Some("en")), "en");
/// assert_eq!(normalize_locale("fr", &translations, true, Some("en")), "en");
/// assert_eq!(normalize_locale("fr", &translations, false, Some("en")), "fr");
/// assert_eq!(normalize_locale("fr", &translations, true, None), "fr");
/// ```
pub fn normalize_locale(
	locale: &str,
	translations: &LocaleMap,
	use_fallback: bool,
	fallback_locale: Option<&str>,
) -> String {
	if translations.contains_key(locale) {
		return locale.to_string();
	}

	if !use_fallback {
		return locale.to_string();
	}

	if let Some(fallback) = fallback_locale {
		return fallback.to_string();
	}

	locale.to_string()
}

/// An empty requested locale means the current locale.
pub fn requested_or_current<'a>(requested: &'a str, current: &'a str) -> &'a str {
	if requested.is_empty() {
		current
	} else {
		requested
	}
}
