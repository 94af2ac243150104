// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Record export configuration.

use polyglot_core::ExportStyle;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportConfig {
	pub style: ExportStyle,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfigLayer {
	/// Export every locale of a translatable attribute instead of the
	/// resolved current-locale value.
	#[serde(default)]
	pub all_locales: Option<bool>,
}

impl ExportConfigLayer {
	pub fn merge(&mut self, other: ExportConfigLayer) {
		if other.all_locales.is_some() {
			self.all_locales = other.all_locales;
		}
	}

	pub fn finalize(self) -> ExportConfig {
		let style = if self.all_locales.unwrap_or(false) {
			ExportStyle::AllLocales
		} else {
			ExportStyle::Resolved
		};
		ExportConfig { style }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_style_selection() {
		assert_eq!(ExportConfigLayer::default().finalize().style, ExportStyle::Resolved);
		let layer = ExportConfigLayer {
			all_locales: Some(true),
		};
		assert_eq!(layer.finalize().style, ExportStyle::AllLocales);
	}
}
