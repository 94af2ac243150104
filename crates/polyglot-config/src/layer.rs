// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Deserialize;

use crate::sections::{
	CacheConfigLayer, DatabaseConfigLayer, ExportConfigLayer, LocaleConfigLayer, LoggingConfigLayer,
};

/// One source's partial configuration. Later layers override earlier ones
/// field by field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolyglotConfigLayer {
	#[serde(default)]
	pub locale: Option<LocaleConfigLayer>,
	#[serde(default)]
	pub cache: Option<CacheConfigLayer>,
	#[serde(default)]
	pub export: Option<ExportConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

fn merge_section<T>(target: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	match (target.as_mut(), other) {
		(Some(existing), Some(other)) => merge(existing, other),
		(None, Some(other)) => *target = Some(other),
		(_, None) => {}
	}
}

impl PolyglotConfigLayer {
	pub fn merge(&mut self, other: PolyglotConfigLayer) {
		merge_section(&mut self.locale, other.locale, LocaleConfigLayer::merge);
		merge_section(&mut self.cache, other.cache, CacheConfigLayer::merge);
		merge_section(&mut self.export, other.export, ExportConfigLayer::merge);
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}
