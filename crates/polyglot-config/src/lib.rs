// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for polyglot.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file
//! (`/etc/polyglot/polyglot.toml` unless overridden) and `POLYGLOT_*`
//! environment variables.
//!
//! ```ignore
//! let config = polyglot_config::load_config()?;
//! let engine = TranslationEngine::new(store, TranslationCache::new(), config.translation_settings());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::PolyglotConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use polyglot_core::TranslationSettings;
use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolyglotConfig {
	pub locale: LocaleConfig,
	pub cache: CacheConfig,
	pub export: ExportConfig,
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
}

impl PolyglotConfig {
	/// Engine settings derived from the locale, cache and export sections.
	pub fn translation_settings(&self) -> TranslationSettings {
		let mut settings = TranslationSettings::new(self.locale.default_locale.clone())
			.with_current_locale(self.locale.current.clone())
			.with_cache_disabled(self.cache.disabled)
			.with_export_style(self.export.style);
		if let Some(fallback) = &self.locale.fallback {
			settings = settings.with_fallback_locale(fallback.clone());
		}
		settings
	}
}

/// Load configuration from all sources with standard precedence.
pub fn load_config() -> Result<PolyglotConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<PolyglotConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge `sources` in precedence order and resolve the result.
pub fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<PolyglotConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = PolyglotConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

fn finalize(layer: PolyglotConfigLayer) -> Result<PolyglotConfig, ConfigError> {
	let config = PolyglotConfig {
		locale: layer.locale.unwrap_or_default().finalize(),
		cache: layer.cache.unwrap_or_default().finalize(),
		export: layer.export.unwrap_or_default().finalize(),
		database: layer.database.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	config.locale.validate()?;

	info!(
		locale = %config.locale.current,
		default_locale = %config.locale.default_locale,
		fallback_locale = ?config.locale.fallback,
		cache_disabled = config.cache.disabled,
		export_style = config.export.style.as_str(),
		database = %config.database.url,
		"Polyglot configuration loaded"
	);

	Ok(config)
}
