// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, a TOML file and environment
//! variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::PolyglotConfigLayer;
use crate::sections::{
	CacheConfigLayer, DatabaseConfigLayer, ExportConfigLayer, LocaleConfigLayer, LoggingConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<PolyglotConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<PolyglotConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(PolyglotConfigLayer::default())
	}
}

/// TOML file source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/polyglot/polyglot.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<PolyglotConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(PolyglotConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: PolyglotConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `POLYGLOT_<SECTION>_<FIELD>`, with `POLYGLOT_LOCALE` for the
/// current locale and `POLYGLOT_LOG_LEVEL` for logging.
pub struct EnvSource;

impl EnvSource {
	/// Builds a layer from `lookup` instead of the process environment.
	pub fn load_with<F>(lookup: F) -> Result<PolyglotConfigLayer, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| lookup(name).filter(|s| !s.is_empty());
		let flag = |name: &str| var(name).map(|v| parse_bool(name, &v)).transpose();

		Ok(PolyglotConfigLayer {
			locale: Some(LocaleConfigLayer {
				current: var("POLYGLOT_LOCALE"),
				default_locale: var("POLYGLOT_DEFAULT_LOCALE"),
				fallback: var("POLYGLOT_FALLBACK_LOCALE"),
			}),
			cache: Some(CacheConfigLayer {
				disabled: flag("POLYGLOT_CACHE_DISABLED")?,
			}),
			export: Some(ExportConfigLayer {
				all_locales: flag("POLYGLOT_EXPORT_ALL_LOCALES")?,
			}),
			database: Some(DatabaseConfigLayer {
				url: var("POLYGLOT_DATABASE_URL"),
			}),
			logging: Some(LoggingConfigLayer {
				level: var("POLYGLOT_LOG_LEVEL"),
			}),
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<PolyglotConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Self::load_with(|name| std::env::var(name).ok())
	}
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid boolean value '{value}'"),
		}),
	}
}
