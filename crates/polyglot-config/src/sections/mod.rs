// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod cache;
mod database;
mod export;
mod locale;
mod logging;

pub use cache::{CacheConfig, CacheConfigLayer};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use export::{ExportConfig, ExportConfigLayer};
pub use locale::{LocaleConfig, LocaleConfigLayer, MAX_LOCALE_LEN};
pub use logging::{LoggingConfig, LoggingConfigLayer};
