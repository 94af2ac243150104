// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-attribute, per-locale translation overlay for persisted records.
//!
//! A record type declares which of its attributes are translatable. Each of
//! those attributes then holds one text value per locale, stored as one row
//! per `(owner, locale, attribute)` in a side table. Reads resolve the right
//! locale transparently; writes keep the store, the in-process cache and the
//! default-locale mirror on the record in sync.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use polyglot_core::{
//!     AttributeRecord, MemoryTranslationStore, TranslationCache, TranslationEngine,
//!     TranslationSettings,
//! };
//!
//! # tokio_test::block_on(async {
//! let engine = TranslationEngine::new(
//!     Arc::new(MemoryTranslationStore::new()),
//!     TranslationCache::new(),
//!     TranslationSettings::new("en").with_fallback_locale("en"),
//! );
//!
//! let record = AttributeRecord::new("app::Article")
//!     .with_translatable(["title"])
//!     .with_identity(42);
//! let mut article = engine.attach(record);
//!
//! article.set_translation("title", "en", "Hello").await?;
//! article.set_translation("title", "fr", "Bonjour").await?;
//!
//! assert_eq!(article.get_translation("title", "fr", true).await?, "Bonjour");
//! assert_eq!(article.get_translation("title", "de", true).await?, "Hello");
//! assert_eq!(article.get_translation("title", "de", false).await?, "");
//! # Ok::<(), polyglot_core::TranslationError>(())
//! # }).unwrap();
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod listener;
pub mod locale;
pub mod pending;
pub mod record;
pub mod settings;
pub mod store;
pub mod translatable;
pub mod types;

pub use cache::{CacheBackend, CacheStats, MapCacheKey, MemoryCacheBackend, RowCacheKey, TranslationCache};
pub use engine::TranslationEngine;
pub use error::{Result, TranslationError};
pub use listener::{
	BroadcastTranslationListener, NoOpTranslationListener, SharedTranslationListener, TranslationChanged,
	TranslationListener,
};
pub use locale::normalize_locale;
pub use pending::{PendingTranslation, PendingTranslations};
pub use record::{AttributeRecord, RecordPersister, TranslatableRecord};
pub use settings::{ExportStyle, TranslationSettings, DEFAULT_LOCALE};
pub use store::{
	CacheInvalidatingStore, MemoryTranslationStore, SharedTranslationStore, StoreError, TranslationStore,
};
pub use translatable::Translatable;
pub use types::{serialize_content, LocaleMap, OwnerRef, TranslationRow};
