// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for polyglot translation rows.
//!
//! [`TranslationRepository`] implements [`polyglot_core::TranslationStore`]
//! over the `translations` table created by [`run_migrations`].

pub mod error;
pub mod pool;
pub mod schema;
pub mod testing;
pub mod translation;

pub use error::{DbError, Result};
pub use pool::{create_pool, open_store, DEFAULT_MAX_CONNECTIONS};
pub use schema::{drop_schema, run_migrations, TRANSLATIONS_TABLE};
pub use translation::{validate_row, TranslationRepository, MAX_KEY_LEN, MAX_LOCALE_LEN, MAX_OWNER_TYPE_LEN};
