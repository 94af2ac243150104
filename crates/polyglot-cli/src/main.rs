// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `polyglot` binary: inspect and edit stored translations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use polyglot_config::PolyglotConfig;
use polyglot_core::{AttributeRecord, OwnerRef, Translatable, TranslationCache, TranslationEngine};
use polyglot_db::{open_store, TranslationRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "polyglot", about = "Per-locale attribute translations", version)]
struct Cli {
	/// Config file path (defaults to /etc/polyglot/polyglot.toml)
	#[arg(long, global = true, env = "POLYGLOT_CONFIG")]
	config: Option<PathBuf>,

	/// Database URL, overriding the configured one
	#[arg(long, global = true)]
	database_url: Option<String>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Args, Debug, Clone)]
struct OwnerArgs {
	/// Owner type name, e.g. app::models::Article
	#[arg(long)]
	owner_type: String,

	/// Owner primary key
	#[arg(long)]
	owner_id: i64,
}

impl OwnerArgs {
	fn owner_ref(&self) -> OwnerRef {
		OwnerRef::new(self.owner_id, self.owner_type.clone())
	}
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Create the translations table if it does not exist
	Migrate,

	/// Set the translation of an attribute in one locale
	Set {
		#[command(flatten)]
		owner: OwnerArgs,
		#[arg(long)]
		key: String,
		/// Locale to write (defaults to the current locale)
		#[arg(long)]
		locale: Option<String>,
		/// Search-indexing flag (`--searchable` or `--searchable=false`).
		/// Unset keeps the stored row's flag.
		#[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
		searchable: Option<bool>,
		value: String,
	},

	/// Print the translation of an attribute
	Get {
		#[command(flatten)]
		owner: OwnerArgs,
		#[arg(long)]
		key: String,
		/// Locale to read (defaults to the current locale)
		#[arg(long)]
		locale: Option<String>,
		/// Print nothing instead of the fallback locale's value
		#[arg(long)]
		no_fallback: bool,
	},

	/// Print every stored translation of an owner as JSON
	List {
		#[command(flatten)]
		owner: OwnerArgs,
		/// Limit output to one attribute
		#[arg(long)]
		key: Option<String>,
	},

	/// Delete the translation of an attribute in one locale
	Forget {
		#[command(flatten)]
		owner: OwnerArgs,
		#[arg(long)]
		key: String,
		#[arg(long)]
		locale: String,
	},
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let mut config = match &cli.config {
		Some(path) => polyglot_config::load_config_with_file(path),
		None => polyglot_config::load_config(),
	}
	.context("failed to load configuration")?;
	if let Some(url) = &cli.database_url {
		config.database.url = url.clone();
	}

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	let pool = open_store(&config.database.url)
		.await
		.with_context(|| format!("failed to open {}", config.database.url))?;
	let repo = TranslationRepository::new(pool);

	run(cli.command, &config, repo).await
}

async fn run(command: Command, config: &PolyglotConfig, repo: TranslationRepository) -> anyhow::Result<()> {
	let engine = TranslationEngine::new(
		Arc::new(repo.clone()),
		TranslationCache::new(),
		config.translation_settings(),
	);
	let current = engine.settings().current_locale.clone();

	match command {
		Command::Migrate => {
			tracing::info!(database = %config.database.url, "translations table ready");
		}
		Command::Set {
			owner,
			key,
			locale,
			searchable,
			value,
		} => {
			let locale = locale.unwrap_or(current);
			let searchable = match searchable {
				Some(searchable) => searchable,
				None => repo
					.find_row(&owner.owner_ref(), &locale, &key)
					.await?
					.is_some_and(|row| row.searchable),
			};
			let mut record = attach(&engine, &owner, [key.as_str()], searchable);
			record.set_translation(&key, &locale, value).await?;
		}
		Command::Get {
			owner,
			key,
			locale,
			no_fallback,
		} => {
			let record = attach(&engine, &owner, [key.as_str()], false);
			let locale = locale.unwrap_or(current);
			let content = record.get_translation(&key, &locale, !no_fallback).await?;
			println!("{content}");
		}
		Command::List { owner, key } => {
			let keys = match key {
				Some(key) => vec![key],
				None => stored_keys(&repo, &owner.owner_ref()).await?,
			};
			let record = attach(&engine, &owner, keys.iter().map(String::as_str), false);
			let all = record.get_all_translations().await?;
			println!("{}", serde_json::to_string_pretty(&all)?);
		}
		Command::Forget { owner, key, locale } => {
			let mut record = attach(&engine, &owner, [key.as_str()], false);
			let deleted = record.forget_translation(&key, &locale).await?;
			tracing::info!(deleted, key = %key, locale = %locale, "translation forgotten");
		}
	}

	Ok(())
}

fn attach<'a>(
	engine: &TranslationEngine,
	owner: &OwnerArgs,
	keys: impl IntoIterator<Item = &'a str>,
	searchable: bool,
) -> Translatable<AttributeRecord> {
	let keys: Vec<&str> = keys.into_iter().collect();
	let mut record = AttributeRecord::new(owner.owner_type.clone())
		.with_translatable(keys.iter().copied())
		.with_identity(owner.owner_id);
	if searchable {
		record = record.with_searchable(keys);
	}
	engine.attach(record)
}

/// Distinct attribute keys stored for `owner`, in first-seen order.
async fn stored_keys(repo: &TranslationRepository, owner: &OwnerRef) -> anyhow::Result<Vec<String>> {
	let mut keys: Vec<String> = Vec::new();
	for row in repo.find_owner_rows(owner).await? {
		if !keys.contains(&row.key) {
			keys.push(row.key);
		}
	}
	Ok(keys)
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;
	use polyglot_db::testing::create_test_pool;

	#[test]
	fn test_cli_definition() {
		Cli::command().debug_assert();
	}

	#[test]
	fn test_parse_set() {
		let cli = Cli::try_parse_from([
			"polyglot",
			"set",
			"--owner-type",
			"app::Article",
			"--owner-id",
			"42",
			"--key",
			"title",
			"--locale",
			"fr",
			"--searchable",
			"Bonjour",
		])
		.unwrap();

		match cli.command {
			Command::Set {
				owner,
				key,
				locale,
				searchable,
				value,
			} => {
				assert_eq!(owner.owner_ref(), OwnerRef::new(42, "app::Article"));
				assert_eq!(key, "title");
				assert_eq!(locale.as_deref(), Some("fr"));
				assert_eq!(searchable, Some(true));
				assert_eq!(value, "Bonjour");
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn test_parse_searchable_states() {
		let parse = |extra: &[&str]| {
			let mut args = vec!["polyglot", "set", "--owner-type", "app::Article", "--owner-id", "1", "--key", "title"];
			args.extend_from_slice(extra);
			args.push("Hello");
			match Cli::try_parse_from(args).unwrap().command {
				Command::Set { searchable, value, .. } => {
					assert_eq!(value, "Hello");
					searchable
				}
				other => panic!("unexpected command: {other:?}"),
			}
		};

		assert_eq!(parse(&[]), None);
		assert_eq!(parse(&["--searchable"]), Some(true));
		assert_eq!(parse(&["--searchable=false"]), Some(false));
	}

	#[tokio::test]
	async fn test_set_without_flag_keeps_searchable_row() {
		let repo = TranslationRepository::new(create_test_pool().await.unwrap());
		let config = PolyglotConfig::default();
		let owner = OwnerArgs {
			owner_type: "app::Article".to_string(),
			owner_id: 3,
		};
		let set = |searchable: Option<bool>, value: &str| Command::Set {
			owner: owner.clone(),
			key: "title".to_string(),
			locale: Some("fr".to_string()),
			searchable,
			value: value.to_string(),
		};

		run(set(Some(true), "Bonjour"), &config, repo.clone()).await.unwrap();
		run(set(None, "Salut"), &config, repo.clone()).await.unwrap();
		let row = repo.find_row(&owner.owner_ref(), "fr", "title").await.unwrap().unwrap();
		assert_eq!(row.content, "Salut");
		assert!(row.searchable);

		run(set(Some(false), "Coucou"), &config, repo.clone()).await.unwrap();
		let row = repo.find_row(&owner.owner_ref(), "fr", "title").await.unwrap().unwrap();
		assert!(!row.searchable);
	}

	#[tokio::test]
	async fn test_set_then_list_keys() {
		let repo = TranslationRepository::new(create_test_pool().await.unwrap());
		let config = PolyglotConfig::default();
		let owner = OwnerArgs {
			owner_type: "app::Article".to_string(),
			owner_id: 7,
		};

		for (key, locale, value) in [("title", "en", "Hello"), ("body", "fr", "Texte"), ("title", "fr", "Bonjour")] {
			run(
				Command::Set {
					owner: owner.clone(),
					key: key.to_string(),
					locale: Some(locale.to_string()),
					searchable: None,
					value: value.to_string(),
				},
				&config,
				repo.clone(),
			)
			.await
			.unwrap();
		}

		let keys = stored_keys(&repo, &owner.owner_ref()).await.unwrap();
		assert_eq!(keys, ["title", "body"]);
		assert_eq!(repo.count().await.unwrap(), 3);

		run(
			Command::Forget {
				owner: owner.clone(),
				key: "title".to_string(),
				locale: "fr".to_string(),
			},
			&config,
			repo.clone(),
		)
		.await
		.unwrap();
		assert_eq!(repo.count().await.unwrap(), 2);
	}
}
