// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Change notifications for persisted translations.
//!
//! The engine awaits [`TranslationListener::on_translation_changed`] after a
//! stored translation value has actually changed. Writes that leave the value
//! unchanged, and writes buffered on owners without identity, emit nothing.
//!
//! # Example
//!
//! ```ignore
//! use polyglot_core::{TranslationChanged, TranslationListener};
//! use async_trait::async_trait;
//!
//! struct SearchIndexer;
//!
//! #[async_trait]
//! impl TranslationListener for SearchIndexer {
//!     async fn on_translation_changed(&self, change: TranslationChanged) {
//!         println!("{} {} -> {}", change.owner, change.key, change.new_value);
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::OwnerRef;

/// A confirmed change of one persisted translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationChanged {
	pub owner: OwnerRef,
	pub key: String,
	pub locale: String,
	/// Previous content, empty when the locale had no translation.
	pub old_value: String,
	pub new_value: String,
	pub timestamp: DateTime<Utc>,
}

impl TranslationChanged {
	pub fn new(
		owner: OwnerRef,
		key: impl Into<String>,
		locale: impl Into<String>,
		old_value: impl Into<String>,
		new_value: impl Into<String>,
	) -> Self {
		Self {
			owner,
			key: key.into(),
			locale: locale.into(),
			old_value: old_value.into(),
			new_value: new_value.into(),
			timestamp: Utc::now(),
		}
	}
}

/// Receives translation change notifications.
///
/// Called on the write path after the row is persisted. Keep it fast; queue
/// expensive work elsewhere.
#[async_trait]
pub trait TranslationListener: Send + Sync + 'static {
	async fn on_translation_changed(&self, change: TranslationChanged);
}

pub type SharedTranslationListener = Arc<dyn TranslationListener>;

/// Discards all notifications. Used when no listener is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTranslationListener;

#[async_trait]
impl TranslationListener for NoOpTranslationListener {
	async fn on_translation_changed(&self, _change: TranslationChanged) {}
}

/// Fans notifications out to any number of subscribers.
///
/// Sending with no live subscribers is not an error; the change is dropped.
#[derive(Debug, Clone)]
pub struct BroadcastTranslationListener {
	sender: broadcast::Sender<TranslationChanged>,
}

impl BroadcastTranslationListener {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<TranslationChanged> {
		self.sender.subscribe()
	}

	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}
}

impl Default for BroadcastTranslationListener {
	fn default() -> Self {
		Self::new(256)
	}
}

#[async_trait]
impl TranslationListener for BroadcastTranslationListener {
	async fn on_translation_changed(&self, change: TranslationChanged) {
		if self.sender.send(change).is_err() {
			tracing::trace!("translation change dropped, no subscribers");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn change() -> TranslationChanged {
		TranslationChanged::new(OwnerRef::new(42, "app::Article"), "title", "fr", "", "Bonjour")
	}

	struct CountingListener {
		count: AtomicUsize,
	}

	#[async_trait]
	impl TranslationListener for CountingListener {
		async fn on_translation_changed(&self, _change: TranslationChanged) {
			self.count.fetch_add(1, Ordering::SeqCst);
		}
	}

	#[tokio::test]
	async fn listener_is_called() {
		let listener = CountingListener {
			count: AtomicUsize::new(0),
		};
		listener.on_translation_changed(change()).await;
		assert_eq!(listener.count.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn noop_listener_does_nothing() {
		NoOpTranslationListener.on_translation_changed(change()).await;
	}

	#[tokio::test]
	async fn broadcast_delivers_to_subscribers() {
		let listener = BroadcastTranslationListener::new(8);
		let mut rx = listener.subscribe();
		assert_eq!(listener.subscriber_count(), 1);

		listener.on_translation_changed(change()).await;

		let received = rx.recv().await.unwrap();
		assert_eq!(received.key, "title");
		assert_eq!(received.old_value, "");
		assert_eq!(received.new_value, "Bonjour");
	}

	#[tokio::test]
	async fn broadcast_without_subscribers_is_ok() {
		let listener = BroadcastTranslationListener::default();
		listener.on_translation_changed(change()).await;
	}
}
