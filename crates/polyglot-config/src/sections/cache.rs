// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Translation cache configuration.

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
	/// Every read goes to the store when set.
	pub disabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfigLayer {
	#[serde(default)]
	pub disabled: Option<bool>,
}

impl CacheConfigLayer {
	pub fn merge(&mut self, other: CacheConfigLayer) {
		if other.disabled.is_some() {
			self.disabled = other.disabled;
		}
	}

	pub fn finalize(self) -> CacheConfig {
		CacheConfig {
			disabled: self.disabled.unwrap_or(false),
		}
	}
}
