// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

/// The user flags are computed for.
///
/// Targeting happens server-side; the client only forwards the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub key: String,
}

impl User {
	pub fn new(key: impl Into<String>) -> Self {
		Self { key: key.into() }
	}

	/// An anonymous user with an empty key.
	pub fn anonymous() -> Self {
		Self::default()
	}

	pub fn is_anonymous(&self) -> bool {
		self.key.is_empty()
	}
}
