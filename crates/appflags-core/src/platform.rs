// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

/// SDK name reported to the edge service.
pub const SDK_NAME: &str = "rust";
/// SDK version reported to the edge service.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Platform metadata sent with every configuration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformData {
	pub sdk: String,
	pub sdk_type: String,
	pub sdk_version: String,
	pub platform: String,
	pub platform_version: String,
}

impl PlatformData {
	/// Describes the current process using compile-time target information.
	pub fn current() -> Self {
		Self {
			sdk: SDK_NAME.to_string(),
			sdk_type: "client".to_string(),
			sdk_version: SDK_VERSION.to_string(),
			platform: std::env::consts::OS.to_string(),
			platform_version: std::env::consts::ARCH.to_string(),
		}
	}
}

impl Default for PlatformData {
	fn default() -> Self {
		Self::current()
	}
}
