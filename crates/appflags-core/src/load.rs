// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a configuration fetch was issued.
///
/// Forwarded to the edge service with the request; local reconciliation does
/// not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadReason {
	/// First load after construction, or after resuming from a pause.
	InitialLoad,
	/// Reload after the user context changed.
	PeriodicReload,
	/// Reload triggered by a realtime push notification.
	RealtimeReload,
}

impl fmt::Display for LoadReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			LoadReason::InitialLoad => "initial_load",
			LoadReason::PeriodicReload => "periodic_reload",
			LoadReason::RealtimeReload => "realtime_reload",
		};
		f.write_str(s)
	}
}
