// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Realtime stream message types.
//!
//! The edge service hands out a stream URL from
//! `GET /realtimeToken/{clientKey}/eventSource`. Messages on that stream are a
//! JSON envelope whose `data` field is itself a JSON document carrying the
//! publish timestamp of the configuration change.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Response of the stream URL lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeTokenResponse {
	pub url: String,
}

/// Outer envelope of a stream message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSourceMessage {
	#[serde(default)]
	pub data: Option<String>,
}

/// A configuration change notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationUpdateEvent {
	/// Logical publish timestamp of the new configuration.
	pub published: i64,
}

impl ConfigurationUpdateEvent {
	/// Parses the raw data of a stream message.
	///
	/// Returns `Ok(None)` for an envelope without inner data.
	pub fn parse(raw: &str) -> Result<Option<Self>> {
		let envelope: EventSourceMessage = serde_json::from_str(raw)?;
		match envelope.data {
			Some(inner) => Ok(Some(serde_json::from_str(&inner)?)),
			None => Ok(None),
		}
	}

	/// Encodes this event the way the edge service publishes it.
	pub fn to_message(&self) -> Result<String> {
		let envelope = EventSourceMessage {
			data: Some(serde_json::to_string(self)?),
		};
		Ok(serde_json::to_string(&envelope)?)
	}
}
