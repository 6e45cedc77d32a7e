// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire codec for configuration requests and responses.
//!
//! Both directions use a JSON envelope with a single base64 field:
//!
//! ```text
//! request:  {"request":  "<base64 FlagRequest>"}
//! response: {"response": "<base64 FlagsResponse>"}
//! ```
//!
//! [`EnvelopeCodec`] encodes the inner payload as JSON. Other payload formats
//! can be plugged in by implementing [`WireCodec`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::configuration::Configuration;
use crate::error::Result;
use crate::flag::ComputedFlag;
use crate::load::LoadReason;
use crate::platform::PlatformData;
use crate::user::User;

/// A configuration fetch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagRequest {
	/// The client key the configuration belongs to.
	pub configuration_id: String,
	pub load_type: LoadReason,
	pub platform_data: PlatformData,
	pub user: User,
	/// Publish timestamp of the update that triggered this load, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub get_update_at: Option<i64>,
}

/// Decoded body of a configuration response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagsResponse {
	#[serde(default)]
	pub flags: Vec<ComputedFlag>,
}

#[derive(Serialize, Deserialize)]
struct RequestEnvelope {
	request: String,
}

#[derive(Serialize, Deserialize)]
struct ResponseEnvelope {
	response: String,
}

/// Converts requests to transport bodies and transport bodies to snapshots.
pub trait WireCodec: Send + Sync {
	fn encode_request(&self, request: &FlagRequest) -> Result<Vec<u8>>;

	fn decode_response(&self, body: &[u8]) -> Result<Configuration>;
}

/// Default codec: JSON payloads inside a base64 JSON envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeCodec;

impl EnvelopeCodec {
	pub fn new() -> Self {
		Self
	}

	/// Encodes a response body the way the edge service does.
	///
	/// Used by tests and local fakes of the edge service.
	pub fn encode_response(&self, response: &FlagsResponse) -> Result<Vec<u8>> {
		let payload = serde_json::to_vec(response)?;
		let envelope = ResponseEnvelope {
			response: STANDARD.encode(payload),
		};
		Ok(serde_json::to_vec(&envelope)?)
	}

	/// Decodes a request body. Counterpart of [`WireCodec::encode_request`].
	pub fn decode_request(&self, body: &[u8]) -> Result<FlagRequest> {
		let envelope: RequestEnvelope = serde_json::from_slice(body)?;
		let payload = STANDARD.decode(envelope.request)?;
		Ok(serde_json::from_slice(&payload)?)
	}
}

impl WireCodec for EnvelopeCodec {
	fn encode_request(&self, request: &FlagRequest) -> Result<Vec<u8>> {
		let payload = serde_json::to_vec(request)?;
		let envelope = RequestEnvelope {
			request: STANDARD.encode(payload),
		};
		Ok(serde_json::to_vec(&envelope)?)
	}

	fn decode_response(&self, body: &[u8]) -> Result<Configuration> {
		let envelope: ResponseEnvelope = serde_json::from_slice(body)?;
		let payload = STANDARD.decode(envelope.response)?;
		let response: FlagsResponse = serde_json::from_slice(&payload)?;
		Ok(Configuration::from_flags(response.flags))
	}
}
