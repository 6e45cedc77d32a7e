// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for encoding and decoding flag payloads.

use thiserror::Error;

/// Errors raised by the wire codec.
#[derive(Debug, Error)]
pub enum CodecError {
	/// The envelope did not carry valid base64.
	#[error("invalid base64 payload: {0}")]
	Base64(#[from] base64::DecodeError),

	/// JSON (de)serialization failed.
	#[error("invalid JSON payload: {0}")]
	Json(#[from] serde_json::Error),

	/// A flag carried a value type this client cannot represent.
	#[error("unexpected value kind {value_type} for flag [{key}]")]
	UnexpectedValueKind { key: String, value_type: String },
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
