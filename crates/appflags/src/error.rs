// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the flags SDK.
//!
//! None of these ever reach callers of flag resolution; they are returned from
//! the explicit async operations (loads, stream connects) and logged.

use appflags_core::CodecError;
use thiserror::Error;

/// Flags SDK errors.
#[derive(Debug, Error)]
pub enum FlagsError {
	/// The client key is empty or was rejected by the edge service (404).
	#[error("invalid client key")]
	InvalidClientKey,

	/// The edge URL is missing or not an http(s) URL.
	#[error("invalid base URL")]
	InvalidBaseUrl,

	/// The client was built outside a tokio runtime.
	#[error("no tokio runtime available")]
	NoRuntime,

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// A custom transport failed to complete the exchange.
	#[error("transport error: {0}")]
	Transport(String),

	/// Server answered with a status other than 200 or 404.
	#[error("bad response ({status}): {message}")]
	BadResponse { status: u16, message: String },

	/// Request encoding or response decoding failed.
	#[error("codec error: {0}")]
	Codec(#[from] CodecError),

	/// The realtime stream URL could not be resolved.
	#[error("failed to resolve stream URL: {0}")]
	StreamUrl(String),

	/// The realtime stream failed.
	#[error("stream error: {0}")]
	Stream(String),

	/// Client has been closed.
	#[error("client has been closed")]
	ClientClosed,
}

/// Result type alias for flags operations.
pub type Result<T> = std::result::Result<T, FlagsError>;
