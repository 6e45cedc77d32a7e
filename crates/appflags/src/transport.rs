// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP transport used for configuration fetches and stream URL lookups.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};

use crate::error::{FlagsError, Result};

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
	pub status: u16,
	pub body: Vec<u8>,
}

impl HttpResponse {
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self {
			status,
			body: body.into(),
		}
	}

	/// Body as text, with invalid UTF-8 replaced.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Performs HTTP exchanges on behalf of the client.
///
/// Any status code is a successful exchange at this level; interpreting it is
/// up to the caller. Implementations other than [`ReqwestTransport`] report
/// a failed exchange as [`FlagsError::Transport`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
	async fn post(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse>;

	async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Returns the SDK User-Agent string.
///
/// Format: `appflags-rust/{version}`
pub fn user_agent() -> String {
	format!("appflags-rust/{}", appflags_core::SDK_VERSION)
}

/// Creates an HTTP client builder with the SDK User-Agent header.
pub fn http_builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: Client,
}

impl ReqwestTransport {
	pub fn new(timeout: Duration) -> Result<Self> {
		let client = http_builder()
			.timeout(timeout)
			.build()
			.map_err(FlagsError::RequestFailed)?;
		Ok(Self { client })
	}

	pub fn from_client(client: Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl Transport for ReqwestTransport {
	async fn post(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse> {
		let response = self
			.client
			.post(url)
			.header("Content-Type", "application/json")
			.body(body)
			.send()
			.await?;
		let status = response.status().as_u16();
		let body = response.bytes().await?;
		Ok(HttpResponse::new(status, body.to_vec()))
	}

	async fn get(&self, url: &str) -> Result<HttpResponse> {
		let response = self.client.get(url).send().await?;
		let status = response.status().as_u16();
		let body = response.bytes().await?;
		Ok(HttpResponse::new(status, body.to_vec()))
	}
}
