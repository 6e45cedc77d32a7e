// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SSE (Server-Sent Events) stream connector.
//!
//! Opens the realtime stream with `reqwest` and parses it with
//! `eventsource-stream` in a background task. The task ends when the server
//! closes the stream or the stream errors; it does not reconnect.

use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::{Event, Eventsource};
use futures::StreamExt;
use reqwest::Client;
use tokio::task::JoinHandle;

use crate::error::{FlagsError, Result};
use crate::stream::{EventSink, StreamConnection, StreamConnector, StreamEvent};
use crate::transport::http_builder;

/// [`StreamConnector`] for SSE endpoints.
#[derive(Debug, Clone)]
pub struct SseConnector {
	client: Client,
}

impl SseConnector {
	/// Creates a connector. `connect_timeout` bounds connection setup only;
	/// the stream itself stays open indefinitely.
	pub fn new(connect_timeout: Duration) -> Result<Self> {
		let client = http_builder()
			.connect_timeout(connect_timeout)
			.build()
			.map_err(FlagsError::RequestFailed)?;
		Ok(Self { client })
	}

	pub fn from_client(client: Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl StreamConnector for SseConnector {
	async fn connect(&self, url: &str, sink: EventSink) -> Result<Box<dyn StreamConnection>> {
		let response = self
			.client
			.get(url)
			.header("Accept", "text/event-stream")
			.header("Cache-Control", "no-cache")
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(FlagsError::Stream(format!(
				"unexpected status {}",
				response.status().as_u16()
			)));
		}

		let task = tokio::spawn(async move {
			sink(StreamEvent::Opened);

			let mut events = response.bytes_stream().eventsource();
			while let Some(result) = events.next().await {
				match result {
					Ok(event) => {
						if let Some(message) = to_stream_event(event) {
							sink(message);
						}
					}
					Err(e) => {
						sink(StreamEvent::Error(e.to_string()));
						break;
					}
				}
			}

			sink(StreamEvent::Closed);
		});

		Ok(Box::new(SseConnection { task }))
	}
}

/// Converts a parsed SSE event, skipping events without data.
fn to_stream_event(event: Event) -> Option<StreamEvent> {
	if event.data.is_empty() {
		return None;
	}
	let event_type = if event.event.is_empty() {
		"message".to_string()
	} else {
		event.event
	};
	let last_event_id = (!event.id.is_empty()).then_some(event.id);
	Some(StreamEvent::Message {
		event_type,
		data: event.data,
		last_event_id,
	})
}

/// A running SSE stream task.
#[derive(Debug)]
pub struct SseConnection {
	task: JoinHandle<()>,
}

impl StreamConnection for SseConnection {
	fn stop(&self) {
		self.task.abort();
	}
}

impl Drop for SseConnection {
	fn drop(&mut self) {
		self.task.abort();
	}
}
