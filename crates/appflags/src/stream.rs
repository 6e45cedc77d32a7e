// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Realtime stream lifecycle.
//!
//! [`StreamLifecycleManager`] owns at most one realtime connection. It
//! resolves the stream URL from the edge service, opens the stream through a
//! [`StreamConnector`], and turns every configuration update notice on the
//! stream into a call to the update handler.
//!
//! The manager never reconnects on its own. Stream errors and server-side
//! disconnects are logged; a new connection is only opened by an explicit
//! [`reconnect_if_needed`](StreamLifecycleManager::reconnect_if_needed).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use appflags_core::{ConfigurationUpdateEvent, RealtimeTokenResponse};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{FlagsError, Result};
use crate::logging::Logger;
use crate::transport::Transport;

/// Connection state of the realtime stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamState {
	Disconnected,
	Connecting,
	Connected,
	Paused,
}

impl fmt::Display for StreamState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			StreamState::Disconnected => "disconnected",
			StreamState::Connecting => "connecting",
			StreamState::Connected => "connected",
			StreamState::Paused => "paused",
		};
		f.write_str(s)
	}
}

/// Events reported by a stream connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
	Opened,
	Message {
		event_type: String,
		data: String,
		last_event_id: Option<String>,
	},
	Error(String),
	Closed,
}

/// Receives the events of one connection.
pub type EventSink = Arc<dyn Fn(StreamEvent) + Send + Sync>;

/// Called with the publish timestamp of every configuration update notice.
pub type UpdateHandler = Arc<dyn Fn(i64) + Send + Sync>;

/// An open realtime connection.
pub trait StreamConnection: Send + Sync {
	/// Stops the connection. No events are delivered afterwards.
	fn stop(&self);
}

/// Opens realtime connections.
#[async_trait]
pub trait StreamConnector: Send + Sync {
	async fn connect(&self, url: &str, sink: EventSink) -> Result<Box<dyn StreamConnection>>;
}

/// Result of a [`StreamLifecycleManager::reconnect_if_needed`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
	/// A new connection was opened by this call.
	Connected,
	/// A connection already existed.
	AlreadyConnected,
	/// Another call is creating the connection.
	InProgress,
	/// The attempt failed; the error was logged.
	Failed,
	/// The stream is paused and stays down until resumed.
	Paused,
}

struct ActiveStream {
	id: u64,
	connection: Box<dyn StreamConnection>,
}

/// State shared with the event sinks of open connections.
struct SinkShared {
	on_update: UpdateHandler,
	logger: Logger,
	messages_received: AtomicU64,
	last_event_id: Mutex<Option<String>>,
	state: Mutex<StreamState>,
	/// Id of the connection that is held and still running, 0 if none.
	live_id: AtomicU64,
}

impl SinkShared {
	fn set_state(&self, state: &mut StreamState, next: StreamState) {
		if *state != next {
			self.logger
				.debug(format!("Stream state {} -> {}", *state, next));
			*state = next;
		}
	}

	/// Marks connection `id` as ended. Stale ids are ignored.
	fn connection_ended(&self, id: u64) {
		let mut state = self.state.lock();
		if self
			.live_id
			.compare_exchange(id, 0, Ordering::SeqCst, Ordering::SeqCst)
			.is_err()
		{
			return;
		}
		self.logger
			.debug(format!("Event source [#{id}] ended, not reconnecting"));
		if *state != StreamState::Paused {
			self.set_state(&mut state, StreamState::Disconnected);
		}
	}

	fn handle(&self, id: u64, event: StreamEvent) {
		match event {
			StreamEvent::Opened => self.logger.debug(format!("Event source [#{id}] opened")),
			StreamEvent::Closed => {
				self.logger.debug(format!("Event source [#{id}] closed"));
				self.connection_ended(id);
			}
			StreamEvent::Error(e) => self.logger.error(format!("Event source [#{id}] error: {e}")),
			StreamEvent::Message {
				event_type,
				data,
				last_event_id,
			} => {
				self.messages_received.fetch_add(1, Ordering::SeqCst);
				if let Some(event_id) = last_event_id {
					*self.last_event_id.lock() = Some(event_id);
				}
				if event_type != "message" {
					self.logger.debug(format!(
						"Event source [#{id}] ignoring event of type {event_type}"
					));
					return;
				}
				match ConfigurationUpdateEvent::parse(&data) {
					Ok(Some(update)) => {
						self.logger.debug(format!(
							"Event source [#{id}] configuration published at {}",
							update.published
						));
						(self.on_update)(update.published);
					}
					Ok(None) => {
						self.logger
							.debug(format!("Event source [#{id}] message without data"));
					}
					Err(e) => {
						self.logger.error(format!("Error handling stream message: {e}"));
					}
				}
			}
		}
	}
}

/// Owns the realtime connection and its open/paused state.
pub struct StreamLifecycleManager {
	token_url: String,
	transport: Arc<dyn Transport>,
	connector: Arc<dyn StreamConnector>,
	logger: Logger,
	shared: Arc<SinkShared>,
	/// Single-entry section guarding connection creation and teardown.
	connection: tokio::sync::Mutex<Option<ActiveStream>>,
	next_id: AtomicU64,
	connection_attempts: AtomicU64,
}

impl StreamLifecycleManager {
	pub fn new(
		edge_url: &str,
		client_key: &str,
		transport: Arc<dyn Transport>,
		connector: Arc<dyn StreamConnector>,
		on_update: UpdateHandler,
		logger: Logger,
	) -> Self {
		Self {
			token_url: format!("{edge_url}/realtimeToken/{client_key}/eventSource"),
			transport,
			connector,
			shared: Arc::new(SinkShared {
				on_update,
				logger: logger.clone(),
				messages_received: AtomicU64::new(0),
				last_event_id: Mutex::new(None),
				state: Mutex::new(StreamState::Disconnected),
				live_id: AtomicU64::new(0),
			}),
			logger,
			connection: tokio::sync::Mutex::new(None),
			next_id: AtomicU64::new(1),
			connection_attempts: AtomicU64::new(0),
		}
	}

	pub fn state(&self) -> StreamState {
		*self.shared.state.lock()
	}

	/// Number of connection sequences started.
	pub fn connection_attempts(&self) -> u64 {
		self.connection_attempts.load(Ordering::SeqCst)
	}

	/// Number of stream messages received across all connections.
	pub fn messages_received(&self) -> u64 {
		self.shared.messages_received.load(Ordering::SeqCst)
	}

	/// Id of the last stream event that carried one.
	pub fn last_event_id(&self) -> Option<String> {
		self.shared.last_event_id.lock().clone()
	}

	/// Opens a connection unless one is live, being created, or the stream
	/// is paused.
	///
	/// Only one creation sequence runs at a time; a call that finds the
	/// sequence already running returns [`ConnectOutcome::InProgress`]
	/// without waiting. A connection whose stream has ended is replaced.
	pub async fn reconnect_if_needed(&self) -> ConnectOutcome {
		let Ok(mut guard) = self.connection.try_lock() else {
			self.logger.debug("Stream connection already being created");
			return ConnectOutcome::InProgress;
		};

		if self.state() == StreamState::Paused {
			self.logger.debug("Stream is paused, not connecting");
			return ConnectOutcome::Paused;
		}

		if let Some(active) = guard.as_ref() {
			if self.shared.live_id.load(Ordering::SeqCst) == active.id {
				self.logger
					.debug(format!("Event source [#{}] is already connected", active.id));
				return ConnectOutcome::AlreadyConnected;
			}
			self.teardown(&mut guard);
		}

		self.logger.debug("Event source is closed, connecting");
		self.set_state(StreamState::Connecting);
		self.connection_attempts.fetch_add(1, Ordering::SeqCst);

		match self.open().await {
			Ok(active) => {
				self.logger
					.debug(format!("Created new event source [#{}]", active.id));
				let mut state = self.shared.state.lock();
				if self.shared.live_id.load(Ordering::SeqCst) == active.id {
					self.shared.set_state(&mut state, StreamState::Connected);
				} else {
					self.shared.set_state(&mut state, StreamState::Disconnected);
				}
				drop(state);
				*guard = Some(active);
				ConnectOutcome::Connected
			}
			Err(e) => {
				self.logger.error(format!("Failed to open stream: {e}"));
				self.set_state(StreamState::Disconnected);
				ConnectOutcome::Failed
			}
		}
	}

	/// Tears the connection down and moves to `Disconnected`.
	pub async fn close(&self) {
		self.logger.debug("Closing stream listener");
		let mut guard = self.connection.lock().await;
		self.teardown(&mut guard);
		self.set_state(StreamState::Disconnected);
	}

	/// Tears the connection down and moves to `Paused`.
	///
	/// While paused, [`reconnect_if_needed`](Self::reconnect_if_needed)
	/// does nothing until [`resume`](Self::resume) is called.
	pub async fn pause(&self) {
		self.logger.debug("Pausing stream listener");
		let mut guard = self.connection.lock().await;
		self.teardown(&mut guard);
		self.set_state(StreamState::Paused);
	}

	/// Leaves `Paused` for `Disconnected` so the stream can be reconnected.
	pub async fn resume(&self) {
		let _guard = self.connection.lock().await;
		let mut state = self.shared.state.lock();
		if *state == StreamState::Paused {
			self.shared.set_state(&mut state, StreamState::Disconnected);
		}
	}

	fn teardown(&self, slot: &mut Option<ActiveStream>) {
		self.shared.live_id.store(0, Ordering::SeqCst);
		match slot.take() {
			Some(active) => {
				active.connection.stop();
				self.logger
					.debug(format!("Closed existing event source [#{}]", active.id));
			}
			None => self.logger.debug("Event source already closed"),
		}
	}

	fn set_state(&self, next: StreamState) {
		let mut state = self.shared.state.lock();
		self.shared.set_state(&mut state, next);
	}

	async fn open(&self) -> Result<ActiveStream> {
		let url = self.resolve_stream_url().await?;
		let id = self.next_id.fetch_add(1, Ordering::SeqCst);
		let shared = self.shared.clone();
		let sink: EventSink = Arc::new(move |event| shared.handle(id, event));
		self.shared.live_id.store(id, Ordering::SeqCst);
		match self.connector.connect(&url, sink).await {
			Ok(connection) => Ok(ActiveStream { id, connection }),
			Err(e) => {
				self.shared.live_id.store(0, Ordering::SeqCst);
				Err(e)
			}
		}
	}

	async fn resolve_stream_url(&self) -> Result<String> {
		let response = self
			.transport
			.get(&self.token_url)
			.await
			.map_err(|e| FlagsError::StreamUrl(e.to_string()))?;

		if response.status != 200 {
			return Err(FlagsError::StreamUrl(format!(
				"status code {}",
				response.status
			)));
		}

		let token: RealtimeTokenResponse = serde_json::from_slice(&response.body)
			.map_err(|e| FlagsError::StreamUrl(format!("invalid response: {e}")))?;
		Ok(token.url)
	}
}

impl fmt::Debug for StreamLifecycleManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StreamLifecycleManager")
			.field("state", &self.state())
			.field("connection_attempts", &self.connection_attempts())
			.finish_non_exhaustive()
	}
}
