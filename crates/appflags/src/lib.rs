// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feature flags client SDK for AppFlags.
//!
//! Flags are resolved synchronously against the configuration held in
//! memory. The returned [`FlagHandle`]s are live: when a new configuration
//! arrives, every handle whose value changed is updated in place and its
//! callbacks fire.
//!
//! # Features
//!
//! - **Live handles**: values update in place, with change callbacks
//! - **Real-time Updates**: SSE stream notices trigger configuration reloads
//! - **Background pause**: the stream is stopped once the host application
//!   has been in the background for a while, and restarted on return
//! - **Type-safe Resolution**: boolean, number and string flags
//!
//! # Example
//!
//! ```ignore
//! use appflags::{FlagsClient, User};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FlagsClient::builder()
//!         .client_key("your_client_key")
//!         .user(User::new("user-123"))
//!         .build()?;
//!
//!     client.wait_for_initialization(std::time::Duration::from_secs(5)).await;
//!
//!     let theme = client.get_string_flag("ui.theme", "light");
//!     theme.on_update(|theme| println!("theme changed to {theme}"));
//!     println!("theme is {}", theme.value());
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod handle;
mod lifecycle;
mod loader;
mod logging;
mod registry;
mod resolver;
mod sse;
mod stream;
mod transport;

pub use client::{
	ClientConfig, FlagsClient, FlagsClientBuilder, DEFAULT_EDGE_URL, ENV_CLIENT_KEY, ENV_EDGE_URL,
	ENV_LOG_LEVEL,
};
pub use error::{FlagsError, Result};
pub use handle::FlagHandle;
pub use lifecycle::{
	HostLifecycleSource, LifecycleEvent, PauseController, PauseTarget, DEFAULT_PAUSE_DELAY,
};
pub use loader::ConfigurationLoader;
pub use logging::{LogLevel, LogSink, Logger, TracingSink};
pub use registry::{FlagRegistry, ReconcileReport};
pub use resolver::FlagResolver;
pub use sse::{SseConnection, SseConnector};
pub use stream::{
	ConnectOutcome, EventSink, StreamConnection, StreamConnector, StreamEvent,
	StreamLifecycleManager, StreamState, UpdateHandler,
};
pub use transport::{user_agent, HttpResponse, ReqwestTransport, Transport};

// Re-export core types for convenience
pub use appflags_core::{
	CodecError, ComputedFlag, Configuration, ConfigurationUpdateEvent, EnvelopeCodec, FlagKind,
	FlagRequest, FlagType, FlagValue, FlagsResponse, LoadReason, PlatformData, User, WireCodec,
};
