// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration loading.
//!
//! Fetches a full configuration from the edge service and hands it to the
//! registry. A failed load leaves the current configuration untouched and is
//! not retried here.

use std::sync::Arc;
use std::time::Duration;

use appflags_core::{FlagRequest, LoadReason, PlatformData, User, WireCodec};
use parking_lot::RwLock;
use tokio::sync::watch;

use crate::error::{FlagsError, Result};
use crate::logging::Logger;
use crate::registry::{FlagRegistry, ReconcileReport};
use crate::transport::Transport;

const FLAGS_PATH: &str = "/configuration/v1/flags";

/// Fetches configurations and installs them into the registry.
pub struct ConfigurationLoader {
	edge_url: String,
	client_key: String,
	platform: PlatformData,
	user: RwLock<User>,
	transport: Arc<dyn Transport>,
	codec: Arc<dyn WireCodec>,
	registry: Arc<FlagRegistry>,
	logger: Logger,
	loads: watch::Sender<u64>,
}

impl ConfigurationLoader {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		edge_url: impl Into<String>,
		client_key: impl Into<String>,
		platform: PlatformData,
		user: User,
		transport: Arc<dyn Transport>,
		codec: Arc<dyn WireCodec>,
		registry: Arc<FlagRegistry>,
		logger: Logger,
	) -> Self {
		let (loads, _) = watch::channel(0);
		Self {
			edge_url: edge_url.into(),
			client_key: client_key.into(),
			platform,
			user: RwLock::new(user),
			transport,
			codec,
			registry,
			logger,
			loads,
		}
	}

	pub fn user(&self) -> User {
		self.user.read().clone()
	}

	/// Replaces the user sent with subsequent loads.
	pub fn set_user(&self, user: User) {
		*self.user.write() = user;
	}

	/// Number of loads that completed successfully.
	pub fn successful_loads(&self) -> u64 {
		*self.loads.borrow()
	}

	/// Waits until at least one load has succeeded, up to `timeout`.
	pub async fn wait_for_first_load(&self, timeout: Duration) -> bool {
		let mut rx = self.loads.subscribe();
		tokio::time::timeout(timeout, rx.wait_for(|n| *n > 0))
			.await
			.map(|r| r.is_ok())
			.unwrap_or(false)
	}

	/// Fetches a configuration and reconciles it into the registry.
	///
	/// `published_at` is the publish timestamp of the realtime update that
	/// triggered this load; the edge service uses it to decide whether the
	/// client is already current.
	pub async fn load(
		&self,
		reason: LoadReason,
		published_at: Option<i64>,
	) -> Result<ReconcileReport> {
		let request = FlagRequest {
			configuration_id: self.client_key.clone(),
			load_type: reason,
			platform_data: self.platform.clone(),
			user: self.user(),
			get_update_at: published_at,
		};

		let body = self.codec.encode_request(&request).map_err(|e| {
			self.logger.error(format!("Failed to encode flag request: {e}"));
			FlagsError::from(e)
		})?;

		let url = format!("{}{}", self.edge_url, FLAGS_PATH);
		self.logger
			.debug(format!("Loading configuration ({reason}) from {url}"));

		let response = self.transport.post(&url, body).await.map_err(|e| {
			self.logger.error(format!("Error retrieving feature flags: {e}"));
			e
		})?;

		match response.status {
			200 => {}
			404 => {
				self.logger
					.error("Retrieving flags failed due to invalid client key");
				return Err(FlagsError::InvalidClientKey);
			}
			status => {
				let message = response.text();
				self.logger
					.error(format!("Error getting flags ({status}): {message}"));
				return Err(FlagsError::BadResponse { status, message });
			}
		}

		let configuration = self.codec.decode_response(&response.body).map_err(|e| {
			self.logger
				.error(format!("Error decoding retrieved feature flags: {e}"));
			FlagsError::from(e)
		})?;

		let flag_count = configuration.len();
		let report = self.registry.reconcile(configuration);
		self.loads.send_modify(|n| *n += 1);

		self.logger.debug(format!(
			"Updated configuration, has {flag_count} flags ({} handles updated, {} pruned)",
			report.updated, report.pruned
		));

		Ok(report)
	}
}

impl std::fmt::Debug for ConfigurationLoader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConfigurationLoader")
			.field("edge_url", &self.edge_url)
			.field("user", &*self.user.read())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::logging::testing::recording_logger;
	use crate::logging::LogLevel;
	use crate::transport::{HttpResponse, MockTransport};
	use appflags_core::{ComputedFlag, EnvelopeCodec, FlagsResponse};

	fn ok_body(flags: Vec<ComputedFlag>) -> Vec<u8> {
		EnvelopeCodec.encode_response(&FlagsResponse { flags }).unwrap()
	}

	fn loader(transport: MockTransport, logger: Logger) -> (ConfigurationLoader, Arc<FlagRegistry>) {
		let registry = Arc::new(FlagRegistry::new(logger.clone()));
		let loader = ConfigurationLoader::new(
			"https://edge.test",
			"client-key",
			PlatformData::current(),
			User::new("user-1"),
			Arc::new(transport),
			Arc::new(EnvelopeCodec),
			registry.clone(),
			logger,
		);
		(loader, registry)
	}

	#[tokio::test]
	async fn successful_load_installs_configuration() {
		let mut transport = MockTransport::new();
		transport
			.expect_post()
			.withf(|url, _| url.to_string() == "https://edge.test/configuration/v1/flags")
			.times(1)
			.returning(|_, _| Ok(HttpResponse::new(200, ok_body(vec![ComputedFlag::boolean("beta", true)]))));

		let (loader, registry) = loader(transport, recording_logger().0);
		let handle = registry.get_or_create_handle("beta", false);

		let report = loader.load(LoadReason::InitialLoad, None).await.unwrap();

		assert_eq!(report.updated, 1);
		assert!(handle.value());
		assert_eq!(loader.successful_loads(), 1);
		assert!(registry.configuration().contains("beta"));
	}

	#[tokio::test]
	async fn request_carries_reason_user_and_timestamp() {
		let mut transport = MockTransport::new();
		transport.expect_post().times(1).returning(|_, body| {
			let request = EnvelopeCodec.decode_request(&body).unwrap();
			assert_eq!(request.configuration_id, "client-key");
			assert_eq!(request.load_type, LoadReason::RealtimeReload);
			assert_eq!(request.user.key, "user-1");
			assert_eq!(request.get_update_at, Some(99));
			Ok(HttpResponse::new(200, ok_body(vec![])))
		});

		let (loader, _) = loader(transport, recording_logger().0);
		loader.load(LoadReason::RealtimeReload, Some(99)).await.unwrap();
	}

	#[tokio::test]
	async fn not_found_means_invalid_client_key() {
		let mut transport = MockTransport::new();
		transport
			.expect_post()
			.returning(|_, _| Ok(HttpResponse::new(404, "")));

		let (logger, sink) = recording_logger();
		let (loader, _) = loader(transport, logger);
		let err = loader.load(LoadReason::InitialLoad, None).await.unwrap_err();

		assert!(matches!(err, FlagsError::InvalidClientKey));
		assert!(sink.contains(LogLevel::Error, "invalid client key"));
		assert_eq!(loader.successful_loads(), 0);
	}

	#[tokio::test]
	async fn failed_load_leaves_configuration_untouched() {
		let mut transport = MockTransport::new();
		let mut seq = mockall::Sequence::new();
		transport
			.expect_post()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _| Ok(HttpResponse::new(200, ok_body(vec![ComputedFlag::number("limit", 5.0)]))));
		transport
			.expect_post()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _| Ok(HttpResponse::new(500, "boom")));
		transport
			.expect_post()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _| Ok(HttpResponse::new(200, "not an envelope")));
		transport
			.expect_post()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _| Err(FlagsError::Transport("connection reset".to_string())));

		let (loader, registry) = loader(transport, recording_logger().0);
		loader.load(LoadReason::InitialLoad, None).await.unwrap();
		let handle = registry.get_or_create_handle("limit", 0.0);

		let err = loader.load(LoadReason::PeriodicReload, None).await.unwrap_err();
		assert!(matches!(err, FlagsError::BadResponse { status: 500, ref message } if message == "boom"));

		let err = loader.load(LoadReason::PeriodicReload, None).await.unwrap_err();
		assert!(matches!(err, FlagsError::Codec(_)));

		let err = loader.load(LoadReason::PeriodicReload, None).await.unwrap_err();
		assert!(matches!(err, FlagsError::Transport(_)));

		assert_eq!(handle.value(), 5.0);
		assert!(registry.configuration().contains("limit"));
		assert_eq!(loader.successful_loads(), 1);
	}

	#[tokio::test]
	async fn set_user_applies_to_next_load() {
		let mut transport = MockTransport::new();
		transport.expect_post().times(1).returning(|_, body| {
			let request = EnvelopeCodec.decode_request(&body).unwrap();
			assert_eq!(request.user.key, "user-2");
			Ok(HttpResponse::new(200, ok_body(vec![])))
		});

		let (loader, _) = loader(transport, recording_logger().0);
		loader.set_user(User::new("user-2"));
		loader.load(LoadReason::PeriodicReload, None).await.unwrap();
		assert_eq!(loader.user(), User::new("user-2"));
	}

	#[tokio::test]
	async fn wait_for_first_load_times_out_without_load() {
		let (loader, _) = loader(MockTransport::new(), recording_logger().0);
		assert!(!loader.wait_for_first_load(Duration::from_millis(10)).await);
	}
}
