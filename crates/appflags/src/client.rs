// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flags client façade.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use appflags_core::{
	Configuration, EnvelopeCodec, FlagKind, LoadReason, PlatformData, User, WireCodec,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::{FlagsError, Result};
use crate::handle::FlagHandle;
use crate::lifecycle::{HostLifecycleSource, PauseController, PauseTarget, DEFAULT_PAUSE_DELAY};
use crate::loader::ConfigurationLoader;
use crate::logging::{LogLevel, LogSink, Logger};
use crate::registry::{FlagRegistry, ReconcileReport};
use crate::resolver::FlagResolver;
use crate::sse::SseConnector;
use crate::stream::{StreamConnector, StreamLifecycleManager, StreamState, UpdateHandler};
use crate::transport::{ReqwestTransport, Transport};

/// Edge service used when no URL is configured.
pub const DEFAULT_EDGE_URL: &str = "https://edge.appflags.net";

pub const ENV_CLIENT_KEY: &str = "APPFLAGS_CLIENT_KEY";
pub const ENV_EDGE_URL: &str = "APPFLAGS_EDGE_URL";
pub const ENV_LOG_LEVEL: &str = "APPFLAGS_LOG_LEVEL";

/// Configuration for the flags client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Timeout for configuration requests and stream connection setup.
	pub request_timeout: Duration,
	/// Delay between a background signal and pausing the client.
	pub pause_delay: Duration,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			request_timeout: Duration::from_secs(30),
			pause_delay: DEFAULT_PAUSE_DELAY,
		}
	}
}

/// Builder for constructing a [`FlagsClient`].
pub struct FlagsClientBuilder {
	client_key: Option<String>,
	user: Option<User>,
	edge_url: Option<String>,
	log_level: LogLevel,
	log_sink: Option<Arc<dyn LogSink>>,
	platform: Option<PlatformData>,
	transport: Option<Arc<dyn Transport>>,
	codec: Option<Arc<dyn WireCodec>>,
	stream_connector: Option<Arc<dyn StreamConnector>>,
	config: ClientConfig,
}

impl FlagsClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			client_key: None,
			user: None,
			edge_url: None,
			log_level: LogLevel::default(),
			log_sink: None,
			platform: None,
			transport: None,
			codec: None,
			stream_connector: None,
			config: ClientConfig::default(),
		}
	}

	/// Creates a builder seeded from `APPFLAGS_CLIENT_KEY`,
	/// `APPFLAGS_EDGE_URL` and `APPFLAGS_LOG_LEVEL`.
	///
	/// Unset variables leave the defaults in place, as does a log level that
	/// does not parse.
	pub fn from_env() -> Self {
		let mut builder = Self::new();
		if let Ok(key) = std::env::var(ENV_CLIENT_KEY) {
			builder = builder.client_key(key);
		}
		if let Ok(url) = std::env::var(ENV_EDGE_URL) {
			builder = builder.edge_url(url);
		}
		if let Some(level) = std::env::var(ENV_LOG_LEVEL)
			.ok()
			.and_then(|l| l.parse::<LogLevel>().ok())
		{
			builder = builder.log_level(level);
		}
		builder
	}

	/// Sets the client key identifying the flag configuration.
	pub fn client_key(mut self, key: impl Into<String>) -> Self {
		self.client_key = Some(key.into());
		self
	}

	/// Sets the user flags are evaluated for. Defaults to an anonymous user.
	pub fn user(mut self, user: User) -> Self {
		self.user = Some(user);
		self
	}

	/// Sets the edge service URL.
	///
	/// Example: `https://edge.appflags.net`
	pub fn edge_url(mut self, url: impl Into<String>) -> Self {
		self.edge_url = Some(url.into());
		self
	}

	/// Sets the minimum level of SDK log lines.
	pub fn log_level(mut self, level: LogLevel) -> Self {
		self.log_level = level;
		self
	}

	/// Sends SDK log lines to `sink` instead of `tracing`.
	pub fn logger(mut self, sink: Arc<dyn LogSink>) -> Self {
		self.log_sink = Some(sink);
		self
	}

	/// Sets the HTTP request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	/// Sets how long the client stays active after being backgrounded.
	pub fn pause_delay(mut self, delay: Duration) -> Self {
		self.config.pause_delay = delay;
		self
	}

	/// Overrides the platform data reported with each load.
	pub fn platform(mut self, platform: PlatformData) -> Self {
		self.platform = Some(platform);
		self
	}

	/// Replaces the HTTP transport.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Replaces the wire codec.
	pub fn codec(mut self, codec: Arc<dyn WireCodec>) -> Self {
		self.codec = Some(codec);
		self
	}

	/// Replaces the realtime stream connector.
	pub fn stream_connector(mut self, connector: Arc<dyn StreamConnector>) -> Self {
		self.stream_connector = Some(connector);
		self
	}

	/// Builds the client, then starts the initial load and the realtime
	/// stream on the current tokio runtime.
	pub fn build(self) -> Result<FlagsClient> {
		let client_key = self
			.client_key
			.filter(|k| !k.trim().is_empty())
			.ok_or(FlagsError::InvalidClientKey)?;
		let edge_url = normalize_edge_url(self.edge_url.as_deref().unwrap_or(DEFAULT_EDGE_URL))?;
		let runtime = Handle::try_current().map_err(|_| FlagsError::NoRuntime)?;

		let logger = match self.log_sink {
			Some(sink) => Logger::new(sink, self.log_level),
			None => Logger::tracing(self.log_level),
		};

		let transport: Arc<dyn Transport> = match self.transport {
			Some(transport) => transport,
			None => Arc::new(ReqwestTransport::new(self.config.request_timeout)?),
		};
		let connector: Arc<dyn StreamConnector> = match self.stream_connector {
			Some(connector) => connector,
			None => Arc::new(SseConnector::new(self.config.request_timeout)?),
		};
		let codec = self.codec.unwrap_or_else(|| Arc::new(EnvelopeCodec));

		let registry = Arc::new(FlagRegistry::new(logger.clone()));
		let loader = Arc::new(ConfigurationLoader::new(
			edge_url.clone(),
			client_key.clone(),
			self.platform.unwrap_or_else(PlatformData::current),
			self.user.unwrap_or_else(User::anonymous),
			transport.clone(),
			codec,
			registry.clone(),
			logger.clone(),
		));

		let closed = Arc::new(AtomicBool::new(false));
		let stream = Arc::new(StreamLifecycleManager::new(
			&edge_url,
			&client_key,
			transport,
			connector,
			realtime_reload(loader.clone(), closed.clone(), runtime.clone()),
			logger.clone(),
		));

		let target = Arc::new(ClientPauseTarget {
			stream: stream.clone(),
			loader: loader.clone(),
			closed: closed.clone(),
			runtime: runtime.clone(),
		});
		let pause = PauseController::new(self.config.pause_delay, target, logger.clone());

		let inner = Arc::new(FlagsClientInner {
			resolver: FlagResolver::new(registry.clone()),
			registry,
			loader,
			stream,
			pause,
			logger,
			runtime,
			closed,
			lifecycle_tasks: Mutex::new(Vec::new()),
			config: self.config,
		});

		inner
			.logger
			.info(format!("Flags client initialized for {edge_url}"));
		inner.start();

		Ok(FlagsClient { inner })
	}
}

impl Default for FlagsClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

fn normalize_edge_url(raw: &str) -> Result<String> {
	let trimmed = raw.trim().trim_end_matches('/');
	let parsed = url::Url::parse(trimmed).map_err(|_| FlagsError::InvalidBaseUrl)?;
	if !matches!(parsed.scheme(), "http" | "https") {
		return Err(FlagsError::InvalidBaseUrl);
	}
	Ok(trimmed.to_string())
}

/// Update handler that reloads the configuration for every realtime notice.
fn realtime_reload(
	loader: Arc<ConfigurationLoader>,
	closed: Arc<AtomicBool>,
	runtime: Handle,
) -> UpdateHandler {
	Arc::new(move |published| {
		if closed.load(Ordering::SeqCst) {
			return;
		}
		let loader = loader.clone();
		runtime.spawn(async move {
			let _ = loader.load(LoadReason::RealtimeReload, Some(published)).await;
		});
	})
}

/// Connects the pause controller to the stream and loader.
struct ClientPauseTarget {
	stream: Arc<StreamLifecycleManager>,
	loader: Arc<ConfigurationLoader>,
	closed: Arc<AtomicBool>,
	runtime: Handle,
}

#[async_trait]
impl PauseTarget for ClientPauseTarget {
	async fn pause(&self) {
		if self.closed.load(Ordering::SeqCst) {
			return;
		}
		self.stream.pause().await;
	}

	async fn resume(&self) {
		if self.closed.load(Ordering::SeqCst) {
			return;
		}
		let loader = self.loader.clone();
		self.runtime.spawn(async move {
			let _ = loader.load(LoadReason::InitialLoad, None).await;
		});
		self.stream.resume().await;
		connect_unless_closed(&self.stream, &self.closed).await;
	}
}

/// Connects the stream, tearing it down again if the client was closed
/// while the connection was being created.
async fn connect_unless_closed(stream: &StreamLifecycleManager, closed: &AtomicBool) {
	if closed.load(Ordering::SeqCst) {
		return;
	}
	stream.reconnect_if_needed().await;
	if closed.load(Ordering::SeqCst) {
		stream.close().await;
	}
}

/// Internal client state.
struct FlagsClientInner {
	registry: Arc<FlagRegistry>,
	resolver: FlagResolver,
	loader: Arc<ConfigurationLoader>,
	stream: Arc<StreamLifecycleManager>,
	pause: PauseController,
	logger: Logger,
	runtime: Handle,
	closed: Arc<AtomicBool>,
	lifecycle_tasks: Mutex<Vec<JoinHandle<()>>>,
	config: ClientConfig,
}

impl FlagsClientInner {
	fn start(&self) {
		let loader = self.loader.clone();
		self.runtime.spawn(async move {
			let _ = loader.load(LoadReason::InitialLoad, None).await;
		});

		let stream = self.stream.clone();
		let closed = self.closed.clone();
		self.runtime.spawn(async move {
			connect_unless_closed(&stream, &closed).await;
		});
	}

	fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}
}

impl Drop for FlagsClientInner {
	fn drop(&mut self) {
		self.closed.store(true, Ordering::SeqCst);
		for task in self.lifecycle_tasks.get_mut().drain(..) {
			task.abort();
		}
	}
}

/// Client for resolving feature flags.
///
/// Flags resolve synchronously against the resident configuration and keep
/// updating in place as new configurations arrive, either from the realtime
/// stream or from explicit loads.
///
/// # Example
///
/// ```ignore
/// use appflags::{FlagsClient, User};
///
/// let client = FlagsClient::builder()
///     .client_key("your_client_key")
///     .user(User::new("user-123"))
///     .build()?;
///
/// let checkout = client.get_boolean_flag("new-checkout", false);
/// checkout.on_update(|enabled| println!("new-checkout is now {enabled}"));
///
/// if checkout.value() {
///     // new checkout flow
/// }
/// ```
#[derive(Clone)]
pub struct FlagsClient {
	inner: Arc<FlagsClientInner>,
}

impl FlagsClient {
	/// Creates a new builder for constructing a FlagsClient.
	pub fn builder() -> FlagsClientBuilder {
		FlagsClientBuilder::new()
	}

	pub fn get_boolean_flag(&self, key: &str, default: bool) -> FlagHandle<bool> {
		self.inner.resolver.get_boolean_flag(key, default)
	}

	pub fn get_number_flag(&self, key: &str, default: f64) -> FlagHandle<f64> {
		self.inner.resolver.get_number_flag(key, default)
	}

	pub fn get_string_flag(&self, key: &str, default: impl Into<String>) -> FlagHandle<String> {
		self.inner.resolver.get_string_flag(key, default)
	}

	pub fn get_flag<T: FlagKind>(&self, key: &str, default: T) -> FlagHandle<T> {
		self.inner.resolver.get_flag(key, default)
	}

	/// The resident configuration.
	pub fn configuration(&self) -> Arc<Configuration> {
		self.inner.registry.configuration()
	}

	/// Fetches and installs a configuration.
	pub async fn load_configuration(
		&self,
		reason: LoadReason,
		published_at: Option<i64>,
	) -> Result<ReconcileReport> {
		self.check_closed()?;
		self.inner.loader.load(reason, published_at).await
	}

	/// Switches to a new user and reloads flags for them.
	pub async fn update_user(&self, user: User) -> Result<ReconcileReport> {
		self.check_closed()?;
		self.inner.loader.set_user(user);
		self.inner.loader.load(LoadReason::PeriodicReload, None).await
	}

	pub fn user(&self) -> User {
		self.inner.loader.user()
	}

	/// Waits until any load has succeeded. Returns false on timeout.
	pub async fn wait_for_initialization(&self, timeout: Duration) -> bool {
		self.inner.loader.wait_for_first_load(timeout).await
	}

	/// Signals that the host application moved to the background.
	pub async fn on_backgrounded(&self) {
		if self.inner.is_closed() {
			return;
		}
		self.inner.pause.on_backgrounded().await;
	}

	/// Signals that the host application returned to the foreground.
	pub async fn on_foregrounded(&self) {
		self.resume_if_needed().await;
	}

	/// Pauses the client immediately.
	pub async fn pause(&self) {
		if self.inner.is_closed() {
			return;
		}
		self.inner.pause.pause_now().await;
	}

	/// Resumes the client if it is paused. Returns true if it was.
	pub async fn resume_if_needed(&self) -> bool {
		if self.inner.is_closed() {
			return false;
		}
		self.inner.pause.on_foregrounded().await
	}

	/// Forwards host lifecycle events to the client until the source ends or
	/// the client is closed.
	pub fn attach_lifecycle_source<S: HostLifecycleSource>(&self, mut source: S) {
		if self.inner.is_closed() {
			return;
		}
		let pause = self.inner.pause.clone();
		let closed = self.inner.closed.clone();
		let logger = self.inner.logger.clone();
		let task = self.inner.runtime.spawn(async move {
			while let Some(event) = source.next_event().await {
				if closed.load(Ordering::SeqCst) {
					break;
				}
				pause.handle(event).await;
			}
			logger.debug("Lifecycle source ended");
		});

		let mut tasks = self.inner.lifecycle_tasks.lock();
		tasks.retain(|t| !t.is_finished());
		tasks.push(task);
	}

	pub fn stream_state(&self) -> StreamState {
		self.inner.stream.state()
	}

	pub fn is_paused(&self) -> bool {
		self.inner.pause.is_paused()
	}

	pub fn is_closed(&self) -> bool {
		self.inner.is_closed()
	}

	pub fn config(&self) -> &ClientConfig {
		&self.inner.config
	}

	/// Closes the client.
	///
	/// The realtime stream is torn down and stays down and further loads fail
	/// with [`FlagsError::ClientClosed`]. Handles keep their last values.
	pub async fn close(&self) {
		if self.inner.closed.swap(true, Ordering::SeqCst) {
			return;
		}
		self.inner.logger.info("Closing flags client");

		for task in self.inner.lifecycle_tasks.lock().drain(..) {
			task.abort();
		}
		self.inner.pause.cancel().await;
		self.inner.stream.close().await;
	}

	fn check_closed(&self) -> Result<()> {
		if self.inner.is_closed() {
			Err(FlagsError::ClientClosed)
		} else {
			Ok(())
		}
	}
}

impl std::fmt::Debug for FlagsClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FlagsClient")
			.field("loader", &self.inner.loader)
			.field("stream", &self.inner.stream)
			.field("closed", &self.is_closed())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::lifecycle::LifecycleEvent;
	use crate::stream::testing::{message, FakeConnector};
	use crate::transport::HttpResponse;
	use appflags_core::{ComputedFlag, FlagsResponse};
	use std::sync::atomic::AtomicUsize;

	/// Serves a fixed configuration and stream URL, recording each request.
	struct StaticTransport {
		flags: Mutex<Vec<ComputedFlag>>,
		posts: AtomicUsize,
		reasons: Mutex<Vec<LoadReason>>,
	}

	impl StaticTransport {
		fn new(flags: Vec<ComputedFlag>) -> Arc<Self> {
			Arc::new(Self {
				flags: Mutex::new(flags),
				posts: AtomicUsize::new(0),
				reasons: Mutex::new(Vec::new()),
			})
		}

		fn posts(&self) -> usize {
			self.posts.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl Transport for StaticTransport {
		async fn post(&self, _url: &str, body: Vec<u8>) -> Result<HttpResponse> {
			let request = EnvelopeCodec.decode_request(&body)?;
			self.reasons.lock().push(request.load_type);
			self.posts.fetch_add(1, Ordering::SeqCst);
			let flags = self.flags.lock().clone();
			Ok(HttpResponse::new(
				200,
				EnvelopeCodec.encode_response(&FlagsResponse { flags })?,
			))
		}

		async fn get(&self, _url: &str) -> Result<HttpResponse> {
			Ok(HttpResponse::new(200, r#"{"url":"https://stream.test/sse"}"#))
		}
	}

	async fn eventually(mut check: impl FnMut() -> bool) {
		for _ in 0..200 {
			if check() {
				return;
			}
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
		panic!("condition not reached");
	}

	fn client(transport: Arc<StaticTransport>, connector: Arc<FakeConnector>) -> FlagsClient {
		FlagsClient::builder()
			.client_key("key-1")
			.edge_url("https://edge.test/")
			.transport(transport)
			.stream_connector(connector)
			.build()
			.unwrap()
	}

	#[test]
	fn builder_requires_client_key() {
		let result = FlagsClientBuilder::new().build();
		assert!(matches!(result, Err(FlagsError::InvalidClientKey)));

		let result = FlagsClientBuilder::new().client_key("  ").build();
		assert!(matches!(result, Err(FlagsError::InvalidClientKey)));
	}

	#[test]
	fn builder_rejects_invalid_edge_url() {
		let result = FlagsClientBuilder::new()
			.client_key("key-1")
			.edge_url("not a url")
			.build();
		assert!(matches!(result, Err(FlagsError::InvalidBaseUrl)));

		let result = FlagsClientBuilder::new()
			.client_key("key-1")
			.edge_url("ftp://edge.test")
			.build();
		assert!(matches!(result, Err(FlagsError::InvalidBaseUrl)));
	}

	#[test]
	fn builder_requires_runtime() {
		let result = FlagsClientBuilder::new().client_key("key-1").build();
		assert!(matches!(result, Err(FlagsError::NoRuntime)));
	}

	#[test]
	fn edge_url_is_normalized() {
		assert_eq!(
			normalize_edge_url("https://edge.test/").unwrap(),
			"https://edge.test"
		);
		assert_eq!(
			normalize_edge_url("http://localhost:8080").unwrap(),
			"http://localhost:8080"
		);
	}

	#[test]
	fn default_config() {
		let config = ClientConfig::default();
		assert_eq!(config.request_timeout, Duration::from_secs(30));
		assert_eq!(config.pause_delay, Duration::from_secs(60));
	}

	#[tokio::test]
	async fn build_starts_initial_load_and_stream() {
		let transport = StaticTransport::new(vec![ComputedFlag::boolean("beta", true)]);
		let connector = Arc::new(FakeConnector::default());
		let client = client(transport.clone(), connector.clone());

		assert!(client.wait_for_initialization(Duration::from_secs(1)).await);
		eventually(|| client.stream_state() == StreamState::Connected).await;

		assert_eq!(transport.reasons.lock().first(), Some(&LoadReason::InitialLoad));
		assert_eq!(connector.connects(), 1);
		assert!(client.get_boolean_flag("beta", false).value());
		assert_eq!(client.user(), User::anonymous());
	}

	#[tokio::test]
	async fn realtime_notice_reloads_configuration() {
		let transport = StaticTransport::new(vec![ComputedFlag::number("limit", 1.0)]);
		let connector = Arc::new(FakeConnector::default());
		let client = client(transport.clone(), connector.clone());
		assert!(client.wait_for_initialization(Duration::from_secs(1)).await);
		eventually(|| client.stream_state() == StreamState::Connected).await;

		let handle = client.get_number_flag("limit", 0.0);
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = seen.clone();
		handle.on_update(move |v| sink.lock().push(*v));

		*transport.flags.lock() = vec![ComputedFlag::number("limit", 2.0)];
		connector.emit(message(1_700_000_000));

		eventually(|| handle.value() == 2.0).await;
		assert_eq!(*seen.lock(), vec![2.0]);
		assert!(transport.reasons.lock().contains(&LoadReason::RealtimeReload));
	}

	#[tokio::test]
	async fn update_user_reloads_for_new_user() {
		let transport = StaticTransport::new(vec![]);
		let client = client(transport.clone(), Arc::new(FakeConnector::default()));
		assert!(client.wait_for_initialization(Duration::from_secs(1)).await);

		client.update_user(User::new("user-9")).await.unwrap();

		assert_eq!(client.user(), User::new("user-9"));
		assert_eq!(
			transport.reasons.lock().last(),
			Some(&LoadReason::PeriodicReload)
		);
	}

	#[tokio::test]
	async fn pause_and_resume_cycle_stream_and_reload() {
		let transport = StaticTransport::new(vec![]);
		let connector = Arc::new(FakeConnector::default());
		let client = client(transport.clone(), connector.clone());
		assert!(client.wait_for_initialization(Duration::from_secs(1)).await);
		eventually(|| client.stream_state() == StreamState::Connected).await;

		client.pause().await;
		assert!(client.is_paused());
		assert_eq!(client.stream_state(), StreamState::Paused);
		assert_eq!(connector.stops(), 1);

		let posts = transport.posts();
		assert!(client.resume_if_needed().await);
		assert!(!client.is_paused());
		assert_eq!(client.stream_state(), StreamState::Connected);
		assert_eq!(connector.connects(), 2);
		eventually(|| transport.posts() == posts + 1).await;
	}

	#[tokio::test]
	async fn pause_before_startup_connect_keeps_stream_down() {
		let transport = StaticTransport::new(vec![]);
		let connector = Arc::new(FakeConnector::default());
		let client = client(transport, connector.clone());

		client.pause().await;
		tokio::time::sleep(Duration::from_millis(200)).await;

		assert!(client.is_paused());
		assert_eq!(client.stream_state(), StreamState::Paused);
		assert_eq!(
			connector.connects() - connector.stops(),
			0,
			"stream left open while paused"
		);

		assert!(client.resume_if_needed().await);
		assert_eq!(client.stream_state(), StreamState::Connected);
	}

	#[tokio::test]
	async fn lifecycle_source_drives_pause() {
		let transport = StaticTransport::new(vec![]);
		let connector = Arc::new(FakeConnector::default());
		let client = FlagsClient::builder()
			.client_key("key-1")
			.edge_url("https://edge.test")
			.pause_delay(Duration::from_millis(20))
			.transport(transport)
			.stream_connector(connector.clone())
			.build()
			.unwrap();
		eventually(|| client.stream_state() == StreamState::Connected).await;

		let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
		client.attach_lifecycle_source(rx);

		tx.send(LifecycleEvent::Backgrounded).unwrap();
		eventually(|| client.is_paused()).await;
		assert_eq!(client.stream_state(), StreamState::Paused);

		tx.send(LifecycleEvent::Foregrounded).unwrap();
		eventually(|| client.stream_state() == StreamState::Connected).await;
		assert!(!client.is_paused());
	}

	#[tokio::test]
	async fn close_stops_stream_and_rejects_loads() {
		let transport = StaticTransport::new(vec![ComputedFlag::string("theme", "dark")]);
		let connector = Arc::new(FakeConnector::default());
		let client = client(transport.clone(), connector.clone());
		assert!(client.wait_for_initialization(Duration::from_secs(1)).await);
		eventually(|| client.stream_state() == StreamState::Connected).await;

		client.close().await;

		assert!(client.is_closed());
		assert_eq!(client.stream_state(), StreamState::Disconnected);
		assert_eq!(connector.stops(), 1);

		let err = client
			.load_configuration(LoadReason::PeriodicReload, None)
			.await
			.unwrap_err();
		assert!(matches!(err, FlagsError::ClientClosed));

		client.on_foregrounded().await;
		assert_eq!(client.stream_state(), StreamState::Disconnected);
		assert_eq!(client.get_string_flag("theme", "light").value(), "dark");
	}
}
