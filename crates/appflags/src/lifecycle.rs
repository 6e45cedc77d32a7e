// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host lifecycle handling.
//!
//! When the host application is backgrounded the client schedules a pause.
//! If the application comes back before the delay elapses the pause is
//! cancelled and nothing else happens. Otherwise the pause runs (the stream
//! is stopped) and the next foreground signal resumes the client with a full
//! reload and a reconnect.
//!
//! Scheduling, cancellation and execution of the pause all happen under one
//! async lock, and each scheduled pause carries a generation number. A pause
//! task that wakes up after being cancelled or superseded finds a different
//! generation (or none) and does nothing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::logging::Logger;

/// Default delay between a background signal and the pause.
pub const DEFAULT_PAUSE_DELAY: Duration = Duration::from_secs(60);

/// Foreground/background transitions of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
	Backgrounded,
	Foregrounded,
}

/// Source of host lifecycle events.
///
/// Platform glue detects transitions and feeds them through an
/// implementation of this trait; the client never queries the platform.
#[async_trait]
pub trait HostLifecycleSource: Send + 'static {
	/// Next event, or `None` once the source is exhausted.
	async fn next_event(&mut self) -> Option<LifecycleEvent>;
}

#[async_trait]
impl HostLifecycleSource for mpsc::Receiver<LifecycleEvent> {
	async fn next_event(&mut self) -> Option<LifecycleEvent> {
		self.recv().await
	}
}

#[async_trait]
impl HostLifecycleSource for mpsc::UnboundedReceiver<LifecycleEvent> {
	async fn next_event(&mut self) -> Option<LifecycleEvent> {
		self.recv().await
	}
}

/// What the controller pauses and resumes.
#[async_trait]
pub trait PauseTarget: Send + Sync {
	async fn pause(&self);

	async fn resume(&self);
}

struct ScheduledPause {
	generation: u64,
	task: JoinHandle<()>,
}

#[derive(Default)]
struct PauseState {
	paused: bool,
	pending: Option<ScheduledPause>,
}

struct ControllerInner {
	delay: Duration,
	target: Arc<dyn PauseTarget>,
	logger: Logger,
	state: Mutex<PauseState>,
	generation: AtomicU64,
	paused: AtomicBool,
}

impl ControllerInner {
	async fn run_scheduled_pause(&self, generation: u64) {
		let mut state = self.state.lock().await;
		match &state.pending {
			Some(pending) if pending.generation == generation => {}
			_ => {
				self.logger.debug("Scheduled pause was cancelled");
				return;
			}
		}
		state.pending = None;
		self.pause_locked(&mut state).await;
	}

	async fn pause_locked(&self, state: &mut PauseState) {
		if state.paused {
			return;
		}
		state.paused = true;
		self.paused.store(true, Ordering::SeqCst);
		self.target.pause().await;
		self.logger.debug("Paused client");
	}

	fn cancel_pending(&self, state: &mut PauseState) -> bool {
		match state.pending.take() {
			Some(pending) => {
				pending.task.abort();
				true
			}
			None => false,
		}
	}
}

/// Turns background/foreground signals into delayed pauses and resumes.
#[derive(Clone)]
pub struct PauseController {
	inner: Arc<ControllerInner>,
}

impl PauseController {
	pub fn new(delay: Duration, target: Arc<dyn PauseTarget>, logger: Logger) -> Self {
		Self {
			inner: Arc::new(ControllerInner {
				delay,
				target,
				logger,
				state: Mutex::new(PauseState::default()),
				generation: AtomicU64::new(0),
				paused: AtomicBool::new(false),
			}),
		}
	}

	pub fn delay(&self) -> Duration {
		self.inner.delay
	}

	pub fn is_paused(&self) -> bool {
		self.inner.paused.load(Ordering::SeqCst)
	}

	/// Whether a pause is scheduled and has not run yet.
	pub async fn has_pending_pause(&self) -> bool {
		self.inner.state.lock().await.pending.is_some()
	}

	pub async fn handle(&self, event: LifecycleEvent) {
		match event {
			LifecycleEvent::Backgrounded => self.on_backgrounded().await,
			LifecycleEvent::Foregrounded => {
				self.on_foregrounded().await;
			}
		}
	}

	/// Schedules a pause after the configured delay, replacing any pause
	/// already scheduled.
	pub async fn on_backgrounded(&self) {
		let mut state = self.inner.state.lock().await;
		if state.paused {
			self.inner.logger.debug("Application backgrounded, client already paused");
			return;
		}
		self.inner.cancel_pending(&mut state);

		let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
		let inner = self.inner.clone();
		let task = tokio::spawn(async move {
			tokio::time::sleep(inner.delay).await;
			inner.run_scheduled_pause(generation).await;
		});
		state.pending = Some(ScheduledPause { generation, task });

		self.inner.logger.debug(format!(
			"Application backgrounded, pausing in {}s",
			self.inner.delay.as_secs()
		));
	}

	/// Cancels a scheduled pause and resumes the client if it was paused.
	///
	/// Returns true if the client was resumed.
	pub async fn on_foregrounded(&self) -> bool {
		let mut state = self.inner.state.lock().await;
		if self.inner.cancel_pending(&mut state) {
			self.inner.logger.debug("Cancelled scheduled pause");
		}
		if !state.paused {
			self.inner
				.logger
				.debug("Application resumed, client is not yet paused");
			return false;
		}

		state.paused = false;
		self.inner.paused.store(false, Ordering::SeqCst);
		self.inner.logger.debug("Application resumed");
		self.inner.target.resume().await;
		self.inner.logger.debug("Unpaused client");
		true
	}

	/// Pauses immediately, cancelling any scheduled pause.
	pub async fn pause_now(&self) {
		let mut state = self.inner.state.lock().await;
		self.inner.cancel_pending(&mut state);
		self.inner.pause_locked(&mut state).await;
	}

	/// Cancels any scheduled pause without resuming.
	pub async fn cancel(&self) {
		let mut state = self.inner.state.lock().await;
		self.inner.cancel_pending(&mut state);
	}
}

impl std::fmt::Debug for PauseController {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PauseController")
			.field("delay", &self.inner.delay)
			.field("paused", &self.is_paused())
			.finish_non_exhaustive()
	}
}
