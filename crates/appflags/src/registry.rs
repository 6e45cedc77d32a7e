// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Registry of outstanding flag handles.
//!
//! The registry owns the current [`Configuration`] and, per flag key, the
//! weak references to every handle it has handed out. Installing a new
//! configuration reconciles it against those handles and fires change
//! callbacks.
//!
//! # Locking
//!
//! - `state` guards the snapshot and the reference lists together, so a
//!   handle is either created against the old snapshot and registered before
//!   reconciliation walks the lists, or created against the new snapshot.
//! - `dispatch` serializes reconciliation passes end to end, including the
//!   callbacks, so notifications from two loads never interleave. It is
//!   re-entrant and is never taken while `state` is held, which lets a
//!   callback resolve flags (or reconcile) without deadlocking.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use appflags_core::{Configuration, FlagKind};
use parking_lot::{Mutex, ReentrantMutex};

use crate::handle::{ApplyOutcome, ErasedHandle, FlagHandle, PendingNotification};
use crate::logging::Logger;

#[derive(Default)]
struct RegistryState {
	configuration: Arc<Configuration>,
	handles: HashMap<String, Vec<Weak<dyn ErasedHandle>>>,
}

/// Counters describing one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
	/// Handles whose value changed.
	pub updated: usize,
	/// Handles left alone because their declared type differs.
	pub type_mismatches: usize,
	/// Registered keys missing from the new configuration.
	pub missing_keys: usize,
	/// Registered keys whose flag failed to decode.
	pub decode_failures: usize,
	/// Dead references removed.
	pub pruned: usize,
}

/// Tracks handles by key and applies new configurations to them.
pub struct FlagRegistry {
	state: Mutex<RegistryState>,
	dispatch: ReentrantMutex<()>,
	logger: Logger,
}

impl FlagRegistry {
	pub fn new(logger: Logger) -> Self {
		Self {
			state: Mutex::new(RegistryState::default()),
			dispatch: ReentrantMutex::new(()),
			logger,
		}
	}

	/// The configuration most recently installed.
	pub fn configuration(&self) -> Arc<Configuration> {
		self.state.lock().configuration.clone()
	}

	/// Returns a handle for `key` backed by the current configuration.
	///
	/// Falls back to a default-valued handle when the flag is absent, cannot
	/// be decoded, or has a type other than `T`. Never fails.
	pub fn get_or_create_handle<T: FlagKind>(&self, key: &str, default: T) -> FlagHandle<T> {
		let mut state = self.state.lock();

		let resolved = state
			.configuration
			.get(key)
			.and_then(|raw| match raw.decode() {
				Ok(value) => match T::from_flag_value(&value) {
					Some(typed) => Some(typed),
					None => {
						self.logger.warn(format!(
							"Found flag [{key}] did not match expected type. Expected {} but found {}. Falling back to default value.",
							T::FLAG_TYPE,
							value.flag_type()
						));
						None
					}
				},
				Err(e) => {
					self.logger.error(format!(
						"Error converting flag [{key}], falling back to default value: {e}"
					));
					None
				}
			});

		let handle = match resolved {
			Some(value) => FlagHandle::new(key, value, false),
			None => FlagHandle::new(key, default, true),
		};

		state
			.handles
			.entry(key.to_string())
			.or_default()
			.push(Arc::downgrade(&handle.erased()));

		handle
	}

	/// Installs `configuration` as current and applies it to every live
	/// handle.
	///
	/// Keys absent from the new configuration are logged and their handles
	/// keep their values. Callbacks fire once per changed handle, in
	/// registration order, after the registry lock has been released.
	pub fn reconcile(&self, configuration: Configuration) -> ReconcileReport {
		let _dispatch = self.dispatch.lock();
		let mut report = ReconcileReport::default();
		let mut pending: Vec<PendingNotification> = Vec::new();

		{
			let mut state = self.state.lock();
			state.configuration = Arc::new(configuration);
			let configuration = state.configuration.clone();

			for (key, refs) in state.handles.iter_mut() {
				let before = refs.len();
				refs.retain(|r| r.strong_count() > 0);
				report.pruned += before - refs.len();

				let Some(raw) = configuration.get(key) else {
					self.logger.warn(format!(
						"Updated configuration does not include pre-existing flag [{key}]"
					));
					report.missing_keys += 1;
					continue;
				};

				let value = match raw.decode() {
					Ok(value) => value,
					Err(e) => {
						self.logger
							.error(format!("Unable to convert updated flag [{key}]: {e}"));
						report.decode_failures += 1;
						continue;
					}
				};

				for weak in refs.iter() {
					let Some(handle) = weak.upgrade() else {
						continue;
					};
					match handle.apply(&value) {
						ApplyOutcome::Unchanged => {}
						ApplyOutcome::TypeMismatch { declared } => {
							self.logger.warn(format!(
								"Updated flag [{key}] is {} but handle expects {declared}, cannot update flag's value",
								value.flag_type()
							));
							report.type_mismatches += 1;
						}
						ApplyOutcome::Changed(notification) => {
							report.updated += 1;
							pending.push(notification);
						}
					}
				}
			}

			state.handles.retain(|_, refs| !refs.is_empty());
		}

		for notification in pending {
			notification.fire();
		}

		report
	}

	/// Number of keys with at least one registered reference.
	pub fn tracked_keys(&self) -> usize {
		self.state.lock().handles.len()
	}

	/// Number of registered references for `key`, live or dead.
	pub fn tracked_handles(&self, key: &str) -> usize {
		self.state.lock().handles.get(key).map_or(0, Vec::len)
	}
}

impl std::fmt::Debug for FlagRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.lock();
		f.debug_struct("FlagRegistry")
			.field("flags", &state.configuration.len())
			.field("tracked_keys", &state.handles.len())
			.finish()
	}
}
