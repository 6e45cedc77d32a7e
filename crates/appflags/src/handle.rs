// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Live flag handles.
//!
//! A [`FlagHandle`] is owned by the caller. The registry only keeps a
//! [`Weak`](std::sync::Weak) reference to its shared slot, so dropping every
//! clone of a handle frees it and the registry prunes the dead reference on
//! its next pass.

use std::fmt;
use std::sync::Arc;

use appflags_core::{FlagKind, FlagType, FlagValue};
use parking_lot::Mutex;

type UpdateCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct HandleState<T> {
	value: T,
	is_default_value: bool,
	callbacks: Vec<UpdateCallback<T>>,
}

pub(crate) struct HandleSlot<T: FlagKind> {
	key: String,
	state: Mutex<HandleState<T>>,
}

/// Callbacks to run for one applied change, captured while the slot was
/// locked and invoked after every lock has been released.
pub(crate) struct PendingNotification(Box<dyn FnOnce() + Send>);

impl PendingNotification {
	pub(crate) fn fire(self) {
		(self.0)()
	}
}

/// Result of applying a decoded value to one handle.
pub(crate) enum ApplyOutcome {
	/// The value equals the one already held.
	Unchanged,
	/// The handle's declared type differs from the value's type.
	TypeMismatch { declared: FlagType },
	/// The value changed; carries the callbacks to notify.
	Changed(PendingNotification),
}

/// Type-erased view of a handle slot, as stored by the registry.
pub(crate) trait ErasedHandle: Send + Sync {
	fn declared_type(&self) -> FlagType;

	fn apply(&self, value: &FlagValue) -> ApplyOutcome;
}

impl<T: FlagKind> ErasedHandle for HandleSlot<T> {
	fn declared_type(&self) -> FlagType {
		T::FLAG_TYPE
	}

	fn apply(&self, value: &FlagValue) -> ApplyOutcome {
		let Some(new_value) = T::from_flag_value(value) else {
			return ApplyOutcome::TypeMismatch {
				declared: T::FLAG_TYPE,
			};
		};

		let mut state = self.state.lock();
		state.is_default_value = false;
		if state.value == new_value {
			return ApplyOutcome::Unchanged;
		}

		state.value = new_value.clone();
		let callbacks = state.callbacks.clone();
		drop(state);

		ApplyOutcome::Changed(PendingNotification(Box::new(move || {
			for callback in &callbacks {
				callback(&new_value);
			}
		})))
	}
}

/// A typed, live view of one flag.
///
/// Clones share the same underlying slot: an update applied by the client is
/// visible through every clone and fires each registered callback once.
pub struct FlagHandle<T: FlagKind> {
	slot: Arc<HandleSlot<T>>,
}

impl<T: FlagKind> FlagHandle<T> {
	pub(crate) fn new(key: impl Into<String>, value: T, is_default_value: bool) -> Self {
		Self {
			slot: Arc::new(HandleSlot {
				key: key.into(),
				state: Mutex::new(HandleState {
					value,
					is_default_value,
					callbacks: Vec::new(),
				}),
			}),
		}
	}

	pub(crate) fn erased(&self) -> Arc<dyn ErasedHandle> {
		self.slot.clone()
	}

	pub fn key(&self) -> &str {
		&self.slot.key
	}

	pub fn flag_type(&self) -> FlagType {
		T::FLAG_TYPE
	}

	/// Current value.
	pub fn value(&self) -> T {
		self.slot.state.lock().value.clone()
	}

	/// True until a value from a loaded configuration has been applied.
	pub fn is_default_value(&self) -> bool {
		self.slot.state.lock().is_default_value
	}

	/// Registers a callback invoked with the new value on every change.
	///
	/// Callbacks run synchronously, in registration order, on the task that
	/// applied the configuration. They may read flags but must not block.
	pub fn on_update<F>(&self, callback: F) -> &Self
	where
		F: Fn(&T) + Send + Sync + 'static,
	{
		self.slot.state.lock().callbacks.push(Arc::new(callback));
		self
	}

	/// Number of clones of this handle currently alive.
	pub fn holders(&self) -> usize {
		Arc::strong_count(&self.slot)
	}
}

impl<T: FlagKind> Clone for FlagHandle<T> {
	fn clone(&self) -> Self {
		Self {
			slot: self.slot.clone(),
		}
	}
}

impl<T: FlagKind> fmt::Debug for FlagHandle<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.slot.state.lock();
		f.debug_struct("FlagHandle")
			.field("key", &self.slot.key)
			.field("flag_type", &T::FLAG_TYPE)
			.field("value", &state.value)
			.field("is_default_value", &state.is_default_value)
			.field("callbacks", &state.callbacks.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn fire(outcome: ApplyOutcome) -> bool {
		match outcome {
			ApplyOutcome::Changed(pending) => {
				pending.fire();
				true
			}
			_ => false,
		}
	}

	#[test]
	fn apply_changed_value_notifies_in_order() {
		let handle = FlagHandle::new("beta", false, true);
		let seen = Arc::new(Mutex::new(Vec::new()));

		let first = seen.clone();
		let second = seen.clone();
		handle
			.on_update(move |v: &bool| first.lock().push(("first", *v)))
			.on_update(move |v: &bool| second.lock().push(("second", *v)));

		assert!(fire(handle.erased().apply(&FlagValue::Boolean(true))));
		assert_eq!(*seen.lock(), vec![("first", true), ("second", true)]);
		assert!(handle.value());
		assert!(!handle.is_default_value());
	}

	#[test]
	fn apply_same_value_clears_default_without_notifying() {
		let handle = FlagHandle::new("theme", "light".to_string(), true);
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = calls.clone();
		handle.on_update(move |_| {
			counter.fetch_add(1, Ordering::SeqCst);
		});

		let outcome = handle.erased().apply(&FlagValue::String("light".to_string()));
		assert!(matches!(outcome, ApplyOutcome::Unchanged));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
		assert!(!handle.is_default_value());
	}

	#[test]
	fn apply_other_type_is_rejected() {
		let handle = FlagHandle::new("limit", 3.0_f64, true);
		let outcome = handle.erased().apply(&FlagValue::Boolean(true));
		assert!(matches!(
			outcome,
			ApplyOutcome::TypeMismatch {
				declared: FlagType::Number
			}
		));
		assert_eq!(handle.value(), 3.0);
		assert!(handle.is_default_value());
	}

	#[test]
	fn callback_can_read_the_handle() {
		let handle = FlagHandle::new("beta", false, true);
		let observer = handle.clone();
		let observed = Arc::new(Mutex::new(None));
		let sink = observed.clone();
		handle.on_update(move |_| {
			*sink.lock() = Some(observer.value());
		});

		assert!(fire(handle.erased().apply(&FlagValue::Boolean(true))));
		assert_eq!(*observed.lock(), Some(true));
	}

	#[test]
	fn clones_share_state() {
		let handle = FlagHandle::new("beta", false, true);
		let clone = handle.clone();
		assert_eq!(handle.holders(), 2);

		fire(handle.erased().apply(&FlagValue::Boolean(true)));
		assert!(clone.value());
	}
}
