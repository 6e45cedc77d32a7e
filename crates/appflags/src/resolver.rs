// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Typed entry points for resolving flags.

use std::sync::Arc;

use appflags_core::FlagKind;

use crate::handle::FlagHandle;
use crate::registry::FlagRegistry;

/// Resolves flags against whatever configuration is currently resident.
///
/// Never performs I/O and never fails: an unknown, undecodable, or
/// mistyped flag yields a handle carrying the caller's default.
#[derive(Debug, Clone)]
pub struct FlagResolver {
	registry: Arc<FlagRegistry>,
}

impl FlagResolver {
	pub fn new(registry: Arc<FlagRegistry>) -> Self {
		Self { registry }
	}

	pub fn get_boolean_flag(&self, key: &str, default: bool) -> FlagHandle<bool> {
		self.get_flag(key, default)
	}

	pub fn get_number_flag(&self, key: &str, default: f64) -> FlagHandle<f64> {
		self.get_flag(key, default)
	}

	pub fn get_string_flag(&self, key: &str, default: impl Into<String>) -> FlagHandle<String> {
		self.get_flag(key, default.into())
	}

	pub fn get_flag<T: FlagKind>(&self, key: &str, default: T) -> FlagHandle<T> {
		self.registry.get_or_create_handle(key, default)
	}
}
