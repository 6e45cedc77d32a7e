// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration snapshots.

use std::collections::HashMap;

use crate::flag::ComputedFlag;

/// The full set of computed flags from one successful load.
///
/// Snapshots are immutable once built. A newer snapshot replaces an older one
/// wholesale; fields are never merged across snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
	flags: HashMap<String, ComputedFlag>,
}

impl Configuration {
	/// Creates an empty configuration.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Builds a configuration keyed by flag key. Later duplicates win.
	pub fn from_flags(flags: impl IntoIterator<Item = ComputedFlag>) -> Self {
		let flags = flags
			.into_iter()
			.map(|flag| (flag.key.clone(), flag))
			.collect();
		Self { flags }
	}

	pub fn get(&self, key: &str) -> Option<&ComputedFlag> {
		self.flags.get(key)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.flags.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.flags.len()
	}

	pub fn is_empty(&self) -> bool {
		self.flags.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.flags.keys().map(String::as_str)
	}

	pub fn flags(&self) -> impl Iterator<Item = &ComputedFlag> {
		self.flags.values()
	}
}

impl FromIterator<ComputedFlag> for Configuration {
	fn from_iter<I: IntoIterator<Item = ComputedFlag>>(iter: I) -> Self {
		Self::from_flags(iter)
	}
}
