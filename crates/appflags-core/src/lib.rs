// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the AppFlags client.
//!
//! This crate holds the data model shared by the client SDK (`appflags`) and
//! test fakes of the edge service. It performs no I/O.
//!
//! - [`ComputedFlag`], [`FlagValue`], [`FlagType`] and the [`FlagKind`] trait
//! - [`Configuration`], the immutable snapshot of all flags for one user
//! - [`WireCodec`] and the default [`EnvelopeCodec`]
//! - realtime stream messages ([`ConfigurationUpdateEvent`])
//!
//! # Example
//!
//! ```
//! use appflags_core::{ComputedFlag, Configuration, FlagValue};
//!
//! let config = Configuration::from_flags(vec![ComputedFlag::boolean("beta", true)]);
//! let value = config.get("beta").unwrap().decode().unwrap();
//! assert_eq!(value, FlagValue::Boolean(true));
//! ```

pub mod codec;
pub mod configuration;
pub mod error;
pub mod flag;
pub mod load;
pub mod platform;
pub mod realtime;
pub mod user;

pub use codec::{EnvelopeCodec, FlagRequest, FlagsResponse, WireCodec};
pub use configuration::Configuration;
pub use error::{CodecError, Result};
pub use flag::{ComputedFlag, FlagKind, FlagType, FlagValue, RawValue, ValueType};
pub use load::LoadReason;
pub use platform::{PlatformData, SDK_NAME, SDK_VERSION};
pub use realtime::{ConfigurationUpdateEvent, EventSourceMessage, RealtimeTokenResponse};
pub use user::User;
