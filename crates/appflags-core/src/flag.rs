// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flag value types.
//!
//! A [`ComputedFlag`] is what the edge service sends: a key, a wire value type
//! and a raw value record. Decoding turns it into a [`FlagValue`], and the
//! [`FlagKind`] trait maps a [`FlagValue`] onto the Rust type a caller asked
//! for.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// The declared type of a flag as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
	Boolean,
	Number,
	String,
}

impl FlagType {
	pub fn as_str(&self) -> &'static str {
		match self {
			FlagType::Boolean => "boolean",
			FlagType::Number => "number",
			FlagType::String => "string",
		}
	}
}

impl fmt::Display for FlagType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A decoded flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
	Boolean(bool),
	Number(f64),
	String(String),
}

impl FlagValue {
	/// Returns the flag type this value belongs to.
	pub fn flag_type(&self) -> FlagType {
		match self {
			FlagValue::Boolean(_) => FlagType::Boolean,
			FlagValue::Number(_) => FlagType::Number,
			FlagValue::String(_) => FlagType::String,
		}
	}
}

impl fmt::Display for FlagValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FlagValue::Boolean(b) => write!(f, "{b}"),
			FlagValue::Number(n) => write!(f, "{n}"),
			FlagValue::String(s) => f.write_str(s),
		}
	}
}

/// Rust types a flag can be resolved as.
///
/// Implemented for `bool`, `f64` and `String`. The associated
/// [`FLAG_TYPE`](FlagKind::FLAG_TYPE) is the declared type of every handle
/// created for `Self`.
pub trait FlagKind: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
	const FLAG_TYPE: FlagType;

	/// Extracts `Self` from a decoded value, or `None` if the kinds differ.
	fn from_flag_value(value: &FlagValue) -> Option<Self>;

	fn into_flag_value(self) -> FlagValue;
}

impl FlagKind for bool {
	const FLAG_TYPE: FlagType = FlagType::Boolean;

	fn from_flag_value(value: &FlagValue) -> Option<Self> {
		match value {
			FlagValue::Boolean(b) => Some(*b),
			_ => None,
		}
	}

	fn into_flag_value(self) -> FlagValue {
		FlagValue::Boolean(self)
	}
}

impl FlagKind for f64 {
	const FLAG_TYPE: FlagType = FlagType::Number;

	fn from_flag_value(value: &FlagValue) -> Option<Self> {
		match value {
			FlagValue::Number(n) => Some(*n),
			_ => None,
		}
	}

	fn into_flag_value(self) -> FlagValue {
		FlagValue::Number(self)
	}
}

impl FlagKind for String {
	const FLAG_TYPE: FlagType = FlagType::String;

	fn from_flag_value(value: &FlagValue) -> Option<Self> {
		match value {
			FlagValue::String(s) => Some(s.clone()),
			_ => None,
		}
	}

	fn into_flag_value(self) -> FlagValue {
		FlagValue::String(self)
	}
}

/// Value type tag as it appears on the wire.
///
/// Tags this client does not know about deserialize as `Unrecognized` so that
/// one unknown flag does not fail the whole configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
	Boolean,
	Double,
	String,
	#[serde(other)]
	Unrecognized,
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			ValueType::Boolean => "BOOLEAN",
			ValueType::Double => "DOUBLE",
			ValueType::String => "STRING",
			ValueType::Unrecognized => "UNRECOGNIZED",
		};
		f.write_str(s)
	}
}

/// Raw value record. Only the field matching the value type is meaningful;
/// a missing field means the zero value of that kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValue {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub boolean_value: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub double_value: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub string_value: Option<String>,
}

/// A flag as computed server-side for the current user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedFlag {
	pub key: String,
	pub value_type: ValueType,
	#[serde(default)]
	pub value: RawValue,
}

impl ComputedFlag {
	pub fn boolean(key: impl Into<String>, value: bool) -> Self {
		Self {
			key: key.into(),
			value_type: ValueType::Boolean,
			value: RawValue {
				boolean_value: Some(value),
				..RawValue::default()
			},
		}
	}

	pub fn number(key: impl Into<String>, value: f64) -> Self {
		Self {
			key: key.into(),
			value_type: ValueType::Double,
			value: RawValue {
				double_value: Some(value),
				..RawValue::default()
			},
		}
	}

	pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			value_type: ValueType::String,
			value: RawValue {
				string_value: Some(value.into()),
				..RawValue::default()
			},
		}
	}

	/// Decodes the raw record into a typed value.
	///
	/// Fails with [`CodecError::UnexpectedValueKind`] when the value type is
	/// not one this client understands.
	pub fn decode(&self) -> Result<FlagValue, CodecError> {
		match self.value_type {
			ValueType::Boolean => Ok(FlagValue::Boolean(
				self.value.boolean_value.unwrap_or_default(),
			)),
			ValueType::Double => Ok(FlagValue::Number(
				self.value.double_value.unwrap_or_default(),
			)),
			ValueType::String => Ok(FlagValue::String(
				self.value.string_value.clone().unwrap_or_default(),
			)),
			ValueType::Unrecognized => Err(CodecError::UnexpectedValueKind {
				key: self.key.clone(),
				value_type: self.value_type.to_string(),
			}),
		}
	}
}
