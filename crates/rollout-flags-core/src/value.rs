// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FlagsError;

/// Declared type of a flag's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlagType {
	Boolean,
	Integer,
	Double,
	String,
	Json,
}

impl FlagType {
	pub fn as_str(&self) -> &'static str {
		match self {
			FlagType::Boolean => "BOOLEAN",
			FlagType::Integer => "INTEGER",
			FlagType::Double => "DOUBLE",
			FlagType::String => "STRING",
			FlagType::Json => "JSON",
		}
	}
}

impl std::fmt::Display for FlagType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for FlagType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"BOOLEAN" => Ok(FlagType::Boolean),
			"INTEGER" => Ok(FlagType::Integer),
			"DOUBLE" => Ok(FlagType::Double),
			"STRING" => Ok(FlagType::String),
			"JSON" => Ok(FlagType::Json),
			other => Err(format!("unknown flag type: {other}")),
		}
	}
}

/// A flag value that has passed validation for its declared type.
///
/// Values enter the system as raw `serde_json::Value` payloads (drafts and
/// patches) and are only ever stored in this normalized form. The sole
/// constructor is [`FlagValue::normalize`], so a `FlagValue` always agrees
/// with the [`FlagType`] it was validated against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
	Boolean(bool),
	Integer(i32),
	Double(f64),
	String(String),
	Json(Value),
}

impl FlagValue {
	/// Validates a raw value against a declared type and converts it into
	/// its canonical representation.
	///
	/// Normalization can rewrite the value: the integer string `"42"`
	/// becomes the integer `42`, and JSON text becomes the parsed
	/// structure. Normalizing an already-normalized value is a no-op.
	pub fn normalize(flag_type: FlagType, raw: &Value) -> Result<Self, FlagsError> {
		if raw.is_null() {
			return Err(FlagsError::ValueRequired);
		}

		match flag_type {
			FlagType::Boolean => match raw {
				Value::Bool(b) => Ok(FlagValue::Boolean(*b)),
				_ => Err(invalid(flag_type, "value must be a boolean")),
			},
			FlagType::Integer => match raw {
				Value::Number(n) => {
					// Fractional input truncates toward zero before the
					// 32-bit range check.
					let wide = if let Some(i) = n.as_i64() {
						i
					} else if n.as_u64().is_some() {
						return Err(invalid(flag_type, "integer value out of bounds"));
					} else {
						n.as_f64().unwrap_or(0.0) as i64
					};

					i32::try_from(wide)
						.map(FlagValue::Integer)
						.map_err(|_| invalid(flag_type, "integer value out of bounds"))
				}
				Value::String(s) => s
					.parse::<i32>()
					.map(FlagValue::Integer)
					.map_err(|_| invalid(flag_type, "string is not a parseable integer")),
				_ => Err(invalid(flag_type, "value must be a number or numeric string")),
			},
			FlagType::Double => match raw {
				Value::Number(n) => match n.as_f64() {
					Some(d) => Ok(FlagValue::Double(d)),
					None => Err(invalid(flag_type, "number is not representable as a double")),
				},
				Value::String(s) => s
					.parse::<f64>()
					.map(FlagValue::Double)
					.map_err(|_| invalid(flag_type, "string is not a parseable number")),
				_ => Err(invalid(flag_type, "value must be a number or numeric string")),
			},
			FlagType::String => match raw {
				Value::String(s) => Ok(FlagValue::String(s.clone())),
				_ => Err(invalid(flag_type, "value must be a string")),
			},
			FlagType::Json => match raw {
				Value::Object(_) | Value::Array(_) => Ok(FlagValue::Json(raw.clone())),
				Value::String(s) => {
					let parsed: Value = serde_json::from_str(s)
						.map_err(|_| invalid(flag_type, "string is not valid JSON text"))?;
					if parsed.is_null() {
						return Err(invalid(flag_type, "top-level JSON null is not allowed"));
					}
					Ok(FlagValue::Json(parsed))
				}
				_ => Err(invalid(flag_type, "value must be a JSON object, array, or JSON text")),
			},
		}
	}

	/// The declared type this value was validated against.
	pub fn flag_type(&self) -> FlagType {
		match self {
			FlagValue::Boolean(_) => FlagType::Boolean,
			FlagValue::Integer(_) => FlagType::Integer,
			FlagValue::Double(_) => FlagType::Double,
			FlagValue::String(_) => FlagType::String,
			FlagValue::Json(_) => FlagType::Json,
		}
	}

	/// The raw JSON shape of this value, as a caller would see it.
	pub fn as_json(&self) -> Value {
		match self {
			FlagValue::Boolean(b) => Value::Bool(*b),
			FlagValue::Integer(i) => Value::from(*i),
			FlagValue::Double(d) => serde_json::json!(*d),
			FlagValue::String(s) => Value::String(s.clone()),
			FlagValue::Json(v) => v.clone(),
		}
	}
}

fn invalid(flag_type: FlagType, detail: &str) -> FlagsError {
	FlagsError::InvalidValue {
		flag_type,
		detail: detail.to_string(),
	}
}
