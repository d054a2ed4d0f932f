// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::value::{FlagType, FlagValue};

/// Unique identifier for a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagId(pub Uuid);

impl FlagId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for FlagId {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Display for FlagId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::str::FromStr for FlagId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// Unique identifier for an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentId(pub Uuid);

impl EnvironmentId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for EnvironmentId {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Display for EnvironmentId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::str::FromStr for EnvironmentId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// Category of a flag.
///
/// The mutation engine only creates and updates `Core` flags. `Dependent`
/// flags carry dependency relationships and are managed elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlagCategory {
	Core,
	Dependent,
}

impl FlagCategory {
	pub fn as_str(&self) -> &'static str {
		match self {
			FlagCategory::Core => "CORE",
			FlagCategory::Dependent => "DEPENDENT",
		}
	}
}

impl std::fmt::Display for FlagCategory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for FlagCategory {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"CORE" => Ok(FlagCategory::Core),
			"DEPENDENT" => Ok(FlagCategory::Dependent),
			other => Err(format!("unknown flag category: {other}")),
		}
	}
}

/// A typed configuration value scoped to an environment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flag {
	pub id: FlagId,
	pub environment_id: EnvironmentId,
	/// Unique within the environment; immutable after creation.
	pub key: String,
	/// Unique within the environment when set.
	pub display_name: Option<String>,
	pub description: Option<String>,
	pub category: FlagCategory,
	/// Immutable after creation; `value` always conforms to it.
	#[serde(rename = "type")]
	pub flag_type: FlagType,
	pub value: FlagValue,
	pub enabled: bool,
	/// Starts at 1, bumped on value changes and toggles only.
	pub version: u32,
	/// Reserved for the dependent category; always `None` for core flags.
	pub dependency: Option<String>,
	pub created_by_uid: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Flag {
	pub fn is_core(&self) -> bool {
		self.category == FlagCategory::Core
	}
}

/// Request payload for creating a flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagDraft {
	pub key: String,
	#[serde(default)]
	pub display_name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(rename = "type")]
	pub flag_type: Option<FlagType>,
	/// Raw candidate value; validated and normalized against `flag_type`.
	#[serde(default)]
	pub value: Value,
	#[serde(default)]
	pub enabled: Option<bool>,
}

/// Partial update for a flag.
///
/// `None` means "field absent from the patch". A set field cannot be
/// cleared back to empty through this structure; that limitation is
/// inherited from the nullable-field patch semantics of the wire format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlagPatch {
	#[serde(default)]
	pub key: Option<String>,
	#[serde(default)]
	pub display_name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(rename = "type", default)]
	pub flag_type: Option<FlagType>,
	#[serde(default)]
	pub value: Option<Value>,
	#[serde(default)]
	pub enabled: Option<bool>,
}
