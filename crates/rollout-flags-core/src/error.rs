// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the core flags system.

use thiserror::Error;

use crate::value::FlagType;

/// Errors surfaced by flag validation and mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlagsError {
	/// Referenced flag does not exist.
	#[error("flag not found")]
	FlagNotFound,

	/// Referenced environment does not exist.
	#[error("environment not found")]
	EnvironmentNotFound,

	/// Caller cannot access the resolved environment.
	#[error("access to this environment is denied")]
	AccessDenied,

	/// A flag with this key already exists in the environment.
	#[error("a flag with this key already exists in the environment")]
	DuplicateKey,

	/// A flag with this display name already exists in the environment.
	#[error("a flag with this name already exists in the environment")]
	DuplicateDisplayName,

	/// Attempt to change a field that only a dedicated operation may touch.
	#[error("flag {field} is immutable and cannot be changed through this operation")]
	Immutable { field: &'static str },

	/// Update attempted on a non-core flag via the core-only path.
	#[error("only core flags can be updated through this operation")]
	InvalidCategory,

	/// Flag type is missing.
	#[error("flag type is required")]
	TypeRequired,

	/// Flag value is missing; core flags must carry a value.
	#[error("flag value is required for core flags")]
	ValueRequired,

	/// Value does not conform to the declared type.
	#[error("invalid value for flag type {flag_type}: {detail}")]
	InvalidValue { flag_type: FlagType, detail: String },
}

/// Result type alias for core flag operations.
pub type Result<T> = std::result::Result<T, FlagsError>;
