// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for server-side flag operations.

use thiserror::Error;

use rollout_flags_core::FlagsError;

/// Result type for server-side flag operations.
pub type Result<T> = std::result::Result<T, FlagsServerError>;

/// Errors that can occur in server-side flag operations.
///
/// Domain failures keep their [`FlagsError`] kind so callers can map them
/// to user-facing responses; store failures propagate unchanged.
#[derive(Debug, Error)]
pub enum FlagsServerError {
	#[error("{0}")]
	Flag(#[from] FlagsError),

	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("internal error: {0}")]
	Internal(String),
}

impl FlagsServerError {
	/// The domain error kind, if this is a domain failure.
	pub fn as_flag_error(&self) -> Option<&FlagsError> {
		match self {
			FlagsServerError::Flag(err) => Some(err),
			_ => None,
		}
	}
}
