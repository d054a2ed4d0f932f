// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Rollout feature flags system.
//!
//! This crate provides the shared types for core flags: the flag entity,
//! its type-directed value union, drafts and patches, and the domain error
//! taxonomy. It is used by the server-side mutation engine
//! (`rollout-server-flags`) and carries no I/O of its own.
//!
//! # Overview
//!
//! A core flag is a typed configuration value scoped to an environment:
//! - Boolean, integer, double, string, or JSON values, validated and
//!   normalized against the declared type
//! - Key and type are immutable after creation
//! - Enabled state changes only through a dedicated toggle
//! - A monotonically increasing version, bumped on value changes and
//!   toggles, never on metadata edits
//!
//! # Example
//!
//! ```
//! use rollout_flags_core::{FlagType, FlagValue};
//!
//! // Validation normalizes the value for its declared type: the numeric
//! // string "42" is stored as the integer 42.
//! let value = FlagValue::normalize(FlagType::Integer, &serde_json::json!("42")).unwrap();
//! assert_eq!(value, FlagValue::Integer(42));
//! ```

pub mod environment;
pub mod error;
pub mod flag;
pub mod identity;
pub mod value;

pub use environment::Environment;
pub use error::{FlagsError, Result};
pub use flag::{EnvironmentId, Flag, FlagCategory, FlagDraft, FlagId, FlagPatch};
pub use identity::CallerIdentity;
pub use value::{FlagType, FlagValue};
