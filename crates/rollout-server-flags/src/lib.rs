// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server-side core flag management for Rollout.
//!
//! This crate provides the validation and mutation engine for core flags
//! together with the flag store it drives. Transport, token verification,
//! and environment resolution stay outside: the engine takes an opaque
//! [`CallerIdentity`] and works against the [`EnvironmentResolver`] and
//! [`FlagStore`] seams.
//!
//! # Architecture
//!
//! - `engine` - Flag creation, reads, partial update, toggle, and delete,
//!   enforcing key/type immutability and monotonic versioning
//! - `store` - Abstract keyed-record store plus the SQLite implementation
//! - `resolver` - Environment resolution collaborator interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rollout_server_flags::{FlagEngine, SqliteFlagStore};
//!
//! let store = Arc::new(SqliteFlagStore::new(pool));
//! let engine = FlagEngine::new(store, resolver);
//!
//! let flag = engine.create_flag(&identity, environment_id, draft).await?;
//! let flag = engine.toggle_flag(&identity, flag.id).await?;
//! ```

pub mod engine;
pub mod error;
pub mod resolver;
pub mod store;

pub use engine::FlagEngine;
pub use error::{FlagsServerError, Result};
pub use resolver::EnvironmentResolver;
pub use store::{FlagStore, SqliteFlagStore};

// Re-export core types for convenience
pub use rollout_flags_core::*;
