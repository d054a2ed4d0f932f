// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use rollout_flags_core::{CallerIdentity, Environment, EnvironmentId};

use crate::error::Result;

/// Resolves environments for the flags engine.
///
/// This is the access-control gate: `resolve_by_caller_and_id` must fail
/// with `EnvironmentNotFound` or `AccessDenied` when the caller may not
/// operate on the environment, and the engine propagates those failures
/// unchanged. `resolve_by_sdk_key` maps an opaque SDK key to its
/// environment and carries no further authorization context.
#[async_trait]
pub trait EnvironmentResolver: Send + Sync {
	async fn resolve_by_caller_and_id(
		&self,
		identity: &CallerIdentity,
		environment_id: EnvironmentId,
	) -> Result<Environment>;

	async fn resolve_by_sdk_key(&self, sdk_key: &str) -> Result<Environment>;
}
