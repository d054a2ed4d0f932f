// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::EnvironmentId;

/// Deployment environment that owns a set of flags.
///
/// Environments are resolved by an external collaborator, either from an
/// authenticated caller and an environment id, or from an opaque SDK key.
/// The flags engine never creates or mutates environments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
	pub id: EnvironmentId,
	/// e.g., "dev", "staging", "prod"
	pub name: String,
	pub created_at: DateTime<Utc>,
}
