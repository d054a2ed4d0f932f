// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

/// Authenticated principal performing a flag operation.
///
/// Produced by the authentication layer after token verification; the
/// flags engine never parses tokens itself. Carries only the uid that is
/// stamped onto created flags and handed to the environment resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
	uid: String,
}

impl CallerIdentity {
	pub fn new(uid: impl Into<String>) -> Self {
		Self { uid: uid.into() }
	}

	pub fn uid(&self) -> &str {
		&self.uid
	}
}
