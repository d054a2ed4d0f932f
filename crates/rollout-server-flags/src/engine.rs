// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use rollout_flags_core::{
	CallerIdentity, EnvironmentId, Flag, FlagCategory, FlagDraft, FlagId, FlagPatch, FlagType,
	FlagValue, FlagsError,
};

use crate::error::Result;
use crate::resolver::EnvironmentResolver;
use crate::store::FlagStore;

/// Validation and mutation engine for core flags.
///
/// Every operation resolves the caller's access to the target environment
/// through the [`EnvironmentResolver`] before touching the store, and
/// re-reads current flag state before mutating it. Failures leave the
/// stored flag completely unchanged; there is no partial application.
pub struct FlagEngine {
	store: Arc<dyn FlagStore>,
	environments: Arc<dyn EnvironmentResolver>,
}

impl FlagEngine {
	pub fn new(store: Arc<dyn FlagStore>, environments: Arc<dyn EnvironmentResolver>) -> Self {
		Self {
			store,
			environments,
		}
	}

	/// Creates a core flag in an environment.
	///
	/// Forces `category` to core, clears `dependency`, starts the version
	/// at 1, stamps the caller's uid, and defaults `enabled` to false when
	/// the draft leaves it unset. The draft value is validated and
	/// normalized against the declared type before anything is persisted.
	#[instrument(skip(self, identity, draft), fields(env_id = %environment_id, flag_key = %draft.key))]
	pub async fn create_flag(
		&self,
		identity: &CallerIdentity,
		environment_id: EnvironmentId,
		draft: FlagDraft,
	) -> Result<Flag> {
		self.environments
			.resolve_by_caller_and_id(identity, environment_id)
			.await?;

		if self
			.store
			.find_by_environment_and_key(environment_id, &draft.key)
			.await?
			.is_some()
		{
			return Err(FlagsError::DuplicateKey.into());
		}

		if let Some(display_name) = &draft.display_name {
			if self
				.store
				.find_by_environment_and_display_name(environment_id, display_name)
				.await?
				.is_some()
			{
				return Err(FlagsError::DuplicateDisplayName.into());
			}
		}

		let flag_type = draft.flag_type.ok_or(FlagsError::TypeRequired)?;
		let value = FlagValue::normalize(flag_type, &draft.value)?;

		let now = Utc::now();
		let flag = Flag {
			id: FlagId::new(),
			environment_id,
			key: draft.key,
			display_name: draft.display_name,
			description: draft.description,
			category: FlagCategory::Core,
			flag_type,
			value,
			enabled: draft.enabled.unwrap_or(false),
			version: 1,
			dependency: None,
			created_by_uid: identity.uid().to_string(),
			created_at: now,
			updated_at: now,
		};

		let stored = self.store.save(&flag).await?;
		tracing::debug!(flag_id = %stored.id, "Created core flag");
		Ok(stored)
	}

	/// Lists all core flags in an environment.
	#[instrument(skip(self, identity), fields(env_id = %environment_id))]
	pub async fn list_flags(
		&self,
		identity: &CallerIdentity,
		environment_id: EnvironmentId,
	) -> Result<Vec<Flag>> {
		self.environments
			.resolve_by_caller_and_id(identity, environment_id)
			.await?;
		self.store
			.list_by_environment_category(environment_id, FlagCategory::Core)
			.await
	}

	/// Lists core flags whose type is not JSON.
	#[instrument(skip(self, identity), fields(env_id = %environment_id))]
	pub async fn list_basic_flags(
		&self,
		identity: &CallerIdentity,
		environment_id: EnvironmentId,
	) -> Result<Vec<Flag>> {
		self.environments
			.resolve_by_caller_and_id(identity, environment_id)
			.await?;
		self.store
			.list_by_environment_category_not_type(environment_id, FlagCategory::Core, FlagType::Json)
			.await
	}

	/// Lists core flags whose type is JSON.
	#[instrument(skip(self, identity), fields(env_id = %environment_id))]
	pub async fn list_json_flags(
		&self,
		identity: &CallerIdentity,
		environment_id: EnvironmentId,
	) -> Result<Vec<Flag>> {
		self.environments
			.resolve_by_caller_and_id(identity, environment_id)
			.await?;
		self.store
			.list_by_environment_category_type(environment_id, FlagCategory::Core, FlagType::Json)
			.await
	}

	/// Lists core flags for the environment an SDK key maps to.
	///
	/// Public read path for client SDKs: the key resolves to exactly one
	/// environment and carries no caller identity.
	#[instrument(skip(self, sdk_key))]
	pub async fn get_flags_by_sdk_key(&self, sdk_key: &str) -> Result<Vec<Flag>> {
		let environment = self.environments.resolve_by_sdk_key(sdk_key).await?;
		self.store
			.list_by_environment_category(environment.id, FlagCategory::Core)
			.await
	}

	/// Point read by flag id, with an access check on the owning environment.
	#[instrument(skip(self, identity), fields(flag_id = %flag_id))]
	pub async fn get_flag(&self, identity: &CallerIdentity, flag_id: FlagId) -> Result<Flag> {
		let flag = self
			.store
			.find_by_id(flag_id)
			.await?
			.ok_or(FlagsError::FlagNotFound)?;

		self.environments
			.resolve_by_caller_and_id(identity, flag.environment_id)
			.await?;

		Ok(flag)
	}

	/// Applies a partial update to a core flag.
	///
	/// Fields are evaluated in a fixed order and the first violated rule
	/// aborts the whole update: key immutability, display-name uniqueness,
	/// description, the core-category gate, type immutability, value
	/// change (validated and normalized, bumping the version), and the
	/// enabled guard (`enabled` changes only through [`Self::toggle_flag`]).
	/// Metadata-only edits do not bump the version.
	#[instrument(skip(self, identity, patch), fields(flag_id = %flag_id))]
	pub async fn update_flag(
		&self,
		identity: &CallerIdentity,
		flag_id: FlagId,
		patch: FlagPatch,
	) -> Result<Flag> {
		let mut flag = self.get_flag(identity, flag_id).await?;

		if let Some(key) = &patch.key {
			if *key != flag.key {
				return Err(FlagsError::Immutable { field: "key" }.into());
			}
		}

		if let Some(display_name) = patch.display_name {
			if flag.display_name.as_ref() != Some(&display_name) {
				if self
					.store
					.find_by_environment_and_display_name(flag.environment_id, &display_name)
					.await?
					.is_some()
				{
					return Err(FlagsError::DuplicateDisplayName.into());
				}
				flag.display_name = Some(display_name);
			}
		}

		if let Some(description) = patch.description {
			flag.description = Some(description);
		}

		if !flag.is_core() {
			return Err(FlagsError::InvalidCategory.into());
		}

		if let Some(flag_type) = patch.flag_type {
			if flag_type != flag.flag_type {
				return Err(FlagsError::Immutable { field: "type" }.into());
			}
		}

		// A raw patch value that differs from the stored value's raw shape
		// counts as a change, even when normalization would converge.
		let mut value_changed = false;
		if let Some(raw) = &patch.value {
			if *raw != flag.value.as_json() {
				flag.value = FlagValue::normalize(flag.flag_type, raw)?;
				value_changed = true;
			}
		}

		if value_changed {
			flag.version += 1;
		}

		if let Some(enabled) = patch.enabled {
			if enabled != flag.enabled {
				return Err(FlagsError::Immutable { field: "enabled" }.into());
			}
		}

		flag.updated_at = Utc::now();
		self.store.save(&flag).await
	}

	/// Flips a flag's enabled state, bumping its version.
	///
	/// Toggling never touches the value or type, so no re-validation runs.
	#[instrument(skip(self, identity), fields(flag_id = %flag_id))]
	pub async fn toggle_flag(&self, identity: &CallerIdentity, flag_id: FlagId) -> Result<Flag> {
		let mut flag = self.get_flag(identity, flag_id).await?;

		flag.enabled = !flag.enabled;
		flag.version += 1;
		flag.updated_at = Utc::now();

		let stored = self.store.save(&flag).await?;
		tracing::debug!(enabled = stored.enabled, version = stored.version, "Toggled core flag");
		Ok(stored)
	}

	/// Hard-deletes a flag after the access check.
	#[instrument(skip(self, identity), fields(flag_id = %flag_id))]
	pub async fn delete_flag(&self, identity: &CallerIdentity, flag_id: FlagId) -> Result<()> {
		let flag = self.get_flag(identity, flag_id).await?;
		self.store.delete(&flag).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use rollout_flags_core::Environment;
	use serde_json::json;
	use sqlx::sqlite::SqlitePoolOptions;

	use crate::error::FlagsServerError;
	use crate::store::SqliteFlagStore;

	const UID: &str = "uid-1";
	const SDK_KEY: &str = "sdk-key-1";

	/// Resolver over a single fixed environment: one allowed uid, one SDK key.
	struct StaticResolver {
		environment: Environment,
	}

	#[async_trait]
	impl EnvironmentResolver for StaticResolver {
		async fn resolve_by_caller_and_id(
			&self,
			identity: &CallerIdentity,
			environment_id: EnvironmentId,
		) -> Result<Environment> {
			if environment_id != self.environment.id {
				return Err(FlagsError::EnvironmentNotFound.into());
			}
			if identity.uid() != UID {
				return Err(FlagsError::AccessDenied.into());
			}
			Ok(self.environment.clone())
		}

		async fn resolve_by_sdk_key(&self, sdk_key: &str) -> Result<Environment> {
			if sdk_key != SDK_KEY {
				return Err(FlagsError::EnvironmentNotFound.into());
			}
			Ok(self.environment.clone())
		}
	}

	async fn test_engine() -> (FlagEngine, Arc<SqliteFlagStore>, EnvironmentId) {
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.connect("sqlite::memory:")
			.await
			.unwrap();
		SqliteFlagStore::migrate(&pool).await.unwrap();
		let store = Arc::new(SqliteFlagStore::new(pool));

		let environment = Environment {
			id: EnvironmentId::new(),
			name: "prod".to_string(),
			created_at: Utc::now(),
		};
		let environment_id = environment.id;
		let resolver = Arc::new(StaticResolver { environment });

		(
			FlagEngine::new(store.clone(), resolver),
			store,
			environment_id,
		)
	}

	fn caller() -> CallerIdentity {
		CallerIdentity::new(UID)
	}

	fn draft(key: &str, flag_type: FlagType, value: serde_json::Value) -> FlagDraft {
		FlagDraft {
			key: key.to_string(),
			display_name: None,
			description: None,
			flag_type: Some(flag_type),
			value,
			enabled: None,
		}
	}

	fn flag_err(err: FlagsServerError) -> FlagsError {
		match err {
			FlagsServerError::Flag(e) => e,
			other => panic!("expected domain error, got: {other}"),
		}
	}

	#[tokio::test]
	async fn test_create_applies_core_defaults() {
		let (engine, _, env) = test_engine().await;

		let flag = engine
			.create_flag(&caller(), env, draft("beta", FlagType::Boolean, json!(true)))
			.await
			.unwrap();

		assert_eq!(flag.category, FlagCategory::Core);
		assert_eq!(flag.version, 1);
		assert!(!flag.enabled);
		assert_eq!(flag.dependency, None);
		assert_eq!(flag.created_by_uid, UID);
		assert_eq!(flag.value, FlagValue::Boolean(true));
		assert_eq!(flag.created_at, flag.updated_at);
	}

	#[tokio::test]
	async fn test_create_normalizes_integer_string() {
		let (engine, _, env) = test_engine().await;

		let flag = engine
			.create_flag(&caller(), env, draft("retries", FlagType::Integer, json!("42")))
			.await
			.unwrap();

		assert_eq!(flag.value, FlagValue::Integer(42));
	}

	#[tokio::test]
	async fn test_create_normalizes_json_text() {
		let (engine, _, env) = test_engine().await;

		let flag = engine
			.create_flag(&caller(), env, draft("limits", FlagType::Json, json!("{\"a\":1}")))
			.await
			.unwrap();

		assert_eq!(flag.value, FlagValue::Json(json!({"a": 1})));
	}

	#[tokio::test]
	async fn test_create_rejects_json_null_text() {
		let (engine, _, env) = test_engine().await;

		let err = engine
			.create_flag(&caller(), env, draft("limits", FlagType::Json, json!("null")))
			.await
			.unwrap_err();

		assert!(matches!(flag_err(err), FlagsError::InvalidValue { .. }));
	}

	#[tokio::test]
	async fn test_create_rejects_out_of_range_integer() {
		let (engine, _, env) = test_engine().await;

		let err = engine
			.create_flag(
				&caller(),
				env,
				draft("retries", FlagType::Integer, json!(5_000_000_000i64)),
			)
			.await
			.unwrap_err();

		assert!(matches!(flag_err(err), FlagsError::InvalidValue { .. }));
	}

	#[tokio::test]
	async fn test_create_requires_type_and_value() {
		let (engine, _, env) = test_engine().await;

		let mut no_type = draft("beta", FlagType::Boolean, json!(true));
		no_type.flag_type = None;
		let err = engine.create_flag(&caller(), env, no_type).await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::TypeRequired);

		let no_value = draft("beta", FlagType::Boolean, serde_json::Value::Null);
		let err = engine.create_flag(&caller(), env, no_value).await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::ValueRequired);
	}

	#[tokio::test]
	async fn test_create_rejects_duplicate_key() {
		let (engine, _, env) = test_engine().await;

		engine
			.create_flag(&caller(), env, draft("beta", FlagType::Boolean, json!(false)))
			.await
			.unwrap();

		let err = engine
			.create_flag(&caller(), env, draft("beta", FlagType::String, json!("x")))
			.await
			.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::DuplicateKey);
	}

	#[tokio::test]
	async fn test_create_rejects_duplicate_display_name() {
		let (engine, _, env) = test_engine().await;

		let mut first = draft("beta", FlagType::Boolean, json!(false));
		first.display_name = Some("Beta".to_string());
		engine.create_flag(&caller(), env, first).await.unwrap();

		let mut second = draft("beta_two", FlagType::Boolean, json!(false));
		second.display_name = Some("Beta".to_string());
		let err = engine.create_flag(&caller(), env, second).await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::DuplicateDisplayName);
	}

	#[tokio::test]
	async fn test_create_fails_closed_on_resolution() {
		let (engine, _, _) = test_engine().await;

		let err = engine
			.create_flag(
				&caller(),
				EnvironmentId::new(),
				draft("beta", FlagType::Boolean, json!(true)),
			)
			.await
			.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::EnvironmentNotFound);
	}

	#[tokio::test]
	async fn test_operations_reject_unknown_caller() {
		let (engine, _, env) = test_engine().await;
		let stranger = CallerIdentity::new("uid-stranger");

		let err = engine
			.create_flag(&stranger, env, draft("beta", FlagType::Boolean, json!(true)))
			.await
			.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::AccessDenied);

		let err = engine.list_flags(&stranger, env).await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::AccessDenied);
	}

	#[tokio::test]
	async fn test_list_variants_filter_by_type() {
		let (engine, _, env) = test_engine().await;

		engine
			.create_flag(&caller(), env, draft("bool_flag", FlagType::Boolean, json!(true)))
			.await
			.unwrap();
		engine
			.create_flag(&caller(), env, draft("json_flag", FlagType::Json, json!({"a": 1})))
			.await
			.unwrap();

		let all = engine.list_flags(&caller(), env).await.unwrap();
		assert_eq!(all.len(), 2);

		let basic = engine.list_basic_flags(&caller(), env).await.unwrap();
		assert_eq!(basic.len(), 1);
		assert_eq!(basic[0].key, "bool_flag");

		let json_flags = engine.list_json_flags(&caller(), env).await.unwrap();
		assert_eq!(json_flags.len(), 1);
		assert_eq!(json_flags[0].key, "json_flag");
	}

	#[tokio::test]
	async fn test_sdk_key_read_path() {
		let (engine, _, env) = test_engine().await;

		engine
			.create_flag(&caller(), env, draft("beta", FlagType::Boolean, json!(true)))
			.await
			.unwrap();

		let flags = engine.get_flags_by_sdk_key(SDK_KEY).await.unwrap();
		assert_eq!(flags.len(), 1);
		assert_eq!(flags[0].key, "beta");

		let err = engine.get_flags_by_sdk_key("wrong-key").await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::EnvironmentNotFound);
	}

	#[tokio::test]
	async fn test_get_flag_not_found() {
		let (engine, _, _) = test_engine().await;

		let err = engine.get_flag(&caller(), FlagId::new()).await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::FlagNotFound);
	}

	#[tokio::test]
	async fn test_update_metadata_does_not_bump_version() {
		let (engine, _, env) = test_engine().await;

		let flag = engine
			.create_flag(&caller(), env, draft("beta", FlagType::Boolean, json!(true)))
			.await
			.unwrap();

		let patch = FlagPatch {
			display_name: Some("Beta rollout".to_string()),
			description: Some("gates the beta".to_string()),
			..Default::default()
		};
		let updated = engine.update_flag(&caller(), flag.id, patch).await.unwrap();

		assert_eq!(updated.version, 1);
		assert_eq!(updated.display_name.as_deref(), Some("Beta rollout"));
		assert_eq!(updated.description.as_deref(), Some("gates the beta"));
	}

	#[tokio::test]
	async fn test_update_rejects_key_change() {
		let (engine, _, env) = test_engine().await;

		let flag = engine
			.create_flag(&caller(), env, draft("beta", FlagType::Boolean, json!(true)))
			.await
			.unwrap();

		let patch = FlagPatch {
			key: Some("beta_renamed".to_string()),
			..Default::default()
		};
		let err = engine.update_flag(&caller(), flag.id, patch).await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::Immutable { field: "key" });

		let unchanged = engine.get_flag(&caller(), flag.id).await.unwrap();
		assert_eq!(unchanged, flag);
	}

	#[tokio::test]
	async fn test_update_rejects_type_change_before_value() {
		let (engine, _, env) = test_engine().await;

		let flag = engine
			.create_flag(&caller(), env, draft("beta", FlagType::Boolean, json!(true)))
			.await
			.unwrap();

		// Type change wins over the value change; nothing is applied.
		let patch = FlagPatch {
			flag_type: Some(FlagType::String),
			value: Some(json!("on")),
			..Default::default()
		};
		let err = engine.update_flag(&caller(), flag.id, patch).await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::Immutable { field: "type" });

		let unchanged = engine.get_flag(&caller(), flag.id).await.unwrap();
		assert_eq!(unchanged, flag);
	}

	#[tokio::test]
	async fn test_update_value_bumps_version_and_normalizes() {
		let (engine, _, env) = test_engine().await;

		let flag = engine
			.create_flag(&caller(), env, draft("retries", FlagType::Integer, json!(3)))
			.await
			.unwrap();

		let patch = FlagPatch {
			value: Some(json!("7")),
			..Default::default()
		};
		let updated = engine.update_flag(&caller(), flag.id, patch).await.unwrap();

		assert_eq!(updated.value, FlagValue::Integer(7));
		assert_eq!(updated.version, 2);
	}

	#[tokio::test]
	async fn test_update_equal_value_is_not_a_change() {
		let (engine, _, env) = test_engine().await;

		let flag = engine
			.create_flag(&caller(), env, draft("retries", FlagType::Integer, json!(3)))
			.await
			.unwrap();

		let patch = FlagPatch {
			value: Some(json!(3)),
			..Default::default()
		};
		let updated = engine.update_flag(&caller(), flag.id, patch).await.unwrap();
		assert_eq!(updated.version, 1);
	}

	#[tokio::test]
	async fn test_update_invalid_value_leaves_flag_unchanged() {
		let (engine, _, env) = test_engine().await;

		let flag = engine
			.create_flag(&caller(), env, draft("retries", FlagType::Integer, json!(3)))
			.await
			.unwrap();

		let patch = FlagPatch {
			value: Some(json!("not a number")),
			..Default::default()
		};
		let err = engine.update_flag(&caller(), flag.id, patch).await.unwrap_err();
		assert!(matches!(flag_err(err), FlagsError::InvalidValue { .. }));

		let unchanged = engine.get_flag(&caller(), flag.id).await.unwrap();
		assert_eq!(unchanged, flag);
	}

	#[tokio::test]
	async fn test_update_rejects_enabled_change() {
		let (engine, _, env) = test_engine().await;

		let flag = engine
			.create_flag(&caller(), env, draft("beta", FlagType::Boolean, json!(true)))
			.await
			.unwrap();

		let patch = FlagPatch {
			enabled: Some(true),
			..Default::default()
		};
		let err = engine.update_flag(&caller(), flag.id, patch).await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::Immutable { field: "enabled" });

		let unchanged = engine.get_flag(&caller(), flag.id).await.unwrap();
		assert_eq!(unchanged, flag);

		// Sending the current enabled state is a no-op, not a violation.
		let patch = FlagPatch {
			enabled: Some(false),
			..Default::default()
		};
		let updated = engine.update_flag(&caller(), flag.id, patch).await.unwrap();
		assert_eq!(updated.version, 1);
		assert!(!updated.enabled);
	}

	#[tokio::test]
	async fn test_update_rejects_duplicate_display_name() {
		let (engine, _, env) = test_engine().await;

		let mut taken = draft("beta", FlagType::Boolean, json!(true));
		taken.display_name = Some("Beta".to_string());
		engine.create_flag(&caller(), env, taken).await.unwrap();

		let other = engine
			.create_flag(&caller(), env, draft("gamma", FlagType::Boolean, json!(true)))
			.await
			.unwrap();

		let patch = FlagPatch {
			display_name: Some("Beta".to_string()),
			..Default::default()
		};
		let err = engine.update_flag(&caller(), other.id, patch).await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::DuplicateDisplayName);
	}

	#[tokio::test]
	async fn test_update_rejects_non_core_flag() {
		let (engine, store, env) = test_engine().await;

		// Dependent flags never pass through the engine's create path.
		let dependent = Flag {
			id: FlagId::new(),
			environment_id: env,
			key: "dependent_flag".to_string(),
			display_name: None,
			description: None,
			category: FlagCategory::Dependent,
			flag_type: FlagType::Boolean,
			value: FlagValue::Boolean(false),
			enabled: false,
			version: 1,
			dependency: Some("beta".to_string()),
			created_by_uid: UID.to_string(),
			created_at: Utc::now(),
			updated_at: Utc::now(),
		};
		store.save(&dependent).await.unwrap();

		let patch = FlagPatch {
			description: Some("x".to_string()),
			..Default::default()
		};
		let err = engine
			.update_flag(&caller(), dependent.id, patch)
			.await
			.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::InvalidCategory);
	}

	#[tokio::test]
	async fn test_toggle_flips_and_bumps_version() {
		let (engine, _, env) = test_engine().await;

		let flag = engine
			.create_flag(&caller(), env, draft("beta", FlagType::Boolean, json!(true)))
			.await
			.unwrap();
		assert!(!flag.enabled);

		let toggled = engine.toggle_flag(&caller(), flag.id).await.unwrap();
		assert!(toggled.enabled);
		assert_eq!(toggled.version, 2);

		let toggled_back = engine.toggle_flag(&caller(), flag.id).await.unwrap();
		assert!(!toggled_back.enabled);
		assert_eq!(toggled_back.version, 3);
	}

	#[tokio::test]
	async fn test_delete_is_hard() {
		let (engine, _, env) = test_engine().await;

		let flag = engine
			.create_flag(&caller(), env, draft("beta", FlagType::Boolean, json!(true)))
			.await
			.unwrap();

		engine.delete_flag(&caller(), flag.id).await.unwrap();

		let err = engine.get_flag(&caller(), flag.id).await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::FlagNotFound);

		let err = engine.delete_flag(&caller(), flag.id).await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::FlagNotFound);
	}

	#[tokio::test]
	async fn test_end_to_end_scenario() {
		let (engine, _, env) = test_engine().await;

		// Create with enabled unset
		let flag = engine
			.create_flag(&caller(), env, draft("beta", FlagType::Boolean, json!(false)))
			.await
			.unwrap();
		assert!(!flag.enabled);
		assert_eq!(flag.version, 1);

		// Toggle
		let flag = engine.toggle_flag(&caller(), flag.id).await.unwrap();
		assert!(flag.enabled);
		assert_eq!(flag.version, 2);

		// Metadata-only update
		let patch = FlagPatch {
			description: Some("x".to_string()),
			..Default::default()
		};
		let flag = engine.update_flag(&caller(), flag.id, patch).await.unwrap();
		assert_eq!(flag.version, 2);
		assert_eq!(flag.description.as_deref(), Some("x"));

		// Attempted type change
		let patch = FlagPatch {
			flag_type: Some(FlagType::String),
			..Default::default()
		};
		let err = engine.update_flag(&caller(), flag.id, patch).await.unwrap_err();
		assert_eq!(flag_err(err), FlagsError::Immutable { field: "type" });

		let unchanged = engine.get_flag(&caller(), flag.id).await.unwrap();
		assert_eq!(unchanged, flag);
	}
}
