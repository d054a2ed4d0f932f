// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::instrument;

use rollout_flags_core::{
	EnvironmentId, Flag, FlagCategory, FlagId, FlagType, FlagValue,
};

use crate::error::{FlagsServerError, Result};

/// Abstract keyed-record repository for flags.
///
/// The store offers single-record atomicity only; there are no
/// cross-record transactions and no optimistic-concurrency tokens. The
/// engine re-reads current state before every mutation.
#[async_trait]
pub trait FlagStore: Send + Sync {
	async fn find_by_id(&self, id: FlagId) -> Result<Option<Flag>>;

	async fn find_by_environment_and_key(
		&self,
		environment_id: EnvironmentId,
		key: &str,
	) -> Result<Option<Flag>>;

	async fn find_by_environment_and_display_name(
		&self,
		environment_id: EnvironmentId,
		display_name: &str,
	) -> Result<Option<Flag>>;

	async fn list_by_environment_category(
		&self,
		environment_id: EnvironmentId,
		category: FlagCategory,
	) -> Result<Vec<Flag>>;

	async fn list_by_environment_category_type(
		&self,
		environment_id: EnvironmentId,
		category: FlagCategory,
		flag_type: FlagType,
	) -> Result<Vec<Flag>>;

	async fn list_by_environment_category_not_type(
		&self,
		environment_id: EnvironmentId,
		category: FlagCategory,
		flag_type: FlagType,
	) -> Result<Vec<Flag>>;

	/// Inserts or replaces the record and returns the stored flag.
	async fn save(&self, flag: &Flag) -> Result<Flag>;

	/// Hard delete. No tombstones are kept.
	async fn delete(&self, flag: &Flag) -> Result<()>;
}

const FLAG_COLUMNS: &str = "id, environment_id, key, display_name, description, category, \
	type as flag_type, value, enabled, version, dependency, created_by_uid, created_at, updated_at";

/// SQLite implementation of the flag store.
#[derive(Clone)]
pub struct SqliteFlagStore {
	pool: SqlitePool,
}

impl SqliteFlagStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Creates the flags schema if it does not exist yet.
	pub async fn migrate(pool: &SqlitePool) -> Result<()> {
		sqlx::query(
			r#"
			CREATE TABLE IF NOT EXISTS flags (
				id TEXT PRIMARY KEY,
				environment_id TEXT NOT NULL,
				key TEXT NOT NULL,
				display_name TEXT,
				description TEXT,
				category TEXT NOT NULL,
				type TEXT NOT NULL,
				value TEXT NOT NULL,
				enabled INTEGER NOT NULL,
				version INTEGER NOT NULL,
				dependency TEXT,
				created_by_uid TEXT NOT NULL,
				created_at TEXT NOT NULL,
				updated_at TEXT NOT NULL
			)
			"#,
		)
		.execute(pool)
		.await?;

		sqlx::query(
			r#"
			CREATE UNIQUE INDEX IF NOT EXISTS idx_flags_environment_key
			ON flags (environment_id, key)
			"#,
		)
		.execute(pool)
		.await?;

		// Backstop for the engine-level uniqueness probe
		sqlx::query(
			r#"
			CREATE UNIQUE INDEX IF NOT EXISTS idx_flags_environment_display_name
			ON flags (environment_id, display_name)
			WHERE display_name IS NOT NULL
			"#,
		)
		.execute(pool)
		.await?;

		sqlx::query(
			r#"
			CREATE INDEX IF NOT EXISTS idx_flags_environment_category
			ON flags (environment_id, category)
			"#,
		)
		.execute(pool)
		.await?;

		Ok(())
	}
}

#[async_trait]
impl FlagStore for SqliteFlagStore {
	#[instrument(skip(self), fields(flag_id = %id))]
	async fn find_by_id(&self, id: FlagId) -> Result<Option<Flag>> {
		let row = sqlx::query_as::<_, FlagRow>(&format!(
			"SELECT {FLAG_COLUMNS} FROM flags WHERE id = ?"
		))
		.bind(id.0.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(env_id = %environment_id, flag_key = %key))]
	async fn find_by_environment_and_key(
		&self,
		environment_id: EnvironmentId,
		key: &str,
	) -> Result<Option<Flag>> {
		let row = sqlx::query_as::<_, FlagRow>(&format!(
			"SELECT {FLAG_COLUMNS} FROM flags WHERE environment_id = ? AND key = ?"
		))
		.bind(environment_id.0.to_string())
		.bind(key)
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(env_id = %environment_id, display_name = %display_name))]
	async fn find_by_environment_and_display_name(
		&self,
		environment_id: EnvironmentId,
		display_name: &str,
	) -> Result<Option<Flag>> {
		let row = sqlx::query_as::<_, FlagRow>(&format!(
			"SELECT {FLAG_COLUMNS} FROM flags WHERE environment_id = ? AND display_name = ?"
		))
		.bind(environment_id.0.to_string())
		.bind(display_name)
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(env_id = %environment_id, category = %category))]
	async fn list_by_environment_category(
		&self,
		environment_id: EnvironmentId,
		category: FlagCategory,
	) -> Result<Vec<Flag>> {
		let rows = sqlx::query_as::<_, FlagRow>(&format!(
			"SELECT {FLAG_COLUMNS} FROM flags \
			 WHERE environment_id = ? AND category = ? ORDER BY key ASC"
		))
		.bind(environment_id.0.to_string())
		.bind(category.as_str())
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(skip(self), fields(env_id = %environment_id, category = %category, flag_type = %flag_type))]
	async fn list_by_environment_category_type(
		&self,
		environment_id: EnvironmentId,
		category: FlagCategory,
		flag_type: FlagType,
	) -> Result<Vec<Flag>> {
		let rows = sqlx::query_as::<_, FlagRow>(&format!(
			"SELECT {FLAG_COLUMNS} FROM flags \
			 WHERE environment_id = ? AND category = ? AND type = ? ORDER BY key ASC"
		))
		.bind(environment_id.0.to_string())
		.bind(category.as_str())
		.bind(flag_type.as_str())
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(skip(self), fields(env_id = %environment_id, category = %category, flag_type = %flag_type))]
	async fn list_by_environment_category_not_type(
		&self,
		environment_id: EnvironmentId,
		category: FlagCategory,
		flag_type: FlagType,
	) -> Result<Vec<Flag>> {
		let rows = sqlx::query_as::<_, FlagRow>(&format!(
			"SELECT {FLAG_COLUMNS} FROM flags \
			 WHERE environment_id = ? AND category = ? AND type != ? ORDER BY key ASC"
		))
		.bind(environment_id.0.to_string())
		.bind(category.as_str())
		.bind(flag_type.as_str())
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(skip(self, flag), fields(flag_id = %flag.id, flag_key = %flag.key))]
	async fn save(&self, flag: &Flag) -> Result<Flag> {
		let value_json = serde_json::to_string(&flag.value.as_json())?;

		sqlx::query(
			r#"
			INSERT OR REPLACE INTO flags (id, environment_id, key, display_name, description,
										  category, type, value, enabled, version, dependency,
										  created_by_uid, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(flag.id.0.to_string())
		.bind(flag.environment_id.0.to_string())
		.bind(&flag.key)
		.bind(&flag.display_name)
		.bind(&flag.description)
		.bind(flag.category.as_str())
		.bind(flag.flag_type.as_str())
		.bind(value_json)
		.bind(flag.enabled)
		.bind(flag.version as i64)
		.bind(&flag.dependency)
		.bind(&flag.created_by_uid)
		.bind(flag.created_at.to_rfc3339())
		.bind(flag.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(flag.clone())
	}

	#[instrument(skip(self, flag), fields(flag_id = %flag.id, flag_key = %flag.key))]
	async fn delete(&self, flag: &Flag) -> Result<()> {
		sqlx::query("DELETE FROM flags WHERE id = ?")
			.bind(flag.id.0.to_string())
			.execute(&self.pool)
			.await?;

		Ok(())
	}
}

#[derive(sqlx::FromRow)]
struct FlagRow {
	id: String,
	environment_id: String,
	key: String,
	display_name: Option<String>,
	description: Option<String>,
	category: String,
	flag_type: String,
	value: String,
	enabled: bool,
	version: i64,
	dependency: Option<String>,
	created_by_uid: String,
	created_at: String,
	updated_at: String,
}

impl TryFrom<FlagRow> for Flag {
	type Error = FlagsServerError;

	fn try_from(row: FlagRow) -> Result<Self> {
		let flag_type: FlagType = row
			.flag_type
			.parse()
			.map_err(|_| FlagsServerError::Internal("Invalid flag type".to_string()))?;

		let raw_value: serde_json::Value = serde_json::from_str(&row.value)?;
		// Re-normalization of a stored value is a no-op; failure means the
		// row no longer matches its declared type.
		let value = FlagValue::normalize(flag_type, &raw_value)
			.map_err(|e| FlagsServerError::Internal(format!("Stored value invalid: {e}")))?;

		Ok(Flag {
			id: row
				.id
				.parse()
				.map_err(|_| FlagsServerError::Internal("Invalid flag ID".to_string()))?,
			environment_id: row
				.environment_id
				.parse()
				.map_err(|_| FlagsServerError::Internal("Invalid environment ID".to_string()))?,
			key: row.key,
			display_name: row.display_name,
			description: row.description,
			category: row
				.category
				.parse()
				.map_err(|_| FlagsServerError::Internal("Invalid flag category".to_string()))?,
			flag_type,
			value,
			enabled: row.enabled,
			version: u32::try_from(row.version)
				.map_err(|_| FlagsServerError::Internal("Invalid flag version".to_string()))?,
			dependency: row.dependency,
			created_by_uid: row.created_by_uid,
			created_at: chrono::DateTime::parse_from_rfc3339(&row.created_at)
				.map_err(|_| FlagsServerError::Internal("Invalid created_at".to_string()))?
				.with_timezone(&chrono::Utc),
			updated_at: chrono::DateTime::parse_from_rfc3339(&row.updated_at)
				.map_err(|_| FlagsServerError::Internal("Invalid updated_at".to_string()))?
				.with_timezone(&chrono::Utc),
		})
	}
}
