//! Settings Storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::path::{Path, PathBuf};
use tracing::debug;

const SETTINGS_FILE: &str = "settings.db";

/// SQLite-backed settings store implementation
///
/// Desktop counterpart of a private preferences file:
/// - One database per application profile
/// - Writes are committed before `set_string` returns
/// - Async operations
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Create a new settings store with the given database path
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to connect to DB: {}", e)))?;

        Self::create_schema(&pool).await?;

        debug!(path = ?db_path, "Initialized settings store");

        Ok(Self { pool })
    }

    /// Open the settings store for `profile` under the user's data directory
    ///
    /// Resolves to `<data_dir>/<app_name>/<profile>/settings.db`.
    pub async fn for_profile(app_name: &str, profile: &str) -> Result<Self> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            BridgeError::NotAvailable("No user data directory on this platform".to_string())
        })?;

        Self::new(Self::profile_path(&data_dir, app_name, profile)).await
    }

    fn profile_path(data_dir: &Path, app_name: &str, profile: &str) -> PathBuf {
        data_dir.join(app_name).join(profile).join(SETTINGS_FILE)
    }

    /// Create an in-memory settings store (for testing)
    pub async fn in_memory() -> Result<Self> {
        // Every connection to `:memory:` is a separate database, so the pool
        // must keep exactly one connection alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to connect to DB: {}", e)))?;

        Self::create_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn create_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| BridgeError::DatabaseError(format!("Failed to create table: {}", e)))?;

        Ok(())
    }

    /// Get the current Unix timestamp
    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Self::now())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::DatabaseError(format!("Failed to set setting: {}", e)))?;

        debug!(key = key, "Stored setting");
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to get setting: {}", e)))?;

        Ok(row.map(|row| row.get(0)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                BridgeError::DatabaseError(format!("Failed to delete setting: {}", e))
            })?;

        debug!(key = key, "Deleted setting");
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to check key: {}", e)))?;

        Ok(row.is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to list keys: {}", e)))?;

        let keys = rows.into_iter().map(|row| row.get(0)).collect();
        Ok(keys)
    }
}
