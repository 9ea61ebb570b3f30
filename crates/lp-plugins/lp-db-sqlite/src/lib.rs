//! # lp-db-sqlite Implementation
//!
//! SQLite implementation of the `ProfileRepo` port. Documents are stored
//! as JSON text keyed by public name; the owner id is denormalized into
//! its own indexed column for the owner lookup.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use lp_core::merge::deep_merge;
use lp_core::traits::ProfileRepo;

pub struct SqliteProfileRepo {
    pool: SqlitePool,
}

impl SqliteProfileRepo {
    /// Connects and bootstraps the schema.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        // An in-memory SQLite database exists per connection; a larger pool
        // would see empty siblings.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS profiles (
                name     TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL DEFAULT '',
                data     TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_profiles_owner ON profiles (owner_id)")
            .execute(&pool)
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl ProfileRepo for SqliteProfileRepo {
    async fn get(&self, name: &str) -> anyhow::Result<Option<Value>> {
        let row = sqlx::query("SELECT data FROM profiles WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: String = row.get("data");
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }

    /// Read-merge-write inside one transaction so a concurrent writer
    /// cannot interleave between the read and the upsert.
    async fn merge_write(&self, name: &str, partial: Value) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT data FROM profiles WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;

        let merged = match existing {
            Some(row) => {
                let data: String = row.get("data");
                let current: Value =
                    serde_json::from_str(&data).unwrap_or(Value::Null);
                deep_merge(current, partial)
            }
            None => partial,
        };

        let owner_id = merged
            .get("ownerId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        sqlx::query(
            "INSERT INTO profiles (name, owner_id, data) VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET owner_id = excluded.owner_id, data = excluded.data",
        )
        .bind(name)
        .bind(owner_id)
        .bind(merged.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_owner(&self, owner_id: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query(
            "SELECT name FROM profiles WHERE owner_id = ? ORDER BY name LIMIT 1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.get("name")))
    }
}
