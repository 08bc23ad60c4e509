//! Shared test utilities for database operations
//!
//! Provides test_pool(), an in-memory database with the full schema, plus
//! helpers to seed themes and mod settings.

use sqlx::SqlitePool;

use super::Database;

/// Create an in-memory test database pool with full schema
///
/// Uses Database::new(None) so tests run against the same schema as
/// production.
pub async fn test_pool() -> SqlitePool {
    let db = Database::new(None)
        .await
        .expect("Failed to create test database");
    db.pool().clone()
}

/// Register themes 1..=names.len() and the matching knownThemes list
pub async fn seed_themes(pool: &SqlitePool, names: &[&str]) {
    let mut ids = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let id = i as i64 + 1;
        sqlx::query("INSERT INTO themes (id_theme, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await
            .expect("Failed to insert theme");
        ids.push(id.to_string());
    }
    set_setting(pool, "known_themes", &ids.join(",")).await;
}

/// Write one mod setting
pub async fn set_setting(pool: &SqlitePool, variable: &str, value: &str) {
    sqlx::query("INSERT OR REPLACE INTO settings (variable, value) VALUES (?, ?)")
        .bind(variable)
        .bind(value)
        .execute(pool)
        .await
        .expect("Failed to write setting");
}
