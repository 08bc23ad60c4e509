//! Theme catalog
//!
//! Themes are installed by the operator and referenced by numeric id. The
//! catalog only knows ids and display names; styling lives with the client.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::toggle::ThemeId;

/// A theme known to the forum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    /// Unique identifier
    pub id: ThemeId,
    /// Display name
    pub name: String,
}

/// Registry of installed themes
#[derive(Clone)]
pub struct ThemeCatalog {
    pool: SqlitePool,
}

impl ThemeCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Install a theme, assigning the next free id
    pub async fn add(&self, name: &str) -> Result<Theme, sqlx::Error> {
        let result = sqlx::query("INSERT INTO themes (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(Theme {
            id: ThemeId(result.last_insert_rowid()),
            name: name.to_string(),
        })
    }

    /// Get a theme by ID
    pub async fn get(&self, id: ThemeId) -> Result<Option<Theme>, sqlx::Error> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id_theme, name FROM themes WHERE id_theme = ?")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, name)| Theme {
            id: ThemeId(id),
            name,
        }))
    }

    /// List all installed themes, ordered by id
    pub async fn list(&self) -> Result<Vec<Theme>, sqlx::Error> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id_theme, name FROM themes ORDER BY id_theme")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Theme {
                id: ThemeId(id),
                name,
            })
            .collect())
    }

    /// Look up the installed themes among `ids`, ordered by id.
    /// Ids without an installed theme are left out.
    pub async fn find_many(&self, ids: &[ThemeId]) -> Result<Vec<Theme>, sqlx::Error> {
        let themes = self.list().await?;
        Ok(themes.into_iter().filter(|t| ids.contains(&t.id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_pool;

    #[tokio::test]
    async fn test_add_assigns_sequential_ids() {
        let catalog = ThemeCatalog::new(test_pool().await);

        let default = catalog.add("Default").await.unwrap();
        let dark = catalog.add("Dark").await.unwrap();

        assert_eq!(default.id, ThemeId(1));
        assert_eq!(dark.id, ThemeId(2));
        assert_eq!(catalog.get(ThemeId(2)).await.unwrap(), Some(dark));
    }

    #[tokio::test]
    async fn test_get_unknown_theme() {
        let catalog = ThemeCatalog::new(test_pool().await);
        assert_eq!(catalog.get(ThemeId(9)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_many_skips_unknown_ids() {
        let catalog = ThemeCatalog::new(test_pool().await);
        catalog.add("Default").await.unwrap();
        catalog.add("Dark").await.unwrap();
        catalog.add("Contrast").await.unwrap();

        let found = catalog
            .find_many(&[ThemeId(3), ThemeId(1), ThemeId(8)])
            .await
            .unwrap();
        let names: Vec<_> = found.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Default", "Contrast"]);
    }
}
