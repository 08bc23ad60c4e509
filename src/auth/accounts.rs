//! Member accounts
//!
//! Handles registration, login, bearer tokens and the member's theme column.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use thiserror::Error;

use super::{generate_token, is_valid_username, PasswordHash};
use crate::toggle::{StoreError, ThemeId, ThemeStore, UserId};

/// Member data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: UserId,
    pub username: String,
    pub is_admin: bool,
    pub theme: ThemeId,
    pub created_at: String,
}

type MemberRow = (i64, String, bool, i64, String);

impl From<MemberRow> for Member {
    fn from((id, username, is_admin, theme, created_at): MemberRow) -> Self {
        Self {
            id,
            username,
            is_admin,
            theme: ThemeId(theme),
            created_at,
        }
    }
}

const MEMBER_COLUMNS: &str = "id_member, member_name, is_admin, id_theme, created_at";

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username already exists")]
    UsernameExists,

    #[error("username must be 3-32 letters, digits or underscores")]
    InvalidUsername,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Account service for authentication and member records
#[derive(Clone)]
pub struct AccountService {
    pool: SqlitePool,
}

impl AccountService {
    /// Create a new account service
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a member starting on `theme`, returns the member and a login token
    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        theme: ThemeId,
    ) -> Result<(Member, String), AuthError> {
        if !is_valid_username(username) {
            return Err(AuthError::InvalidUsername);
        }

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id_member FROM members WHERE member_name = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        if existing.is_some() {
            return Err(AuthError::UsernameExists);
        }

        let password = PasswordHash::new(password);
        let token = generate_token();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO members (member_name, password_hash, salt, token, id_theme, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(&password.hash)
        .bind(&password.salt)
        .bind(&token)
        .bind(theme.0)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let member = Member {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            is_admin: false,
            theme,
            created_at: now,
        };

        Ok((member, token))
    }

    /// Login with username and password, returns a fresh token
    pub async fn login(&self, username: &str, password: &str) -> Result<(Member, String), AuthError> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT password_hash, salt FROM members WHERE member_name = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        let (hash, salt) = row.ok_or(AuthError::InvalidCredentials)?;
        if !(PasswordHash { salt, hash }).verify(password) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_token();
        sqlx::query("UPDATE members SET token = ? WHERE member_name = ?")
            .bind(&token)
            .bind(username)
            .execute(&self.pool)
            .await?;

        let member = self
            .get_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok((member, token))
    }

    /// Resolve a bearer token to its member
    pub async fn validate_token(&self, token: &str) -> Result<Option<Member>, AuthError> {
        let row: Option<MemberRow> = sqlx::query_as(&format!(
            "SELECT {} FROM members WHERE token = ?",
            MEMBER_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Member::from))
    }

    /// Logout by clearing the token
    pub async fn logout(&self, token: &str) -> Result<bool, AuthError> {
        let result = sqlx::query("UPDATE members SET token = NULL WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get member by ID
    pub async fn get_member(&self, id: UserId) -> Result<Option<Member>, AuthError> {
        let row: Option<MemberRow> = sqlx::query_as(&format!(
            "SELECT {} FROM members WHERE id_member = ?",
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Member::from))
    }

    /// Get member by name
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Member>, AuthError> {
        let row: Option<MemberRow> = sqlx::query_as(&format!(
            "SELECT {} FROM members WHERE member_name = ?",
            MEMBER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Member::from))
    }

    /// Grant or revoke forum administration.
    ///
    /// Writes the row only. On a running server go through
    /// [`ProfileReader::set_admin`](crate::profile::ProfileReader::set_admin)
    /// so the cached user settings pick up the new flag.
    pub async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<(), AuthError> {
        sqlx::query("UPDATE members SET is_admin = ? WHERE id_member = ?")
            .bind(is_admin)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ThemeStore for AccountService {
    async fn set_user_theme(&self, user_id: UserId, theme: ThemeId) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE members SET id_theme = ? WHERE id_member = ?")
            .bind(theme.0)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::MemberNotFound(user_id));
        }
        Ok(())
    }
}
