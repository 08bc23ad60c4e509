//! Executes toggle decisions against the member store and profile cache

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use super::{plan, Decision, ThemeId, ToggleConfig, ToggleRequest, UserId};
use crate::cache::CacheKey;

/// Member store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("member {0} not found")]
    MemberNotFound(UserId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Toggle errors
#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("failed to persist theme: {0}")]
    Store(#[from] StoreError),
}

/// Where member theme preferences are persisted
#[async_trait]
pub trait ThemeStore: Send + Sync {
    /// Rewrite the member's theme. Must be atomic per member.
    async fn set_user_theme(&self, user_id: UserId, theme: ThemeId) -> Result<(), StoreError>;
}

/// Cache holding copies of member data that embed the theme.
///
/// Invalidating a missing key, or any key while caching is disabled, is a no-op.
pub trait ProfileCache: Send + Sync {
    fn invalidate(&self, key: &CacheKey);
}

/// Flips a member between the two configured themes
pub struct ThemeToggleService {
    store: Arc<dyn ThemeStore>,
    cache: Arc<dyn ProfileCache>,
}

impl ThemeToggleService {
    pub fn new(store: Arc<dyn ThemeStore>, cache: Arc<dyn ProfileCache>) -> Self {
        Self { store, cache }
    }

    /// Toggle the requesting member's theme and return the resulting theme.
    ///
    /// Skipped requests return `request.current_theme` without touching the
    /// store or the cache. A store failure aborts before any invalidation.
    pub async fn toggle(
        &self,
        request: &ToggleRequest,
        config: &ToggleConfig,
    ) -> Result<ThemeId, ToggleError> {
        let change = match plan(request, config) {
            Decision::Skip(reason) => {
                debug!("Theme toggle skipped for {}: {}", request.user_id, reason);
                return Ok(request.current_theme);
            }
            Decision::Change(change) => change,
        };

        self.store.set_user_theme(change.user_id, change.to).await?;

        for key in &change.invalidate {
            self.cache.invalidate(key);
        }

        info!(
            "Member {} switched theme {} -> {}",
            change.user_id, change.from, change.to
        );
        Ok(change.to)
    }
}
