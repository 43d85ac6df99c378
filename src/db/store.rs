use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{ActivityKind, FeedItem},
};

/// Row filter for activity queries
///
/// Every populated field narrows the result; `Default` matches all rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityFilter {
    /// Only rows produced by these users (an empty list matches nothing)
    pub authors: Option<Vec<Uuid>>,
    /// Drop rows produced by this user
    pub exclude_author: Option<Uuid>,
    pub kinds: Option<Vec<ActivityKind>>,
    /// Strictly after this `(created_at, id)` key in newest-first order
    pub before: Option<(DateTime<Utc>, Uuid)>,
    /// At or after this instant
    pub since: Option<DateTime<Utc>>,
}

impl ActivityFilter {
    pub fn by_authors(authors: Vec<Uuid>) -> Self {
        Self {
            authors: Some(authors),
            ..Self::default()
        }
    }

    pub fn before(mut self, before: Option<(DateTime<Utc>, Uuid)>) -> Self {
        self.before = before;
        self
    }

    /// In-memory evaluation of the filter, mirroring the SQL predicate
    pub fn matches(&self, item: &FeedItem) -> bool {
        self.authors
            .as_ref()
            .map_or(true, |authors| authors.contains(&item.user_id))
            && self.exclude_author != Some(item.user_id)
            && self
                .kinds
                .as_ref()
                .map_or(true, |kinds| kinds.contains(&item.kind))
            && self
                .before
                .map_or(true, |before| (item.created_at, item.id) < before)
            && self.since.map_or(true, |since| item.created_at >= since)
    }
}

/// Sort order for activity queries; ties always break on newest, then id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityOrder {
    Newest,
    /// Review like count, descending
    MostLiked,
}

/// Data-access layer for feed aggregation
///
/// Implementations must return rows in a stable order so that consecutive
/// cursor or offset pages neither repeat nor skip rows absent concurrent writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ActivityStore: Send + Sync {
    /// Rows matching `filter`, sorted by `order`, windowed by offset/limit
    async fn find_activities(
        &self,
        filter: &ActivityFilter,
        order: ActivityOrder,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<FeedItem>>;

    async fn count_activities(&self, filter: &ActivityFilter) -> AppResult<i64>;

    /// Subset of `review_ids` the viewer has liked, in one query
    async fn liked_review_ids(&self, viewer: Uuid, review_ids: &[Uuid])
        -> AppResult<HashSet<Uuid>>;

    /// Users the viewer follows
    async fn following_ids(&self, viewer: Uuid) -> AppResult<Vec<Uuid>>;

    async fn watched_movie_ids(&self, viewer: Uuid) -> AppResult<HashSet<i64>>;

    /// Movie of the viewer's most recent `watched` activity
    async fn latest_watched_movie(&self, viewer: Uuid) -> AppResult<Option<i64>>;

    /// Viewer's favorite movies in display order
    async fn favorite_movie_ids(&self, viewer: Uuid, limit: i64) -> AppResult<Vec<i64>>;

    /// Inserts or replaces an activity by id; the last write wins
    async fn upsert_activity(&self, item: &FeedItem) -> AppResult<FeedItem>;
}
