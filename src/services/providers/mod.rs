//! Movie catalog abstraction
//!
//! Recommendation sources pull candidate movies from an external catalog.
//! The catalog is treated as unreliable: callers isolate each call so one
//! failing endpoint never sinks a whole recommendation.
use crate::{error::AppResult, models::CandidateMovie};

pub mod tmdb;

/// Trait for external movie catalogs
///
/// Every list endpoint returns candidates in the catalog's own ranking order;
/// that order is what source-priority merging preserves.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Movies trending this week
    async fn trending(&self) -> AppResult<Vec<CandidateMovie>>;

    async fn popular(&self) -> AppResult<Vec<CandidateMovie>>;

    /// Popular movies tagged with `genre_id`
    async fn discover_by_genre(&self, genre_id: u32) -> AppResult<Vec<CandidateMovie>>;

    /// Movies the catalog considers similar to `movie_id`
    async fn similar(&self, movie_id: u64) -> AppResult<Vec<CandidateMovie>>;

    /// Free-text title search
    async fn search(&self, query: &str) -> AppResult<Vec<CandidateMovie>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
