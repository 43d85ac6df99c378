use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    db::store::{ActivityFilter, ActivityOrder, ActivityStore},
    error::{AppError, AppResult},
    models::{ActivityKind, FeedItem},
};

const ACTIVITY_COLUMNS: &str = "a.id, a.user_id, a.kind, a.movie_id, a.review_id, a.list_id, \
     a.target_user_id, a.created_at";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Raw `activities` row
#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    movie_id: Option<i64>,
    review_id: Option<Uuid>,
    list_id: Option<Uuid>,
    target_user_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for FeedItem {
    type Error = AppError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse::<ActivityKind>()
            .map_err(|e| AppError::Internal(format!("Corrupt activity {}: {}", row.id, e)))?;

        Ok(FeedItem {
            id: row.id,
            user_id: row.user_id,
            kind,
            movie_id: row.movie_id,
            review_id: row.review_id,
            list_id: row.list_id,
            target_user_id: row.target_user_id,
            created_at: row.created_at,
            is_liked: None,
        })
    }
}

/// `ActivityStore` backed by PostgreSQL
#[derive(Clone)]
pub struct PgActivityStore {
    pool: PgPool,
}

impl PgActivityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends the WHERE clause for `filter`; `a` aliases `activities`
    fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ActivityFilter) {
        qb.push(" WHERE TRUE");

        if let Some(authors) = &filter.authors {
            qb.push(" AND a.user_id = ANY(")
                .push_bind(authors.clone())
                .push(")");
        }
        if let Some(excluded) = filter.exclude_author {
            qb.push(" AND a.user_id <> ").push_bind(excluded);
        }
        if let Some(kinds) = &filter.kinds {
            let kinds: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();
            qb.push(" AND a.kind = ANY(").push_bind(kinds).push(")");
        }
        if let Some((created_at, id)) = filter.before {
            qb.push(" AND (a.created_at, a.id) < (")
                .push_bind(created_at)
                .push(", ")
                .push_bind(id)
                .push(")");
        }
        if let Some(since) = filter.since {
            qb.push(" AND a.created_at >= ").push_bind(since);
        }
    }

    fn order_clause(order: ActivityOrder) -> &'static str {
        match order {
            ActivityOrder::Newest => " ORDER BY a.created_at DESC, a.id DESC",
            ActivityOrder::MostLiked => {
                " ORDER BY (SELECT COUNT(*) FROM review_likes rl WHERE rl.review_id = a.review_id) DESC, \
                 a.created_at DESC, a.id DESC"
            }
        }
    }
}

#[async_trait]
impl ActivityStore for PgActivityStore {
    async fn find_activities(
        &self,
        filter: &ActivityFilter,
        order: ActivityOrder,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<FeedItem>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM activities a",
            ACTIVITY_COLUMNS
        ));
        Self::push_filter(&mut qb, filter);
        qb.push(Self::order_clause(order));
        qb.push(" OFFSET ").push_bind(offset.max(0));
        qb.push(" LIMIT ").push_bind(limit.max(0));

        let rows: Vec<ActivityRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        tracing::debug!(rows = rows.len(), ?order, offset, limit, "Activities fetched");

        rows.into_iter().map(FeedItem::try_from).collect()
    }

    async fn count_activities(&self, filter: &ActivityFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM activities a");
        Self::push_filter(&mut qb, filter);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn liked_review_ids(
        &self,
        viewer: Uuid,
        review_ids: &[Uuid],
    ) -> AppResult<HashSet<Uuid>> {
        let liked: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT review_id
            FROM review_likes
            WHERE user_id = $1 AND review_id = ANY($2)
            "#,
        )
        .bind(viewer)
        .bind(review_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(liked.into_iter().collect())
    }

    async fn following_ids(&self, viewer: Uuid) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar(
            r#"
            SELECT following_id
            FROM follows
            WHERE follower_id = $1
            "#,
        )
        .bind(viewer)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn watched_movie_ids(&self, viewer: Uuid) -> AppResult<HashSet<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT movie_id
            FROM activities
            WHERE user_id = $1 AND kind = 'watched' AND movie_id IS NOT NULL
            "#,
        )
        .bind(viewer)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn latest_watched_movie(&self, viewer: Uuid) -> AppResult<Option<i64>> {
        let movie_id = sqlx::query_scalar(
            r#"
            SELECT movie_id
            FROM activities
            WHERE user_id = $1 AND kind = 'watched' AND movie_id IS NOT NULL
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(viewer)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movie_id)
    }

    async fn favorite_movie_ids(&self, viewer: Uuid, limit: i64) -> AppResult<Vec<i64>> {
        let ids = sqlx::query_scalar(
            r#"
            SELECT movie_id
            FROM favorite_movies
            WHERE user_id = $1
            ORDER BY position ASC
            LIMIT $2
            "#,
        )
        .bind(viewer)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn upsert_activity(&self, item: &FeedItem) -> AppResult<FeedItem> {
        let row: Option<ActivityRow> = sqlx::query_as(
            r#"
            INSERT INTO activities
                (id, user_id, kind, movie_id, review_id, list_id, target_user_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                kind = EXCLUDED.kind,
                movie_id = EXCLUDED.movie_id,
                review_id = EXCLUDED.review_id,
                list_id = EXCLUDED.list_id,
                target_user_id = EXCLUDED.target_user_id,
                created_at = EXCLUDED.created_at
            WHERE activities.user_id = EXCLUDED.user_id
            RETURNING id, user_id, kind, movie_id, review_id, list_id, target_user_id, created_at
            "#,
        )
        .bind(item.id)
        .bind(item.user_id)
        .bind(item.kind.as_str())
        .bind(item.movie_id)
        .bind(item.review_id)
        .bind(item.list_id)
        .bind(item.target_user_id)
        .bind(item.created_at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => FeedItem::try_from(row),
            None => Err(AppError::InvalidInput(format!(
                "Activity {} belongs to another user",
                item.id
            ))),
        }
    }
}
