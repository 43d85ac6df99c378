use chrono::{DateTime, Duration, Utc};
use futures::FutureExt;
use uuid::Uuid;

use crate::{
    db::{ActivityFilter, ActivityOrder, ActivityStore},
    error::{AppError, AppResult},
    models::{ActivityKind, CursorPage, FeedItem, NewActivity, OffsetPage},
    services::{
        enrich::enrich_likes,
        merge::merge_first_seen,
        pagination::{fetch_limit, paginate_cursor, paginate_offset, Cursor},
        sources::{gather, Source},
    },
};

/// How far back the trending-reviews source looks
pub const TRENDING_WINDOW_DAYS: i64 = 7;
/// Fixed size of the trending pool, so offset pages over the merge stay stable
pub const TRENDING_POOL_SIZE: i64 = 50;

/// Activity from the viewer's followees and the viewer, newest first
///
/// Anonymous viewers get the global stream instead. The store is the only
/// source here, so a store failure fails the page.
pub async fn following_feed(
    store: &dyn ActivityStore,
    viewer: Option<Uuid>,
    cursor: Option<Cursor>,
    page_size: usize,
) -> AppResult<CursorPage<FeedItem>> {
    let filter = match viewer {
        Some(viewer) => {
            let mut authors = store.following_ids(viewer).await?;
            authors.push(viewer);
            ActivityFilter::by_authors(authors)
        }
        None => ActivityFilter::default(),
    }
    .before(cursor.map(|c| c.key()));

    let rows = store
        .find_activities(&filter, ActivityOrder::Newest, 0, fetch_limit(page_size))
        .await?;

    let page = paginate_cursor(rows, page_size, |item| Cursor::new(item.created_at, item.id));

    tracing::debug!(
        viewer = ?viewer,
        items = page.data.len(),
        has_more = page.has_more,
        "Following feed page built"
    );

    let data = enrich_likes(store, viewer, page.data).await;
    Ok(CursorPage { data, ..page })
}

/// Trending reviews followed by recent community activity
///
/// Sources run concurrently and are merged first-seen-wins, so a review that
/// is both trending and recent keeps its trending position. The viewer's own
/// activity is left out. A failing source is skipped; only when both fail is
/// the error returned. A `skip` past the trending pool plus every community
/// row returns an empty page without fetching.
pub async fn for_you_feed(
    store: &dyn ActivityStore,
    viewer: Option<Uuid>,
    skip: i64,
    page_size: usize,
    now: DateTime<Utc>,
) -> AppResult<OffsetPage<FeedItem>> {
    let skip = skip.max(0);

    let trending_filter = ActivityFilter {
        kinds: Some(vec![ActivityKind::Reviewed]),
        since: Some(now - Duration::days(TRENDING_WINDOW_DAYS)),
        exclude_author: viewer,
        ..ActivityFilter::default()
    };
    let community_filter = ActivityFilter {
        exclude_author: viewer,
        ..ActivityFilter::default()
    };

    if skip > 0 {
        match store.count_activities(&community_filter).await {
            Ok(total) if skip >= TRENDING_POOL_SIZE.saturating_add(total) => {
                tracing::debug!(viewer = ?viewer, skip, total, "Offset past end of for-you feed");
                return Ok(OffsetPage::empty());
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Community count failed, fetching anyway"),
        }
    }

    // Enough community rows to fill the window even if none were deduplicated
    let window = skip.saturating_add(fetch_limit(page_size));

    let gathered = gather(vec![
        Source::new(
            "trending_reviews",
            store
                .find_activities(&trending_filter, ActivityOrder::MostLiked, 0, TRENDING_POOL_SIZE)
                .boxed(),
        ),
        Source::new(
            "recent_community",
            store
                .find_activities(&community_filter, ActivityOrder::Newest, 0, window)
                .boxed(),
        ),
    ])
    .await;

    let merged = merge_first_seen(gathered.into_lists()?, |item| item.id);
    let rows: Vec<FeedItem> = merged.into_iter().skip(skip as usize).collect();
    let page = paginate_offset(rows, skip, page_size);

    tracing::debug!(
        viewer = ?viewer,
        skip,
        items = page.activities.len(),
        next_skip = ?page.next_skip,
        "For-you feed page built"
    );

    let activities = enrich_likes(store, viewer, page.activities).await;
    Ok(OffsetPage { activities, ..page })
}

/// One user's activity, newest first, offset paged
pub async fn user_activity(
    store: &dyn ActivityStore,
    viewer: Option<Uuid>,
    user_id: Uuid,
    skip: i64,
    page_size: usize,
) -> AppResult<OffsetPage<FeedItem>> {
    let skip = skip.max(0);
    let filter = ActivityFilter::by_authors(vec![user_id]);

    let total = store.count_activities(&filter).await?;
    if skip >= total {
        tracing::debug!(user_id = %user_id, skip, total, "Offset past end of activity");
        return Ok(OffsetPage::empty());
    }

    let rows = store
        .find_activities(&filter, ActivityOrder::Newest, skip, fetch_limit(page_size))
        .await?;
    let page = paginate_offset(rows, skip, page_size);

    let activities = enrich_likes(store, viewer, page.activities).await;
    Ok(OffsetPage { activities, ..page })
}

/// Stores an activity for the viewer; re-sending the same id replaces it
pub async fn record_activity(
    store: &dyn ActivityStore,
    viewer: Option<Uuid>,
    activity: NewActivity,
    now: DateTime<Utc>,
) -> AppResult<FeedItem> {
    let viewer = viewer
        .ok_or_else(|| AppError::Unauthorized("Recording activity requires a viewer".into()))?;
    activity.validate().map_err(AppError::InvalidInput)?;

    let item = store.upsert_activity(&activity.into_item(viewer, now)).await?;

    tracing::info!(
        activity_id = %item.id,
        user_id = %item.user_id,
        kind = %item.kind,
        "Activity recorded"
    );

    Ok(item)
}
