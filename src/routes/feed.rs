use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::{request_id::RequestId, Viewer},
    models::{CursorPage, FeedItem, NewActivity, OffsetPage},
    routes::AppState,
    services::{feed, pagination::PageParams},
};

/// Following feed, cursor paginated
pub async fn following(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<CursorPage<FeedItem>>> {
    let page_size = params.page_size(state.page_limits);

    tracing::info!(
        request_id = %request_id,
        viewer = ?viewer.id(),
        page_size,
        has_cursor = params.cursor.is_some(),
        "Fetching following feed"
    );

    let page =
        feed::following_feed(state.store.as_ref(), viewer.id(), params.cursor(), page_size)
            .await?;
    Ok(Json(page))
}

/// For-you feed, offset paginated
pub async fn for_you(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<OffsetPage<FeedItem>>> {
    let page_size = params.page_size(state.page_limits);
    let skip = params.skip();

    tracing::info!(
        request_id = %request_id,
        viewer = ?viewer.id(),
        skip,
        page_size,
        "Fetching for-you feed"
    );

    let page = feed::for_you_feed(
        state.store.as_ref(),
        viewer.id(),
        skip,
        page_size,
        Utc::now(),
    )
    .await?;
    Ok(Json(page))
}

/// One user's activity, offset paginated
pub async fn user_activity(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<OffsetPage<FeedItem>>> {
    let page = feed::user_activity(
        state.store.as_ref(),
        viewer.id(),
        user_id,
        params.skip(),
        params.page_size(state.page_limits),
    )
    .await?;
    Ok(Json(page))
}

/// Records an activity for the viewer
pub async fn record(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Extension(request_id): Extension<RequestId>,
    Json(activity): Json<NewActivity>,
) -> AppResult<(StatusCode, Json<FeedItem>)> {
    tracing::debug!(request_id = %request_id, kind = %activity.kind, "Recording activity");

    let item =
        feed::record_activity(state.store.as_ref(), viewer.id(), activity, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}
