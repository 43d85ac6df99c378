use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    middleware::{request_id::RequestId, Viewer},
    models::{BecauseYouWatched, PickTonight},
    routes::AppState,
    services::recommendations,
};

/// Upper bound for a caller-supplied `count`
const MAX_COUNT: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    count: Option<String>,
}

impl RecommendationQuery {
    /// TMDB genre id; anything unparseable means no genre filter
    fn genre(&self) -> Option<u32> {
        self.genre.as_deref().and_then(|g| g.trim().parse().ok())
    }

    fn count(&self, default: usize) -> usize {
        self.count
            .as_deref()
            .and_then(|c| c.trim().parse::<usize>().ok())
            .unwrap_or(default)
            .clamp(1, MAX_COUNT)
    }
}

/// Random unwatched picks drawn from several catalog lists
pub async fn pick_tonight(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendationQuery>,
) -> Json<PickTonight> {
    let count = query.count(state.pick_tonight_count);

    tracing::info!(
        request_id = %request_id,
        viewer = ?viewer.id(),
        genre = ?query.genre(),
        count,
        "Processing pick-tonight request"
    );

    let picks = recommendations::pick_tonight(
        state.store.as_ref(),
        state.catalog.as_ref(),
        viewer.id(),
        query.genre(),
        count,
    )
    .await;
    Json(picks)
}

/// Movies similar to the viewer's latest watch
pub async fn because_you_watched(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Query(query): Query<RecommendationQuery>,
) -> Json<BecauseYouWatched> {
    let result = recommendations::because_you_watched(
        state.store.as_ref(),
        state.catalog.as_ref(),
        viewer.id(),
        query.count(MAX_COUNT),
    )
    .await;
    Json(result)
}
