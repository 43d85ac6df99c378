#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use chrono::{DateTime, Utc};
use reel_feed::{
    db::{ActivityFilter, ActivityOrder, ActivityStore},
    error::{AppError, AppResult},
    models::{ActivityKind, CandidateMovie, FeedItem},
    routes::{create_router, AppState},
    services::{pagination::PageLimits, MovieCatalog, RateLimiter},
};
use uuid::Uuid;

/// Activity store backed by in-process collections
#[derive(Default)]
pub struct MemoryStore {
    activities: Mutex<Vec<FeedItem>>,
    follows: Mutex<HashMap<Uuid, Vec<Uuid>>>,
    likes: Mutex<HashSet<(Uuid, Uuid)>>,
    favorites: Mutex<HashMap<Uuid, Vec<i64>>>,
}

impl MemoryStore {
    pub fn insert(&self, item: FeedItem) {
        self.activities.lock().unwrap().push(item);
    }

    pub fn follow(&self, follower: Uuid, following: Uuid) {
        self.follows
            .lock()
            .unwrap()
            .entry(follower)
            .or_default()
            .push(following);
    }

    pub fn like(&self, user: Uuid, review: Uuid) {
        self.likes.lock().unwrap().insert((user, review));
    }

    pub fn set_favorites(&self, user: Uuid, movies: Vec<i64>) {
        self.favorites.lock().unwrap().insert(user, movies);
    }

    pub fn len(&self) -> usize {
        self.activities.lock().unwrap().len()
    }

    fn like_count(&self, item: &FeedItem) -> usize {
        let likes = self.likes.lock().unwrap();
        item.review_id
            .map_or(0, |review| likes.iter().filter(|(_, r)| *r == review).count())
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn find_activities(
        &self,
        filter: &ActivityFilter,
        order: ActivityOrder,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<FeedItem>> {
        let mut rows: Vec<FeedItem> = self
            .activities
            .lock()
            .unwrap()
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            (b.created_at, b.id).cmp(&(a.created_at, a.id))
        });
        if order == ActivityOrder::MostLiked {
            rows.sort_by_key(|item| std::cmp::Reverse(self.like_count(item)));
        }

        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_activities(&self, filter: &ActivityFilter) -> AppResult<i64> {
        let activities = self.activities.lock().unwrap();
        Ok(activities.iter().filter(|item| filter.matches(item)).count() as i64)
    }

    async fn liked_review_ids(
        &self,
        viewer: Uuid,
        review_ids: &[Uuid],
    ) -> AppResult<HashSet<Uuid>> {
        let likes = self.likes.lock().unwrap();
        Ok(review_ids
            .iter()
            .copied()
            .filter(|review| likes.contains(&(viewer, *review)))
            .collect())
    }

    async fn following_ids(&self, viewer: Uuid) -> AppResult<Vec<Uuid>> {
        Ok(self
            .follows
            .lock()
            .unwrap()
            .get(&viewer)
            .cloned()
            .unwrap_or_default())
    }

    async fn watched_movie_ids(&self, viewer: Uuid) -> AppResult<HashSet<i64>> {
        let activities = self.activities.lock().unwrap();
        Ok(activities
            .iter()
            .filter(|item| item.user_id == viewer && item.kind == ActivityKind::Watched)
            .filter_map(|item| item.movie_id)
            .collect())
    }

    async fn latest_watched_movie(&self, viewer: Uuid) -> AppResult<Option<i64>> {
        let activities = self.activities.lock().unwrap();
        Ok(activities
            .iter()
            .filter(|item| item.user_id == viewer && item.kind == ActivityKind::Watched)
            .max_by_key(|item| (item.created_at, item.id))
            .and_then(|item| item.movie_id))
    }

    async fn favorite_movie_ids(&self, viewer: Uuid, limit: i64) -> AppResult<Vec<i64>> {
        let favorites = self.favorites.lock().unwrap();
        Ok(favorites
            .get(&viewer)
            .map(|movies| movies.iter().copied().take(limit.max(0) as usize).collect())
            .unwrap_or_default())
    }

    async fn upsert_activity(&self, item: &FeedItem) -> AppResult<FeedItem> {
        let mut activities = self.activities.lock().unwrap();
        match activities.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) if existing.user_id != item.user_id => Err(AppError::InvalidInput(
                "activity id belongs to another user".to_string(),
            )),
            Some(existing) => {
                *existing = item.clone();
                Ok(item.clone())
            }
            None => {
                activities.push(item.clone());
                Ok(item.clone())
            }
        }
    }
}

/// Catalog with canned lists; list names in `failing` return an upstream error
#[derive(Default)]
pub struct FakeCatalog {
    pub trending: Vec<CandidateMovie>,
    pub popular: Vec<CandidateMovie>,
    pub by_genre: HashMap<u32, Vec<CandidateMovie>>,
    pub similar: HashMap<u64, Vec<CandidateMovie>>,
    pub failing: HashSet<&'static str>,
}

impl FakeCatalog {
    fn list(&self, name: &'static str, movies: &[CandidateMovie]) -> AppResult<Vec<CandidateMovie>> {
        if self.failing.contains(name) {
            return Err(AppError::ExternalApi(format!("{} unavailable", name)));
        }
        Ok(movies.to_vec())
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    async fn trending(&self) -> AppResult<Vec<CandidateMovie>> {
        self.list("trending", &self.trending)
    }

    async fn popular(&self) -> AppResult<Vec<CandidateMovie>> {
        self.list("popular", &self.popular)
    }

    async fn discover_by_genre(&self, genre_id: u32) -> AppResult<Vec<CandidateMovie>> {
        let movies = self.by_genre.get(&genre_id).cloned().unwrap_or_default();
        self.list("genre", &movies)
    }

    async fn similar(&self, movie_id: u64) -> AppResult<Vec<CandidateMovie>> {
        let movies = self.similar.get(&movie_id).cloned().unwrap_or_default();
        self.list("similar", &movies)
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CandidateMovie>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Search query is required".to_string()));
        }
        let needle = query.to_lowercase();
        let all: Vec<CandidateMovie> = self
            .trending
            .iter()
            .chain(&self.popular)
            .filter(|movie| movie.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        self.list("search", &all)
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
}

pub fn app(store: MemoryStore, catalog: FakeCatalog) -> TestApp {
    app_with_limit(store, catalog, 100)
}

pub fn app_with_limit(store: MemoryStore, catalog: FakeCatalog, max_requests: u32) -> TestApp {
    let store = Arc::new(store);
    let state = Arc::new(AppState {
        store: store.clone(),
        catalog: Arc::new(catalog),
        rate_limiter: Arc::new(RateLimiter::new(max_requests, Duration::from_secs(60))),
        page_limits: PageLimits::default(),
        pick_tonight_count: 5,
    });

    TestApp {
        store,
        router: create_router(state),
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_717_200_000 + secs, 0).unwrap()
}

pub fn activity(user_id: Uuid, kind: ActivityKind, secs: i64) -> FeedItem {
    FeedItem {
        id: Uuid::new_v4(),
        user_id,
        kind,
        movie_id: None,
        review_id: None,
        list_id: None,
        target_user_id: None,
        created_at: at(secs),
        is_liked: None,
    }
}

pub fn watched(user_id: Uuid, movie_id: i64, secs: i64) -> FeedItem {
    FeedItem {
        movie_id: Some(movie_id),
        ..activity(user_id, ActivityKind::Watched, secs)
    }
}

pub fn review(user_id: Uuid, review_id: Uuid, secs: i64) -> FeedItem {
    FeedItem {
        review_id: Some(review_id),
        ..activity(user_id, ActivityKind::Reviewed, secs)
    }
}

pub fn movie(id: u64, genres: &[u32]) -> CandidateMovie {
    CandidateMovie {
        id,
        title: format!("Movie {}", id),
        overview: None,
        poster_path: None,
        release_date: None,
        genre_ids: genres.to_vec(),
        vote_average: 7.0,
        popularity: 10.0,
    }
}

pub fn get(uri: &str, viewer: Option<Uuid>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(viewer) = viewer {
        builder = builder.header("x-viewer-id", viewer.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, viewer: Option<Uuid>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(viewer) = viewer {
        builder = builder.header("x-viewer-id", viewer.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
