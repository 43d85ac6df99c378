//! TMDB (The Movie Database) catalog provider
//!
//! API Flow:
//! 1. Trending: /trending/movie/week
//! 2. Popular: /movie/popular
//! 3. Genre pools: /discover/movie?with_genres={id}&sort_by=popularity.desc
//! 4. Similar: /movie/{id}/similar
//! 5. Search: /search/movie?query={q}
//!
//! Every list endpoint returns the same paged envelope, so one request helper
//! serves them all. Responses are cached in Redis.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{CandidateMovie, TmdbPage},
    services::providers::MovieCatalog,
};
use reqwest::Client as HttpClient;

const LIST_CACHE_TTL: u64 = 3600; // 1 hour
const SIMILAR_CACHE_TTL: u64 = 86400; // 1 day
const SEARCH_CACHE_TTL: u64 = 900; // 15 minutes

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// GETs a paged list endpoint and converts its results
    async fn fetch_list(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<Vec<CandidateMovie>> {
        let response = self
            .http_client
            .get(self.endpoint(path))
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "TMDB request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let page: TmdbPage = response.json().await?;
        let movies = Self::convert_page(page);

        tracing::debug!(
            path = %path,
            results = movies.len(),
            provider = "tmdb",
            "Catalog list fetched"
        );

        Ok(movies)
    }

    fn convert_page(page: TmdbPage) -> Vec<CandidateMovie> {
        page.results.into_iter().map(CandidateMovie::from).collect()
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbProvider {
    async fn trending(&self) -> AppResult<Vec<CandidateMovie>> {
        cached!(self.cache, CacheKey::Trending, LIST_CACHE_TTL, async move {
            self.fetch_list("trending/movie/week", &[]).await
        })
    }

    async fn popular(&self) -> AppResult<Vec<CandidateMovie>> {
        cached!(self.cache, CacheKey::Popular, LIST_CACHE_TTL, async move {
            self.fetch_list("movie/popular", &[]).await
        })
    }

    async fn discover_by_genre(&self, genre_id: u32) -> AppResult<Vec<CandidateMovie>> {
        cached!(
            self.cache,
            CacheKey::Discover(genre_id),
            LIST_CACHE_TTL,
            async move {
                self.fetch_list(
                    "discover/movie",
                    &[
                        ("with_genres", genre_id.to_string()),
                        ("sort_by", "popularity.desc".to_string()),
                    ],
                )
                .await
            }
        )
    }

    async fn similar(&self, movie_id: u64) -> AppResult<Vec<CandidateMovie>> {
        cached!(
            self.cache,
            CacheKey::Similar(movie_id),
            SIMILAR_CACHE_TTL,
            async move {
                self.fetch_list(&format!("movie/{}/similar", movie_id), &[])
                    .await
            }
        )
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CandidateMovie>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::MovieSearch(query.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let movies = self
                    .fetch_list("search/movie", &[("query", query.trim().to_string())])
                    .await?;

                tracing::info!(
                    query = %query,
                    results = movies.len(),
                    provider = "tmdb",
                    "Movie search completed"
                );

                Ok(movies)
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
