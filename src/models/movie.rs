use serde::{Deserialize, Serialize};

/// A movie offered as a recommendation candidate
///
/// Candidates come straight from the catalog API and only live for the
/// duration of one request; `id` is the catalog's stable numeric id and is
/// the only thing used to deduplicate them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMovie {
    pub id: u64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Paged list response shared by TMDB list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<TmdbMovie>,
    #[serde(default)]
    pub total_pages: u32,
}

/// Raw movie record from TMDB
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
}

impl From<TmdbMovie> for CandidateMovie {
    fn from(movie: TmdbMovie) -> Self {
        let title = movie
            .title
            .or(movie.original_title)
            .unwrap_or_else(|| format!("#{}", movie.id));

        // TMDB sends "" for unknown dates and overviews
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        CandidateMovie {
            id: movie.id,
            title,
            overview: non_empty(movie.overview),
            poster_path: movie.poster_path,
            release_date: non_empty(movie.release_date),
            genre_ids: movie.genre_ids,
            vote_average: movie.vote_average,
            popularity: movie.popularity,
        }
    }
}

/// Response of the pick-tonight recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickTonight {
    pub movies: Vec<CandidateMovie>,
    /// Candidates left after dedup and filtering, before sampling
    pub pool_size: usize,
}

/// Response of the because-you-watched recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BecauseYouWatched {
    /// Seed movie, `None` when the trending fallback was used
    pub because_of: Option<u64>,
    pub movies: Vec<CandidateMovie>,
}
