use futures::FutureExt;
use rand::{seq::SliceRandom, Rng};
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    db::ActivityStore,
    models::{BecauseYouWatched, CandidateMovie, PickTonight},
    services::{
        merge::merge_first_seen,
        providers::MovieCatalog,
        sources::{gather, isolate, Source},
    },
};

/// Favorite movies used as similarity seeds for pick-tonight
pub const FAVORITE_SEEDS: i64 = 2;

/// Watched movie ids as catalog ids; store ids outside the catalog range are dropped
fn catalog_ids(ids: impl IntoIterator<Item = i64>) -> HashSet<u64> {
    ids.into_iter().filter_map(|id| u64::try_from(id).ok()).collect()
}

async fn watched_or_empty(store: &dyn ActivityStore, viewer: Option<Uuid>) -> HashSet<u64> {
    let Some(viewer) = viewer else {
        return HashSet::new();
    };

    match store.watched_movie_ids(viewer).await {
        Ok(ids) => catalog_ids(ids),
        Err(e) => {
            tracing::warn!(viewer = %viewer, error = %e, "Watched lookup failed, not filtering");
            HashSet::new()
        }
    }
}

async fn favorites_or_empty(store: &dyn ActivityStore, viewer: Option<Uuid>) -> Vec<u64> {
    match viewer {
        Some(viewer) => isolate(
            "favorites",
            store.favorite_movie_ids(viewer, FAVORITE_SEEDS).await,
        )
        .into_iter()
        .filter_map(|id| u64::try_from(id).ok())
        .collect(),
        None => Vec::new(),
    }
}

/// Builds the deduplicated pick-tonight candidate pool
///
/// Trending, popular, the optional genre pool and movies similar to the
/// viewer's favorites are fetched concurrently; each failing source simply
/// contributes nothing. The pool keeps source priority order, drops movies
/// the viewer has watched and, when `genre` is given, anything outside it.
pub async fn candidate_pool(
    store: &dyn ActivityStore,
    catalog: &dyn MovieCatalog,
    viewer: Option<Uuid>,
    genre: Option<u32>,
) -> Vec<CandidateMovie> {
    let (favorites, watched) = tokio::join!(
        favorites_or_empty(store, viewer),
        watched_or_empty(store, viewer)
    );

    let mut sources = vec![
        Source::new("trending", catalog.trending().boxed()),
        Source::new("popular", catalog.popular().boxed()),
    ];
    if let Some(genre) = genre {
        sources.push(Source::new("genre", catalog.discover_by_genre(genre).boxed()));
    }
    for favorite in favorites {
        sources.push(Source::new(
            "similar_to_favorite",
            catalog.similar(favorite).boxed(),
        ));
    }

    let gathered = gather(sources).await;
    let failed = gathered.failures.len();

    let pool: Vec<CandidateMovie> = merge_first_seen(gathered.lists, |movie| movie.id)
        .into_iter()
        .filter(|movie| !watched.contains(&movie.id))
        .filter(|movie| genre.map_or(true, |g| movie.genre_ids.contains(&g)))
        .collect();

    tracing::info!(
        viewer = ?viewer,
        genre = ?genre,
        pool = pool.len(),
        failed_sources = failed,
        provider = catalog.name(),
        "Pick-tonight pool built"
    );

    pool
}

/// Shuffles the pool and keeps `count` movies
pub fn sample_picks<R: Rng + ?Sized>(
    mut pool: Vec<CandidateMovie>,
    count: usize,
    rng: &mut R,
) -> PickTonight {
    let pool_size = pool.len();
    pool.shuffle(rng);
    pool.truncate(count);

    PickTonight {
        movies: pool,
        pool_size,
    }
}

/// A random handful of unwatched movies for tonight
pub async fn pick_tonight(
    store: &dyn ActivityStore,
    catalog: &dyn MovieCatalog,
    viewer: Option<Uuid>,
    genre: Option<u32>,
    count: usize,
) -> PickTonight {
    let pool = candidate_pool(store, catalog, viewer, genre).await;
    sample_picks(pool, count, &mut rand::thread_rng())
}

/// Movies similar to the viewer's most recently watched one
///
/// Falls back to trending (with `because_of = None`) for anonymous viewers,
/// viewers without watch history, or when the similar lookup yields nothing.
pub async fn because_you_watched(
    store: &dyn ActivityStore,
    catalog: &dyn MovieCatalog,
    viewer: Option<Uuid>,
    count: usize,
) -> BecauseYouWatched {
    let seed = match viewer {
        Some(viewer) => match store.latest_watched_movie(viewer).await {
            Ok(seed) => seed.and_then(|id| u64::try_from(id).ok()),
            Err(e) => {
                tracing::warn!(viewer = %viewer, error = %e, "Latest watched lookup failed");
                None
            }
        },
        None => None,
    };

    let watched = watched_or_empty(store, viewer).await;
    let unwatched = |movies: Vec<CandidateMovie>, seed: Option<u64>| -> Vec<CandidateMovie> {
        merge_first_seen([movies], |movie| movie.id)
            .into_iter()
            .filter(|movie| !watched.contains(&movie.id) && Some(movie.id) != seed)
            .take(count)
            .collect()
    };

    if let Some(seed) = seed {
        let similar = unwatched(isolate("similar", catalog.similar(seed).await), Some(seed));
        if !similar.is_empty() {
            return BecauseYouWatched {
                because_of: Some(seed),
                movies: similar,
            };
        }
        tracing::debug!(seed, "No unwatched similar movies, falling back to trending");
    }

    BecauseYouWatched {
        because_of: None,
        movies: unwatched(isolate("trending", catalog.trending().await), None),
    }
}
