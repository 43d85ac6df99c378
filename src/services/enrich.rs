use std::collections::HashSet;
use uuid::Uuid;

use crate::{db::ActivityStore, models::FeedItem};

/// Tags every review-bearing item with the viewer's like status
///
/// All review ids on the page are resolved with a single batch lookup. Items
/// without a review pass through untouched. Anonymous viewers and failed
/// lookups yield `is_liked = false` instead of failing the page.
pub async fn enrich_likes(
    store: &dyn ActivityStore,
    viewer: Option<Uuid>,
    mut items: Vec<FeedItem>,
) -> Vec<FeedItem> {
    let review_ids: Vec<Uuid> = {
        let mut seen = HashSet::new();
        items
            .iter()
            .filter_map(|item| item.review_id)
            .filter(|id| seen.insert(*id))
            .collect()
    };

    let liked = match viewer {
        Some(viewer) if !review_ids.is_empty() => {
            match store.liked_review_ids(viewer, &review_ids).await {
                Ok(liked) => liked,
                Err(e) => {
                    tracing::warn!(
                        viewer = %viewer,
                        reviews = review_ids.len(),
                        error = %e,
                        "Like lookup failed, marking page as not liked"
                    );
                    HashSet::new()
                }
            }
        }
        _ => HashSet::new(),
    };

    for item in items.iter_mut() {
        if let Some(review_id) = item.review_id {
            item.is_liked = Some(liked.contains(&review_id));
        }
    }

    items
}
