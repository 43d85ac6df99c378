use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

/// Kind of activity a user produced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Watched,
    Reviewed,
    LikedReview,
    AddedToList,
    CreatedList,
    FollowedUser,
    AddedToWatchlist,
}

impl ActivityKind {
    /// Storage and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Watched => "watched",
            ActivityKind::Reviewed => "reviewed",
            ActivityKind::LikedReview => "liked_review",
            ActivityKind::AddedToList => "added_to_list",
            ActivityKind::CreatedList => "created_list",
            ActivityKind::FollowedUser => "followed_user",
            ActivityKind::AddedToWatchlist => "added_to_watchlist",
        }
    }
}

impl Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watched" => Ok(ActivityKind::Watched),
            "reviewed" => Ok(ActivityKind::Reviewed),
            "liked_review" => Ok(ActivityKind::LikedReview),
            "added_to_list" => Ok(ActivityKind::AddedToList),
            "created_list" => Ok(ActivityKind::CreatedList),
            "followed_user" => Ok(ActivityKind::FollowedUser),
            "added_to_watchlist" => Ok(ActivityKind::AddedToWatchlist),
            other => Err(format!("unknown activity kind '{}'", other)),
        }
    }
}

/// One entry of an activity feed
///
/// Feed items are read-only projections of stored activity rows. The only
/// field this service ever sets after loading is `is_liked`, and only on
/// items that reference a review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: ActivityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
}

/// Request body for recording a new activity
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    /// Client-supplied id makes retries idempotent
    #[serde(default)]
    pub id: Option<Uuid>,
    pub kind: ActivityKind,
    #[serde(default)]
    pub movie_id: Option<i64>,
    #[serde(default)]
    pub review_id: Option<Uuid>,
    #[serde(default)]
    pub list_id: Option<Uuid>,
    #[serde(default)]
    pub target_user_id: Option<Uuid>,
}

impl NewActivity {
    /// Checks that the references required by `kind` are present
    pub fn validate(&self) -> Result<(), String> {
        let missing = match self.kind {
            ActivityKind::Watched | ActivityKind::AddedToWatchlist => {
                self.movie_id.is_none().then_some("movieId")
            }
            ActivityKind::Reviewed | ActivityKind::LikedReview => {
                self.review_id.is_none().then_some("reviewId")
            }
            ActivityKind::AddedToList | ActivityKind::CreatedList => {
                self.list_id.is_none().then_some("listId")
            }
            ActivityKind::FollowedUser => self.target_user_id.is_none().then_some("targetUserId"),
        };

        match missing {
            Some(field) => Err(format!("{} is required for '{}' activity", field, self.kind)),
            None => Ok(()),
        }
    }

    /// Builds the feed item this activity produces for `user_id`
    pub fn into_item(self, user_id: Uuid, created_at: DateTime<Utc>) -> FeedItem {
        FeedItem {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            user_id,
            kind: self.kind,
            movie_id: self.movie_id,
            review_id: self.review_id,
            list_id: self.list_id,
            target_user_id: self.target_user_id,
            created_at,
            is_liked: None,
        }
    }
}
