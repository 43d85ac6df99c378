use serde::{Deserialize, Serialize};

/// Cursor-paginated response: `{ data, nextCursor, hasMore }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Offset-paginated response: `{ activities, nextSkip }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPage<T> {
    pub activities: Vec<T>,
    pub next_skip: Option<i64>,
}

impl<T> OffsetPage<T> {
    pub fn empty() -> Self {
        Self {
            activities: Vec::new(),
            next_skip: None,
        }
    }
}
