//! Cursor and offset pagination over peek-row fetches
//!
//! Fetchers always ask the store for `page_size + 1` rows. The extra row is
//! never returned; its presence is the only signal that another page exists.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{CursorPage, OffsetPage};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 50;

/// Continuation token: the sort key of the last item returned
///
/// Rows are ordered by `(created_at DESC, id DESC)`, so the key carries the id
/// as a tie-breaker for rows sharing a timestamp. Encoded as
/// `<rfc3339>_<uuid>`; clients treat it as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

const CURSOR_SEPARATOR: char = '_';

impl Cursor {
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Self { created_at, id }
    }

    /// Sort key to resume strictly after
    pub fn key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, self.id)
    }

    /// Parses a client-supplied cursor
    ///
    /// Anything unparseable yields `None`, which callers treat as "start from
    /// the newest item". A bare timestamp resumes strictly before that instant.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw?.trim();
        if raw.is_empty() {
            return None;
        }

        let (at, id) = match raw.split_once(CURSOR_SEPARATOR) {
            Some((at, id)) => (at, Some(id)),
            None => (raw, None),
        };

        let created_at = match DateTime::parse_from_rfc3339(at) {
            Ok(at) => at.with_timezone(&Utc),
            Err(e) => {
                tracing::debug!(cursor = %raw, error = %e, "Ignoring unparseable cursor");
                return None;
            }
        };

        // The nil id sorts below every row id, so (at, nil) excludes all of `at`
        let id = match id.map(Uuid::parse_str).transpose() {
            Ok(id) => id.unwrap_or_else(Uuid::nil),
            Err(e) => {
                tracing::debug!(cursor = %raw, error = %e, "Ignoring cursor with bad id");
                return None;
            }
        };

        Some(Self { created_at, id })
    }

    /// Full-precision encoding so the next query resumes exactly after this row
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            self.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            CURSOR_SEPARATOR,
            self.id
        )
    }
}

/// Query-string paging parameters shared by all feed routes
///
/// Values arrive as raw strings so that malformed input can be ignored
/// instead of rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub skip: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

/// Page size and window limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: usize,
    pub max_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    pub fn new(default_size: usize, max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            default_size: default_size.clamp(1, max_size),
            max_size,
        }
    }
}

impl PageParams {
    /// Requested page size clamped to `[1, max]`
    pub fn page_size(&self, limits: PageLimits) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|n| n.clamp(1, limits.max_size as i64) as usize)
            .unwrap_or(limits.default_size)
    }

    /// Offset to start from; negative or malformed values become 0
    pub fn skip(&self) -> i64 {
        self.skip
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|n| n.max(0))
            .unwrap_or(0)
    }

    pub fn cursor(&self) -> Option<Cursor> {
        Cursor::parse(self.cursor.as_deref())
    }
}

/// Rows to request for a page: the page plus the peek row
pub fn fetch_limit(page_size: usize) -> i64 {
    page_size as i64 + 1
}

/// Builds a cursor page from a peek-row fetch
///
/// `rows` must be the fetch result in sort order. `has_more` is true exactly
/// when the fetch returned more than `page_size` rows, and `next_cursor` is
/// taken from the last row kept, never from the peek row.
pub fn paginate_cursor<T, F>(mut rows: Vec<T>, page_size: usize, cursor_of: F) -> CursorPage<T>
where
    F: Fn(&T) -> Cursor,
{
    let has_more = rows.len() > page_size;
    rows.truncate(page_size);

    let next_cursor = if has_more {
        rows.last().map(|row| cursor_of(row).encode())
    } else {
        None
    };

    CursorPage {
        data: rows,
        next_cursor,
        has_more,
    }
}

/// Builds an offset page from a peek-row fetch that started at `skip`
pub fn paginate_offset<T>(mut rows: Vec<T>, skip: i64, page_size: usize) -> OffsetPage<T> {
    let has_more = rows.len() > page_size;
    rows.truncate(page_size);

    OffsetPage {
        activities: rows,
        next_skip: has_more.then(|| skip.saturating_add(page_size as i64)),
    }
}
