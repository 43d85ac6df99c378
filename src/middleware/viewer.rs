//! Viewer identity extractor
//!
//! Authentication happens upstream; the auth layer forwards the signed-in
//! user's id in `x-viewer-id`. A missing or malformed header means the
//! request is anonymous, never an error.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;
use uuid::Uuid;

pub const VIEWER_HEADER: &str = "x-viewer-id";

/// Optional identity of the user making the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewer(pub Option<Uuid>);

impl Viewer {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let id = headers
            .get(VIEWER_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok());
        Self(id)
    }

    pub fn id(&self) -> Option<Uuid> {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer::from_headers(&parts.headers))
    }
}
