pub mod activity;
pub mod movie;
pub mod page;

pub use activity::{ActivityKind, FeedItem, NewActivity};
pub use movie::{BecauseYouWatched, CandidateMovie, PickTonight, TmdbMovie, TmdbPage};
pub use page::{CursorPage, OffsetPage};
