pub mod enrich;
pub mod feed;
pub mod merge;
pub mod pagination;
pub mod providers;
pub mod rate_limit;
pub mod recommendations;
pub mod sources;

pub use providers::MovieCatalog;
pub use rate_limit::RateLimiter;
