pub mod postgres;
pub mod redis;
pub mod store;

pub use postgres::{create_pool, PgActivityStore};
pub use redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use store::{ActivityFilter, ActivityOrder, ActivityStore};
