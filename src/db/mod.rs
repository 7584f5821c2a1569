pub mod postgres;
pub mod redis;
pub mod tracked;

pub use postgres::create_pool;
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
pub use tracked::PgTrackedStore;
pub use tracked::TrackedStore;

#[cfg(test)]
pub use tracked::MockTrackedStore;
