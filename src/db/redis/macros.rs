/// A macro to simplify caching logic using Redis.
///
/// Checks the cache for the key first; on a hit the cached value is returned,
/// on a miss the provided block computes the value, which is then stored with
/// the given TTL and returned.
///
/// # Arguments
/// * `$cache`: The cache instance, providing `get_from_cache` and
///   `set_in_background`.
/// * `$key`: The `CacheKey` for the value.
/// * `$ttl`: Time-to-live in seconds.
/// * `$block`: Async block computing the value on a miss.
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
