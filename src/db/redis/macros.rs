/// Serves a value from the cache or computes and caches it.
///
/// A cache read failure is logged and treated as a miss, so an unavailable
/// Redis only costs latency. The computed value is written in the background.
///
/// # Arguments
/// * `$cache`: a `Cache` (anything with `get_from_cache` and `set_in_background`).
/// * `$key`: the `CacheKey` to read and write.
/// * `$ttl`: time-to-live in seconds.
/// * `$block`: future producing an `AppResult` of the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let movies: Vec<CandidateMovie> = cached!(cache, CacheKey::Popular, 3600, async move {
///     fetch_popular().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            result => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, fetching fresh");
                }
                match $block.await {
                    Ok(value) => {
                        $cache.set_in_background(&key, &value, $ttl);
                        Ok(value)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }};
}
