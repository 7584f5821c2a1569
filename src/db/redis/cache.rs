use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::MediaKind;

/// Cache key space for metadata responses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Title search by kind and query text
    Search(MediaKind, String),
    /// Full title detail by kind and id
    Detail(MediaKind, i64),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Search(kind, query) => {
                write!(f, "search:{}:{}", kind.tmdb_segment(), query.to_lowercase())
            }
            CacheKey::Detail(kind, id) => write!(f, "detail:{}:{}", kind.tmdb_segment(), id),
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Cache handler for storing and retrieving metadata responses from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
}

impl Cache {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` on a miss; a hit is deserialized from its JSON form.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(format!("{}", key)).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache without blocking the caller
    ///
    /// The write runs in a spawned task; failures are logged and dropped so a
    /// flaky cache never fails an API response.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let client = self.redis_client.clone();
        let key = format!("{}", key);
        tokio::spawn(async move {
            let result: AppResult<()> = async {
                let mut conn = client.get_multiplexed_async_connection().await?;
                let _: () = conn.set_ex(&key, json, ttl).await?;
                Ok(())
            }
            .await;

            if let Err(e) = result {
                tracing::error!(error = %e, key = %key, "Failed to write to Redis cache");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_search() {
        let key = CacheKey::Search(MediaKind::Movie, "Inception".to_string());
        assert_eq!(format!("{}", key), "search:movie:inception");
    }

    #[test]
    fn test_cache_key_display_search_show() {
        let key = CacheKey::Search(MediaKind::Show, "SEVERANCE".to_string());
        assert_eq!(format!("{}", key), "search:tv:severance");
    }

    #[test]
    fn test_cache_key_display_detail() {
        let key = CacheKey::Detail(MediaKind::Movie, 27205);
        assert_eq!(format!("{}", key), "detail:movie:27205");
    }
}
