//! Redis cache gateway
//!
//! Wraps a `ConnectionManager`, which reconnects with exponential backoff
//! on its own once established. The manager is created on first use so the
//! service starts (and keeps serving from the store) while Redis is down.
//!
//! The first connect is single-flight and runs in its own task: requests
//! that arrive while it is in progress, or within the retry delay after it
//! failed, get `CacheUnavailable` at once instead of waiting.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use tracing::{debug, info, warn};

use super::{CacheGateway, CacheKey, CacheUnavailable};

// == Redis Settings ==
/// Connection and reconnect policy for the Redis client.
#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    /// Base backoff step in milliseconds
    pub retry_factor_ms: u64,
    /// Upper bound for a single backoff delay in milliseconds; also the
    /// pause between failed initial connects
    pub retry_max_delay_ms: u64,
    /// Reconnect attempts per failed connection
    pub retries: usize,
    pub connect_timeout: Duration,
    pub response_timeout: Duration,
}

impl RedisSettings {
    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }

    fn manager_config(&self) -> ConnectionManagerConfig {
        ConnectionManagerConfig::new()
            .set_exponent_base(2)
            .set_factor(self.retry_factor_ms)
            .set_max_delay(self.retry_max_delay_ms)
            .set_number_of_retries(self.retries)
            .set_connection_timeout(self.connect_timeout)
            .set_response_timeout(self.response_timeout)
    }
}

// == Link State ==
enum Link {
    /// No connection; a new attempt may start once `retry_at` has passed
    Idle { retry_at: Option<Instant> },
    Connecting,
    Ready(ConnectionManager),
    Closed,
}

fn lock(link: &Mutex<Link>) -> MutexGuard<'_, Link> {
    link.lock().unwrap_or_else(PoisonError::into_inner)
}

fn closed() -> CacheUnavailable {
    CacheUnavailable("redis connection closed".to_string())
}

// == Redis Cache ==
pub struct RedisCache {
    client: redis::Client,
    settings: RedisSettings,
    link: Arc<Mutex<Link>>,
}

impl RedisCache {
    /// Builds the client. No connection is opened until the first command.
    pub fn new(settings: RedisSettings) -> Result<Self, CacheUnavailable> {
        let client = redis::Client::open(settings.url())?;
        Ok(Self {
            client,
            settings,
            link: Arc::new(Mutex::new(Link::Idle { retry_at: None })),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheUnavailable> {
        {
            let mut link = lock(&self.link);
            let may_connect = match &*link {
                Link::Ready(conn) => return Ok(conn.clone()),
                Link::Closed => return Err(closed()),
                Link::Connecting => {
                    return Err(CacheUnavailable(
                        "redis connection attempt in progress".to_string(),
                    ))
                }
                Link::Idle { retry_at } => retry_at.map_or(true, |at| Instant::now() >= at),
            };
            if !may_connect {
                return Err(CacheUnavailable(
                    "redis unreachable, waiting before next connect".to_string(),
                ));
            }
            *link = Link::Connecting;
        }

        // The attempt owns the state transition, so a cancelled request
        // cannot leave the link stuck in `Connecting`
        let attempt = tokio::spawn(connect(
            self.client.clone(),
            self.settings.clone(),
            self.link.clone(),
        ));
        attempt
            .await
            .map_err(|err| CacheUnavailable(format!("redis connect task failed: {err}")))?
    }
}

/// One bounded connect attempt; records the outcome in `link`.
async fn connect(
    client: redis::Client,
    settings: RedisSettings,
    link: Arc<Mutex<Link>>,
) -> Result<ConnectionManager, CacheUnavailable> {
    debug!(url = %settings.url(), "Connecting to redis");
    let outcome = tokio::time::timeout(
        settings.connect_timeout,
        ConnectionManager::new_with_config(client, settings.manager_config()),
    )
    .await;

    let result = match outcome {
        Ok(Ok(conn)) => Ok(conn),
        Ok(Err(err)) => Err(CacheUnavailable::from(err)),
        Err(_) => Err(CacheUnavailable(format!(
            "redis connect timed out after {}ms",
            settings.connect_timeout.as_millis()
        ))),
    };

    let mut state = lock(&link);
    if matches!(*state, Link::Closed) {
        return Err(closed());
    }
    match result {
        Ok(conn) => {
            info!(url = %settings.url(), "Redis connection established");
            *state = Link::Ready(conn.clone());
            Ok(conn)
        }
        Err(err) => {
            warn!(
                url = %settings.url(),
                error = %err,
                retry_in_ms = settings.retry_max_delay_ms,
                "Redis connect failed"
            );
            *state = Link::Idle {
                retry_at: Some(Instant::now() + settings.retry_delay()),
            };
            Err(err)
        }
    }
}

#[async_trait]
impl CacheGateway for RedisCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheUnavailable> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key.to_string()).await?;
        Ok(value)
    }

    async fn set_with_ttl(
        &self,
        key: &CacheKey,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheUnavailable> {
        let mut conn = self.connection().await?;
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key.to_string(), value, seconds).await?;
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), CacheUnavailable> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(key.to_string()).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), CacheUnavailable> {
        // Dropping the last manager handle closes the multiplexed connection
        *lock(&self.link) = Link::Closed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn unreachable_settings() -> RedisSettings {
        RedisSettings {
            host: "127.0.0.1".to_string(),
            port: 1,
            retry_factor_ms: 1,
            retry_max_delay_ms: 5,
            retries: 1,
            connect_timeout: Duration::from_millis(200),
            response_timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_settings_url() {
        let settings = RedisSettings {
            host: "redis".to_string(),
            port: 6379,
            ..unreachable_settings()
        };
        assert_eq!(settings.url(), "redis://redis:6379/");
    }

    #[tokio::test]
    async fn test_new_does_not_connect() {
        assert!(RedisCache::new(unreachable_settings()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_soft_failure() {
        let cache = RedisCache::new(unreachable_settings()).unwrap();
        let result = cache.get(&CacheKey::all()).await;
        assert!(result.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_commands_fail_within_connect_timeout() {
        // Production defaults: 6 retries with backoff on every reconnect
        let settings = RedisSettings {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..Config::default().redis_settings()
        };
        let bound = settings.connect_timeout + Duration::from_millis(500);
        let cache = Arc::new(RedisCache::new(settings).unwrap());

        let started = Instant::now();
        let mut tasks = Vec::new();
        for i in 0..4 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    cache.get(&CacheKey::item(i)).await.map(|_| ())
                } else {
                    cache.delete(&CacheKey::item(i)).await
                }
            }));
        }

        for task in tasks {
            let result = tokio::time::timeout(bound, task)
                .await
                .expect("cache command must not wait behind another connect")
                .unwrap();
            assert!(result.is_err());
        }
        assert!(started.elapsed() < bound);
    }

    #[tokio::test]
    async fn test_failed_connect_backs_off_without_blocking() {
        let settings = RedisSettings {
            retry_max_delay_ms: 60_000,
            ..unreachable_settings()
        };
        let cache = RedisCache::new(settings).unwrap();
        assert!(cache.get(&CacheKey::all()).await.is_err());

        let started = Instant::now();
        let err = cache.get(&CacheKey::all()).await.unwrap_err();
        assert!(err.0.contains("waiting before next connect"));
        assert!(started.elapsed() < Duration::from_millis(50));

        // a read's populate after a failed lookup is just as quick
        let all_key = CacheKey::all();
        let populate = cache.set_with_ttl(&all_key, "[]", Duration::from_secs(60));
        assert!(populate.await.is_err());
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_closed_cache_rejects_commands() {
        let cache = RedisCache::new(unreachable_settings()).unwrap();
        cache.close().await.unwrap();

        let err = cache.delete(&CacheKey::item(1)).await.unwrap_err();
        assert!(err.0.contains("closed"));
    }
}
