//! Implementation of set storage using Redis.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::Error;

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use broker_sets::SetStore;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use tracing::{debug, info, instrument, warn};

const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the `RedisSetStore`.
#[derive(Clone, Debug)]
pub struct RedisSetStoreConfig {
    /// Connection URL, e.g. `redis://127.0.0.1:6379/0`.
    pub url: String,

    /// Timeout for connecting and for each individual command. Defaults to 10 seconds if not set.
    pub operation_timeout: Option<Duration>,
}

/// A set store backed by a Redis server.
///
/// Clones share one multiplexed connection that reconnects on failure.
#[derive(Clone)]
pub struct RedisSetStore {
    connection: ConnectionManager,
    operation_timeout: Duration,
}

impl Debug for RedisSetStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RedisSetStore")
            .field("operation_timeout", &self.operation_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisSetStore {
    /// Connects to the Redis server described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connect` if the URL is invalid or the server cannot be
    /// reached, and `Error::Timeout` if connecting takes too long.
    #[instrument(skip_all)]
    pub async fn connect(
        RedisSetStoreConfig {
            url,
            operation_timeout,
        }: RedisSetStoreConfig,
    ) -> Result<Self, Error> {
        let operation_timeout = operation_timeout.unwrap_or(DEFAULT_OPERATION_TIMEOUT);

        let client = redis::Client::open(url.as_str()).map_err(Error::Connect)?;

        let connection = tokio::time::timeout(operation_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| Error::Timeout(operation_timeout))?
            .map_err(Error::Connect)?;

        info!("connected to redis");

        Ok(Self {
            connection,
            operation_timeout,
        })
    }

    /// Awaits a single command, bounding it by the operation timeout.
    async fn run<T>(
        &self,
        command: &'static str,
        future: impl Future<Output = RedisResult<T>> + Send,
    ) -> Result<T, Error> {
        match tokio::time::timeout(self.operation_timeout, future).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(source)) => {
                debug!(command, error = %source, "redis command failed");
                Err(Error::Command { command, source })
            }
            Err(_elapsed) => {
                warn!(command, timeout = ?self.operation_timeout, "redis command timed out");
                Err(Error::Timeout(self.operation_timeout))
            }
        }
    }
}

/// Converts a TTL to whole milliseconds, rounding up so that a non-zero TTL
/// never becomes an immediate delete.
fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_nanos().div_ceil(1_000_000)).unwrap_or(i64::MAX)
}

#[async_trait]
impl SetStore for RedisSetStore {
    type Error = Error;

    #[instrument(skip(self, members), fields(count = members.len()))]
    async fn add_members(&self, key: &str, members: &[String]) -> Result<usize, Self::Error> {
        // SADD without members is a syntax error in Redis.
        if members.is_empty() {
            return Ok(0);
        }

        let mut connection = self.connection.clone();
        self.run("SADD", connection.sadd::<_, _, usize>(key, members))
            .await
    }

    #[instrument(skip(self))]
    async fn cardinality(&self, key: &str) -> Result<usize, Self::Error> {
        let mut connection = self.connection.clone();
        self.run("SCARD", connection.scard::<_, usize>(key)).await
    }

    #[instrument(skip(self))]
    async fn exists(&self, key: &str) -> Result<bool, Self::Error> {
        let mut connection = self.connection.clone();
        self.run("EXISTS", connection.exists::<_, bool>(key)).await
    }

    #[instrument(skip(self))]
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, Self::Error> {
        let mut connection = self.connection.clone();
        self.run(
            "PEXPIRE",
            connection.pexpire::<_, bool>(key, ttl_millis(ttl)),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn is_member(&self, key: &str, member: &str) -> Result<bool, Self::Error> {
        let mut connection = self.connection.clone();
        self.run("SISMEMBER", connection.sismember::<_, _, bool>(key, member))
            .await
    }

    #[instrument(skip(self))]
    async fn members(&self, key: &str) -> Result<Vec<String>, Self::Error> {
        let mut connection = self.connection.clone();
        self.run("SMEMBERS", connection.smembers::<_, Vec<String>>(key))
            .await
    }

    #[instrument(skip(self, members), fields(count = members.len()))]
    async fn remove_members(&self, key: &str, members: &[String]) -> Result<usize, Self::Error> {
        if members.is_empty() {
            return Ok(0);
        }

        let mut connection = self.connection.clone();
        self.run("SREM", connection.srem::<_, _, usize>(key, members))
            .await
    }
}
