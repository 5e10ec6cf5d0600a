use std::time::Duration;

use broker_sets::SetStoreError;
use redis::RedisError;
use thiserror::Error;

/// Errors that can occur when using the Redis set store.
#[derive(Error, Debug)]
pub enum Error {
    /// The client could not be created or the initial connection failed.
    #[error("failed to connect to redis: {0}")]
    Connect(#[source] RedisError),

    /// A command failed or returned an unexpected reply type.
    #[error("redis {command} command failed: {source}")]
    Command {
        /// The Redis command that failed.
        command: &'static str,
        /// The underlying Redis error.
        source: RedisError,
    },

    /// The operation did not complete within the configured timeout.
    #[error("redis operation timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// Check if this error is potentially recoverable with retry.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Connect(e) | Self::Command { source: e, .. } => {
                e.is_io_error() || e.is_timeout() || e.is_connection_dropped()
            }
        }
    }
}

impl SetStoreError for Error {}
