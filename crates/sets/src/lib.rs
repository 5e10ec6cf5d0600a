//! Abstract interface for shared stores holding set-typed values.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::error::Error;
use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

/// Marker trait for `SetStore` errors
pub trait SetStoreError: Debug + Error + Send + Sync + 'static {}

/// A trait representing a shared key-value store whose values are unordered
/// sets of strings, with asynchronous operations.
///
/// Every method maps to exactly one store command and is atomic with respect to
/// other commands on the same key. Sets are created implicitly by the first
/// `add_members` and cease to exist once they become empty or expire.
#[async_trait]
pub trait SetStore: Clone + Send + Sync + 'static {
    /// The error type for set operations.
    type Error: SetStoreError;

    /// Adds `members` to the set at `key`, returning how many were not already
    /// present. An empty slice issues no command and returns 0.
    async fn add_members(&self, key: &str, members: &[String]) -> Result<usize, Self::Error>;

    /// Returns the number of members of the set at `key` (0 if absent).
    async fn cardinality(&self, key: &str) -> Result<usize, Self::Error>;

    /// Returns whether `key` currently exists in the store.
    async fn exists(&self, key: &str) -> Result<bool, Self::Error>;

    /// Sets a time-to-live on `key`.
    ///
    /// Returns `false` if there was no such key to expire.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, Self::Error>;

    /// Checks whether `member` belongs to the set at `key`.
    async fn is_member(&self, key: &str, member: &str) -> Result<bool, Self::Error>;

    /// Returns every member of the set at `key`, in no particular order.
    async fn members(&self, key: &str) -> Result<Vec<String>, Self::Error>;

    /// Removes `members` from the set at `key`, returning how many were
    /// actually present. An empty slice issues no command and returns 0.
    async fn remove_members(&self, key: &str, members: &[String]) -> Result<usize, Self::Error>;
}
