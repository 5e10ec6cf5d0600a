//! Per-client routing-key subscriptions kept in a shared set store.
//!
//! Each connected broker client owns one set, keyed by its socket id, holding
//! the routing-key prefixes it is interested in. The set outlives the
//! connection: a client reconnecting under a new socket id can inherit its old
//! subscriptions with [`SubscriptionStore::resubscribe`], and abandoned sets are
//! garbage-collected by the store after [`SubscriptionStore::clear_with_timeout`].
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod config;
mod error;
mod key;

pub use config::SubscriptionConfig;
pub use error::{Error, Result};
pub use key::ClientKey;

use std::time::Duration;

use broker_sets::SetStore;
use tracing::{debug, warn};

/// How long an abandoned subscription set survives before the store drops it.
pub const CLEAR_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Subscription set of a single client connection.
#[derive(Clone, Debug)]
pub struct SubscriptionStore<S: SetStore> {
    environment: String,
    key: ClientKey,
    socket_id: String,
    store: S,
}

impl<S> SubscriptionStore<S>
where
    S: SetStore,
{
    /// Creates the subscription store for `socket_id` on a connected set store.
    pub fn new(config: &SubscriptionConfig, socket_id: impl Into<String>, store: S) -> Self {
        let socket_id = socket_id.into();
        let key = ClientKey::new(&config.environment, &socket_id);

        Self {
            environment: config.environment.clone(),
            key,
            socket_id,
            store,
        }
    }

    /// Returns the store key of this client's set.
    #[must_use]
    pub const fn key(&self) -> &ClientKey {
        &self.key
    }

    /// Returns the socket id this store was created for.
    #[must_use]
    pub fn socket_id(&self) -> &str {
        &self.socket_id
    }

    /// Adds routing-key prefixes to the client's set.
    ///
    /// Prefixes that are already subscribed are not an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store command fails.
    pub async fn subscribe<I, P>(&self, routing_key_prefixes: I) -> Result<(), S::Error>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let prefixes: Vec<String> = routing_key_prefixes.into_iter().map(Into::into).collect();
        if prefixes.is_empty() {
            return Ok(());
        }

        let added = self
            .store
            .add_members(self.key.as_str(), &prefixes)
            .await
            .map_err(Error::Store)?;

        debug!(key = %self.key, requested = prefixes.len(), added, "subscribed");

        Ok(())
    }

    /// Removes routing-key prefixes from the client's set.
    ///
    /// Prefixes that are not subscribed are not an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store command fails.
    pub async fn unsubscribe<I, P>(&self, routing_key_prefixes: I) -> Result<(), S::Error>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let prefixes: Vec<String> = routing_key_prefixes.into_iter().map(Into::into).collect();
        if prefixes.is_empty() {
            return Ok(());
        }

        let removed = self
            .store
            .remove_members(self.key.as_str(), &prefixes)
            .await
            .map_err(Error::Store)?;

        debug!(key = %self.key, requested = prefixes.len(), removed, "unsubscribed");

        Ok(())
    }

    /// Checks whether the client is subscribed to `routing_key_prefix`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store command fails.
    pub async fn has(&self, routing_key_prefix: &str) -> Result<bool, S::Error> {
        self.store
            .is_member(self.key.as_str(), routing_key_prefix)
            .await
            .map_err(Error::Store)
    }

    /// Calls `visit` with every subscribed prefix, in no particular order,
    /// until it returns `false`.
    ///
    /// The whole set is fetched before the first call.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store command fails.
    pub async fn each<F>(&self, mut visit: F) -> Result<(), S::Error>
    where
        F: FnMut(&str) -> bool,
    {
        for prefix in self.members().await? {
            if !visit(&prefix) {
                break;
            }
        }

        Ok(())
    }

    /// Returns every subscribed prefix, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store command fails.
    pub async fn members(&self) -> Result<Vec<String>, S::Error> {
        self.store
            .members(self.key.as_str())
            .await
            .map_err(Error::Store)
    }

    /// Returns the number of subscribed prefixes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store command fails.
    pub async fn len(&self) -> Result<usize, S::Error> {
        self.store
            .cardinality(self.key.as_str())
            .await
            .map_err(Error::Store)
    }

    /// Returns whether the client has no subscriptions.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store command fails.
    pub async fn is_empty(&self) -> Result<bool, S::Error> {
        Ok(self.len().await? == 0)
    }

    /// Copies the subscriptions of a previous connection into this one.
    ///
    /// Returns `Ok(false)` without touching this client's set if the previous
    /// connection has no set in the store.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if any store command fails.
    pub async fn resubscribe(&self, previous_socket_id: &str) -> Result<bool, S::Error> {
        let source = ClientKey::new(&self.environment, previous_socket_id);

        if !self
            .store
            .exists(source.as_str())
            .await
            .map_err(Error::Store)?
        {
            debug!(key = %self.key, source = %source, "nothing to resubscribe");
            return Ok(false);
        }

        let prefixes = self
            .store
            .members(source.as_str())
            .await
            .map_err(Error::Store)?;

        debug!(key = %self.key, source = %source, count = prefixes.len(), "resubscribing");

        self.subscribe(prefixes).await?;

        Ok(true)
    }

    /// Schedules the client's set for removal after [`CLEAR_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns `Error::ExpirationNotSet` if the client has no set in the store,
    /// or `Error::Store` if the store command fails.
    pub async fn clear_with_timeout(&self) -> Result<(), S::Error> {
        let applied = self
            .store
            .expire(self.key.as_str(), CLEAR_TIMEOUT)
            .await
            .map_err(Error::Store)?;

        if !applied {
            warn!(key = %self.key, "no subscription set to expire");
            return Err(Error::ExpirationNotSet {
                key: self.key.to_string(),
            });
        }

        debug!(key = %self.key, timeout = ?CLEAR_TIMEOUT, "subscription set will expire");

        Ok(())
    }
}
