use broker_sets::SetStoreError;
use thiserror::Error;

/// Convenience alias for results returned by `SubscriptionStore`.
pub type Result<T, SE> = std::result::Result<T, Error<SE>>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error<SE>
where
    SE: SetStoreError,
{
    /// The set store failed to connect or to execute a command.
    #[error(transparent)]
    Store(SE),

    /// A timeout was requested for a client that has no subscription set.
    #[error("timeout could not be set: no subscription set at {key}")]
    ExpirationNotSet {
        /// The key that was expected to exist.
        key: String,
    },
}
