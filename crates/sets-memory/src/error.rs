use broker_sets::SetStoreError;
use thiserror::Error;

/// Errors that can occur in this crate.
#[derive(Clone, Debug, Error)]
#[error("Set store error")]
pub struct Error;

impl SetStoreError for Error {}
