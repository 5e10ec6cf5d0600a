use std::fmt::{Display, Formatter, Result as FmtResult};

/// Store key under which a single client's subscription set lives.
///
/// The format `{environment}-broker-client-{socket_id}` is shared with other
/// broker processes reading the same store and must not change.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    /// Derives the key for `socket_id` in `environment`.
    #[must_use]
    pub fn new(environment: &str, socket_id: &str) -> Self {
        Self(format!("{environment}-broker-client-{socket_id}"))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ClientKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ClientKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<ClientKey> for String {
    fn from(key: ClientKey) -> Self {
        key.0
    }
}
