use serde::{Deserialize, Serialize};

/// Process-wide settings shared by every `SubscriptionStore`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct SubscriptionConfig {
    /// Deployment environment name; prefixes every client key.
    pub environment: String,
}

impl SubscriptionConfig {
    /// Creates a config for the given environment.
    #[must_use]
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_toml() {
        let config: SubscriptionConfig = toml::from_str(r#"environment = "sandbox""#).unwrap();

        assert_eq!(config, SubscriptionConfig::new("sandbox"));
    }

    #[test]
    fn test_missing_environment_is_rejected() {
        assert!(toml::from_str::<SubscriptionConfig>("").is_err());
    }
}
