use std::time::Duration;

use crate::{ConfigError, DEFAULT_TTL, MAX_TTL, MIN_KEY_BYTES};

/// Parâmetros do store de estado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Janela em que uma entrada pode ser consumida.
    pub ttl: Duration,
    /// Bytes aleatórios por chave (antes do base64).
    pub key_bytes: usize,
}

impl StoreConfig {
    pub fn new(ttl: Duration, key_bytes: usize) -> Result<Self, ConfigError> {
        let config = Self { ttl, key_bytes };
        config.validate()?;
        Ok(config)
    }

    pub fn with_ttl(ttl: Duration) -> Result<Self, ConfigError> {
        Self::new(ttl, MIN_KEY_BYTES)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl.is_zero() {
            return Err(ConfigError::ZeroTtl);
        }
        if self.ttl > MAX_TTL {
            return Err(ConfigError::TtlTooLong(self.ttl.as_secs()));
        }
        if self.key_bytes < MIN_KEY_BYTES {
            return Err(ConfigError::WeakKey(self.key_bytes));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            key_bytes: MIN_KEY_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ten_minutes() {
        let config = StoreConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(600));
        assert_eq!(config.key_bytes, 16);
        config.validate().unwrap();
    }

    #[test]
    fn zero_ttl_rejected() {
        assert!(matches!(
            StoreConfig::with_ttl(Duration::ZERO),
            Err(ConfigError::ZeroTtl)
        ));
    }

    #[test]
    fn ttl_above_max_rejected() {
        StoreConfig::with_ttl(MAX_TTL).unwrap();
        assert!(matches!(
            StoreConfig::with_ttl(Duration::from_secs(u64::MAX)),
            Err(ConfigError::TtlTooLong(u64::MAX))
        ));
        assert!(matches!(
            StoreConfig::with_ttl(MAX_TTL + Duration::from_secs(1)),
            Err(ConfigError::TtlTooLong(_))
        ));
    }

    #[test]
    fn short_key_rejected() {
        assert!(matches!(
            StoreConfig::new(Duration::from_secs(1), 8),
            Err(ConfigError::WeakKey(8))
        ));
    }
}
