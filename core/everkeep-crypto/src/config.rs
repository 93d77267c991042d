//! Process configuration for the sealing core.

use crate::cipher::FieldCipher;
use crate::error::CryptoResult;
use crate::key::{KeyDeriver, MasterSecret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the base64 master secret.
pub const DEFAULT_MASTER_SECRET_ENV: &str = "EVERKEEP_MASTER_SECRET";

/// Configuration for field sealing and share tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealConfig {
    /// Name of the environment variable holding the master secret.
    pub master_secret_env: String,

    /// Lifetime of share tokens when the caller does not choose one (seconds).
    pub share_token_ttl_secs: u64,
}

impl Default for SealConfig {
    fn default() -> Self {
        Self {
            master_secret_env: DEFAULT_MASTER_SECRET_ENV.to_string(),
            share_token_ttl_secs: 3600, // 1 hour
        }
    }
}

impl SealConfig {
    /// Loads the master secret. Any failure here is fatal at startup.
    pub fn load_master_secret(&self) -> CryptoResult<MasterSecret> {
        MasterSecret::from_env(&self.master_secret_env)
    }

    /// Loads the master secret and wraps it in a key deriver.
    pub fn key_deriver(&self) -> CryptoResult<KeyDeriver> {
        Ok(KeyDeriver::new(self.load_master_secret()?))
    }

    /// Loads the master secret and builds a field cipher over it.
    pub fn field_cipher(&self) -> CryptoResult<FieldCipher> {
        Ok(FieldCipher::new(self.key_deriver()?))
    }

    /// Default share-token lifetime.
    pub fn share_token_ttl(&self) -> Duration {
        Duration::from_secs(self.share_token_ttl_secs)
    }
}
