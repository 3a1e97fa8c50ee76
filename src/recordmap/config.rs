use crate::error::Result;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "recordmap.json";

/// Hash used for record identities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// Lowercase hex digest of `input`.
    pub fn hex_digest(self, input: &[u8]) -> String {
        match self {
            DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(input)),
            DigestAlgorithm::Sha512 => hex::encode(Sha512::digest(input)),
        }
    }
}

/// Engine settings, stored in `recordmap.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Digest used for cache keys
    #[serde(default)]
    pub digest: DigestAlgorithm,

    /// Treat `false` like `null` when searching and casting
    #[serde(default)]
    pub false_is_absent: bool,
}

impl EngineConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        fs::create_dir_all(config_dir)?;
        fs::write(
            config_dir.join(CONFIG_FILENAME),
            serde_json::to_string_pretty(self)?,
        )?;
        Ok(())
    }

    /// Whether `value` counts as absent.
    pub fn treats_as_absent(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Bool(false) => self.false_is_absent,
            _ => false,
        }
    }
}
