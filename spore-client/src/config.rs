//! Chain configuration: endpoints and the Spore/Cluster script ids.

use crate::error::{ClientError, Result};
use crate::types::{H256, JsonBytes, Script, ScriptHashType};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Code hash and hash type of a deployed script, without args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptId {
    /// Hash identifying the script code.
    pub code_hash: H256,
    /// How `code_hash` is interpreted.
    pub hash_type: ScriptHashType,
}

impl ScriptId {
    /// Complete this id into a script with the given args.
    pub fn with_args(&self, args: JsonBytes) -> Script {
        Script {
            code_hash: self.code_hash,
            hash_type: self.hash_type,
            args,
        }
    }
}

/// Script ids the services query for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SporeScripts {
    /// The Cluster type script.
    pub cluster: ScriptId,
    /// The Spore type script.
    pub spore: ScriptId,
}

/// Everything needed to talk to one CKB network.
///
/// # Example
///
/// ```
/// use spore_client::SporeConfig;
///
/// let config = SporeConfig::testnet();
/// assert!(config.ckb_indexer_url.starts_with("https://"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SporeConfig {
    /// CKB node JSON-RPC endpoint.
    pub ckb_node_url: String,
    /// CKB indexer JSON-RPC endpoint.
    pub ckb_indexer_url: String,
    /// Script ids.
    pub scripts: SporeScripts,
}

const TESTNET_CLUSTER_CODE_HASH: H256 = H256(hex_literal(
    "598d793defef36e2eeba54a9b45130e4ca92822e1d193671f490950c3b856080",
));
const TESTNET_SPORE_CODE_HASH: H256 = H256(hex_literal(
    "bbad126377d45f90a8ee120da988a2d7332c78ba8fd679aab478a19d6c133494",
));

impl SporeConfig {
    /// The public testnet (Aggron4) deployment.
    pub fn testnet() -> Self {
        Self {
            ckb_node_url: "https://testnet.ckb.dev/rpc".to_string(),
            ckb_indexer_url: "https://testnet.ckb.dev/indexer".to_string(),
            scripts: SporeScripts {
                cluster: ScriptId {
                    code_hash: TESTNET_CLUSTER_CODE_HASH,
                    hash_type: ScriptHashType::Data1,
                },
                spore: ScriptId {
                    code_hash: TESTNET_SPORE_CODE_HASH,
                    hash_type: ScriptHashType::Data1,
                },
            },
        }
    }

    /// Look up a predefined network by name.
    pub fn predefined(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "testnet" | "aggron4" => Some(Self::testnet()),
            _ => None,
        }
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| ClientError::Config(format!("invalid YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SPORE_NODE_URL` and `SPORE_INDEXER_URL` overrides.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = env::var("SPORE_NODE_URL") {
            self.ckb_node_url = url;
        }
        if let Ok(url) = env::var("SPORE_INDEXER_URL") {
            self.ckb_indexer_url = url;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that both endpoints are HTTP(S) URLs.
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.ckb_node_url)?;
        validate_url(&self.ckb_indexer_url)
    }
}

impl Default for SporeConfig {
    fn default() -> Self {
        Self::testnet()
    }
}

pub(crate) fn validate_url(url: &str) -> Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ClientError::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            url
        )));
    }
    Ok(())
}

/// Only usable in const items, where a bad digit fails the build.
const fn hex_literal(s: &str) -> [u8; 32] {
    const fn nibble(c: u8) -> u8 {
        match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            _ => panic!("invalid hex digit"),
        }
    }
    let bytes = s.as_bytes();
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < 32 {
        out[i] = nibble(bytes[i * 2]) << 4 | nibble(bytes[i * 2 + 1]);
        i += 1;
    }
    out
}
