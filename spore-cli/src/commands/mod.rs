//! CLI command implementations.

pub mod clusters;
pub mod spores;
pub mod tip;
pub mod version;

use anyhow::{Context, Result};
use serde::Serialize;
use spore_client::{H256, JsonBytes, Script, ScriptHashType};

/// Code hash of the default secp256k1-blake160 lock.
const SECP256K1_CODE_HASH: &str =
    "0x9bd7e06f3ecf4be0f2fcd2188b23f1b9fcc88e5d4b65a8637b17723bbda3cce8";

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build an owner lock from `--lock-args`, optionally with another code hash.
pub fn owner_lock(args: &str, code_hash: Option<&str>, hash_type: &str) -> Result<Script> {
    let code_hash: H256 = code_hash
        .unwrap_or(SECP256K1_CODE_HASH)
        .parse()
        .map_err(anyhow::Error::msg)
        .context("invalid lock code hash")?;
    let hash_type: ScriptHashType = hash_type
        .parse()
        .map_err(anyhow::Error::msg)
        .context("invalid lock hash type")?;
    let args: JsonBytes = args
        .parse()
        .map_err(anyhow::Error::msg)
        .context("invalid lock args")?;

    Ok(Script {
        code_hash,
        hash_type,
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_lock_defaults_to_secp256k1() {
        let lock = owner_lock("0x0102", None, "type").unwrap();
        assert_eq!(lock.code_hash.to_string(), SECP256K1_CODE_HASH);
        assert_eq!(lock.hash_type, ScriptHashType::Type);
        assert_eq!(lock.args.as_bytes(), &[1, 2]);
    }

    #[test]
    fn owner_lock_rejects_bad_args() {
        assert!(owner_lock("0102", None, "type").is_err());
        assert!(owner_lock("0x01", None, "data9").is_err());
    }
}
