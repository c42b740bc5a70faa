//! Chain types as they appear on the CKB JSON-RPC wire.
//!
//! Numbers travel as `0x`-prefixed hex strings and byte strings as
//! `0x`-prefixed hex, so every type here carries its own serde glue.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Arbitrary bytes, hex encoded with a `0x` prefix on the wire.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonBytes(Vec<u8>);

impl JsonBytes {
    /// Wrap raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Number of raw bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex representation with the `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl FromStr for JsonBytes {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| format!("hex string must start with 0x, got: {}", s))?;
        hex::decode(digits)
            .map(Self)
            .map_err(|e| format!("invalid hex {}: {}", s, e))
    }
}

impl From<&[u8]> for JsonBytes {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl From<Vec<u8>> for JsonBytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl fmt::Display for JsonBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for JsonBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonBytes({})", self.to_hex())
    }
}

impl Serialize for JsonBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for JsonBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// A 32-byte hash.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct H256(pub [u8; 32]);

impl FromStr for H256 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: JsonBytes = s.parse()?;
        let array: [u8; 32] = bytes
            .into_bytes()
            .try_into()
            .map_err(|v: Vec<u8>| format!("expected 32 bytes, got {}", v.len()))?;
        Ok(Self(array))
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self)
    }
}

impl Serialize for H256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for H256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Serde glue for `u64` values encoded as hex quantities.
pub(crate) mod hex_u64 {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#x}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(D::Error::custom)
    }

    pub fn parse(s: &str) -> Result<u64, String> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| format!("hex quantity must start with 0x, got: {}", s))?;
        u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hex quantity {}: {}", s, e))
    }
}

/// Serde glue for `u32` values encoded as hex quantities.
pub(crate) mod hex_u32 {
    use serde::de::Error as _;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#x}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = super::hex_u64::deserialize(deserializer)?;
        u32::try_from(value).map_err(D::Error::custom)
    }
}

/// How a script's `code_hash` is matched against deployed code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptHashType {
    /// Match by type script hash of the code cell.
    Type,
    /// Match by data hash, executed in VM version 0.
    Data,
    /// Match by data hash, executed in VM version 1.
    Data1,
    /// Match by data hash, executed in VM version 2.
    Data2,
}

impl FromStr for ScriptHashType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "type" => Ok(Self::Type),
            "data" => Ok(Self::Data),
            "data1" => Ok(Self::Data1),
            "data2" => Ok(Self::Data2),
            other => Err(format!("unknown hash type: {}", other)),
        }
    }
}

/// A lock or type script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script {
    /// Hash identifying the script code.
    pub code_hash: H256,
    /// How `code_hash` is interpreted.
    pub hash_type: ScriptHashType,
    /// Script arguments.
    pub args: JsonBytes,
}

impl Script {
    /// Bytes this script occupies inside a cell.
    pub fn occupied_bytes(&self) -> u64 {
        32 + 1 + self.args.len() as u64
    }
}

/// Reference to a transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// Hash of the transaction that created the cell.
    pub tx_hash: H256,
    /// Output index inside that transaction.
    #[serde(with = "hex_u32")]
    pub index: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.index)
    }
}

/// The output part of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOutput {
    /// Capacity in shannons.
    #[serde(with = "hex_u64")]
    pub capacity: u64,
    /// Owner lock script.
    pub lock: Script,
    /// Optional type script.
    #[serde(rename = "type", default)]
    pub type_: Option<Script>,
}

/// A live cell as returned by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Block that committed the creating transaction.
    #[serde(with = "hex_u64")]
    pub block_number: u64,
    /// Where the cell lives.
    pub out_point: OutPoint,
    /// Capacity and scripts.
    pub output: CellOutput,
    /// Cell data; empty when the query did not ask for data.
    #[serde(default)]
    pub output_data: JsonBytes,
    /// Position of the creating transaction inside its block.
    #[serde(with = "hex_u32")]
    pub tx_index: u32,
}

impl Cell {
    /// Type script args, which is the entity id for Spore and Cluster cells.
    pub fn type_args(&self) -> Option<&JsonBytes> {
        self.output.type_.as_ref().map(|script| &script.args)
    }
}

/// The subset of a cell kept on view-models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    /// Where the cell lives.
    pub out_point: OutPoint,
    /// Capacity and scripts.
    pub cell_output: CellOutput,
}

impl From<&Cell> for CellRef {
    fn from(cell: &Cell) -> Self {
        Self {
            out_point: cell.out_point.clone(),
            cell_output: cell.output.clone(),
        }
    }
}
