//! Builders for Spore and Cluster cells.

use crate::capacity::SHANNONS_PER_CKB;
use crate::codec::{ClusterData, SporeData};
use crate::config::SporeConfig;
use crate::types::{Cell, CellOutput, H256, JsonBytes, OutPoint, Script, ScriptHashType};

/// A secp256k1-style lock with 20 bytes of args derived from `seed`.
pub fn default_lock(seed: u8) -> Script {
    Script {
        code_hash: H256([0x9b; 32]),
        hash_type: ScriptHashType::Type,
        args: JsonBytes::new(vec![seed; 20]),
    }
}

/// Builds a live cell carrying Cluster or Spore data.
#[derive(Debug, Clone)]
pub struct CellBuilder {
    id: [u8; 32],
    type_script: Script,
    lock: Script,
    capacity: u64,
    data: Vec<u8>,
    block_number: u64,
}

impl CellBuilder {
    /// A Cluster cell with the given id and placeholder data.
    pub fn cluster(config: &SporeConfig, id: [u8; 32]) -> Self {
        Self::new(config.scripts.cluster.with_args(JsonBytes::new(id.to_vec())), id)
            .cluster_data("cluster", "")
    }

    /// A Spore cell with the given id and empty text content.
    pub fn spore(config: &SporeConfig, id: [u8; 32]) -> Self {
        Self::new(config.scripts.spore.with_args(JsonBytes::new(id.to_vec())), id)
            .content("text/plain", b"")
    }

    fn new(type_script: Script, id: [u8; 32]) -> Self {
        Self {
            id,
            type_script,
            lock: default_lock(0),
            capacity: 1_000 * SHANNONS_PER_CKB,
            data: Vec::new(),
            block_number: 0,
        }
    }

    /// Replace the data with a `ClusterData` table.
    pub fn cluster_data(mut self, name: &str, description: &str) -> Self {
        self.data = ClusterData::new(name, description).pack();
        self
    }

    /// Replace the spore content, keeping any cluster id.
    pub fn content(mut self, content_type: &str, content: &[u8]) -> Self {
        let cluster_id = SporeData::unpack(&self.data)
            .ok()
            .and_then(|d| d.cluster_id);
        self.data = SporeData {
            content_type: content_type.as_bytes().to_vec(),
            content: content.to_vec(),
            cluster_id,
        }
        .pack();
        self
    }

    /// Point the spore at a cluster.
    pub fn in_cluster(mut self, cluster_id: [u8; 32]) -> Self {
        let mut data = SporeData::unpack(&self.data).unwrap_or(SporeData {
            content_type: Vec::new(),
            content: Vec::new(),
            cluster_id: None,
        });
        data.cluster_id = Some(cluster_id.to_vec());
        self.data = data.pack();
        self
    }

    /// Set raw cell data.
    pub fn raw_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Set the owner lock.
    pub fn lock(mut self, lock: Script) -> Self {
        self.lock = lock;
        self
    }

    /// Set the capacity in shannons.
    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the creating block number.
    pub fn block_number(mut self, block_number: u64) -> Self {
        self.block_number = block_number;
        self
    }

    /// Finish the cell. The creating tx hash is derived from the id.
    pub fn build(self) -> Cell {
        Cell {
            block_number: self.block_number,
            out_point: OutPoint {
                tx_hash: H256(self.id),
                index: 0,
            },
            output: CellOutput {
                capacity: self.capacity,
                lock: self.lock,
                type_: Some(self.type_script),
            },
            output_data: JsonBytes::new(self.data),
            tx_index: 0,
        }
    }
}
