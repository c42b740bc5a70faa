//! Spore cells: the view-model and the read service.

use crate::chain::{
    ChainContext, ListResult, QueryOptions, SharedChain, collect_list, first_cell, parse_id,
};
use crate::codec::SporeData;
use crate::config::SporeConfig;
use crate::error::{ClientError, Result};
use crate::indexer::{CellQuery, Order};
use crate::types::{Cell, CellRef, JsonBytes, Script};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A spore as shown to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spore {
    /// Type script args of the spore cell.
    pub id: String,
    /// Cluster this spore claims to belong to.
    pub cluster_id: Option<String>,
    /// MIME type of the content.
    pub content_type: String,
    /// Content bytes, only kept when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<JsonBytes>,
    /// Location and scripts of the backing cell.
    pub cell: CellRef,
}

impl Spore {
    /// Project a spore cell, dropping the content unless asked for.
    pub fn from_cell(cell: &Cell, include_content: bool) -> Result<Self> {
        let id = cell
            .type_args()
            .ok_or_else(|| ClientError::decode("Spore", "cell has no type script"))?
            .to_hex();
        let data = SporeData::unpack(cell.output_data.as_bytes())?;

        Ok(Self {
            id,
            cluster_id: data
                .cluster_id
                .map(|raw| JsonBytes::new(raw).to_hex()),
            content_type: String::from_utf8_lossy(&data.content_type).into_owned(),
            content: include_content.then(|| JsonBytes::new(data.content)),
            cell: CellRef::from(cell),
        })
    }
}

/// Read-only access to Spore cells.
pub struct SporeService {
    chain: SharedChain,
}

impl SporeService {
    /// Create a service talking to the indexer in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the indexer URL is invalid.
    pub fn new(config: SporeConfig) -> Result<Self> {
        Ok(Self::with_context(ChainContext::connect(config)?))
    }

    /// Create a service over an explicit context.
    pub fn with_context(context: ChainContext) -> Self {
        Self {
            chain: SharedChain::new(context),
        }
    }

    /// Swap the configuration for subsequent calls.
    pub fn set_config(&self, config: SporeConfig) -> Result<()> {
        tracing::info!(indexer = %config.ckb_indexer_url, "Switching spore service config");
        self.chain.replace(ChainContext::connect(config)?);
        Ok(())
    }

    /// Swap the whole context for subsequent calls.
    pub fn set_context(&self, context: ChainContext) {
        self.chain.replace(context);
    }

    /// The configuration new calls will use.
    pub fn config(&self) -> SporeConfig {
        self.chain.snapshot().config().clone()
    }

    fn all_spores(context: &ChainContext) -> CellQuery {
        CellQuery::by_type(context.config().scripts.spore.with_args(JsonBytes::default()))
            .with_order(Order::Desc)
    }

    /// Fetch one spore by id.
    pub async fn get(&self, id: &str, include_content: bool) -> Result<Option<Spore>> {
        if id.is_empty() {
            return Ok(None);
        }
        let args = parse_id(id)?;
        let context = self.chain.snapshot();
        let query = CellQuery::by_type(context.config().scripts.spore.with_args(args));

        tracing::debug!(id, "Fetching spore");
        first_cell(&context, query)
            .await?
            .map(|cell| Spore::from_cell(&cell, include_content))
            .transpose()
    }

    /// List spores newest first, keeping only those in `cluster_ids` when
    /// it is non-empty.
    pub async fn list(
        &self,
        cluster_ids: &[String],
        options: QueryOptions,
    ) -> Result<ListResult<Spore>> {
        let context = self.chain.snapshot();
        let wanted: HashSet<&str> = cluster_ids.iter().map(String::as_str).collect();

        tracing::debug!(clusters = cluster_ids.len(), ?options, "Listing spores");
        collect_list(&context, Self::all_spores(&context), &options, |cell| {
            let spore = Spore::from_cell(cell, options.include_content)?;
            let keep = wanted.is_empty()
                || spore
                    .cluster_id
                    .as_deref()
                    .is_some_and(|id| wanted.contains(id));
            Ok(keep.then_some(spore))
        })
        .await
    }

    /// List spores owned by `lock`, newest first.
    pub async fn list_by_lock(
        &self,
        lock: &Script,
        options: QueryOptions,
    ) -> Result<ListResult<Spore>> {
        let context = self.chain.snapshot();
        let query = Self::all_spores(&context).with_lock(lock.clone());

        tracing::debug!(?options, "Listing spores by lock");
        collect_list(&context, query, &options, |cell| {
            Spore::from_cell(cell, options.include_content).map(Some)
        })
        .await
    }

    /// The `limit` most recently created spores.
    pub async fn recent(&self, limit: usize, include_content: bool) -> Result<Vec<Spore>> {
        let options = QueryOptions {
            limit: Some(limit),
            include_content,
            ..QueryOptions::default()
        };
        Ok(self.list(&[], options).await?.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CellBuilder;

    #[test]
    fn from_cell_with_cluster() {
        let cell = CellBuilder::spore(&SporeConfig::testnet(), [7; 32])
            .content("text/plain", b"hi")
            .in_cluster([9; 32])
            .build();

        let spore = Spore::from_cell(&cell, true).unwrap();
        assert_eq!(spore.id, format!("0x{}", "07".repeat(32)));
        assert_eq!(spore.cluster_id, Some(format!("0x{}", "09".repeat(32))));
        assert_eq!(spore.content_type, "text/plain");
        assert_eq!(spore.content.unwrap().as_bytes(), b"hi");
    }

    #[test]
    fn from_cell_drops_content() {
        let cell = CellBuilder::spore(&SporeConfig::testnet(), [7; 32])
            .content("image/png", &[1, 2, 3])
            .build();

        let spore = Spore::from_cell(&cell, false).unwrap();
        assert!(spore.content.is_none());
        assert!(spore.cluster_id.is_none());
    }

    #[test]
    fn from_cell_without_type_script() {
        let mut cell = CellBuilder::spore(&SporeConfig::testnet(), [7; 32]).build();
        cell.output.type_ = None;
        assert!(matches!(
            Spore::from_cell(&cell, false),
            Err(ClientError::Decode { .. })
        ));
    }
}
