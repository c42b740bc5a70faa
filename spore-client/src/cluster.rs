//! Cluster cells: the view-model and the read service.
//!
//! [`ClusterService`] projects on-chain Cluster cells into [`Cluster`]
//! values. It never writes; transfers and mints produce new cells through
//! the SDK and show up here on the next query.

use crate::capacity::capacity_margin;
use crate::chain::{
    ChainContext, ListResult, QueryOptions, SharedChain, collect_list, first_cell, parse_id,
};
use crate::codec::ClusterData;
use crate::config::SporeConfig;
use crate::error::{ClientError, Result};
use crate::indexer::{CellQuery, Order};
use crate::spore::{Spore, SporeService};
use crate::types::{Cell, CellRef, JsonBytes, Script};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A cluster as shown to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Type script args of the cluster cell.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Location and scripts of the backing cell.
    pub cell: CellRef,
    /// Spores joined in by [`ClusterService::recent`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spores: Option<Vec<Spore>>,
}

impl Cluster {
    /// Project a cluster cell.
    pub fn from_cell(cell: &Cell) -> Result<Self> {
        let id = cell
            .type_args()
            .ok_or_else(|| ClientError::decode("Cluster", "cell has no type script"))?
            .to_hex();
        let data = ClusterData::unpack(cell.output_data.as_bytes())?;

        Ok(Self {
            id,
            name: String::from_utf8_lossy(&data.name).into_owned(),
            description: String::from_utf8_lossy(&data.description).into_owned(),
            cell: CellRef::from(cell),
            spores: None,
        })
    }

    /// Owner lock of the cluster cell.
    pub fn owner(&self) -> &Script {
        &self.cell.cell_output.lock
    }
}

/// Read-only access to Cluster cells.
///
/// # Example
///
/// ```no_run
/// use spore_client::{ClusterService, QueryOptions, SporeConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let clusters = ClusterService::new(SporeConfig::testnet())?;
/// let page = clusters.list(QueryOptions::limit(10)).await?;
/// for cluster in page.items {
///     println!("{}: {}", cluster.id, cluster.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ClusterService {
    chain: SharedChain,
    spores: Arc<SporeService>,
}

impl ClusterService {
    /// Create a service, and its spore collaborator, for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the indexer URL is invalid.
    pub fn new(config: SporeConfig) -> Result<Self> {
        let spores = Arc::new(SporeService::new(config.clone())?);
        Ok(Self::with_context(ChainContext::connect(config)?, spores))
    }

    /// Create a service over an explicit context and spore service.
    pub fn with_context(context: ChainContext, spores: Arc<SporeService>) -> Self {
        Self {
            chain: SharedChain::new(context),
            spores,
        }
    }

    /// Swap the configuration for subsequent calls. Calls already in
    /// flight finish against the old configuration.
    ///
    /// The spore service used for joins switches along with it.
    pub fn set_config(&self, config: SporeConfig) -> Result<()> {
        tracing::info!(indexer = %config.ckb_indexer_url, "Switching cluster service config");
        self.set_context(ChainContext::connect(config)?);
        Ok(())
    }

    /// Swap the whole context, for this service and its spore service,
    /// for subsequent calls.
    pub fn set_context(&self, context: ChainContext) {
        self.spores.set_context(context.clone());
        self.chain.replace(context);
    }

    /// The configuration new calls will use.
    pub fn config(&self) -> SporeConfig {
        self.chain.snapshot().config().clone()
    }

    /// The spore service used for joins.
    pub fn spores(&self) -> &Arc<SporeService> {
        &self.spores
    }

    fn by_id(context: &ChainContext, id: &str) -> Result<CellQuery> {
        let args = parse_id(id)?;
        Ok(CellQuery::by_type(
            context.config().scripts.cluster.with_args(args),
        ))
    }

    fn all_clusters(context: &ChainContext) -> CellQuery {
        CellQuery::by_type(
            context
                .config()
                .scripts
                .cluster
                .with_args(JsonBytes::default()),
        )
        .with_order(Order::Desc)
    }

    /// Fetch one cluster by id. An empty id returns `None` without
    /// touching the indexer.
    pub async fn get(&self, id: &str) -> Result<Option<Cluster>> {
        if id.is_empty() {
            return Ok(None);
        }
        let context = self.chain.snapshot();
        let query = Self::by_id(&context, id)?;

        tracing::debug!(id, "Fetching cluster");
        first_cell(&context, query)
            .await?
            .map(|cell| Cluster::from_cell(&cell))
            .transpose()
    }

    /// Spare capacity, in shannons, of the cluster cell; zero when the
    /// cluster does not exist.
    pub async fn get_capacity_margin(&self, id: &str) -> Result<u64> {
        if id.is_empty() {
            return Ok(0);
        }
        let context = self.chain.snapshot();
        let query = Self::by_id(&context, id)?;

        Ok(first_cell(&context, query)
            .await?
            .map_or(0, |cell| capacity_margin(&cell)))
    }

    /// List clusters newest first.
    pub async fn list(&self, options: QueryOptions) -> Result<ListResult<Cluster>> {
        let context = self.chain.snapshot();

        tracing::debug!(?options, "Listing clusters");
        collect_list(&context, Self::all_clusters(&context), &options, |cell| {
            Cluster::from_cell(cell).map(Some)
        })
        .await
    }

    /// List clusters owned by `lock`, newest first.
    pub async fn list_by_lock(
        &self,
        lock: &Script,
        options: QueryOptions,
    ) -> Result<ListResult<Cluster>> {
        let context = self.chain.snapshot();
        let query = Self::all_clusters(&context).with_lock(lock.clone());

        tracing::debug!(?options, "Listing clusters by lock");
        collect_list(&context, query, &options, |cell| {
            Cluster::from_cell(cell).map(Some)
        })
        .await
    }

    /// Clusters of the `limit` most recent spores, each carrying every
    /// spore that belongs to it.
    ///
    /// Clusters come back in the order their first recent spore appears.
    /// Spores without a cluster, and cluster ids with no live cell, are
    /// skipped.
    pub async fn recent(&self, limit: usize) -> Result<Vec<Cluster>> {
        let recent_spores = self.spores.recent(limit, true).await?;

        let mut cluster_ids: Vec<String> = Vec::new();
        for id in recent_spores.into_iter().filter_map(|s| s.cluster_id) {
            if !cluster_ids.contains(&id) {
                cluster_ids.push(id);
            }
        }
        if cluster_ids.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(clusters = cluster_ids.len(), "Joining recent spores");
        let get_clusters = join_all(cluster_ids.iter().map(|id| self.get(id)));
        let get_spores = self
            .spores
            .list(&cluster_ids, QueryOptions::default());
        let (clusters, spores) = futures::join!(get_clusters, get_spores);
        let spores = spores?.items;

        let mut joined = Vec::with_capacity(cluster_ids.len());
        for cluster in clusters {
            let Some(mut cluster) = cluster? else {
                continue;
            };
            let members = spores
                .iter()
                .filter(|spore| spore.cluster_id.as_deref() == Some(cluster.id.as_str()))
                .cloned()
                .collect();
            cluster.spores = Some(members);
            joined.push(cluster);
        }
        Ok(joined)
    }
}
