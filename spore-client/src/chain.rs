//! Per-service chain context and the shared paginated scan.

use crate::config::SporeConfig;
use crate::error::{ClientError, Result};
use crate::indexer::{CellCollector, CellIndexer, CellQuery, IndexerClient};
use crate::types::{Cell, JsonBytes};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pagination and projection options for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Matching cells to discard before collecting.
    pub skip: Option<usize>,
    /// Maximum items to return.
    pub limit: Option<usize>,
    /// Whether spore content bytes are kept on the result.
    pub include_content: bool,
}

impl QueryOptions {
    /// Options returning at most `limit` items.
    pub fn limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Skip the first `skip` matches.
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Keep spore content on the results.
    pub fn with_content(mut self) -> Self {
        self.include_content = true;
        self
    }
}

/// Items of one list query plus how many cells were scanned for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    /// Collected items.
    pub items: Vec<T>,
    /// Cells scanned, which is at least `items.len()`.
    pub collected: usize,
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            collected: 0,
        }
    }
}

/// Configuration plus the indexer it points at.
#[derive(Clone)]
pub struct ChainContext {
    config: SporeConfig,
    indexer: Arc<dyn CellIndexer>,
}

impl ChainContext {
    /// Connect to the indexer named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the indexer URL is invalid.
    pub fn connect(config: SporeConfig) -> Result<Self> {
        let indexer = IndexerClient::new(&config.ckb_indexer_url)?;
        Ok(Self::with_indexer(config, Arc::new(indexer)))
    }

    /// Use a caller-provided indexer.
    pub fn with_indexer(config: SporeConfig, indexer: Arc<dyn CellIndexer>) -> Self {
        Self { config, indexer }
    }

    /// The active configuration.
    pub fn config(&self) -> &SporeConfig {
        &self.config
    }

    /// The active indexer.
    pub fn indexer(&self) -> Arc<dyn CellIndexer> {
        Arc::clone(&self.indexer)
    }
}

/// Hot-swappable context. Each call works on the snapshot it took at
/// its start, so a swap only affects calls made afterwards.
pub(crate) struct SharedChain(RwLock<Arc<ChainContext>>);

impl SharedChain {
    pub(crate) fn new(context: ChainContext) -> Self {
        Self(RwLock::new(Arc::new(context)))
    }

    pub(crate) fn snapshot(&self) -> Arc<ChainContext> {
        self.0.read().clone()
    }

    pub(crate) fn replace(&self, context: ChainContext) {
        *self.0.write() = Arc::new(context);
    }
}

/// Parse a `0x` id into script args. Empty ids are rejected by callers
/// before they get here.
pub(crate) fn parse_id(id: &str) -> Result<JsonBytes> {
    id.parse()
        .map_err(|e| ClientError::InvalidArgument(format!("invalid id {}: {}", id, e)))
}

/// Walk `query`, projecting each cell with `project` until `limit` items
/// are kept. Cells the projection drops still count as collected.
pub(crate) async fn collect_list<T, F>(
    context: &ChainContext,
    query: CellQuery,
    options: &QueryOptions,
    mut project: F,
) -> Result<ListResult<T>>
where
    F: FnMut(&Cell) -> Result<Option<T>>,
{
    if options.limit == Some(0) {
        return Ok(ListResult::default());
    }

    let query = query.with_skip(options.skip.unwrap_or(0));
    let mut collector = CellCollector::new(context.indexer(), query);
    let mut result = ListResult::default();

    while let Some(cell) = collector.next().await? {
        result.collected += 1;
        if let Some(item) = project(&cell)? {
            result.items.push(item);
        }
        if options.limit.is_some_and(|limit| result.items.len() >= limit) {
            break;
        }
    }

    Ok(result)
}

/// First cell matching `query`, if any.
pub(crate) async fn first_cell(context: &ChainContext, query: CellQuery) -> Result<Option<Cell>> {
    CellCollector::new(context.indexer(), query).next().await
}
