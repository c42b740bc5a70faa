//! CKB indexer access: the `get_cells` RPC and a paginating cell collector.

use crate::client::RpcClient;
use crate::error::Result;
use crate::types::{Cell, JsonBytes, Script};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Cells requested per `get_cells` round-trip unless overridden.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Which script of a cell the search key matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptType {
    /// Match the lock script.
    Lock,
    /// Match the type script.
    Type,
}

/// How script args are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Args start with the given bytes.
    #[default]
    Prefix,
    /// Args equal the given bytes.
    Exact,
}

/// Scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// Oldest first.
    #[default]
    Asc,
    /// Newest first.
    Desc,
}

/// Secondary filter applied on top of the primary script.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchKeyFilter {
    /// The other script of the cell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
}

/// The `search_key` parameter of `get_cells`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchKey {
    /// Primary script.
    pub script: Script,
    /// Whether `script` is matched as lock or type.
    pub script_type: ScriptType,
    /// Args comparison mode.
    pub script_search_mode: SearchMode,
    /// Optional secondary filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchKeyFilter>,
    /// Whether to return cell data.
    pub with_data: bool,
}

/// One page of indexer results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination<T> {
    /// Results in this page.
    pub objects: Vec<T>,
    /// Cursor to continue after this page.
    pub last_cursor: JsonBytes,
}

/// A boxed future for indexer calls.
pub type IndexerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Anything that can answer `get_cells`.
///
/// The JSON-RPC [`IndexerClient`] is the production implementation; tests
/// plug in [`crate::testing::MemoryIndexer`].
pub trait CellIndexer: Send + Sync {
    /// Fetch one page of live cells.
    fn get_cells<'a>(
        &'a self,
        search_key: &'a SearchKey,
        order: Order,
        limit: u32,
        after: Option<&'a JsonBytes>,
    ) -> IndexerFuture<'a, Pagination<Cell>>;
}

/// JSON-RPC client for a CKB indexer endpoint.
#[derive(Debug, Clone)]
pub struct IndexerClient {
    rpc: RpcClient,
}

impl IndexerClient {
    /// Create a client for the given indexer URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            rpc: RpcClient::new(url)?,
        })
    }

    /// Wrap an already configured transport.
    pub fn from_rpc(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    /// The indexer endpoint.
    pub fn url(&self) -> &str {
        self.rpc.url()
    }
}

impl CellIndexer for IndexerClient {
    fn get_cells<'a>(
        &'a self,
        search_key: &'a SearchKey,
        order: Order,
        limit: u32,
        after: Option<&'a JsonBytes>,
    ) -> IndexerFuture<'a, Pagination<Cell>> {
        Box::pin(async move {
            let limit = format!("{:#x}", limit);
            self.rpc
                .call("get_cells", (search_key, order, limit, after))
                .await
        })
    }
}

/// What to collect: an owner lock, a type script, or both.
#[derive(Debug, Clone, Default)]
pub struct CellQuery {
    /// Owner lock script.
    pub lock: Option<Script>,
    /// Type script; args are matched by prefix.
    pub type_: Option<Script>,
    /// Scan direction.
    pub order: Order,
    /// Number of matching cells to discard before yielding.
    pub skip: usize,
}

impl CellQuery {
    /// Query cells by type script.
    pub fn by_type(script: Script) -> Self {
        Self {
            type_: Some(script),
            ..Self::default()
        }
    }

    /// Restrict to cells owned by `lock`.
    pub fn with_lock(mut self, lock: Script) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Set the scan direction.
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Discard the first `skip` matches.
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Build the indexer search key. The lock, when present, is the
    /// primary script and the type script moves into the filter.
    pub fn search_key(&self) -> Option<SearchKey> {
        let (script, script_type, filter) = match (&self.lock, &self.type_) {
            (Some(lock), Some(type_)) => (
                lock.clone(),
                ScriptType::Lock,
                Some(SearchKeyFilter {
                    script: Some(type_.clone()),
                }),
            ),
            (Some(lock), None) => (lock.clone(), ScriptType::Lock, None),
            (None, Some(type_)) => (type_.clone(), ScriptType::Type, None),
            (None, None) => return None,
        };
        Some(SearchKey {
            script,
            script_type,
            script_search_mode: SearchMode::Prefix,
            filter,
            with_data: true,
        })
    }
}

/// Sequential walk over every cell matching a [`CellQuery`].
///
/// Pages are fetched lazily; callers stop pulling once they have enough.
///
/// # Example
///
/// ```no_run
/// # use spore_client::indexer::{CellCollector, CellQuery, IndexerClient, Order};
/// # use spore_client::SporeConfig;
/// # use std::sync::Arc;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SporeConfig::testnet();
/// let indexer = Arc::new(IndexerClient::new(&config.ckb_indexer_url)?);
/// let query = CellQuery::by_type(config.scripts.cluster.with_args(Default::default()))
///     .with_order(Order::Desc);
/// let mut collector = CellCollector::new(indexer, query);
/// while let Some(cell) = collector.next().await? {
///     println!("{}", cell.out_point);
/// }
/// # Ok(())
/// # }
/// ```
pub struct CellCollector {
    indexer: Arc<dyn CellIndexer>,
    search_key: Option<SearchKey>,
    order: Order,
    page_size: u32,
    to_skip: usize,
    buffer: VecDeque<Cell>,
    cursor: Option<JsonBytes>,
    exhausted: bool,
}

impl CellCollector {
    /// Create a collector for `query`.
    pub fn new(indexer: Arc<dyn CellIndexer>, query: CellQuery) -> Self {
        let search_key = query.search_key();
        Self {
            indexer,
            exhausted: search_key.is_none(),
            search_key,
            order: query.order,
            page_size: DEFAULT_PAGE_SIZE,
            to_skip: query.skip,
            buffer: VecDeque::new(),
            cursor: None,
        }
    }

    /// Override the page size used for each round-trip.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Yield the next matching cell, fetching a page if needed.
    pub async fn next(&mut self) -> Result<Option<Cell>> {
        loop {
            if let Some(cell) = self.buffer.pop_front() {
                if self.to_skip > 0 {
                    self.to_skip -= 1;
                    continue;
                }
                return Ok(Some(cell));
            }
            if self.exhausted {
                return Ok(None);
            }
            self.fetch_page().await?;
        }
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let Some(search_key) = self.search_key.as_ref() else {
            self.exhausted = true;
            return Ok(());
        };

        let page = self
            .indexer
            .get_cells(search_key, self.order, self.page_size, self.cursor.as_ref())
            .await?;

        tracing::debug!(
            fetched = page.objects.len(),
            page_size = self.page_size,
            "Fetched indexer page"
        );

        if page.objects.len() < self.page_size as usize {
            self.exhausted = true;
        }
        self.cursor = Some(page.last_cursor);
        self.buffer.extend(page.objects);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{H256, ScriptHashType};

    fn script(args: &[u8]) -> Script {
        Script {
            code_hash: H256([1; 32]),
            hash_type: ScriptHashType::Data1,
            args: JsonBytes::new(args.to_vec()),
        }
    }

    #[test]
    fn search_key_by_type() {
        let key = CellQuery::by_type(script(&[])).search_key().unwrap();
        assert_eq!(key.script_type, ScriptType::Type);
        assert!(key.filter.is_none());
        assert!(key.with_data);
    }

    #[test]
    fn search_key_lock_and_type() {
        let key = CellQuery::by_type(script(&[2]))
            .with_lock(script(&[9]))
            .search_key()
            .unwrap();
        assert_eq!(key.script_type, ScriptType::Lock);
        assert_eq!(key.script, script(&[9]));
        assert_eq!(key.filter.unwrap().script, Some(script(&[2])));
    }

    #[test]
    fn empty_query_has_no_key() {
        assert!(CellQuery::default().search_key().is_none());
    }

    #[test]
    fn search_key_wire_format() {
        let key = CellQuery::by_type(script(&[0xab])).search_key().unwrap();
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json["script_type"], "type");
        assert_eq!(json["script_search_mode"], "prefix");
        assert_eq!(json["script"]["args"], "0xab");
        assert!(json.get("filter").is_none());
        assert_eq!(serde_json::to_value(Order::Desc).unwrap(), "desc");
    }
}
