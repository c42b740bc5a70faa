//! In-memory `get_cells` implementation.

use crate::error::{ClientError, Result};
use crate::indexer::{CellIndexer, IndexerFuture, Order, Pagination, ScriptType, SearchKey, SearchMode};
use crate::types::{Cell, JsonBytes, Script};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Indexer over a list of cells kept in creation order.
///
/// Cursors are the big-endian position of the last returned cell within
/// the filtered, ordered result set.
#[derive(Debug, Default)]
pub struct MemoryIndexer {
    cells: RwLock<Vec<Cell>>,
    calls: AtomicUsize,
    failure: RwLock<Option<String>>,
}

impl MemoryIndexer {
    /// Create an empty indexer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an indexer holding `cells`, oldest first.
    pub fn with_cells(cells: impl IntoIterator<Item = Cell>) -> Self {
        let indexer = Self::new();
        indexer.cells.write().extend(cells);
        indexer
    }

    /// Append a cell as the newest one.
    pub fn insert(&self, cell: Cell) {
        self.cells.write().push(cell);
    }

    /// Number of cells held.
    pub fn len(&self) -> usize {
        self.cells.read().len()
    }

    /// Whether no cells are held.
    pub fn is_empty(&self) -> bool {
        self.cells.read().is_empty()
    }

    /// Number of `get_cells` calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following call fail with an RPC error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write() = Some(message.into());
    }

    fn query(
        &self,
        key: &SearchKey,
        order: Order,
        limit: u32,
        after: Option<&JsonBytes>,
    ) -> Result<Pagination<Cell>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failure.read().clone() {
            return Err(ClientError::Rpc {
                code: -1,
                message,
            });
        }

        let cells = self.cells.read();
        let mut matching: Vec<&Cell> = cells.iter().filter(|cell| matches(key, cell)).collect();
        if order == Order::Desc {
            matching.reverse();
        }

        let start = match after {
            Some(cursor) => decode_cursor(cursor)? + 1,
            None => 0,
        };
        let objects: Vec<Cell> = matching
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();
        let last = start + objects.len();
        let last_cursor = JsonBytes::new((last.saturating_sub(1) as u64).to_be_bytes().to_vec());

        Ok(Pagination {
            objects,
            last_cursor,
        })
    }
}

impl CellIndexer for MemoryIndexer {
    fn get_cells<'a>(
        &'a self,
        search_key: &'a SearchKey,
        order: Order,
        limit: u32,
        after: Option<&'a JsonBytes>,
    ) -> IndexerFuture<'a, Pagination<Cell>> {
        let result = self.query(search_key, order, limit, after);
        Box::pin(async move { result })
    }
}

fn decode_cursor(cursor: &JsonBytes) -> Result<usize> {
    let bytes: [u8; 8] = cursor
        .as_bytes()
        .try_into()
        .map_err(|_| ClientError::InvalidResponse(format!("bad cursor {}", cursor)))?;
    Ok(u64::from_be_bytes(bytes) as usize)
}

fn script_matches(pattern: &Script, script: &Script, mode: SearchMode) -> bool {
    pattern.code_hash == script.code_hash
        && pattern.hash_type == script.hash_type
        && match mode {
            SearchMode::Prefix => script.args.as_bytes().starts_with(pattern.args.as_bytes()),
            SearchMode::Exact => script.args == pattern.args,
        }
}

fn matches(key: &SearchKey, cell: &Cell) -> bool {
    let (primary, other) = match key.script_type {
        ScriptType::Lock => (Some(&cell.output.lock), cell.output.type_.as_ref()),
        ScriptType::Type => (cell.output.type_.as_ref(), Some(&cell.output.lock)),
    };
    let primary_ok =
        primary.is_some_and(|script| script_matches(&key.script, script, key.script_search_mode));
    let filter_ok = match key.filter.as_ref().and_then(|f| f.script.as_ref()) {
        Some(pattern) => other.is_some_and(|script| script_matches(pattern, script, SearchMode::Prefix)),
        None => true,
    };
    primary_ok && filter_ok
}
