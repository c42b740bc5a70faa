//! Testing utilities: an in-memory indexer and cell fixture builders.
//!
//! ```
//! use spore_client::testing::{CellBuilder, MemoryIndexer};
//! use spore_client::SporeConfig;
//!
//! let config = SporeConfig::testnet();
//! let indexer = MemoryIndexer::new();
//! indexer.insert(
//!     CellBuilder::cluster(&config, [1; 32])
//!         .cluster_data("First", "The first cluster")
//!         .build(),
//! );
//! assert_eq!(indexer.len(), 1);
//! ```

mod cells;
mod indexer;

pub use cells::{CellBuilder, default_lock};
pub use indexer::MemoryIndexer;
