//! Typed Rust client for Spore clusters and spores on Nervos CKB.
//!
//! Reads go through a CKB indexer: cells carrying the cluster or spore type
//! script are fetched page by page, decoded from their molecule data, and
//! returned as [`Cluster`] and [`Spore`] records. Writes are delegated to a
//! Spore SDK and a wallet through the traits in [`mutation`].
//!
//! # Features
//!
//! - Cluster and spore lookups by id, type, or owner lock
//! - Paged listing with skip, limit, and order
//! - Recent clusters joined with their spores
//! - Capacity margin of a cluster cell
//! - Query cache with prefix invalidation
//! - Mutation modals for transfer, destroy, and mint
//!
//! # Example
//!
//! ```no_run
//! use spore_client::{ClusterService, QueryOptions, SporeConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let clusters = ClusterService::new(SporeConfig::testnet())?;
//!
//! let recent = clusters.recent(10).await?;
//! for cluster in &recent {
//!     let spores = cluster.spores.as_deref().unwrap_or_default();
//!     println!("{} ({} spores)", cluster.name, spores.len());
//! }
//!
//! let page = clusters.list(QueryOptions::limit(20)).await?;
//! println!("scanned {} cells", page.collected);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T, ClientError>`:
//!
//! ```no_run
//! # use spore_client::{ClusterService, ClientError, SporeConfig};
//! # async fn example() -> Result<(), ClientError> {
//! # let clusters = ClusterService::new(SporeConfig::testnet())?;
//! match clusters.get("0x1234").await {
//!     Ok(Some(cluster)) => println!("Found: {}", cluster.name),
//!     Ok(None) => println!("Cluster not found"),
//!     Err(ClientError::Rpc { code, message }) => println!("Indexer error {}: {}", code, message),
//!     Err(e) => println!("Error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod capacity;
mod chain;
mod client;
mod cluster;
mod codec;
mod config;
mod error;
pub mod indexer;
pub mod mutation;
mod node;
mod query;
mod spore;
pub mod testing;
mod types;

pub use capacity::{SHANNONS_PER_CKB, capacity_margin, format_ckb, occupied_capacity};
pub use chain::{ChainContext, ListResult, QueryOptions};
pub use client::RpcClient;
pub use cluster::{Cluster, ClusterService};
pub use codec::{ClusterData, SporeData, schema};
pub use config::{ScriptId, SporeConfig, SporeScripts};
pub use error::{ClientError, Result};
pub use indexer::IndexerClient;
pub use node::NodeClient;
pub use query::{QueryClient, QueryKey};
pub use spore::{Spore, SporeService};
pub use types::{Cell, CellOutput, CellRef, H256, JsonBytes, OutPoint, Script, ScriptHashType};
