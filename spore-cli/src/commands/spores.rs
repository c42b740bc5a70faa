//! Spore commands - list, get, and recent.

use super::print_json;
use anyhow::{Result, bail};
use spore_client::{QueryOptions, Script, SporeConfig, SporeService};

/// Options shared by the spore listing commands.
pub struct SporeListOptions {
    /// Keep only spores in these clusters; empty means all.
    pub clusters: Vec<String>,
    /// Restrict to spores owned by this lock.
    pub owner: Option<Script>,
    /// Maximum spores to print.
    pub limit: Option<usize>,
    /// Matches to skip first.
    pub skip: Option<usize>,
    /// Include content bytes.
    pub content: bool,
}

/// List spores, newest first.
pub async fn list(config: SporeConfig, options: SporeListOptions) -> Result<()> {
    let service = SporeService::new(config)?;
    let query = QueryOptions {
        limit: options.limit,
        skip: options.skip,
        include_content: options.content,
    };
    tracing::info!(clusters = options.clusters.len(), ?query, "Listing spores");

    let result = match &options.owner {
        Some(lock) => service.list_by_lock(lock, query).await?,
        None => service.list(&options.clusters, query).await?,
    };
    print_json(&result)
}

/// Show one spore.
pub async fn get(config: SporeConfig, id: &str, content: bool) -> Result<()> {
    let service = SporeService::new(config)?;
    match service.get(id, content).await? {
        Some(spore) => print_json(&spore),
        None => bail!("spore {} not found", id),
    }
}

/// The most recently created spores.
pub async fn recent(config: SporeConfig, limit: usize, content: bool) -> Result<()> {
    let service = SporeService::new(config)?;
    print_json(&service.recent(limit, content).await?)
}
