//! Cluster commands - list, get, recent, and capacity margin.

use super::print_json;
use anyhow::{Result, bail};
use serde_json::json;
use spore_client::{ClusterService, QueryOptions, Script, SporeConfig, format_ckb};

/// List clusters, newest first, optionally restricted to an owner.
pub async fn list(
    config: SporeConfig,
    owner: Option<Script>,
    limit: Option<usize>,
    skip: Option<usize>,
) -> Result<()> {
    let service = ClusterService::new(config)?;
    let options = QueryOptions {
        limit,
        skip,
        ..QueryOptions::default()
    };
    tracing::info!(?limit, ?skip, owned = owner.is_some(), "Listing clusters");

    let result = match owner {
        Some(lock) => service.list_by_lock(&lock, options).await?,
        None => service.list(options).await?,
    };
    print_json(&result)
}

/// Show one cluster.
pub async fn get(config: SporeConfig, id: &str) -> Result<()> {
    let service = ClusterService::new(config)?;
    match service.get(id).await? {
        Some(cluster) => print_json(&cluster),
        None => bail!("cluster {} not found", id),
    }
}

/// Clusters of the most recent spores, with their spores attached.
pub async fn recent(config: SporeConfig, limit: usize) -> Result<()> {
    let service = ClusterService::new(config)?;
    let clusters = service.recent(limit).await?;
    tracing::info!(count = clusters.len(), "Recent clusters");
    print_json(&clusters)
}

/// Spare capacity of a cluster cell.
pub async fn margin(config: SporeConfig, id: &str) -> Result<()> {
    let service = ClusterService::new(config)?;
    let shannons = service.get_capacity_margin(id).await?;
    print_json(&json!({
        "id": id,
        "shannons": shannons,
        "ckb": format_ckb(shannons),
    }))
}
