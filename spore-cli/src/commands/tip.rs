//! Tip command - show the node's tip block number.

use anyhow::Result;
use spore_client::{NodeClient, SporeConfig};

/// Print the tip block number of the configured node.
pub async fn run(config: &SporeConfig) -> Result<()> {
    let node = NodeClient::new(&config.ckb_node_url)?;
    let tip = node.get_tip_block_number().await?;
    tracing::debug!(node = node.url(), tip, "Fetched tip");
    println!("{}", tip);
    Ok(())
}
