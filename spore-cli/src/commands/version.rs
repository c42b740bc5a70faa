//! Version command - show version and the active network.

use anyhow::Result;
use spore_client::SporeConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command.
pub fn run(config: &SporeConfig) -> Result<()> {
    println!("spore - Spore cluster and spore browser");
    println!();
    println!("Version:     {}", VERSION);
    println!(
        "Platform:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!();
    println!("Network:");
    println!("  node       {}", config.ckb_node_url);
    println!("  indexer    {}", config.ckb_indexer_url);
    println!("  cluster    {}", config.scripts.cluster.code_hash);
    println!("  spore      {}", config.scripts.spore.code_hash);

    Ok(())
}
