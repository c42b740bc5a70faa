//! spore - command-line browser for Spore clusters and spores on CKB.

mod commands;
mod observability;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::spores::SporeListOptions;
use observability::{TracingConfig, init_tracing};
use spore_client::{Script, SporeConfig};

/// spore - browse Spore clusters and spores.
#[derive(Parser)]
#[command(name = "spore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML network configuration
    #[arg(short, long, env = "SPORE_CONFIG", global = true)]
    config: Option<String>,

    /// Predefined network used when no config file is given
    #[arg(short, long, default_value = "testnet", global = true)]
    network: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster queries
    Clusters {
        #[command(subcommand)]
        action: ClusterAction,
    },

    /// Spore queries
    Spores {
        #[command(subcommand)]
        action: SporeAction,
    },

    /// Show the node's tip block number
    Tip,

    /// Show version and network information
    Version,
}

/// Owner lock selection shared by list commands.
#[derive(clap::Args)]
struct OwnerArgs {
    /// Only cells whose lock has these args
    #[arg(long)]
    lock_args: Option<String>,

    /// Lock code hash (defaults to secp256k1-blake160)
    #[arg(long, requires = "lock_args")]
    lock_code_hash: Option<String>,

    /// Lock hash type
    #[arg(long, default_value = "type")]
    lock_hash_type: String,
}

impl OwnerArgs {
    fn lock(&self) -> Result<Option<Script>> {
        self.lock_args
            .as_deref()
            .map(|args| {
                commands::owner_lock(args, self.lock_code_hash.as_deref(), &self.lock_hash_type)
            })
            .transpose()
    }
}

#[derive(Subcommand)]
enum ClusterAction {
    /// List clusters, newest first
    List {
        #[command(flatten)]
        owner: OwnerArgs,

        /// Maximum number of clusters
        #[arg(short, long)]
        limit: Option<usize>,

        /// Number of clusters to skip
        #[arg(short, long)]
        skip: Option<usize>,
    },

    /// Show one cluster
    Get {
        /// Cluster id (0x-prefixed type args)
        id: String,
    },

    /// Clusters of the most recent spores
    Recent {
        /// Number of recent spores to consider
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Spare capacity of a cluster cell
    Margin {
        /// Cluster id (0x-prefixed type args)
        id: String,
    },
}

#[derive(Subcommand)]
enum SporeAction {
    /// List spores, newest first
    List {
        /// Only spores in this cluster (repeatable)
        #[arg(long = "cluster")]
        clusters: Vec<String>,

        #[command(flatten)]
        owner: OwnerArgs,

        /// Maximum number of spores
        #[arg(short, long)]
        limit: Option<usize>,

        /// Number of spores to skip
        #[arg(short, long)]
        skip: Option<usize>,

        /// Include content bytes
        #[arg(long)]
        content: bool,
    },

    /// Show one spore
    Get {
        /// Spore id (0x-prefixed type args)
        id: String,

        /// Include content bytes
        #[arg(long)]
        content: bool,
    },

    /// The most recently created spores
    Recent {
        /// Number of spores
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Include content bytes
        #[arg(long)]
        content: bool,
    },
}

fn load_config(path: Option<&str>, network: &str) -> Result<SporeConfig> {
    let config = match path {
        Some(path) => SporeConfig::from_yaml_file(path)?,
        None => SporeConfig::predefined(network)
            .with_context(|| format!("unknown network: {}", network))?,
    };
    Ok(config.with_env_overrides()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&TracingConfig::from_verbosity(cli.verbose))?;

    let config = load_config(cli.config.as_deref(), &cli.network)?;
    tracing::debug!(indexer = %config.ckb_indexer_url, node = %config.ckb_node_url, "Loaded config");

    match cli.command {
        Commands::Clusters { action } => match action {
            ClusterAction::List { owner, limit, skip } => {
                commands::clusters::list(config, owner.lock()?, limit, skip).await
            }
            ClusterAction::Get { id } => commands::clusters::get(config, &id).await,
            ClusterAction::Recent { limit } => commands::clusters::recent(config, limit).await,
            ClusterAction::Margin { id } => commands::clusters::margin(config, &id).await,
        },
        Commands::Spores { action } => match action {
            SporeAction::List {
                clusters,
                owner,
                limit,
                skip,
                content,
            } => {
                let options = SporeListOptions {
                    clusters,
                    owner: owner.lock()?,
                    limit,
                    skip,
                    content,
                };
                commands::spores::list(config, options).await
            }
            SporeAction::Get { id, content } => commands::spores::get(config, &id, content).await,
            SporeAction::Recent { limit, content } => {
                commands::spores::recent(config, limit, content).await
            }
        },
        Commands::Tip => commands::tip::run(&config).await,
        Commands::Version => commands::version::run(&config),
    }
}
