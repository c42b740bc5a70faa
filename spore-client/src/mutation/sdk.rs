//! Seams to the collaborators that build, sign, and send transactions.
//!
//! Transaction construction lives in an external Spore SDK and signing in
//! the user's wallet. This crate only moves their opaque JSON between them.

use crate::codec::SporeData;
use crate::config::SporeConfig;
use crate::error::Result;
use crate::types::{H256, OutPoint};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors raised while running a mutation.
#[derive(Debug, Error)]
pub enum MutationError {
    /// The SDK could not build the transaction.
    #[error("{0}")]
    Sdk(String),

    /// The wallet refused or failed to sign.
    #[error("{0}")]
    Wallet(String),

    /// Broadcasting or another chain call failed.
    #[error(transparent)]
    Client(#[from] crate::error::ClientError),
}

/// A boxed future for SDK and wallet calls.
pub type SdkFuture<'a, T> =
    Pin<Box<dyn Future<Output = std::result::Result<T, MutationError>> + Send + 'a>>;

/// A boxed future for broadcasting.
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<H256>> + Send + 'a>>;

/// An unsigned transaction skeleton as produced by the SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxSkeleton(serde_json::Value);

impl TxSkeleton {
    /// Wrap SDK output.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Borrow the JSON.
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// A signed transaction ready for `send_transaction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedTransaction(serde_json::Value);

impl SignedTransaction {
    /// Wrap wallet output.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Borrow the JSON.
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Move a cell to a new owner.
#[derive(Debug, Clone)]
pub struct TransferArgs {
    /// The cell being transferred.
    pub out_point: OutPoint,
    /// Addresses paying the fee.
    pub from_infos: Vec<String>,
    /// Address of the new owner.
    pub to_address: String,
    /// Network the transaction targets.
    pub config: SporeConfig,
}

/// Melt a spore cell back into plain capacity.
#[derive(Debug, Clone)]
pub struct DestroySporeArgs {
    /// The spore cell.
    pub out_point: OutPoint,
    /// Addresses paying the fee and receiving the capacity.
    pub from_infos: Vec<String>,
    /// Network the transaction targets.
    pub config: SporeConfig,
}

/// Mint a new spore.
#[derive(Debug, Clone)]
pub struct CreateSporeArgs {
    /// Spore data to store.
    pub data: SporeData,
    /// Address of the first owner.
    pub to_address: String,
    /// Addresses paying for the cell.
    pub from_infos: Vec<String>,
    /// Network the transaction targets.
    pub config: SporeConfig,
}

/// Transaction builders of the Spore SDK.
pub trait SporeSdk: Send + Sync {
    /// Build a cluster transfer.
    fn transfer_cluster<'a>(&'a self, args: TransferArgs) -> SdkFuture<'a, TxSkeleton>;

    /// Build a spore transfer.
    fn transfer_spore<'a>(&'a self, args: TransferArgs) -> SdkFuture<'a, TxSkeleton>;

    /// Build a spore destruction.
    fn destroy_spore<'a>(&'a self, args: DestroySporeArgs) -> SdkFuture<'a, TxSkeleton>;

    /// Build a spore mint.
    fn create_spore<'a>(&'a self, args: CreateSporeArgs) -> SdkFuture<'a, TxSkeleton>;
}

/// The connected wallet.
pub trait Wallet: Send + Sync {
    /// Address of the connected account, if any.
    fn address(&self) -> Option<String>;

    /// Sign a skeleton into a complete transaction.
    fn sign_transaction<'a>(&'a self, skeleton: TxSkeleton) -> SdkFuture<'a, SignedTransaction>;
}

/// Broadcasts signed transactions.
pub trait TransactionSender: Send + Sync {
    /// Send `tx` and return its hash.
    fn send<'a>(&'a self, tx: &'a SignedTransaction) -> SendFuture<'a>;
}
