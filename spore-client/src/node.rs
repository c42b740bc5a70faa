//! CKB node RPC: chain tip and transaction broadcast.

use crate::client::RpcClient;
use crate::error::{ClientError, Result};
use crate::mutation::{SendFuture, SignedTransaction, TransactionSender};
use crate::types::{H256, hex_u64};

/// JSON-RPC client for a CKB node endpoint.
#[derive(Debug, Clone)]
pub struct NodeClient {
    rpc: RpcClient,
}

impl NodeClient {
    /// Create a client for the given node URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            rpc: RpcClient::new(url)?,
        })
    }

    /// The node endpoint.
    pub fn url(&self) -> &str {
        self.rpc.url()
    }

    /// Current tip block number.
    pub async fn get_tip_block_number(&self) -> Result<u64> {
        let tip: String = self
            .rpc
            .call("get_tip_block_number", Vec::<()>::new())
            .await?;
        hex_u64::parse(&tip).map_err(ClientError::InvalidResponse)
    }

    /// Broadcast a signed transaction and return its hash.
    ///
    /// Outputs are not validated by the node (`passthrough`), matching what
    /// wallets do for scripts the node does not know about.
    pub async fn send_transaction(&self, tx: &SignedTransaction) -> Result<H256> {
        let hash: H256 = self
            .rpc
            .call("send_transaction", (tx.as_json(), "passthrough"))
            .await?;
        tracing::info!(tx_hash = %hash, "Transaction sent");
        Ok(hash)
    }
}

impl TransactionSender for NodeClient {
    fn send<'a>(&'a self, tx: &'a SignedTransaction) -> SendFuture<'a> {
        Box::pin(self.send_transaction(tx))
    }
}
