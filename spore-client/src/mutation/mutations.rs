//! The concrete mutations: transfer cluster, transfer spore, destroy
//! spore, and mint spore.

use super::form::{FormErrors, MintForm, TransferForm, truncate_middle};
use super::sdk::{
    CreateSporeArgs, DestroySporeArgs, MutationError, SdkFuture, SporeSdk, TransferArgs,
    TxSkeleton,
};
use crate::cluster::Cluster;
use crate::codec::SporeData;
use crate::config::SporeConfig;
use crate::error::ClientError;
use crate::query::QueryKey;
use crate::spore::Spore;
use crate::types::JsonBytes;

/// One kind of write a modal can submit.
pub trait Mutation: Send + Sync {
    /// Values the user fills in.
    type Form: Clone + Send + Sync;

    /// Modal title.
    fn title(&self) -> &'static str;

    /// Check the form before anything is sent.
    fn validate(&self, form: &Self::Form) -> FormErrors;

    /// Whether the target entity is loaded.
    fn is_ready(&self) -> bool {
        true
    }

    /// Ask the SDK for an unsigned transaction.
    fn build<'a>(
        &'a self,
        sdk: &'a dyn SporeSdk,
        from: String,
        form: Self::Form,
        config: SporeConfig,
    ) -> SdkFuture<'a, TxSkeleton>;

    /// Queries made stale by a successful submission.
    fn invalidates(&self) -> Vec<QueryKey>;

    /// Body of the success notification.
    fn success_message(&self, form: &Self::Form) -> String;
}

fn missing(entity: &str) -> SdkFuture<'static, TxSkeleton> {
    let message = format!("{} is not loaded", entity);
    Box::pin(async move { Err(MutationError::Sdk(message)) })
}

/// Hand a cluster to another address.
#[derive(Debug, Clone)]
pub struct TransferCluster {
    cluster: Option<Cluster>,
}

impl TransferCluster {
    /// Transfer `cluster`, which may still be loading.
    pub fn new(cluster: Option<Cluster>) -> Self {
        Self { cluster }
    }
}

impl Mutation for TransferCluster {
    type Form = TransferForm;

    fn title(&self) -> &'static str {
        "Transfer cluster"
    }

    fn validate(&self, form: &TransferForm) -> FormErrors {
        form.validate()
    }

    fn is_ready(&self) -> bool {
        self.cluster.is_some()
    }

    fn build<'a>(
        &'a self,
        sdk: &'a dyn SporeSdk,
        from: String,
        form: TransferForm,
        config: SporeConfig,
    ) -> SdkFuture<'a, TxSkeleton> {
        let Some(cluster) = &self.cluster else {
            return missing("cluster");
        };
        sdk.transfer_cluster(TransferArgs {
            out_point: cluster.cell.out_point.clone(),
            from_infos: vec![from],
            to_address: form.to,
            config,
        })
    }

    fn invalidates(&self) -> Vec<QueryKey> {
        let mut keys = vec![QueryKey::clusters()];
        if let Some(cluster) = &self.cluster {
            keys.push(QueryKey::cluster(&cluster.id));
        }
        keys
    }

    fn success_message(&self, form: &TransferForm) -> String {
        format!(
            "Your cluster has been transferred to {}.",
            truncate_middle(&form.to, 6)
        )
    }
}

fn spore_keys(spore: Option<&Spore>) -> Vec<QueryKey> {
    let mut keys = vec![QueryKey::spores()];
    if let Some(spore) = spore {
        keys.push(QueryKey::spore(&spore.id));
        if let Some(cluster_id) = &spore.cluster_id {
            keys.push(QueryKey::cluster(cluster_id));
        }
    }
    keys
}

/// Hand a spore to another address.
#[derive(Debug, Clone)]
pub struct TransferSpore {
    spore: Option<Spore>,
}

impl TransferSpore {
    /// Transfer `spore`, which may still be loading.
    pub fn new(spore: Option<Spore>) -> Self {
        Self { spore }
    }
}

impl Mutation for TransferSpore {
    type Form = TransferForm;

    fn title(&self) -> &'static str {
        "Transfer spore"
    }

    fn validate(&self, form: &TransferForm) -> FormErrors {
        form.validate()
    }

    fn is_ready(&self) -> bool {
        self.spore.is_some()
    }

    fn build<'a>(
        &'a self,
        sdk: &'a dyn SporeSdk,
        from: String,
        form: TransferForm,
        config: SporeConfig,
    ) -> SdkFuture<'a, TxSkeleton> {
        let Some(spore) = &self.spore else {
            return missing("spore");
        };
        sdk.transfer_spore(TransferArgs {
            out_point: spore.cell.out_point.clone(),
            from_infos: vec![from],
            to_address: form.to,
            config,
        })
    }

    fn invalidates(&self) -> Vec<QueryKey> {
        spore_keys(self.spore.as_ref())
    }

    fn success_message(&self, form: &TransferForm) -> String {
        format!(
            "Your spore has been transferred to {}.",
            truncate_middle(&form.to, 6)
        )
    }
}

/// Destroy a spore, returning its capacity to the owner.
#[derive(Debug, Clone)]
pub struct DestroySpore {
    spore: Option<Spore>,
}

impl DestroySpore {
    /// Destroy `spore`, which may still be loading.
    pub fn new(spore: Option<Spore>) -> Self {
        Self { spore }
    }
}

impl Mutation for DestroySpore {
    type Form = ();

    fn title(&self) -> &'static str {
        "Destroy spore"
    }

    fn validate(&self, _form: &()) -> FormErrors {
        FormErrors::new()
    }

    fn is_ready(&self) -> bool {
        self.spore.is_some()
    }

    fn build<'a>(
        &'a self,
        sdk: &'a dyn SporeSdk,
        from: String,
        _form: (),
        config: SporeConfig,
    ) -> SdkFuture<'a, TxSkeleton> {
        let Some(spore) = &self.spore else {
            return missing("spore");
        };
        sdk.destroy_spore(DestroySporeArgs {
            out_point: spore.cell.out_point.clone(),
            from_infos: vec![from],
            config,
        })
    }

    fn invalidates(&self) -> Vec<QueryKey> {
        spore_keys(self.spore.as_ref())
    }

    fn success_message(&self, _form: &()) -> String {
        "Your spore has been destroyed.".to_string()
    }
}

/// Mint a spore owned by the connected address, optionally into a cluster.
#[derive(Debug, Clone)]
pub struct MintSpore {
    cluster_id: Option<String>,
}

impl MintSpore {
    /// Mint into `cluster_id`, or a standalone spore when `None`.
    pub fn new(cluster_id: Option<String>) -> Self {
        Self { cluster_id }
    }
}

impl Mutation for MintSpore {
    type Form = MintForm;

    fn title(&self) -> &'static str {
        "Mint spore"
    }

    fn validate(&self, form: &MintForm) -> FormErrors {
        form.validate()
    }

    fn build<'a>(
        &'a self,
        sdk: &'a dyn SporeSdk,
        from: String,
        form: MintForm,
        config: SporeConfig,
    ) -> SdkFuture<'a, TxSkeleton> {
        let cluster_id = match self.cluster_id.as_deref().map(str::parse::<JsonBytes>) {
            None => None,
            Some(Ok(id)) => Some(id.into_bytes()),
            Some(Err(e)) => {
                let error = ClientError::InvalidArgument(format!("invalid cluster id: {}", e));
                return Box::pin(async move { Err(MutationError::Client(error)) });
            }
        };
        sdk.create_spore(CreateSporeArgs {
            data: SporeData {
                content_type: form.content_type.into_bytes(),
                content: form.content,
                cluster_id,
            },
            to_address: from.clone(),
            from_infos: vec![from],
            config,
        })
    }

    fn invalidates(&self) -> Vec<QueryKey> {
        let mut keys = vec![QueryKey::spores()];
        if let Some(cluster_id) = &self.cluster_id {
            keys.push(QueryKey::clusters());
            keys.push(QueryKey::cluster(cluster_id));
        }
        keys
    }

    fn success_message(&self, _form: &MintForm) -> String {
        "Your spore has been minted.".to_string()
    }
}
