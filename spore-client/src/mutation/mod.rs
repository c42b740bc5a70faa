//! Write paths: transfer, destroy, and mint.
//!
//! Each write runs inside a [`MutationModal`], which validates the form,
//! asks the [`SporeSdk`] for a transaction, has the [`Wallet`] sign it, sends
//! it, then invalidates the affected queries and shows a notification.

mod form;
mod modal;
mod mutations;
mod notify;
mod sdk;

pub use form::{FormErrors, MintForm, TransferForm, is_not_empty, truncate_middle};
pub use modal::{ModalOptions, ModalState, MutationEnv, MutationModal, SubmitOutcome};
pub use mutations::{DestroySpore, MintSpore, Mutation, TransferCluster, TransferSpore};
pub use notify::{Notification, NotificationKind, Notifier, RecordingNotifier, TracingNotifier};
pub use sdk::{
    CreateSporeArgs, DestroySporeArgs, MutationError, SdkFuture, SendFuture, SignedTransaction,
    SporeSdk, TransactionSender, TransferArgs, TxSkeleton, Wallet,
};
