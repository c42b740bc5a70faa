//! Modal lifecycle around a single mutation.
//!
//! ```text
//! Closed --open--> Open --submit--> Submitting --ok--> Closed
//!                   ^                    |
//!                   +-------error--------+
//! ```
//!
//! While `Submitting` the modal refuses to close and hides its close
//! affordances.

use super::form::FormErrors;
use super::mutations::Mutation;
use super::notify::{Notification, Notifier};
use super::sdk::{MutationError, SporeSdk, TransactionSender, Wallet};
use crate::config::SporeConfig;
use crate::query::QueryClient;
use crate::types::H256;
use parking_lot::Mutex;
use std::sync::Arc;

/// Where a modal is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    /// Not shown.
    #[default]
    Closed,
    /// Shown and accepting input.
    Open,
    /// A submission is in flight.
    Submitting,
}

/// Which dismissal affordances the modal offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalOptions {
    /// Escape closes the modal.
    pub close_on_escape: bool,
    /// A close button is drawn.
    pub with_close_button: bool,
    /// Clicking the backdrop closes the modal.
    pub close_on_click_outside: bool,
}

impl ModalOptions {
    fn for_loading(loading: bool) -> Self {
        Self {
            close_on_escape: !loading,
            with_close_button: !loading,
            close_on_click_outside: !loading,
        }
    }
}

/// How a call to [`MutationModal::submit`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The transaction was sent; the modal closed.
    Submitted(H256),
    /// The form did not validate; nothing was sent.
    Invalid(FormErrors),
    /// No wallet address, no loaded target, or the modal was not open.
    Skipped,
    /// Building, signing, or sending failed; the modal stayed open.
    Failed(String),
}

/// Collaborators a mutation needs.
#[derive(Clone)]
pub struct MutationEnv {
    /// Transaction builders.
    pub sdk: Arc<dyn SporeSdk>,
    /// Connected wallet.
    pub wallet: Arc<dyn Wallet>,
    /// Broadcast channel, usually a [`NodeClient`](crate::NodeClient).
    pub sender: Arc<dyn TransactionSender>,
    /// Cache invalidated after success.
    pub queries: Arc<QueryClient>,
    /// Where success and error toasts go.
    pub notifier: Arc<dyn Notifier>,
    /// Network passed to the SDK.
    pub config: SporeConfig,
}

/// A modal that submits one [`Mutation`].
pub struct MutationModal<M: Mutation> {
    mutation: M,
    env: MutationEnv,
    state: Mutex<ModalState>,
}

impl<M: Mutation> MutationModal<M> {
    /// Create a closed modal.
    pub fn new(mutation: M, env: MutationEnv) -> Self {
        Self {
            mutation,
            env,
            state: Mutex::new(ModalState::Closed),
        }
    }

    /// The wrapped mutation.
    pub fn mutation(&self) -> &M {
        &self.mutation
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ModalState {
        *self.state.lock()
    }

    /// Whether a submission is in flight.
    pub fn is_loading(&self) -> bool {
        self.state() == ModalState::Submitting
    }

    /// Dismissal affordances for the current state.
    pub fn options(&self) -> ModalOptions {
        ModalOptions::for_loading(self.is_loading())
    }

    /// Show the modal. Returns false if it was not closed.
    pub fn open(&self) -> bool {
        let mut state = self.state.lock();
        if *state != ModalState::Closed {
            return false;
        }
        *state = ModalState::Open;
        true
    }

    /// Hide the modal. Refused while submitting.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        if *state == ModalState::Submitting {
            tracing::debug!(title = self.mutation.title(), "Close refused while submitting");
            return false;
        }
        *state = ModalState::Closed;
        true
    }

    /// Validate, build, sign, and send.
    pub async fn submit(&self, form: M::Form) -> SubmitOutcome {
        let errors = self.mutation.validate(&form);
        if !errors.is_empty() {
            return SubmitOutcome::Invalid(errors);
        }

        let Some(address) = self.env.wallet.address() else {
            tracing::debug!(title = self.mutation.title(), "No wallet address");
            return SubmitOutcome::Skipped;
        };
        if !self.mutation.is_ready() {
            return SubmitOutcome::Skipped;
        }

        {
            let mut state = self.state.lock();
            if *state != ModalState::Open {
                return SubmitOutcome::Skipped;
            }
            *state = ModalState::Submitting;
        }

        let message = self.mutation.success_message(&form);
        match self.run(address, form).await {
            Ok(hash) => {
                for key in self.mutation.invalidates() {
                    self.env.queries.invalidate(&key);
                }
                tracing::info!(title = self.mutation.title(), tx_hash = %hash, "Mutation submitted");
                self.env.notifier.show(Notification::success(message));
                *self.state.lock() = ModalState::Closed;
                SubmitOutcome::Submitted(hash)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(title = self.mutation.title(), error = %message, "Mutation failed");
                self.env.notifier.show(Notification::error(message.clone()));
                *self.state.lock() = ModalState::Open;
                SubmitOutcome::Failed(message)
            }
        }
    }

    async fn run(&self, address: String, form: M::Form) -> Result<H256, MutationError> {
        let skeleton = self
            .mutation
            .build(self.env.sdk.as_ref(), address, form, self.env.config.clone())
            .await?;
        let signed = self.env.wallet.sign_transaction(skeleton).await?;
        Ok(self.env.sender.send(&signed).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_loading() {
        assert!(ModalOptions::for_loading(false).close_on_escape);
        let loading = ModalOptions::for_loading(true);
        assert!(!loading.close_on_escape);
        assert!(!loading.with_close_button);
        assert!(!loading.close_on_click_outside);
    }
}
