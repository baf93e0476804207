//! Mock collaborators for testing

use std::sync::{Arc, Mutex};

use aichainx_protocol::api::MintModelRequest;
use aichainx_protocol::common::User;

use crate::error::{MarketError, Result};
use crate::identity::{IdentityProvider, SessionContext, SessionSubscription};
use crate::wallet::{MintReceipt, ModelContract, PendingMint, WalletProvider};

/// Identity service that accepts any credentials unless told to fail
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    session: SessionContext,
    failure: Option<String>,
    sign_up_calls: Arc<Mutex<usize>>,
    sign_in_calls: Arc<Mutex<usize>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every sign-up/sign-in fails with `message`
    pub fn failing_with(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn sign_up_calls(&self) -> usize {
        *self.sign_up_calls.lock().unwrap()
    }

    pub fn sign_in_calls(&self) -> usize {
        *self.sign_in_calls.lock().unwrap()
    }

    pub fn subscriber_count(&self) -> usize {
        self.session.subscriber_count()
    }

    fn authenticate(&self, email: &str) -> Result<User> {
        if let Some(message) = &self.failure {
            return Err(MarketError::identity(message.clone()));
        }
        let user = User {
            uid: format!("uid-{}", email),
            email: email.to_string(),
        };
        self.session.publish(Some(user.clone()));
        Ok(user)
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn subscribe(&self) -> SessionSubscription {
        self.session.subscribe()
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<User> {
        *self.sign_up_calls.lock().unwrap() += 1;
        self.authenticate(email)
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<User> {
        *self.sign_in_calls.lock().unwrap() += 1;
        self.authenticate(email)
    }

    async fn sign_out(&self) -> Result<()> {
        self.session.publish(None);
        Ok(())
    }
}

/// Wallet returning a fixed account list
#[derive(Debug, Clone)]
pub struct MockWallet {
    accounts: Option<Vec<String>>,
    requests: Arc<Mutex<usize>>,
}

impl MockWallet {
    pub fn with_accounts(accounts: &[&str]) -> Self {
        Self {
            accounts: Some(accounts.iter().map(|a| a.to_string()).collect()),
            requests: Arc::new(Mutex::new(0)),
        }
    }

    /// Behaves like a machine with no wallet installed
    pub fn unavailable() -> Self {
        Self {
            accounts: None,
            requests: Arc::new(Mutex::new(0)),
        }
    }

    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }
}

impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        *self.requests.lock().unwrap() += 1;
        self.accounts
            .clone()
            .ok_or_else(|| MarketError::wallet_unavailable("No wallet detected"))
    }
}

/// Registry contract that records every mint call
#[derive(Debug, Clone)]
pub struct MockContract {
    tx_hash: String,
    revert_reason: Option<String>,
    calls: Arc<Mutex<Vec<(String, MintModelRequest)>>>,
}

impl MockContract {
    /// Mints succeed and confirm in block 1
    pub fn confirming(tx_hash: &str) -> Self {
        Self {
            tx_hash: tx_hash.to_string(),
            revert_reason: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mints are accepted, then revert with `reason` while waiting
    pub fn reverting(tx_hash: &str, reason: &str) -> Self {
        Self {
            revert_reason: Some(reason.to_string()),
            ..Self::confirming(tx_hash)
        }
    }

    pub fn mint_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, MintModelRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[derive(Debug)]
pub struct MockPending {
    hash: String,
    revert_reason: Option<String>,
}

impl PendingMint for MockPending {
    fn hash(&self) -> &str {
        &self.hash
    }

    async fn wait(self) -> Result<MintReceipt> {
        match self.revert_reason {
            Some(reason) => Err(MarketError::transaction_reverted(reason, self.hash)),
            None => Ok(MintReceipt {
                tx_hash: self.hash,
                block_number: Some(1),
            }),
        }
    }
}

impl ModelContract for MockContract {
    type Pending = MockPending;

    async fn mint_model(&self, signer: &str, request: &MintModelRequest) -> Result<MockPending> {
        self.calls
            .lock()
            .unwrap()
            .push((signer.to_string(), request.clone()));
        Ok(MockPending {
            hash: self.tx_hash.clone(),
            revert_reason: self.revert_reason.clone(),
        })
    }
}
