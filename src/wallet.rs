//! Wallet and contract collaborators
//!
//! The wallet is reached over its JSON-RPC endpoint through an ethers
//! provider. Account access goes through `eth_requestAccounts`; minting
//! sends a transaction signed by the wallet and waits for one confirmation.
//! There is no local timeout on that wait.

use std::time::Duration;

use ethers::abi::{self, ParamType, Token};
use ethers::prelude::*;
use ethers::utils::id;

use aichainx_protocol::api::MintModelRequest;

use crate::config::Config;
use crate::error::{MarketError, Result};

/// EIP-1193: the user rejected the request
pub const USER_REJECTED_REQUEST: i64 = 4001;
/// EIP-1193: the account is not authorized
pub const UNAUTHORIZED: i64 = 4100;

const ERROR_STRING_SIGNATURE: &str = "Error(string)";

/// Source of wallet accounts
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    /// Ask the wallet for account access; the first address is the active one
    async fn request_accounts(&self) -> Result<Vec<String>>;
}

/// A mined mint transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// Handle to a submitted transaction
#[allow(async_fn_in_trait)]
pub trait PendingMint {
    fn hash(&self) -> &str;

    /// Block until the transaction is mined
    async fn wait(self) -> Result<MintReceipt>;
}

/// The pre-deployed model registry contract
#[allow(async_fn_in_trait)]
pub trait ModelContract {
    type Pending: PendingMint;

    /// Submit `mintModel(name, description, license)` signed by `signer`
    async fn mint_model(&self, signer: &str, request: &MintModelRequest) -> Result<Self::Pending>;
}

// ============================================================================
// Calldata
// ============================================================================

/// Selector of `mintModel(string,string,string)` followed by its arguments
pub fn encode_mint_model(request: &MintModelRequest) -> Bytes {
    let mut data = id(MintModelRequest::SIGNATURE).to_vec();
    data.extend(abi::encode(&[
        Token::String(request.name.clone()),
        Token::String(request.description.clone()),
        Token::String(request.license.clone()),
    ]));
    Bytes::from(data)
}

/// Reason string of an `Error(string)` revert payload
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.len() < 4 || data[..4] != id(ERROR_STRING_SIGNATURE) {
        return None;
    }
    match abi::decode(&[ParamType::String], &data[4..]).ok()?.pop()? {
        Token::String(reason) => Some(reason),
        _ => None,
    }
}

// ============================================================================
// Error mapping
// ============================================================================

/// Keep the JSON-RPC error body when the node sent one
pub fn provider_error(err: ProviderError) -> MarketError {
    if let Some(rpc) = RpcError::as_error_response(&err) {
        return MarketError::rpc(rpc.code, rpc.message.clone(), rpc.data.clone());
    }
    MarketError::network(err.to_string())
}

/// Map transport/RPC failures of account requests to wallet errors
pub fn wallet_error(err: MarketError) -> MarketError {
    match err {
        MarketError::Rpc {
            rpc_code, message, ..
        } if rpc_code == USER_REJECTED_REQUEST => MarketError::wallet_rejected(message),
        MarketError::Rpc { rpc_code, .. } if rpc_code == UNAUTHORIZED => {
            MarketError::wallet_not_connected()
        }
        MarketError::Network { message, .. } => {
            MarketError::wallet_unavailable(format!("Wallet is not reachable: {}", message))
        }
        other => other,
    }
}

/// Map failures of a transaction submission, preferring a decoded revert reason
pub fn transaction_error(err: MarketError) -> MarketError {
    match err {
        MarketError::Rpc {
            rpc_code,
            message,
            data,
            ..
        } => {
            if let Some(reason) = data.as_ref().and_then(revert_reason) {
                return MarketError::transaction(reason);
            }
            match rpc_code {
                USER_REJECTED_REQUEST => MarketError::wallet_rejected(message),
                UNAUTHORIZED => MarketError::wallet_not_connected(),
                _ => MarketError::transaction(message),
            }
        }
        other => wallet_error(other),
    }
}

/// Revert data may be a bare hex string or nested under `data`
fn revert_reason(data: &serde_json::Value) -> Option<String> {
    match data {
        serde_json::Value::String(hex) => hex
            .parse::<Bytes>()
            .ok()
            .and_then(|bytes| decode_revert_reason(&bytes)),
        serde_json::Value::Object(map) => map.get("data").and_then(revert_reason),
        _ => None,
    }
}

fn parse_address(value: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .map_err(|_| MarketError::invalid_address(value))
}

// ============================================================================
// JSON-RPC implementations
// ============================================================================

/// Wallet reached through its JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct RpcWallet {
    provider: Provider<Http>,
}

impl RpcWallet {
    /// Fails with `WalletUnavailable` when no wallet endpoint is configured
    pub fn from_config(config: &Config) -> Result<Self> {
        let url = config.wallet_rpc_url.as_deref().ok_or_else(|| {
            MarketError::wallet_unavailable(
                "No wallet found. Start a wallet with a JSON-RPC endpoint and run \
                 'aichainx config set-wallet-rpc <url>'.",
            )
        })?;

        // Requests wait on the user approving them in the wallet.
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| {
                tracing::debug!("Invalid wallet endpoint {}: {}", url, e);
                MarketError::invalid_endpoint(url)
            })?
            .interval(Duration::from_millis(config.receipt_poll_interval_ms));

        Ok(Self { provider })
    }

    /// Contract bound to the same wallet endpoint
    pub fn contract(&self, config: &Config) -> Result<RpcModelContract> {
        Ok(RpcModelContract {
            provider: self.provider.clone(),
            address: parse_address(&config.contract_address)?,
        })
    }
}

impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        let accounts: Vec<Address> = self
            .provider
            .request("eth_requestAccounts", ())
            .await
            .map_err(|e| wallet_error(provider_error(e)))?;

        tracing::debug!("Wallet returned {} account(s)", accounts.len());
        Ok(accounts.iter().map(|a| format!("{:?}", a)).collect())
    }
}

#[derive(Debug, Clone)]
pub struct RpcModelContract {
    provider: Provider<Http>,
    address: Address,
}

impl RpcModelContract {
    pub fn address(&self) -> Address {
        self.address
    }
}

impl ModelContract for RpcModelContract {
    type Pending = RpcPendingMint;

    async fn mint_model(&self, signer: &str, request: &MintModelRequest) -> Result<Self::Pending> {
        let tx = TransactionRequest::new()
            .from(parse_address(signer)?)
            .to(self.address)
            .data(encode_mint_model(request));

        tracing::info!("Submitting mintModel for '{}' from {}", request.name, signer);
        let pending = self
            .provider
            .send_transaction(tx, None)
            .await
            .map_err(|e| transaction_error(provider_error(e)))?;
        let hash = pending.tx_hash();

        Ok(RpcPendingMint {
            provider: self.provider.clone(),
            hash,
            hash_text: format!("{:?}", hash),
        })
    }
}

#[derive(Debug)]
pub struct RpcPendingMint {
    provider: Provider<Http>,
    hash: H256,
    hash_text: String,
}

impl PendingMint for RpcPendingMint {
    fn hash(&self) -> &str {
        &self.hash_text
    }

    async fn wait(self) -> Result<MintReceipt> {
        let receipt = ethers::providers::PendingTransaction::new(self.hash, &self.provider)
            .confirmations(1)
            .await
            .map_err(|e| transaction_error(provider_error(e)))?
            .ok_or_else(|| {
                MarketError::transaction(format!("Transaction {} was dropped", self.hash_text))
            })?;

        if receipt.status != Some(U64::from(1)) {
            return Err(MarketError::transaction_reverted(
                "Transaction reverted",
                self.hash_text,
            ));
        }

        let block_number = receipt.block_number.map(|b| b.as_u64());
        tracing::info!("Transaction {} mined in block {:?}", self.hash_text, block_number);
        Ok(MintReceipt {
            tx_hash: self.hash_text,
            block_number,
        })
    }
}
