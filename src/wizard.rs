//! Upload wizard
//!
//! Four linear steps (file, details, pricing, review) collect a draft listing.
//! Moving forward validates the step being left; moving back never does.
//! From the review step the draft is minted through the contract collaborator
//! under the connected wallet account. Every failure is recorded on the draft
//! and leaves the entered fields untouched.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

use aichainx_protocol::api::MintModelRequest;
use aichainx_protocol::common::{Category, License};

use crate::config::Config;
use crate::error::{MarketError, Result};
use crate::wallet::{ModelContract, PendingMint, WalletProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    File = 1,
    Details = 2,
    Pricing = 3,
    Review = 4,
}

impl WizardStep {
    pub const COUNT: u8 = 4;

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::File => "Upload Model",
            WizardStep::Details => "Model Details",
            WizardStep::Pricing => "Pricing & License",
            WizardStep::Review => "Review & Deploy",
        }
    }

    fn next(self) -> Self {
        match self {
            WizardStep::File => WizardStep::Details,
            WizardStep::Details => WizardStep::Pricing,
            WizardStep::Pricing | WizardStep::Review => WizardStep::Review,
        }
    }

    fn previous(self) -> Self {
        match self {
            WizardStep::File | WizardStep::Details => WizardStep::File,
            WizardStep::Pricing => WizardStep::Details,
            WizardStep::Review => WizardStep::Pricing,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}/{}: {}", self.number(), Self::COUNT, self.title())
    }
}

/// Accepted model artifact extensions, compared case-insensitively
pub const MODEL_FILE_EXTENSIONS: &[&str] = &["pkl", "h5", "onnx", "pt"];

pub const MAX_MODEL_FILE_BYTES: u64 = 500 * 1024 * 1024;

/// Model artifact picked in the first step; only its metadata is kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFileRef {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    /// Hex SHA-256 of the file contents
    pub sha256: String,
}

impl ModelFileRef {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if !MODEL_FILE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(MarketError::validation_field(
                format!(
                    "Unsupported model file {}; expected one of .{}",
                    path.display(),
                    MODEL_FILE_EXTENSIONS.join(", .")
                ),
                "file",
            ));
        }

        let file = File::open(path)
            .map_err(|e| MarketError::io_from_error(format!("Cannot open {}", path.display()), e))?;
        let size = file.metadata()?.len();
        if size > MAX_MODEL_FILE_BYTES {
            return Err(MarketError::validation_field(
                format!(
                    "Model file is {} bytes; the limit is {} MB",
                    size,
                    MAX_MODEL_FILE_BYTES / (1024 * 1024)
                ),
                "file",
            ));
        }

        let mut reader = BufReader::new(file);
        let mut hasher = Sha256::new();
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size,
            sha256: hex::encode(hasher.finalize()),
        })
    }
}

/// Candidate listing being edited in the wizard
#[derive(Debug, Clone)]
pub struct UploadDraft {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: Option<Category>,
    pub tags: Vec<String>,
    /// Price as typed; parsed when leaving the pricing step
    pub price: String,
    pub license: Option<License>,
    pub file: Option<ModelFileRef>,
    pub current_step: WizardStep,
    pub account: Option<String>,
    pub last_tx_hash: Option<String>,
    pub last_error: Option<MarketError>,
}

impl Default for UploadDraft {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            description: String::new(),
            category: None,
            tags: Vec::new(),
            price: String::new(),
            license: Some(License::SingleUse),
            file: None,
            current_step: WizardStep::File,
            account: None,
            last_tx_hash: None,
            last_error: None,
        }
    }
}

impl UploadDraft {
    /// Comma-separated tags; blanks dropped
    pub fn set_tags(&mut self, text: &str) {
        self.tags = text
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }

    /// Non-negative decimal amount
    pub fn price_amount(&self) -> Result<Decimal> {
        let text = self.price.trim();
        if text.is_empty() {
            return Err(MarketError::validation_field("Price is required", "price"));
        }
        let amount = Decimal::from_str(text).map_err(|_| {
            MarketError::validation_field(format!("'{}' is not a number", text), "price")
        })?;
        if amount.is_sign_negative() {
            return Err(MarketError::validation_field("Price cannot be negative", "price"));
        }
        Ok(amount)
    }

    /// Arguments of the mint call
    pub fn mint_request(&self) -> MintModelRequest {
        MintModelRequest {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            license: self.license.map(|l| l.id().to_string()).unwrap_or_default(),
        }
    }

    fn validate_details(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MarketError::validation_field("Model name is required", "name"));
        }
        if self.description.trim().is_empty() {
            return Err(MarketError::validation_field("Description is required", "description"));
        }
        if self.category.is_none() {
            return Err(MarketError::validation_field("Select a category", "category"));
        }
        Ok(())
    }

    fn validate_pricing(&self) -> Result<()> {
        if self.license.is_none() {
            return Err(MarketError::validation_field("Select a license", "license"));
        }
        self.price_amount().map(|_| ())
    }

    /// Check what must hold before leaving `step`
    pub fn validate_step(&self, step: WizardStep) -> Result<()> {
        match step {
            WizardStep::File => Ok(()),
            WizardStep::Details => self.validate_details(),
            WizardStep::Pricing => self.validate_pricing(),
            WizardStep::Review => Ok(()),
        }
    }
}

/// Result of a confirmed mint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub tx_hash: String,
    pub explorer_url: String,
    pub block_number: Option<u64>,
}

/// Owns one draft for the lifetime of an upload session
#[derive(Debug)]
pub struct UploadWizard {
    draft: UploadDraft,
    config: Config,
    submitting: bool,
}

impl UploadWizard {
    pub fn new(config: Config) -> Self {
        Self {
            draft: UploadDraft::default(),
            config,
            submitting: false,
        }
    }

    pub fn draft(&self) -> &UploadDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut UploadDraft {
        &mut self.draft
    }

    pub fn step(&self) -> WizardStep {
        self.draft.current_step
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn fail<T>(&mut self, err: MarketError) -> Result<T> {
        tracing::debug!("Wizard error at step {}: {}", self.step().number(), err);
        self.draft.last_error = Some(err.clone());
        Err(err)
    }

    /// Advance one step after validating the current one. A no-op on review,
    /// where the forward action is [`UploadWizard::deploy`].
    pub fn next(&mut self) -> Result<WizardStep> {
        let step = self.step();
        if step == WizardStep::Review {
            return Ok(step);
        }
        if let Err(e) = self.draft.validate_step(step) {
            return self.fail(e);
        }

        self.draft.last_error = None;
        self.draft.current_step = step.next();
        tracing::debug!("Wizard moved to step {}", self.step().number());
        Ok(self.step())
    }

    /// Go back one step; a no-op on the first step
    pub fn previous(&mut self) -> WizardStep {
        self.draft.current_step = self.step().previous();
        self.step()
    }

    pub fn select_file(&mut self, path: &Path) -> Result<()> {
        match ModelFileRef::from_path(path) {
            Ok(file) => {
                self.draft.file = Some(file);
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Ask the wallet for accounts and keep the first one
    pub async fn connect_wallet<W: WalletProvider + ?Sized>(&mut self, wallet: &W) -> Result<String> {
        let accounts = match wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => return self.fail(e),
        };

        match accounts.into_iter().next() {
            Some(account) => {
                tracing::info!("Wallet connected: {}", account);
                self.draft.account = Some(account.clone());
                self.draft.last_error = None;
                Ok(account)
            }
            None => self.fail(MarketError::wallet_not_connected()),
        }
    }

    /// Check everything a deploy needs short of the contract itself, so a
    /// missing account is reported before any wallet endpoint is touched.
    pub fn prepare_deploy(&mut self) -> Result<(String, MintModelRequest)> {
        if self.step() != WizardStep::Review {
            return self.fail(MarketError::invalid_input(
                "Deploy is only available on the review step",
            ));
        }
        if self.submitting {
            return self.fail(MarketError::invalid_input("A deployment is already in progress"));
        }

        let Some(account) = self.draft.account.clone() else {
            return self.fail(MarketError::wallet_not_connected());
        };

        let request = self.draft.mint_request();
        if let Err(e) = request.validate() {
            return self.fail(e.into());
        }
        Ok((account, request))
    }

    pub async fn deploy<C: ModelContract + ?Sized>(&mut self, contract: &C) -> Result<DeployOutcome> {
        self.deploy_with(contract, |_| {}).await
    }

    /// Mint the draft. `on_submitted` sees the hash before the confirmation wait.
    pub async fn deploy_with<C, F>(&mut self, contract: &C, on_submitted: F) -> Result<DeployOutcome>
    where
        C: ModelContract + ?Sized,
        F: FnOnce(&str),
    {
        let (account, request) = self.prepare_deploy()?;

        self.submitting = true;
        self.draft.last_error = None;
        let result = self.submit(contract, &account, &request, on_submitted).await;
        self.submitting = false;

        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => self.fail(e),
        }
    }

    async fn submit<C, F>(
        &mut self,
        contract: &C,
        account: &str,
        request: &MintModelRequest,
        on_submitted: F,
    ) -> Result<DeployOutcome>
    where
        C: ModelContract + ?Sized,
        F: FnOnce(&str),
    {
        let pending = contract.mint_model(account, request).await?;
        let tx_hash = pending.hash().to_string();
        self.draft.last_tx_hash = Some(tx_hash.clone());
        tracing::info!("Mint transaction submitted: {}", tx_hash);
        on_submitted(&tx_hash);

        let receipt = pending.wait().await?;

        Ok(DeployOutcome {
            explorer_url: self.config.explorer_tx_url(&tx_hash),
            block_number: receipt.block_number,
            tx_hash,
        })
    }

    /// Rows of the review screen
    pub fn review(&self) -> Vec<(&'static str, String)> {
        let d = &self.draft;
        let or_dash = |s: &str| {
            if s.trim().is_empty() {
                "-".to_string()
            } else {
                s.trim().to_string()
            }
        };

        vec![
            (
                "File",
                d.file
                    .as_ref()
                    .map(|f| format!("{} ({} bytes)", f.file_name, f.size))
                    .unwrap_or_else(|| "No file selected".to_string()),
            ),
            ("Name", or_dash(&d.name)),
            ("Description", or_dash(&d.description)),
            (
                "Category",
                d.category.map(|c| c.label().to_string()).unwrap_or_else(|| "-".to_string()),
            ),
            (
                "Tags",
                if d.tags.is_empty() { "-".to_string() } else { d.tags.join(", ") },
            ),
            (
                "Price",
                match d.price_amount() {
                    Ok(amount) => format!("{:.2} {}", amount, self.config.currency),
                    Err(_) => or_dash(&d.price),
                },
            ),
            (
                "License",
                d.license.map(|l| l.label().to_string()).unwrap_or_else(|| "-".to_string()),
            ),
            (
                "Wallet",
                d.account.clone().unwrap_or_else(|| "Not connected".to_string()),
            ),
            ("Network", self.config.chain_name.clone()),
        ]
    }
}
