use chrono::Utc;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::path::PathBuf;

use aichainx_protocol::common::{Category, License};

use crate::auth::AuthService;
use crate::catalog::Catalog;
use crate::config::{Config, ConfigService};
use crate::dashboard::CreatorDashboard;
use crate::detail::{DetailTab, ModelDetailView};
use crate::error::{MarketError, Result};
use crate::filter::{CategoryFilter, ListingQuery, SortKey};
use crate::shell::{NavigationShell, Page};
use crate::ui::{create_spinner, UI};
use crate::wallet::{RpcWallet, WalletProvider};
use crate::wizard::{UploadWizard, WizardStep};

#[derive(Subcommand)]
pub enum Commands {
    /// Show the landing page with marketplace stats and trending models
    Home,

    /// Browse, search and sort the marketplace
    #[command(aliases = &["ls", "marketplace"])]
    Browse(BrowseArgs),

    /// Show one model
    Show(ShowArgs),

    /// Publish a model through the upload wizard and mint it on-chain
    Upload,

    /// Connect the wallet and list its accounts
    Wallet,

    /// Show a creator's models and stats
    Dashboard(DashboardArgs),

    /// Create an account
    Signup,

    /// Sign in with email and password
    Login,

    Logout,

    /// Show session and wallet status
    #[command(aliases = &["st"])]
    Status,

    /// Configure settings
    #[command(aliases = &["cfg"])]
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct BrowseArgs {
    /// Case-insensitive text matched against name and description
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// "all" or a category id (nlp, computer-vision, prediction, classification, other)
    #[arg(short, long, default_value = "all")]
    pub category: String,

    /// trending, newest, rating, price-low or price-high
    #[arg(long, default_value = "trending")]
    pub sort: String,
}

#[derive(Args)]
pub struct ShowArgs {
    pub id: String,

    /// overview, performance or integration
    #[arg(short, long, default_value = "overview")]
    pub tab: String,
}

#[derive(Args)]
pub struct DashboardArgs {
    /// Creator to show; defaults to the signed-in account
    #[arg(long)]
    pub creator: Option<String>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    Show,
    SetWalletRpc { url: String },
    ClearWalletRpc,
    SetContract { address: String },
    SetExplorer { url: String },
    SetTimeout { seconds: u64 },
    SetVerbose { enabled: String },
    Reset,
}

/// What the user picked at the bottom of a wizard step
enum StepAction {
    Next,
    Back,
    Cancel,
}

/// Dispatches commands onto shell pages
pub struct CliHandler {
    config_path: Option<PathBuf>,
    shell: NavigationShell,
    ui: UI,
}

impl CliHandler {
    pub fn with_config_path(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            shell: NavigationShell::new(),
            ui: UI::new(),
        }
    }

    async fn load_config(&self) -> Result<Config> {
        Config::load(self.config_path.as_deref()).await
    }

    pub async fn execute(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Home => self.handle_home(),
            Commands::Browse(args) => self.handle_browse(args),
            Commands::Show(args) => self.handle_show(args).await,
            Commands::Upload => self.handle_upload().await,
            Commands::Wallet => self.handle_wallet().await,
            Commands::Dashboard(args) => self.handle_dashboard(args).await,
            Commands::Signup => self.handle_signup().await,
            Commands::Login => self.handle_login().await,
            Commands::Logout => self.handle_logout().await,
            Commands::Status => self.handle_status().await,
            Commands::Config(args) => self.handle_config(args).await,
        }
    }

    fn handle_home(&mut self) -> Result<()> {
        self.shell.navigate(Page::Home);
        self.ui.render_home(&Catalog::sample(), Utc::now());
        Ok(())
    }

    fn handle_browse(&mut self, args: BrowseArgs) -> Result<()> {
        self.shell.navigate(Page::Marketplace);

        let category: CategoryFilter = args
            .category
            .parse()
            .map_err(|e| MarketError::invalid_input(format!("{}", e)))?;
        let sort = SortKey::parse(&args.sort);
        if sort.is_none() {
            self.ui.warning(&format!(
                "Unknown sort key '{}', showing catalog order",
                args.sort
            ));
        }

        let query = ListingQuery::new(args.search, category, sort);
        self.ui.render_marketplace(&Catalog::sample(), &query, Utc::now());
        Ok(())
    }

    async fn handle_show(&mut self, args: ShowArgs) -> Result<()> {
        let config = self.load_config().await?;
        let tab: DetailTab = args
            .tab
            .parse()
            .map_err(|e| MarketError::invalid_input(format!("{}", e)))?;

        self.shell.select_model(args.id.as_str());

        let catalog = Catalog::sample();
        let mut view = ModelDetailView::open(&catalog, &args.id)?;
        view.select_tab(tab);
        self.ui.render_detail(&view, Utc::now(), &config.contract_address);
        Ok(())
    }

    async fn handle_wallet(&mut self) -> Result<()> {
        let config = self.load_config().await?;
        let wallet = RpcWallet::from_config(&config)?;

        let spinner = create_spinner("Waiting for wallet approval...");
        let result = wallet.request_accounts().await;
        spinner.finish_and_clear();
        let accounts = result?;

        if accounts.is_empty() {
            return Err(MarketError::wallet_not_connected());
        }
        self.shell.set_wallet_connected(true);

        let rows = accounts
            .iter()
            .enumerate()
            .map(|(i, a)| (if i == 0 { "Active" } else { "Account" }, a.clone()))
            .collect();
        self.ui.card(&format!("Wallet · {}", config.chain_name), rows);
        Ok(())
    }

    async fn handle_dashboard(&mut self, args: DashboardArgs) -> Result<()> {
        let config = self.load_config().await?;
        self.shell.navigate(Page::Dashboard);

        let creator = match args.creator {
            Some(creator) => creator,
            None => AuthService::new(config.clone()).require_user()?.email,
        };

        let catalog = Catalog::sample();
        let dashboard = CreatorDashboard::for_creator(&catalog, &creator);
        self.ui.render_dashboard(&dashboard, &config.currency, Utc::now());
        Ok(())
    }

    async fn handle_signup(&mut self) -> Result<()> {
        let config = self.load_config().await?;
        self.shell.navigate(Page::Signup);
        AuthService::new(config).signup(&mut self.shell).await?;
        Ok(())
    }

    async fn handle_login(&mut self) -> Result<()> {
        let config = self.load_config().await?;
        self.shell.navigate(Page::Login);
        AuthService::new(config).login(&mut self.shell).await?;
        Ok(())
    }

    async fn handle_logout(&mut self) -> Result<()> {
        let config = self.load_config().await?;
        AuthService::new(config).logout(&mut self.shell).await
    }

    async fn handle_status(&mut self) -> Result<()> {
        let config = self.load_config().await?;
        let status = AuthService::new(config).get_status()?;

        let mut rows = vec![
            ("Version", status.version),
            (
                "Authentication",
                self.ui.format_auth_status(status.authenticated, status.expired),
            ),
        ];
        if status.authenticated {
            rows.push(("Email", self.ui.format_user_field(status.email)));
            rows.push(("User ID", self.ui.format_user_field(status.uid)));
        }
        rows.push(("Wallet RPC", self.ui.format_wallet_status(status.wallet_rpc.as_deref())));
        rows.push(("Network", status.chain));

        self.ui.card("Status", rows);
        Ok(())
    }

    async fn handle_config(&mut self, args: ConfigArgs) -> Result<()> {
        let config = self.load_config().await?;
        let mut service = match self.config_path.clone() {
            Some(path) => ConfigService::with_config_path(config, path),
            None => ConfigService::new(config),
        };
        service.handle_config(args.command).await
    }

    // ------------------------------------------------------------------
    // Upload wizard
    // ------------------------------------------------------------------

    async fn handle_upload(&mut self) -> Result<()> {
        let config = self.load_config().await?;
        self.shell.navigate(Page::Upload);
        let theme = ColorfulTheme::default();
        let mut wizard = UploadWizard::new(config.clone());

        loop {
            let step = wizard.step();
            self.ui.render_wizard_progress(step);

            let action = match step {
                WizardStep::File => self.prompt_file(&theme, &mut wizard)?,
                WizardStep::Details => self.prompt_details(&theme, &mut wizard)?,
                WizardStep::Pricing => self.prompt_pricing(&theme, &mut wizard, &config)?,
                WizardStep::Review => {
                    if self.review_step(&theme, &mut wizard, &config).await? {
                        return Ok(());
                    }
                    continue;
                }
            };

            match action {
                StepAction::Next => {
                    if let Err(e) = wizard.next() {
                        self.ui.error(&e.reason());
                    }
                }
                StepAction::Back => {
                    wizard.previous();
                }
                StepAction::Cancel => {
                    self.ui.info("Upload cancelled, draft discarded");
                    self.shell.navigate(Page::Home);
                    return Ok(());
                }
            }
        }
    }

    fn step_action(&self, theme: &ColorfulTheme, step: WizardStep) -> Result<StepAction> {
        let mut items = vec!["Next"];
        if step != WizardStep::File {
            items.push("Back");
        }
        items.push("Cancel");

        let choice = Select::with_theme(theme)
            .items(&items)
            .default(0)
            .interact()?;
        Ok(match items[choice] {
            "Next" => StepAction::Next,
            "Back" => StepAction::Back,
            _ => StepAction::Cancel,
        })
    }

    fn prompt_file(&self, theme: &ColorfulTheme, wizard: &mut UploadWizard) -> Result<StepAction> {
        let current = wizard
            .draft()
            .file
            .as_ref()
            .map(|f| f.path.display().to_string())
            .unwrap_or_default();
        let path: String = Input::with_theme(theme)
            .with_prompt("Model file (.pkl, .h5, .onnx, .pt up to 500 MB; empty to skip)")
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()?;

        let path = path.trim();
        if path.is_empty() {
            wizard.draft_mut().file = None;
        } else if let Err(e) = wizard.select_file(&PathBuf::from(path)) {
            self.ui.error(&e.to_string());
            return Ok(StepAction::Back);
        } else if let Some(file) = &wizard.draft().file {
            self.ui.success(&format!("{} ({} bytes, sha256 {})", file.file_name, file.size, file.sha256));
        }

        self.step_action(theme, WizardStep::File)
    }

    fn prompt_details(&self, theme: &ColorfulTheme, wizard: &mut UploadWizard) -> Result<StepAction> {
        let draft = wizard.draft_mut();

        draft.name = Input::with_theme(theme)
            .with_prompt("Model name")
            .with_initial_text(draft.name.clone())
            .allow_empty(true)
            .interact_text()?;
        draft.description = Input::with_theme(theme)
            .with_prompt("Description")
            .with_initial_text(draft.description.clone())
            .allow_empty(true)
            .interact_text()?;

        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
        let default = draft
            .category
            .and_then(|c| Category::ALL.iter().position(|x| *x == c))
            .unwrap_or(0);
        let choice = Select::with_theme(theme)
            .with_prompt("Category")
            .items(&labels)
            .default(default)
            .interact()?;
        draft.category = Some(Category::ALL[choice]);

        let tags: String = Input::with_theme(theme)
            .with_prompt("Tags (comma separated)")
            .with_initial_text(draft.tags.join(", "))
            .allow_empty(true)
            .interact_text()?;
        draft.set_tags(&tags);

        self.step_action(theme, WizardStep::Details)
    }

    fn prompt_pricing(
        &self,
        theme: &ColorfulTheme,
        wizard: &mut UploadWizard,
        config: &Config,
    ) -> Result<StepAction> {
        let draft = wizard.draft_mut();

        let labels: Vec<String> = License::ALL
            .iter()
            .map(|l| format!("{} ({})", l.label(), l.terms()))
            .collect();
        let default = draft
            .license
            .and_then(|l| License::ALL.iter().position(|x| *x == l))
            .unwrap_or(0);
        let choice = Select::with_theme(theme)
            .with_prompt("License")
            .items(&labels)
            .default(default)
            .interact()?;
        draft.license = Some(License::ALL[choice]);

        draft.price = Input::with_theme(theme)
            .with_prompt(format!("Price ({})", config.currency))
            .with_initial_text(draft.price.clone())
            .allow_empty(true)
            .interact_text()?;

        self.step_action(theme, WizardStep::Pricing)
    }

    /// Returns `true` once the wizard is finished (deployed or cancelled)
    async fn review_step(
        &mut self,
        theme: &ColorfulTheme,
        wizard: &mut UploadWizard,
        config: &Config,
    ) -> Result<bool> {
        self.ui.render_review(wizard);
        if let Some(err) = &wizard.draft().last_error {
            self.ui.error(&err.reason());
        }

        let connect = if wizard.draft().account.is_some() {
            "Reconnect wallet"
        } else {
            "Connect wallet"
        };
        let items = [connect, "Deploy", "Back", "Cancel"];
        let choice = Select::with_theme(theme)
            .items(&items)
            .default(if wizard.draft().account.is_some() { 1 } else { 0 })
            .interact()?;

        match choice {
            0 => {
                let wallet = match RpcWallet::from_config(config) {
                    Ok(wallet) => wallet,
                    Err(e) => {
                        self.ui.error(&e.reason());
                        return Ok(false);
                    }
                };
                let spinner = create_spinner("Waiting for wallet approval...");
                let result = wizard.connect_wallet(&wallet).await;
                spinner.finish_and_clear();
                match result {
                    Ok(account) => {
                        self.shell.set_wallet_connected(true);
                        self.ui.success(&format!("Connected {}", account));
                    }
                    Err(e) => {
                        if e.is_wallet_error() {
                            self.shell.set_wallet_connected(false);
                        }
                        self.ui.error(&e.reason());
                    }
                }
                Ok(false)
            }
            1 => self.deploy(wizard, config).await,
            2 => {
                wizard.previous();
                Ok(false)
            }
            _ => {
                let discard = Confirm::with_theme(theme)
                    .with_prompt("Discard this draft?")
                    .default(false)
                    .interact()?;
                if discard {
                    self.ui.info("Upload cancelled, draft discarded");
                    self.shell.navigate(Page::Home);
                }
                Ok(discard)
            }
        }
    }

    async fn deploy(&mut self, wizard: &mut UploadWizard, config: &Config) -> Result<bool> {
        // A missing account or invalid draft is recorded on the draft by the wizard
        if wizard.prepare_deploy().is_err() {
            return Ok(false);
        }
        let contract = match RpcWallet::from_config(config).and_then(|w| w.contract(config)) {
            Ok(contract) => contract,
            Err(e) => {
                wizard.draft_mut().last_error = Some(e);
                return Ok(false);
            }
        };

        let spinner = create_spinner("Confirm the transaction in your wallet...");
        let result = wizard
            .deploy_with(&contract, |hash| {
                spinner.set_message(format!("Waiting for confirmation of {}", hash));
            })
            .await;
        spinner.finish_and_clear();

        match result {
            Ok(outcome) => {
                self.ui.success("Model deployed successfully!");
                let mut rows = vec![("Transaction", outcome.tx_hash.clone())];
                if let Some(block) = outcome.block_number {
                    rows.push(("Block", block.to_string()));
                }
                rows.push(("Explorer", outcome.explorer_url.clone()));
                self.ui.card("Deployment", rows);
                self.shell.navigate(Page::Dashboard);
                Ok(true)
            }
            // The error stays on the draft and is shown on the review screen
            Err(_) => Ok(false),
        }
    }
}
