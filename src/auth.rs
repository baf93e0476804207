//! Sign-up and login forms, and the service behind `signup`/`login`/`logout`

use chrono::Utc;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use validator::Validate;

use aichainx_protocol::common::User;

use crate::config::Config;
use crate::error::{MarketError, Result};
use crate::identity::{HttpIdentityProvider, IdentityProvider};
use crate::shell::NavigationShell;
use crate::ui::UI;
use crate::version::format_version_info;

// ============================================================================
// Forms
// ============================================================================

/// Shared submit bookkeeping: in-flight flag and the last error
#[derive(Debug, Default)]
struct Submission {
    loading: bool,
    error: Option<MarketError>,
}

impl Submission {
    fn begin(&mut self) -> Result<()> {
        if self.loading {
            return Err(MarketError::invalid_input("A request is already in progress"));
        }
        self.loading = true;
        self.error = None;
        Ok(())
    }

    fn finish(&mut self, result: Result<User>) -> Result<User> {
        self.loading = false;
        if let Err(e) = &result {
            self.error = Some(e.clone());
        }
        result
    }

    fn reject(&mut self, err: MarketError) -> Result<User> {
        self.error = Some(err.clone());
        Err(err)
    }
}

#[derive(Debug, Default, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub confirm_password: String,
    submission: Submission,
}

impl SignupForm {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
            submission: Submission::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.submission.loading
    }

    pub fn error(&self) -> Option<&MarketError> {
        self.submission.error.as_ref()
    }

    /// One sign-up round trip. A password mismatch fails before any request.
    pub async fn submit<P: IdentityProvider + ?Sized>(&mut self, provider: &P) -> Result<User> {
        if self.password != self.confirm_password {
            return self.submission.reject(MarketError::password_mismatch());
        }
        if let Err(e) = self.validate() {
            return self.submission.reject(e.into());
        }

        self.submission.begin()?;
        let result = provider.sign_up(self.email.trim(), &self.password).await;
        self.submission.finish(result)
    }
}

#[derive(Debug, Default, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    submission: Submission,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            submission: Submission::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.submission.loading
    }

    pub fn error(&self) -> Option<&MarketError> {
        self.submission.error.as_ref()
    }

    pub async fn submit<P: IdentityProvider + ?Sized>(&mut self, provider: &P) -> Result<User> {
        if let Err(e) = self.validate() {
            return self.submission.reject(e.into());
        }

        self.submission.begin()?;
        let result = provider.sign_in(self.email.trim(), &self.password).await;
        self.submission.finish(result)
    }
}

// ============================================================================
// CLI service
// ============================================================================

/// Session status as shown by `aichainx status`
#[derive(Debug, Clone)]
pub struct StatusInfo {
    pub version: String,
    pub authenticated: bool,
    pub expired: bool,
    pub email: Option<String>,
    pub uid: Option<String>,
    pub wallet_rpc: Option<String>,
    pub chain: String,
}

pub struct AuthService {
    config: Config,
    ui: UI,
}

impl AuthService {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ui: UI::new(),
        }
    }

    /// Identity provider backed by the configured endpoint and session file
    pub fn provider(&self) -> Result<HttpIdentityProvider> {
        HttpIdentityProvider::new(self.config.clone())
    }

    /// Prompt for sign-up details; re-prompts while the form reports an error
    pub async fn signup(&self, shell: &mut NavigationShell) -> Result<User> {
        let provider = self.provider()?;
        shell.mount(&provider);
        let theme = ColorfulTheme::default();

        let mut form = SignupForm::default();
        loop {
            form.email = Input::with_theme(&theme)
                .with_prompt("Email")
                .with_initial_text(form.email.clone())
                .interact_text()?;
            form.password = Password::with_theme(&theme)
                .with_prompt("Password")
                .interact()?;
            form.confirm_password = Password::with_theme(&theme)
                .with_prompt("Confirm password")
                .interact()?;

            let spinner = crate::ui::create_spinner("Creating account...");
            let result = form.submit(&provider).await;
            spinner.finish_and_clear();

            match result {
                Ok(user) => {
                    self.ui.success(&format!("Account created for {}", user.email));
                    shell.on_auth_success();
                    return Ok(user);
                }
                Err(e) if e.is_identity_error() || e.is_validation_error() => {
                    self.ui.error(&e.reason())
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn login(&self, shell: &mut NavigationShell) -> Result<User> {
        let provider = self.provider()?;
        shell.mount(&provider);
        let theme = ColorfulTheme::default();

        let mut form = LoginForm::default();
        loop {
            form.email = Input::with_theme(&theme)
                .with_prompt("Email")
                .with_initial_text(form.email.clone())
                .interact_text()?;
            form.password = Password::with_theme(&theme)
                .with_prompt("Password")
                .interact()?;

            let spinner = crate::ui::create_spinner("Signing in...");
            let result = form.submit(&provider).await;
            spinner.finish_and_clear();

            match result {
                Ok(user) => {
                    self.ui.success(&format!("Logged in as {}", user.email));
                    shell.on_auth_success();
                    return Ok(user);
                }
                Err(e) if e.is_identity_error() || e.is_validation_error() => {
                    self.ui.error(&e.reason())
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn logout(&self, shell: &mut NavigationShell) -> Result<()> {
        let provider = self.provider()?;
        shell.mount(&provider);

        if !shell.is_authenticated() {
            self.ui.info("Not logged in");
            return Ok(());
        }

        provider.sign_out().await?;
        shell.on_logout();
        self.ui.success("Logged out");
        Ok(())
    }

    pub fn get_status(&self) -> Result<StatusInfo> {
        let provider = self.provider()?;
        let stored = provider.stored_session()?;
        let user = provider.current_user();

        Ok(StatusInfo {
            version: format_version_info(),
            authenticated: user.is_some(),
            expired: stored.as_ref().is_some_and(|s| s.is_expired(Utc::now())),
            email: user.as_ref().map(|u| u.email.clone()),
            uid: user.map(|u| u.uid),
            wallet_rpc: self.config.wallet_rpc_url.clone(),
            chain: self.config.chain_name.clone(),
        })
    }

    /// The signed-in user, or `NotAuthenticated`
    pub fn require_user(&self) -> Result<User> {
        let provider = self.provider()?;
        if let Some(user) = provider.current_user() {
            return Ok(user);
        }
        match provider.stored_session()? {
            Some(_) => Err(MarketError::session_expired()),
            None => Err(MarketError::not_authenticated()),
        }
    }
}
