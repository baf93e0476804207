//! Top-level page routing and session observation

use std::fmt;

use crate::identity::{IdentityProvider, SessionSubscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Marketplace,
    ModelDetail,
    Upload,
    Dashboard,
    Login,
    Signup,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Home => "home",
            Page::Marketplace => "marketplace",
            Page::ModelDetail => "model-detail",
            Page::Upload => "upload",
            Page::Dashboard => "dashboard",
            Page::Login => "login",
            Page::Signup => "signup",
        };
        f.write_str(name)
    }
}

/// Current page, selected listing and the auth/wallet display flags.
///
/// While mounted the shell holds a session subscription, so
/// [`NavigationShell::is_authenticated`] always reflects the identity
/// collaborator's latest state.
#[derive(Debug, Default)]
pub struct NavigationShell {
    current_page: Page,
    selected_model: Option<String>,
    wallet_connected: bool,
    session: Option<SessionSubscription>,
}

impl NavigationShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing session changes, replacing any earlier subscription
    pub fn mount<P: IdentityProvider + ?Sized>(&mut self, provider: &P) {
        self.unmount();
        self.session = Some(provider.subscribe());
    }

    pub fn unmount(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.unsubscribe();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_active())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.current().is_some())
    }

    pub fn current_page(&self) -> Page {
        self.current_page
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    pub fn navigate(&mut self, page: Page) {
        tracing::debug!("Navigate {} -> {}", self.current_page, page);
        self.current_page = page;
    }

    /// Remember `id` and open its detail page
    pub fn select_model(&mut self, id: impl Into<String>) {
        self.selected_model = Some(id.into());
        self.navigate(Page::ModelDetail);
    }

    /// The page to render; the detail page needs a selected listing
    pub fn resolved_page(&self) -> Page {
        match (self.current_page, &self.selected_model) {
            (Page::ModelDetail, None) => Page::Marketplace,
            (page, _) => page,
        }
    }

    pub fn on_auth_success(&mut self) {
        self.navigate(Page::Dashboard);
    }

    pub fn on_logout(&mut self) {
        self.wallet_connected = false;
        self.navigate(Page::Home);
    }

    pub fn set_wallet_connected(&mut self, connected: bool) {
        self.wallet_connected = connected;
    }

    pub fn wallet_connected(&self) -> bool {
        self.wallet_connected
    }
}

impl Drop for NavigationShell {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mocks::MockIdentityProvider;

    #[test]
    fn test_detail_without_selection_falls_back() {
        let mut shell = NavigationShell::new();
        shell.navigate(Page::ModelDetail);
        assert_eq!(shell.resolved_page(), Page::Marketplace);

        shell.select_model("abc");
        assert_eq!(shell.resolved_page(), Page::ModelDetail);
        assert_eq!(shell.selected_model(), Some("abc"));
    }

    #[tokio::test]
    async fn test_tracks_session_while_mounted() {
        let provider = MockIdentityProvider::new();
        let mut shell = NavigationShell::new();
        shell.mount(&provider);
        assert!(!shell.is_authenticated());

        provider.sign_in("creator@aichainx.io", "secret").await.unwrap();
        assert!(shell.is_authenticated());
        shell.on_auth_success();
        assert_eq!(shell.current_page(), Page::Dashboard);

        provider.sign_out().await.unwrap();
        assert!(!shell.is_authenticated());
        shell.on_logout();
        assert_eq!(shell.current_page(), Page::Home);
    }

    #[test]
    fn test_unmount_releases_subscription() {
        let provider = MockIdentityProvider::new();
        let mut shell = NavigationShell::new();

        shell.mount(&provider);
        assert_eq!(provider.subscriber_count(), 1);
        assert!(shell.is_mounted());

        // Remounting replaces the subscription rather than adding one.
        shell.mount(&provider);
        assert_eq!(provider.subscriber_count(), 1);

        shell.unmount();
        assert_eq!(provider.subscriber_count(), 0);
        assert!(!shell.is_authenticated());
    }

    #[test]
    fn test_logout_clears_wallet_flag() {
        let mut shell = NavigationShell::new();
        shell.set_wallet_connected(true);
        shell.on_logout();
        assert!(!shell.wallet_connected());
    }
}
