//! Test utilities and helpers for unit tests
//!
//! Fixed clock, temp directories, an isolated config and a draft builder.

#[cfg(test)]
pub mod test_helpers {
    use std::path::PathBuf;

    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::TempDir;

    use aichainx_protocol::common::{Category, License};

    use crate::config::Config;
    use crate::wizard::{UploadWizard, WizardStep};

    /// Fixed "now" so relative times and recency sorts are deterministic
    pub fn reference_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid reference instant")
    }

    pub fn create_temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    pub fn create_temp_file_with_content(dir: &TempDir, filename: &str, content: &[u8]) -> PathBuf {
        let file_path = dir.path().join(filename);
        std::fs::write(&file_path, content).expect("Failed to write temp file");
        file_path
    }

    /// A temp dir and a not-yet-existing file path inside it
    pub fn temp_storage(filename: &str) -> (TempDir, PathBuf) {
        let dir = create_temp_dir();
        let path = dir.path().join(filename);
        (dir, path)
    }

    /// Default config whose session storage lives in a temp dir
    pub fn test_config() -> (TempDir, Config) {
        let dir = create_temp_dir();
        let config = Config {
            storage_dir: dir.path().to_path_buf(),
            identity_api_key: None,
            ..Config::default()
        };
        (dir, config)
    }

    /// Builds an [`UploadWizard`] with a pre-filled draft
    pub struct DraftBuilder {
        name: String,
        description: String,
        category: Option<Category>,
        price: String,
        license: Option<License>,
        account: Option<String>,
        step: WizardStep,
    }

    impl DraftBuilder {
        /// A draft that passes every step's validation
        pub fn complete() -> Self {
            Self {
                name: "Sentiment Mini".to_string(),
                description: "Compact sentiment classifier for product reviews".to_string(),
                category: Some(Category::Nlp),
                price: "25".to_string(),
                license: Some(License::Commercial),
                account: None,
                step: WizardStep::File,
            }
        }

        pub fn account(mut self, account: &str) -> Self {
            self.account = Some(account.to_string());
            self
        }

        pub fn at(mut self, step: WizardStep) -> Self {
            self.step = step;
            self
        }

        pub fn wizard(self) -> UploadWizard {
            let mut wizard = UploadWizard::new(Config::default());
            let draft = wizard.draft_mut();
            draft.name = self.name;
            draft.description = self.description;
            draft.category = self.category;
            draft.price = self.price;
            draft.license = self.license;
            draft.account = self.account;
            draft.current_step = self.step;
            wizard
        }
    }
}
