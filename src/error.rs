//! Unified error handling for the AIChainX client
//!
//! Every error carries a stable code so that messages shown to the user can be
//! looked up in the documentation:
//! - A1XX: Identity and session errors
//! - A2XX: Network and JSON-RPC errors
//! - A3XX: File and I/O errors
//! - A4XX: Configuration errors
//! - A5XX: Validation and input errors
//! - A6XX: Wallet errors
//! - A7XX: Listing and transaction errors
//! - A8XX: UI and interaction errors
//! - A9XX: Internal errors
//!
//! No error is fatal to an interactive session; callers surface the message
//! and return to the prompt with previous input intact.

use std::fmt;
use thiserror::Error;

/// Unified Result type for all AIChainX operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Error codes for AIChainX operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Identity (A1XX)
    /// A101: Identity service rejected the request
    IdentityError,
    /// A102: Password and confirmation differ
    PasswordMismatch,
    /// A103: Stored session expired
    SessionExpired,
    /// A104: Operation requires a signed-in user
    NotAuthenticated,

    // Network (A2XX)
    /// A201: HTTP request failed
    HttpError,
    /// A202: Connection timeout
    ConnectionTimeout,
    /// A203: Connection refused
    ConnectionRefused,
    /// A204: JSON-RPC error object returned
    RpcError,
    /// A205: Response could not be understood
    InvalidResponse,

    // File/IO (A3XX)
    /// A301: File not found
    FileNotFound,
    /// A302: File read error
    FileReadError,
    /// A303: File write error
    FileWriteError,

    // Configuration (A4XX)
    /// A401: Configuration error
    ConfigError,
    /// A402: Invalid endpoint URL
    InvalidEndpoint,
    /// A403: Invalid contract address
    InvalidAddress,

    // Validation (A5XX)
    /// A501: Invalid input
    InvalidInput,
    /// A502: Validation failed
    ValidationFailed,

    // Wallet (A6XX)
    /// A601: No wallet provider available
    WalletUnavailable,
    /// A602: No wallet account connected
    WalletNotConnected,
    /// A603: The user declined the wallet request
    WalletRequestRejected,

    // Listing/Transaction (A7XX)
    /// A701: Listing not found
    ListingNotFound,
    /// A702: Listing id already present in the catalog
    DuplicateListing,
    /// A703: Transaction submission or confirmation failed
    TransactionFailed,
    /// A704: Transaction mined but reverted
    TransactionReverted,

    // UI (A8XX)
    /// A801: Dialog error
    DialogError,

    // Internal (A9XX)
    /// A901: Internal error
    InternalError,
    /// A902: Serialization error
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::IdentityError => 101,
            ErrorCode::PasswordMismatch => 102,
            ErrorCode::SessionExpired => 103,
            ErrorCode::NotAuthenticated => 104,

            ErrorCode::HttpError => 201,
            ErrorCode::ConnectionTimeout => 202,
            ErrorCode::ConnectionRefused => 203,
            ErrorCode::RpcError => 204,
            ErrorCode::InvalidResponse => 205,

            ErrorCode::FileNotFound => 301,
            ErrorCode::FileReadError => 302,
            ErrorCode::FileWriteError => 303,

            ErrorCode::ConfigError => 401,
            ErrorCode::InvalidEndpoint => 402,
            ErrorCode::InvalidAddress => 403,

            ErrorCode::InvalidInput => 501,
            ErrorCode::ValidationFailed => 502,

            ErrorCode::WalletUnavailable => 601,
            ErrorCode::WalletNotConnected => 602,
            ErrorCode::WalletRequestRejected => 603,

            ErrorCode::ListingNotFound => 701,
            ErrorCode::DuplicateListing => 702,
            ErrorCode::TransactionFailed => 703,
            ErrorCode::TransactionReverted => 704,

            ErrorCode::DialogError => 801,

            ErrorCode::InternalError => 901,
            ErrorCode::SerializationError => 902,
        }
    }

    /// Get the string code (e.g., "A602")
    pub fn as_str(&self) -> String {
        format!("A{}", self.code())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.code())
    }
}

/// Main error type for all AIChainX operations
#[derive(Error, Debug)]
pub enum MarketError {
    // ==================== Identity Errors (A1XX) ====================
    /// Identity service error, message kept verbatim
    #[error("[{code}] {message}")]
    Identity { code: ErrorCode, message: String },

    // ==================== Network Errors (A2XX) ====================
    /// HTTP/Network error
    #[error("[{code}] Network error: {message}")]
    Network {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// JSON-RPC error object
    #[error("[{code}] RPC error ({rpc_code}): {message}")]
    Rpc {
        code: ErrorCode,
        rpc_code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    // ==================== File/IO Errors (A3XX) ====================
    #[error("[{code}] {context}: {message}")]
    Io {
        code: ErrorCode,
        context: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // ==================== Configuration Errors (A4XX) ====================
    #[error("[{code}] Configuration error: {message}")]
    Config {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<config::ConfigError>,
    },

    // ==================== Validation Errors (A5XX) ====================
    /// Missing or invalid required field
    #[error("[{code}] Validation error: {message}")]
    Validation {
        code: ErrorCode,
        message: String,
        field: Option<String>,
    },

    // ==================== Wallet Errors (A6XX) ====================
    #[error("[{code}] Wallet error: {message}")]
    Wallet { code: ErrorCode, message: String },

    // ==================== Listing/Transaction Errors (A7XX) ====================
    #[error("[{code}] Not found: {resource}")]
    NotFound { code: ErrorCode, resource: String },

    #[error("[{code}] Duplicate listing id: {id}")]
    Duplicate { code: ErrorCode, id: String },

    /// Transaction error, message kept verbatim
    #[error("[{code}] Transaction failed: {message}")]
    Transaction {
        code: ErrorCode,
        message: String,
        tx_hash: Option<String>,
    },

    // ==================== UI Errors (A8XX) ====================
    #[error("[{code}] UI error: {message}")]
    Ui { code: ErrorCode, message: String },

    // ==================== Internal Errors (A9XX) ====================
    #[error("[{code}] Internal error: {message}")]
    Internal { code: ErrorCode, message: String },

    #[error("[{code}] Serialization error: {message}")]
    Serialization {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

// ==================== Constructor Methods ====================

impl MarketError {
    // --- Identity ---

    /// Create identity error; the collaborator's message is kept as-is
    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity {
            code: ErrorCode::IdentityError,
            message: message.into(),
        }
    }

    pub fn password_mismatch() -> Self {
        Self::Identity {
            code: ErrorCode::PasswordMismatch,
            message: "Passwords do not match".to_string(),
        }
    }

    pub fn session_expired() -> Self {
        Self::Identity {
            code: ErrorCode::SessionExpired,
            message: "Session expired. Please log in again.".to_string(),
        }
    }

    pub fn not_authenticated() -> Self {
        Self::Identity {
            code: ErrorCode::NotAuthenticated,
            message: "Not logged in. Run 'aichainx login' first.".to_string(),
        }
    }

    // --- Network ---

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            code: ErrorCode::HttpError,
            message: message.into(),
            source: None,
        }
    }

    /// Create network error from reqwest error
    pub fn network_from_reqwest(err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            ErrorCode::ConnectionTimeout
        } else if err.is_connect() {
            ErrorCode::ConnectionRefused
        } else {
            ErrorCode::HttpError
        };

        Self::Network {
            code,
            message: err.to_string(),
            source: Some(err),
        }
    }

    pub fn rpc(rpc_code: i64, message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self::Rpc {
            code: ErrorCode::RpcError,
            rpc_code,
            message: message.into(),
            data,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::Network {
            code: ErrorCode::InvalidResponse,
            message: message.into(),
            source: None,
        }
    }

    // --- File/IO ---

    pub fn io(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            code: ErrorCode::FileReadError,
            context: context.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create IO error from std::io::Error
    pub fn io_from_error(context: impl Into<String>, err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::FileWriteError,
            _ => ErrorCode::FileReadError,
        };

        Self::Io {
            code,
            context: context.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    // --- Configuration ---

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::ConfigError,
            message: message.into(),
            source: None,
        }
    }

    pub fn config_from_error(err: config::ConfigError) -> Self {
        Self::Config {
            code: ErrorCode::ConfigError,
            message: err.to_string(),
            source: Some(err),
        }
    }

    pub fn invalid_endpoint(url: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::InvalidEndpoint,
            message: format!("Invalid endpoint URL: {}", url.into()),
            source: None,
        }
    }

    pub fn invalid_address(address: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::InvalidAddress,
            message: format!("Invalid contract address: {}", address.into()),
            source: None,
        }
    }

    // --- Validation ---

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            field: None,
        }
    }

    /// Create validation error with field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::InvalidInput,
            message: message.into(),
            field: None,
        }
    }

    // --- Wallet ---

    pub fn wallet_unavailable(message: impl Into<String>) -> Self {
        Self::Wallet {
            code: ErrorCode::WalletUnavailable,
            message: message.into(),
        }
    }

    pub fn wallet_not_connected() -> Self {
        Self::Wallet {
            code: ErrorCode::WalletNotConnected,
            message: "No wallet account connected. Connect a wallet first.".to_string(),
        }
    }

    pub fn wallet_rejected(message: impl Into<String>) -> Self {
        Self::Wallet {
            code: ErrorCode::WalletRequestRejected,
            message: message.into(),
        }
    }

    // --- Listing/Transaction ---

    pub fn listing_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            code: ErrorCode::ListingNotFound,
            resource: id.into(),
        }
    }

    pub fn duplicate_listing(id: impl Into<String>) -> Self {
        Self::Duplicate {
            code: ErrorCode::DuplicateListing,
            id: id.into(),
        }
    }

    /// Create transaction error; the collaborator's reason is kept as-is
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction {
            code: ErrorCode::TransactionFailed,
            message: message.into(),
            tx_hash: None,
        }
    }

    pub fn transaction_reverted(message: impl Into<String>, tx_hash: impl Into<String>) -> Self {
        Self::Transaction {
            code: ErrorCode::TransactionReverted,
            message: message.into(),
            tx_hash: Some(tx_hash.into()),
        }
    }

    // --- UI ---

    pub fn ui(message: impl Into<String>) -> Self {
        Self::Ui {
            code: ErrorCode::DialogError,
            message: message.into(),
        }
    }

    // --- Internal ---

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::InternalError,
            message: message.into(),
        }
    }

    // --- Utility Methods ---

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Identity { code, .. } => *code,
            Self::Network { code, .. } => *code,
            Self::Rpc { code, .. } => *code,
            Self::Io { code, .. } => *code,
            Self::Config { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::Wallet { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::Duplicate { code, .. } => *code,
            Self::Transaction { code, .. } => *code,
            Self::Ui { code, .. } => *code,
            Self::Internal { code, .. } => *code,
            Self::Serialization { code, .. } => *code,
        }
    }

    /// Human-readable reason without the code prefix
    pub fn reason(&self) -> String {
        match self {
            Self::Identity { message, .. }
            | Self::Transaction { message, .. }
            | Self::Wallet { message, .. }
            | Self::Validation { message, .. } => message.clone(),
            other => {
                let text = other.to_string();
                match text.split_once("] ") {
                    Some((_, rest)) => rest.to_string(),
                    None => text,
                }
            }
        }
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_wallet_error(&self) -> bool {
        matches!(self, Self::Wallet { .. })
    }

    pub fn is_identity_error(&self) -> bool {
        matches!(self, Self::Identity { .. })
    }

    /// Network failures may succeed when the user retries; nothing retries
    /// automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::HttpError | ErrorCode::ConnectionTimeout | ErrorCode::ConnectionRefused
        )
    }
}

// ==================== From Implementations ====================

impl From<std::io::Error> for MarketError {
    fn from(err: std::io::Error) -> Self {
        Self::io_from_error("IO operation", err)
    }
}

impl From<reqwest::Error> for MarketError {
    fn from(err: reqwest::Error) -> Self {
        Self::network_from_reqwest(err)
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            code: ErrorCode::SerializationError,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<config::ConfigError> for MarketError {
    fn from(err: config::ConfigError) -> Self {
        Self::config_from_error(err)
    }
}

impl From<dialoguer::Error> for MarketError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Ui {
            code: ErrorCode::DialogError,
            message: format!("Dialog error: {}", err),
        }
    }
}

impl From<validator::ValidationErrors> for MarketError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
        fields.sort_unstable();

        let message = format!("Missing or invalid fields: {}", fields.join(", "));
        match fields.first() {
            Some(first) if fields.len() == 1 => Self::validation_field(message, *first),
            _ => Self::validation(message),
        }
    }
}

// Manual Clone implementation that drops non-cloneable sources
impl Clone for MarketError {
    fn clone(&self) -> Self {
        match self {
            Self::Identity { code, message } => Self::Identity {
                code: *code,
                message: message.clone(),
            },
            Self::Network {
                code,
                message,
                source: _,
            } => Self::Network {
                code: *code,
                message: message.clone(),
                source: None,
            },
            Self::Rpc {
                code,
                rpc_code,
                message,
                data,
            } => Self::Rpc {
                code: *code,
                rpc_code: *rpc_code,
                message: message.clone(),
                data: data.clone(),
            },
            Self::Io {
                code,
                context,
                message,
                source: _,
            } => Self::Io {
                code: *code,
                context: context.clone(),
                message: message.clone(),
                source: None,
            },
            Self::Config {
                code,
                message,
                source: _,
            } => Self::Config {
                code: *code,
                message: message.clone(),
                source: None,
            },
            Self::Validation {
                code,
                message,
                field,
            } => Self::Validation {
                code: *code,
                message: message.clone(),
                field: field.clone(),
            },
            Self::Wallet { code, message } => Self::Wallet {
                code: *code,
                message: message.clone(),
            },
            Self::NotFound { code, resource } => Self::NotFound {
                code: *code,
                resource: resource.clone(),
            },
            Self::Duplicate { code, id } => Self::Duplicate {
                code: *code,
                id: id.clone(),
            },
            Self::Transaction {
                code,
                message,
                tx_hash,
            } => Self::Transaction {
                code: *code,
                message: message.clone(),
                tx_hash: tx_hash.clone(),
            },
            Self::Ui { code, message } => Self::Ui {
                code: *code,
                message: message.clone(),
            },
            Self::Internal { code, message } => Self::Internal {
                code: *code,
                message: message.clone(),
            },
            Self::Serialization {
                code,
                message,
                source: _,
            } => Self::Serialization {
                code: *code,
                message: message.clone(),
                source: None,
            },
        }
    }
}
