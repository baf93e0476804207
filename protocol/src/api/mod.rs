//! API DTOs module
//!
//! Request and response bodies grouped by collaborator:
//! - `identity`: email/password identity service
//! - `mint`: arguments of the model-minting contract call

pub mod identity;
pub mod mint;

pub use identity::*;
pub use mint::*;
