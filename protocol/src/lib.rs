//! Shared data and wire types for the AIChainX marketplace client
//!
//! - `common`: the listing data model and session user
//! - `api`: request/response bodies for the identity service and the
//!   model-minting contract call

pub mod api;
pub mod common;
