//! Model minting DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Arguments of the `mintModel` contract call
///
/// Every field is required; the license is the enumeration id
/// (e.g. "single-use").
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MintModelRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 10000))]
    pub description: String,
    #[validate(length(min = 1, max = 64))]
    pub license: String,
}

impl MintModelRequest {
    /// Solidity signature used to derive the function selector
    pub const SIGNATURE: &'static str = "mintModel(string,string,string)";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_fails_validation() {
        let req = MintModelRequest {
            name: String::new(),
            description: "d".to_string(),
            license: "single-use".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_complete_request_validates() {
        let req = MintModelRequest {
            name: "n".to_string(),
            description: "d".to_string(),
            license: "commercial".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}
