pub mod identity;
pub mod listing;

pub use identity::*;
pub use listing::*;
