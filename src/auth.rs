//! Auth-domain models: access tokens and login credentials.

pub mod credentials;
pub mod token;

pub use credentials::*;
pub use token::*;
