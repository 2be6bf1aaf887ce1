pub mod credentials;
pub mod token;

pub use credentials::CredentialStore;
pub use token::{TokenClaims, TokenService};
