//! Verification of the bearer tokens issued by the external identity provider.

mod middleware;
mod token;

pub use middleware::{AuthState, AuthenticatedUser};
pub use token::{AuthConfig, Claims};
