//! Request authentication.
//!
//! Implement [`AsyncAuthenticator`] with a plain `async fn`; the blanket
//! [`Authenticator`] impl adapts it to the boxed-future contract that
//! [`AuthenticationLayer`] drives.

pub mod authenticated;
pub mod authenticator;
pub mod layer;
pub mod session_authenticator;

pub use authenticated::Authenticated;
pub use authenticator::{AsyncAuthenticator, Authenticator};
pub use layer::{AuthenticationLayer, AuthenticationService};
pub use session_authenticator::SessionAuthenticator;
