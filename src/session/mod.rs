//! Session handling: identifiers, their transport, and the per-request
//! [`Session`] handle backed by a [`SessionStore`](crate::store::SessionStore).

pub mod editor;
pub mod error;
pub mod id;
pub mod location;
pub mod manager;

pub use editor::{ResponseEditingLayer, ResponseEditor};
pub use error::SessionError;
pub use id::{create_session_id, SessionId};
pub use location::SessionIdLocation;
pub use manager::{Session, SessionManager};
