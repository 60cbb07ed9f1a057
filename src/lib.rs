//! Library exports for sessiontron, shared between the binary and tests.

pub mod auth;
pub mod config;
pub mod metrics;
pub mod routes;
pub mod session;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;
