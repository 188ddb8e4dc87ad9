//! Tidepool Core - Shared contracts for the connection pool
//!
//! This crate provides the pieces every other tidepool crate depends on:
//!
//! - `Connector` - Trait for the external component that opens and tears down connections
//! - `ConnectParams` - Host, port, credentials and database name handed to a connector
//! - `TidepoolError` - The error taxonomy surfaced to pool callers

mod connector;
mod error;
mod params;

pub use connector::*;
pub use error::*;
pub use params::*;
