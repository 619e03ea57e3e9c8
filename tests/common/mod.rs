//! Common test utilities and helpers
//!
//! Shared by the integration test binaries:
//! - Test application over an in-memory database
//! - User and token helpers
//! - Fixtures created through the API
//! - Envelope assertions

#![allow(dead_code)]

pub mod assertions;
#[cfg(feature = "ssr")]
pub mod auth_helpers;
#[cfg(feature = "ssr")]
pub mod database;
#[cfg(feature = "ssr")]
pub mod fixtures;

pub use assertions::*;
#[cfg(feature = "ssr")]
pub use auth_helpers::*;
#[cfg(feature = "ssr")]
pub use database::*;
#[cfg(feature = "ssr")]
pub use fixtures::*;
