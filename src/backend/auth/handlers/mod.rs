//! Authentication Handlers Module
//!
//! HTTP handlers for the authentication endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── register.rs  - User registration handler
//! ├── login.rs     - User authentication handler
//! ├── me.rs        - Get current user handler
//! └── profile.rs   - Profile update handler
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /api/auth/register
//! - **`login`** - POST /api/auth/login
//! - **`get_me`** - GET /api/auth/me
//! - **`update_profile`** - PUT /api/auth/profile

/// Registration handler
pub mod register;

/// Login handler
pub mod login;

/// Get current user handler
pub mod me;

/// Profile update handler
pub mod profile;

pub use login::login;
pub use me::get_me;
pub use profile::update_profile;
pub use register::register;
