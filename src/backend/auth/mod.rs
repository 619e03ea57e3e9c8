//! Authentication Module
//!
//! User accounts, JWT sessions and the authentication endpoints.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and database operations
//! ├── sessions.rs     - JWT token management
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Register**: name, email, password → user created → token returned
//! 2. **Login**: email, password → credentials verified → token returned
//! 3. **Me / Profile**: bearer token → user loaded → profile read or updated
//!
//! # Security
//!
//! - Passwords are hashed with bcrypt before storage
//! - Tokens are HS256 JWTs carrying the user id and role
//! - Invalid credentials return 401 without saying which part was wrong

/// User data model and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::{get_me, login, register, update_profile};
