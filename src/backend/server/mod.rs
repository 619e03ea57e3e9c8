//! Server Module
//!
//! Everything needed to stand the HTTP server up: configuration loading,
//! the shared application state and app assembly.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Configuration loading and the database pool
//! └── init.rs         - App creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration**: `ServerConfig::from_env` (env vars over an optional TOML file)
//! 2. **Database**: open the SQLite pool and run migrations
//! 3. **Seed**: optional demo data
//! 4. **Media**: hosted media store when configured
//! 5. **Router**: routes and middleware
//!
//! # Example
//!
//! ```rust,no_run
//! use quill::backend::server::{config::ServerConfig, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(config).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::{create_app, InitError};
pub use state::AppState;
