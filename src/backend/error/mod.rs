//! Backend Error Module
//!
//! `ApiError` and its conversion into the standard failure envelope.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs          - Module exports
//! ├── types.rs        - ApiError and status mapping
//! ├── conversion.rs   - IntoResponse and fault-detail middleware
//! └── extract.rs      - Json/Query extractors rejecting with ApiError
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

/// Extractors that reject with `ApiError`
pub mod extract;

pub use conversion::{reveal_fault_detail, FaultDetail};
pub use extract::{ApiJson, ApiQuery};
pub use types::ApiError;
