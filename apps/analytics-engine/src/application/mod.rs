//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **DTOs**: The snapshot input and report output at the engine boundary
//! - **Use Cases**: The recompute pipeline
//! - **Services**: The debouncing recompute scheduler

pub mod dto;
pub mod services;
pub mod use_cases;

pub use dto::*;
pub use services::*;
pub use use_cases::*;
