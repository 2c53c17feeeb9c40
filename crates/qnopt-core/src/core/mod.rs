//! Core traits and types for quasi-Newton minimization.

pub mod error;
pub mod minimizable;
pub mod types;
pub mod vector;

// Re-export core types
pub use error::*;
pub use minimizable::*;
pub use types::*;
pub use vector::*;
