//! qnopt Optimization - the L-BFGS minimizer.
//!
//! This crate provides the preconditioned L-BFGS driver and its bounded
//! history. Problems, parameters and line searches come from `qnopt-core`.
//!
//! # Examples
//!
//! ```rust
//! use qnopt_core::prelude::*;
//! use qnopt_optim::LBFGS;
//!
//! let params = MinimizeParams::<f64>::new()
//!     .with_history(5)
//!     .with_knorm_threshold(1e-8)
//!     .with_line_prefix("IonicMinimize: ");
//!
//! let lbfgs: LBFGS<f64, _> = LBFGS::new(BacktrackingLineSearch::new());
//! assert_eq!(lbfgs.name(), "L-BFGS");
//! params.validate()?;
//! # Ok::<(), MinimizeError>(())
//! ```

pub mod history;
pub mod lbfgs;

// Re-export main types for convenience
pub use history::{History, HistoryEntry};
pub use lbfgs::LBFGS;
