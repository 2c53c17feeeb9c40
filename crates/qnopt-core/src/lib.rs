//! Core traits and types for limited-memory quasi-Newton minimization.
//!
//! This crate defines the contract between a host problem and the L-BFGS
//! driver in `qnopt-optim`: the vector algebra the driver needs, the
//! objective oracle the host implements, the parameters, and the line
//! minimizers the driver calls once per iteration.
//!
//! # Key Concepts
//!
//! - **State ownership**: the host owns the state variable; the driver only
//!   moves it through `Minimizable::step` and never copies it
//! - **Preconditioning**: the host returns `K g` next to `g`, and the driver
//!   measures convergence with `<g, K g>`
//! - **Synchronization**: every scalar that decides control flow goes through
//!   `Minimizable::sync`, so distributed hosts stay in lockstep
//!
//! # Modules
//!
//! - [`error`]: Error types and the crate `Result` alias
//! - [`types`]: The `Scalar` trait and nalgebra aliases
//! - [`vector`]: The `VectorSpace` trait
//! - [`minimizable`]: The objective oracle and the `(E, g, Kg)` iterate
//! - [`params`]: Minimizer parameters and log formatting
//! - [`ediff`]: Energy-difference convergence monitor
//! - [`line_search`]: Line minimizers
//! - [`logging`]: Iteration log sink
//! - [`fd_test`]: Finite-difference gradient test
//! - [`result`]: Result and termination types

pub mod core;
pub mod optimization;

#[cfg(any(test, feature = "test-utils"))]
pub mod utils;

// Re-export modules at the crate root
pub use crate::core::{error, minimizable, types, vector};
pub use optimization::{ediff, fd_test, line_search, logging, params, result};

// Re-export commonly used items at the crate root
pub use error::{MinimizeError, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use qnopt_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ediff::EnergyDiffMonitor;
    pub use crate::error::{MinimizeError, Result};
    pub use crate::fd_test::{finite_difference_test, FdSample};
    pub use crate::line_search::{
        BacktrackingLineSearch, FixedStepSize, LineSearch, LineSearchParams, LineSearchResult,
        QuadraticLineSearch, StrongWolfeLineSearch,
    };
    pub use crate::logging::IterationLog;
    pub use crate::minimizable::{Iterate, Minimizable};
    pub use crate::params::{EnergyFormat, MinimizeParams};
    pub use crate::result::{MinimizeResult, TerminationReason};
    pub use crate::types::{constants, DMatrix, DVector, SVector, Scalar};
    pub use crate::vector::VectorSpace;
}
