//! Error types for minimization.
//!
//! The driver reports ordinary outcomes (convergence, exhaustion, non-finite
//! values, a line search stuck at roundoff) through its result value. The
//! errors here are reserved for invalid input, failures raised by the host
//! problem, and the fatal failed-step abort.

use thiserror::Error;

/// Errors that can occur while minimizing.
#[derive(Debug, Clone, Error)]
pub enum MinimizeError {
    /// Invalid minimizer or line-search configuration.
    ///
    /// Raised by `validate()` before the problem state is touched.
    #[error("Invalid minimizer configuration: {reason} ({parameter} = {value})")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },

    /// A line search failed while `abort_on_failed_step` was set.
    #[error("Step failed at iteration {iteration} (alpha = {step_size}): aborting")]
    StepFailed {
        /// Iteration at which the line search failed
        iteration: usize,
        /// Step size reported by the failed line search
        step_size: f64,
    },

    /// The host problem could not evaluate the objective.
    #[error("Objective evaluation failed: {reason}")]
    Evaluation {
        /// Description supplied by the host
        reason: String,
    },

    /// Dimension mismatch between vectors or operators.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },
}

impl MinimizeError {
    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Create a StepFailed error.
    pub fn step_failed(iteration: usize, step_size: f64) -> Self {
        Self::StepFailed {
            iteration,
            step_size,
        }
    }

    /// Create an Evaluation error with a custom reason.
    pub fn evaluation<S: Into<String>>(reason: S) -> Self {
        Self::Evaluation {
            reason: reason.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Result type alias for minimization operations.
pub type Result<T> = std::result::Result<T, MinimizeError>;
