//! Minimizer parameters.
//!
//! `MinimizeParams` carries everything the outer loop and the line searches
//! read: iteration budget, history length, convergence criteria, trial step,
//! failure policy and log formatting. It is plain data (optionally serde
//! enabled) so hosts can load it from their own input files.
//!
//! # Convergence criteria
//!
//! Two independent tests are evaluated every iteration:
//!
//! - **Gradient norm**: `sqrt(<g, K g> / n_dim) < knorm_threshold`, or
//!   `max_calculator(K g) < knorm_threshold` when `max_threshold` is set.
//! - **Energy difference**: the last `n_energy_diff` consecutive energy
//!   changes are all below `energy_diff_threshold`.
//!
//! With `converge_all` both must hold, otherwise either one suffices.
//!
//! # Example
//!
//! ```rust
//! use qnopt_core::prelude::*;
//!
//! let params = MinimizeParams::<f64>::new()
//!     .with_n_iterations(200)
//!     .with_history(10)
//!     .with_knorm_threshold(1e-8)
//!     .with_energy_diff(1e-12, 3)
//!     .with_energy_label("F");
//! params.validate()?;
//! # Ok::<(), qnopt_core::error::MinimizeError>(())
//! ```

use crate::{
    error::{MinimizeError, Result},
    line_search::LineSearchParams,
    types::Scalar,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How energies are printed in the iteration log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EnergyFormat {
    /// Fixed-point with the given number of decimals
    Fixed {
        /// Digits after the decimal point
        precision: usize,
    },
    /// Scientific notation with the given number of decimals
    Scientific {
        /// Digits after the decimal point
        precision: usize,
    },
}

impl Default for EnergyFormat {
    fn default() -> Self {
        Self::Fixed { precision: 15 }
    }
}

impl EnergyFormat {
    /// Formats an energy value.
    pub fn format<T: Scalar>(&self, energy: T) -> String {
        let value = energy.try_to_f64().unwrap_or(f64::NAN);
        match *self {
            Self::Fixed { precision } => format!("{:.*}", precision, value),
            Self::Scientific { precision } => format!("{:.*e}", precision, value),
        }
    }
}

/// Parameters controlling a minimization run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MinimizeParams<T>
where
    T: Scalar,
{
    /// Maximum number of outer iterations
    pub n_iterations: usize,

    /// Number of `(s, Ky, rho)` pairs kept by L-BFGS
    pub history: usize,

    /// Dimension used to normalize the default gradient norm
    pub n_dim: usize,

    /// Stop when the gradient measure drops below this value
    pub knorm_threshold: T,

    /// Stop when consecutive energy changes stay below this value...
    pub energy_diff_threshold: T,

    /// ...for this many consecutive iterations (0 disables the test)
    pub n_energy_diff: usize,

    /// Require both criteria instead of either one
    pub converge_all: bool,

    /// Use `Minimizable::max_calculator` instead of the `<g, Kg>` norm
    pub max_threshold: bool,

    /// Trial step for the first line-search evaluation of each iteration
    pub alpha_t_start: T,

    /// Treat a failed line search as fatal
    pub abort_on_failed_step: bool,

    /// Run the finite-difference gradient test before minimizing
    pub fd_test: bool,

    /// Prefix for every log line
    pub line_prefix: String,

    /// Name printed in front of the energy
    pub energy_label: String,

    /// Formatting of the energy value
    pub energy_format: EnergyFormat,

    /// Line-search tuning shared by all line minimizers
    pub line_search: LineSearchParams<T>,
}

impl<T> Default for MinimizeParams<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            n_iterations: 100,
            history: 15,
            n_dim: 1,
            knorm_threshold: T::zero(),
            energy_diff_threshold: T::zero(),
            n_energy_diff: 2,
            converge_all: false,
            max_threshold: false,
            alpha_t_start: T::one(),
            abort_on_failed_step: false,
            fd_test: false,
            line_prefix: "LBFGS: ".to_string(),
            energy_label: "E".to_string(),
            energy_format: EnergyFormat::default(),
            line_search: LineSearchParams::default(),
        }
    }
}

impl<T> MinimizeParams<T>
where
    T: Scalar,
{
    /// Creates parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of iterations.
    pub fn with_n_iterations(mut self, n: usize) -> Self {
        self.n_iterations = n;
        self
    }

    /// Sets the L-BFGS history length.
    pub fn with_history(mut self, history: usize) -> Self {
        self.history = history;
        self
    }

    /// Sets the dimension used to normalize the gradient norm.
    pub fn with_n_dim(mut self, n_dim: usize) -> Self {
        self.n_dim = n_dim;
        self
    }

    /// Sets the gradient-norm threshold.
    pub fn with_knorm_threshold(mut self, threshold: T) -> Self {
        self.knorm_threshold = threshold;
        self
    }

    /// Sets the energy-difference threshold and window.
    pub fn with_energy_diff(mut self, threshold: T, n_energy_diff: usize) -> Self {
        self.energy_diff_threshold = threshold;
        self.n_energy_diff = n_energy_diff;
        self
    }

    /// Requires every convergence criterion instead of any one.
    pub fn with_converge_all(mut self, converge_all: bool) -> Self {
        self.converge_all = converge_all;
        self
    }

    /// Switches the gradient criterion to the host's max calculator.
    pub fn with_max_threshold(mut self, max_threshold: bool) -> Self {
        self.max_threshold = max_threshold;
        self
    }

    /// Sets the initial trial step.
    pub fn with_alpha_t_start(mut self, alpha: T) -> Self {
        self.alpha_t_start = alpha;
        self
    }

    /// Makes a failed line search fatal.
    pub fn with_abort_on_failed_step(mut self, abort: bool) -> Self {
        self.abort_on_failed_step = abort;
        self
    }

    /// Enables the finite-difference gradient test.
    pub fn with_fd_test(mut self, fd_test: bool) -> Self {
        self.fd_test = fd_test;
        self
    }

    /// Sets the log line prefix.
    pub fn with_line_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.line_prefix = prefix.into();
        self
    }

    /// Sets the energy label.
    pub fn with_energy_label<S: Into<String>>(mut self, label: S) -> Self {
        self.energy_label = label.into();
        self
    }

    /// Sets the energy format.
    pub fn with_energy_format(mut self, format: EnergyFormat) -> Self {
        self.energy_format = format;
        self
    }

    /// Replaces the line-search parameters.
    pub fn with_line_search(mut self, line_search: LineSearchParams<T>) -> Self {
        self.line_search = line_search;
        self
    }

    /// Label of the gradient measure in the log.
    pub fn knorm_name(&self) -> &'static str {
        if self.max_threshold {
            "grad_max"
        } else {
            "|grad|_K"
        }
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns `MinimizeError::InvalidConfiguration` if:
    /// - `history` or `n_dim` is zero
    /// - `alpha_t_start` is not finite and positive
    /// - a threshold is negative or NaN
    /// - the line-search parameters are invalid
    pub fn validate(&self) -> Result<()> {
        if self.history == 0 {
            return Err(MinimizeError::invalid_configuration(
                "History length must be at least 1",
                "history",
                "0",
            ));
        }

        if self.n_dim == 0 {
            return Err(MinimizeError::invalid_configuration(
                "Normalization dimension must be at least 1",
                "n_dim",
                "0",
            ));
        }

        if !(self.alpha_t_start > T::zero()) || !<T as num_traits::Float>::is_finite(self.alpha_t_start) {
            return Err(MinimizeError::invalid_configuration(
                "Initial trial step must be finite and positive",
                "alpha_t_start",
                self.alpha_t_start.to_string(),
            ));
        }

        if !(self.knorm_threshold >= T::zero()) {
            return Err(MinimizeError::invalid_configuration(
                "Gradient threshold must be non-negative",
                "knorm_threshold",
                self.knorm_threshold.to_string(),
            ));
        }

        if !(self.energy_diff_threshold >= T::zero()) {
            return Err(MinimizeError::invalid_configuration(
                "Energy-difference threshold must be non-negative",
                "energy_diff_threshold",
                self.energy_diff_threshold.to_string(),
            ));
        }

        self.line_search.validate()
    }
}
