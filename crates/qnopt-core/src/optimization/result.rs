//! Outcome of a minimization run.

use crate::types::Scalar;
use std::fmt;
use std::time::Duration;

/// Why the minimizer stopped.
///
/// # Convergence
/// - **Converged**: the gradient and/or energy-difference criteria held
///
/// # Budget
/// - **MaxIterations**: `n_iterations` were performed without convergence
///
/// # Numerical breakdown
/// - **NonFiniteEnergy**: the energy became NaN or infinite
/// - **NonFiniteGradient**: `<g, Kg>` became NaN or infinite
/// - **LineSearchFailed**: the line search failed along the preconditioned
///   steepest-descent direction, usually at the roundoff limit
///
/// # External control
/// - **UserTerminated**: the kill flag was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// Convergence criteria satisfied
    Converged,
    /// Iteration budget exhausted
    MaxIterations,
    /// Energy is NaN or infinite
    NonFiniteEnergy,
    /// Gradient norm is NaN or infinite
    NonFiniteGradient,
    /// Line search failed with an empty history
    LineSearchFailed,
    /// Kill flag raised by the host
    UserTerminated,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Converged => "converged",
            Self::MaxIterations => "maximum iterations reached",
            Self::NonFiniteEnergy => "energy is not finite",
            Self::NonFiniteGradient => "gradient is not finite",
            Self::LineSearchFailed => "line search failed at roundoff limit",
            Self::UserTerminated => "terminated by user",
        };
        f.write_str(text)
    }
}

/// Summary returned by a completed minimization.
///
/// The problem state itself stays inside the host: after `minimize` returns,
/// the host's state is the final iterate.
#[derive(Debug, Clone)]
pub struct MinimizeResult<T>
where
    T: Scalar,
{
    /// Energy at the final state
    pub energy: T,

    /// Energy of the last iterate whose energy was finite
    pub last_finite_energy: T,

    /// Last gradient measure (`|grad|_K` or `grad_max`)
    pub gradient_norm: T,

    /// Number of completed iterations
    pub iterations: usize,

    /// Number of `compute` calls, including those made by the line search
    pub function_evaluations: usize,

    /// Number of times the history was discarded
    pub history_resets: usize,

    /// Wall-clock time spent in `minimize`
    pub duration: Duration,

    /// Why the run stopped
    pub termination_reason: TerminationReason,

    /// Whether the convergence criteria were met
    pub converged: bool,
}

impl<T> MinimizeResult<T>
where
    T: Scalar,
{
    /// Creates a result; `converged` follows from the termination reason.
    pub fn new(
        energy: T,
        iterations: usize,
        duration: Duration,
        termination_reason: TerminationReason,
    ) -> Self {
        Self {
            energy,
            last_finite_energy: energy,
            gradient_norm: T::zero(),
            iterations,
            function_evaluations: 0,
            history_resets: 0,
            duration,
            termination_reason,
            converged: termination_reason == TerminationReason::Converged,
        }
    }

    /// Sets the last finite energy.
    pub fn with_last_finite_energy(mut self, energy: T) -> Self {
        self.last_finite_energy = energy;
        self
    }

    /// Sets the final gradient measure.
    pub fn with_gradient_norm(mut self, norm: T) -> Self {
        self.gradient_norm = norm;
        self
    }

    /// Sets the evaluation count.
    pub fn with_function_evaluations(mut self, count: usize) -> Self {
        self.function_evaluations = count;
        self
    }

    /// Sets the number of history resets.
    pub fn with_history_resets(mut self, resets: usize) -> Self {
        self.history_resets = resets;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converged_follows_reason() {
        let result = MinimizeResult::new(1.0, 3, Duration::ZERO, TerminationReason::Converged)
            .with_gradient_norm(1e-9)
            .with_history_resets(2);
        assert!(result.converged);
        assert_eq!(result.history_resets, 2);
        assert_eq!(result.last_finite_energy, 1.0);

        let result = MinimizeResult::new(
            f64::NAN,
            3,
            Duration::ZERO,
            TerminationReason::NonFiniteEnergy,
        )
        .with_last_finite_energy(0.5);
        assert!(!result.converged);
        assert!(result.energy.is_nan());
        assert_eq!(result.last_finite_energy, 0.5);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(TerminationReason::UserTerminated.to_string(), "terminated by user");
        assert_eq!(TerminationReason::Converged.to_string(), "converged");
    }
}
