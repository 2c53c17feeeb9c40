//! Finite-difference check of a problem's gradient.
//!
//! Steps along `d = -Kg` by `δ = 1e-9, 1e-8, ..., 10` and compares the
//! energy change with the first- and second-order predictions made from the
//! analytic gradient:
//!
//! - `d1 = ΔE / (δ <g, d>)` tends to 1 as `δ → 0`
//! - `d2 = (ΔE - δ <g, d>) / (½ δ² c)` with the curvature estimate
//!   `c = (<g(δ), d> - <g, d>) / δ` tends to 1 for moderate `δ`
//!
//! A gradient that is wrong by a constant factor shows up as a `d1` ratio
//! away from 1 at every step size. Roundoff dominates the smallest steps.

use crate::{
    error::Result,
    line_search::StepTracker,
    logging::IterationLog,
    minimizable::{Iterate, Minimizable},
    params::MinimizeParams,
    types::Scalar,
    vector::VectorSpace,
};

/// One step size of the finite-difference test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FdSample<T> {
    /// Step along the test direction
    pub delta: T,
    /// First-order ratio
    pub d1_ratio: T,
    /// Second-order ratio
    pub d2_ratio: T,
}

/// Runs the finite-difference test at the problem's current state.
///
/// The state is moved back to where it started before returning. Returns an
/// empty list when the gradient vanishes along the test direction.
///
/// # Errors
///
/// Propagates evaluation errors from the problem. The state is left
/// displaced in that case.
pub fn finite_difference_test<T, P>(
    problem: &mut P,
    params: &MinimizeParams<T>,
    log: &mut IterationLog,
) -> Result<Vec<FdSample<T>>>
where
    T: Scalar,
    P: Minimizable<T>,
{
    let prefix = &params.line_prefix;
    let start = Iterate::evaluate(problem)?;

    let mut direction = start.kgradient.clone();
    direction.scale_mut(-T::one());
    problem.constrain(&mut direction);

    let slope = start.directional_derivative(problem, &direction);
    log.line(format_args!(
        "{}fdTest: energy: {}  <g,d>: {:e}",
        prefix,
        params.energy_format.format(start.energy),
        slope.try_to_f64().unwrap_or(f64::NAN)
    ));
    if slope == T::zero() {
        log.line(format_args!(
            "{}fdTest: gradient vanishes along the test direction; skipping",
            prefix
        ));
        return Ok(Vec::new());
    }

    let half = <T as Scalar>::from_f64(0.5);
    let mut tracker = StepTracker::new();
    let mut trial = start.clone();
    let mut samples = Vec::with_capacity(11);

    for exponent in -9..=1 {
        let delta = <T as Scalar>::from_f64(10f64.powi(exponent));
        tracker.move_to(problem, &direction, delta);
        trial.refresh(problem)?;

        let energy_change = trial.energy - start.energy;
        let curvature = (trial.directional_derivative(problem, &direction) - slope) / delta;
        let sample = FdSample {
            delta,
            d1_ratio: energy_change / (delta * slope),
            d2_ratio: (energy_change - delta * slope) / (half * delta * delta * curvature),
        };

        log.line(format_args!(
            "{}fdTest: delta: {:7.1e}  d1 ratio: {:.15}  d2 ratio: {:.15}",
            prefix,
            delta.to_f64(),
            sample.d1_ratio.try_to_f64().unwrap_or(f64::NAN),
            sample.d2_ratio.try_to_f64().unwrap_or(f64::NAN)
        ));
        samples.push(sample);
    }

    problem.step(&direction, -tracker.applied());
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_helpers::SharedLogBuffer;
    use crate::utils::test_problems::{QuadraticProblem, RosenbrockProblem};
    use approx::assert_relative_eq;

    #[test]
    fn test_consistent_gradient_ratios() {
        let mut problem = QuadraticProblem::diagonal(&[1.0, 10.0, 100.0], &[1.0, 1.0, 1.0]);
        let params = MinimizeParams::default();
        let mut log = IterationLog::to_log();

        let samples = finite_difference_test(&mut problem, &params, &mut log).unwrap();
        assert_eq!(samples.len(), 11);

        for sample in samples.iter().filter(|s| s.delta > 5e-8 && s.delta < 2e-6) {
            assert_relative_eq!(sample.d1_ratio, 1.0, epsilon = 1e-4);
        }
        for sample in samples.iter().filter(|s| s.delta > 5e-5) {
            assert_relative_eq!(sample.d2_ratio, 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_state_is_restored() {
        let mut problem = RosenbrockProblem::new(-1.2, 1.0);
        let start = problem.state().clone();
        let params = MinimizeParams::default();
        let mut log = IterationLog::to_log();

        finite_difference_test(&mut problem, &params, &mut log).unwrap();
        assert_relative_eq!(problem.state(), &start, epsilon = 1e-9);
    }

    #[test]
    fn test_wrong_gradient_is_detected() {
        let mut problem =
            QuadraticProblem::diagonal(&[2.0, 4.0], &[1.0, -1.0]).with_gradient_scale(2.0);
        let params = MinimizeParams::default();
        let mut log = IterationLog::to_log();

        let samples = finite_difference_test(&mut problem, &params, &mut log).unwrap();
        let small = samples
            .iter()
            .find(|s| s.delta > 5e-7 && s.delta < 2e-6)
            .unwrap();
        assert_relative_eq!(small.d1_ratio, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_logs_one_line_per_sample() {
        let mut problem = QuadraticProblem::diagonal(&[1.0], &[1.0]);
        let params = MinimizeParams::default().with_line_prefix("Test: ");
        let buffer = SharedLogBuffer::new();
        let mut log = IterationLog::to_writer(buffer.clone());

        finite_difference_test(&mut problem, &params, &mut log).unwrap();
        let text = buffer.contents();
        assert_eq!(text.lines().count(), 12);
        assert!(text.lines().all(|line| line.starts_with("Test: fdTest: ")));
    }

    #[test]
    fn test_zero_gradient_skips() {
        let mut problem = QuadraticProblem::diagonal(&[1.0, 1.0], &[0.0, 0.0]);
        let params = MinimizeParams::default();
        let mut log = IterationLog::to_log();

        let samples = finite_difference_test(&mut problem, &params, &mut log).unwrap();
        assert!(samples.is_empty());
    }
}
