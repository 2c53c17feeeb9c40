//! Line minimizers.
//!
//! A line search receives the current iterate `(E, g, Kg)`, a search
//! direction `d` and a trial step `αT`, and moves the problem state along
//! `d` until it accepts a step. The problem state is moved in place through
//! [`Minimizable::step`]: there is no copy of the state variable to fall
//! back on, so every implementation tracks the cumulative displacement it
//! has applied.
//!
//! # Contract
//!
//! On success the problem sits at `x₀ + α d`, `iterate` holds the energy and
//! gradients evaluated there, and the result carries `α`.
//!
//! On failure the result carries the displacement still applied to the
//! state. The driver undoes it with `step(d, -α)` and recomputes, so an
//! implementation may leave `iterate` stale.
//!
//! Every scalar a branch depends on (energies, `<g, d>`) has been reduced
//! through [`Minimizable::sync`], so all participants of a distributed host
//! take identical decisions.
//!
//! # Sufficient decrease conditions
//!
//! With `φ(α) = E(x₀ + α d)` and `φ'(0) = <g, d> < 0`:
//!
//! - **Armijo**: `φ(α) ≤ φ(0) + c₁ α φ'(0)`
//! - **Curvature**: `φ'(α) ≥ c₂ φ'(0)`
//! - **Strong curvature**: `|φ'(α)| ≤ c₂ |φ'(0)|`
//!
//! where `0 < c₁ < c₂ < 1`.
//!
//! # Implementations
//!
//! - [`FixedStepSize`]: take `αT` unconditionally ("relax")
//! - [`BacktrackingLineSearch`]: Armijo backtracking with a curvature safeguard
//! - [`QuadraticLineSearch`]: parabola fit through `φ(0)`, `φ'(0)`, `φ(αT)`
//! - [`StrongWolfeLineSearch`]: bracketing and cubic-interpolation zoom

use crate::{
    error::{MinimizeError, Result},
    minimizable::{Iterate, Minimizable},
    params::MinimizeParams,
    types::Scalar,
};
use num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Outcome of a line minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchResult<T>
where
    T: Scalar,
{
    /// Accepted step on success, displacement left applied on failure
    pub step_size: T,

    /// Whether an acceptable step was found
    pub success: bool,

    /// Number of objective evaluations performed
    pub function_evals: usize,
}

impl<T: Scalar> LineSearchResult<T> {
    /// Successful search that accepted `step_size`.
    pub fn accepted(step_size: T, function_evals: usize) -> Self {
        Self {
            step_size,
            success: true,
            function_evals,
        }
    }

    /// Failed search that left the state displaced by `step_size`.
    pub fn failed(step_size: T, function_evals: usize) -> Self {
        Self {
            step_size,
            success: false,
            function_evals,
        }
    }
}

/// Tuning constants shared by the line minimizers.
///
/// ```rust
/// # use qnopt_core::prelude::*;
/// let params = LineSearchParams::<f64> {
///     wolfe_gradient: 0.1, // tighter curvature for CG-like directions
///     ..LineSearchParams::default()
/// };
/// params.validate()?;
/// # Ok::<(), qnopt_core::error::MinimizeError>(())
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineSearchParams<T>
where
    T: Scalar,
{
    /// Smallest trial step before the search gives up
    pub alpha_t_min: T,

    /// Factor applied to the trial step when it is too large
    pub alpha_t_reduce_factor: T,

    /// Factor applied to the trial step when it is too small
    pub alpha_t_increase_factor: T,

    /// Maximum trial step adjustments of the quadratic search
    pub n_alpha_adjust_max: usize,

    /// Armijo parameter c₁ ∈ (0,1)
    pub wolfe_energy: T,

    /// Curvature parameter c₂ ∈ (c₁,1)
    pub wolfe_gradient: T,

    /// Backtracking reduction factor ∈ (0,1)
    pub backtrack_factor: T,

    /// Maximum trials of the backtracking and Wolfe searches
    pub max_iterations: usize,
}

impl<T> Default for LineSearchParams<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            alpha_t_min: T::MIN_STEP_SIZE,
            alpha_t_reduce_factor: <T as Scalar>::from_f64(0.1),
            alpha_t_increase_factor: <T as Scalar>::from_f64(3.0),
            n_alpha_adjust_max: 3,
            wolfe_energy: <T as Scalar>::from_f64(1e-4),
            wolfe_gradient: <T as Scalar>::from_f64(0.9),
            backtrack_factor: <T as Scalar>::from_f64(0.5),
            max_iterations: 50,
        }
    }
}

impl<T> LineSearchParams<T>
where
    T: Scalar,
{
    /// Validates the line-search constants.
    ///
    /// # Errors
    ///
    /// Returns `MinimizeError::InvalidConfiguration` if:
    /// - `alpha_t_min` is not positive
    /// - the adjust factors violate `0 < reduce < 1 < increase`
    /// - the Wolfe constants violate `0 < c₁ < c₂ < 1`
    /// - `backtrack_factor` is outside `(0, 1)`
    /// - an iteration budget is zero
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha_t_min > T::zero()) {
            return Err(MinimizeError::invalid_configuration(
                "Minimum trial step must be positive",
                "alpha_t_min",
                self.alpha_t_min.to_string(),
            ));
        }

        if !(self.alpha_t_reduce_factor > T::zero() && self.alpha_t_reduce_factor < T::one()) {
            return Err(MinimizeError::invalid_configuration(
                "Reduce factor must be in (0, 1)",
                "alpha_t_reduce_factor",
                self.alpha_t_reduce_factor.to_string(),
            ));
        }

        if !(self.alpha_t_increase_factor > T::one()) {
            return Err(MinimizeError::invalid_configuration(
                "Increase factor must be greater than 1",
                "alpha_t_increase_factor",
                self.alpha_t_increase_factor.to_string(),
            ));
        }

        if !(self.wolfe_energy > T::zero() && self.wolfe_energy < T::one()) {
            return Err(MinimizeError::invalid_configuration(
                "Armijo constant c1 must be in (0, 1)",
                "wolfe_energy",
                self.wolfe_energy.to_string(),
            ));
        }

        if !(self.wolfe_gradient > self.wolfe_energy && self.wolfe_gradient < T::one()) {
            return Err(MinimizeError::invalid_configuration(
                "Wolfe constant c2 must satisfy c1 < c2 < 1",
                "wolfe_gradient",
                self.wolfe_gradient.to_string(),
            ));
        }

        if !(self.backtrack_factor > T::zero() && self.backtrack_factor < T::one()) {
            return Err(MinimizeError::invalid_configuration(
                "Backtracking factor must be in (0, 1)",
                "backtrack_factor",
                self.backtrack_factor.to_string(),
            ));
        }

        if self.n_alpha_adjust_max == 0 {
            return Err(MinimizeError::invalid_configuration(
                "Trial step adjustments must be at least 1",
                "n_alpha_adjust_max",
                "0",
            ));
        }

        if self.max_iterations == 0 {
            return Err(MinimizeError::invalid_configuration(
                "Maximum iterations must be at least 1",
                "max_iterations",
                "0",
            ));
        }

        Ok(())
    }

    /// Sets the Wolfe constants c₁ and c₂.
    pub fn with_wolfe(mut self, c1: T, c2: T) -> Self {
        self.wolfe_energy = c1;
        self.wolfe_gradient = c2;
        self
    }

    /// Sets the number of trial step adjustments.
    pub fn with_n_alpha_adjust_max(mut self, n: usize) -> Self {
        self.n_alpha_adjust_max = n;
        self
    }

    /// Sets the minimum trial step.
    pub fn with_alpha_t_min(mut self, alpha_t_min: T) -> Self {
        self.alpha_t_min = alpha_t_min;
        self
    }
}

/// A line minimizer driven by the L-BFGS outer loop.
pub trait LineSearch<T>: Debug
where
    T: Scalar,
{
    /// Minimizes the energy along `direction`, starting from trial step
    /// `alpha_t`.
    ///
    /// `iterate` holds `(E, g, Kg)` at the current state on entry. On
    /// success it holds the values at the accepted point.
    ///
    /// # Errors
    ///
    /// Only errors raised by the problem are returned. A search that cannot
    /// find an acceptable step reports it through
    /// [`LineSearchResult::success`].
    fn linmin<P>(
        &mut self,
        problem: &mut P,
        params: &MinimizeParams<T>,
        direction: &P::Vector,
        alpha_t: T,
        iterate: &mut Iterate<T, P::Vector>,
    ) -> Result<LineSearchResult<T>>
    where
        P: Minimizable<T>;

    /// Name used in log output.
    fn name(&self) -> &str;
}

/// Cumulative displacement applied to the problem along one direction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StepTracker<T> {
    applied: T,
}

impl<T: Scalar> StepTracker<T> {
    pub(crate) fn new() -> Self {
        Self { applied: T::zero() }
    }

    pub(crate) fn applied(&self) -> T {
        self.applied
    }

    /// Moves the state to `x₀ + alpha d`.
    pub(crate) fn move_to<P>(&mut self, problem: &mut P, direction: &P::Vector, alpha: T)
    where
        P: Minimizable<T>,
    {
        problem.step(direction, alpha - self.applied);
        self.applied = alpha;
    }
}

/// Directional derivative at the current iterate, or `None` if `direction`
/// does not point downhill.
fn descent_slope<T, P>(
    problem: &P,
    params: &MinimizeParams<T>,
    direction: &P::Vector,
    iterate: &Iterate<T, P::Vector>,
) -> Option<T>
where
    T: Scalar,
    P: Minimizable<T>,
{
    let slope = iterate.directional_derivative(problem, direction);
    if slope < T::zero() {
        Some(slope)
    } else {
        log::warn!(
            "{}Bad step direction: <g,d> = {:e} is not negative",
            params.line_prefix,
            slope.try_to_f64().unwrap_or(f64::NAN)
        );
        None
    }
}

/// Takes the trial step without testing it.
///
/// Useful when the host already knows a good step, or for relaxation
/// schemes that only need the gradient to keep pointing downhill.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStepSize;

impl FixedStepSize {
    /// Creates the fixed-step strategy.
    pub fn new() -> Self {
        Self
    }
}

impl<T> LineSearch<T> for FixedStepSize
where
    T: Scalar,
{
    fn linmin<P>(
        &mut self,
        problem: &mut P,
        params: &MinimizeParams<T>,
        direction: &P::Vector,
        alpha_t: T,
        iterate: &mut Iterate<T, P::Vector>,
    ) -> Result<LineSearchResult<T>>
    where
        P: Minimizable<T>,
    {
        if descent_slope(problem, params, direction, iterate).is_none() {
            return Ok(LineSearchResult::failed(T::zero(), 0));
        }

        problem.step(direction, alpha_t);
        iterate.refresh(problem)?;
        Ok(LineSearchResult::accepted(alpha_t, 1))
    }

    fn name(&self) -> &str {
        "Relax"
    }
}

/// Armijo backtracking with an optional curvature safeguard.
///
/// A trial step that fails sufficient decrease (or yields a non-finite
/// energy) becomes the upper end of the bracket and the step is shrunk by
/// `backtrack_factor` towards the lower end. With the safeguard enabled, a
/// step that decreases the energy but leaves the slope steeper than
/// `c₂ φ'(0)` becomes the lower end instead: the step grows by
/// `alpha_t_increase_factor` until an upper end is known, then the bracket
/// is shrunk. Without the safeguard this is plain Armijo backtracking.
///
/// The safeguard keeps `<y, s>` positive, which L-BFGS relies on.
#[derive(Debug, Clone, Copy)]
pub struct BacktrackingLineSearch {
    curvature_safeguard: bool,
}

impl BacktrackingLineSearch {
    /// Creates a backtracking search with the curvature safeguard enabled.
    pub fn new() -> Self {
        Self {
            curvature_safeguard: true,
        }
    }

    /// Plain Armijo backtracking.
    pub fn armijo() -> Self {
        Self {
            curvature_safeguard: false,
        }
    }

    /// Enables or disables the curvature safeguard.
    pub fn with_curvature_safeguard(mut self, enabled: bool) -> Self {
        self.curvature_safeguard = enabled;
        self
    }
}

impl Default for BacktrackingLineSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LineSearch<T> for BacktrackingLineSearch
where
    T: Scalar,
{
    fn linmin<P>(
        &mut self,
        problem: &mut P,
        params: &MinimizeParams<T>,
        direction: &P::Vector,
        alpha_t: T,
        iterate: &mut Iterate<T, P::Vector>,
    ) -> Result<LineSearchResult<T>>
    where
        P: Minimizable<T>,
    {
        let ls = &params.line_search;
        let Some(slope) = descent_slope(problem, params, direction, iterate) else {
            return Ok(LineSearchResult::failed(T::zero(), 0));
        };

        let energy0 = iterate.energy;
        let mut tracker = StepTracker::new();
        let mut alpha = alpha_t;
        let mut lower = T::zero();
        let mut upper: Option<T> = None;

        for trial in 0..ls.max_iterations {
            if alpha < ls.alpha_t_min {
                log::warn!(
                    "{}Backtracking: step {:e} fell below alpha_t_min",
                    params.line_prefix,
                    alpha.to_f64()
                );
                return Ok(LineSearchResult::failed(tracker.applied(), trial));
            }

            tracker.move_to(problem, direction, alpha);
            iterate.refresh(problem)?;
            let energy = iterate.energy;

            let sufficient_decrease = <T as Float>::is_finite(energy)
                && energy <= energy0 + ls.wolfe_energy * alpha * slope;

            if !sufficient_decrease {
                upper = Some(alpha);
            } else if self.curvature_safeguard
                && iterate.directional_derivative(problem, direction) < ls.wolfe_gradient * slope
            {
                lower = alpha;
            } else {
                return Ok(LineSearchResult::accepted(alpha, trial + 1));
            }

            alpha = match upper {
                Some(upper) => lower + ls.backtrack_factor * (upper - lower),
                None => alpha * ls.alpha_t_increase_factor,
            };
            log::debug!(
                "{}Backtracking: trial {} rejected, next step {:e}",
                params.line_prefix,
                trial,
                alpha.to_f64()
            );
        }

        log::warn!(
            "{}Backtracking: no acceptable step after {} trials",
            params.line_prefix,
            ls.max_iterations
        );
        Ok(LineSearchResult::failed(tracker.applied(), ls.max_iterations))
    }

    fn name(&self) -> &str {
        "Backtracking"
    }
}

/// Quadratic interpolation line search.
///
/// Samples the energy alone at `αT`, fits the parabola through `φ(0)`,
/// `φ'(0)` and `φ(αT)`, and moves to its minimum. The trial step is
/// adjusted up to `n_alpha_adjust_max` times when the sample is
/// uninformative:
///
/// - non-finite energy: `αT ← αT · reduce`
/// - non-positive curvature: `αT ← αT · increase`
/// - predicted step more than `increase · αT`: `αT ← αT · increase`
/// - predicted step less than `reduce · αT`: `αT ← αT · reduce`
///
/// The predicted step is accepted once it does not raise the energy;
/// otherwise it is reduced, again at most `n_alpha_adjust_max` times.
/// On a quadratic objective the first prediction is exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticLineSearch;

impl QuadraticLineSearch {
    /// Creates the quadratic line search.
    pub fn new() -> Self {
        Self
    }
}

impl<T> LineSearch<T> for QuadraticLineSearch
where
    T: Scalar,
{
    fn linmin<P>(
        &mut self,
        problem: &mut P,
        params: &MinimizeParams<T>,
        direction: &P::Vector,
        alpha_t: T,
        iterate: &mut Iterate<T, P::Vector>,
    ) -> Result<LineSearchResult<T>>
    where
        P: Minimizable<T>,
    {
        let ls = &params.line_search;
        let Some(slope) = descent_slope(problem, params, direction, iterate) else {
            return Ok(LineSearchResult::failed(T::zero(), 0));
        };

        let energy0 = iterate.energy;
        let two = <T as Scalar>::from_f64(2.0);
        let mut tracker = StepTracker::new();
        let mut evals = 0;
        let mut alpha_t = alpha_t;
        let mut predicted = None;

        for _ in 0..ls.n_alpha_adjust_max {
            if alpha_t < ls.alpha_t_min {
                log::warn!(
                    "{}Quad: alphaT below alpha_t_min",
                    params.line_prefix
                );
                return Ok(LineSearchResult::failed(tracker.applied(), evals));
            }

            tracker.move_to(problem, direction, alpha_t);
            let energy = problem.compute_energy()?;
            let trial_energy = problem.sync(energy);
            evals += 1;

            if !<T as Float>::is_finite(trial_energy) {
                log::debug!(
                    "{}Quad: energy not finite at alphaT = {:e}, reducing",
                    params.line_prefix,
                    alpha_t.to_f64()
                );
                alpha_t *= ls.alpha_t_reduce_factor;
                continue;
            }

            let curvature = (trial_energy - (energy0 + alpha_t * slope)) / (alpha_t * alpha_t);
            if curvature <= T::zero() {
                log::debug!(
                    "{}Quad: wrong curvature at alphaT = {:e}, increasing",
                    params.line_prefix,
                    alpha_t.to_f64()
                );
                alpha_t *= ls.alpha_t_increase_factor;
                continue;
            }

            let alpha = -slope / (two * curvature);
            if alpha / alpha_t > ls.alpha_t_increase_factor {
                log::debug!(
                    "{}Quad: predicted step too large, increasing alphaT",
                    params.line_prefix
                );
                alpha_t *= ls.alpha_t_increase_factor;
                continue;
            }
            if alpha / alpha_t < ls.alpha_t_reduce_factor {
                log::debug!(
                    "{}Quad: predicted step too small, reducing alphaT",
                    params.line_prefix
                );
                alpha_t *= ls.alpha_t_reduce_factor;
                continue;
            }

            predicted = Some(alpha);
            break;
        }

        let Some(mut alpha) = predicted else {
            log::warn!(
                "{}Quad: no usable trial step after {} adjustments",
                params.line_prefix,
                ls.n_alpha_adjust_max
            );
            return Ok(LineSearchResult::failed(tracker.applied(), evals));
        };

        for _ in 0..ls.n_alpha_adjust_max {
            tracker.move_to(problem, direction, alpha);
            iterate.refresh(problem)?;
            evals += 1;

            if <T as Float>::is_finite(iterate.energy) && iterate.energy <= energy0 {
                return Ok(LineSearchResult::accepted(alpha, evals));
            }

            log::debug!(
                "{}Quad: energy increased at alpha = {:e}, reducing",
                params.line_prefix,
                alpha.to_f64()
            );
            alpha *= ls.alpha_t_reduce_factor;
        }

        log::warn!(
            "{}Quad: energy did not decrease after {} reductions",
            params.line_prefix,
            ls.n_alpha_adjust_max
        );
        Ok(LineSearchResult::failed(tracker.applied(), evals))
    }

    fn name(&self) -> &str {
        "Quad"
    }
}

/// Line search satisfying the strong Wolfe conditions.
///
/// Bracketing expands the step by `alpha_t_increase_factor` until the
/// energy rises or the slope turns positive; the zoom phase then shrinks
/// the bracket with safeguarded cubic interpolation. Interpolated steps
/// closer than `safeguard` (as a fraction of the bracket width) to either
/// end are replaced by bisection.
#[derive(Debug, Clone)]
pub struct StrongWolfeLineSearch {
    safeguard: f64,
}

impl StrongWolfeLineSearch {
    /// Creates a strong Wolfe line search with a 10% interpolation safeguard.
    pub fn new() -> Self {
        Self { safeguard: 0.1 }
    }

    /// Sets the interpolation safeguard, clamped to `[0, 0.5]`.
    pub fn with_safeguard(mut self, safeguard: f64) -> Self {
        self.safeguard = safeguard.clamp(0.0, 0.5);
        self
    }
}

impl Default for StrongWolfeLineSearch {
    fn default() -> Self {
        Self::new()
    }
}

/// A sample `(α, φ(α), φ'(α))` of the line function.
#[derive(Debug, Clone, Copy)]
struct LinePoint<T> {
    alpha: T,
    energy: T,
    slope: T,
}

/// Minimizer of the cubic interpolating two line samples.
fn cubic_minimizer<T: Scalar>(a: LinePoint<T>, b: LinePoint<T>) -> Option<T> {
    let three = <T as Scalar>::from_f64(3.0);
    let two = <T as Scalar>::from_f64(2.0);
    let theta = a.slope + b.slope - three * (a.energy - b.energy) / (a.alpha - b.alpha);
    let discriminant = theta * theta - a.slope * b.slope;
    if discriminant < T::zero() {
        return None;
    }
    let gamma = <T as Float>::copysign(<T as Float>::sqrt(discriminant), b.alpha - a.alpha);
    Some(
        b.alpha
            - (b.alpha - a.alpha) * (b.slope + gamma - theta)
                / (b.slope - a.slope + two * gamma),
    )
}

impl StrongWolfeLineSearch {
    #[allow(clippy::too_many_arguments)]
    fn zoom<T, P>(
        &self,
        problem: &mut P,
        params: &MinimizeParams<T>,
        direction: &P::Vector,
        iterate: &mut Iterate<T, P::Vector>,
        tracker: &mut StepTracker<T>,
        origin: LinePoint<T>,
        mut lo: LinePoint<T>,
        mut hi: LinePoint<T>,
        mut evals: usize,
    ) -> Result<LineSearchResult<T>>
    where
        T: Scalar,
        P: Minimizable<T>,
    {
        let ls = &params.line_search;
        let margin = <T as Scalar>::from_f64(self.safeguard);
        let half = <T as Scalar>::from_f64(0.5);

        for _ in 0..ls.max_iterations {
            let left = <T as Float>::min(lo.alpha, hi.alpha);
            let right = <T as Float>::max(lo.alpha, hi.alpha);
            let width = right - left;
            let interpolated = if <T as Float>::is_finite(hi.energy) {
                cubic_minimizer(lo, hi)
            } else {
                None
            };
            let alpha = match interpolated {
                Some(a) if a >= left + margin * width && a <= right - margin * width => a,
                _ => half * (lo.alpha + hi.alpha),
            };

            tracker.move_to(problem, direction, alpha);
            iterate.refresh(problem)?;
            evals += 1;
            let point = LinePoint {
                alpha,
                energy: iterate.energy,
                slope: iterate.directional_derivative(problem, direction),
            };

            if !<T as Float>::is_finite(point.energy)
                || point.energy > origin.energy + ls.wolfe_energy * alpha * origin.slope
                || point.energy >= lo.energy
            {
                hi = point;
            } else {
                if <T as Float>::abs(point.slope) <= -ls.wolfe_gradient * origin.slope {
                    return Ok(LineSearchResult::accepted(alpha, evals));
                }
                if point.slope * (hi.alpha - lo.alpha) >= T::zero() {
                    hi = lo;
                }
                lo = point;
            }

            if <T as Float>::abs(hi.alpha - lo.alpha) < ls.alpha_t_min {
                break;
            }
        }

        log::warn!(
            "{}CubicWolfe: zoom did not find an acceptable step",
            params.line_prefix
        );
        Ok(LineSearchResult::failed(tracker.applied(), evals))
    }
}

impl<T> LineSearch<T> for StrongWolfeLineSearch
where
    T: Scalar,
{
    fn linmin<P>(
        &mut self,
        problem: &mut P,
        params: &MinimizeParams<T>,
        direction: &P::Vector,
        alpha_t: T,
        iterate: &mut Iterate<T, P::Vector>,
    ) -> Result<LineSearchResult<T>>
    where
        P: Minimizable<T>,
    {
        let ls = &params.line_search;
        let Some(slope) = descent_slope(problem, params, direction, iterate) else {
            return Ok(LineSearchResult::failed(T::zero(), 0));
        };

        let origin = LinePoint {
            alpha: T::zero(),
            energy: iterate.energy,
            slope,
        };
        let mut tracker = StepTracker::new();
        let mut previous = origin;
        let mut alpha = alpha_t;

        for trial in 0..ls.max_iterations {
            tracker.move_to(problem, direction, alpha);
            iterate.refresh(problem)?;
            let point = LinePoint {
                alpha,
                energy: iterate.energy,
                slope: iterate.directional_derivative(problem, direction),
            };
            let evals = trial + 1;

            if !<T as Float>::is_finite(point.energy)
                || point.energy > origin.energy + ls.wolfe_energy * alpha * slope
                || (trial > 0 && point.energy >= previous.energy)
            {
                return self.zoom(
                    problem, params, direction, iterate, &mut tracker, origin, previous, point,
                    evals,
                );
            }

            if <T as Float>::abs(point.slope) <= -ls.wolfe_gradient * slope {
                return Ok(LineSearchResult::accepted(alpha, evals));
            }

            if point.slope >= T::zero() {
                return self.zoom(
                    problem, params, direction, iterate, &mut tracker, origin, point, previous,
                    evals,
                );
            }

            previous = point;
            alpha *= ls.alpha_t_increase_factor;
        }

        log::warn!(
            "{}CubicWolfe: bracketing did not terminate",
            params.line_prefix
        );
        Ok(LineSearchResult::failed(tracker.applied(), ls.max_iterations))
    }

    fn name(&self) -> &str {
        "CubicWolfe"
    }
}
