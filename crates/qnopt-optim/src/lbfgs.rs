//! Preconditioned L-BFGS minimizer.
//!
//! L-BFGS (Limited-memory Broyden-Fletcher-Goldfarb-Shanno) approximates the
//! inverse Hessian from the last few state and gradient changes. Here the
//! changes are stored preconditioned (`Ky = K y`) so the recursion works
//! directly on `K g` and the host's preconditioner acts as the seed metric.
//!
//! # Iteration
//!
//! 1. Call the host's `report` hook; if it modified the state, recompute
//!    and discard the history
//! 2. Log the iteration line and test convergence, non-finite values and
//!    the iteration budget, in that order
//! 3. Build `d = -H K g` with the two-loop recursion and constrain it
//! 4. Evict the oldest history entry if the history is full
//! 5. Line-minimize along `d` from `αT = min(alpha_t_start, safe_step_size(d))`
//! 6. Commit `(α d, K g - K g_prev, 1/<y, α d>)` to the history
//!
//! # Line-search failure
//!
//! A failed line search is undone and the history discarded; the next
//! iteration restarts along `-K g`. A failure along `-K g` itself means the
//! energy cannot be lowered at this precision and ends the run with
//! [`TerminationReason::LineSearchFailed`]. With `abort_on_failed_step`
//! any failure is returned as [`MinimizeError::StepFailed`] instead.
//!
//! # Cautious updates
//!
//! A pair with `<y, s> ≤ 0` would make the inverse Hessian estimate
//! indefinite. By default such a pair is dropped and the history cleared,
//! so the next iteration restarts along `-K g`. Line searches that enforce
//! a curvature condition never produce these pairs.
//!
//! # Examples
//!
//! ```rust
//! use qnopt_core::prelude::*;
//! use qnopt_optim::LBFGS;
//!
//! # struct Parabola { x: DVector<f64> }
//! # impl Minimizable<f64> for Parabola {
//! #     type Vector = DVector<f64>;
//! #     fn new_vector(&self) -> DVector<f64> { DVector::zeros(self.x.len()) }
//! #     fn step(&mut self, d: &DVector<f64>, alpha: f64) { self.x.axpy(alpha, d, 1.0); }
//! #     fn compute(&mut self, g: &mut DVector<f64>, kg: &mut DVector<f64>) -> Result<f64> {
//! #         g.copy_from(&self.x);
//! #         kg.copy_from(&self.x);
//! #         Ok(0.5 * self.x.norm_squared())
//! #     }
//! # }
//! let mut problem = Parabola { x: DVector::from_vec(vec![1.0, -2.0]) };
//! let params = MinimizeParams::new().with_knorm_threshold(1e-10);
//!
//! let mut lbfgs = LBFGS::new(QuadraticLineSearch::new());
//! let result = lbfgs.minimize(&mut problem, &params)?;
//! assert!(result.converged);
//! # Ok::<(), MinimizeError>(())
//! ```

use crate::history::{History, HistoryEntry};
use qnopt_core::{
    ediff::EnergyDiffMonitor,
    error::{MinimizeError, Result},
    fd_test::finite_difference_test,
    line_search::LineSearch,
    logging::IterationLog,
    minimizable::{Iterate, Minimizable},
    params::MinimizeParams,
    result::{MinimizeResult, TerminationReason},
    types::Scalar,
    vector::VectorSpace,
};
use num_traits::Float;
use std::io::Write;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// L-BFGS minimizer driving a line search `L`.
///
/// # Examples
///
/// ```rust
/// use qnopt_core::prelude::*;
/// use qnopt_optim::LBFGS;
/// use std::sync::{atomic::AtomicBool, Arc};
///
/// let kill = Arc::new(AtomicBool::new(false));
/// let lbfgs: LBFGS<f64, _> = LBFGS::new(StrongWolfeLineSearch::new())
///     .with_kill_flag(Arc::clone(&kill))
///     .with_log_sink(std::io::stdout())
///     .with_cautious_updates(true);
/// assert_eq!(lbfgs.name(), "L-BFGS");
/// ```
#[derive(Debug)]
pub struct LBFGS<T, L>
where
    T: Scalar,
    L: LineSearch<T>,
{
    line_search: L,
    log: IterationLog,
    kill_flag: Option<Arc<AtomicBool>>,
    use_cautious_updates: bool,
    _phantom: PhantomData<T>,
}

impl<T, L> LBFGS<T, L>
where
    T: Scalar,
    L: LineSearch<T>,
{
    /// Creates a minimizer that logs through the `log` facade.
    pub fn new(line_search: L) -> Self {
        Self {
            line_search,
            log: IterationLog::to_log(),
            kill_flag: None,
            use_cautious_updates: true,
            _phantom: PhantomData,
        }
    }

    /// Writes the iteration log to `writer` instead of the `log` facade.
    pub fn with_log_sink<W>(mut self, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.log = IterationLog::to_writer(writer);
        self
    }

    /// Stops the run at the start of the next iteration once `flag` is set.
    pub fn with_kill_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.kill_flag = Some(flag);
        self
    }

    /// Enables or disables cautious updates: a pair with `<y, s> ≤ 0` is
    /// dropped and the history reset.
    pub fn with_cautious_updates(mut self, cautious: bool) -> Self {
        self.use_cautious_updates = cautious;
        self
    }

    /// Returns the line search.
    pub fn line_search(&self) -> &L {
        &self.line_search
    }

    /// Returns the optimizer name.
    pub fn name(&self) -> &str {
        "L-BFGS"
    }

    fn killed(&self) -> bool {
        self.kill_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Minimizes `problem` in place.
    ///
    /// On return the problem's state is the final iterate and
    /// `result.energy` its energy.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if `params` fail validation; the problem is
    ///   not touched
    /// - `StepFailed` if a line search fails while `abort_on_failed_step`
    ///   is set; the failed step is not undone
    /// - any error returned by the problem's `compute`
    pub fn minimize<P>(
        &mut self,
        problem: &mut P,
        params: &MinimizeParams<T>,
    ) -> Result<MinimizeResult<T>>
    where
        P: Minimizable<T>,
    {
        params.validate()?;
        let start = Instant::now();
        let prefix = params.line_prefix.as_str();

        if params.fd_test {
            finite_difference_test(problem, params, &mut self.log)?;
        }

        let mut iterate = Iterate::evaluate(problem)?;
        let mut stats = RunStats::new(start);
        let mut history: History<T, P::Vector> = History::new(params.history);
        let mut ediff = EnergyDiffMonitor::new(params.energy_diff_threshold, params.n_energy_diff);

        let mut alpha = T::zero();
        let mut linmin_test = T::zero();
        let mut iter = 0;

        let exhausted_reason = loop {
            if self.killed() {
                break TerminationReason::UserTerminated;
            }

            if problem.report(iter) {
                iterate.refresh(problem)?;
                stats.evaluations += 1;
                self.log.line(format_args!(
                    "{}\tState modified externally: resetting history.",
                    prefix
                ));
                history.clear();
                ediff.reset();
                stats.history_resets += 1;
            }

            let energy = iterate.energy;
            if <T as Float>::is_finite(energy) {
                stats.last_finite_energy = energy;
            }
            let gk_norm = problem.sync(iterate.gradient.dot(&iterate.kgradient));
            let knorm_value = if params.max_threshold {
                problem.max_calculator(&iterate.kgradient)
            } else {
                <T as Float>::sqrt(gk_norm / <T as Scalar>::from_usize(params.n_dim))
            };
            stats.gradient_norm = knorm_value;

            self.log_iteration(params, iter, energy, knorm_value, alpha, linmin_test, start);

            let mut converged = Vec::with_capacity(2);
            if <T as Float>::abs(knorm_value) < params.knorm_threshold {
                converged.push(format!(
                    "{}<{:.6e}",
                    params.knorm_name(),
                    params.knorm_threshold.to_f64()
                ));
            }
            if ediff.check_convergence(energy) {
                converged.push(format!(
                    "|Delta {}|<{:.6e} for {} iters",
                    params.energy_label,
                    params.energy_diff_threshold.to_f64(),
                    params.n_energy_diff
                ));
            }
            let required = if params.converge_all { 2 } else { 1 };
            if converged.len() >= required {
                self.log.line(format_args!(
                    "{}Converged ({}).",
                    prefix,
                    converged.join(", ")
                ));
                return Ok(stats.finish(TerminationReason::Converged, iter, energy));
            }

            if !<T as Float>::is_finite(gk_norm) {
                self.log.line(format_args!(
                    "{}|grad|_K={:e}. Stopping ...",
                    prefix,
                    gk_norm.try_to_f64().unwrap_or(f64::NAN)
                ));
                return Ok(stats.finish(TerminationReason::NonFiniteGradient, iter, energy));
            }
            if !<T as Float>::is_finite(energy) {
                self.log.line(format_args!(
                    "{}E={:e}. Stopping ...",
                    prefix,
                    energy.try_to_f64().unwrap_or(f64::NAN)
                ));
                return Ok(stats.finish(TerminationReason::NonFiniteEnergy, iter, energy));
            }
            if iter >= params.n_iterations {
                break TerminationReason::MaxIterations;
            }

            // Search direction; becomes the `s` of the next history entry.
            let mut d = history.direction(&iterate.kgradient, |x| problem.sync(x));
            history.evict_oldest_if_full();
            problem.constrain(&mut d);

            // Gradients before the step, turned into differences below.
            let mut y = iterate.gradient.clone();
            let mut ky = iterate.kgradient.clone();

            let alpha_t = <T as Float>::min(params.alpha_t_start, problem.safe_step_size(&d));
            let outcome = self
                .line_search
                .linmin(problem, params, &d, alpha_t, &mut iterate)?;
            stats.evaluations += outcome.function_evals;
            alpha = outcome.step_size;

            if !outcome.success {
                if params.abort_on_failed_step {
                    self.log.line(format_args!("{}\tStep failed: aborting.", prefix));
                    return Err(MinimizeError::step_failed(
                        iter,
                        alpha.try_to_f64().unwrap_or(f64::NAN),
                    ));
                }

                self.log.line(format_args!("{}\tUndoing step.", prefix));
                problem.step(&d, -alpha);
                iterate.refresh(problem)?;
                stats.evaluations += 1;

                if history.is_empty() {
                    self.log.line(format_args!(
                        "{}\tStep failed along negative gradient direction.",
                        prefix
                    ));
                    self.log.line(format_args!(
                        "{}Probably at roundoff error limit. (Stopping)",
                        prefix
                    ));
                    return Ok(stats.finish(TerminationReason::LineSearchFailed, iter, iterate.energy));
                }

                self.log.line(format_args!(
                    "{}\tStep failed: resetting history.",
                    prefix
                ));
                history.clear();
                stats.history_resets += 1;
                linmin_test = T::zero();
                iter += 1;
                continue;
            }

            let gg = problem.sync(iterate.gradient.dot(&iterate.gradient));
            let dd = problem.sync(d.dot(&d));
            linmin_test = problem.sync(iterate.gradient.dot(&d)) / <T as Float>::sqrt(gg * dd);

            d.scale_mut(alpha);
            ky.scale_mut(-T::one());
            ky.axpy(T::one(), &iterate.kgradient);
            y.scale_mut(-T::one());
            y.axpy(T::one(), &iterate.gradient);

            let ydots = problem.sync(y.dot(&d));
            if self.use_cautious_updates && !(ydots > T::zero() && <T as Float>::is_finite(ydots)) {
                self.log.line(format_args!(
                    "{}\tSkipping history update: <y,s> = {:e}",
                    prefix,
                    ydots.try_to_f64().unwrap_or(f64::NAN)
                ));
                // Next direction is -K g.
                if !history.is_empty() || history.gamma().is_some() {
                    self.log.line(format_args!("{}\tResetting history.", prefix));
                    history.clear();
                    stats.history_resets += 1;
                }
            } else {
                let gamma = ydots / problem.sync(y.dot(&ky));
                history.push(
                    HistoryEntry {
                        s: d,
                        ky,
                        rho: T::one() / ydots,
                    },
                    gamma,
                );
                debug_assert!(history.len() <= params.history);
            }

            iter += 1;
        };

        self.log.line(format_args!(
            "{}None of the convergence criteria satisfied after {} iterations.",
            prefix, iter
        ));
        Ok(stats.finish(exhausted_reason, iter, iterate.energy))
    }

    #[allow(clippy::too_many_arguments)]
    fn log_iteration(
        &mut self,
        params: &MinimizeParams<T>,
        iter: usize,
        energy: T,
        knorm_value: T,
        alpha: T,
        linmin_test: T,
        start: Instant,
    ) {
        let mut line = format!(
            "{}Iter: {:3}  {}: {}  {}: {:10.3e}",
            params.line_prefix,
            iter,
            params.energy_label,
            params.energy_format.format(energy),
            params.knorm_name(),
            knorm_value.try_to_f64().unwrap_or(f64::NAN)
        );
        if alpha != T::zero() {
            line.push_str(&format!("  alpha: {:10.3e}", alpha.to_f64()));
        }
        if linmin_test != T::zero() {
            line.push_str(&format!(
                "  linmin: {:10.3e}",
                linmin_test.try_to_f64().unwrap_or(f64::NAN)
            ));
        }
        line.push_str(&format!("  t[s]: {:9.2}", start.elapsed().as_secs_f64()));
        self.log.line(format_args!("{}", line));
    }
}

/// Counters reported in the result.
#[derive(Debug, Clone, Copy)]
struct RunStats<T> {
    start: Instant,
    evaluations: usize,
    history_resets: usize,
    last_finite_energy: T,
    gradient_norm: T,
}

impl<T: Scalar> RunStats<T> {
    fn new(start: Instant) -> Self {
        Self {
            start,
            evaluations: 1,
            history_resets: 0,
            last_finite_energy: <T as Float>::nan(),
            gradient_norm: T::zero(),
        }
    }

    fn finish(&self, reason: TerminationReason, iterations: usize, energy: T) -> MinimizeResult<T> {
        MinimizeResult::new(energy, iterations, self.start.elapsed(), reason)
            .with_last_finite_energy(self.last_finite_energy)
            .with_gradient_norm(self.gradient_norm)
            .with_function_evaluations(self.evaluations)
            .with_history_resets(self.history_resets)
    }
}
