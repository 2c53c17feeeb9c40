//! Host problems and line searches with scripted misbehavior.

#![allow(dead_code)]

use qnopt_core::prelude::*;
use qnopt_core::utils::test_problems::{QuadraticProblem, RosenbrockProblem};
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A quadratic host that can corrupt its output, rewind its state, raise a
/// kill flag or hold one component fixed at chosen points of the run.
#[derive(Debug)]
pub struct Host {
    pub inner: QuadraticProblem,
    start: DVector<f64>,
    steps: usize,
    nan_energy_after_steps: Option<usize>,
    nan_gradient: bool,
    rewind_at: Option<usize>,
    rewound: bool,
    kill_at: Option<(usize, Arc<AtomicBool>)>,
    frozen: Option<usize>,
    max_step: f64,
    pub sync_calls: Cell<usize>,
    pub reports: Vec<usize>,
}

impl Host {
    pub fn new(inner: QuadraticProblem) -> Self {
        Self {
            start: inner.state().clone(),
            inner,
            steps: 0,
            nan_energy_after_steps: None,
            nan_gradient: false,
            rewind_at: None,
            rewound: false,
            kill_at: None,
            frozen: None,
            max_step: f64::INFINITY,
            sync_calls: Cell::new(0),
            reports: Vec::new(),
        }
    }

    /// Energy turns NaN once `steps` calls to `step` have been made.
    pub fn nan_energy_after_steps(mut self, steps: usize) -> Self {
        self.nan_energy_after_steps = Some(steps);
        self
    }

    /// The first gradient component is always NaN.
    pub fn nan_gradient(mut self) -> Self {
        self.nan_gradient = true;
        self
    }

    /// The report hook moves the state back to the start once, at `iteration`.
    pub fn rewind_at(mut self, iteration: usize) -> Self {
        self.rewind_at = Some(iteration);
        self
    }

    /// The report hook raises `flag` at `iteration`.
    pub fn kill_at(mut self, iteration: usize, flag: Arc<AtomicBool>) -> Self {
        self.kill_at = Some((iteration, flag));
        self
    }

    /// Component `index` is held fixed: `compute` projects it out of the
    /// gradients and `constrain` zeroes it in every direction.
    pub fn frozen(mut self, index: usize) -> Self {
        self.frozen = Some(index);
        self
    }

    /// `safe_step_size` returns `max_step`.
    pub fn max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step;
        self
    }

    pub fn state(&self) -> &DVector<f64> {
        self.inner.state()
    }
}

impl Minimizable<f64> for Host {
    type Vector = DVector<f64>;

    fn new_vector(&self) -> DVector<f64> {
        self.inner.new_vector()
    }

    fn step(&mut self, direction: &DVector<f64>, alpha: f64) {
        self.steps += 1;
        self.inner.step(direction, alpha);
    }

    fn compute(&mut self, gradient: &mut DVector<f64>, kgradient: &mut DVector<f64>) -> Result<f64> {
        let energy = self.inner.compute(gradient, kgradient)?;
        if let Some(index) = self.frozen {
            gradient[index] = 0.0;
            kgradient[index] = 0.0;
        }
        if self.nan_gradient {
            gradient[0] = f64::NAN;
            kgradient[0] = f64::NAN;
        }
        match self.nan_energy_after_steps {
            Some(limit) if self.steps >= limit => Ok(f64::NAN),
            _ => Ok(energy),
        }
    }

    fn constrain(&self, direction: &mut DVector<f64>) {
        if let Some(index) = self.frozen {
            direction[index] = 0.0;
        }
    }

    fn safe_step_size(&self, _direction: &DVector<f64>) -> f64 {
        self.max_step
    }

    fn sync(&self, value: f64) -> f64 {
        self.sync_calls.set(self.sync_calls.get() + 1);
        value
    }

    fn report(&mut self, iteration: usize) -> bool {
        self.reports.push(iteration);
        if let Some((at, flag)) = &self.kill_at {
            if *at == iteration {
                flag.store(true, Ordering::Relaxed);
            }
        }
        if self.rewind_at == Some(iteration) && !self.rewound {
            self.rewound = true;
            self.inner.set_state(self.start.clone());
            return true;
        }
        false
    }
}

/// Wraps a line search and makes chosen calls fail after displacing the
/// state by a fixed amount along the direction.
#[derive(Debug)]
pub struct FailingLineSearch<L> {
    inner: L,
    fail_on_call: Option<usize>,
    displacement: f64,
    calls: usize,
}

impl<L> FailingLineSearch<L> {
    /// Every call fails.
    pub fn always(inner: L, displacement: f64) -> Self {
        Self {
            inner,
            fail_on_call: None,
            displacement,
            calls: 0,
        }
    }

    /// Only the `call`-th call (1-based) fails.
    pub fn once(inner: L, call: usize, displacement: f64) -> Self {
        Self {
            inner,
            fail_on_call: Some(call),
            displacement,
            calls: 0,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl<L: LineSearch<f64>> LineSearch<f64> for FailingLineSearch<L> {
    fn linmin<P>(
        &mut self,
        problem: &mut P,
        params: &MinimizeParams<f64>,
        direction: &P::Vector,
        alpha_t: f64,
        iterate: &mut Iterate<f64, P::Vector>,
    ) -> Result<LineSearchResult<f64>>
    where
        P: Minimizable<f64>,
    {
        self.calls += 1;
        let fails = self.fail_on_call.map_or(true, |call| call == self.calls);
        if fails {
            problem.step(direction, self.displacement);
            return Ok(LineSearchResult::failed(self.displacement, 0));
        }
        self.inner.linmin(problem, params, direction, alpha_t, iterate)
    }

    fn name(&self) -> &str {
        "Failing"
    }
}

/// `E(x) = cos(x)` in one dimension; has negative curvature near zero.
#[derive(Debug)]
pub struct CosineProblem {
    pub x: f64,
}

impl Minimizable<f64> for CosineProblem {
    type Vector = DVector<f64>;

    fn new_vector(&self) -> DVector<f64> {
        DVector::zeros(1)
    }

    fn step(&mut self, direction: &DVector<f64>, alpha: f64) {
        self.x += alpha * direction[0];
    }

    fn compute(&mut self, gradient: &mut DVector<f64>, kgradient: &mut DVector<f64>) -> Result<f64> {
        gradient[0] = -self.x.sin();
        kgradient[0] = gradient[0];
        Ok(self.x.cos())
    }
}

/// Rosenbrock host that records the energy of the iterate at every `report`.
#[derive(Debug)]
pub struct EnergyRecorder {
    pub inner: RosenbrockProblem,
    last_energy: f64,
    pub energies: Vec<f64>,
}

impl EnergyRecorder {
    pub fn new(inner: RosenbrockProblem) -> Self {
        Self {
            inner,
            last_energy: f64::NAN,
            energies: Vec::new(),
        }
    }
}

impl Minimizable<f64> for EnergyRecorder {
    type Vector = DVector<f64>;

    fn new_vector(&self) -> DVector<f64> {
        self.inner.new_vector()
    }

    fn step(&mut self, direction: &DVector<f64>, alpha: f64) {
        self.inner.step(direction, alpha);
    }

    // Under backtracking the last evaluation before `report` is the iterate.
    fn compute(&mut self, gradient: &mut DVector<f64>, kgradient: &mut DVector<f64>) -> Result<f64> {
        self.last_energy = self.inner.compute(gradient, kgradient)?;
        Ok(self.last_energy)
    }

    fn report(&mut self, _iteration: usize) -> bool {
        self.energies.push(self.last_energy);
        false
    }
}
