//! Small objectives for tests and benchmarks.

#![cfg(any(test, feature = "test-utils"))]

use crate::{
    error::{MinimizeError, Result},
    minimizable::Minimizable,
    types::{DMatrix, DVector},
};

/// `E(x) = ½ xᵀ A x - bᵀ x` with an optional preconditioner `K`.
///
/// Starts at the origin. Counts `compute` and `compute_energy` calls.
#[derive(Debug, Clone)]
pub struct QuadraticProblem {
    a: DMatrix<f64>,
    b: DVector<f64>,
    preconditioner: Option<DMatrix<f64>>,
    gradient_scale: f64,
    x: DVector<f64>,
    computes: usize,
    energy_computes: usize,
}

impl QuadraticProblem {
    /// Creates the problem for a square `a` and matching `b`.
    pub fn new(a: DMatrix<f64>, b: DVector<f64>) -> Result<Self> {
        if !a.is_square() || a.nrows() != b.len() {
            return Err(MinimizeError::dimension_mismatch(
                format!("{}x{} matrix for {} unknowns", b.len(), b.len(), b.len()),
                format!("{}x{}", a.nrows(), a.ncols()),
            ));
        }
        let n = b.len();
        Ok(Self {
            a,
            b,
            preconditioner: None,
            gradient_scale: 1.0,
            x: DVector::zeros(n),
            computes: 0,
            energy_computes: 0,
        })
    }

    /// Diagonal `A`.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    pub fn diagonal(diag: &[f64], b: &[f64]) -> Self {
        assert_eq!(diag.len(), b.len(), "diagonal and b must have equal length");
        Self {
            a: DMatrix::from_diagonal(&DVector::from_column_slice(diag)),
            b: DVector::from_column_slice(b),
            preconditioner: None,
            gradient_scale: 1.0,
            x: DVector::zeros(b.len()),
            computes: 0,
            energy_computes: 0,
        }
    }

    /// Uses `k` as the preconditioner, so that `Kg = k * g`.
    pub fn with_preconditioner(mut self, k: DMatrix<f64>) -> Result<Self> {
        if k.shape() != self.a.shape() {
            return Err(MinimizeError::dimension_mismatch(
                format!("{}x{}", self.a.nrows(), self.a.ncols()),
                format!("{}x{}", k.nrows(), k.ncols()),
            ));
        }
        self.preconditioner = Some(k);
        Ok(self)
    }

    /// Moves the starting point.
    pub fn with_start(mut self, x0: DVector<f64>) -> Result<Self> {
        if x0.len() != self.x.len() {
            return Err(MinimizeError::dimension_mismatch(self.x.len(), x0.len()));
        }
        self.x = x0;
        Ok(self)
    }

    /// Reports `scale * g` instead of the true gradient.
    pub fn with_gradient_scale(mut self, scale: f64) -> Self {
        self.gradient_scale = scale;
        self
    }

    /// Current state.
    pub fn state(&self) -> &DVector<f64> {
        &self.x
    }

    /// Overwrites the state.
    pub fn set_state(&mut self, x: DVector<f64>) {
        self.x = x;
    }

    /// Number of `compute` calls so far.
    pub fn compute_count(&self) -> usize {
        self.computes
    }

    /// Number of `compute_energy` calls so far.
    pub fn energy_count(&self) -> usize {
        self.energy_computes
    }

    /// Exact minimizer `A⁻¹ b`, if `A` is invertible.
    pub fn minimizer(&self) -> Option<DVector<f64>> {
        self.a.clone().lu().solve(&self.b)
    }

    /// Energy at an arbitrary point.
    pub fn energy_at(&self, x: &DVector<f64>) -> f64 {
        0.5 * x.dot(&(&self.a * x)) - self.b.dot(x)
    }
}

impl Minimizable<f64> for QuadraticProblem {
    type Vector = DVector<f64>;

    fn new_vector(&self) -> DVector<f64> {
        DVector::zeros(self.x.len())
    }

    fn step(&mut self, direction: &DVector<f64>, alpha: f64) {
        self.x.axpy(alpha, direction, 1.0);
    }

    fn compute(&mut self, gradient: &mut DVector<f64>, kgradient: &mut DVector<f64>) -> Result<f64> {
        self.computes += 1;
        *gradient = (&self.a * &self.x - &self.b) * self.gradient_scale;
        *kgradient = match &self.preconditioner {
            Some(k) => k * &*gradient,
            None => gradient.clone(),
        };
        Ok(self.energy_at(&self.x))
    }

    fn compute_energy(&mut self) -> Result<f64> {
        self.energy_computes += 1;
        Ok(self.energy_at(&self.x))
    }
}

/// The Rosenbrock function `(1 - x)² + 100 (y - x²)²`, minimum 0 at `(1, 1)`.
#[derive(Debug, Clone)]
pub struct RosenbrockProblem {
    x: DVector<f64>,
    computes: usize,
}

impl RosenbrockProblem {
    /// Starts at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: DVector::from_vec(vec![x, y]),
            computes: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> &DVector<f64> {
        &self.x
    }

    /// Number of `compute` calls so far.
    pub fn compute_count(&self) -> usize {
        self.computes
    }

    fn energy(&self) -> f64 {
        let (x0, x1) = (self.x[0], self.x[1]);
        (1.0 - x0).powi(2) + 100.0 * (x1 - x0 * x0).powi(2)
    }
}

impl Minimizable<f64> for RosenbrockProblem {
    type Vector = DVector<f64>;

    fn new_vector(&self) -> DVector<f64> {
        DVector::zeros(2)
    }

    fn step(&mut self, direction: &DVector<f64>, alpha: f64) {
        self.x.axpy(alpha, direction, 1.0);
    }

    fn compute(&mut self, gradient: &mut DVector<f64>, kgradient: &mut DVector<f64>) -> Result<f64> {
        self.computes += 1;
        let (x0, x1) = (self.x[0], self.x[1]);
        gradient[0] = -2.0 * (1.0 - x0) - 400.0 * x0 * (x1 - x0 * x0);
        gradient[1] = 200.0 * (x1 - x0 * x0);
        kgradient.copy_from(gradient);
        Ok(self.energy())
    }

    fn compute_energy(&mut self) -> Result<f64> {
        self.computes += 1;
        Ok(self.energy())
    }
}
