//! The objective oracle a host implements to be minimized.
//!
//! A `Minimizable` owns the problem state. The minimizer never sees the state
//! variable itself: it moves the state with [`Minimizable::step`] and asks for
//! the energy and gradients at the current state with
//! [`Minimizable::compute`].
//!
//! # Collective reductions
//!
//! When the host is distributed, every participant runs the same driver.
//! Any scalar that decides control flow must be identical on all of them, so
//! the driver and the line searches pass each such scalar through
//! [`Minimizable::sync`]. A single-process host keeps the default identity.

use crate::core::{error::Result, types::Scalar, vector::VectorSpace};
use num_traits::Float;

/// Problem interface consumed by the minimizer and its line searches.
pub trait Minimizable<T: Scalar> {
    /// Vector type of the state variable, gradient and search direction.
    type Vector: VectorSpace<T>;

    /// Storage for a gradient-shaped vector at the current state.
    ///
    /// The contents are overwritten by `compute` before being read.
    fn new_vector(&self) -> Self::Vector;

    /// Moves the state along `direction` by `alpha`.
    fn step(&mut self, direction: &Self::Vector, alpha: T);

    /// Energy at the current state.
    ///
    /// Writes the gradient into `gradient` and the preconditioned gradient
    /// `K g` into `kgradient`.
    fn compute(&mut self, gradient: &mut Self::Vector, kgradient: &mut Self::Vector) -> Result<T>;

    /// Energy at the current state, without gradients.
    ///
    /// Line searches that only sample the energy call this. Hosts with a
    /// cheaper energy-only path should override it.
    fn compute_energy(&mut self) -> Result<T> {
        let mut gradient = self.new_vector();
        let mut kgradient = self.new_vector();
        self.compute(&mut gradient, &mut kgradient)
    }

    /// Projects `direction` onto the admissible subspace.
    fn constrain(&self, _direction: &mut Self::Vector) {}

    /// Upper bound on a trial step along `direction`.
    fn safe_step_size(&self, _direction: &Self::Vector) -> T {
        <T as Float>::infinity()
    }

    /// Collective reduction of a scalar.
    ///
    /// Must return the same value on every participant.
    fn sync(&self, value: T) -> T {
        value
    }

    /// Reporting hook, called at the start of every iteration.
    ///
    /// Returns `true` if the hook modified the state, which makes the driver
    /// recompute the energy and discard its history.
    fn report(&mut self, _iteration: usize) -> bool {
        false
    }

    /// Gradient measure used when `max_threshold` is set.
    fn max_calculator(&self, kgradient: &Self::Vector) -> T {
        self.sync(kgradient.norm_max())
    }
}

/// Energy, gradient and preconditioned gradient at the current state.
#[derive(Debug, Clone)]
pub struct Iterate<T, V> {
    /// Energy `E`
    pub energy: T,
    /// Gradient `g`
    pub gradient: V,
    /// Preconditioned gradient `K g`
    pub kgradient: V,
}

impl<T: Scalar, V: VectorSpace<T>> Iterate<T, V> {
    /// Evaluates the problem at its current state.
    pub fn evaluate<P>(problem: &mut P) -> Result<Self>
    where
        P: Minimizable<T, Vector = V>,
    {
        let mut gradient = problem.new_vector();
        let mut kgradient = problem.new_vector();
        let energy = problem.compute(&mut gradient, &mut kgradient)?;
        Ok(Self {
            energy: problem.sync(energy),
            gradient,
            kgradient,
        })
    }

    /// Re-evaluates the problem in place, reusing the gradient storage.
    pub fn refresh<P>(&mut self, problem: &mut P) -> Result<()>
    where
        P: Minimizable<T, Vector = V>,
    {
        let energy = problem.compute(&mut self.gradient, &mut self.kgradient)?;
        self.energy = problem.sync(energy);
        Ok(())
    }

    /// Synchronized `<g, d>`, the directional derivative along `direction`.
    pub fn directional_derivative<P>(&self, problem: &P, direction: &V) -> T
    where
        P: Minimizable<T, Vector = V>,
    {
        problem.sync(self.gradient.dot(direction))
    }
}
