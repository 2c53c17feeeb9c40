//! Vector algebra required by the minimizer.
//!
//! The minimizer never looks inside a vector. Everything it needs is the
//! handful of operations below, so a host can plug in distributed or
//! GPU-resident data as long as it supplies them. Inner products returned
//! here are local values; the driver routes every one of them through
//! [`Minimizable::sync`](crate::core::minimizable::Minimizable::sync) before
//! branching on it.

use crate::core::types::Scalar;
use nalgebra::{allocator::Allocator, DefaultAllocator, Dim, Matrix, OVector};
use std::fmt::Debug;

/// An element of a real inner-product space.
///
/// `Clone` must produce an independent copy; the remaining operations act
/// in place.
pub trait VectorSpace<T: Scalar>: Clone + Debug {
    /// Inner product `<self, other>`.
    fn dot(&self, other: &Self) -> T;

    /// `self <- self + alpha * x`.
    fn axpy(&mut self, alpha: T, x: &Self);

    /// `self <- alpha * self`.
    fn scale_mut(&mut self, alpha: T);

    /// Largest absolute component.
    ///
    /// Used by the default `max_calculator` when the gradient criterion is
    /// switched to a max-norm.
    fn norm_max(&self) -> T;
}

impl<T, D> VectorSpace<T> for OVector<T, D>
where
    T: Scalar,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    fn dot(&self, other: &Self) -> T {
        Matrix::dot(self, other)
    }

    fn axpy(&mut self, alpha: T, x: &Self) {
        Matrix::axpy(self, alpha, x, T::one());
    }

    fn scale_mut(&mut self, alpha: T) {
        Matrix::scale_mut(self, alpha);
    }

    fn norm_max(&self) -> T {
        self.amax()
    }
}
