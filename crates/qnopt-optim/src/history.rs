//! Bounded L-BFGS history and the two-loop recursion.
//!
//! Each entry stores the state change `s = α d`, the preconditioned gradient
//! change `Ky = K (g - g_prev)` and `ρ = 1 / <y, s>`. Applied to `K g`, the
//! two-loop recursion produces `H K g`, where `H` is the L-BFGS inverse
//! Hessian estimate seeded with `γ = <y, s> / <y, Ky>` of the newest pair:
//!
//! ```text
//! d = K g
//! for i = newest .. oldest:
//!     a_i = ρ_i <s_i, d>
//!     d  -= a_i Ky_i
//! d *= γ                       (skipped while no entry has been committed)
//! for i = oldest .. newest:
//!     b  = ρ_i <Ky_i, d>
//!     d += (a_i - b) s_i
//! return -d
//! ```

use qnopt_core::{types::Scalar, vector::VectorSpace};
use std::collections::VecDeque;

/// One `(s, Ky, ρ)` triple.
#[derive(Debug, Clone)]
pub struct HistoryEntry<T, V> {
    /// Change of state `α d`
    pub s: V,
    /// Change of preconditioned gradient `K g - K g_prev`
    pub ky: V,
    /// `1 / <y, s>`
    pub rho: T,
}

/// Oldest-to-newest ring of at most `capacity` entries, plus the scaling
/// factor `γ` that belongs to them.
#[derive(Debug, Clone)]
pub struct History<T, V> {
    capacity: usize,
    entries: VecDeque<HistoryEntry<T, V>>,
    gamma: Option<T>,
}

impl<T, V> History<T, V>
where
    T: Scalar,
    V: VectorSpace<T>,
{
    /// Creates an empty history holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            gamma: None,
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry is held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the next commit would exceed the capacity.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Current scaling factor, `None` until the first commit after a reset.
    pub fn gamma(&self) -> Option<T> {
        self.gamma
    }

    /// Entries from oldest to newest.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry<T, V>> + '_ {
        self.entries.iter()
    }

    /// Drops every entry and the scaling factor.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.gamma = None;
    }

    /// Drops the oldest entry if the history is full.
    ///
    /// Called before the line search so the evicted vectors are released
    /// before new ones are allocated.
    pub fn evict_oldest_if_full(&mut self) -> bool {
        if self.is_full() {
            self.entries.pop_front().is_some()
        } else {
            false
        }
    }

    /// Appends `entry` as the newest and sets `γ`.
    pub fn push(&mut self, entry: HistoryEntry<T, V>, gamma: T) {
        while self.is_full() && self.entries.pop_front().is_some() {}
        self.entries.push_back(entry);
        self.gamma = Some(gamma);
    }

    /// Search direction `-H Kg` for the preconditioned gradient `kgradient`.
    ///
    /// Every inner product is passed through `sync` before it is used.
    pub fn direction<F>(&self, kgradient: &V, sync: F) -> V
    where
        F: Fn(T) -> T,
    {
        let mut d = kgradient.clone();
        let mut a = Vec::with_capacity(self.entries.len());

        for entry in self.entries.iter().rev() {
            let a_i = entry.rho * sync(entry.s.dot(&d));
            d.axpy(-a_i, &entry.ky);
            a.push(a_i);
        }

        if let Some(gamma) = self.gamma {
            d.scale_mut(gamma);
        }

        for entry in self.entries.iter() {
            let b = entry.rho * sync(entry.ky.dot(&d));
            if let Some(a_i) = a.pop() {
                d.axpy(a_i - b, &entry.s);
            }
        }

        d.scale_mut(-T::one());
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};
    use proptest::prelude::*;
    use std::cell::Cell;

    fn entry(s: &[f64], ky: &[f64], rho: f64) -> HistoryEntry<f64, DVector<f64>> {
        HistoryEntry {
            s: DVector::from_column_slice(s),
            ky: DVector::from_column_slice(ky),
            rho,
        }
    }

    #[test]
    fn test_empty_history_is_steepest_descent() {
        let history = History::<f64, DVector<f64>>::new(3);
        let kg = DVector::from_vec(vec![1.0, -2.0]);
        let d = history.direction(&kg, |x| x);
        assert_relative_eq!(d, DVector::from_vec(vec![-1.0, 2.0]));
        assert_eq!(history.gamma(), None);
    }

    #[test]
    fn test_capacity_and_eviction() {
        let mut history = History::new(2);
        history.push(entry(&[1.0], &[1.0], 1.0), 1.0);
        history.push(entry(&[2.0], &[1.0], 0.5), 2.0);
        assert!(history.is_full());

        assert!(history.evict_oldest_if_full());
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries().next().map(|e| e.s[0]), Some(2.0));
        assert!(!history.evict_oldest_if_full());

        history.push(entry(&[3.0], &[1.0], 1.0 / 3.0), 3.0);
        history.push(entry(&[4.0], &[1.0], 0.25), 4.0);
        assert_eq!(history.len(), 2);
        let newest: Vec<f64> = history.entries().map(|e| e.s[0]).collect();
        assert_eq!(newest, vec![3.0, 4.0]);
        assert_eq!(history.gamma(), Some(4.0));
    }

    #[test]
    fn test_clear_resets_gamma() {
        let mut history = History::new(2);
        history.push(entry(&[1.0], &[1.0], 1.0), 0.7);
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.gamma(), None);
    }

    #[test]
    fn test_sync_sees_every_inner_product() {
        let mut history = History::new(4);
        history.push(entry(&[1.0, 0.0], &[2.0, 0.0], 0.5), 0.5);
        history.push(entry(&[0.0, 1.0], &[0.0, 4.0], 0.25), 0.25);

        let calls = Cell::new(0);
        let kg = DVector::from_vec(vec![1.0, 1.0]);
        let d = history.direction(&kg, |x| {
            calls.set(calls.get() + 1);
            x
        });

        assert_eq!(calls.get(), 4);
        // Exact inverse Hessian of diag(2, 4) applied to (1, 1).
        assert_relative_eq!(d, DVector::from_vec(vec![-0.5, -0.25]), epsilon = 1e-14);
    }

    /// Dense BFGS inverse update, `H <- (I - ρ s yᵀ) H (I - ρ y sᵀ) + ρ s sᵀ`.
    fn dense_inverse_hessian(pairs: &[(DVector<f64>, DVector<f64>)], n: usize) -> DMatrix<f64> {
        let identity = DMatrix::<f64>::identity(n, n);
        let mut h = identity.clone();
        if let Some((s, y)) = pairs.last() {
            h *= s.dot(y) / y.dot(y);
        }
        for (s, y) in pairs {
            let rho = 1.0 / y.dot(s);
            let left = &identity - s * y.transpose() * rho;
            let right = &identity - y * s.transpose() * rho;
            h = &left * h * &right + s * s.transpose() * rho;
        }
        h
    }

    proptest! {
        #[test]
        fn prop_two_loop_matches_dense_bfgs(
            diag in prop::collection::vec(0.5f64..5.0, 3),
            steps in prop::collection::vec(prop::collection::vec(-1.0f64..1.0, 3), 1..4),
            g in prop::collection::vec(-1.0f64..1.0, 3),
        ) {
            // y = A s with A positive definite keeps every <y, s> positive.
            let a = DMatrix::from_diagonal(&DVector::from_column_slice(&diag));
            let mut pairs = Vec::new();
            let mut history = History::new(steps.len());
            for step in &steps {
                let s = DVector::from_column_slice(step);
                prop_assume!(s.norm() > 0.1);
                let y = &a * &s;
                let ys = y.dot(&s);
                history.push(
                    HistoryEntry { s: s.clone(), ky: y.clone(), rho: 1.0 / ys },
                    ys / y.dot(&y),
                );
                pairs.push((s, y));
            }

            let g = DVector::from_column_slice(&g);
            let d = history.direction(&g, |x| x);
            let expected = -(dense_inverse_hessian(&pairs, 3) * &g);
            prop_assert!((d - expected).norm() <= 1e-8 * (1.0 + g.norm()));
        }
    }
}
