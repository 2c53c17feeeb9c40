//! Energy-difference convergence test.

use crate::types::Scalar;
use num_traits::Float;
use std::collections::VecDeque;

/// Tracks the most recent energies and reports convergence once the last
/// `n` consecutive differences are all strictly below a threshold.
///
/// The window holds `n + 1` energies. A monitor built with `n == 0` is
/// disabled and never reports convergence.
#[derive(Debug, Clone)]
pub struct EnergyDiffMonitor<T> {
    threshold: T,
    capacity: usize,
    energies: VecDeque<T>,
}

impl<T: Scalar> EnergyDiffMonitor<T> {
    /// Creates a monitor for `n_energy_diff` consecutive differences.
    pub fn new(threshold: T, n_energy_diff: usize) -> Self {
        let capacity = if n_energy_diff == 0 {
            0
        } else {
            n_energy_diff + 1
        };
        Self {
            threshold,
            capacity,
            energies: VecDeque::with_capacity(capacity),
        }
    }

    /// Whether the test can ever fire.
    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    /// Number of energies currently held.
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    /// Whether no energy has been recorded since the last reset.
    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    /// Records `energy` and checks the window.
    pub fn check_convergence(&mut self, energy: T) -> bool {
        if !self.is_enabled() {
            return false;
        }

        if self.energies.len() == self.capacity {
            self.energies.pop_front();
        }
        self.energies.push_back(energy);

        self.energies.len() == self.capacity
            && self
                .energies
                .iter()
                .zip(self.energies.iter().skip(1))
                .all(|(&prev, &next)| <T as Float>::abs(next - prev) < self.threshold)
    }

    /// Forgets every recorded energy.
    pub fn reset(&mut self) {
        self.energies.clear();
    }
}
