//! # qnopt
//!
//! Preconditioned limited-memory BFGS minimization for problems that own
//! their state.
//!
//! The host implements [`Minimizable`](prelude::Minimizable): it moves its
//! state along a direction, returns the energy with the gradient and the
//! preconditioned gradient, and optionally constrains directions, caps
//! trial steps and reduces scalars across processes. [`LBFGS`] drives the
//! host to a minimum with one of the line minimizers in
//! [`qnopt_core::line_search`].
//!
//! ## Quick Start
//!
//! ```rust
//! use qnopt::prelude::*;
//!
//! // E(x) = ½ |x - c|²
//! struct Shifted {
//!     x: DVector<f64>,
//!     center: DVector<f64>,
//! }
//!
//! impl Minimizable<f64> for Shifted {
//!     type Vector = DVector<f64>;
//!
//!     fn new_vector(&self) -> DVector<f64> {
//!         DVector::zeros(self.x.len())
//!     }
//!
//!     fn step(&mut self, direction: &DVector<f64>, alpha: f64) {
//!         self.x.axpy(alpha, direction, 1.0);
//!     }
//!
//!     fn compute(&mut self, g: &mut DVector<f64>, kg: &mut DVector<f64>) -> Result<f64> {
//!         *g = &self.x - &self.center;
//!         kg.copy_from(g);
//!         Ok(0.5 * g.norm_squared())
//!     }
//! }
//!
//! let mut problem = Shifted {
//!     x: DVector::zeros(3),
//!     center: DVector::from_vec(vec![1.0, -2.0, 0.5]),
//! };
//! let params = MinimizeParams::new()
//!     .with_knorm_threshold(1e-10)
//!     .with_n_dim(3);
//!
//! let result = LBFGS::new(QuadraticLineSearch::new()).minimize(&mut problem, &params)?;
//! assert!(result.converged);
//! assert!((problem.x[1] + 2.0).abs() < 1e-8);
//! # Ok::<(), MinimizeError>(())
//! ```
//!
//! ## Crates
//!
//! - [`qnopt_core`]: the host contract, parameters, line minimizers and
//!   results
//! - [`qnopt_optim`]: the L-BFGS driver and its history
//! - [`nalgebra`]: the vector type the prelude's `DVector` comes from

pub use nalgebra;
pub use qnopt_core;
pub use qnopt_optim;

pub use qnopt_optim::LBFGS;

/// Everything needed to define a problem and minimize it.
pub mod prelude {
    pub use qnopt_core::prelude::*;
    pub use qnopt_optim::{History, HistoryEntry, LBFGS};
}
