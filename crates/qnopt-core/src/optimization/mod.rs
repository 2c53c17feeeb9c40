//! Minimization components shared by the drivers.

pub mod ediff;
pub mod fd_test;
pub mod line_search;
pub mod logging;
pub mod params;
pub mod result;

// Re-export optimization components
pub use ediff::*;
pub use fd_test::*;
pub use line_search::*;
pub use logging::*;
pub use params::*;
pub use result::*;
