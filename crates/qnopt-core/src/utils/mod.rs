//! Test fixtures shared across the workspace.

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_problems;
