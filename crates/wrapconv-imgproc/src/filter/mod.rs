//! Filter operations
//!
//! This module provides the kernel model, the toroidal convolution and the strategies used to
//! spread it over a thread pool.

/// Convolution primitives
mod convolution;
pub use convolution::*;

mod error;
pub use error::FilterError;

/// Kernel and filter model
mod kernel;
pub use kernel::*;

/// Convolution mode selection
mod mode;
pub use mode::*;

/// Named preset filters
pub mod presets;

/// Parallel decomposition strategies
mod strategies;
pub use strategies::*;
