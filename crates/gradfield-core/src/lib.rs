//! Parallel 2D gradient-noise field generation.
//!
//! A field is produced by one or more noise passes. Each pass draws a lattice
//! of random unit gradients, tiles the field into cell-sized blocks and hands
//! contiguous runs of blocks to a fixed-size worker pool. Passes are weighted
//! and summed into one row-major [`ScalarField`].

pub mod error;
pub mod field;
pub mod generator;
pub mod noise;
pub mod scheduler;

pub use error::{FieldError, Result};
pub use field::ScalarField;
pub use generator::{field_value, generate, FieldGenerator};
pub use noise::params::{EdgeMode, GeneratorConfig, NoiseMode};
