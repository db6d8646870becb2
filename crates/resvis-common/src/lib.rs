//! Common types shared by the resistivity volume visualization crates.

pub mod bounds;
pub mod grid;
pub mod range;
pub mod scalar;

pub use bounds::{Bounds3, BoundsParseError};
pub use grid::UniformGrid;
pub use range::{Provenance, ValueRange};
pub use scalar::{Association, ScalarSelection};
