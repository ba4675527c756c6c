//! Base generators: the leaf nodes of a composition.
//!
//! All of them share the seeded permutation hash in [`hash`] as their
//! entropy source, so a 64-bit seed fully determines any composition built
//! on top of them.
pub mod cell;
pub mod gradient;
pub mod hash;
pub mod midpoint;
pub mod simplex;

pub use cell::CellNoise;
pub use gradient::GradientNoise;
pub use hash::{PermutationTable, ValueNoise};
pub use midpoint::MidpointDisplacement;
pub use simplex::SimplexNoise;
