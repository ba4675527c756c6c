#![forbid(unsafe_code)]
//! noise_field: composable 2D noise synthesis with column-parallel
//! evaluation and a wavefront distance-field engine.
//!
//! Modules:
//! - buffer: the scalar raster every node fills
//! - pool: fixed worker pool with blocking run-to-completion semantics
//! - node: the Node/Filter composition contract and capability traits
//! - noise: base generators (value, gradient, simplex, cell, diamond-square)
//! - filter: fractal blending, lattice interpolation, domain warping
//! - distfield: k-nearest generalized distance fields over shape objects
pub mod buffer;
pub mod distfield;
pub mod error;
pub mod filter;
pub mod node;
pub mod noise;
pub mod pool;

/// Convenient re-exports for common types. Import with `use noise_field::prelude::*;`.
pub mod prelude {
    pub use crate::buffer::FieldBuffer;
    pub use crate::distfield::{
        Chebyshev, CombineFunction, Circle, DistanceField, DistanceFunction, F2MinusF1,
        Manhattan, Minkowski, Nearest, NearestRatio, PointSite, SecondNearest, Segment,
        SquaredEuclidean, VoronoiShape,
    };
    pub use crate::error::{Error, Result};
    pub use crate::filter::{
        Cosine, Cubic, Distortion, DistortionFilter, FractalFilter, Interpolation,
        InterpolationFilter, Linear, OffsetBoth, OffsetX, OffsetY,
    };
    pub use crate::node::{FilterInputs, Node, Periodic, Seeded};
    pub use crate::noise::{
        CellNoise, GradientNoise, MidpointDisplacement, PermutationTable, SimplexNoise,
        ValueNoise,
    };
    pub use crate::pool::WorkPool;
}
