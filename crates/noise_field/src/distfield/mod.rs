//! Multi-object generalized distance fields.
//!
//! Splits into the pluggable strategy contracts ([`metric`]), the shape
//! objects acting as generalized Voronoi sites ([`shape`]), and the
//! wavefront propagation engine itself ([`engine`]).
pub mod engine;
pub mod metric;
pub mod shape;

pub use engine::DistanceField;
pub use metric::{
    Chebyshev, CombineFunction, DistanceFunction, F2MinusF1, Manhattan, Minkowski, Nearest,
    NearestRatio, SecondNearest, SquaredEuclidean,
};
pub use shape::{Circle, PointSite, Segment, VoronoiShape};
