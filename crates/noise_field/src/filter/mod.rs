//! Transforms over one or more input nodes.
//!
//! Filters own their inputs, recursively fill temporary buffers from them
//! (parallel when the input supports it), and combine the results into the
//! output. Capability queries aggregate over the inputs as documented on
//! [`FilterInputs`].
//!
//! [`FilterInputs`]: crate::node::FilterInputs
pub mod distort;
pub mod fractal;
pub mod interpolate;

pub use distort::{Distortion, DistortionFilter, OffsetBoth, OffsetX, OffsetY};
pub use fractal::FractalFilter;
pub use interpolate::{Cosine, Cubic, Interpolation, InterpolationFilter, Linear};
