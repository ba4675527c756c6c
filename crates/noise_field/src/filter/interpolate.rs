//! Lattice upsampling through a pluggable interpolation kernel.
use tracing::debug;

use crate::buffer::FieldBuffer;
use crate::error::Result;
use crate::node::{FilterInputs, Node, Periodic, Seeded};
use crate::pool::WorkPool;

/// One-dimensional interpolation kernel applied separably per axis.
pub trait Interpolation: Send + Sync {
    /// Whether the kernel needs past/future samples (a 4-sample window
    /// instead of 2).
    fn needs_extended(&self) -> bool {
        false
    }

    /// Blend at fraction `t` in `[0, 1)`.
    ///
    /// `samples` holds 2 values `[a, b]` for standard kernels, or 4 values
    /// `[before, a, b, after]` for extended ones, with `t` measured between
    /// `a` and `b`.
    fn blend(&self, t: f32, samples: &[f32]) -> f32;
}

/// Straight linear blend.
#[derive(Clone, Copy, Debug, Default)]
pub struct Linear;

impl Interpolation for Linear {
    fn blend(&self, t: f32, samples: &[f32]) -> f32 {
        samples[0] + (samples[1] - samples[0]) * t
    }
}

/// Cosine-eased blend.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cosine;

impl Interpolation for Cosine {
    fn blend(&self, t: f32, samples: &[f32]) -> f32 {
        let t = (1.0 - (t * std::f32::consts::PI).cos()) * 0.5;
        samples[0] + (samples[1] - samples[0]) * t
    }
}

/// Catmull-Rom cubic; needs the extended 4-sample window.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cubic;

impl Interpolation for Cubic {
    fn needs_extended(&self) -> bool {
        true
    }

    fn blend(&self, t: f32, samples: &[f32]) -> f32 {
        let [p0, p1, p2, p3] = [samples[0], samples[1], samples[2], samples[3]];
        let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
        let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
        let c = -0.5 * p0 + 0.5 * p2;
        ((a * t + b) * t + c) * t + p1
    }
}

/// Upsamples its input from a coarse lattice.
///
/// The input fills a coarse buffer of `ceil(output / period)` cells; every
/// output pixel is then blended from its 2x2 (or 4x4 extended) coarse
/// neighborhood at fractional lattice coordinates. Coarse lookups wrap, so a
/// periodic input stays seamless. Column evaluation is independent and runs
/// in parallel when a pool is supplied.
pub struct InterpolationFilter {
    inputs: FilterInputs,
    kernel: Box<dyn Interpolation>,
}

impl InterpolationFilter {
    pub fn new(input: Box<dyn Node>, kernel: Box<dyn Interpolation>) -> Self {
        Self {
            inputs: FilterInputs::new(vec![input]),
            kernel,
        }
    }

    fn fill_impl(&mut self, buffer: &mut FieldBuffer, pool: Option<&WorkPool>) -> Result<()> {
        let (w, h) = (buffer.width(), buffer.height());
        if w == 0 || h == 0 {
            return Ok(());
        }

        let px = self.inputs.period_x().max(1) as usize;
        let py = self.inputs.period_y().max(1) as usize;
        let cw = w.div_ceil(px);
        let ch = h.div_ceil(py);
        debug!(w, h, cw, ch, "interpolation fill");

        let mut coarse = FieldBuffer::new(cw, ch);
        self.inputs.fill_from(0, &mut coarse, pool)?;

        let kernel = self.kernel.as_ref();
        let extended = kernel.needs_extended();
        buffer.for_each_column(pool, |x, column| {
            let u = x as f32 / px as f32;
            let cx = u.floor() as i32;
            let tx = u - u.floor();
            for (y, cell) in column.iter_mut().enumerate() {
                let v = y as f32 / py as f32;
                let cy = v.floor() as i32;
                let ty = v - v.floor();

                *cell = if extended {
                    let mut rows = [0.0f32; 4];
                    for (i, row) in rows.iter_mut().enumerate() {
                        let gy = cy - 1 + i as i32;
                        let samples = [
                            coarse.get(cx - 1, gy),
                            coarse.get(cx, gy),
                            coarse.get(cx + 1, gy),
                            coarse.get(cx + 2, gy),
                        ];
                        *row = kernel.blend(tx, &samples);
                    }
                    kernel.blend(ty, &rows)
                } else {
                    let top = kernel.blend(tx, &[coarse.get(cx, cy), coarse.get(cx + 1, cy)]);
                    let bottom = kernel.blend(
                        tx,
                        &[coarse.get(cx, cy + 1), coarse.get(cx + 1, cy + 1)],
                    );
                    kernel.blend(ty, &[top, bottom])
                };
            }
        });
        Ok(())
    }
}

impl std::fmt::Debug for InterpolationFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpolationFilter")
            .field("extended", &self.kernel.needs_extended())
            .finish()
    }
}

impl Node for InterpolationFilter {
    fn fill(&mut self, buffer: &mut FieldBuffer) -> Result<()> {
        self.fill_impl(buffer, None)
    }

    fn fill_parallel(&mut self, buffer: &mut FieldBuffer, pool: &WorkPool) -> Result<()> {
        self.fill_impl(buffer, Some(pool))
    }

    fn supports_parallel(&self) -> bool {
        true
    }

    fn as_periodic(&self) -> Option<&dyn Periodic> {
        Some(self)
    }

    fn as_periodic_mut(&mut self) -> Option<&mut dyn Periodic> {
        Some(self)
    }

    fn as_seeded_mut(&mut self) -> Option<&mut dyn Seeded> {
        Some(self)
    }
}

impl Periodic for InterpolationFilter {
    fn set_periods(&mut self, px: u32, py: u32) -> Result<()> {
        self.inputs.set_periods(px, py)
    }

    fn period_x(&self) -> u32 {
        self.inputs.period_x()
    }

    fn period_y(&self) -> u32 {
        self.inputs.period_y()
    }
}

impl Seeded for InterpolationFilter {
    fn set_seed(&mut self, seed: u64) {
        self.inputs.set_seed(seed);
    }
}
