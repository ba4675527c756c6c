//! Domain warping: remap a base signal through a distortion signal.
use tracing::debug;

use crate::buffer::FieldBuffer;
use crate::error::{Error, Result};
use crate::node::{FilterInputs, Node, Periodic, Seeded};
use crate::pool::WorkPool;

/// Maps a pixel and its signed distortion offset to displaced sampling
/// coordinates in the base signal.
pub trait Distortion: Send + Sync {
    fn displace(&self, x: f32, y: f32, offset: f32) -> (f32, f32);
}

/// Offset both axes by the same amount.
#[derive(Clone, Copy, Debug, Default)]
pub struct OffsetBoth;

impl Distortion for OffsetBoth {
    fn displace(&self, x: f32, y: f32, offset: f32) -> (f32, f32) {
        (x + offset, y + offset)
    }
}

/// Offset the x axis only.
#[derive(Clone, Copy, Debug, Default)]
pub struct OffsetX;

impl Distortion for OffsetX {
    fn displace(&self, x: f32, y: f32, offset: f32) -> (f32, f32) {
        (x + offset, y)
    }
}

/// Offset the y axis only.
#[derive(Clone, Copy, Debug, Default)]
pub struct OffsetY;

impl Distortion for OffsetY {
    fn displace(&self, x: f32, y: f32, offset: f32) -> (f32, f32) {
        (x, y + offset)
    }
}

/// Warps a base signal by a second, normalized distortion signal.
///
/// Both inputs fill full-resolution temporaries; the distortion buffer is
/// normalized to `[0, 1]`, recentered to `[-1, 1]`, scaled by the amplitude
/// and fed through the [`Distortion`] strategy to pick where in the base
/// signal each output pixel samples (with wrap-around). Column evaluation
/// is independent and parallel-safe.
pub struct DistortionFilter {
    inputs: FilterInputs,
    amplitude: f32,
    strategy: Box<dyn Distortion>,
}

impl DistortionFilter {
    /// `inputs[0]` is the base signal, `inputs[1]` the distortion signal.
    pub fn new(
        base: Box<dyn Node>,
        distortion: Box<dyn Node>,
        amplitude: f32,
        strategy: Box<dyn Distortion>,
    ) -> Result<Self> {
        if !amplitude.is_finite() {
            return Err(Error::InvalidConfig("amplitude must be finite".into()));
        }
        Ok(Self {
            inputs: FilterInputs::new(vec![base, distortion]),
            amplitude,
            strategy,
        })
    }

    fn fill_impl(&mut self, buffer: &mut FieldBuffer, pool: Option<&WorkPool>) -> Result<()> {
        let (w, h) = (buffer.width(), buffer.height());
        if w == 0 || h == 0 {
            return Ok(());
        }
        debug!(w, h, self.amplitude, "distortion fill");

        let mut base = FieldBuffer::new(w, h);
        self.inputs.fill_from(0, &mut base, pool)?;
        let mut distortion = FieldBuffer::new(w, h);
        self.inputs.fill_from(1, &mut distortion, pool)?;
        distortion.normalize();

        let amplitude = self.amplitude;
        let strategy = self.strategy.as_ref();
        buffer.for_each_column(pool, |x, column| {
            for (y, cell) in column.iter_mut().enumerate() {
                let d = distortion.get(x as i32, y as i32);
                let offset = amplitude * (d - 0.5) * 2.0;
                let (sx, sy) = strategy.displace(x as f32, y as f32, offset);
                *cell = base.get(sx.round() as i32, sy.round() as i32);
            }
        });
        Ok(())
    }
}

impl std::fmt::Debug for DistortionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistortionFilter")
            .field("amplitude", &self.amplitude)
            .finish()
    }
}

impl Node for DistortionFilter {
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

impl Periodic for DistortionFilter {
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

impl Seeded for DistortionFilter {
    fn set_seed(&mut self, seed: u64) {
        self.inputs.set_seed(seed);
    }
}
