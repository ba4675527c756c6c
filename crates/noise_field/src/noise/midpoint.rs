//! Fractal midpoint-displacement (diamond-square) terrain.
use crate::buffer::FieldBuffer;
use crate::error::{Error, Result};
use crate::node::{Node, Seeded};
use crate::noise::hash::PermutationTable;

/// Midpoint-displacement terrain over a power-of-two-padded grid.
///
/// Alternating square and diamond passes halve the step each iteration;
/// every written cell is the average of its corner/edge neighbors perturbed
/// by `(hash - 0.5) * 2 * amplitude`, with the amplitude decaying by the
/// persistence factor per iteration. Values are kept in `[0, 1]`.
///
/// In pre-seeded mode ([`MidpointDisplacement::with_pre_seeded`]) the caller
/// fills the buffer with a sentinel value first; any cell that does *not*
/// hold the sentinel is treated as known terrain and is never overwritten,
/// so boundary values can be pinned before generation.
///
/// Sequential by construction: each pass reads cells the previous pass
/// wrote, so there is no column independence to exploit.
#[derive(Clone, Debug)]
pub struct MidpointDisplacement {
    perm: PermutationTable,
    amplitude: f32,
    persistence: f32,
    pre_seed_sentinel: Option<f32>,
}

impl MidpointDisplacement {
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            perm: PermutationTable::new(seed),
            amplitude: 0.5,
            persistence: 0.5,
            pre_seed_sentinel: None,
        }
    }

    /// Initial perturbation amplitude.
    pub fn with_amplitude(mut self, amplitude: f32) -> Result<Self> {
        if !amplitude.is_finite() || amplitude <= 0.0 {
            return Err(Error::InvalidConfig(
                "amplitude must be finite and > 0".into(),
            ));
        }
        self.amplitude = amplitude;
        Ok(self)
    }

    /// Amplitude decay per halving step, in `(0, 1]`.
    pub fn with_persistence(mut self, persistence: f32) -> Result<Self> {
        if !(persistence > 0.0 && persistence <= 1.0) {
            return Err(Error::InvalidConfig(
                "persistence must be in (0, 1]".into(),
            ));
        }
        self.persistence = persistence;
        Ok(self)
    }

    /// Enable pre-seeded mode: buffer cells not equal to `sentinel` are
    /// preserved as-is.
    pub fn with_pre_seeded(mut self, sentinel: f32) -> Self {
        self.pre_seed_sentinel = Some(sentinel);
        self
    }

    fn base_value(&self, x: usize, y: usize) -> f32 {
        self.perm.value2(x as i32, y as i32)
    }

    fn perturb(&self, x: usize, y: usize, mean: f32, amplitude: f32) -> f32 {
        let offset = (self.perm.value2(x as i32, y as i32) - 0.5) * 2.0 * amplitude;
        (mean + offset).clamp(0.0, 1.0)
    }
}

impl Default for MidpointDisplacement {
    fn default() -> Self {
        Self::new()
    }
}

/// Working grid of side `n + 1`; `NaN` marks unset cells.
struct Grid {
    side: usize,
    cells: Vec<f32>,
}

impl Grid {
    fn new(side: usize) -> Self {
        Self {
            side,
            cells: vec![f32::NAN; side * side],
        }
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> f32 {
        self.cells[x * self.side + y]
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, v: f32) {
        self.cells[x * self.side + y] = v;
    }

    #[inline]
    fn is_set(&self, x: usize, y: usize) -> bool {
        !self.get(x, y).is_nan()
    }

    /// Mean of the set cells among the given neighbors.
    fn mean_of(&self, neighbors: &[(isize, isize)]) -> f32 {
        let mut sum = 0.0;
        let mut count = 0;
        for &(x, y) in neighbors {
            if x < 0 || y < 0 || x >= self.side as isize || y >= self.side as isize {
                continue;
            }
            let v = self.get(x as usize, y as usize);
            if !v.is_nan() {
                sum += v;
                count += 1;
            }
        }
        if count == 0 {
            0.5
        } else {
            sum / count as f32
        }
    }
}

impl Node for MidpointDisplacement {
    fn fill(&mut self, buffer: &mut FieldBuffer) -> Result<()> {
        let (w, h) = (buffer.width(), buffer.height());
        if w == 0 || h == 0 {
            return Ok(());
        }

        let n = (w.max(h).max(2) - 1).next_power_of_two();
        let side = n + 1;
        let mut grid = Grid::new(side);

        if let Some(sentinel) = self.pre_seed_sentinel {
            for x in 0..w {
                for y in 0..h {
                    let v = buffer.get(x as i32, y as i32);
                    if v != sentinel {
                        grid.set(x, y, v);
                    }
                }
            }
        }

        for &(cx, cy) in &[(0, 0), (n, 0), (0, n), (n, n)] {
            if !grid.is_set(cx, cy) {
                let v = self.base_value(cx, cy);
                grid.set(cx, cy, v);
            }
        }

        let mut amplitude = self.amplitude;
        let mut step = n;
        while step >= 2 {
            let half = step / 2;

            // Square pass: centers from the four diagonal corners.
            for x in (half..n).step_by(step) {
                for y in (half..n).step_by(step) {
                    if grid.is_set(x, y) {
                        continue;
                    }
                    let r = half as isize;
                    let (xi, yi) = (x as isize, y as isize);
                    let mean = grid.mean_of(&[
                        (xi - r, yi - r),
                        (xi + r, yi - r),
                        (xi - r, yi + r),
                        (xi + r, yi + r),
                    ]);
                    let v = self.perturb(x, y, mean, amplitude);
                    grid.set(x, y, v);
                }
            }

            // Diamond pass: edge midpoints from the four orthogonal neighbors.
            for x in (0..side).step_by(half) {
                let start = if (x / half) % 2 == 0 { half } else { 0 };
                for y in (start..side).step_by(step) {
                    if grid.is_set(x, y) {
                        continue;
                    }
                    let r = half as isize;
                    let (xi, yi) = (x as isize, y as isize);
                    let mean = grid.mean_of(&[
                        (xi - r, yi),
                        (xi + r, yi),
                        (xi, yi - r),
                        (xi, yi + r),
                    ]);
                    let v = self.perturb(x, y, mean, amplitude);
                    grid.set(x, y, v);
                }
            }

            amplitude *= self.persistence;
            step = half;
        }

        for x in 0..w {
            for y in 0..h {
                buffer.set(x, y, grid.get(x, y));
            }
        }
        Ok(())
    }

    fn as_seeded_mut(&mut self) -> Option<&mut dyn Seeded> {
        Some(self)
    }
}

impl Seeded for MidpointDisplacement {
    fn set_seed(&mut self, seed: u64) {
        self.perm = PermutationTable::new(seed);
    }
}
