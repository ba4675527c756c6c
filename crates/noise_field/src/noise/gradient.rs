//! Perlin-style gradient noise.
use crate::buffer::FieldBuffer;
use crate::error::{Error, Result};
use crate::node::{Node, Periodic, Seeded};
use crate::noise::hash::{checked_lattice_periods, PermutationTable};
use crate::pool::WorkPool;

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
pub(crate) fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Dot product of a hashed unit-ish gradient with the corner offset.
#[inline]
fn grad_dot(hash: u8, x: f32, y: f32) -> f32 {
    match hash & 7 {
        0 => x + y,
        1 => x - y,
        2 => -x + y,
        3 => -x - y,
        4 => x,
        5 => -x,
        6 => y,
        _ => -y,
    }
}

/// Wrap a lattice index into `[0, cells)` when tiling is active.
#[inline]
fn wrap_cell(i: i32, cells: i32) -> i32 {
    if cells > 0 {
        i.rem_euclid(cells)
    } else {
        i
    }
}

/// Gradient (Perlin) noise over a pixel-space lattice.
///
/// Hashed gradient vectors sit at the corners of `cell_size`-pixel cells;
/// the output is the quintic-faded bilinear blend of the corner dot
/// products, remapped to `[0, 1]`.
///
/// When a period is set, lattice indices wrap modulo `period / cell_size`
/// cells. Only periods that are multiples of the cell size are accepted, so
/// the reported period is always the exact tile extent.
#[derive(Clone, Debug)]
pub struct GradientNoise {
    perm: PermutationTable,
    cell_size: u32,
    period_x: u32,
    period_y: u32,
}

impl GradientNoise {
    /// Create gradient noise with lattice cells of `cell_size` pixels.
    pub fn new(cell_size: u32) -> Result<Self> {
        Self::with_seed(cell_size, 0)
    }

    pub fn with_seed(cell_size: u32, seed: u64) -> Result<Self> {
        if cell_size == 0 {
            return Err(Error::InvalidConfig("cell_size must be > 0".into()));
        }
        Ok(Self {
            perm: PermutationTable::new(seed),
            cell_size,
            period_x: 1,
            period_y: 1,
        })
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Tile extent in lattice cells per axis; 0 means untiled. The period is
    /// always a cell-size multiple, so the division is exact.
    fn wrap_cells(&self) -> (i32, i32) {
        let cells = |period: u32| {
            if period > 1 {
                (period / self.cell_size) as i32
            } else {
                0
            }
        };
        (cells(self.period_x), cells(self.period_y))
    }

    /// Value at a pixel coordinate, sampled at the pixel center.
    pub fn value_at(&self, x: i32, y: i32) -> f32 {
        let u = (x as f32 + 0.5) / self.cell_size as f32;
        let v = (y as f32 + 0.5) / self.cell_size as f32;

        let xi = u.floor() as i32;
        let yi = v.floor() as i32;
        let xf = u - u.floor();
        let yf = v - v.floor();

        let (cx, cy) = self.wrap_cells();
        let x0 = wrap_cell(xi, cx);
        let x1 = wrap_cell(xi + 1, cx);
        let y0 = wrap_cell(yi, cy);
        let y1 = wrap_cell(yi + 1, cy);

        let aa = self.perm.hash2(x0, y0);
        let ab = self.perm.hash2(x0, y1);
        let ba = self.perm.hash2(x1, y0);
        let bb = self.perm.hash2(x1, y1);

        let sx = fade(xf);
        let sy = fade(yf);

        let top = lerp(grad_dot(aa, xf, yf), grad_dot(ba, xf - 1.0, yf), sx);
        let bottom = lerp(
            grad_dot(ab, xf, yf - 1.0),
            grad_dot(bb, xf - 1.0, yf - 1.0),
            sx,
        );
        let n = lerp(top, bottom, sy);

        (n * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    fn fill_impl(&self, buffer: &mut FieldBuffer, pool: Option<&WorkPool>) {
        buffer.for_each_column(pool, |x, column| {
            for (y, cell) in column.iter_mut().enumerate() {
                *cell = self.value_at(x as i32, y as i32);
            }
        });
    }
}

impl Node for GradientNoise {
    fn fill(&mut self, buffer: &mut FieldBuffer) -> Result<()> {
        self.fill_impl(buffer, None);
        Ok(())
    }

    fn fill_parallel(&mut self, buffer: &mut FieldBuffer, pool: &WorkPool) -> Result<()> {
        self.fill_impl(buffer, Some(pool));
        Ok(())
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

impl Periodic for GradientNoise {
    fn set_periods(&mut self, px: u32, py: u32) -> Result<()> {
        (self.period_x, self.period_y) = checked_lattice_periods(px, py, self.cell_size)?;
        Ok(())
    }

    fn period_x(&self) -> u32 {
        self.period_x
    }

    fn period_y(&self) -> u32 {
        self.period_y
    }
}

impl Seeded for GradientNoise {
    fn set_seed(&mut self, seed: u64) {
        self.perm = PermutationTable::new(seed);
    }
}
