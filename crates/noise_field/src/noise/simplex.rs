//! Simplex-style noise on a skewed grid.
//!
//! Unlike the other lattice generators this one is not [`Periodic`]: the
//! skew transform mixes the axes, so a simple index wrap cannot produce an
//! exact tile. Callers that need tiling compose it behind a periodic input
//! instead.
//!
//! [`Periodic`]: crate::node::Periodic
use crate::buffer::FieldBuffer;
use crate::error::{Error, Result};
use crate::node::{Node, Seeded};
use crate::noise::hash::PermutationTable;
use crate::pool::WorkPool;

// Skew constants for 2D: F = (sqrt(3) - 1) / 2, G = (3 - sqrt(3)) / 6.
const F2: f32 = 0.366_025_42;
const G2: f32 = 0.211_324_87;

/// Normalizes the summed corner contributions to roughly [-1, 1].
const SCALE: f32 = 70.0;

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

/// Simplex noise: three corner contributions with radius-based falloff
/// `(0.5 - r^2)^4` instead of bilinear blending. Output in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct SimplexNoise {
    perm: PermutationTable,
    cell_size: u32,
}

impl SimplexNoise {
    /// Create simplex noise with lattice cells of `cell_size` pixels.
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
        })
    }

    /// Value at a pixel coordinate, sampled at the pixel center.
    pub fn value_at(&self, x: i32, y: i32) -> f32 {
        let px = (x as f32 + 0.5) / self.cell_size as f32;
        let py = (y as f32 + 0.5) / self.cell_size as f32;

        let s = (px + py) * F2;
        let i = (px + s).floor() as i32;
        let j = (py + s).floor() as i32;

        let t = (i + j) as f32 * G2;
        let x0 = px - (i as f32 - t);
        let y0 = py - (j as f32 - t);

        // Which triangle of the skewed cell we are in.
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f32 + G2;
        let y1 = y0 - j1 as f32 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let g0 = self.perm.hash2(i, j);
        let g1 = self.perm.hash2(i + i1, j + j1);
        let g2 = self.perm.hash2(i + 1, j + 1);

        let mut n = 0.0;
        for &(gx, gy, gh) in &[(x0, y0, g0), (x1, y1, g1), (x2, y2, g2)] {
            let t = 0.5 - gx * gx - gy * gy;
            if t > 0.0 {
                let t2 = t * t;
                n += t2 * t2 * grad_dot(gh, gx, gy);
            }
        }

        (n * SCALE * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    fn fill_impl(&self, buffer: &mut FieldBuffer, pool: Option<&WorkPool>) {
        buffer.for_each_column(pool, |x, column| {
            for (y, cell) in column.iter_mut().enumerate() {
                *cell = self.value_at(x as i32, y as i32);
            }
        });
    }
}

impl Node for SimplexNoise {
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

    fn as_seeded_mut(&mut self) -> Option<&mut dyn Seeded> {
        Some(self)
    }
}

impl Seeded for SimplexNoise {
    fn set_seed(&mut self, seed: u64) {
        self.perm = PermutationTable::new(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_stay_in_unit_interval() {
        let noise = SimplexNoise::with_seed(8, 6).unwrap();
        for x in 0..64 {
            for y in 0..64 {
                let v = noise.value_at(x, y);
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn output_is_not_constant() {
        let noise = SimplexNoise::with_seed(8, 6).unwrap();
        let first = noise.value_at(0, 0);
        assert!((0..64).any(|x| (noise.value_at(x, 9) - first).abs() > 1e-3));
    }

    #[test]
    fn deterministic_per_seed() {
        let a = SimplexNoise::with_seed(16, 123).unwrap();
        let b = SimplexNoise::with_seed(16, 123).unwrap();
        for i in 0..32 {
            assert_eq!(a.value_at(i, 64 - i), b.value_at(i, 64 - i));
        }
    }

    #[test]
    fn has_no_periodic_capability() {
        let mut noise = SimplexNoise::new(8).unwrap();
        assert!(noise.as_periodic().is_none());
        assert!(noise.as_periodic_mut().is_none());
        assert!(noise.as_seeded_mut().is_some());
    }
}
