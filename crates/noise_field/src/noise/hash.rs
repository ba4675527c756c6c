//! Seeded coordinate hashing and raw value noise.
//!
//! [`PermutationTable`] is the shared entropy source for every generator in
//! the crate: a 256-entry permutation shuffled from a 64-bit seed, chained
//! per coordinate and pushed through an integer mangle to produce a value in
//! `[0, 1]`. [`ValueNoise`] exposes it directly as a per-pixel noise node.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::buffer::FieldBuffer;
use crate::error::{Error, Result};
use crate::node::{Node, Periodic, Seeded};
use crate::pool::WorkPool;

/// Seeded permutation table for coordinate hashing.
///
/// The table is doubled so chained lookups never need a modulo on the inner
/// index.
#[derive(Clone)]
pub struct PermutationTable {
    table: [u8; 512],
    seed: u64,
}

impl PermutationTable {
    pub fn new(seed: u64) -> Self {
        let mut base: [u8; 256] = [0; 256];
        for (i, v) in base.iter_mut().enumerate() {
            *v = i as u8;
        }
        let mut rng = StdRng::seed_from_u64(seed);
        base.shuffle(&mut rng);

        let mut table = [0u8; 512];
        table[..256].copy_from_slice(&base);
        table[256..].copy_from_slice(&base);
        Self { table, seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Chained permutation hash of an integer coordinate pair.
    #[inline]
    pub fn hash2(&self, x: i32, y: i32) -> u8 {
        let xi = (x & 255) as usize;
        let yi = (y & 255) as usize;
        self.table[self.table[xi] as usize + yi]
    }

    /// Hash a coordinate pair and mangle the result into `[0, 1]`.
    ///
    /// The mangle spreads the byte-wide permutation hash over 32 bits so
    /// neighboring coordinates decorrelate fully.
    #[inline]
    pub fn value2(&self, x: i32, y: i32) -> f32 {
        let h = self.hash2(x, y) as u32;
        let mut n = h
            ^ (x as u32).wrapping_mul(0x9E37_79B9)
            ^ (y as u32).wrapping_mul(0x85EB_CA6B);
        n ^= n >> 13;
        n = n.wrapping_mul(0xC2B2_AE35);
        n ^= n >> 16;
        n as f32 / u32::MAX as f32
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("seed", &self.seed)
            .finish()
    }
}

/// Validate and store a tile period pair. Shared by the periodic generators.
pub(crate) fn checked_periods(px: u32, py: u32) -> Result<(u32, u32)> {
    if px == 0 || py == 0 {
        return Err(Error::InvalidOperand(format!(
            "period must be non-zero, got ({px}, {py})"
        )));
    }
    Ok((px, py))
}

/// Validate a tile period pair for a lattice generator: each axis must be 1
/// (untiled) or a multiple of the cell size, otherwise the reported period
/// would not match the actual tile extent.
pub(crate) fn checked_lattice_periods(px: u32, py: u32, cell_size: u32) -> Result<(u32, u32)> {
    let (px, py) = checked_periods(px, py)?;
    for period in [px, py] {
        if period > 1 && period % cell_size != 0 {
            return Err(Error::InvalidOperand(format!(
                "period {period} is not a multiple of the cell size {cell_size}"
            )));
        }
    }
    Ok((px, py))
}

/// Wrap an integer coordinate into `[0, period)` when tiled.
#[inline]
pub(crate) fn wrap_coord(v: i32, period: u32) -> i32 {
    if period > 1 {
        v.rem_euclid(period as i32)
    } else {
        v
    }
}

/// Hash-based value noise: a deterministic pseudo-random value per pixel.
///
/// Not continuous; used as a raw entropy source for lattice upsampling and
/// fractal blends. Tiles exactly when a period is set.
#[derive(Clone, Debug)]
pub struct ValueNoise {
    perm: PermutationTable,
    period_x: u32,
    period_y: u32,
}

impl ValueNoise {
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            perm: PermutationTable::new(seed),
            period_x: 1,
            period_y: 1,
        }
    }

    /// Value at an integer pixel coordinate.
    #[inline]
    pub fn value_at(&self, x: i32, y: i32) -> f32 {
        let x = wrap_coord(x, self.period_x);
        let y = wrap_coord(y, self.period_y);
        self.perm.value2(x, y)
    }

    fn fill_impl(&self, buffer: &mut FieldBuffer, pool: Option<&WorkPool>) {
        buffer.for_each_column(pool, |x, column| {
            for (y, cell) in column.iter_mut().enumerate() {
                *cell = self.value_at(x as i32, y as i32);
            }
        });
    }
}

impl Default for ValueNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for ValueNoise {
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

impl Periodic for ValueNoise {
    fn set_periods(&mut self, px: u32, py: u32) -> Result<()> {
        (self.period_x, self.period_y) = checked_periods(px, py)?;
        Ok(())
    }

    fn period_x(&self) -> u32 {
        self.period_x
    }

    fn period_y(&self) -> u32 {
        self.period_y
    }
}

impl Seeded for ValueNoise {
    fn set_seed(&mut self, seed: u64) {
        self.perm = PermutationTable::new(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_a_permutation() {
        let perm = PermutationTable::new(7);
        let mut seen = [false; 256];
        for &v in &perm.table[..256] {
            seen[v as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(&perm.table[..256], &perm.table[256..]);
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let noise = ValueNoise::with_seed(3);
        for x in -20..20 {
            for y in -20..20 {
                let v = noise.value_at(x, y);
                assert!((0.0..=1.0).contains(&v), "out of range at ({x}, {y}): {v}");
            }
        }
    }

    #[test]
    fn same_seed_same_values() {
        let a = ValueNoise::with_seed(11);
        let b = ValueNoise::with_seed(11);
        for x in 0..8 {
            assert_eq!(a.value_at(x, x * 3), b.value_at(x, x * 3));
        }
    }

    #[test]
    fn different_seeds_decorrelate() {
        let a = ValueNoise::with_seed(1);
        let b = ValueNoise::with_seed(2);
        let differing = (0..64)
            .filter(|&i| a.value_at(i, 0) != b.value_at(i, 0))
            .count();
        assert!(differing > 32);
    }

    #[test]
    fn period_wraps_values_exactly() {
        let mut noise = ValueNoise::with_seed(5);
        noise.set_periods(8, 4).unwrap();
        for x in 0..8 {
            for y in 0..4 {
                assert_eq!(noise.value_at(x, y), noise.value_at(x + 8, y));
                assert_eq!(noise.value_at(x, y), noise.value_at(x, y + 12));
                assert_eq!(noise.value_at(x, y), noise.value_at(x - 16, y - 4));
            }
        }
    }

    #[test]
    fn reseed_changes_output() {
        let mut noise = ValueNoise::with_seed(1);
        let before = noise.value_at(3, 4);
        noise.set_seed(99);
        let after = noise.value_at(3, 4);
        assert_ne!(before, after);
    }

    #[test]
    fn fill_matches_value_at() {
        let mut noise = ValueNoise::with_seed(2);
        let mut buffer = FieldBuffer::new(6, 5);
        noise.fill(&mut buffer).unwrap();
        assert_eq!(buffer.get(3, 2), noise.value_at(3, 2));
    }
}
