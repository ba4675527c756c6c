//! Single-point Voronoi (cell) noise.
use crate::buffer::FieldBuffer;
use crate::distfield::metric::{CombineFunction, DistanceFunction, Nearest, SquaredEuclidean};
use crate::error::{Error, Result};
use crate::node::{Node, Periodic, Seeded};
use crate::noise::hash::{checked_lattice_periods, PermutationTable};
use crate::pool::WorkPool;

/// Candidate jitter offsets inside a cell, in `[0, 1)` lattice units.
/// A hash of the cell index picks one, so every cell has a stable
/// representative point without per-cell RNG state.
const JITTER: [(f32, f32); 8] = [
    (0.17, 0.43),
    (0.31, 0.77),
    (0.43, 0.19),
    (0.57, 0.61),
    (0.67, 0.29),
    (0.79, 0.83),
    (0.89, 0.53),
    (0.11, 0.91),
];

/// Cell noise: per lattice cell a jittered representative point; the output
/// combines the k nearest point distances under a pluggable metric.
///
/// The neighborhood radius widens from 1 to 2 cells automatically when the
/// combine needs more than the nearest distance or the metric declares a
/// wide search. For metrics that defer their square root, rooting happens
/// once per pixel in the final combine, not per candidate.
pub struct CellNoise {
    perm: PermutationTable,
    cell_size: u32,
    period_x: u32,
    period_y: u32,
    metric: Box<dyn DistanceFunction>,
    combine: Box<dyn CombineFunction>,
}

impl CellNoise {
    /// Euclidean nearest-point cell noise with `cell_size`-pixel cells.
    pub fn new(cell_size: u32) -> Result<Self> {
        Self::with_strategies(
            cell_size,
            0,
            Box::new(SquaredEuclidean),
            Box::new(Nearest),
        )
    }

    pub fn with_strategies(
        cell_size: u32,
        seed: u64,
        metric: Box<dyn DistanceFunction>,
        combine: Box<dyn CombineFunction>,
    ) -> Result<Self> {
        if cell_size == 0 {
            return Err(Error::InvalidConfig("cell_size must be > 0".into()));
        }
        if combine.k() == 0 {
            return Err(Error::InvalidConfig("combine must need k >= 1".into()));
        }
        Ok(Self {
            perm: PermutationTable::new(seed),
            cell_size,
            period_x: 1,
            period_y: 1,
            metric,
            combine,
        })
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

    /// Representative point of the cell at `(cx, cy)`, in lattice units.
    fn cell_point(&self, cx: i32, cy: i32, wrap: (i32, i32)) -> (f32, f32) {
        let hx = if wrap.0 > 0 { cx.rem_euclid(wrap.0) } else { cx };
        let hy = if wrap.1 > 0 { cy.rem_euclid(wrap.1) } else { cy };
        let (jx, jy) = JITTER[(self.perm.hash2(hx, hy) & 7) as usize];
        (cx as f32 + jx, cy as f32 + jy)
    }

    /// Value at a pixel coordinate, sampled at the pixel center.
    pub fn value_at(&self, x: i32, y: i32) -> f32 {
        let wrap = self.wrap_cells();
        let mut u = (x as f32 + 0.5) / self.cell_size as f32;
        let mut v = (y as f32 + 0.5) / self.cell_size as f32;
        // Fold into the tile so tiled samples follow the exact same float
        // path; seam neighbors are reached through the wrapped cell hash.
        if wrap.0 > 0 {
            u = u.rem_euclid(wrap.0 as f32);
        }
        if wrap.1 > 0 {
            v = v.rem_euclid(wrap.1 as f32);
        }
        let cx = u.floor() as i32;
        let cy = v.floor() as i32;

        let k = self.combine.k();
        let radius: i32 = if k > 1 || self.metric.needs_wide_search() {
            2
        } else {
            1
        };

        let mut nearest: Vec<f32> = Vec::with_capacity(k);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (px, py) = self.cell_point(cx + dx, cy + dy, wrap);
                let d = self.metric.distance(px - u, py - v);
                insert_sorted(&mut nearest, k, d);
            }
        }

        // The scan always visits at least (2r+1)^2 >= 9 candidates, so the
        // table is full for every supported k.
        if self.metric.defers_sqrt() {
            for d in &mut nearest {
                *d = d.sqrt();
            }
        }
        self.combine.combine(&nearest).clamp(0.0, 1.0)
    }

    fn fill_impl(&self, buffer: &mut FieldBuffer, pool: Option<&WorkPool>) {
        buffer.for_each_column(pool, |x, column| {
            for (y, cell) in column.iter_mut().enumerate() {
                *cell = self.value_at(x as i32, y as i32);
            }
        });
    }
}

/// Insertion-sort `d` into the ascending `nearest` array, keeping at most `k`.
fn insert_sorted(nearest: &mut Vec<f32>, k: usize, d: f32) {
    let pos = nearest.partition_point(|&e| e <= d);
    if nearest.len() < k {
        nearest.insert(pos, d);
    } else if pos < k {
        nearest.insert(pos, d);
        nearest.truncate(k);
    }
}

impl std::fmt::Debug for CellNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellNoise")
            .field("cell_size", &self.cell_size)
            .field("k", &self.combine.k())
            .finish()
    }
}

impl Node for CellNoise {
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

impl Periodic for CellNoise {
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

impl Seeded for CellNoise {
    fn set_seed(&mut self, seed: u64) {
        self.perm = PermutationTable::new(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distfield::metric::{F2MinusF1, Minkowski};

    #[test]
    fn insert_keeps_ascending_order_and_cap() {
        let mut nearest = Vec::new();
        for d in [5.0, 1.0, 3.0, 0.5, 4.0] {
            insert_sorted(&mut nearest, 2, d);
        }
        assert_eq!(nearest, vec![0.5, 1.0]);
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let noise = CellNoise::new(8).unwrap();
        for x in 0..48 {
            for y in 0..48 {
                let v = noise.value_at(x, y);
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn pixel_on_site_is_near_zero() {
        let noise = CellNoise::new(8).unwrap();
        let min = (0..64)
            .flat_map(|x| (0..64).map(move |y| (x, y)))
            .map(|(x, y)| noise.value_at(x, y))
            .fold(f32::INFINITY, f32::min);
        // Some pixel lands within a pixel of its cell's jittered site.
        assert!(min < 0.2, "minimum distance {min} is too large");
    }

    #[test]
    fn second_nearest_combine_widens_the_scan() {
        let noise = CellNoise::with_strategies(
            8,
            0,
            Box::new(SquaredEuclidean),
            Box::new(F2MinusF1),
        )
        .unwrap();
        // F2 - F1 is zero on equidistant borders and positive elsewhere.
        let any_positive = (0..48).any(|x| noise.value_at(x, 20) > 1e-3);
        assert!(any_positive);
    }

    #[test]
    fn concave_minkowski_uses_wide_search() {
        let metric = Minkowski::new(0.5).unwrap();
        assert!(metric.needs_wide_search());
        let noise =
            CellNoise::with_strategies(8, 1, Box::new(metric), Box::new(Nearest)).unwrap();
        for x in 0..32 {
            assert!((0.0..=1.0).contains(&noise.value_at(x, x)));
        }
    }

    #[test]
    fn tiles_exactly_when_period_is_cell_multiple() {
        let mut noise = CellNoise::new(4).unwrap();
        noise.set_periods(16, 16).unwrap();
        for x in 0..16 {
            for y in 0..16 {
                assert_eq!(noise.value_at(x, y), noise.value_at(x + 16, y));
                assert_eq!(noise.value_at(x, y), noise.value_at(x, y + 16));
            }
        }
    }

    #[test]
    fn rejects_period_not_multiple_of_cell_size() {
        let mut noise = CellNoise::new(4).unwrap();
        assert!(matches!(
            noise.set_periods(10, 10),
            Err(crate::error::Error::InvalidOperand(_))
        ));
        assert_eq!((noise.period_x(), noise.period_y()), (1, 1));
    }

    #[test]
    fn reported_period_is_the_actual_tile_extent() {
        let mut noise = CellNoise::new(4).unwrap();
        noise.set_periods(12, 8).unwrap();
        let (px, py) = (noise.period_x() as i32, noise.period_y() as i32);
        for x in 0..px {
            for y in 0..py {
                assert_eq!(noise.value_at(x, y), noise.value_at(x + px, y));
                assert_eq!(noise.value_at(x, y), noise.value_at(x, y + py));
            }
        }
    }
}
