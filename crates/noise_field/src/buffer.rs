//! Raster storage for scalar field values.
//!
//! [`FieldBuffer`] is the output target every generator and filter writes
//! into. Values are stored column-major so the parallel fill phases can hand
//! each worker a disjoint `&mut [f32]` column slice.
use rayon::prelude::*;

use crate::pool::WorkPool;

/// A rectangular scalar raster with wrap-around addressing.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldBuffer {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl FieldBuffer {
    /// Create a new buffer of the given size, initializing all values to zero.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        x * self.height + y
    }

    /// Get the value at `(x, y)`, wrapping out-of-range coordinates on both axes.
    ///
    /// # Panics
    ///
    /// Panics when the buffer has a zero dimension; there is no cell to wrap
    /// onto.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> f32 {
        assert!(
            self.width > 0 && self.height > 0,
            "get on a {}x{} buffer",
            self.width,
            self.height
        );
        let x = x.rem_euclid(self.width as i32) as usize;
        let y = y.rem_euclid(self.height as i32) as usize;
        self.data[self.index(x, y)]
    }

    /// Set the value at in-bounds `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let i = self.index(x, y);
        self.data[i] = value;
    }

    /// Overwrite every cell with `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Rescale the contents to `[0, 1]` in place.
    ///
    /// A constant buffer normalizes to all zeroes.
    pub fn normalize(&mut self) {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
        }
        let range = max - min;
        if !range.is_finite() || range <= 0.0 {
            self.data.fill(0.0);
            return;
        }
        for v in &mut self.data {
            *v = (*v - min) / range;
        }
    }

    /// Raw column-major contents.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Run `task` once per column, giving it the column index and the column's
    /// cells ordered by `y`.
    ///
    /// With a pool the columns are distributed over its workers and the call
    /// blocks until every column is done; without one they run in order on
    /// the calling thread. No two invocations ever see the same cell.
    pub fn for_each_column<F>(&mut self, pool: Option<&WorkPool>, task: F)
    where
        F: Fn(usize, &mut [f32]) + Send + Sync,
    {
        if self.height == 0 || self.data.is_empty() {
            return;
        }
        let height = self.height;
        match pool {
            Some(pool) => pool.install(|| {
                self.data
                    .par_chunks_mut(height)
                    .enumerate()
                    .for_each(|(x, column)| task(x, column));
            }),
            None => {
                for (x, column) in self.data.chunks_mut(height).enumerate() {
                    task(x, column);
                }
            }
        }
    }
}
