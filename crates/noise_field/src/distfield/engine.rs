//! Multi-object wavefront distance-field generator.
//!
//! Computes, per pixel, the k nearest generalized distances to a set of
//! shape objects by breadth-first propagation from the shapes' seed pixels,
//! then combines them into one output value. Shapes are arbitrary distance
//! functionals, so there is no closed-form nearest-point query to fall back
//! on: the wavefront expands generation by generation, deduplicating per
//! `(pixel, shape)` pair and stopping once no pixel's k-nearest table
//! improves.
use std::collections::HashSet;

use glam::IVec2;
use tracing::{debug, warn};

use crate::buffer::FieldBuffer;
use crate::distfield::metric::{CombineFunction, DistanceFunction, Nearest, SquaredEuclidean};
use crate::distfield::shape::VoronoiShape;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::pool::WorkPool;

/// A propagation unit: one pixel claimed by one shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Location {
    pos: IVec2,
    shape: usize,
}

/// One element of a pixel's k-nearest array.
#[derive(Clone, Copy, Debug)]
struct DistanceEntry {
    distance: f32,
    shape: usize,
}

/// Ascending k-nearest table for a single pixel.
///
/// Insertion reports success whenever the entry lands in the table, which
/// is always the case while slots are free. Only once the table is full does
/// it gate on beating the current worst entry. Propagation keys off that
/// return value, so the wavefront expands more aggressively before
/// saturation than after; combine functions at shape boundaries depend on
/// that early over-propagation.
fn insert_entry(slots: &mut Vec<DistanceEntry>, k: usize, entry: DistanceEntry) -> bool {
    // Ties resolve by insertion order: equal distances go after existing ones.
    let pos = slots.partition_point(|e| e.distance <= entry.distance);
    if slots.len() < k {
        slots.insert(pos, entry);
        true
    } else if pos < k {
        slots.insert(pos, entry);
        slots.truncate(k);
        true
    } else {
        false
    }
}

/// Multi-object distance-field node.
///
/// Fills a buffer with the combined k-nearest generalized distances from a
/// set of [`VoronoiShape`]s. Pixels the propagation never reaches (or that
/// lie beyond `max_distance` from every shape) receive the cutoff value,
/// never an undefined one.
pub struct DistanceField {
    shapes: Vec<Box<dyn VoronoiShape>>,
    metric: Box<dyn DistanceFunction>,
    combine: Box<dyn CombineFunction>,
    max_distance: f32,
}

impl DistanceField {
    /// Euclidean nearest-distance field over `shapes`, unbounded cutoff.
    pub fn new(shapes: Vec<Box<dyn VoronoiShape>>) -> Result<Self> {
        Self::with_strategies(shapes, Box::new(SquaredEuclidean), Box::new(Nearest))
    }

    pub fn with_strategies(
        shapes: Vec<Box<dyn VoronoiShape>>,
        metric: Box<dyn DistanceFunction>,
        combine: Box<dyn CombineFunction>,
    ) -> Result<Self> {
        if combine.k() == 0 {
            return Err(Error::InvalidConfig("combine must need k >= 1".into()));
        }
        Ok(Self {
            shapes,
            metric,
            combine,
            max_distance: f32::INFINITY,
        })
    }

    /// Global distance cutoff. Infinite by default; propagation still
    /// terminates without one because the per-shape visited set bounds the
    /// total work by the buffer area.
    pub fn with_max_distance(mut self, max_distance: f32) -> Result<Self> {
        if max_distance.is_nan() || max_distance <= 0.0 {
            return Err(Error::InvalidOperand(format!(
                "max_distance must be > 0, got {max_distance}"
            )));
        }
        self.max_distance = max_distance;
        Ok(self)
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Cutoff in the metric's comparison units: squared while the metric
    /// defers its square root.
    fn comparison_cutoff(&self) -> f32 {
        if self.metric.defers_sqrt() && self.max_distance.is_finite() {
            self.max_distance * self.max_distance
        } else {
            self.max_distance
        }
    }

    /// Seed the frontier from every shape's in-bounds seed centers.
    fn seed_frontier(
        &self,
        width: i32,
        height: i32,
        past: &mut HashSet<Location>,
        flagged: &mut Vec<Location>,
    ) {
        for (shape_index, shape) in self.shapes.iter().enumerate() {
            for pos in shape.seed_centers() {
                if pos.x < 0 || pos.y < 0 || pos.x >= width || pos.y >= height {
                    continue;
                }
                let location = Location {
                    pos,
                    shape: shape_index,
                };
                if past.insert(location) {
                    flagged.push(location);
                }
            }
        }
    }

    /// Run the generation loop to completion, filling the per-pixel tables.
    fn propagate(
        &self,
        width: i32,
        height: i32,
        tables: &mut [Vec<DistanceEntry>],
        past: &mut HashSet<Location>,
        mut flagged: Vec<Location>,
    ) {
        let k = self.combine.k();
        let cutoff = self.comparison_cutoff();
        let mut generations = 0usize;

        while !flagged.is_empty() {
            let current = std::mem::take(&mut flagged);
            generations += 1;

            for location in current {
                let distance = self.shapes[location.shape].personal_distance(
                    location.pos.x as f32,
                    location.pos.y as f32,
                    self.metric.as_ref(),
                );
                if distance > cutoff {
                    continue;
                }

                let table = &mut tables[(location.pos.x * height + location.pos.y) as usize];
                let accepted = insert_entry(
                    table,
                    k,
                    DistanceEntry {
                        distance,
                        shape: location.shape,
                    },
                );
                if !accepted {
                    continue;
                }

                for dy in -1..=1 {
                    for dx in -1..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let neighbor = location.pos + IVec2::new(dx, dy);
                        if neighbor.x < 0
                            || neighbor.y < 0
                            || neighbor.x >= width
                            || neighbor.y >= height
                        {
                            continue;
                        }
                        let next = Location {
                            pos: neighbor,
                            shape: location.shape,
                        };
                        if past.insert(next) {
                            flagged.push(next);
                        }
                    }
                }
            }
        }

        debug!(generations, visited = past.len(), "propagation finished");
    }

    fn fill_impl(&mut self, buffer: &mut FieldBuffer, pool: Option<&WorkPool>) -> Result<()> {
        let (w, h) = (buffer.width(), buffer.height());
        if w == 0 || h == 0 {
            return Ok(());
        }
        debug!(w, h, shapes = self.shapes.len(), "distance field fill");

        let k = self.combine.k();
        let mut tables: Vec<Vec<DistanceEntry>> = vec![Vec::new(); w * h];
        let mut past: HashSet<Location> = HashSet::new();
        let mut flagged: Vec<Location> = Vec::new();

        self.seed_frontier(w as i32, h as i32, &mut past, &mut flagged);
        if flagged.is_empty() {
            warn!("no shape has an in-bounds seed center; filling with 0");
            buffer.fill(0.0);
            return Ok(());
        }

        self.propagate(w as i32, h as i32, &mut tables, &mut past, flagged);

        // Finalization: root deferred distances, combine, write sentinels.
        let defers = self.metric.defers_sqrt();
        let sentinel = self.max_distance;
        let combine = self.combine.as_ref();
        let tables = &tables;
        buffer.for_each_column(pool, |x, column| {
            let mut distances = vec![0.0f32; k];
            for (y, cell) in column.iter_mut().enumerate() {
                let table = &tables[x * h + y];
                *cell = if table.len() == k {
                    for (slot, entry) in distances.iter_mut().zip(table.iter()) {
                        *slot = if defers {
                            entry.distance.sqrt()
                        } else {
                            entry.distance
                        };
                    }
                    combine.combine(&distances)
                } else {
                    sentinel
                };
            }
        });
        Ok(())
    }
}

impl std::fmt::Debug for DistanceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceField")
            .field("shapes", &self.shapes.len())
            .field("k", &self.combine.k())
            .field("max_distance", &self.max_distance)
            .finish()
    }
}

impl Node for DistanceField {
    fn fill(&mut self, buffer: &mut FieldBuffer) -> Result<()> {
        self.fill_impl(buffer, None)
    }

    fn fill_parallel(&mut self, buffer: &mut FieldBuffer, pool: &WorkPool) -> Result<()> {
        self.fill_impl(buffer, Some(pool))
    }

    fn supports_parallel(&self) -> bool {
        true
    }
}
