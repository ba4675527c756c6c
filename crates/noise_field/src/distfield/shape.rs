//! Generalized Voronoi sites for the wavefront engine.
use glam::{IVec2, Vec2};

use crate::distfield::metric::DistanceFunction;
use crate::error::{Error, Result};

/// A generalized Voronoi site.
///
/// A shape is any distance functional: `personal_distance` may depend on
/// direction and need not be a point distance. `seed_centers` returns the
/// representative pixels propagation starts from; they should lie on or near
/// the shape so the wavefront expands outward from it.
pub trait VoronoiShape: Send + Sync {
    /// Generalized distance from the shape to `(x, y)` under `metric`.
    ///
    /// Must honor the metric's deferred-square-root convention: when
    /// [`DistanceFunction::defers_sqrt`] is set, the returned value is
    /// squared, so cutoff comparisons and sorting stay consistent.
    fn personal_distance(&self, x: f32, y: f32, metric: &dyn DistanceFunction) -> f32;

    /// Representative pixels to seed propagation from.
    fn seed_centers(&self) -> Vec<IVec2>;
}

/// A single point site.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointSite {
    pub position: Vec2,
}

impl PointSite {
    pub fn new(position: Vec2) -> Self {
        Self { position }
    }
}

impl VoronoiShape for PointSite {
    fn personal_distance(&self, x: f32, y: f32, metric: &dyn DistanceFunction) -> f32 {
        metric.distance(x - self.position.x, y - self.position.y)
    }

    fn seed_centers(&self) -> Vec<IVec2> {
        vec![self.position.round().as_ivec2()]
    }
}

/// A circle site measured to its boundary, clamped to zero inside.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidOperand(format!(
                "circle radius must be finite and > 0, got {radius}"
            )));
        }
        Ok(Self { center, radius })
    }
}

impl VoronoiShape for Circle {
    fn personal_distance(&self, x: f32, y: f32, metric: &dyn DistanceFunction) -> f32 {
        let dx = x - self.center.x;
        let dy = y - self.center.y;
        let center_distance = metric.distance(dx, dy);
        // Subtracting the radius needs real units; re-square afterwards to
        // keep the deferred-root convention intact.
        if metric.defers_sqrt() {
            let d = (center_distance.sqrt() - self.radius).max(0.0);
            d * d
        } else {
            (center_distance - self.radius).max(0.0)
        }
    }

    fn seed_centers(&self) -> Vec<IVec2> {
        let steps = ((std::f32::consts::TAU * self.radius).ceil() as usize).max(8);
        (0..steps)
            .map(|i| {
                let angle = i as f32 / steps as f32 * std::f32::consts::TAU;
                let p = self.center + Vec2::new(angle.cos(), angle.sin()) * self.radius;
                p.round().as_ivec2()
            })
            .collect()
    }
}

/// A line-segment site measured to its closest point.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    a: Vec2,
    b: Vec2,
}

impl Segment {
    pub fn new(a: Vec2, b: Vec2) -> Result<Self> {
        if (b - a).length_squared() <= f32::EPSILON {
            return Err(Error::InvalidOperand(
                "segment endpoints must not coincide".into(),
            ));
        }
        Ok(Self { a, b })
    }

    pub fn endpoints(&self) -> (Vec2, Vec2) {
        (self.a, self.b)
    }
}

impl VoronoiShape for Segment {
    fn personal_distance(&self, x: f32, y: f32, metric: &dyn DistanceFunction) -> f32 {
        let p = Vec2::new(x, y);
        let ab = self.b - self.a;
        let t = ((p - self.a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
        let closest = self.a + ab * t;
        metric.distance(p.x - closest.x, p.y - closest.y)
    }

    fn seed_centers(&self) -> Vec<IVec2> {
        let mid = (self.a + self.b) * 0.5;
        vec![
            self.a.round().as_ivec2(),
            mid.round().as_ivec2(),
            self.b.round().as_ivec2(),
        ]
    }
}
