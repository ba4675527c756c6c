//! Composition contract for generators and filters.
//!
//! Every generator and transform in this crate is a [`Node`]: something that
//! can fill a [`FieldBuffer`]. Orthogonal capabilities ([`Periodic`],
//! [`Seeded`], and parallel fills) are discovered through dynamic queries on
//! the node rather than through a type hierarchy. A node that lacks a
//! capability silently degrades to the documented default; absence is never
//! an error.
use crate::buffer::FieldBuffer;
use crate::error::Result;
use crate::pool::WorkPool;

/// A composable unit able to fill a 2D field.
pub trait Node: Send {
    /// Fill `buffer` on the calling thread. Always valid.
    fn fill(&mut self, buffer: &mut FieldBuffer) -> Result<()>;

    /// Fill `buffer` using `pool` for column-parallel work.
    ///
    /// The default implementation degrades to the single-threaded path, so
    /// calling this on a node that is not parallel-capable is harmless.
    fn fill_parallel(&mut self, buffer: &mut FieldBuffer, _pool: &WorkPool) -> Result<()> {
        self.fill(buffer)
    }

    /// Whether [`Node::fill_parallel`] actually distributes work.
    fn supports_parallel(&self) -> bool {
        false
    }

    /// Capability query: tileable output with a settable period.
    fn as_periodic(&self) -> Option<&dyn Periodic> {
        None
    }

    /// Mutable form of [`Node::as_periodic`].
    fn as_periodic_mut(&mut self) -> Option<&mut dyn Periodic> {
        None
    }

    /// Capability query: deterministic given a 64-bit seed.
    fn as_seeded_mut(&mut self) -> Option<&mut dyn Seeded> {
        None
    }
}

/// Supports tileable wraparound with a settable `(x, y)` period in pixels.
///
/// A period of 1 on an axis means untiled.
pub trait Periodic {
    /// Set the tile period in pixels. Zero on either axis is an invalid operand.
    fn set_periods(&mut self, px: u32, py: u32) -> Result<()>;

    fn period_x(&self) -> u32;

    fn period_y(&self) -> u32;
}

/// Deterministic given a 64-bit seed.
pub trait Seeded {
    fn set_seed(&mut self, seed: u64);
}

/// Ordered input list owned by a filter, fixed at construction.
///
/// Capability queries aggregate over the inputs: periods are forwarded to
/// every periodic input but read from the first; seeds go to the first seeded
/// input only. A filter with zero periodic inputs reports the default period
/// `(1, 1)`, and seeding one with zero seeded inputs is a no-op.
pub struct FilterInputs {
    inputs: Vec<Box<dyn Node>>,
}

impl FilterInputs {
    pub fn new(inputs: Vec<Box<dyn Node>>) -> Self {
        Self { inputs }
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Mutable access to the input at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut dyn Node> {
        match self.inputs.get_mut(index) {
            Some(input) => Some(input.as_mut()),
            None => None,
        }
    }

    /// Fill `buffer` from the input at `index`, using the pool when the input
    /// supports parallel fills.
    pub fn fill_from(
        &mut self,
        index: usize,
        buffer: &mut FieldBuffer,
        pool: Option<&WorkPool>,
    ) -> Result<()> {
        let input = &mut self.inputs[index];
        match pool {
            Some(pool) if input.supports_parallel() => input.fill_parallel(buffer, pool),
            _ => input.fill(buffer),
        }
    }

    /// Forward the period to every periodic input.
    pub fn set_periods(&mut self, px: u32, py: u32) -> Result<()> {
        for input in &mut self.inputs {
            if let Some(periodic) = input.as_periodic_mut() {
                periodic.set_periods(px, py)?;
            }
        }
        Ok(())
    }

    /// Period of the first periodic input, else 1.
    pub fn period_x(&self) -> u32 {
        self.inputs
            .iter()
            .find_map(|n| n.as_periodic())
            .map_or(1, |p| p.period_x())
    }

    /// Period of the first periodic input, else 1.
    pub fn period_y(&self) -> u32 {
        self.inputs
            .iter()
            .find_map(|n| n.as_periodic())
            .map_or(1, |p| p.period_y())
    }

    /// Seed the first seeded input and return it for further configuration.
    ///
    /// Callers chain onto the actually-seeded node, not the filter. Returns
    /// `None` (and does nothing) when no input is seeded.
    pub fn set_seed(&mut self, seed: u64) -> Option<&mut dyn Node> {
        let index = self
            .inputs
            .iter_mut()
            .position(|n| n.as_seeded_mut().is_some())?;
        if let Some(seeded) = self.inputs[index].as_seeded_mut() {
            seeded.set_seed(seed);
        }
        Some(self.inputs[index].as_mut())
    }
}

impl std::fmt::Debug for FilterInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterInputs")
            .field("len", &self.inputs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Plain node with no capabilities.
    struct Flat(f32);

    impl Node for Flat {
        fn fill(&mut self, buffer: &mut FieldBuffer) -> Result<()> {
            buffer.fill(self.0);
            Ok(())
        }
    }

    /// Node carrying both period and seed capabilities.
    struct Lattice {
        seed: u64,
        px: u32,
        py: u32,
    }

    impl Lattice {
        fn new() -> Self {
            Self {
                seed: 0,
                px: 1,
                py: 1,
            }
        }
    }

    impl Node for Lattice {
        fn fill(&mut self, buffer: &mut FieldBuffer) -> Result<()> {
            buffer.fill(self.seed as f32);
            Ok(())
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

    impl Periodic for Lattice {
        fn set_periods(&mut self, px: u32, py: u32) -> Result<()> {
            if px == 0 || py == 0 {
                return Err(Error::InvalidOperand("period must be non-zero".into()));
            }
            self.px = px;
            self.py = py;
            Ok(())
        }

        fn period_x(&self) -> u32 {
            self.px
        }

        fn period_y(&self) -> u32 {
            self.py
        }
    }

    impl Seeded for Lattice {
        fn set_seed(&mut self, seed: u64) {
            self.seed = seed;
        }
    }

    #[test]
    fn default_parallel_fill_degrades_to_serial() {
        let pool = WorkPool::new(2).unwrap();
        let mut node = Flat(0.5);
        let mut buffer = FieldBuffer::new(4, 4);
        node.fill_parallel(&mut buffer, &pool).unwrap();
        assert!(buffer.data().iter().all(|v| *v == 0.5));
        assert!(!node.supports_parallel());
    }

    #[test]
    fn inputs_without_capabilities_report_defaults() {
        let mut inputs = FilterInputs::new(vec![Box::new(Flat(0.0)), Box::new(Flat(1.0))]);
        assert_eq!(inputs.period_x(), 1);
        assert_eq!(inputs.period_y(), 1);
        assert!(inputs.set_seed(9).is_none());
    }

    #[test]
    fn periods_forward_to_every_periodic_input() {
        let mut inputs = FilterInputs::new(vec![
            Box::new(Flat(0.0)),
            Box::new(Lattice::new()),
            Box::new(Lattice::new()),
        ]);
        inputs.set_periods(8, 4).unwrap();
        assert_eq!(inputs.period_x(), 8);
        assert_eq!(inputs.period_y(), 4);
        // Both periodic inputs received the update, not just the first.
        let second = inputs.get_mut(2).unwrap();
        let periodic = second.as_periodic().unwrap();
        assert_eq!((periodic.period_x(), periodic.period_y()), (8, 4));
    }

    #[test]
    fn seed_goes_to_first_seeded_input_only() {
        let mut inputs = FilterInputs::new(vec![
            Box::new(Flat(0.0)),
            Box::new(Lattice::new()),
            Box::new(Lattice::new()),
        ]);
        assert!(inputs.set_seed(42).is_some());
        let mut first = FieldBuffer::new(1, 1);
        inputs.fill_from(1, &mut first, None).unwrap();
        assert_eq!(first.get(0, 0), 42.0);
        let mut second = FieldBuffer::new(1, 1);
        inputs.fill_from(2, &mut second, None).unwrap();
        assert_eq!(second.get(0, 0), 0.0);
    }

    #[test]
    fn get_mut_returns_the_indexed_input_or_none() {
        let mut inputs = FilterInputs::new(vec![Box::new(Flat(0.25))]);
        let node = inputs.get_mut(0).unwrap();
        let mut buffer = FieldBuffer::new(2, 2);
        node.fill(&mut buffer).unwrap();
        assert_eq!(buffer.get(0, 0), 0.25);
        assert!(inputs.get_mut(1).is_none());
    }

    #[test]
    fn zero_period_fails_fast() {
        let mut inputs = FilterInputs::new(vec![Box::new(Lattice::new())]);
        assert!(matches!(
            inputs.set_periods(0, 4),
            Err(Error::InvalidOperand(_))
        ));
    }
}
