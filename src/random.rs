//! Random draws for the fire simulation.
//!
//! The simulation only ever asks for a uniform value in `[0, 1)` with a given
//! number of significant bits, so the source is a small trait that tests can
//! replace with a fixed sequence.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Widest draw whose bucket centre `(k + 0.5) / 2^bits` is exact in an `f64`.
const MAX_EXACT_BITS: u32 = 52;

/// Supplies uniform draws in `[0, 1)` at a requested precision.
pub trait RandomSource {
    /// Draw a value in `[0, 1)` using `precision_bits` bits of entropy.
    fn draw(&mut self, precision_bits: u32) -> f64;
}

/// Convert the low `precision_bits` bits of `raw` into a value in `(0, 1)`.
///
/// The kept bits select one of `2^bits` equal buckets and the draw is the
/// centre of that bucket, so draws are symmetric around 0.5 at any precision.
/// Zero bits always yields `0.0`. Above 52 bits the value is shifted down so
/// the centre stays exact and never rounds up to `1.0`.
pub fn truncate_draw(raw: u64, precision_bits: u32) -> f64 {
    if precision_bits == 0 {
        return 0.0;
    }

    let bits = precision_bits.min(64);
    let mask = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
    let mut value = raw & mask;
    let mut scale_bits = bits;

    if scale_bits > MAX_EXACT_BITS {
        value >>= scale_bits - MAX_EXACT_BITS;
        scale_bits = MAX_EXACT_BITS;
    }

    (value as f64 + 0.5) / (1u64 << scale_bits) as f64
}

/// Adapts any `rand` generator into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: RngCore> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Generator seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible generator for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> RandomSource for RngSource<R> {
    fn draw(&mut self, precision_bits: u32) -> f64 {
        truncate_draw(self.rng.next_u64(), precision_bits)
    }
}

/// Replays a fixed list of draws, cycling when it runs out.
///
/// Values are clamped into `[0, 1)` on construction. The precision argument
/// is ignored except that zero bits still yields `0.0`.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceSource {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<f64> = values
            .into_iter()
            .map(|v| if v.is_finite() { v.clamp(0.0, 1.0 - f64::EPSILON) } else { 0.0 })
            .collect();
        Self { values, cursor: 0 }
    }

    /// A source that always returns the same draw.
    pub fn constant(value: f64) -> Self {
        Self::new([value])
    }

    /// Number of draws handed out so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceSource {
    fn draw(&mut self, precision_bits: u32) -> f64 {
        if precision_bits == 0 || self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
