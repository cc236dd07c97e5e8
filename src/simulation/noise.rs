//! Random perturbations fed into the plant model.
//!
//! The plant formulas call into a [`NoiseSource`] instead of a global RNG so
//! runs can be seeded for reproducibility or silenced entirely for exact
//! formula checks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};

pub trait NoiseSource: Send {
    /// Uniform sample in `[lo, hi)`
    fn uniform(&mut self, lo: f64, hi: f64) -> f64;

    /// Bernoulli trial with success probability `p`
    fn chance(&mut self, p: f64) -> bool;
}

/// Noise drawn from a standard RNG
pub struct SeededNoise {
    rng: StdRng,
}

impl SeededNoise {
    /// Seeded for reproducibility, or from OS entropy when `seed` is `None`
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl NoiseSource for SeededNoise {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        Uniform::new(lo, hi).sample(&mut self.rng)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }
}

/// Silent source: every sample is zero (pulled into range) and no chance event fires.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroNoise;

impl NoiseSource for ZeroNoise {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        0.0_f64.clamp(lo, hi.max(lo))
    }

    fn chance(&mut self, _p: f64) -> bool {
        false
    }
}

/// Build the configured noise source
pub fn noise_source(enabled: bool, seed: Option<u64>) -> Box<dyn NoiseSource> {
    if enabled {
        Box::new(SeededNoise::new(seed))
    } else {
        Box::new(ZeroNoise)
    }
}
