//! # Noise and Seeded Randomness
//!
//! Deterministic primitives used by terrain generation. Identical seeds and
//! coordinates give identical values on every run, which is what lets an
//! evicted chunk be regenerated exactly as it was.
//!
//! Two noise strategies implement [`NoiseSource`]:
//!
//! * [`GradientNoise`]: simplex noise from the `noise` crate. Its permutation
//!   table is a seeded shuffle of `0..256`, doubled to 512 entries.
//! * [`TrigNoise`]: a cheap sum of sines and cosines with seed-derived
//!   phases. Good enough for visuals, without simplex's statistics.

use noise::{NoiseFn, Simplex};
use serde::Deserialize;

/// World seed from which all generation randomness is derived.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

/// SplitMix64 finaliser.
#[inline]
fn mix64(mut value: u64) -> u64 {
    value = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    value = (value ^ (value >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    value ^ (value >> 31)
}

impl WorldSeed {
    pub const fn new(seed: u64) -> Self {
        WorldSeed(seed)
    }

    /// A fresh seed from the process-wide random source.
    pub fn random() -> Self {
        WorldSeed(fastrand::u64(..))
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed for one purpose (biomes, heights, ...).
    pub fn derive(self, purpose: u64) -> Self {
        WorldSeed(mix64(self.0 ^ mix64(purpose)))
    }

    /// Seed for a `noise` crate generator.
    pub fn noise_seed(self, purpose: u64) -> u32 {
        (self.derive(purpose).0 >> 32) as u32
    }

    /// A PRNG private to one chunk and one generation step.
    pub fn chunk_rng(self, chunk_x: i32, chunk_z: i32, salt: u64) -> fastrand::Rng {
        let key = mix64(chunk_x as u32 as u64) ^ mix64(((chunk_z as u32 as u64) << 32) | 0x5bd1);
        fastrand::Rng::with_seed(self.derive(salt).0 ^ key)
    }

    /// A uniform value in `[0, 1)` private to one world column and purpose.
    pub fn column_chance(self, x: i32, z: i32, salt: u64) -> f64 {
        let key = mix64(x as u32 as u64) ^ mix64(((z as u32 as u64) << 32) | 0xa7c3);
        let bits = mix64(self.derive(salt).0 ^ key) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }
}

/// Which noise construction the generator samples.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseStrategy {
    #[default]
    Gradient,
    Trigonometric,
}

/// A deterministic coherent noise field.
pub trait NoiseSource: Send + Sync {
    /// Samples the field at a 2D point. Output is in `[-1, 1]`.
    fn noise2d(&self, x: f64, y: f64) -> f64;

    /// Samples the field at a 3D point. Output is in `[-1, 1]`.
    fn noise3d(&self, x: f64, y: f64, z: f64) -> f64;

    /// Fractal sum of `octaves` layers, normalised back to `[-1, 1]`.
    fn fbm2d(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut norm = 0.0;
        for _ in 0..octaves.max(1) {
            total += self.noise2d(x * frequency, y * frequency) * amplitude;
            norm += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }
        total / norm
    }
}

/// Builds the noise source for `strategy`.
pub fn create_noise(strategy: NoiseStrategy, seed: u32) -> Box<dyn NoiseSource> {
    match strategy {
        NoiseStrategy::Gradient => Box::new(GradientNoise::new(seed)),
        NoiseStrategy::Trigonometric => Box::new(TrigNoise::new(seed)),
    }
}

/// Simplex gradient noise.
pub struct GradientNoise {
    simplex: Simplex,
}

impl GradientNoise {
    pub fn new(seed: u32) -> Self {
        GradientNoise {
            simplex: Simplex::new(seed),
        }
    }
}

impl NoiseSource for GradientNoise {
    fn noise2d(&self, x: f64, y: f64) -> f64 {
        self.simplex.get([x, y]).clamp(-1.0, 1.0)
    }

    fn noise3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.simplex.get([x, y, z]).clamp(-1.0, 1.0)
    }
}

const TRIG_TERMS: usize = 4;

/// Trigonometric pseudo-noise.
pub struct TrigNoise {
    frequencies: [f64; TRIG_TERMS],
    phases: [[f64; 3]; TRIG_TERMS],
}

impl TrigNoise {
    pub fn new(seed: u32) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed as u64);
        let mut frequencies = [0.0; TRIG_TERMS];
        let mut phases = [[0.0; 3]; TRIG_TERMS];
        for term in 0..TRIG_TERMS {
            frequencies[term] = (1.0 + term as f64 * 1.618) * (0.9 + rng.f64() * 0.2);
            for phase in phases[term].iter_mut() {
                *phase = rng.f64() * std::f64::consts::TAU;
            }
        }
        TrigNoise { frequencies, phases }
    }

    fn sum(&self, x: f64, y: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut norm = 0.0;
        for term in 0..TRIG_TERMS {
            let f = self.frequencies[term];
            let [px, py, pz] = self.phases[term];
            let amplitude = 1.0 / (term as f64 + 1.0);
            total += amplitude
                * (x * f + px).sin()
                * (y * f * 1.3 + py).cos()
                * (z * f * 0.7 + pz).cos();
            norm += amplitude;
        }
        (total / norm).clamp(-1.0, 1.0)
    }
}

impl NoiseSource for TrigNoise {
    fn noise2d(&self, x: f64, y: f64) -> f64 {
        self.sum(x, y, 0.0)
    }

    fn noise3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.sum(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(source: &dyn NoiseSource) -> Vec<f64> {
        (0..200)
            .map(|i| {
                let t = i as f64 * 0.173;
                source.noise2d(t, -t * 0.61) + source.noise3d(t, t * 0.3, -t)
            })
            .collect()
    }

    #[test]
    fn same_seed_same_values() {
        for strategy in [NoiseStrategy::Gradient, NoiseStrategy::Trigonometric] {
            let a = create_noise(strategy, 1234);
            let b = create_noise(strategy, 1234);
            assert_eq!(samples(a.as_ref()), samples(b.as_ref()));
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = GradientNoise::new(1);
        let b = GradientNoise::new(2);
        assert_ne!(samples(&a), samples(&b));
    }

    #[test]
    fn output_stays_in_range() {
        for strategy in [NoiseStrategy::Gradient, NoiseStrategy::Trigonometric] {
            let source = create_noise(strategy, 99);
            for i in -500..500 {
                let x = i as f64 * 0.37;
                let y = i as f64 * -0.11;
                let value = source.noise2d(x, y);
                assert!((-1.0..=1.0).contains(&value), "{strategy:?} gave {value}");
                let fbm = source.fbm2d(x, y, 5, 0.5, 2.0);
                assert!((-1.0..=1.0).contains(&fbm));
            }
        }
    }

    #[test]
    fn chunk_rngs_are_reproducible_and_independent() {
        let seed = WorldSeed::new(42);
        let mut a = seed.chunk_rng(3, -7, 1);
        let mut b = seed.chunk_rng(3, -7, 1);
        let mut c = seed.chunk_rng(-7, 3, 1);
        let first: Vec<u64> = (0..8).map(|_| a.u64(..)).collect();
        let second: Vec<u64> = (0..8).map(|_| b.u64(..)).collect();
        let swapped: Vec<u64> = (0..8).map(|_| c.u64(..)).collect();
        assert_eq!(first, second);
        assert_ne!(first, swapped);
    }

    #[test]
    fn column_chance_is_a_unit_interval_value() {
        let seed = WorldSeed::new(5);
        for x in -50..50 {
            let chance = seed.column_chance(x, x * 3, 9);
            assert!((0.0..1.0).contains(&chance));
            assert_eq!(chance, seed.column_chance(x, x * 3, 9));
        }
    }
}
