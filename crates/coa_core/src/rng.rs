//! rng.rs — Injectable random source for profile sampling.
//!
//! Every random decision in generation goes through one `PotencyRng` handed in
//! by the caller; there is no hidden global RNG. `SampleRng` is the production
//! implementation (ChaCha20 with explicit seeding); tests may supply their own.
//!
//! Seeding:
//! - `from_seed_u64(seed)`: `seed.to_le_bytes()` into the first 8 bytes of the
//!   32-byte ChaCha20 seed; the remaining 24 bytes are zero.
//! - `from_seed_hint(hint)`: the hint (e.g. a batch index) is first passed
//!   through one LCG step (`mix_seed_hint`) so that neighbouring hints land on
//!   unrelated streams. Same hint → same stream.
//! - `for_batch_entry(seed, index)`: mixes a batch seed with the entry index.

use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};

/// Knuth MMIX LCG multiplier / increment.
const LCG_MUL: u64 = 6_364_136_223_846_793_005;
const LCG_INC: u64 = 1_442_695_040_888_963_407;

/// Minimal random source used by the sampler: one uniform float in `[0, 1)`.
pub trait PotencyRng {
    fn next_f64(&mut self) -> f64;

    /// Uniform value in `[min, max]` (returns `min` for an empty or inverted range).
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.next_f64()
    }

    /// Bernoulli trial: `true` with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// One LCG step over the hint, used to spread small integer hints apart.
#[inline]
pub fn mix_seed_hint(hint: u64) -> u64 {
    hint.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC)
}

/// Fresh 64-bit seed from the OS. Used only when the caller supplies none;
/// callers record the returned seed so the run can be replayed.
pub fn entropy_seed() -> u64 {
    OsRng.next_u64()
}

/// Seedable ChaCha20 stream with a draw counter.
#[derive(Debug, Clone)]
pub struct SampleRng {
    rng: ChaCha20Rng,
    draws: u64,
}

impl SampleRng {
    /// Construct from an explicit 64-bit seed.
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self {
            rng: ChaCha20Rng::from_seed(seed32),
            draws: 0,
        }
    }

    /// Construct from a determinism hint such as a sample index.
    pub fn from_seed_hint(hint: u64) -> Self {
        Self::from_seed_u64(mix_seed_hint(hint))
    }

    /// Stream for entry `index` of a batch seeded with `seed`.
    pub fn for_batch_entry(seed: u64, index: u64) -> Self {
        Self::from_seed_u64(mix_seed_hint(seed ^ mix_seed_hint(index)))
    }

    /// Non-reproducible stream seeded from the OS.
    pub fn from_entropy() -> Self {
        Self::from_seed_u64(entropy_seed())
    }

    /// Number of floats drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl PotencyRng for SampleRng {
    /// 53 high bits of the next word scaled into `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        (self.rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

impl<R: PotencyRng + ?Sized> PotencyRng for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}
