//! Randomness for targeting tie-breaks
//!
//! The session owns a single source. Battles are not meant to be replayable,
//! so production sessions seed from OS entropy; tests seed explicitly.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;

/// Trait for random number generation in battles
pub trait BattleRng {
    /// Generate a random u32
    fn next_u32(&mut self) -> u32;

    /// Generate a random number in range [0, max)
    fn gen_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u32() as usize) % max
    }

    /// Pick a uniformly random element, or `None` for an empty slice
    fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            return None;
        }
        let idx = self.gen_range(slice.len());
        slice.get(idx)
    }
}

/// XorShift32 RNG - simple and fast, not cryptographic.
#[derive(Debug, Clone, Encode, Decode, TypeInfo)]
pub struct XorShiftRng {
    state: u32,
}

impl XorShiftRng {
    /// Create a new RNG from a u64 seed
    ///
    /// The seed is folded into a u32, ensuring state is never 0.
    pub fn seed_from_u64(seed: u64) -> Self {
        let state = ((seed as u32) ^ ((seed >> 32) as u32)).max(1);
        Self { state }
    }

    /// Seed from operating system entropy.
    #[cfg(feature = "std")]
    pub fn from_entropy() -> Self {
        let mut bytes = [0u8; 8];
        if let Err(err) = getrandom::getrandom(&mut bytes) {
            crate::log::warn(&alloc::format!("entropy unavailable ({}), using fixed seed", err));
            return Self::seed_from_u64(0x9E37_79B9_7F4A_7C15);
        }
        Self::seed_from_u64(u64::from_le_bytes(bytes))
    }
}

impl BattleRng for XorShiftRng {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
