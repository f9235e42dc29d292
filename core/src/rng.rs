//! Deterministic random number generation.
//!
//! RULE: Nothing in the driver may call any platform RNG.
//! All randomness flows through EvgRng instances derived from the
//! single master seed given to the driver.
//!
//! Interaction selection and record processing draw from separate
//! streams, seeded from (master_seed XOR stream_index). This means:
//!   - Changing how many numbers a generator consumes never shifts
//!     which interactions get selected.
//!   - Each stream is reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG stream.
pub struct EvgRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl EvgRng {
    /// Create a stream from the master seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Sample `exp(-x / scale)` truncated to [0, max].
    pub fn truncated_exp(&mut self, scale: f64, max: f64) -> f64 {
        if max <= 0.0 {
            return 0.0;
        }
        let u = self.next_f64();
        -scale * (1.0 - u * (1.0 - (-max / scale).exp())).ln()
    }

    /// Azimuthal angle in [0, 2pi).
    pub fn azimuth(&mut self) -> f64 {
        self.uniform(0.0, std::f64::consts::TAU)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform float in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Source of the driver's RNG streams, indexed by stable slot.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_stream(&self, slot: StreamSlot) -> EvgRng {
        EvgRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries; only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    InteractionSelection = 0,
    RecordProcessing = 1,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InteractionSelection => "interaction_selection",
            Self::RecordProcessing => "record_processing",
        }
    }
}
