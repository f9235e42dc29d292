//! Shared primitive types used across the driver.

/// A PDG particle code (Particle Data Group numbering scheme).
pub type PdgCode = i32;

/// Energies and momenta are in GeV throughout.
pub type GeV = f64;

/// A canonical interaction identity string, see `Interaction::as_key`.
pub type InteractionKey = String;

/// A closed energy interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Range1D {
    pub min: GeV,
    pub max: GeV,
}

impl Range1D {
    pub fn new(min: GeV, max: GeV) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, x: GeV) -> bool {
        x >= self.min && x <= self.max
    }
}
