//! Minimal 4-vector support for probe and final-state momenta.

use serde::{Deserialize, Serialize};

/// A Lorentz 4-vector (px, py, pz, E) in GeV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LorentzVector {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub e:  f64,
}

impl LorentzVector {
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// A massless probe travelling along +z with energy `e`.
    pub fn along_z(e: f64) -> Self {
        Self::new(0.0, 0.0, e, e)
    }

    pub fn energy(&self) -> f64 {
        self.e
    }

    pub fn p(&self) -> f64 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }

    /// Invariant mass squared; may be slightly negative from rounding.
    pub fn m2(&self) -> f64 {
        self.e * self.e - self.p() * self.p()
    }

    pub fn mass(&self) -> f64 {
        self.m2().max(0.0).sqrt()
    }

    /// Unit vector along the 3-momentum; +z for a particle at rest.
    pub fn direction(&self) -> [f64; 3] {
        let p = self.p();
        if p > 0.0 {
            [self.px / p, self.py / p, self.pz / p]
        } else {
            [0.0, 0.0, 1.0]
        }
    }

    /// Velocity (beta) of the frame in which this vector is at rest.
    pub fn boost_vector(&self) -> [f64; 3] {
        if self.e > 0.0 {
            [self.px / self.e, self.py / self.e, self.pz / self.e]
        } else {
            [0.0; 3]
        }
    }

    /// Lorentz boost by velocity `b`.
    pub fn boost(&self, b: [f64; 3]) -> Self {
        let b2 = b[0] * b[0] + b[1] * b[1] + b[2] * b[2];
        if b2 <= 0.0 || b2 >= 1.0 {
            return *self;
        }
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let bp = b[0] * self.px + b[1] * self.py + b[2] * self.pz;
        let gamma2 = (gamma - 1.0) / b2;
        let k = gamma2 * bp + gamma * self.e;
        Self::new(
            self.px + k * b[0],
            self.py + k * b[1],
            self.pz + k * b[2],
            gamma * (self.e + bp),
        )
    }

    /// Rotate so that the old +z axis points along unit vector `u`.
    pub fn rotate_uz(&self, u: [f64; 3]) -> Self {
        let [u1, u2, u3] = u;
        let up2 = u1 * u1 + u2 * u2;
        let (px, py, pz) = (self.px, self.py, self.pz);
        if up2 > 0.0 {
            let up = up2.sqrt();
            Self::new(
                (u1 * u3 * px - u2 * py) / up + u1 * pz,
                (u2 * u3 * px + u1 * py) / up + u2 * pz,
                -up * px + u3 * pz,
                self.e,
            )
        } else if u3 < 0.0 {
            Self::new(-px, py, -pz, self.e)
        } else {
            *self
        }
    }
}

impl std::ops::Add for LorentzVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.px + rhs.px, self.py + rhs.py, self.pz + rhs.pz, self.e + rhs.e)
    }
}

impl std::ops::Sub for LorentzVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.px - rhs.px, self.py - rhs.py, self.pz - rhs.pz, self.e - rhs.e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_to_rest_frame_and_back() {
        let v = LorentzVector::new(0.3, -0.2, 1.1, 2.0);
        let rest = v.boost(v.boost_vector().map(|b| -b));
        assert!(rest.p() < 1e-12);
        assert!((rest.e - v.mass()).abs() < 1e-12);
        let back = rest.boost(v.boost_vector());
        assert!((back.pz - v.pz).abs() < 1e-12);
        assert!((back.e - v.e).abs() < 1e-12);
    }

    #[test]
    fn rotate_uz_maps_z_onto_u() {
        let z = LorentzVector::along_z(1.0);
        let u = LorentzVector::new(1.0, 2.0, 2.0, 3.0).direction();
        let r = z.rotate_uz(u);
        assert!((r.px - u[0]).abs() < 1e-12);
        assert!((r.py - u[1]).abs() < 1e-12);
        assert!((r.pz - u[2]).abs() < 1e-12);
    }
}
