//! Baryon resonance data and Breit–Wigner line shapes.
//!
//! The resonance table is a fixed set of PDG values. The line shape is
//! behind the `BreitWigner` trait so cross section models can swap it.

use crate::{
    pdg::{NUCLEON_MASS, PION_MASS},
    types::PdgCode,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;

/// Baryon resonances known to the resonance-production model.
/// NEVER reorder: the discriminant is the resonance index.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resonance {
    P33_1232 = 0,
    P11_1440 = 1,
    D13_1520 = 2,
    S11_1535 = 3,
    D33_1700 = 4,
    F15_1680 = 5,
}

impl Resonance {
    pub const ALL: [Resonance; 6] = [
        Self::P33_1232,
        Self::P11_1440,
        Self::D13_1520,
        Self::S11_1535,
        Self::D33_1700,
        Self::F15_1680,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::P33_1232 => "P33(1232)",
            Self::P11_1440 => "P11(1440)",
            Self::D13_1520 => "D13(1520)",
            Self::S11_1535 => "S11(1535)",
            Self::D33_1700 => "D33(1700)",
            Self::F15_1680 => "F15(1680)",
        }
    }

    /// PDG code of the charge state, or `None` if the resonance has no
    /// state of that charge.
    pub fn pdg_code(&self, charge: i32) -> Option<PdgCode> {
        let code = match (self, charge) {
            (Self::P33_1232, 2) => 2224,
            (Self::P33_1232, 1) => 2214,
            (Self::P33_1232, 0) => 2114,
            (Self::P33_1232, -1) => 1114,
            (Self::P11_1440, 1) => 12212,
            (Self::P11_1440, 0) => 12112,
            (Self::D13_1520, 1) => 2124,
            (Self::D13_1520, 0) => 1214,
            (Self::S11_1535, 1) => 22212,
            (Self::S11_1535, 0) => 22112,
            (Self::D33_1700, 2) => 12224,
            (Self::D33_1700, 1) => 12214,
            (Self::D33_1700, 0) => 12114,
            (Self::D33_1700, -1) => 11114,
            (Self::F15_1680, 1) => 12216,
            (Self::F15_1680, 0) => 12116,
            _ => return None,
        };
        Some(code)
    }
}

/// Static properties of one resonance.
#[derive(Debug, Clone, Copy)]
pub struct ResonanceData {
    pub mass:          f64,
    pub width:         f64,
    pub orbital_l:     u32,
    pub is_delta:      bool,
    /// Integral of the unnormalised L-dependent line shape over W.
    pub bw_norm:       f64,
}

// (mass GeV, width GeV, L, isospin 3/2)
const PDG_TABLE: [(Resonance, f64, f64, u32, bool); 6] = [
    (Resonance::P33_1232, 1.232, 0.120, 1, true),
    (Resonance::P11_1440, 1.440, 0.350, 1, false),
    (Resonance::D13_1520, 1.520, 0.120, 2, false),
    (Resonance::S11_1535, 1.535, 0.150, 0, false),
    (Resonance::D33_1700, 1.700, 0.300, 2, true),
    (Resonance::F15_1680, 1.685, 0.130, 3, false),
];

/// Lookup table of baryon resonance properties.
#[derive(Debug, Clone)]
pub struct BaryonResTable {
    data: HashMap<Resonance, ResonanceData>,
}

impl BaryonResTable {
    pub fn pdg() -> Self {
        let data = PDG_TABLE
            .iter()
            .map(|&(res, mass, width, orbital_l, is_delta)| {
                let bw_norm = integrate_line_shape(mass, width, orbital_l);
                (res, ResonanceData { mass, width, orbital_l, is_delta, bw_norm })
            })
            .collect();
        Self { data }
    }

    pub fn get(&self, res: Resonance) -> &ResonanceData {
        // Every variant is in PDG_TABLE.
        &self.data[&res]
    }

    pub fn resonance_index(&self, res: Resonance) -> usize {
        res as usize
    }

    pub fn orbital_angular_mom(&self, res: Resonance) -> u32 {
        self.get(res).orbital_l
    }

    pub fn is_delta_resonance(&self, res: Resonance) -> bool {
        self.get(res).is_delta
    }

    pub fn is_n_resonance(&self, res: Resonance) -> bool {
        !self.get(res).is_delta
    }

    pub fn mass(&self, res: Resonance) -> f64 {
        self.get(res).mass
    }

    pub fn width(&self, res: Resonance) -> f64 {
        self.get(res).width
    }

    pub fn breit_wigner_norm(&self, res: Resonance) -> f64 {
        self.get(res).bw_norm
    }
}

/// A Breit–Wigner line shape for baryon resonances.
pub trait BreitWigner: Send + Sync {
    /// Evaluate the line shape for `res` at invariant mass `w` (GeV).
    fn eval(&self, res: Resonance, w: f64) -> f64;
}

/// Breit–Wigner with an L-dependent running width, normalised to unit area.
pub struct BreitWignerL {
    table: BaryonResTable,
}

impl BreitWignerL {
    pub fn new(table: BaryonResTable) -> Self {
        Self { table }
    }
}

impl BreitWigner for BreitWignerL {
    fn eval(&self, res: Resonance, w: f64) -> f64 {
        let d = self.table.get(res);
        let value = line_shape(w, d.mass, d.width, d.orbital_l);
        if d.bw_norm > 0.0 { value / d.bw_norm } else { 0.0 }
    }
}

/// Pion momentum in the rest frame of a N-pi system of mass `w`.
fn pion_momentum(w: f64) -> f64 {
    let w2 = w * w;
    let sum = (NUCLEON_MASS + PION_MASS).powi(2);
    let diff = (NUCLEON_MASS - PION_MASS).powi(2);
    ((w2 - sum) * (w2 - diff)).max(0.0).sqrt() / (2.0 * w)
}

fn line_shape(w: f64, mass: f64, width: f64, l: u32) -> f64 {
    if w <= NUCLEON_MASS + PION_MASS {
        return 0.0;
    }
    let q_w = pion_momentum(w);
    let q_m = pion_momentum(mass);
    if q_m <= 0.0 {
        return 0.0;
    }
    let running = width * (q_w / q_m).powi(2 * l as i32 + 1);
    let m2 = mass * mass;
    let mw2 = (mass * running).powi(2);
    (1.0 / PI) * mass * running / ((w * w - m2).powi(2) + mw2)
}

fn integrate_line_shape(mass: f64, width: f64, l: u32) -> f64 {
    const STEPS: usize = 4000;
    let lo = NUCLEON_MASS + PION_MASS;
    let hi = mass + 12.0 * width;
    let dw = (hi - lo) / STEPS as f64;
    // Trapezoid; the endpoint at threshold is zero.
    let mut sum = 0.5 * line_shape(hi, mass, width, l);
    for i in 1..STEPS {
        sum += line_shape(lo + i as f64 * dw, mass, width, l);
    }
    sum * dw
}
