//! Initial states and interactions.
//!
//! An `Interaction` is a candidate process built from an `InitialState`.
//! Its identity (`as_key`) deliberately leaves out the probe 4-momentum:
//! the same candidate at two energies is the same map/cache entry.

use crate::{
    kinematics::LorentzVector,
    pdg,
    resonance::Resonance,
    types::{InteractionKey, PdgCode},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub z: u32,
    pub a: u32,
}

impl Target {
    pub fn new(z: u32, a: u32) -> Self {
        Self { z, a }
    }

    pub fn pdg_code(&self) -> PdgCode {
        pdg::ion_pdg_code(self.z, self.a)
    }

    pub fn n(&self) -> u32 {
        self.a.saturating_sub(self.z)
    }

    pub fn is_free_nucleon(&self) -> bool {
        self.a == 1
    }

    /// At least one nucleon, Z <= A, and both within the ion code digits.
    pub fn is_valid(&self) -> bool {
        (1..=pdg::MAX_ION_ZA).contains(&self.a) && self.z <= self.a
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialState {
    pub probe_pdg: PdgCode,
    pub target:    Target,
    pub probe_p4:  LorentzVector,
}

impl InitialState {
    pub fn new(probe_pdg: PdgCode, target: Target) -> Self {
        Self {
            probe_pdg,
            target,
            probe_p4: LorentzVector::default(),
        }
    }

    pub fn with_probe_p4(mut self, p4: LorentzVector) -> Self {
        self.probe_p4 = p4;
        self
    }

    pub fn set_probe_p4(&mut self, p4: LorentzVector) {
        self.probe_p4 = p4;
    }

    pub fn probe_energy(&self) -> f64 {
        self.probe_p4.energy()
    }

    pub fn is_valid(&self) -> bool {
        pdg::is_neutrino(self.probe_pdg) || pdg::is_anti_neutrino(self.probe_pdg)
    }

    pub fn as_key(&self) -> String {
        format!("nu:{};tgt:{}", self.probe_pdg, self.target.pdg_code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatteringType {
    QuasiElastic,
    Resonant,
    DeepInelastic,
}

impl ScatteringType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuasiElastic  => "QES",
            Self::Resonant      => "RES",
            Self::DeepInelastic => "DIS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentType {
    ChargedCurrent,
    NeutralCurrent,
}

impl CurrentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChargedCurrent => "CC",
            Self::NeutralCurrent => "NC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub scattering: ScatteringType,
    pub current:    CurrentType,
}

impl ProcessInfo {
    pub fn new(scattering: ScatteringType, current: CurrentType) -> Self {
        Self { scattering, current }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub init_state:      InitialState,
    pub process:         ProcessInfo,
    pub hit_nucleon_pdg: Option<PdgCode>,
    pub resonance:       Option<Resonance>,
}

impl Interaction {
    pub fn new(init_state: InitialState, process: ProcessInfo) -> Self {
        Self {
            init_state,
            process,
            hit_nucleon_pdg: None,
            resonance: None,
        }
    }

    pub fn with_hit_nucleon(mut self, pdg: PdgCode) -> Self {
        self.hit_nucleon_pdg = Some(pdg);
        self
    }

    pub fn with_resonance(mut self, res: Resonance) -> Self {
        self.resonance = Some(res);
        self
    }

    pub fn probe_energy(&self) -> f64 {
        self.init_state.probe_energy()
    }

    pub fn is_cc(&self) -> bool {
        self.process.current == CurrentType::ChargedCurrent
    }

    /// Canonical identity, stable across energies.
    pub fn as_key(&self) -> InteractionKey {
        let mut key = format!(
            "{};proc:{}-{}",
            self.init_state.as_key(),
            self.process.scattering.as_str(),
            self.process.current.as_str(),
        );
        if let Some(nucleon) = self.hit_nucleon_pdg {
            key.push_str(&format!(";N:{nucleon}"));
        }
        if let Some(res) = self.resonance {
            key.push_str(&format!(";res:{}", res.name()));
        }
        key
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qel() -> Interaction {
        let init = InitialState::new(pdg::NU_MU, Target::new(26, 56));
        Interaction::new(init, ProcessInfo::new(ScatteringType::QuasiElastic, CurrentType::ChargedCurrent))
            .with_hit_nucleon(pdg::NEUTRON)
    }

    #[test]
    fn target_bounds() {
        assert!(Target::new(26, 56).is_valid());
        assert!(Target::new(0, 1).is_valid());
        assert!(!Target::new(0, 0).is_valid());
        assert!(!Target::new(7, 6).is_valid());
        assert!(!Target::new(500, 1000).is_valid());
    }

    #[test]
    fn key_ignores_probe_momentum() {
        let a = qel();
        let mut b = qel();
        b.init_state.set_probe_p4(LorentzVector::along_z(5.0));
        assert_eq!(a.as_key(), b.as_key());
    }

    #[test]
    fn key_distinguishes_nucleon_and_resonance() {
        let a = qel();
        let b = qel().with_hit_nucleon(pdg::PROTON);
        let c = qel().with_resonance(Resonance::P33_1232);
        assert_ne!(a.as_key(), b.as_key());
        assert_ne!(a.as_key(), c.as_key());
    }
}
