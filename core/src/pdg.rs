//! PDG particle codes and classification helpers.

use crate::types::PdgCode;

pub const NU_E: PdgCode = 12;
pub const NU_E_BAR: PdgCode = -12;
pub const NU_MU: PdgCode = 14;
pub const NU_MU_BAR: PdgCode = -14;
pub const NU_TAU: PdgCode = 16;
pub const NU_TAU_BAR: PdgCode = -16;

pub const ELECTRON: PdgCode = 11;
pub const POSITRON: PdgCode = -11;
pub const MUON: PdgCode = 13;
pub const ANTI_MUON: PdgCode = -13;
pub const TAU: PdgCode = 15;
pub const ANTI_TAU: PdgCode = -15;

pub const PROTON: PdgCode = 2212;
pub const NEUTRON: PdgCode = 2112;
pub const PI_PLUS: PdgCode = 211;
pub const PI_MINUS: PdgCode = -211;
pub const PI_ZERO: PdgCode = 111;

/// Pseudo-particle code used for the unfragmented hadronic system.
pub const HADRONIC_SYSTEM: PdgCode = 2_000_000_001;

pub const PROTON_MASS: f64 = 0.938_272;
pub const NEUTRON_MASS: f64 = 0.939_565;
pub const NUCLEON_MASS: f64 = 0.5 * (PROTON_MASS + NEUTRON_MASS);
pub const PION_MASS: f64 = 0.139_570;

pub fn is_neutrino(pdg: PdgCode) -> bool {
    matches!(pdg, NU_E | NU_MU | NU_TAU)
}

pub fn is_anti_neutrino(pdg: PdgCode) -> bool {
    matches!(pdg, NU_E_BAR | NU_MU_BAR | NU_TAU_BAR)
}

pub fn is_nucleon(pdg: PdgCode) -> bool {
    pdg == PROTON || pdg == NEUTRON
}

/// Largest Z or A the ion code has digits for.
pub const MAX_ION_ZA: u32 = 999;

/// Ion code: 10LZZZAAAI with L = I = 0. Z and A are clamped to three digits.
pub fn ion_pdg_code(z: u32, a: u32) -> PdgCode {
    let (z, a) = (z.min(MAX_ION_ZA) as PdgCode, a.min(MAX_ION_ZA) as PdgCode);
    1_000_000_000 + z * 10_000 + a * 10
}

/// Charged lepton produced by a charged-current interaction of `probe`.
pub fn cc_lepton(probe: PdgCode) -> Option<PdgCode> {
    match probe {
        NU_E => Some(ELECTRON),
        NU_E_BAR => Some(POSITRON),
        NU_MU => Some(MUON),
        NU_MU_BAR => Some(ANTI_MUON),
        NU_TAU => Some(TAU),
        NU_TAU_BAR => Some(ANTI_TAU),
        _ => None,
    }
}

pub fn lepton_mass(pdg: PdgCode) -> f64 {
    match pdg.abs() {
        11 => 0.000_511,
        13 => 0.105_658,
        15 => 1.776_86,
        _ => 0.0,
    }
}

pub fn name(pdg: PdgCode) -> String {
    let s = match pdg {
        NU_E => "nu_e",
        NU_E_BAR => "nu_e_bar",
        NU_MU => "nu_mu",
        NU_MU_BAR => "nu_mu_bar",
        NU_TAU => "nu_tau",
        NU_TAU_BAR => "nu_tau_bar",
        ELECTRON => "e-",
        POSITRON => "e+",
        MUON => "mu-",
        ANTI_MUON => "mu+",
        TAU => "tau-",
        ANTI_TAU => "tau+",
        PROTON => "proton",
        NEUTRON => "neutron",
        PI_PLUS => "pi+",
        PI_MINUS => "pi-",
        PI_ZERO => "pi0",
        HADRONIC_SYSTEM => "HadrSyst",
        _ => return format!("pdg:{pdg}"),
    };
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutrino_predicates_split_by_sign() {
        for nu in [NU_E, NU_MU, NU_TAU] {
            assert!(is_neutrino(nu));
            assert!(!is_anti_neutrino(nu));
            assert!(is_anti_neutrino(-nu));
        }
        assert!(!is_neutrino(MUON));
        assert!(!is_anti_neutrino(PROTON));
    }

    #[test]
    fn iron_56_ion_code() {
        assert_eq!(ion_pdg_code(26, 56), 1_000_260_560);
    }

    #[test]
    fn oversized_ion_code_does_not_overflow() {
        assert_eq!(ion_pdg_code(u32::MAX, u32::MAX), ion_pdg_code(999, 999));
    }

    #[test]
    fn cc_lepton_keeps_lepton_number() {
        assert_eq!(cc_lepton(NU_MU), Some(MUON));
        assert_eq!(cc_lepton(NU_MU_BAR), Some(ANTI_MUON));
        assert_eq!(cc_lepton(PROTON), None);
    }
}
