//! Reference physics models for the standard generator lists.
//!
//! These implement the generator capabilities with simple closed-form
//! cross sections and kinematics. They exist so the driver can run end
//! to end; they are not tuned physics.
//!
//! All models assume the struck nucleon is at rest.

mod dis;
mod qel;
mod res;

pub use dis::dis_generator;
pub use qel::qel_generator;
pub use res::res_generator;

use crate::{
    interaction::{InitialState, Target},
    kinematics::LorentzVector,
    pdg::{self, NEUTRON, PROTON},
    types::PdgCode,
};

/// 1e-38 cm^2 expressed in GeV^-2.
pub const XSEC_1E38_CM2: f64 = 2.568e-11;

/// Fermi momentum used by the Pauli blocker (GeV).
pub const FERMI_MOMENTUM: f64 = 0.25;

/// Nucleons of a given type in the target.
fn nucleon_count(target: &Target, nucleon: PdgCode) -> u32 {
    match nucleon {
        PROTON => target.z,
        NEUTRON => target.n(),
        _ => 0,
    }
}

/// Hit nucleons present in the target.
fn hit_nucleons(target: &Target) -> Vec<PdgCode> {
    [PROTON, NEUTRON]
        .into_iter()
        .filter(|&n| nucleon_count(target, n) > 0)
        .collect()
}

/// Charge of a nucleon in units of e.
fn nucleon_charge(nucleon: PdgCode) -> i32 {
    if nucleon == PROTON { 1 } else { 0 }
}

/// Charge transferred to the hadronic side by the lepton current.
fn charge_transfer(probe: PdgCode, cc: bool) -> i32 {
    match (cc, pdg::is_neutrino(probe)) {
        (false, _) => 0,
        (true, true) => 1,
        (true, false) => -1,
    }
}

/// Outgoing lepton for a probe: the charged partner for CC, the probe for NC.
fn outgoing_lepton(init: &InitialState, cc: bool) -> PdgCode {
    if cc {
        pdg::cc_lepton(init.probe_pdg).unwrap_or(init.probe_pdg)
    } else {
        init.probe_pdg
    }
}

/// Smooth turn-on above a threshold: 0 below `e_th`, → 1 well above.
fn turn_on(e: f64, e_th: f64, scale: f64) -> f64 {
    if e <= e_th { 0.0 } else { 1.0 - (-(e - e_th) / scale).exp() }
}

/// Final-state lepton with energy `e_l` and momentum transfer `q2`, at
/// azimuth `phi` around the probe direction. `None` if not kinematically
/// allowed.
fn scattered_lepton(
    probe: &LorentzVector,
    e_l: f64,
    m_l: f64,
    q2: f64,
    phi: f64,
) -> Option<LorentzVector> {
    let e = probe.energy();
    if e_l <= m_l || e <= 0.0 {
        return None;
    }
    let p_l = (e_l * e_l - m_l * m_l).sqrt();
    let cos_theta = (2.0 * e * e_l - m_l * m_l - q2) / (2.0 * e * p_l);
    if !(-1.0..=1.0).contains(&cos_theta) {
        return None;
    }
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let local = LorentzVector::new(
        p_l * sin_theta * phi.cos(),
        p_l * sin_theta * phi.sin(),
        p_l * cos_theta,
        e_l,
    );
    Some(local.rotate_uz(probe.direction()))
}

/// Isotropic two-body decay of `parent` into masses `m1`, `m2`, drawing
/// two uniform deviates. `None` below threshold.
fn two_body_decay(
    parent: &LorentzVector,
    m1: f64,
    m2: f64,
    u_cos: f64,
    u_phi: f64,
) -> Option<(LorentzVector, LorentzVector)> {
    let w = parent.mass();
    if w <= m1 + m2 {
        return None;
    }
    let w2 = w * w;
    let p = ((w2 - (m1 + m2).powi(2)) * (w2 - (m1 - m2).powi(2))).sqrt() / (2.0 * w);
    let cos_t = 2.0 * u_cos - 1.0;
    let sin_t = (1.0 - cos_t * cos_t).sqrt();
    let phi = 2.0 * std::f64::consts::PI * u_phi;
    let (px, py, pz) = (p * sin_t * phi.cos(), p * sin_t * phi.sin(), p * cos_t);
    let a = LorentzVector::new(px, py, pz, (p * p + m1 * m1).sqrt());
    let b = LorentzVector::new(-px, -py, -pz, (p * p + m2 * m2).sqrt());
    let beta = parent.boost_vector();
    Some((a.boost(beta), b.boost(beta)))
}

fn nucleon_mass(nucleon: PdgCode) -> f64 {
    if nucleon == PROTON { pdg::PROTON_MASS } else { pdg::NEUTRON_MASS }
}

fn nucleon_at_rest(nucleon: PdgCode) -> LorentzVector {
    LorentzVector::new(0.0, 0.0, 0.0, nucleon_mass(nucleon))
}
