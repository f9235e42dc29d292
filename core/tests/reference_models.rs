//! End-to-end runs of the standard generator lists.

mod common;

use common::p4;
use nuevg_core::{
    config::DriverConfig,
    event_record::{EventRecord, ParticleStatus},
    interaction::ScatteringType,
    kinematics::LorentzVector,
    pdg,
    EvgDriver,
};

fn driver(list: &str, probe: i32, z: u32, a: u32, seed: u64) -> EvgDriver {
    let config = DriverConfig::default_test().with_generator_list(list).with_seed(seed);
    let mut driver = EvgDriver::standalone(config);
    driver.configure_pdg(probe, z, a).expect("configure");
    driver
}

/// Final-state 4-momentum minus probe and struck nucleon.
fn imbalance(record: &EventRecord) -> LorentzVector {
    let particles = record.particles();
    let hit = particles
        .iter()
        .find(|p| p.status == ParticleStatus::Intermediate && p.mother == Some(1))
        .expect("struck nucleon");
    let out = record
        .final_state()
        .fold(LorentzVector::default(), |acc, p| acc + p.p4);
    out - (particles[0].p4 + hit.p4)
}

#[test]
fn default_list_conserves_four_momentum() {
    for probe in [pdg::NU_MU, pdg::NU_E_BAR] {
        let mut driver = driver("Default", probe, 26, 56, 17);
        for _ in 0..200 {
            let record = driver.generate_event(p4(3.0)).expect("generate");
            assert!(!record.is_unphysical());
            let d = imbalance(&record);
            for c in [d.px, d.py, d.pz, d.e] {
                assert!(c.abs() < 1e-6, "imbalance {d:?} in {}", record.interaction());
            }
        }
    }
}

#[test]
fn default_list_produces_every_scattering_type() {
    let mut driver = driver("Default", pdg::NU_MU, 26, 56, 23);
    let mut seen = [false; 3];
    for _ in 0..500 {
        let record = driver.generate_event(p4(3.0)).expect("generate");
        let idx = match record.interaction().process.scattering {
            ScatteringType::QuasiElastic => 0,
            ScatteringType::Resonant => 1,
            ScatteringType::DeepInelastic => 2,
        };
        seen[idx] = true;
    }
    assert_eq!(seen, [true, true, true]);
}

#[test]
fn ccqe_dis_list_has_no_resonances() {
    let mut driver = driver("CCQE+DIS", pdg::NU_MU, 6, 12, 5);
    for _ in 0..200 {
        let record = driver.generate_event(p4(5.0)).expect("generate");
        assert_ne!(record.interaction().process.scattering, ScatteringType::Resonant);
    }
}

#[test]
fn cc_events_emit_the_charged_partner_lepton() {
    let mut driver = driver("QEL", pdg::NU_MU, 26, 56, 9);
    for _ in 0..100 {
        let record = driver.generate_event(p4(1.0)).expect("generate");
        let expected = if record.interaction().is_cc() { pdg::MUON } else { pdg::NU_MU };
        assert!(record.final_state().any(|p| p.pdg == expected));
    }
}

#[test]
fn total_xsec_grows_with_energy_above_thresholds() {
    let driver = driver("Default", pdg::NU_MU, 26, 56, 1);
    let low = driver.xsec_sum(p4(0.5)).expect("sum");
    let mid = driver.xsec_sum(p4(5.0)).expect("sum");
    let high = driver.xsec_sum(p4(50.0)).expect("sum");
    assert!(low > 0.0);
    assert!(mid > low);
    assert!(high > mid);
}

#[test]
fn tau_neutrinos_below_tau_threshold_only_scatter_neutrally() {
    let mut driver = driver("Default", pdg::NU_TAU, 8, 16, 4);
    for _ in 0..100 {
        let record = driver.generate_event(p4(2.0)).expect("generate");
        assert!(!record.interaction().is_cc());
    }
}

#[test]
fn default_list_generates_up_to_the_top_of_its_range() {
    let mut driver = driver("Default", pdg::NU_MU, 26, 56, 31);
    let range = driver.valid_energy_range().expect("range");
    assert_eq!(range.max, 300.0);
    for e in [150.0, range.max] {
        for _ in 0..100 {
            let record = driver.generate_event(p4(e)).expect("generate");
            assert_eq!(record.interaction().process.scattering, ScatteringType::DeepInelastic);
        }
    }
}
