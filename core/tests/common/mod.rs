//! Small test-only generators built on the public capability traits.
#![allow(dead_code)]

use nuevg_core::{
    config::DriverConfig,
    event_record::{EventRecord, ParticleStatus},
    generator::{
        AlgId, FnListGenerator, FnVisitor, FnXSec, GeneratorModule, SharedGenerator,
        ValidityContext,
    },
    generator_list::GeneratorCatalog,
    interaction::{CurrentType, InitialState, Interaction, ProcessInfo, ScatteringType},
    kinematics::LorentzVector,
    pdg::{self, NEUTRON, PROTON},
    rng::EvgRng,
    spline_cache::SplineCache,
    EvgDriver,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

pub const CARBON: (u32, u32) = (6, 12);

pub fn cc(scattering: ScatteringType) -> ProcessInfo {
    ProcessInfo::new(scattering, CurrentType::ChargedCurrent)
}

/// CC interactions on every nucleon type in the target.
fn cc_on_each_nucleon(scattering: ScatteringType) -> FnListGenerator<impl Fn(&InitialState) -> Vec<Interaction> + Send + Sync> {
    FnListGenerator(move |init: &InitialState| {
        [PROTON, NEUTRON]
            .into_iter()
            .filter(|&n| if n == PROTON { init.target.z > 0 } else { init.target.n() > 0 })
            .map(|n| Interaction::new(init.clone(), cc(scattering)).with_hit_nucleon(n))
            .collect()
    })
}

/// Linear in E: 1e-11 * E on protons, 2e-11 * E on neutrons.
pub fn toy_xsec(interaction: &Interaction) -> f64 {
    let per_gev = match interaction.hit_nucleon_pdg {
        Some(PROTON) => 1.0e-11,
        Some(NEUTRON) => 2.0e-11,
        _ => 0.0,
    };
    per_gev * interaction.probe_energy()
}

fn emit_lepton(record: &mut EventRecord, _rng: &mut EvgRng) -> anyhow::Result<()> {
    let init = record.interaction().init_state.clone();
    let lepton = pdg::cc_lepton(init.probe_pdg).unwrap_or(init.probe_pdg);
    record.add_particle(lepton, ParticleStatus::StableFinalState, Some(0), init.probe_p4);
    Ok(())
}

/// A well-behaved generator: linear cross sections, one outgoing lepton.
pub fn toy_generator(key: &str, scattering: ScatteringType, emin: f64, emax: f64) -> SharedGenerator {
    let validity = ValidityContext::new(emin, emax).with_process(cc(scattering));
    let alg = FnXSec::new(AlgId::new(format!("{key}XSec"), "Default"), toy_xsec);
    GeneratorModule::new(key, validity, Arc::new(alg))
        .with_list_generator(cc_on_each_nucleon(scattering))
        .with_visitor(FnVisitor::new("EmitLepton", emit_lepton))
        .into_shared()
}

/// A generator whose every record comes out unphysical. `calls` counts
/// how many records it processed.
pub fn always_unphysical(calls: Arc<AtomicUsize>) -> SharedGenerator {
    let validity = ValidityContext::new(0.1, 50.0);
    let alg = FnXSec::new(AlgId::new("FlatXSec", "Default"), |_: &Interaction| 1.0e-11);
    GeneratorModule::new("AlwaysUnphysical", validity, Arc::new(alg))
        .with_list_generator(cc_on_each_nucleon(ScatteringType::QuasiElastic))
        .with_visitor(FnVisitor::new("Reject", move |record: &mut EventRecord, _: &mut EvgRng| {
            calls.fetch_add(1, Ordering::SeqCst);
            record.mark_unphysical("rejected by test visitor");
            Ok(())
        }))
        .into_shared()
}

/// A generator whose cross sections are all zero.
pub fn zero_xsec_generator() -> SharedGenerator {
    let validity = ValidityContext::new(0.1, 50.0);
    let alg = FnXSec::new(AlgId::new("ZeroXSec", "Default"), |_: &Interaction| 0.0);
    GeneratorModule::new("ZeroXSec", validity, Arc::new(alg))
        .with_list_generator(cc_on_each_nucleon(ScatteringType::QuasiElastic))
        .into_shared()
}

/// Catalog with a "Toy" list of QEL [0.1, 20] and DIS [1, 50] toy generators.
pub fn toy_catalog() -> GeneratorCatalog {
    let mut catalog = GeneratorCatalog::empty();
    catalog.register("Toy", || {
        vec![
            toy_generator("ToyQEL", ScatteringType::QuasiElastic, 0.1, 20.0),
            toy_generator("ToyDIS", ScatteringType::DeepInelastic, 1.0, 50.0),
        ]
    });
    catalog
}

pub fn driver_with(catalog: GeneratorCatalog, list: &str, seed: u64) -> EvgDriver {
    let config = DriverConfig::default_test().with_generator_list(list).with_seed(seed);
    EvgDriver::new(config, Arc::new(catalog), SplineCache::shared())
}

pub fn configured_toy_driver(seed: u64) -> EvgDriver {
    let mut driver = driver_with(toy_catalog(), "Toy", seed);
    driver
        .configure_pdg(pdg::NU_MU, CARBON.0, CARBON.1)
        .expect("configure toy driver");
    driver
}

pub fn p4(energy: f64) -> LorentzVector {
    LorentzVector::along_z(energy)
}
