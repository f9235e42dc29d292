mod common;

use common::*;
use nuevg_core::{
    chain::ResponsibilityChain,
    config::DriverConfig,
    driver::energy_range_of,
    generator::{
        AlgId, EventGenerator, FnListGenerator, FnXSec, GeneratorModule, SharedGenerator,
        ValidityContext, XSecAlgorithm,
    },
    interaction::{InitialState, Interaction, ScatteringType, Target},
    pdg::{self, NEUTRON},
    resonance::Resonance,
    rng::EvgRng,
    selector::{InteractionSelector, XSecSource},
    spline_cache::SplineCache,
    xsec_map::XSecAlgorithmMap,
    EvgDriver, EvgError,
};
use std::sync::Arc;

fn carbon() -> InitialState {
    InitialState::new(pdg::NU_MU, Target::new(6, 12))
}

// ── Energy range ────────────────────────────────────────────────────

#[test]
fn energy_range_is_the_union_of_generator_ranges() {
    let generators = vec![
        toy_generator("A", ScatteringType::QuasiElastic, 1.0, 5.0),
        toy_generator("B", ScatteringType::DeepInelastic, 3.0, 10.0),
    ];
    let range = energy_range_of(&generators).expect("range");
    assert_eq!(range.min, 1.0);
    assert_eq!(range.max, 10.0);
}

#[test]
fn empty_generator_list_has_no_energy_range() {
    let err = energy_range_of(&[]).err().expect("empty");
    assert!(matches!(err, EvgError::EmptyEnergyRange { .. }));
}

#[test]
fn emin_is_floored_for_the_energy_range() {
    let generators = vec![toy_generator("A", ScatteringType::QuasiElastic, 0.0, 5.0)];
    assert_eq!(energy_range_of(&generators).expect("range").min, 0.01);
}

#[test]
fn default_list_energy_range() {
    let mut driver = EvgDriver::standalone(DriverConfig::default_test());
    driver.configure_pdg(pdg::NU_MU_BAR, 8, 16).expect("configure");
    let range = driver.valid_energy_range().expect("range");
    assert_eq!(range.min, 0.01);
    assert_eq!(range.max, 300.0);
}

// ── Responsibility chain ────────────────────────────────────────────

#[test]
fn first_accepting_generator_wins() {
    let first = toy_generator("First", ScatteringType::QuasiElastic, 0.1, 10.0);
    let second = toy_generator("Second", ScatteringType::QuasiElastic, 0.1, 10.0);
    let chain = ResponsibilityChain::new(&[Arc::clone(&first), Arc::clone(&second)]);

    let mut interaction = Interaction::new(carbon(), cc(ScatteringType::QuasiElastic));
    interaction.init_state.set_probe_p4(p4(2.0));
    assert!(first.accepts(&interaction) && second.accepts(&interaction));
    assert_eq!(chain.find_generator(&interaction).expect("found").key(), "First");

    let reversed = ResponsibilityChain::new(&[second, first]);
    assert_eq!(reversed.find_generator(&interaction).expect("found").key(), "Second");
}

#[test]
fn chain_respects_energy_and_process() {
    let qel = toy_generator("QEL", ScatteringType::QuasiElastic, 0.1, 2.0);
    let dis = toy_generator("DIS", ScatteringType::DeepInelastic, 1.0, 50.0);
    let chain = ResponsibilityChain::new(&[qel, dis]);

    let mut interaction = Interaction::new(carbon(), cc(ScatteringType::DeepInelastic));
    interaction.init_state.set_probe_p4(p4(1.5));
    assert_eq!(chain.find_generator(&interaction).expect("found").key(), "DIS");

    let mut too_fast = Interaction::new(carbon(), cc(ScatteringType::QuasiElastic));
    too_fast.init_state.set_probe_p4(p4(5.0));
    let err = chain.find_generator(&too_fast).err().expect("nobody");
    assert!(matches!(err, EvgError::NoResponsibleGenerator { .. }));
    assert!(err.is_fatal());
}

// ── Algorithm map ───────────────────────────────────────────────────

#[test]
fn duplicate_interactions_keep_their_first_owner() {
    let a = toy_generator("Owner", ScatteringType::QuasiElastic, 0.1, 10.0);
    let b = toy_generator("Latecomer", ScatteringType::QuasiElastic, 0.1, 10.0);
    let map = XSecAlgorithmMap::build(&carbon(), &[a, b]);

    assert_eq!(map.len(), 2);
    for interaction in map.interaction_list() {
        assert_eq!(map.owner_of(interaction), Some("Owner"));
        let alg = map.find_algorithm(interaction).expect("registered");
        assert_eq!(alg.id(), &AlgId::new("OwnerXSec", "Default"));
    }
}

#[test]
fn generators_without_interactions_are_skipped() {
    let no_list: SharedGenerator = GeneratorModule::new(
        "NoList",
        ValidityContext::new(0.1, 10.0),
        Arc::new(FnXSec::new(AlgId::new("X", "Default"), |_: &Interaction| 1.0)),
    )
    .into_shared();
    let empty_list: SharedGenerator = GeneratorModule::new(
        "EmptyList",
        ValidityContext::new(0.1, 10.0),
        Arc::new(FnXSec::new(AlgId::new("Y", "Default"), |_: &Interaction| 1.0)),
    )
    .with_list_generator(FnListGenerator(|_: &InitialState| Vec::new()))
    .into_shared();
    let toy = toy_generator("Toy", ScatteringType::QuasiElastic, 0.1, 10.0);

    let map = XSecAlgorithmMap::build(&carbon(), &[no_list, empty_list, toy]);
    assert_eq!(map.len(), 2);
    assert!(map.interaction_list().all(|i| map.owner_of(i) == Some("Toy")));
}

#[test]
fn unknown_interaction_has_no_algorithm() {
    let map = XSecAlgorithmMap::build(
        &carbon(),
        &[toy_generator("Toy", ScatteringType::QuasiElastic, 0.1, 10.0)],
    );
    let stranger = Interaction::new(carbon(), cc(ScatteringType::Resonant));
    let err = map.find_algorithm(&stranger).err().expect("absent");
    assert!(matches!(err, EvgError::AlgorithmNotFound { .. }));
}

// ── Interaction selector ────────────────────────────────────────────

/// Three resonant interactions on a neutron with fixed cross sections.
fn weighted_map(weights: [f64; 3]) -> XSecAlgorithmMap {
    let resonances = [Resonance::P33_1232, Resonance::P11_1440, Resonance::D13_1520];
    let alg = FnXSec::new(AlgId::new("Fixed", "Default"), move |i: &Interaction| {
        match i.resonance {
            Some(Resonance::P33_1232) => weights[0],
            Some(Resonance::P11_1440) => weights[1],
            Some(Resonance::D13_1520) => weights[2],
            _ => 0.0,
        }
    });
    let gen = GeneratorModule::new("Fixed", ValidityContext::new(0.1, 10.0), Arc::new(alg))
        .with_list_generator(FnListGenerator(move |init: &InitialState| {
            resonances
                .iter()
                .map(|&r| {
                    Interaction::new(init.clone(), cc(ScatteringType::Resonant))
                        .with_hit_nucleon(NEUTRON)
                        .with_resonance(r)
                })
                .collect()
        }))
        .into_shared();
    XSecAlgorithmMap::build(&carbon(), &[gen])
}

#[test]
fn zero_weight_interactions_are_never_selected() {
    let map = weighted_map([0.0, 0.0, 5.0]);
    let cache = SplineCache::new();
    let selector = InteractionSelector::new();
    let mut rng = EvgRng::new(11, 0);

    for _ in 0..200 {
        let record = selector
            .select_interaction(&map, p4(1.0), XSecSource::new(&cache, false), &mut rng)
            .expect("select");
        assert_eq!(record.interaction().resonance, Some(Resonance::D13_1520));
        assert_eq!(record.xsec(), 5.0);
        assert_eq!(record.interaction().probe_energy(), 1.0);
    }
}

#[test]
fn all_zero_weights_fail_selection() {
    let map = weighted_map([0.0, 0.0, 0.0]);
    let cache = SplineCache::new();
    let mut rng = EvgRng::new(11, 0);
    let err = InteractionSelector::new()
        .select_interaction(&map, p4(1.0), XSecSource::new(&cache, false), &mut rng)
        .err()
        .expect("nothing to select");
    assert!(matches!(err, EvgError::NoValidInteraction { .. }));
}

#[test]
fn negative_and_nan_weights_count_as_zero() {
    let map = weighted_map([-3.0, f64::NAN, 1.0]);
    let cache = SplineCache::new();
    let mut rng = EvgRng::new(5, 0);
    for _ in 0..50 {
        let record = InteractionSelector::new()
            .select_interaction(&map, p4(1.0), XSecSource::new(&cache, false), &mut rng)
            .expect("select");
        assert_eq!(record.interaction().resonance, Some(Resonance::D13_1520));
    }
}

#[test]
fn selection_frequencies_follow_cross_sections() {
    let map = weighted_map([1.0, 3.0, 0.0]);
    let cache = SplineCache::new();
    let mut rng = EvgRng::new(2024, 0);
    let n = 4000;
    let heavy = (0..n)
        .filter(|_| {
            InteractionSelector::new()
                .select_interaction(&map, p4(1.0), XSecSource::new(&cache, false), &mut rng)
                .expect("select")
                .interaction()
                .resonance
                == Some(Resonance::P11_1440)
        })
        .count();
    let fraction = heavy as f64 / n as f64;
    assert!((fraction - 0.75).abs() < 0.04, "fraction = {fraction}");
}
