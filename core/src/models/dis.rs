//! Deep inelastic scattering off a single nucleon, with the hadronic
//! final state left as one unfragmented system.

use super::{
    hit_nucleons, nucleon_at_rest, nucleon_count, nucleon_mass, outgoing_lepton,
    scattered_lepton, turn_on, XSEC_1E38_CM2,
};
use crate::{
    event_record::{EventRecord, ParticleStatus},
    generator::{
        AlgId, GeneratorModule, InteractionListGenerator, RecordVisitor, SharedGenerator,
        ValidityContext, XSecAlgorithm,
    },
    interaction::{CurrentType, InitialState, Interaction, ProcessInfo, ScatteringType},
    pdg::{self, HADRONIC_SYSTEM},
    rng::EvgRng,
};
use std::sync::Arc;

/// Lowest hadronic invariant mass treated as DIS (GeV).
pub const W_CUT: f64 = 1.7;

// Total cross section slopes, 1e-38 cm^2 / GeV per nucleon.
const NU_SLOPE: f64 = 0.677;
const NU_BAR_SLOPE: f64 = 0.334;
const NC_FRACTION: f64 = 0.3;
const DIS_EMAX: f64 = 300.0;

const DIS_CC: ProcessInfo = ProcessInfo {
    scattering: ScatteringType::DeepInelastic,
    current:    CurrentType::ChargedCurrent,
};
const DIS_NC: ProcessInfo = ProcessInfo {
    scattering: ScatteringType::DeepInelastic,
    current:    CurrentType::NeutralCurrent,
};

pub fn dis_generator() -> SharedGenerator {
    let validity = ValidityContext::new(0.0, DIS_EMAX)
        .with_process(DIS_CC)
        .with_process(DIS_NC);
    GeneratorModule::new("DIS/Default", validity, Arc::new(DisXSec::new()))
        .with_list_generator(DisInteractionList)
        .with_visitor(DisKinematics)
        .into_shared()
}

/// Probe energy at which W = W_CUT first becomes reachable.
fn dis_threshold(nucleon_mass: f64, lepton_mass: f64) -> f64 {
    let w = W_CUT + lepton_mass;
    ((w * w - nucleon_mass * nucleon_mass) / (2.0 * nucleon_mass)).max(0.0)
}

struct DisInteractionList;

impl InteractionListGenerator for DisInteractionList {
    fn create_interaction_list(&self, init_state: &InitialState) -> Vec<Interaction> {
        [DIS_CC, DIS_NC]
            .into_iter()
            .flat_map(|process| {
                hit_nucleons(&init_state.target).into_iter().map(move |hit| {
                    Interaction::new(init_state.clone(), process).with_hit_nucleon(hit)
                })
            })
            .collect()
    }
}

struct DisXSec {
    id: AlgId,
}

impl DisXSec {
    fn new() -> Self {
        Self { id: AlgId::new("DisLinearXSec", "Default") }
    }
}

impl XSecAlgorithm for DisXSec {
    fn id(&self) -> &AlgId {
        &self.id
    }

    fn xsec(&self, interaction: &Interaction) -> f64 {
        let Some(hit) = interaction.hit_nucleon_pdg else {
            return 0.0;
        };
        let init = &interaction.init_state;
        let cc = interaction.is_cc();
        let e = interaction.probe_energy();
        if !(e <= DIS_EMAX) {
            return 0.0;
        }
        let slope = if pdg::is_neutrino(init.probe_pdg) { NU_SLOPE } else { NU_BAR_SLOPE };
        let current = if cc { 1.0 } else { NC_FRACTION };
        let e_th = dis_threshold(nucleon_mass(hit), pdg::lepton_mass(outgoing_lepton(init, cc)));
        let count = nucleon_count(&init.target, hit) as f64;

        count * slope * current * e * turn_on(e, e_th, 1.0) * XSEC_1E38_CM2
    }
}

struct DisKinematics;

impl RecordVisitor for DisKinematics {
    fn name(&self) -> &'static str {
        "DISKinematics"
    }

    fn process(&self, record: &mut EventRecord, rng: &mut EvgRng) -> anyhow::Result<()> {
        let interaction = record.interaction().clone();
        let init = &interaction.init_state;
        let hit = interaction
            .hit_nucleon_pdg
            .ok_or_else(|| anyhow::anyhow!("DIS interaction without a hit nucleon"))?;
        let cc = interaction.is_cc();
        let lepton_pdg = outgoing_lepton(init, cc);
        let m_l = pdg::lepton_mass(lepton_pdg);
        let m = nucleon_mass(hit);
        let e = init.probe_energy();

        // W^2 = M^2 + 2MEy(1 - x); draw y then x inside the W > W_CUT region.
        let reach = (W_CUT * W_CUT - m * m) / (2.0 * m * e);
        if reach >= 1.0 {
            record.mark_unphysical(format!("W > {W_CUT} unreachable at E = {e:.3}"));
            return Ok(());
        }
        let y = rng.uniform(reach, 1.0);
        let x_max = 1.0 - reach / y;
        let x = x_max * rng.next_f64().powi(2);
        let q2 = 2.0 * m * e * x * y;
        let phi = rng.azimuth();

        let Some(lepton) = scattered_lepton(&init.probe_p4, e * (1.0 - y), m_l, q2, phi) else {
            record.mark_unphysical(format!("DIS kinematics not allowed (x = {x:.3}, y = {y:.3})"));
            return Ok(());
        };
        let hit_p4 = nucleon_at_rest(hit);
        let hadrons = init.probe_p4 + hit_p4 - lepton;
        if hadrons.mass() < W_CUT {
            record.mark_unphysical(format!("W = {:.3} below DIS cut", hadrons.mass()));
            return Ok(());
        }

        let hit_idx = record.add_particle(hit, ParticleStatus::Intermediate, Some(1), hit_p4);
        record.add_particle(lepton_pdg, ParticleStatus::StableFinalState, Some(0), lepton);
        record.add_particle(HADRONIC_SYSTEM, ParticleStatus::StableFinalState, Some(hit_idx), hadrons);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{interaction::Target, kinematics::LorentzVector};

    fn cc_on_neutron(e: f64) -> Interaction {
        let init = InitialState::new(pdg::NU_MU, Target::new(26, 56))
            .with_probe_p4(LorentzVector::along_z(e));
        Interaction::new(init, DIS_CC).with_hit_nucleon(pdg::NEUTRON)
    }

    #[test]
    fn xsec_grows_linearly_at_high_energy() {
        let xsec = DisXSec::new();
        let ratio = xsec.xsec(&cc_on_neutron(100.0)) / xsec.xsec(&cc_on_neutron(50.0));
        assert!((ratio - 2.0).abs() < 1e-6);
    }

    #[test]
    fn no_dis_below_threshold_or_above_validity() {
        assert_eq!(DisXSec::new().xsec(&cc_on_neutron(1.0)), 0.0);
        assert_eq!(DisXSec::new().xsec(&cc_on_neutron(DIS_EMAX + 1.0)), 0.0);
    }

    #[test]
    fn kinematics_keep_w_above_cut() {
        let mut rng = EvgRng::new(7, 1);
        for _ in 0..50 {
            let mut record = EventRecord::new(cc_on_neutron(10.0));
            DisKinematics.process(&mut record, &mut rng).unwrap();
            if record.is_unphysical() {
                continue;
            }
            let hadrons = record.final_state().find(|p| p.pdg == HADRONIC_SYSTEM).unwrap();
            assert!(hadrons.p4.mass() >= W_CUT - 1e-9);
        }
    }

    #[test]
    fn lists_cc_and_nc_per_nucleon() {
        let init = InitialState::new(pdg::NU_MU_BAR, Target::new(8, 16));
        assert_eq!(DisInteractionList.create_interaction_list(&init).len(), 4);
    }
}
