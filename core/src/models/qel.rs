//! Quasi-elastic scattering: nu + N -> l + N'.

use super::{
    charge_transfer, hit_nucleons, nucleon_at_rest, nucleon_count, nucleon_mass, outgoing_lepton,
    scattered_lepton, turn_on, FERMI_MOMENTUM, XSEC_1E38_CM2,
};
use crate::{
    event_record::{EventRecord, ParticleStatus},
    generator::{
        AlgId, GeneratorModule, InteractionListGenerator, RecordVisitor,
        SharedGenerator, ValidityContext, XSecAlgorithm,
    },
    interaction::{CurrentType, InitialState, Interaction, ProcessInfo, ScatteringType},
    pdg::{self, NEUTRON, PROTON},
    rng::EvgRng,
    types::PdgCode,
};
use std::sync::Arc;

/// Axial mass squared shaping the Q2 distribution (GeV^2).
const AXIAL_MASS2: f64 = 1.0;
/// Upper end of the generator's validity; the cross section is zero above it.
const QEL_EMAX: f64 = 100.0;

const QEL_CC: ProcessInfo = ProcessInfo {
    scattering: ScatteringType::QuasiElastic,
    current:    CurrentType::ChargedCurrent,
};
const QEL_NC: ProcessInfo = ProcessInfo {
    scattering: ScatteringType::QuasiElastic,
    current:    CurrentType::NeutralCurrent,
};

pub fn qel_generator() -> SharedGenerator {
    let validity = ValidityContext::new(0.0, QEL_EMAX)
        .with_process(QEL_CC)
        .with_process(QEL_NC);
    GeneratorModule::new("QEL/Default", validity, Arc::new(QelXSec::new()))
        .with_list_generator(QelInteractionList)
        .with_visitor(QelKinematics)
        .with_visitor(PauliBlocker)
        .into_shared()
}

fn final_nucleon(hit: PdgCode, charge_in: i32) -> PdgCode {
    match (hit, charge_in) {
        (NEUTRON, 1) => PROTON,
        (PROTON, -1) => NEUTRON,
        (n, _) => n,
    }
}

// ── Interaction list ────────────────────────────────────────────────

struct QelInteractionList;

impl InteractionListGenerator for QelInteractionList {
    fn create_interaction_list(&self, init_state: &InitialState) -> Vec<Interaction> {
        let mut list = Vec::new();

        // CC needs a neutron for nu, a proton for nu-bar.
        let cc_hit = if pdg::is_neutrino(init_state.probe_pdg) { NEUTRON } else { PROTON };
        if nucleon_count(&init_state.target, cc_hit) > 0 {
            list.push(Interaction::new(init_state.clone(), QEL_CC).with_hit_nucleon(cc_hit));
        }
        for hit in hit_nucleons(&init_state.target) {
            list.push(Interaction::new(init_state.clone(), QEL_NC).with_hit_nucleon(hit));
        }
        list
    }
}

// ── Cross section ───────────────────────────────────────────────────

struct QelXSec {
    id: AlgId,
}

impl QelXSec {
    fn new() -> Self {
        Self { id: AlgId::new("QelSaturatingXSec", "Default") }
    }
}

impl XSecAlgorithm for QelXSec {
    fn id(&self) -> &AlgId {
        &self.id
    }

    fn xsec(&self, interaction: &Interaction) -> f64 {
        let Some(hit) = interaction.hit_nucleon_pdg else {
            return 0.0;
        };
        let init = &interaction.init_state;
        let count = nucleon_count(&init.target, hit) as f64;
        let e = interaction.probe_energy();
        if !(e <= QEL_EMAX) {
            return 0.0;
        }
        let plateau = if pdg::is_neutrino(init.probe_pdg) { 1.0 } else { 0.8 };

        let (per_nucleon, e_th) = if interaction.is_cc() {
            let m_i = nucleon_mass(hit);
            let m_f = nucleon_mass(final_nucleon(hit, charge_transfer(init.probe_pdg, true)));
            let m_l = pdg::lepton_mass(outgoing_lepton(init, true));
            let e_th = (((m_l + m_f).powi(2) - m_i * m_i) / (2.0 * m_i)).max(0.0);
            (plateau, e_th)
        } else {
            (0.4 * plateau, 0.0)
        };

        count * per_nucleon * turn_on(e, e_th, 0.6) * XSEC_1E38_CM2
    }
}

// ── Record processing ───────────────────────────────────────────────

struct QelKinematics;

impl RecordVisitor for QelKinematics {
    fn name(&self) -> &'static str {
        "QELKinematics"
    }

    fn process(&self, record: &mut EventRecord, rng: &mut EvgRng) -> anyhow::Result<()> {
        let interaction = record.interaction().clone();
        let init = &interaction.init_state;
        let hit = interaction
            .hit_nucleon_pdg
            .ok_or_else(|| anyhow::anyhow!("QEL interaction without a hit nucleon"))?;
        let cc = interaction.is_cc();
        let out_nucleon = final_nucleon(hit, charge_transfer(init.probe_pdg, cc));
        let lepton_pdg = outgoing_lepton(init, cc);
        let m_l = pdg::lepton_mass(lepton_pdg);
        let m_i = nucleon_mass(hit);
        let m_f = nucleon_mass(out_nucleon);
        let e = init.probe_energy();

        // Exponential Q2 falloff up to the massless elastic limit.
        let q2_max = 4.0 * e * e * m_i / (m_i + 2.0 * e);
        let q2 = rng.truncated_exp(AXIAL_MASS2, q2_max);
        let e_l = e - (q2 + m_f * m_f - m_i * m_i) / (2.0 * m_i);
        let phi = rng.azimuth();

        let Some(lepton) = scattered_lepton(&init.probe_p4, e_l, m_l, q2, phi) else {
            record.mark_unphysical(format!("QEL kinematics not allowed (Q2 = {q2:.3})"));
            return Ok(());
        };

        let hit_p4 = nucleon_at_rest(hit);
        let hit_idx = record.add_particle(hit, ParticleStatus::Intermediate, Some(1), hit_p4);
        record.add_particle(lepton_pdg, ParticleStatus::StableFinalState, Some(0), lepton);
        let recoil = init.probe_p4 + hit_p4 - lepton;
        record.add_particle(out_nucleon, ParticleStatus::StableFinalState, Some(hit_idx), recoil);
        Ok(())
    }
}

/// Blocks events whose recoil nucleon lands inside the Fermi sea. The
/// local Fermi momentum is drawn uniformly from the sphere, so the
/// blocking probability is `1 - (p / FERMI_MOMENTUM)^3` below the surface.
struct PauliBlocker;

impl RecordVisitor for PauliBlocker {
    fn name(&self) -> &'static str {
        "PauliBlocker"
    }

    fn process(&self, record: &mut EventRecord, rng: &mut EvgRng) -> anyhow::Result<()> {
        if record.interaction().init_state.target.is_free_nucleon() {
            return Ok(());
        }
        let Some(recoil) = record.final_state().filter(|p| pdg::is_nucleon(p.pdg)).last() else {
            return Ok(());
        };
        let p = recoil.p4.p();
        let k_f = FERMI_MOMENTUM * rng.next_f64().cbrt();
        if p < k_f {
            record.mark_unphysical(format!("Pauli blocked (p = {p:.3} GeV)"));
        }
        Ok(())
    }
}
