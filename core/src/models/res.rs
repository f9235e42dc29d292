//! Baryon resonance production: nu + N -> l + R, R -> N + pi.

use super::{
    charge_transfer, hit_nucleons, nucleon_at_rest, nucleon_charge, nucleon_count, nucleon_mass,
    outgoing_lepton, scattered_lepton, two_body_decay, XSEC_1E38_CM2,
};
use crate::{
    event_record::{EventRecord, ParticleStatus},
    generator::{
        AlgId, GeneratorModule, InteractionListGenerator, RecordVisitor, SharedGenerator,
        ValidityContext, XSecAlgorithm,
    },
    interaction::{CurrentType, InitialState, Interaction, ProcessInfo, ScatteringType},
    pdg::{self, HADRONIC_SYSTEM, NEUTRON, PION_MASS, PI_MINUS, PI_PLUS, PI_ZERO, PROTON},
    resonance::{BaryonResTable, BreitWigner, BreitWignerL, Resonance},
    rng::EvgRng,
    types::PdgCode,
};
use std::sync::Arc;

const W_INTEGRATION_STEPS: usize = 200;
const MAX_W_TRIES: usize = 1000;
/// Q2 scale of the resonance form factor (GeV^2).
const RES_Q2_SCALE: f64 = 0.8;
/// Upper end of the generator's validity; the cross section is zero above it.
const RES_EMAX: f64 = 100.0;

const RES_CC: ProcessInfo = ProcessInfo {
    scattering: ScatteringType::Resonant,
    current:    CurrentType::ChargedCurrent,
};
const RES_NC: ProcessInfo = ProcessInfo {
    scattering: ScatteringType::Resonant,
    current:    CurrentType::NeutralCurrent,
};

pub fn res_generator() -> SharedGenerator {
    let shape = Arc::new(ResShape::pdg());
    let validity = ValidityContext::new(0.0, RES_EMAX)
        .with_process(RES_CC)
        .with_process(RES_NC);
    GeneratorModule::new(
        "RES/Default",
        validity,
        Arc::new(ResXSec::new(Arc::clone(&shape))),
    )
    .with_list_generator(ResInteractionList { table: BaryonResTable::pdg() })
    .with_visitor(ResKinematics { shape })
    .into_shared()
}

/// Resonance table plus the line shape drawn from it.
struct ResShape {
    table: BaryonResTable,
    bw:    Box<dyn BreitWigner>,
}

impl ResShape {
    fn pdg() -> Self {
        let table = BaryonResTable::pdg();
        let bw = Box::new(BreitWignerL::new(table.clone()));
        Self { table, bw }
    }

    /// Reachable W window for a probe of energy `e` on `hit`, if open.
    fn w_range(&self, e: f64, hit: PdgCode, m_l: f64) -> Option<(f64, f64)> {
        let m = nucleon_mass(hit);
        let w_min = m + PION_MASS;
        let w_max = (m * m + 2.0 * m * e).sqrt() - m_l;
        (w_max > w_min).then_some((w_min, w_max))
    }

    fn integral(&self, res: Resonance, w_min: f64, w_max: f64) -> f64 {
        let dw = (w_max - w_min) / W_INTEGRATION_STEPS as f64;
        let mut sum = 0.5 * (self.bw.eval(res, w_min) + self.bw.eval(res, w_max));
        for i in 1..W_INTEGRATION_STEPS {
            sum += self.bw.eval(res, w_min + i as f64 * dw);
        }
        sum * dw
    }
}

/// Charge of the N-pi system after the lepton current acts on `hit`.
fn hadronic_charge(probe: PdgCode, hit: PdgCode, cc: bool) -> i32 {
    nucleon_charge(hit) + charge_transfer(probe, cc)
}

/// Isospin 1/2 resonances only come in charges 0 and +1.
fn charge_allowed(table: &BaryonResTable, res: Resonance, charge: i32) -> bool {
    if table.is_delta_resonance(res) {
        (-1..=2).contains(&charge)
    } else {
        (0..=1).contains(&charge)
    }
}

// ── Interaction list ────────────────────────────────────────────────

struct ResInteractionList {
    table: BaryonResTable,
}

impl InteractionListGenerator for ResInteractionList {
    fn create_interaction_list(&self, init_state: &InitialState) -> Vec<Interaction> {
        let mut list = Vec::new();
        for process in [RES_CC, RES_NC] {
            let cc = process.current == CurrentType::ChargedCurrent;
            for hit in hit_nucleons(&init_state.target) {
                let charge = hadronic_charge(init_state.probe_pdg, hit, cc);
                for res in Resonance::ALL {
                    if !charge_allowed(&self.table, res, charge) {
                        continue;
                    }
                    list.push(
                        Interaction::new(init_state.clone(), process)
                            .with_hit_nucleon(hit)
                            .with_resonance(res),
                    );
                }
            }
        }
        list
    }
}

// ── Cross section ───────────────────────────────────────────────────

struct ResXSec {
    id:    AlgId,
    shape: Arc<ResShape>,
}

impl ResXSec {
    fn new(shape: Arc<ResShape>) -> Self {
        Self { id: AlgId::new("ResBreitWignerXSec", "Default"), shape }
    }
}

impl XSecAlgorithm for ResXSec {
    fn id(&self) -> &AlgId {
        &self.id
    }

    fn xsec(&self, interaction: &Interaction) -> f64 {
        let (Some(hit), Some(res)) = (interaction.hit_nucleon_pdg, interaction.resonance) else {
            return 0.0;
        };
        let e = interaction.probe_energy();
        if !(e <= RES_EMAX) {
            return 0.0;
        }
        let init = &interaction.init_state;
        let cc = interaction.is_cc();
        let m_l = pdg::lepton_mass(outgoing_lepton(init, cc));
        let Some((w_min, w_max)) = self.shape.w_range(e, hit, m_l) else {
            return 0.0;
        };

        let strength = if res == Resonance::P33_1232 { 1.0 } else { 0.3 };
        let plateau = if pdg::is_neutrino(init.probe_pdg) { 1.0 } else { 0.7 };
        let current = if cc { 1.0 } else { 0.3 };
        let count = nucleon_count(&init.target, hit) as f64;

        count
            * plateau
            * current
            * strength
            * self.shape.integral(res, w_min, w_max)
            * XSEC_1E38_CM2
    }
}

// ── Record processing ───────────────────────────────────────────────

struct ResKinematics {
    shape: Arc<ResShape>,
}

impl ResKinematics {
    /// Accept-reject W from the line shape inside the open window.
    fn sample_w(&self, res: Resonance, w_min: f64, w_max: f64, rng: &mut EvgRng) -> Option<f64> {
        let bw = &self.shape.bw;
        let peak = (0..=100)
            .map(|i| bw.eval(res, w_min + (w_max - w_min) * i as f64 / 100.0))
            .fold(0.0_f64, f64::max);
        if peak <= 0.0 {
            return None;
        }
        let envelope = 1.2 * peak;
        (0..MAX_W_TRIES).find_map(|_| {
            let w = rng.uniform(w_min, w_max);
            (rng.next_f64() * envelope < bw.eval(res, w)).then_some(w)
        })
    }

    /// Nucleon and pion for an N-pi final state of the given charge.
    fn decay_channel(&self, res: Resonance, charge: i32, rng: &mut EvgRng) -> (PdgCode, PdgCode) {
        let delta = self.shape.table.is_delta_resonance(res);
        // Isospin Clebsch-Gordan weights: 2/3 to the first channel.
        let first = rng.chance(2.0 / 3.0);
        match charge {
            2 => (PROTON, PI_PLUS),
            1 if delta == first => (PROTON, PI_ZERO),
            1 => (NEUTRON, PI_PLUS),
            0 if delta == first => (NEUTRON, PI_ZERO),
            0 => (PROTON, PI_MINUS),
            _ => (NEUTRON, PI_MINUS),
        }
    }
}

impl RecordVisitor for ResKinematics {
    fn name(&self) -> &'static str {
        "RESKinematics"
    }

    fn process(&self, record: &mut EventRecord, rng: &mut EvgRng) -> anyhow::Result<()> {
        let interaction = record.interaction().clone();
        let init = &interaction.init_state;
        let (Some(hit), Some(res)) = (interaction.hit_nucleon_pdg, interaction.resonance) else {
            anyhow::bail!("RES interaction needs a hit nucleon and a resonance");
        };
        let cc = interaction.is_cc();
        let lepton_pdg = outgoing_lepton(init, cc);
        let m_l = pdg::lepton_mass(lepton_pdg);
        let m = nucleon_mass(hit);
        let e = init.probe_energy();

        let Some((w_min, w_max)) = self.shape.w_range(e, hit, m_l) else {
            record.mark_unphysical("W window closed");
            return Ok(());
        };
        let Some(w) = self.sample_w(res, w_min, w_max, rng) else {
            record.mark_unphysical(format!("could not sample W for {}", res.name()));
            return Ok(());
        };

        let q2_max = (2.0 * m * e - (w * w - m * m)).max(0.0);
        let q2 = rng.truncated_exp(RES_Q2_SCALE, q2_max);
        let nu = (w * w + q2 - m * m) / (2.0 * m);
        let phi = rng.azimuth();

        let Some(lepton) = scattered_lepton(&init.probe_p4, e - nu, m_l, q2, phi) else {
            record.mark_unphysical(format!("RES kinematics not allowed (W = {w:.3}, Q2 = {q2:.3})"));
            return Ok(());
        };

        let hit_p4 = nucleon_at_rest(hit);
        let hit_idx = record.add_particle(hit, ParticleStatus::Intermediate, Some(1), hit_p4);
        record.add_particle(lepton_pdg, ParticleStatus::StableFinalState, Some(0), lepton);
        let hadrons = init.probe_p4 + hit_p4 - lepton;
        let charge = hadronic_charge(init.probe_pdg, hit, cc);
        let res_pdg = res.pdg_code(charge).unwrap_or(HADRONIC_SYSTEM);
        let res_idx = record.add_particle(res_pdg, ParticleStatus::Intermediate, Some(hit_idx), hadrons);

        let (nucleon, pion) = self.decay_channel(res, charge, rng);
        let (u_cos, u_phi) = (rng.next_f64(), rng.next_f64());
        let Some((p_n, p_pi)) =
            two_body_decay(&hadrons, nucleon_mass(nucleon), PION_MASS, u_cos, u_phi)
        else {
            record.mark_unphysical("resonance below N-pi threshold");
            return Ok(());
        };
        record.add_particle(nucleon, ParticleStatus::StableFinalState, Some(res_idx), p_n);
        record.add_particle(pion, ParticleStatus::StableFinalState, Some(res_idx), p_pi);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{interaction::Target, kinematics::LorentzVector};

    #[test]
    fn nu_p_cc_only_produces_deltas() {
        let init = InitialState::new(pdg::NU_MU, Target::new(1, 1));
        let list = ResInteractionList { table: BaryonResTable::pdg() }.create_interaction_list(&init);
        let cc: Vec<_> = list.iter().filter(|i| i.is_cc()).collect();
        assert_eq!(cc.len(), 2);
        assert!(cc.iter().all(|i| {
            matches!(i.resonance, Some(Resonance::P33_1232) | Some(Resonance::D33_1700))
        }));
    }

    #[test]
    fn xsec_rises_with_energy_and_vanishes_below_threshold() {
        let xsec = ResXSec::new(Arc::new(ResShape::pdg()));
        let at = |e: f64| {
            let init = InitialState::new(pdg::NU_MU, Target::new(26, 56))
                .with_probe_p4(LorentzVector::along_z(e));
            xsec.xsec(
                &Interaction::new(init, RES_CC)
                    .with_hit_nucleon(NEUTRON)
                    .with_resonance(Resonance::P33_1232),
            )
        };
        assert_eq!(at(0.2), 0.0);
        assert!(at(1.0) > 0.0);
        assert!(at(3.0) > at(1.0));
        assert_eq!(at(RES_EMAX + 1.0), 0.0);
    }

    #[test]
    fn intermediate_resonance_carries_its_pdg_code() {
        let kin = ResKinematics { shape: Arc::new(ResShape::pdg()) };
        let init = InitialState::new(pdg::NU_MU, Target::new(1, 1))
            .with_probe_p4(LorentzVector::along_z(2.0));
        let interaction = Interaction::new(init, RES_CC)
            .with_hit_nucleon(PROTON)
            .with_resonance(Resonance::P33_1232);
        let mut rng = EvgRng::new(11, 2);
        let mut seen = 0;
        for _ in 0..20 {
            let mut record = EventRecord::new(interaction.clone());
            kin.process(&mut record, &mut rng).unwrap();
            if record.is_unphysical() {
                continue;
            }
            let res = record
                .particles()
                .iter()
                .find(|p| p.status == ParticleStatus::Intermediate && p.pdg != PROTON)
                .unwrap();
            assert_eq!(res.pdg, 2224);
            seen += 1;
        }
        assert!(seen > 0);
    }

    #[test]
    fn decay_channel_for_doubly_charged_delta() {
        let kin = ResKinematics { shape: Arc::new(ResShape::pdg()) };
        let mut rng = EvgRng::new(1, 0);
        for _ in 0..10 {
            assert_eq!(kin.decay_channel(Resonance::P33_1232, 2, &mut rng), (PROTON, PI_PLUS));
        }
    }
}
