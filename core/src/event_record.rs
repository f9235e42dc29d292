//! The event record: one simulated event in progress.
//!
//! RULE: A record is owned by exactly one party at a time.
//! The selector creates it, the driver hands it to one generator,
//! and on success it is moved out to the caller. Records from
//! unphysical attempts are dropped by the driver, never returned.

use crate::{
    interaction::Interaction,
    kinematics::LorentzVector,
    pdg,
    types::PdgCode,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleStatus {
    InitialState,
    Intermediate,
    StableFinalState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pdg:    PdgCode,
    pub status: ParticleStatus,
    pub mother: Option<usize>,
    pub p4:     LorentzVector,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    interaction: Interaction,
    particles:   Vec<Particle>,
    /// Cross section of the selected interaction at the probe energy.
    xsec:        f64,
    weight:      f64,
    unphysical:  Option<String>,
}

impl EventRecord {
    /// Bootstrap a record: the probe and the target enter as initial-state
    /// entries 0 and 1.
    pub fn new(interaction: Interaction) -> Self {
        let init = &interaction.init_state;
        let target_mass = init.target.a as f64 * pdg::NUCLEON_MASS;
        let particles = vec![
            Particle {
                pdg:    init.probe_pdg,
                status: ParticleStatus::InitialState,
                mother: None,
                p4:     init.probe_p4,
            },
            Particle {
                pdg:    init.target.pdg_code(),
                status: ParticleStatus::InitialState,
                mother: None,
                p4:     LorentzVector::new(0.0, 0.0, 0.0, target_mass),
            },
        ];
        Self {
            interaction,
            particles,
            xsec: 0.0,
            weight: 1.0,
            unphysical: None,
        }
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn interaction_mut(&mut self) -> &mut Interaction {
        &mut self.interaction
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Append a particle and return its position in the record.
    pub fn add_particle(
        &mut self,
        pdg: PdgCode,
        status: ParticleStatus,
        mother: Option<usize>,
        p4: LorentzVector,
    ) -> usize {
        self.particles.push(Particle { pdg, status, mother, p4 });
        self.particles.len() - 1
    }

    pub fn final_state(&self) -> impl Iterator<Item = &Particle> {
        self.particles
            .iter()
            .filter(|p| p.status == ParticleStatus::StableFinalState)
    }

    pub fn xsec(&self) -> f64 {
        self.xsec
    }

    pub fn set_xsec(&mut self, xsec: f64) {
        self.xsec = xsec;
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub fn is_unphysical(&self) -> bool {
        self.unphysical.is_some()
    }

    pub fn unphysical_reason(&self) -> Option<&str> {
        self.unphysical.as_deref()
    }

    /// Flag the event as unphysical (e.g. Pauli blocked).
    pub fn mark_unphysical(&mut self, reason: impl Into<String>) {
        self.unphysical = Some(reason.into());
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Interaction: {}", self.interaction)?;
        writeln!(f, "E = {:.4} GeV, xsec = {:.4e} GeV^-2", self.interaction.probe_energy(), self.xsec)?;
        for (i, p) in self.particles.iter().enumerate() {
            writeln!(
                f,
                "  {i:>3} {:<12} {:?} mother={:?} E={:.4}",
                pdg::name(p.pdg),
                p.status,
                p.mother,
                p.p4.e
            )?;
        }
        if let Some(reason) = &self.unphysical {
            writeln!(f, "  ** unphysical: {reason}")?;
        }
        Ok(())
    }
}
