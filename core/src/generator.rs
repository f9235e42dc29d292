//! Generator capability traits.
//!
//! RULE: The driver never knows which physics a generator implements.
//! It only uses the capabilities declared here:
//!   - a stable key
//!   - a validity context (energy domain + process set)
//!   - an optional interaction list generator
//!   - a total cross section algorithm
//!   - record processing (an ordered list of record visitors)

use crate::{
    error::{EvgError, EvgResult},
    event_record::EventRecord,
    interaction::{InitialState, Interaction, ProcessInfo},
    rng::EvgRng,
    types::{GeV, Range1D},
};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Identity of a cross section algorithm: name plus parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlgId {
    pub name:   String,
    pub config: String,
}

impl AlgId {
    pub fn new(name: impl Into<String>, config: impl Into<String>) -> Self {
        Self { name: name.into(), config: config.into() }
    }

    pub fn key(&self) -> String {
        format!("{}/{}", self.name, self.config)
    }
}

impl fmt::Display for AlgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.config)
    }
}

/// Computes the cross section (GeV^-2) of an interaction at the probe
/// energy carried by the interaction's initial state.
pub trait XSecAlgorithm: Send + Sync {
    fn id(&self) -> &AlgId;

    fn xsec(&self, interaction: &Interaction) -> f64;
}

/// Enumerates every interaction a generator can simulate for an initial state.
pub trait InteractionListGenerator: Send + Sync {
    fn create_interaction_list(&self, init_state: &InitialState) -> Vec<Interaction>;
}

/// One processing step applied to an event record.
pub trait RecordVisitor: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, record: &mut EventRecord, rng: &mut EvgRng) -> anyhow::Result<()>;
}

/// The domain a generator declares itself valid for.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidityContext {
    pub emin:      GeV,
    pub emax:      GeV,
    /// Processes this generator handles. Empty means any process.
    pub processes: Vec<ProcessInfo>,
}

impl ValidityContext {
    pub fn new(emin: GeV, emax: GeV) -> Self {
        Self { emin, emax, processes: Vec::new() }
    }

    pub fn with_process(mut self, process: ProcessInfo) -> Self {
        self.processes.push(process);
        self
    }

    pub fn energy_range(&self) -> Range1D {
        Range1D::new(self.emin, self.emax)
    }

    /// True when the interaction's process is handled and, once a probe
    /// energy is set, that energy lies inside [emin, emax].
    pub fn accepts(&self, interaction: &Interaction) -> bool {
        let process_ok =
            self.processes.is_empty() || self.processes.contains(&interaction.process);
        let e = interaction.probe_energy();
        let energy_ok = e <= 0.0 || (e >= self.emin && e <= self.emax);
        process_ok && energy_ok
    }
}

/// The contract every event generation module must fulfill.
pub trait EventGenerator: Send + Sync {
    /// Unique stable key, e.g. "QEL-CC/Default".
    fn key(&self) -> &str;

    fn validity(&self) -> &ValidityContext;

    /// `None` means the generator produces no interactions.
    fn interaction_list_generator(&self) -> Option<&dyn InteractionListGenerator>;

    fn cross_section_alg(&self) -> Arc<dyn XSecAlgorithm>;

    /// Responsibility-chain predicate.
    fn accepts(&self, interaction: &Interaction) -> bool {
        self.validity().accepts(interaction)
    }

    fn process_event_record(&self, record: &mut EventRecord, rng: &mut EvgRng) -> EvgResult<()>;
}

pub type SharedGenerator = Arc<dyn EventGenerator>;

/// A generator assembled from independent capabilities.
///
/// Visitors run in order; processing stops early once a visitor marks
/// the record unphysical.
pub struct GeneratorModule {
    key:            String,
    validity:       ValidityContext,
    list_generator: Option<Box<dyn InteractionListGenerator>>,
    xsec_alg:       Arc<dyn XSecAlgorithm>,
    visitors:       Vec<Box<dyn RecordVisitor>>,
}

impl GeneratorModule {
    pub fn new(
        key: impl Into<String>,
        validity: ValidityContext,
        xsec_alg: Arc<dyn XSecAlgorithm>,
    ) -> Self {
        Self {
            key: key.into(),
            validity,
            list_generator: None,
            xsec_alg,
            visitors: Vec::new(),
        }
    }

    pub fn with_list_generator(mut self, gen: impl InteractionListGenerator + 'static) -> Self {
        self.list_generator = Some(Box::new(gen));
        self
    }

    pub fn with_visitor(mut self, visitor: impl RecordVisitor + 'static) -> Self {
        self.visitors.push(Box::new(visitor));
        self
    }

    pub fn into_shared(self) -> SharedGenerator {
        Arc::new(self)
    }
}

impl EventGenerator for GeneratorModule {
    fn key(&self) -> &str {
        &self.key
    }

    fn validity(&self) -> &ValidityContext {
        &self.validity
    }

    fn interaction_list_generator(&self) -> Option<&dyn InteractionListGenerator> {
        self.list_generator.as_deref()
    }

    fn cross_section_alg(&self) -> Arc<dyn XSecAlgorithm> {
        Arc::clone(&self.xsec_alg)
    }

    fn process_event_record(&self, record: &mut EventRecord, rng: &mut EvgRng) -> EvgResult<()> {
        for visitor in &self.visitors {
            visitor.process(record, rng).map_err(|e| EvgError::Generation {
                generator: self.key.clone(),
                reason:    format!("{}: {e}", visitor.name()),
            })?;
            if record.is_unphysical() {
                log::debug!("{} stopped after {}: record unphysical", self.key, visitor.name());
                break;
            }
        }
        Ok(())
    }
}

// ── Closure adapters ────────────────────────────────────────────────
// Handy for small custom models and tests.

/// A cross section algorithm backed by a closure.
pub struct FnXSec<F> {
    id: AlgId,
    f:  F,
}

impl<F> FnXSec<F>
where
    F: Fn(&Interaction) -> f64 + Send + Sync,
{
    pub fn new(id: AlgId, f: F) -> Self {
        Self { id, f }
    }
}

impl<F> XSecAlgorithm for FnXSec<F>
where
    F: Fn(&Interaction) -> f64 + Send + Sync,
{
    fn id(&self) -> &AlgId {
        &self.id
    }

    fn xsec(&self, interaction: &Interaction) -> f64 {
        (self.f)(interaction)
    }
}

/// An interaction list generator backed by a closure.
pub struct FnListGenerator<F>(pub F);

impl<F> InteractionListGenerator for FnListGenerator<F>
where
    F: Fn(&InitialState) -> Vec<Interaction> + Send + Sync,
{
    fn create_interaction_list(&self, init_state: &InitialState) -> Vec<Interaction> {
        (self.0)(init_state)
    }
}

/// A record visitor backed by a closure.
pub struct FnVisitor<F> {
    name: &'static str,
    f:    F,
}

impl<F> FnVisitor<F>
where
    F: Fn(&mut EventRecord, &mut EvgRng) -> anyhow::Result<()> + Send + Sync,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> RecordVisitor for FnVisitor<F>
where
    F: Fn(&mut EventRecord, &mut EvgRng) -> anyhow::Result<()> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, record: &mut EventRecord, rng: &mut EvgRng) -> anyhow::Result<()> {
        (self.f)(record, rng)
    }
}
