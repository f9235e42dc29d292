//! The event generation driver.
//!
//! CONFIGURATION ORDER (fixed, never reordered):
//!   1. Initial state      (validated: probe must be a (anti)neutrino)
//!   2. Generator list     (resolved by name through the catalog)
//!   3. Xsec algorithm map (every interaction each generator can make)
//!   4. Responsibility chain
//!   5. Interaction selector
//!
//! RULES:
//!   - configure() replaces all of the above wholesale.
//!   - generate_event() retries unphysical events in a loop with a
//!     per-call attempt counter; it never recurses.
//!   - A record leaves the driver only by being returned; records from
//!     failed attempts are dropped before the next attempt.
//!   - All randomness flows through the RngBank.

use crate::{
    chain::ResponsibilityChain,
    config::{DriverConfig, MIN_SPLINE_ENERGY},
    error::{EvgError, EvgResult},
    event_record::EventRecord,
    generator::SharedGenerator,
    generator_list::{GeneratorCatalog, GeneratorList},
    interaction::{InitialState, Target},
    kinematics::LorentzVector,
    pdg,
    rng::{EvgRng, RngBank, StreamSlot},
    selector::{InteractionSelector, XSecSource},
    spline::{check_tabulation_args, knot_energies, Spline},
    spline_cache::SplineCache,
    types::{PdgCode, Range1D},
    xsec_map::XSecAlgorithmMap,
};
use std::{fmt, sync::Arc};

/// Attempts allowed per generate_event() call before giving up on
/// producing a physical event.
pub const RECURSIVE_MODE_MAX_DEPTH: u32 = 100;

/// Everything built by configure(), replaced as a unit.
struct Configured {
    init_state: InitialState,
    generators: GeneratorList,
    xsec_map:   XSecAlgorithmMap,
    chain:      ResponsibilityChain,
    selector:   InteractionSelector,
}

pub struct EvgDriver {
    config:          DriverConfig,
    catalog:         Arc<GeneratorCatalog>,
    splines:         Arc<SplineCache>,
    rng_bank:        RngBank,
    selection_rng:   EvgRng,
    processing_rng:  EvgRng,
    configured:      Option<Configured>,
    use_splines:     bool,
    filter_unphysical: bool,
    xsec_sum_spline: Option<Spline>,
}

impl EvgDriver {
    pub fn new(config: DriverConfig, catalog: Arc<GeneratorCatalog>, splines: Arc<SplineCache>) -> Self {
        let rng_bank = RngBank::new(config.seed);
        Self {
            selection_rng:  rng_bank.for_stream(StreamSlot::InteractionSelection),
            processing_rng: rng_bank.for_stream(StreamSlot::RecordProcessing),
            rng_bank,
            filter_unphysical: config.filter_unphysical,
            config,
            catalog,
            splines,
            configured: None,
            use_splines: false,
            xsec_sum_spline: None,
        }
    }

    /// Driver over the standard catalog with its own spline cache.
    pub fn standalone(config: DriverConfig) -> Self {
        Self::new(config, Arc::new(GeneratorCatalog::standard()), SplineCache::shared())
    }

    // ── Configuration ──────────────────────────────────────────

    pub fn configure_pdg(&mut self, probe_pdg: PdgCode, z: u32, a: u32) -> EvgResult<()> {
        self.configure(InitialState::new(probe_pdg, Target::new(z, a)))
    }

    pub fn configure(&mut self, init_state: InitialState) -> EvgResult<()> {
        // Full replace: nothing from a previous configuration survives,
        // including on failure below.
        self.configured = None;
        self.use_splines = false;
        self.xsec_sum_spline = None;

        if !init_state.is_valid() {
            return Err(EvgError::InvalidInitialState { probe_pdg: init_state.probe_pdg });
        }
        let target = init_state.target;
        if !target.is_valid() {
            return Err(EvgError::InvalidTarget { z: target.z, a: target.a });
        }
        log::info!("Configuring driver for {}", init_state.as_key());

        let list_name = self.config.resolved_list_name();
        let generators = self.catalog.assemble(Some(&list_name))?;

        log::info!("Building the cross section algorithm map");
        let xsec_map = XSecAlgorithmMap::build(&init_state, &generators);
        log::debug!("\n{xsec_map}");

        log::info!("Building the generator responsibility chain");
        let chain = ResponsibilityChain::new(&generators);

        log::info!("Building the interaction selector");
        let selector = InteractionSelector::new();

        self.configured = Some(Configured {
            init_state,
            generators,
            xsec_map,
            chain,
            selector,
        });
        Ok(())
    }

    fn configured(&self) -> EvgResult<&Configured> {
        self.configured.as_ref().ok_or(EvgError::NotConfigured)
    }

    pub fn is_configured(&self) -> bool {
        self.configured.is_some()
    }

    pub fn init_state(&self) -> EvgResult<&InitialState> {
        Ok(&self.configured()?.init_state)
    }

    pub fn generators(&self) -> EvgResult<&GeneratorList> {
        Ok(&self.configured()?.generators)
    }

    pub fn xsec_map(&self) -> EvgResult<&XSecAlgorithmMap> {
        Ok(&self.configured()?.xsec_map)
    }

    pub fn spline_cache(&self) -> &Arc<SplineCache> {
        &self.splines
    }

    pub fn seed(&self) -> u64 {
        self.rng_bank.master_seed()
    }

    pub fn set_filter_unphysical(&mut self, on: bool) {
        log::info!("Filtering unphysical events is turned {}", on_off(on));
        self.filter_unphysical = on;
    }

    pub fn filters_unphysical(&self) -> bool {
        self.filter_unphysical
    }

    pub fn splines_enabled(&self) -> bool {
        self.use_splines
    }

    /// Multi-line status block, the same text as `Display`.
    pub fn summary(&self) -> String {
        self.to_string()
    }

    // ── Event generation ───────────────────────────────────────

    /// Generate one event for a probe with 4-momentum `probe_p4`.
    /// On success the caller owns the returned record.
    pub fn generate_event(&mut self, probe_p4: LorentzVector) -> EvgResult<EventRecord> {
        let cfg = self.configured.as_ref().ok_or(EvgError::NotConfigured)?;
        let source = XSecSource::new(&self.splines, self.use_splines);

        let mut attempts: u32 = 0;
        loop {
            log::debug!("Selecting an interaction and bootstrapping the event record");
            let mut record = cfg.selector.select_interaction(
                &cfg.xsec_map,
                probe_p4,
                source,
                &mut self.selection_rng,
            )?;

            let evgen = cfg.chain.find_generator(record.interaction())?;
            log::debug!("Generating event with {}", evgen.key());
            evgen.process_event_record(&mut record, &mut self.processing_rng)?;

            if !self.filter_unphysical || !record.is_unphysical() {
                return Ok(record);
            }

            attempts += 1;
            log::warn!(
                "Generated an unphysical event ({}) [attempt {attempts}]",
                record.unphysical_reason().unwrap_or("no reason given")
            );
            drop(record);

            if attempts >= RECURSIVE_MODE_MAX_DEPTH {
                log::error!("Could not produce a physical event after {attempts} attempts");
                return Err(EvgError::UnphysicalRetryExhausted { attempts });
            }
            log::warn!("Attempting to regenerate the event");
        }
    }

    // ── Cross sections ─────────────────────────────────────────

    /// Sum of the cross sections of every interaction in the map at the
    /// energy of `probe_p4`.
    pub fn xsec_sum(&self, probe_p4: LorentzVector) -> EvgResult<f64> {
        let cfg = self.configured()?;
        let source = XSecSource::new(&self.splines, self.use_splines);

        let mut sum = 0.0;
        for (interaction, alg) in cfg.xsec_map.iter() {
            let mut candidate = interaction.clone();
            candidate.init_state.set_probe_p4(probe_p4);
            let xsec = source.xsec(alg.as_ref(), &candidate);
            log::debug!(
                "xsec {} ({}) = {xsec:.6e}",
                candidate.as_key(),
                if source.uses_splines() { "interpolated" } else { "computed" }
            );
            sum += xsec;
        }

        log::info!(
            "SumXSec({}+{}->X, E = {} GeV) = {sum:.6e}",
            pdg::name(cfg.init_state.probe_pdg),
            cfg.init_state.target.pdg_code(),
            probe_p4.energy()
        );
        Ok(sum)
    }

    /// Switch to spline evaluation, but only if every interaction in the
    /// map has a spline loaded. Returns whether splines are now in use.
    pub fn use_splines(&mut self) -> EvgResult<bool> {
        let cfg = self.configured.as_ref().ok_or(EvgError::NotConfigured)?;
        let missing = cfg
            .xsec_map
            .iter()
            .find(|(interaction, alg)| !self.splines.exists(alg.id(), interaction));

        self.use_splines = match missing {
            Some((interaction, _)) => {
                log::warn!(
                    "No spline for {} - reverting back to not using splines",
                    interaction.as_key()
                );
                false
            }
            None => true,
        };
        Ok(self.use_splines)
    }

    /// Tabulate every missing spline this driver needs, then switch to
    /// spline evaluation. Returns the number of splines created.
    pub fn create_splines(&mut self, use_log_e: bool) -> EvgResult<usize> {
        let cfg = self.configured.as_ref().ok_or(EvgError::NotConfigured)?;
        log::info!("Creating missing xsec splines with log E {}", on_off(use_log_e));

        let mut created = 0;
        for evgen in cfg.generators.iter() {
            let Some(list_gen) = evgen.interaction_list_generator() else {
                continue;
            };
            log::info!("Querying [{}] for its interaction list", evgen.key());
            let interactions = list_gen.create_interaction_list(&cfg.init_state);
            let alg = evgen.cross_section_alg();
            let emin = evgen.validity().emin.max(MIN_SPLINE_ENERGY);
            let emax = evgen.validity().emax;

            for interaction in &interactions {
                if self.splines.exists(alg.id(), interaction) {
                    log::debug!("Spline for {} is already loaded - skipping", interaction.as_key());
                    continue;
                }
                if self.splines.create(
                    alg.as_ref(),
                    interaction,
                    self.config.spline_knots,
                    emin,
                    emax,
                    use_log_e,
                )? {
                    created += 1;
                }
            }
        }
        log::debug!("{}", self.splines);

        self.use_splines = true;
        Ok(created)
    }

    /// The union of all generators' declared energy ranges.
    pub fn valid_energy_range(&self) -> EvgResult<Range1D> {
        energy_range_of(&self.configured()?.generators)
    }

    /// Tabulate the total cross section for the configured initial state.
    /// Requires splines to be in use.
    pub fn create_xsec_sum_spline(
        &mut self,
        knots: usize,
        emin: f64,
        emax: f64,
        use_log_e: bool,
    ) -> EvgResult<&Spline> {
        self.configured()?;
        if !self.use_splines {
            log::error!("You haven't loaded any splines!");
            return Err(EvgError::SplinesNotLoaded);
        }
        check_tabulation_args(knots, emin, emax)?;
        log::info!(
            "Creating spline (sum-xsec = f({})) in E = [{emin}, {emax}] using {knots} knots",
            if use_log_e { "log E" } else { "E" }
        );

        let energies = knot_energies(knots, emin, emax, use_log_e);
        let sums = energies
            .iter()
            .map(|&e| self.xsec_sum(LorentzVector::along_z(e)))
            .collect::<EvgResult<Vec<f64>>>()?;

        let spline = Spline::from_knots(energies, sums, use_log_e)?;
        Ok(self.xsec_sum_spline.insert(spline))
    }

    pub fn xsec_sum_spline(&self) -> Option<&Spline> {
        self.xsec_sum_spline.as_ref()
    }
}

/// Union (min of mins, max of maxes) of the generators' validity ranges,
/// with each Emin floored at `MIN_SPLINE_ENERGY`.
pub fn energy_range_of(generators: &[SharedGenerator]) -> EvgResult<Range1D> {
    let mut range = Range1D::new(9999.0, -9999.0);
    for evgen in generators {
        let v = evgen.validity();
        range.min = range.min.min(v.emin.max(MIN_SPLINE_ENERGY));
        range.max = range.max.max(v.emax);
    }
    if !(range.min < range.max) || range.min < 0.0 {
        return Err(EvgError::EmptyEnergyRange { min: range.min, max: range.max });
    }
    Ok(range)
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

impl fmt::Display for EvgDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*********************** EvgDriver ***********************")?;
        match &self.configured {
            Some(cfg) => {
                writeln!(f, "  |---o Probe PDG code ..........: {}", cfg.init_state.probe_pdg)?;
                writeln!(f, "  |---o Target PDG code .........: {}", cfg.init_state.target.pdg_code())?;
                writeln!(f, "  |---o Generator list ..........: {}", cfg.generators.name())?;
                writeln!(f, "  |---o Interactions ............: {}", cfg.xsec_map.len())?;
            }
            None => writeln!(f, "  |---o (not configured)")?,
        }
        writeln!(f, "  |---o Using cross section splines is turned {}", on_off(self.use_splines))?;
        writeln!(f, "  |---o Filtering unphysical events is turned {}", on_off(self.filter_unphysical))?;
        write!(f, "*********************************************************")
    }
}
