//! Cross section spline cache.
//!
//! RULE: There is no global cache. One `SplineCache` is created per
//! process (or per test) and shared by `Arc` with every driver that
//! should see it.
//!
//! Entries are keyed by (algorithm id, canonical interaction key) and
//! are never evicted. Each entry is a complete `Arc<Spline>` inserted
//! under the write lock, so a reader sees either the whole table or
//! nothing. Tabulation itself runs without holding the lock.

use crate::{
    error::{EvgError, EvgResult},
    generator::{AlgId, XSecAlgorithm},
    interaction::Interaction,
    kinematics::LorentzVector,
    spline::{check_tabulation_args, Spline},
    types::InteractionKey,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SplineKey {
    pub alg:         AlgId,
    pub interaction: InteractionKey,
}

impl SplineKey {
    pub fn new(alg: &AlgId, interaction: &Interaction) -> Self {
        Self {
            alg:         alg.clone(),
            interaction: interaction.as_key(),
        }
    }
}

impl fmt::Display for SplineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.alg, self.interaction)
    }
}

#[derive(Default)]
pub struct SplineCache {
    splines: RwLock<HashMap<SplineKey, Arc<Spline>>>,
}

impl SplineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    // A poisoned lock still guards a consistent map: every write is a
    // single insert of a finished spline.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<SplineKey, Arc<Spline>>> {
        self.splines.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<SplineKey, Arc<Spline>>> {
        self.splines.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn exists(&self, alg: &AlgId, interaction: &Interaction) -> bool {
        self.read().contains_key(&SplineKey::new(alg, interaction))
    }

    pub fn get(&self, alg: &AlgId, interaction: &Interaction) -> Option<Arc<Spline>> {
        self.read().get(&SplineKey::new(alg, interaction)).cloned()
    }

    /// Interpolated cross section at `energy`.
    pub fn evaluate(&self, alg: &AlgId, interaction: &Interaction, energy: f64) -> EvgResult<f64> {
        self.get(alg, interaction)
            .map(|spl| spl.evaluate(energy))
            .ok_or_else(|| EvgError::SplineNotFound {
                alg: alg.key(),
                key: interaction.as_key(),
            })
    }

    /// Tabulate `alg` for `interaction` and store it.
    ///
    /// Returns `Ok(false)` without touching the cache when a spline for
    /// this key is already loaded.
    pub fn create(
        &self,
        alg: &dyn XSecAlgorithm,
        interaction: &Interaction,
        knots: usize,
        emin: f64,
        emax: f64,
        log_e: bool,
    ) -> EvgResult<bool> {
        check_tabulation_args(knots, emin, emax)?;

        let key = SplineKey::new(alg.id(), interaction);
        if self.read().contains_key(&key) {
            log::debug!("Spline {key} is already loaded - skipping");
            return Ok(false);
        }

        log::debug!(
            "Tabulating {key}: {knots} knots in E = [{emin}, {emax}]{}",
            if log_e { " (log E)" } else { "" }
        );
        let spline = Spline::tabulate(knots, emin, emax, log_e, |e| {
            let mut probe = interaction.clone();
            probe.init_state.set_probe_p4(LorentzVector::along_z(e));
            alg.xsec(&probe)
        })?;

        Ok(self.insert(key, spline))
    }

    /// Insert a finished spline unless the key is already present.
    pub fn insert(&self, key: SplineKey, spline: Spline) -> bool {
        use std::collections::hash_map::Entry;
        match self.write().entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(spline));
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All entries, sorted by key.
    pub fn snapshot(&self) -> Vec<(SplineKey, Arc<Spline>)> {
        let mut entries: Vec<_> = self
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl fmt::Display for SplineCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.snapshot();
        writeln!(f, "SplineCache: {} splines", entries.len())?;
        for (key, spl) in entries {
            writeln!(
                f,
                "  {key}: {} knots in [{}, {}]",
                spl.n_knots(),
                spl.x_min(),
                spl.x_max()
            )?;
        }
        Ok(())
    }
}
