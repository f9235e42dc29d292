//! Interaction → cross section algorithm map.
//!
//! Built once per configured initial state, read-only afterwards.
//! Invariant: every interaction in the map was produced by exactly one
//! generator's interaction list generator (first owner wins).

use crate::{
    error::{EvgError, EvgResult},
    generator::{SharedGenerator, XSecAlgorithm},
    interaction::{InitialState, Interaction},
    types::InteractionKey,
};
use std::{collections::HashMap, fmt, sync::Arc};

struct MapEntry {
    interaction: Interaction,
    alg:         Arc<dyn XSecAlgorithm>,
    owner:       String,
}

#[derive(Default)]
pub struct XSecAlgorithmMap {
    entries: Vec<MapEntry>,
    index:   HashMap<InteractionKey, usize>,
}

impl XSecAlgorithmMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map for `init_state` from every generator's interaction list.
    pub fn build(init_state: &InitialState, generators: &[SharedGenerator]) -> Self {
        let mut map = Self::new();
        for gen in generators {
            let Some(list_gen) = gen.interaction_list_generator() else {
                log::warn!("Generator {} has no interaction list generator - skipping", gen.key());
                continue;
            };
            let interactions = list_gen.create_interaction_list(init_state);
            if interactions.is_empty() {
                log::warn!(
                    "Generator {} produced no interactions for {} - skipping",
                    gen.key(),
                    init_state.as_key()
                );
                continue;
            }
            let alg = gen.cross_section_alg();
            for interaction in interactions {
                map.insert(interaction, Arc::clone(&alg), gen.key());
            }
        }
        log::info!(
            "Built cross section algorithm map for {}: {} interactions",
            init_state.as_key(),
            map.len()
        );
        map
    }

    fn insert(&mut self, interaction: Interaction, alg: Arc<dyn XSecAlgorithm>, owner: &str) {
        let key = interaction.as_key();
        if let Some(&existing) = self.index.get(&key) {
            log::warn!(
                "Interaction {key} already owned by {} - ignoring duplicate from {owner}",
                self.entries[existing].owner
            );
            return;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(MapEntry {
            interaction,
            alg,
            owner: owner.to_string(),
        });
    }

    /// Exact-key lookup of the algorithm for `interaction`.
    pub fn find_algorithm(&self, interaction: &Interaction) -> EvgResult<Arc<dyn XSecAlgorithm>> {
        let key = interaction.as_key();
        self.index
            .get(&key)
            .map(|&i| Arc::clone(&self.entries[i].alg))
            .ok_or(EvgError::AlgorithmNotFound { key })
    }

    /// Key of the generator that registered `interaction`.
    pub fn owner_of(&self, interaction: &Interaction) -> Option<&str> {
        self.index
            .get(&interaction.as_key())
            .map(|&i| self.entries[i].owner.as_str())
    }

    /// All registered interactions, in registration order.
    pub fn interaction_list(&self) -> impl Iterator<Item = &Interaction> {
        self.entries.iter().map(|e| &e.interaction)
    }

    /// Interactions paired with their algorithm.
    pub fn iter(&self) -> impl Iterator<Item = (&Interaction, &Arc<dyn XSecAlgorithm>)> {
        self.entries.iter().map(|e| (&e.interaction, &e.alg))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for XSecAlgorithmMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.entries {
            writeln!(f, "  {} -> {} [{}]", e.interaction.as_key(), e.alg.id(), e.owner)?;
        }
        Ok(())
    }
}
