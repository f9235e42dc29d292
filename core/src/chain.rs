//! Responsibility chain: which generator simulates a given interaction.
//!
//! Linear scan in registration order; the first generator whose
//! `accepts` predicate holds wins. No match is a configuration defect
//! and is reported as a fatal error, never retried.

use crate::{
    error::{EvgError, EvgResult},
    generator::SharedGenerator,
    interaction::Interaction,
};
use std::sync::Arc;

pub struct ResponsibilityChain {
    generators: Vec<SharedGenerator>,
}

impl ResponsibilityChain {
    pub fn new(generators: &[SharedGenerator]) -> Self {
        Self { generators: generators.to_vec() }
    }

    pub fn find_generator(&self, interaction: &Interaction) -> EvgResult<SharedGenerator> {
        self.generators
            .iter()
            .find(|gen| gen.accepts(interaction))
            .map(Arc::clone)
            .ok_or_else(|| EvgError::NoResponsibleGenerator { key: interaction.as_key() })
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}
