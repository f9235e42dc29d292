//! Generator registry: named, ordered lists of event generators.
//!
//! A list name resolves through a `GeneratorCatalog` to a builder that
//! produces the generators in a fixed order. The order matters: it is
//! the tie-break order of the responsibility chain.

use crate::{
    error::{EvgError, EvgResult},
    generator::SharedGenerator,
    models,
};
use std::collections::BTreeMap;
use std::ops::Deref;

pub const DEFAULT_LIST: &str = "Default";

/// Environment variable consulted when no list name is configured.
pub const GENERATOR_LIST_ENV: &str = "EVG_GENERATOR_LIST";

type ListBuilder = Box<dyn Fn() -> Vec<SharedGenerator> + Send + Sync>;

/// An assembled, ordered generator list.
#[derive(Clone)]
pub struct GeneratorList {
    name:       String,
    generators: Vec<SharedGenerator>,
}

impl GeneratorList {
    pub fn new(name: impl Into<String>, generators: Vec<SharedGenerator>) -> Self {
        Self { name: name.into(), generators }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Deref for GeneratorList {
    type Target = [SharedGenerator];

    fn deref(&self) -> &Self::Target {
        &self.generators
    }
}

/// Name → list builder.
pub struct GeneratorCatalog {
    builders: BTreeMap<String, ListBuilder>,
}

impl GeneratorCatalog {
    pub fn empty() -> Self {
        Self { builders: BTreeMap::new() }
    }

    /// Catalog holding the reference model lists.
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        catalog.register(DEFAULT_LIST, || {
            vec![models::qel_generator(), models::res_generator(), models::dis_generator()]
        });
        catalog.register("QEL", || vec![models::qel_generator()]);
        catalog.register("CCQE+DIS", || {
            vec![models::qel_generator(), models::dis_generator()]
        });
        catalog
    }

    /// Register (or replace) a named list.
    pub fn register<F>(&mut self, name: &str, builder: F)
    where
        F: Fn() -> Vec<SharedGenerator> + Send + Sync + 'static,
    {
        self.builders.insert(name.to_string(), Box::new(builder));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.builders.keys().map(String::as_str)
    }

    /// Resolve `name` (or `"Default"` when `None`/blank) into a generator list.
    pub fn assemble(&self, name: Option<&str>) -> EvgResult<GeneratorList> {
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n,
            _ => DEFAULT_LIST,
        };
        log::info!("Assembling event generator list '{name}'");

        let builder = self.builders.get(name).ok_or_else(|| {
            EvgError::Configuration(format!("unknown event generator list '{name}'"))
        })?;
        let generators = builder();
        if generators.is_empty() {
            return Err(EvgError::Configuration(format!(
                "event generator list '{name}' is empty"
            )));
        }
        for (i, gen) in generators.iter().enumerate() {
            log::debug!("  [{i}] {}", gen.key());
        }
        Ok(GeneratorList::new(name, generators))
    }
}

impl Default for GeneratorCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// List name from the environment, if set.
pub fn list_name_from_env() -> Option<String> {
    std::env::var(GENERATOR_LIST_ENV).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_resolves_to_default() {
        let catalog = GeneratorCatalog::standard();
        let list = catalog.assemble(Some("  ")).unwrap();
        assert_eq!(list.name(), DEFAULT_LIST);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn unknown_name_is_configuration_error() {
        let catalog = GeneratorCatalog::standard();
        let err = catalog.assemble(Some("NoSuchList")).err().unwrap();
        assert!(matches!(err, EvgError::Configuration(_)));
    }

    #[test]
    fn empty_list_is_configuration_error() {
        let mut catalog = GeneratorCatalog::empty();
        catalog.register("Nothing", Vec::new);
        assert!(matches!(
            catalog.assemble(Some("Nothing")),
            Err(EvgError::Configuration(_))
        ));
    }
}
