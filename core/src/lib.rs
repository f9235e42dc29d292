//! nuevg-core: neutrino event generation driver.
//!
//! A driver is configured for one initial state (probe + nuclear target).
//! It then selects interactions by cross section, hands each one to the
//! generator responsible for it, and returns finished event records.

pub mod chain;
pub mod config;
pub mod driver;
pub mod error;
pub mod event_record;
pub mod generator;
pub mod generator_list;
pub mod interaction;
pub mod kinematics;
pub mod models;
pub mod pdg;
pub mod resonance;
pub mod rng;
pub mod selector;
pub mod spline;
pub mod spline_cache;
pub mod store;
pub mod types;
pub mod xsec_map;

pub use driver::EvgDriver;
pub use error::{EvgError, EvgResult};
