use thiserror::Error;

use crate::types::PdgCode;

#[derive(Error, Debug)]
pub enum EvgError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid initial state: probe pdg {probe_pdg} is not a neutrino or antineutrino")]
    InvalidInitialState { probe_pdg: PdgCode },

    #[error("Invalid target: Z = {z}, A = {a}")]
    InvalidTarget { z: u32, a: u32 },

    #[error("Driver not configured: call configure() first")]
    NotConfigured,

    #[error("No cross section algorithm registered for interaction {key}")]
    AlgorithmNotFound { key: String },

    #[error("No generator is responsible for interaction {key}")]
    NoResponsibleGenerator { key: String },

    #[error("No interaction could be selected at E = {energy} GeV (total cross section is zero)")]
    NoValidInteraction { energy: f64 },

    #[error("Generator '{generator}' failed: {reason}")]
    Generation { generator: String, reason: String },

    #[error("Could not produce a physical event after {attempts} attempts")]
    UnphysicalRetryExhausted { attempts: u32 },

    #[error("No spline loaded for algorithm {alg} / interaction {key}")]
    SplineNotFound { alg: String, key: String },

    #[error("Invalid spline arguments: {reason}")]
    InvalidSplineArgs { reason: String },

    #[error("Empty energy range: [{min}, {max}]")]
    EmptyEnergyRange { min: f64, max: f64 },

    #[error("You haven't loaded any splines")]
    SplinesNotLoaded,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EvgError {
    /// Structural failures: the caller should stop the job rather than
    /// try another event.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AlgorithmNotFound { .. }
                | Self::NoResponsibleGenerator { .. }
                | Self::UnphysicalRetryExhausted { .. }
        )
    }
}

pub type EvgResult<T> = Result<T, EvgError>;
