use thiserror::Error;

use crate::ecs::dispatch::SystemKind;

/// Faults that escape a system boundary.
///
/// Validation failures and domain rejections are handled where they happen
/// and never show up here. A `WorldFault` means the dispatch machinery or a
/// shared service is in a state the caller has to deal with, usually by
/// dropping the offending connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldFault {
    #[error("no system registered for {system:?}")]
    NoHandler { system: SystemKind },

    #[error("system {system:?} registered twice")]
    DuplicateSystem { system: SystemKind },

    #[error("resource `{0}` is not installed in the world")]
    MissingResource(&'static str),

    #[error("registry `{0}` lock was poisoned")]
    RegistryPoisoned(&'static str),

    #[error("invariant broken: {0}")]
    InvariantBroken(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate {kind} id {id} in catalog")]
    Duplicate { kind: &'static str, id: i32 },
}
