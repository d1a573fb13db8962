//! Errors raised while compiling declarations into a catalog
//!
//! Every error is fatal: declarations are static, so re-running with the same
//! input reproduces the same failure. Messages name the offending dimension,
//! group, unit and rule.

use thiserror::Error;
use crate::{Dimension, Group};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const NO_BASE_COMPONENT: &str = "NO_BASE_COMPONENT";
    pub const MULTIPLE_BASE_COMPONENTS: &str = "MULTIPLE_BASE_COMPONENTS";
    pub const DUPLICATE_DIMENSION: &str = "DUPLICATE_DIMENSION";
    pub const DIMENSION_MISMATCH: &str = "DIMENSION_MISMATCH";
    pub const INVALID_FACTOR: &str = "INVALID_FACTOR";
    pub const UNKNOWN_GROUP: &str = "UNKNOWN_GROUP";
    pub const SHAPE_MISMATCH: &str = "SHAPE_MISMATCH";
    pub const DUPLICATE_GROUP: &str = "DUPLICATE_GROUP";
    pub const DUPLICATE_NAME: &str = "DUPLICATE_NAME";
    pub const INVALID_DERIVATION: &str = "INVALID_DERIVATION";
    pub const NO_MATCH: &str = "NO_MATCH";
    pub const AMBIGUOUS_MATCH: &str = "AMBIGUOUS_MATCH";
}

/// Invalid component declarations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error(
        "dimension {dimension} has no base component (exactly one component must have factor 1.0)"
    )]
    NoBaseComponent { dimension: Dimension },

    #[error("dimension {dimension} has multiple base components: {}", .components.join(", "))]
    MultipleBaseComponents { dimension: Dimension, components: Vec<String> },

    #[error("dimension {dimension} is declared more than once")]
    DuplicateDimension { dimension: Dimension },

    #[error("component {component} belongs to {actual} but is declared under {declared}")]
    DimensionMismatch { component: String, declared: Dimension, actual: Dimension },

    #[error(
        "component {component} of {dimension} has invalid factor {factor} (must be finite and > 0)"
    )]
    InvalidFactor { dimension: Dimension, component: String, factor: f64 },

    #[error("unknown group path '{0}'")]
    UnknownGroup(String),
}

/// Inconsistent unit lattice
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LatticeError {
    #[error("shape mismatch: {from} ({from_group}) and {to} ({to_group}) are not siblings")]
    ShapeMismatch { from: String, from_group: Group, to: String, to_group: Group },

    #[error("group {group} is produced more than once")]
    DuplicateGroup { group: Group },

    #[error("cannot derive {group} as {upper} per {lower}")]
    InvalidDerivation { group: Group, upper: Group, lower: Group },

    #[error("group {group} has more than one unit named {name}: {}", .components.join(", "))]
    DuplicateName { group: Group, name: String, components: Vec<String> },
}

/// A cross-dimension rule could not resolve a unique counterpart
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("rule '{rule}' for {unit} ({group}): no unit matches {query}")]
    NoMatch { rule: &'static str, unit: String, group: Group, query: String },

    #[error(
        "rule '{rule}' for {unit} ({group}): {query} is ambiguous between {}",
        .candidates.join(", ")
    )]
    AmbiguousMatch {
        rule: &'static str,
        unit: String,
        group: Group,
        query: String,
        candidates: Vec<String>,
    },
}

/// Any failure aborting catalog construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lattice(#[from] LatticeError),

    #[error(transparent)]
    Rule(#[from] RuleError),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::NoBaseComponent { .. } => codes::NO_BASE_COMPONENT,
            ConfigError::MultipleBaseComponents { .. } => codes::MULTIPLE_BASE_COMPONENTS,
            ConfigError::DuplicateDimension { .. } => codes::DUPLICATE_DIMENSION,
            ConfigError::DimensionMismatch { .. } => codes::DIMENSION_MISMATCH,
            ConfigError::InvalidFactor { .. } => codes::INVALID_FACTOR,
            ConfigError::UnknownGroup(_) => codes::UNKNOWN_GROUP,
        }
    }
}

impl LatticeError {
    pub fn code(&self) -> &'static str {
        match self {
            LatticeError::ShapeMismatch { .. } => codes::SHAPE_MISMATCH,
            LatticeError::DuplicateGroup { .. } => codes::DUPLICATE_GROUP,
            LatticeError::InvalidDerivation { .. } => codes::INVALID_DERIVATION,
            LatticeError::DuplicateName { .. } => codes::DUPLICATE_NAME,
        }
    }
}

impl RuleError {
    pub fn code(&self) -> &'static str {
        match self {
            RuleError::NoMatch { .. } => codes::NO_MATCH,
            RuleError::AmbiguousMatch { .. } => codes::AMBIGUOUS_MATCH,
        }
    }
}

impl CatalogError {
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::Config(e) => e.code(),
            CatalogError::Lattice(e) => e.code(),
            CatalogError::Rule(e) => e.code(),
        }
    }
}
