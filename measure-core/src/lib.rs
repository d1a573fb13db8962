//! Measure Core - Fundamental types
//!
//! This crate provides the core types used throughout Measure:
//! - `Dimension`: The declared physical base quantities
//! - `Group`: Shape shared by sibling unit definitions
//! - `UnitComponent`: A named unit within one dimension
//! - Errors: `ConfigError`, `LatticeError`, `RuleError`, `CatalogError`

mod dimension;
mod component;
mod error;

pub use dimension::{Dimension, Motion, Group};
pub use component::UnitComponent;
pub use error::{ConfigError, LatticeError, RuleError, CatalogError, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Dimension, Motion, Group, UnitComponent};
    pub use crate::{ConfigError, LatticeError, RuleError, CatalogError};
}
