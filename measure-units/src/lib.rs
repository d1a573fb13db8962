//! Measure Units - Unit lattice and operation catalog
//!
//! Compiles static dimension declarations into the closed set of unit types
//! and the operations each must expose.
//!
//! Stages:
//! - `ComponentRegistry`: components per dimension, one base each
//! - `UnitLattice`: simple definitions plus velocity/acceleration cross products
//! - `factor`: exact conversion factor between siblings
//! - `rules`: radius and time conversions across groups
//! - `OperationCatalog`: ordered descriptors per unit, with a reference evaluator

mod declarations;
mod registry;
mod lattice;
mod factor;
mod operation;
mod catalog;
mod measure;
pub mod rules;

pub use declarations::{Declarations, DeclarationsBuilder, DimensionDecl, Derivation};
pub use registry::ComponentRegistry;
pub use lattice::{UnitId, UnitDefinition, UnitLattice, declare_leaf, derive};
pub use factor::factor;
pub use operation::{
    BinaryOp, Formula, Operand, OperandRole, OperationDescriptor, OperationKind, ResultType,
};
pub use catalog::{CatalogEntry, DisplayMeta, FactorKey, OperationCatalog};
pub use measure::{EvalError, Evaluated, Measure};

use tracing::debug;
use measure_core::CatalogError;

/// Run every stage over `declarations`; the first failure aborts
pub fn compile(declarations: &Declarations) -> Result<OperationCatalog, CatalogError> {
    let registry = ComponentRegistry::build(declarations)?;
    let lattice = UnitLattice::build(&registry, declarations)?;
    debug!(units = lattice.len(), groups = lattice.groups().len(), "built lattice");
    let catalog = OperationCatalog::build(lattice)?;
    debug!(operations = catalog.operation_count(), "built catalog");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use measure_core::{codes, Dimension, UnitComponent};

    mod compile_tests {
        use super::*;

        #[test]
        fn test_compile_standard() {
            let catalog = compile(&Declarations::standard()).unwrap();
            assert_eq!(catalog.len(), 196);
            assert!(catalog.operation_count() > catalog.len() * 14);
        }

        #[test]
        fn test_config_error_surfaces() {
            let t = Dimension::Time;
            let decl = Declarations::builder()
                .dimension(t, vec![UnitComponent::new(t, "Min", "Mins", "min", 60.0)])
                .build();
            let err = compile(&decl).unwrap_err();
            assert_eq!(err.code(), codes::NO_BASE_COMPONENT);
        }

        #[test]
        fn test_empty_declarations() {
            let catalog = compile(&Declarations::default()).unwrap();
            assert!(catalog.is_empty());
        }
    }
}
