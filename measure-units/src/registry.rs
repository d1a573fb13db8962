//! Component registry - declared components keyed by dimension

use indexmap::IndexMap;
use tracing::debug;
use measure_core::{ConfigError, Dimension, UnitComponent};
use crate::Declarations;

/// Declared components per dimension, in declaration order
///
/// Every registered dimension has exactly one base component (factor 1.0).
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    dimensions: IndexMap<Dimension, Vec<UnitComponent>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        ComponentRegistry { dimensions: IndexMap::new() }
    }

    /// Register every dimension of `declarations`, in order
    pub fn build(declarations: &Declarations) -> Result<Self, ConfigError> {
        let mut registry = ComponentRegistry::new();
        for decl in declarations.dimensions() {
            registry.register(decl.dimension, decl.components.clone())?;
        }
        Ok(registry)
    }

    /// Store the components of one dimension
    pub fn register(
        &mut self,
        dimension: Dimension,
        components: Vec<UnitComponent>,
    ) -> Result<(), ConfigError> {
        if self.dimensions.contains_key(&dimension) {
            return Err(ConfigError::DuplicateDimension { dimension });
        }

        for c in &components {
            if c.dimension != dimension {
                return Err(ConfigError::DimensionMismatch {
                    component: c.name.clone(),
                    declared: dimension,
                    actual: c.dimension,
                });
            }
            if !c.factor_to_base.is_finite() || c.factor_to_base <= 0.0 {
                return Err(ConfigError::InvalidFactor {
                    dimension,
                    component: c.name.clone(),
                    factor: c.factor_to_base,
                });
            }
        }

        let bases: Vec<String> = components.iter()
            .filter(|c| c.has_unit_factor())
            .map(|c| c.name.clone())
            .collect();
        match bases.len() {
            0 => return Err(ConfigError::NoBaseComponent { dimension }),
            1 => {}
            _ => return Err(ConfigError::MultipleBaseComponents { dimension, components: bases }),
        }

        debug!(%dimension, base = %bases[0], count = components.len(), "registered dimension");
        self.dimensions.insert(dimension, components);
        Ok(())
    }

    /// Components of a dimension in declaration order (empty if undeclared)
    pub fn components(&self, dimension: Dimension) -> &[UnitComponent] {
        self.dimensions.get(&dimension).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// The factor-1.0 component of a dimension
    pub fn base(&self, dimension: Dimension) -> Option<&UnitComponent> {
        self.components(dimension).iter().find(|c| c.has_unit_factor())
    }

    /// Check if a component is the base of its dimension
    pub fn is_base(&self, component: &UnitComponent) -> bool {
        self.base(component.dimension)
            .map_or(false, |b| b.same_identity(component) && component.has_unit_factor())
    }

    /// Registered dimensions in declaration order
    pub fn dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.dimensions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}
