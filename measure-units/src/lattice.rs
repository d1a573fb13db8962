//! Unit lattice - every concrete unit definition, simple and derived
//!
//! Leaf groups hold one simple definition per declared component. Derived
//! groups (velocity, acceleration) are the cross product of an upper group
//! with a single-component lower group (time), so acceleration definitions
//! carry `[distance, time1, time2]`.

use std::fmt;
use std::ops::Index;
use serde::{Serialize, Deserialize};
use tracing::debug;
use measure_core::{Group, LatticeError, UnitComponent};
use crate::{ComponentRegistry, Declarations};

/// Position of a definition in the lattice (declaration order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(usize);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One concrete unit: a component list and the group it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    /// Shape shared with all siblings
    pub group: Group,
    /// Numerator first, then one divisor per following position
    pub components: Vec<UnitComponent>,
    /// True iff every component is its dimension's base
    pub is_base: bool,
    /// Derived name, unique within the group (e.g., "InchesPerSecond")
    pub name: String,
}

impl UnitDefinition {
    /// Definition with a single component
    pub fn simple(is_base: bool, group: Group, component: UnitComponent) -> Self {
        let components = vec![component];
        let name = derived_name(&components);
        UnitDefinition { group, components, is_base, name }
    }

    /// This definition divided by one more component
    pub fn per(&self, is_base: bool, group: Group, divisor: UnitComponent) -> Self {
        let mut components = self.components.clone();
        components.push(divisor);
        let name = derived_name(&components);
        UnitDefinition { group, components, is_base, name }
    }

    /// Component abbreviations joined by '/' (e.g., "in/s")
    pub fn abbreviation(&self) -> String {
        self.components.iter()
            .map(|c| c.abbreviation.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn component(&self, position: usize) -> Option<&UnitComponent> {
        self.components.get(position)
    }

    /// Last divisor of a derived definition
    pub fn last_component(&self) -> Option<&UnitComponent> {
        self.components.last()
    }
}

impl fmt::Display for UnitDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn derived_name(components: &[UnitComponent]) -> String {
    let mut name = String::new();
    for (i, c) in components.iter().enumerate() {
        if i == 0 {
            name.push_str(&c.plural);
        } else {
            name.push_str("Per");
            name.push_str(&c.name);
        }
    }
    name
}

/// One simple definition per component of a leaf dimension
pub fn declare_leaf(
    group: Group,
    components: &[UnitComponent],
    base: &UnitComponent,
) -> Vec<UnitDefinition> {
    components.iter()
        .map(|c| {
            let is_base = c.same_identity(base) && c.has_unit_factor();
            UnitDefinition::simple(is_base, group, c.clone())
        })
        .collect()
}

/// Cross product `upper × lower`, upper-major
///
/// Each pair yields `upper.components ++ [lower.components[0]]`. Lower
/// definitions must be single-component; the result count is exactly
/// `|upper| * |lower|`.
pub fn derive(
    group: Group,
    upper: &[UnitDefinition],
    lower: &[UnitDefinition],
) -> Result<Vec<UnitDefinition>, LatticeError> {
    let shape = group.shape();
    let mut result = Vec::with_capacity(upper.len() * lower.len());

    for top in upper {
        for bottom in lower {
            let divisor = match bottom.components.as_slice() {
                [single] => single,
                _ => return Err(invalid_derivation(group, top, bottom)),
            };
            let matches_shape = shape.len() == top.components.len() + 1
                && shape.iter().zip(top.components.iter().chain(std::iter::once(divisor)))
                    .all(|(dim, c)| *dim == c.dimension);
            if !matches_shape {
                return Err(invalid_derivation(group, top, bottom));
            }
            result.push(top.per(top.is_base && bottom.is_base, group, divisor.clone()));
        }
    }

    Ok(result)
}

fn invalid_derivation(
    group: Group,
    upper: &UnitDefinition,
    lower: &UnitDefinition,
) -> LatticeError {
    LatticeError::InvalidDerivation { group, upper: upper.group, lower: lower.group }
}

/// Derived names must not repeat within one group
fn ensure_unique_names(group: Group, definitions: &[UnitDefinition]) -> Result<(), LatticeError> {
    for (i, definition) in definitions.iter().enumerate() {
        let clashes: Vec<&UnitDefinition> = definitions[i..].iter()
            .filter(|d| d.name == definition.name)
            .collect();
        if clashes.len() > 1 {
            return Err(LatticeError::DuplicateName {
                group,
                name: definition.name.clone(),
                components: clashes.iter().map(|d| component_names(d)).collect(),
            });
        }
    }
    Ok(())
}

fn component_names(definition: &UnitDefinition) -> String {
    definition.components.iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// All unit definitions, built once in declaration order
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnitLattice {
    units: Vec<UnitDefinition>,
}

impl UnitLattice {
    /// Leaf groups in dimension order, then each declared derivation
    pub fn build(
        registry: &ComponentRegistry,
        declarations: &Declarations,
    ) -> Result<Self, LatticeError> {
        let mut lattice = UnitLattice::default();

        for dimension in registry.dimensions() {
            let group = dimension.leaf_group();
            lattice.ensure_new_group(group)?;
            let Some(base) = registry.base(dimension) else { continue };
            let leaf = declare_leaf(group, registry.components(dimension), base);
            ensure_unique_names(group, &leaf)?;
            debug!(%group, count = leaf.len(), "declared leaf group");
            lattice.units.extend(leaf);
        }

        for derivation in declarations.derivations() {
            lattice.ensure_new_group(derivation.group)?;
            let upper = lattice.definitions(derivation.upper);
            let lower = lattice.definitions(derivation.lower);
            if upper.is_empty() || lower.is_empty() {
                return Err(LatticeError::InvalidDerivation {
                    group: derivation.group,
                    upper: derivation.upper,
                    lower: derivation.lower,
                });
            }
            let derived = derive(derivation.group, &upper, &lower)?;
            ensure_unique_names(derivation.group, &derived)?;
            debug!(group = %derivation.group, count = derived.len(), "derived group");
            lattice.units.extend(derived);
        }

        Ok(lattice)
    }

    fn ensure_new_group(&self, group: Group) -> Result<(), LatticeError> {
        if self.units.iter().any(|u| u.group == group) {
            return Err(LatticeError::DuplicateGroup { group });
        }
        Ok(())
    }

    fn definitions(&self, group: Group) -> Vec<UnitDefinition> {
        self.group(group).map(|(_, u)| u.clone()).collect()
    }

    pub fn get(&self, id: UnitId) -> Option<&UnitDefinition> {
        self.units.get(id.0)
    }

    /// Every definition with its id, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &UnitDefinition)> {
        self.units.iter().enumerate().map(|(i, u)| (UnitId(i), u))
    }

    /// Definitions of one group, in declaration order
    pub fn group(&self, group: Group) -> impl Iterator<Item = (UnitId, &UnitDefinition)> {
        self.iter().filter(move |(_, u)| u.group == group)
    }

    /// Groups in order of first appearance
    pub fn groups(&self) -> Vec<Group> {
        let mut groups = Vec::new();
        for u in &self.units {
            if !groups.contains(&u.group) {
                groups.push(u.group);
            }
        }
        groups
    }

    /// Look up a definition by derived name
    pub fn find(&self, name: &str) -> Option<UnitId> {
        self.iter().find(|(_, u)| u.name == name).map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Index<UnitId> for UnitLattice {
    type Output = UnitDefinition;

    fn index(&self, id: UnitId) -> &UnitDefinition {
        &self.units[id.0]
    }
}
