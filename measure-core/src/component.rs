//! Unit components: the named units declared within one dimension

use std::fmt;
use serde::{Serialize, Deserialize};
use crate::Dimension;

/// A named unit within one dimension, with its factor to the dimension's base
///
/// `value_in_base = value * factor_to_base`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitComponent {
    /// The dimension this component measures
    pub dimension: Dimension,
    /// Singular name (e.g., "Inch")
    pub name: String,
    /// Plural name (e.g., "Inches")
    pub plural: String,
    /// Display abbreviation (e.g., "in")
    pub abbreviation: String,
    /// Multiplicative factor to the dimension's base component
    pub factor_to_base: f64,
}

impl UnitComponent {
    pub fn new(
        dimension: Dimension,
        name: &str,
        plural: &str,
        abbreviation: &str,
        factor_to_base: f64,
    ) -> Self {
        UnitComponent {
            dimension,
            name: name.to_string(),
            plural: plural.to_string(),
            abbreviation: abbreviation.to_string(),
            factor_to_base,
        }
    }

    /// Factor of exactly 1.0 marks the base component of a dimension
    pub fn has_unit_factor(&self) -> bool {
        self.factor_to_base == 1.0
    }

    /// Identity used by structural matching: same dimension and same name
    pub fn same_identity(&self, other: &UnitComponent) -> bool {
        self.dimension == other.dimension && self.name == other.name
    }
}

impl fmt::Display for UnitComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inch() -> UnitComponent {
        UnitComponent::new(Dimension::LinearDistance, "Inch", "Inches", "in", 1.0)
    }

    fn foot() -> UnitComponent {
        UnitComponent::new(Dimension::LinearDistance, "Foot", "Feet", "ft", 12.0)
    }

    #[test]
    fn test_unit_factor() {
        assert!(inch().has_unit_factor());
        assert!(!foot().has_unit_factor());
    }

    #[test]
    fn test_identity_ignores_factor() {
        let mut other = inch();
        other.factor_to_base = 2.54;
        assert!(inch().same_identity(&other));
        assert!(!inch().same_identity(&foot()));

        let second = UnitComponent::new(Dimension::Time, "Inch", "Inches", "in", 1.0);
        assert!(!inch().same_identity(&second));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", foot()), "Foot (linear_distance)");
    }
}
