//! Conversion factors between sibling definitions
//!
//! Every conversion funnels through each dimension's base component, so the
//! factor between two siblings is a product of per-position ratios and no
//! graph search is needed.

use measure_core::LatticeError;
use crate::UnitDefinition;

/// Multiplicative factor converting a value in `from` to a value in `to`
///
/// Position 0 contributes `from / to` (factors to base). Divisor positions
/// contribute the reciprocal ratio: one inch per second is sixty inches per
/// minute.
pub fn factor(from: &UnitDefinition, to: &UnitDefinition) -> Result<f64, LatticeError> {
    if from.group != to.group || from.components.len() != to.components.len() {
        return Err(LatticeError::ShapeMismatch {
            from: from.name.clone(),
            from_group: from.group,
            to: to.name.clone(),
            to_group: to.group,
        });
    }

    let mut result = 1.0;
    for (i, (a, b)) in from.components.iter().zip(&to.components).enumerate() {
        if i == 0 {
            result *= a.factor_to_base / b.factor_to_base;
        } else {
            result *= b.factor_to_base / a.factor_to_base;
        }
    }
    Ok(result)
}
