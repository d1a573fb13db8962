//! Measure type - a value tagged with a unit of the lattice
//!
//! The reference evaluator runs a descriptor's formula over concrete measures
//! so the contract handed to the emitter can be checked numerically.

use std::cmp::Ordering;
use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use crate::operation::{OperationDescriptor, ResultType};
use crate::{OperationCatalog, UnitId};

/// A numeric value in one unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub value: f64,
    pub unit: UnitId,
}

impl Measure {
    pub fn new(value: f64, unit: UnitId) -> Self {
        Measure { value, unit }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Outcome of evaluating one operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluated {
    Measure(Measure),
    Scalar(f64),
    Ordering(Ordering),
}

impl Evaluated {
    pub fn as_measure(&self) -> Option<Measure> {
        match self {
            Evaluated::Measure(m) => Some(*m),
            _ => None,
        }
    }
}

/// Measures that do not fit the descriptor being evaluated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("operation is owned by {expected}, not {actual}")]
    OwnerMismatch { expected: UnitId, actual: UnitId },

    #[error("operand must be in {expected}, not {actual}")]
    OperandMismatch { expected: UnitId, actual: UnitId },

    #[error("operation takes an operand in {expected}")]
    MissingOperand { expected: UnitId },
}

impl OperationCatalog {
    /// Evaluate `op` with `this` as the owner value
    ///
    /// Unary operations ignore `operand`. Results typed as a unit carry that unit.
    pub fn evaluate(
        &self,
        op: &OperationDescriptor,
        this: Measure,
        operand: Option<Measure>,
    ) -> Result<Evaluated, EvalError> {
        if this.unit != op.owner {
            return Err(EvalError::OwnerMismatch { expected: op.owner, actual: this.unit });
        }

        let that = match op.operand() {
            None => 0.0,
            Some(expected) => {
                let given = operand.ok_or(EvalError::MissingOperand { expected: expected.unit })?;
                if given.unit != expected.unit {
                    return Err(EvalError::OperandMismatch {
                        expected: expected.unit,
                        actual: given.unit,
                    });
                }
                given.value
            }
        };

        let raw = op.formula.apply(this.value, that);
        Ok(match op.result {
            ResultType::Unit(unit) => Evaluated::Measure(Measure::new(raw, unit)),
            ResultType::Scalar => Evaluated::Scalar(raw),
            ResultType::Ordering => Evaluated::Ordering(ordering(raw)),
        })
    }
}

fn ordering(raw: f64) -> Ordering {
    if raw > 0.0 {
        Ordering::Greater
    } else if raw < 0.0 {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}
