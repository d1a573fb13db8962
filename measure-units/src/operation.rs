//! Operation descriptors - pure data handed to the code emitter
//!
//! A descriptor names the kind of operation, the unit that owns it, its
//! operands, its result and the formula realizing it. It carries no code.

use serde::{Serialize, Deserialize};
use crate::UnitId;

/// Kind of operation exposed by a generated unit type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Negate,
    AddSubSameUnit,
    ScaleByUnitless,
    RatioToScalar,
    CompareSameUnit,
    CompareUnitless,
    ClampLower,
    ClampUpper,
    AbsoluteValue,
    Sign,
    DirectConversion,
    CrossDimensionConversion,
    TimeIntegration,
    TimeDifferentiation,
}

/// What an operand stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandRole {
    /// Another value of the owner's own unit
    Peer,
    /// A dimensionless scalar
    Unitless,
    /// Linear distance mediating an angular/linear conversion
    Radius,
    /// Time value multiplied in or divided out
    Duration,
    /// Arbitrary unit value on the other side of a commuted operation
    Measure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operand {
    pub role: OperandRole,
    pub unit: UnitId,
}

impl Operand {
    pub fn new(role: OperandRole, unit: UnitId) -> Self {
        Operand { role, unit }
    }
}

/// Result type of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    Unit(UnitId),
    /// Plain number (ratio, sign)
    Scalar,
    /// -1, 0 or 1
    Ordering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 4] = [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div];

    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        }
    }
}

/// Numeric contract of an operation over raw values
///
/// `this` is the owner's value, `that` the single operand's value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Formula {
    /// -this
    Negate,
    /// this <op> that
    Binary { binary: BinaryOp },
    /// this / that, as a plain number
    Ratio,
    /// sign of (this - that)
    Compare,
    /// whichever of this and that is larger
    Max,
    /// whichever of this and that is smaller
    Min,
    Abs,
    Sign,
    /// this * factor
    Scale { factor: f64 },
    /// (this * factor) * that
    ScaleThenMultiply { factor: f64 },
    /// (this * factor) / that
    ScaleThenDivide { factor: f64 },
}

impl Formula {
    pub fn binary(binary: BinaryOp) -> Self {
        Formula::Binary { binary }
    }

    /// Number of operands the formula consumes besides `this`
    pub fn arity(&self) -> usize {
        match self {
            Formula::Negate | Formula::Abs | Formula::Sign | Formula::Scale { .. } => 0,
            _ => 1,
        }
    }

    /// Evaluate over raw values; `that` is ignored by unary formulas
    pub fn apply(&self, this: f64, that: f64) -> f64 {
        match self {
            Formula::Negate => -this,
            Formula::Binary { binary } => binary.apply(this, that),
            Formula::Ratio => this / that,
            Formula::Compare => {
                if this > that { 1.0 } else if this < that { -1.0 } else { 0.0 }
            }
            Formula::Max => if this > that { this } else { that },
            Formula::Min => if this < that { this } else { that },
            Formula::Abs => this.abs(),
            Formula::Sign => sign(this),
            Formula::Scale { factor } => this * factor,
            Formula::ScaleThenMultiply { factor } => (this * factor) * that,
            Formula::ScaleThenDivide { factor } => (this * factor) / that,
        }
    }
}

/// 1 for positive, -1 for negative, 0 for zero (either sign); NaN stays NaN
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else if value == 0.0 {
        0.0
    } else {
        f64::NAN
    }
}

/// One operation a unit type must expose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub kind: OperationKind,
    pub owner: UnitId,
    pub operands: Vec<Operand>,
    pub result: ResultType,
    pub formula: Formula,
}

impl OperationDescriptor {
    pub fn new(kind: OperationKind, owner: UnitId, result: ResultType, formula: Formula) -> Self {
        OperationDescriptor { kind, owner, operands: Vec::new(), result, formula }
    }

    /// Builder: add an operand
    pub fn with_operand(mut self, role: OperandRole, unit: UnitId) -> Self {
        self.operands.push(Operand::new(role, unit));
        self
    }

    pub fn operand(&self) -> Option<&Operand> {
        self.operands.first()
    }

    pub fn result_unit(&self) -> Option<UnitId> {
        match self.result {
            ResultType::Unit(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign() {
        assert_eq!(Formula::Sign.apply(-3.5, 0.0), -1.0);
        assert_eq!(Formula::Sign.apply(2.0, 0.0), 1.0);
        assert_eq!(Formula::Sign.apply(0.0, 0.0), 0.0);
        assert_eq!(Formula::Sign.apply(-0.0, 0.0), 0.0);
        assert!(Formula::Sign.apply(f64::NAN, 0.0).is_nan());
    }

    #[test]
    fn test_compare() {
        assert_eq!(Formula::Compare.apply(1.0, 2.0), -1.0);
        assert_eq!(Formula::Compare.apply(2.0, 1.0), 1.0);
        assert_eq!(Formula::Compare.apply(2.0, 2.0), 0.0);
    }

    #[test]
    fn test_clamps() {
        assert_eq!(Formula::Max.apply(1.0, 4.0), 4.0);
        assert_eq!(Formula::Min.apply(1.0, 4.0), 1.0);
        assert_eq!(Formula::Max.apply(-2.0, -3.0), -2.0);
    }

    #[test]
    fn test_scaled_formulas() {
        assert_eq!(Formula::Scale { factor: 12.0 }.apply(2.0, 0.0), 24.0);
        assert_eq!(Formula::ScaleThenMultiply { factor: 2.0 }.apply(3.0, 4.0), 24.0);
        assert_eq!(Formula::ScaleThenDivide { factor: 2.0 }.apply(3.0, 4.0), 1.5);
    }

    #[test]
    fn test_binary() {
        let results: Vec<f64> = BinaryOp::ALL.iter().map(|op| Formula::binary(*op).apply(6.0, 3.0)).collect();
        assert_eq!(results, vec![9.0, 3.0, 18.0, 2.0]);
    }

    #[test]
    fn test_arity() {
        assert_eq!(Formula::Negate.arity(), 0);
        assert_eq!(Formula::Scale { factor: 1.0 }.arity(), 0);
        assert_eq!(Formula::Ratio.arity(), 1);
        assert_eq!(Formula::ScaleThenDivide { factor: 1.0 }.arity(), 1);
    }

    #[test]
    fn test_formula_json() {
        let json = serde_json::to_string(&Formula::binary(BinaryOp::Mul)).unwrap();
        assert_eq!(json, r#"{"op":"binary","binary":"mul"}"#);
        let json = serde_json::to_string(&Formula::Scale { factor: 2.0 }).unwrap();
        assert_eq!(json, r#"{"op":"scale","factor":2.0}"#);
    }
}
