//! Operation catalog - the closed set of operations every unit type exposes
//!
//! Built once over a completed lattice. Entries follow lattice order and each
//! entry's operations follow a fixed order, so two builds over the same
//! declarations serialize identically.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;
use measure_core::{CatalogError, Group};
use crate::factor::factor;
use crate::operation::{
    BinaryOp, Formula, OperandRole, OperationDescriptor, OperationKind, ResultType,
};
use crate::rules::{self, Query, RuleContext};
use crate::{UnitId, UnitLattice};

/// Key of a per-unit factor: which conversion, to which unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FactorKey {
    pub kind: OperationKind,
    pub target: UnitId,
}

/// What the emitter needs to name and print a unit type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayMeta {
    pub name: String,
    pub abbreviation: String,
    pub group: Group,
}

/// One unit and its ordered operations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub unit: UnitId,
    pub is_base: bool,
    pub display: DisplayMeta,
    pub operations: Vec<OperationDescriptor>,
    #[serde(skip)]
    factors: IndexMap<FactorKey, f64>,
}

impl CatalogEntry {
    /// Direct conversion factor to a sibling
    pub fn factor(&self, target: UnitId) -> Option<f64> {
        self.factors.get(&FactorKey { kind: OperationKind::DirectConversion, target }).copied()
    }

    pub fn operations_of(&self, kind: OperationKind) -> impl Iterator<Item = &OperationDescriptor> {
        self.operations.iter().filter(move |op| op.kind == kind)
    }
}

/// Catalog of every unit in the lattice
#[derive(Debug, Clone, Serialize)]
pub struct OperationCatalog {
    #[serde(skip)]
    lattice: UnitLattice,
    units: IndexMap<UnitId, CatalogEntry>,
}

impl OperationCatalog {
    /// Uniform operations then rule operations for every unit, in lattice order
    pub fn build(lattice: UnitLattice) -> Result<Self, CatalogError> {
        let mut units = IndexMap::with_capacity(lattice.len());

        for (id, unit) in lattice.iter() {
            let (mut operations, factors) = if unit.group.is_unitless() {
                (Vec::new(), IndexMap::new())
            } else {
                uniform_operations(&lattice, id)?
            };
            operations.extend(rules::resolve(&lattice, id)?);
            debug!(unit = %unit.name, operations = operations.len(), "catalogued unit");

            units.insert(id, CatalogEntry {
                unit: id,
                is_base: unit.is_base,
                display: DisplayMeta {
                    name: unit.name.clone(),
                    abbreviation: unit.abbreviation(),
                    group: unit.group,
                },
                operations,
                factors,
            });
        }

        Ok(OperationCatalog { lattice, units })
    }

    pub fn lattice(&self) -> &UnitLattice {
        &self.lattice
    }

    pub fn entry(&self, id: UnitId) -> Option<&CatalogEntry> {
        self.units.get(&id)
    }

    /// Look up an entry by unit name
    pub fn entry_named(&self, name: &str) -> Option<&CatalogEntry> {
        self.lattice.find(name).and_then(|id| self.entry(id))
    }

    pub fn operations(&self, id: UnitId) -> &[OperationDescriptor] {
        self.entry(id).map(|e| e.operations.as_slice()).unwrap_or(&[])
    }

    /// Direct conversion factor between siblings; `None` across groups
    pub fn conversion(&self, from: UnitId, to: UnitId) -> Option<f64> {
        self.entry(from).and_then(|e| e.factor(to))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Total number of descriptors across all units
    pub fn operation_count(&self) -> usize {
        self.units.values().map(|e| e.operations.len()).sum()
    }
}

type Uniform = (Vec<OperationDescriptor>, IndexMap<FactorKey, f64>);

fn uniform_operations(lattice: &UnitLattice, id: UnitId) -> Result<Uniform, CatalogError> {
    let unit = &lattice[id];
    let ctx = RuleContext { lattice, rule: "unitless-operand", owner: id };
    let unitless = ctx.unique(&Query::new(Group::Unitless).base())?;
    let same = ResultType::Unit(id);
    let op = |kind, result, formula| OperationDescriptor::new(kind, id, result, formula);

    let mut ops = vec![op(OperationKind::Negate, same, Formula::Negate)];
    for binary in BinaryOp::ALL {
        ops.push(op(OperationKind::ScaleByUnitless, same, Formula::binary(binary))
            .with_operand(OperandRole::Unitless, unitless));
    }
    ops.push(op(OperationKind::CompareUnitless, ResultType::Ordering, Formula::Compare)
        .with_operand(OperandRole::Unitless, unitless));
    for binary in [BinaryOp::Add, BinaryOp::Sub] {
        ops.push(op(OperationKind::AddSubSameUnit, same, Formula::binary(binary))
            .with_operand(OperandRole::Peer, id));
    }
    ops.push(op(OperationKind::RatioToScalar, ResultType::Scalar, Formula::Ratio)
        .with_operand(OperandRole::Peer, id));
    ops.push(op(OperationKind::CompareSameUnit, ResultType::Ordering, Formula::Compare)
        .with_operand(OperandRole::Peer, id));
    ops.push(op(OperationKind::ClampLower, same, Formula::Max).with_operand(OperandRole::Peer, id));
    ops.push(op(OperationKind::ClampUpper, same, Formula::Min).with_operand(OperandRole::Peer, id));
    ops.push(op(OperationKind::AbsoluteValue, same, Formula::Abs));
    ops.push(op(OperationKind::Sign, ResultType::Scalar, Formula::Sign));

    let mut factors = IndexMap::new();
    for (sibling_id, sibling) in lattice.group(unit.group) {
        let key = FactorKey { kind: OperationKind::DirectConversion, target: sibling_id };
        factors.insert(key, factor(unit, sibling)?);
    }
    for (key, scale) in &factors {
        ops.push(op(key.kind, ResultType::Unit(key.target), Formula::Scale { factor: *scale }));
    }

    Ok((ops, factors))
}
