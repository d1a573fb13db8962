//! Cross-dimension conversion rules
//!
//! Each rule is triggered by the owner's group, searches the unit universe for
//! counterparts by component identity at fixed positions, and emits
//! descriptors. Every search must resolve to exactly one unit.

use std::fmt;
use tracing::debug;
use measure_core::{CatalogError, Group, Motion, RuleError, UnitComponent};
use crate::factor::factor;
use crate::operation::{
    BinaryOp, Formula, OperandRole, OperationDescriptor, OperationKind, ResultType,
};
use crate::{UnitDefinition, UnitId, UnitLattice};

/// Structural search: a group plus components pinned at positions
#[derive(Debug, Clone)]
pub struct Query<'a> {
    group: Group,
    base: bool,
    pins: Vec<(usize, &'a UnitComponent)>,
}

impl<'a> Query<'a> {
    pub fn new(group: Group) -> Self {
        Query { group, base: false, pins: Vec::new() }
    }

    /// Require the base definition of the group
    pub fn base(mut self) -> Self {
        self.base = true;
        self
    }

    /// Require `component` at `position`
    pub fn pin(mut self, position: usize, component: &'a UnitComponent) -> Self {
        self.pins.push((position, component));
        self
    }

    /// Pin `components[range]` of `unit` at their own positions
    pub fn pin_from(mut self, unit: &'a UnitDefinition, positions: std::ops::Range<usize>) -> Self {
        for i in positions {
            if let Some(c) = unit.component(i) {
                self.pins.push((i, c));
            }
        }
        self
    }

    pub fn matches(&self, unit: &UnitDefinition) -> bool {
        unit.group == self.group
            && (!self.base || unit.is_base)
            && self.pins.iter().all(|(i, c)| {
                unit.component(*i).map_or(false, |u| u.same_identity(c))
            })
    }
}

impl fmt::Display for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut terms: Vec<String> = Vec::new();
        if self.base {
            terms.push("base".to_string());
        }
        for (i, c) in &self.pins {
            terms.push(format!("{}={}", i, c.name));
        }
        write!(f, "{}[{}]", self.group, terms.join(", "))
    }
}

/// Outcome of a search, distinguishing zero, one and many candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
    None,
    One(UnitId),
    Many(Vec<UnitId>),
}

/// Run a query over the whole lattice
pub fn search(lattice: &UnitLattice, query: &Query) -> Match {
    let hits: Vec<UnitId> = lattice.iter()
        .filter(|(_, u)| query.matches(u))
        .map(|(id, _)| id)
        .collect();
    match hits.len() {
        0 => Match::None,
        1 => Match::One(hits[0]),
        _ => Match::Many(hits),
    }
}

/// Owner and rule being resolved, for lookups and error reporting
pub struct RuleContext<'a> {
    pub lattice: &'a UnitLattice,
    pub rule: &'static str,
    pub owner: UnitId,
}

impl<'a> RuleContext<'a> {
    pub fn unit(&self) -> &'a UnitDefinition {
        &self.lattice[self.owner]
    }

    /// The single unit matching `query`, or a rule error
    pub fn unique(&self, query: &Query) -> Result<UnitId, RuleError> {
        let owner = self.unit();
        match search(self.lattice, query) {
            Match::One(id) => Ok(id),
            Match::None => Err(RuleError::NoMatch {
                rule: self.rule,
                unit: owner.name.clone(),
                group: owner.group,
                query: query.to_string(),
            }),
            Match::Many(ids) => Err(RuleError::AmbiguousMatch {
                rule: self.rule,
                unit: owner.name.clone(),
                group: owner.group,
                query: query.to_string(),
                candidates: ids.iter().map(|id| self.lattice[*id].name.clone()).collect(),
            }),
        }
    }

    /// Base component of a distance flavor (radians for angular)
    fn distance_base(&self, motion: Motion) -> Result<&'a UnitComponent, RuleError> {
        let id = self.unique(&Query::new(Group::Distance(motion)).base())?;
        Ok(&self.lattice[id].components[0])
    }

    fn factor_to(&self, target: UnitId) -> Result<f64, CatalogError> {
        Ok(factor(self.unit(), &self.lattice[target])?)
    }
}

type Resolve = fn(&RuleContext) -> Result<Vec<OperationDescriptor>, CatalogError>;

/// One row of the rule table
pub struct Rule {
    pub name: &'static str,
    pub trigger: fn(Group) -> bool,
    resolve: Resolve,
}

/// The fixed rule table, applied in order
pub static RULES: &[Rule] = &[
    Rule {
        name: "angular-distance-to-linear",
        trigger: |g| g == Group::Distance(Motion::Angular),
        resolve: angular_to_linear,
    },
    Rule {
        name: "linear-distance-to-angular",
        trigger: |g| g == Group::Distance(Motion::Linear),
        resolve: linear_to_angular,
    },
    Rule {
        name: "angular-velocity-to-linear",
        trigger: |g| g == Group::Velocity(Motion::Angular),
        resolve: angular_to_linear,
    },
    Rule {
        name: "linear-velocity-to-angular",
        trigger: |g| g == Group::Velocity(Motion::Linear),
        resolve: linear_to_angular,
    },
    Rule {
        name: "angular-acceleration-to-linear",
        trigger: |g| g == Group::Acceleration(Motion::Angular),
        resolve: angular_to_linear,
    },
    Rule {
        name: "linear-acceleration-to-angular",
        trigger: |g| g == Group::Acceleration(Motion::Linear),
        resolve: linear_to_angular,
    },
    Rule {
        name: "integrate-over-own-time",
        trigger: |g| g.is_rate(),
        resolve: integrate,
    },
    Rule {
        name: "integrate-rates-by-time",
        trigger: |g| g == Group::Time,
        resolve: integrate_commuted,
    },
    Rule {
        name: "differentiate-by-time",
        trigger: |g| matches!(g, Group::Distance(_) | Group::Velocity(_)),
        resolve: differentiate,
    },
    Rule {
        name: "unitless-wildcard",
        trigger: |g| g.is_unitless(),
        resolve: unitless_wildcard,
    },
];

/// Every rule-derived operation of `owner`, in table order
pub fn resolve(
    lattice: &UnitLattice,
    owner: UnitId,
) -> Result<Vec<OperationDescriptor>, CatalogError> {
    let group = lattice[owner].group;
    let mut operations = Vec::new();
    for rule in RULES.iter().filter(|r| (r.trigger)(group)) {
        let ctx = RuleContext { lattice, rule: rule.name, owner };
        let emitted = (rule.resolve)(&ctx)?;
        debug!(
            rule = rule.name,
            unit = %lattice[owner].name,
            count = emitted.len(),
            "resolved rule"
        );
        operations.extend(emitted);
    }
    Ok(operations)
}

fn linear_radii(lattice: &UnitLattice) -> Vec<(UnitId, &UnitDefinition)> {
    lattice.group(Group::Distance(Motion::Linear)).collect()
}

/// Angular owner: normalize to radians (per own time), multiply by a radius
fn angular_to_linear(ctx: &RuleContext) -> Result<Vec<OperationDescriptor>, CatalogError> {
    let unit = ctx.unit();
    let arity = unit.components.len();
    let Some(linear) = unit.group.counterpart() else { return Ok(Vec::new()) };

    let radians = ctx.distance_base(Motion::Angular)?;
    let norm = ctx.unique(&Query::new(unit.group).pin(0, radians).pin_from(unit, 1..arity))?;
    let scale = ctx.factor_to(norm)?;

    let mut ops = Vec::new();
    for (radius_id, radius) in linear_radii(ctx.lattice) {
        let query = Query::new(linear)
            .pin(0, &radius.components[0])
            .pin_from(unit, 1..arity);
        let target = ctx.unique(&query)?;
        ops.push(
            OperationDescriptor::new(
                OperationKind::CrossDimensionConversion,
                ctx.owner,
                ResultType::Unit(target),
                Formula::ScaleThenMultiply { factor: scale },
            )
            .with_operand(OperandRole::Radius, radius_id),
        );
    }
    Ok(ops)
}

/// Linear owner: convert to the radius unit (per own time), divide by the radius
fn linear_to_angular(ctx: &RuleContext) -> Result<Vec<OperationDescriptor>, CatalogError> {
    let unit = ctx.unit();
    let arity = unit.components.len();
    let Some(angular) = unit.group.counterpart() else { return Ok(Vec::new()) };

    let radians = ctx.distance_base(Motion::Angular)?;
    let target = ctx.unique(&Query::new(angular).pin(0, radians).pin_from(unit, 1..arity))?;

    let mut ops = Vec::new();
    for (radius_id, radius) in linear_radii(ctx.lattice) {
        let query = Query::new(unit.group)
            .pin(0, &radius.components[0])
            .pin_from(unit, 1..arity);
        let norm = ctx.unique(&query)?;
        ops.push(
            OperationDescriptor::new(
                OperationKind::CrossDimensionConversion,
                ctx.owner,
                ResultType::Unit(target),
                Formula::ScaleThenDivide { factor: ctx.factor_to(norm)? },
            )
            .with_operand(OperandRole::Radius, radius_id),
        );
    }
    Ok(ops)
}

/// Rate owner: multiply by its own last time component, dropping it
fn integrate(ctx: &RuleContext) -> Result<Vec<OperationDescriptor>, CatalogError> {
    let unit = ctx.unit();
    let arity = unit.components.len();
    let (Some(lower), Some(last)) = (unit.group.integrated(), unit.last_component()) else {
        return Ok(Vec::new());
    };

    let duration = ctx.unique(&Query::new(Group::Time).pin(0, last))?;
    let result = ctx.unique(&Query::new(lower).pin_from(unit, 0..arity - 1))?;

    Ok(vec![
        OperationDescriptor::new(
            OperationKind::TimeIntegration,
            ctx.owner,
            ResultType::Unit(result),
            Formula::binary(BinaryOp::Mul),
        )
        .with_operand(OperandRole::Duration, duration),
    ])
}

/// Time owner: the commuted form of `integrate` for every rate ending in this time
fn integrate_commuted(ctx: &RuleContext) -> Result<Vec<OperationDescriptor>, CatalogError> {
    let time = &ctx.unit().components[0];

    let mut ops = Vec::new();
    for group in ctx.lattice.groups().into_iter().filter(|g| g.is_rate()) {
        let Some(lower) = group.integrated() else { continue };
        for (rate_id, rate) in ctx.lattice.group(group) {
            let ends_here = rate.last_component().map_or(false, |c| c.same_identity(time));
            if !ends_here {
                continue;
            }
            let arity = rate.components.len();
            let result = ctx.unique(&Query::new(lower).pin_from(rate, 0..arity - 1))?;
            ops.push(
                OperationDescriptor::new(
                    OperationKind::TimeIntegration,
                    ctx.owner,
                    ResultType::Unit(result),
                    Formula::binary(BinaryOp::Mul),
                )
                .with_operand(OperandRole::Measure, rate_id),
            );
        }
    }
    Ok(ops)
}

/// Distance or velocity owner: divide by any time unit
fn differentiate(ctx: &RuleContext) -> Result<Vec<OperationDescriptor>, CatalogError> {
    let unit = ctx.unit();
    let arity = unit.components.len();
    let Some(upper) = unit.group.per_time() else { return Ok(Vec::new()) };

    let mut ops = Vec::new();
    for (time_id, time) in ctx.lattice.group(Group::Time) {
        let query = Query::new(upper)
            .pin_from(unit, 0..arity)
            .pin(arity, &time.components[0]);
        let result = ctx.unique(&query)?;
        ops.push(
            OperationDescriptor::new(
                OperationKind::TimeDifferentiation,
                ctx.owner,
                ResultType::Unit(result),
                Formula::binary(BinaryOp::Div),
            )
            .with_operand(OperandRole::Duration, time_id),
        );
    }
    Ok(ops)
}

/// Unitless owner: same-magnitude arithmetic and comparison against every unit
fn unitless_wildcard(ctx: &RuleContext) -> Result<Vec<OperationDescriptor>, CatalogError> {
    let mut ops = Vec::new();
    for (id, unit) in ctx.lattice.iter() {
        if unit.group.is_unitless() {
            continue;
        }
        for binary in BinaryOp::ALL {
            ops.push(
                OperationDescriptor::new(
                    OperationKind::ScaleByUnitless,
                    ctx.owner,
                    ResultType::Unit(id),
                    Formula::binary(binary),
                )
                .with_operand(OperandRole::Measure, id),
            );
        }
        ops.push(
            OperationDescriptor::new(
                OperationKind::CompareUnitless,
                ctx.owner,
                ResultType::Ordering,
                Formula::Compare,
            )
            .with_operand(OperandRole::Measure, id),
        );
    }
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use measure_core::{Dimension, codes};
    use crate::{ComponentRegistry, Declarations};

    fn standard() -> UnitLattice {
        build(&Declarations::standard()).unwrap()
    }

    fn build(decl: &Declarations) -> Result<UnitLattice, CatalogError> {
        let reg = ComponentRegistry::build(decl)?;
        Ok(UnitLattice::build(&reg, decl)?)
    }

    fn id(lattice: &UnitLattice, name: &str) -> UnitId {
        lattice.find(name).unwrap_or_else(|| panic!("no unit {}", name))
    }

    fn of_kind(ops: &[OperationDescriptor], kind: OperationKind) -> Vec<&OperationDescriptor> {
        ops.iter().filter(|op| op.kind == kind).collect()
    }

    #[test]
    fn test_search_distinguishes_counts() {
        let lattice = standard();
        assert_eq!(search(&lattice, &Query::new(Group::Time).base()), Match::One(id(&lattice, "Seconds")));
        assert!(matches!(search(&lattice, &Query::new(Group::Time)), Match::Many(ids) if ids.len() == 4));

        let parsec = UnitComponent::new(Dimension::LinearDistance, "Parsec", "Parsecs", "pc", 1.2e18);
        assert_eq!(search(&lattice, &Query::new(Group::Distance(Motion::Linear)).pin(0, &parsec)), Match::None);
    }

    #[test]
    fn test_query_display() {
        let lattice = standard();
        let unit = &lattice[id(&lattice, "FeetPerMinPerSecond")];
        let query = Query::new(Group::Velocity(Motion::Linear)).base().pin_from(unit, 0..2);
        assert_eq!(query.to_string(), "velocity.linear[base, 0=Foot, 1=Min]");
    }

    #[test]
    fn test_angular_distance_to_linear() {
        let lattice = standard();
        let degrees = id(&lattice, "Degrees");
        let ops = resolve(&lattice, degrees).unwrap();
        let cross = of_kind(&ops, OperationKind::CrossDimensionConversion);

        assert_eq!(cross.len(), 4);
        for op in &cross {
            let radius = op.operand().unwrap();
            assert_eq!(radius.role, OperandRole::Radius);
            // Result is typed as the radius unit
            assert_eq!(op.result, ResultType::Unit(radius.unit));
            match op.formula {
                Formula::ScaleThenMultiply { factor } => {
                    assert!((factor - std::f64::consts::PI / 180.0).abs() < 1e-15)
                }
                other => panic!("unexpected formula {:?}", other),
            }
        }
    }

    #[test]
    fn test_linear_distance_to_angular() {
        let lattice = standard();
        let feet = id(&lattice, "Feet");
        let radians = id(&lattice, "Radians");
        let ops = resolve(&lattice, feet).unwrap();
        let cross = of_kind(&ops, OperationKind::CrossDimensionConversion);

        assert_eq!(cross.len(), 4);
        assert!(cross.iter().all(|op| op.result == ResultType::Unit(radians)));
        let by_inches = cross.iter().find(|op| op.operands[0].unit == id(&lattice, "Inches")).unwrap();
        assert_eq!(by_inches.formula, Formula::ScaleThenDivide { factor: 12.0 });
    }

    #[test]
    fn test_angular_velocity_to_linear_targets() {
        let lattice = standard();
        let owner = id(&lattice, "RevsPerMin");
        let ops = resolve(&lattice, owner).unwrap();
        let cross = of_kind(&ops, OperationKind::CrossDimensionConversion);

        let targets: Vec<&str> = cross.iter().map(|op| lattice[op.result_unit().unwrap()].name.as_str()).collect();
        assert_eq!(targets, vec!["InchesPerMin", "MetersPerMin", "CentimetersPerMin", "FeetPerMin"]);
    }

    #[test]
    fn test_linear_acceleration_to_angular_target() {
        let lattice = standard();
        let owner = id(&lattice, "MetersPerMsPerMin");
        let ops = resolve(&lattice, owner).unwrap();
        let cross = of_kind(&ops, OperationKind::CrossDimensionConversion);
        let target = id(&lattice, "RadiansPerMsPerMin");

        assert_eq!(cross.len(), 4);
        assert!(cross.iter().all(|op| op.result == ResultType::Unit(target)));
    }

    #[test]
    fn test_integrate_velocity() {
        let lattice = standard();
        let owner = id(&lattice, "MetersPerSecond");
        let ops = resolve(&lattice, owner).unwrap();
        let integration = of_kind(&ops, OperationKind::TimeIntegration);

        assert_eq!(integration.len(), 1);
        assert_eq!(integration[0].operands[0].unit, id(&lattice, "Seconds"));
        assert_eq!(integration[0].operands[0].role, OperandRole::Duration);
        assert_eq!(integration[0].result, ResultType::Unit(id(&lattice, "Meters")));
    }

    #[test]
    fn test_integrate_acceleration_drops_last_time() {
        let lattice = standard();
        let owner = id(&lattice, "DegreesPerSecondPerMin");
        let ops = resolve(&lattice, owner).unwrap();
        let integration = of_kind(&ops, OperationKind::TimeIntegration);

        assert_eq!(integration.len(), 1);
        assert_eq!(integration[0].operands[0].unit, id(&lattice, "Mins"));
        assert_eq!(integration[0].result, ResultType::Unit(id(&lattice, "DegreesPerSecond")));
    }

    #[test]
    fn test_time_owns_commuted_integration() {
        let lattice = standard();
        let owner = id(&lattice, "Ms");
        let ops = resolve(&lattice, owner).unwrap();

        // 4 linear + 5 angular velocities, 16 linear + 20 angular accelerations end in Ms
        assert_eq!(ops.len(), 4 + 5 + 16 + 20);
        let first = &ops[0];
        assert_eq!(first.operands[0].unit, id(&lattice, "InchesPerMs"));
        assert_eq!(first.result, ResultType::Unit(id(&lattice, "Inches")));
        assert!(ops.iter().all(|op| op.operands[0].role == OperandRole::Measure));
    }

    #[test]
    fn test_differentiate() {
        let lattice = standard();
        let owner = id(&lattice, "DegreesPerMs");
        let ops = resolve(&lattice, owner).unwrap();
        let diff = of_kind(&ops, OperationKind::TimeDifferentiation);

        let targets: Vec<&str> = diff.iter().map(|op| lattice[op.result_unit().unwrap()].name.as_str()).collect();
        assert_eq!(targets, vec![
            "DegreesPerMsPerSecond",
            "DegreesPerMsPerMs",
            "DegreesPerMsPerMin",
            "DegreesPerMsPer100Ms",
        ]);
    }

    #[test]
    fn test_unitless_wildcard() {
        let lattice = standard();
        let owner = id(&lattice, "Unitless");
        let ops = resolve(&lattice, owner).unwrap();

        assert_eq!(ops.len(), (lattice.len() - 1) * 5);
        assert_eq!(of_kind(&ops, OperationKind::CompareUnitless).len(), lattice.len() - 1);
        assert!(ops.iter().all(|op| op.operands[0].unit != owner));
    }

    #[test]
    fn test_mass_has_no_rules() {
        let lattice = standard();
        assert!(resolve(&lattice, id(&lattice, "Pounds")).unwrap().is_empty());
    }

    #[test]
    fn test_missing_derivation_is_no_match() {
        let decl = Declarations::builder()
            .dimension(Dimension::LinearDistance, vec![
                UnitComponent::new(Dimension::LinearDistance, "Inch", "Inches", "in", 1.0),
            ])
            .dimension(Dimension::AngularDistance, vec![
                UnitComponent::new(Dimension::AngularDistance, "Radian", "Radians", "rad", 1.0),
            ])
            .dimension(Dimension::Time, vec![
                UnitComponent::new(Dimension::Time, "Second", "Seconds", "s", 1.0),
            ])
            .per_time(Group::Velocity(Motion::Linear), Group::Distance(Motion::Linear))
            .build();
        let lattice = build(&decl).unwrap();
        let err = resolve(&lattice, id(&lattice, "InchesPerSecond")).unwrap_err();

        assert_eq!(err.code(), codes::NO_MATCH);
        let message = err.to_string();
        assert!(message.contains("InchesPerSecond"), "{}", message);
        assert!(message.contains("velocity.angular"), "{}", message);
    }

    #[test]
    fn test_duplicate_names_are_ambiguous() {
        let d = Dimension::LinearDistance;
        let decl = Declarations::builder()
            .dimension(d, vec![
                UnitComponent::new(d, "Inch", "Inches", "in", 1.0),
                UnitComponent::new(d, "Inch", "Inchs", "in", 2.54),
            ])
            .dimension(Dimension::AngularDistance, vec![
                UnitComponent::new(Dimension::AngularDistance, "Radian", "Radians", "rad", 1.0),
            ])
            .build();
        let lattice = build(&decl).unwrap();
        let owner = id(&lattice, "Inches");

        match resolve(&lattice, owner).unwrap_err() {
            CatalogError::Rule(RuleError::AmbiguousMatch { rule, candidates, .. }) => {
                assert_eq!(rule, "linear-distance-to-angular");
                assert_eq!(candidates, vec!["Inches".to_string(), "Inchs".to_string()]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_rule_totality_for_standard_rates() {
        let lattice = standard();
        for (owner, unit) in lattice.iter().filter(|(_, u)| u.group.is_rate()) {
            let ops = resolve(&lattice, owner).unwrap();
            assert_eq!(of_kind(&ops, OperationKind::TimeIntegration).len(), 1, "{}", unit.name);
            assert_eq!(of_kind(&ops, OperationKind::CrossDimensionConversion).len(), 4, "{}", unit.name);
        }
    }
}
