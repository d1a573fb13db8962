//! Static declarations: the dimensions, their components, and the derived groups
//!
//! `Declarations` is an immutable value. Build it once with
//! `Declarations::builder()` (or deserialize it from JSON) and hand it to
//! `compile`. Declaration order is preserved everywhere downstream.

use std::f64::consts::PI;
use serde::{Serialize, Deserialize};
use measure_core::{Dimension, Group, Motion, UnitComponent};

/// Components declared for one dimension, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDecl {
    pub dimension: Dimension,
    pub components: Vec<UnitComponent>,
}

/// A derived group formed as `upper` per `lower`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    pub group: Group,
    pub upper: Group,
    pub lower: Group,
}

/// Full static description consumed by the compiler
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Declarations {
    dimensions: Vec<DimensionDecl>,
    #[serde(default)]
    derivations: Vec<Derivation>,
}

impl Declarations {
    pub fn builder() -> DeclarationsBuilder {
        DeclarationsBuilder::default()
    }

    pub fn dimensions(&self) -> &[DimensionDecl] {
        &self.dimensions
    }

    pub fn derivations(&self) -> &[Derivation] {
        &self.derivations
    }

    /// The built-in unit set
    pub fn standard() -> Self {
        let builder = Declarations::builder();
        let builder = register_unitless(builder);
        let builder = register_linear_distance(builder);
        let builder = register_angular_distance(builder);
        let builder = register_time(builder);
        let builder = register_mass(builder);

        builder
            .per_time(Group::Velocity(Motion::Linear), Group::Distance(Motion::Linear))
            .per_time(Group::Velocity(Motion::Angular), Group::Distance(Motion::Angular))
            .per_time(Group::Acceleration(Motion::Linear), Group::Velocity(Motion::Linear))
            .per_time(Group::Acceleration(Motion::Angular), Group::Velocity(Motion::Angular))
            .build()
    }
}

/// Consuming builder for `Declarations`
#[derive(Debug, Default)]
pub struct DeclarationsBuilder {
    inner: Declarations,
}

impl DeclarationsBuilder {
    /// Declare the components of one dimension
    pub fn dimension(mut self, dimension: Dimension, components: Vec<UnitComponent>) -> Self {
        self.inner.dimensions.push(DimensionDecl { dimension, components });
        self
    }

    /// Declare `group` as the cross product of `upper` per `lower`
    pub fn derive(mut self, group: Group, upper: Group, lower: Group) -> Self {
        self.inner.derivations.push(Derivation { group, upper, lower });
        self
    }

    /// Declare `group` as `upper` per time
    pub fn per_time(self, group: Group, upper: Group) -> Self {
        self.derive(group, upper, Group::Time)
    }

    pub fn build(self) -> Declarations {
        self.inner
    }
}

fn register_unitless(builder: DeclarationsBuilder) -> DeclarationsBuilder {
    let d = Dimension::Unitless;
    builder.dimension(d, vec![
        UnitComponent::new(d, "Unitless", "Unitless", "ul", 1.0),
    ])
}

fn register_linear_distance(builder: DeclarationsBuilder) -> DeclarationsBuilder {
    let d = Dimension::LinearDistance;
    builder.dimension(d, vec![
        UnitComponent::new(d, "Inch", "Inches", "in", 1.0),
        UnitComponent::new(d, "Meter", "Meters", "m", 39.3701),
        UnitComponent::new(d, "Centimeter", "Centimeters", "cm", 0.393701),
        UnitComponent::new(d, "Foot", "Feet", "ft", 12.0),
    ])
}

fn register_angular_distance(builder: DeclarationsBuilder) -> DeclarationsBuilder {
    let d = Dimension::AngularDistance;
    builder.dimension(d, vec![
        UnitComponent::new(d, "Radian", "Radians", "rad", 1.0),
        UnitComponent::new(d, "Degree", "Degrees", "deg", PI / 180.0),
        UnitComponent::new(d, "Rev", "Revs", "rev", 2.0 * PI),
        // Magnetic encoder counts
        UnitComponent::new(d, "Tick12Bit", "Ticks12Bit", "ticks12b", (2.0 * PI) / 4096.0),
        UnitComponent::new(d, "Tick13Bit", "Ticks13Bit", "ticks13b", (2.0 * PI) / 8192.0),
    ])
}

fn register_time(builder: DeclarationsBuilder) -> DeclarationsBuilder {
    let d = Dimension::Time;
    builder.dimension(d, vec![
        UnitComponent::new(d, "Second", "Seconds", "s", 1.0),
        UnitComponent::new(d, "Ms", "Ms", "ms", 0.001),
        UnitComponent::new(d, "Min", "Mins", "min", 60.0),
        UnitComponent::new(d, "100Ms", "100Ms", "100 ms", 0.1),
    ])
}

fn register_mass(builder: DeclarationsBuilder) -> DeclarationsBuilder {
    let d = Dimension::Mass;
    builder.dimension(d, vec![
        UnitComponent::new(d, "Kilogram", "Kilograms", "kg", 1.0),
        UnitComponent::new(d, "Pound", "Pounds", "lbmass", 0.45359237),
    ])
}
