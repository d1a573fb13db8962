//! Dimensions and group shapes
//!
//! A `Dimension` is one of the declared physical base quantities. A `Group`
//! is the shape shared by sibling unit definitions: the ordered dimensions of
//! their components. Leaf groups have one component; velocity and acceleration
//! are derived by dividing by time once or twice.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::ConfigError;

/// Physical base quantity a component belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    LinearDistance,
    AngularDistance,
    Time,
    Mass,
    Unitless,
}

impl Dimension {
    /// The group holding one simple definition per component of this dimension
    pub fn leaf_group(&self) -> Group {
        match self {
            Dimension::LinearDistance => Group::Distance(Motion::Linear),
            Dimension::AngularDistance => Group::Distance(Motion::Angular),
            Dimension::Time => Group::Time,
            Dimension::Mass => Group::Mass,
            Dimension::Unitless => Group::Unitless,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dimension::LinearDistance => "linear_distance",
            Dimension::AngularDistance => "angular_distance",
            Dimension::Time => "time",
            Dimension::Mass => "mass",
            Dimension::Unitless => "unitless",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Linear or angular flavor of a distance-derived group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Linear,
    Angular,
}

impl Motion {
    pub fn other(&self) -> Motion {
        match self {
            Motion::Linear => Motion::Angular,
            Motion::Angular => Motion::Linear,
        }
    }

    pub fn distance(&self) -> Dimension {
        match self {
            Motion::Linear => Dimension::LinearDistance,
            Motion::Angular => Dimension::AngularDistance,
        }
    }

    fn segment(&self) -> &'static str {
        match self {
            Motion::Linear => "linear",
            Motion::Angular => "angular",
        }
    }
}

/// Shape identifying a family of sibling unit definitions
///
/// Serialized as its dotted path (`distance.linear`, `velocity.angular`,
/// `time`, or the empty string for unitless).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Group {
    Unitless,
    Distance(Motion),
    Time,
    Mass,
    Velocity(Motion),
    Acceleration(Motion),
}

impl Group {
    /// Dotted path of the group
    pub fn path(&self) -> String {
        match self {
            Group::Unitless => String::new(),
            Group::Distance(m) => format!("distance.{}", m.segment()),
            Group::Time => "time".to_string(),
            Group::Mass => "mass".to_string(),
            Group::Velocity(m) => format!("velocity.{}", m.segment()),
            Group::Acceleration(m) => format!("acceleration.{}", m.segment()),
        }
    }

    /// Per-position dimensions of every definition in this group
    pub fn shape(&self) -> Vec<Dimension> {
        match self {
            Group::Unitless => vec![Dimension::Unitless],
            Group::Distance(m) => vec![m.distance()],
            Group::Time => vec![Dimension::Time],
            Group::Mass => vec![Dimension::Mass],
            Group::Velocity(m) => vec![m.distance(), Dimension::Time],
            Group::Acceleration(m) => vec![m.distance(), Dimension::Time, Dimension::Time],
        }
    }

    /// Group obtained by dividing by one more time component
    pub fn per_time(&self) -> Option<Group> {
        match self {
            Group::Distance(m) => Some(Group::Velocity(*m)),
            Group::Velocity(m) => Some(Group::Acceleration(*m)),
            _ => None,
        }
    }

    /// Group obtained by multiplying away the last time component
    pub fn integrated(&self) -> Option<Group> {
        match self {
            Group::Velocity(m) => Some(Group::Distance(*m)),
            Group::Acceleration(m) => Some(Group::Velocity(*m)),
            _ => None,
        }
    }

    /// Same shape with the other motion flavor
    pub fn counterpart(&self) -> Option<Group> {
        match self {
            Group::Distance(m) => Some(Group::Distance(m.other())),
            Group::Velocity(m) => Some(Group::Velocity(m.other())),
            Group::Acceleration(m) => Some(Group::Acceleration(m.other())),
            _ => None,
        }
    }

    pub fn is_unitless(&self) -> bool {
        matches!(self, Group::Unitless)
    }

    /// Velocity or acceleration
    pub fn is_rate(&self) -> bool {
        matches!(self, Group::Velocity(_) | Group::Acceleration(_))
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Unitless => write!(f, "<unitless>"),
            other => write!(f, "{}", other.path()),
        }
    }
}

impl FromStr for Group {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let group = match s.trim() {
            "" => Group::Unitless,
            "distance.linear" => Group::Distance(Motion::Linear),
            "distance.angular" => Group::Distance(Motion::Angular),
            "time" => Group::Time,
            "mass" => Group::Mass,
            "velocity.linear" => Group::Velocity(Motion::Linear),
            "velocity.angular" => Group::Velocity(Motion::Angular),
            "acceleration.linear" => Group::Acceleration(Motion::Linear),
            "acceleration.angular" => Group::Acceleration(Motion::Angular),
            other => return Err(ConfigError::UnknownGroup(other.to_string())),
        };
        Ok(group)
    }
}

impl TryFrom<String> for Group {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Group> for String {
    fn from(group: Group) -> Self {
        group.path()
    }
}
