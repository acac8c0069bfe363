//! Structured representation of a single zman calculation method.
//!
//! A zman formula is persisted as source text, but the guided editor works on a
//! [`CalculationMethod`]: exactly one of four method variants together with its parameters. Every
//! parameter type in this module is validated when it is constructed, so a `CalculationMethod`
//! value always describes something the generator can render and the parser can read back.
//!
//! ```rust
//! use zman_formula::formula::{CalculationMethod, Degrees, SolarDirection};
//!
//! let alos = CalculationMethod::SolarAngle {
//!     degrees: Degrees::new(16.1).unwrap(),
//!     direction: SolarDirection::BeforeSunrise,
//! };
//!
//! assert_eq!(alos.to_string(), "solar(16.1, before_sunrise)");
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ordered_float::NotNan;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A parameter of a [`CalculationMethod`] that can be edited on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Degrees,
    SolarDirection,
    Minutes,
    OffsetDirection,
    Base,
    Hours,
    ProportionalBase,
    CustomStart,
    CustomEnd,
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Degrees => "degrees",
            Field::SolarDirection => "solar direction",
            Field::Minutes => "minutes",
            Field::OffsetDirection => "offset direction",
            Field::Base => "base",
            Field::Hours => "hours",
            Field::ProportionalBase => "proportional base",
            Field::CustomStart => "custom start",
            Field::CustomEnd => "custom end",
        };

        f.write_str(name)
    }
}

/// Rejection of a raw value supplied for one of the fields of a [`CalculationMethod`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct InvalidField {
    pub field: Field,
    pub reason: String,
}

impl InvalidField {
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Name of an astronomical event or of another zman, `letter (letter | digit | "_")*`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(try_from = "String", into = "String"))]
pub struct Identifier(String);

impl Identifier {
    pub(crate) fn is_start(c: char) -> bool {
        c.is_ascii_alphabetic()
    }

    pub(crate) fn is_continue(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_'
    }

    pub fn new(name: impl Into<String>) -> Result<Self, InvalidField> {
        Self::for_field(Field::Name, name)
    }

    pub(crate) fn for_field(field: Field, name: impl Into<String>) -> Result<Self, InvalidField> {
        let name = name.into();
        let mut chars = name.chars();

        let Some(first) = chars.next() else {
            return Err(InvalidField::new(field, "identifier is empty"));
        };

        if !Self::is_start(first) {
            return Err(InvalidField::new(
                field,
                format!("identifier \"{name}\" must start with a letter"),
            ));
        }

        if !chars.all(Self::is_continue) {
            return Err(InvalidField::new(
                field,
                format!("identifier \"{name}\" may only contain letters, digits and '_'"),
            ));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = InvalidField;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identifier::new(value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

/// A named point in time a formula can be anchored to.
///
/// `Event` is a bare astronomical primitive such as `sunrise`; `Zman` is a reference to another
/// zman written with a leading `@`. Both spellings are kept apart so that the generator can
/// reproduce the `@` exactly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(try_from = "String", into = "String"))]
pub enum Reference {
    Event(Identifier),
    Zman(Identifier),
}

impl Reference {
    pub fn event(name: &str) -> Result<Self, InvalidField> {
        Identifier::new(name).map(Reference::Event)
    }

    pub fn zman(key: &str) -> Result<Self, InvalidField> {
        Identifier::new(key).map(Reference::Zman)
    }

    pub fn identifier(&self) -> &Identifier {
        match self {
            Reference::Event(name) | Reference::Zman(name) => name,
        }
    }

    pub fn is_zman(&self) -> bool {
        matches!(self, Reference::Zman(_))
    }

    pub(crate) fn parse_for(field: Field, input: &str) -> Result<Self, InvalidField> {
        match input.strip_prefix('@') {
            Some(key) => Identifier::for_field(field, key).map(Reference::Zman),
            None => Identifier::for_field(field, input).map(Reference::Event),
        }
    }
}

impl FromStr for Reference {
    type Err = InvalidField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Reference::parse_for(Field::Name, s)
    }
}

impl TryFrom<String> for Reference {
    type Error = InvalidField;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Reference> for String {
    fn from(value: Reference) -> Self {
        value.to_string()
    }
}

fn positive(field: Field, value: f64) -> Result<NotNan<f64>, InvalidField> {
    if !value.is_finite() {
        return Err(InvalidField::new(field, format!("{value} is not a finite number")));
    }

    if value <= 0.0 {
        return Err(InvalidField::new(field, format!("{value} must be greater than zero")));
    }

    NotNan::new(value).map_err(|err| InvalidField::new(field, err.to_string()))
}

/// Solar depression angle in degrees, always finite and greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(try_from = "f64", into = "f64"))]
pub struct Degrees(NotNan<f64>);

impl Degrees {
    pub fn new(value: f64) -> Result<Self, InvalidField> {
        positive(Field::Degrees, value).map(Self)
    }

    pub fn value(self) -> f64 {
        self.0.into_inner()
    }
}

impl TryFrom<f64> for Degrees {
    type Error = InvalidField;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Degrees::new(value)
    }
}

impl From<Degrees> for f64 {
    fn from(value: Degrees) -> Self {
        value.value()
    }
}

/// Count of proportional ("halachic") hours, finite and greater than zero.
///
/// Values are conventionally no larger than 12, but that is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(try_from = "f64", into = "f64"))]
pub struct Hours(NotNan<f64>);

impl Hours {
    pub fn new(value: f64) -> Result<Self, InvalidField> {
        positive(Field::Hours, value).map(Self)
    }

    pub fn value(self) -> f64 {
        self.0.into_inner()
    }
}

impl TryFrom<f64> for Hours {
    type Error = InvalidField;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Hours::new(value)
    }
}

impl From<Hours> for f64 {
    fn from(value: Hours) -> Self {
        value.value()
    }
}

/// Whole number of clock minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Minutes(u32);

impl Minutes {
    pub const fn new(minutes: u32) -> Self {
        Self(minutes)
    }

    /// Convert raw editor input, rejecting negative or oversized counts.
    pub fn from_input(minutes: i64) -> Result<Self, InvalidField> {
        u32::try_from(minutes).map(Self).map_err(|_| {
            let reason = if minutes < 0 {
                format!("{minutes} must not be negative")
            } else {
                format!("{minutes} is too large")
            };

            InvalidField::new(Field::Minutes, reason)
        })
    }

    /// Accept a parsed number like `72` or `72.0`, rejecting fractional minutes.
    pub fn from_number(value: f64) -> Result<Self, InvalidField> {
        if value.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&value) {
            return Err(InvalidField::new(Field::Minutes, format!("{value} is not a whole number of minutes")));
        }

        Ok(Self(value as u32))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum SolarDirection {
    BeforeSunrise,
    AfterSunset,
    BeforeNoon,
    AfterNoon,
}

impl SolarDirection {
    pub const ALL: [SolarDirection; 4] = [
        SolarDirection::BeforeSunrise,
        SolarDirection::AfterSunset,
        SolarDirection::BeforeNoon,
        SolarDirection::AfterNoon,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            SolarDirection::BeforeSunrise => "before_sunrise",
            SolarDirection::AfterSunset => "after_sunset",
            SolarDirection::BeforeNoon => "before_noon",
            SolarDirection::AfterNoon => "after_noon",
        }
    }
}

impl FromStr for SolarDirection {
    type Err = InvalidField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SolarDirection::ALL
            .into_iter()
            .find(|direction| direction.keyword() == s)
            .ok_or_else(|| InvalidField::new(Field::SolarDirection, format!("unknown direction \"{s}\"")))
    }
}

/// Direction of a fixed clock offset, carried in source text only by the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum OffsetDirection {
    Before,
    After,
}

impl OffsetDirection {
    pub fn sign(self) -> char {
        match self {
            OffsetDirection::Before => '-',
            OffsetDirection::After => '+',
        }
    }

    pub fn from_sign(sign: char) -> Option<Self> {
        match sign {
            '-' => Some(OffsetDirection::Before),
            '+' => Some(OffsetDirection::After),
            _ => None,
        }
    }
}

/// The day a proportional hour is measured against.
///
/// `Custom` bounds are always references to other zmanim and are rendered with `@`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "system", rename_all = "snake_case")
)]
pub enum ProportionalBase {
    Gra,
    Mga,
    Custom {
        #[cfg_attr(feature = "serde", serde(with = "zman_key"))]
        start: Identifier,
        #[cfg_attr(feature = "serde", serde(with = "zman_key"))]
        end: Identifier,
    },
}

/// Custom bounds are written as `"@key"`, the same as [`Reference::Zman`].
#[cfg(feature = "serde")]
mod zman_key {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Identifier;

    pub fn serialize<S>(key: &Identifier, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("@{key}"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Identifier, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;

        match raw.strip_prefix('@') {
            Some(key) => Identifier::new(key).map_err(D::Error::custom),
            None => Err(D::Error::custom(format!(
                "custom bound \"{raw}\" must be an @-prefixed zman reference"
            ))),
        }
    }
}

impl ProportionalBase {
    pub fn custom(start: &str, end: &str) -> Result<Self, InvalidField> {
        Ok(ProportionalBase::Custom {
            start: Identifier::for_field(Field::CustomStart, start)?,
            end: Identifier::for_field(Field::CustomEnd, end)?,
        })
    }
}

/// Discriminant of [`CalculationMethod`], used when switching methods in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum MethodKind {
    FixedReference,
    SolarAngle,
    FixedOffset,
    ProportionalHours,
}

impl Display for MethodKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MethodKind::FixedReference => "fixed reference",
            MethodKind::SolarAngle => "solar angle",
            MethodKind::FixedOffset => "fixed offset",
            MethodKind::ProportionalHours => "proportional hours",
        };

        f.write_str(name)
    }
}

/// One calculation method together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "method", rename_all = "snake_case")
)]
pub enum CalculationMethod {
    FixedReference {
        name: Reference,
    },
    SolarAngle {
        degrees: Degrees,
        direction: SolarDirection,
    },
    FixedOffset {
        minutes: Minutes,
        direction: OffsetDirection,
        base: Reference,
    },
    ProportionalHours {
        hours: Hours,
        base: ProportionalBase,
    },
}

impl CalculationMethod {
    pub fn kind(&self) -> MethodKind {
        match self {
            CalculationMethod::FixedReference { .. } => MethodKind::FixedReference,
            CalculationMethod::SolarAngle { .. } => MethodKind::SolarAngle,
            CalculationMethod::FixedOffset { .. } => MethodKind::FixedOffset,
            CalculationMethod::ProportionalHours { .. } => MethodKind::ProportionalHours,
        }
    }

    /// Keys of the other zmanim this method depends on, in source order.
    pub fn zman_references(&self) -> Vec<&Identifier> {
        match self {
            CalculationMethod::FixedReference { name: Reference::Zman(key) } => vec![key],
            CalculationMethod::FixedOffset {
                base: Reference::Zman(key),
                ..
            } => vec![key],
            CalculationMethod::ProportionalHours {
                base: ProportionalBase::Custom { start, end },
                ..
            } => vec![start, end],
            _ => Vec::new(),
        }
    }
}
