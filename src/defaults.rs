//! Parameters used when the editor switches to a calculation method.
//!
//! Hosts that load their editor configuration from a file can deserialize a [`MethodDefaults`]
//! with the `serde` feature enabled; missing keys fall back to the values of
//! [`MethodDefaults::default`]. Values are kept raw and checked when a method is built from them.

use crate::formula::{
    CalculationMethod, Degrees, Field, Hours, InvalidField, MethodKind, Minutes, OffsetDirection, ProportionalBase,
    Reference, SolarDirection,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct MethodDefaults {
    pub reference: String,
    pub solar_degrees: f64,
    pub solar_direction: SolarDirection,
    pub offset_minutes: u32,
    pub offset_direction: OffsetDirection,
    pub offset_base: String,
    pub proportional_hours: f64,
    pub proportional_base: ProportionalBase,
}

impl Default for MethodDefaults {
    fn default() -> Self {
        Self {
            reference: "sunrise".to_string(),
            solar_degrees: 16.1,
            solar_direction: SolarDirection::BeforeSunrise,
            offset_minutes: 72,
            offset_direction: OffsetDirection::Before,
            offset_base: "sunrise".to_string(),
            proportional_hours: 3.0,
            proportional_base: ProportionalBase::Gra,
        }
    }
}

impl MethodDefaults {
    /// Build a fresh method of the given kind from these defaults.
    pub fn method(&self, kind: MethodKind) -> Result<CalculationMethod, InvalidField> {
        let method = match kind {
            MethodKind::FixedReference => CalculationMethod::FixedReference {
                name: Reference::parse_for(Field::Name, &self.reference)?,
            },
            MethodKind::SolarAngle => CalculationMethod::SolarAngle {
                degrees: Degrees::new(self.solar_degrees)?,
                direction: self.solar_direction,
            },
            MethodKind::FixedOffset => CalculationMethod::FixedOffset {
                minutes: Minutes::new(self.offset_minutes),
                direction: self.offset_direction,
                base: Reference::parse_for(Field::Base, &self.offset_base)?,
            },
            MethodKind::ProportionalHours => CalculationMethod::ProportionalHours {
                hours: Hours::new(self.proportional_hours)?,
                base: self.proportional_base.clone(),
            },
        };

        Ok(method)
    }

    /// Check every default at once, e.g. right after loading a configuration file.
    pub fn validate(&self) -> Result<(), InvalidField> {
        [
            MethodKind::FixedReference,
            MethodKind::SolarAngle,
            MethodKind::FixedOffset,
            MethodKind::ProportionalHours,
        ]
        .into_iter()
        .try_for_each(|kind| self.method(kind).map(drop))
    }
}
