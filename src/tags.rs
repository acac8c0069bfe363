//! Display tags derived from a parsed formula, e.g. `GRA` for `shaos(3, gra)`.
//!
//! Tags are read off the structured method rather than the text, so an identifier such as
//! `@graveyard_shift` never produces a `GRA` tag. Formulas the parser cannot represent get no
//! tags at all.

use std::fmt::{Display, Formatter};

use crate::formula::{CalculationMethod, ProportionalBase};
use crate::parser::parse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    Gra,
    Mga,
    CustomHours,
    SolarAngle,
    FixedMinutes,
    ZmanReference,
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Tag::Gra => "GRA",
            Tag::Mga => "MGA",
            Tag::CustomHours => "Custom hours",
            Tag::SolarAngle => "Solar angle",
            Tag::FixedMinutes => "Fixed minutes",
            Tag::ZmanReference => "Zman reference",
        };

        f.write_str(label)
    }
}

pub fn tags(method: &CalculationMethod) -> Vec<Tag> {
    let mut tags = match method {
        CalculationMethod::FixedReference { .. } => Vec::new(),
        CalculationMethod::SolarAngle { .. } => vec![Tag::SolarAngle],
        CalculationMethod::FixedOffset { .. } => vec![Tag::FixedMinutes],
        CalculationMethod::ProportionalHours { base, .. } => match base {
            ProportionalBase::Gra => vec![Tag::Gra],
            ProportionalBase::Mga => vec![Tag::Mga],
            ProportionalBase::Custom { .. } => vec![Tag::CustomHours],
        },
    };

    if !method.zman_references().is_empty() {
        tags.push(Tag::ZmanReference);
    }

    tags
}

/// Tags for raw formula text; empty when the text cannot be parsed into a method.
pub fn tags_for_text(text: &str) -> Vec<Tag> {
    parse(text).structured().map(|method| tags(&method)).unwrap_or_default()
}
