//! Reconstruction of a [`CalculationMethod`] from formula source text.
//!
//! The parser accepts exactly the constructs the generator can emit, with free whitespace between
//! tokens and `3.0` accepted wherever `3` is. Anything else, including text that may be perfectly
//! valid for the evaluation service, becomes [`ParseOutcome::Unrepresentable`] so the editor can
//! fall back to showing the raw source. Parsing never fails in any other way.
//!
//! ```rust
//! use zman_formula::parser::{parse, ParseOutcome};
//!
//! assert!(parse("sunrise - 72min").is_structured());
//! assert!(matches!(parse("solar(16.1"), ParseOutcome::Unrepresentable { .. }));
//! ```

mod common;
mod method;

use nom::character::complete::multispace0;
use nom::combinator::all_consuming;
use nom::sequence::delimited;
use nom::IResult;

use crate::formula::CalculationMethod;

pub use common::scan_references;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The text maps onto a method the guided editor can display.
    Structured(CalculationMethod),

    /// The text must be shown as raw source; `reason` is a short message for the user.
    Unrepresentable { reason: String },
}

impl ParseOutcome {
    fn unrepresentable(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::trace!(%reason, "formula is not representable in structured form");

        ParseOutcome::Unrepresentable { reason }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, ParseOutcome::Structured(_))
    }

    pub fn structured(self) -> Option<CalculationMethod> {
        match self {
            ParseOutcome::Structured(method) => Some(method),
            ParseOutcome::Unrepresentable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ParseOutcome::Structured(_) => None,
            ParseOutcome::Unrepresentable { reason } => Some(reason),
        }
    }
}

type Production = fn(&str) -> IResult<&str, method::Built>;

// Tried in order; the first production that consumes the whole text wins.
const PRODUCTIONS: [Production; 4] = [
    method::solar_call,
    method::shaos_call,
    method::offset_expr,
    method::fixed_reference,
];

// A bare reference is a prefix of nearly any text, so only these are reported as complete prefixes.
const COMPOUND: [Production; 3] = [method::solar_call, method::shaos_call, method::offset_expr];

/// Parse formula source text into its structured form.
pub fn parse(text: &str) -> ParseOutcome {
    for production in PRODUCTIONS {
        let mut parser = all_consuming(delimited(multispace0, production, multispace0));

        if let Ok((_, built)) = parser(text) {
            return match built {
                Ok(method) => ParseOutcome::Structured(method),
                Err(invalid) => ParseOutcome::unrepresentable(invalid.to_string()),
            };
        }
    }

    // The grammar only skips ASCII whitespace, so any other blank character is content.
    let text = text.trim_matches(|c: char| c.is_ascii_whitespace());

    if let Some((matched, rest)) = complete_prefix(text) {
        return ParseOutcome::unrepresentable(format!("unexpected text \"{rest}\" after {matched}"));
    }

    ParseOutcome::unrepresentable(diagnose(text))
}

/// Split `text` after the first compound method it starts with, when something follows it.
fn complete_prefix(text: &str) -> Option<(&str, &str)> {
    COMPOUND.into_iter().find_map(|production| match production(text) {
        Ok((rest, Ok(_))) if !rest.is_empty() => {
            let matched = &text[..text.len() - rest.len()];
            Some((matched.trim_end(), rest.trim_start()))
        }
        _ => None,
    })
}

fn diagnose(text: &str) -> &'static str {
    let opened = text.matches('(').count();
    let closed = text.matches(')').count();

    if text.is_empty() {
        "formula is empty"
    } else if opened != closed {
        "unbalanced parentheses"
    } else if text.starts_with("solar") {
        "solar(...) takes a positive angle and one of before_sunrise, after_sunset, before_noon or after_noon"
    } else if text.starts_with("shaos") && text.contains("custom") {
        "custom(...) bounds must both be @-prefixed zman references"
    } else if text.starts_with("shaos") {
        "shaos(...) takes a positive number of hours and gra, mga or custom(@start, @end)"
    } else if text.ends_with("min") {
        "offsets are written as <reference> - <minutes>min or <reference> + <minutes>min"
    } else if opened > 0 {
        "uses a function the guided editor does not support"
    } else {
        "uses an operator or expression the guided editor does not support"
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::{parse, ParseOutcome};
    use crate::formula::*;

    fn reason(text: &str) -> String {
        match parse(text) {
            ParseOutcome::Unrepresentable { reason } => reason,
            ParseOutcome::Structured(method) => panic!("{text:?} parsed as {method:?}"),
        }
    }

    #[test]
    fn parse_each_method() -> Result<(), Box<dyn Error>> {
        assert_eq!(
            parse("solar(16.1, before_sunrise)"),
            ParseOutcome::Structured(CalculationMethod::SolarAngle {
                degrees: Degrees::new(16.1)?,
                direction: SolarDirection::BeforeSunrise,
            })
        );
        assert_eq!(
            parse("shaos(3, mga)"),
            ParseOutcome::Structured(CalculationMethod::ProportionalHours {
                hours: Hours::new(3.0)?,
                base: ProportionalBase::Mga,
            })
        );
        assert_eq!(
            parse("sunrise - 72min"),
            ParseOutcome::Structured(CalculationMethod::FixedOffset {
                minutes: Minutes::new(72),
                direction: OffsetDirection::Before,
                base: Reference::event("sunrise")?,
            })
        );
        assert_eq!(
            parse("  @tzais  "),
            ParseOutcome::Structured(CalculationMethod::FixedReference {
                name: Reference::zman("tzais")?,
            })
        );

        Ok(())
    }

    #[test]
    fn zero_offsets_keep_direction() {
        let after = parse("sunrise + 0min").structured();
        let before = parse("sunrise - 0min").structured();

        assert!(matches!(
            after,
            Some(CalculationMethod::FixedOffset {
                direction: OffsetDirection::After,
                ..
            })
        ));
        assert!(matches!(
            before,
            Some(CalculationMethod::FixedOffset {
                direction: OffsetDirection::Before,
                ..
            })
        ));
        assert_ne!(after, before);
    }

    #[test]
    fn whitespace_and_newlines_are_accepted() {
        assert!(parse("solar(\n  16.1,\n  before_sunrise\n)").is_structured());
        assert!(parse("\tsunset+18 min ").is_structured());
    }

    #[test]
    fn fallback_reasons() {
        assert_eq!(reason(""), "formula is empty");
        assert_eq!(reason("   "), "formula is empty");
        assert_eq!(reason("solar(16.1"), "unbalanced parentheses");
        assert!(reason("solar(16.1, east)").starts_with("solar(...)"));
        assert!(reason("shaos(abc, gra)").starts_with("shaos(...)"));
        assert!(reason("shaos(3, custom(sunrise, sunset))").starts_with("custom(...)"));
        assert!(reason("sunrise - 7.5min").starts_with("invalid minutes"));
        assert!(reason("solar(0, after_sunset) + 5min").starts_with("solar(...)"));
        assert!(reason("solar(0, after_sunset)").starts_with("invalid degrees"));
        assert_eq!(reason("foo(1,2)"), "uses a function the guided editor does not support");
        assert_eq!(
            reason("sunrise * 2"),
            "uses an operator or expression the guided editor does not support"
        );
    }

    #[test]
    fn trailing_garbage_is_unrepresentable() {
        assert!(!parse("solar(16.1, before_sunrise) + 5min").is_structured());
        assert!(!parse("sunrise - 72min;").is_structured());
        assert!(!parse("sunrise - 72mins").is_structured());
        assert!(!parse("@").is_structured());
        assert!(!parse("sunrise - -72min").is_structured());
    }

    #[test]
    fn complete_methods_with_trailing_text() {
        assert_eq!(
            reason("solar(16.1, before_sunrise) + 5min"),
            "unexpected text \"+ 5min\" after solar(16.1, before_sunrise)"
        );
        assert_eq!(
            reason("shaos(3, gra) shaos(4, mga)"),
            "unexpected text \"shaos(4, mga)\" after shaos(3, gra)"
        );
        assert_eq!(
            reason("sunrise - 72min + 3min"),
            "unexpected text \"+ 3min\" after sunrise - 72min"
        );
        assert_eq!(reason(" sunrise - 72mins "), "unexpected text \"s\" after sunrise - 72min");
    }

    #[test]
    fn only_ascii_whitespace_is_blank() {
        assert_eq!(reason(" \t\r\n"), "formula is empty");
        assert_ne!(reason("\u{2003}"), "formula is empty");
        assert_ne!(reason("\u{a0}sunrise"), "formula is empty");
    }

    #[test]
    fn non_ascii_input_does_not_panic() {
        assert!(!parse("זריחה - 72min").is_structured());
        assert!(!parse("solar(16.1, before_sunrise)\u{200b}").is_structured());
    }
}
