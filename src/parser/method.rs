use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, multispace0};
use nom::combinator::{map, map_opt};
use nom::sequence::{delimited, pair, separated_pair, tuple};
use nom::IResult;

use super::common::{keyword, number, op0, reference, word, zman_key};
use crate::formula::{
    CalculationMethod, Degrees, Hours, InvalidField, Minutes, OffsetDirection, ProportionalBase, SolarDirection,
};

/// Output of a production: the text matched, but its values may still be out of range.
pub type Built = Result<CalculationMethod, InvalidField>;

/// `solar(16.1, before_sunrise)`
pub fn solar_call(input: &str) -> IResult<&str, Built> {
    let args = separated_pair(number, op0(","), keyword::<SolarDirection>);
    let mut parser = delimited(pair(tag("solar"), op0("(")), args, op0(")"));
    let (rest, (degrees, direction)) = parser(input)?;
    let method = Degrees::new(degrees).map(|degrees| CalculationMethod::SolarAngle { degrees, direction });

    Ok((rest, method))
}

fn proportional_base(input: &str) -> IResult<&str, ProportionalBase> {
    let bounds = separated_pair(zman_key, op0(","), zman_key);
    let custom = map(delimited(pair(tag("custom"), op0("(")), bounds, op0(")")), |(start, end)| {
        ProportionalBase::Custom { start, end }
    });
    let system = map_opt(word, |name| match name {
        "gra" => Some(ProportionalBase::Gra),
        "mga" => Some(ProportionalBase::Mga),
        _ => None,
    });

    let mut parser = alt((custom, system));
    parser(input)
}

/// `shaos(3, gra)` or `shaos(4, custom(@alos, @tzais))`
pub fn shaos_call(input: &str) -> IResult<&str, Built> {
    let args = separated_pair(number, op0(","), proportional_base);
    let mut parser = delimited(pair(tag("shaos"), op0("(")), args, op0(")"));
    let (rest, (hours, base)) = parser(input)?;
    let method = Hours::new(hours).map(|hours| CalculationMethod::ProportionalHours { hours, base });

    Ok((rest, method))
}

/// `sunrise - 72min` or `@alos_hashachar + 0min`
pub fn offset_expr(input: &str) -> IResult<&str, Built> {
    let sign = map_opt(alt((char('-'), char('+'))), OffsetDirection::from_sign);
    let mut parser = tuple((
        reference,
        delimited(multispace0, sign, multispace0),
        number,
        multispace0,
        tag("min"),
    ));
    let (rest, (base, direction, minutes, _, _)) = parser(input)?;
    let method = Minutes::from_number(minutes).map(|minutes| CalculationMethod::FixedOffset {
        minutes,
        direction,
        base,
    });

    Ok((rest, method))
}

/// `sunrise` or `@plag_hamincha`
pub fn fixed_reference(input: &str) -> IResult<&str, Built> {
    let mut parser = map(reference, |name| Ok(CalculationMethod::FixedReference { name }));
    parser(input)
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::{fixed_reference, offset_expr, shaos_call, solar_call};
    use crate::formula::*;

    #[test]
    fn parse_solar_call() -> Result<(), Box<dyn Error>> {
        let (rest, method) = solar_call("solar(16.1, before_sunrise)")?;
        let expected = CalculationMethod::SolarAngle {
            degrees: Degrees::new(16.1)?,
            direction: SolarDirection::BeforeSunrise,
        };

        assert_eq!(rest, "");
        assert_eq!(method?, expected);

        let (rest, method) = solar_call("solar( 8.5 ,after_sunset )")?;

        assert_eq!(rest, "");
        assert_eq!(method?.kind(), MethodKind::SolarAngle);

        let (_, method) = solar_call("solar(0, before_noon)")?;
        assert_eq!(method.unwrap_err().field, Field::Degrees);

        assert!(solar_call("solar(16.1, before_sunset)").is_err());
        assert!(solar_call("solar(abc, before_sunrise)").is_err());

        Ok(())
    }

    #[test]
    fn parse_shaos_call() -> Result<(), Box<dyn Error>> {
        let (rest, method) = shaos_call("shaos(3.0, gra)")?;
        let expected = CalculationMethod::ProportionalHours {
            hours: Hours::new(3.0)?,
            base: ProportionalBase::Gra,
        };

        assert_eq!(rest, "");
        assert_eq!(method?, expected);

        let (rest, method) = shaos_call("shaos(4, custom(@alos_16_1, @tzais_16_1))")?;
        let expected = CalculationMethod::ProportionalHours {
            hours: Hours::new(4.0)?,
            base: ProportionalBase::custom("alos_16_1", "tzais_16_1")?,
        };

        assert_eq!(rest, "");
        assert_eq!(method?, expected);

        assert!(shaos_call("shaos(4, custom(sunrise, sunset))").is_err());
        assert!(shaos_call("shaos(4, custom(@alos, sunset))").is_err());
        assert!(shaos_call("shaos(4, rabbeinu_tam)").is_err());

        Ok(())
    }

    #[test]
    fn parse_offset_expr() -> Result<(), Box<dyn Error>> {
        let (rest, method) = offset_expr("sunset + 18min")?;
        let expected = CalculationMethod::FixedOffset {
            minutes: Minutes::new(18),
            direction: OffsetDirection::After,
            base: Reference::event("sunset")?,
        };

        assert_eq!(rest, "");
        assert_eq!(method?, expected);

        let (rest, method) = offset_expr("@alos_hashachar-72min")?;
        let expected = CalculationMethod::FixedOffset {
            minutes: Minutes::new(72),
            direction: OffsetDirection::Before,
            base: Reference::zman("alos_hashachar")?,
        };

        assert_eq!(rest, "");
        assert_eq!(method?, expected);

        let (_, method) = offset_expr("sunrise - 2.5min")?;
        assert_eq!(method.unwrap_err().field, Field::Minutes);

        assert!(offset_expr("sunrise * 72min").is_err());
        assert!(offset_expr("sunrise - 72").is_err());

        Ok(())
    }

    #[test]
    fn parse_fixed_reference() -> Result<(), Box<dyn Error>> {
        let (rest, method) = fixed_reference("@chatzos rest")?;

        assert_eq!(rest, " rest");
        assert_eq!(
            method?,
            CalculationMethod::FixedReference {
                name: Reference::zman("chatzos")?
            }
        );

        Ok(())
    }
}
