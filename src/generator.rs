//! Rendering of [`CalculationMethod`] values into canonical formula source text.
//!
//! Each structured value has exactly one spelling:
//!
//! | Method               | Source text                       |
//! | -------------------- | --------------------------------- |
//! | fixed reference      | `sunrise`, `@alos_hashachar`      |
//! | solar angle          | `solar(16.1, before_sunrise)`     |
//! | fixed offset         | `sunrise - 72min`, `@plag + 0min` |
//! | proportional hours   | `shaos(3, gra)`                   |
//! | custom proportional  | `shaos(4, custom(@alos, @tzais))` |
//!
//! Numbers are written with the shortest decimal form that reads back to the same value, so `18.0`
//! is rendered as `18` and `16.10` never appears.

use std::fmt::{Display, Formatter};

use crate::formula::{CalculationMethod, Degrees, Hours, Minutes, ProportionalBase, Reference, SolarDirection};

/// Render the canonical source text of a calculation method.
pub fn generate(method: &CalculationMethod) -> String {
    method.to_string()
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Reference::Event(name) => write!(f, "{name}"),
            Reference::Zman(key) => write!(f, "@{key}"),
        }
    }
}

// f64's Display never uses exponent notation and prints the shortest round-tripping digits.
impl Display for Degrees {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Display for Hours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Display for Minutes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Display for SolarDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

impl Display for ProportionalBase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProportionalBase::Gra => f.write_str("gra"),
            ProportionalBase::Mga => f.write_str("mga"),
            ProportionalBase::Custom { start, end } => write!(f, "custom(@{start}, @{end})"),
        }
    }
}

impl Display for CalculationMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CalculationMethod::FixedReference { name } => write!(f, "{name}"),
            CalculationMethod::SolarAngle { degrees, direction } => write!(f, "solar({degrees}, {direction})"),
            CalculationMethod::FixedOffset {
                minutes,
                direction,
                base,
            } => write!(f, "{base} {} {minutes}min", direction.sign()),
            CalculationMethod::ProportionalHours { hours, base } => write!(f, "shaos({hours}, {base})"),
        }
    }
}
