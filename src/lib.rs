//! The formula language used to define when a zman (a halachic time of day) occurs.
//!
//! A formula describes a time in terms of astronomical primitives and of other zmanim:
//!
//! ```text
//! sunrise                              a named event or, with @, another zman
//! solar(16.1, before_sunrise)          when the sun is 16.1° below the horizon before sunrise
//! @alos_hashachar + 36min              a fixed clock offset from another time
//! shaos(3, gra)                        three proportional hours into the GRA day
//! shaos(4, custom(@alos, @tzais))      proportional hours over a custom day
//! ```
//!
//! Formulas are stored as text, and that text is what gets persisted and validated. The guided
//! editor instead works on a [`CalculationMethod`], a typed view of the text that only exists for
//! formulas it can represent. This crate provides both directions of that round trip:
//!
//! - [`generate`] renders a method into its one canonical spelling,
//! - [`parse`] reads text back, yielding [`ParseOutcome::Unrepresentable`] for anything the
//!   guided editor does not model,
//! - [`Coordinator`] keeps the two in step while a single formula is being edited.
//!
//! Evaluating a formula against a date and location is left to an external astronomical service.
//!
//! # Examples
//!
//! ```rust
//! use zman_formula::{generate, parse, ParseOutcome};
//!
//! let method = parse("sunrise -72min").structured().unwrap();
//!
//! assert_eq!(generate(&method), "sunrise - 72min");
//! assert_eq!(parse(&generate(&method)), ParseOutcome::Structured(method));
//! ```

#![deny(clippy::all)]

pub mod coordinator;
pub mod defaults;
pub mod formula;
pub mod generator;
pub mod parser;
pub mod references;
pub mod tags;
pub mod validation;

pub use crate::coordinator::{Coordinator, EditError, EditOutcome, EditorState, FieldEdit, TextListener};
pub use crate::defaults::MethodDefaults;
pub use crate::formula::{CalculationMethod, InvalidField};
pub use crate::generator::generate;
pub use crate::parser::{parse, ParseOutcome};
