//! Round trip between the guided editor's controls and the persisted formula text.
//!
//! A [`Coordinator`] owns the formula currently being edited. After [`Coordinator::load`] it is
//! either [`EditorState::Structured`], in which case field edits and method switches regenerate
//! the text, or [`EditorState::Opaque`], in which case only the raw text can change. Each user
//! action that changes the text is reported to the registered [`TextListener`] exactly once.
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use zman_formula::coordinator::{Coordinator, FieldEdit};
//!
//! let emitted = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&emitted);
//!
//! let mut coordinator = Coordinator::new("solar(16.1, before_sunrise)");
//! coordinator.set_listener(move |text: &str| sink.borrow_mut().push(text.to_string()));
//! coordinator.edit_field(FieldEdit::Degrees(18.0)).unwrap();
//!
//! assert_eq!(*emitted.borrow(), ["solar(18, before_sunrise)"]);
//! ```

use thiserror::Error;

use crate::defaults::MethodDefaults;
use crate::formula::{
    CalculationMethod, Degrees, Field, Hours, Identifier, InvalidField, MethodKind, Minutes, OffsetDirection,
    ProportionalBase, Reference, SolarDirection,
};
use crate::generator::generate;
use crate::parser::{parse, ParseOutcome};
use crate::validation::{ValidationBoundary, ValidationReport, ValidationRequest};

/// Receiver of every new formula text produced by a user action.
pub trait TextListener {
    fn text_changed(&mut self, text: &str);
}

impl<F> TextListener for F
where
    F: FnMut(&str),
{
    fn text_changed(&mut self, text: &str) {
        self(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Structured(CalculationMethod),

    /// Text the guided editor cannot show, together with the parser's reason.
    Opaque { text: String, reason: String },
}

/// A change to a single control of the guided editor, carrying the raw input.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Name(String),
    Degrees(f64),
    SolarDirection(SolarDirection),
    Minutes(i64),
    OffsetDirection(OffsetDirection),
    Base(String),
    Hours(f64),
    ProportionalBase(ProportionalBase),
    CustomStart(String),
    CustomEnd(String),
}

impl FieldEdit {
    pub fn field(&self) -> Field {
        match self {
            FieldEdit::Name(_) => Field::Name,
            FieldEdit::Degrees(_) => Field::Degrees,
            FieldEdit::SolarDirection(_) => Field::SolarDirection,
            FieldEdit::Minutes(_) => Field::Minutes,
            FieldEdit::OffsetDirection(_) => Field::OffsetDirection,
            FieldEdit::Base(_) => Field::Base,
            FieldEdit::Hours(_) => Field::Hours,
            FieldEdit::ProportionalBase(_) => Field::ProportionalBase,
            FieldEdit::CustomStart(_) => Field::CustomStart,
            FieldEdit::CustomEnd(_) => Field::CustomEnd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("formula is in advanced mode and cannot be edited through the guided editor: {reason}")]
    Opaque { reason: String },

    #[error("{field} does not apply to a {method} formula")]
    NotApplicable { field: Field, method: MethodKind },

    #[error(transparent)]
    Invalid(#[from] InvalidField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// New text was produced and the listener was notified.
    Changed,

    /// The action left the formula as it was; nothing was emitted.
    Unchanged,
}

fn apply(method: &CalculationMethod, edit: FieldEdit) -> Result<CalculationMethod, EditError> {
    let not_applicable = |edit: &FieldEdit| EditError::NotApplicable {
        field: edit.field(),
        method: method.kind(),
    };

    let mut updated = method.clone();

    match (&mut updated, edit) {
        (CalculationMethod::FixedReference { name }, FieldEdit::Name(raw)) => {
            *name = Reference::parse_for(Field::Name, &raw)?;
        }
        (CalculationMethod::SolarAngle { degrees, .. }, FieldEdit::Degrees(raw)) => {
            *degrees = Degrees::new(raw)?;
        }
        (CalculationMethod::SolarAngle { direction, .. }, FieldEdit::SolarDirection(value)) => {
            *direction = value;
        }
        (CalculationMethod::FixedOffset { minutes, .. }, FieldEdit::Minutes(raw)) => {
            *minutes = Minutes::from_input(raw)?;
        }
        (CalculationMethod::FixedOffset { direction, .. }, FieldEdit::OffsetDirection(value)) => {
            *direction = value;
        }
        (CalculationMethod::FixedOffset { base, .. }, FieldEdit::Base(raw)) => {
            *base = Reference::parse_for(Field::Base, &raw)?;
        }
        (CalculationMethod::ProportionalHours { hours, .. }, FieldEdit::Hours(raw)) => {
            *hours = Hours::new(raw)?;
        }
        (CalculationMethod::ProportionalHours { base, .. }, FieldEdit::ProportionalBase(value)) => {
            *base = value;
        }
        (
            CalculationMethod::ProportionalHours {
                base: ProportionalBase::Custom { start, .. },
                ..
            },
            FieldEdit::CustomStart(raw),
        ) => {
            *start = Identifier::for_field(Field::CustomStart, raw)?;
        }
        (
            CalculationMethod::ProportionalHours {
                base: ProportionalBase::Custom { end, .. },
                ..
            },
            FieldEdit::CustomEnd(raw),
        ) => {
            *end = Identifier::for_field(Field::CustomEnd, raw)?;
        }
        (_, edit) => return Err(not_applicable(&edit)),
    }

    Ok(updated)
}

/// Owner of the formula being edited in one editor session.
pub struct Coordinator {
    state: EditorState,
    text: String,
    revision: u64,
    defaults: MethodDefaults,
    listener: Option<Box<dyn TextListener>>,
    validation: Option<ValidationReport>,
}

impl Coordinator {
    /// Start editing existing formula text.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_defaults(text, MethodDefaults::default())
    }

    pub fn with_defaults(text: impl Into<String>, defaults: MethodDefaults) -> Self {
        let text = text.into();
        let state = Self::state_of(&text);

        Self {
            state,
            text,
            revision: 0,
            defaults,
            listener: None,
            validation: None,
        }
    }

    /// Start editing a new zman using the default parameters of `kind`.
    pub fn fresh(kind: MethodKind, defaults: MethodDefaults) -> Result<Self, InvalidField> {
        let method = defaults.method(kind)?;

        Ok(Self {
            text: generate(&method),
            state: EditorState::Structured(method),
            revision: 0,
            defaults,
            listener: None,
            validation: None,
        })
    }

    fn state_of(text: &str) -> EditorState {
        match parse(text) {
            ParseOutcome::Structured(method) => EditorState::Structured(method),
            ParseOutcome::Unrepresentable { reason } => EditorState::Opaque {
                text: text.to_string(),
                reason,
            },
        }
    }

    pub fn set_listener<L>(&mut self, listener: L)
    where
        L: TextListener + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn method(&self) -> Option<&CalculationMethod> {
        match &self.state {
            EditorState::Structured(method) => Some(method),
            EditorState::Opaque { .. } => None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of texts emitted or loaded so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the current text is exactly what the generator writes for the current method.
    ///
    /// Loaded text keeps its original spelling until the first structured edit.
    pub fn is_canonical(&self) -> bool {
        match &self.state {
            EditorState::Structured(method) => generate(method) == self.text,
            EditorState::Opaque { .. } => false,
        }
    }

    /// Replace the formula with persisted text, e.g. when a zman is opened for editing.
    ///
    /// Loading is not an edit and does not notify the listener.
    pub fn load(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.state = Self::state_of(&self.text);
        self.revision += 1;
        self.validation = None;

        tracing::debug!(text = %self.text, structured = self.method().is_some(), "loaded formula");
    }

    pub fn edit_field(&mut self, edit: FieldEdit) -> Result<EditOutcome, EditError> {
        let method = self.structured()?;
        let field = edit.field();
        let updated = apply(method, edit).map_err(|err| {
            tracing::debug!(%field, error = %err, "rejected field edit");
            err
        })?;

        Ok(self.replace_method(updated))
    }

    /// Change the active calculation method, discarding the parameters of the previous one.
    pub fn switch_method(&mut self, kind: MethodKind) -> Result<EditOutcome, EditError> {
        if self.structured()?.kind() == kind {
            return Ok(EditOutcome::Unchanged);
        }

        let method = self.defaults.method(kind)?;
        Ok(self.replace_method(method))
    }

    /// Replace the text directly, as typed into the advanced-mode editor.
    pub fn edit_source(&mut self, text: impl Into<String>) -> EditOutcome {
        let text = text.into();

        if text == self.text {
            return EditOutcome::Unchanged;
        }

        self.state = Self::state_of(&text);
        self.text = text;
        tracing::debug!(text = %self.text, structured = self.method().is_some(), "source edited");
        self.emit();

        EditOutcome::Changed
    }

    fn structured(&self) -> Result<&CalculationMethod, EditError> {
        match &self.state {
            EditorState::Structured(method) => Ok(method),
            EditorState::Opaque { reason, .. } => Err(EditError::Opaque { reason: reason.clone() }),
        }
    }

    fn replace_method(&mut self, method: CalculationMethod) -> EditOutcome {
        if self.method() == Some(&method) {
            return EditOutcome::Unchanged;
        }

        self.text = generate(&method);
        self.state = EditorState::Structured(method);
        tracing::debug!(text = %self.text, "regenerated formula");
        self.emit();

        EditOutcome::Changed
    }

    fn emit(&mut self) {
        self.revision += 1;
        self.validation = None;

        if let Some(listener) = self.listener.as_mut() {
            listener.text_changed(&self.text);
        }
    }

    /// Take a snapshot of the current text to send to the validation service.
    pub fn begin_validation(&self) -> ValidationRequest {
        ValidationRequest {
            formula: self.text.clone(),
            revision: self.revision,
        }
    }

    /// Record the report for `request`, unless the text has changed since it was taken.
    pub fn complete_validation(&mut self, request: &ValidationRequest, report: ValidationReport) -> bool {
        if request.revision != self.revision {
            tracing::debug!(
                stale = request.revision,
                current = self.revision,
                "discarding superseded validation result"
            );
            return false;
        }

        self.validation = Some(report);
        true
    }

    /// Validate the current text synchronously and keep the report.
    pub fn validate<B>(&mut self, boundary: &B) -> &ValidationReport
    where
        B: ValidationBoundary + ?Sized,
    {
        let report = boundary.validate(&self.text);
        self.validation.insert(report)
    }

    /// Report of the latest validation of the current text, if any.
    pub fn validation(&self) -> Option<&ValidationReport> {
        self.validation.as_ref()
    }
}
