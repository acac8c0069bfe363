use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use zman_formula::formula::{CalculationMethod, Degrees, MethodKind, SolarDirection};
use zman_formula::validation::{ValidationMessage, ValidationReport};
use zman_formula::{Coordinator, EditError, EditOutcome, EditorState, FieldEdit};

fn listen(coordinator: &mut Coordinator) -> Rc<RefCell<Vec<String>>> {
    let emitted = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&emitted);
    coordinator.set_listener(move |text: &str| sink.borrow_mut().push(text.to_string()));

    emitted
}

#[test]
fn edit_degrees_of_loaded_solar_formula() -> Result<(), Box<dyn Error>> {
    let mut coordinator = Coordinator::new("solar(16.1, before_sunrise)");
    let emitted = listen(&mut coordinator);

    assert_eq!(
        coordinator.state(),
        &EditorState::Structured(CalculationMethod::SolarAngle {
            degrees: Degrees::new(16.1)?,
            direction: SolarDirection::BeforeSunrise,
        })
    );

    coordinator.edit_field(FieldEdit::Degrees(18.0))?;

    assert_eq!(coordinator.text(), "solar(18, before_sunrise)");
    assert_eq!(*emitted.borrow(), ["solar(18, before_sunrise)"]);

    Ok(())
}

#[test]
fn unsupported_formula_is_opaque() {
    let text = "custom_unsupported_fn(1,2,3)";
    let mut coordinator = Coordinator::new(text);
    let emitted = listen(&mut coordinator);

    assert!(matches!(
        coordinator.state(),
        EditorState::Opaque { text: opaque, reason } if opaque == text && !reason.is_empty()
    ));
    assert!(matches!(
        coordinator.edit_field(FieldEdit::Degrees(18.0)),
        Err(EditError::Opaque { .. })
    ));
    assert_eq!(coordinator.text(), text);
    assert!(emitted.borrow().is_empty());
}

#[test]
fn reload_replaces_state_wholesale() {
    let mut coordinator = Coordinator::new("solar(16.1, before_sunrise)");
    let emitted = listen(&mut coordinator);

    coordinator.load("if(sunrise, sunset)");
    assert!(coordinator.method().is_none());

    coordinator.load("shaos(3, mga)");
    assert_eq!(coordinator.method().map(CalculationMethod::kind), Some(MethodKind::ProportionalHours));
    assert!(emitted.borrow().is_empty());
}

#[test]
fn one_emission_per_action() -> Result<(), Box<dyn Error>> {
    let mut coordinator = Coordinator::new("sunrise");
    let emitted = listen(&mut coordinator);

    let outcomes = [
        coordinator.edit_field(FieldEdit::Name("sunrise".into()))?,
        coordinator.switch_method(MethodKind::FixedOffset)?,
        coordinator.edit_field(FieldEdit::Minutes(72))?,
        coordinator.edit_field(FieldEdit::Minutes(40))?,
        coordinator.switch_method(MethodKind::ProportionalHours)?,
        coordinator.edit_field(FieldEdit::Hours(3.0))?,
        coordinator.edit_field(FieldEdit::Hours(4.5))?,
    ];

    assert_eq!(
        outcomes,
        [
            EditOutcome::Unchanged,
            EditOutcome::Changed,
            EditOutcome::Unchanged,
            EditOutcome::Changed,
            EditOutcome::Changed,
            EditOutcome::Unchanged,
            EditOutcome::Changed,
        ]
    );
    assert_eq!(
        *emitted.borrow(),
        ["sunrise - 72min", "sunrise - 40min", "shaos(3, gra)", "shaos(4.5, gra)"]
    );
    assert_eq!(coordinator.revision(), 4);

    Ok(())
}

#[test]
fn structured_editing_works_without_validation() -> Result<(), Box<dyn Error>> {
    let mut coordinator = Coordinator::new("solar(16.1, before_sunrise)");

    coordinator.edit_field(FieldEdit::SolarDirection(SolarDirection::AfterSunset))?;
    assert!(coordinator.validation().is_none());

    let request = coordinator.begin_validation();
    assert_eq!(request.formula(), "solar(16.1, after_sunset)");

    let report = ValidationReport::invalid([ValidationMessage {
        message: "unknown primitive".into(),
        line: Some(1),
        column: Some(7),
    }]);
    assert!(coordinator.complete_validation(&request, report.clone()));
    assert_eq!(coordinator.validation(), Some(&report));

    coordinator.edit_field(FieldEdit::Degrees(8.5))?;
    assert!(coordinator.validation().is_none());

    Ok(())
}
