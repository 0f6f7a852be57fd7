//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use tessera_foundation::{Entity, Error, ErrorContext, ErrorKind};

#[test]
fn validation_errors_name_the_component() {
    let err = Error::validation("order", "expected number, got string");
    assert!(err.is_validation());
    let msg = format!("{err}");
    assert!(msg.contains("order"));
    assert!(msg.contains("expected number"));
}

#[test]
fn unknown_names_carry_the_name() {
    let err = Error::unknown_component("speed");
    assert!(matches!(err.kind, ErrorKind::UnknownComponent(ref n) if n == "speed"));
    let err = Error::unknown_resource("weather");
    assert!(format!("{err}").contains("weather"));
    let err = Error::unknown_transaction("createTodo");
    assert!(matches!(err.kind, ErrorKind::UnknownTransaction(_)));
    assert!(!err.is_validation());
}

#[test]
fn invalid_schema_is_a_configuration_error() {
    let err = Error::invalid_schema("pos", "struct field exceeds layout");
    assert!(matches!(err.kind, ErrorKind::InvalidSchema { .. }));
    assert!(format!("{err}").contains("pos"));
}

#[test]
fn context_accumulates_frames() {
    let context = ErrorContext::new()
        .with_entity(Entity::new(4))
        .with_transaction("toggle")
        .with_frame("update");
    let err = Error::validation("complete", "expected boolean").with_context(context);
    let context = err.context.as_ref().unwrap();
    assert_eq!(context.entity, Some(Entity::new(4)));
    assert_eq!(context.transaction.as_deref(), Some("toggle"));
    assert_eq!(context.stack, vec!["update".to_string()]);
}
