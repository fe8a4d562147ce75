use std::sync::Arc;

use pretty_assertions::assert_eq;
use typegraph::{Context, MemberError};
use typegraph_reflect::LookupError;

use super::{factory, ty};

#[test]
fn field_in_generic_base() {
    let factory = factory();
    let base = ty(&factory, "test.FieldTests$TestClassBase");
    let field = factory.field(&base, "e").unwrap();

    assert_eq!(field.name(), "e");
    assert!(field.modifiers().is_private());
    assert_eq!(field.field_type().to_string(), "List<E=T>");
    assert_eq!(field.to_string(), "private List<E=T> FieldTests$TestClassBase.e");
}

#[test]
fn field_bound_to_subclass_takes_its_arguments() {
    let factory = factory();
    let base = ty(&factory, "test.FieldTests$TestClassBase");
    let sub = ty(&factory, "test.FieldTests$TestClass");
    let field = factory.field_in(&sub, &base, "e").unwrap();

    assert_eq!(
        field.to_string(),
        "private List<E=Integer> FieldTests$TestClassBase.e"
    );
    assert!(field.declaring_type().ptr_eq(&base));
}

#[test]
fn field_type_resolution() {
    let factory = factory();
    let boxed = ty(&factory, "test.Box");
    let value = factory.field(&boxed, "value").unwrap();
    assert_eq!(value.field_type().to_string(), "T");

    let string_box = ty(&factory, "test.StringBox");
    let resolved = value.resolve(&factory, Context::Type(&string_box), false);
    assert_eq!(resolved.to_string(), "private String Box.value");

    let erased = value.resolve(&factory, Context::Unbound, true);
    assert_eq!(erased.field_type().to_string(), "Object");

    let same = value.resolve(&factory, Context::Unbound, false);
    assert!(Arc::ptr_eq(&value, &same));
}

#[test]
fn resolved_fields_compare_by_type() {
    let factory = factory();
    let boxed = ty(&factory, "test.Box");
    let string_box = ty(&factory, "test.StringBox");

    let open = factory.field(&boxed, "value").unwrap();
    let bound = factory.field_in(&string_box, &boxed, "value").unwrap();
    let again = factory.field_in(&string_box, &boxed, "value").unwrap();

    assert_ne!(*open, *bound);
    assert_eq!(*bound, *again);
}

#[test]
fn missing_field_reports_cause() {
    let factory = factory();
    let boxed = ty(&factory, "test.Box");

    let err = factory.field(&boxed, "missing").unwrap_err();
    assert_eq!(
        err,
        MemberError::FieldNotFound {
            cause: LookupError::NoSuchField {
                class: "test.Box".into(),
                name: "missing".to_string(),
            },
        }
    );
    assert_eq!(
        err.to_string(),
        "field not found: no such field: test.Box.missing"
    );

    // Only declared fields are visible.
    let string_box = ty(&factory, "test.StringBox");
    assert!(factory.field(&string_box, "value").is_err());
}

#[test]
#[should_panic(expected = "cannot be bound")]
fn binding_field_to_unrelated_type_panics() {
    let factory = factory();
    let decl = factory
        .universe()
        .declared_field("test.Box", "value")
        .unwrap();
    factory.bind_field(&decl, &ty(&factory, "java.lang.String"));
}
