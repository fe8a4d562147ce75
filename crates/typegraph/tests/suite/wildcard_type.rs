use pretty_assertions::assert_eq;
use typegraph::{BoundedType, Context, TypeInfo};

use super::{factory, names, ty};

fn first_argument(ty: &TypeInfo) -> TypeInfo {
    let TypeInfo::Parameterized(pt) = ty else {
        panic!("expected a parameterized type, got {ty:?}");
    };
    pt.actual_type_arguments()[0].clone()
}

#[test]
fn unbounded_wildcard() {
    let factory = factory();
    let wildcard = factory.wildcard(vec![], vec![]);

    let TypeInfo::Wildcard(inner) = &wildcard else {
        panic!("expected a wildcard");
    };
    assert!(inner.is_unknown());
    assert_eq!(wildcard.to_string(), "?");
    assert_eq!(wildcard.name(), "?");
    assert_eq!(names(inner.upper_bounds().to_vec()), vec!["Object"]);
    assert_eq!(wildcard.erasure().to_string(), "java.lang.Object");
    assert!(wildcard
        .resolve(&factory, Context::Unbound, true)
        .ptr_eq(&wildcard));
}

#[test]
fn upper_bounded_wildcard_resolves_to_its_bound() {
    let factory = factory();
    let number = ty(&factory, "java.lang.Number");
    let wildcard = factory.wildcard(vec![number.clone()], vec![]);

    let TypeInfo::Wildcard(inner) = &wildcard else {
        panic!("expected a wildcard");
    };
    assert!(!inner.is_unknown());
    assert_eq!(wildcard.to_string(), "? extends Number");
    assert!(wildcard
        .resolve(&factory, Context::Unbound, true)
        .ptr_eq(&number));
    assert_eq!(
        names(wildcard.supertypes(&factory)),
        vec!["Number", "Serializable", "Object"]
    );
}

#[test]
fn lower_bounded_wildcard_counts_as_unknown() {
    let factory = factory();
    let integer = ty(&factory, "java.lang.Integer");
    let wildcard = factory.wildcard(vec![], vec![integer]);

    let TypeInfo::Wildcard(inner) = &wildcard else {
        panic!("expected a wildcard");
    };
    assert!(inner.is_unknown());
    assert_eq!(wildcard.to_string(), "? super Integer");
    assert_eq!(names(inner.lower_bounds().to_vec()), vec!["Integer"]);
    assert!(wildcard
        .resolve(&factory, Context::Unbound, true)
        .ptr_eq(&wildcard));
}

#[test]
fn unknown_argument_is_wrapped_with_formal_bounds() {
    let factory = factory();
    let holder = ty(&factory, "Ltest/Holder<*>;");
    let arg = first_argument(&holder);

    let TypeInfo::UnknownWildcard(unknown) = &arg else {
        panic!("expected an unknown wildcard, got {arg:?}");
    };
    assert!(!unknown.is_unbounded());
    assert!(unknown.wrapped().is_unknown());
    assert_eq!(names(unknown.upper_bounds().to_vec()), vec!["Number"]);
    assert!(unknown.lower_bounds().is_empty());
    assert_eq!(arg.to_string(), "? extends Number");
    assert_eq!(arg.erasure().to_string(), "java.lang.Number");

    // Identity is the wrapped wildcard's.
    assert_eq!(arg, TypeInfo::Wildcard(unknown.wrapped().clone()));
}

#[test]
fn unknown_argument_over_unbounded_parameter_prints_bare() {
    let factory = factory();
    let list = ty(&factory, "Ljava/util/List<+Ljava/lang/Object;>;");
    assert_eq!(list.to_string(), "List<E=?>");
    assert_eq!(ty(&factory, "Ljava/util/List<*>;").to_string(), "List<E=?>");
    assert_eq!(
        list.resolve(&factory, Context::Unbound, true).to_string(),
        "List<E=Object>"
    );
}

#[test]
fn super_argument_keeps_its_lower_bound() {
    let factory = factory();
    let list = ty(&factory, "Ljava/util/List<-Ljava/lang/Integer;>;");
    let arg = first_argument(&list);

    assert!(matches!(arg, TypeInfo::UnknownWildcard(_)));
    assert_eq!(list.to_string(), "List<E=? super Integer>");
    assert_eq!(
        list.resolve(&factory, Context::Unbound, true).to_string(),
        "List<E=Object>"
    );
}

#[test]
fn extends_argument_resolves_to_its_bound() {
    let factory = factory();
    let list = ty(&factory, "Ljava/util/List<+Ljava/lang/Number;>;");

    assert!(matches!(first_argument(&list), TypeInfo::Wildcard(_)));
    assert_eq!(list.to_string(), "List<E=? extends Number>");
    assert_eq!(
        list.resolve(&factory, Context::Unbound, true).to_string(),
        "List<E=Number>"
    );
}
