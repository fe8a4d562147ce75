use pretty_assertions::assert_eq;
use typegraph::{BoundedType, Context, DeclarationRef, GenericDeclaration, TypeInfo};

use super::{factory, names, ty};

fn variable(ty: &TypeInfo, idx: usize) -> TypeInfo {
    TypeInfo::Variable(ty.type_parameters()[idx].clone())
}

#[test]
fn class_variable_properties() {
    let factory = factory();
    let holder = ty(&factory, "test.Holder");
    let t = &holder.type_parameters()[0];

    assert_eq!(t.name(), "T");
    assert_eq!(t.declaration(), &DeclarationRef::Class("test.Holder".into()));
    assert_eq!(names(t.upper_bounds().to_vec()), vec!["Number"]);
    assert!(t.lower_bounds().is_empty());
    assert_eq!(t.base_type().to_string(), "Number");

    let var = variable(&holder, 0);
    assert!(var.is_bounded());
    assert_eq!(var.to_string(), "T");
    assert_eq!(var.name(), "T");
    assert_eq!(var.erasure().to_string(), "java.lang.Number");
    assert_eq!(var.non_bounded().to_string(), "Number");
    assert!(!var.is_interface());
    assert!(!var.is_array());
}

#[test]
fn variable_shares_lattice_of_its_base() {
    let factory = factory();
    let holder = ty(&factory, "test.Holder");
    let var = variable(&holder, 0);

    assert_eq!(
        names(var.supertypes(&factory)),
        vec!["Number", "Serializable", "Object"]
    );
    let number = ty(&factory, "java.lang.Number");
    assert!(std::ptr::eq(
        var.lattice(&factory).storage(),
        number.lattice(&factory).storage()
    ));
}

#[test]
fn variable_chains_reach_a_class_bound() {
    let factory = factory();
    let local = ty(&factory, "test.LocalTest");
    let b = variable(&local, 1);

    assert_eq!(b.non_bounded().to_string(), "Number");
    assert_eq!(b.erasure().to_string(), "java.lang.Number");
    assert_eq!(
        b.resolve(&factory, Context::Unbound, true).to_string(),
        "Number"
    );
}

#[test]
fn variable_resolves_through_context_supertypes() {
    let factory = factory();
    let boxed = ty(&factory, "test.Box");
    let t = variable(&boxed, 0);

    let string_box = ty(&factory, "test.StringBox");
    assert_eq!(
        t.resolve(&factory, Context::Type(&string_box), false)
            .to_string(),
        "String"
    );

    let integers = ty(&factory, "Ltest/Box<Ljava/lang/Integer;>;");
    assert_eq!(
        t.resolve(&factory, Context::Type(&integers), false)
            .to_string(),
        "Integer"
    );
}

#[test]
fn unbound_variable_falls_back_to_base_only_when_asked() {
    let factory = factory();
    let boxed = ty(&factory, "test.Box");
    let t = variable(&boxed, 0);

    assert!(t.resolve(&factory, Context::Type(&boxed), false).ptr_eq(&t));
    assert!(t.resolve(&factory, Context::Unbound, false).ptr_eq(&t));
    assert_eq!(
        t.resolve(&factory, Context::Type(&boxed), true).to_string(),
        "Object"
    );

    // A context that is not a subtype of the declaration binds nothing.
    let string = ty(&factory, "java.lang.String");
    assert!(t.resolve(&factory, Context::Type(&string), false).ptr_eq(&t));
    assert_eq!(
        t.resolve(&factory, Context::Type(&string), true).to_string(),
        "Object"
    );
}

#[test]
fn self_referential_bound_terminates() {
    let factory = factory();
    let enum_type = ty(&factory, "java.lang.Enum");
    let e = variable(&enum_type, 0);

    assert_eq!(e.non_bounded().to_string(), "Enum<E=E>");
    assert_eq!(
        e.resolve(&factory, Context::Unbound, true).to_string(),
        "Enum<E=Enum<E>>"
    );
}

#[test]
fn variables_compare_by_name_and_declaration() {
    let factory = factory();
    let holder = ty(&factory, "test.Holder");
    let boxed = ty(&factory, "test.Box");

    let items = factory.field(&holder, "items").unwrap();
    let TypeInfo::Parameterized(list) = items.field_type() else {
        panic!("expected List<T>");
    };
    assert_eq!(list.actual_type_arguments()[0], variable(&holder, 0));
    assert_ne!(variable(&holder, 0), variable(&boxed, 0));
}

#[test]
fn class_variable_knows_its_declaration() {
    let factory = factory();
    let holder = ty(&factory, "test.Holder");
    let t = &holder.type_parameters()[0];

    let Some(GenericDeclaration::Type(declaration)) = t.generic_declaration(&factory) else {
        panic!("expected a class declaration");
    };
    assert!(declaration.ptr_eq(&holder));
    assert!(declaration.is_generic());
}

#[test]
fn method_variable_knows_its_declaration() {
    let factory = factory();
    let thrower = ty(&factory, "test.Thrower");
    let run = factory.method(&thrower, "run", &[]).unwrap();
    let x = &run.type_parameters()[0];

    assert!(matches!(x.declaration(), DeclarationRef::Method(_)));
    let Some(GenericDeclaration::Method(method)) = x.generic_declaration(&factory) else {
        panic!("expected a method declaration");
    };
    assert_eq!(method.name(), "run");
    assert_eq!(
        names(method.type_parameters().iter().cloned().map(TypeInfo::Variable)),
        vec!["X"]
    );
    assert_eq!(
        names(GenericDeclaration::Method(method.clone()).actual_type_arguments(&factory)),
        vec!["Exception"]
    );
}

#[test]
fn variable_bound_to_itself_in_context_terminates() {
    let factory = factory();
    let raw = ty(&factory, "test.Box");
    let t = variable(&raw, 0);
    let context = factory.parameterized(&raw, vec![t.clone()]);
    assert_eq!(context.to_string(), "Box<T=T>");

    assert!(t.resolve(&factory, Context::Type(&context), false).ptr_eq(&t));
    assert_eq!(
        t.resolve(&factory, Context::Type(&context), true).to_string(),
        "Object"
    );
}

#[test]
fn self_referential_bound_points_back_at_its_variable() {
    let factory = factory();
    let self_ref = ty(&factory, "test.SelfRef");
    let t = &self_ref.type_parameters()[0];
    assert_eq!(t.declaration(), &DeclarationRef::Class("test.SelfRef".into()));

    let TypeInfo::Parameterized(bound) = t.base_type() else {
        panic!("expected SelfRef<T> as the bound of T");
    };
    assert_eq!(t.base_type().to_string(), "SelfRef<T=T>");
    let TypeInfo::Variable(inner) = &bound.actual_type_arguments()[0] else {
        panic!("expected T as the argument of SelfRef<T>");
    };
    assert_eq!(inner.name(), "T");
    assert_eq!(inner.declaration(), t.declaration());
    assert_eq!(**inner, **t);

    let resolved = TypeInfo::Variable(t.clone()).resolve(&factory, Context::Unbound, true);
    assert_eq!(resolved.to_string(), "SelfRef<T=SelfRef<T>>");
    let TypeInfo::Parameterized(resolved) = &resolved else {
        panic!("expected a parameterized type");
    };
    assert!(resolved.actual_type_arguments()[0].ptr_eq(&self_ref));
}
