use std::collections::HashSet;

use pretty_assertions::assert_eq;
use typegraph::{Context, TypeError, TypeInfo};

use super::{factory, names, ty};

const STRING_LIST: &str = "Ljava/util/ArrayList<Ljava/lang/String;>;";

#[test]
fn lattice_replaces_raw_entry_with_self() {
    let factory = factory();
    let list = ty(&factory, STRING_LIST);
    let supertypes = list.supertypes(&factory);

    assert!(supertypes[0].ptr_eq(&list));
    assert_eq!(supertypes[0].to_string(), "ArrayList<E=String>");
    assert_eq!(supertypes[1].to_string(), "AbstractList<E=E>");
    assert_eq!(supertypes.len(), 10);
}

#[test]
fn supertypes_resolve_against_the_parameterized_type() {
    let factory = factory();
    let list = ty(&factory, STRING_LIST);

    let resolved = list
        .supertypes(&factory)
        .iter()
        .map(|supertype| supertype.resolve(&factory, Context::Type(&list), true))
        .collect::<Vec<_>>();
    assert_eq!(
        names(resolved),
        vec![
            "ArrayList<E=String>",
            "AbstractList<E=String>",
            "AbstractCollection<E=String>",
            "List<E=String>",
            "RandomAccess",
            "Cloneable",
            "Serializable",
            "Collection<E=String>",
            "Iterable<T=String>",
            "Object",
        ]
    );
}

#[test]
fn concrete_parameterized_type_resolves_to_itself() {
    let factory = factory();
    let list = ty(&factory, STRING_LIST);
    let TypeInfo::Parameterized(pt) = &list else {
        panic!("expected a parameterized type");
    };
    assert!(pt.is_concrete());

    let other = ty(&factory, "java.util.List");
    assert!(list.resolve(&factory, Context::Unbound, true).ptr_eq(&list));
    assert!(list
        .resolve(&factory, Context::Type(&other), false)
        .ptr_eq(&list));
}

#[test]
fn parameterized_type_properties() {
    let factory = factory();
    let map = ty(
        &factory,
        "Ljava/util/Map<Ljava/lang/String;Ljava/lang/Integer;>;",
    );

    assert_eq!(map.to_string(), "Map<K=String, V=Integer>");
    assert_eq!(map.name(), "java.util.Map");
    assert_eq!(map.simple_name(), "Map");
    assert_eq!(map.erasure().to_string(), "java.util.Map");
    assert!(map.is_interface());
    assert!(map.is_generic());
    assert_eq!(map.type_parameters().len(), 2);
    assert_eq!(
        names(map.actual_type_arguments(&factory)),
        vec!["String", "Integer"]
    );
    assert_eq!(
        map.actual_type_argument(&factory, "V")
            .map(|arg| arg.to_string()),
        Some("Integer".to_string())
    );
    assert!(map.actual_type_argument(&factory, "X").is_none());

    let TypeInfo::Parameterized(pt) = &map else {
        panic!("expected a parameterized type");
    };
    assert_eq!(pt.raw_type().to_string(), "Map<K, V>");
}

#[test]
fn parameterized_types_compare_structurally() {
    let factory = factory();
    let a = ty(&factory, STRING_LIST);
    let b = ty(&factory, STRING_LIST);
    let c = ty(&factory, "Ljava/util/ArrayList<Ljava/lang/Integer;>;");

    assert_eq!(a, b);
    assert_ne!(a, c);

    let set: HashSet<TypeInfo> = [a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn factory_builds_parameterized_types() {
    let factory = factory();
    let raw = ty(&factory, "java.util.List");
    let string = ty(&factory, "java.lang.String");

    let list = factory.parameterized(&raw, vec![string.clone()]);
    assert_eq!(list.to_string(), "List<E=String>");
    assert_eq!(list, ty(&factory, "Ljava/util/List<Ljava/lang/String;>;"));
}

#[test]
fn argument_count_must_match() {
    let factory = factory();
    let raw = ty(&factory, "java.util.Map");
    let string = ty(&factory, "java.lang.String");

    assert_eq!(
        factory.try_parameterized(&raw, vec![string]),
        Err(TypeError::ArgumentCountMismatch {
            class: "java.util.Map".to_string(),
            expected: 2,
            actual: 1,
        })
    );
}

#[test]
fn arguments_must_satisfy_bounds() {
    let factory = factory();
    let holder = ty(&factory, "test.Holder");

    let err = factory
        .try_parameterized(&holder, vec![ty(&factory, "java.lang.String")])
        .unwrap_err();
    assert!(
        matches!(&err, TypeError::BoundViolation { param, actual, .. } if param == "T" && actual == "java.lang.String"),
        "unexpected error: {err}"
    );

    let ok = factory.try_parameterized(&holder, vec![ty(&factory, "java.lang.Integer")]);
    assert_eq!(ok.unwrap().to_string(), "Holder<T=Integer>");
}

#[test]
fn only_generic_raw_types_can_be_parameterized() {
    let factory = factory();
    let string = ty(&factory, "java.lang.String");

    assert_eq!(
        factory.try_parameterized(&string, vec![]),
        Err(TypeError::NotGeneric("java.lang.String".to_string()))
    );

    let list = ty(&factory, "Ljava/util/List<Ljava/lang/String;>;");
    assert!(matches!(
        factory.try_parameterized(&list, vec![string]),
        Err(TypeError::NotRawType(_))
    ));
}

#[test]
#[should_panic(expected = "is not a generic type")]
fn parameterizing_a_plain_class_panics() {
    let factory = factory();
    let string = ty(&factory, "java.lang.String");
    factory.parameterized(&string, vec![]);
}

#[test]
fn open_arguments_resolve_in_context() {
    let factory = factory();
    let holder = ty(&factory, "test.Holder");
    let items = factory.field(&holder, "items").unwrap();
    assert_eq!(items.field_type().to_string(), "List<E=T>");

    let integers = ty(&factory, "Ltest/Holder<Ljava/lang/Integer;>;");
    assert_eq!(
        items
            .field_type()
            .resolve(&factory, Context::Type(&integers), false)
            .to_string(),
        "List<E=Integer>"
    );
    assert_eq!(
        items
            .field_type()
            .resolve(&factory, Context::Type(&holder), true)
            .to_string(),
        "List<E=Number>"
    );
    assert!(items
        .field_type()
        .resolve(&factory, Context::Type(&holder), false)
        .ptr_eq(items.field_type()));
}

#[test]
fn unknown_argument_resolves_to_formal_bound() {
    let factory = factory();
    let holder = ty(&factory, "Ltest/Holder<*>;");

    assert_eq!(holder.to_string(), "Holder<T=? extends Number>");
    assert_eq!(
        holder.resolve(&factory, Context::Unbound, true).to_string(),
        "Holder<T=Number>"
    );
}

#[test]
fn resolving_a_rebuilt_type_again_returns_it_unchanged() {
    let factory = factory();
    let holder = ty(&factory, "test.Holder");
    let index = factory.field(&holder, "index").unwrap();
    let open = index.field_type();
    assert_eq!(open.to_string(), "List<E=Map<K=T, V=List<E=? extends T>>>");

    let integers = ty(&factory, "Ltest/Holder<Ljava/lang/Integer;>;");
    let resolved = open.resolve(&factory, Context::Type(&integers), false);
    assert_eq!(
        resolved.to_string(),
        "List<E=Map<K=Integer, V=List<E=Integer>>>"
    );
    assert!(!resolved.ptr_eq(open));
    assert!(resolved
        .resolve(&factory, Context::Type(&integers), false)
        .ptr_eq(&resolved));

    let bounded = open.resolve(&factory, Context::Type(&holder), true);
    assert_eq!(bounded.to_string(), "List<E=Map<K=Number, V=List<E=Number>>>");
    assert!(bounded
        .resolve(&factory, Context::Type(&holder), true)
        .ptr_eq(&bounded));
}
