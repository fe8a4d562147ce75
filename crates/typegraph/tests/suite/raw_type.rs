use pretty_assertions::assert_eq;
use typegraph::{Context, TypeInfo};

use super::{factory, names, ty};

#[test]
fn class_lattice_lists_superclasses_then_interfaces_breadth_first() {
    let factory = factory();
    let list = ty(&factory, "java.util.ArrayList");

    assert_eq!(
        names(list.supertypes(&factory)),
        vec![
            "ArrayList<E>",
            "AbstractList<E=E>",
            "AbstractCollection<E=E>",
            "List<E=E>",
            "RandomAccess",
            "Cloneable",
            "Serializable",
            "Collection<E=E>",
            "Iterable<T=E>",
            "Object",
        ]
    );
    assert_eq!(
        names(list.superclasses(&factory)),
        vec![
            "ArrayList<E>",
            "AbstractList<E=E>",
            "AbstractCollection<E=E>",
            "Object"
        ]
    );
    assert_eq!(
        names(list.interfaces(&factory)),
        vec![
            "List<E=E>",
            "RandomAccess",
            "Cloneable",
            "Serializable",
            "Collection<E=E>",
            "Iterable<T=E>",
        ]
    );
}

#[test]
fn interface_lattice_ends_with_root() {
    let factory = factory();
    let list = ty(&factory, "java.util.List");

    assert_eq!(
        names(list.supertypes(&factory)),
        vec!["List<E>", "Collection<E=E>", "Iterable<T=E>", "Object"]
    );
    assert_eq!(names(list.superclasses(&factory)), vec!["Object"]);
}

#[test]
fn root_and_primitive_lattices_hold_only_themselves() {
    let factory = factory();

    let object = factory.root_type();
    assert_eq!(names(object.supertypes(&factory)), vec!["Object"]);

    let int = ty(&factory, "int");
    assert!(int.is_primitive());
    assert_eq!(names(int.supertypes(&factory)), vec!["int"]);
    assert!(int.interfaces(&factory).is_empty());
}

#[test]
fn first_lattice_entry_is_the_type_itself() {
    let factory = factory();
    let list = ty(&factory, "java.util.ArrayList");
    assert!(list.supertypes(&factory)[0].ptr_eq(&list));
}

#[test]
fn supertype_finds_declaration_equivalent() {
    let factory = factory();
    let list = ty(&factory, "java.util.ArrayList");

    let collection = list
        .supertype(&factory, &"java.util.Collection".parse().unwrap())
        .unwrap();
    assert_eq!(collection.to_string(), "Collection<E=E>");
    assert!(list
        .supertype(&factory, &"java.util.Map".parse().unwrap())
        .is_none());
}

#[test]
fn raw_type_properties() {
    let factory = factory();
    let map = ty(&factory, "java.util.Map");

    assert_eq!(map.name(), "java.util.Map");
    assert_eq!(map.simple_name(), "Map");
    assert_eq!(map.to_string(), "Map<K, V>");
    assert!(map.is_interface());
    assert!(map.is_generic());
    assert!(!map.is_array());
    assert_eq!(map.dimension(), 0);
    assert!(map.component_type().ptr_eq(&map));
    assert!(map.direct_component_type().ptr_eq(&map));
    assert_eq!(
        map.type_parameters()
            .iter()
            .map(|var| var.name())
            .collect::<Vec<_>>(),
        vec!["K", "V"]
    );

    let string = ty(&factory, "java.lang.String");
    assert!(!string.is_generic());
    assert!(string.type_parameters().is_empty());
}

#[test]
fn raw_actual_arguments_are_resolved_bounds() {
    let factory = factory();

    assert_eq!(
        names(ty(&factory, "java.util.List").actual_type_arguments(&factory)),
        vec!["Object"]
    );
    assert_eq!(
        names(ty(&factory, "test.LocalTest").actual_type_arguments(&factory)),
        vec!["Number", "Number"]
    );
    assert_eq!(
        names(ty(&factory, "test.SelfRef").actual_type_arguments(&factory)),
        vec!["SelfRef<T=SelfRef<T>>"]
    );
    assert_eq!(
        names(ty(&factory, "java.lang.Enum").actual_type_arguments(&factory)),
        vec!["Enum<E=Enum<E>>"]
    );
    assert_eq!(
        ty(&factory, "java.util.Map")
            .actual_type_argument(&factory, "V")
            .map(|arg| arg.to_string()),
        Some("Object".to_string())
    );
}

#[test]
fn raw_type_resolves_to_itself() {
    let factory = factory();
    let list = ty(&factory, "java.util.List");
    let string = ty(&factory, "java.lang.String");

    assert!(list.resolve(&factory, Context::Unbound, true).ptr_eq(&list));
    assert!(list
        .resolve(&factory, Context::Type(&string), false)
        .ptr_eq(&list));
}

#[test]
fn raw_types_are_interned_by_class() {
    let factory = factory();
    let a = ty(&factory, "java.lang.String");
    let b = ty(&factory, "Ljava/lang/String;");
    assert!(a.ptr_eq(&b));
    assert!(matches!(a, TypeInfo::Raw(_)));
}
