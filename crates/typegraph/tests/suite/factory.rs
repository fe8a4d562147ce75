use std::sync::Arc;

use pretty_assertions::assert_eq;
use typegraph::{TypeError, TypeFactory, TypeSystemConfig};
use typegraph_reflect::ClassUniverse;

use super::{factory, names, ty, universe};

#[test]
fn universe_without_well_known_types_is_rejected() {
    let err = TypeFactory::new(Arc::new(ClassUniverse::new())).unwrap_err();
    assert_eq!(
        err,
        TypeError::UnknownWellKnownType("java.lang.Object".to_string())
    );
}

#[test]
fn configured_classes_must_exist() {
    let config = TypeSystemConfig::load_from_str(
        r#"
array_interfaces = ["java.lang.Cloneable", "java.io.Missing"]
"#,
    )
    .unwrap();
    let err = TypeFactory::with_config(universe(), config).unwrap_err();
    assert_eq!(
        err,
        TypeError::UnknownWellKnownType("java.io.Missing".to_string())
    );
}

#[test]
fn array_interfaces_come_from_config() {
    let config = TypeSystemConfig::load_from_str(
        r#"
array_interfaces = ["java.io.Serializable"]
"#,
    )
    .unwrap();
    let factory = TypeFactory::with_config(universe(), config).unwrap();
    let ints = ty(&factory, "int[]");

    assert_eq!(
        names(ints.supertypes(&factory)),
        vec!["int[]", "Serializable", "Object"]
    );
    assert_eq!(names(factory.array_supertypes()), vec!["Serializable", "Object"]);
}

#[test]
fn unchecked_exceptions_come_from_config() {
    let config = TypeSystemConfig::load_from_str(
        r#"
unchecked_exceptions = ["java.lang.RuntimeException", "java.io.IOException"]
"#,
    )
    .unwrap();
    let factory = TypeFactory::with_config(universe(), config).unwrap();
    let thrower = ty(&factory, "test.Thrower");
    let run = factory.method(&thrower, "run", &[]).unwrap();

    assert!(run.effective_exception_types().is_empty());
    assert!(factory.is_unchecked(&"java.io.FileNotFoundException".parse().unwrap()));
    assert!(!factory.is_unchecked(&"java.lang.Error".parse().unwrap()));
}

#[test]
fn primitive_wrappers() {
    let factory = factory();

    let int = ty(&factory, "int");
    assert_eq!(factory.primitive_wrapper(&int).to_string(), "Integer");
    assert_eq!(
        factory.primitive_wrapper(&ty(&factory, "void")).to_string(),
        "Void"
    );

    let string = ty(&factory, "java.lang.String");
    assert!(factory.primitive_wrapper(&string).ptr_eq(&string));

    // Bounded types map to their base.
    let holder = ty(&factory, "test.Holder");
    let var = typegraph::TypeInfo::Variable(holder.type_parameters()[0].clone());
    assert_eq!(factory.primitive_wrapper(&var).to_string(), "Number");
}

#[test]
fn well_known_types() {
    let factory = factory();
    assert_eq!(factory.root_type().name(), "java.lang.Object");
    assert_eq!(factory.void_type().to_string(), "void");
    assert!(factory.void_type().is_primitive());
    assert!(factory.raw("java.lang.Missing").is_none());
    assert!(factory
        .class_type(&"java.lang.String[]".parse().unwrap())
        .is_some_and(|ty| ty.is_array()));
}

#[test]
fn build_all_shares_one_building_cache() {
    let factory = factory();
    let universe = factory.universe().clone();
    let types = ["Ljava/util/List<Ljava/lang/String;>;", "java.lang.Enum", "[I"]
        .iter()
        .map(|text| typegraph_reflect::parse_type(&universe, text).unwrap())
        .collect::<Vec<_>>();

    assert_eq!(
        names(factory.build_all(&types)),
        vec!["List<E=String>", "Enum<E>", "int[]"]
    );
}

#[test]
fn stats_count_interned_work() {
    let factory = factory();
    let list = ty(&factory, "java.util.ArrayList");
    list.supertypes(&factory);
    list.supertypes(&factory);

    let stats = factory.stats();
    assert_eq!(stats.lattices_computed, 1);
    assert_eq!(stats.cache_races_lost, 0);
    assert!(stats.raw_types_built >= 9);
    assert_eq!(stats.interned_members, 0);

    let thrower = ty(&factory, "test.Thrower");
    factory.method(&thrower, "run", &[]).unwrap();
    assert_eq!(factory.stats().interned_members, 1);
}
