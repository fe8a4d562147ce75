use pretty_assertions::assert_eq;
use typegraph_reflect::{
    ClassStub, ClassUniverse, Erasure, FieldStub, LookupError, MethodStub, ACC_PRIVATE,
    ACC_PROTECTED, ACC_PUBLIC,
};

fn universe() -> ClassUniverse {
    let mut universe = ClassUniverse::with_minimal_jdk();
    universe
        .insert(
            ClassStub::class("demo.Base")
                .method(MethodStub::new("inherited", ACC_PUBLIC, "(I)V"))
                .method(MethodStub::new("hidden", ACC_PRIVATE, "()V"))
                .field(FieldStub::new("count", ACC_PROTECTED, "I")),
        )
        .unwrap();
    universe
        .insert(
            ClassStub::class("demo.Derived")
                .extends("demo.Base")
                .method(MethodStub::constructor(ACC_PROTECTED, "(II)V"))
                .method(MethodStub::new("own", ACC_PRIVATE, "(Ljava/lang/String;)V")),
        )
        .unwrap();
    universe
}

#[test]
fn public_methods_are_found_through_superclasses() {
    let universe = universe();
    let method = universe
        .method("demo.Derived", "inherited", &[Erasure::class("int")])
        .unwrap();
    assert_eq!(&**method.declaring_class(), "demo.Base");

    let size = universe.method("java.util.ArrayList", "size", &[]).unwrap();
    assert_eq!(&**size.declaring_class(), "java.util.Collection");
}

#[test]
fn non_public_methods_are_only_found_when_declared() {
    let universe = universe();
    let own = universe
        .method("demo.Derived", "own", &[Erasure::class("java.lang.String")])
        .unwrap();
    assert_eq!(own.name(), "own");

    let err = universe.method("demo.Derived", "hidden", &[]).unwrap_err();
    assert_eq!(
        err,
        LookupError::NoSuchMethod {
            class: "demo.Derived".into(),
            name: "hidden".to_string(),
            params: String::new(),
        }
    );
}

#[test]
fn constructors_and_fields_are_declared_lookups() {
    let universe = universe();
    let ctor = universe
        .constructor("demo.Derived", &[Erasure::class("int"), Erasure::class("int")])
        .unwrap();
    assert!(ctor.is_constructor());
    assert!(universe.constructor("demo.Derived", &[]).is_err());

    assert!(universe.declared_field("demo.Base", "count").is_ok());
    assert_eq!(
        universe.declared_field("demo.Derived", "count").unwrap_err(),
        LookupError::NoSuchField {
            class: "demo.Derived".into(),
            name: "count".to_string(),
        }
    );
    assert_eq!(
        universe.declared_field("demo.Nope", "count").unwrap_err(),
        LookupError::UnknownClass("demo.Nope".into())
    );
}
