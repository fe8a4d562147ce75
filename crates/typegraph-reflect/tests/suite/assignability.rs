use pretty_assertions::assert_eq;
use typegraph_reflect::{ClassUniverse, Erasure};

fn erasure(text: &str) -> Erasure {
    text.parse().unwrap()
}

#[test]
fn classes_and_interfaces_follow_the_declared_hierarchy() {
    let universe = ClassUniverse::with_minimal_jdk();

    assert!(universe.is_assignable(&erasure("java.util.List"), &erasure("java.util.ArrayList")));
    assert!(universe.is_assignable(&erasure("java.lang.Iterable"), &erasure("java.util.ArrayList")));
    assert!(universe.is_assignable(&erasure("java.lang.Object"), &erasure("java.util.List")));
    assert!(universe.is_assignable(&erasure("java.io.IOException"), &erasure("java.io.FileNotFoundException")));
    assert!(!universe.is_assignable(&erasure("java.io.FileNotFoundException"), &erasure("java.io.IOException")));
    assert!(!universe.is_assignable(&erasure("java.lang.RuntimeException"), &erasure("java.io.IOException")));
}

#[test]
fn primitives_are_only_assignable_to_themselves() {
    let universe = ClassUniverse::with_minimal_jdk();

    assert!(universe.is_assignable(&erasure("int"), &erasure("int")));
    assert!(!universe.is_assignable(&erasure("long"), &erasure("int")));
    assert!(!universe.is_assignable(&erasure("java.lang.Object"), &erasure("int")));
    assert!(!universe.is_assignable(&erasure("java.lang.Integer"), &erasure("int")));
}

#[test]
fn arrays_are_covariant_and_implement_the_array_interfaces() {
    let universe = ClassUniverse::with_minimal_jdk();

    assert!(universe.is_assignable(&erasure("java.lang.Object[]"), &erasure("java.lang.String[]")));
    assert!(universe.is_assignable(&erasure("java.lang.Object[]"), &erasure("java.lang.String[][]")));
    assert!(universe.is_assignable(&erasure("java.lang.Cloneable[]"), &erasure("int[][]")));
    assert!(universe.is_assignable(&erasure("java.io.Serializable"), &erasure("int[]")));
    assert!(!universe.is_assignable(&erasure("java.lang.Object[]"), &erasure("int[]")));
    assert!(!universe.is_assignable(&erasure("java.lang.Number[]"), &erasure("java.lang.String[]")));
    assert!(!universe.is_assignable(&erasure("java.lang.String[][]"), &erasure("java.lang.String[]")));
    assert_eq!(erasure("int[][]").element(), Some(erasure("int[]")));
}
