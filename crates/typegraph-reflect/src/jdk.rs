//! A small slice of the JDK: enough of `java.lang`, `java.io` and
//! `java.util` to exercise supertype lattices, bounds and exception
//! pruning without a real class path.

use crate::stub::{
    ClassStub, MethodStub, ACC_ABSTRACT, ACC_FINAL, ACC_PROTECTED, ACC_PUBLIC,
};
use crate::universe::{ClassUniverse, OBJECT};

const PUBLIC_ABSTRACT: u16 = ACC_PUBLIC | ACC_ABSTRACT;
const PUBLIC_FINAL: u16 = ACC_PUBLIC | ACC_FINAL;

impl ClassUniverse {
    /// Primitives plus the minimal JDK returned by [`minimal_jdk_stubs`].
    pub fn with_minimal_jdk() -> Self {
        let mut universe = Self::new();
        for stub in minimal_jdk_stubs() {
            universe
                .insert(stub)
                .expect("minimal JDK stubs are well-formed and unique");
        }
        universe
    }
}

pub fn minimal_jdk_stubs() -> Vec<ClassStub> {
    let mut stubs = Vec::new();

    let mut object = ClassStub::class(OBJECT)
        .method(MethodStub::constructor(ACC_PUBLIC, "()V"))
        .method(MethodStub::new("equals", ACC_PUBLIC, "(Ljava/lang/Object;)Z"))
        .method(MethodStub::new("hashCode", ACC_PUBLIC, "()I"))
        .method(MethodStub::new("toString", ACC_PUBLIC, "()Ljava/lang/String;"))
        .method(MethodStub::new("clone", ACC_PROTECTED, "()Ljava/lang/Object;"))
        .method(
            MethodStub::new("getClass", PUBLIC_FINAL, "()Ljava/lang/Class;")
                .signature("()Ljava/lang/Class<*>;"),
        );
    object.super_class = None;
    stubs.push(object);

    stubs.push(ClassStub::interface("java.lang.Cloneable"));
    stubs.push(ClassStub::interface("java.io.Serializable"));
    stubs.push(ClassStub::interface("java.io.Externalizable").implements("java.io.Serializable"));
    stubs.push(
        ClassStub::interface("java.lang.Comparable")
            .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
            .method(
                MethodStub::new("compareTo", PUBLIC_ABSTRACT, "(Ljava/lang/Object;)I")
                    .signature("(TT;)I"),
            ),
    );
    stubs.push(
        ClassStub::interface("java.lang.CharSequence")
            .method(MethodStub::new("length", PUBLIC_ABSTRACT, "()I"))
            .method(MethodStub::new("charAt", PUBLIC_ABSTRACT, "(I)C")),
    );
    stubs.push(
        ClassStub::class("java.lang.String")
            .access(PUBLIC_FINAL)
            .signature(
                "Ljava/lang/Object;Ljava/io/Serializable;Ljava/lang/Comparable<Ljava/lang/String;>;Ljava/lang/CharSequence;",
            )
            .method(MethodStub::constructor(ACC_PUBLIC, "()V"))
            .method(MethodStub::new("length", ACC_PUBLIC, "()I"))
            .method(MethodStub::new("charAt", ACC_PUBLIC, "(I)C"))
            .method(MethodStub::new("substring", ACC_PUBLIC, "(II)Ljava/lang/String;"))
            .method(MethodStub::new("compareTo", ACC_PUBLIC, "(Ljava/lang/String;)I")),
    );
    stubs.push(
        ClassStub::class("java.lang.Number")
            .access(PUBLIC_ABSTRACT)
            .implements("java.io.Serializable")
            .method(MethodStub::constructor(ACC_PUBLIC, "()V"))
            .method(MethodStub::new("intValue", PUBLIC_ABSTRACT, "()I")),
    );

    for (name, primitive) in [
        ("Byte", "B"),
        ("Short", "S"),
        ("Integer", "I"),
        ("Long", "J"),
        ("Float", "F"),
        ("Double", "D"),
    ] {
        stubs.push(wrapper(name, "java/lang/Number", primitive));
    }
    stubs.push(wrapper("Boolean", "java/lang/Object", "Z"));
    stubs.push(wrapper("Character", "java/lang/Object", "C"));
    stubs.push(ClassStub::class("java.lang.Void").access(PUBLIC_FINAL));

    stubs.push(
        ClassStub::class("java.lang.Class")
            .access(PUBLIC_FINAL)
            .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;Ljava/io/Serializable;")
            .method(MethodStub::new("getName", ACC_PUBLIC, "()Ljava/lang/String;")),
    );
    stubs.push(
        ClassStub::class("java.lang.Enum")
            .access(PUBLIC_ABSTRACT)
            .signature(
                "<E:Ljava/lang/Enum<TE;>;>Ljava/lang/Object;Ljava/lang/Comparable<TE;>;Ljava/io/Serializable;",
            )
            .method(MethodStub::constructor(ACC_PROTECTED, "(Ljava/lang/String;I)V"))
            .method(MethodStub::new("name", PUBLIC_FINAL, "()Ljava/lang/String;"))
            .method(MethodStub::new("ordinal", PUBLIC_FINAL, "()I"))
            .method(
                MethodStub::new("compareTo", PUBLIC_FINAL, "(Ljava/lang/Enum;)I").signature("(TE;)I"),
            ),
    );

    stubs.push(
        ClassStub::class("java.lang.Throwable")
            .implements("java.io.Serializable")
            .method(MethodStub::constructor(ACC_PUBLIC, "()V"))
            .method(MethodStub::new("getMessage", ACC_PUBLIC, "()Ljava/lang/String;")),
    );
    for (name, parent) in [
        ("java.lang.Exception", "java.lang.Throwable"),
        ("java.lang.Error", "java.lang.Throwable"),
        ("java.lang.RuntimeException", "java.lang.Exception"),
        ("java.lang.IllegalArgumentException", "java.lang.RuntimeException"),
        ("java.lang.CloneNotSupportedException", "java.lang.Exception"),
        ("java.io.IOException", "java.lang.Exception"),
        ("java.io.FileNotFoundException", "java.io.IOException"),
    ] {
        stubs.push(
            ClassStub::class(name)
                .extends(parent)
                .method(MethodStub::constructor(ACC_PUBLIC, "()V")),
        );
    }

    stubs.push(
        ClassStub::interface("java.util.Iterator")
            .signature("<E:Ljava/lang/Object;>Ljava/lang/Object;")
            .method(MethodStub::new("hasNext", PUBLIC_ABSTRACT, "()Z"))
            .method(MethodStub::new("next", PUBLIC_ABSTRACT, "()Ljava/lang/Object;").signature("()TE;")),
    );
    stubs.push(
        ClassStub::interface("java.lang.Iterable")
            .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
            .method(
                MethodStub::new("iterator", PUBLIC_ABSTRACT, "()Ljava/util/Iterator;")
                    .signature("()Ljava/util/Iterator<TT;>;"),
            ),
    );
    stubs.push(
        ClassStub::interface("java.util.Collection")
            .implements("java.lang.Iterable")
            .signature("<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/lang/Iterable<TE;>;")
            .method(MethodStub::new("size", PUBLIC_ABSTRACT, "()I"))
            .method(
                MethodStub::new("add", PUBLIC_ABSTRACT, "(Ljava/lang/Object;)Z").signature("(TE;)Z"),
            ),
    );
    stubs.push(
        ClassStub::interface("java.util.List")
            .implements("java.util.Collection")
            .signature("<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/Collection<TE;>;")
            .method(
                MethodStub::new("get", PUBLIC_ABSTRACT, "(I)Ljava/lang/Object;").signature("(I)TE;"),
            ),
    );
    stubs.push(ClassStub::interface("java.util.RandomAccess"));
    stubs.push(
        ClassStub::interface("java.util.Map")
            .signature("<K:Ljava/lang/Object;V:Ljava/lang/Object;>Ljava/lang/Object;")
            .method(
                MethodStub::new("get", PUBLIC_ABSTRACT, "(Ljava/lang/Object;)Ljava/lang/Object;")
                    .signature("(Ljava/lang/Object;)TV;"),
            )
            .method(
                MethodStub::new(
                    "put",
                    PUBLIC_ABSTRACT,
                    "(Ljava/lang/Object;Ljava/lang/Object;)Ljava/lang/Object;",
                )
                .signature("(TK;TV;)TV;"),
            ),
    );
    stubs.push(
        ClassStub::class("java.util.AbstractCollection")
            .access(PUBLIC_ABSTRACT)
            .implements("java.util.Collection")
            .signature("<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/Collection<TE;>;")
            .method(MethodStub::constructor(ACC_PROTECTED, "()V")),
    );
    stubs.push(
        ClassStub::class("java.util.AbstractList")
            .access(PUBLIC_ABSTRACT)
            .extends("java.util.AbstractCollection")
            .implements("java.util.List")
            .signature(
                "<E:Ljava/lang/Object;>Ljava/util/AbstractCollection<TE;>;Ljava/util/List<TE;>;",
            )
            .method(MethodStub::constructor(ACC_PROTECTED, "()V")),
    );
    stubs.push(
        ClassStub::class("java.util.ArrayList")
            .extends("java.util.AbstractList")
            .implements("java.util.List")
            .implements("java.util.RandomAccess")
            .implements("java.lang.Cloneable")
            .implements("java.io.Serializable")
            .signature(
                "<E:Ljava/lang/Object;>Ljava/util/AbstractList<TE;>;Ljava/util/List<TE;>;Ljava/util/RandomAccess;Ljava/lang/Cloneable;Ljava/io/Serializable;",
            )
            .method(MethodStub::constructor(ACC_PUBLIC, "()V"))
            .method(MethodStub::constructor(ACC_PUBLIC, "(I)V"))
            .method(
                MethodStub::new("get", ACC_PUBLIC, "(I)Ljava/lang/Object;").signature("(I)TE;"),
            ),
    );

    stubs
}

/// `java.lang.<name>` implementing `Comparable<<name>>` and `Serializable`.
fn wrapper(name: &str, super_class: &str, primitive: &str) -> ClassStub {
    let internal = format!("java/lang/{name}");
    let mut signature = format!("L{super_class};");
    if super_class == "java/lang/Object" {
        signature.push_str("Ljava/io/Serializable;");
    }
    signature.push_str(&format!("Ljava/lang/Comparable<L{internal};>;"));

    ClassStub::class(format!("java.lang.{name}"))
        .access(PUBLIC_FINAL)
        .extends(super_class.replace('/', "."))
        .signature(signature)
        .method(MethodStub::constructor(ACC_PUBLIC, format!("({primitive})V")))
        .method(MethodStub::new(
            "valueOf",
            ACC_PUBLIC | crate::stub::ACC_STATIC,
            format!("({primitive})L{internal};"),
        ))
}
