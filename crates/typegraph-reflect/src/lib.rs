//! Reflected type graph consumed by `typegraph`.
//!
//! Classes are described as [`ClassStub`]s (the information a class file
//! carries: names, access flags, descriptors and generic signatures) and
//! lowered into a [`ClassUniverse`], which answers the questions a runtime
//! reflection API would: generic superclass and interfaces, type parameters
//! and their bounds, member signatures, assignability and member lookup.

#![forbid(unsafe_code)]

mod error;
mod jdk;
mod signature;
mod stub;
mod types;
mod universe;

pub use crate::error::{LookupError, ReflectError, Result};
pub use crate::jdk::minimal_jdk_stubs;
pub use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, BaseType,
    ClassSignature, ClassTypeSignature, MethodSignature, TypeArgument, TypeParameter,
    TypeSignature,
};
pub use crate::stub::{
    ClassStub, FieldStub, MethodStub, UniverseFile, ACC_ABSTRACT, ACC_FINAL, ACC_INTERFACE,
    ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC, ACC_VARARGS, CONSTRUCTOR_NAME,
};
pub use crate::types::{
    is_primitive_name, simple_class_name, ClassName, DeclarationRef, Erasure, MemberKey,
    ReflectType, TypeVar, PRIMITIVES,
};
pub use crate::universe::{
    ClassDecl, ClassKind, ClassUniverse, FieldDecl, MethodDecl, TypeParamDecl, ARRAY_INTERFACES,
    OBJECT,
};

/// Parses a user-supplied type: either a JVM signature
/// (`Ljava/util/List<Ljava/lang/String;>;`, `[I`) or a dotted erasure
/// (`java.lang.String[][]`).
///
/// Type variables cannot be named this way; a signature mentioning one fails
/// with [`ReflectError::UnboundTypeVariable`].
pub fn parse_type(universe: &ClassUniverse, text: &str) -> Result<ReflectType> {
    let text = text.trim();
    let looks_like_signature = text.ends_with(';')
        || text.starts_with('[')
        || (text.len() == 1 && text != "V" && parse_field_signature(text).is_ok());
    if !looks_like_signature {
        return Ok(ReflectType::Class(text.parse::<Erasure>()?));
    }
    let sig = parse_field_signature(text)?;
    universe.lower_standalone(&sig)
}
