//! Generic type model and resolution engine over a reflected class universe.
//!
//! A [`TypeFactory`] turns [`ReflectType`]s from a
//! [`ClassUniverse`](typegraph_reflect::ClassUniverse) into [`TypeInfo`]
//! nodes: raw, parameterized and array types, type variables and wildcards.
//! Nodes answer supertype queries through a lazily computed lattice and can
//! be resolved against a context, substituting the type variables the
//! context binds. Methods and fields are reified the same way, with
//! effective exception lists pruned of unchecked and subsumed exceptions.
//!
//! ```
//! use std::sync::Arc;
//! use typegraph::{Context, TypeFactory};
//! use typegraph_reflect::{parse_type, ClassUniverse};
//!
//! let universe = Arc::new(ClassUniverse::with_minimal_jdk());
//! let factory = TypeFactory::new(universe.clone()).unwrap();
//! let list = factory.build(&parse_type(&universe, "Ljava/util/ArrayList<Ljava/lang/String;>;").unwrap());
//! let collection = list.supertype(&factory, &"java.util.Collection".parse().unwrap()).unwrap();
//! let resolved = collection.resolve(&factory, Context::Type(&list), true);
//! assert_eq!(resolved.to_string(), "Collection<E=String>");
//! ```

#![forbid(unsafe_code)]

mod builder;
mod config;
mod declaration;
mod display;
mod error;
mod factory;
mod member;
mod resolve;
mod supertypes;
mod types;

pub use crate::config::{init_tracing, ConfigError, LoggingConfig, TypeSystemConfig};
pub use crate::declaration::GenericDeclaration;
pub use crate::error::{MemberError, TypeError};
pub use crate::factory::{StatsSnapshot, TypeFactory};
pub use crate::member::{FieldInfo, MethodInfo, MethodSignature, Modifiers};
pub use crate::resolve::Context;
pub use crate::supertypes::{Lattice, Supertypes};
pub use crate::types::{
    ArrayType, BoundedType, ParameterizedType, RawType, TypeInfo, TypeVariable, UnknownWildcard,
    WildcardType,
};

pub use typegraph_reflect::{DeclarationRef, Erasure, ReflectType};
