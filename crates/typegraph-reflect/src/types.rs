use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ReflectError;

/// Binary class name with `.` package separators and `$` for nested classes,
/// e.g. `java.util.Map$Entry`.
pub type ClassName = Arc<str>;

/// Names of the primitive types, `void` included.
pub const PRIMITIVES: [&str; 9] = [
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void",
];

pub fn is_primitive_name(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// Nominal type identity with every generic parameter stripped.
///
/// Array classes carry their dimension; `int[][]` is `Erasure { class: "int", dimensions: 2 }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Erasure {
    pub class: ClassName,
    pub dimensions: u32,
}

impl Erasure {
    pub fn class(name: impl Into<ClassName>) -> Self {
        Self {
            class: name.into(),
            dimensions: 0,
        }
    }

    pub fn array(name: impl Into<ClassName>, dimensions: u32) -> Self {
        Self {
            class: name.into(),
            dimensions,
        }
    }

    pub fn is_array(&self) -> bool {
        self.dimensions > 0
    }

    /// The element class with every array dimension removed.
    pub fn component(&self) -> Erasure {
        Erasure::class(self.class.clone())
    }

    /// The erasure one array dimension down, or `None` for a non-array.
    pub fn element(&self) -> Option<Erasure> {
        (self.dimensions > 0).then(|| Erasure::array(self.class.clone(), self.dimensions - 1))
    }

    pub fn with_dimensions(&self, dimensions: u32) -> Erasure {
        Erasure::array(self.class.clone(), dimensions)
    }

    /// Class name without its package, followed by one `[]` per dimension.
    pub fn simple_name(&self) -> String {
        let mut out = simple_class_name(&self.class).to_string();
        for _ in 0..self.dimensions {
            out.push_str("[]");
        }
        out
    }
}

/// `java.util.Map$Entry` -> `Map$Entry`.
pub fn simple_class_name(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

impl fmt::Display for Erasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class)?;
        for _ in 0..self.dimensions {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

impl FromStr for Erasure {
    type Err = ReflectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim();
        let mut dimensions = 0;
        while let Some(stripped) = rest.strip_suffix("[]") {
            rest = stripped.trim_end();
            dimensions += 1;
        }

        let valid = !rest.is_empty()
            && rest
                .split('.')
                .all(|segment| !segment.is_empty() && segment.chars().all(is_identifier_char));
        if !valid {
            return Err(ReflectError::InvalidTypeName(s.to_string()));
        }

        Ok(Erasure::array(rest, dimensions))
    }
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Identifies a method or constructor inside its declaring class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
    pub class: ClassName,
    pub name: Arc<str>,
    pub descriptor: Arc<str>,
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class, self.name, self.descriptor)
    }
}

/// Anything that can introduce type parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclarationRef {
    Class(ClassName),
    Method(MemberKey),
    Constructor(MemberKey),
}

impl DeclarationRef {
    pub fn is_class(&self) -> bool {
        matches!(self, DeclarationRef::Class(_))
    }

    /// The class that owns this declaration (itself for a class).
    pub fn owner_class(&self) -> &ClassName {
        match self {
            DeclarationRef::Class(name) => name,
            DeclarationRef::Method(key) | DeclarationRef::Constructor(key) => &key.class,
        }
    }
}

impl fmt::Display for DeclarationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationRef::Class(name) => write!(f, "class {name}"),
            DeclarationRef::Method(key) => write!(f, "method {key}"),
            DeclarationRef::Constructor(key) => write!(f, "constructor {key}"),
        }
    }
}

/// A type variable reference, bound to the declaration that introduced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVar {
    pub name: Arc<str>,
    pub owner: DeclarationRef,
}

/// A node of the reflected type graph.
///
/// This is the closed set of shapes a runtime reflection API hands out:
/// a nominal (possibly array) class, a generic array, a parameterized type,
/// a type variable, or a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReflectType {
    Class(Erasure),
    GenericArray(Box<ReflectType>),
    Parameterized {
        raw: ClassName,
        args: Vec<ReflectType>,
    },
    Variable(TypeVar),
    Wildcard {
        upper: Vec<ReflectType>,
        lower: Vec<ReflectType>,
    },
}

impl ReflectType {
    pub fn class(name: impl Into<ClassName>) -> Self {
        ReflectType::Class(Erasure::class(name))
    }

    /// Class named by a nominal or parameterized node.
    pub fn class_name(&self) -> Option<&ClassName> {
        match self {
            ReflectType::Class(erasure) if !erasure.is_array() => Some(&erasure.class),
            ReflectType::Parameterized { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

impl fmt::Display for ReflectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectType::Class(erasure) => write!(f, "{erasure}"),
            ReflectType::GenericArray(component) => write!(f, "{component}[]"),
            ReflectType::Parameterized { raw, args } => {
                write!(f, "{raw}<")?;
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            ReflectType::Variable(var) => f.write_str(&var.name),
            ReflectType::Wildcard { upper, lower } => {
                if let Some(lower) = lower.first() {
                    write!(f, "? super {lower}")
                } else if let Some(upper) = upper.first() {
                    write!(f, "? extends {upper}")
                } else {
                    f.write_str("?")
                }
            }
        }
    }
}
