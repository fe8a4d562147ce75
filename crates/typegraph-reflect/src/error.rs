use crate::types::ClassName;

pub type Result<T> = std::result::Result<T, ReflectError>;

/// Failures while loading class stubs into a [`crate::ClassUniverse`].
#[derive(Debug, thiserror::Error)]
pub enum ReflectError {
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid type name: {0:?}")]
    InvalidTypeName(String),

    #[error("type variable `{name}` is not in scope in {context}")]
    UnboundTypeVariable { name: String, context: String },

    #[error("class {0} is declared twice")]
    DuplicateClass(ClassName),

    #[error("class {referrer} refers to unknown class {missing}")]
    MissingClass {
        referrer: ClassName,
        missing: ClassName,
    },

    #[error("failed to parse class universe json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read class universe: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the reflective member lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("unknown class {0}")]
    UnknownClass(ClassName),

    #[error("no such method: {class}.{name}({params})")]
    NoSuchMethod {
        class: ClassName,
        name: String,
        params: String,
    },

    #[error("no such field: {class}.{name}")]
    NoSuchField { class: ClassName, name: String },
}
