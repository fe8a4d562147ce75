use thiserror::Error;
use typegraph_reflect::LookupError;

/// Violations of type construction preconditions.
///
/// The panicking constructors of [`TypeFactory`](crate::TypeFactory) report
/// these as panics; the `try_` variants return them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("unknown class {0}")]
    UnknownClass(String),
    #[error("{0} is not a generic type")]
    NotGeneric(String),
    #[error("{0} is not a raw class type")]
    NotRawType(String),
    #[error("actual arguments length does not match for {class}: expected {expected}, actual {actual}")]
    ArgumentCountMismatch {
        class: String,
        expected: usize,
        actual: usize,
    },
    #[error("actual argument of type parameter {param} of {class} should be assignable to {bound}, but was {actual}")]
    BoundViolation {
        class: String,
        param: String,
        bound: String,
        actual: String,
    },
    #[error("upper bounds of {0} must not be empty")]
    EmptyBounds(String),
    #[error("array dimension must be positive")]
    ZeroDimension,
    #[error("well-known type {0} is missing from the class universe")]
    UnknownWellKnownType(String),
}

/// Member lookup failures, wrapping the reflective cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberError {
    #[error("method not found: {cause}")]
    MethodNotFound {
        #[source]
        cause: LookupError,
    },
    #[error("field not found: {cause}")]
    FieldNotFound {
        #[source]
        cause: LookupError,
    },
}
