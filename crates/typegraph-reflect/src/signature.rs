//! Parser for JVM generic signatures (JVMS §4.7.9.1).
//!
//! Plain descriptors are a subset of the signature grammar, so the same entry
//! points accept `Ljava/lang/String;` and `(I)V` as well.

use crate::error::{ReflectError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub fn name(self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }

    fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            'B' => BaseType::Byte,
            'C' => BaseType::Char,
            'D' => BaseType::Double,
            'F' => BaseType::Float,
            'I' => BaseType::Int,
            'J' => BaseType::Long,
            'S' => BaseType::Short,
            'Z' => BaseType::Boolean,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Class(ClassTypeSignature),
    TypeVariable(String),
    Array(Box<TypeSignature>),
}

/// `Lpkg/Outer<..>.Inner<..>;` flattens to `pkg.Outer$Inner` with the
/// innermost type arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    pub name: String,
    pub args: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    Any,
    Exact(TypeSignature),
    Extends(TypeSignature),
    Super(TypeSignature),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<TypeSignature>,
    pub interface_bounds: Vec<TypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_params: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_params: Vec<TypeParameter>,
    pub params: Vec<TypeSignature>,
    /// `None` for `void`.
    pub return_type: Option<TypeSignature>,
    pub throws: Vec<TypeSignature>,
}

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature> {
    class_signature(sig).ok_or_else(|| ReflectError::InvalidSignature(sig.to_string()))
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    method_signature(sig).ok_or_else(|| ReflectError::InvalidSignature(sig.to_string()))
}

pub fn parse_field_signature(sig: &str) -> Result<TypeSignature> {
    match type_signature(sig) {
        Some((ty, "")) => Ok(ty),
        _ => Err(ReflectError::InvalidSignature(sig.to_string())),
    }
}

fn class_signature(input: &str) -> Option<ClassSignature> {
    let (type_params, rest) = type_parameters(input)?;
    let (super_class, mut rest) = class_type(rest)?;
    let mut interfaces = Vec::new();
    while !rest.is_empty() {
        let (interface, next) = class_type(rest)?;
        interfaces.push(interface);
        rest = next;
    }
    Some(ClassSignature {
        type_params,
        super_class,
        interfaces,
    })
}

fn method_signature(input: &str) -> Option<MethodSignature> {
    let (type_params, rest) = type_parameters(input)?;
    let mut rest = rest.strip_prefix('(')?;

    let mut params = Vec::new();
    loop {
        if let Some(next) = rest.strip_prefix(')') {
            rest = next;
            break;
        }
        let (param, next) = type_signature(rest)?;
        params.push(param);
        rest = next;
    }

    let return_type = match rest.strip_prefix('V') {
        Some(next) => {
            rest = next;
            None
        }
        None => {
            let (ty, next) = type_signature(rest)?;
            rest = next;
            Some(ty)
        }
    };

    let mut throws = Vec::new();
    while let Some(next) = rest.strip_prefix('^') {
        let (ty, next) = reference_type(next)?;
        throws.push(ty);
        rest = next;
    }

    rest.is_empty().then_some(MethodSignature {
        type_params,
        params,
        return_type,
        throws,
    })
}

fn type_parameters(input: &str) -> Option<(Vec<TypeParameter>, &str)> {
    let Some(mut rest) = input.strip_prefix('<') else {
        return Some((Vec::new(), input));
    };

    let mut params = Vec::new();
    loop {
        if let Some(next) = rest.strip_prefix('>') {
            return (!params.is_empty()).then_some((params, next));
        }

        let (name, next) = identifier_until(rest, &[':'])?;
        let next = next.strip_prefix(':')?;
        let (class_bound, mut next) = if next.starts_with(['L', 'T', '[']) {
            let (bound, next) = reference_type(next)?;
            (Some(bound), next)
        } else {
            (None, next)
        };

        let mut interface_bounds = Vec::new();
        while let Some(after) = next.strip_prefix(':') {
            let (bound, after) = reference_type(after)?;
            interface_bounds.push(bound);
            next = after;
        }

        params.push(TypeParameter {
            name: name.to_string(),
            class_bound,
            interface_bounds,
        });
        rest = next;
    }
}

fn type_signature(input: &str) -> Option<(TypeSignature, &str)> {
    let mut chars = input.chars();
    let first = chars.next()?;
    let rest = chars.as_str();

    if let Some(base) = BaseType::from_char(first) {
        return Some((TypeSignature::Base(base), rest));
    }

    match first {
        'L' => {
            let (class, rest) = class_type(input)?;
            Some((TypeSignature::Class(class), rest))
        }
        'T' => {
            let (name, rest) = identifier_until(rest, &[';'])?;
            Some((TypeSignature::TypeVariable(name.to_string()), &rest[1..]))
        }
        '[' => {
            let (component, rest) = type_signature(rest)?;
            Some((TypeSignature::Array(Box::new(component)), rest))
        }
        _ => None,
    }
}

fn reference_type(input: &str) -> Option<(TypeSignature, &str)> {
    match type_signature(input)? {
        (TypeSignature::Base(_), _) => None,
        parsed => Some(parsed),
    }
}

fn class_type(input: &str) -> Option<(ClassTypeSignature, &str)> {
    let rest = input.strip_prefix('L')?;
    let (outer, mut rest) = identifier_until(rest, &['<', ';', '.'])?;
    let mut name = outer.replace('/', ".");
    let mut args = Vec::new();

    loop {
        if let Some(next) = rest.strip_prefix('<') {
            let (parsed, next) = type_arguments(next)?;
            args = parsed;
            rest = next;
        }
        if let Some(next) = rest.strip_prefix('.') {
            let (inner, next) = identifier_until(next, &['<', ';', '.'])?;
            name.push('$');
            name.push_str(inner);
            args = Vec::new();
            rest = next;
            continue;
        }
        let rest = rest.strip_prefix(';')?;
        return Some((ClassTypeSignature { name, args }, rest));
    }
}

fn type_arguments(input: &str) -> Option<(Vec<TypeArgument>, &str)> {
    let mut args = Vec::new();
    let mut rest = input;
    loop {
        if let Some(next) = rest.strip_prefix('>') {
            return (!args.is_empty()).then_some((args, next));
        }
        let (arg, next) = type_argument(rest)?;
        args.push(arg);
        rest = next;
    }
}

fn type_argument(input: &str) -> Option<(TypeArgument, &str)> {
    if let Some(rest) = input.strip_prefix('*') {
        return Some((TypeArgument::Any, rest));
    }
    if let Some(rest) = input.strip_prefix('+') {
        let (ty, rest) = reference_type(rest)?;
        return Some((TypeArgument::Extends(ty), rest));
    }
    if let Some(rest) = input.strip_prefix('-') {
        let (ty, rest) = reference_type(rest)?;
        return Some((TypeArgument::Super(ty), rest));
    }
    let (ty, rest) = reference_type(input)?;
    Some((TypeArgument::Exact(ty), rest))
}

/// Splits off a non-empty identifier ending right before one of `stops`.
fn identifier_until<'a>(input: &'a str, stops: &[char]) -> Option<(&'a str, &'a str)> {
    let end = input.find(|ch| stops.contains(&ch))?;
    let ident = &input[..end];
    let valid = !ident.is_empty() && !ident.contains(['<', '>', ';', ':', '[', '^', '(', ')']);
    valid.then(|| (ident, &input[end..]))
}
