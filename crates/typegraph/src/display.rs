use std::fmt;

use crate::types::{BoundedType, TypeInfo};

/// Source-like rendering with simple class names:
///
/// * raw types list their parameters, `List<E>`, `Map<K, V>`, `int`;
/// * parameterized types pair parameters with arguments, `List<E=String>`;
/// * arrays append `[]` per dimension;
/// * type variables print their name;
/// * wildcards print `?`, `? extends U` or `? super L`.
impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeInfo::Raw(raw) => {
                f.write_str(&raw.erasure().simple_name())?;
                let params = &raw.decl().type_params;
                if !params.is_empty() {
                    f.write_str("<")?;
                    for (idx, param) in params.iter().enumerate() {
                        if idx > 0 {
                            f.write_str(", ")?;
                        }
                        f.write_str(&param.name)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeInfo::Parameterized(pt) => {
                f.write_str(&pt.raw().erasure().simple_name())?;
                f.write_str("<")?;
                let params = &pt.raw().decl().type_params;
                for (idx, (param, arg)) in params.iter().zip(pt.actual_type_arguments()).enumerate()
                {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={arg}", param.name)?;
                }
                f.write_str(">")
            }
            TypeInfo::Array(array) => {
                write!(f, "{}", array.component_type())?;
                for _ in 0..array.dimension() {
                    f.write_str("[]")?;
                }
                Ok(())
            }
            TypeInfo::Variable(var) => f.write_str(var.name()),
            TypeInfo::Wildcard(wildcard) => {
                write_wildcard(f, &**wildcard, wildcard.is_unknown())
            }
            TypeInfo::UnknownWildcard(wildcard) => {
                write_wildcard(f, &**wildcard, wildcard.is_unbounded())
            }
        }
    }
}

fn write_wildcard(
    f: &mut fmt::Formatter<'_>,
    wildcard: &dyn BoundedType,
    unbounded: bool,
) -> fmt::Result {
    let (keyword, bounds) = if !wildcard.lower_bounds().is_empty() {
        ("super", wildcard.lower_bounds())
    } else if unbounded {
        return f.write_str("?");
    } else {
        ("extends", wildcard.upper_bounds())
    };
    write!(f, "? {keyword} ")?;
    for (idx, bound) in bounds.iter().enumerate() {
        if idx > 0 {
            f.write_str(" & ")?;
        }
        write!(f, "{bound}")?;
    }
    Ok(())
}
