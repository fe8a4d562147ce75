//! Reified methods, constructors and fields.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use typegraph_reflect::{
    Erasure, FieldDecl, LookupError, MemberKey, MethodDecl, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC,
    ACC_STATIC,
};

use crate::error::MemberError;
use crate::factory::TypeFactory;
use crate::resolve::Context;
use crate::types::{TypeInfo, TypeVariable};

/// Access and `static` flags of a member; other flags are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const MASK: u16 = ACC_PRIVATE | ACC_PUBLIC | ACC_PROTECTED | ACC_STATIC;

    pub fn from_access_flags(flags: u16) -> Self {
        Self(flags & Self::MASK)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn is_public(self) -> bool {
        self.0 & ACC_PUBLIC != 0
    }

    pub fn is_protected(self) -> bool {
        self.0 & ACC_PROTECTED != 0
    }

    pub fn is_private(self) -> bool {
        self.0 & ACC_PRIVATE != 0
    }

    pub fn is_static(self) -> bool {
        self.0 & ACC_STATIC != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = [
            (self.is_public(), "public"),
            (self.is_protected(), "protected"),
            (self.is_private(), "private"),
            (self.is_static(), "static"),
        ];
        let mut first = true;
        for (_, word) in words.iter().filter(|(set, _)| *set) {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(word)?;
            first = false;
        }
        Ok(())
    }
}

/// Name plus parameter erasures; what overloads are told apart by.
///
/// Displays as the name followed by the JVM descriptor, `<init>(I)V`.
#[derive(Debug, Clone)]
pub struct MethodSignature {
    name: Arc<str>,
    parameter_types: Vec<Erasure>,
    descriptor: Arc<str>,
}

impl MethodSignature {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_types(&self) -> &[Erasure] {
        &self.parameter_types
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }
}

impl PartialEq for MethodSignature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.parameter_types == other.parameter_types
    }
}

impl Eq for MethodSignature {}

impl Hash for MethodSignature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.parameter_types.hash(state);
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor)
    }
}

/// A method or constructor with its generic types reified.
#[derive(Debug)]
pub struct MethodInfo {
    decl: Arc<MethodDecl>,
    signature: MethodSignature,
    modifiers: Modifiers,
    declaring_type: TypeInfo,
    type_params: Vec<Arc<TypeVariable>>,
    return_type: TypeInfo,
    parameter_types: Vec<TypeInfo>,
    exception_types: Vec<TypeInfo>,
    effective_exception_types: Vec<TypeInfo>,
}

impl MethodInfo {
    pub(crate) fn new(
        factory: &TypeFactory,
        decl: Arc<MethodDecl>,
        declaring_type: TypeInfo,
        type_params: Vec<Arc<TypeVariable>>,
        return_type: TypeInfo,
        parameter_types: Vec<TypeInfo>,
        exception_types: Vec<TypeInfo>,
    ) -> Self {
        let signature = MethodSignature {
            name: decl.key.name.clone(),
            parameter_types: decl.param_erasures.clone(),
            descriptor: decl.key.descriptor.clone(),
        };
        let effective_exception_types = effective_exceptions(factory, &exception_types);
        Self {
            modifiers: Modifiers::from_access_flags(decl.access_flags),
            decl,
            signature,
            declaring_type,
            type_params,
            return_type,
            parameter_types,
            exception_types,
            effective_exception_types,
        }
    }

    pub fn decl(&self) -> &Arc<MethodDecl> {
        &self.decl
    }

    pub fn key(&self) -> &MemberKey {
        &self.decl.key
    }

    pub fn name(&self) -> &str {
        self.signature.name()
    }

    pub fn is_constructor(&self) -> bool {
        self.decl.is_constructor()
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// The declaring class, as a raw type.
    pub fn declaring_type(&self) -> &TypeInfo {
        &self.declaring_type
    }

    pub fn type_parameters(&self) -> &[Arc<TypeVariable>] {
        &self.type_params
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// `void` for constructors.
    pub fn return_type(&self) -> &TypeInfo {
        &self.return_type
    }

    pub fn parameter_types(&self) -> &[TypeInfo] {
        &self.parameter_types
    }

    /// Declared exceptions, in declaration order.
    pub fn exception_types(&self) -> &[TypeInfo] {
        &self.exception_types
    }

    /// Checked exceptions with subsumed entries removed.
    pub fn effective_exception_types(&self) -> &[TypeInfo] {
        &self.effective_exception_types
    }

    /// Each type parameter's base type, resolved within this method.
    pub fn actual_type_arguments(&self, factory: &TypeFactory) -> Vec<TypeInfo> {
        self.type_params
            .iter()
            .map(|var| {
                TypeInfo::Variable(var.clone()).resolve(factory, Context::Method(self), true)
            })
            .collect()
    }

    pub fn actual_type_argument(&self, factory: &TypeFactory, name: &str) -> Option<TypeInfo> {
        let var = self.type_params.iter().find(|var| var.name() == name)?;
        Some(TypeInfo::Variable(var.clone()).resolve(factory, Context::Method(self), true))
    }

    /// Resolves return, parameter and exception types. An unbound context
    /// means the declaring type. Returns `self` when nothing changed.
    pub fn resolve(
        self: &Arc<Self>,
        factory: &TypeFactory,
        context: Context<'_>,
        include_base_type: bool,
    ) -> Arc<MethodInfo> {
        let context = match context {
            Context::Unbound => Context::Type(&self.declaring_type),
            other => other,
        };
        let resolve_all = |types: &[TypeInfo]| -> (Vec<TypeInfo>, bool) {
            let resolved: Vec<TypeInfo> = types
                .iter()
                .map(|ty| ty.resolve(factory, context, include_base_type))
                .collect();
            let changed = types.iter().zip(&resolved).any(|(a, b)| !a.ptr_eq(b));
            (resolved, changed)
        };

        let (parameter_types, params_changed) = resolve_all(&self.parameter_types);
        let (exception_types, exceptions_changed) = resolve_all(&self.exception_types);
        let return_type = self.return_type.resolve(factory, context, include_base_type);
        let return_changed = !return_type.ptr_eq(&self.return_type);

        if !(params_changed || exceptions_changed || return_changed) {
            return self.clone();
        }
        Arc::new(MethodInfo::new(
            factory,
            self.decl.clone(),
            self.declaring_type.clone(),
            self.type_params.clone(),
            return_type,
            parameter_types,
            exception_types,
        ))
    }
}

impl PartialEq for MethodInfo {
    fn eq(&self, other: &Self) -> bool {
        self.decl.key == other.decl.key
            && self.return_type == other.return_type
            && self.parameter_types == other.parameter_types
            && self.exception_types == other.exception_types
    }
}

impl Eq for MethodInfo {}

/// Drops unchecked exceptions; of two related exceptions keeps the wider.
fn effective_exceptions(factory: &TypeFactory, exceptions: &[TypeInfo]) -> Vec<TypeInfo> {
    let universe = factory.universe();
    let mut effective: Vec<TypeInfo> = Vec::with_capacity(exceptions.len());

    for exception in exceptions {
        let erasure = exception.erasure();
        if factory.is_unchecked(&erasure) {
            continue;
        }

        let mut subsumed = false;
        let mut idx = 0;
        while idx < effective.len() {
            let existing = effective[idx].erasure();
            if universe.is_assignable(&erasure, &existing) {
                effective.remove(idx);
            } else if universe.is_assignable(&existing, &erasure) {
                subsumed = true;
                break;
            } else {
                idx += 1;
            }
        }
        if !subsumed {
            effective.push(exception.clone());
        }
    }
    effective
}

impl fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifiers.is_empty() {
            write!(f, "{} ", self.modifiers)?;
        }
        if !self.type_params.is_empty() {
            f.write_str("<")?;
            write_joined(f, self.type_params.iter().map(|var| var.name()))?;
            f.write_str("> ")?;
        }
        let declaring = self.declaring_type.simple_name();
        if self.is_constructor() {
            f.write_str(&declaring)?;
        } else {
            write!(f, "{} {}.{}", self.return_type, declaring, self.name())?;
        }
        f.write_str("(")?;
        write_joined(f, self.parameter_types.iter())?;
        f.write_str(")")?;
        if !self.effective_exception_types.is_empty() {
            f.write_str(" throws ")?;
            write_joined(f, self.effective_exception_types.iter())?;
        }
        Ok(())
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    for (idx, item) in items.enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// A field with its generic type reified.
#[derive(Debug)]
pub struct FieldInfo {
    decl: Arc<FieldDecl>,
    modifiers: Modifiers,
    declaring_type: TypeInfo,
    field_type: TypeInfo,
}

impl FieldInfo {
    pub(crate) fn new(decl: Arc<FieldDecl>, declaring_type: TypeInfo, field_type: TypeInfo) -> Self {
        Self {
            modifiers: Modifiers::from_access_flags(decl.access_flags),
            decl,
            declaring_type,
            field_type,
        }
    }

    pub fn decl(&self) -> &Arc<FieldDecl> {
        &self.decl
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn declaring_type(&self) -> &TypeInfo {
        &self.declaring_type
    }

    pub fn field_type(&self) -> &TypeInfo {
        &self.field_type
    }

    /// Resolves the field type; an unbound context means the declaring type.
    pub fn resolve(
        self: &Arc<Self>,
        factory: &TypeFactory,
        context: Context<'_>,
        include_base_type: bool,
    ) -> Arc<FieldInfo> {
        let context = match context {
            Context::Unbound => Context::Type(&self.declaring_type),
            other => other,
        };
        let field_type = self.field_type.resolve(factory, context, include_base_type);
        if field_type.ptr_eq(&self.field_type) {
            return self.clone();
        }
        Arc::new(FieldInfo::new(
            self.decl.clone(),
            self.declaring_type.clone(),
            field_type,
        ))
    }
}

impl PartialEq for FieldInfo {
    fn eq(&self, other: &Self) -> bool {
        self.decl.declaring_class == other.decl.declaring_class
            && self.decl.name == other.decl.name
            && self.field_type == other.field_type
    }
}

impl Eq for FieldInfo {}

impl fmt::Display for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifiers.is_empty() {
            write!(f, "{} ", self.modifiers)?;
        }
        write!(
            f,
            "{} {}.{}",
            self.field_type,
            self.declaring_type.simple_name(),
            self.name()
        )
    }
}

impl TypeFactory {
    /// Looks a method up on `ty` (public first, then declared) and binds it
    /// to `ty`.
    pub fn method(
        &self,
        ty: &TypeInfo,
        name: &str,
        params: &[Erasure],
    ) -> Result<Arc<MethodInfo>, MemberError> {
        let class = lookup_class(ty).map_err(|cause| MemberError::MethodNotFound { cause })?;
        let decl = self
            .universe()
            .method(&class, name, params)
            .map_err(|cause| MemberError::MethodNotFound { cause })?;
        Ok(self.bind_method(&decl, ty))
    }

    /// Looks a constructor declared by `ty`'s class up and binds it to `ty`.
    pub fn constructor(
        &self,
        ty: &TypeInfo,
        params: &[Erasure],
    ) -> Result<Arc<MethodInfo>, MemberError> {
        let class = lookup_class(ty).map_err(|cause| MemberError::MethodNotFound { cause })?;
        let decl = self
            .universe()
            .constructor(&class, params)
            .map_err(|cause| MemberError::MethodNotFound { cause })?;
        Ok(self.bind_method(&decl, ty))
    }

    /// Looks a field declared by `ty`'s class up and binds it to `ty`.
    pub fn field(&self, ty: &TypeInfo, name: &str) -> Result<Arc<FieldInfo>, MemberError> {
        self.field_in(ty, ty, name)
    }

    /// Looks a field declared by `declaring` up and binds it to `ty`, a
    /// subtype of `declaring`.
    pub fn field_in(
        &self,
        ty: &TypeInfo,
        declaring: &TypeInfo,
        name: &str,
    ) -> Result<Arc<FieldInfo>, MemberError> {
        let class = lookup_class(declaring).map_err(|cause| MemberError::FieldNotFound { cause })?;
        let decl = self
            .universe()
            .declared_field(&class, name)
            .map_err(|cause| MemberError::FieldNotFound { cause })?;
        Ok(self.bind_field(&decl, ty))
    }

    /// Reifies `decl` and resolves it against `ty` without falling back to
    /// bounds, so variables `ty` leaves open stay variables.
    ///
    /// # Panics
    ///
    /// When `ty` is not a subtype of the declaring class; for constructors,
    /// when `ty` is not the declaring class itself.
    pub fn bind_method(&self, decl: &Arc<MethodDecl>, ty: &TypeInfo) -> Arc<MethodInfo> {
        let declaring = Erasure::class(decl.declaring_class().clone());
        let actual = ty.erasure();
        if decl.is_constructor() {
            assert!(
                declaring == actual,
                "constructor of {declaring} cannot be bound to {actual}"
            );
        } else {
            assert!(
                self.universe().is_assignable(&declaring, &actual),
                "method of {declaring} cannot be bound to {actual}"
            );
        }
        self.method_info(decl)
            .resolve(self, Context::Type(ty), false)
    }

    /// Field counterpart of [`TypeFactory::bind_method`].
    ///
    /// # Panics
    ///
    /// When `ty` is not a subtype of the declaring class.
    pub fn bind_field(&self, decl: &Arc<FieldDecl>, ty: &TypeInfo) -> Arc<FieldInfo> {
        let declaring = Erasure::class(decl.declaring_class.clone());
        let actual = ty.erasure();
        assert!(
            self.universe().is_assignable(&declaring, &actual),
            "field of {declaring} cannot be bound to {actual}"
        );
        self.field_info(decl).resolve(self, Context::Type(ty), false)
    }
}

fn lookup_class(ty: &TypeInfo) -> Result<typegraph_reflect::ClassName, LookupError> {
    let erasure = ty.erasure();
    if erasure.is_array() {
        return Err(LookupError::UnknownClass(erasure.to_string().into()));
    }
    Ok(erasure.class)
}
