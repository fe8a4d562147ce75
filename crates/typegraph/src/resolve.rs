//! Substitution of type variables against a context.

use std::sync::Arc;

use typegraph_reflect::{DeclarationRef, Erasure};

use crate::factory::TypeFactory;
use crate::member::MethodInfo;
use crate::types::{BoundedType, ParameterizedType, TypeInfo, TypeVariable};

/// Where type variables are looked up during resolution.
#[derive(Debug, Clone, Copy, Default)]
pub enum Context<'a> {
    /// No context: class type variables fall back to their bounds.
    #[default]
    Unbound,
    Type(&'a TypeInfo),
    Method(&'a MethodInfo),
}

impl<'a> From<&'a TypeInfo> for Context<'a> {
    fn from(ty: &'a TypeInfo) -> Self {
        Context::Type(ty)
    }
}

impl<'a> From<&'a MethodInfo> for Context<'a> {
    fn from(method: &'a MethodInfo) -> Self {
        Context::Method(method)
    }
}

impl<'a> Context<'a> {
    /// The context when it is a raw or parameterized type.
    fn class_type(&self) -> Option<&'a TypeInfo> {
        match *self {
            Context::Type(ty) if matches!(ty, TypeInfo::Raw(_) | TypeInfo::Parameterized(_)) => {
                Some(ty)
            }
            _ => None,
        }
    }
}

impl TypeInfo {
    /// Substitutes type variables using `context`.
    ///
    /// A class type variable is looked up in the context's supertype lattice.
    /// When the context does not bind it, it resolves to its resolved base type
    /// if `include_base_type` is set and stays itself otherwise. Nothing that is
    /// unchanged is rebuilt: resolving a node that does not mention any type
    /// variable returns that very node.
    pub fn resolve(
        &self,
        factory: &TypeFactory,
        context: Context<'_>,
        include_base_type: bool,
    ) -> TypeInfo {
        Resolver::new(factory, context, include_base_type).resolve(self)
    }

    /// Actual arguments of a raw or parameterized type.
    ///
    /// A raw type reports each parameter's resolved base type, so raw `List`
    /// has `[Object]`.
    pub fn actual_type_arguments(&self, factory: &TypeFactory) -> Vec<TypeInfo> {
        match self {
            TypeInfo::Parameterized(pt) => pt.actual_type_arguments().to_vec(),
            TypeInfo::Raw(raw) => raw
                .type_parameters()
                .iter()
                .map(|var| {
                    Resolver::new(factory, Context::Type(self), true).resolve_base(var)
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn actual_type_argument(&self, factory: &TypeFactory, name: &str) -> Option<TypeInfo> {
        match self {
            TypeInfo::Parameterized(pt) => pt.actual_type_argument(name).cloned(),
            TypeInfo::Raw(raw) => {
                let var = raw.type_parameters().iter().find(|var| var.name() == name)?;
                Some(Resolver::new(factory, Context::Type(self), true).resolve_base(var))
            }
            _ => None,
        }
    }
}

pub(crate) struct Resolver<'f, 'c> {
    factory: &'f TypeFactory,
    context: Context<'c>,
    include_base_type: bool,
    /// Variables whose base type is being resolved; re-entering one yields
    /// its erasure.
    active: Vec<Arc<TypeVariable>>,
    /// Variables being looked up in the context.
    lookups: Vec<Arc<TypeVariable>>,
}

impl<'f, 'c> Resolver<'f, 'c> {
    pub(crate) fn new(
        factory: &'f TypeFactory,
        context: Context<'c>,
        include_base_type: bool,
    ) -> Self {
        Self {
            factory,
            context,
            include_base_type,
            active: Vec::new(),
            lookups: Vec::new(),
        }
    }

    pub(crate) fn resolve(&mut self, ty: &TypeInfo) -> TypeInfo {
        match ty {
            TypeInfo::Raw(_) => ty.clone(),
            TypeInfo::Array(array) => {
                let component = self.resolve(array.component_type());
                if component.ptr_eq(array.component_type()) {
                    ty.clone()
                } else {
                    self.factory.array(&component, array.dimension())
                }
            }
            TypeInfo::Parameterized(pt) => self.resolve_parameterized(ty, pt),
            TypeInfo::Variable(var) => self.resolve_variable(ty, var),
            TypeInfo::Wildcard(wildcard) if wildcard.is_unknown() => ty.clone(),
            TypeInfo::Wildcard(wildcard) => self.resolve(wildcard.base_type()),
            TypeInfo::UnknownWildcard(wildcard) => self.resolve(wildcard.base_type()),
        }
    }

    fn resolve_parameterized(&mut self, ty: &TypeInfo, pt: &ParameterizedType) -> TypeInfo {
        if pt.is_concrete() {
            return ty.clone();
        }
        let args = pt.actual_type_arguments();
        let resolved: Vec<TypeInfo> = args.iter().map(|arg| self.resolve(arg)).collect();
        let changed = args
            .iter()
            .zip(&resolved)
            .any(|(arg, resolved)| !arg.ptr_eq(resolved));
        if changed {
            self.factory.parameterized(&pt.raw_type(), resolved)
        } else {
            ty.clone()
        }
    }

    fn resolve_variable(&mut self, ty: &TypeInfo, var: &Arc<TypeVariable>) -> TypeInfo {
        if let Some(bound) = self.lookup_variable(ty, var) {
            return bound;
        }
        if self.include_base_type {
            self.resolve_base(var)
        } else {
            ty.clone()
        }
    }

    /// The binding of `var` in the context's declaration-equivalent.
    fn lookup_variable(&mut self, ty: &TypeInfo, var: &Arc<TypeVariable>) -> Option<TypeInfo> {
        let (DeclarationRef::Class(owner), Some(context)) =
            (var.declaration(), self.context.class_type())
        else {
            return None;
        };
        // A context such as `Box<T=T>` binds a variable to itself.
        if self.lookups.iter().any(|active| **active == **var) {
            return None;
        }

        let equivalent = context.supertype(self.factory, &Erasure::class(owner.clone()))?;
        match &equivalent {
            TypeInfo::Raw(_) if !self.include_base_type => Some(ty.clone()),
            TypeInfo::Raw(_) => Some(self.resolve_base(var)),
            TypeInfo::Parameterized(pt) => {
                let arg = pt.actual_type_argument(var.name())?.clone();
                self.lookups.push(var.clone());
                let resolved = self.resolve(&arg);
                self.lookups.pop();
                Some(resolved)
            }
            _ => None,
        }
    }

    /// The variable's base type, resolved.
    fn resolve_base(&mut self, var: &Arc<TypeVariable>) -> TypeInfo {
        if self.active.iter().any(|active| **active == **var) {
            let erasure = var.base_type().erasure();
            return self
                .factory
                .class_type(&erasure)
                .unwrap_or_else(|| var.base_type().clone());
        }
        self.active.push(var.clone());
        let resolved = self.resolve(var.base_type());
        self.active.pop();
        resolved
    }
}
