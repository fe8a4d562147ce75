use std::sync::Arc;

use typegraph_reflect::DeclarationRef;

use crate::factory::TypeFactory;
use crate::member::MethodInfo;
use crate::types::{TypeInfo, TypeVariable};

/// Something that introduces type parameters: a class or a method.
#[derive(Debug, Clone)]
pub enum GenericDeclaration {
    Type(TypeInfo),
    Method(Arc<MethodInfo>),
}

impl GenericDeclaration {
    pub fn type_parameters(&self) -> &[Arc<TypeVariable>] {
        match self {
            GenericDeclaration::Type(ty) => ty.type_parameters(),
            GenericDeclaration::Method(method) => method.type_parameters(),
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.type_parameters().is_empty()
    }

    pub fn actual_type_arguments(&self, factory: &TypeFactory) -> Vec<TypeInfo> {
        match self {
            GenericDeclaration::Type(ty) => ty.actual_type_arguments(factory),
            GenericDeclaration::Method(method) => method.actual_type_arguments(factory),
        }
    }

    pub fn actual_type_argument(&self, factory: &TypeFactory, name: &str) -> Option<TypeInfo> {
        match self {
            GenericDeclaration::Type(ty) => ty.actual_type_argument(factory, name),
            GenericDeclaration::Method(method) => method.actual_type_argument(factory, name),
        }
    }
}

impl TypeFactory {
    /// The declaration a type variable belongs to, reified.
    pub fn generic_declaration(&self, declaration: &DeclarationRef) -> Option<GenericDeclaration> {
        match declaration {
            DeclarationRef::Class(name) => self.raw(name).map(GenericDeclaration::Type),
            DeclarationRef::Method(key) | DeclarationRef::Constructor(key) => {
                let decl = self.universe().class(&key.class)?.member(key)?.clone();
                Some(GenericDeclaration::Method(self.method_info(&decl)))
            }
        }
    }
}

impl TypeVariable {
    pub fn generic_declaration(&self, factory: &TypeFactory) -> Option<GenericDeclaration> {
        factory.generic_declaration(self.declaration())
    }
}
