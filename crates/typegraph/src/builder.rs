//! Lowering of reflected types into [`TypeInfo`] nodes.
//!
//! Building walks the reflected graph depth first. A node is registered in
//! the per-build [`BuildingCache`] before its children are built, so that a
//! child referring back to it (`Enum<E extends Enum<E>>`) reuses the
//! partially built node instead of recursing forever.

use std::collections::HashMap;
use std::sync::Arc;

use typegraph_reflect::{
    ClassName, DeclarationRef, Erasure, FieldDecl, MethodDecl, ReflectType, TypeParamDecl, TypeVar,
};

use crate::error::TypeError;
use crate::factory::TypeFactory;
use crate::member::{FieldInfo, MethodInfo};
use crate::types::{
    ParameterizedType, RawType, TypeInfo, TypeVariable, UnknownWildcard, WildcardType,
};

/// Nodes under construction during one build.
///
/// Method declarations need no entry: type variables refer to their
/// declaration by key, never by node.
#[derive(Default)]
pub(crate) struct BuildingCache {
    raw_types: HashMap<ClassName, Arc<RawType>>,
    parameterized: HashMap<ReflectType, Arc<ParameterizedType>>,
}

impl TypeFactory {
    /// Builds the node for a reflected type.
    ///
    /// # Panics
    ///
    /// When `ty` names a class or type variable the universe does not know,
    /// or violates a declared bound.
    pub fn build(&self, ty: &ReflectType) -> TypeInfo {
        let mut cache = BuildingCache::default();
        self.build_type(ty, &mut cache)
    }

    /// Builds several types sharing one building cache.
    pub fn build_all(&self, types: &[ReflectType]) -> Vec<TypeInfo> {
        let mut cache = BuildingCache::default();
        types
            .iter()
            .map(|ty| self.build_type(ty, &mut cache))
            .collect()
    }

    /// Builds a type that has not been checked against the universe, such as
    /// one parsed from user input.
    ///
    /// Reports what [`TypeFactory::build`] would panic on.
    pub fn try_build(&self, ty: &ReflectType) -> Result<TypeInfo, TypeError> {
        self.check_reflected(ty)?;
        Ok(self.build(ty))
    }

    /// Validates `ty` and returns its erasure.
    fn check_reflected(&self, ty: &ReflectType) -> Result<Erasure, TypeError> {
        match ty {
            ReflectType::Class(erasure) => {
                if !self.universe().contains(&erasure.class) {
                    return Err(TypeError::UnknownClass(erasure.class.to_string()));
                }
                Ok(erasure.clone())
            }
            ReflectType::GenericArray(component) => {
                let erasure = self.check_reflected(component)?;
                Ok(erasure.with_dimensions(erasure.dimensions + 1))
            }
            ReflectType::Parameterized { raw, args } => {
                let decl = self
                    .universe()
                    .class(raw)
                    .ok_or_else(|| TypeError::UnknownClass(raw.to_string()))?;
                if !decl.is_generic() {
                    return Err(TypeError::NotGeneric(raw.to_string()));
                }
                if args.len() != decl.type_params.len() {
                    return Err(TypeError::ArgumentCountMismatch {
                        class: raw.to_string(),
                        expected: decl.type_params.len(),
                        actual: args.len(),
                    });
                }
                for (param, arg) in decl.type_params.iter().zip(args) {
                    let actual = self.check_reflected(arg)?;
                    // Unknown wildcards take the parameter's own bounds.
                    if self.is_unknown_wildcard(arg) {
                        continue;
                    }
                    if let Some(bound) = param
                        .bounds
                        .iter()
                        .find(|bound| !self.satisfies_bound(bound, &actual))
                    {
                        return Err(TypeError::BoundViolation {
                            class: raw.to_string(),
                            param: param.name.to_string(),
                            bound: bound.to_string(),
                            actual: actual.to_string(),
                        });
                    }
                }
                Ok(Erasure::class(raw.clone()))
            }
            ReflectType::Variable(var) => {
                let param = self
                    .universe()
                    .type_param(&var.owner, &var.name)
                    .ok_or_else(|| TypeError::UnknownClass(var.owner.owner_class().to_string()))?;
                let root = || Erasure::class(self.universe().root().clone());
                match param.bounds.first() {
                    Some(ReflectType::Variable(_)) | None => Ok(root()),
                    Some(ReflectType::Parameterized { raw, .. }) => Ok(Erasure::class(raw.clone())),
                    Some(bound) => self.check_reflected(bound),
                }
            }
            ReflectType::Wildcard { upper, lower } => {
                for bound in lower {
                    self.check_reflected(bound)?;
                }
                let Some(base) = upper.first() else {
                    return Err(TypeError::EmptyBounds("?".to_string()));
                };
                for bound in &upper[1..] {
                    self.check_reflected(bound)?;
                }
                self.check_reflected(base)
            }
        }
    }

    fn is_unknown_wildcard(&self, ty: &ReflectType) -> bool {
        match ty {
            ReflectType::Wildcard { upper, .. } => {
                upper.len() == 1 && upper[0].class_name() == Some(self.universe().root())
            }
            _ => false,
        }
    }

    pub(crate) fn build_type(&self, ty: &ReflectType, cache: &mut BuildingCache) -> TypeInfo {
        match ty {
            ReflectType::Class(erasure) if erasure.is_array() => {
                let component = TypeInfo::Raw(self.build_raw(&erasure.class, cache));
                self.array(&component, erasure.dimensions)
            }
            ReflectType::Class(erasure) => TypeInfo::Raw(self.build_raw(&erasure.class, cache)),
            ReflectType::GenericArray(_) => self.build_generic_array(ty, cache),
            ReflectType::Parameterized { raw, args } => {
                self.build_parameterized(ty, raw, args, cache)
            }
            ReflectType::Variable(var) => TypeInfo::Variable(self.build_variable(var, cache)),
            ReflectType::Wildcard { upper, lower } => self.build_wildcard(upper, lower, cache),
        }
    }

    pub(crate) fn build_raw(&self, name: &ClassName, cache: &mut BuildingCache) -> Arc<RawType> {
        if let Some(raw) = cache.raw_types.get(name) {
            return raw.clone();
        }
        let erasure = Erasure::class(name.clone());
        let cached = self.classes.get(&erasure).map(|entry| entry.value().clone());
        if let Some(TypeInfo::Raw(raw)) = cached {
            return raw;
        }

        let decl = self
            .universe()
            .class(name)
            .unwrap_or_else(|| panic!("reflected type refers to unknown class {name}"))
            .clone();
        tracing::trace!(target = "typegraph.builder", class = %name, "building raw type");

        let raw = Arc::new(RawType::new(decl.clone()));
        cache.raw_types.insert(name.clone(), raw.clone());
        let declaration = DeclarationRef::Class(name.clone());
        let vars = self.build_type_params(&declaration, &decl.type_params, cache);
        raw.init_type_parameters(vars);
        self.record_raw_built();

        match self.intern(erasure, TypeInfo::Raw(raw.clone())) {
            TypeInfo::Raw(winner) => winner,
            _ => raw,
        }
    }

    pub(crate) fn build_type_params(
        &self,
        declaration: &DeclarationRef,
        params: &[TypeParamDecl],
        cache: &mut BuildingCache,
    ) -> Vec<Arc<TypeVariable>> {
        params
            .iter()
            .map(|param| {
                let bounds = param
                    .bounds
                    .iter()
                    .map(|bound| self.build_type(bound, cache))
                    .collect();
                let var = TypeVariable::new(param.name.clone(), declaration.clone(), bounds)
                    .unwrap_or_else(|err| panic!("{err}"));
                Arc::new(var)
            })
            .collect()
    }

    fn build_variable(&self, var: &TypeVar, cache: &mut BuildingCache) -> Arc<TypeVariable> {
        let param = self
            .universe()
            .type_param(&var.owner, &var.name)
            .unwrap_or_else(|| panic!("type variable {} is not declared by {}", var.name, var.owner));
        let bounds = param
            .bounds
            .iter()
            .map(|bound| self.build_type(bound, cache))
            .collect();
        let built = TypeVariable::new(var.name.clone(), var.owner.clone(), bounds)
            .unwrap_or_else(|err| panic!("{err}"));
        Arc::new(built)
    }

    fn build_generic_array(&self, ty: &ReflectType, cache: &mut BuildingCache) -> TypeInfo {
        let mut dimension = 0;
        let mut component = ty;
        while let ReflectType::GenericArray(inner) = component {
            dimension += 1;
            component = &**inner;
        }
        let component = self.build_type(component, cache);
        self.array(&component, dimension)
    }

    fn build_parameterized(
        &self,
        source: &ReflectType,
        raw_name: &ClassName,
        args: &[ReflectType],
        cache: &mut BuildingCache,
    ) -> TypeInfo {
        if let Some(pt) = cache.parameterized.get(source) {
            return TypeInfo::Parameterized(pt.clone());
        }

        let raw = self.build_raw(raw_name, cache);
        let pt = Arc::new(ParameterizedType::new(raw.clone()).unwrap_or_else(|err| panic!("{err}")));
        cache.parameterized.insert(source.clone(), pt.clone());

        let mut built: Vec<TypeInfo> = args.iter().map(|arg| self.build_type(arg, cache)).collect();

        // An unknown wildcard stands for "any argument the parameter accepts",
        // so it takes the formal parameter's bounds.
        for (arg, param) in built.iter_mut().zip(&raw.decl().type_params) {
            let unknown = match &*arg {
                TypeInfo::Wildcard(wildcard) if wildcard.is_unknown() => wildcard.clone(),
                _ => continue,
            };
            let bounds: Vec<TypeInfo> = param
                .bounds
                .iter()
                .map(|bound| self.build_type(bound, cache))
                .collect();
            let unbounded = bounds.len() == 1 && self.is_root(&bounds[0]);
            let wrapped = UnknownWildcard::new(unknown, bounds, unbounded)
                .unwrap_or_else(|err| panic!("{err}"));
            *arg = TypeInfo::UnknownWildcard(Arc::new(wrapped));
        }

        self.init_parameterized(&pt, built)
            .unwrap_or_else(|err| panic!("{err}"));
        TypeInfo::Parameterized(pt)
    }

    fn build_wildcard(
        &self,
        upper: &[ReflectType],
        lower: &[ReflectType],
        cache: &mut BuildingCache,
    ) -> TypeInfo {
        let upper: Vec<TypeInfo> = upper.iter().map(|bound| self.build_type(bound, cache)).collect();
        let lower: Vec<TypeInfo> = lower.iter().map(|bound| self.build_type(bound, cache)).collect();
        TypeInfo::Wildcard(Arc::new(self.new_wildcard(upper, lower)))
    }

    pub(crate) fn new_wildcard(&self, upper: Vec<TypeInfo>, lower: Vec<TypeInfo>) -> WildcardType {
        let unknown = upper.len() == 1 && self.is_root(&upper[0]);
        WildcardType::new(upper, lower, unknown).unwrap_or_else(|err| panic!("{err}"))
    }

    /// A wildcard over already built bounds; `upper` defaults to the root.
    pub fn wildcard(&self, upper: Vec<TypeInfo>, lower: Vec<TypeInfo>) -> TypeInfo {
        let upper = if upper.is_empty() {
            vec![self.root_type()]
        } else {
            upper
        };
        TypeInfo::Wildcard(Arc::new(self.new_wildcard(upper, lower)))
    }

    /// The unresolved, interned reification of a method or constructor.
    pub fn method_info(&self, decl: &Arc<MethodDecl>) -> Arc<MethodInfo> {
        let cached = self.methods.get(&decl.key).map(|entry| entry.value().clone());
        if let Some(method) = cached {
            return method;
        }

        let mut cache = BuildingCache::default();
        let declaration = decl.declaration();
        let declaring_type = TypeInfo::Raw(self.build_raw(decl.declaring_class(), &mut cache));
        let type_params = self.build_type_params(&declaration, &decl.type_params, &mut cache);
        let return_type = match &decl.return_type {
            Some(ty) => self.build_type(ty, &mut cache),
            None => self.void_type(),
        };
        let parameter_types = decl
            .params
            .iter()
            .map(|param| self.build_type(param, &mut cache))
            .collect();
        let exception_types = decl
            .exceptions
            .iter()
            .map(|exception| self.build_type(exception, &mut cache))
            .collect();

        let method = Arc::new(MethodInfo::new(
            self,
            decl.clone(),
            declaring_type,
            type_params,
            return_type,
            parameter_types,
            exception_types,
        ));
        tracing::debug!(target = "typegraph.members", method = %decl.key, "reified method");
        self.methods
            .entry(decl.key.clone())
            .or_insert(method)
            .value()
            .clone()
    }

    /// The unresolved, interned reification of a field.
    pub fn field_info(&self, decl: &Arc<FieldDecl>) -> Arc<FieldInfo> {
        let key = (decl.declaring_class.clone(), decl.name.clone());
        let cached = self.fields.get(&key).map(|entry| entry.value().clone());
        if let Some(field) = cached {
            return field;
        }

        let mut cache = BuildingCache::default();
        let declaring_type = TypeInfo::Raw(self.build_raw(&decl.declaring_class, &mut cache));
        let field_type = self.build_type(&decl.ty, &mut cache);
        let field = Arc::new(FieldInfo::new(decl.clone(), declaring_type, field_type));
        tracing::debug!(
            target = "typegraph.members",
            class = %decl.declaring_class,
            field = %decl.name,
            "reified field"
        );
        self.fields.entry(key).or_insert(field).value().clone()
    }
}
