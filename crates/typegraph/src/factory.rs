use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use typegraph_reflect::{ClassName, ClassUniverse, Erasure, MemberKey, ReflectType};

use crate::config::TypeSystemConfig;
use crate::error::TypeError;
use crate::member::{FieldInfo, MethodInfo};
use crate::types::{ArrayType, ParameterizedType, TypeInfo};

/// Builds and caches [`TypeInfo`] nodes over one [`ClassUniverse`].
///
/// Raw types, arrays of raw types and reified members are interned: asking
/// twice for the same class returns the same node. Everything else is built
/// fresh. A factory is `Send + Sync` and meant to be shared between threads.
pub struct TypeFactory {
    universe: Arc<ClassUniverse>,
    config: TypeSystemConfig,
    pub(crate) classes: DashMap<Erasure, TypeInfo>,
    pub(crate) methods: DashMap<MemberKey, Arc<MethodInfo>>,
    pub(crate) fields: DashMap<(ClassName, Arc<str>), Arc<FieldInfo>>,
    array_interfaces: Vec<ClassName>,
    unchecked_exceptions: Vec<Erasure>,
    primitive_wrappers: HashMap<ClassName, ClassName>,
    stats: FactoryStats,
}

#[derive(Debug, Default)]
struct FactoryStats {
    raw_types_built: AtomicU64,
    lattices_computed: AtomicU64,
    cache_races_lost: AtomicU64,
}

/// Counters describing the work a [`TypeFactory`] has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub raw_types_built: u64,
    pub lattices_computed: u64,
    pub cache_races_lost: u64,
    pub interned_classes: usize,
    pub interned_members: usize,
}

impl TypeFactory {
    pub fn new(universe: Arc<ClassUniverse>) -> Result<Self, TypeError> {
        Self::with_config(universe, TypeSystemConfig::default())
    }

    /// Fails when a class named by the configuration, or the root, is
    /// missing from `universe`.
    pub fn with_config(
        universe: Arc<ClassUniverse>,
        config: TypeSystemConfig,
    ) -> Result<Self, TypeError> {
        let known = |name: &str| -> Result<ClassName, TypeError> {
            universe
                .class(name)
                .map(|decl| decl.name.clone())
                .ok_or_else(|| TypeError::UnknownWellKnownType(name.to_string()))
        };

        known(universe.root())?;
        let array_interfaces = config
            .array_interfaces
            .iter()
            .map(|name| known(name))
            .collect::<Result<Vec<_>, _>>()?;
        let unchecked_exceptions = config
            .unchecked_exceptions
            .iter()
            .map(|name| known(name).map(Erasure::class))
            .collect::<Result<Vec<_>, _>>()?;
        let primitive_wrappers = config
            .primitive_wrappers
            .iter()
            .map(|(primitive, wrapper)| Ok((known(primitive)?, known(wrapper)?)))
            .collect::<Result<HashMap<_, _>, TypeError>>()?;

        Ok(Self {
            universe,
            config,
            classes: DashMap::new(),
            methods: DashMap::new(),
            fields: DashMap::new(),
            array_interfaces,
            unchecked_exceptions,
            primitive_wrappers,
            stats: FactoryStats::default(),
        })
    }

    pub fn universe(&self) -> &Arc<ClassUniverse> {
        &self.universe
    }

    pub fn config(&self) -> &TypeSystemConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            raw_types_built: self.stats.raw_types_built.load(Ordering::Relaxed),
            lattices_computed: self.stats.lattices_computed.load(Ordering::Relaxed),
            cache_races_lost: self.stats.cache_races_lost.load(Ordering::Relaxed),
            interned_classes: self.classes.len(),
            interned_members: self.methods.len() + self.fields.len(),
        }
    }

    /// The root of the class hierarchy, `java.lang.Object`.
    pub fn root_type(&self) -> TypeInfo {
        self.known_raw(self.universe.root())
    }

    pub fn void_type(&self) -> TypeInfo {
        self.known_raw("void")
    }

    /// The array interfaces followed by the root: what every array extends.
    pub fn array_supertypes(&self) -> Vec<TypeInfo> {
        let mut supertypes: Vec<TypeInfo> = self
            .array_interfaces
            .iter()
            .map(|name| self.known_raw(name))
            .collect();
        supertypes.push(self.root_type());
        supertypes
    }

    /// The interned node for a class or array class, if the class exists.
    pub fn class_type(&self, erasure: &Erasure) -> Option<TypeInfo> {
        self.universe.class(&erasure.class)?;
        Some(self.build(&ReflectType::Class(erasure.clone())))
    }

    /// The interned raw type of a class, if the class exists.
    pub fn raw(&self, name: &str) -> Option<TypeInfo> {
        self.class_type(&Erasure::class(name))
    }

    /// Validated at construction.
    fn known_raw(&self, name: &str) -> TypeInfo {
        self.raw(name)
            .unwrap_or_else(|| panic!("well-known type {name} vanished from the universe"))
    }

    /// Wrapper class of a primitive type; other types map to themselves.
    pub fn primitive_wrapper(&self, ty: &TypeInfo) -> TypeInfo {
        let base = ty.non_bounded();
        if !base.is_primitive() {
            return base.clone();
        }
        self.primitive_wrappers
            .get(&base.erasure().class)
            .and_then(|wrapper| self.raw(wrapper))
            .unwrap_or_else(|| base.clone())
    }

    /// Whether `erasure` is excluded from effective exception lists.
    pub fn is_unchecked(&self, erasure: &Erasure) -> bool {
        self.unchecked_exceptions
            .iter()
            .any(|root| self.universe.is_assignable(root, erasure))
    }

    pub(crate) fn is_root(&self, ty: &TypeInfo) -> bool {
        matches!(ty, TypeInfo::Raw(raw) if raw.name() == self.universe.root())
    }

    /// A parameterized type over a generic raw type.
    ///
    /// # Panics
    ///
    /// When [`TypeFactory::try_parameterized`] would fail.
    pub fn parameterized(&self, raw: &TypeInfo, args: Vec<TypeInfo>) -> TypeInfo {
        self.try_parameterized(raw, args)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_parameterized(
        &self,
        raw: &TypeInfo,
        args: Vec<TypeInfo>,
    ) -> Result<TypeInfo, TypeError> {
        let TypeInfo::Raw(raw) = raw else {
            return Err(TypeError::NotRawType(raw.to_string()));
        };
        let pt = Arc::new(ParameterizedType::new(raw.clone())?);
        self.init_parameterized(&pt, args)?;
        Ok(TypeInfo::Parameterized(pt))
    }

    pub(crate) fn init_parameterized(
        &self,
        pt: &ParameterizedType,
        args: Vec<TypeInfo>,
    ) -> Result<(), TypeError> {
        let decl = pt.raw().decl();
        if args.len() != decl.type_params.len() {
            return Err(TypeError::ArgumentCountMismatch {
                class: decl.name.to_string(),
                expected: decl.type_params.len(),
                actual: args.len(),
            });
        }
        for (param, arg) in decl.type_params.iter().zip(&args) {
            let actual = arg.erasure();
            if let Some(bound) = param
                .bounds
                .iter()
                .find(|bound| !self.satisfies_bound(bound, &actual))
            {
                return Err(TypeError::BoundViolation {
                    class: decl.name.to_string(),
                    param: param.name.to_string(),
                    bound: bound.to_string(),
                    actual: actual.to_string(),
                });
            }
        }
        pt.init_arguments(args);
        Ok(())
    }

    /// Whether an argument erasure satisfies one declared bound.
    pub(crate) fn satisfies_bound(&self, bound: &ReflectType, actual: &Erasure) -> bool {
        match bound {
            ReflectType::Class(erasure) => self.universe.is_assignable(erasure, actual),
            ReflectType::Parameterized { raw, .. } => self
                .universe
                .is_assignable(&Erasure::class(raw.clone()), actual),
            ReflectType::Variable(var) => match self.universe.type_param(&var.owner, &var.name) {
                Some(param) => param
                    .bounds
                    .iter()
                    .all(|bound| self.satisfies_bound(bound, actual)),
                None => true,
            },
            ReflectType::GenericArray(component) => actual
                .element()
                .is_some_and(|element| self.satisfies_bound(component, &element)),
            ReflectType::Wildcard { .. } => true,
        }
    }

    /// An array of `component` with `dimension` more dimensions.
    ///
    /// Array components are flattened, so `array(int[], 1)` is `int[][]`.
    /// Arrays of raw types are interned.
    ///
    /// # Panics
    ///
    /// When [`TypeFactory::try_array`] would fail.
    pub fn array(&self, component: &TypeInfo, dimension: u32) -> TypeInfo {
        self.try_array(component, dimension)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_array(&self, component: &TypeInfo, dimension: u32) -> Result<TypeInfo, TypeError> {
        if dimension == 0 {
            return Err(TypeError::ZeroDimension);
        }
        if let TypeInfo::Array(inner) = component {
            return self.try_array(&inner.component, inner.dimension + dimension);
        }

        let direct = if dimension == 1 {
            component.clone()
        } else {
            self.try_array(component, dimension - 1)?
        };

        let TypeInfo::Raw(raw) = component else {
            return Ok(TypeInfo::Array(Arc::new(ArrayType::new(
                component.clone(),
                direct,
                dimension,
            ))));
        };

        let erasure = raw.erasure().with_dimensions(dimension);
        let cached = self.classes.get(&erasure).map(|entry| entry.value().clone());
        if let Some(cached) = cached {
            return Ok(cached);
        }
        let array = TypeInfo::Array(Arc::new(ArrayType::new(component.clone(), direct, dimension)));
        Ok(self.intern(erasure, array))
    }

    /// Saves `ty` in the permanent cache; the first writer wins.
    pub(crate) fn intern(&self, erasure: Erasure, ty: TypeInfo) -> TypeInfo {
        match self.classes.entry(erasure) {
            Entry::Occupied(entry) => {
                self.stats.cache_races_lost.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    target = "typegraph.builder",
                    class = %entry.key(),
                    "type info built concurrently; keeping the first"
                );
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                tracing::debug!(target = "typegraph.builder", class = %entry.key(), "saved type info");
                entry.insert(ty.clone());
                ty
            }
        }
    }

    pub(crate) fn record_raw_built(&self) {
        self.stats.raw_types_built.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lattice(&self, owner: &TypeInfo, len: usize) {
        self.stats.lattices_computed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            target = "typegraph.lattice",
            ty = %owner,
            supertypes = len,
            "computed supertype lattice"
        );
    }
}

impl std::fmt::Debug for TypeFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeFactory")
            .field("classes", &self.universe.len())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
