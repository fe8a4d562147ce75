use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use typegraph_reflect::{ClassDecl, ClassName, DeclarationRef, Erasure};

use crate::error::TypeError;
use crate::supertypes::Supertypes;

/// A node of the type model.
///
/// Cloning is cheap: every variant is a reference-counted, immutable node.
/// Equality is structural; use [`TypeInfo::ptr_eq`] for identity.
#[derive(Clone)]
pub enum TypeInfo {
    Raw(Arc<RawType>),
    Parameterized(Arc<ParameterizedType>),
    Array(Arc<ArrayType>),
    Variable(Arc<TypeVariable>),
    Wildcard(Arc<WildcardType>),
    /// An unconstrained wildcard argument re-bounded with the formal
    /// parameter's upper bounds.
    UnknownWildcard(Arc<UnknownWildcard>),
}

/// Shared view of type variables and wildcards.
///
/// Both delegate most queries to their base type, the first upper bound.
pub trait BoundedType {
    /// Never empty.
    fn upper_bounds(&self) -> &[TypeInfo];

    fn lower_bounds(&self) -> &[TypeInfo];

    fn base_type(&self) -> &TypeInfo {
        &self.upper_bounds()[0]
    }
}

impl TypeInfo {
    pub fn ptr_eq(&self, other: &TypeInfo) -> bool {
        match (self, other) {
            (TypeInfo::Raw(a), TypeInfo::Raw(b)) => Arc::ptr_eq(a, b),
            (TypeInfo::Parameterized(a), TypeInfo::Parameterized(b)) => Arc::ptr_eq(a, b),
            (TypeInfo::Array(a), TypeInfo::Array(b)) => Arc::ptr_eq(a, b),
            (TypeInfo::Variable(a), TypeInfo::Variable(b)) => Arc::ptr_eq(a, b),
            (TypeInfo::Wildcard(a), TypeInfo::Wildcard(b)) => Arc::ptr_eq(a, b),
            (TypeInfo::UnknownWildcard(a), TypeInfo::UnknownWildcard(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_bounded(&self) -> Option<&dyn BoundedType> {
        match self {
            TypeInfo::Variable(var) => Some(&**var),
            TypeInfo::Wildcard(wildcard) => Some(&**wildcard),
            TypeInfo::UnknownWildcard(wildcard) => Some(&**wildcard),
            _ => None,
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.as_bounded().is_some()
    }

    /// Follows base types until a raw, parameterized or array type is reached.
    pub fn non_bounded(&self) -> &TypeInfo {
        let mut current = self;
        while let Some(bounded) = current.as_bounded() {
            current = bounded.base_type();
        }
        current
    }

    /// The erasure; bounded types erase to their non-bounded base.
    pub fn erasure(&self) -> Erasure {
        match self {
            TypeInfo::Raw(raw) => raw.erasure.clone(),
            TypeInfo::Parameterized(pt) => pt.raw.erasure.clone(),
            TypeInfo::Array(array) => array.erasure.clone(),
            _ => self.non_bounded().erasure(),
        }
    }

    /// Declaration of the class behind a raw or parameterized type.
    pub fn class_decl(&self) -> Option<&Arc<ClassDecl>> {
        match self {
            TypeInfo::Raw(raw) => Some(&raw.decl),
            TypeInfo::Parameterized(pt) => Some(&pt.raw.decl),
            _ => None,
        }
    }

    /// Binary class name. Arrays use the dotted erasure, `java.util.List[][]`,
    /// rather than the JVM descriptor form `[[Ljava.util.List;`.
    pub fn name(&self) -> String {
        match self {
            TypeInfo::Raw(raw) => raw.name().to_string(),
            TypeInfo::Parameterized(pt) => pt.raw.name().to_string(),
            TypeInfo::Array(array) => array.erasure.to_string(),
            TypeInfo::Variable(var) => var.name.to_string(),
            TypeInfo::Wildcard(_) | TypeInfo::UnknownWildcard(_) => "?".to_string(),
        }
    }

    pub fn simple_name(&self) -> String {
        match self {
            TypeInfo::Raw(raw) => raw.erasure.simple_name(),
            TypeInfo::Parameterized(pt) => pt.raw.erasure.simple_name(),
            TypeInfo::Array(array) => array.erasure.simple_name(),
            _ => self.name(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        match self {
            TypeInfo::Raw(raw) => raw.decl.is_primitive(),
            TypeInfo::Parameterized(_) | TypeInfo::Array(_) => false,
            _ => self.non_bounded().is_primitive(),
        }
    }

    pub fn is_array(&self) -> bool {
        self.dimension() > 0
    }

    pub fn is_interface(&self) -> bool {
        match self {
            TypeInfo::Raw(raw) => raw.decl.is_interface(),
            TypeInfo::Parameterized(pt) => pt.raw.decl.is_interface(),
            TypeInfo::Array(_) => false,
            _ => self.non_bounded().is_interface(),
        }
    }

    /// Element type with every array dimension removed; itself for non-arrays.
    pub fn component_type(&self) -> TypeInfo {
        match self {
            TypeInfo::Array(array) => array.component.clone(),
            TypeInfo::Raw(_) | TypeInfo::Parameterized(_) => self.clone(),
            _ => self.non_bounded().component_type(),
        }
    }

    /// Component one dimension down; itself for non-arrays.
    pub fn direct_component_type(&self) -> TypeInfo {
        match self {
            TypeInfo::Array(array) => array.direct_component.clone(),
            TypeInfo::Raw(_) | TypeInfo::Parameterized(_) => self.clone(),
            _ => self.non_bounded().direct_component_type(),
        }
    }

    pub fn dimension(&self) -> u32 {
        match self {
            TypeInfo::Array(array) => array.dimension,
            TypeInfo::Raw(_) | TypeInfo::Parameterized(_) => 0,
            _ => self.non_bounded().dimension(),
        }
    }

    /// Formal type parameters of a raw or parameterized type.
    pub fn type_parameters(&self) -> &[Arc<TypeVariable>] {
        match self {
            TypeInfo::Raw(raw) => raw.type_parameters(),
            TypeInfo::Parameterized(pt) => pt.raw.type_parameters(),
            _ => &[],
        }
    }

    pub fn is_generic(&self) -> bool {
        self.class_decl().is_some_and(|decl| decl.is_generic())
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeInfo::Raw(a), TypeInfo::Raw(b)) => a == b,
            (TypeInfo::Parameterized(a), TypeInfo::Parameterized(b)) => {
                Arc::ptr_eq(a, b) || a == b
            }
            (TypeInfo::Array(a), TypeInfo::Array(b)) => Arc::ptr_eq(a, b) || a == b,
            (TypeInfo::Variable(a), TypeInfo::Variable(b)) => a == b,
            (TypeInfo::Wildcard(a), TypeInfo::Wildcard(b)) => a == b,
            (TypeInfo::UnknownWildcard(a), TypeInfo::UnknownWildcard(b)) => a.wrapped == b.wrapped,
            (TypeInfo::UnknownWildcard(a), TypeInfo::Wildcard(b))
            | (TypeInfo::Wildcard(b), TypeInfo::UnknownWildcard(a)) => *a.wrapped == **b,
            _ => false,
        }
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            TypeInfo::Raw(raw) => {
                0u8.hash(state);
                raw.hash(state);
            }
            TypeInfo::Parameterized(pt) => {
                1u8.hash(state);
                pt.hash(state);
            }
            TypeInfo::Array(array) => {
                2u8.hash(state);
                array.hash(state);
            }
            TypeInfo::Variable(var) => {
                3u8.hash(state);
                var.hash(state);
            }
            TypeInfo::Wildcard(wildcard) => {
                4u8.hash(state);
                wildcard.hash(state);
            }
            TypeInfo::UnknownWildcard(wildcard) => {
                4u8.hash(state);
                wildcard.wrapped.hash(state);
            }
        }
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            TypeInfo::Raw(_) => "Raw",
            TypeInfo::Parameterized(_) => "Parameterized",
            TypeInfo::Array(_) => "Array",
            TypeInfo::Variable(_) => "Variable",
            TypeInfo::Wildcard(_) => "Wildcard",
            TypeInfo::UnknownWildcard(_) => "UnknownWildcard",
        };
        write!(f, "{kind}({self})")
    }
}

/// A nominal class, interface or primitive.
pub struct RawType {
    pub(crate) decl: Arc<ClassDecl>,
    pub(crate) erasure: Erasure,
    type_params: OnceLock<Vec<Arc<TypeVariable>>>,
    pub(crate) lattice: OnceLock<Supertypes>,
}

impl RawType {
    pub(crate) fn new(decl: Arc<ClassDecl>) -> Self {
        let erasure = Erasure::class(decl.name.clone());
        Self {
            decl,
            erasure,
            type_params: OnceLock::new(),
            lattice: OnceLock::new(),
        }
    }

    pub fn decl(&self) -> &Arc<ClassDecl> {
        &self.decl
    }

    pub fn name(&self) -> &ClassName {
        &self.decl.name
    }

    pub fn erasure(&self) -> &Erasure {
        &self.erasure
    }

    /// Empty while the type is still being built.
    pub fn type_parameters(&self) -> &[Arc<TypeVariable>] {
        self.type_params.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn init_type_parameters(&self, vars: Vec<Arc<TypeVariable>>) {
        // A racing builder of the same declaration produces an equal list.
        let _ = self.type_params.set(vars);
    }
}

impl PartialEq for RawType {
    fn eq(&self, other: &Self) -> bool {
        self.erasure == other.erasure
    }
}

impl Eq for RawType {}

impl Hash for RawType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.erasure.hash(state);
    }
}

/// A generic class applied to actual type arguments.
pub struct ParameterizedType {
    pub(crate) raw: Arc<RawType>,
    args: OnceLock<Vec<TypeInfo>>,
    concrete: OnceLock<bool>,
    pub(crate) lattice: OnceLock<Supertypes>,
}

impl ParameterizedType {
    pub(crate) fn new(raw: Arc<RawType>) -> Result<Self, TypeError> {
        if !raw.decl.is_generic() {
            return Err(TypeError::NotGeneric(raw.name().to_string()));
        }
        Ok(Self {
            raw,
            args: OnceLock::new(),
            concrete: OnceLock::new(),
            lattice: OnceLock::new(),
        })
    }

    pub(crate) fn init_arguments(&self, args: Vec<TypeInfo>) {
        let _ = self.args.set(args);
    }

    pub fn raw(&self) -> &Arc<RawType> {
        &self.raw
    }

    pub fn raw_type(&self) -> TypeInfo {
        TypeInfo::Raw(self.raw.clone())
    }

    /// One argument per formal type parameter, in declaration order.
    pub fn actual_type_arguments(&self) -> &[TypeInfo] {
        self.args.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn actual_type_argument(&self, name: &str) -> Option<&TypeInfo> {
        let idx = self
            .raw
            .decl
            .type_params
            .iter()
            .position(|param| &*param.name == name)?;
        self.actual_type_arguments().get(idx)
    }

    /// True when no argument can change under resolution, in any context.
    pub fn is_concrete(&self) -> bool {
        let Some(args) = self.args.get() else {
            return false;
        };
        *self
            .concrete
            .get_or_init(|| args.iter().all(is_concrete_argument))
    }
}

fn is_concrete_argument(arg: &TypeInfo) -> bool {
    match arg {
        TypeInfo::Raw(_) => true,
        TypeInfo::Parameterized(pt) => pt.is_concrete(),
        TypeInfo::Array(array) => is_concrete_argument(&array.component),
        TypeInfo::Variable(_) | TypeInfo::UnknownWildcard(_) => false,
        TypeInfo::Wildcard(wildcard) => wildcard.is_unknown(),
    }
}

impl PartialEq for ParameterizedType {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.actual_type_arguments() == other.actual_type_arguments()
    }
}

impl Eq for ParameterizedType {}

impl Hash for ParameterizedType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
        self.actual_type_arguments().hash(state);
    }
}

pub struct ArrayType {
    pub(crate) component: TypeInfo,
    pub(crate) direct_component: TypeInfo,
    pub(crate) dimension: u32,
    pub(crate) erasure: Erasure,
    pub(crate) lattice: OnceLock<Supertypes>,
}

impl ArrayType {
    pub(crate) fn new(component: TypeInfo, direct_component: TypeInfo, dimension: u32) -> Self {
        let component_erasure = component.erasure();
        let erasure = component_erasure.with_dimensions(component_erasure.dimensions + dimension);
        Self {
            component,
            direct_component,
            dimension,
            erasure,
            lattice: OnceLock::new(),
        }
    }

    pub fn component_type(&self) -> &TypeInfo {
        &self.component
    }

    pub fn direct_component_type(&self) -> &TypeInfo {
        &self.direct_component
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }
}

impl PartialEq for ArrayType {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension && self.component == other.component
    }
}

impl Eq for ArrayType {}

impl Hash for ArrayType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dimension.hash(state);
        self.component.hash(state);
    }
}

/// A type variable, identified by its name and the declaration that
/// introduced it.
pub struct TypeVariable {
    pub(crate) name: Arc<str>,
    pub(crate) declaration: DeclarationRef,
    upper_bounds: Vec<TypeInfo>,
}

impl TypeVariable {
    pub(crate) fn new(
        name: Arc<str>,
        declaration: DeclarationRef,
        upper_bounds: Vec<TypeInfo>,
    ) -> Result<Self, TypeError> {
        if upper_bounds.is_empty() {
            return Err(TypeError::EmptyBounds(name.to_string()));
        }
        Ok(Self {
            name,
            declaration,
            upper_bounds,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaration(&self) -> &DeclarationRef {
        &self.declaration
    }
}

impl BoundedType for TypeVariable {
    fn upper_bounds(&self) -> &[TypeInfo] {
        &self.upper_bounds
    }

    fn lower_bounds(&self) -> &[TypeInfo] {
        &[]
    }
}

impl PartialEq for TypeVariable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.declaration == other.declaration
    }
}

impl Eq for TypeVariable {}

impl Hash for TypeVariable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.declaration.hash(state);
    }
}

impl fmt::Debug for TypeVariable {
    // Bounds may lead back to this variable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeVariable")
            .field("name", &self.name)
            .field("declaration", &self.declaration)
            .finish_non_exhaustive()
    }
}

pub struct WildcardType {
    upper_bounds: Vec<TypeInfo>,
    lower_bounds: Vec<TypeInfo>,
    unknown: bool,
}

impl WildcardType {
    /// `unknown` records whether the sole upper bound is the root type.
    pub(crate) fn new(
        upper_bounds: Vec<TypeInfo>,
        lower_bounds: Vec<TypeInfo>,
        unknown: bool,
    ) -> Result<Self, TypeError> {
        if upper_bounds.is_empty() {
            return Err(TypeError::EmptyBounds("?".to_string()));
        }
        Ok(Self {
            upper_bounds,
            lower_bounds,
            unknown,
        })
    }

    /// True for `?`, and equally for `? extends Object` and `? super X`:
    /// only the upper bound is inspected.
    pub fn is_unknown(&self) -> bool {
        self.unknown
    }
}

impl BoundedType for WildcardType {
    fn upper_bounds(&self) -> &[TypeInfo] {
        &self.upper_bounds
    }

    fn lower_bounds(&self) -> &[TypeInfo] {
        &self.lower_bounds
    }
}

impl PartialEq for WildcardType {
    fn eq(&self, other: &Self) -> bool {
        self.upper_bounds == other.upper_bounds && self.lower_bounds == other.lower_bounds
    }
}

impl Eq for WildcardType {}

impl Hash for WildcardType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.upper_bounds.hash(state);
        self.lower_bounds.hash(state);
    }
}

/// Wraps an unknown wildcard argument, overriding its upper bounds with those
/// of the formal parameter it stands for. Identity and equality are the
/// wrapped wildcard's.
pub struct UnknownWildcard {
    pub(crate) wrapped: Arc<WildcardType>,
    upper_bounds: Vec<TypeInfo>,
    unbounded: bool,
}

impl UnknownWildcard {
    pub(crate) fn new(
        wrapped: Arc<WildcardType>,
        upper_bounds: Vec<TypeInfo>,
        unbounded: bool,
    ) -> Result<Self, TypeError> {
        if upper_bounds.is_empty() {
            return Err(TypeError::EmptyBounds("?".to_string()));
        }
        Ok(Self {
            wrapped,
            upper_bounds,
            unbounded,
        })
    }

    pub fn wrapped(&self) -> &Arc<WildcardType> {
        &self.wrapped
    }

    /// Whether the overriding upper bound is just the root type.
    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }
}

impl BoundedType for UnknownWildcard {
    fn upper_bounds(&self) -> &[TypeInfo] {
        &self.upper_bounds
    }

    fn lower_bounds(&self) -> &[TypeInfo] {
        self.wrapped.lower_bounds()
    }
}
