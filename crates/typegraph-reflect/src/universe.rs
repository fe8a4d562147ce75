use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::io::Read;
use std::sync::Arc;

use crate::error::{LookupError, ReflectError, Result};
use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassTypeSignature,
    TypeArgument, TypeParameter, TypeSignature,
};
use crate::stub::{ClassStub, FieldStub, MethodStub, UniverseFile, ACC_PUBLIC};
use crate::types::{
    is_primitive_name, ClassName, DeclarationRef, Erasure, MemberKey, ReflectType, TypeVar,
    PRIMITIVES,
};

/// Root of the class hierarchy.
pub const OBJECT: &str = "java.lang.Object";

/// Interfaces every array class implements.
pub const ARRAY_INTERFACES: [&str; 2] = ["java.lang.Cloneable", "java.io.Serializable"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Primitive,
}

/// A formal type parameter with its bounds (never empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamDecl {
    pub name: Arc<str>,
    pub bounds: Vec<ReflectType>,
}

#[derive(Debug)]
pub struct ClassDecl {
    pub name: ClassName,
    pub kind: ClassKind,
    pub access_flags: u16,
    pub type_params: Vec<TypeParamDecl>,
    /// Generic superclass; `None` for the root, interfaces and primitives.
    pub superclass: Option<ReflectType>,
    pub interfaces: Vec<ReflectType>,
    pub fields: Vec<Arc<FieldDecl>>,
    /// Methods and constructors in declaration order.
    pub methods: Vec<Arc<MethodDecl>>,
}

impl ClassDecl {
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == ClassKind::Primitive
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn type_param(&self, name: &str) -> Option<&TypeParamDecl> {
        self.type_params.iter().find(|param| &*param.name == name)
    }

    pub fn declared_field(&self, name: &str) -> Option<&Arc<FieldDecl>> {
        self.fields.iter().find(|field| &*field.name == name)
    }

    pub fn declared_method(&self, name: &str, params: &[Erasure]) -> Option<&Arc<MethodDecl>> {
        self.methods
            .iter()
            .find(|method| !method.is_constructor() && method.matches(name, params))
    }

    pub fn declared_constructor(&self, params: &[Erasure]) -> Option<&Arc<MethodDecl>> {
        self.methods
            .iter()
            .find(|method| method.is_constructor() && method.param_erasures == params)
    }

    pub fn member(&self, key: &MemberKey) -> Option<&Arc<MethodDecl>> {
        self.methods.iter().find(|method| method.key == *key)
    }
}

#[derive(Debug)]
pub struct FieldDecl {
    pub declaring_class: ClassName,
    pub name: Arc<str>,
    pub access_flags: u16,
    pub ty: ReflectType,
}

#[derive(Debug)]
pub struct MethodDecl {
    pub key: MemberKey,
    pub access_flags: u16,
    pub type_params: Vec<TypeParamDecl>,
    pub params: Vec<ReflectType>,
    pub param_erasures: Vec<Erasure>,
    /// `None` for `void` methods and for constructors.
    pub return_type: Option<ReflectType>,
    pub exceptions: Vec<ReflectType>,
}

impl MethodDecl {
    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn declaring_class(&self) -> &ClassName {
        &self.key.class
    }

    pub fn is_constructor(&self) -> bool {
        &*self.key.name == crate::stub::CONSTRUCTOR_NAME
    }

    pub fn declaration(&self) -> DeclarationRef {
        if self.is_constructor() {
            DeclarationRef::Constructor(self.key.clone())
        } else {
            DeclarationRef::Method(self.key.clone())
        }
    }

    fn matches(&self, name: &str, params: &[Erasure]) -> bool {
        &*self.key.name == name && self.param_erasures == params
    }
}

/// Registry of every class the type engine may reflect over.
///
/// The universe is filled once and then shared read-only; it plays the part a
/// runtime reflection API would play for a live process.
#[derive(Debug)]
pub struct ClassUniverse {
    root: ClassName,
    classes: HashMap<ClassName, Arc<ClassDecl>>,
}

impl Default for ClassUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassUniverse {
    /// An empty universe holding only the primitive types.
    pub fn new() -> Self {
        let mut classes = HashMap::new();
        for name in PRIMITIVES {
            let name: ClassName = name.into();
            classes.insert(
                name.clone(),
                Arc::new(ClassDecl {
                    name,
                    kind: ClassKind::Primitive,
                    access_flags: ACC_PUBLIC | crate::stub::ACC_FINAL | crate::stub::ACC_ABSTRACT,
                    type_params: Vec::new(),
                    superclass: None,
                    interfaces: Vec::new(),
                    fields: Vec::new(),
                    methods: Vec::new(),
                }),
            );
        }
        Self {
            root: OBJECT.into(),
            classes,
        }
    }

    pub fn from_stubs(stubs: impl IntoIterator<Item = ClassStub>) -> Result<Self> {
        let mut universe = Self::new();
        universe.extend(stubs)?;
        Ok(universe)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let mut universe = Self::new();
        universe.extend_from_json_str(text)?;
        Ok(universe)
    }

    pub fn extend(&mut self, stubs: impl IntoIterator<Item = ClassStub>) -> Result<()> {
        for stub in stubs {
            self.insert(stub)?;
        }
        Ok(())
    }

    pub fn extend_from_json_str(&mut self, text: &str) -> Result<()> {
        let file: UniverseFile = serde_json::from_str(text)?;
        let count = file.classes.len();
        self.extend(file.classes)?;
        tracing::debug!(target = "typegraph.reflect", classes = count, "loaded class universe");
        Ok(())
    }

    pub fn load_json(&mut self, mut reader: impl Read) -> Result<()> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.extend_from_json_str(&text)
    }

    pub fn insert(&mut self, stub: ClassStub) -> Result<()> {
        let name: ClassName = stub.name.as_str().into();
        if self.classes.contains_key(&name) {
            return Err(ReflectError::DuplicateClass(name));
        }
        let decl = lower_class(&self.root, stub)?;
        self.classes.insert(name, Arc::new(decl));
        Ok(())
    }

    pub fn root(&self) -> &ClassName {
        &self.root
    }

    pub fn class(&self, name: &str) -> Option<&Arc<ClassDecl>> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &ClassName> {
        self.classes.keys()
    }

    pub fn is_interface(&self, name: &str) -> bool {
        self.class(name).is_some_and(|decl| decl.is_interface())
    }

    pub fn is_primitive(&self, name: &str) -> bool {
        self.class(name).is_some_and(|decl| decl.is_primitive())
    }

    /// Formal type parameter `name` of `declaration`.
    pub fn type_param(&self, declaration: &DeclarationRef, name: &str) -> Option<&TypeParamDecl> {
        match declaration {
            DeclarationRef::Class(class) => self.class(class)?.type_param(name),
            DeclarationRef::Method(key) | DeclarationRef::Constructor(key) => self
                .class(&key.class)?
                .member(key)?
                .type_params
                .iter()
                .find(|param| &*param.name == name),
        }
    }

    /// Java `to.isAssignableFrom(from)` over erasures.
    pub fn is_assignable(&self, to: &Erasure, from: &Erasure) -> bool {
        if to == from {
            return true;
        }
        match (to.dimensions, from.dimensions) {
            (0, 0) => self.is_subclass(&to.class, &from.class),
            (0, _) => self.is_array_supertype(&to.class),
            (t, f) if t > f => false,
            (t, f) if t == f => {
                !is_primitive_name(&to.class)
                    && !is_primitive_name(&from.class)
                    && self.is_subclass(&to.class, &from.class)
            }
            _ => self.is_array_supertype(&to.class),
        }
    }

    fn is_array_supertype(&self, name: &str) -> bool {
        name == &*self.root || ARRAY_INTERFACES.contains(&name)
    }

    fn is_subclass(&self, to: &str, from: &str) -> bool {
        if to == from {
            return true;
        }
        let Some(from_decl) = self.class(from) else {
            return false;
        };
        if from_decl.is_primitive() || is_primitive_name(to) {
            return false;
        }
        if to == &*self.root {
            return true;
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([from_decl.clone()]);
        while let Some(decl) = queue.pop_front() {
            let supers = decl.superclass.iter().chain(decl.interfaces.iter());
            for name in supers.filter_map(ReflectType::class_name) {
                if &**name == to {
                    return true;
                }
                if visited.insert(name.clone()) {
                    if let Some(next) = self.class(name) {
                        queue.push_back(next.clone());
                    }
                }
            }
        }
        false
    }

    /// Public method (declared or inherited) first, then any declared method.
    pub fn method(
        &self,
        class: &str,
        name: &str,
        params: &[Erasure],
    ) -> std::result::Result<Arc<MethodDecl>, LookupError> {
        let decl = self
            .class(class)
            .ok_or_else(|| LookupError::UnknownClass(class.into()))?;
        self.public_method(decl, name, params)
            .or_else(|| decl.declared_method(name, params).cloned())
            .ok_or_else(|| LookupError::NoSuchMethod {
                class: decl.name.clone(),
                name: name.to_string(),
                params: join_erasures(params),
            })
    }

    fn public_method(
        &self,
        decl: &Arc<ClassDecl>,
        name: &str,
        params: &[Erasure],
    ) -> Option<Arc<MethodDecl>> {
        let is_public_match = |method: &&Arc<MethodDecl>| {
            method.access_flags & ACC_PUBLIC != 0
                && !method.is_constructor()
                && method.matches(name, params)
        };

        let mut interfaces = VecDeque::new();
        let mut current = Some(decl.clone());
        while let Some(class) = current {
            if let Some(found) = class.methods.iter().find(is_public_match) {
                return Some(found.clone());
            }
            interfaces.extend(class.interfaces.iter().filter_map(ReflectType::class_name).cloned());
            current = class
                .superclass
                .as_ref()
                .and_then(ReflectType::class_name)
                .and_then(|name| self.class(name).cloned());
        }

        let mut visited = HashSet::new();
        while let Some(interface) = interfaces.pop_front() {
            if !visited.insert(interface.clone()) {
                continue;
            }
            let Some(class) = self.class(&interface) else {
                continue;
            };
            if let Some(found) = class.methods.iter().find(is_public_match) {
                return Some(found.clone());
            }
            interfaces.extend(class.interfaces.iter().filter_map(ReflectType::class_name).cloned());
        }
        None
    }

    pub fn constructor(
        &self,
        class: &str,
        params: &[Erasure],
    ) -> std::result::Result<Arc<MethodDecl>, LookupError> {
        let decl = self
            .class(class)
            .ok_or_else(|| LookupError::UnknownClass(class.into()))?;
        decl.declared_constructor(params)
            .cloned()
            .ok_or_else(|| LookupError::NoSuchMethod {
                class: decl.name.clone(),
                name: crate::stub::CONSTRUCTOR_NAME.to_string(),
                params: join_erasures(params),
            })
    }

    pub fn declared_field(
        &self,
        class: &str,
        name: &str,
    ) -> std::result::Result<Arc<FieldDecl>, LookupError> {
        let decl = self
            .class(class)
            .ok_or_else(|| LookupError::UnknownClass(class.into()))?;
        decl.declared_field(name)
            .cloned()
            .ok_or_else(|| LookupError::NoSuchField {
                class: decl.name.clone(),
                name: name.to_string(),
            })
    }

    /// Lowers a signature that appears outside any declaration.
    pub fn lower_standalone(&self, sig: &TypeSignature) -> Result<ReflectType> {
        Lowering::new(&self.root, "a standalone type".to_string()).lower(sig)
    }

    /// Checks that every class referenced by a declaration is present.
    pub fn validate(&self) -> Result<()> {
        let names: BTreeSet<&ClassName> = self.classes.keys().collect();
        for name in names {
            let decl = &self.classes[name];
            let mut referenced = Vec::new();
            for ty in class_references(decl) {
                collect_class_names(ty, &mut referenced);
            }
            for method in &decl.methods {
                for erasure in &method.param_erasures {
                    referenced.push(erasure.class.clone());
                }
            }
            if let Some(missing) = referenced.into_iter().find(|name| !self.contains(name)) {
                return Err(ReflectError::MissingClass {
                    referrer: decl.name.clone(),
                    missing,
                });
            }
        }
        Ok(())
    }
}

fn join_erasures(params: &[Erasure]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn class_references(decl: &ClassDecl) -> impl Iterator<Item = &ReflectType> {
    let bounds = decl.type_params.iter().flat_map(|param| param.bounds.iter());
    let fields = decl.fields.iter().map(|field| &field.ty);
    let methods = decl.methods.iter().flat_map(|method| {
        method
            .type_params
            .iter()
            .flat_map(|param| param.bounds.iter())
            .chain(method.params.iter())
            .chain(method.return_type.iter())
            .chain(method.exceptions.iter())
    });
    decl.superclass
        .iter()
        .chain(decl.interfaces.iter())
        .chain(bounds)
        .chain(fields)
        .chain(methods)
}

fn collect_class_names(ty: &ReflectType, out: &mut Vec<ClassName>) {
    match ty {
        ReflectType::Class(erasure) => out.push(erasure.class.clone()),
        ReflectType::GenericArray(component) => collect_class_names(component, out),
        ReflectType::Parameterized { raw, args } => {
            out.push(raw.clone());
            for arg in args {
                collect_class_names(arg, out);
            }
        }
        ReflectType::Variable(_) => {}
        ReflectType::Wildcard { upper, lower } => {
            for bound in upper.iter().chain(lower) {
                collect_class_names(bound, out);
            }
        }
    }
}

/// Turns parsed signatures into [`ReflectType`]s, binding type variables to
/// the innermost declaration that introduces them.
struct Lowering<'a> {
    root: &'a ClassName,
    scope: Vec<(Arc<str>, DeclarationRef)>,
    context: String,
}

impl<'a> Lowering<'a> {
    fn new(root: &'a ClassName, context: String) -> Self {
        Self {
            root,
            scope: Vec::new(),
            context,
        }
    }

    fn enter(&mut self, params: &[TypeParameter], owner: DeclarationRef) {
        for param in params {
            self.scope.push((param.name.as_str().into(), owner.clone()));
        }
        self.context = owner.to_string();
    }

    fn type_params(&self, params: &[TypeParameter]) -> Result<Vec<TypeParamDecl>> {
        params
            .iter()
            .map(|param| {
                let mut bounds = param
                    .class_bound
                    .iter()
                    .chain(param.interface_bounds.iter())
                    .map(|bound| self.lower(bound))
                    .collect::<Result<Vec<_>>>()?;
                if bounds.is_empty() {
                    bounds.push(ReflectType::class(self.root.clone()));
                }
                Ok(TypeParamDecl {
                    name: param.name.as_str().into(),
                    bounds,
                })
            })
            .collect()
    }

    fn lower(&self, sig: &TypeSignature) -> Result<ReflectType> {
        Ok(match sig {
            TypeSignature::Base(base) => ReflectType::class(base.name()),
            TypeSignature::Class(class) => self.class_type(class)?,
            TypeSignature::TypeVariable(name) => {
                let owner = self
                    .scope
                    .iter()
                    .rev()
                    .find(|(declared, _)| &**declared == name)
                    .map(|(_, owner)| owner.clone())
                    .ok_or_else(|| ReflectError::UnboundTypeVariable {
                        name: name.clone(),
                        context: self.context.clone(),
                    })?;
                ReflectType::Variable(TypeVar {
                    name: name.as_str().into(),
                    owner,
                })
            }
            TypeSignature::Array(component) => match self.lower(component)? {
                ReflectType::Class(erasure) => {
                    ReflectType::Class(erasure.with_dimensions(erasure.dimensions + 1))
                }
                other => ReflectType::GenericArray(Box::new(other)),
            },
        })
    }

    fn class_type(&self, class: &ClassTypeSignature) -> Result<ReflectType> {
        if class.args.is_empty() {
            return Ok(ReflectType::class(class.name.as_str()));
        }
        let args = class
            .args
            .iter()
            .map(|arg| self.type_argument(arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(ReflectType::Parameterized {
            raw: class.name.as_str().into(),
            args,
        })
    }

    fn type_argument(&self, arg: &TypeArgument) -> Result<ReflectType> {
        let root = || ReflectType::class(self.root.clone());
        Ok(match arg {
            TypeArgument::Any => ReflectType::Wildcard {
                upper: vec![root()],
                lower: Vec::new(),
            },
            TypeArgument::Extends(bound) => ReflectType::Wildcard {
                upper: vec![self.lower(bound)?],
                lower: Vec::new(),
            },
            TypeArgument::Super(bound) => ReflectType::Wildcard {
                upper: vec![root()],
                lower: vec![self.lower(bound)?],
            },
            TypeArgument::Exact(ty) => self.lower(ty)?,
        })
    }
}

fn lower_class(root: &ClassName, stub: ClassStub) -> Result<ClassDecl> {
    let name: ClassName = stub.name.as_str().into();
    let class_ref = DeclarationRef::Class(name.clone());
    let kind = if stub.is_interface() {
        ClassKind::Interface
    } else {
        ClassKind::Class
    };

    let mut lowering = Lowering::new(root, class_ref.to_string());
    let (type_params, superclass, interfaces) = match stub.signature.as_deref() {
        Some(sig) => {
            let parsed = parse_class_signature(sig)?;
            lowering.enter(&parsed.type_params, class_ref);
            let type_params = lowering.type_params(&parsed.type_params)?;
            let superclass = lowering.class_type(&parsed.super_class)?;
            let interfaces = parsed
                .interfaces
                .iter()
                .map(|interface| lowering.class_type(interface))
                .collect::<Result<Vec<_>>>()?;
            (type_params, Some(superclass), interfaces)
        }
        None => (
            Vec::new(),
            stub.super_class.as_deref().map(ReflectType::class),
            stub.interfaces
                .iter()
                .map(|interface| ReflectType::class(interface.as_str()))
                .collect(),
        ),
    };
    let superclass = superclass.filter(|_| kind == ClassKind::Class && name != *root);

    let fields = stub
        .fields
        .iter()
        .map(|field| lower_field(&lowering, &name, field).map(Arc::new))
        .collect::<Result<Vec<_>>>()?;
    let methods = stub
        .methods
        .iter()
        .map(|method| lower_method(&lowering, &name, method).map(Arc::new))
        .collect::<Result<Vec<_>>>()?;

    Ok(ClassDecl {
        name,
        kind,
        access_flags: stub.access_flags,
        type_params,
        superclass,
        interfaces,
        fields,
        methods,
    })
}

fn lower_field(lowering: &Lowering<'_>, class: &ClassName, stub: &FieldStub) -> Result<FieldDecl> {
    let sig = stub.signature.as_deref().unwrap_or(&stub.descriptor);
    let ty = lowering.lower(&parse_field_signature(sig)?)?;
    Ok(FieldDecl {
        declaring_class: class.clone(),
        name: stub.name.as_str().into(),
        access_flags: stub.access_flags,
        ty,
    })
}

fn lower_method(
    class_lowering: &Lowering<'_>,
    class: &ClassName,
    stub: &MethodStub,
) -> Result<MethodDecl> {
    let descriptor = parse_method_signature(&stub.descriptor)
        .map_err(|_| ReflectError::InvalidDescriptor(stub.descriptor.clone()))?;
    if !descriptor.type_params.is_empty() || !descriptor.throws.is_empty() {
        return Err(ReflectError::InvalidDescriptor(stub.descriptor.clone()));
    }
    let param_erasures = descriptor
        .params
        .iter()
        .map(descriptor_erasure)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ReflectError::InvalidDescriptor(stub.descriptor.clone()))?;

    let key = MemberKey {
        class: class.clone(),
        name: stub.name.as_str().into(),
        descriptor: stub.descriptor.as_str().into(),
    };
    let owner = if stub.is_constructor() {
        DeclarationRef::Constructor(key.clone())
    } else {
        DeclarationRef::Method(key.clone())
    };

    let parsed = match stub.signature.as_deref() {
        Some(sig) => parse_method_signature(sig)?,
        None => descriptor,
    };

    let mut lowering = Lowering {
        root: class_lowering.root,
        scope: class_lowering.scope.clone(),
        context: class_lowering.context.clone(),
    };
    lowering.enter(&parsed.type_params, owner);

    let type_params = lowering.type_params(&parsed.type_params)?;
    let params = parsed
        .params
        .iter()
        .map(|param| lowering.lower(param))
        .collect::<Result<Vec<_>>>()?;
    let return_type = match (&parsed.return_type, stub.is_constructor()) {
        (Some(ty), false) => Some(lowering.lower(ty)?),
        _ => None,
    };
    let exceptions = if parsed.throws.is_empty() {
        stub.exceptions
            .iter()
            .map(|exception| ReflectType::class(exception.as_str()))
            .collect()
    } else {
        parsed
            .throws
            .iter()
            .map(|exception| lowering.lower(exception))
            .collect::<Result<Vec<_>>>()?
    };

    Ok(MethodDecl {
        key,
        access_flags: stub.access_flags,
        type_params,
        params,
        param_erasures,
        return_type,
        exceptions,
    })
}

fn descriptor_erasure(sig: &TypeSignature) -> Option<Erasure> {
    match sig {
        TypeSignature::Base(base) => Some(Erasure::class(base.name())),
        TypeSignature::Class(class) if class.args.is_empty() => {
            Some(Erasure::class(class.name.as_str()))
        }
        TypeSignature::Array(component) => {
            let erasure = descriptor_erasure(component)?;
            Some(erasure.with_dimensions(erasure.dimensions + 1))
        }
        _ => None,
    }
}
