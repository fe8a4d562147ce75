//! Supertype lattices.
//!
//! Every node computes its lattice at most once, on first request, and keeps
//! it for its whole lifetime. A lattice lists the node itself first, then
//! superclasses and interfaces, and ends with the root type when the root is
//! reachable.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use typegraph_reflect::{ClassDecl, ClassName, Erasure, ReflectType};

use crate::factory::TypeFactory;
use crate::types::{ArrayType, ParameterizedType, RawType, TypeInfo};

#[derive(Debug)]
enum Member {
    /// The node owning the lattice. Stored as a marker so that a node never
    /// holds a strong reference to itself.
    Owner,
    Type(TypeInfo),
}

impl Member {
    fn get(&self, owner: &TypeInfo) -> TypeInfo {
        match self {
            Member::Owner => owner.clone(),
            Member::Type(ty) => ty.clone(),
        }
    }

    fn is_interface(&self, owner: &TypeInfo) -> bool {
        match self {
            Member::Owner => owner.is_interface(),
            Member::Type(ty) => ty.is_interface(),
        }
    }
}

/// The computed lattice of one node.
#[derive(Debug)]
pub struct Supertypes {
    members: Vec<Member>,
    interfaces: Vec<usize>,
    superclasses: Vec<usize>,
}

impl Supertypes {
    fn partition(owner: &TypeInfo, members: Vec<Member>) -> Self {
        let (interfaces, superclasses) =
            (0..members.len()).partition(|&idx| members[idx].is_interface(owner));
        Self {
            members,
            interfaces,
            superclasses,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A lattice seen from the node that owns it.
#[derive(Clone, Copy)]
pub struct Lattice<'a> {
    owner: &'a TypeInfo,
    data: &'a Supertypes,
}

impl<'a> Lattice<'a> {
    /// All supertypes in lattice order, the owner first.
    pub fn supertypes(&self) -> impl Iterator<Item = TypeInfo> + 'a {
        let owner = self.owner;
        self.data.members.iter().map(move |member| member.get(owner))
    }

    /// The subsequence of [`Lattice::supertypes`] that are interfaces.
    pub fn interfaces(&self) -> impl Iterator<Item = TypeInfo> + 'a {
        let (owner, data) = (self.owner, self.data);
        data.interfaces
            .iter()
            .map(move |&idx| data.members[idx].get(owner))
    }

    /// The subsequence of [`Lattice::supertypes`] that are not interfaces.
    pub fn superclasses(&self) -> impl Iterator<Item = TypeInfo> + 'a {
        let (owner, data) = (self.owner, self.data);
        data.superclasses
            .iter()
            .map(move |&idx| data.members[idx].get(owner))
    }

    /// First supertype with the given erasure.
    pub fn find(&self, erasure: &Erasure) -> Option<TypeInfo> {
        self.supertypes().find(|ty| ty.erasure() == *erasure)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The stored lattice; equal pointers mean the lattice was computed once.
    pub fn storage(&self) -> &'a Supertypes {
        self.data
    }
}

impl TypeInfo {
    /// The supertype lattice, computed on first request.
    ///
    /// Bounded types share the lattice of their non-bounded base.
    pub fn lattice<'a>(&'a self, factory: &TypeFactory) -> Lattice<'a> {
        let data = match self {
            TypeInfo::Raw(raw) => raw_lattice(factory, raw),
            TypeInfo::Parameterized(pt) => pt
                .lattice
                .get_or_init(|| parameterized_lattice(factory, self, pt)),
            TypeInfo::Array(array) => array
                .lattice
                .get_or_init(|| array_lattice(factory, self, array)),
            _ => return self.non_bounded().lattice(factory),
        };
        Lattice { owner: self, data }
    }

    pub fn supertypes(&self, factory: &TypeFactory) -> Vec<TypeInfo> {
        self.lattice(factory).supertypes().collect()
    }

    pub fn interfaces(&self, factory: &TypeFactory) -> Vec<TypeInfo> {
        self.lattice(factory).interfaces().collect()
    }

    pub fn superclasses(&self, factory: &TypeFactory) -> Vec<TypeInfo> {
        self.lattice(factory).superclasses().collect()
    }

    /// The supertype declaration-equivalent to `erasure`, if any.
    pub fn supertype(&self, factory: &TypeFactory, erasure: &Erasure) -> Option<TypeInfo> {
        self.lattice(factory).find(erasure)
    }
}

fn raw_lattice<'a>(factory: &TypeFactory, raw: &'a Arc<RawType>) -> &'a Supertypes {
    raw.lattice.get_or_init(|| {
        let owner = TypeInfo::Raw(raw.clone());
        let members = compute_raw_lattice(factory, raw.decl());
        factory.record_lattice(&owner, members.len());
        Supertypes::partition(&owner, members)
    })
}

/// Breadth-first queue of interfaces, visiting each class once.
#[derive(Default)]
struct InterfaceQueue {
    queue: VecDeque<ReflectType>,
    visited: HashSet<ClassName>,
}

impl InterfaceQueue {
    fn push_all(&mut self, interfaces: &[ReflectType]) {
        for interface in interfaces {
            if let Some(name) = interface.class_name() {
                if self.visited.insert(name.clone()) {
                    self.queue.push_back(interface.clone());
                }
            }
        }
    }
}

fn compute_raw_lattice(factory: &TypeFactory, decl: &Arc<ClassDecl>) -> Vec<Member> {
    let root = factory.universe().root();
    if decl.name == *root {
        return vec![Member::Owner];
    }

    let mut members = vec![Member::Owner];
    let mut interfaces = InterfaceQueue::default();
    let reaches_root;

    if decl.is_interface() {
        interfaces.visited.insert(decl.name.clone());
        interfaces.push_all(&decl.interfaces);
        reaches_root = true;
    } else {
        let mut current = decl.clone();
        loop {
            interfaces.push_all(&current.interfaces);
            let Some(superclass) = &current.superclass else {
                reaches_root = false;
                break;
            };
            if superclass.class_name() == Some(root) {
                reaches_root = true;
                break;
            }
            let ty = factory.build(superclass);
            let Some(next) = ty.class_decl().cloned() else {
                reaches_root = false;
                break;
            };
            members.push(Member::Type(ty));
            current = next;
        }
    }

    while let Some(interface) = interfaces.queue.pop_front() {
        let ty = factory.build(&interface);
        if let Some(next) = ty.class_decl() {
            interfaces.push_all(&next.interfaces);
        }
        members.push(Member::Type(ty));
    }

    if reaches_root {
        members.push(Member::Type(factory.root_type()));
    }
    members
}

fn parameterized_lattice(
    factory: &TypeFactory,
    owner: &TypeInfo,
    pt: &Arc<ParameterizedType>,
) -> Supertypes {
    let raw_owner = pt.raw_type();
    let raw = raw_owner.lattice(factory);
    let members: Vec<Member> = raw
        .supertypes()
        .map(|ty| {
            if ty == raw_owner {
                Member::Owner
            } else {
                Member::Type(ty)
            }
        })
        .collect();
    factory.record_lattice(owner, members.len());
    Supertypes::partition(owner, members)
}

fn array_lattice(factory: &TypeFactory, owner: &TypeInfo, array: &ArrayType) -> Supertypes {
    let dimension = array.dimension;
    let component = &array.component;
    let mut members = Vec::new();

    for supertype in component.lattice(factory).supertypes() {
        if supertype == *component {
            members.push(Member::Owner);
        } else {
            members.push(Member::Type(factory.array(&supertype, dimension)));
        }
    }
    for level in (1..dimension).rev() {
        for supertype in factory.array_supertypes() {
            members.push(Member::Type(factory.array(&supertype, level)));
        }
    }
    members.extend(factory.array_supertypes().into_iter().map(Member::Type));

    factory.record_lattice(owner, members.len());
    Supertypes::partition(owner, members)
}
