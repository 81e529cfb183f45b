//! The extracted API model.
//!
//! Ownership forms a tree: the model root owns namespaces, namespaces own
//! types, types own members. Namespaces live in an arena indexed by
//! [`NamespaceId`] so the parent link is a plain handle instead of a shared
//! reference; node 0 is the root (a namespace with an empty `fullName` and no
//! parent).
//!
//! All tag-derived attributes land in insertion-ordered `serde_json` maps, so
//! the serialized output reproduces the order in which tags fired.

use serde_json::{Map, Value};

/// Handle to a namespace in the model arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceId(usize);

/// Handle to a type: owning namespace plus index into its `types`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub NamespaceId, pub usize);

/// Handle to a member: owning type plus index into its `members`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberId(pub TypeId, pub usize);

/// Source location captured from the scanner at end-block time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub file: String,
    pub line: usize,
}

impl Source {
    fn to_serializable(&self) -> Value {
        let mut map = Map::new();
        map.insert("file".into(), Value::String(self.file.clone()));
        map.insert("line".into(), Value::Number(self.line.into()));
        Value::Object(map)
    }
}

/// A class/mixin/struct-like entity owned by exactly one namespace.
#[derive(Debug, Clone, Default)]
pub struct Type {
    /// Discriminant set by the classifying tag handler ("class", "mixin", ...).
    pub kind: String,
    pub name: String,
    pub summary: Option<String>,
    /// Free-form tag output, keyed by tag name, in firing order.
    pub data: Map<String, Value>,
    pub source: Option<Source>,
    pub members: Vec<Member>,
}

impl Type {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Serialize as `{ type, name, summary?, <data>, source?, members }`.
    pub fn to_serializable(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), Value::String(self.kind.clone()));
        map.insert("name".into(), Value::String(self.name.clone()));
        if let Some(summary) = &self.summary {
            map.insert("summary".into(), Value::String(summary.clone()));
        }
        insert_data(&mut map, &self.data, &["type", "name", "summary", "source", "members"]);
        if let Some(source) = &self.source {
            map.insert("source".into(), source.to_serializable());
        }
        map.insert(
            "members".into(),
            Value::Array(self.members.iter().map(Member::to_serializable).collect()),
        );
        Value::Object(map)
    }
}

/// A method/property/event/etc. owned by exactly one type.
#[derive(Debug, Clone, Default)]
pub struct Member {
    pub name: String,
    pub summary: Option<String>,
    /// Free-form tag output, keyed by tag name, in firing order.
    pub data: Map<String, Value>,
    pub source: Option<Source>,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Serialize as `{ name, summary?, <data>, source? }`.
    pub fn to_serializable(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".into(), Value::String(self.name.clone()));
        if let Some(summary) = &self.summary {
            map.insert("summary".into(), Value::String(summary.clone()));
        }
        insert_data(&mut map, &self.data, &["name", "summary", "source"]);
        if let Some(source) = &self.source {
            map.insert("source".into(), source.to_serializable());
        }
        Value::Object(map)
    }
}

/// A named grouping of types and child namespaces.
#[derive(Debug, Clone)]
pub struct Namespace {
    pub full_name: String,
    pub summary: Option<String>,
    /// Namespace-level tag output; only `desc` is part of the fixed output
    /// schema, the rest stays available for tooling.
    pub data: Map<String, Value>,
    types: Vec<Type>,
    children: Vec<NamespaceId>,
    parent: Option<NamespaceId>,
}

impl Namespace {
    fn new(full_name: impl Into<String>, parent: Option<NamespaceId>) -> Self {
        Self {
            full_name: full_name.into(),
            summary: None,
            data: Map::new(),
            types: Vec::new(),
            children: Vec::new(),
            parent,
        }
    }

    /// Non-owning link to the parent namespace; `None` on the root.
    pub fn parent(&self) -> Option<NamespaceId> {
        self.parent
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn children(&self) -> &[NamespaceId] {
        &self.children
    }

    /// Ordered subsequence of types whose discriminant equals `kind`.
    pub fn types_by_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Type> {
        self.types.iter().filter(move |t| t.kind == kind)
    }

    pub fn classes(&self) -> impl Iterator<Item = &Type> {
        self.types_by_kind("class")
    }

    pub fn mixins(&self) -> impl Iterator<Item = &Type> {
        self.types_by_kind("mixin")
    }

    pub fn structs(&self) -> impl Iterator<Item = &Type> {
        self.types_by_kind("struct")
    }
}

/// The root container: an arena of namespaces plus everything they own.
#[derive(Debug, Clone)]
pub struct ApiModel {
    nodes: Vec<Namespace>,
}

impl Default for ApiModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiModel {
    pub fn new() -> Self {
        Self {
            nodes: vec![Namespace::new("", None)],
        }
    }

    pub fn root(&self) -> NamespaceId {
        NamespaceId(0)
    }

    pub fn namespace(&self, id: NamespaceId) -> &Namespace {
        &self.nodes[id.0]
    }

    pub fn namespace_mut(&mut self, id: NamespaceId) -> &mut Namespace {
        &mut self.nodes[id.0]
    }

    /// Append a child namespace under `parent`, wiring the back-reference.
    pub fn add_child_namespace(
        &mut self,
        parent: NamespaceId,
        full_name: impl Into<String>,
    ) -> NamespaceId {
        let id = NamespaceId(self.nodes.len());
        self.nodes.push(Namespace::new(full_name, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Resolve a dotted full name, creating any missing links in the chain.
    ///
    /// `""` resolves to the root. Existing namespaces are reused, so every
    /// namespace keeps exactly one owner no matter how many blocks mention it.
    pub fn get_or_create_namespace(&mut self, full_name: &str) -> NamespaceId {
        let mut current = self.root();
        if full_name.is_empty() {
            return current;
        }

        let mut path = String::new();
        for segment in full_name.split('.') {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(segment);

            let existing = self.nodes[current.0]
                .children
                .iter()
                .copied()
                .find(|child| self.nodes[child.0].full_name == path);

            current = match existing {
                Some(child) => child,
                None => self.add_child_namespace(current, path.clone()),
            };
        }

        current
    }

    /// Append `ty` to the namespace's type list and return its handle.
    pub fn add_type(&mut self, ns: NamespaceId, ty: Type) -> TypeId {
        let types = &mut self.nodes[ns.0].types;
        types.push(ty);
        TypeId(ns, types.len() - 1)
    }

    pub fn type_ref(&self, id: TypeId) -> &Type {
        &self.nodes[id.0.0].types[id.1]
    }

    pub fn type_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.nodes[id.0.0].types[id.1]
    }

    /// Append `member` to the type's member list and return its handle.
    pub fn add_member(&mut self, ty: TypeId, member: Member) -> MemberId {
        let members = &mut self.type_mut(ty).members;
        members.push(member);
        MemberId(ty, members.len() - 1)
    }

    pub fn member_ref(&self, id: MemberId) -> &Member {
        &self.type_ref(id.0).members[id.1]
    }

    pub fn member_mut(&mut self, id: MemberId) -> &mut Member {
        &mut self.type_mut(id.0).members[id.1]
    }

    /// Serialize the whole tree rooted at the root namespace.
    ///
    /// Pure and total: never mutates, never fails on a well-formed tree.
    /// Insertion order of types, members, and namespaces is preserved.
    pub fn to_serializable(&self) -> Value {
        self.namespace_to_serializable(self.root())
    }

    /// Serialize one namespace node as
    /// `{ fullName, summary?, desc?, types, namespaces }`.
    pub fn namespace_to_serializable(&self, id: NamespaceId) -> Value {
        let ns = self.namespace(id);
        let mut map = Map::new();
        map.insert("fullName".into(), Value::String(ns.full_name.clone()));
        if let Some(summary) = &ns.summary {
            map.insert("summary".into(), Value::String(summary.clone()));
        }
        if let Some(desc) = ns.data.get("desc") {
            map.insert("desc".into(), desc.clone());
        }
        map.insert(
            "types".into(),
            Value::Array(ns.types.iter().map(Type::to_serializable).collect()),
        );
        map.insert(
            "namespaces".into(),
            Value::Array(
                ns.children
                    .iter()
                    .map(|child| self.namespace_to_serializable(*child))
                    .collect(),
            ),
        );
        Value::Object(map)
    }
}

/// Copy tag data into an output map, leaving fixed schema keys untouched.
fn insert_data(map: &mut Map<String, Value>, data: &Map<String, Value>, fixed: &[&str]) {
    for (key, value) in data {
        if !fixed.contains(&key.as_str()) && !map.contains_key(key) {
            map.insert(key.clone(), value.clone());
        }
    }
}
