//! The stub tree: a source-level skeleton of one class file.
//!
//! Nodes live in an arena owned by [`StubTree`] and refer to each other by
//! [`NodeId`]. The root is always a [`Stub::File`]; its single class child is the
//! top-level class, whose children are its modifier list, reference lists, fields,
//! methods and inner classes in the order they were built.

mod modifiers;
mod type_info;

use std::ops::Index;

pub use modifiers::ModifierFlags;
use serde::{Deserialize, Serialize};
pub use type_info::TypeInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StubNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    stub: Stub,
}

impl StubNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn stub(&self) -> &Stub {
        &self.stub
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stub {
    File(FileStub),
    Class(ClassStub),
    Field(FieldStub),
    Method(MethodStub),
    ParameterList,
    Parameter(ParameterStub),
    ModifierList(ModifierListStub),
    ReferenceList(ReferenceListStub),
    Annotation(AnnotationStub),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStub {
    pub package_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LanguageLevel {
    #[serde(rename = "JDK_1_3")]
    Jdk1_3,
    #[serde(rename = "JDK_1_4")]
    Jdk1_4,
    #[serde(rename = "JDK_1_5")]
    Jdk1_5,
    #[serde(rename = "HIGHEST")]
    Highest,
}

impl LanguageLevel {
    /// Level implied by a class file major version.
    pub fn from_major_version(major: u16) -> Self {
        match major {
            45..=47 => LanguageLevel::Jdk1_3,
            48 => LanguageLevel::Jdk1_4,
            49 | 50 => LanguageLevel::Jdk1_5,
            _ => LanguageLevel::Highest,
        }
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ClassStubFlags: u8 {
        const DEPRECATED = 1 << 0;
        const INTERFACE = 1 << 1;
        const ENUM = 1 << 2;
        const ANNOTATION_TYPE = 1 << 3;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct FieldStubFlags: u8 {
        const ENUM_CONSTANT = 1 << 0;
        const DEPRECATED = 1 << 1;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MethodStubFlags: u8 {
        const CONSTRUCTOR = 1 << 0;
        const ANNOTATION_METHOD = 1 << 1;
        const VARARGS = 1 << 2;
        const DEPRECATED = 1 << 3;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    /// Bound texts; an implicit `java.lang.Object` bound is not listed.
    pub bounds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStub {
    /// Dotted name with nesting `$` replaced by `.`, e.g. `java.util.Map.Entry`.
    pub qualified_name: String,
    pub name: String,
    pub source_file_name: Option<String>,
    pub language_level: LanguageLevel,
    pub flags: ClassStubFlags,
    pub type_parameters: Vec<TypeParameter>,
}

impl ClassStub {
    pub fn is_interface(&self) -> bool {
        self.flags.contains(ClassStubFlags::INTERFACE)
    }

    pub fn is_enum(&self) -> bool {
        self.flags.contains(ClassStubFlags::ENUM)
    }

    pub fn is_annotation_type(&self) -> bool {
        self.flags.contains(ClassStubFlags::ANNOTATION_TYPE)
    }

    pub fn is_deprecated(&self) -> bool {
        self.flags.contains(ClassStubFlags::DEPRECATED)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStub {
    pub name: String,
    pub type_info: TypeInfo,
    /// Source text of a compile-time constant initializer.
    pub initializer_text: Option<String>,
    pub flags: FieldStubFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodStub {
    /// For constructors, the short name of the declaring class.
    pub name: String,
    pub return_type: TypeInfo,
    pub flags: MethodStubFlags,
    pub type_parameters: Vec<TypeParameter>,
    /// Annotation element default, e.g. `{1,2}`.
    pub default_value_text: Option<String>,
}

impl MethodStub {
    pub fn is_constructor(&self) -> bool {
        self.flags.contains(MethodStubFlags::CONSTRUCTOR)
    }

    pub fn is_varargs(&self) -> bool {
        self.flags.contains(MethodStubFlags::VARARGS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterStub {
    pub name: String,
    pub type_info: TypeInfo,
    pub is_varargs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierListStub {
    pub flags: ModifierFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceRole {
    Extends,
    Implements,
    Throws,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceListStub {
    pub role: ReferenceRole,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationStub {
    /// Source text, e.g. `@java.lang.Deprecated` or `@pkg.Anno(a=1,b="x")`.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StubTree {
    nodes: Vec<StubNode>,
}

impl Default for StubTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for StubTree {
    type Output = StubNode;

    fn index(&self, id: NodeId) -> &StubNode {
        &self.nodes[id.index()]
    }
}

impl StubTree {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![StubNode {
                parent: None,
                children: Vec::new(),
                stub: Stub::File(FileStub::default()),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&StubNode> {
        self.nodes.get(id.index())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[][..], StubNode::children)
    }

    pub fn package_name(&self) -> &str {
        match self.node(self.root()).map(StubNode::stub) {
            Some(Stub::File(file)) => &file.package_name,
            _ => "",
        }
    }

    /// The class declared by the file.
    pub fn top_class(&self) -> Option<NodeId> {
        self.children_of_kind(self.root(), |stub| matches!(stub, Stub::Class(_)))
            .next()
    }

    pub fn class(&self, id: NodeId) -> Option<&ClassStub> {
        match self.node(id)?.stub() {
            Stub::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn field(&self, id: NodeId) -> Option<&FieldStub> {
        match self.node(id)?.stub() {
            Stub::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn method(&self, id: NodeId) -> Option<&MethodStub> {
        match self.node(id)?.stub() {
            Stub::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn parameter(&self, id: NodeId) -> Option<&ParameterStub> {
        match self.node(id)?.stub() {
            Stub::Parameter(parameter) => Some(parameter),
            _ => None,
        }
    }

    pub fn fields(&self, class: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children_of_kind(class, |stub| matches!(stub, Stub::Field(_)))
    }

    pub fn methods(&self, class: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children_of_kind(class, |stub| matches!(stub, Stub::Method(_)))
    }

    pub fn inner_classes(&self, class: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children_of_kind(class, |stub| matches!(stub, Stub::Class(_)))
    }

    /// Method parameters in declaration order.
    pub fn parameters(&self, method: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children_of_kind(method, |stub| matches!(stub, Stub::ParameterList))
            .flat_map(move |list| self.children(list).iter().copied())
    }

    pub fn field_by_name(&self, class: NodeId, name: &str) -> Option<NodeId> {
        self.fields(class)
            .find(|&id| self.field(id).is_some_and(|field| field.name == name))
    }

    /// First method with the given name; constructors go by the class short name.
    pub fn method_by_name(&self, class: NodeId, name: &str) -> Option<NodeId> {
        self.methods(class)
            .find(|&id| self.method(id).is_some_and(|method| method.name == name))
    }

    pub fn inner_class_by_name(&self, class: NodeId, name: &str) -> Option<NodeId> {
        self.inner_classes(class)
            .find(|&id| self.class(id).is_some_and(|inner| inner.name == name))
    }

    pub fn modifier_list_id(&self, owner: NodeId) -> Option<NodeId> {
        self.children_of_kind(owner, |stub| matches!(stub, Stub::ModifierList(_)))
            .next()
    }

    pub fn modifier_list(&self, owner: NodeId) -> Option<&ModifierListStub> {
        match self.node(self.modifier_list_id(owner)?)?.stub() {
            Stub::ModifierList(list) => Some(list),
            _ => None,
        }
    }

    /// Annotation texts on `owner`'s modifier list, in attachment order.
    pub fn annotations(&self, owner: NodeId) -> Vec<&str> {
        let Some(list) = self.modifier_list_id(owner) else {
            return Vec::new();
        };
        self.children(list)
            .iter()
            .filter_map(|&id| match self.node(id)?.stub() {
                Stub::Annotation(annotation) => Some(annotation.text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn reference_list(&self, owner: NodeId, role: ReferenceRole) -> Option<&[String]> {
        self.children(owner)
            .iter()
            .find_map(|&id| match self.node(id)?.stub() {
                Stub::ReferenceList(list) if list.role == role => Some(list.names.as_slice()),
                _ => None,
            })
    }

    fn children_of_kind<'a>(
        &'a self,
        owner: NodeId,
        kind: impl Fn(&Stub) -> bool + 'a,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(owner)
            .iter()
            .copied()
            .filter(move |&id| self.node(id).is_some_and(|node| kind(node.stub())))
    }

    pub(crate) fn add_child(&mut self, parent: NodeId, stub: Stub) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(StubNode {
            parent: Some(parent),
            children: Vec::new(),
            stub,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub(crate) fn stub_mut(&mut self, id: NodeId) -> Option<&mut Stub> {
        self.nodes.get_mut(id.index()).map(|node| &mut node.stub)
    }
}
