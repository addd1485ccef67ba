//! Turns reader events into a [`StubTree`].
//!
//! One [`StubBuilder`] handles one class file. Inner classes listed in the
//! `InnerClasses` attribute are read from sibling files through the
//! [`ClassSource`] and built by a nested builder under the same tree. A sibling
//! that cannot be found or read is skipped; one that fails to decode fails the
//! whole build.

use tracing::{debug, trace};

use crate::{
    annotation::{const_to_string, encode_annotation, encode_default},
    consts::{
        CONSTRUCTOR_NAME, ClassAccessFlag, FieldAccessFlag, JAVA_LANG_OBJECT, MethodAccessFlag,
        STATIC_INITIALIZER_NAME,
    },
    descriptor::{field_descriptor, internal_to_class_name, method_descriptor},
    error::{ClassFormatError, Result},
    options::StubOptions,
    reader::{
        Annotation, ClassHeader, ClassReader, ClassVisitor, ElementValue, FieldEvent,
        InnerClassRecord, MethodEvent,
    },
    signature::{parse_class_signature, parse_field_signature, parse_method_signature},
    source::ClassSource,
    stub::{
        AnnotationStub, ClassStub, ClassStubFlags, FieldStub, FieldStubFlags, LanguageLevel,
        MethodStub, MethodStubFlags, ModifierFlags, ModifierListStub, NodeId, ParameterStub,
        ReferenceListStub, ReferenceRole, Stub, StubTree, TypeInfo, TypeParameter,
    },
};

/// Builds the stub of the class in `bytes`, resolving inner classes through
/// `source`, with default [`StubOptions`].
pub fn build_stub<S: ClassSource>(source: &S, bytes: &[u8]) -> Result<StubTree> {
    build_stub_with(source, bytes, &StubOptions::default())
}

pub fn build_stub_with<S: ClassSource>(
    source: &S,
    bytes: &[u8],
    options: &StubOptions,
) -> Result<StubTree> {
    let mut tree = StubTree::new();
    let root = tree.root();
    let class = build_class(&mut tree, root, source, bytes, options, 0)?;

    let package_name = tree.class(class).map(package_name).unwrap_or_default();
    if let Some(Stub::File(file)) = tree.stub_mut(root) {
        file.package_name = package_name;
    }
    Ok(tree)
}

fn build_class<S: ClassSource>(
    tree: &mut StubTree,
    parent: NodeId,
    source: &S,
    bytes: &[u8],
    options: &StubOptions,
    depth: usize,
) -> Result<NodeId> {
    let reader = ClassReader::new(bytes)?;
    let mut builder = StubBuilder::new(tree, parent, source, options, depth);
    reader.accept(&mut builder)?;
    builder.finish()
}

fn package_name(class: &ClassStub) -> String {
    if class.name == class.qualified_name {
        return String::new();
    }
    class
        .qualified_name
        .rsplit_once('.')
        .map(|(package, _)| package.to_string())
        .unwrap_or_default()
}

/// `java/util/Map$Entry` to `java.util.Map.Entry`.
fn qualified_name(internal_name: &str) -> String {
    internal_name.replace(['/', '$'], ".")
}

fn short_name(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('.')
        .map_or(qualified_name, |(_, name)| name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    Empty,
    HeaderSet {
        class: NodeId,
        modifier_list: NodeId,
    },
    Finalized {
        class: NodeId,
    },
}

impl BuilderState {
    fn name(self) -> &'static str {
        match self {
            BuilderState::Empty => "empty",
            BuilderState::HeaderSet { .. } => "header set",
            BuilderState::Finalized { .. } => "finalized",
        }
    }
}

/// Nodes a field or method stub hands back for its member events.
#[derive(Debug, Clone)]
pub struct MemberStub {
    node: NodeId,
    modifier_list: NodeId,
    /// Modifier list of each parameter, in declaration order.
    parameters: Vec<NodeId>,
}

pub(crate) struct StubBuilder<'a, S> {
    tree: &'a mut StubTree,
    parent: NodeId,
    source: &'a S,
    options: &'a StubOptions,
    depth: usize,
    state: BuilderState,
}

impl<'a, S: ClassSource> StubBuilder<'a, S> {
    pub(crate) fn new(
        tree: &'a mut StubTree,
        parent: NodeId,
        source: &'a S,
        options: &'a StubOptions,
        depth: usize,
    ) -> Self {
        Self {
            tree,
            parent,
            source,
            options,
            depth,
            state: BuilderState::Empty,
        }
    }

    /// The class node, once every event up to the end has been received.
    pub(crate) fn finish(self) -> Result<NodeId> {
        match self.state {
            BuilderState::Finalized { class } => Ok(class),
            state => Err(ClassFormatError::Protocol {
                event: "finish",
                state: state.name(),
            }),
        }
    }

    fn header_set(&self, event: &'static str) -> Result<(NodeId, NodeId)> {
        match self.state {
            BuilderState::HeaderSet {
                class,
                modifier_list,
            } => Ok((class, modifier_list)),
            state => Err(ClassFormatError::Protocol {
                event,
                state: state.name(),
            }),
        }
    }

    fn class_stub(&self, class: NodeId) -> Result<&ClassStub> {
        self.tree.class(class).ok_or(ClassFormatError::Protocol {
            event: "member",
            state: self.state.name(),
        })
    }

    fn add_annotation(&mut self, modifier_list: NodeId, annotation: &Annotation) -> Result<()> {
        let text = encode_annotation(annotation)?;
        self.tree
            .add_child(modifier_list, Stub::Annotation(AnnotationStub { text }));
        Ok(())
    }

    fn add_modifier_list(&mut self, owner: NodeId, flags: ModifierFlags) -> NodeId {
        self.tree
            .add_child(owner, Stub::ModifierList(ModifierListStub { flags }))
    }

    fn add_reference_list(&mut self, owner: NodeId, role: ReferenceRole, names: Vec<String>) {
        self.tree
            .add_child(owner, Stub::ReferenceList(ReferenceListStub { role, names }));
    }

    fn resolve_inner_class(&mut self, class: NodeId, record: InnerClassRecord<'_>) -> Result<()> {
        let (Some(inner_name), Some(outer_name)) = (record.inner_name, record.outer_name) else {
            return Ok(());
        };
        if qualified_name(outer_name) != self.class_stub(class)?.qualified_name {
            return Ok(());
        }

        let sibling_name = format!("{}${inner_name}", self.source.base_name());
        let Some(sibling) = self.source.find_sibling(&sibling_name) else {
            debug!(inner_class = %sibling_name, "inner class file not found");
            return Ok(());
        };
        let bytes = match sibling.read() {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(inner_class = %sibling_name, %err, "cannot read inner class file");
                return Ok(());
            }
        };

        let depth = self.depth + 1;
        if depth > self.options.max_nesting_depth {
            return Err(ClassFormatError::NestingTooDeep(
                self.options.max_nesting_depth,
            ));
        }

        build_class(self.tree, class, &sibling, &bytes, self.options, depth)?;
        Ok(())
    }
}

fn field_type(descriptor: &str, signature: Option<&str>) -> Result<TypeInfo> {
    if let Some(signature) = signature {
        match parse_field_signature(signature) {
            Ok(text) => return Ok(TypeInfo::from_text(&text)),
            Err(err) => trace!(signature, %err, "field signature rejected"),
        }
    }
    Ok(TypeInfo::from_field_type(&field_descriptor(descriptor)?))
}

struct MethodTypes {
    type_parameters: Vec<TypeParameter>,
    parameters: Vec<TypeInfo>,
    return_type: TypeInfo,
}

fn method_types(descriptor: &str, signature: Option<&str>) -> Result<MethodTypes> {
    if let Some(signature) = signature {
        match parse_method_signature(signature) {
            Ok(method) => {
                return Ok(MethodTypes {
                    type_parameters: method.type_parameters,
                    parameters: method
                        .parameters
                        .iter()
                        .map(|parameter| TypeInfo::from_text(parameter))
                        .collect(),
                    return_type: TypeInfo::from_text(&method.return_type),
                });
            }
            Err(err) => trace!(signature, %err, "method signature rejected"),
        }
    }

    let method = method_descriptor(descriptor)?;
    Ok(MethodTypes {
        type_parameters: Vec::new(),
        parameters: method
            .parameters()
            .iter()
            .map(TypeInfo::from_field_type)
            .collect(),
        return_type: method
            .return_type()
            .map_or_else(|| TypeInfo::new("void", 0), TypeInfo::from_field_type),
    })
}

impl<S: ClassSource> ClassVisitor for StubBuilder<'_, S> {
    type Member = MemberStub;

    fn visit_header(&mut self, header: ClassHeader<'_>) -> Result<()> {
        if self.state != BuilderState::Empty {
            return Err(ClassFormatError::Protocol {
                event: "header",
                state: self.state.name(),
            });
        }

        let qualified_name = qualified_name(header.name);
        let name = short_name(&qualified_name).to_string();
        debug!(class = %qualified_name, depth = self.depth, "building class stub");

        let access = header.access;
        let mut flags = ClassStubFlags::empty();
        flags.set(
            ClassStubFlags::DEPRECATED,
            access.contains(ClassAccessFlag::DEPRECATED),
        );
        flags.set(
            ClassStubFlags::INTERFACE,
            access.contains(ClassAccessFlag::INTERFACE),
        );
        flags.set(ClassStubFlags::ENUM, access.contains(ClassAccessFlag::ENUM));
        flags.set(
            ClassStubFlags::ANNOTATION_TYPE,
            access.contains(ClassAccessFlag::ANNOTATION),
        );

        let signature = match header.signature.map(parse_class_signature) {
            Some(Ok(signature)) => Some(signature),
            Some(Err(err)) => {
                trace!(class = %qualified_name, %err, "class signature rejected");
                None
            }
            None => None,
        };
        let (type_parameters, super_class, interfaces) = match signature {
            Some(signature) => (
                signature.type_parameters,
                signature.super_class,
                signature.interfaces,
            ),
            None => (
                Vec::new(),
                header.super_name.map(internal_to_class_name),
                header
                    .interfaces
                    .iter()
                    .map(|interface| internal_to_class_name(interface))
                    .collect(),
            ),
        };

        let class = self.tree.add_child(
            self.parent,
            Stub::Class(ClassStub {
                qualified_name,
                name,
                source_file_name: None,
                language_level: LanguageLevel::from_major_version(header.version.major),
                flags,
                type_parameters,
            }),
        );
        let modifier_list = self.add_modifier_list(class, ModifierFlags::from_class(access));

        if flags.contains(ClassStubFlags::INTERFACE) {
            self.add_reference_list(class, ReferenceRole::Extends, interfaces);
            self.add_reference_list(class, ReferenceRole::Implements, Vec::new());
        } else {
            let extends = super_class
                .filter(|super_class| super_class != JAVA_LANG_OBJECT)
                .into_iter()
                .collect();
            self.add_reference_list(class, ReferenceRole::Extends, extends);
            self.add_reference_list(class, ReferenceRole::Implements, interfaces);
        }

        self.state = BuilderState::HeaderSet {
            class,
            modifier_list,
        };
        Ok(())
    }

    fn visit_annotation(&mut self, annotation: &Annotation, _visible: bool) -> Result<()> {
        let (_, modifier_list) = self.header_set("annotation")?;
        self.add_annotation(modifier_list, annotation)
    }

    fn visit_source(&mut self, source: Option<&str>) -> Result<()> {
        let (class, _) = self.header_set("source")?;
        if let Some(Stub::Class(class)) = self.tree.stub_mut(class) {
            class.source_file_name = source.map(str::to_string);
        }
        Ok(())
    }

    fn visit_field(&mut self, field: FieldEvent<'_>) -> Result<Option<MemberStub>> {
        let (class, _) = self.header_set("field")?;

        let access = field.access;
        let mut flags = FieldStubFlags::empty();
        flags.set(
            FieldStubFlags::ENUM_CONSTANT,
            access.contains(FieldAccessFlag::ENUM),
        );
        flags.set(
            FieldStubFlags::DEPRECATED,
            access.contains(FieldAccessFlag::DEPRECATED),
        );

        let node = self.tree.add_child(
            class,
            Stub::Field(FieldStub {
                name: field.name.to_string(),
                type_info: field_type(field.descriptor, field.signature)?,
                initializer_text: field.constant.and_then(const_to_string),
                flags,
            }),
        );
        let modifier_list = self.add_modifier_list(node, ModifierFlags::from_field(access));

        Ok(Some(MemberStub {
            node,
            modifier_list,
            parameters: Vec::new(),
        }))
    }

    fn visit_method(&mut self, method: MethodEvent<'_>) -> Result<Option<MemberStub>> {
        let (class, _) = self.header_set("method")?;

        let access = method.access;
        if access.intersects(MethodAccessFlag::SYNTHETIC | MethodAccessFlag::BRIDGE)
            || method.name == STATIC_INITIALIZER_NAME
        {
            trace!(method = method.name, "skipping method");
            return Ok(None);
        }

        let class_stub = self.class_stub(class)?;
        let is_constructor = method.name == CONSTRUCTOR_NAME;
        let is_varargs = access.contains(MethodAccessFlag::VARARGS);
        let name = if is_constructor {
            class_stub.name.clone()
        } else {
            method.name.to_string()
        };

        let mut flags = MethodStubFlags::empty();
        flags.set(MethodStubFlags::CONSTRUCTOR, is_constructor);
        flags.set(
            MethodStubFlags::ANNOTATION_METHOD,
            class_stub.is_annotation_type(),
        );
        flags.set(MethodStubFlags::VARARGS, is_varargs);
        flags.set(
            MethodStubFlags::DEPRECATED,
            access.contains(MethodAccessFlag::DEPRECATED),
        );

        let MethodTypes {
            type_parameters,
            parameters,
            return_type,
        } = method_types(method.descriptor, method.signature)?;

        let node = self.tree.add_child(
            class,
            Stub::Method(MethodStub {
                name,
                return_type,
                flags,
                type_parameters,
                default_value_text: None,
            }),
        );
        let modifier_list = self.add_modifier_list(node, ModifierFlags::from_method(access));

        let parameter_list = self.tree.add_child(node, Stub::ParameterList);
        let count = parameters.len();
        let mut parameter_modifier_lists = Vec::with_capacity(count);
        for (index, type_info) in parameters.into_iter().enumerate() {
            let is_ellipsis = is_varargs && index + 1 == count;
            let type_info = if is_ellipsis {
                type_info.into_ellipsis()
            } else {
                type_info
            };
            let parameter = self.tree.add_child(
                parameter_list,
                Stub::Parameter(ParameterStub {
                    name: format!("p{}", index + 1),
                    type_info,
                    is_varargs: is_ellipsis,
                }),
            );
            parameter_modifier_lists.push(self.add_modifier_list(parameter, ModifierFlags::empty()));
        }

        let throws = method
            .exceptions
            .unwrap_or_default()
            .into_iter()
            .map(internal_to_class_name)
            .collect();
        self.add_reference_list(node, ReferenceRole::Throws, throws);

        Ok(Some(MemberStub {
            node,
            modifier_list,
            parameters: parameter_modifier_lists,
        }))
    }

    fn visit_member_annotation(
        &mut self,
        member: &MemberStub,
        annotation: &Annotation,
        _visible: bool,
    ) -> Result<()> {
        self.header_set("member annotation")?;
        self.add_annotation(member.modifier_list, annotation)
    }

    fn visit_parameter_annotation(
        &mut self,
        member: &MemberStub,
        parameter: usize,
        annotation: &Annotation,
        _visible: bool,
    ) -> Result<()> {
        self.header_set("parameter annotation")?;
        match member.parameters.get(parameter) {
            Some(&modifier_list) => self.add_annotation(modifier_list, annotation),
            None => {
                debug!(
                    parameter,
                    parameters = member.parameters.len(),
                    "parameter annotation out of range"
                );
                Ok(())
            }
        }
    }

    fn visit_annotation_default(&mut self, member: &MemberStub, value: &ElementValue) -> Result<()> {
        self.header_set("annotation default")?;
        let text = encode_default(value)?;
        match self.tree.stub_mut(member.node) {
            Some(Stub::Method(method)) => {
                method.default_value_text = Some(text);
                Ok(())
            }
            _ => Err(ClassFormatError::Protocol {
                event: "annotation default",
                state: "field",
            }),
        }
    }

    fn visit_inner_class(&mut self, record: InnerClassRecord<'_>) -> Result<()> {
        let (class, _) = self.header_set("inner class")?;
        if !self.options.resolve_inner_classes {
            return Ok(());
        }
        self.resolve_inner_class(class, record)
    }

    fn visit_end(&mut self) -> Result<()> {
        let (class, _) = self.header_set("end")?;
        self.state = BuilderState::Finalized { class };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        reader::{ClassVersion, Const, ElementValuePair},
        source::{MemoryClassFile, MemoryDirectory},
    };

    fn header<'a>(name: &'a str, access: ClassAccessFlag) -> ClassHeader<'a> {
        ClassHeader {
            version: ClassVersion {
                major: 52,
                minor: 0,
            },
            access,
            name,
            signature: None,
            super_name: Some("java/lang/Object"),
            interfaces: Vec::new(),
        }
    }

    fn method<'a>(access: MethodAccessFlag, name: &'a str, descriptor: &'a str) -> MethodEvent<'a> {
        MethodEvent {
            access,
            name,
            descriptor,
            signature: None,
            exceptions: None,
        }
    }

    fn marker(descriptor: &str) -> Annotation {
        Annotation {
            type_descriptor: descriptor.to_string(),
            element_value_pairs: Vec::new(),
        }
    }

    fn with_builder<T>(
        test: impl FnOnce(&mut StubBuilder<'_, MemoryClassFile<'_>>) -> T,
    ) -> (T, StubTree) {
        let mut directory = MemoryDirectory::new();
        directory.insert("Foo", Vec::new());
        let source = directory.class_file("Foo").unwrap();
        let options = StubOptions::default();
        let mut tree = StubTree::new();
        let root = tree.root();
        let result = test(&mut StubBuilder::new(&mut tree, root, &source, &options, 0));
        (result, tree)
    }

    #[test]
    fn events_before_header_are_rejected() {
        let (result, _) = with_builder(|builder| {
            builder.visit_method(method(MethodAccessFlag::PUBLIC, "run", "()V"))
        });
        assert!(matches!(
            result,
            Err(ClassFormatError::Protocol {
                event: "method",
                state: "empty"
            })
        ));

        let (result, _) = with_builder(|builder| builder.visit_end());
        assert!(matches!(result, Err(ClassFormatError::Protocol { .. })));
    }

    #[test]
    fn events_after_end_are_rejected() {
        let (result, _) = with_builder(|builder| {
            builder.visit_header(header("p/Foo", ClassAccessFlag::PUBLIC))?;
            builder.visit_end()?;
            builder.visit_annotation(&marker("Lp/A;"), true)
        });
        assert!(matches!(
            result,
            Err(ClassFormatError::Protocol {
                event: "annotation",
                state: "finalized"
            })
        ));

        let (result, _) = with_builder(|builder| {
            builder.visit_header(header("p/Foo", ClassAccessFlag::PUBLIC))?;
            builder.visit_header(header("p/Foo", ClassAccessFlag::PUBLIC))
        });
        assert!(matches!(
            result,
            Err(ClassFormatError::Protocol { event: "header", .. })
        ));
    }

    #[test]
    fn header_falls_back_to_descriptor_names() {
        let (result, tree) = with_builder(|builder| {
            builder.visit_header(ClassHeader {
                signature: Some("<T:>Ljava/lang/Object;"),
                super_name: Some("p/Base$Nested"),
                interfaces: vec!["java/io/Serializable"],
                ..header("p/Foo$Bar", ClassAccessFlag::PUBLIC | ClassAccessFlag::SUPER)
            })?;
            builder.visit_end()
        });
        result.unwrap();

        let class = tree.top_class().unwrap();
        let stub = tree.class(class).unwrap();
        assert_eq!(stub.qualified_name, "p.Foo.Bar");
        assert_eq!(stub.name, "Bar");
        assert!(stub.type_parameters.is_empty());
        assert_eq!(
            tree.reference_list(class, ReferenceRole::Extends).unwrap(),
            ["p.Base$Nested"]
        );
        assert_eq!(
            tree.reference_list(class, ReferenceRole::Implements).unwrap(),
            ["java.io.Serializable"]
        );
        assert_eq!(
            tree.modifier_list(class).unwrap().flags,
            ModifierFlags::PUBLIC
        );
    }

    #[test]
    fn interface_puts_interfaces_in_extends() {
        let (result, tree) = with_builder(|builder| {
            builder.visit_header(ClassHeader {
                interfaces: vec!["java/lang/Runnable"],
                ..header(
                    "p/Foo",
                    ClassAccessFlag::PUBLIC | ClassAccessFlag::INTERFACE | ClassAccessFlag::ABSTRACT,
                )
            })?;
            builder.visit_end()
        });
        result.unwrap();

        let class = tree.top_class().unwrap();
        assert!(tree.class(class).unwrap().is_interface());
        assert_eq!(
            tree.reference_list(class, ReferenceRole::Extends).unwrap(),
            ["java.lang.Runnable"]
        );
        assert!(tree
            .reference_list(class, ReferenceRole::Implements)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn methods() {
        let (result, tree) = with_builder(|builder| {
            builder.visit_header(header("p/Foo", ClassAccessFlag::PUBLIC))?;
            assert!(builder
                .visit_method(method(MethodAccessFlag::STATIC, "<clinit>", "()V"))?
                .is_none());
            assert!(builder
                .visit_method(method(
                    MethodAccessFlag::PUBLIC | MethodAccessFlag::BRIDGE | MethodAccessFlag::SYNTHETIC,
                    "compareTo",
                    "(Ljava/lang/Object;)I",
                ))?
                .is_none());
            assert!(builder
                .visit_method(method(
                    MethodAccessFlag::PUBLIC | MethodAccessFlag::BRIDGE,
                    "get",
                    "()Ljava/lang/Object;",
                ))?
                .is_none());
            assert!(builder
                .visit_method(method(
                    MethodAccessFlag::PRIVATE | MethodAccessFlag::SYNTHETIC,
                    "access$000",
                    "()V",
                ))?
                .is_none());
            builder.visit_method(method(MethodAccessFlag::PUBLIC, "<init>", "(I)V"))?;
            builder.visit_method(MethodEvent {
                exceptions: Some(vec!["java/io/IOException"]),
                ..method(
                    MethodAccessFlag::PUBLIC | MethodAccessFlag::VARARGS,
                    "format",
                    "(Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String;",
                )
            })?;
            builder.visit_end()
        });
        result.unwrap();

        let class = tree.top_class().unwrap();
        assert_eq!(tree.methods(class).count(), 2);

        let constructor = tree.method_by_name(class, "Foo").unwrap();
        assert!(tree.method(constructor).unwrap().is_constructor());
        assert_eq!(tree.method(constructor).unwrap().return_type.text, "void");

        let format = tree.method_by_name(class, "format").unwrap();
        assert!(tree.method(format).unwrap().is_varargs());
        let parameters: Vec<_> = tree
            .parameters(format)
            .map(|id| tree.parameter(id).unwrap().clone())
            .collect();
        assert_eq!(parameters[0].name, "p1");
        assert_eq!(parameters[0].type_info, TypeInfo::new("java.lang.String", 0));
        assert_eq!(parameters[1].name, "p2");
        assert!(parameters[1].is_varargs);
        assert!(parameters[1].type_info.is_ellipsis);
        assert_eq!(parameters[1].type_info.array_count, 0);
        assert_eq!(
            tree.reference_list(format, ReferenceRole::Throws).unwrap(),
            ["java.io.IOException"]
        );
        assert!(tree
            .reference_list(constructor, ReferenceRole::Throws)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn member_annotations() {
        let (result, tree) = with_builder(|builder| {
            builder.visit_header(header(
                "p/Foo",
                ClassAccessFlag::PUBLIC | ClassAccessFlag::INTERFACE | ClassAccessFlag::ANNOTATION,
            ))?;
            builder.visit_annotation(&marker("Ljava/lang/annotation/Documented;"), true)?;
            let field = builder
                .visit_field(FieldEvent {
                    access: FieldAccessFlag::PUBLIC | FieldAccessFlag::STATIC | FieldAccessFlag::FINAL,
                    name: "LIMIT",
                    descriptor: "J",
                    signature: None,
                    constant: Some(&Const::Long(10)),
                })?
                .unwrap();
            builder.visit_member_annotation(&field, &marker("Lp/Internal;"), false)?;

            let value = builder
                .visit_method(method(
                    MethodAccessFlag::PUBLIC | MethodAccessFlag::ABSTRACT,
                    "value",
                    "(I)[I",
                ))?
                .unwrap();
            builder.visit_parameter_annotation(
                &value,
                0,
                &Annotation {
                    type_descriptor: "Lp/Named;".into(),
                    element_value_pairs: vec![ElementValuePair {
                        element_name: "value".into(),
                        value: ElementValue::Const(Const::String("n".into())),
                    }],
                },
                true,
            )?;
            builder.visit_parameter_annotation(&value, 3, &marker("Lp/Lost;"), true)?;
            builder.visit_annotation_default(
                &value,
                &ElementValue::Array(vec![
                    ElementValue::Const(Const::Int(1)),
                    ElementValue::Const(Const::Int(2)),
                ]),
            )?;
            builder.visit_source(Some("Foo.java"))?;
            builder.visit_end()
        });
        result.unwrap();

        let class = tree.top_class().unwrap();
        assert_eq!(
            tree.class(class).unwrap().source_file_name.as_deref(),
            Some("Foo.java")
        );
        assert_eq!(tree.annotations(class), ["@java.lang.annotation.Documented"]);

        let field = tree.field_by_name(class, "LIMIT").unwrap();
        assert_eq!(tree.field(field).unwrap().initializer_text.as_deref(), Some("10L"));
        assert_eq!(tree.annotations(field), ["@p.Internal"]);

        let value = tree.method_by_name(class, "value").unwrap();
        let stub = tree.method(value).unwrap();
        assert!(stub.flags.contains(MethodStubFlags::ANNOTATION_METHOD));
        assert_eq!(stub.default_value_text.as_deref(), Some("{1,2}"));
        assert_eq!(stub.return_type, TypeInfo::new("int", 1));

        let parameter = tree.parameters(value).next().unwrap();
        assert_eq!(tree.annotations(parameter), ["@p.Named(\"n\")"]);
        assert!(tree.modifier_list(parameter).unwrap().flags.is_empty());
    }

    #[test]
    fn unrelated_inner_class_records_are_ignored() {
        let (result, tree) = with_builder(|builder| {
            builder.visit_header(header("p/Foo", ClassAccessFlag::PUBLIC))?;
            builder.visit_inner_class(InnerClassRecord {
                name: Some("java/util/Map$Entry"),
                outer_name: Some("java/util/Map"),
                inner_name: Some("Entry"),
                access: 0x0609,
            })?;
            builder.visit_inner_class(InnerClassRecord {
                name: Some("p/Foo$1"),
                outer_name: None,
                inner_name: None,
                access: 0,
            })?;
            builder.visit_end()
        });
        result.unwrap();
        assert_eq!(tree.inner_classes(tree.top_class().unwrap()).count(), 0);
    }

    #[test]
    fn package_names() {
        let class = |qualified_name: &str, name: &str| ClassStub {
            qualified_name: qualified_name.to_string(),
            name: name.to_string(),
            source_file_name: None,
            language_level: LanguageLevel::Highest,
            flags: ClassStubFlags::empty(),
            type_parameters: Vec::new(),
        };
        assert_eq!(package_name(&class("java.util.Map", "Map")), "java.util");
        assert_eq!(package_name(&class("Main", "Main")), "");
    }
}
