//! Drives a [`ClassVisitor`] over one parsed class file.
//!
//! Events are emitted in a fixed order: header, class annotations, source file,
//! fields (each followed by its annotations), methods (each followed by its
//! annotations, parameter annotations and annotation default), inner class
//! records, end. Method bodies are never decoded.

mod attributes;

use std::borrow::Cow;

pub use attributes::{
    Annotation, Const, ElementValue, ElementValuePair, MAX_ELEMENT_VALUE_DEPTH,
};
use attributes::{Attributes, read_attributes};

use crate::{
    class::{ClassFile, class_file},
    consts::{ClassAccessFlag, FieldAccessFlag, MethodAccessFlag},
    error::Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassVersion {
    pub major: u16,
    pub minor: u16,
}

#[derive(Debug, Clone)]
pub struct ClassHeader<'a> {
    pub version: ClassVersion,
    pub access: ClassAccessFlag,
    /// Internal name, e.g. `java/util/Map$Entry`.
    pub name: &'a str,
    pub signature: Option<&'a str>,
    /// `None` for `java/lang/Object` and `module-info`.
    pub super_name: Option<&'a str>,
    pub interfaces: Vec<&'a str>,
}

#[derive(Debug, Clone)]
pub struct FieldEvent<'a> {
    pub access: FieldAccessFlag,
    pub name: &'a str,
    pub descriptor: &'a str,
    pub signature: Option<&'a str>,
    pub constant: Option<&'a Const>,
}

#[derive(Debug, Clone)]
pub struct MethodEvent<'a> {
    pub access: MethodAccessFlag,
    pub name: &'a str,
    pub descriptor: &'a str,
    pub signature: Option<&'a str>,
    /// Internal names from the `Exceptions` attribute, `None` when it is absent.
    pub exceptions: Option<Vec<&'a str>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerClassRecord<'a> {
    pub name: Option<&'a str>,
    pub outer_name: Option<&'a str>,
    pub inner_name: Option<&'a str>,
    pub access: u16,
}

/// Receiver of the structural events of one class file.
///
/// `Member` is a handle the visitor hands out for a field or method it accepted;
/// the annotations of that member are then reported against the handle. Returning
/// `None` from `visit_field`/`visit_method` suppresses the member's annotation events.
pub trait ClassVisitor {
    type Member;

    fn visit_header(&mut self, header: ClassHeader<'_>) -> Result<()>;

    fn visit_annotation(&mut self, annotation: &Annotation, visible: bool) -> Result<()>;

    fn visit_source(&mut self, _source: Option<&str>) -> Result<()> {
        Ok(())
    }

    fn visit_field(&mut self, field: FieldEvent<'_>) -> Result<Option<Self::Member>>;

    fn visit_method(&mut self, method: MethodEvent<'_>) -> Result<Option<Self::Member>>;

    fn visit_member_annotation(
        &mut self,
        member: &Self::Member,
        annotation: &Annotation,
        visible: bool,
    ) -> Result<()>;

    fn visit_parameter_annotation(
        &mut self,
        _member: &Self::Member,
        _parameter: usize,
        _annotation: &Annotation,
        _visible: bool,
    ) -> Result<()> {
        Ok(())
    }

    fn visit_annotation_default(
        &mut self,
        _member: &Self::Member,
        _value: &ElementValue,
    ) -> Result<()> {
        Ok(())
    }

    fn visit_inner_class(&mut self, _record: InnerClassRecord<'_>) -> Result<()> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()>;
}

#[derive(Debug)]
pub struct ClassReader {
    class: ClassFile,
}

impl ClassReader {
    pub fn new(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            class: class_file(bytes)?,
        })
    }

    pub fn version(&self) -> ClassVersion {
        ClassVersion {
            major: self.class.major_version,
            minor: self.class.minor_version,
        }
    }

    /// Internal name of the class this file declares.
    pub fn class_name(&self) -> Result<Cow<'_, str>> {
        self.class.constant_pool.class_name(self.class.this_class)
    }

    pub fn accept<V: ClassVisitor>(&self, visitor: &mut V) -> Result<()> {
        let constant_pool = &self.class.constant_pool;

        let name = self.class_name()?;
        let super_name = constant_pool.optional_class_name(self.class.super_class)?;
        let interfaces = self
            .class
            .interfaces
            .iter()
            .map(|&index| constant_pool.class_name(index))
            .collect::<Result<Vec<_>>>()?;
        let attributes = read_attributes(constant_pool, &self.class.attributes)?;

        let mut access = ClassAccessFlag::from_bits_retain(self.class.access_flags as u32);
        if attributes.deprecated {
            access |= ClassAccessFlag::DEPRECATED;
        }
        if attributes.synthetic {
            access |= ClassAccessFlag::SYNTHETIC;
        }

        visitor.visit_header(ClassHeader {
            version: self.version(),
            access,
            name: &name,
            signature: attributes.signature.as_deref(),
            super_name: super_name.as_deref(),
            interfaces: interfaces.iter().map(|interface| &**interface).collect(),
        })?;

        for annotation in &attributes.visible_annotations {
            visitor.visit_annotation(annotation, true)?;
        }
        for annotation in &attributes.invisible_annotations {
            visitor.visit_annotation(annotation, false)?;
        }

        if let Some(source) = &attributes.source_file {
            visitor.visit_source(Some(source.as_str()))?;
        }

        for field in &self.class.fields {
            let name = constant_pool.utf8(field.name_index)?;
            let descriptor = constant_pool.utf8(field.descriptor_index)?;
            let field_attributes = read_attributes(constant_pool, &field.attributes)?;

            let mut access = FieldAccessFlag::from_bits_retain(field.access_flags as u32);
            if field_attributes.deprecated {
                access |= FieldAccessFlag::DEPRECATED;
            }
            if field_attributes.synthetic {
                access |= FieldAccessFlag::SYNTHETIC;
            }

            let member = visitor.visit_field(FieldEvent {
                access,
                name: &name,
                descriptor: &descriptor,
                signature: field_attributes.signature.as_deref(),
                constant: field_attributes.constant_value.as_ref(),
            })?;
            if let Some(member) = member {
                accept_member_annotations(visitor, &member, &field_attributes)?;
            }
        }

        for method in &self.class.methods {
            let name = constant_pool.utf8(method.name_index)?;
            let descriptor = constant_pool.utf8(method.descriptor_index)?;
            let method_attributes = read_attributes(constant_pool, &method.attributes)?;

            let mut access = MethodAccessFlag::from_bits_retain(method.access_flags as u32);
            if method_attributes.deprecated {
                access |= MethodAccessFlag::DEPRECATED;
            }
            if method_attributes.synthetic {
                access |= MethodAccessFlag::SYNTHETIC;
            }

            let member = visitor.visit_method(MethodEvent {
                access,
                name: &name,
                descriptor: &descriptor,
                signature: method_attributes.signature.as_deref(),
                exceptions: method_attributes
                    .exceptions
                    .as_ref()
                    .map(|exceptions| exceptions.iter().map(String::as_str).collect()),
            })?;
            let Some(member) = member else {
                continue;
            };

            accept_member_annotations(visitor, &member, &method_attributes)?;
            for (visible, parameters) in [
                (true, &method_attributes.visible_parameter_annotations),
                (false, &method_attributes.invisible_parameter_annotations),
            ] {
                for (parameter, annotations) in parameters.iter().enumerate() {
                    for annotation in annotations {
                        visitor.visit_parameter_annotation(
                            &member, parameter, annotation, visible,
                        )?;
                    }
                }
            }
            if let Some(value) = &method_attributes.annotation_default {
                visitor.visit_annotation_default(&member, value)?;
            }
        }

        for entry in &attributes.inner_classes {
            visitor.visit_inner_class(InnerClassRecord {
                name: entry.inner_class.as_deref(),
                outer_name: entry.outer_class.as_deref(),
                inner_name: entry.inner_name.as_deref(),
                access: entry.access_flags,
            })?;
        }

        visitor.visit_end()
    }
}

fn accept_member_annotations<V: ClassVisitor>(
    visitor: &mut V,
    member: &V::Member,
    attributes: &Attributes,
) -> Result<()> {
    for annotation in &attributes.visible_annotations {
        visitor.visit_member_annotation(member, annotation, true)?;
    }
    for annotation in &attributes.invisible_annotations {
        visitor.visit_member_annotation(member, annotation, false)?;
    }
    Ok(())
}
