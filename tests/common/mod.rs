#![allow(dead_code)]

//! A minimal class file writer for building test inputs.

use std::collections::HashMap;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;

pub struct ClassWriter {
    major_version: u16,
    access_flags: u16,
    constant_pool: Vec<u8>,
    constant_pool_count: u16,
    utf8_indexes: HashMap<String, u16>,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

impl ClassWriter {
    /// A public class extending `java/lang/Object`, class file version 52.
    pub fn new(name: &str) -> Self {
        let mut writer = Self {
            major_version: 52,
            access_flags: ACC_PUBLIC | ACC_SUPER,
            constant_pool: Vec::new(),
            constant_pool_count: 1,
            utf8_indexes: HashMap::new(),
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        writer.this_class = writer.class(name);
        writer.super_class = writer.class("java/lang/Object");
        writer
    }

    pub fn access(&mut self, access_flags: u16) -> &mut Self {
        self.access_flags = access_flags;
        self
    }

    pub fn version(&mut self, major_version: u16) -> &mut Self {
        self.major_version = major_version;
        self
    }

    pub fn super_class(&mut self, name: Option<&str>) -> &mut Self {
        self.super_class = name.map_or(0, |name| self.class(name));
        self
    }

    pub fn interface(&mut self, name: &str) -> &mut Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    fn push_constant(&mut self, bytes: &[u8], slots: u16) -> u16 {
        let index = self.constant_pool_count;
        self.constant_pool.extend_from_slice(bytes);
        self.constant_pool_count += slots;
        index
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        if let Some(&index) = self.utf8_indexes.get(text) {
            return index;
        }
        let mut bytes = vec![1];
        bytes.extend_from_slice(&(text.len() as u16).to_be_bytes());
        bytes.extend_from_slice(text.as_bytes());
        let index = self.push_constant(&bytes, 1);
        self.utf8_indexes.insert(text.to_string(), index);
        index
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        let mut bytes = vec![7];
        bytes.extend_from_slice(&name_index.to_be_bytes());
        self.push_constant(&bytes, 1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let mut bytes = vec![3];
        bytes.extend_from_slice(&value.to_be_bytes());
        self.push_constant(&bytes, 1)
    }

    pub fn float(&mut self, value: f32) -> u16 {
        let mut bytes = vec![4];
        bytes.extend_from_slice(&value.to_be_bytes());
        self.push_constant(&bytes, 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let mut bytes = vec![5];
        bytes.extend_from_slice(&value.to_be_bytes());
        self.push_constant(&bytes, 2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        let mut bytes = vec![6];
        bytes.extend_from_slice(&value.to_be_bytes());
        self.push_constant(&bytes, 2)
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let string_index = self.utf8(value);
        let mut bytes = vec![8];
        bytes.extend_from_slice(&string_index.to_be_bytes());
        self.push_constant(&bytes, 1)
    }

    /// An encoded attribute, for a member or for [`Self::class_attribute`].
    pub fn attribute(&mut self, name: &str, body: &[u8]) -> Vec<u8> {
        let mut bytes = self.utf8(name).to_be_bytes().to_vec();
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(body);
        bytes
    }

    pub fn signature(&mut self, signature: &str) -> Vec<u8> {
        let index = self.utf8(signature);
        self.attribute("Signature", &index.to_be_bytes())
    }

    pub fn constant_value(&mut self, index: u16) -> Vec<u8> {
        self.attribute("ConstantValue", &index.to_be_bytes())
    }

    pub fn exceptions(&mut self, names: &[&str]) -> Vec<u8> {
        let mut body = (names.len() as u16).to_be_bytes().to_vec();
        for name in names {
            body.extend_from_slice(&self.class(name).to_be_bytes());
        }
        self.attribute("Exceptions", &body)
    }

    pub fn marker(&mut self, name: &str) -> Vec<u8> {
        self.attribute(name, &[])
    }

    /// `annotation` structure; `pairs` hold encoded element values.
    pub fn annotation(&mut self, descriptor: &str, pairs: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut bytes = self.utf8(descriptor).to_be_bytes().to_vec();
        bytes.extend_from_slice(&(pairs.len() as u16).to_be_bytes());
        for (name, value) in pairs {
            bytes.extend_from_slice(&self.utf8(name).to_be_bytes());
            bytes.extend_from_slice(value);
        }
        bytes
    }

    pub fn annotations(&mut self, name: &str, annotations: &[Vec<u8>]) -> Vec<u8> {
        let mut body = (annotations.len() as u16).to_be_bytes().to_vec();
        for annotation in annotations {
            body.extend_from_slice(annotation);
        }
        self.attribute(name, &body)
    }

    pub fn parameter_annotations(&mut self, name: &str, parameters: &[Vec<Vec<u8>>]) -> Vec<u8> {
        let mut body = vec![parameters.len() as u8];
        for annotations in parameters {
            body.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
            for annotation in annotations {
                body.extend_from_slice(annotation);
            }
        }
        self.attribute(name, &body)
    }

    pub fn annotation_default(&mut self, value: &[u8]) -> Vec<u8> {
        self.attribute("AnnotationDefault", value)
    }

    /// Element value with a constant pool index, for tags `B C D F I J S Z s`.
    pub fn const_value(&mut self, tag: u8, index: u16) -> Vec<u8> {
        let mut bytes = vec![tag];
        bytes.extend_from_slice(&index.to_be_bytes());
        bytes
    }

    pub fn int_value(&mut self, value: i32) -> Vec<u8> {
        let index = self.integer(value);
        self.const_value(b'I', index)
    }

    pub fn string_value(&mut self, value: &str) -> Vec<u8> {
        let index = self.utf8(value);
        self.const_value(b's', index)
    }

    pub fn enum_value(&mut self, type_descriptor: &str, constant: &str) -> Vec<u8> {
        let mut bytes = vec![b'e'];
        bytes.extend_from_slice(&self.utf8(type_descriptor).to_be_bytes());
        bytes.extend_from_slice(&self.utf8(constant).to_be_bytes());
        bytes
    }

    pub fn class_value(&mut self, descriptor: &str) -> Vec<u8> {
        let index = self.utf8(descriptor);
        self.const_value(b'c', index)
    }

    pub fn annotation_value(&mut self, annotation: Vec<u8>) -> Vec<u8> {
        let mut bytes = vec![b'@'];
        bytes.extend(annotation);
        bytes
    }

    pub fn array_value(&mut self, values: &[Vec<u8>]) -> Vec<u8> {
        let mut bytes = vec![b'['];
        bytes.extend_from_slice(&(values.len() as u16).to_be_bytes());
        for value in values {
            bytes.extend_from_slice(value);
        }
        bytes
    }

    /// `(inner_class, outer_class, inner_name, access)` rows.
    pub fn inner_classes(&mut self, entries: &[(&str, Option<&str>, Option<&str>, u16)]) -> &mut Self {
        let mut body = (entries.len() as u16).to_be_bytes().to_vec();
        for (inner, outer, inner_name, access) in entries {
            let inner = self.class(inner);
            let outer = outer.map_or(0, |outer| self.class(outer));
            let inner_name = inner_name.map_or(0, |inner_name| self.utf8(inner_name));
            for value in [inner, outer, inner_name, *access] {
                body.extend_from_slice(&value.to_be_bytes());
            }
        }
        let attribute = self.attribute("InnerClasses", &body);
        self.class_attribute(attribute)
    }

    pub fn source_file(&mut self, name: &str) -> &mut Self {
        let index = self.utf8(name);
        let attribute = self.attribute("SourceFile", &index.to_be_bytes());
        self.class_attribute(attribute)
    }

    pub fn class_attribute(&mut self, attribute: Vec<u8>) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    pub fn field(&mut self, access: u16, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) -> &mut Self {
        let member = self.member(access, name, descriptor, attributes);
        self.fields.push(member);
        self
    }

    pub fn method(&mut self, access: u16, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) -> &mut Self {
        let member = self.member(access, name, descriptor, attributes);
        self.methods.push(member);
        self
    }

    fn member(&mut self, access: u16, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) -> Vec<u8> {
        let mut bytes = access.to_be_bytes().to_vec();
        bytes.extend_from_slice(&self.utf8(name).to_be_bytes());
        bytes.extend_from_slice(&self.utf8(descriptor).to_be_bytes());
        write_list(&mut bytes, &attributes);
        bytes
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0xca, 0xfe, 0xba, 0xbe];
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&self.major_version.to_be_bytes());
        bytes.extend_from_slice(&self.constant_pool_count.to_be_bytes());
        bytes.extend_from_slice(&self.constant_pool);
        bytes.extend_from_slice(&self.access_flags.to_be_bytes());
        bytes.extend_from_slice(&self.this_class.to_be_bytes());
        bytes.extend_from_slice(&self.super_class.to_be_bytes());
        bytes.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            bytes.extend_from_slice(&interface.to_be_bytes());
        }
        write_list(&mut bytes, &self.fields);
        write_list(&mut bytes, &self.methods);
        write_list(&mut bytes, &self.attributes);
        bytes
    }
}

fn write_list(bytes: &mut Vec<u8>, items: &[Vec<u8>]) {
    bytes.extend_from_slice(&(items.len() as u16).to_be_bytes());
    for item in items {
        bytes.extend_from_slice(item);
    }
}
