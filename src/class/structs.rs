use std::borrow::Cow;

use super::JavaString;
use crate::error::{ClassFormatError, Result};

#[derive(Debug)]
pub struct ClassFile {
    pub(crate) minor_version: u16,
    pub(crate) major_version: u16,
    pub(crate) constant_pool: ConstantPool,
    pub(crate) access_flags: u16,
    pub(crate) this_class: u16,
    pub(crate) super_class: u16,
    pub(crate) interfaces: Vec<u16>,
    pub(crate) fields: Vec<MemberInfo>,
    pub(crate) methods: Vec<MemberInfo>,
    pub(crate) attributes: Vec<AttributeInfo>,
}

/// Fields and methods share one layout in the container.
#[derive(Debug)]
pub struct MemberInfo {
    pub(crate) access_flags: u16,
    pub(crate) name_index: u16,
    pub(crate) descriptor_index: u16,
    pub(crate) attributes: Vec<AttributeInfo>,
}

#[derive(Debug)]
pub struct AttributeInfo {
    pub(crate) attribute_name_index: u16,
    pub(crate) info: Vec<u8>,
}

#[derive(Debug)]
pub enum ConstantPoolInfo {
    Utf8(JavaString),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    Fieldref,
    Methodref,
    InterfaceMethodref,
    NameAndType,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module { name_index: u16 },
    Package { name_index: u16 },
    /// Second slot of a `Long` or `Double`.
    Empty,
}

/// Constant pool with the file's 1-based indexing.
#[derive(Debug, Default)]
pub struct ConstantPool {
    entries: Vec<ConstantPoolInfo>,
}

impl ConstantPool {
    pub(crate) fn new(entries: Vec<ConstantPoolInfo>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<&ConstantPoolInfo> {
        if index == 0 {
            return None;
        }
        self.entries.get(index as usize - 1)
    }

    pub fn utf8(&self, index: u16) -> Result<Cow<'_, str>> {
        let Some(ConstantPoolInfo::Utf8(string)) = self.get(index) else {
            return Err(ClassFormatError::BadConstant {
                index,
                expected: "Utf8",
            });
        };
        string.to_str()
    }

    /// Internal name of a `CONSTANT_Class` entry.
    pub fn class_name(&self, index: u16) -> Result<Cow<'_, str>> {
        let Some(ConstantPoolInfo::Class { name_index }) = self.get(index) else {
            return Err(ClassFormatError::BadConstant {
                index,
                expected: "Class",
            });
        };
        self.utf8(*name_index)
    }

    /// Like [`ConstantPool::class_name`], but index 0 means "absent".
    pub fn optional_class_name(&self, index: u16) -> Result<Option<Cow<'_, str>>> {
        if index == 0 {
            return Ok(None);
        }
        self.class_name(index).map(Some)
    }

    pub fn optional_utf8(&self, index: u16) -> Result<Option<Cow<'_, str>>> {
        if index == 0 {
            return Ok(None);
        }
        self.utf8(index).map(Some)
    }
}
