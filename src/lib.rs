//! Source-level stubs of compiled Java classes.
//!
//! [`build_stub`] reads one class file and produces a [`StubTree`]: the class
//! header, fields, method signatures, annotations and inner classes, without
//! decoding any bytecode. Generic signatures are preferred; when a signature is
//! malformed the plain descriptor is used instead.

pub mod annotation;
mod builder;
pub mod class;
pub mod consts;
pub mod descriptor;
pub mod error;
pub mod options;
pub mod reader;
pub mod signature;
pub mod source;
pub mod stub;

pub use builder::{MemberStub, build_stub, build_stub_with};
pub use error::{ClassFormatError, Result, SignatureFormatError};
pub use options::StubOptions;
pub use reader::{ClassReader, ClassVisitor};
pub use source::{
    ClassSource, DirectoryClassFile, JarArchive, JarClassFile, MemoryClassFile, MemoryDirectory,
};
pub use stub::{NodeId, Stub, StubTree, TypeInfo};
