use std::{borrow::Cow, fmt::Debug};

use cesu8_str::java as cesu8_java;

use crate::error::{ClassFormatError, Result};

/// Bytes of a `CONSTANT_Utf8` entry, still in the JVM's modified UTF-8.
#[derive(Clone, Hash, Eq, PartialEq)]
#[repr(transparent)]
pub struct JavaString {
    inner: Box<[u8]>,
}

impl JavaString {
    pub(crate) fn new(inner: &[u8]) -> Self {
        Self {
            inner: inner.into(),
        }
    }

    /// Decodes to standard UTF-8, borrowing when the bytes are plain ASCII-compatible.
    pub fn to_str(&self) -> Result<Cow<'_, str>> {
        let java_str = cesu8_java::JavaStr::from_java_cesu8(&self.inner)
            .map_err(|_| ClassFormatError::Encoding)?;
        Ok(cesu8_java::from_java_cesu8(java_str))
    }
}

impl Debug for JavaString {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.to_str() {
            Ok(s) => Debug::fmt(&s, f),
            Err(_) => Debug::fmt(&String::from_utf8_lossy(&self.inner), f),
        }
    }
}
