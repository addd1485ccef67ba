use serde::{Deserialize, Serialize};

use crate::descriptor::FieldType;

/// A type as written in source: element type text plus array depth.
///
/// For a varargs parameter the last array dimension is the ellipsis, so
/// `is_ellipsis` is set and `array_count` is one less than the raw type's depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeInfo {
    pub text: String,
    pub array_count: u8,
    pub is_ellipsis: bool,
}

impl TypeInfo {
    pub fn new(text: impl Into<String>, array_count: u8) -> Self {
        Self {
            text: text.into(),
            array_count,
            is_ellipsis: false,
        }
    }

    /// Splits canonical text such as `java.util.List<T>[][]` or `String...`.
    pub fn from_text(text: &str) -> Self {
        let (mut text, is_ellipsis) = match text.strip_suffix("...") {
            Some(stripped) => (stripped, true),
            None => (text, false),
        };
        let mut array_count = 0u8;
        while let Some(stripped) = text.strip_suffix("[]") {
            array_count = array_count.saturating_add(1);
            text = stripped;
        }
        Self {
            text: text.to_string(),
            array_count,
            is_ellipsis,
        }
    }

    pub fn from_field_type(field_type: &FieldType) -> Self {
        let (dimensions, element) = field_type.dimensions();
        Self::new(
            element.class_name(),
            u8::try_from(dimensions).unwrap_or(u8::MAX),
        )
    }

    /// Turns the outermost array dimension into the varargs ellipsis.
    pub fn into_ellipsis(self) -> Self {
        Self {
            array_count: self.array_count.saturating_sub(1),
            is_ellipsis: true,
            ..self
        }
    }

    /// Source form, e.g. `int[]...`.
    pub fn to_source_text(&self) -> String {
        let mut text = self.text.clone();
        for _ in 0..self.array_count {
            text.push_str("[]");
        }
        if self.is_ellipsis {
            text.push_str("...");
        }
        text
    }
}
