//! Source text of annotations and constant values.
//!
//! [`AnnotationTextEncoder`] consumes one annotation as a sequence of value events
//! and renders the canonical form: `@pkg.Anno(value,name=value)`. Values named
//! `value` drop the `name=` part; array values render as `{a,b}`.

use std::fmt::{self, Write as _};

use crate::{
    descriptor::{field_descriptor, return_descriptor_class_name},
    error::Result,
    reader::{Annotation, Const, ElementValue},
};

#[derive(Debug, Clone, Default)]
pub struct AnnotationTextEncoder {
    text: String,
    typed: bool,
    has_params: bool,
}

impl AnnotationTextEncoder {
    /// Encoder for an annotation of the given type descriptor, e.g. `Lpkg/Anno;`.
    pub fn typed(type_descriptor: &str) -> Result<Self> {
        let type_name = field_descriptor(type_descriptor)?.class_name();
        Ok(Self {
            text: format!("@{type_name}"),
            typed: true,
            has_params: false,
        })
    }

    /// Encoder for the elements of an array or an annotation default.
    pub fn untyped() -> Self {
        Self::default()
    }

    pub fn visit(&mut self, name: Option<&str>, value: &Const) {
        self.value_pair_prefix(name);
        write_const(&mut self.text, value);
    }

    pub fn visit_enum(&mut self, name: Option<&str>, _type_descriptor: &str, constant: &str) {
        self.value_pair_prefix(name);
        self.text.push_str(constant);
    }

    /// A class literal; `descriptor` is a return descriptor such as `V` or `[I`.
    pub fn visit_class(&mut self, name: Option<&str>, descriptor: &str) -> Result<()> {
        let class_name = return_descriptor_class_name(descriptor)?;
        self.value_pair_prefix(name);
        self.text.push_str(&class_name);
        self.text.push_str(".class");
        Ok(())
    }

    /// Starts a nested annotation value. Hand the finished child to
    /// [`Self::end_annotation`].
    pub fn visit_annotation(&mut self, name: Option<&str>, type_descriptor: &str) -> Result<Self> {
        let child = Self::typed(type_descriptor)?;
        self.value_pair_prefix(name);
        Ok(child)
    }

    pub fn end_annotation(&mut self, child: Self) {
        self.text.push_str(&child.finish());
    }

    /// Starts an array value. Hand the finished child to [`Self::end_array`].
    pub fn visit_array(&mut self, name: Option<&str>) -> Self {
        self.value_pair_prefix(name);
        self.text.push('{');
        Self::untyped()
    }

    pub fn end_array(&mut self, child: Self) {
        self.text.push_str(&child.finish());
        self.text.push('}');
    }

    pub fn finish(mut self) -> String {
        if self.has_params && self.typed {
            self.text.push(')');
        }
        self.text
    }

    fn value_pair_prefix(&mut self, name: Option<&str>) {
        if !self.has_params {
            self.has_params = true;
            if self.typed {
                self.text.push('(');
            }
        } else {
            self.text.push(',');
        }

        if let Some(name) = name.filter(|&name| name != "value") {
            self.text.push_str(name);
            self.text.push('=');
        }
    }
}

/// Text of a whole annotation, e.g. `@java.lang.annotation.Retention(RUNTIME)`.
pub fn encode_annotation(annotation: &Annotation) -> Result<String> {
    let mut encoder = AnnotationTextEncoder::typed(&annotation.type_descriptor)?;
    for pair in &annotation.element_value_pairs {
        accept_value(&mut encoder, Some(&pair.element_name), &pair.value)?;
    }
    Ok(encoder.finish())
}

/// Text of an `AnnotationDefault` value, e.g. `{1,2}` or `"x"`.
pub fn encode_default(value: &ElementValue) -> Result<String> {
    let mut encoder = AnnotationTextEncoder::untyped();
    accept_value(&mut encoder, None, value)?;
    Ok(encoder.finish())
}

fn accept_value(
    encoder: &mut AnnotationTextEncoder,
    name: Option<&str>,
    value: &ElementValue,
) -> Result<()> {
    match value {
        ElementValue::Const(value) => encoder.visit(name, value),
        ElementValue::Enum {
            type_name,
            const_name,
        } => encoder.visit_enum(name, type_name, const_name),
        ElementValue::Class(descriptor) => encoder.visit_class(name, descriptor)?,
        ElementValue::Annotation(annotation) => {
            let mut child = encoder.visit_annotation(name, &annotation.type_descriptor)?;
            for pair in &annotation.element_value_pairs {
                accept_value(&mut child, Some(&pair.element_name), &pair.value)?;
            }
            encoder.end_annotation(child);
        }
        ElementValue::Array(values) => {
            let mut child = encoder.visit_array(name);
            for value in values {
                accept_value(&mut child, None, value)?;
            }
            encoder.end_array(child);
        }
    }
    Ok(())
}

/// Initializer text of a field `ConstantValue`.
///
/// `None` for kinds a constant pool entry cannot hold; those only occur inside
/// annotations.
pub fn const_to_string(value: &Const) -> Option<String> {
    match value {
        Const::String(_) | Const::Int(_) | Const::Long(_) | Const::Double(_) | Const::Float(_) => {
            let mut text = String::new();
            write_const(&mut text, value);
            Some(text)
        }
        Const::Byte(_) | Const::Char(_) | Const::Short(_) | Const::Boolean(_) => None,
    }
}

fn write_const(out: &mut String, value: &Const) {
    match value {
        Const::String(s) => {
            out.push('"');
            for c in s.chars() {
                escape_char(out, c, '"');
            }
            out.push('"');
        }
        Const::Int(i) => {
            let _ = write!(out, "{i}");
        }
        Const::Long(l) => {
            let _ = write!(out, "{l}L");
        }
        Const::Byte(b) => {
            let _ = write!(out, "{b}");
        }
        Const::Short(s) => {
            let _ = write!(out, "{s}");
        }
        Const::Boolean(b) => {
            let _ = write!(out, "{b}");
        }
        Const::Char(c) => {
            out.push('\'');
            match char::from_u32(u32::from(*c)) {
                Some(c) => escape_char(out, c, '\''),
                // lone surrogate
                None => {
                    let _ = write!(out, "\\u{c:04X}");
                }
            }
            out.push('\'');
        }
        Const::Double(d) => {
            if d.is_nan() {
                out.push_str("Double.NaN");
            } else if d.is_infinite() {
                out.push_str(if *d > 0.0 {
                    "Double.POSITIVE_INFINITY"
                } else {
                    "Double.NEGATIVE_INFINITY"
                });
            } else {
                out.push_str(&java_floating(*d, d.abs()));
            }
        }
        Const::Float(f) => {
            if f.is_nan() {
                out.push_str("Float.NaN");
            } else if f.is_infinite() {
                out.push_str(if *f > 0.0 {
                    "Float.POSITIVE_INFINITY"
                } else {
                    "Float.NEGATIVE_INFINITY"
                });
            } else {
                out.push_str(&java_floating(*f, f64::from(f.abs())));
                out.push('f');
            }
        }
    }
}

fn escape_char(out: &mut String, c: char, quote: char) {
    match c {
        '\u{8}' => out.push_str("\\b"),
        '\t' => out.push_str("\\t"),
        '\n' => out.push_str("\\n"),
        '\u{c}' => out.push_str("\\f"),
        '\r' => out.push_str("\\r"),
        '\\' => out.push_str("\\\\"),
        c if c == quote => {
            out.push('\\');
            out.push(c);
        }
        c if c.is_control() => {
            let _ = write!(out, "\\u{:04X}", u32::from(c));
        }
        c => out.push(c),
    }
}

/// `Double.toString` layout over the shortest round-trip digits: plain decimal
/// within `[1e-3, 1e7)`, computerized scientific notation outside it.
fn java_floating<T: fmt::Display + fmt::LowerExp>(value: T, magnitude: f64) -> String {
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let mut text = value.to_string();
        if !text.contains('.') {
            text.push_str(".0");
        }
        text
    } else {
        let text = format!("{value:e}");
        let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
        if mantissa.contains('.') {
            format!("{mantissa}E{exponent}")
        } else {
            format!("{mantissa}.0E{exponent}")
        }
    }
}
