use nom::number::complete::{be_u16, u8};

use crate::{
    class::{AttributeInfo, ConstantPool, ConstantPoolInfo},
    error::{ClassFormatError, Result},
};

/// Nesting limit for annotation and array element values. `javac` output stays far
/// below it.
pub const MAX_ELEMENT_VALUE_DEPTH: usize = 256;

/// A decoded annotation instance. Values stay structured; rendering them to text is
/// [`crate::annotation`]'s job.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub type_descriptor: String,
    pub element_value_pairs: Vec<ElementValuePair>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    pub element_name: String,
    pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const(Const),
    Enum {
        type_name: String,
        const_name: String,
    },
    /// Return descriptor of a class literal, e.g. `Ljava/lang/String;` or `V`.
    Class(String),
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    Byte(i8),
    Char(u16),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Boolean(bool),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InnerClassEntry {
    pub(crate) inner_class: Option<String>,
    pub(crate) outer_class: Option<String>,
    pub(crate) inner_name: Option<String>,
    pub(crate) access_flags: u16,
}

/// The attributes of one class, field or method that the stub needs.
#[derive(Debug, Default)]
pub(crate) struct Attributes {
    pub(crate) source_file: Option<String>,
    pub(crate) signature: Option<String>,
    pub(crate) deprecated: bool,
    pub(crate) synthetic: bool,
    pub(crate) constant_value: Option<Const>,
    pub(crate) exceptions: Option<Vec<String>>,
    pub(crate) visible_annotations: Vec<Annotation>,
    pub(crate) invisible_annotations: Vec<Annotation>,
    pub(crate) visible_parameter_annotations: Vec<Vec<Annotation>>,
    pub(crate) invisible_parameter_annotations: Vec<Vec<Annotation>>,
    pub(crate) annotation_default: Option<ElementValue>,
    pub(crate) inner_classes: Vec<InnerClassEntry>,
}

type Input<'a> = &'a [u8];

fn u1(input: Input<'_>) -> Result<(Input<'_>, u8)> {
    Ok(u8::<_, nom::error::Error<Input<'_>>>(input)?)
}

fn u2(input: Input<'_>) -> Result<(Input<'_>, u16)> {
    Ok(be_u16::<_, nom::error::Error<Input<'_>>>(input)?)
}

pub(crate) fn read_attributes(
    constant_pool: &ConstantPool,
    attributes: &[AttributeInfo],
) -> Result<Attributes> {
    let mut result = Attributes::default();
    for attribute in attributes {
        let name = constant_pool.utf8(attribute.attribute_name_index)?;
        read_attribute(&mut result, &name, &attribute.info, constant_pool)?;
    }
    Ok(result)
}

fn read_attribute(
    result: &mut Attributes,
    name: &str,
    input: &[u8],
    constant_pool: &ConstantPool,
) -> Result<()> {
    match name {
        "SourceFile" => {
            let (_, sourcefile_index) = u2(input)?;
            result.source_file = Some(constant_pool.utf8(sourcefile_index)?.into_owned());
        }
        "Signature" => {
            let (_, signature_index) = u2(input)?;
            result.signature = Some(constant_pool.utf8(signature_index)?.into_owned());
        }
        "Deprecated" => result.deprecated = true,
        "Synthetic" => result.synthetic = true,
        "ConstantValue" => {
            let (_, constantvalue_index) = u2(input)?;
            result.constant_value = Some(resolve_constant_value(
                constant_pool,
                constantvalue_index,
            )?);
        }
        "Exceptions" => {
            let (mut input, number_of_exceptions) = u2(input)?;
            let mut exceptions = Vec::with_capacity(number_of_exceptions as usize);
            for _ in 0..number_of_exceptions {
                let exception_index;
                (input, exception_index) = u2(input)?;
                exceptions.push(constant_pool.class_name(exception_index)?.into_owned());
            }
            result.exceptions = Some(exceptions);
        }
        "RuntimeVisibleAnnotations" => {
            (_, result.visible_annotations) = parse_annotations(input, constant_pool)?;
        }
        "RuntimeInvisibleAnnotations" => {
            (_, result.invisible_annotations) = parse_annotations(input, constant_pool)?;
        }
        "RuntimeVisibleParameterAnnotations" => {
            (_, result.visible_parameter_annotations) =
                parse_parameter_annotations(input, constant_pool)?;
        }
        "RuntimeInvisibleParameterAnnotations" => {
            (_, result.invisible_parameter_annotations) =
                parse_parameter_annotations(input, constant_pool)?;
        }
        "AnnotationDefault" => {
            let (_, value) = parse_element_value(input, constant_pool, 0)?;
            result.annotation_default = Some(value);
        }
        "InnerClasses" => {
            let (mut input, number_of_classes) = u2(input)?;
            for _ in 0..number_of_classes {
                let (inner_class_info_index, outer_class_info_index, inner_name_index);
                let access_flags;
                (input, inner_class_info_index) = u2(input)?;
                (input, outer_class_info_index) = u2(input)?;
                (input, inner_name_index) = u2(input)?;
                (input, access_flags) = u2(input)?;
                result.inner_classes.push(InnerClassEntry {
                    inner_class: constant_pool
                        .optional_class_name(inner_class_info_index)?
                        .map(Into::into),
                    outer_class: constant_pool
                        .optional_class_name(outer_class_info_index)?
                        .map(Into::into),
                    inner_name: constant_pool
                        .optional_utf8(inner_name_index)?
                        .map(Into::into),
                    access_flags,
                });
            }
        }
        // method bodies are never decoded
        "Code" => {}
        _ => {
            tracing::trace!(attribute = name, "skipping attribute");
        }
    }
    Ok(())
}

fn resolve_constant_value(constant_pool: &ConstantPool, index: u16) -> Result<Const> {
    match constant_pool.get(index) {
        Some(ConstantPoolInfo::Integer(i)) => Ok(Const::Int(*i)),
        Some(ConstantPoolInfo::Float(f)) => Ok(Const::Float(*f)),
        Some(ConstantPoolInfo::Long(l)) => Ok(Const::Long(*l)),
        Some(ConstantPoolInfo::Double(d)) => Ok(Const::Double(*d)),
        Some(ConstantPoolInfo::String { string_index }) => Ok(Const::String(
            constant_pool.utf8(*string_index)?.into_owned(),
        )),
        _ => Err(ClassFormatError::BadConstant {
            index,
            expected: "constant value",
        }),
    }
}

fn resolve_int(constant_pool: &ConstantPool, index: u16) -> Result<i32> {
    match constant_pool.get(index) {
        Some(ConstantPoolInfo::Integer(i)) => Ok(*i),
        _ => Err(ClassFormatError::BadConstant {
            index,
            expected: "Integer",
        }),
    }
}

fn parse_annotations<'a>(
    input: &'a [u8],
    constant_pool: &ConstantPool,
) -> Result<(&'a [u8], Vec<Annotation>)> {
    let (mut input, num_annotations) = u2(input)?;
    let mut annotations = Vec::with_capacity(num_annotations as usize);
    for _ in 0..num_annotations {
        let annotation;
        (input, annotation) = parse_annotation(input, constant_pool, 0)?;
        annotations.push(annotation);
    }
    Ok((input, annotations))
}

fn parse_parameter_annotations<'a>(
    input: &'a [u8],
    constant_pool: &ConstantPool,
) -> Result<(&'a [u8], Vec<Vec<Annotation>>)> {
    let (mut input, num_parameters) = u1(input)?;
    let mut parameters = Vec::with_capacity(num_parameters as usize);
    for _ in 0..num_parameters {
        let annotations;
        (input, annotations) = parse_annotations(input, constant_pool)?;
        parameters.push(annotations);
    }
    Ok((input, parameters))
}

fn parse_annotation<'a>(
    input: &'a [u8],
    constant_pool: &ConstantPool,
    depth: usize,
) -> Result<(&'a [u8], Annotation)> {
    let (input, type_index) = u2(input)?;
    let type_descriptor = constant_pool.utf8(type_index)?.into_owned();
    let (mut input, num_element_value_pairs) = u2(input)?;
    let mut element_value_pairs = Vec::with_capacity(num_element_value_pairs as usize);
    for _ in 0..num_element_value_pairs {
        let (element_name_index, value);
        (input, element_name_index) = u2(input)?;
        (input, value) = parse_element_value(input, constant_pool, depth)?;
        element_value_pairs.push(ElementValuePair {
            element_name: constant_pool.utf8(element_name_index)?.into_owned(),
            value,
        });
    }
    Ok((
        input,
        Annotation {
            type_descriptor,
            element_value_pairs,
        },
    ))
}

fn parse_element_value<'a>(
    input: &'a [u8],
    constant_pool: &ConstantPool,
    depth: usize,
) -> Result<(&'a [u8], ElementValue)> {
    if depth >= MAX_ELEMENT_VALUE_DEPTH {
        return Err(ClassFormatError::UnsupportedConstruct(format!(
            "element values nested deeper than {MAX_ELEMENT_VALUE_DEPTH} levels"
        )));
    }
    let (mut input, tag) = u1(input)?;
    let value = match tag {
        b'B' | b'C' | b'S' | b'Z' | b'I' => {
            let const_value_index;
            (input, const_value_index) = u2(input)?;
            let int = resolve_int(constant_pool, const_value_index)?;
            ElementValue::Const(match tag {
                b'B' => Const::Byte(int as i8),
                b'C' => Const::Char(int as u16),
                b'S' => Const::Short(int as i16),
                b'Z' => Const::Boolean(int != 0),
                _ => Const::Int(int),
            })
        }
        b'D' | b'F' | b'J' => {
            let const_value_index;
            (input, const_value_index) = u2(input)?;
            let value = resolve_constant_value(constant_pool, const_value_index)?;
            let matches_tag = matches!(
                (tag, &value),
                (b'D', Const::Double(_)) | (b'F', Const::Float(_)) | (b'J', Const::Long(_))
            );
            if !matches_tag {
                return Err(ClassFormatError::BadConstant {
                    index: const_value_index,
                    expected: "numeric constant",
                });
            }
            ElementValue::Const(value)
        }
        b's' => {
            let const_value_index;
            (input, const_value_index) = u2(input)?;
            ElementValue::Const(Const::String(
                constant_pool.utf8(const_value_index)?.into_owned(),
            ))
        }
        b'e' => {
            let (type_name_index, const_name_index);
            (input, type_name_index) = u2(input)?;
            (input, const_name_index) = u2(input)?;
            ElementValue::Enum {
                type_name: constant_pool.utf8(type_name_index)?.into_owned(),
                const_name: constant_pool.utf8(const_name_index)?.into_owned(),
            }
        }
        b'c' => {
            let class_info_index;
            (input, class_info_index) = u2(input)?;
            ElementValue::Class(constant_pool.utf8(class_info_index)?.into_owned())
        }
        b'@' => {
            let annotation;
            (input, annotation) = parse_annotation(input, constant_pool, depth + 1)?;
            ElementValue::Annotation(annotation)
        }
        b'[' => {
            let num_values;
            (input, num_values) = u2(input)?;
            let mut values = Vec::with_capacity(num_values as usize);
            for _ in 0..num_values {
                let value;
                (input, value) = parse_element_value(input, constant_pool, depth + 1)?;
                values.push(value);
            }
            ElementValue::Array(values)
        }
        _ => {
            return Err(ClassFormatError::UnsupportedConstruct(format!(
                "element value tag `{}`",
                tag as char
            )));
        }
    };
    Ok((input, value))
}
