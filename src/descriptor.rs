//! Plain (non-generic) field and method descriptors.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_until, take_while},
    character::complete::{char, one_of},
    combinator::{eof, map},
    error::ErrorKind,
    error_position,
    multi::many0,
    sequence::delimited,
};

use crate::error::{ClassFormatError, Result};

/// Largest array depth a class file may declare (JVMS §4.3.2).
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor(pub(crate) FieldType);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub(crate) parameters: Vec<FieldType>,
    pub(crate) return_type: ReturnType,
}

/// `None` is `void`.
pub type ReturnType = Option<FieldType>;

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Object(String),
    Short,
    Boolean,
    Array(Box<FieldType>),
}

impl FieldType {
    /// Source-level class name text, e.g. `java.lang.String[][]`.
    ///
    /// Nested class names keep their `$`: a descriptor carries no information about
    /// where the outer class name ends.
    pub fn class_name(&self) -> String {
        match self {
            FieldType::Byte => "byte".to_string(),
            FieldType::Char => "char".to_string(),
            FieldType::Double => "double".to_string(),
            FieldType::Float => "float".to_string(),
            FieldType::Int => "int".to_string(),
            FieldType::Long => "long".to_string(),
            FieldType::Short => "short".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Object(internal_name) => internal_name.replace('/', "."),
            FieldType::Array(component) => component.class_name() + "[]",
        }
    }

    /// Array nesting depth and the innermost element type.
    pub fn dimensions(&self) -> (usize, &FieldType) {
        let mut dimensions = 0;
        let mut current = self;
        while let FieldType::Array(component) = current {
            dimensions += 1;
            current = component;
        }
        (dimensions, current)
    }
}

impl MethodDescriptor {
    pub fn parameters(&self) -> &[FieldType] {
        &self.parameters
    }

    pub fn return_type(&self) -> Option<&FieldType> {
        self.return_type.as_ref()
    }
}

pub fn return_type_name(return_type: Option<&FieldType>) -> String {
    match return_type {
        Some(field_type) => field_type.class_name(),
        None => "void".to_string(),
    }
}

pub fn parse_field_descriptor(input: &str) -> IResult<&str, FieldDescriptor> {
    let (input, field_type) = parse_field_type(input)?;
    let (input, _) = eof(input)?;
    Ok((input, FieldDescriptor(field_type)))
}

pub fn parse_method_descriptor(input: &str) -> IResult<&str, MethodDescriptor> {
    let (input, parameters) =
        delimited(char('('), many0(parse_field_type), char(')')).parse(input)?;

    let (input, return_type) = parse_return_type_descriptor(input)?;

    let (input, _) = eof(input)?;
    Ok((
        input,
        MethodDescriptor {
            parameters,
            return_type,
        },
    ))
}

pub fn parse_return_type_descriptor(input: &str) -> IResult<&str, ReturnType> {
    alt((map(parse_field_type, Some), parse_void_type)).parse(input)
}

/// [`parse_field_descriptor`] with the error mapped for whole-build propagation.
pub fn field_descriptor(descriptor: &str) -> Result<FieldType> {
    parse_field_descriptor(descriptor)
        .map(|(_, FieldDescriptor(field_type))| field_type)
        .map_err(|_| ClassFormatError::BadDescriptor(descriptor.to_string()))
}

pub fn method_descriptor(descriptor: &str) -> Result<MethodDescriptor> {
    parse_method_descriptor(descriptor)
        .map(|(_, method)| method)
        .map_err(|_| ClassFormatError::BadDescriptor(descriptor.to_string()))
}

/// Class name text of a return-type descriptor, as used by `c` element values.
pub fn return_descriptor_class_name(descriptor: &str) -> Result<String> {
    let (rest, return_type) = parse_return_type_descriptor(descriptor)
        .map_err(|_| ClassFormatError::BadDescriptor(descriptor.to_string()))?;
    if !rest.is_empty() {
        return Err(ClassFormatError::BadDescriptor(descriptor.to_string()));
    }
    Ok(return_type_name(return_type.as_ref()))
}

/// Internal name (`java/util/Map$Entry`) to binary class name (`java.util.Map$Entry`).
pub fn internal_to_class_name(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}

fn parse_field_type(input: &str) -> IResult<&str, FieldType> {
    let (input, brackets) = take_while(|c: char| c == '[').parse(input)?;
    if brackets.len() > MAX_ARRAY_DIMENSIONS {
        return Err(nom::Err::Failure(error_position!(input, ErrorKind::TooLarge)));
    }
    let (input, element) = alt((parse_base_type, parse_object_type)).parse(input)?;
    let field_type = (0..brackets.len())
        .fold(element, |component, _| FieldType::Array(Box::new(component)));
    Ok((input, field_type))
}

fn parse_base_type(input: &str) -> IResult<&str, FieldType> {
    let (input, ch) = one_of("BCDFIJSZ").parse(input)?;
    let field_type = match ch {
        'B' => FieldType::Byte,
        'C' => FieldType::Char,
        'D' => FieldType::Double,
        'F' => FieldType::Float,
        'I' => FieldType::Int,
        'J' => FieldType::Long,
        'S' => FieldType::Short,
        _ => FieldType::Boolean,
    };
    Ok((input, field_type))
}

fn parse_object_type(input: &str) -> IResult<&str, FieldType> {
    let (input, _) = char('L').parse(input)?;

    let (input, class_name) = take_until(";").parse(input)?;

    let (input, _) = char(';').parse(input)?;

    Ok((input, FieldType::Object(class_name.to_string())))
}

fn parse_void_type(input: &str) -> IResult<&str, ReturnType> {
    let (input, _) = char('V').parse(input)?;
    Ok((input, None))
}
