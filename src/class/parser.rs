use crate::{
    class::{AttributeInfo, ClassFile, ConstantPool, ConstantPoolInfo, JavaString, MemberInfo},
    error::{ClassFormatError, Result},
};
use nom::{
    IResult, Parser,
    bytes::complete::{tag, take},
    combinator::eof,
    error_position,
    multi::count,
    number::complete::{be_f32, be_f64, be_i32, be_i64, be_u16, be_u32, u8},
};

/// Splits a class file into its container parts. Attribute bodies stay raw.
pub fn class_file(input: &[u8]) -> Result<ClassFile> {
    let (_, class) = parse_class(input).map_err(ClassFormatError::from)?;
    Ok(class)
}

fn parse_class(input: &[u8]) -> IResult<&[u8], ClassFile> {
    let (input, (minor, major)) = parse_header(input)?;
    let (input, constant_pool) = parse_constant_pool(input)?;

    let (input, access_flags) = be_u16(input)?;
    let (input, this_class) = be_u16(input)?;
    let (input, super_class) = be_u16(input)?;
    let (input, interfaces) = parse_interfaces(input)?;
    let (input, fields) = parse_members(input)?;
    let (input, methods) = parse_members(input)?;
    let (input, attributes) = parse_attributes(input)?;

    let (input, _) = eof(input)?;

    Ok((
        input,
        ClassFile {
            major_version: major,
            minor_version: minor,
            access_flags,
            this_class,
            super_class,
            constant_pool: ConstantPool::new(constant_pool),
            interfaces,
            fields,
            methods,
            attributes,
        },
    ))
}

fn parse_header(input: &[u8]) -> IResult<&[u8], (u16, u16)> {
    let (input, _) = tag(&[0xcau8, 0xfe, 0xba, 0xbe] as &[u8]).parse(input)?;
    let (input, minor) = be_u16(input)?;
    let (input, major) = be_u16(input)?;
    Ok((input, (minor, major)))
}

fn parse_constant_pool(input: &[u8]) -> IResult<&[u8], Vec<ConstantPoolInfo>> {
    let (input, constant_pool_count) = be_u16(input)?;
    if constant_pool_count == 0 {
        return Err(nom::Err::Failure(error_position!(
            input,
            nom::error::ErrorKind::Verify
        )));
    }

    let size = constant_pool_count as usize - 1;
    let mut constant_pool = Vec::with_capacity(size);

    let mut input = input;

    while constant_pool.len() < size {
        let constant;
        (input, constant) = parse_constant(input)?;
        let need_empty = matches!(
            constant,
            ConstantPoolInfo::Long(_) | ConstantPoolInfo::Double(_)
        );
        constant_pool.push(constant);
        if need_empty {
            constant_pool.push(ConstantPoolInfo::Empty);
        }
    }

    Ok((input, constant_pool))
}

fn parse_constant(mut input: &[u8]) -> IResult<&[u8], ConstantPoolInfo> {
    let tag;
    (input, tag) = u8(input)?;
    let cp_info = match tag {
        1 => {
            let length;
            (input, length) = be_u16(input)?;
            let bytes;
            (input, bytes) = take(length).parse(input)?;
            ConstantPoolInfo::Utf8(JavaString::new(bytes))
        }
        3 => {
            let int;
            (input, int) = be_i32(input)?;
            ConstantPoolInfo::Integer(int)
        }
        4 => {
            let float;
            (input, float) = be_f32(input)?;
            ConstantPoolInfo::Float(float)
        }
        5 => {
            let long;
            (input, long) = be_i64(input)?;
            ConstantPoolInfo::Long(long)
        }
        6 => {
            let double;
            (input, double) = be_f64(input)?;
            ConstantPoolInfo::Double(double)
        }
        7 => {
            let name_index;
            (input, name_index) = be_u16(input)?;
            ConstantPoolInfo::Class { name_index }
        }
        8 => {
            let string_index;
            (input, string_index) = be_u16(input)?;
            ConstantPoolInfo::String { string_index }
        }
        9 | 10 | 11 | 12 | 17 | 18 => {
            // two u2 indices the stub never follows
            (input, _) = take(4usize).parse(input)?;
            match tag {
                9 => ConstantPoolInfo::Fieldref,
                10 => ConstantPoolInfo::Methodref,
                11 => ConstantPoolInfo::InterfaceMethodref,
                12 => ConstantPoolInfo::NameAndType,
                17 => ConstantPoolInfo::Dynamic,
                _ => ConstantPoolInfo::InvokeDynamic,
            }
        }
        15 => {
            (input, _) = take(3usize).parse(input)?;
            ConstantPoolInfo::MethodHandle
        }
        16 => {
            (input, _) = be_u16(input)?;
            ConstantPoolInfo::MethodType
        }
        19 => {
            let name_index;
            (input, name_index) = be_u16(input)?;
            ConstantPoolInfo::Module { name_index }
        }
        20 => {
            let name_index;
            (input, name_index) = be_u16(input)?;
            ConstantPoolInfo::Package { name_index }
        }
        _ => {
            tracing::debug!(tag, "unknown constant pool tag");
            return Err(nom::Err::Failure(error_position!(
                input,
                nom::error::ErrorKind::Tag
            )));
        }
    };
    Ok((input, cp_info))
}

fn parse_interfaces(input: &[u8]) -> IResult<&[u8], Vec<u16>> {
    let (input, interface_count) = be_u16(input)?;

    let (input, interfaces) = count(be_u16, interface_count as _).parse(input)?;

    Ok((input, interfaces))
}

fn parse_members(input: &[u8]) -> IResult<&[u8], Vec<MemberInfo>> {
    let (input, member_count) = be_u16(input)?;
    let (input, members) = count(parse_member, member_count as _).parse(input)?;
    Ok((input, members))
}

fn parse_member(input: &[u8]) -> IResult<&[u8], MemberInfo> {
    let (input, access_flags) = be_u16(input)?;
    let (input, name_index) = be_u16(input)?;
    let (input, descriptor_index) = be_u16(input)?;

    let (input, attributes) = parse_attributes(input)?;
    Ok((
        input,
        MemberInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        },
    ))
}

fn parse_attributes(input: &[u8]) -> IResult<&[u8], Vec<AttributeInfo>> {
    let (input, attributes_count) = be_u16(input)?;

    let (input, attributes) = count(parse_attribute, attributes_count as _).parse(input)?;

    Ok((input, attributes))
}

fn parse_attribute(input: &[u8]) -> IResult<&[u8], AttributeInfo> {
    let (input, attribute_name_index) = be_u16(input)?;
    let (input, attribute_length) = be_u32(input)?;
    let (input, info) = take(attribute_length).parse(input)?;

    Ok((
        input,
        AttributeInfo {
            attribute_name_index,
            info: info.to_vec(),
        },
    ))
}
