use std::io;

use thiserror::Error;

/// Whole-build failure. Returned by [`crate::build_stub`]; no stub tree is produced.
#[derive(Debug, Error)]
pub enum ClassFormatError {
    #[error("class file is truncated")]
    Truncated,
    #[error("malformed class file: {0:?}")]
    Malformed(nom::error::ErrorKind),
    #[error("constant pool entry {index} is not a {expected}")]
    BadConstant { index: u16, expected: &'static str },
    #[error("invalid descriptor `{0}`")]
    BadDescriptor(String),
    #[error("constant pool string is not valid modified UTF-8")]
    Encoding,
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),
    #[error("`{event}` received while the builder is {state}")]
    Protocol {
        event: &'static str,
        state: &'static str,
    },
    #[error("inner classes nested deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl<I> From<nom::Err<nom::error::Error<I>>> for ClassFormatError {
    fn from(err: nom::Err<nom::error::Error<I>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => ClassFormatError::Truncated,
            nom::Err::Error(e) | nom::Err::Failure(e) => match e.code {
                nom::error::ErrorKind::Eof => ClassFormatError::Truncated,
                code => ClassFormatError::Malformed(code),
            },
        }
    }
}

/// A generic signature that does not follow the signature grammar.
///
/// Never leaves the crate's public build entry points: every caller falls back to
/// the plain descriptor for the element whose signature failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad generic signature at offset {position}: {reason}")]
pub struct SignatureFormatError {
    pub position: usize,
    pub reason: &'static str,
}

pub type Result<T, E = ClassFormatError> = std::result::Result<T, E>;
