//! Recursive-descent parser for generic signatures (JVMS §4.7.9.1).
//!
//! Each production reads from a [`SignatureCursor`] and renders the source-level
//! text of what it parsed: `Ljava/util/List<+TT;>;` becomes
//! `java.util.List<? extends T>`. Types are not resolved, so type variables render
//! as their bare names.
//!
//! On error the cursor position is unspecified; callers drop the whole signature
//! and fall back to the descriptor.

use crate::{consts::JAVA_LANG_OBJECT, error::SignatureFormatError, stub::TypeParameter};

pub type SignatureResult<T> = std::result::Result<T, SignatureFormatError>;

/// Nesting limit for `<...>` type argument lists.
pub const MAX_TYPE_ARGUMENT_DEPTH: usize = 255;

#[derive(Debug, Clone)]
pub struct SignatureCursor<'a> {
    text: &'a str,
    position: usize,
    /// Open `<` lists around the cursor.
    depth: usize,
}

impl<'a> SignatureCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            position: 0,
            depth: 0,
        }
    }

    /// `None` once the whole signature is consumed.
    pub fn current(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    pub fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.position += c.len_utf8();
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_done(&self) -> bool {
        self.position >= self.text.len()
    }

    fn error(&self, reason: &'static str) -> SignatureFormatError {
        SignatureFormatError {
            position: self.position,
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<String>,
    pub return_type: String,
}

/// `<T:Ljava/lang/Object;>Ljava/util/AbstractList<TT;>;Ljava/util/RandomAccess;`
///
/// Everything after the superclass must be an interface reference; any other
/// trailing text fails the whole signature.
pub fn parse_class_signature(signature: &str) -> SignatureResult<ClassSignature> {
    let mut cursor = SignatureCursor::new(signature);
    let type_parameters = parse_type_parameters_declaration(&mut cursor)?;
    let super_class = parse_toplevel_class_ref_signature(&mut cursor)?;

    let mut interfaces = Vec::new();
    while !cursor.is_done() {
        let interface = parse_toplevel_class_ref_signature(&mut cursor)?
            .ok_or_else(|| cursor.error("expected interface reference"))?;
        interfaces.push(interface);
    }

    Ok(ClassSignature {
        type_parameters,
        super_class,
        interfaces,
    })
}

/// `<T:Ljava/lang/Object;>(TT;[I)Ljava/util/List<TT;>;`
///
/// A `^` throws suffix is left unread; thrown types come from the `Exceptions`
/// attribute.
pub fn parse_method_signature(signature: &str) -> SignatureResult<MethodSignature> {
    let mut cursor = SignatureCursor::new(signature);
    let type_parameters = parse_type_parameters_declaration(&mut cursor)?;

    if cursor.current() != Some('(') {
        return Err(cursor.error("expected `(`"));
    }
    cursor.advance();

    let mut parameters = Vec::new();
    while !matches!(cursor.current(), Some(')') | None) {
        parameters.push(parse_type_string(&mut cursor)?);
    }

    if cursor.current() != Some(')') {
        return Err(cursor.error("expected `)`"));
    }
    cursor.advance();

    let return_type = parse_type_string(&mut cursor)?;

    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
    })
}

/// Field signature: a single type.
pub fn parse_field_signature(signature: &str) -> SignatureResult<String> {
    parse_type_string(&mut SignatureCursor::new(signature))
}

/// Optional `<...>` block of formal type parameters. Empty when absent.
pub fn parse_type_parameters_declaration(
    cursor: &mut SignatureCursor<'_>,
) -> SignatureResult<Vec<TypeParameter>> {
    let mut type_parameters = Vec::new();
    if cursor.current() != Some('<') {
        return Ok(type_parameters);
    }
    cursor.advance();

    while cursor.current() != Some('>') {
        type_parameters.push(parse_type_parameter(cursor)?);
    }
    cursor.advance();

    Ok(type_parameters)
}

fn parse_type_parameter(cursor: &mut SignatureCursor<'_>) -> SignatureResult<TypeParameter> {
    let mut name = String::new();
    loop {
        match cursor.current() {
            Some(':') => break,
            Some(c) => name.push(c),
            None => return Err(cursor.error("unterminated type parameter")),
        }
        cursor.advance();
    }
    if name.is_empty() {
        return Err(cursor.error("type parameter without a name"));
    }

    // the class bound may be empty (`T::Ljava/lang/Comparable;`)
    let mut bounds = Vec::new();
    while cursor.current() == Some(':') {
        cursor.advance();
        if let Some(bound) = parse_toplevel_class_ref_signature(cursor)? {
            if bound != JAVA_LANG_OBJECT {
                bounds.push(bound);
            }
        }
    }

    Ok(TypeParameter { name, bounds })
}

/// A class type or type variable reference; `None`, without consuming anything,
/// when the cursor is at neither.
pub fn parse_toplevel_class_ref_signature(
    cursor: &mut SignatureCursor<'_>,
) -> SignatureResult<Option<String>> {
    match cursor.current() {
        Some('L') => parse_parameterized_class_ref_signature(cursor).map(Some),
        Some('T') => parse_type_variable_ref_signature(cursor).map(Some),
        _ => Ok(None),
    }
}

fn parse_type_variable_ref_signature(cursor: &mut SignatureCursor<'_>) -> SignatureResult<String> {
    cursor.advance();
    let mut id = String::new();
    loop {
        match cursor.current() {
            Some(';') | Some('>') => break,
            Some(c) => id.push(c),
            None => return Err(cursor.error("unterminated type variable")),
        }
        cursor.advance();
    }
    if cursor.current() == Some(';') {
        cursor.advance();
    }
    Ok(id)
}

fn parse_parameterized_class_ref_signature(
    cursor: &mut SignatureCursor<'_>,
) -> SignatureResult<String> {
    cursor.advance();
    let mut canonical_text = String::new();
    loop {
        match cursor.current() {
            Some(';') => break,
            None => return Err(cursor.error("unterminated class type")),
            Some('$' | '/' | '.') => canonical_text.push('.'),
            Some('<') => {
                if cursor.depth >= MAX_TYPE_ARGUMENT_DEPTH {
                    return Err(cursor.error("type arguments nested too deeply"));
                }
                cursor.depth += 1;
                canonical_text.push('<');
                cursor.advance();
                loop {
                    process_type_argument(cursor, &mut canonical_text)?;
                    if cursor.current() == Some('>') {
                        break;
                    }
                }
                canonical_text.push('>');
                cursor.depth -= 1;
            }
            Some(' ') => {}
            Some(c) => canonical_text.push(c),
        }
        cursor.advance();
    }
    cursor.advance();

    Ok(restore_numbered_classes(&canonical_text))
}

/// `Outer.1` is an anonymous or local class: its binary name keeps the `$`.
fn restore_numbered_classes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '.' && chars.peek().is_some_and(char::is_ascii_digit) {
            result.push('$');
        } else {
            result.push(c);
        }
    }
    result
}

fn process_type_argument(
    cursor: &mut SignatureCursor<'_>,
    canonical_text: &mut String,
) -> SignatureResult<()> {
    let type_argument = parse_class_or_type_variable_element(cursor)?;
    canonical_text.push_str(&type_argument);
    if cursor.current() != Some('>') {
        canonical_text.push(',');
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variance {
    None,
    Extends,
    Super,
    Unbounded,
}

fn parse_variance(cursor: &mut SignatureCursor<'_>) -> Variance {
    let variance = match cursor.current() {
        Some('+') => Variance::Extends,
        Some('-') => Variance::Super,
        Some('*') => Variance::Unbounded,
        // legacy compilers wrote `=` and `.` for exact arguments
        Some('.' | '=') => Variance::None,
        _ => return Variance::None,
    };
    cursor.advance();
    variance
}

fn parse_dimensions(cursor: &mut SignatureCursor<'_>) -> usize {
    let mut dimensions = 0;
    while cursor.current() == Some('[') {
        dimensions += 1;
        cursor.advance();
    }
    dimensions
}

/// One type argument, wildcards included.
pub fn parse_class_or_type_variable_element(
    cursor: &mut SignatureCursor<'_>,
) -> SignatureResult<String> {
    let variance = parse_variance(cursor);
    if variance == Variance::Unbounded {
        return Ok("?".to_string());
    }

    let text = parse_type_string(cursor)?;
    Ok(match variance {
        Variance::Extends => format!("? extends {text}"),
        Variance::Super => format!("? super {text}"),
        _ => text,
    })
}

/// Array, class, type variable or primitive type; arrays render with trailing `[]`.
pub fn parse_type_string(cursor: &mut SignatureCursor<'_>) -> SignatureResult<String> {
    let dimensions = parse_dimensions(cursor);
    let mut text =
        parse_type_without_variance(cursor)?.ok_or_else(|| cursor.error("expected a type"))?;
    for _ in 0..dimensions {
        text.push_str("[]");
    }
    Ok(text)
}

fn parse_type_without_variance(
    cursor: &mut SignatureCursor<'_>,
) -> SignatureResult<Option<String>> {
    let primitive = match cursor.current() {
        Some('L') => return parse_parameterized_class_ref_signature(cursor).map(Some),
        Some('T') => return parse_type_variable_ref_signature(cursor).map(Some),
        Some('B') => "byte",
        Some('C') => "char",
        Some('D') => "double",
        Some('F') => "float",
        Some('I') => "int",
        Some('J') => "long",
        Some('S') => "short",
        Some('Z') => "boolean",
        Some('V') => "void",
        _ => return Ok(None),
    };
    cursor.advance();
    Ok(Some(primitive.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, bounds: &[&str]) -> TypeParameter {
        TypeParameter {
            name: name.to_string(),
            bounds: bounds.iter().map(|b| b.to_string()).collect(),
        }
    }

    #[test]
    fn class_signature_with_type_parameters() {
        let signature = parse_class_signature(
            "<K:Ljava/lang/Object;V::Ljava/lang/Comparable<TV;>;>Ljava/util/AbstractMap<TK;TV;>;Ljava/io/Serializable;",
        )
        .unwrap();
        assert_eq!(
            signature.type_parameters,
            vec![param("K", &[]), param("V", &["java.lang.Comparable<V>"])]
        );
        assert_eq!(
            signature.super_class.as_deref(),
            Some("java.util.AbstractMap<K,V>")
        );
        assert_eq!(signature.interfaces, vec!["java.io.Serializable"]);
    }

    #[test]
    fn wildcards_and_arrays_in_arguments() {
        let text = parse_field_signature("Ljava/util/Map<+Ljava/lang/Number;-TT;>;").unwrap();
        assert_eq!(text, "java.util.Map<? extends java.lang.Number,? super T>");

        let text = parse_field_signature("Ljava/util/List<*>;").unwrap();
        assert_eq!(text, "java.util.List<?>");

        let text = parse_field_signature("[[Ljava/util/List<[I>;").unwrap();
        assert_eq!(text, "java.util.List<int[]>[][]");
    }

    #[test]
    fn nested_and_numbered_classes() {
        assert_eq!(
            parse_field_signature("Ljava/util/Map$Entry<TK;TV;>;").unwrap(),
            "java.util.Map.Entry<K,V>"
        );
        assert_eq!(
            parse_field_signature("Lcom/acme/Outer<TT;>.Inner;").unwrap(),
            "com.acme.Outer<T>.Inner"
        );
        assert_eq!(
            parse_field_signature("Lcom/acme/Outer$1;").unwrap(),
            "com.acme.Outer$1"
        );
    }

    #[test]
    fn primitives_and_type_variables() {
        assert_eq!(parse_field_signature("J").unwrap(), "long");
        assert_eq!(parse_field_signature("[TT;").unwrap(), "T[]");
        assert!(parse_field_signature("Q").is_err());
    }

    #[test]
    fn method_signature() {
        let signature = parse_method_signature(
            "<T:Ljava/lang/Object;>(TT;[Ljava/lang/String;I)Ljava/util/List<TT;>;^Ljava/io/IOException;",
        )
        .unwrap();
        assert_eq!(signature.type_parameters, vec![param("T", &[])]);
        assert_eq!(signature.parameters, vec!["T", "java.lang.String[]", "int"]);
        assert_eq!(signature.return_type, "java.util.List<T>");
    }

    #[test]
    fn method_signature_errors() {
        assert!(parse_method_signature("I)V").is_err());
        assert!(parse_method_signature("(I").is_err());
        assert!(parse_method_signature("(I)").is_err());
    }

    #[test]
    fn class_signature_with_trailing_garbage_fails() {
        let err = parse_class_signature("Ljava/lang/Object;Ljava/lang/Runnable;X").unwrap_err();
        assert_eq!(err.position, 38);
    }

    #[test]
    fn unterminated_constructs_fail() {
        assert!(parse_class_signature("<T:Ljava/lang/Object;").is_err());
        assert!(parse_class_signature("Ljava/util/List<TT;").is_err());
        assert!(parse_class_signature("Ljava/lang/Object").is_err());
        assert!(parse_class_signature("<:Ljava/lang/Object;>Ljava/lang/Object;").is_err());
    }

    #[test]
    fn type_argument_nesting_is_capped() {
        let nested = |depth: usize| {
            format!(
                "{}Ljava/lang/Object;{}",
                "Ljava/util/List<".repeat(depth),
                ">;".repeat(depth)
            )
        };
        assert!(parse_field_signature(&nested(MAX_TYPE_ARGUMENT_DEPTH)).is_ok());
        let err = parse_field_signature(&nested(MAX_TYPE_ARGUMENT_DEPTH + 1)).unwrap_err();
        assert_eq!(err.reason, "type arguments nested too deeply");
        assert!(parse_field_signature(&nested(200_000)).is_err());
    }

    #[test]
    fn class_signature_without_type_parameters() {
        let signature = parse_class_signature("Ljava/lang/Object;").unwrap();
        assert!(signature.type_parameters.is_empty());
        assert_eq!(signature.super_class.as_deref(), Some("java.lang.Object"));
        assert!(signature.interfaces.is_empty());
    }
}
