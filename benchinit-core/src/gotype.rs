// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Go type expressions.
//!
//! Parses the type text of Go declarations into [`TypeExpr`] and resolves
//! named types through a [`TypeResolver`] into [`Type`], which keeps only
//! what memory layout depends on. Element types of pointer-shaped and slice
//! types are never resolved, so self-referential declarations terminate.

use crate::error::TypeError;

/// Maximum nesting of named-type resolution.
pub const MAX_RESOLVE_DEPTH: usize = 32;

/// A type as written in source, before names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `name` or `qualifier.name`.
    Named {
        qualifier: Option<String>,
        name: String,
    },
    /// `*T`
    Pointer,
    /// `[]T`
    Slice,
    /// `[N]T`
    Array { len: u64, elem: Box<TypeExpr> },
    /// `map[K]V`
    Map,
    /// `chan T`, `<-chan T`, `chan<- T`
    Chan,
    /// `func(...) ...`
    Func,
    /// `interface{...}`
    Interface,
    /// `struct{...}`
    Struct(Vec<FieldExpr>),
}

/// One struct field as written. Embedded fields are named after their type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExpr {
    pub name: String,
    pub ty: TypeExpr,
}

/// Predeclared numeric and boolean kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl BasicKind {
    /// Fixed size in bytes, or `None` for word-sized kinds.
    pub const fn fixed_size(&self) -> Option<u64> {
        match self {
            Self::Bool | Self::Int8 | Self::Uint8 => Some(1),
            Self::Int16 | Self::Uint16 => Some(2),
            Self::Int32 | Self::Uint32 | Self::Float32 => Some(4),
            Self::Int64 | Self::Uint64 | Self::Float64 | Self::Complex64 => Some(8),
            Self::Complex128 => Some(16),
            Self::Int | Self::Uint | Self::Uintptr => None,
        }
    }

    pub const fn is_complex(&self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }
}

/// A resolved type, reduced to its layout shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Basic(BasicKind),
    String,
    /// One machine word: pointers, maps, channels, funcs, `unsafe.Pointer`.
    Pointer,
    Slice,
    Interface,
    Array { len: u64, elem: Box<Type> },
    Struct(Vec<Field>),
}

/// A resolved struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Looks up the declared type of a named Go type.
pub trait TypeResolver {
    /// Return the type expression `name` is declared with in `package`.
    ///
    /// `package` is whatever qualifies the name in source: an import path
    /// for top-level lookups, a package name for qualified references.
    fn declaration(&mut self, package: &str, name: &str) -> Result<TypeExpr, TypeError>;
}

/// Resolve `expr`, written inside `package`, into its layout shape.
pub fn resolve(
    expr: &TypeExpr,
    package: &str,
    resolver: &mut dyn TypeResolver,
) -> Result<Type, TypeError> {
    resolve_at(expr, package, resolver, 0)
}

fn resolve_at(
    expr: &TypeExpr,
    package: &str,
    resolver: &mut dyn TypeResolver,
    depth: usize,
) -> Result<Type, TypeError> {
    match expr {
        TypeExpr::Pointer | TypeExpr::Map | TypeExpr::Chan | TypeExpr::Func => Ok(Type::Pointer),
        TypeExpr::Slice => Ok(Type::Slice),
        TypeExpr::Interface => Ok(Type::Interface),
        TypeExpr::Array { len, elem } => Ok(Type::Array {
            len: *len,
            elem: Box::new(resolve_at(elem, package, resolver, depth)?),
        }),
        TypeExpr::Struct(fields) => fields
            .iter()
            .map(|f| Ok(Field::new(&f.name, resolve_at(&f.ty, package, resolver, depth)?)))
            .collect::<Result<Vec<_>, TypeError>>()
            .map(Type::Struct),
        TypeExpr::Named { qualifier, name } => {
            if let Some(ty) = predeclared(qualifier.as_deref(), name) {
                return Ok(ty);
            }
            if depth >= MAX_RESOLVE_DEPTH {
                return Err(TypeError::TooDeep {
                    name: name.clone(),
                    depth,
                });
            }
            let owner = qualifier.as_deref().unwrap_or(package);
            let declared = resolver.declaration(owner, name)?;
            resolve_at(&declared, owner, resolver, depth + 1)
        }
    }
}

/// Whether `name` is a predeclared Go type such as `int` or `error`.
pub fn is_predeclared(name: &str) -> bool {
    predeclared(None, name).is_some()
}

fn predeclared(qualifier: Option<&str>, name: &str) -> Option<Type> {
    use BasicKind::*;

    match qualifier {
        Some("unsafe") if name == "Pointer" => return Some(Type::Pointer),
        Some(_) => return None,
        None => {}
    }
    let kind = match name {
        "string" => return Some(Type::String),
        "error" | "any" => return Some(Type::Interface),
        "bool" => Bool,
        "int" => Int,
        "int8" => Int8,
        "int16" => Int16,
        "int32" | "rune" => Int32,
        "int64" => Int64,
        "uint" => Uint,
        "uint8" | "byte" => Uint8,
        "uint16" => Uint16,
        "uint32" => Uint32,
        "uint64" => Uint64,
        "uintptr" => Uintptr,
        "float32" => Float32,
        "float64" => Float64,
        "complex64" => Complex64,
        "complex128" => Complex128,
        _ => return None,
    };
    Some(Type::Basic(kind))
}

/// Parse a standalone type expression such as `map[string]*Flag`.
pub fn parse_type_expr(text: &str) -> Result<TypeExpr, TypeError> {
    let mut parser = Parser::new(text)?;
    let ty = parser.parse_type()?;
    parser.skip_separators();
    if !parser.at_end() {
        return Err(parser.error("trailing tokens after type"));
    }
    Ok(ty)
}

/// Find `type <name> ...` in Go source and parse its type expression.
///
/// Handles grouped `type ( ... )` declarations and aliases. Generic
/// declarations are rejected.
pub fn parse_type_decl(source: &str, name: &str) -> Result<TypeExpr, TypeError> {
    let mut parser = Parser::new(source)?;
    let start = parser
        .find_type_decl(name)
        .ok_or_else(|| TypeError::NotFound {
            name: name.to_string(),
        })?;
    parser.pos = start;
    if parser.eat_punct('=') {
        // alias: the aliased type has the same layout
    } else if parser.peek_punct('[')
        && matches!(parser.tokens.get(parser.pos + 1), Some(Token::Ident(_)))
    {
        return Err(TypeError::Unsupported {
            what: format!("generic type {}", name),
        });
    }
    parser.parse_type()
}

/// A Go source token. Comments are dropped; line breaks are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Ident(String),
    Int(u64),
    /// Float or imaginary literal.
    Number,
    /// String or rune literal, without quotes or escape processing.
    Str(String),
    Punct(char),
    Arrow,
    Ellipsis,
    Newline,
}

pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, TypeError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let parse_err = |reason: &str| TypeError::Parse {
        input: text.to_string(),
        reason: reason.to_string(),
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                tokens.push(Token::Newline);
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                let mut saw_newline = false;
                loop {
                    match chars.get(i) {
                        None => return Err(parse_err("unterminated block comment")),
                        Some('*') if chars.get(i + 1) == Some(&'/') => {
                            i += 2;
                            break;
                        }
                        Some('\n') => saw_newline = true,
                        Some(_) => {}
                    }
                    i += 1;
                }
                if saw_newline {
                    tokens.push(Token::Newline);
                }
            }
            '"' | '\'' => {
                let quote = c;
                i += 1;
                let start = i;
                loop {
                    match chars.get(i) {
                        None | Some('\n') => return Err(parse_err("unterminated string")),
                        Some('\\') => i += 2,
                        Some(&q) if q == quote => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
                tokens.push(Token::Str(chars[start..i - 1].iter().collect()));
            }
            '`' => {
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != '`' {
                    i += 1;
                }
                if i == chars.len() {
                    return Err(parse_err("unterminated raw string"));
                }
                i += 1;
                tokens.push(Token::Str(chars[start..i - 1].iter().collect()));
            }
            '<' if chars.get(i + 1) == Some(&'-') => {
                tokens.push(Token::Arrow);
                i += 2;
            }
            '.' if chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') => {
                tokens.push(Token::Ellipsis);
                i += 3;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().filter(|c| **c != '_').collect();
                let fraction = chars.get(i) == Some(&'.')
                    && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit());
                match parse_int_literal(&literal) {
                    Some(value) if !fraction => tokens.push(Token::Int(value)),
                    _ => {
                        if fraction {
                            i += 1;
                            while i < chars.len()
                                && (chars[i].is_ascii_alphanumeric() || chars[i] == '_')
                            {
                                i += 1;
                            }
                        }
                        tokens.push(Token::Number);
                    }
                }
            }
            c => {
                tokens.push(Token::Punct(c));
                i += 1;
            }
        }
    }
    Ok(tokens)
}

fn parse_int_literal(literal: &str) -> Option<u64> {
    let lower = literal.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u64::from_str_radix(oct, 8).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        u64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Result<Self, TypeError> {
        Ok(Self {
            source,
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    fn error(&self, reason: &str) -> TypeError {
        TypeError::Parse {
            input: self.source.trim().to_string(),
            reason: format!("{} (token {})", reason, self.pos),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_punct(&self, c: char) -> bool {
        self.peek_nth_punct(0, c)
    }

    fn peek_nth_punct(&self, n: usize, c: char) -> bool {
        self.tokens.get(self.pos + n) == Some(&Token::Punct(c))
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek_punct(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<(), TypeError> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    fn expect_ident(&mut self) -> Result<String, TypeError> {
        match self.bump() {
            Some(Token::Ident(name)) => Ok(name),
            _ => Err(self.error("expected identifier")),
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(Token::Newline) | Some(Token::Punct(';'))) {
            self.pos += 1;
        }
    }

    /// Skip past the bracket that closes the one just consumed.
    fn skip_balanced(&mut self) -> Result<(), TypeError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.bump() {
                Some(Token::Punct('(' | '[' | '{')) => depth += 1,
                Some(Token::Punct(')' | ']' | '}')) => depth -= 1,
                Some(_) => {}
                None => return Err(self.error("unbalanced brackets")),
            }
        }
        Ok(())
    }

    fn parse_type(&mut self) -> Result<TypeExpr, TypeError> {
        match self.bump() {
            Some(Token::Punct('*')) => {
                self.parse_type()?;
                Ok(TypeExpr::Pointer)
            }
            Some(Token::Punct('(')) => {
                let ty = self.parse_type()?;
                self.expect_punct(')')?;
                Ok(ty)
            }
            Some(Token::Punct('[')) => match self.peek().cloned() {
                Some(Token::Punct(']')) => {
                    self.pos += 1;
                    self.parse_type()?;
                    Ok(TypeExpr::Slice)
                }
                Some(Token::Int(len)) => {
                    self.pos += 1;
                    self.expect_punct(']')?;
                    let elem = self.parse_type()?;
                    Ok(TypeExpr::Array {
                        len,
                        elem: Box::new(elem),
                    })
                }
                _ => Err(TypeError::Unsupported {
                    what: "array length that is not an integer literal".to_string(),
                }),
            },
            Some(Token::Arrow) => {
                if self.expect_ident()? != "chan" {
                    return Err(self.error("expected 'chan' after '<-'"));
                }
                self.parse_type()?;
                Ok(TypeExpr::Chan)
            }
            Some(Token::Ident(word)) => match word.as_str() {
                "map" => {
                    self.expect_punct('[')?;
                    self.parse_type()?;
                    self.expect_punct(']')?;
                    self.parse_type()?;
                    Ok(TypeExpr::Map)
                }
                "chan" => {
                    if self.peek() == Some(&Token::Arrow) {
                        self.pos += 1;
                    }
                    self.parse_type()?;
                    Ok(TypeExpr::Chan)
                }
                "func" => {
                    self.parse_signature()?;
                    Ok(TypeExpr::Func)
                }
                "interface" => {
                    self.expect_punct('{')?;
                    self.skip_balanced()?;
                    Ok(TypeExpr::Interface)
                }
                "struct" => {
                    self.expect_punct('{')?;
                    Ok(TypeExpr::Struct(self.parse_fields()?))
                }
                _ => self.parse_named(word),
            },
            _ => Err(self.error("expected type")),
        }
    }

    fn parse_named(&mut self, first: String) -> Result<TypeExpr, TypeError> {
        let named = if self.eat_punct('.') {
            TypeExpr::Named {
                qualifier: Some(first),
                name: self.expect_ident()?,
            }
        } else {
            TypeExpr::Named {
                qualifier: None,
                name: first,
            }
        };
        if self.peek_punct('[') {
            return Err(TypeError::Unsupported {
                what: "instantiated generic type".to_string(),
            });
        }
        Ok(named)
    }

    fn parse_signature(&mut self) -> Result<(), TypeError> {
        self.expect_punct('(')?;
        self.skip_balanced()?;
        match self.peek() {
            Some(Token::Punct('(')) => {
                self.pos += 1;
                self.skip_balanced()
            }
            None
            | Some(Token::Newline)
            | Some(Token::Str(_))
            | Some(Token::Punct(';' | ',' | ')' | ']' | '}' | '=')) => Ok(()),
            Some(_) => self.parse_type().map(|_| ()),
        }
    }

    /// Parse field declarations up to and including the closing `}`.
    fn parse_fields(&mut self) -> Result<Vec<FieldExpr>, TypeError> {
        let mut fields = Vec::new();
        loop {
            self.skip_separators();
            if self.eat_punct('}') {
                return Ok(fields);
            }
            if self.at_end() {
                return Err(self.error("unterminated struct"));
            }
            self.parse_field_decl(&mut fields)?;
            if matches!(self.peek(), Some(Token::Str(_))) {
                self.pos += 1;
            }
            match self.peek() {
                Some(Token::Newline) | Some(Token::Punct(';' | '}')) => {}
                _ => return Err(self.error("expected end of field")),
            }
        }
    }

    fn parse_field_decl(&mut self, fields: &mut Vec<FieldExpr>) -> Result<(), TypeError> {
        if self.eat_punct('*') {
            let name = self.embedded_name()?;
            fields.push(FieldExpr {
                name,
                ty: TypeExpr::Pointer,
            });
            return Ok(());
        }

        let is_embedded = matches!(
            self.tokens.get(self.pos + 1),
            None | Some(Token::Newline) | Some(Token::Str(_)) | Some(Token::Punct('.' | ';' | '}'))
        );
        if is_embedded {
            let start = self.pos;
            let name = self.embedded_name()?;
            self.pos = start;
            let ty = self.parse_type()?;
            fields.push(FieldExpr { name, ty });
            return Ok(());
        }

        let mut names = vec![self.expect_ident()?];
        while self.eat_punct(',') {
            self.skip_separators();
            names.push(self.expect_ident()?);
        }
        let ty = self.parse_type()?;
        fields.extend(names.into_iter().map(|name| FieldExpr {
            name,
            ty: ty.clone(),
        }));
        Ok(())
    }

    /// Name of an embedded field: the unqualified type name.
    fn embedded_name(&mut self) -> Result<String, TypeError> {
        let mut name = self.expect_ident()?;
        if self.eat_punct('.') {
            name = self.expect_ident()?;
        }
        Ok(name)
    }

    /// Position just after `type <name>`, if the source declares it.
    fn find_type_decl(&self, name: &str) -> Option<usize> {
        let mut in_group = false;
        let mut depth = 0usize;
        let mut i = 0;
        while i < self.tokens.len() {
            match &self.tokens[i] {
                Token::Ident(word) if word == "type" && depth == 0 => {
                    match self.tokens.get(i + 1) {
                        Some(Token::Ident(decl)) if decl == name => return Some(i + 2),
                        Some(Token::Punct('(')) => {
                            in_group = true;
                            depth = 1;
                            i += 2;
                            continue;
                        }
                        _ => {}
                    }
                }
                Token::Ident(decl)
                    if in_group
                        && depth == 1
                        && decl == name
                        && matches!(self.tokens.get(i - 1), Some(Token::Newline | Token::Punct('(' | ';'))) =>
                {
                    return Some(i + 1);
                }
                Token::Punct('(' | '[' | '{') if in_group => depth += 1,
                Token::Punct(')' | ']' | '}') if in_group => {
                    depth -= 1;
                    if depth == 0 {
                        in_group = false;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const FLAGSET_DOC: &str = r#"package flag // import "flag"

// A FlagSet represents a set of defined flags.
type FlagSet struct {
	// Usage is the function called when an error occurs while parsing flags.
	Usage func()

	name          string
	parsed        bool
	actual        map[string]*Flag
	formal        map[string]*Flag
	args          []string // arguments after flags
	errorHandling ErrorHandling
	output        io.Writer         // nil means stderr; use Output() accessor
	undef         map[string]string // flags which didn't exist at the time of Set
}

func NewFlagSet(name string, errorHandling ErrorHandling) *FlagSet
"#;

    struct MapResolver(HashMap<(String, String), &'static str>);

    impl TypeResolver for MapResolver {
        fn declaration(&mut self, package: &str, name: &str) -> Result<TypeExpr, TypeError> {
            let text = self
                .0
                .get(&(package.to_string(), name.to_string()))
                .ok_or_else(|| TypeError::NotFound {
                    name: format!("{}.{}", package, name),
                })?;
            parse_type_decl(text, name)
        }
    }

    fn flag_resolver() -> MapResolver {
        let mut decls = HashMap::new();
        decls.insert(
            ("flag".to_string(), "ErrorHandling".to_string()),
            "type ErrorHandling int",
        );
        decls.insert(
            ("io".to_string(), "Writer".to_string()),
            "type Writer interface {\n\tWrite(p []byte) (n int, err error)\n}",
        );
        MapResolver(decls)
    }

    #[test]
    fn test_parse_flagset_declaration() {
        let expr = parse_type_decl(FLAGSET_DOC, "FlagSet").unwrap();
        let TypeExpr::Struct(fields) = expr else {
            panic!("expected struct");
        };
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Usage",
                "name",
                "parsed",
                "actual",
                "formal",
                "args",
                "errorHandling",
                "output",
                "undef"
            ]
        );
        assert_eq!(fields[0].ty, TypeExpr::Func);
        assert_eq!(fields[4].ty, TypeExpr::Map);
        assert_eq!(
            fields[7].ty,
            TypeExpr::Named {
                qualifier: Some("io".to_string()),
                name: "Writer".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_flagset() {
        let expr = parse_type_decl(FLAGSET_DOC, "FlagSet").unwrap();
        let ty = resolve(&expr, "flag", &mut flag_resolver()).unwrap();
        let Type::Struct(fields) = ty else {
            panic!("expected struct");
        };
        assert_eq!(fields[6].ty, Type::Basic(BasicKind::Int));
        assert_eq!(fields[7].ty, Type::Interface);
        assert_eq!(fields[1].ty, Type::String);
    }

    #[test]
    fn test_embedded_and_grouped_fields() {
        let expr = parse_type_expr(
            "struct {\n\tsync.Mutex\n\t*Node `json:\"n\"`\n\ta, b int32; c [4]byte\n}",
        )
        .unwrap();
        let TypeExpr::Struct(fields) = expr else {
            panic!("expected struct");
        };
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Mutex", "Node", "a", "b", "c"]);
        assert_eq!(fields[1].ty, TypeExpr::Pointer);
        assert!(matches!(fields[4].ty, TypeExpr::Array { len: 4, .. }));
    }

    #[test]
    fn test_func_results() {
        let expr = parse_type_expr("struct {\n\tf func(a, b int) (string, error)\n\tg func() int\n\th chan<- struct{}\n}").unwrap();
        let TypeExpr::Struct(fields) = expr else {
            panic!("expected struct");
        };
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].ty, TypeExpr::Func);
        assert_eq!(fields[1].ty, TypeExpr::Func);
        assert_eq!(fields[2].ty, TypeExpr::Chan);
    }

    #[test]
    fn test_grouped_type_declaration() {
        let source = "type (\n\tA int8\n\tB struct{ x A }\n)\n";
        assert_eq!(
            parse_type_decl(source, "A").unwrap(),
            TypeExpr::Named {
                qualifier: None,
                name: "int8".to_string()
            }
        );
        assert!(matches!(
            parse_type_decl(source, "B").unwrap(),
            TypeExpr::Struct(_)
        ));
    }

    #[test]
    fn test_alias_declaration() {
        let expr = parse_type_decl("type Bytes = []byte", "Bytes").unwrap();
        assert_eq!(expr, TypeExpr::Slice);
    }

    #[test]
    fn test_missing_declaration() {
        assert!(matches!(
            parse_type_decl("type X int", "Y"),
            Err(TypeError::NotFound { .. })
        ));
    }

    #[test]
    fn test_generics_rejected() {
        assert!(matches!(
            parse_type_decl("type List[T any] struct{ head *T }", "List"),
            Err(TypeError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_tokenize_literals() {
        let tokens = tokenize("f(1e9, 0x1F, `raw`, \"q\\\"s\")").unwrap();
        assert_eq!(tokens[2], Token::Number);
        assert_eq!(tokens[4], Token::Int(31));
        assert_eq!(tokens[6], Token::Str("raw".to_string()));
        assert_eq!(tokens[8], Token::Str("q\\\"s".to_string()));
    }

    #[test]
    fn test_symbolic_array_length_rejected() {
        assert!(matches!(
            parse_type_expr("[N]int"),
            Err(TypeError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_unknown_name_fails_resolution() {
        let expr = parse_type_expr("struct { x Missing }").unwrap();
        let result = resolve(&expr, "pkg", &mut flag_resolver());
        assert!(matches!(result, Err(TypeError::NotFound { .. })));
    }

    #[test]
    fn test_cycle_through_names_is_bounded() {
        struct Loop;
        impl TypeResolver for Loop {
            fn declaration(&mut self, _: &str, _: &str) -> Result<TypeExpr, TypeError> {
                Ok(TypeExpr::Named {
                    qualifier: None,
                    name: "Again".to_string(),
                })
            }
        }
        let expr = parse_type_expr("Again").unwrap();
        assert!(matches!(
            resolve(&expr, "p", &mut Loop),
            Err(TypeError::TooDeep { .. })
        ));
    }
}
