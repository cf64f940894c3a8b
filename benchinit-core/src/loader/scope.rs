// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Package-level variable scanner.
//!
//! Reads the top-level `import`, `type` and `var` declarations of a Go source
//! file and records each variable with the named type it is declared with.
//! Type names are qualified through the file's imports, and type aliases are
//! followed once every file of a package is scanned. Function bodies and
//! initializer expressions are skipped, not evaluated.

use std::collections::HashMap;

use crate::error::TypeError;
use crate::gotype::{is_predeclared, tokenize, Token};
use crate::module::{PackageVar, TypeName};
use crate::types::ModulePath;

const KEYWORDS: [&str; 5] = ["struct", "map", "func", "chan", "interface"];

/// Longest alias chain followed before giving up.
const MAX_ALIAS_DEPTH: usize = 16;

/// Package-level declarations of one source file.
#[derive(Debug, Default)]
pub struct FileScope {
    /// Variables in declaration order.
    pub vars: Vec<PackageVar>,
    /// `type A = T` aliases by name, with `T` qualified.
    pub aliases: HashMap<String, TypeName>,
}

/// Scan the package-level declarations of `source`.
///
/// `package` is the import path of the package the file belongs to; it
/// qualifies unqualified type names.
pub fn scan_file(source: &str, package: &ModulePath) -> Result<FileScope, TypeError> {
    let mut scanner = Scanner {
        tokens: tokenize(source)?,
        pos: 0,
    };
    let mut imports = HashMap::new();
    let mut specs = Vec::new();
    let mut aliases = Vec::new();

    let mut depth = 0usize;
    while let Some(token) = scanner.bump() {
        match token {
            Token::Ident(word) if depth == 0 && word == "import" => {
                scanner.import_decl(&mut imports);
            }
            Token::Ident(word) if depth == 0 && word == "type" => {
                scanner.type_decl(&mut aliases);
            }
            Token::Ident(word) if depth == 0 && word == "var" => {
                scanner.var_decl(&mut specs);
            }
            Token::Punct('(' | '[' | '{') => depth += 1,
            Token::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    let mut scope = FileScope::default();
    for spec in specs.into_iter().filter(|spec| spec.name != "_") {
        let declared = spec.declared.and_then(|d| qualify(d, package, &imports));
        if declared.is_none() && spec.dereferenced {
            tracing::warn!(
                module = %package,
                variable = %spec.name,
                "Type of dereferenced initializer not inferred; a flag.FlagSet value here is not reset between runs"
            );
        }
        scope.vars.push(PackageVar {
            name: spec.name,
            declared,
            layout: None,
        });
    }
    for (name, target) in aliases {
        if let Some(target) = qualify(target, package, &imports) {
            scope.aliases.insert(name, target);
        }
    }
    Ok(scope)
}

/// Replace every variable type that names a local alias with the aliased
/// type, following chains.
pub fn resolve_aliases(
    vars: &mut [PackageVar],
    package: &ModulePath,
    aliases: &HashMap<String, TypeName>,
) {
    for var in vars {
        for _ in 0..MAX_ALIAS_DEPTH {
            let target = match &var.declared {
                Some(declared) if declared.package == *package => aliases.get(&declared.name),
                _ => None,
            };
            match target {
                Some(target) => var.declared = Some(target.clone()),
                None => break,
            }
        }
    }
}

/// Package name an import path is assumed to bind when not renamed.
///
/// Uses the last path element, skipping a `vN` major-version element,
/// dropping a `go-` prefix and cutting at the first non-identifier byte.
pub fn assumed_package_name(path: &str) -> &str {
    let mut elements = path.rsplit('/');
    let mut last = elements.next().unwrap_or(path);
    let is_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].bytes().all(|b| b.is_ascii_digit());
    if is_version {
        if let Some(previous) = elements.next() {
            last = previous;
        }
    }
    let last = last.strip_prefix("go-").unwrap_or(last);
    let end = last
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(last.len());
    &last[..end]
}

/// A declared type as written: optional qualifier and name.
type RawName = (Option<String>, String);

/// One variable of a `var` declaration.
struct VarSpec {
    name: String,
    declared: Option<RawName>,
    /// Untyped, with an initializer that dereferences something.
    dereferenced: bool,
}

fn qualify(
    (qualifier, name): RawName,
    package: &ModulePath,
    imports: &HashMap<String, ModulePath>,
) -> Option<TypeName> {
    match qualifier {
        None if is_predeclared(&name) => None,
        None => Some(TypeName::new(package.clone(), name)),
        Some(qualifier) => match imports.get(&qualifier) {
            Some(path) => Some(TypeName::new(path.clone(), name)),
            None => {
                tracing::debug!(%package, %qualifier, "Unknown package qualifier");
                None
            }
        },
    }
}

struct Scanner {
    tokens: Vec<Token>,
    pos: usize,
}

impl Scanner {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek() == Some(&Token::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(Token::Newline | Token::Punct(';'))) {
            self.pos += 1;
        }
    }

    /// After `import`: a single spec or a parenthesized group.
    fn import_decl(&mut self, imports: &mut HashMap<String, ModulePath>) {
        if !self.eat_punct('(') {
            self.import_spec(imports);
            return;
        }
        loop {
            self.skip_separators();
            if self.eat_punct(')') || self.peek().is_none() {
                return;
            }
            let before = self.pos;
            self.import_spec(imports);
            if self.pos == before {
                self.pos += 1;
            }
        }
    }

    fn import_spec(&mut self, imports: &mut HashMap<String, ModulePath>) {
        let alias = match self.peek() {
            Some(Token::Ident(alias)) => {
                let alias = alias.clone();
                self.pos += 1;
                Some(alias)
            }
            Some(Token::Punct('.')) => {
                self.pos += 1;
                Some(".".to_string())
            }
            _ => None,
        };
        let Some(Token::Str(path)) = self.peek().cloned() else {
            return;
        };
        self.pos += 1;

        let Ok(path) = ModulePath::new(path) else {
            return;
        };
        let name = alias.unwrap_or_else(|| assumed_package_name(path.as_str()).to_string());
        if name != "_" && name != "." {
            imports.insert(name, path);
        }
    }

    /// After `type`: a single spec or a parenthesized group. Only aliases
    /// are kept.
    fn type_decl(&mut self, aliases: &mut Vec<(String, RawName)>) {
        if !self.eat_punct('(') {
            self.type_spec(aliases, false);
            return;
        }
        loop {
            self.skip_separators();
            if self.eat_punct(')') || self.peek().is_none() {
                return;
            }
            self.type_spec(aliases, true);
        }
    }

    fn type_spec(&mut self, aliases: &mut Vec<(String, RawName)>, grouped: bool) {
        let Some(Token::Ident(name)) = self.peek().cloned() else {
            self.pos += 1;
            return;
        };
        self.pos += 1;
        let is_alias = self.eat_punct('=');
        let body = self.spec_body(grouped);
        if is_alias {
            if let Some(target) = named_type(&body) {
                aliases.push((name, target));
            }
        }
    }

    /// After `var`: a single spec or a parenthesized group.
    fn var_decl(&mut self, specs: &mut Vec<VarSpec>) {
        if !self.eat_punct('(') {
            self.var_spec(specs, false);
            return;
        }
        loop {
            self.skip_separators();
            if self.eat_punct(')') || self.peek().is_none() {
                return;
            }
            self.var_spec(specs, true);
        }
    }

    /// One `a, b T = x, y` spec. Consumes up to the end of the spec, leaving
    /// a group's closing parenthesis in place.
    fn var_spec(&mut self, specs: &mut Vec<VarSpec>, grouped: bool) {
        let mut names = Vec::new();
        while let Some(Token::Ident(name)) = self.peek().cloned() {
            self.pos += 1;
            names.push(name);
            if !self.eat_punct(',') {
                break;
            }
            self.skip_separators();
        }
        if names.is_empty() {
            // Not a spec; step over the offending token.
            self.pos += 1;
            return;
        }

        let body = self.spec_body(grouped);
        let (type_part, values) = match body.iter().position(|t| *t == Token::Punct('=')) {
            Some(eq) => (&body[..eq], split_values(&body[eq + 1..])),
            None => (&body[..], Vec::new()),
        };

        let declared = named_type(type_part);
        for (i, name) in names.into_iter().enumerate() {
            let value = values.get(i).copied().unwrap_or(&[]);
            let (declared, dereferenced) = if type_part.is_empty() {
                let inferred = composite_literal_type(value).or_else(|| registry_constructor(value));
                (inferred, value.first() == Some(&Token::Punct('*')))
            } else {
                (declared.clone(), false)
            };
            specs.push(VarSpec {
                name,
                declared,
                dereferenced,
            });
        }
    }

    /// Tokens up to the end of the current spec.
    fn spec_body(&mut self, grouped: bool) -> Vec<Token> {
        let mut body = Vec::new();
        let mut depth = 0usize;
        while let Some(token) = self.peek().cloned() {
            match &token {
                Token::Punct(')') if grouped && depth == 0 => break,
                Token::Punct(';') if depth == 0 => break,
                Token::Newline if depth == 0 && ends_statement(body.last()) => break,
                Token::Punct('(' | '[' | '{') => depth += 1,
                Token::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.pos += 1;
            if token != Token::Newline {
                body.push(token);
            }
        }
        body
    }
}

/// Whether a line break after `last` terminates a statement.
fn ends_statement(last: Option<&Token>) -> bool {
    matches!(
        last,
        None | Some(Token::Ident(_))
            | Some(Token::Int(_))
            | Some(Token::Number)
            | Some(Token::Str(_))
            | Some(Token::Punct(')' | ']' | '}'))
    )
}

/// Split an initializer list at top-level commas.
fn split_values(tokens: &[Token]) -> Vec<&[Token]> {
    let mut values = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Punct('(' | '[' | '{') => depth += 1,
            Token::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
            Token::Punct(',') if depth == 0 => {
                values.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    values.push(&tokens[start..]);
    values
}

/// `T` or `pkg.T`, exactly.
fn named_type(tokens: &[Token]) -> Option<RawName> {
    match tokens {
        [Token::Ident(name)] if !KEYWORDS.contains(&name.as_str()) => Some((None, name.clone())),
        [Token::Ident(qualifier), Token::Punct('.'), Token::Ident(name)] => {
            Some((Some(qualifier.clone()), name.clone()))
        }
        _ => None,
    }
}

/// Type of a `T{...}` or `pkg.T{...}` composite literal.
fn composite_literal_type(tokens: &[Token]) -> Option<RawName> {
    let open = tokens.iter().position(|t| *t == Token::Punct('{'))?;
    if tokens.last() != Some(&Token::Punct('}')) {
        return None;
    }
    named_type(&tokens[..open])
}

/// `*pkg.NewFlagSet(...)`: the constructor's result dereferenced to a value.
fn registry_constructor(tokens: &[Token]) -> Option<RawName> {
    match tokens {
        [Token::Punct('*'), Token::Ident(qualifier), Token::Punct('.'), Token::Ident(func), call @ ..]
            if func == "NewFlagSet" && is_call_arguments(call) =>
        {
            Some((Some(qualifier.clone()), "FlagSet".to_string()))
        }
        _ => None,
    }
}

/// Whether `tokens` is exactly one parenthesized argument list.
fn is_call_arguments(tokens: &[Token]) -> bool {
    if tokens.first() != Some(&Token::Punct('(')) {
        return false;
    }
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Punct('(' | '[' | '{') => depth += 1,
            Token::Punct(')' | ']' | '}') => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1 == tokens.len();
                }
            }
            _ => {}
        }
    }
    false
}
