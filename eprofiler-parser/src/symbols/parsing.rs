//! Deterministic parser for one demangled static-member symbol line.
//!
//! The grammar is the narrow shape produced by the eprofiler template
//! instantiation patterns:
//!
//! ```text
//! static_member    = (type "::")+ name ["()"] [cv_qualifiers]
//! type             = name ["<" template_args ">"]
//! template_arg     = literal_value | scoped_type_or_array
//! literal_value    = {"(" cast_type ")"} (integer | string | constructed)
//! constructed      = scoped_type_or_array initializer_list
//! initializer_list = "{" [literal_value {"," literal_value}] "}"
//! ```
//!
//! Parsing is single-pass recursive descent with one token of lookahead and
//! no backtracking. Any line that is not consumed exactly to end-of-input is
//! a [SymbolError::MalformedSymbolLine] carrying the raw line.

use std::ops::Range;

use crate::symbols::ast::{
    ArrayType, CvQualifier, InitializerList, Literal, LiteralValue, Member, MemberKind, Node, Type,
};
use crate::symbols::building;
use crate::symbols::error::SymbolError;
use crate::symbols::lexing;
use crate::symbols::token::Token;

/// Parse one symbol line into its AST root.
pub fn parse_line(line: &str) -> Result<Type, SymbolError> {
    let tokens = lexing::tokenize(line)?;
    Parser {
        line,
        tokens,
        pos: 0,
    }
    .parse_static_member()
}

struct Parser<'a> {
    line: &'a str,
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn err(&self, reason: impl Into<String>) -> SymbolError {
        SymbolError::malformed(self.line, reason)
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), SymbolError> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            _ => Err(self.err(format!("expected {}", what))),
        }
    }

    fn expect_ident(&mut self) -> Result<String, SymbolError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name),
            _ => Err(self.err("expected identifier")),
        }
    }

    /// `static_member = (type "::")+ name ["()"] [cv_qualifiers]`
    fn parse_static_member(mut self) -> Result<Type, SymbolError> {
        let mut scope: Vec<Type> = Vec::new();
        let member_name;
        loop {
            let name = self.expect_ident()?;
            let args = if self.peek() == Some(&Token::OpenAngle) {
                self.parse_template_args()?
            } else {
                Vec::new()
            };
            let component = Type {
                name,
                args,
                child: None,
                member: None,
            };
            if self.peek() == Some(&Token::Scope) {
                self.advance();
                scope.push(component);
            } else {
                // Terminal position: the member name, which is a plain
                // identifier, never a template.
                if !component.args.is_empty() {
                    return Err(self.err("member name cannot carry template arguments"));
                }
                member_name = component.name;
                break;
            }
        }

        let kind = if self.peek() == Some(&Token::OpenParen) {
            self.advance();
            self.expect(&Token::CloseParen, "')' closing the member signature")?;
            MemberKind::Function
        } else {
            MemberKind::Variable
        };

        let mut qualifiers = Vec::new();
        while let Some(Token::Ident(word)) = self.peek() {
            match word.as_str() {
                "const" => qualifiers.push(CvQualifier::Const),
                "volatile" => qualifiers.push(CvQualifier::Volatile),
                other => return Err(self.err(format!("unexpected trailing token `{}`", other))),
            }
            self.advance();
        }

        if self.pos != self.tokens.len() {
            return Err(self.err("trailing input after declaration"));
        }

        let mut chain = building::chain_types(scope)
            .ok_or_else(|| self.err("expected at least one scope level before the member"))?;
        building::attach_member(
            &mut chain,
            Member {
                name: member_name,
                kind,
                qualifiers,
            },
        );
        Ok(chain)
    }

    /// `"<" [template_arg {"," template_arg}] ">"`
    fn parse_template_args(&mut self) -> Result<Vec<Node>, SymbolError> {
        self.expect(&Token::OpenAngle, "'<' opening a template argument pack")?;
        let mut args = Vec::new();
        if self.peek() != Some(&Token::CloseAngle) {
            loop {
                args.push(self.parse_template_arg()?);
                if self.peek() == Some(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&Token::CloseAngle, "'>' closing a template argument pack")?;
        Ok(args)
    }

    /// One template argument: a literal value, or a scoped/array type that
    /// may be braced-initialized into a constructed literal.
    fn parse_template_arg(&mut self) -> Result<Node, SymbolError> {
        match self.peek() {
            Some(Token::Number(_)) => {
                let literal = self.parse_integer_literal()?;
                Ok(Node::Literal(literal))
            }
            Some(Token::Quoted(_)) => Ok(Node::Literal(self.parse_string_literal()?)),
            Some(Token::OpenParen) => Ok(Node::Literal(self.parse_cast_literal()?)),
            Some(Token::Ident(_)) => {
                let ty = self.parse_type_like()?;
                if self.peek() == Some(&Token::OpenBrace) {
                    let list = self.parse_initializer_list()?;
                    Ok(Node::Literal(building::constructed_value(ty, list)))
                } else {
                    Ok(ty)
                }
            }
            _ => Err(self.err("expected template argument")),
        }
    }

    /// `{"(" cast_type ")"} (integer | string | constructed)` with at least
    /// one leading cast. Casts stack append-only, outermost first.
    fn parse_cast_literal(&mut self) -> Result<Literal, SymbolError> {
        let mut casts = Vec::new();
        while self.peek() == Some(&Token::OpenParen) {
            self.advance();
            let target = self.parse_cast_target()?;
            self.expect(&Token::CloseParen, "')' closing a cast")?;
            casts.push(target);
        }
        let mut literal = match self.peek() {
            Some(Token::Number(_)) => self.parse_integer_literal()?,
            Some(Token::Quoted(_)) => self.parse_string_literal()?,
            Some(Token::Ident(_)) => {
                let ty = self.parse_type_like()?;
                let list = self.parse_initializer_list()?;
                building::constructed_value(ty, list)
            }
            _ => return Err(self.err("expected literal value after cast")),
        };
        literal.casts = casts;
        Ok(literal)
    }

    /// The type inside a C-style cast: fundamental or scoped.
    fn parse_cast_target(&mut self) -> Result<Type, SymbolError> {
        match self.peek() {
            Some(token) if token.starts_fundamental() => self.parse_fundamental(),
            Some(Token::Ident(_)) => self.parse_scoped_type(),
            _ => Err(self.err("expected type inside cast")),
        }
    }

    /// A fundamental integer, a scoped type, or either with an array suffix.
    fn parse_type_like(&mut self) -> Result<Node, SymbolError> {
        let ty = match self.peek() {
            Some(token) if token.starts_fundamental() => self.parse_fundamental()?,
            _ => self.parse_scoped_type()?,
        };
        if self.peek() == Some(&Token::OpenBracket) {
            self.advance();
            let len = self.parse_array_len()?;
            self.expect(&Token::CloseBracket, "']' closing an array bound")?;
            Ok(Node::Array(ArrayType { elem: ty, len }))
        } else {
            Ok(Node::Type(ty))
        }
    }

    /// `type {"::" type}` — left-associative, produces one chain.
    fn parse_scoped_type(&mut self) -> Result<Type, SymbolError> {
        let mut components = Vec::new();
        loop {
            let name = self.expect_ident()?;
            let args = if self.peek() == Some(&Token::OpenAngle) {
                self.parse_template_args()?
            } else {
                Vec::new()
            };
            components.push(Type {
                name,
                args,
                child: None,
                member: None,
            });
            if self.peek() == Some(&Token::Scope) {
                self.advance();
            } else {
                break;
            }
        }
        // components holds at least one entry by construction
        building::chain_types(components).ok_or_else(|| self.err("expected type"))
    }

    /// The closed set of built-in integer spellings, plus `long double`.
    fn parse_fundamental(&mut self) -> Result<Type, SymbolError> {
        let mut words: Vec<String> = Vec::new();
        if matches!(self.peek(), Some(t) if t.is_ident("signed") || t.is_ident("unsigned")) {
            words.push(self.expect_ident()?);
        }
        match self.peek() {
            Some(t) if t.is_ident("char") || t.is_ident("short") || t.is_ident("int") => {
                words.push(self.expect_ident()?);
            }
            Some(t) if t.is_ident("long") => {
                words.push(self.expect_ident()?);
                match self.peek() {
                    Some(t) if t.is_ident("int") => words.push(self.expect_ident()?),
                    Some(t) if t.is_ident("double") => words.push(self.expect_ident()?),
                    Some(t) if t.is_ident("long") => {
                        words.push(self.expect_ident()?);
                        match self.peek() {
                            Some(t) if t.is_ident("int") => words.push(self.expect_ident()?),
                            _ => return Err(self.err("expected `int` after `long long`")),
                        }
                    }
                    _ => {}
                }
            }
            _ => return Err(self.err("expected fundamental integer type")),
        }
        let spelled: Vec<&str> = words.iter().map(String::as_str).collect();
        // `long double` admits no sign prefix.
        if spelled.contains(&"double") && spelled.len() != 2 {
            return Err(self.err("invalid fundamental type spelling"));
        }
        Ok(building::fold_fundamental(&spelled))
    }

    /// `"{" [literal_value {"," literal_value}] "}"`
    fn parse_initializer_list(&mut self) -> Result<InitializerList, SymbolError> {
        self.expect(&Token::OpenBrace, "'{' opening an initializer list")?;
        let mut elems = Vec::new();
        if self.peek() != Some(&Token::CloseBrace) {
            loop {
                elems.push(self.parse_template_arg()?);
                if self.peek() == Some(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&Token::CloseBrace, "'}' closing an initializer list")?;
        Ok(InitializerList(elems))
    }

    /// A signed number with an optional case-insensitive integer suffix.
    fn parse_integer_literal(&mut self) -> Result<Literal, SymbolError> {
        let spelled = match self.advance() {
            Some(Token::Number(s)) => s,
            _ => return Err(self.err("expected integer literal")),
        };
        let digits_end = spelled
            .char_indices()
            .position(|(i, c)| i > 0 && !c.is_ascii_digit())
            .unwrap_or(spelled.len());
        let (digits, suffix) = spelled.split_at(digits_end);
        let value: i64 = digits
            .parse()
            .map_err(|_| self.err(format!("integer literal out of range: {}", spelled)))?;
        Ok(Literal {
            casts: Vec::new(),
            ty: None,
            value: LiteralValue::Integer(value),
            suffix: (!suffix.is_empty()).then(|| suffix.to_string()),
        })
    }

    /// A quoted string with an optional `_name` literal-operator suffix.
    fn parse_string_literal(&mut self) -> Result<Literal, SymbolError> {
        let payload = match self.advance() {
            Some(Token::Quoted(s)) => s,
            _ => return Err(self.err("expected string literal")),
        };
        let suffix = match self.peek() {
            Some(Token::Ident(name)) if name.starts_with('_') => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        };
        Ok(Literal {
            casts: Vec::new(),
            ty: None,
            value: LiteralValue::Str(payload),
            suffix,
        })
    }

    /// Array bound: a non-negative integer, suffix tolerated (`9ul`).
    fn parse_array_len(&mut self) -> Result<u64, SymbolError> {
        let spelled = match self.advance() {
            Some(Token::Number(s)) => s,
            _ => return Err(self.err("expected array length")),
        };
        let digits: String = spelled.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(self.err(format!("invalid array length: {}", spelled)));
        }
        digits
            .parse()
            .map_err(|_| self.err(format!("array length out of range: {}", spelled)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_variable_member() {
        let ast = parse_line("ns::Table<int, short>::offset").expect("parse failed");
        assert_eq!(ast.name, "ns");
        let table = ast.child.as_deref().unwrap();
        assert_eq!(table.name, "Table");
        assert_eq!(table.args.len(), 2);
        let member = table.member.as_ref().unwrap();
        assert_eq!(member.name, "offset");
        assert_eq!(member.kind, MemberKind::Variable);
        assert!(member.qualifiers.is_empty());
    }

    #[test]
    fn test_parses_const_function_member() {
        let ast = parse_line("ns::Tag<char>::to_id() const").expect("parse failed");
        let member = ast.tail().member.as_ref().unwrap();
        assert_eq!(member.name, "to_id");
        assert_eq!(member.kind, MemberKind::Function);
        assert_eq!(member.qualifiers, vec![CvQualifier::Const]);
    }

    #[test]
    fn test_parses_fundamental_template_args() {
        let ast = parse_line("ns::T<unsigned long long int, long double>::m").unwrap();
        let t = ast.tail();
        match (&t.args[0], &t.args[1]) {
            (Node::Type(a), Node::Type(b)) => {
                assert_eq!(a.name, "unsigned long long int");
                assert_eq!(b.name, "long double");
            }
            other => panic!("expected type arguments, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_cast_integer_literal() {
        let ast = parse_line("ns::T<(char)71>::m").unwrap();
        match &ast.tail().args[0] {
            Node::Literal(lit) => {
                assert_eq!(lit.casts.len(), 1);
                assert_eq!(lit.casts[0].name, "char");
                assert_eq!(lit.as_integer(), Some(71));
            }
            other => panic!("expected literal, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_stacked_casts_outermost_first() {
        let ast = parse_line("ns::T<(unsigned long)(char)5>::m").unwrap();
        match &ast.tail().args[0] {
            Node::Literal(lit) => {
                assert_eq!(lit.casts[0].name, "unsigned long");
                assert_eq!(lit.casts[1].name, "char");
            }
            other => panic!("expected literal, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_constructed_value_with_initializer_list() {
        let ast = parse_line("ns::T<ns::Name<9ul>{82, 101, 113}>::m").unwrap();
        match &ast.tail().args[0] {
            Node::Literal(lit) => {
                match lit.ty.as_deref() {
                    Some(Node::Type(ty)) => assert_eq!(ty.name, "ns"),
                    other => panic!("expected constructed type, got {:?}", other),
                }
                match &lit.value {
                    LiteralValue::List(list) => assert_eq!(list.0.len(), 3),
                    other => panic!("expected initializer list, got {:?}", other),
                }
            }
            other => panic!("expected literal, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_array_type_argument() {
        let ast = parse_line("ns::T<char [9]>::m").unwrap();
        match &ast.tail().args[0] {
            Node::Array(arr) => {
                assert_eq!(arr.elem.name, "char");
                assert_eq!(arr.len, 9);
            }
            other => panic!("expected array type, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_string_literal_with_operator_suffix() {
        let ast = parse_line("ns::T<\"GET\"_sc>::m").unwrap();
        match &ast.tail().args[0] {
            Node::Literal(lit) => {
                assert_eq!(lit.value, LiteralValue::Str("GET".to_string()));
                assert_eq!(lit.suffix.as_deref(), Some("_sc"));
            }
            other => panic!("expected literal, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_member_without_scope() {
        assert!(parse_line("to_id() const").is_err());
    }

    #[test]
    fn test_rejects_trailing_garbage() {
        let err = parse_line("ns::T::m const extra").unwrap_err();
        assert!(matches!(err, SymbolError::MalformedSymbolLine { .. }));
    }

    #[test]
    fn test_rejects_unbalanced_template_pack() {
        assert!(parse_line("ns::T<int::m").is_err());
    }

    #[test]
    fn test_negative_integer_argument() {
        let ast = parse_line("ns::T<-7l>::m").unwrap();
        match &ast.tail().args[0] {
            Node::Literal(lit) => {
                assert_eq!(lit.as_integer(), Some(-7));
                assert_eq!(lit.suffix.as_deref(), Some("l"));
            }
            other => panic!("expected literal, got {:?}", other),
        }
    }
}
