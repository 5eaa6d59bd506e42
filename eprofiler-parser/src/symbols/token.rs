//! Token definitions for the demangled-symbol sub-language.
//!
//! The tokens are defined using the logos derive macro. This sub-language is
//! the narrow surface produced by the eprofiler template instantiation
//! patterns: scope separators, template brackets, braced initializer lists,
//! array brackets, casts, quoted strings, suffixed integers and identifiers.

use logos::Logos;

/// All tokens of one demangled static-member symbol line.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t]+")]
pub enum Token {
    #[token("::")]
    Scope,
    #[token("<")]
    OpenAngle,
    #[token(">")]
    CloseAngle,
    #[token(",")]
    Comma,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,

    /// A double-quoted string; the payload excludes the quotes.
    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    Quoted(String),

    /// A signed decimal number with an optional case-insensitive integer
    /// suffix (`u`, `l`, `ul`, `ll`, `ull`, `lu`, `llu`), kept as spelled.
    #[regex(r"-?[0-9]+([uU][lL]{0,2}|[lL]{1,2}[uU]?)?", |lex| lex.slice().to_string())]
    Number(String),

    /// Identifier: letter-or-underscore followed by letters/digits/underscores.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

impl Token {
    /// Check if this token is an identifier with the given spelling.
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, Token::Ident(s) if s == name)
    }

    /// Spellings that may start a fundamental integer type.
    pub fn starts_fundamental(&self) -> bool {
        matches!(
            self,
            Token::Ident(s)
                if matches!(s.as_str(), "signed" | "unsigned" | "char" | "short" | "int" | "long")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos::Logos;

    fn lex_all(source: &str) -> Vec<Token> {
        Token::lexer(source).map(|t| t.expect("lex failed")).collect()
    }

    #[test]
    fn test_scope_and_brackets() {
        assert_eq!(
            lex_all("a::b<c>"),
            vec![
                Token::Ident("a".to_string()),
                Token::Scope,
                Token::Ident("b".to_string()),
                Token::OpenAngle,
                Token::Ident("c".to_string()),
                Token::CloseAngle,
            ]
        );
    }

    #[test]
    fn test_number_suffixes() {
        assert_eq!(lex_all("9ul"), vec![Token::Number("9ul".to_string())]);
        assert_eq!(lex_all("-42"), vec![Token::Number("-42".to_string())]);
        assert_eq!(lex_all("7ULL"), vec![Token::Number("7ULL".to_string())]);
    }

    #[test]
    fn test_quoted_string_with_literal_suffix() {
        assert_eq!(
            lex_all("\"GET\"_sc"),
            vec![
                Token::Quoted("GET".to_string()),
                Token::Ident("_sc".to_string()),
            ]
        );
    }

    #[test]
    fn test_whitespace_is_skipped() {
        assert_eq!(
            lex_all("long long int"),
            vec![
                Token::Ident("long".to_string()),
                Token::Ident("long".to_string()),
                Token::Ident("int".to_string()),
            ]
        );
    }
}
