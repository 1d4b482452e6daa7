//! Token definitions for the descriptor language
//!
//! This module defines all the tokens that can be produced by the lexer.
//! The tokens are defined using the logos derive macro for efficient tokenization.
use logos::Logos;
use std::fmt;

/// All possible tokens of the descriptor language
#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(skip r"[ \t\r]+")]
pub enum Token {
    // Reserved words. Case-insensitive, always reported in lowercase
    #[token("state", ignore(ascii_case))]
    State,
    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,

    // Markers
    #[token("[*]")]
    InitialOrFinal,
    #[token("<<choice>>")]
    Choice,
    #[token("<<entry>>")]
    Entry,
    #[token("<<exit>>")]
    Exit,
    #[token("-->")]
    Arrow,

    // Punctuation
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(":")]
    Colon,
    #[token("/")]
    Slash,
    #[token("!")]
    Not,
    #[token("&")]
    And,
    #[token("|")]
    Or,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_owned())]
    Name(String),

    // Float and int never match the same text, so `12.34` is never split
    #[regex(r"[+-]?[0-9]*\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().to_owned())]
    Float(String),
    #[regex(r"[+-]?(0[xX][0-9a-fA-F]+|[0-9]+)", |lex| lex.slice().to_owned())]
    Int(String),

    // Printable ASCII between quotes, escaped quotes allowed. Quotes are kept
    #[regex(r#""([ !#-\[\]-~]|\\[ -~])*""#, |lex| lex.slice().to_owned())]
    Str(String),

    /// One or more line breaks, carrying how many were collapsed
    #[regex(r"\n+", |lex| lex.slice().len())]
    Newline(usize),

    /// A single character no rule accepts. Never produced by logos itself,
    /// the [Lexer](super::Lexer) wrapper emits it.
    LexError(char),
}

impl Token {
    /// Upper-case kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::State => "STATE",
            Token::True => "TRUE",
            Token::False => "FALSE",
            Token::InitialOrFinal => "STATE_INITIAL_OR_FINAL",
            Token::Choice => "CHOICE",
            Token::Entry => "ENTRY",
            Token::Exit => "EXIT",
            Token::Arrow => "TRANSITION",
            Token::OpenBrace => "LBRACE",
            Token::CloseBrace => "RBRACE",
            Token::OpenBracket => "LBRACKET",
            Token::CloseBracket => "RBRACKET",
            Token::OpenParen => "LPAREN",
            Token::CloseParen => "RPAREN",
            Token::Colon => "COLON",
            Token::Slash => "FORWARD_SLASH",
            Token::Not => "NOT",
            Token::And => "AND",
            Token::Or => "OR",
            Token::Name(_) => "NAME",
            Token::Float(_) => "FLOAT",
            Token::Int(_) => "INT",
            Token::Str(_) => "STRING",
            Token::Newline(_) => "NEWLINE",
            Token::LexError(_) => "lexerror",
        }
    }

    /// Check if this token ends a statement
    pub fn is_newline(&self) -> bool {
        matches!(self, Token::Newline(_))
    }
}

/// Renders the token text as it would appear in (normalized) source
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::State => f.write_str("state"),
            Token::True => f.write_str("true"),
            Token::False => f.write_str("false"),
            Token::InitialOrFinal => f.write_str("[*]"),
            Token::Choice => f.write_str("<<choice>>"),
            Token::Entry => f.write_str("<<entry>>"),
            Token::Exit => f.write_str("<<exit>>"),
            Token::Arrow => f.write_str("-->"),
            Token::OpenBrace => f.write_str("{"),
            Token::CloseBrace => f.write_str("}"),
            Token::OpenBracket => f.write_str("["),
            Token::CloseBracket => f.write_str("]"),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::Colon => f.write_str(":"),
            Token::Slash => f.write_str("/"),
            Token::Not => f.write_str("!"),
            Token::And => f.write_str("&"),
            Token::Or => f.write_str("|"),
            Token::Name(text) | Token::Float(text) | Token::Int(text) | Token::Str(text) => {
                f.write_str(text)
            }
            Token::Newline(count) => f.write_str(&"\n".repeat(*count)),
            Token::LexError(c) => write!(f, "{}", c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(source: &str) -> Vec<Token> {
        Token::lexer(source).filter_map(|result| result.ok()).collect()
    }

    #[test]
    fn test_reserved_words_ignore_case() {
        assert_eq!(
            raw("state STATE State true TRUE fAlSe"),
            vec![
                Token::State,
                Token::State,
                Token::State,
                Token::True,
                Token::True,
                Token::False
            ]
        );
    }

    #[test]
    fn test_reserved_prefix_is_a_name() {
        assert_eq!(
            raw("states falsetto"),
            vec![
                Token::Name("states".to_string()),
                Token::Name("falsetto".to_string())
            ]
        );
    }

    #[test]
    fn test_newlines_collapse() {
        assert_eq!(raw("\n\n\n"), vec![Token::Newline(3)]);
    }

    #[test]
    fn test_initial_marker_beats_bracket() {
        assert_eq!(
            raw("[*] [G]"),
            vec![
                Token::InitialOrFinal,
                Token::OpenBracket,
                Token::Name("G".to_string()),
                Token::CloseBracket
            ]
        );
    }

    #[test]
    fn test_display_round_trips_markers() {
        for text in ["[*]", "<<choice>>", "<<entry>>", "<<exit>>", "-->"] {
            let tokens = raw(text);
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].to_string(), text);
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Token::Name("x".to_string()).kind_name(), "NAME");
        assert_eq!(Token::Newline(1).kind_name(), "NEWLINE");
        assert_eq!(Token::LexError('^').kind_name(), "lexerror");
    }
}
