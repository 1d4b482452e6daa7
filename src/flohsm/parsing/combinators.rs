//! Parser combinator functions shared by the guard and statement grammars.

use chumsky::prelude::*;

use crate::flohsm::lexing::Token;
use crate::flohsm::model::{Action, ActionType, FINAL_STATE};

/// Type alias for token with the line it starts on
pub type TokenLine = (Token, usize);

/// Type alias for parser error
pub type ParserError = Simple<TokenLine>;

fn unexpected(span: std::ops::Range<usize>, found: TokenLine) -> ParserError {
    Simple::expected_input_found(span, Vec::new(), Some(found))
}

/// Helper: match a specific token, yielding its line
pub fn token(t: Token) -> impl Parser<TokenLine, usize, Error = ParserError> + Clone {
    filter(move |(tok, _): &TokenLine| tok == &t).map(|(_, line)| line)
}

/// Parse a NAME, yielding its text and line
pub fn name() -> impl Parser<TokenLine, (String, usize), Error = ParserError> + Clone {
    filter_map(|span, (tok, line): TokenLine| match tok {
        Token::Name(name) => Ok((name, line)),
        other => Err(unexpected(span, (other, line))),
    })
}

/// Parse a transition destination: a NAME or `[*]` (the final pseudostate)
pub fn destination() -> impl Parser<TokenLine, (String, usize), Error = ParserError> + Clone {
    name().or(token(Token::InitialOrFinal).map(|line| (FINAL_STATE.to_string(), line)))
}

/// Parse an action argument literal. The token kind decides the argument type.
pub fn literal() -> impl Parser<TokenLine, (ActionType, String), Error = ParserError> + Clone {
    filter_map(|span, (tok, line): TokenLine| match tok {
        Token::Int(value) => Ok((ActionType::Int, value)),
        Token::Float(value) => Ok((ActionType::Float, value)),
        Token::Str(value) => Ok((ActionType::String, value)),
        Token::True => Ok((ActionType::Bool, "true".to_string())),
        Token::False => Ok((ActionType::Bool, "false".to_string())),
        other => Err(unexpected(span, (other, line))),
    })
}

/// Parse an action: `NAME` or `NAME(literal)`
pub fn action() -> impl Parser<TokenLine, Action, Error = ParserError> + Clone {
    name()
        .then(
            literal()
                .delimited_by(token(Token::OpenParen), token(Token::CloseParen))
                .or_not(),
        )
        .map(|((name, _), argument)| match argument {
            Some((action_type, value)) => Action::with_argument(name, action_type, value),
            None => Action::new(name),
        })
}
