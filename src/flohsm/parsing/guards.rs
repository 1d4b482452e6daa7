//! Guard expression grammar
//!
//! Precedence, lowest to highest: `|`, `&`, prefix `!`. Binary operators are
//! left associative, so `a | b & c` is `a | (b & c)` and `!a & b` is `(!a) & b`.

use chumsky::prelude::*;

use crate::flohsm::guard::Guard;
use crate::flohsm::lexing::tokenize;
use crate::flohsm::lexing::Token;
use crate::flohsm::parsing::combinators::{name, token, ParserError, TokenLine};

/// Parse a guard expression (without the surrounding brackets)
pub fn guard_expression() -> impl Parser<TokenLine, Guard, Error = ParserError> + Clone {
    recursive(|guard| {
        let atom = name()
            .map(|(name, line)| Guard::simple(name, line))
            .or(guard.delimited_by(token(Token::OpenParen), token(Token::CloseParen)));

        let negation = token(Token::Not)
            .repeated()
            .then(atom)
            .foldr(|_, operand| Guard::not(operand));

        let conjunction = negation
            .clone()
            .then(token(Token::And).ignore_then(negation).repeated())
            .foldl(Guard::and);

        conjunction
            .clone()
            .then(token(Token::Or).ignore_then(conjunction).repeated())
            .foldl(Guard::or)
    })
}

/// Parse a standalone guard expression such as `A & !(B | C)`
pub fn parse_guard(source: &str) -> Result<Guard, Vec<ParserError>> {
    let tokens: Vec<TokenLine> = tokenize(source)
        .into_iter()
        .filter(|t| !t.token.is_newline())
        .map(|t| (t.token, t.line))
        .collect();
    guard_expression().then_ignore(end()).parse(tokens)
}
