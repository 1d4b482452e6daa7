//! Statement grammar for one logical line
//!
//! Each statement is parsed from the tokens of a single line, without the
//! terminating newline. The result is either finished fragments or a block
//! delimiter the [parser](super::parser) resolves against its block stack.

use chumsky::prelude::*;

use crate::flohsm::guard::Guard;
use crate::flohsm::lexing::Token;
use crate::flohsm::model::{
    Action, ChoiceTransition, EntryExit, InitialTransition, InternalTransition, State,
    StateTransition, StateType, INITIAL_STATE,
};
use crate::flohsm::parsing::combinators::{
    action, destination, name, token, ParserError, TokenLine,
};
use crate::flohsm::parsing::guards::guard_expression;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A single fragment, or a transition's subject followed by its destination stub
    Fragments(Vec<State>),
    /// `state NAME {`
    OpenComposite { name: String, line: usize },
    /// `}`
    CloseComposite { line: usize },
}

/// What follows the subject of a declaration-like statement
#[derive(Debug, Clone)]
enum Tail {
    Internal {
        event: String,
        guard: Option<Guard>,
        action: Action,
    },
    Entry(EntryExit),
    Exit(EntryExit),
}

impl Tail {
    fn into_fragment(self, name: String, line: usize) -> State {
        let state = State::new(name, line);
        match self {
            Tail::Internal {
                event,
                guard,
                action,
            } => state.with_internal_transition(InternalTransition::new(event, action, guard)),
            Tail::Entry(entry) => state.with_entry(entry),
            Tail::Exit(exit) => state.with_exit(exit),
        }
    }
}

/// Declaration forms that require the `state` keyword
#[derive(Debug, Clone)]
enum Declared {
    Plain,
    Choice,
    Composite,
    Tail(Tail),
}

/// `[guard]`
fn guard_clause() -> impl Parser<TokenLine, Guard, Error = ParserError> + Clone {
    guard_expression().delimited_by(token(Token::OpenBracket), token(Token::CloseBracket))
}

/// `/ action`
fn action_clause() -> impl Parser<TokenLine, Action, Error = ParserError> + Clone {
    token(Token::Slash).ignore_then(action())
}

/// `: EVENT [guard] / action`, `: <<entry>> [guard] / action` or `: <<exit>> [guard] / action`
fn tail() -> impl Parser<TokenLine, Tail, Error = ParserError> + Clone {
    let entry = token(Token::Colon)
        .ignore_then(token(Token::Entry))
        .ignore_then(guard_clause().or_not())
        .then(action_clause())
        .map(|(guard, action)| Tail::Entry(EntryExit::new(action, guard)));

    let exit = token(Token::Colon)
        .ignore_then(token(Token::Exit))
        .ignore_then(guard_clause().or_not())
        .then(action_clause())
        .map(|(guard, action)| Tail::Exit(EntryExit::new(action, guard)));

    let internal = token(Token::Colon)
        .ignore_then(name())
        .then(guard_clause().or_not())
        .then(action_clause())
        .map(|(((event, _), guard), action)| Tail::Internal {
            event,
            guard,
            action,
        });

    choice((entry, exit, internal))
}

/// `state NAME`, `state NAME <<choice>>`, `state NAME {` and keyword-prefixed tails
fn declaration() -> impl Parser<TokenLine, Statement, Error = ParserError> + Clone {
    token(Token::State)
        .ignore_then(name())
        .then(choice((
            token(Token::OpenBrace).to(Declared::Composite),
            token(Token::Choice).to(Declared::Choice),
            tail().map(Declared::Tail),
            empty().to(Declared::Plain),
        )))
        .map(|((name, line), declared)| match declared {
            Declared::Composite => Statement::OpenComposite { name, line },
            Declared::Choice => Statement::Fragments(vec![
                State::new(name, line).with_state_type(StateType::Choice)
            ]),
            Declared::Tail(tail) => Statement::Fragments(vec![tail.into_fragment(name, line)]),
            Declared::Plain => Statement::Fragments(vec![State::new(name, line)]),
        })
}

/// `NAME : ...` without the keyword
fn undeclared_tail() -> impl Parser<TokenLine, Statement, Error = ParserError> + Clone {
    name()
        .then(tail())
        .map(|((name, line), tail)| Statement::Fragments(vec![tail.into_fragment(name, line)]))
}

/// `FROM --> TO : <<choice>> [guard] / action`
fn choice_transition() -> impl Parser<TokenLine, Statement, Error = ParserError> + Clone {
    name()
        .then_ignore(token(Token::Arrow))
        .then(name())
        .then_ignore(token(Token::Colon))
        .then_ignore(token(Token::Choice))
        .then(guard_clause())
        .then(action_clause().or_not())
        .map(|((((from, from_line), (to, to_line)), guard), action)| {
            let subject = State::new(from, from_line)
                .with_state_type(StateType::Choice)
                .with_choice_transition(ChoiceTransition::new(to.clone(), guard, action));
            Statement::Fragments(vec![subject, State::new(to, to_line)])
        })
}

/// `FROM --> TO : EVENT [guard] / action`. The event is mandatory.
fn state_transition() -> impl Parser<TokenLine, Statement, Error = ParserError> + Clone {
    name()
        .then_ignore(token(Token::Arrow))
        .then(destination())
        .then_ignore(token(Token::Colon))
        .then(name())
        .then(guard_clause().or_not())
        .then(action_clause().or_not())
        .map(
            |(((((from, from_line), (to, to_line)), (event, _)), guard), action)| {
                let subject = State::new(from, from_line).with_state_transition(
                    StateTransition::new(event, to.clone(), action, guard),
                );
                Statement::Fragments(vec![subject, State::new(to, to_line)])
            },
        )
}

/// `[*] --> TO : action`. No guard, no event, at most one bare action.
fn initial_transition() -> impl Parser<TokenLine, Statement, Error = ParserError> + Clone {
    token(Token::InitialOrFinal)
        .then_ignore(token(Token::Arrow))
        .then(destination())
        .then(token(Token::Colon).ignore_then(action()).or_not())
        .map(|((line, (to, to_line)), action)| {
            let subject = State::new(INITIAL_STATE, line)
                .with_initial_transition(InitialTransition::new(to.clone(), action));
            Statement::Fragments(vec![subject, State::new(to, to_line)])
        })
}

/// Any statement, which must consume the whole line
pub fn statement() -> impl Parser<TokenLine, Statement, Error = ParserError> + Clone {
    let close = token(Token::CloseBrace).map(|line| Statement::CloseComposite { line });

    choice((
        declaration(),
        close,
        initial_transition(),
        choice_transition(),
        state_transition(),
        undeclared_tail(),
    ))
    .then_ignore(end())
}
