//! Parser
//!
//!     The descriptor grammar is line oriented: every statement ends with a newline and
//!     composite blocks open with `{` at the end of a line and close with a lone `}`.
//!     Parsing is therefore split in two layers:
//!
//!     - [statements] is a chumsky grammar for one logical line (declarations, entry/exit,
//!       internal transitions, state/initial/choice transitions, block delimiters). Guard
//!       expressions come from [guards], with precedence `|` < `&` < `!`.
//!     - [parser] groups the token stream into lines, feeds each line to the statement
//!       grammar and keeps a stack of open composite blocks. A malformed line yields exactly
//!       one diagnostic and parsing resumes on the next line.
//!
//! Fragments
//!
//!     The output is an unordered list of [State](crate::flohsm::model::State) fragments.
//!     Every `X --> Y` statement yields a fragment for `X` carrying the transition and a
//!     bare stub for `Y`, so every transition target exists as a state. When a block
//!     closes, its children are released (with `parent` set) before the composite itself;
//!     a direct `[*] --> X` child becomes the composite's initial transition and final
//!     pseudostates are always released without a parent.

pub mod combinators;
pub mod guards;
pub mod parser;
pub mod statements;

pub use guards::parse_guard;
pub use parser::{parse, parse_tokens, ParseOutput};
