//! Lexer
//!
//!     Tokenization of descriptor text is done through the logos lexer library. The
//!     grammar is line oriented, so the lexer keeps line numbers for every token and
//!     collapses runs of line breaks into a single `Newline` carrying the count.
//!
//!     Two behaviors sit on top of logos, in [lexer::Lexer]:
//!     - An unrecognized character becomes a single `LexError` token and lexing resumes
//!       right after it, so the parser can report it and resynchronize.
//!     - Exactly one synthetic `Newline` is injected at end of input, so a statement on
//!       the last line does not need a trailing line break.

pub mod lexer;
pub mod tokens;

pub use lexer::{tokenize, Lexer, LocatedToken};
pub use tokens::Token;
