//! Implementation of the descriptor lexer
//!
//! Wraps the logos lexer with line bookkeeping, single-character error
//! recovery and the synthetic end-of-input newline.

use crate::flohsm::lexing::tokens::Token;
use logos::Logos;
use std::ops::Range;

/// A token together with the line it starts on and its byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocatedToken {
    pub token: Token,
    pub line: usize,
    pub span: Range<usize>,
}

impl LocatedToken {
    pub fn new(token: Token, line: usize, span: Range<usize>) -> Self {
        Self { token, line, span }
    }
}

/// Streaming lexer over one descriptor.
///
/// Line numbers start at 1. The stream ends with exactly one synthetic
/// `Newline` whose span is empty and sits at the end of the source.
pub struct Lexer<'source> {
    source: &'source str,
    inner: logos::Lexer<'source, Token>,
    /// Byte offset of `inner`'s slice within `source`
    base: usize,
    line: usize,
    finished: bool,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            inner: Token::lexer(source),
            base: 0,
            line: 1,
            finished: false,
        }
    }

    /// Restart the lexer on new input.
    pub fn input(&mut self, source: &'source str) {
        *self = Self::new(source);
    }

    /// Current line, i.e. the line the next token starts on.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Produce the next token, or `None` once the synthetic newline was emitted.
    pub fn next_token(&mut self) -> Option<LocatedToken> {
        if self.finished {
            return None;
        }

        match self.inner.next() {
            Some(Ok(token)) => {
                let span = self.absolute(self.inner.span());
                let located = LocatedToken::new(token, self.line, span);
                if let Token::Newline(count) = located.token {
                    self.line += count;
                }
                Some(located)
            }
            Some(Err(())) => Some(self.recover()),
            None => {
                self.finished = true;
                let end = self.source.len();
                Some(LocatedToken::new(Token::Newline(1), self.line, end..end))
            }
        }
    }

    /// Emit the first offending character as a `LexError` and restart logos just after it.
    ///
    /// Logos may report an error span covering several characters; only the first
    /// one is consumed so nothing valid after it gets lost.
    fn recover(&mut self) -> LocatedToken {
        let start = self.base + self.inner.span().start;
        let offending = self.source[start..].chars().next().unwrap_or('\u{FFFD}');
        let end = start + offending.len_utf8();

        self.base = end.min(self.source.len());
        self.inner = Token::lexer(&self.source[self.base..]);

        LocatedToken::new(Token::LexError(offending), self.line, start..end)
    }

    fn absolute(&self, span: Range<usize>) -> Range<usize> {
        self.base + span.start..self.base + span.end
    }
}

impl Iterator for Lexer<'_> {
    type Item = LocatedToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Convenience function to tokenize a whole descriptor
pub fn tokenize(source: &str) -> Vec<LocatedToken> {
    Lexer::new(source).collect()
}
