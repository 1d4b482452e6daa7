//! Block-structured parser driver
//!
//! Groups tokens into lines, parses each line with the [statement] grammar and
//! resolves composite blocks. Errors never abort parsing: a malformed line is
//! reported once and skipped.

use chumsky::Parser as _;
use std::mem;

use crate::flohsm::diagnostics::{DiagnosticKind, Diagnostics};
use crate::flohsm::lexing::{Lexer, LocatedToken, Token};
use crate::flohsm::model::{State, FINAL_STATE, INITIAL_STATE};
use crate::flohsm::parsing::combinators::{ParserError, TokenLine};
use crate::flohsm::parsing::statements::{statement, Statement};

/// Fragments in release order plus everything reported while parsing
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub fragments: Vec<State>,
    pub diagnostics: Diagnostics,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Parse a whole descriptor
pub fn parse(source: &str) -> ParseOutput {
    parse_tokens(Lexer::new(source))
}

/// Parse an already lexed token stream.
///
/// A stream that does not end in a newline leaves its last statement
/// unterminated, which is reported as an unexpected end of file.
pub fn parse_tokens(tokens: impl IntoIterator<Item = LocatedToken>) -> ParseOutput {
    let statement = statement();
    let mut builder = FragmentBuilder::default();
    let mut line: Vec<TokenLine> = Vec::new();
    let mut token_count = 0usize;

    for located in tokens {
        token_count += 1;
        builder.last_line = located.line;

        if !located.token.is_newline() {
            line.push((located.token, located.line));
            continue;
        }
        if line.is_empty() {
            continue;
        }

        match statement.parse(mem::take(&mut line)) {
            Ok(parsed) => builder.apply(parsed),
            Err(errors) => builder.reject(errors, &located),
        }
    }

    let output = builder.finish(!line.is_empty());
    tracing::debug!(
        tokens = token_count,
        fragments = output.fragments.len(),
        errors = output.diagnostics.error_count(),
        "parsed descriptor"
    );
    output
}

/// An open `state NAME {` block
#[derive(Debug)]
struct Block {
    name: String,
    line: usize,
    children: Vec<State>,
}

#[derive(Debug, Default)]
struct FragmentBuilder {
    /// Children of closed blocks, in closing order
    released: Vec<State>,
    top_level: Vec<State>,
    blocks: Vec<Block>,
    diagnostics: Diagnostics,
    last_line: usize,
}

impl FragmentBuilder {
    fn container(&mut self) -> &mut Vec<State> {
        match self.blocks.last_mut() {
            Some(block) => &mut block.children,
            None => &mut self.top_level,
        }
    }

    fn apply(&mut self, statement: Statement) {
        match statement {
            Statement::Fragments(fragments) => self.container().extend(fragments),
            Statement::OpenComposite { name, line } => self.blocks.push(Block {
                name,
                line,
                children: Vec::new(),
            }),
            Statement::CloseComposite { line } => match self.blocks.pop() {
                Some(block) => self.close(block),
                None => self.unexpected(&Token::CloseBrace, line),
            },
        }
    }

    /// Release a finished block's children and add the composite to the enclosing container.
    ///
    /// A second `[*] -->` in the same block is kept as an extra fragment of the
    /// composite, so the analyzer reports the duplicate initial transition.
    fn close(&mut self, block: Block) {
        let mut composite =
            State::new(block.name.clone(), block.line).composite(!block.children.is_empty());
        let mut duplicates = Vec::new();

        for mut child in block.children {
            if child.name == INITIAL_STATE {
                let line = child.lineno.first().copied().unwrap_or(block.line);
                if let Some(initial) = child.initial_transition.take() {
                    if composite.initial_transition.is_none() {
                        composite.initial_transition = Some(initial);
                    } else {
                        duplicates.push(
                            State::new(block.name.clone(), line).with_initial_transition(initial),
                        );
                    }
                }
            } else if child.name == FINAL_STATE {
                self.released.push(child);
            } else {
                child.parent = Some(block.name.clone());
                self.released.push(child);
            }
        }

        let container = self.container();
        container.push(composite);
        container.extend(duplicates);
    }

    /// Record one diagnostic for a malformed line
    fn reject(&mut self, errors: Vec<ParserError>, newline: &LocatedToken) {
        let (token, line) = errors
            .first()
            .and_then(|error| error.found().cloned())
            .unwrap_or_else(|| (newline.token.clone(), newline.line));
        tracing::trace!(line, found = %token.kind_name(), "skipping malformed statement");
        self.unexpected(&token, line);
    }

    fn unexpected(&mut self, token: &Token, line: usize) {
        let text = token.to_string();
        let (kind, message) = match token {
            Token::LexError(_) => (
                DiagnosticKind::LexicalError,
                format!(
                    "Lexical error: illegal token '{}' (hex: {}) on line {}",
                    text.escape_debug(),
                    hex(&text),
                    line
                ),
            ),
            _ => (
                DiagnosticKind::SyntaxError,
                format!(
                    "Syntax error: unexpected token '{}' (hex: {}) of type {} on line {}",
                    text.escape_debug(),
                    hex(&text),
                    token.kind_name(),
                    line
                ),
            ),
        };
        self.diagnostics.report(kind, message, [line]);
    }

    /// Contents of blocks still open at end of input are discarded.
    fn finish(mut self, unterminated: bool) -> ParseOutput {
        if unterminated || !self.blocks.is_empty() {
            let line = self.last_line;
            self.diagnostics
                .report(DiagnosticKind::SyntaxError, "Unexpected end of file", [line]);
        }

        let mut fragments = self.released;
        fragments.extend(self.top_level);
        ParseOutput {
            fragments,
            diagnostics: self.diagnostics,
        }
    }
}

fn hex(text: &str) -> String {
    text.bytes().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flohsm::model::StateType;

    fn names(output: &ParseOutput) -> Vec<&str> {
        output.fragments.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_empty_source() {
        let output = parse("");
        assert!(output.fragments.is_empty());
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let output = parse("\n\nstate S\n\n");
        assert_eq!(names(&output), vec!["S"]);
        assert_eq!(output.fragments[0].lineno, vec![3]);
    }

    #[test]
    fn test_empty_block_is_not_composite() {
        let output = parse("state S {\n\n}");
        assert_eq!(names(&output), vec!["S"]);
        assert!(!output.fragments[0].is_composite);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_children_precede_composite() {
        let output = parse("state P {\n state C\n}\nstate Q");
        assert_eq!(names(&output), vec!["C", "P", "Q"]);
        assert_eq!(output.fragments[0].parent.as_deref(), Some("P"));
        assert!(output.fragments[1].is_composite);
        assert_eq!(output.fragments[1].parent, None);
    }

    #[test]
    fn test_nested_blocks_release_inner_first() {
        let output = parse("state A {\n state B {\n  state C\n }\n state D\n}");
        assert_eq!(names(&output), vec!["C", "B", "D", "A"]);
        assert_eq!(output.fragments[0].parent.as_deref(), Some("B"));
        assert_eq!(output.fragments[1].parent.as_deref(), Some("A"));
        assert_eq!(output.fragments[2].parent.as_deref(), Some("A"));
        assert_eq!(output.fragments[3].parent, None);
    }

    #[test]
    fn test_nested_initial_transition_is_hoisted() {
        let output = parse("state P {\n [*] --> C\n}");
        assert_eq!(names(&output), vec!["C", "P"]);
        let composite = &output.fragments[1];
        assert_eq!(
            composite.initial_transition.as_ref().map(|t| t.to_state.as_str()),
            Some("C")
        );
    }

    #[test]
    fn test_second_nested_initial_becomes_extra_fragment() {
        let output = parse("state P {\n [*] --> A\n [*] --> B\n}");
        assert_eq!(names(&output), vec!["A", "B", "P", "P"]);
        assert_eq!(output.fragments[3].lineno, vec![3]);
        assert_eq!(
            output.fragments[3]
                .initial_transition
                .as_ref()
                .map(|t| t.to_state.as_str()),
            Some("B")
        );
    }

    #[test]
    fn test_final_state_is_promoted() {
        let output = parse("state P {\n C --> [*] : E\n}");
        assert_eq!(names(&output), vec!["C", FINAL_STATE, "P"]);
        assert_eq!(output.fragments[0].parent.as_deref(), Some("P"));
        assert_eq!(output.fragments[1].parent, None);
    }

    #[test]
    fn test_choice_transition_marks_subject() {
        let output = parse("C --> T : <<choice>> [G]");
        assert_eq!(output.fragments[0].state_type, StateType::Choice);
    }

    #[test]
    fn test_one_error_per_malformed_line() {
        let output = parse("state S0 S1 {\n state S2\n }");
        assert_eq!(names(&output), vec!["S2"]);
        assert_eq!(output.diagnostics.error_count(), 2);
    }

    #[test]
    fn test_recovers_after_bad_line() {
        let output = parse("state S : : <<entry>> / A1\nstate S : <<entry>> / A1");
        assert_eq!(names(&output), vec!["S"]);
        assert_eq!(output.diagnostics.error_count(), 1);
        assert_eq!(output.fragments[0].lineno, vec![2]);
    }

    #[test]
    fn test_lexical_error_message() {
        let output = parse("state S ^");
        assert_eq!(
            output.diagnostics.messages(),
            vec!["Lexical error: illegal token '^' (hex: 5e) on line 1"]
        );
        assert_eq!(
            output.diagnostics.iter().next().map(|d| d.kind),
            Some(DiagnosticKind::LexicalError)
        );
    }

    #[test]
    fn test_syntax_error_message() {
        let output = parse("state S\nstate S S");
        assert_eq!(
            output.diagnostics.messages(),
            vec!["Syntax error: unexpected token 'S' (hex: 53) of type NAME on line 2"]
        );
    }

    #[test]
    fn test_missing_event_reports_newline() {
        let output = parse("F --> T\n");
        assert_eq!(
            output.diagnostics.messages(),
            vec!["Syntax error: unexpected token '\\n' (hex: 0a) of type NEWLINE on line 1"]
        );
    }

    #[test]
    fn test_unclosed_block() {
        let output = parse("state S {\n state T\n");
        assert_eq!(output.diagnostics.messages(), vec!["Unexpected end of file"]);
        assert!(output.fragments.is_empty());
    }

    #[test]
    fn test_unterminated_token_stream() {
        let tokens = vec![
            LocatedToken::new(Token::State, 1, 0..5),
            LocatedToken::new(Token::Name("S".to_string()), 1, 6..7),
        ];
        let output = parse_tokens(tokens);
        assert_eq!(output.diagnostics.messages(), vec!["Unexpected end of file"]);
    }

    #[test]
    fn test_stray_closing_brace() {
        let output = parse("}");
        assert_eq!(
            output.diagnostics.messages(),
            vec!["Syntax error: unexpected token '}' (hex: 7d) of type RBRACE on line 1"]
        );
    }
}
