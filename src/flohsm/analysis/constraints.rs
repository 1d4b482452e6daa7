//! Structural rules for choice pseudostates
//!
//! A choice pseudostate only branches: no entry, no exit, no internal or state
//! transitions, and at least two outgoing choice transitions.

use crate::flohsm::diagnostics::{DiagnosticKind, Diagnostics};
use crate::flohsm::model::State;

pub fn check_choice_states(states: &[State], diagnostics: &mut Diagnostics) {
    for state in states.iter().filter(|s| s.is_choice()) {
        let lines = state
            .lineno
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" and ");
        let mut violation = |rule: &str| {
            diagnostics.report(
                DiagnosticKind::ChoiceConstraintViolation,
                format!("A choice pseudo state {}. See line(s) {}", rule, lines),
                state.lineno.clone(),
            )
        };

        if state.entry.is_some() {
            violation("cannot have an entry");
        }
        if state.exit.is_some() {
            violation("cannot have an exit");
        }
        if !state.internal_transitions.is_empty() {
            violation("cannot have any internal transitions");
        }
        if !state.state_transitions.is_empty() {
            violation("cannot have any state transitions");
        }
        if state.choice_transitions.len() < 2 {
            violation("must have at least two outgoing transitions");
        }
    }
}
