//! Truth-table checks over guard expressions
//!
//! Every check enumerates all assignments of a [BitIndex] in ascending numeric
//! order, so the assignment named in a report is always the smallest offending one.
//! Tables are exponential in the number of distinct conditions: an index wider than
//! the configured limit is reported as [DiagnosticKind::GuardTooComplex] and skipped.
//! That report is an error, so a skipped table never lets an unproven machine through.

use crate::flohsm::diagnostics::{DiagnosticKind, Diagnostics};
use crate::flohsm::guard::{BitIndex, Guard, MAX_CONDITIONS};
use crate::flohsm::model::State;

/// Reports `index` as too complex when it exceeds `limit`.
/// Returns true when the caller may enumerate.
fn within_limit(
    index: &BitIndex,
    limit: usize,
    context: &str,
    diagnostics: &mut Diagnostics,
) -> bool {
    let limit = limit.min(MAX_CONDITIONS);
    if index.len() <= limit {
        return true;
    }
    diagnostics.report(
        DiagnosticKind::GuardTooComplex,
        format!(
            "Guard analysis for {} skipped: {} distinct conditions exceed the configured limit of {}",
            context,
            index.len(),
            limit
        ),
        [],
    );
    false
}

fn joined_expressions(guards: &[&Guard]) -> String {
    guards
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}

fn joined_lines(guards: &[&Guard]) -> String {
    guards
        .iter()
        .map(|g| g.line().to_string())
        .collect::<Vec<_>>()
        .join(" and ")
}

fn positive<'a>(guards: &[&'a Guard], assignment: u64, index: &BitIndex) -> Vec<&'a Guard> {
    guards
        .iter()
        .copied()
        .filter(|g| g.evaluate(assignment, Some(index)))
        .collect()
}

/// Guards checked for tautologies: entry, exit, then every event in sorted order
fn checked_guards(state: &State) -> Vec<&Guard> {
    let mut guards = Vec::new();
    guards.extend(state.entry.as_ref().and_then(|e| e.guard.as_ref()));
    guards.extend(state.exit.as_ref().and_then(|e| e.guard.as_ref()));
    for event in state.events() {
        guards.extend(state.guards_for_event(event));
    }
    guards
}

/// Warns about guards that are constant over all assignments of their own conditions
pub fn check_tautologies(states: &[State], limit: usize, diagnostics: &mut Diagnostics) {
    for state in states {
        for guard in checked_guards(state) {
            let index = BitIndex::for_guard(guard);
            let context = format!("guard {} (State {}, line {})", guard, state.name, guard.line());
            if !within_limit(&index, limit, &context, diagnostics) {
                continue;
            }

            let (always_true, never_true) = index.assignments().fold((true, true), |(t, f), a| {
                let result = guard.evaluate(a, Some(&index));
                (t && result, f && !result)
            });
            tracing::trace!(guard = %guard, always_true, never_true, "guard truth table");

            if always_true {
                diagnostics.report(
                    DiagnosticKind::GuardAlwaysTrue,
                    format!(
                        "Guard expression {} (State {}, line {}) always evaluates to true",
                        guard,
                        state.name,
                        guard.line()
                    ),
                    [guard.line()],
                );
            }
            if never_true {
                diagnostics.report(
                    DiagnosticKind::GuardAlwaysFalse,
                    format!(
                        "Guard expression {} (State {}, line {}) always evaluates to false",
                        guard,
                        state.name,
                        guard.line()
                    ),
                    [guard.line()],
                );
            }
        }
    }
}

/// Reports the first assignment under which two guards on the same event hold
pub fn check_ambiguous_transitions(states: &[State], limit: usize, diagnostics: &mut Diagnostics) {
    for state in states {
        for event in state.events() {
            let guards = state.guards_for_event(event);
            let index = BitIndex::for_guards(guards.iter().copied());
            let context = format!("event {} in {}", event, state.name);
            if !within_limit(&index, limit, &context, diagnostics) {
                continue;
            }

            let conflict = index.assignments().find_map(|a| {
                let hits = positive(&guards, a, &index);
                (hits.len() > 1).then_some((a, hits))
            });

            if let Some((assignment, hits)) = conflict {
                diagnostics.report(
                    DiagnosticKind::AmbiguousTransition,
                    format!(
                        "Ambiguous transition for event {} in {}: Guard expressions {} evaluate to true when {}. See lines {}",
                        event,
                        state.name,
                        joined_expressions(&hits),
                        index.describe(assignment),
                        joined_lines(&hits)
                    ),
                    hits.iter().map(|g| g.line()),
                );
            }
        }
    }
}

/// Every assignment of a choice pseudostate must select exactly one arm.
/// Each offending assignment is reported.
pub fn check_choice_transitions(states: &[State], limit: usize, diagnostics: &mut Diagnostics) {
    for state in states.iter().filter(|s| s.is_choice()) {
        let guards = state.choice_guards();
        let index = BitIndex::for_guards(guards.iter().copied());
        let context = format!("choice pseudo state {}", state.name);
        if !within_limit(&index, limit, &context, diagnostics) {
            continue;
        }

        for assignment in index.assignments() {
            let hits = positive(&guards, assignment, &index);
            if hits.len() > 1 {
                diagnostics.report(
                    DiagnosticKind::AmbiguousChoice,
                    format!(
                        "Ambiguous outgoing transition for choice pseudo state {}: Guard expressions {} evaluate to true when {}. See lines {}",
                        state.name,
                        joined_expressions(&hits),
                        index.describe(assignment),
                        joined_lines(&hits)
                    ),
                    hits.iter().map(|g| g.line()),
                );
            } else if hits.is_empty() && guards.len() > 1 {
                diagnostics.report(
                    DiagnosticKind::NoChoiceTransition,
                    format!(
                        "No outgoing transition for choice pseudo state {}: Guard expressions {} evaluate to false when {}. See lines {}",
                        state.name,
                        joined_expressions(&guards),
                        index.describe(assignment),
                        joined_lines(&guards)
                    ),
                    guards.iter().map(|g| g.line()),
                );
            }
        }
    }
}
