//! Fragment merging
//!
//! Fragments sharing a name fold into one canonical state, in first-seen order.
//! Transition lists concatenate; entry, exit and initial transition may each be
//! supplied by at most one fragment; parents must agree when both are set.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::flohsm::diagnostics::{DiagnosticKind, Diagnostics};
use crate::flohsm::model::{State, StateType};

/// The single-valued parts of a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatePart {
    Entry,
    Exit,
    InitialTransition,
}

impl fmt::Display for StatePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatePart::Entry => write!(f, "entry"),
            StatePart::Exit => write!(f, "exit"),
            StatePart::InitialTransition => write!(f, "initial transition"),
        }
    }
}

/// Why two fragments could not be merged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeConflict {
    #[error("Unable to merge states with different names ({existing} and {incoming}). Possibly involved line(s): {lines:?}")]
    Names {
        existing: String,
        incoming: String,
        lines: Vec<usize>,
    },

    #[error("Unable to merge different parents {existing} and {incoming} for state {state}. Possibly involved line(s): {lines:?}")]
    Parents {
        state: String,
        existing: String,
        incoming: String,
        lines: Vec<usize>,
    },

    #[error("Unable to merge. Only one {part} is allowed for state {state}, but detected two. Possibly involved line(s): {lines:?}")]
    Duplicate {
        state: String,
        part: StatePart,
        lines: Vec<usize>,
    },
}

impl MergeConflict {
    /// Lines of both fragments involved
    pub fn lines(&self) -> &[usize] {
        match self {
            MergeConflict::Names { lines, .. }
            | MergeConflict::Parents { lines, .. }
            | MergeConflict::Duplicate { lines, .. } => lines,
        }
    }
}

/// `Some(merged)` when at most one side is set, `None` when both are
fn exclusive<T: Clone>(existing: &Option<T>, incoming: &Option<T>) -> Option<Option<T>> {
    match (existing, incoming) {
        (Some(_), Some(_)) => None,
        (Some(value), None) | (None, Some(value)) => Some(Some(value.clone())),
        (None, None) => Some(None),
    }
}

/// Merge `incoming` into `canonical`, returning the combined state.
///
/// Neither input is modified, so on conflict the caller still holds the
/// canonical state unchanged.
pub fn merge(canonical: &State, incoming: &State) -> Result<State, MergeConflict> {
    let lines: Vec<usize> = canonical
        .lineno
        .iter()
        .chain(&incoming.lineno)
        .copied()
        .collect();

    if canonical.name != incoming.name {
        return Err(MergeConflict::Names {
            existing: canonical.name.clone(),
            incoming: incoming.name.clone(),
            lines,
        });
    }

    let parent = match (&canonical.parent, &incoming.parent) {
        (Some(existing), Some(other)) if existing != other => {
            return Err(MergeConflict::Parents {
                state: canonical.name.clone(),
                existing: existing.clone(),
                incoming: other.clone(),
                lines,
            })
        }
        (Some(existing), _) => Some(existing.clone()),
        (None, other) => other.clone(),
    };

    let duplicate = |part| MergeConflict::Duplicate {
        state: canonical.name.clone(),
        part,
        lines: lines.clone(),
    };
    let entry = exclusive(&canonical.entry, &incoming.entry)
        .ok_or_else(|| duplicate(StatePart::Entry))?;
    let exit =
        exclusive(&canonical.exit, &incoming.exit).ok_or_else(|| duplicate(StatePart::Exit))?;
    let initial_transition =
        exclusive(&canonical.initial_transition, &incoming.initial_transition)
            .ok_or_else(|| duplicate(StatePart::InitialTransition))?;

    let state_type = if canonical.is_choice() || incoming.is_choice() {
        StateType::Choice
    } else {
        StateType::Normal
    };

    Ok(State {
        name: canonical.name.clone(),
        parent,
        lineno: lines,
        entry,
        exit,
        initial_transition,
        internal_transitions: [
            canonical.internal_transitions.as_slice(),
            incoming.internal_transitions.as_slice(),
        ]
        .concat(),
        state_transitions: [
            canonical.state_transitions.as_slice(),
            incoming.state_transitions.as_slice(),
        ]
        .concat(),
        choice_transitions: [
            canonical.choice_transitions.as_slice(),
            incoming.choice_transitions.as_slice(),
        ]
        .concat(),
        is_composite: canonical.is_composite || incoming.is_composite,
        state_type,
    })
}

/// Fold fragments into canonical states, keeping first-seen order.
pub fn merge_fragments(fragments: &[State], diagnostics: &mut Diagnostics) -> Vec<State> {
    let mut merged: Vec<State> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for fragment in fragments {
        match positions.get(fragment.name.as_str()).copied() {
            Some(at) => match merge(&merged[at], fragment) {
                Ok(state) => merged[at] = state,
                Err(conflict) => diagnostics.report(
                    DiagnosticKind::MergeConflict,
                    conflict.to_string(),
                    conflict.lines().to_vec(),
                ),
            },
            None => {
                positions.insert(&fragment.name, merged.len());
                merged.push(fragment.clone());
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flohsm::guard::Guard;
    use crate::flohsm::model::{
        Action, ChoiceTransition, EntryExit, InitialTransition, InternalTransition,
        StateTransition,
    };

    fn entry(action: &str) -> EntryExit {
        EntryExit::new(Action::new(action), Some(Guard::simple("G1", 0)))
    }

    #[test]
    fn test_plain_duplicates_merge() {
        let merged = merge(&State::new("S", 1), &State::new("S", 2)).unwrap();
        assert_eq!(merged.name, "S");
        assert_eq!(merged.lineno, vec![1, 2]);
    }

    #[test]
    fn test_different_names_conflict() {
        let conflict = merge(&State::new("S1", 1), &State::new("S2", 2)).unwrap_err();
        assert_eq!(
            conflict.to_string(),
            "Unable to merge states with different names (S1 and S2). Possibly involved line(s): [1, 2]"
        );
    }

    #[test]
    fn test_parent_conflict() {
        let existing = State::new("S", 7880).with_parent("P1");
        let incoming = State::new("S", 6312).with_parent("P2");
        let conflict = merge(&existing, &incoming).unwrap_err();
        assert_eq!(
            conflict.to_string(),
            "Unable to merge different parents P1 and P2 for state S. Possibly involved line(s): [7880, 6312]"
        );
    }

    #[test]
    fn test_unset_parent_yields() {
        let with_parent = State::new("S", 1).with_parent("P");
        let without = State::new("S", 2);
        assert_eq!(
            merge(&without, &with_parent).unwrap().parent.as_deref(),
            Some("P")
        );
        assert_eq!(
            merge(&with_parent, &without).unwrap().parent.as_deref(),
            Some("P")
        );
        assert_eq!(
            merge(&with_parent, &with_parent).unwrap().parent.as_deref(),
            Some("P")
        );
    }

    #[test]
    fn test_single_valued_parts_conflict() {
        let cases = [
            (
                State::new("S", 1).with_entry(entry("A1")),
                State::new("S", 2).with_entry(entry("A1")),
                "Unable to merge. Only one entry is allowed for state S, but detected two. Possibly involved line(s): [1, 2]",
            ),
            (
                State::new("S", 1).with_exit(entry("A1")),
                State::new("S", 2).with_exit(entry("A2")),
                "Unable to merge. Only one exit is allowed for state S, but detected two. Possibly involved line(s): [1, 2]",
            ),
            (
                State::new("S", 1).with_initial_transition(InitialTransition::new("T1", None)),
                State::new("S", 2).with_initial_transition(InitialTransition::new("T2", None)),
                "Unable to merge. Only one initial transition is allowed for state S, but detected two. Possibly involved line(s): [1, 2]",
            ),
        ];

        for (existing, incoming, message) in cases {
            assert_eq!(merge(&existing, &incoming).unwrap_err().to_string(), message);
        }
    }

    #[test]
    fn test_single_valued_parts_move_over() {
        let merged = merge(
            &State::new("S", 1).with_exit(entry("A2")),
            &State::new("S", 2)
                .with_entry(entry("A1"))
                .with_initial_transition(InitialTransition::new("T", None)),
        )
        .unwrap();
        assert_eq!(merged.entry, Some(entry("A1")));
        assert_eq!(merged.exit, Some(entry("A2")));
        assert_eq!(
            merged.initial_transition,
            Some(InitialTransition::new("T", None))
        );
    }

    #[test]
    fn test_transitions_concatenate() {
        let existing = State::new("S", 1)
            .with_internal_transition(InternalTransition::new("E1", Action::new("A1"), None))
            .with_state_transition(StateTransition::new("E1", "T1", None, None));
        let incoming = State::new("S", 2)
            .with_internal_transition(InternalTransition::new("E1", Action::new("A1"), None))
            .with_state_transition(StateTransition::new("E2", "T2", None, None))
            .with_choice_transition(ChoiceTransition::new("T3", Guard::simple("G", 2), None));

        let merged = merge(&existing, &incoming).unwrap();
        assert_eq!(merged.internal_transitions.len(), 2);
        assert_eq!(
            merged
                .state_transitions
                .iter()
                .map(|t| t.to_state.as_str())
                .collect::<Vec<_>>(),
            vec!["T1", "T2"]
        );
        assert_eq!(merged.choice_transitions.len(), 1);
    }

    #[test]
    fn test_choice_and_composite_are_sticky() {
        let merged = merge(
            &State::new("S", 1).composite(true),
            &State::new("S", 2).with_state_type(StateType::Choice),
        )
        .unwrap();
        assert!(merged.is_composite);
        assert!(merged.is_choice());

        let merged = merge(
            &State::new("S", 1).with_state_type(StateType::Choice),
            &State::new("S", 2),
        )
        .unwrap();
        assert!(merged.is_choice());
    }

    #[test]
    fn test_first_seen_is_kept_on_conflict() {
        let fragments = vec![
            State::new("S", 1).with_parent("P1"),
            State::new("T", 2),
            State::new("S", 3).with_parent("P2"),
            State::new("S", 4),
        ];
        let mut diagnostics = Diagnostics::new();
        let merged = merge_fragments(&fragments, &mut diagnostics);

        assert_eq!(
            merged.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["S", "T"]
        );
        assert_eq!(merged[0].parent.as_deref(), Some("P1"));
        assert_eq!(merged[0].lineno, vec![1, 4]);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(
            diagnostics.iter().next().map(|d| d.lines.clone()),
            Some(vec![1, 3])
        );
    }
}
