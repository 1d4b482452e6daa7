//! State hierarchy ordering and integrity
//!
//! Sorting is a layered topological sort: level 0 holds the states without a
//! parent, level k the states whose parent sits in level k-1. It is bounded by
//! the number of states; anything left unplaced means a cycle or an unknown
//! parent, and the merge order is kept instead.

use std::collections::{HashMap, HashSet};

use crate::flohsm::diagnostics::{DiagnosticKind, Diagnostics};
use crate::flohsm::model::State;

/// Order states parents-first, each level in merge order.
pub fn sort_hierarchically(states: &[State], diagnostics: &mut Diagnostics) -> Vec<State> {
    let mut sorted: Vec<State> = Vec::with_capacity(states.len());
    let mut level: Vec<&State> = states.iter().filter(|s| s.parent.is_none()).collect();

    for _ in 0..states.len() {
        if level.is_empty() || sorted.len() == states.len() {
            break;
        }
        let placed: HashSet<&str> = level.iter().map(|s| s.name.as_str()).collect();
        sorted.extend(level.into_iter().cloned());
        level = states
            .iter()
            .filter(|s| s.parent.as_deref().is_some_and(|p| placed.contains(p)))
            .collect();
    }

    if sorted.len() != states.len() {
        diagnostics.report(
            DiagnosticKind::HierarchyError,
            "Failed to sort states hierarchically. Continue with unsorted states.",
            [],
        );
        return states.to_vec();
    }

    sorted
}

/// Walk each state's parent chain, reporting unknown parents and cycles.
///
/// A cycle is reported for every state on it, citing the lines of the state
/// whose parent closes the loop. Walks are bounded by the number of states, so
/// a chain that loops without returning to its start is not followed forever.
pub fn check_integrity(states: &[State], diagnostics: &mut Diagnostics) {
    let by_name: HashMap<&str, &State> = states.iter().map(|s| (s.name.as_str(), s)).collect();

    for state in states {
        let mut current = state;
        for _ in 0..states.len() {
            let Some(parent) = current.parent.as_deref() else {
                break;
            };

            if parent == state.name {
                diagnostics.report(
                    DiagnosticKind::HierarchyError,
                    format!(
                        "Detected circular inheritance for state {} on line(s) {:?}",
                        state.name, current.lineno
                    ),
                    current.lineno.clone(),
                );
                break;
            }

            match by_name.get(parent) {
                Some(next) => current = next,
                None => {
                    diagnostics.report(
                        DiagnosticKind::HierarchyError,
                        format!(
                            "Detected unknown state '{}' at line(s) {:?}",
                            parent, state.lineno
                        ),
                        state.lineno.clone(),
                    );
                    break;
                }
            }
        }
    }
}
