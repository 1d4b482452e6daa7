//! Reachability from the top-level initial pseudostate
//!
//! A state is reachable when the initial pseudostate leads to it through initial,
//! state or choice transitions. Entering a state also activates all of its ancestors,
//! so the parent link counts as an edge and ancestors' transitions are followed too.

use std::collections::{BTreeSet, HashMap};

use crate::flohsm::diagnostics::{DiagnosticKind, Diagnostics};
use crate::flohsm::model::{State, INITIAL_STATE};

/// Names of every state reachable from `root`, `root` included.
/// Targets that name no known state are ignored.
pub fn reachable_states<'a>(states: &'a [State], root: &str) -> BTreeSet<&'a str> {
    let by_name: HashMap<&str, &State> = states.iter().map(|s| (s.name.as_str(), s)).collect();

    let mut visited = BTreeSet::new();
    let mut pending: Vec<&State> = by_name.get(root).copied().into_iter().collect();

    while let Some(state) = pending.pop() {
        if !visited.insert(state.name.as_str()) {
            continue;
        }
        let edges = state.parent.as_deref().into_iter().chain(state.targets());
        pending.extend(
            edges
                .filter(|name| !visited.contains(name))
                .filter_map(|name| by_name.get(name).copied()),
        );
    }

    visited
}

pub fn check_reachability(states: &[State], diagnostics: &mut Diagnostics) {
    if !states.iter().any(|s| s.name == INITIAL_STATE) {
        diagnostics.report(
            DiagnosticKind::MissingTopLevelInitial,
            "No top-level initial transition found",
            [],
        );
        return;
    }

    let reachable = reachable_states(states, INITIAL_STATE);
    tracing::debug!(
        reachable = reachable.len(),
        total = states.len(),
        "reachability computed"
    );

    for state in states
        .iter()
        .filter(|s| !reachable.contains(s.name.as_str()))
    {
        diagnostics.report(
            DiagnosticKind::UnreachableState,
            format!("State '{}' (line(s) {:?}) is not reachable", state.name, state.lineno),
            state.lineno.clone(),
        );
    }
}
