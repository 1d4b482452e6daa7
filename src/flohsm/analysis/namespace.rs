//! Name extraction and collision checks
//!
//! States, events, guard conditions and actions share one namespace in the
//! generated code, so the four name sets must be pairwise disjoint.

use std::collections::BTreeSet;

use crate::flohsm::diagnostics::{DiagnosticKind, Diagnostics};
use crate::flohsm::model::State;

/// Every name the model exposes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Names {
    /// In hierarchy order
    pub states: Vec<String>,
    pub events: BTreeSet<String>,
    pub guards: BTreeSet<String>,
    pub actions: BTreeSet<String>,
    pub prototypes: BTreeSet<String>,
}

pub fn collect_names(states: &[State]) -> Names {
    let mut names = Names::default();

    for state in states {
        names.states.push(state.name.clone());
        names.events.extend(state.events().into_iter().map(String::from));
        names
            .guards
            .extend(state.guards().into_iter().flat_map(|g| g.conditions()));
        for action in state.actions() {
            names.actions.insert(action.name.clone());
            names.prototypes.insert(action.prototype_string());
        }
    }

    names
}

pub fn check_collisions(names: &Names, diagnostics: &mut Diagnostics) {
    let mut collision = |message: String| {
        diagnostics.report(DiagnosticKind::NamespaceCollision, message, [])
    };

    for state in &names.states {
        if names.events.contains(state) {
            collision(format!("State name '{}' is also used as event name", state));
        }
        if names.guards.contains(state) {
            collision(format!("State name '{}' is also used as guard name", state));
        }
        if names.actions.contains(state) {
            collision(format!("State name '{}' is also used as action name", state));
        }
    }

    for event in &names.events {
        if names.guards.contains(event) {
            collision(format!("Event name '{}' is also used as guard name", event));
        }
        if names.actions.contains(event) {
            collision(format!("Event name '{}' is also used as action name", event));
        }
    }

    for guard in &names.guards {
        if names.actions.contains(guard) {
            collision(format!("Guard name '{}' is also used as action name", guard));
        }
    }
}
