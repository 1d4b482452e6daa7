//! Semantic analysis
//!
//!     Turns the parser's fragment list into the validated [Model]. Phases run strictly in
//!     order and each one records into the same [Diagnostics] collector. No phase stops the
//!     run: later phases work on best-effort data so one pass reports every problem.
//!
//!     1. [merge]: fold fragments sharing a name into canonical states.
//!     2. [hierarchy]: order states parents-first (falls back to merge order on failure).
//!     3. [constraints]: structural rules for choice pseudostates.
//!     4. [namespace]: collect state/event/guard/action names and check they are disjoint.
//!     5-7. [guards]: tautology/contradiction warnings, ambiguous event transitions,
//!        ambiguous or incomplete choice arms.
//!     8. [hierarchy]: unknown parents and circular inheritance.
//!     9. [reachability]: every state must be reachable from the top-level initial pseudostate.
//!
//!     Analysis never mutates its input, so running it twice on the same fragments yields
//!     identical models and diagnostics.

pub mod constraints;
pub mod guards;
pub mod hierarchy;
pub mod merge;
pub mod namespace;
pub mod reachability;

use crate::flohsm::config::AnalysisConfig;
use crate::flohsm::diagnostics::Diagnostics;
use crate::flohsm::model::{Model, State};

pub use merge::{merge, MergeConflict};

/// Validated model plus everything reported while analyzing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub model: Model,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    /// True when no error was reported. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Run every analysis phase over a fragment list
pub fn analyze(fragments: &[State], config: &AnalysisConfig) -> Analysis {
    let mut diagnostics = Diagnostics::new();
    let limit = config.condition_limit();

    let merged = merge::merge_fragments(fragments, &mut diagnostics);
    let states = hierarchy::sort_hierarchically(&merged, &mut diagnostics);
    tracing::debug!(
        fragments = fragments.len(),
        states = states.len(),
        "merged and sorted states"
    );

    constraints::check_choice_states(&states, &mut diagnostics);

    let names = namespace::collect_names(&states);
    namespace::check_collisions(&names, &mut diagnostics);

    guards::check_tautologies(&states, limit, &mut diagnostics);
    guards::check_ambiguous_transitions(&states, limit, &mut diagnostics);
    guards::check_choice_transitions(&states, limit, &mut diagnostics);

    hierarchy::check_integrity(&merged, &mut diagnostics);
    reachability::check_reachability(&states, &mut diagnostics);

    tracing::debug!(
        errors = diagnostics.error_count(),
        warnings = diagnostics.warning_count(),
        "analysis finished"
    );

    let model = Model {
        state_names: names.states,
        event_names: names.events,
        guard_names: names.guards,
        action_names: names.actions,
        action_prototypes: names.prototypes,
        states,
    };

    Analysis { model, diagnostics }
}
