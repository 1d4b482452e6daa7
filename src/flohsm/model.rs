//! State machine descriptors
//!
//!     The parser produces [State] fragments, one per syntactic occurrence, so several
//!     fragments may share a name. The analyzer merges them into canonical states and
//!     wraps the result in a read-only [Model] for code emitters.
//!
//! Pseudostates
//!
//!     The top-level initial pseudostate (`[*] --> X` outside any block) and the final
//!     pseudostate (`X --> [*]`) are stored under reserved names that cannot clash with
//!     user names in practice: [INITIAL_STATE] and [FINAL_STATE].

use crate::flohsm::guard::Guard;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Reserved name of the top-level initial pseudostate
pub const INITIAL_STATE: &str = "FloHsmInitial_5OdpEA31BEcPrWrNx8u7";

/// Reserved name of the final pseudostate
pub const FINAL_STATE: &str = "FloHsmFinal_5OdpEA31BEcPrWrNx8u7";

/// Type of the single literal argument an action may carry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    #[default]
    None,
    Int,
    Float,
    Bool,
    String,
}

/// An action name with an optional literal argument.
///
/// `value` holds the literal as written; string literals keep their quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Action {
    pub name: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action_type: ActionType::None,
            value: None,
        }
    }

    pub fn with_argument(
        name: impl Into<String>,
        action_type: ActionType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            action_type,
            value: Some(value.into()),
        }
    }

    /// C-style declaration, e.g. `void A1(int i)`
    pub fn prototype_string(&self) -> String {
        let parameter = match self.action_type {
            ActionType::None => "",
            ActionType::Int => "int i",
            ActionType::Float => "float f",
            ActionType::Bool => "bool b",
            ActionType::String => "const char* s",
        };
        format!("void {}({})", self.name, parameter)
    }

    /// C-style call, e.g. `A2(12.34f)`
    pub fn invocation_string(&self) -> String {
        let argument = self.value.as_deref().unwrap_or_default();
        match self.action_type {
            ActionType::None => format!("{}()", self.name),
            ActionType::Float => format!("{}({}f)", self.name, argument),
            _ => format!("{}({})", self.name, argument),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.invocation_string())
    }
}

/// Entry or exit behavior, optionally gated by a guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryExit {
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<Guard>,
}

impl EntryExit {
    pub fn new(action: Action, guard: Option<Guard>) -> Self {
        Self { action, guard }
    }
}

/// Unconditional handoff from a (pseudo)state to its initial substate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitialTransition {
    pub to_state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

impl InitialTransition {
    pub fn new(to_state: impl Into<String>, action: Option<Action>) -> Self {
        Self {
            to_state: to_state.into(),
            action,
        }
    }
}

/// External transition: handles an event by changing state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTransition {
    pub event: String,
    pub to_state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<Guard>,
}

impl StateTransition {
    pub fn new(
        event: impl Into<String>,
        to_state: impl Into<String>,
        action: Option<Action>,
        guard: Option<Guard>,
    ) -> Self {
        Self {
            event: event.into(),
            to_state: to_state.into(),
            action,
            guard,
        }
    }
}

/// Handles an event with an action, without leaving the state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternalTransition {
    pub event: String,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<Guard>,
}

impl InternalTransition {
    pub fn new(event: impl Into<String>, action: Action, guard: Option<Guard>) -> Self {
        Self {
            event: event.into(),
            action,
            guard,
        }
    }
}

/// One arm of a choice pseudostate. The guard is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceTransition {
    pub to_state: String,
    pub guard: Guard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

impl ChoiceTransition {
    pub fn new(to_state: impl Into<String>, guard: Guard, action: Option<Action>) -> Self {
        Self {
            to_state: to_state.into(),
            guard,
            action,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateType {
    #[default]
    Normal,
    Choice,
}

/// A state record: a parser fragment, or a canonical state after merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct State {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub lineno: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryExit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<EntryExit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_transition: Option<InitialTransition>,
    pub internal_transitions: Vec<InternalTransition>,
    pub state_transitions: Vec<StateTransition>,
    pub choice_transitions: Vec<ChoiceTransition>,
    pub is_composite: bool,
    pub state_type: StateType,
}

impl State {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            parent: None,
            lineno: vec![line],
            entry: None,
            exit: None,
            initial_transition: None,
            internal_transitions: Vec::new(),
            state_transitions: Vec::new(),
            choice_transitions: Vec::new(),
            is_composite: false,
            state_type: StateType::Normal,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_entry(mut self, entry: EntryExit) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn with_exit(mut self, exit: EntryExit) -> Self {
        self.exit = Some(exit);
        self
    }

    pub fn with_initial_transition(mut self, initial: InitialTransition) -> Self {
        self.initial_transition = Some(initial);
        self
    }

    pub fn with_internal_transition(mut self, transition: InternalTransition) -> Self {
        self.internal_transitions.push(transition);
        self
    }

    pub fn with_state_transition(mut self, transition: StateTransition) -> Self {
        self.state_transitions.push(transition);
        self
    }

    pub fn with_choice_transition(mut self, transition: ChoiceTransition) -> Self {
        self.choice_transitions.push(transition);
        self
    }

    pub fn with_state_type(mut self, state_type: StateType) -> Self {
        self.state_type = state_type;
        self
    }

    pub fn composite(mut self, is_composite: bool) -> Self {
        self.is_composite = is_composite;
        self
    }

    pub fn is_choice(&self) -> bool {
        self.state_type == StateType::Choice
    }

    /// Name shown to users: the pseudostates render as `[*]`
    pub fn display_name(&self) -> &str {
        if self.name == INITIAL_STATE || self.name == FINAL_STATE {
            "[*]"
        } else {
            &self.name
        }
    }

    /// Events handled by internal or state transitions, sorted and deduplicated
    pub fn events(&self) -> BTreeSet<&str> {
        self.internal_transitions
            .iter()
            .map(|t| t.event.as_str())
            .chain(self.state_transitions.iter().map(|t| t.event.as_str()))
            .collect()
    }

    /// Guards on `event`: internal transitions first, then state transitions,
    /// each in declaration order. Unguarded transitions are skipped.
    pub fn guards_for_event(&self, event: &str) -> Vec<&Guard> {
        let internal = self
            .internal_transitions
            .iter()
            .filter(|t| t.event == event)
            .filter_map(|t| t.guard.as_ref());
        let external = self
            .state_transitions
            .iter()
            .filter(|t| t.event == event)
            .filter_map(|t| t.guard.as_ref());
        internal.chain(external).collect()
    }

    pub fn choice_guards(&self) -> Vec<&Guard> {
        self.choice_transitions.iter().map(|t| &t.guard).collect()
    }

    /// Every action attached to this state, initial transition first
    pub fn actions(&self) -> Vec<&Action> {
        let mut actions = Vec::new();
        if let Some(action) = self.initial_transition.as_ref().and_then(|t| t.action.as_ref()) {
            actions.push(action);
        }
        actions.extend(self.state_transitions.iter().filter_map(|t| t.action.as_ref()));
        actions.extend(self.internal_transitions.iter().map(|t| &t.action));
        actions.extend(self.choice_transitions.iter().filter_map(|t| t.action.as_ref()));
        if let Some(entry) = &self.entry {
            actions.push(&entry.action);
        }
        if let Some(exit) = &self.exit {
            actions.push(&exit.action);
        }
        actions
    }

    /// Every guard attached to this state
    pub fn guards(&self) -> Vec<&Guard> {
        let mut guards = Vec::new();
        guards.extend(self.state_transitions.iter().filter_map(|t| t.guard.as_ref()));
        guards.extend(self.internal_transitions.iter().filter_map(|t| t.guard.as_ref()));
        guards.extend(self.choice_transitions.iter().map(|t| &t.guard));
        guards.extend(self.entry.as_ref().and_then(|e| e.guard.as_ref()));
        guards.extend(self.exit.as_ref().and_then(|e| e.guard.as_ref()));
        guards
    }

    /// Targets of the initial, state and choice transitions
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.initial_transition
            .iter()
            .map(|t| t.to_state.as_str())
            .chain(self.state_transitions.iter().map(|t| t.to_state.as_str()))
            .chain(self.choice_transitions.iter().map(|t| t.to_state.as_str()))
    }
}

/// Validated output of the analyzer, consumed by code emitters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Model {
    /// Canonical states in hierarchy order (parents before children)
    pub states: Vec<State>,
    pub state_names: Vec<String>,
    pub event_names: BTreeSet<String>,
    pub guard_names: BTreeSet<String>,
    pub action_names: BTreeSet<String>,
    pub action_prototypes: BTreeSet<String>,
}

impl Model {
    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn initial_state(&self) -> Option<&State> {
        self.state(INITIAL_STATE)
    }

    /// Direct children of `parent`, in hierarchy order
    pub fn children<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a State> + 'a {
        self.states
            .iter()
            .filter(move |s| s.parent.as_deref() == Some(parent))
    }
}
