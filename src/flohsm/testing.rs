//! Testing utilities
//!
//! Two tools that are meant to be used together:
//!
//! 1. [DescriptorSamples]: curated descriptor files under `samples/`. Prefer them over
//!    ad hoc inline descriptors when a test needs a realistic machine, so a grammar
//!    change only has to be reflected in one place.
//! 2. Fluent assertions: [assert_model], [assert_diagnostics] and [assert_fragments].
//!    They check a whole model or diagnostic list at once and name the offending
//!    state in every failure message.
//!
//! ```rust-example
//! let source = DescriptorSamples::get_string("single_state.hsm")?;
//! let compilation = compile(&source, &FloHsmConfig::default());
//!
//! assert_diagnostics(&compilation.diagnostics).is_clean();
//! assert_model(compilation.model.as_ref().unwrap())
//!     .state_count(3)
//!     .state("S", |s| {
//!         s.entry_action("EntryAction")
//!             .internal_transition_count(4)
//!             .transition("E3", FINAL_STATE)
//!     });
//! ```
//!
//! Assertions panic with context instead of returning errors: they are for tests only.

use std::fs;
use std::path::PathBuf;

use crate::flohsm::diagnostics::{DiagnosticKind, Diagnostics};
use crate::flohsm::error::{FloHsmError, Result};
use crate::flohsm::model::{Model, State, StateType};

/// Curated sample descriptors
pub struct DescriptorSamples;

const AVAILABLE_SAMPLES: &[&str] = &[
    "action_with_argument.hsm",
    "choice.hsm",
    "composite_state.hsm",
    "single_state.hsm",
];

impl DescriptorSamples {
    pub fn list_samples() -> Vec<&'static str> {
        AVAILABLE_SAMPLES.to_vec()
    }

    pub fn sample_path(filename: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("samples")
            .join(filename)
    }

    /// Read a sample. Unknown names are reported as unreadable paths.
    pub fn get_string(filename: &str) -> Result<String> {
        let path = Self::sample_path(filename);
        if !AVAILABLE_SAMPLES.contains(&filename) {
            return Err(FloHsmError::Read {
                path,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("'{}' is not a curated sample", filename),
                ),
            });
        }
        fs::read_to_string(&path).map_err(|source| FloHsmError::Read { path, source })
    }
}

/// Entry point for model assertions
pub fn assert_model(model: &Model) -> ModelAssertion<'_> {
    ModelAssertion { model }
}

pub struct ModelAssertion<'a> {
    model: &'a Model,
}

impl<'a> ModelAssertion<'a> {
    pub fn state_count(self, expected: usize) -> Self {
        let actual = self.model.states.len();
        assert_eq!(
            actual, expected,
            "Expected {} states, found {}: {:?}",
            expected, actual, self.model.state_names
        );
        self
    }

    /// State names in hierarchy order
    pub fn state_names(self, expected: &[&str]) -> Self {
        assert_eq!(
            self.model.state_names, expected,
            "Unexpected state order"
        );
        self
    }

    pub fn events(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self.model.event_names.iter().map(String::as_str).collect();
        assert_eq!(actual, expected, "Unexpected event names");
        self
    }

    pub fn guards(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self.model.guard_names.iter().map(String::as_str).collect();
        assert_eq!(actual, expected, "Unexpected guard names");
        self
    }

    pub fn prototypes(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self
            .model
            .action_prototypes
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(actual, expected, "Unexpected action prototypes");
        self
    }

    /// Parents must precede their children in `states`
    pub fn is_hierarchically_sorted(self) -> Self {
        for (position, state) in self.model.states.iter().enumerate() {
            if let Some(parent) = &state.parent {
                let parent_position = self.model.states.iter().position(|s| &s.name == parent);
                assert!(
                    matches!(parent_position, Some(p) if p < position),
                    "State '{}' appears before its parent '{}'",
                    state.name,
                    parent
                );
            }
        }
        self
    }

    /// Run assertions against one named state
    pub fn state<F>(self, name: &str, check: F) -> Self
    where
        F: FnOnce(StateAssertion<'a>) -> StateAssertion<'a>,
    {
        let state = self
            .model
            .state(name)
            .unwrap_or_else(|| panic!("No state '{}' in {:?}", name, self.model.state_names));
        check(StateAssertion {
            state,
            context: format!("State '{}'", name),
        });
        self
    }
}

/// Entry point for assertions on raw parser fragments
pub fn assert_fragments(fragments: &[State]) -> FragmentsAssertion<'_> {
    FragmentsAssertion { fragments }
}

pub struct FragmentsAssertion<'a> {
    fragments: &'a [State],
}

impl<'a> FragmentsAssertion<'a> {
    pub fn count(self, expected: usize) -> Self {
        let names: Vec<&str> = self.fragments.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            self.fragments.len(),
            expected,
            "Expected {} fragments, found {:?}",
            expected,
            names
        );
        self
    }

    pub fn names(self, expected: &[&str]) -> Self {
        let names: Vec<&str> = self.fragments.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, expected, "Unexpected fragment names");
        self
    }

    /// Run assertions against the fragment at `index`
    pub fn fragment<F>(self, index: usize, check: F) -> Self
    where
        F: FnOnce(StateAssertion<'a>) -> StateAssertion<'a>,
    {
        let state = self.fragments.get(index).unwrap_or_else(|| {
            panic!(
                "Fragment index {} out of bounds ({} fragments)",
                index,
                self.fragments.len()
            )
        });
        check(StateAssertion {
            state,
            context: format!("Fragment {} ('{}')", index, state.name),
        });
        self
    }
}

pub struct StateAssertion<'a> {
    state: &'a State,
    context: String,
}

impl<'a> StateAssertion<'a> {
    pub fn parent(self, expected: Option<&str>) -> Self {
        assert_eq!(
            self.state.parent.as_deref(),
            expected,
            "{}: unexpected parent",
            self.context
        );
        self
    }

    pub fn lines(self, expected: &[usize]) -> Self {
        assert_eq!(self.state.lineno, expected, "{}: unexpected lines", self.context);
        self
    }

    pub fn composite(self, expected: bool) -> Self {
        assert_eq!(
            self.state.is_composite, expected,
            "{}: expected is_composite == {}",
            self.context, expected
        );
        self
    }

    pub fn choice(self) -> Self {
        assert_eq!(
            self.state.state_type,
            StateType::Choice,
            "{}: expected a choice pseudostate",
            self.context
        );
        self
    }

    pub fn entry_action(self, expected: &str) -> Self {
        let actual = self.state.entry.as_ref().map(|e| e.action.name.as_str());
        assert_eq!(actual, Some(expected), "{}: unexpected entry action", self.context);
        self
    }

    pub fn exit_action(self, expected: &str) -> Self {
        let actual = self.state.exit.as_ref().map(|e| e.action.name.as_str());
        assert_eq!(actual, Some(expected), "{}: unexpected exit action", self.context);
        self
    }

    pub fn initial_target(self, expected: &str) -> Self {
        let actual = self
            .state
            .initial_transition
            .as_ref()
            .map(|t| t.to_state.as_str());
        assert_eq!(actual, Some(expected), "{}: unexpected initial target", self.context);
        self
    }

    pub fn internal_transition_count(self, expected: usize) -> Self {
        assert_eq!(
            self.state.internal_transitions.len(),
            expected,
            "{}: unexpected internal transition count",
            self.context
        );
        self
    }

    pub fn state_transition_count(self, expected: usize) -> Self {
        assert_eq!(
            self.state.state_transitions.len(),
            expected,
            "{}: unexpected state transition count",
            self.context
        );
        self
    }

    pub fn choice_transition_count(self, expected: usize) -> Self {
        assert_eq!(
            self.state.choice_transitions.len(),
            expected,
            "{}: unexpected choice transition count",
            self.context
        );
        self
    }

    /// Some state transition handles `event` and goes to `target`
    pub fn transition(self, event: &str, target: &str) -> Self {
        let found = self
            .state
            .state_transitions
            .iter()
            .any(|t| t.event == event && t.to_state == target);
        assert!(
            found,
            "{}: no transition on '{}' to '{}' in {:?}",
            self.context, event, target, self.state.state_transitions
        );
        self
    }

    /// Some choice arm has exactly this guard text and target
    pub fn choice_arm(self, guard: &str, target: &str) -> Self {
        let found = self
            .state
            .choice_transitions
            .iter()
            .any(|t| t.guard.to_string() == guard && t.to_state == target);
        assert!(
            found,
            "{}: no choice arm [{}] to '{}'",
            self.context, guard, target
        );
        self
    }
}

/// Entry point for diagnostic assertions
pub fn assert_diagnostics(diagnostics: &Diagnostics) -> DiagnosticsAssertion<'_> {
    DiagnosticsAssertion { diagnostics }
}

pub struct DiagnosticsAssertion<'a> {
    diagnostics: &'a Diagnostics,
}

impl<'a> DiagnosticsAssertion<'a> {
    /// No errors and no warnings
    pub fn is_clean(self) -> Self {
        assert!(
            self.diagnostics.is_empty(),
            "Expected no diagnostics, got {:#?}",
            self.diagnostics.messages()
        );
        self
    }

    pub fn error_count(self, expected: usize) -> Self {
        assert_eq!(
            self.diagnostics.error_count(),
            expected,
            "Unexpected error count in {:#?}",
            self.diagnostics.messages()
        );
        self
    }

    pub fn warning_count(self, expected: usize) -> Self {
        assert_eq!(
            self.diagnostics.warning_count(),
            expected,
            "Unexpected warning count in {:#?}",
            self.diagnostics.messages()
        );
        self
    }

    /// Some diagnostic carries exactly this message
    pub fn contains(self, message: &str) -> Self {
        assert!(
            self.diagnostics.messages().contains(&message),
            "Missing diagnostic '{}' in {:#?}",
            message,
            self.diagnostics.messages()
        );
        self
    }

    pub fn lacks(self, message: &str) -> Self {
        assert!(
            !self.diagnostics.messages().contains(&message),
            "Unexpected diagnostic '{}'",
            message
        );
        self
    }

    pub fn has_kind(self, kind: DiagnosticKind) -> Self {
        assert!(
            self.diagnostics.of_kind(kind).next().is_some(),
            "No {} diagnostic in {:#?}",
            kind,
            self.diagnostics.messages()
        );
        self
    }

    pub fn kind_count(self, kind: DiagnosticKind, expected: usize) -> Self {
        assert_eq!(
            self.diagnostics.of_kind(kind).count(),
            expected,
            "Unexpected number of {} diagnostics in {:#?}",
            kind,
            self.diagnostics.messages()
        );
        self
    }

    /// Messages in emission order, compared as a whole
    pub fn messages(self, expected: &[&str]) -> Self {
        assert_eq!(self.diagnostics.messages(), expected);
        self
    }
}
