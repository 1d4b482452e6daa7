//! Diagnostic collection
//!
//! Every problem found while parsing or analyzing a descriptor is recorded as a
//! [Diagnostic] instead of aborting, so a single run reports as much as possible.
//! Each phase receives the [Diagnostics] collector explicitly.
//!
//! ## Severity
//!
//! Guard tautology/contradiction findings are warnings. Everything else is an error,
//! including a guard check skipped as too complex: an unproven check keeps
//! generation blocked just like a failed one.

use serde::Serialize;
use std::fmt;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// What went wrong, independent of the exact message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    LexicalError,
    SyntaxError,
    MergeConflict,
    NamespaceCollision,
    HierarchyError,
    ChoiceConstraintViolation,
    AmbiguousTransition,
    AmbiguousChoice,
    NoChoiceTransition,
    UnreachableState,
    MissingTopLevelInitial,
    GuardAlwaysTrue,
    GuardAlwaysFalse,
    GuardTooComplex,
}

impl DiagnosticKind {
    /// Stable kebab-case code
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::LexicalError => "lexical-error",
            DiagnosticKind::SyntaxError => "syntax-error",
            DiagnosticKind::MergeConflict => "merge-conflict",
            DiagnosticKind::NamespaceCollision => "namespace-collision",
            DiagnosticKind::HierarchyError => "hierarchy-error",
            DiagnosticKind::ChoiceConstraintViolation => "choice-constraint-violation",
            DiagnosticKind::AmbiguousTransition => "ambiguous-transition",
            DiagnosticKind::AmbiguousChoice => "ambiguous-choice",
            DiagnosticKind::NoChoiceTransition => "no-choice-transition",
            DiagnosticKind::UnreachableState => "unreachable-state",
            DiagnosticKind::MissingTopLevelInitial => "missing-top-level-initial",
            DiagnosticKind::GuardAlwaysTrue => "guard-always-true",
            DiagnosticKind::GuardAlwaysFalse => "guard-always-false",
            DiagnosticKind::GuardTooComplex => "guard-too-complex",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::GuardAlwaysTrue | DiagnosticKind::GuardAlwaysFalse => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single finding with the source lines it implicates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub lines: Vec<usize>,
}

impl Diagnostic {
    /// Severity follows from the kind
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            message: message.into(),
            lines: Vec::new(),
        }
    }

    pub fn with_lines(mut self, lines: impl IntoIterator<Item = usize>) -> Self {
        self.lines = lines.into_iter().collect();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.kind, self.message)
    }
}

/// Ordered collector threaded through the parsing and analysis phases
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(kind = %diagnostic.kind, message = %diagnostic.message, "diagnostic");
        self.entries.push(diagnostic);
    }

    /// Shorthand for `push(Diagnostic::new(kind, message).with_lines(lines))`
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        lines: impl IntoIterator<Item = usize>,
    ) {
        self.push(Diagnostic::new(kind, message).with_lines(lines));
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_warning())
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Diagnostics of one kind, in emission order
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    /// Messages in emission order
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.message.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
