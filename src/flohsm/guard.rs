//! Guard expressions
//!
//!     A guard is an immutable boolean expression over named conditions, built by the
//!     parser and reasoned about by the analyzer. The variant set is closed, so every
//!     operation is an exhaustive match.
//!
//! Truth Tables
//!
//!     Evaluation works on an assignment packed into a `u64`: bit `i` holds the value of
//!     the `i`-th condition of a [BitIndex]. A bit index sorts condition names and numbers
//!     them from 0, so the same set of names always yields the same layout. Guards that
//!     are compared against each other (all guards of one state and event, all arms of one
//!     choice) must share one index; a single guard checked in isolation may build its own.
//!
//!     The analyzer enumerates every assignment, which is exponential in the number of
//!     distinct conditions. Descriptors are expected to use a handful of conditions per
//!     state and event; `analysis.max_guard_conditions` bounds the table size.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Boolean expression over named guard conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    Simple { name: String, line: usize },
    Not(Box<Guard>),
    And(Box<Guard>, Box<Guard>),
    Or(Box<Guard>, Box<Guard>),
}

impl Guard {
    pub fn simple(name: impl Into<String>, line: usize) -> Self {
        Guard::Simple {
            name: name.into(),
            line,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: Guard) -> Self {
        Guard::Not(Box::new(operand))
    }

    pub fn and(left: Guard, right: Guard) -> Self {
        Guard::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Guard, right: Guard) -> Self {
        Guard::Or(Box::new(left), Box::new(right))
    }

    /// Distinct condition names used anywhere in the expression
    pub fn conditions(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_conditions(&mut names);
        names
    }

    fn collect_conditions(&self, names: &mut BTreeSet<String>) {
        match self {
            Guard::Simple { name, .. } => {
                names.insert(name.clone());
            }
            Guard::Not(operand) => operand.collect_conditions(names),
            Guard::And(left, right) | Guard::Or(left, right) => {
                left.collect_conditions(names);
                right.collect_conditions(names);
            }
        }
    }

    /// Number of `Simple` leaves, counting repeated names
    pub fn leaf_count(&self) -> usize {
        match self {
            Guard::Simple { .. } => 1,
            Guard::Not(operand) => operand.leaf_count(),
            Guard::And(left, right) | Guard::Or(left, right) => {
                left.leaf_count() + right.leaf_count()
            }
        }
    }

    /// Line of the leftmost leaf
    pub fn line(&self) -> usize {
        match self {
            Guard::Simple { line, .. } => *line,
            Guard::Not(operand) => operand.line(),
            Guard::And(left, _) | Guard::Or(left, _) => left.line(),
        }
    }

    /// Evaluate against an assignment.
    ///
    /// Without an index the guard numbers its own conditions, which is only
    /// meaningful when the guard is not compared against other guards.
    /// A condition missing from a supplied index evaluates to false.
    pub fn evaluate(&self, assignment: u64, index: Option<&BitIndex>) -> bool {
        match index {
            Some(index) => self.evaluate_with(assignment, index),
            None => self.evaluate_with(assignment, &BitIndex::for_guard(self)),
        }
    }

    fn evaluate_with(&self, assignment: u64, index: &BitIndex) -> bool {
        match self {
            Guard::Simple { name, .. } => index
                .position(name)
                .map(|bit| assignment & (1u64 << bit) != 0)
                .unwrap_or(false),
            Guard::Not(operand) => !operand.evaluate_with(assignment, index),
            Guard::And(left, right) => {
                left.evaluate_with(assignment, index) & right.evaluate_with(assignment, index)
            }
            Guard::Or(left, right) => {
                left.evaluate_with(assignment, index) | right.evaluate_with(assignment, index)
            }
        }
    }
}

/// Fully parenthesized infix form. A leading `!!` collapses, so `Not(Not(x))`
/// prints as `x` and a triple negation as `!x`.
impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Simple { name, .. } => f.write_str(name),
            Guard::Not(operand) => {
                let negated = format!("!{}", operand);
                if negated.starts_with("!!") {
                    f.write_str(negated.trim_start_matches('!'))
                } else {
                    f.write_str(&negated)
                }
            }
            Guard::And(left, right) => write!(f, "({} && {})", left, right),
            Guard::Or(left, right) => write!(f, "({} || {})", left, right),
        }
    }
}

impl Serialize for Guard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Widest index whose assignments can be enumerated in a `u64`
pub const MAX_CONDITIONS: usize = 63;

/// Deterministic condition-name to bit-position mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitIndex {
    positions: BTreeMap<String, u32>,
}

impl BitIndex {
    /// Sorts the names and assigns consecutive positions starting at 0
    pub fn new<I, S>(conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = conditions.into_iter().map(Into::into).collect();
        let positions = names
            .into_iter()
            .zip(0u32..)
            .collect::<BTreeMap<String, u32>>();
        Self { positions }
    }

    /// Index over the conditions of a single guard
    pub fn for_guard(guard: &Guard) -> Self {
        Self::new(guard.conditions())
    }

    /// Shared index over the union of the guards' conditions
    pub fn for_guards<'a>(guards: impl IntoIterator<Item = &'a Guard>) -> Self {
        Self::new(guards.into_iter().flat_map(Guard::conditions))
    }

    pub fn position(&self, name: &str) -> Option<u32> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True when [assignments](Self::assignments) can enumerate this index
    pub fn is_enumerable(&self) -> bool {
        self.len() <= MAX_CONDITIONS
    }

    /// All assignments of this index, in ascending numeric order
    ///
    /// # Panics
    ///
    /// When the index holds more than [MAX_CONDITIONS] names.
    pub fn assignments(&self) -> std::ops::Range<u64> {
        let end = u32::try_from(self.len())
            .ok()
            .filter(|_| self.is_enumerable())
            .and_then(|width| 1u64.checked_shl(width));
        match end {
            Some(end) => 0..end,
            None => panic!(
                "truth table over {} conditions exceeds the limit of {}",
                self.len(),
                MAX_CONDITIONS
            ),
        }
    }

    /// Renders an assignment as `A==true and B==false`, sorted by condition name
    pub fn describe(&self, assignment: u64) -> String {
        self.positions
            .iter()
            .map(|(name, bit)| format!("{}=={}", name, assignment & (1u64 << bit) != 0))
            .collect::<Vec<_>>()
            .join(" and ")
    }
}
