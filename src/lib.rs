//! # flohsm
//!
//! Front end of the FloHsm compiler: turns a textual hierarchical state machine
//! descriptor into a validated, language-neutral model for code emitters.
//!
//! ## Testing
//!
//! Fluent assertions for fragments, models and diagnostics live in the
//! [testing module](flohsm::testing).

pub mod flohsm;
