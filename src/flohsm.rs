//! Main module for flohsm library functionality
//!
//!     Data flows leaf-first through the submodules:
//!
//!     text -> [lexing] -> tokens -> [parsing] (builds [guard] trees) -> fragments
//!          -> [analysis] -> validated [model::Model] + [diagnostics]
//!
//!     [pipeline] wires the stages together and applies the generation gate,
//!     [config] holds the layered settings and [formats] renders the model for
//!     the command-line tool.

pub mod analysis;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod formats;
pub mod guard;
pub mod lexing;
pub mod model;
pub mod parsing;
pub mod pipeline;
pub mod testing;

pub use analysis::{analyze, Analysis};
pub use config::FloHsmConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::FloHsmError;
pub use guard::Guard;
pub use model::{Model, State};
pub use parsing::{parse, ParseOutput};
pub use pipeline::{compile, compile_file, Compilation};
