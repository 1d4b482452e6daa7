//! End-to-end front end: descriptor text in, model and diagnostics out
//!
//! Analysis only runs on descriptors that parsed cleanly. A partial fragment list
//! would mostly produce follow-on reachability noise.

use std::fs;
use std::path::Path;

use crate::flohsm::analysis::analyze;
use crate::flohsm::config::{FloHsmConfig, GenerationConfig};
use crate::flohsm::diagnostics::Diagnostics;
use crate::flohsm::error::{FloHsmError, Result};
use crate::flohsm::model::Model;
use crate::flohsm::parsing::parse;

/// Result of compiling one descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compilation {
    /// Absent when parsing failed
    pub model: Option<Model>,
    pub diagnostics: Diagnostics,
}

impl Compilation {
    /// Generation gate: a model exists, no errors, and no warnings when warnings block.
    pub fn may_generate(&self, config: &GenerationConfig) -> bool {
        self.model.is_some()
            && !self.diagnostics.has_errors()
            && !(config.block_on_warnings && self.diagnostics.has_warnings())
    }
}

pub fn compile(text: &str, config: &FloHsmConfig) -> Compilation {
    let parsed = parse(text);
    if parsed.has_errors() {
        tracing::debug!(
            errors = parsed.diagnostics.error_count(),
            "skipping analysis after parse errors"
        );
        return Compilation {
            model: None,
            diagnostics: parsed.diagnostics,
        };
    }

    let analysis = analyze(&parsed.fragments, &config.analysis);
    let mut diagnostics = parsed.diagnostics;
    diagnostics.extend(analysis.diagnostics);

    Compilation {
        model: Some(analysis.model),
        diagnostics,
    }
}

pub fn compile_file(path: impl AsRef<Path>, config: &FloHsmConfig) -> Result<Compilation> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| FloHsmError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "read descriptor");
    Ok(compile(&text, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flohsm::diagnostics::DiagnosticKind;

    #[test]
    fn test_valid_descriptor_may_generate() {
        let config = FloHsmConfig::default();
        let compilation = compile("[*] --> S\nS --> T : E\n", &config);
        assert!(compilation.diagnostics.is_empty(), "{:?}", compilation.diagnostics);
        assert!(compilation.may_generate(&config.generation));
        let model = compilation.model.expect("model");
        assert!(model.state("T").is_some());
    }

    #[test]
    fn test_parse_errors_skip_analysis() {
        let compilation = compile("state S {\n", &FloHsmConfig::default());
        assert!(compilation.model.is_none());
        assert_eq!(compilation.diagnostics.messages(), vec!["Unexpected end of file"]);
        assert!(!compilation.may_generate(&GenerationConfig::default()));
    }

    #[test]
    fn test_warnings_block_only_when_configured() {
        let text = "[*] --> S\nS --> T : E [G | !G]\n";
        let compilation = compile(text, &FloHsmConfig::default());
        assert_eq!(compilation.diagnostics.warning_count(), 1);
        assert_eq!(
            compilation.diagnostics.iter().next().map(|d| d.kind),
            Some(DiagnosticKind::GuardAlwaysTrue)
        );

        assert!(compilation.may_generate(&GenerationConfig::default()));
        assert!(!compilation.may_generate(&GenerationConfig {
            block_on_warnings: true
        }));
    }

    #[test]
    fn test_compile_missing_file() {
        let result = compile_file("/nonexistent/flohsm/input.hsm", &FloHsmConfig::default());
        assert!(matches!(result, Err(FloHsmError::Read { .. })));
    }
}
