//! Integration tests for the parser
//!
//! Fragment shapes are checked with the fluent assertions from `flohsm::testing`;
//! malformed input is covered table-driven, one diagnostic per bad line.

use flohsm::flohsm::diagnostics::DiagnosticKind;
use flohsm::flohsm::model::{ActionType, FINAL_STATE, INITIAL_STATE};
use flohsm::flohsm::parsing::parse;
use flohsm::flohsm::testing::{assert_diagnostics, assert_fragments, DescriptorSamples};
use rstest::rstest;

#[test]
fn test_every_transition_yields_a_target_stub() {
    let output = parse("[*] --> S\nS --> T : E\nT --> [*] : F\n");
    assert_diagnostics(&output.diagnostics).is_clean();
    assert_fragments(&output.fragments)
        .names(&[INITIAL_STATE, "S", "S", "T", "T", FINAL_STATE])
        .fragment(0, |f| f.initial_target("S").lines(&[1]))
        .fragment(2, |f| f.transition("E", "T").lines(&[2]))
        .fragment(3, |f| f.lines(&[2]).state_transition_count(0))
        .fragment(4, |f| f.transition("F", FINAL_STATE));
}

#[test]
fn test_keyword_is_optional_for_tails() {
    let output = parse("state S : <<entry>> / A1\nS : <<exit>> [G] / A2\nS : E / A3\n");
    assert_diagnostics(&output.diagnostics).is_clean();
    assert_fragments(&output.fragments)
        .count(3)
        .fragment(0, |f| f.entry_action("A1"))
        .fragment(1, |f| f.exit_action("A2"))
        .fragment(2, |f| f.internal_transition_count(1));
}

#[test]
fn test_composite_sample_sets_parents() {
    let source = DescriptorSamples::get_string("composite_state.hsm").expect("sample");
    let output = parse(&source);
    assert_diagnostics(&output.diagnostics).is_clean();

    let fragments = &output.fragments;
    assert_fragments(fragments)
        .fragment(0, |f| f.parent(Some("S1")).lines(&[5]).composite(false))
        .fragment(1, |f| f.parent(Some("S0")).lines(&[4]).composite(true))
        .fragment(2, |f| f.parent(Some("S0")).lines(&[8]).composite(false))
        .fragment(3, |f| f.parent(Some("S0")).lines(&[10]));

    let s0 = fragments
        .iter()
        .find(|f| f.name == "S0" && f.is_composite)
        .expect("composite S0 fragment");
    assert_eq!(
        s0.initial_transition.as_ref().map(|t| t.to_state.as_str()),
        Some("S1")
    );
}

#[test]
fn test_action_arguments_keep_literal_text() {
    let source = DescriptorSamples::get_string("action_with_argument.hsm").expect("sample");
    let output = parse(&source);
    assert_diagnostics(&output.diagnostics).is_clean();

    let actions: Vec<(String, ActionType, Option<String>)> = output
        .fragments
        .iter()
        .flat_map(|f| f.state_transitions.iter())
        .filter_map(|t| t.action.clone())
        .map(|a| (a.name, a.action_type, a.value))
        .collect();

    let expected = [
        ("A0", ActionType::Int, "13"),
        ("A0", ActionType::Int, "-126"),
        ("A0", ActionType::Int, "-0xFC"),
        ("A1", ActionType::Bool, "true"),
        ("A1", ActionType::Bool, "false"),
        ("A2", ActionType::Float, "123.456"),
        ("A2", ActionType::Float, "-123.456"),
        ("A3", ActionType::String, "\"test123\""),
    ];
    assert_eq!(actions.len(), expected.len());
    for ((name, kind, value), (e_name, e_kind, e_value)) in actions.iter().zip(expected) {
        assert_eq!(name, e_name);
        assert_eq!(*kind, e_kind);
        assert_eq!(value.as_deref(), Some(e_value));
    }
}

#[test]
fn test_choice_sample_builds_arms_incrementally() {
    let source = DescriptorSamples::get_string("choice.hsm").expect("sample");
    let output = parse(&source);
    assert_diagnostics(&output.diagnostics).is_clean();

    let arms: Vec<_> = output
        .fragments
        .iter()
        .filter(|f| f.name == "choice1")
        .collect();
    assert_eq!(arms.len(), 4);
    assert!(arms.iter().all(|f| f.is_choice() || f.choice_transitions.is_empty()));
    assert_eq!(
        arms.iter().map(|f| f.choice_transitions.len()).sum::<usize>(),
        2
    );
}

#[rstest]
#[case("state", "Syntax error: unexpected token '\\n' (hex: 0a) of type NEWLINE on line 1")]
#[case("S --> T", "Syntax error: unexpected token '\\n' (hex: 0a) of type NEWLINE on line 1")]
#[case("S : E1", "Syntax error: unexpected token '\\n' (hex: 0a) of type NEWLINE on line 1")]
#[case("[*] --> S : [G]", "Syntax error: unexpected token '[' (hex: 5b) of type LBRACKET on line 1")]
#[case("S --> T : E [G &]", "Syntax error: unexpected token ']' (hex: 5d) of type RBRACKET on line 1")]
#[case("}", "Syntax error: unexpected token '}' (hex: 7d) of type RBRACE on line 1")]
#[case("state S ~", "Lexical error: illegal token '~' (hex: 7e) on line 1")]
#[case("state Sé", "Lexical error: illegal token 'é' (hex: c3a9) on line 1")]
fn test_malformed_lines(#[case] source: &str, #[case] expected: &str) {
    let output = parse(source);
    assert_diagnostics(&output.diagnostics)
        .error_count(1)
        .contains(expected);
}

#[test]
fn test_errors_do_not_stop_parsing() {
    let output = parse("state A\nstate B B\nstate C\nS ~ T\nstate D\n");
    assert_fragments(&output.fragments).names(&["A", "C", "D"]);
    assert_diagnostics(&output.diagnostics)
        .error_count(2)
        .kind_count(DiagnosticKind::SyntaxError, 1)
        .kind_count(DiagnosticKind::LexicalError, 1);
}

#[test]
fn test_unclosed_block_discards_its_contents() {
    let output = parse("state A\nstate P {\nstate C\n");
    assert_fragments(&output.fragments).names(&["A"]);
    assert_diagnostics(&output.diagnostics).messages(&["Unexpected end of file"]);
}
