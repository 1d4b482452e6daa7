//! Model rendering
//!
//! JSON and YAML are straight `serde` dumps of the [Model]. The summary is an indented
//! outline meant for people: one line per state, nested under its parent, with that
//! state's behavior listed beneath it.

use std::fmt::Write;

use crate::flohsm::config::OutputFormat;
use crate::flohsm::error::Result;
use crate::flohsm::guard::Guard;
use crate::flohsm::model::{Action, Model, State, FINAL_STATE};

const INDENT: &str = "  ";

pub fn render(model: &Model, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(model),
        OutputFormat::Yaml => to_yaml(model),
        OutputFormat::Summary => Ok(to_summary(model)),
    }
}

pub fn to_json(model: &Model) -> Result<String> {
    Ok(serde_json::to_string_pretty(model)?)
}

pub fn to_yaml(model: &Model) -> Result<String> {
    Ok(serde_yaml::to_string(model)?)
}

pub fn to_summary(model: &Model) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} states, {} events, {} guards, {} actions",
        model.state_names.len(),
        model.event_names.len(),
        model.guard_names.len(),
        model.action_names.len()
    );

    for state in &model.states {
        let depth = depth(model, state);
        write_state(&mut out, state, depth);
    }

    if !model.action_prototypes.is_empty() {
        out.push_str("prototypes:\n");
        for prototype in &model.action_prototypes {
            let _ = writeln!(out, "{}{}", INDENT, prototype);
        }
    }
    out
}

/// Ancestor count, bounded by the number of states
fn depth(model: &Model, state: &State) -> usize {
    let mut depth = 0;
    let mut parent = state.parent.as_deref();
    while let Some(name) = parent {
        if depth >= model.states.len() {
            break;
        }
        depth += 1;
        parent = model.state(name).and_then(|p| p.parent.as_deref());
    }
    depth
}

fn write_state(out: &mut String, state: &State, depth: usize) {
    let indent = INDENT.repeat(depth);
    let lines = state
        .lineno
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let mut header = format!("{}{} (line {})", indent, state.display_name(), lines);
    if state.is_choice() {
        header.push_str(" choice");
    }
    if state.is_composite {
        header.push_str(" composite");
    }
    let _ = writeln!(out, "{}", header);

    let inner = format!("{}{}", indent, INDENT);
    if let Some(entry) = &state.entry {
        let guard = guard_suffix(entry.guard.as_ref());
        let _ = writeln!(out, "{}entry{} / {}", inner, guard, entry.action);
    }
    if let Some(exit) = &state.exit {
        let guard = guard_suffix(exit.guard.as_ref());
        let _ = writeln!(out, "{}exit{} / {}", inner, guard, exit.action);
    }
    if let Some(initial) = &state.initial_transition {
        let _ = writeln!(
            out,
            "{}--> {}{}",
            inner,
            target_name(&initial.to_state),
            action_suffix(initial.action.as_ref())
        );
    }
    for transition in &state.internal_transitions {
        let _ = writeln!(
            out,
            "{}{}{} / {}",
            inner,
            transition.event,
            guard_suffix(transition.guard.as_ref()),
            transition.action
        );
    }
    for transition in &state.state_transitions {
        let _ = writeln!(
            out,
            "{}{}{} --> {}{}",
            inner,
            transition.event,
            guard_suffix(transition.guard.as_ref()),
            target_name(&transition.to_state),
            action_suffix(transition.action.as_ref())
        );
    }
    for transition in &state.choice_transitions {
        let _ = writeln!(
            out,
            "{}[{}] --> {}{}",
            inner,
            transition.guard,
            target_name(&transition.to_state),
            action_suffix(transition.action.as_ref())
        );
    }
}

fn target_name(name: &str) -> &str {
    if name == FINAL_STATE {
        "[*]"
    } else {
        name
    }
}

fn guard_suffix(guard: Option<&Guard>) -> String {
    guard.map(|g| format!(" [{}]", g)).unwrap_or_default()
}

fn action_suffix(action: Option<&Action>) -> String {
    action.map(|a| format!(" / {}", a)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flohsm::model::{
        ActionType, EntryExit, InitialTransition, StateTransition, INITIAL_STATE,
    };

    fn model() -> Model {
        let states = vec![
            State::new(INITIAL_STATE, 1)
                .with_initial_transition(InitialTransition::new("P", None)),
            State::new("P", 2)
                .composite(true)
                .with_initial_transition(InitialTransition::new("S", Some(Action::new("Init")))),
            State::new("S", 3)
                .with_parent("P")
                .with_entry(EntryExit::new(Action::new("Enter"), Some(Guard::simple("Ready", 3))))
                .with_state_transition(StateTransition::new(
                    "Stop",
                    FINAL_STATE,
                    Some(Action::with_argument("Log", ActionType::Int, "7")),
                    None,
                )),
        ];
        Model {
            state_names: states.iter().map(|s| s.name.clone()).collect(),
            event_names: ["Stop".to_string()].into(),
            guard_names: ["Ready".to_string()].into(),
            action_names: ["Enter", "Init", "Log"].map(String::from).into(),
            action_prototypes: ["void Enter()", "void Init()", "void Log(int i)"]
                .map(String::from)
                .into(),
            states,
        }
    }

    #[test]
    fn test_summary_outline() {
        insta::assert_snapshot!(to_summary(&model()), @r###"
        3 states, 1 events, 1 guards, 3 actions
        [*] (line 1)
          --> P
        P (line 2) composite
          --> S / Init()
          S (line 3)
            entry [Ready] / Enter()
            Stop --> [*] / Log(7)
        prototypes:
          void Enter()
          void Init()
          void Log(int i)
        "###);
    }

    #[test]
    fn test_json_contains_states_in_order() {
        let json = to_json(&model()).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        let names: Vec<&str> = value["states"]
            .as_array()
            .expect("states array")
            .iter()
            .filter_map(|s| s["name"].as_str())
            .collect();
        assert_eq!(names, vec![INITIAL_STATE, "P", "S"]);
        assert_eq!(value["states"][2]["entry"]["guard"], "Ready");
        assert_eq!(value["states"][2]["state_transitions"][0]["action"]["type"], "int");
    }

    #[test]
    fn test_yaml_render() {
        let yaml = render(&model(), OutputFormat::Yaml).expect("yaml");
        assert!(yaml.contains("state_names:"));
        assert!(yaml.contains("- void Log(int i)"));
    }
}
