//! UI models and metadata that should be available on both wasm and native.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test the
//! selector inventories and section visibility on the host.

use swarmview::float_fmt::fmt_f64_plain;
use swarmview::orchestrator::UiRunState;
use swarmview::schema::{AlgorithmId, FieldKind, FieldSpec, ObjectiveId, OBJECTIVES};

/// A `<select>` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn algorithm_label(id: &AlgorithmId) -> &'static str {
    match id {
        AlgorithmId::Abc => "Artificial Bee Colony",
        AlgorithmId::Bat => "Bat Algorithm",
        AlgorithmId::Ga => "Genetic Algorithm",
        AlgorithmId::Unknown(_) => "Unknown algorithm",
    }
}

pub fn algorithm_options() -> Vec<SelectOption> {
    AlgorithmId::all()
        .iter()
        .map(|id| SelectOption {
            value: id.as_str(),
            label: algorithm_label(id),
        })
        .collect()
}

pub fn objective_options() -> Vec<SelectOption> {
    OBJECTIVES
        .iter()
        .map(|o| SelectOption {
            value: o.key,
            label: o.name,
        })
        .collect()
}

pub fn objective_label(id: &ObjectiveId) -> &'static str {
    id.spec().map_or("Unknown objective", |o| o.name)
}

/// Which page sections are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sections {
    pub validation_errors: bool,
    pub error_panel: bool,
    pub results: bool,
    pub busy: bool,
}

impl Sections {
    pub fn for_state(state: UiRunState, has_errors: bool) -> Self {
        Self {
            validation_errors: state == UiRunState::Idle && has_errors,
            error_panel: state == UiRunState::Failed,
            results: state == UiRunState::Succeeded,
            busy: matches!(state, UiRunState::Validating | UiRunState::Requesting),
        }
    }
}

/// Whether any validation message is about the named field.
pub fn field_has_error(messages: &[String], name: &str) -> bool {
    let prefix = format!("'{name}'");
    messages.iter().any(|m| m.starts_with(&prefix))
}

/// Value for an `<input step=...>` attribute.
pub fn step_attr(spec: &FieldSpec) -> String {
    match (spec.kind, spec.step) {
        (_, Some(step)) => fmt_f64_plain(step),
        (FieldKind::Int, None) => "1".to_string(),
        _ => "any".to_string(),
    }
}

pub fn bound_attr(v: Option<f64>) -> Option<String> {
    v.map(fmt_f64_plain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarmview::schema::schema_for;

    #[test]
    fn selector_inventories_match_the_registry() {
        let algos: Vec<&str> = algorithm_options().iter().map(|o| o.value).collect();
        assert_eq!(algos, vec!["abc", "bat", "ga"]);
        for v in algos {
            assert!(schema_for(&AlgorithmId::parse(v)).is_ok());
        }

        let objectives = objective_options();
        assert_eq!(objectives.len(), OBJECTIVES.len());
        assert!(objectives.iter().all(|o| !o.label.is_empty()));
        assert_eq!(objective_label(&ObjectiveId::Schwefel), "Schwefel");
    }

    #[test]
    fn sections_follow_run_state() {
        let s = Sections::for_state(UiRunState::Idle, false);
        assert_eq!(s, Sections::default());

        let s = Sections::for_state(UiRunState::Idle, true);
        assert!(s.validation_errors && !s.results && !s.error_panel);

        let s = Sections::for_state(UiRunState::Requesting, false);
        assert!(s.busy && !s.results);

        let s = Sections::for_state(UiRunState::Succeeded, false);
        assert!(s.results && !s.error_panel && !s.busy);

        let s = Sections::for_state(UiRunState::Failed, false);
        assert!(s.error_panel && !s.results);
    }

    #[test]
    fn error_highlighting_matches_field_names_exactly() {
        let msgs = vec![
            "'fmax' (Bat) must be greater than 'fmin'.".to_string(),
            "'iterations' must be an integer >= 1.".to_string(),
        ];
        assert!(field_has_error(&msgs, "fmax"));
        assert!(field_has_error(&msgs, "iterations"));
        assert!(!field_has_error(&msgs, "fmin"));
        assert!(!field_has_error(&msgs, "agents"));
    }

    #[test]
    fn input_attributes_come_from_the_schema() {
        let bat = schema_for(&AlgorithmId::Bat).unwrap();
        let alpha = bat.field("alpha").unwrap();
        assert_eq!(step_attr(alpha), "0.1");
        assert_eq!(bound_attr(alpha.max), Some("1".to_string()));

        let abc = schema_for(&AlgorithmId::Abc).unwrap();
        assert_eq!(step_attr(abc.field("limit").unwrap()), "1");

        let fmax = bat.field("fmax").unwrap();
        assert_eq!(step_attr(fmax), "any");
        assert_eq!(bound_attr(fmax.max), None);
    }
}
