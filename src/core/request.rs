//! Form state and the run request built from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::{schema_or_empty, AlgorithmId, FieldKind, FieldSpec, ObjectiveId};

/// A parsed form value.
///
/// Inputs are parsed per field kind but never rejected at parse time: a non-integer
/// in an integer field is kept as a float and unparsable text becomes `Missing`, so
/// the validation engine can report every problem in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl FieldValue {
    pub fn parse(kind: FieldKind, raw: &str) -> Self {
        let raw = raw.trim();
        match kind {
            FieldKind::Enum => FieldValue::Text(raw.to_string()),
            FieldKind::Int => match raw.parse::<i64>() {
                Ok(n) => FieldValue::Int(n),
                Err(_) => Self::parse_float(raw),
            },
            FieldKind::Float => Self::parse_float(raw),
        }
    }

    fn parse_float(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(x) if x.is_finite() => FieldValue::Float(x),
            _ => FieldValue::Missing,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(n) => Some(*n as f64),
            FieldValue::Float(x) if x.is_finite() => Some(*x),
            _ => None,
        }
    }

    /// Integral value, whether it was typed as `40` or `40.0`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Float(x) if x.is_finite() && x.fract() == 0.0 => {
                let n = *x as i64;
                (n as f64 == *x).then_some(n)
            }
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

pub type Params = BTreeMap<String, FieldValue>;

/// Body of `POST /run`. Built fresh for every submission and not mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub algorithm: AlgorithmId,
    pub objective: ObjectiveId,
    pub iterations: FieldValue,
    pub dimensions: FieldValue,
    pub agents: FieldValue,
    #[serde(default)]
    pub params: Params,
}

impl RunRequest {
    /// Value of a global field by its schema name.
    pub fn global(&self, name: &str) -> Option<&FieldValue> {
        match name {
            "iterations" => Some(&self.iterations),
            "dimensions" => Some(&self.dimensions),
            "agents" => Some(&self.agents),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelField {
    pub spec: &'static FieldSpec,
    pub raw: String,
}

/// The algorithm-specific half of the form.
///
/// Rebuilt from the schema whenever the algorithm changes; values typed for the
/// previous algorithm are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterPanel {
    algorithm: AlgorithmId,
    fields: Vec<PanelField>,
}

impl ParameterPanel {
    pub fn for_algorithm(algorithm: AlgorithmId) -> Self {
        let fields = schema_or_empty(&algorithm)
            .fields
            .iter()
            .map(|spec| PanelField {
                spec,
                raw: spec.default.to_string(),
            })
            .collect();
        Self { algorithm, fields }
    }

    pub fn rebuild(&mut self, algorithm: AlgorithmId) {
        *self = Self::for_algorithm(algorithm);
    }

    pub fn algorithm(&self) -> &AlgorithmId {
        &self.algorithm
    }

    pub fn fields(&self) -> &[PanelField] {
        &self.fields
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.spec.name == name)
            .map(|f| f.raw.as_str())
    }

    /// Returns false when the current schema has no such field.
    pub fn set_raw(&mut self, name: &str, raw: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|f| f.spec.name == name) {
            Some(f) => {
                f.raw = raw.into();
                true
            }
            None => false,
        }
    }

    pub fn params(&self) -> Params {
        self.fields
            .iter()
            .map(|f| {
                (
                    f.spec.name.to_string(),
                    FieldValue::parse(f.spec.kind, &f.raw),
                )
            })
            .collect()
    }
}

impl Default for ParameterPanel {
    fn default() -> Self {
        Self::for_algorithm(AlgorithmId::default())
    }
}

/// Everything the user has typed, as raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct RunForm {
    pub objective: ObjectiveId,
    pub iterations: String,
    pub dimensions: String,
    pub agents: String,
    pub panel: ParameterPanel,
}

impl Default for RunForm {
    fn default() -> Self {
        Self {
            objective: ObjectiveId::default(),
            iterations: "100".to_string(),
            dimensions: "2".to_string(),
            agents: "20".to_string(),
            panel: ParameterPanel::default(),
        }
    }
}

impl RunForm {
    pub fn algorithm(&self) -> &AlgorithmId {
        self.panel.algorithm()
    }

    /// Switches algorithm; the parameter panel resets to the new schema's defaults.
    pub fn select_algorithm(&mut self, algorithm: AlgorithmId) {
        self.panel.rebuild(algorithm);
    }

    pub fn bounds_info(&self) -> &'static str {
        self.objective.bounds_info()
    }

    pub fn to_request(&self) -> RunRequest {
        RunRequest {
            algorithm: self.panel.algorithm().clone(),
            objective: self.objective.clone(),
            iterations: FieldValue::parse(FieldKind::Int, &self.iterations),
            dimensions: FieldValue::parse(FieldKind::Int, &self.dimensions),
            agents: FieldValue::parse(FieldKind::Int, &self.agents),
            params: self.panel.params(),
        }
    }
}
