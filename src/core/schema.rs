//! Per-algorithm parameter schemas and the objective catalog.
//!
//! Every algorithm the service understands is described by one [`ParameterSchema`]
//! entry: the ordered field list used to build the parameter panel, each field's
//! default, its input hints, and the validation rule applied before submission.
//! Adding an algorithm means adding one entry to [`SCHEMAS`].

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Identifier of an optimization algorithm.
///
/// The selector in the UI is closed, but ids also arrive from outside (CLI flags, wire
/// payloads), so unrecognized ids are carried instead of rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlgorithmId {
    Abc,
    Bat,
    Ga,
    Unknown(String),
}

impl AlgorithmId {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "abc" => AlgorithmId::Abc,
            "bat" => AlgorithmId::Bat,
            "ga" => AlgorithmId::Ga,
            other => AlgorithmId::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AlgorithmId::Abc => "abc",
            AlgorithmId::Bat => "bat",
            AlgorithmId::Ga => "ga",
            AlgorithmId::Unknown(s) => s.as_str(),
        }
    }

    pub fn all() -> &'static [AlgorithmId] {
        &ALGORITHMS
    }
}

static ALGORITHMS: [AlgorithmId; 3] = [AlgorithmId::Abc, AlgorithmId::Bat, AlgorithmId::Ga];

impl Default for AlgorithmId {
    fn default() -> Self {
        AlgorithmId::Abc
    }
}

impl From<String> for AlgorithmId {
    fn from(s: String) -> Self {
        AlgorithmId::parse(&s)
    }
}

impl From<AlgorithmId> for String {
    fn from(id: AlgorithmId) -> Self {
        id.as_str().to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    Enum,
}

/// A selectable value of an enum field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

/// Constraint checked by the validation engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rule {
    /// Integer value `>= min`.
    IntAtLeast(i64),
    /// `value >= min`.
    AtLeast(f64),
    /// `value > min`.
    GreaterThan(f64),
    /// `value` inside an interval; `*_open` excludes that end.
    Within {
        lo: f64,
        lo_open: bool,
        hi: f64,
        hi_open: bool,
    },
    /// `value >` the value of another field of the same schema.
    GreaterThanField(&'static str),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Text the input is pre-populated with.
    pub default: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub choices: &'static [Choice],
    pub rule: Option<Rule>,
}

impl FieldSpec {
    const fn int(name: &'static str, label: &'static str, default: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Int,
            default,
            min: None,
            max: None,
            step: None,
            choices: &[],
            rule: None,
        }
    }

    const fn float(name: &'static str, label: &'static str, default: &'static str) -> Self {
        Self {
            kind: FieldKind::Float,
            ..Self::int(name, label, default)
        }
    }

    const fn choice(
        name: &'static str,
        label: &'static str,
        default: &'static str,
        choices: &'static [Choice],
    ) -> Self {
        Self {
            kind: FieldKind::Enum,
            choices,
            ..Self::int(name, label, default)
        }
    }

    const fn min(mut self, v: f64) -> Self {
        self.min = Some(v);
        self
    }

    const fn max(mut self, v: f64) -> Self {
        self.max = Some(v);
        self
    }

    const fn step(mut self, v: f64) -> Self {
        self.step = Some(v);
        self
    }

    const fn rule(mut self, rule: Rule) -> Self {
        self.rule = Some(rule);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSchema {
    /// Short tag used in headings and validation messages ("ABC", "Bat", "GA").
    pub tag: &'static str,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

impl ParameterSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

const UNIT: Rule = Rule::Within {
    lo: 0.0,
    lo_open: false,
    hi: 1.0,
    hi_open: false,
};

const UNIT_OPEN_LOW: Rule = Rule::Within {
    lo: 0.0,
    lo_open: true,
    hi: 1.0,
    hi_open: false,
};

/// Fields shared by every run request, in validation order.
pub static GLOBAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::int("iterations", "Iterations", "100")
        .min(1.0)
        .rule(Rule::IntAtLeast(1)),
    FieldSpec::int("dimensions", "Dimensions", "2")
        .min(1.0)
        .rule(Rule::IntAtLeast(1)),
    FieldSpec::int("agents", "Agents", "20")
        .min(1.0)
        .rule(Rule::IntAtLeast(1)),
];

static ABC_FIELDS: &[FieldSpec] = &[FieldSpec::int("limit", "Trial limit", "40")
    .min(1.0)
    .rule(Rule::IntAtLeast(1))];

static BAT_FIELDS: &[FieldSpec] = &[
    FieldSpec::float("alpha", "Alpha", "0.9")
        .min(0.0)
        .max(1.0)
        .step(0.1)
        .rule(UNIT_OPEN_LOW),
    FieldSpec::float("gamma", "Gamma", "0.9")
        .min(0.0)
        .max(1.0)
        .step(0.1)
        .rule(UNIT_OPEN_LOW),
    FieldSpec::float("fmin", "Min frequency", "0")
        .min(0.0)
        .rule(Rule::AtLeast(0.0)),
    FieldSpec::float("fmax", "Max frequency", "2")
        .min(0.0)
        .rule(Rule::GreaterThanField("fmin")),
];

static CROSSOVER_TYPES: &[Choice] = &[
    Choice {
        value: "arithmetic",
        label: "Arithmetic",
    },
    Choice {
        value: "single_point",
        label: "Single Point",
    },
];

static MUTATION_TYPES: &[Choice] = &[
    Choice {
        value: "gaussian",
        label: "Gaussian",
    },
    Choice {
        value: "uniform",
        label: "Uniform",
    },
];

static GA_FIELDS: &[FieldSpec] = &[
    FieldSpec::float("crossover_rate", "Crossover rate", "0.8")
        .min(0.0)
        .max(1.0)
        .step(0.1)
        .rule(UNIT),
    FieldSpec::float("mutation_rate", "Mutation rate", "0.1")
        .min(0.0)
        .max(1.0)
        .step(0.01)
        .rule(UNIT),
    FieldSpec::float("mutation_scale", "Mutation scale", "0.1")
        .min(0.0)
        .step(0.01)
        .rule(Rule::GreaterThan(0.0)),
    FieldSpec::float("elitism_rate", "Elitism rate", "0.1")
        .min(0.0)
        .max(1.0)
        .step(0.01)
        .rule(UNIT),
    FieldSpec::int("tournament_size", "Tournament size", "3")
        .min(1.0)
        .rule(Rule::IntAtLeast(1)),
    FieldSpec::choice(
        "crossover_type",
        "Crossover type",
        "arithmetic",
        CROSSOVER_TYPES,
    ),
    FieldSpec::choice("mutation_type", "Mutation type", "gaussian", MUTATION_TYPES),
];

static ABC_SCHEMA: ParameterSchema = ParameterSchema {
    tag: "ABC",
    title: "ABC parameters",
    fields: ABC_FIELDS,
};

static BAT_SCHEMA: ParameterSchema = ParameterSchema {
    tag: "Bat",
    title: "Bat parameters",
    fields: BAT_FIELDS,
};

static GA_SCHEMA: ParameterSchema = ParameterSchema {
    tag: "GA",
    title: "GA parameters",
    fields: GA_FIELDS,
};

pub static EMPTY_SCHEMA: ParameterSchema = ParameterSchema {
    tag: "",
    title: "",
    fields: &[],
};

/// Registered algorithms, in selector order.
pub static SCHEMAS: &[(&str, &ParameterSchema)] = &[
    ("abc", &ABC_SCHEMA),
    ("bat", &BAT_SCHEMA),
    ("ga", &GA_SCHEMA),
];

pub fn schema_for(id: &AlgorithmId) -> Result<&'static ParameterSchema, SchemaError> {
    SCHEMAS
        .iter()
        .find(|(key, _)| *key == id.as_str())
        .map(|(_, schema)| *schema)
        .ok_or_else(|| SchemaError::UnknownAlgorithm(id.as_str().to_string()))
}

/// Like [`schema_for`], but an unregistered id yields the empty schema.
pub fn schema_or_empty(id: &AlgorithmId) -> &'static ParameterSchema {
    match schema_for(id) {
        Ok(schema) => schema,
        Err(e) => {
            tracing::warn!("{e}; using an empty parameter schema");
            &EMPTY_SCHEMA
        }
    }
}

/// Identifier of a benchmark objective function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectiveId {
    Sphere,
    Rastrigin,
    Rosenbrock,
    Ackley,
    Griewank,
    Schwefel,
    Zakharov,
    Unknown(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectiveSpec {
    pub key: &'static str,
    pub name: &'static str,
    /// Shared lower/upper limit of every coordinate.
    pub domain: (f64, f64),
    pub bounds_info: &'static str,
}

pub static OBJECTIVES: &[ObjectiveSpec] = &[
    ObjectiveSpec {
        key: "sphere",
        name: "Sphere",
        domain: (-10.0, 10.0),
        bounds_info: "Range: [-10, 10]",
    },
    ObjectiveSpec {
        key: "rastrigin",
        name: "Rastrigin",
        domain: (-5.12, 5.12),
        bounds_info: "Range: [-5.12, 5.12]",
    },
    ObjectiveSpec {
        key: "rosenbrock",
        name: "Rosenbrock",
        domain: (-5.0, 5.0),
        bounds_info: "Range: [-5, 5]",
    },
    ObjectiveSpec {
        key: "ackley",
        name: "Ackley",
        domain: (-5.0, 5.0),
        bounds_info: "Range: [-5, 5]",
    },
    ObjectiveSpec {
        key: "griewank",
        name: "Griewank",
        domain: (-600.0, 600.0),
        bounds_info: "Range: [-600, 600]",
    },
    ObjectiveSpec {
        key: "schwefel",
        name: "Schwefel",
        domain: (-500.0, 500.0),
        bounds_info: "Range: [-500, 500]",
    },
    ObjectiveSpec {
        key: "zakharov",
        name: "Zakharov",
        domain: (-5.0, 10.0),
        bounds_info: "Range: [-5, 10]",
    },
];

impl ObjectiveId {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "sphere" => ObjectiveId::Sphere,
            "rastrigin" => ObjectiveId::Rastrigin,
            "rosenbrock" => ObjectiveId::Rosenbrock,
            "ackley" => ObjectiveId::Ackley,
            "griewank" => ObjectiveId::Griewank,
            "schwefel" => ObjectiveId::Schwefel,
            "zakharov" => ObjectiveId::Zakharov,
            other => ObjectiveId::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ObjectiveId::Sphere => "sphere",
            ObjectiveId::Rastrigin => "rastrigin",
            ObjectiveId::Rosenbrock => "rosenbrock",
            ObjectiveId::Ackley => "ackley",
            ObjectiveId::Griewank => "griewank",
            ObjectiveId::Schwefel => "schwefel",
            ObjectiveId::Zakharov => "zakharov",
            ObjectiveId::Unknown(s) => s.as_str(),
        }
    }

    pub fn spec(&self) -> Option<&'static ObjectiveSpec> {
        OBJECTIVES.iter().find(|o| o.key == self.as_str())
    }

    /// Static bounds description; empty for an unknown objective.
    pub fn bounds_info(&self) -> &'static str {
        self.spec().map(|o| o.bounds_info).unwrap_or("")
    }

    pub fn domain(&self) -> Option<(f64, f64)> {
        self.spec().map(|o| o.domain)
    }
}

impl Default for ObjectiveId {
    fn default() -> Self {
        ObjectiveId::Sphere
    }
}

impl From<String> for ObjectiveId {
    fn from(s: String) -> Self {
        ObjectiveId::parse(&s)
    }
}

impl From<ObjectiveId> for String {
    fn from(id: ObjectiveId) -> Self {
        id.as_str().to_string()
    }
}
