//! Client-side validation of a run request.
//!
//! Global fields are checked first, then the algorithm's schema rules in schema order.
//! Every check runs regardless of earlier failures, so one call reports every problem.

use crate::float_fmt::fmt_f64_plain;
use crate::request::{FieldValue, Params, RunRequest};
use crate::schema::{schema_or_empty, FieldSpec, Rule, GLOBAL_FIELDS};

/// Ordered violation messages; empty means the request may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    messages: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

pub fn validate(request: &RunRequest) -> ValidationResult {
    let mut messages = Vec::new();

    for spec in GLOBAL_FIELDS {
        let value = request.global(spec.name).unwrap_or(&FieldValue::Missing);
        check_field(spec, value, None, &request.params, &mut messages);
    }

    let schema = schema_or_empty(&request.algorithm);
    for spec in schema.fields {
        let value = request.params.get(spec.name).unwrap_or(&FieldValue::Missing);
        check_field(spec, value, Some(schema.tag), &request.params, &mut messages);
    }

    ValidationResult { messages }
}

fn check_field(
    spec: &FieldSpec,
    value: &FieldValue,
    tag: Option<&str>,
    params: &Params,
    out: &mut Vec<String>,
) {
    let Some(rule) = spec.rule else {
        return;
    };
    if rule_holds(rule, value, params) {
        return;
    }

    let subject = match tag {
        Some(tag) => format!("'{}' ({tag})", spec.name),
        None => format!("'{}'", spec.name),
    };
    out.push(format!("{subject} {}.", describe_rule(rule)));
}

fn rule_holds(rule: Rule, value: &FieldValue, params: &Params) -> bool {
    match rule {
        Rule::IntAtLeast(min) => value.as_integer().is_some_and(|n| n >= min),
        Rule::AtLeast(min) => value.as_f64().is_some_and(|x| x >= min),
        Rule::GreaterThan(min) => value.as_f64().is_some_and(|x| x > min),
        Rule::Within {
            lo,
            lo_open,
            hi,
            hi_open,
        } => value.as_f64().is_some_and(|x| {
            let above = if lo_open { x > lo } else { x >= lo };
            let below = if hi_open { x < hi } else { x <= hi };
            above && below
        }),
        Rule::GreaterThanField(other) => {
            // An unusable reference value fails the comparison too.
            let other = params.get(other).and_then(FieldValue::as_f64);
            match (value.as_f64(), other) {
                (Some(x), Some(o)) => x > o,
                _ => false,
            }
        }
    }
}

/// Human-readable requirement, e.g. `must be in the interval (0, 1]`.
pub fn describe_rule(rule: Rule) -> String {
    match rule {
        Rule::IntAtLeast(min) => format!("must be an integer >= {min}"),
        Rule::AtLeast(min) => format!("must be >= {}", fmt_f64_plain(min)),
        Rule::GreaterThan(min) => format!("must be > {}", fmt_f64_plain(min)),
        Rule::Within {
            lo,
            lo_open,
            hi,
            hi_open,
        } => format!(
            "must be in the interval {}{}, {}{}",
            if lo_open { '(' } else { '[' },
            fmt_f64_plain(lo),
            fmt_f64_plain(hi),
            if hi_open { ')' } else { ']' },
        ),
        Rule::GreaterThanField(other) => format!("must be greater than '{other}'"),
    }
}
