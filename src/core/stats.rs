//! Text formatting for the results panel.

use crate::float_fmt::{fmt_f64_exp, fmt_f64_fixed};
use crate::protocol::{RunResult, Stats};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatRow {
    pub label: &'static str,
    pub value: String,
}

fn row(label: &'static str, value: String) -> StatRow {
    StatRow { label, value }
}

/// Rows of the statistics table, or `None` when the section should be hidden.
pub fn present_stats(stats: Option<&Stats>) -> Option<Vec<StatRow>> {
    let s = stats?;
    Some(vec![
        row("Best value", fmt_f64_exp(s.best_value, 4)),
        row("Worst value", fmt_f64_exp(s.worst_value, 4)),
        row("Mean value", fmt_f64_exp(s.mean_value, 4)),
        row("Variance", fmt_f64_exp(s.variance, 4)),
        row("Mean distance to best", fmt_f64_fixed(s.mean_distance_to_best, 4)),
        row(
            "Execution time",
            format!("{} s", fmt_f64_fixed(s.execution_time, 3)),
        ),
    ])
}

/// Best objective value and solution vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultSummary {
    pub best_value: String,
    pub best_solution: Vec<String>,
}

impl ResultSummary {
    pub fn from_result(result: &RunResult) -> Self {
        Self {
            best_value: fmt_f64_exp(result.best_value, 4),
            best_solution: result.best.iter().map(|v| fmt_f64_exp(*v, 4)).collect(),
        }
    }

    /// `[1.0000e+0, -2.5000e-1]`
    pub fn solution_text(&self) -> String {
        format!("[{}]", self.best_solution.join(", "))
    }
}
