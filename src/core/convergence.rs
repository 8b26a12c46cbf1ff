//! Convergence chart model: best value per iteration on a log (or linear) axis.

use crate::float_fmt::fmt_f64_exp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisScale {
    Log,
    Linear,
}

/// The plotted series. X is the 0-based iteration index, one point per history entry.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvergenceSeries {
    /// `None` marks a gap (a value the axis cannot show).
    pub values: Vec<Option<f64>>,
    pub scale: AxisScale,
}

impl ConvergenceSeries {
    /// Log scale when every value is finite and positive; otherwise linear, with
    /// non-finite values left as gaps.
    pub fn from_history(history: &[f64]) -> Self {
        let log_ok = !history.is_empty() && history.iter().all(|v| v.is_finite() && *v > 0.0);
        let scale = if log_ok {
            AxisScale::Log
        } else {
            AxisScale::Linear
        };
        if !log_ok && !history.is_empty() {
            tracing::debug!("history has non-positive values; using a linear axis");
        }
        let values = history
            .iter()
            .map(|v| v.is_finite().then_some(*v))
            .collect();
        Self { values, scale }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
    }

    /// Smallest and largest plotted value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.points().fold(None, |acc, (_, v)| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Axis extent in axis units (decades for log scale), padded so a flat series
    /// still gets a visible range.
    pub fn axis_range(&self) -> Option<(f64, f64)> {
        let (lo, hi) = self.value_range()?;
        let (lo, hi) = match self.scale {
            AxisScale::Log => (lo.log10().floor(), hi.log10().ceil()),
            AxisScale::Linear => (lo, hi),
        };
        if hi > lo {
            return Some((lo, hi));
        }
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
        Some((lo - pad, hi + pad))
    }

    /// Vertical position of `v` as a fraction of the plot height (0 = bottom).
    pub fn y_fraction(&self, v: f64) -> Option<f64> {
        let (lo, hi) = self.axis_range()?;
        let a = match self.scale {
            AxisScale::Log => v.log10(),
            AxisScale::Linear => v,
        };
        Some((a - lo) / (hi - lo))
    }

    /// Horizontal position of iteration `i` as a fraction of the plot width.
    pub fn x_fraction(&self, i: usize) -> f64 {
        if self.values.len() <= 1 {
            0.0
        } else {
            i as f64 / (self.values.len() - 1) as f64
        }
    }

    /// Tick values with labels: every decade for log scale, five even steps otherwise.
    pub fn y_ticks(&self) -> Vec<(f64, String)> {
        let Some((lo, hi)) = self.axis_range() else {
            return Vec::new();
        };
        match self.scale {
            AxisScale::Log => {
                let (lo, hi) = (lo as i32, hi as i32);
                // Thin out very wide ranges to at most ~8 labels.
                let stride = ((hi - lo) / 8 + 1).max(1) as usize;
                (lo..=hi)
                    .step_by(stride)
                    .map(|e| {
                        let v = 10_f64.powi(e);
                        (v, fmt_f64_exp(v, 0))
                    })
                    .collect()
            }
            AxisScale::Linear => (0..=4)
                .map(|k| {
                    let v = lo + (hi - lo) * k as f64 / 4.0;
                    (v, fmt_f64_exp(v, 2))
                })
                .collect(),
        }
    }
}

/// Draws and disposes chart instances on some surface.
pub trait ChartBackend {
    type Chart;

    fn create(&mut self, series: &ConvergenceSeries) -> Result<Self::Chart, String>;

    fn dispose(&mut self, chart: Self::Chart);
}

/// Owns the single live chart. Each render disposes the previous chart first.
pub struct ConvergenceRenderer<B: ChartBackend> {
    backend: B,
    chart: Option<B::Chart>,
}

impl<B: ChartBackend> ConvergenceRenderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            chart: None,
        }
    }

    pub fn render(&mut self, history: &[f64]) -> Result<(), String> {
        self.clear();
        let series = ConvergenceSeries::from_history(history);
        self.chart = Some(self.backend.create(&series)?);
        Ok(())
    }

    pub fn clear(&mut self) {
        if let Some(chart) = self.chart.take() {
            self.backend.dispose(chart);
        }
    }

    pub fn is_showing(&self) -> bool {
        self.chart.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_history_uses_log_scale() {
        let s = ConvergenceSeries::from_history(&[100.0, 10.0, 1.0, 0.01]);
        assert_eq!(s.scale, AxisScale::Log);
        assert_eq!(s.len(), 4);
        assert_eq!(s.axis_range(), Some((-2.0, 2.0)));
        assert_eq!(s.y_fraction(1.0), Some(0.5));
        assert_eq!(s.x_fraction(3), 1.0);
    }

    #[test]
    fn zero_or_negative_values_switch_to_linear() {
        let s = ConvergenceSeries::from_history(&[3.0, 1.0, 0.0]);
        assert_eq!(s.scale, AxisScale::Linear);
        assert_eq!(s.points().count(), 3);

        let s = ConvergenceSeries::from_history(&[-1.0, -2.0]);
        assert_eq!(s.scale, AxisScale::Linear);
    }

    #[test]
    fn non_finite_values_become_gaps() {
        let s = ConvergenceSeries::from_history(&[f64::INFINITY, 2.0, f64::NAN, 1.0]);
        assert_eq!(s.scale, AxisScale::Linear);
        assert_eq!(s.values, vec![None, Some(2.0), None, Some(1.0)]);
        let xs: Vec<usize> = s.points().map(|(i, _)| i).collect();
        assert_eq!(xs, vec![1, 3]);
        assert_eq!(s.value_range(), Some((1.0, 2.0)));
    }

    #[test]
    fn flat_series_still_has_a_range() {
        let s = ConvergenceSeries::from_history(&[0.0, 0.0]);
        let (lo, hi) = s.axis_range().unwrap();
        assert!(hi > lo);

        let s = ConvergenceSeries::from_history(&[1.0, 1.0]);
        let (lo, hi) = s.axis_range().unwrap();
        assert!(hi > lo);
        assert_eq!(s.x_fraction(0), 0.0);
    }

    #[test]
    fn empty_history_has_no_ticks() {
        let s = ConvergenceSeries::from_history(&[]);
        assert!(s.is_empty());
        assert!(s.y_ticks().is_empty());
        assert_eq!(s.y_fraction(1.0), None);
    }

    #[test]
    fn log_ticks_are_decades() {
        let s = ConvergenceSeries::from_history(&[500.0, 0.002]);
        let labels: Vec<String> = s.y_ticks().into_iter().map(|(_, l)| l).collect();
        assert_eq!(labels, vec!["1e-3", "1e-2", "1e-1", "1e+0", "1e+1", "1e+2", "1e+3"]);
    }

    #[derive(Default)]
    struct CountingBackend {
        created: usize,
        disposed: Vec<usize>,
    }

    impl ChartBackend for CountingBackend {
        type Chart = usize;

        fn create(&mut self, _series: &ConvergenceSeries) -> Result<usize, String> {
            self.created += 1;
            Ok(self.created)
        }

        fn dispose(&mut self, chart: usize) {
            self.disposed.push(chart);
        }
    }

    #[test]
    fn each_render_disposes_the_previous_chart() {
        let mut r = ConvergenceRenderer::new(CountingBackend::default());
        r.render(&[1.0, 0.5]).unwrap();
        r.render(&[2.0, 0.1]).unwrap();
        r.render(&[3.0]).unwrap();
        assert_eq!(r.backend().created, 3);
        assert_eq!(r.backend().disposed, vec![1, 2]);
        assert!(r.is_showing());

        r.clear();
        r.clear();
        assert_eq!(r.backend().disposed, vec![1, 2, 3]);
        assert!(!r.is_showing());
    }
}
