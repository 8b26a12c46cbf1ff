use leptos::prelude::*;

use swarmview::convergence::ConvergenceRenderer;
use swarmview::orchestrator::RunSurfaces;
use swarmview::playback::{PlaybackClip, Placeholder};
use swarmview::protocol::Stats;
use swarmview::stats::{present_stats, ResultSummary, StatRow};

use super::charts::CanvasChart;
use super::playback_view::AnimationView;

/// Reactive page state written by the orchestrator.
#[derive(Clone, Copy)]
pub(super) struct PageSurfaces {
    pub status: RwSignal<String>,
    pub validation: RwSignal<Vec<String>>,
    pub error: RwSignal<Option<String>>,
    pub summary: RwSignal<Option<ResultSummary>>,
    pub stats: RwSignal<Option<Vec<StatRow>>>,
    pub chart: StoredValue<ConvergenceRenderer<CanvasChart>, LocalStorage>,
    pub animation: StoredValue<AnimationView, LocalStorage>,
}

impl RunSurfaces for PageSurfaces {
    fn reset(&mut self) {
        self.validation.set(Vec::new());
        self.error.set(None);
        self.summary.set(None);
        self.stats.set(None);
        self.chart.update_value(|c| c.clear());
        self.animation.with_value(|a| a.stop());
    }

    fn set_status(&mut self, text: &str) {
        self.status.set(text.to_string());
    }

    fn show_validation_errors(&mut self, messages: &[String]) {
        self.validation.set(messages.to_vec());
    }

    fn show_error(&mut self, message: &str) {
        self.error.set(Some(message.to_string()));
    }

    fn show_summary(&mut self, summary: &ResultSummary) {
        self.summary.set(Some(summary.clone()));
    }

    fn show_stats(&mut self, stats: Option<&Stats>) {
        self.stats.set(present_stats(stats));
    }

    fn show_convergence(&mut self, history: &[f64]) {
        self.chart.update_value(|c| {
            if let Err(e) = c.render(history) {
                tracing::warn!("convergence chart: {e}");
            }
        });
    }

    fn start_playback(&mut self, clip: PlaybackClip) {
        self.animation.with_value(|a| a.play(clip));
    }

    fn show_placeholder(&mut self, placeholder: &Placeholder) {
        self.animation.with_value(|a| a.show_placeholder(placeholder));
    }
}
