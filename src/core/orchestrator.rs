//! Submission lifecycle: validate, send, then fan the result out to the renderers.
//!
//! ```text
//! Idle --submit--> Validating --ok--> Requesting --ok--> Succeeded
//!                      |                   \----fail--> Failed
//!                      \--fail--> Idle (has errors)
//! ```
//!
//! Every submission gets a token. A completion carrying an older token is dropped, so a
//! slow response can never paint over a newer run.

use crate::error::RunError;
use crate::float_fmt::fmt_f64_fixed;
use crate::playback::{PlaybackClip, Placeholder};
use crate::protocol::{interpret_reply, HttpReply, RunResult, RunTransport, Stats};
use crate::request::{RunForm, RunRequest};
use crate::stats::ResultSummary;
use crate::time::{seconds_since, Instant};
use crate::validation::validate;

pub const STATUS_INVALID: &str = "Fix the highlighted input errors.";
pub const STATUS_RUNNING: &str = "Running...";
pub const STATUS_FAILED: &str = "An error occurred.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UiRunState {
    #[default]
    Idle,
    Validating,
    Requesting,
    Succeeded,
    Failed,
}

impl UiRunState {
    pub fn as_str(self) -> &'static str {
        match self {
            UiRunState::Idle => "idle",
            UiRunState::Validating => "validating",
            UiRunState::Requesting => "requesting",
            UiRunState::Succeeded => "succeeded",
            UiRunState::Failed => "failed",
        }
    }
}

/// Render targets driven by the orchestrator.
///
/// `reset` must clear every panel, dispose the chart and cancel playback.
pub trait RunSurfaces {
    fn reset(&mut self);
    fn set_status(&mut self, text: &str);
    fn show_validation_errors(&mut self, messages: &[String]);
    fn show_error(&mut self, message: &str);
    fn show_summary(&mut self, summary: &ResultSummary);
    /// `None` hides the stats section.
    fn show_stats(&mut self, stats: Option<&Stats>);
    fn show_convergence(&mut self, history: &[f64]);
    fn start_playback(&mut self, clip: PlaybackClip);
    fn show_placeholder(&mut self, placeholder: &Placeholder);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunToken(u64);

/// A validated request waiting for its response.
#[derive(Debug)]
pub struct PendingRun {
    pub token: RunToken,
    pub request: RunRequest,
    started: Instant,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    /// Validation failed; nothing was sent.
    Rejected(Vec<String>),
    Succeeded,
    Failed(RunError),
    /// A newer submission superseded this one; nothing was rendered.
    Stale,
}

#[derive(Debug, Default)]
pub struct RunOrchestrator {
    state: UiRunState,
    has_errors: bool,
    generation: u64,
    result: Option<RunResult>,
}

impl RunOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UiRunState {
        self.state
    }

    /// Idle because the last submission failed validation.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn result(&self) -> Option<&RunResult> {
        self.result.as_ref()
    }

    /// Validates the form and, if it passes, hands back the request to send.
    ///
    /// Surfaces are reset either way, and any in-flight request becomes stale.
    pub fn begin(
        &mut self,
        form: &RunForm,
        surfaces: &mut impl RunSurfaces,
    ) -> Result<PendingRun, Vec<String>> {
        self.transition(UiRunState::Validating);
        self.generation = self.generation.wrapping_add(1);
        self.has_errors = false;
        self.result = None;
        surfaces.reset();

        let request = form.to_request();
        let validation = validate(&request);
        if !validation.is_valid() {
            let messages = validation.into_messages();
            tracing::info!(violations = messages.len(), "run rejected by validation");
            surfaces.show_validation_errors(&messages);
            surfaces.set_status(STATUS_INVALID);
            self.has_errors = true;
            self.transition(UiRunState::Idle);
            return Err(messages);
        }

        surfaces.set_status(STATUS_RUNNING);
        self.transition(UiRunState::Requesting);
        tracing::info!(
            algorithm = request.algorithm.as_str(),
            objective = request.objective.as_str(),
            "submitting run"
        );
        Ok(PendingRun {
            token: RunToken(self.generation),
            request,
            started: Instant::now(),
        })
    }

    /// Renders the response to `pending`, unless a newer submission has started.
    pub fn complete(
        &mut self,
        pending: PendingRun,
        reply: Result<HttpReply, RunError>,
        surfaces: &mut impl RunSurfaces,
    ) -> RunOutcome {
        if pending.token != RunToken(self.generation) || self.state != UiRunState::Requesting {
            tracing::debug!(token = pending.token.0, "dropping stale response");
            return RunOutcome::Stale;
        }

        let parsed = reply.and_then(|r| interpret_reply(&r));
        match parsed {
            Ok(result) => {
                let elapsed = seconds_since(pending.started);
                self.render_result(&pending.request, result, elapsed, surfaces);
                RunOutcome::Succeeded
            }
            Err(err) => {
                match &err {
                    RunError::Malformed(detail) => tracing::warn!("malformed run response: {detail}"),
                    other => tracing::warn!("run failed: {other}"),
                }
                surfaces.show_error(&err.user_message());
                surfaces.set_status(STATUS_FAILED);
                self.transition(UiRunState::Failed);
                RunOutcome::Failed(err)
            }
        }
    }

    /// `begin`, send, `complete`.
    pub async fn submit<T: RunTransport, S: RunSurfaces>(
        &mut self,
        transport: &T,
        form: &RunForm,
        surfaces: &mut S,
    ) -> RunOutcome {
        let pending = match self.begin(form, surfaces) {
            Ok(p) => p,
            Err(messages) => return RunOutcome::Rejected(messages),
        };
        let reply = transport.post_run(&pending.request).await;
        self.complete(pending, reply, surfaces)
    }

    fn render_result(
        &mut self,
        request: &RunRequest,
        result: RunResult,
        elapsed_s: f64,
        surfaces: &mut impl RunSurfaces,
    ) {
        surfaces.show_summary(&ResultSummary::from_result(&result));
        surfaces.show_stats(result.stats.as_ref());
        surfaces.show_convergence(&result.history);
        match PlaybackClip::from_result(&result, &request.objective) {
            Ok(clip) => surfaces.start_playback(clip),
            Err(placeholder) => surfaces.show_placeholder(&placeholder),
        }
        surfaces.set_status(&finished_status(elapsed_s));
        tracing::info!(
            best_value = result.best_value,
            iterations = result.history.len(),
            "run finished"
        );
        self.result = Some(result);
        self.transition(UiRunState::Succeeded);
    }

    fn transition(&mut self, next: UiRunState) {
        tracing::debug!(from = self.state.as_str(), to = next.as_str(), "run state");
        self.state = next;
    }
}

pub fn finished_status(elapsed_s: f64) -> String {
    format!("Finished in {} s.", fmt_f64_fixed(elapsed_s, 3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AlgorithmId;

    #[derive(Default)]
    struct Log(Vec<String>);

    impl RunSurfaces for Log {
        fn reset(&mut self) {
            self.0.push("reset".into());
        }
        fn set_status(&mut self, text: &str) {
            self.0.push(format!("status:{text}"));
        }
        fn show_validation_errors(&mut self, messages: &[String]) {
            self.0.push(format!("invalid:{}", messages.len()));
        }
        fn show_error(&mut self, message: &str) {
            self.0.push(format!("error:{message}"));
        }
        fn show_summary(&mut self, summary: &ResultSummary) {
            self.0.push(format!("summary:{}", summary.best_value));
        }
        fn show_stats(&mut self, stats: Option<&Stats>) {
            self.0.push(format!("stats:{}", stats.is_some()));
        }
        fn show_convergence(&mut self, history: &[f64]) {
            self.0.push(format!("chart:{}", history.len()));
        }
        fn start_playback(&mut self, clip: PlaybackClip) {
            self.0.push(format!("play:{}", clip.frame_count()));
        }
        fn show_placeholder(&mut self, placeholder: &Placeholder) {
            self.0.push(format!("placeholder:{placeholder:?}"));
        }
    }

    const BODY_2D: &str = r#"{"best":[0,0],"best_value":1e-3,"history":[1,0.1,0.001],
        "dimensions":2,"positions":[[[1,1]],[[0,0]]],"bounds":[-10,10]}"#;

    #[test]
    fn invalid_form_returns_to_idle_with_errors() {
        let mut o = RunOrchestrator::new();
        let mut s = Log::default();
        let mut form = RunForm::default();
        form.iterations = "0".into();

        let messages = o.begin(&form, &mut s).unwrap_err();
        assert_eq!(messages.len(), 1);
        assert_eq!(o.state(), UiRunState::Idle);
        assert!(o.has_errors());
        let expected = [
            "reset".to_string(),
            "invalid:1".to_string(),
            format!("status:{STATUS_INVALID}"),
        ];
        assert_eq!(s.0, expected);
    }

    #[test]
    fn success_renders_every_panel_in_order() {
        let mut o = RunOrchestrator::new();
        let mut s = Log::default();
        let pending = o.begin(&RunForm::default(), &mut s).unwrap();
        assert_eq!(o.state(), UiRunState::Requesting);

        let outcome = o.complete(pending, Ok(HttpReply::new(200, BODY_2D)), &mut s);
        assert_eq!(outcome, RunOutcome::Succeeded);
        assert_eq!(o.state(), UiRunState::Succeeded);
        assert_eq!(o.result().map(|r| r.dimensions), Some(2));
        assert_eq!(
            &s.0[..6],
            &["reset", "status:Running...", "summary:1.0000e-3", "stats:false", "chart:3", "play:2"]
        );
        assert!(s.0[6].starts_with("status:Finished in "));
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut o = RunOrchestrator::new();
        let mut s = Log::default();
        let first = o.begin(&RunForm::default(), &mut s).unwrap();
        let second = o.begin(&RunForm::default(), &mut s).unwrap();
        s.0.clear();

        assert_eq!(
            o.complete(first, Ok(HttpReply::new(200, BODY_2D)), &mut s),
            RunOutcome::Stale
        );
        assert!(s.0.is_empty());
        assert_eq!(o.state(), UiRunState::Requesting);

        let err = Err(RunError::Transport("offline".into()));
        assert!(matches!(o.complete(second, err, &mut s), RunOutcome::Failed(_)));
        assert_eq!(o.state(), UiRunState::Failed);
    }

    #[test]
    fn validation_failure_invalidates_in_flight_request() {
        let mut o = RunOrchestrator::new();
        let mut s = Log::default();
        let pending = o.begin(&RunForm::default(), &mut s).unwrap();

        let mut bad = RunForm::default();
        bad.select_algorithm(AlgorithmId::Bat);
        bad.panel.set_raw("fmin", "1");
        bad.panel.set_raw("fmax", "0.5");
        assert!(o.begin(&bad, &mut s).is_err());

        assert_eq!(
            o.complete(pending, Ok(HttpReply::new(200, BODY_2D)), &mut s),
            RunOutcome::Stale
        );
        assert!(o.has_errors());
    }

    #[test]
    fn malformed_success_body_fails_with_generic_message() {
        let mut o = RunOrchestrator::new();
        let mut s = Log::default();
        let pending = o.begin(&RunForm::default(), &mut s).unwrap();
        let outcome = o.complete(pending, Ok(HttpReply::new(200, "{}")), &mut s);
        assert!(matches!(outcome, RunOutcome::Failed(RunError::Malformed(_))));
        assert!(s.0.contains(&"error:Server-side error.".to_string()));
        assert_eq!(s.0.last().map(String::as_str), Some("status:An error occurred."));
    }

    #[test]
    fn finished_status_uses_three_decimals() {
        assert_eq!(finished_status(1.23456), "Finished in 1.235 s.");
    }
}
