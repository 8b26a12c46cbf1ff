//! Wire format of the optimization service (`POST /run`).

use serde::{Deserialize, Serialize};

use crate::error::RunError;
use crate::request::RunRequest;
use crate::schema::ObjectiveId;

/// One agent position. Two coordinates for 2-D runs; the service may log more.
pub type Point = Vec<f64>;

/// All agent positions at one logged iteration.
pub type Frame = Vec<Point>;

/// Summary statistics of the final population. Presentational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub best_value: f64,
    pub worst_value: f64,
    pub mean_value: f64,
    pub variance: f64,
    pub mean_distance_to_best: f64,
    /// Seconds.
    pub execution_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub best: Vec<f64>,
    pub best_value: f64,
    /// Best objective value per iteration.
    pub history: Vec<f64>,
    #[serde(default)]
    pub stats: Option<Stats>,
    /// Position log; its length is authoritative, independent of `iterations`.
    #[serde(default)]
    pub positions: Option<Vec<Frame>>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub bounds: Option<(f64, f64)>,
    pub dimensions: u32,
    #[serde(default)]
    pub objective: Option<ObjectiveId>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// A raw HTTP response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Turns a response into a run result or a classified failure.
pub fn interpret_reply(reply: &HttpReply) -> Result<RunResult, RunError> {
    if reply.is_success() {
        return serde_json::from_str::<RunResult>(&reply.body)
            .map_err(|e| RunError::Malformed(e.to_string()));
    }

    let message = serde_json::from_str::<ErrorBody>(&reply.body)
        .ok()
        .and_then(|b| b.error);
    Err(RunError::Server {
        status: reply.status,
        message,
    })
}

/// Sends a run request to the service.
///
/// Futures are not required to be `Send`: the browser transport lives on the page's
/// single thread.
#[allow(async_fn_in_trait)]
pub trait RunTransport {
    /// Resolves to the HTTP response, or [`RunError::Transport`] if none arrived.
    async fn post_run(&self, request: &RunRequest) -> Result<HttpReply, RunError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_BODY: &str = r#"{
        "best": [0.001, -0.002],
        "best_value": 5e-6,
        "history": [3.0, 1.0, 5e-6],
        "positions": [[[1.0, 2.0], [3.0, 4.0]], [[0.5, 0.5], [0.1, 0.2]]],
        "objective": "sphere",
        "dimensions": 2,
        "background": "/static/background_sphere.png",
        "bounds": [-10.0, 10.0],
        "stats": {
            "best_value": 5e-6,
            "worst_value": 0.3,
            "mean_value": 0.1,
            "variance": 0.01,
            "mean_distance_to_best": 0.25,
            "execution_time": 1.5
        }
    }"#;

    #[test]
    fn parses_a_full_success_body() {
        let r = interpret_reply(&HttpReply::new(200, OK_BODY)).unwrap();
        assert_eq!(r.dimensions, 2);
        assert_eq!(r.history.len(), 3);
        assert_eq!(r.bounds, Some((-10.0, 10.0)));
        assert_eq!(r.positions.as_ref().map(Vec::len), Some(2));
        assert_eq!(r.objective, Some(ObjectiveId::Sphere));
        assert_eq!(r.stats.unwrap().execution_time, 1.5);
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let body = r#"{"best":[1.0,2.0,3.0],"best_value":14.0,"history":[20.0,14.0],"dimensions":3}"#;
        let r = interpret_reply(&HttpReply::new(200, body)).unwrap();
        assert!(r.positions.is_none());
        assert!(r.stats.is_none());
        assert!(r.background.is_none());
    }

    #[test]
    fn high_dimensional_positions_still_parse() {
        let body = r#"{"best":[0,0,0],"best_value":0,"history":[1],"dimensions":3,
                       "positions":[[[1,2,3],[4,5,6]]]}"#;
        let r = interpret_reply(&HttpReply::new(200, body)).unwrap();
        assert_eq!(r.positions.unwrap()[0][1], vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn success_with_bad_body_is_malformed() {
        let err = interpret_reply(&HttpReply::new(200, "<html>oops</html>")).unwrap_err();
        assert!(matches!(err, RunError::Malformed(_)));

        let err = interpret_reply(&HttpReply::new(200, r#"{"best":[]}"#)).unwrap_err();
        assert!(matches!(err, RunError::Malformed(_)));
    }

    #[test]
    fn error_body_message_is_extracted() {
        let err =
            interpret_reply(&HttpReply::new(400, r#"{"error":"bounds exceeded"}"#)).unwrap_err();
        assert_eq!(
            err,
            RunError::Server {
                status: 400,
                message: Some("bounds exceeded".to_string())
            }
        );
    }

    #[test]
    fn unparseable_error_body_has_no_message() {
        for body in ["", "Internal Server Error", r#"{"error": 42}"#, r#"{"detail":"x"}"#] {
            let err = interpret_reply(&HttpReply::new(500, body)).unwrap_err();
            assert_eq!(
                err,
                RunError::Server {
                    status: 500,
                    message: None
                },
                "{body}"
            );
        }
    }
}
