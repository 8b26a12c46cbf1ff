//! `POST` of a run request through the browser's `fetch`.

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use swarmview::error::RunError;
use swarmview::protocol::{HttpReply, RunTransport};
use swarmview::request::RunRequest;

fn js_err(what: &str, e: wasm_bindgen::JsValue) -> RunError {
    RunError::Transport(format!("{what}: {e:?}"))
}

pub(super) struct FetchTransport {
    pub endpoint: String,
}

impl RunTransport for FetchTransport {
    async fn post_run(&self, request: &RunRequest) -> Result<HttpReply, RunError> {
        let body = serde_json::to_string(request)
            .map_err(|e| RunError::Transport(format!("serialize: {e}")))?;

        let headers = Headers::new().map_err(|e| js_err("headers", e))?;
        headers
            .set("Content-Type", "application/json")
            .map_err(|e| js_err("headers", e))?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&body.into());

        let req = Request::new_with_str_and_init(&self.endpoint, &init)
            .map_err(|e| js_err("request", e))?;
        let window =
            web_sys::window().ok_or_else(|| RunError::Transport("no window".to_string()))?;

        // A rejected fetch promise means no HTTP response was received at all.
        let resp = JsFuture::from(window.fetch_with_request(&req))
            .await
            .map_err(|e| js_err("fetch", e))?;
        let resp: Response = resp
            .dyn_into()
            .map_err(|_| RunError::Transport("fetch: not a Response".to_string()))?;

        let status = resp.status();
        let text = resp.text().map_err(|e| js_err("body", e))?;
        let text = JsFuture::from(text).await.map_err(|e| js_err("body", e))?;

        Ok(HttpReply {
            status,
            body: text.as_string().unwrap_or_default(),
        })
    }
}
