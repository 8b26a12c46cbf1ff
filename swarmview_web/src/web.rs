use leptos::html::Canvas;
use leptos::prelude::*;
use leptos::task::spawn_local;

use swarmview::config::ClientConfig;
use swarmview::convergence::ConvergenceRenderer;
use swarmview::orchestrator::{RunOrchestrator, UiRunState};
use swarmview::protocol::RunTransport;
use swarmview::request::RunForm;
use swarmview::schema::{schema_or_empty, AlgorithmId, ObjectiveId};

use crate::ui_model::{algorithm_options, objective_options, field_has_error, Sections};

mod canvas;
mod charts;
mod fetch;
mod logging;
mod parameter_field;
mod playback_view;
mod surfaces;

use charts::CanvasChart;
use fetch::FetchTransport;
use parameter_field::ParameterField;
use playback_view::AnimationView;
use surfaces::PageSurfaces;

/// Host pages may override client settings with
/// `<script id="swarmview-config" type="application/json">{...}</script>`.
const CONFIG_ELEMENT_ID: &str = "swarmview-config";

pub fn start() {
    logging::init();
    mount_to_body(|| view! { <App /> });
}

fn load_config() -> ClientConfig {
    let text = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|e| e.text_content());
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return ClientConfig::default();
    };
    match ClientConfig::from_json_str(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("{e}; using default settings");
            ClientConfig::default()
        }
    }
}

#[component]
fn App() -> impl IntoView {
    let config = load_config();
    tracing::info!(endpoint = %config.endpoint, "swarmview client ready");

    let form = RwSignal::new(RunForm::default());
    let run_state = RwSignal::new(UiRunState::Idle);
    let has_errors = RwSignal::new(false);

    let chart_ref = NodeRef::<Canvas>::new();
    let animation_ref = NodeRef::<Canvas>::new();

    let page = PageSurfaces {
        status: RwSignal::new(String::new()),
        validation: RwSignal::new(Vec::new()),
        error: RwSignal::new(None),
        summary: RwSignal::new(None),
        stats: RwSignal::new(None),
        chart: StoredValue::new_local(ConvergenceRenderer::new(CanvasChart { node: chart_ref })),
        animation: StoredValue::new_local(AnimationView::new(animation_ref, &config)),
    };
    let orchestrator = StoredValue::new_local(RunOrchestrator::new());
    let endpoint = StoredValue::new(config.endpoint.clone());

    let sync_state = move || {
        orchestrator.with_value(|o| {
            run_state.set(o.state());
            has_errors.set(o.has_errors());
        });
    };

    let submit = move || {
        let snapshot = form.get_untracked();
        let mut surfaces = page;
        let pending = orchestrator.try_update_value(|o| o.begin(&snapshot, &mut surfaces));
        sync_state();
        let Some(Ok(pending)) = pending else {
            return;
        };

        let transport = FetchTransport {
            endpoint: endpoint.get_value(),
        };
        spawn_local(async move {
            let reply = transport.post_run(&pending.request).await;
            let mut surfaces = page;
            orchestrator.update_value(|o| {
                o.complete(pending, reply, &mut surfaces);
            });
            sync_state();
        });
    };

    let sections = move || Sections::for_state(run_state.get(), has_errors.get());
    let algorithm = Memo::new(move |_| form.with(|f| f.algorithm().clone()));

    let global_input = move |label: &'static str,
                             name: &'static str,
                             get: fn(&RunForm) -> &String,
                             set: fn(&mut RunForm, String)| {
        view! {
            <div class="param-field" class:invalid=move || page.validation.with(|m| field_has_error(m, name))>
                <label class="param-label" for=format!("global-{name}")>{label}</label>
                <input
                    id=format!("global-{name}")
                    class="input"
                    type="number"
                    inputmode="numeric"
                    min="1"
                    step="1"
                    prop:value=move || form.with(|f| get(f).clone())
                    on:input=move |ev| {
                        let raw = event_target_value(&ev);
                        form.update(|f| set(f, raw));
                    }
                />
            </div>
        }
    };

    view! {
        <main style="font-family: system-ui, -apple-system, Segoe UI, Roboto, sans-serif; padding: 18px; max-width: 960px; margin: 0 auto;">
            <h1 style="margin: 0 0 8px 0;">"Swarm optimization runs"</h1>

            <section class="run-form" style="display: flex; gap: 12px; flex-wrap: wrap; align-items: flex-end; margin-bottom: 14px;">
                <div class="param-field">
                    <label class="param-label" for="algorithm">"Algorithm"</label>
                    <select
                        id="algorithm"
                        class="input"
                        prop:value=move || algorithm.get().as_str().to_string()
                        on:change=move |ev| {
                            let id = AlgorithmId::parse(&event_target_value(&ev));
                            form.update(|f| f.select_algorithm(id));
                        }
                    >
                        {algorithm_options()
                            .into_iter()
                            .map(|o| view! { <option value={o.value}>{o.label}</option> })
                            .collect_view()}
                    </select>
                </div>

                <div class="param-field">
                    <label class="param-label" for="objective">"Objective"</label>
                    <select
                        id="objective"
                        class="input"
                        prop:value=move || form.with(|f| f.objective.as_str().to_string())
                        on:change=move |ev| {
                            let id = ObjectiveId::parse(&event_target_value(&ev));
                            form.update(|f| f.objective = id);
                        }
                    >
                        {objective_options()
                            .into_iter()
                            .map(|o| view! { <option value={o.value}>{o.label}</option> })
                            .collect_view()}
                    </select>
                    <small class="bounds-info">{move || form.with(|f| f.bounds_info())}</small>
                </div>

                {global_input("Iterations", "iterations", |f| &f.iterations, |f, v| f.iterations = v)}
                {global_input("Dimensions", "dimensions", |f| &f.dimensions, |f, v| f.dimensions = v)}
                {global_input("Agents", "agents", |f| &f.agents, |f, v| f.agents = v)}
            </section>

            <section class="param-panel" style="margin-bottom: 14px;">
                {move || {
                    let schema = schema_or_empty(&algorithm.get());
                    view! {
                        <h3 style="margin: 0 0 8px 0;">{schema.title}</h3>
                        <div style="display: flex; gap: 12px; flex-wrap: wrap;">
                            {schema
                                .fields
                                .iter()
                                .map(|spec| view! { <ParameterField spec=spec form=form validation={page.validation} /> })
                                .collect_view()}
                        </div>
                    }
                }}
            </section>

            <section style="display: flex; gap: 10px; align-items: center; margin-bottom: 14px;">
                <button
                    class="btn"
                    disabled=move || sections().busy
                    on:click=move |_| submit()
                >
                    "Start"
                </button>
                <span class="status">{move || page.status.get()}</span>
            </section>

            <Show when=move || sections().validation_errors>
                <ul class="validation-errors" style="color: #f87171;">
                    {move || {
                        page.validation
                            .get()
                            .into_iter()
                            .map(|m| view! { <li>{m}</li> })
                            .collect_view()
                    }}
                </ul>
            </Show>

            <Show when=move || sections().error_panel>
                <div class="error-panel" style="color: #f87171; margin-bottom: 14px;">
                    {move || page.error.get().unwrap_or_default()}
                </div>
            </Show>

            <Show when=move || sections().results>
                <section class="results" style="margin-bottom: 14px;">
                    {move || {
                        page.summary
                            .get()
                            .map(|s| {
                                view! {
                                    <div>{format!("Best value: {}", s.best_value)}</div>
                                    <div>{format!("Best solution: {}", s.solution_text())}</div>
                                }
                            })
                    }}
                    {move || {
                        page.stats
                            .get()
                            .map(|rows| {
                                view! {
                                    <table class="stats" style="margin-top: 10px;">
                                        {rows
                                            .into_iter()
                                            .map(|r| view! { <tr><th style="text-align: left; padding-right: 16px;">{r.label}</th><td>{r.value}</td></tr> })
                                            .collect_view()}
                                    </table>
                                }
                            })
                    }}
                </section>
            </Show>

            // Canvases stay laid out so they can be sized before the results appear.
            <section style="display: grid; grid-template-columns: 1fr 1fr; gap: 14px;">
                <div>
                    <h3 style="margin: 0 0 8px 0;">"Convergence"</h3>
                    <canvas node_ref=chart_ref style="width: 100%; height: 320px;"></canvas>
                </div>
                <div>
                    <h3 style="margin: 0 0 8px 0;">"Agent positions"</h3>
                    <canvas node_ref=animation_ref style="width: 100%; aspect-ratio: 1 / 1;"></canvas>
                </div>
            </section>
        </main>
    }
}
