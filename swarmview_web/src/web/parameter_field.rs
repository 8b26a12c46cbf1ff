use leptos::prelude::*;

use swarmview::request::RunForm;
use swarmview::schema::{FieldKind, FieldSpec};

use crate::ui_model::{bound_attr, field_has_error, step_attr};

/// One algorithm parameter input, generated from its schema entry.
#[component]
pub fn ParameterField(
    spec: &'static FieldSpec,
    form: RwSignal<RunForm>,
    validation: RwSignal<Vec<String>>,
) -> impl IntoView {
    let name = spec.name;
    let input_id = format!("param-{name}");
    let value = move || form.with(|f| f.panel.raw(name).unwrap_or_default().to_string());
    let invalid = move || validation.with(|m| field_has_error(m, name));
    let on_input = move |ev: web_sys::Event| {
        let raw = event_target_value(&ev);
        form.update(|f| {
            f.panel.set_raw(name, raw);
        });
    };

    let control = match spec.kind {
        FieldKind::Enum => view! {
            <select id=input_id.clone() class="input" prop:value=value on:change=on_input>
                {spec
                    .choices
                    .iter()
                    .map(|c| view! { <option value={c.value}>{c.label}</option> })
                    .collect_view()}
            </select>
        }
        .into_any(),
        FieldKind::Int | FieldKind::Float => view! {
            <input
                id=input_id.clone()
                class="input"
                type="number"
                inputmode={if spec.kind == FieldKind::Int { "numeric" } else { "decimal" }}
                min=bound_attr(spec.min)
                max=bound_attr(spec.max)
                step=step_attr(spec)
                prop:value=value
                aria-invalid=move || invalid().to_string()
                on:input=on_input
            />
        }
        .into_any(),
    };

    view! {
        <div class="param-field" class:invalid=invalid>
            <label class="param-label" for=input_id>
                {spec.label}
            </label>
            {control}
        </div>
    }
}
