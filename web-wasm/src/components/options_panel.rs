//! 処理オプション（モード選択・実行・リセット）

use leptos::prelude::*;
use pii_lens_common::EndpointMode;

#[component]
pub fn OptionsPanel<FM, FR, FX>(
    #[prop(into)] mode: Signal<EndpointMode>,
    #[prop(into)] has_file: Signal<bool>,
    #[prop(into)] processing: Signal<bool>,
    on_mode: FM,
    on_run: FR,
    on_reset: FX,
) -> impl IntoView
where
    FM: Fn(EndpointMode) + 'static + Clone,
    FR: Fn(()) + 'static + Clone,
    FX: Fn(()) + 'static + Clone,
{
    view! {
        <div class="options-panel">
            <h3>"Processing Options"</h3>

            <label class="field-label">"Endpoint Mode"</label>
            <select
                class="mode-select"
                disabled=move || processing.get()
                on:change=move |ev| {
                    match event_target_value(&ev).parse::<EndpointMode>() {
                        Ok(selected) => on_mode(selected),
                        Err(e) => log::warn!("{}", e),
                    }
                }
            >
                {EndpointMode::ALL
                    .into_iter()
                    .map(|m| {
                        view! {
                            <option value=m.as_str() selected=move || mode.get() == m>
                                {m.label()}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>

            <div class="option-buttons">
                <button
                    class="btn btn-primary"
                    disabled=move || !has_file.get() || processing.get()
                    on:click={
                        let on_run = on_run.clone();
                        move |_| on_run(())
                    }
                >
                    {move || if processing.get() { "Processing..." } else { "Run Analysis" }}
                </button>

                <button
                    class="btn btn-secondary"
                    disabled=move || processing.get()
                    on:click={
                        let on_reset = on_reset.clone();
                        move |_| on_reset(())
                    }
                >
                    "Reset"
                </button>
            </div>
        </div>
    }
}
