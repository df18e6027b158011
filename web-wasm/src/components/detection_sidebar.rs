//! 検出一覧サイドバー
//!
//! 件数、各検出の種別・信頼度・値・サイズ、ハイライトとコピー、座標の詳細を表示する

use crate::browser;
use leptos::prelude::*;
use pii_lens_common::Detection;

#[component]
pub fn DetectionSidebar<FH>(#[prop(into)] detections: Signal<Vec<Detection>>, on_highlight: FH) -> impl IntoView
where
    FH: Fn(usize) + Clone + Send + Sync + 'static,
{
    view! {
        <div class="sidebar">
            <div class="sidebar-header">
                <h3>"Detected PII"</h3>
                <span class="badge">{move || format!("{} items", detections.get().len())}</span>
            </div>

            <div class="sidebar-list">
                <Show
                    when=move || !detections.get().is_empty()
                    fallback=|| view! {
                        <div class="empty-state">
                            <div class="empty-icon">"📄"</div>
                            <div class="text-muted">"No PII detected yet"</div>
                            <div class="text-small">"Upload an image to start detection"</div>
                        </div>
                    }
                >
                    {
                        let on_highlight = on_highlight.clone();
                        move || {
                            detections
                                .get()
                                .into_iter()
                                .enumerate()
                                .map(|(index, detection)| detection_item(index, detection, on_highlight.clone()))
                                .collect_view()
                        }
                    }
                </Show>
            </div>

            <div class="sidebar-footer">
                <div>"ℹ Use " <code>"process-image"</code> " endpoint"</div>
                <div class="text-small">"to get both JSON data and base64 masked image"</div>
            </div>
        </div>
    }
}

fn detection_item<FH>(index: usize, detection: Detection, on_highlight: FH) -> impl IntoView
where
    FH: Fn(usize) + Send + Sync + 'static,
{
    let level = detection.confidence_level();
    let confidence_class = format!("confidence {}", level.as_str());
    let drawable = detection.coordinates.is_drawable();
    let value = detection.value.clone();
    let coords = detection.coordinates;

    view! {
        <div class="detection-item">
            <div class="detection-head">
                <div class="detection-main">
                    <div class="detection-title">
                        <span class="detection-type">{detection.kind.clone()}</span>
                        <span class=confidence_class.clone()>{level.label()}</span>
                    </div>
                    <div class="detection-value">{detection.value.clone()}</div>
                </div>
                <div class="detection-meta">
                    <div class=confidence_class>{format!("{}%", detection.confidence_percent())}</div>
                    {detection.dimensions_label().map(|dims| view! { <div class="text-small">{dims}</div> })}
                </div>
            </div>

            <div class="detection-actions">
                <button
                    class="btn btn-highlight"
                    disabled=!drawable
                    on:click=move |_| on_highlight(index)
                >
                    "👁 Highlight"
                </button>
                <button
                    class="btn btn-copy"
                    title="Copy value"
                    on:click=move |_| browser::copy_to_clipboard(&value)
                >
                    "📋"
                </button>
            </div>

            <details class="coordinates">
                <summary>"Coordinates"</summary>
                <div class="mono">
                    {format!("x: {}, y: {}", coords.x, coords.y)}
                    <br />
                    {format!("w: {}, h: {}", coords.width, coords.height)}
                </div>
            </details>
        </div>
    }
}
