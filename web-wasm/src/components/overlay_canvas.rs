//! 検出枠を重ねたプレビュー
//!
//! 描画はアプリ側のエフェクトとハイライトだけが行う

use leptos::html;
use leptos::prelude::*;

#[component]
pub fn OverlayCanvas(canvas_ref: NodeRef<html::Canvas>, #[prop(into)] visible: Signal<bool>) -> impl IntoView {
    view! {
        <div class="preview-card">
            <h3>"Preview with detection boxes will appear here"</h3>
            <div class=move || if visible.get() { "overlay-wrapper" } else { "overlay-wrapper hidden" }>
                <canvas node_ref=canvas_ref class="overlay-canvas" />
            </div>
        </div>
    }
}
