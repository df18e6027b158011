//! 元画像とマスク画像のプレビュー

use crate::browser;
use leptos::prelude::*;
use pii_lens_common::MASKED_FILE_NAME;

#[component]
pub fn PreviewPanels(
    #[prop(into)] original_href: Signal<Option<String>>,
    #[prop(into)] masked_href: Signal<Option<String>>,
) -> impl IntoView {
    let on_download = move |_| {
        if let Some(href) = masked_href.get_untracked() {
            if let Err(e) = browser::download(&href, MASKED_FILE_NAME) {
                log::error!("download failed: {:?}", e);
            }
        }
    };

    view! {
        <div class="preview-grid">
            <div class="preview-card">
                <h3>"Original"</h3>
                <Show
                    when=move || original_href.get().is_some()
                    fallback=|| view! { <div class="text-muted">"No image chosen"</div> }
                >
                    <img src=move || original_href.get().unwrap_or_default() alt="original" class="preview-image" />
                </Show>
            </div>

            <div class="preview-card">
                <h3>"Masked / Preview"</h3>
                <Show
                    when=move || masked_href.get().is_some()
                    fallback=|| view! {
                        <div class="text-muted">"Masked image will appear here after processing"</div>
                    }
                >
                    <img src=move || masked_href.get().unwrap_or_default() alt="masked" class="preview-image" />
                    <div class="preview-actions">
                        <button class="btn btn-primary" on:click=on_download>"Download"</button>
                        <a
                            class="btn btn-secondary"
                            href=move || masked_href.get().unwrap_or_default()
                            target="_blank"
                            rel="noreferrer"
                        >
                            "Open in new tab"
                        </a>
                    </div>
                </Show>
            </div>
        </div>
    }
}
