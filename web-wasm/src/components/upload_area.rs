//! アップロードエリアコンポーネント
//!
//! 画像1枚を選ぶ。クリックでもドラッグ&ドロップでもよい。

use leptos::html;
use leptos::prelude::*;
use web_sys::{DragEvent, File, HtmlInputElement};

#[component]
pub fn UploadArea<F>(
    #[prop(into)] file_name: Signal<Option<String>>,
    #[prop(into)] disabled: Signal<bool>,
    on_file: F,
) -> impl IntoView
where
    F: Fn(Option<File>) + 'static + Clone,
{
    let (is_dragover, set_is_dragover) = signal(false);
    let input_ref: NodeRef<html::Input> = NodeRef::new();

    // リセット後は同じファイルを選び直せるように入力を空にする
    Effect::new(move |_| {
        if file_name.get().is_none() {
            if let Some(input) = input_ref.get() {
                input.set_value("");
            }
        }
    });

    let on_change = {
        let on_file = on_file.clone();
        move |ev: web_sys::Event| {
            let input: HtmlInputElement = event_target(&ev);
            on_file(input.files().and_then(|files| files.get(0)));
        }
    };

    let on_drop = {
        let on_file = on_file.clone();
        move |ev: DragEvent| {
            ev.prevent_default();
            set_is_dragover.set(false);
            if disabled.get_untracked() {
                return;
            }
            if let Some(file) = ev.data_transfer().and_then(|dt| dt.files()).and_then(|files| files.get(0)) {
                on_file(Some(file));
            }
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        if !disabled.get_untracked() {
            set_is_dragover.set(true);
        }
    };

    let on_dragleave = move |_: DragEvent| {
        set_is_dragover.set(false);
    };

    view! {
        <div
            class=move || {
                let mut classes = vec!["upload-area"];
                if is_dragover.get() {
                    classes.push("dragover");
                }
                if disabled.get() {
                    classes.push("disabled");
                }
                classes.join(" ")
            }
            on:drop=on_drop
            on:dragover=on_dragover
            on:dragleave=on_dragleave
        >
            <input
                id="file"
                class="hidden"
                type="file"
                accept="image/*"
                node_ref=input_ref
                disabled=move || disabled.get()
                on:change=on_change
            />
            <label for="file">
                <div class="upload-icon">
                    {move || if file_name.get().is_some() { "🖼" } else { "📤" }}
                </div>
                <p class="upload-title">
                    {move || file_name.get().unwrap_or_else(|| "Choose an image file".to_string())}
                </p>
                <p class="text-muted">
                    {move || if file_name.get().is_some() { "Click to change file" } else { "PNG, JPG, JPEG up to 10MB" }}
                </p>
            </label>
        </div>
    }
}
