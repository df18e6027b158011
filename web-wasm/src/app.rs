//! メインアプリケーションコンポーネント
//!
//! 結果コントローラをシグナルに置き、画像のデコード完了と検出の更新で
//! オーバーレイを描き直す。描くかどうかは `RedrawGate` が決める。ハイライトは単一スロットのコーディネータが持つ。

use crate::api;
use crate::canvas::{self, CanvasSurface, LoadedImage, RevertTimer};
use crate::components::{
    detection_sidebar::DetectionSidebar, header::Header, options_panel::OptionsPanel,
    overlay_canvas::OverlayCanvas, preview_panels::PreviewPanels, upload_area::UploadArea,
};
use crate::object_url::{ObjectUrl, SelectedImage};
use gloo::events::EventListener;
use leptos::html;
use leptos::prelude::*;
use pii_lens_common::{
    Detection, EndpointMode, HighlightCoordinator, HighlightToken, OverlayFrame, RedrawAction, RedrawGate,
    ResultController, RevertOutcome, StaleMaskPolicy,
};
use web_sys::{File, HtmlImageElement};

pub type AppController = ResultController<SelectedImage, ObjectUrl>;

/// デコード中・デコード済みの元画像と load リスナー
struct PendingImage {
    image: LoadedImage,
    _onload: EventListener,
}

#[component]
pub fn App() -> impl IntoView {
    let controller = RwSignal::new_local(AppController::new(StaleMaskPolicy::default()));
    let coordinator = StoredValue::new_local(HighlightCoordinator::<RevertTimer>::new());
    let image = StoredValue::new_local(None::<PendingImage>);
    let gate = StoredValue::new(RedrawGate::new());
    // デコード完了した元画像のリビジョン
    let decoded = RwSignal::new(None::<u64>);
    let canvas_ref: NodeRef<html::Canvas> = NodeRef::new();
    let service = api::service_config();
    log::info!("PII service: {}", service.api_base);

    let revision = Memo::new(move |_| controller.with(|c| c.store().revision()));
    let source_revision = Memo::new(move |_| revision.get().source);

    let detections: Memo<Vec<Detection>> = Memo::new(move |_| controller.with(|c| c.store().detections().to_vec()));
    let mode = Signal::derive(move || controller.with(|c| c.mode()));
    let processing = Signal::derive(move || controller.with(|c| c.store().is_processing()));
    let error = Signal::derive(move || controller.with(|c| c.store().error().map(str::to_string)));
    let has_file = Signal::derive(move || controller.with(|c| c.store().has_source()));
    let file_name = Signal::derive(move || controller.with(|c| c.store().source().map(SelectedImage::name)));
    let original_href =
        Signal::derive(move || controller.with(|c| c.store().source().map(|s| s.href().to_string())));
    let masked_href =
        Signal::derive(move || controller.with(|c| c.store().masked().map(|m| m.href().to_string())));

    // 元画像が変わったら読み込み直す
    Effect::new(move |_| {
        let source_rev = source_revision.get();
        decoded.set(None);
        let href = controller.with_untracked(|c| c.store().source().map(|s| s.href().to_string()));
        let pending = href.and_then(|href| {
            let element = HtmlImageElement::new()
                .map_err(|e| log::error!("failed to create image element: {:?}", e))
                .ok()?;
            let onload = EventListener::once(&element, "load", move |_| decoded.set(Some(source_rev)));
            element.set_src(&href);
            Some(PendingImage {
                image: LoadedImage(element),
                _onload: onload,
            })
        });
        image.set_value(pending);
    });

    // 元画像が替わったら空にし、デコード済みの画像に対して入力が変わるたびに1回描き直す
    Effect::new(move |_| {
        let revision = revision.get();
        let decoded = decoded.get();
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        let mut action = RedrawAction::Skip;
        gate.update_value(|g| action = g.decide(revision, decoded));
        match action {
            RedrawAction::Draw => controller.with_untracked(|c| {
                image.with_value(|pending| {
                    if let Some(pending) = pending {
                        let outcome = canvas::redraw(canvas, &pending.image, c.store().detections());
                        log::debug!("overlay redraw {:?}: {:?}", revision, outcome);
                    }
                })
            }),
            RedrawAction::Clear => {
                log::debug!("overlay cleared for source {}", revision.source);
                canvas::clear(canvas);
            }
            RedrawAction::Skip => {}
        }
    });

    let revert = move |token: HighlightToken| {
        let mut surface = canvas_ref.get_untracked().and_then(CanvasSurface::new);
        controller.with_untracked(|c| {
            image.with_value(|pending| {
                let frame = OverlayFrame::new(pending.as_ref().map(|p| &p.image), c.store().detections());
                coordinator.update_value(|h| {
                    if let RevertOutcome::Stale = h.revert(token, surface.as_mut(), frame) {
                        log::debug!("stale highlight timer ignored");
                    }
                });
            })
        });
    };

    let on_highlight = move |index: usize| {
        let mut surface = canvas_ref.get_untracked().and_then(CanvasSurface::new);
        controller.with_untracked(|c| {
            let detections = c.store().detections();
            let Some(target) = detections.get(index) else {
                return;
            };
            image.with_value(|pending| {
                let frame = OverlayFrame::new(pending.as_ref().map(|p| &p.image), detections);
                coordinator.update_value(|h| {
                    h.highlight(surface.as_mut(), frame, target, |token| RevertTimer::arm(token, revert));
                });
            })
        });
    };

    let on_file = move |file: Option<File>| {
        coordinator.update_value(|h| h.cancel());
        let source = file.and_then(|f| {
            SelectedImage::new(f)
                .map_err(|e| log::error!("failed to read file: {:?}", e))
                .ok()
        });
        controller.update(|c| c.select_file(source));
    };

    let on_mode = move |selected: EndpointMode| {
        controller.update(|c| c.set_mode(selected));
    };

    let on_run = move |_| {
        let mut started = None;
        controller.update(|c| {
            if let Ok(ticket) = c.begin_run() {
                started = c.store().source().map(|s| (ticket, s.file().clone()));
            }
        });
        let Some((ticket, file)) = started else {
            return;
        };
        let service = service.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = api::run(&service, ticket.mode(), &file).await;
            controller.update(|c| {
                c.finish_run(ticket, result);
            });
        });
    };

    let on_reset = move |_| {
        coordinator.update_value(|h| h.cancel());
        controller.update(|c| c.reset());
    };

    on_cleanup(move || {
        coordinator.update_value(|h| h.cancel());
    });

    view! {
        <div class="container">
            <Header />

            <div class="layout">
                <main class="main-column">
                    <UploadArea file_name=file_name disabled=processing on_file=on_file />

                    <OptionsPanel
                        mode=mode
                        has_file=has_file
                        processing=processing
                        on_mode=on_mode
                        on_run=on_run
                        on_reset=on_reset
                    />

                    {move || error.get().map(|message| view! { <div class="error-message">{message}</div> })}

                    <PreviewPanels original_href=original_href masked_href=masked_href />

                    <OverlayCanvas canvas_ref=canvas_ref visible=has_file />
                </main>

                <aside class="sidebar-column">
                    <DetectionSidebar detections=detections on_highlight=on_highlight />
                </aside>
            </div>
        </div>
    }
}
