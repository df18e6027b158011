//! Canvas 2D への描画面と復帰タイマー

use gloo::timers::callback::Timeout;
use pii_lens_common::{
    clear_overlay, render_overlay, BoundingBox, Detection, HighlightToken, PendingRevert, RenderOutcome, Rgba, SourceImage,
    Stroke, Surface, TextStyle, HIGHLIGHT_REVERT_MS,
};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// デコード待ちを含む元画像
#[derive(Debug, Clone)]
pub struct LoadedImage(pub HtmlImageElement);

impl SourceImage for LoadedImage {
    fn natural_size(&self) -> Option<(u32, u32)> {
        let img = &self.0;
        if img.complete() && img.natural_width() > 0 {
            Some((img.natural_width(), img.natural_height()))
        } else {
            None
        }
    }
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// 2Dコンテキストが取れなければ None
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    type Image = LoadedImage;

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
    }

    fn draw_image(&mut self, image: &LoadedImage) {
        if let Err(e) = self.ctx.draw_image_with_html_image_element(&image.0, 0.0, 0.0) {
            log::warn!("drawImage failed: {:?}", e);
        }
    }

    fn stroke_rect(&mut self, rect: &BoundingBox, stroke: &Stroke) {
        let dash = js_sys::Array::new();
        if let Some([on, off]) = stroke.dash {
            dash.push(&on.into());
            dash.push(&off.into());
        }
        let _ = self.ctx.set_line_dash(&dash);
        self.ctx.set_stroke_style_str(&stroke.color.to_css());
        self.ctx.set_line_width(stroke.width);
        self.ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn fill_rect(&mut self, rect: &BoundingBox, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.ctx.set_font(&style.css_font());
        self.ctx.set_fill_style_str(&style.color.to_css());
        let _ = self.ctx.fill_text(text, x, y);
    }
}

/// キャンバスにオーバーレイを描く。コンテキストが取れなければ None
pub fn redraw(canvas: HtmlCanvasElement, image: &LoadedImage, detections: &[Detection]) -> Option<RenderOutcome> {
    let mut surface = CanvasSurface::new(canvas)?;
    Some(render_overlay(&mut surface, image, detections))
}

/// キャンバスを空にする。コンテキストが取れなければ何もしない
pub fn clear(canvas: HtmlCanvasElement) {
    if let Some(mut surface) = CanvasSurface::new(canvas) {
        clear_overlay(&mut surface);
    }
}

/// ハイライト復帰タイマー
pub struct RevertTimer(Timeout);

impl RevertTimer {
    pub fn arm<F>(token: HighlightToken, on_fire: F) -> Self
    where
        F: FnOnce(HighlightToken) + 'static,
    {
        Self(Timeout::new(HIGHLIGHT_REVERT_MS, move || on_fire(token)))
    }
}

impl PendingRevert for RevertTimer {
    fn cancel(self) {
        self.0.cancel();
    }

    fn finish(self) {
        // 発火中のコールバック内で自分のクロージャを破棄しない
        wasm_bindgen_futures::spawn_local(async move {
            drop(self);
        });
    }
}
