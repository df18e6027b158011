//! オーバーレイ描画
//!
//! 元画像 + 検出リストからフレーム全体を毎回描き直す。
//! 差分描画はしない（検出リストは小さく、常に丸ごと置き換わるため）。

use crate::store::OverlayRevision;
use crate::surface::{Rgba, Stroke, Surface, SourceImage, TextStyle};
use crate::types::Detection;

/// 検出枠の線色
pub const BOX_STROKE_COLOR: Rgba = Rgba::new(255, 0, 0, 0.9);
/// 検出枠の塗り色
pub const BOX_FILL_COLOR: Rgba = Rgba::new(255, 0, 0, 0.12);
/// ラベル文字
pub const LABEL_STYLE: TextStyle = TextStyle {
    color: Rgba::new(255, 255, 255, 0.95),
    size_px: 14,
    family: "sans-serif",
};
/// ラベルの枠左上からのオフセット
pub const LABEL_OFFSET: (f64, f64) = (6.0, 16.0);

/// 線幅の下限
pub const MIN_STROKE_WIDTH: f64 = 2.0;
/// 画像幅この値ごとに線幅1px
pub const STROKE_WIDTH_DIVISOR: f64 = 300.0;

/// 描画結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// 描画した。`boxes` は枠を描いた件数、`skipped` は描画不能で飛ばした件数
    Drawn { boxes: usize, skipped: usize },
    /// 画像が未デコード。デコード完了後に呼び直す
    Deferred,
}

impl RenderOutcome {
    pub fn is_drawn(&self) -> bool {
        matches!(self, RenderOutcome::Drawn { .. })
    }
}

/// 画像幅に応じた線幅
///
/// 高解像度画像でも枠が見えるように `max(2, round(width / 300))`
pub fn stroke_width_for(image_width: u32) -> f64 {
    (image_width as f64 / STROKE_WIDTH_DIVISOR).round().max(MIN_STROKE_WIDTH)
}

/// 枠に添えるラベル `"<type> (<percent>%)"`
pub fn detection_label(detection: &Detection) -> String {
    format!("{} ({}%)", detection.kind, detection.confidence_percent())
}

/// オーバーレイを描画する
///
/// 1. 描画面を画像のネイティブサイズに合わせる
/// 2. クリア
/// 3. 画像を原点に描く
/// 4. 描画可能な検出ごとに 枠線 → 塗り → ラベル
pub fn render_overlay<S>(surface: &mut S, image: &S::Image, detections: &[Detection]) -> RenderOutcome
where
    S: Surface + ?Sized,
{
    let Some((width, height)) = image.natural_size() else {
        log::debug!("overlay render deferred: image not decoded");
        return RenderOutcome::Deferred;
    };

    surface.resize(width, height);
    surface.clear();
    surface.draw_image(image);

    let stroke = Stroke::solid(BOX_STROKE_COLOR, stroke_width_for(width));
    let mut boxes = 0;
    let mut skipped = 0;

    for detection in detections {
        let rect = &detection.coordinates;
        if !rect.is_drawable() {
            skipped += 1;
            continue;
        }

        surface.stroke_rect(rect, &stroke);
        surface.fill_rect(rect, BOX_FILL_COLOR);
        surface.fill_text(
            &detection_label(detection),
            rect.x + LABEL_OFFSET.0,
            rect.y + LABEL_OFFSET.1,
            &LABEL_STYLE,
        );
        boxes += 1;
    }

    log::debug!("overlay rendered: {}x{} boxes={} skipped={}", width, height, boxes, skipped);
    RenderOutcome::Drawn { boxes, skipped }
}

/// 描画面を空にする（サイズ0）
///
/// 元画像が替わってからデコードが終わるまで、前の画像と枠を残さない
pub fn clear_overlay<S>(surface: &mut S)
where
    S: Surface + ?Sized,
{
    surface.resize(0, 0);
    surface.clear();
}

/// 再描画の判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawAction {
    /// `render_overlay` で描き直す
    Draw,
    /// 元画像が替わり未デコード。`clear_overlay` で空にする
    Clear,
    /// 何もしない
    Skip,
}

/// オーバーレイを描き直すかどうかの判定
///
/// 描くのは「デコード済みの元画像が現在のリビジョンと一致し、
/// そのリビジョンをまだ描いていない」ときだけ。入力の変化1回につき描画は1回。
/// 古いリビジョンのデコード完了通知は無視する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedrawGate {
    drawn: Option<OverlayRevision>,
    shown_source: Option<u64>,
}

impl RedrawGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `decoded` はデコード完了した元画像のソースリビジョン
    pub fn decide(&mut self, revision: OverlayRevision, decoded: Option<u64>) -> RedrawAction {
        if decoded == Some(revision.source) {
            if self.drawn == Some(revision) {
                return RedrawAction::Skip;
            }
            self.drawn = Some(revision);
            self.shown_source = Some(revision.source);
            return RedrawAction::Draw;
        }
        if self.shown_source != Some(revision.source) {
            self.drawn = None;
            self.shown_source = Some(revision.source);
            return RedrawAction::Clear;
        }
        RedrawAction::Skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, ImageDims, RecordingSurface};
    use crate::types::BoundingBox;

    fn detection(kind: &str, confidence: f64, rect: BoundingBox) -> Detection {
        Detection {
            kind: kind.to_string(),
            value: "value".to_string(),
            confidence,
            coordinates: rect,
            masked_value: "*****".to_string(),
        }
    }

    #[test]
    fn test_stroke_width_scales_with_width() {
        assert_eq!(stroke_width_for(1000), 3.0);
        assert_eq!(stroke_width_for(300), 2.0);
        assert_eq!(stroke_width_for(0), 2.0);
        assert_eq!(stroke_width_for(1800), 6.0);
        // 1050 / 300 = 3.5 は切り上げ
        assert_eq!(stroke_width_for(1050), 4.0);
    }

    #[test]
    fn test_detection_label() {
        let d = detection("EMAIL", 0.876, BoundingBox::default());
        assert_eq!(detection_label(&d), "EMAIL (88%)");
    }

    #[test]
    fn test_render_sequence() {
        let mut surface = RecordingSurface::new();
        let image = ImageDims::decoded(1000, 800);
        let rect = BoundingBox::new(100.0, 50.0, 200.0, 40.0);
        let detections = vec![detection("NAME", 0.93, rect)];

        let outcome = render_overlay(&mut surface, &image, &detections);
        assert_eq!(outcome, RenderOutcome::Drawn { boxes: 1, skipped: 0 });
        assert_eq!(surface.size(), (1000, 800));

        let ops = surface.ops();
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0], DrawOp::Image { width: 1000, height: 800 });
        match &ops[1] {
            DrawOp::StrokeRect { rect: r, stroke } => {
                assert_eq!(*r, rect);
                assert_eq!(stroke.width, 3.0);
                assert_eq!(stroke.color, BOX_STROKE_COLOR);
                assert!(stroke.dash.is_none());
            }
            other => panic!("unexpected op: {:?}", other),
        }
        assert_eq!(ops[2], DrawOp::FillRect { rect, color: BOX_FILL_COLOR });
        match &ops[3] {
            DrawOp::Text { text, x, y, .. } => {
                assert_eq!(text, "NAME (93%)");
                assert_eq!((*x, *y), (106.0, 66.0));
            }
            other => panic!("unexpected op: {:?}", other),
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let image = ImageDims::decoded(640, 480);
        let detections = vec![
            detection("EMAIL", 0.9, BoundingBox::new(10.0, 10.0, 50.0, 12.0)),
            detection("PHONE", 0.6, BoundingBox::new(20.0, 40.0, 80.0, 14.0)),
        ];

        let mut surface = RecordingSurface::new();
        render_overlay(&mut surface, &image, &detections);
        let first = surface.clone();
        render_overlay(&mut surface, &image, &detections);
        assert_eq!(surface, first);
    }

    #[test]
    fn test_render_skips_non_drawable_boxes() {
        let image = ImageDims::decoded(200, 200);
        let detections = vec![
            detection("ZERO_W", 0.9, BoundingBox::new(10.0, 10.0, 0.0, 12.0)),
            detection("NEG_H", 0.9, BoundingBox::new(10.0, 10.0, 10.0, -3.0)),
            detection("OK", 0.9, BoundingBox::new(10.0, 10.0, 10.0, 10.0)),
        ];

        let mut surface = RecordingSurface::new();
        let outcome = render_overlay(&mut surface, &image, &detections);
        assert_eq!(outcome, RenderOutcome::Drawn { boxes: 1, skipped: 2 });
        assert_eq!(surface.stroke_count(), 1);
        assert_eq!(surface.texts(), vec!["OK (90%)"]);
    }

    #[test]
    fn test_render_deferred_until_decoded() {
        let mut surface = RecordingSurface::new();
        let detections = vec![detection("NAME", 0.9, BoundingBox::new(1.0, 1.0, 5.0, 5.0))];

        let outcome = render_overlay(&mut surface, &ImageDims::pending(100, 100), &detections);
        assert_eq!(outcome, RenderOutcome::Deferred);
        assert!(surface.ops().is_empty());
        assert_eq!(surface.size(), (0, 0));
    }

    #[test]
    fn test_render_does_not_mutate_detections() {
        let detections = vec![detection("NAME", 0.5, BoundingBox::new(1.0, 2.0, 3.0, 4.0))];
        let before = detections.clone();
        let mut surface = RecordingSurface::new();
        render_overlay(&mut surface, &ImageDims::decoded(10, 10), &detections);
        assert_eq!(detections, before);
    }

    fn revision(source: u64, detections: u64) -> OverlayRevision {
        OverlayRevision { source, detections }
    }

    #[test]
    fn test_clear_overlay_empties_surface() {
        let mut surface = RecordingSurface::new();
        let detections = vec![detection("NAME", 0.9, BoundingBox::new(1.0, 1.0, 5.0, 5.0))];
        render_overlay(&mut surface, &ImageDims::decoded(100, 100), &detections);

        clear_overlay(&mut surface);
        assert_eq!(surface.size(), (0, 0));
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_redraw_gate_waits_for_decode_after_source_change() {
        let mut gate = RedrawGate::new();
        assert_eq!(gate.decide(revision(1, 1), Some(1)), RedrawAction::Draw);

        // 新しい画像を選択。前の画像のデコード済み通知はまだ残っている
        assert_eq!(gate.decide(revision(2, 2), Some(1)), RedrawAction::Clear);
        assert_eq!(gate.decide(revision(2, 2), None), RedrawAction::Skip);
        assert_eq!(gate.decide(revision(2, 2), Some(1)), RedrawAction::Skip);

        assert_eq!(gate.decide(revision(2, 2), Some(2)), RedrawAction::Draw);
        assert_eq!(gate.decide(revision(2, 2), Some(2)), RedrawAction::Skip);
    }

    #[test]
    fn test_redraw_gate_draws_once_per_detections_change() {
        let mut gate = RedrawGate::new();
        assert_eq!(gate.decide(revision(1, 1), None), RedrawAction::Clear);
        assert_eq!(gate.decide(revision(1, 1), Some(1)), RedrawAction::Draw);
        assert_eq!(gate.decide(revision(1, 1), Some(1)), RedrawAction::Skip);

        assert_eq!(gate.decide(revision(1, 2), Some(1)), RedrawAction::Draw);
        assert_eq!(gate.decide(revision(1, 2), Some(1)), RedrawAction::Skip);
    }

    #[test]
    fn test_redraw_gate_ignores_mask_only_response() {
        let mut store: crate::store::ResultStore<u8, ()> = crate::store::ResultStore::default();
        store.replace_source(Some(1));
        let mut gate = RedrawGate::new();
        let source = store.revision().source;
        assert_eq!(gate.decide(store.revision(), Some(source)), RedrawAction::Draw);

        store.set_masked(Some(crate::masked::MaskedOutput::inline("UE5H")));
        assert_eq!(gate.decide(store.revision(), Some(source)), RedrawAction::Skip);
    }

    #[test]
    fn test_redraw_gate_undecodable_source_stays_cleared() {
        let mut gate = RedrawGate::new();
        assert_eq!(gate.decide(revision(1, 1), Some(1)), RedrawAction::Draw);
        assert_eq!(gate.decide(revision(2, 2), None), RedrawAction::Clear);
        // デコードされないまま検出だけ変わっても描かない
        assert_eq!(gate.decide(revision(2, 3), None), RedrawAction::Skip);
    }

    #[test]
    fn test_render_empty_list_draws_image_only() {
        let mut surface = RecordingSurface::new();
        let outcome = render_overlay(&mut surface, &ImageDims::decoded(32, 16), &[]);
        assert_eq!(outcome, RenderOutcome::Drawn { boxes: 0, skipped: 0 });
        assert_eq!(surface.ops(), &[DrawOp::Image { width: 32, height: 16 }]);
    }
}
