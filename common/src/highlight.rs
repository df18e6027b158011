//! 検出1件の一時ハイライト
//!
//! 現在のフレームの上に破線枠を重ね、一定時間後にオーバーレイ全体を描き直して元に戻す。
//! 戻すときは発火時点のストア内容で描く（開始時のスナップショットは使わない）。
//!
//! アクティブなハイライトは常に1つ。新しいハイライトは前のタイマーをキャンセルする。

use crate::render::{render_overlay, RenderOutcome};
use crate::surface::{Rgba, Stroke, Surface};
use crate::types::Detection;

/// ハイライト枠の余白（px）
pub const HIGHLIGHT_PADDING: f64 = 20.0;
/// 元に戻すまでの時間（ms）
pub const HIGHLIGHT_REVERT_MS: u32 = 1200;
/// ハイライト枠の線
pub const HIGHLIGHT_STROKE: Stroke = Stroke::dashed(Rgba::new(0, 140, 255, 1.0), 3.0, [5.0, 5.0]);

/// 復帰タイマーのハンドル
///
/// ブラウザでは `setTimeout`、テストでは記録用のダミーが実装する。
pub trait PendingRevert {
    /// 発火前に取り消す
    fn cancel(self);
    /// 発火済みのタイマーを片付ける
    fn finish(self);
}

/// ハイライトの世代トークン。タイマーのコールバックに渡す
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HighlightToken(u64);

/// ハイライト開始・復帰時に参照するフレームの入力
pub struct OverlayFrame<'a, I: ?Sized> {
    pub image: Option<&'a I>,
    pub detections: &'a [Detection],
}

impl<'a, I: ?Sized> OverlayFrame<'a, I> {
    pub fn new(image: Option<&'a I>, detections: &'a [Detection]) -> Self {
        Self { image, detections }
    }

    fn redraw<S>(&self, surface: &mut S) -> Option<RenderOutcome>
    where
        S: Surface<Image = I> + ?Sized,
    {
        self.image.map(|image| render_overlay(surface, image, self.detections))
    }
}

/// 復帰処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertOutcome {
    /// 現在のハイライトを戻した
    Reverted(Option<RenderOutcome>),
    /// 置き換え済み・取り消し済みのタイマー
    Stale,
}

/// ハイライト枠を描く（復帰タイマーなし）
///
/// 描画不能な枠なら何もせず false
pub fn draw_highlight<S>(surface: &mut S, target: &Detection) -> bool
where
    S: Surface + ?Sized,
{
    if !target.coordinates.is_drawable() {
        return false;
    }
    surface.stroke_rect(&target.coordinates.padded(HIGHLIGHT_PADDING), &HIGHLIGHT_STROKE);
    true
}

struct Active<H> {
    token: HighlightToken,
    timer: H,
}

/// ハイライトの単一スロット
pub struct HighlightCoordinator<H: PendingRevert> {
    active: Option<Active<H>>,
    next: u64,
}

impl<H: PendingRevert> Default for HighlightCoordinator<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: PendingRevert> HighlightCoordinator<H> {
    pub fn new() -> Self {
        Self { active: None, next: 0 }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_token(&self) -> Option<HighlightToken> {
        self.active.as_ref().map(|a| a.token)
    }

    /// ハイライトを開始する
    ///
    /// 描画面がない、または枠が描画不能なら何もしない（None）。
    /// 前のハイライトが残っていれば、タイマーを取り消して現在の状態で描き直してから重ねる。
    /// 画像が未デコードで描き直せなければ、前のハイライトを取り消すだけで None。
    /// `arm` には新しいトークンが渡され、復帰タイマーを返す。
    pub fn highlight<S, F>(
        &mut self,
        surface: Option<&mut S>,
        frame: OverlayFrame<'_, S::Image>,
        target: &Detection,
        arm: F,
    ) -> Option<HighlightToken>
    where
        S: Surface + ?Sized,
        F: FnOnce(HighlightToken) -> H,
    {
        if !target.coordinates.is_drawable() {
            log::debug!("highlight ignored: box not drawable ({})", target.kind);
            return None;
        }
        let surface = surface?;

        if let Some(previous) = self.active.take() {
            previous.timer.cancel();
            let redrawn = frame.redraw(surface).is_some_and(|outcome| outcome.is_drawn());
            if !redrawn {
                // 前の枠を消せないので重ねない
                log::debug!("highlight skipped: base frame not redrawn ({})", target.kind);
                return None;
            }
        }

        draw_highlight(surface, target);

        self.next += 1;
        let token = HighlightToken(self.next);
        self.active = Some(Active { token, timer: arm(token) });
        Some(token)
    }

    /// タイマー発火時の復帰
    ///
    /// `frame` は発火時点のストア内容。描画面がなければ描画だけ省く。
    pub fn revert<S>(
        &mut self,
        token: HighlightToken,
        surface: Option<&mut S>,
        frame: OverlayFrame<'_, S::Image>,
    ) -> RevertOutcome
    where
        S: Surface + ?Sized,
    {
        match self.active.take() {
            Some(active) if active.token == token => {
                active.timer.finish();
                RevertOutcome::Reverted(surface.and_then(|s| frame.redraw(s)))
            }
            other => {
                self.active = other;
                RevertOutcome::Stale
            }
        }
    }

    /// 保留中のハイライトを取り消す（リセット・ファイル再選択・破棄時）
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            active.timer.cancel();
        }
    }
}

impl<H: PendingRevert> Drop for HighlightCoordinator<H> {
    fn drop(&mut self) {
        self.cancel();
    }
}
