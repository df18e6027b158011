//! 結果ストア
//!
//! 選択中の元画像・検出リスト・マスク画像を保持する唯一の状態。
//! 変更は `ResultController` 経由のみ（setterはクレート内限定）。
//!
//! `S` は元画像のハンドル、`B` はマスク画像Blobのハンドル。
//! どちらも置き換え時にdropされ、リソースを解放する。

use crate::masked::MaskedOutput;
use crate::types::Detection;

/// 再描画判定用のリビジョン
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OverlayRevision {
    pub source: u64,
    pub detections: u64,
}

#[derive(Debug)]
pub struct ResultStore<S, B> {
    source: Option<S>,
    detections: Vec<Detection>,
    masked: Option<MaskedOutput<B>>,
    error: Option<String>,
    processing: bool,
    revision: OverlayRevision,
}

impl<S, B> Default for ResultStore<S, B> {
    fn default() -> Self {
        Self {
            source: None,
            detections: Vec::new(),
            masked: None,
            error: None,
            processing: false,
            revision: OverlayRevision::default(),
        }
    }
}

impl<S, B> ResultStore<S, B> {
    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn masked(&self) -> Option<&MaskedOutput<B>> {
        self.masked.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// 元画像・検出リストが変わるたびに進む
    pub fn revision(&self) -> OverlayRevision {
        self.revision
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// 全クリアして新しい元画像をセット（前の画像は解放）
    pub(crate) fn replace_source(&mut self, source: Option<S>) {
        self.source = source;
        self.detections = Vec::new();
        self.masked = None;
        self.error = None;
        self.processing = false;
        self.revision.source += 1;
        self.revision.detections += 1;
    }

    pub(crate) fn set_detections(&mut self, detections: Vec<Detection>) {
        self.detections = detections;
        self.revision.detections += 1;
    }

    pub(crate) fn set_masked(&mut self, masked: Option<MaskedOutput<B>>) {
        self.masked = masked;
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub(crate) fn set_processing(&mut self, processing: bool) {
        self.processing = processing;
    }
}
