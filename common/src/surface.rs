//! 2D描画面の抽象化
//!
//! ブラウザではCanvas 2Dコンテキスト、CLIではRGBAバッファが実装する。
//! 描画面に書き込むのはオーバーレイ描画とハイライトのみ。

use std::fmt;

use crate::types::BoundingBox;

/// RGBA色（アルファは0.0〜1.0）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSSの `rgba(...)` 表記
    pub fn to_css(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }

    /// アルファを0〜255に変換
    pub fn alpha_u8(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// 線のスタイル
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
    /// 破線パターン（線, 間隔）。Noneなら実線
    pub dash: Option<[f64; 2]>,
}

impl Stroke {
    pub const fn solid(color: Rgba, width: f64) -> Self {
        Self { color, width, dash: None }
    }

    pub const fn dashed(color: Rgba, width: f64, dash: [f64; 2]) -> Self {
        Self { color, width, dash: Some(dash) }
    }
}

/// テキストのスタイル
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Rgba,
    pub size_px: u32,
    pub family: &'static str,
}

impl TextStyle {
    /// Canvasの `font` プロパティ表記
    pub fn css_font(&self) -> String {
        format!("{}px {}", self.size_px, self.family)
    }
}

/// 描画元の画像
pub trait SourceImage {
    /// デコード済みならネイティブ解像度（表示サイズではない）。未デコードならNone
    fn natural_size(&self) -> Option<(u32, u32)>;
}

/// ラスタ描画面
///
/// 描画状態（線幅・破線など）は各呼び出しで完結させ、前回の状態に依存しない。
pub trait Surface {
    type Image: SourceImage + ?Sized;

    /// ピクセルサイズを変更する（内容は失われる）
    fn resize(&mut self, width: u32, height: u32);
    fn clear(&mut self);
    /// 画像を原点に等倍で描く
    fn draw_image(&mut self, image: &Self::Image);
    fn stroke_rect(&mut self, rect: &BoundingBox, stroke: &Stroke);
    fn fill_rect(&mut self, rect: &BoundingBox, color: Rgba);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);
}

/// 描画コマンド
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Image { width: u32, height: u32 },
    StrokeRect { rect: BoundingBox, stroke: Stroke },
    FillRect { rect: BoundingBox, color: Rgba },
    Text { text: String, x: f64, y: f64, style: TextStyle },
}

/// サイズだけを持つ画像（記録用描画面と組み合わせる）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDims {
    pub width: u32,
    pub height: u32,
    pub decoded: bool,
}

impl ImageDims {
    pub fn decoded(width: u32, height: u32) -> Self {
        Self { width, height, decoded: true }
    }

    pub fn pending(width: u32, height: u32) -> Self {
        Self { width, height, decoded: false }
    }
}

impl SourceImage for ImageDims {
    fn natural_size(&self) -> Option<(u32, u32)> {
        self.decoded.then_some((self.width, self.height))
    }
}

/// 描画コマンドを記録する描画面
///
/// resize/clear で記録が消えるため、`ops()` は現在のフレーム内容そのものになる。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// 現在のフレーム内容
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn stroke_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::StrokeRect { .. })).count()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    type Image = ImageDims;

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.ops.clear();
    }

    fn clear(&mut self) {
        self.ops.clear();
    }

    fn draw_image(&mut self, image: &ImageDims) {
        self.ops.push(DrawOp::Image {
            width: image.width,
            height: image.height,
        });
    }

    fn stroke_rect(&mut self, rect: &BoundingBox, stroke: &Stroke) {
        self.ops.push(DrawOp::StrokeRect { rect: *rect, stroke: *stroke });
    }

    fn fill_rect(&mut self, rect: &BoundingBox, color: Rgba) {
        self.ops.push(DrawOp::FillRect { rect: *rect, color });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style: *style,
        });
    }
}
