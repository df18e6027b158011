//! RGBAバッファへの描画面
//!
//! Canvas 2Dと同じ座標系で描く。線は矩形の辺を中心に `width` の太さ、
//! 色はsource-overで合成する。塗りはすべて imageproc の矩形塗りで行う。

use crate::error::{PiiLensError, Result};
use crate::glyphs::{glyph, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::image_source::LocalImage;
use image::{Rgba as Px, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, Blend};
use imageproc::rect::Rect;
use pii_lens_common::{BoundingBox, Rgba, Stroke, Surface, TextStyle};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct RasterSurface {
    canvas: RgbaImage,
}

impl RasterSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.canvas
            .save(path)
            .map_err(|e| PiiLensError::ImageWrite(format!("{}: {}", path.display(), e)))
    }

    /// `[x0, x1) x [y0, y1)` を合成で塗る。範囲外は imageproc が切り取る
    fn fill_span(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Px<u8>) {
        let Some(rect) = pixel_rect(x0, y0, x1, y1) else {
            return;
        };
        let mut blended = Blend(std::mem::take(&mut self.canvas));
        draw_filled_rect_mut(&mut blended, rect, color);
        self.canvas = blended.0;
    }

    /// `[from, to)` を `on`/`off` の周期で区切り、線の部分だけを返す
    fn dash_runs(start: f64, from: f64, to: f64, dash: Option<[f64; 2]>) -> Vec<(f64, f64)> {
        let Some([on, off]) = dash.filter(|[on, off]| *on > 0.0 && on + off > 0.0) else {
            return vec![(from, to)];
        };
        let period = on + off;
        let mut runs = Vec::new();
        let mut head = start + ((from - start) / period).floor() * period;
        while head < to {
            let (a, b) = (head.max(from), (head + on).min(to));
            if b > a {
                runs.push((a, b));
            }
            head += period;
        }
        runs
    }
}

/// ピクセル中心が範囲に入るピクセルの矩形。空なら None
fn pixel_rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Option<Rect> {
    let left = (x0 - 0.5).ceil();
    let top = (y0 - 0.5).ceil();
    let right = (x1 - 0.5).ceil();
    let bottom = (y1 - 0.5).ceil();
    if !(right > left && bottom > top) {
        return None;
    }
    Some(Rect::at(left as i32, top as i32).of_size((right - left) as u32, (bottom - top) as u32))
}

fn to_pixel(color: Rgba) -> Px<u8> {
    Px([color.r, color.g, color.b, color.alpha_u8()])
}

impl Surface for RasterSurface {
    type Image = LocalImage;

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas = RgbaImage::new(width, height);
    }

    fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = Px([0, 0, 0, 0]);
        }
    }

    fn draw_image(&mut self, image: &LocalImage) {
        image::imageops::replace(&mut self.canvas, image.pixels(), 0, 0);
    }

    fn stroke_rect(&mut self, rect: &BoundingBox, stroke: &Stroke) {
        let half = stroke.width / 2.0;
        let (ox0, oy0) = (rect.x - half, rect.y - half);
        let (ox1, oy1) = (rect.x + rect.width + half, rect.y + rect.height + half);
        let (iy0, iy1) = (rect.y + half, rect.y + rect.height - half);
        let color = to_pixel(stroke.color);

        // 上下の辺はx方向、左右の辺はy方向に沿って破線を数える
        for (a, b) in Self::dash_runs(ox0, ox0, ox1, stroke.dash) {
            self.fill_span(a, oy0, b, iy0, color);
            self.fill_span(a, iy1, b, oy1, color);
        }
        for (a, b) in Self::dash_runs(oy0, iy0, iy1, stroke.dash) {
            self.fill_span(ox0, a, rect.x + half, b, color);
            self.fill_span(rect.x + rect.width - half, a, ox1, b, color);
        }
    }

    fn fill_rect(&mut self, rect: &BoundingBox, color: Rgba) {
        self.fill_span(rect.x, rect.y, rect.x + rect.width, rect.y + rect.height, to_pixel(color));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        let color = to_pixel(style.color);
        let scale = (style.size_px / GLYPH_HEIGHT).max(1) as f64;
        // yはベースライン
        let top = y.round() - GLYPH_HEIGHT as f64 * scale;
        let mut left = x.round();

        for ch in text.chars() {
            if let Some(rows) = glyph(ch) {
                for (row, bits) in rows.iter().enumerate() {
                    let py = top + row as f64 * scale;
                    for col in 0..GLYPH_WIDTH {
                        if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                            continue;
                        }
                        let px = left + col as f64 * scale;
                        self.fill_span(px, py, px + scale, py + scale, color);
                    }
                }
            }
            left += GLYPH_ADVANCE as f64 * scale;
        }
    }
}
