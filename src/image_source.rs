//! 入力画像の読み込み
//!
//! アップロード対象のファイル検証と、描画用にデコードした画像の保持

use crate::error::{PiiLensError, Result};
use image::RgbaImage;
use pii_lens_common::SourceImage;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif"];

/// 対応する拡張子か（大文字小文字は区別しない）
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// アップロード時のContent-Type
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// アップロード前の検証
pub fn check_upload(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(PiiLensError::FileNotFound(path.display().to_string()));
    }
    if !is_supported_image(path) {
        return Err(PiiLensError::UnsupportedImage(path.display().to_string()));
    }
    Ok(())
}

/// デコード済みの元画像
#[derive(Debug, Clone)]
pub struct LocalImage {
    path: PathBuf,
    pixels: RgbaImage,
}

impl LocalImage {
    pub fn open(path: &Path) -> Result<Self> {
        check_upload(path)?;
        let pixels = image::open(path)
            .map_err(|e| PiiLensError::ImageLoad(format!("{}: {}", path.display(), e)))?
            .to_rgba8();
        Ok(Self {
            path: path.to_path_buf(),
            pixels,
        })
    }

    pub fn from_pixels(path: impl Into<PathBuf>, pixels: RgbaImage) -> Self {
        Self {
            path: path.into(),
            pixels,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string())
    }
}

impl SourceImage for LocalImage {
    fn natural_size(&self) -> Option<(u32, u32)> {
        Some(self.pixels.dimensions())
    }
}
