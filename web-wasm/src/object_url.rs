//! Blob URL のハンドル
//!
//! dropで revokeObjectURL する。ストアから外れた時点で解放される。

use pii_lens_common::ImageHandle;
use wasm_bindgen::JsValue;
use web_sys::{Blob, File, Url};

#[derive(Debug, PartialEq, Eq)]
pub struct ObjectUrl {
    url: String,
}

impl ObjectUrl {
    pub fn from_blob(blob: &Blob) -> Result<Self, JsValue> {
        let url = Url::create_object_url_with_blob(blob)?;
        Ok(Self { url })
    }
}

impl ImageHandle for ObjectUrl {
    fn href(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        log::debug!("revoke {}", self.url);
        let _ = Url::revoke_object_url(&self.url);
    }
}

/// 選択中の元画像
#[derive(Debug)]
pub struct SelectedImage {
    file: File,
    url: ObjectUrl,
}

impl SelectedImage {
    pub fn new(file: File) -> Result<Self, JsValue> {
        let url = ObjectUrl::from_blob(&file)?;
        Ok(Self { file, url })
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn name(&self) -> String {
        self.file.name()
    }

    pub fn href(&self) -> &str {
        self.url.href()
    }
}
