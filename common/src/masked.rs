//! マスク画像の参照
//!
//! 検出+マスクモードはインラインのbase64、マスク専用モードはバイナリ（Blob）で返る。
//! どちらも `MaskedOutput` にまとめ、`href()` ひとつで表示・ダウンロード先に解決する。

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Error, Result};

/// ダウンロード時のファイル名
pub const MASKED_FILE_NAME: &str = "masked.png";

/// 表示可能な画像ハンドル（ブラウザならObject URL）
pub trait ImageHandle {
    fn href(&self) -> &str;
}

/// マスク画像の参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskedOutput<B> {
    /// `data:` URLに正規化済みのインライン画像
    Inline(String),
    /// 別途取得したバイナリのハンドル
    Blob(B),
}

impl<B> MaskedOutput<B> {
    /// インラインペイロードから生成
    ///
    /// `data:` で始まらない生のbase64はPNGのData URLとして扱う
    pub fn inline(payload: impl Into<String>) -> Self {
        let payload = payload.into();
        if payload.starts_with("data:") {
            MaskedOutput::Inline(payload)
        } else {
            MaskedOutput::Inline(format!("data:image/png;base64,{}", payload.trim()))
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, MaskedOutput::Inline(_))
    }

    /// インライン画像をデコードしたバイト列（Blobの場合はNone）
    pub fn inline_bytes(&self) -> Option<Result<Vec<u8>>> {
        match self {
            MaskedOutput::Inline(data_url) => Some(decode_data_url(data_url)),
            MaskedOutput::Blob(_) => None,
        }
    }
}

impl<B: ImageHandle> MaskedOutput<B> {
    /// 表示・ダウンロード用の参照に解決する
    pub fn href(&self) -> &str {
        match self {
            MaskedOutput::Inline(data_url) => data_url,
            MaskedOutput::Blob(handle) => handle.href(),
        }
    }
}

/// Data URLからBase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/png;base64,iVBOR..." 形式のData URL
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    let rest = data_url.strip_prefix("data:")?;
    let (meta, data) = rest.split_once(',')?;
    meta.ends_with(";base64").then_some(data)
}

/// Data URLをバイト列にデコード
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let data = extract_base64_from_data_url(data_url)
        .ok_or_else(|| Error::InvalidPayload("not a base64 data URL".to_string()))?;
    STANDARD
        .decode(data.trim())
        .map_err(|e| Error::InvalidPayload(e.to_string()))
}
