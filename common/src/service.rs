//! リモートPIIサービスとの境界
//!
//! - ServiceConfig: エンドポイントのベースURL
//! - ProcessPayload / DetectPayload: JSONレスポンス
//! - ServiceResponse: モード別レスポンスをひとつの型にまとめたもの

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Detection, EndpointMode};

/// APIベースURLのデフォルト
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// アップロード時のフォームフィールド名
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub api_base: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self { api_base: api_base.into() }
    }

    /// 環境変数などの任意値から生成。空ならデフォルト
    pub fn from_override(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(base) if !base.is_empty() => Self::new(base),
            _ => Self::default(),
        }
    }

    pub fn endpoint_url(&self, mode: EndpointMode) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), mode.path())
    }
}

/// process-image のレスポンス
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessPayload {
    #[serde(default)]
    pub masked_image: Option<String>,
    #[serde(default)]
    pub detected_pii: Option<Vec<Detection>>,
}

/// detect-pii のレスポンス
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectPayload {
    #[serde(default)]
    pub detected_pii: Option<Vec<Detection>>,
}

/// モード別のレスポンス
///
/// `B` はマスク専用モードで受け取ったバイナリのハンドル（ブラウザならObject URL）
#[derive(Debug)]
pub enum ServiceResponse<B> {
    /// 検出+マスク。両方を同時にストアへ反映する
    Combined {
        detections: Vec<Detection>,
        masked_image: Option<String>,
    },
    /// 検出のみ
    Detections(Vec<Detection>),
    /// マスク画像のみ
    Masked(B),
}

impl<B> ServiceResponse<B> {
    pub fn from_process(payload: ProcessPayload) -> Self {
        ServiceResponse::Combined {
            detections: payload.detected_pii.unwrap_or_default(),
            masked_image: payload.masked_image.filter(|s| !s.is_empty()),
        }
    }

    pub fn from_detect(payload: DetectPayload) -> Self {
        ServiceResponse::Detections(payload.detected_pii.unwrap_or_default())
    }

    /// JSONボディを指定モードで解釈（マスク専用モードはJSONではない）
    pub fn parse_json(mode: EndpointMode, body: &str) -> Result<Option<Self>> {
        let response = match mode {
            EndpointMode::Process => Some(Self::from_process(serde_json::from_str(body)?)),
            EndpointMode::Detect => Some(Self::from_detect(serde_json::from_str(body)?)),
            EndpointMode::Mask => None,
        };
        Ok(response)
    }

    pub fn detection_count(&self) -> Option<usize> {
        match self {
            ServiceResponse::Combined { detections, .. } | ServiceResponse::Detections(detections) => {
                Some(detections.len())
            }
            ServiceResponse::Masked(_) => None,
        }
    }
}
