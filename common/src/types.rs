//! 検出結果の型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - BoundingBox: 元画像ピクセル座標系の矩形
//! - Detection: PII検出1件
//! - EndpointMode: 呼び出すエンドポイントの種類

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// 欠けたキーと同じく `null` も既定値として読む
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// 元画像のネイティブピクセル座標での矩形（表示上の縮尺ではない）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    #[serde(deserialize_with = "null_as_default")]
    pub x: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub y: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub width: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// 描画・ハイライト可能か
    ///
    /// 幅・高さが0以下、または非有限値を含む矩形は描画しない
    pub fn is_drawable(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// 全方向に `pad` 広げた矩形
    ///
    /// 原点は0で止め、右端・下端の位置は保つ
    pub fn padded(&self, pad: f64) -> Self {
        let right = self.x + self.width + pad;
        let bottom = self.y + self.height + pad;
        let x = (self.x - pad).max(0.0);
        let y = (self.y - pad).max(0.0);
        Self {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

/// PII検出1件
///
/// 受信後は不変。リストはレスポンスごとに丸ごと置き換える。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Detection {
    /// カテゴリラベル（EMAIL, PHONE など）
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(deserialize_with = "null_as_default")]
    pub confidence: f64,
    /// `null` や欠落は描画不能な空の矩形になる
    #[serde(deserialize_with = "null_as_default")]
    pub coordinates: BoundingBox,
    #[serde(deserialize_with = "null_as_default")]
    pub masked_value: String,
}

impl Detection {
    /// 信頼度のパーセント表記（四捨五入）
    pub fn confidence_percent(&self) -> i64 {
        (self.confidence * 100.0).round() as i64
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }

    /// サイドバー用の寸法表記。幅が0以下なら表示しない
    pub fn dimensions_label(&self) -> Option<String> {
        let b = &self.coordinates;
        (b.width > 0.0).then(|| format!("{}×{}px", b.width, b.height))
    }
}

/// 信頼度の区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            ConfidenceLevel::High
        } else if confidence >= 0.7 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }

    /// CSSクラス名
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "confidence-high",
            ConfidenceLevel::Medium => "confidence-medium",
            ConfidenceLevel::Low => "confidence-low",
        }
    }
}

/// 呼び出すエンドポイントの種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointMode {
    /// 検出+マスク（process-image）
    #[default]
    Process,
    /// 検出のみ（detect-pii）
    Detect,
    /// マスクのみ（mask-pii）
    Mask,
}

impl EndpointMode {
    pub const ALL: [EndpointMode; 3] = [EndpointMode::Process, EndpointMode::Detect, EndpointMode::Mask];

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointMode::Process => "process",
            EndpointMode::Detect => "detect",
            EndpointMode::Mask => "mask",
        }
    }

    /// APIベースURLからの相対パス
    pub fn path(&self) -> &'static str {
        match self {
            EndpointMode::Process => "process-image",
            EndpointMode::Detect => "detect-pii",
            EndpointMode::Mask => "mask-pii",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EndpointMode::Process => "Detect + Mask both",
            EndpointMode::Detect => "Detect Only",
            EndpointMode::Mask => "Mask Only",
        }
    }

    /// レスポンスが検出リストを含むか
    pub fn returns_detections(&self) -> bool {
        !matches!(self, EndpointMode::Mask)
    }
}

impl fmt::Display for EndpointMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "process" | "process-image" => Ok(EndpointMode::Process),
            "detect" | "detect-pii" => Ok(EndpointMode::Detect),
            "mask" | "mask-pii" => Ok(EndpointMode::Mask),
            other => Err(Error::Config(format!("unknown endpoint mode: {}", other))),
        }
    }
}
