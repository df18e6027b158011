//! pii-lens: 画像内の個人情報を検出・マスクするサービスのCLIクライアント
//!
//! 描画・ハイライト・結果状態は `pii-lens-common` にあり、ここではファイル入出力と
//! HTTP呼び出し、RGBAバッファへの描画面を提供する。

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod glyphs;
pub mod image_source;
pub mod logging;
pub mod raster;
pub mod session;
