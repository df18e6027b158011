//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Please choose an image file first")]
    NoFileSelected,

    #[error("API error {status}")]
    Http { status: u16 },

    #[error("{0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid image payload: {0}")]
    InvalidPayload(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// UIに表示する1行メッセージ
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            "Something went wrong".to_string()
        } else {
            message
        }
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
