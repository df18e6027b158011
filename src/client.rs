//! PII検出サービスのHTTPクライアント
//!
//! 3つのエンドポイントに画像を `file` フィールドでmultipart送信する。
//! - process-image / detect-pii: JSON
//! - mask-pii: 画像バイナリ（ファイルに保存し、そのパスをハンドルとして返す）

use crate::image_source::mime_type_for;
use pii_lens_common::{EndpointMode, Error, ImageHandle, Result, ServiceConfig, ServiceResponse, UPLOAD_FIELD};
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// マスク専用モードで保存した画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedFile {
    path: PathBuf,
    href: String,
}

impl MaskedFile {
    pub fn new(path: PathBuf) -> Self {
        let href = path.display().to_string();
        Self { path, href }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageHandle for MaskedFile {
    fn href(&self) -> &str {
        &self.href
    }
}

pub struct PiiClient {
    http: reqwest::Client,
    service: ServiceConfig,
}

impl PiiClient {
    pub fn new(service: ServiceConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self { http, service })
    }

    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }

    /// 画像を送信し、モード別のレスポンスを返す
    ///
    /// マスク専用モードのバイナリは `masked_dest` に書き出す
    pub async fn run(
        &self,
        mode: EndpointMode,
        image_path: &Path,
        masked_dest: &Path,
    ) -> Result<ServiceResponse<MaskedFile>> {
        let url = self.service.endpoint_url(mode);
        log::debug!("POST {}", url);

        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| Error::Transport(format!("{}: {}", image_path.display(), e)))?;
        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_type_for(image_path))
            .map_err(|e| Error::Transport(e.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http { status: status.as_u16() });
        }

        if mode == EndpointMode::Mask {
            let body = resp.bytes().await.map_err(|e| Error::Transport(e.to_string()))?;
            write_masked(masked_dest, &body).await?;
            return Ok(ServiceResponse::Masked(MaskedFile::new(masked_dest.to_path_buf())));
        }

        let text = resp.text().await.map_err(|e| Error::Transport(e.to_string()))?;
        ServiceResponse::parse_json(mode, &text)?
            .ok_or_else(|| Error::Transport(format!("unexpected response for {}", mode)))
    }
}

async fn write_masked(dest: &Path, body: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
    }
    tokio::fs::write(dest, body)
        .await
        .map_err(|e| Error::Transport(format!("{}: {}", dest.display(), e)))
}
