//! 結果コントローラ
//!
//! サービス呼び出しの開始・完了を受け、モード別レスポンスをストアへ反映する。
//! ストアへの書き込みはすべてここを通る。
//!
//! 実行ごとに `RunTicket` を発行し、新しい実行・リセット・ファイル再選択で古いチケットは無効になる。
//! 無効なチケットの完了は無視する（Blobハンドルはそのままdropされ解放される）。

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::masked::MaskedOutput;
use crate::service::ServiceResponse;
use crate::store::ResultStore;
use crate::types::EndpointMode;

/// 検出のみモードで、以前のマスク画像をどう扱うか
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleMaskPolicy {
    /// 残す
    #[default]
    Keep,
    /// 消す
    Clear,
}

impl std::str::FromStr for StaleMaskPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "keep" => Ok(StaleMaskPolicy::Keep),
            "clear" => Ok(StaleMaskPolicy::Clear),
            other => Err(Error::Config(format!("unknown stale mask policy: {}", other))),
        }
    }
}

/// 実行チケット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    id: u64,
    mode: EndpointMode,
}

impl RunTicket {
    pub fn mode(&self) -> EndpointMode {
        self.mode
    }
}

/// 完了処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// ストアへ反映した
    Applied,
    /// 失敗。エラーメッセージをセットし、以前のデータは維持
    Failed,
    /// 置き換え済み・取り消し済みのチケット
    Stale,
}

#[derive(Debug)]
pub struct ResultController<S, B> {
    store: ResultStore<S, B>,
    mode: EndpointMode,
    policy: StaleMaskPolicy,
    last_ticket: u64,
    in_flight: Option<u64>,
}

impl<S, B> Default for ResultController<S, B> {
    fn default() -> Self {
        Self::new(StaleMaskPolicy::default())
    }
}

impl<S, B> ResultController<S, B> {
    pub fn new(policy: StaleMaskPolicy) -> Self {
        Self {
            store: ResultStore::default(),
            mode: EndpointMode::default(),
            policy,
            last_ticket: 0,
            in_flight: None,
        }
    }

    pub fn store(&self) -> &ResultStore<S, B> {
        &self.store
    }

    pub fn mode(&self) -> EndpointMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EndpointMode) {
        self.mode = mode;
    }

    /// ファイル選択。ストアを全クリアし、実行中の処理を無効にする
    pub fn select_file(&mut self, source: Option<S>) {
        self.cancel_run();
        self.store.replace_source(source);
    }

    /// リセット。元画像も含めて全クリア
    pub fn reset(&mut self) {
        self.select_file(None);
    }

    /// 実行開始
    ///
    /// ファイル未選択ならエラーメッセージをセットして `NoFileSelected`。
    /// 実行中の処理があれば無効にする。
    pub fn begin_run(&mut self) -> Result<RunTicket> {
        if !self.store.has_source() {
            self.store.set_error(Some(Error::NoFileSelected.user_message()));
            return Err(Error::NoFileSelected);
        }

        if let Some(previous) = self.in_flight {
            log::debug!("run {} superseded", previous);
        }

        self.last_ticket += 1;
        self.in_flight = Some(self.last_ticket);
        self.store.set_processing(true);
        self.store.set_error(None);

        log::info!("run {} started ({})", self.last_ticket, self.mode);
        Ok(RunTicket {
            id: self.last_ticket,
            mode: self.mode,
        })
    }

    /// 実行中の処理を無効にする
    pub fn cancel_run(&mut self) {
        if let Some(id) = self.in_flight.take() {
            log::debug!("run {} cancelled", id);
        }
        self.store.set_processing(false);
    }

    pub fn is_current(&self, ticket: &RunTicket) -> bool {
        self.in_flight == Some(ticket.id)
    }

    /// 実行完了
    ///
    /// 成功時はモード別に反映する。検出+マスクは両フィールドを1回の更新で反映する。
    pub fn finish_run(&mut self, ticket: RunTicket, result: Result<ServiceResponse<B>>) -> RunOutcome {
        if !self.is_current(&ticket) {
            log::debug!("run {} finished after being superseded; ignored", ticket.id);
            return RunOutcome::Stale;
        }
        self.in_flight = None;
        self.store.set_processing(false);

        match result {
            Ok(response) => {
                self.apply(response);
                log::info!("run {} applied ({} detections)", ticket.id, self.store.detections().len());
                RunOutcome::Applied
            }
            Err(e) => {
                log::warn!("run {} failed: {}", ticket.id, e);
                self.store.set_error(Some(e.user_message()));
                RunOutcome::Failed
            }
        }
    }

    fn apply(&mut self, response: ServiceResponse<B>) {
        match response {
            ServiceResponse::Combined { detections, masked_image } => {
                self.store.set_masked(masked_image.map(MaskedOutput::inline));
                self.store.set_detections(detections);
            }
            ServiceResponse::Detections(detections) => {
                if self.policy == StaleMaskPolicy::Clear {
                    self.store.set_masked(None);
                }
                self.store.set_detections(detections);
            }
            ServiceResponse::Masked(blob) => {
                self.store.set_masked(Some(MaskedOutput::Blob(blob)));
            }
        }
    }
}
