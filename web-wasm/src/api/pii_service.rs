//! PII検出サービスへのfetch
//!
//! 画像を FormData の `file` フィールドで送る。
//! - process-image / detect-pii: JSON
//! - mask-pii: 画像バイナリ（Object URLにして返す）

use crate::object_url::ObjectUrl;
use pii_lens_common::{
    DetectPayload, EndpointMode, Error, ProcessPayload, Result, ServiceConfig, ServiceResponse, UPLOAD_FIELD,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, File, FormData, Request, RequestInit, RequestMode, Response};

/// 接続先。ビルド時の PII_LENS_API_BASE、未指定ならデフォルト
pub fn service_config() -> ServiceConfig {
    ServiceConfig::from_override(option_env!("PII_LENS_API_BASE"))
}

/// JSの例外を表示用メッセージに変換
fn js_error(value: JsValue) -> Error {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value));
    Error::Transport(message)
}

async fn await_promise(promise: std::result::Result<js_sys::Promise, JsValue>) -> Result<JsValue> {
    JsFuture::from(promise.map_err(js_error)?).await.map_err(js_error)
}

/// 画像を送信し、モード別のレスポンスを返す
pub async fn run(service: &ServiceConfig, mode: EndpointMode, file: &File) -> Result<ServiceResponse<ObjectUrl>> {
    let url = service.endpoint_url(mode);
    log::debug!("POST {}", url);

    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename(UPLOAD_FIELD, file, &file.name())
        .map_err(js_error)?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&form);

    let request = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;
    let window = web_sys::window().ok_or_else(|| Error::Transport("window is not available".into()))?;
    let resp: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;

    if !resp.ok() {
        return Err(Error::Http { status: resp.status() });
    }

    match mode {
        EndpointMode::Mask => {
            let blob: Blob = await_promise(resp.blob()).await?.dyn_into().map_err(js_error)?;
            let url = ObjectUrl::from_blob(&blob).map_err(js_error)?;
            Ok(ServiceResponse::Masked(url))
        }
        EndpointMode::Process => {
            let json = await_promise(resp.json()).await?;
            let payload: ProcessPayload =
                serde_wasm_bindgen::from_value(json).map_err(|e| Error::Transport(e.to_string()))?;
            Ok(ServiceResponse::from_process(payload))
        }
        EndpointMode::Detect => {
            let json = await_promise(resp.json()).await?;
            let payload: DetectPayload =
                serde_wasm_bindgen::from_value(json).map_err(|e| Error::Transport(e.to_string()))?;
            Ok(ServiceResponse::from_detect(payload))
        }
    }
}
