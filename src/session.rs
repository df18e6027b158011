//! 1枚の画像に対する実行と出力
//!
//! 結果コントローラで状態を持ち、サービス応答をファイルへ書き出す。
//! - detections.json: 検出一覧
//! - overlay.png: 検出枠を重ねた画像
//! - masked.png: マスク画像

use crate::client::{MaskedFile, PiiClient};
use crate::error::{PiiLensError, Result};
use crate::image_source::LocalImage;
use crate::raster::RasterSurface;
use indicatif::{ProgressBar, ProgressStyle};
use pii_lens_common::{
    draw_highlight, render_overlay, Detection, EndpointMode, MaskedOutput, RenderOutcome,
    ResultController, ResultStore, RunOutcome, StaleMaskPolicy, MASKED_FILE_NAME,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DETECTIONS_FILE_NAME: &str = "detections.json";
pub const OVERLAY_FILE_NAME: &str = "overlay.png";

pub type CliController = ResultController<LocalImage, MaskedFile>;

/// 書き出したファイル
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub detections: usize,
    pub detections_file: Option<PathBuf>,
    pub overlay_file: Option<PathBuf>,
    pub masked_file: Option<PathBuf>,
}

/// 画像を送信して結果を書き出す
pub async fn run_image(
    client: &PiiClient,
    image_path: &Path,
    mode: EndpointMode,
    policy: StaleMaskPolicy,
    output_dir: &Path,
) -> Result<RunSummary> {
    let image = LocalImage::open(image_path)?;
    let (width, height) = image.pixels().dimensions();
    log::info!("source image: {} ({}x{})", image.file_name(), width, height);
    let mut controller = CliController::new(policy);
    controller.select_file(Some(image));
    controller.set_mode(mode);

    let ticket = controller.begin_run()?;
    let spinner = spinner(&format!("{} ({})", mode.label(), client.service().endpoint_url(mode)));
    let masked_dest = output_dir.join(MASKED_FILE_NAME);
    let response = client.run(ticket.mode(), image_path, &masked_dest).await;
    spinner.finish_and_clear();

    match controller.finish_run(ticket, response) {
        RunOutcome::Applied => write_results(controller.store(), mode, output_dir),
        RunOutcome::Failed => Err(PiiLensError::ApiCall(
            controller.store().error().unwrap_or_default().to_string(),
        )),
        RunOutcome::Stale => Err(PiiLensError::ApiCall("run was superseded".into())),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// ストアの内容を出力ディレクトリに書き出す
///
/// 検出を返すモードなら検出一覧とオーバーレイ、マスク画像があればそれも書く
pub fn write_results(
    store: &ResultStore<LocalImage, MaskedFile>,
    mode: EndpointMode,
    output_dir: &Path,
) -> Result<RunSummary> {
    std::fs::create_dir_all(output_dir)?;
    let mut summary = RunSummary {
        detections: store.detections().len(),
        ..Default::default()
    };

    if mode.returns_detections() {
        let path = output_dir.join(DETECTIONS_FILE_NAME);
        std::fs::write(&path, serde_json::to_string_pretty(store.detections())?)?;
        summary.detections_file = Some(path);

        if let Some(image) = store.source() {
            let path = output_dir.join(OVERLAY_FILE_NAME);
            let mut surface = RasterSurface::new();
            render_overlay(&mut surface, image, store.detections());
            surface.save(&path)?;
            summary.overlay_file = Some(path);
        }
    }

    summary.masked_file = match store.masked() {
        Some(MaskedOutput::Inline(_)) => {
            let bytes = store
                .masked()
                .and_then(|m| m.inline_bytes())
                .transpose()?
                .unwrap_or_default();
            let path = output_dir.join(MASKED_FILE_NAME);
            std::fs::write(&path, bytes)?;
            Some(path)
        }
        Some(MaskedOutput::Blob(file)) => Some(file.path().to_path_buf()),
        None => None,
    };

    Ok(summary)
}

/// 保存済みの検出一覧から描画する
///
/// `highlight` を指定するとその検出にハイライト枠を重ねる
pub fn render_file(
    image_path: &Path,
    detections_path: &Path,
    output: &Path,
    highlight: Option<usize>,
) -> Result<RenderSummary> {
    let detections = load_detections(detections_path)?;
    let image = LocalImage::open(image_path)?;

    let target = match highlight {
        Some(index) => Some(detections.get(index).ok_or(PiiLensError::InvalidDetectionIndex {
            index,
            count: detections.len(),
        })?),
        None => None,
    };

    let mut surface = RasterSurface::new();
    let outcome = render_overlay(&mut surface, &image, &detections);
    let highlighted = target.is_some_and(|d| draw_highlight(&mut surface, d));
    if target.is_some() && !highlighted {
        log::warn!("highlight skipped: detection has no drawable box");
    }
    surface.save(output)?;

    Ok(RenderSummary {
        outcome,
        highlighted,
        output: output.to_path_buf(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub outcome: RenderOutcome,
    pub highlighted: bool,
    pub output: PathBuf,
}

/// 検出一覧を読む。配列そのもの、または `{"detected_pii": [...]}` を受け付ける
pub fn load_detections(path: &Path) -> Result<Vec<Detection>> {
    if !path.is_file() {
        return Err(PiiLensError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_detections(&content).ok_or_else(|| PiiLensError::InvalidDetections(path.display().to_string()))?
}

fn parse_detections(content: &str) -> Option<Result<Vec<Detection>>> {
    let value: serde_json::Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => return Some(Err(e.into())),
    };
    let list = match value {
        array @ serde_json::Value::Array(_) => array,
        serde_json::Value::Object(mut map) => map.remove("detected_pii").filter(|v| v.is_array())?,
        _ => return None,
    };
    Some(serde_json::from_value(list).map_err(PiiLensError::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use pii_lens_common::{BoundingBox, ServiceResponse};

    fn detection(kind: &str, x: f64, y: f64) -> Detection {
        Detection {
            kind: kind.to_string(),
            value: "value".to_string(),
            confidence: 0.9,
            coordinates: BoundingBox::new(x, y, 20.0, 10.0),
            masked_value: String::new(),
        }
    }

    fn controller_with(mode: EndpointMode, response: ServiceResponse<MaskedFile>) -> CliController {
        let image = LocalImage::from_pixels("mem.png", RgbaImage::from_pixel(60, 40, Rgba([255, 255, 255, 255])));
        let mut controller = CliController::default();
        controller.select_file(Some(image));
        controller.set_mode(mode);
        let ticket = controller.begin_run().expect("実行開始に失敗");
        assert_eq!(controller.finish_run(ticket, Ok(response)), RunOutcome::Applied);
        controller
    }

    #[test]
    fn test_parse_detections_array_and_object() {
        let array = r#"[{"type":"EMAIL","value":"a@b.c","confidence":0.8,"coordinates":{"x":1,"y":2,"width":3,"height":4}}]"#;
        let parsed = parse_detections(array).expect("形式判定に失敗").expect("パースに失敗");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].kind, "EMAIL");

        let object = r#"{"masked_image":"","detected_pii":[]}"#;
        let parsed = parse_detections(object).expect("形式判定に失敗").expect("パースに失敗");
        assert!(parsed.is_empty());

        assert!(parse_detections(r#"{"other":1}"#).is_none());
        assert!(parse_detections("42").is_none());
        assert!(matches!(parse_detections("not json"), Some(Err(PiiLensError::JsonParse(_)))));
    }

    #[test]
    fn test_write_results_combined() {
        let dir = tempfile::tempdir().expect("一時ディレクトリ作成に失敗");
        // 1x1 透明PNG
        let png = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
        let controller = controller_with(
            EndpointMode::Process,
            ServiceResponse::Combined {
                detections: vec![detection("EMAIL", 5.0, 5.0), detection("PHONE", 30.0, 20.0)],
                masked_image: Some(png.to_string()),
            },
        );

        let summary = write_results(controller.store(), EndpointMode::Process, dir.path()).expect("書き出しに失敗");
        assert_eq!(summary.detections, 2);
        assert!(dir.path().join(DETECTIONS_FILE_NAME).is_file());
        assert!(dir.path().join(OVERLAY_FILE_NAME).is_file());
        assert_eq!(summary.masked_file, Some(dir.path().join(MASKED_FILE_NAME)));

        let overlay = image::open(dir.path().join(OVERLAY_FILE_NAME)).expect("読み込みに失敗");
        assert_eq!((overlay.width(), overlay.height()), (60, 40));
    }

    #[test]
    fn test_write_results_detect_only_has_no_mask() {
        let dir = tempfile::tempdir().expect("一時ディレクトリ作成に失敗");
        let controller = controller_with(
            EndpointMode::Detect,
            ServiceResponse::Detections(vec![detection("NAME", 1.0, 1.0)]),
        );

        let summary = write_results(controller.store(), EndpointMode::Detect, dir.path()).expect("書き出しに失敗");
        assert_eq!(summary.detections, 1);
        assert!(summary.masked_file.is_none());
        assert!(!dir.path().join(MASKED_FILE_NAME).exists());
    }

    #[test]
    fn test_write_results_mask_only_skips_overlay() {
        let dir = tempfile::tempdir().expect("一時ディレクトリ作成に失敗");
        let masked = dir.path().join("from-service.png");
        let controller = controller_with(EndpointMode::Mask, ServiceResponse::Masked(MaskedFile::new(masked.clone())));

        let summary = write_results(controller.store(), EndpointMode::Mask, dir.path()).expect("書き出しに失敗");
        assert_eq!(summary.masked_file, Some(masked));
        assert!(summary.detections_file.is_none());
        assert!(summary.overlay_file.is_none());
    }
}
