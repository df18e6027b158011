//! オーバーレイ描画テスト
//!
//! RGBAバッファへの描画と、保存済み検出結果からの出力を検証

use image::{Rgba, RgbaImage};
use pii_lens::error::PiiLensError;
use pii_lens::image_source::LocalImage;
use pii_lens::raster::RasterSurface;
use pii_lens::session;
use pii_lens_common::{render_overlay, BoundingBox, Detection, RenderOutcome};
use tempfile::tempdir;

fn detection(kind: &str, confidence: f64, rect: BoundingBox) -> Detection {
    Detection {
        kind: kind.to_string(),
        value: "secret".to_string(),
        confidence,
        coordinates: rect,
        masked_value: "******".to_string(),
    }
}

fn gray_image(width: u32, height: u32) -> LocalImage {
    LocalImage::from_pixels("gray.png", RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255])))
}

/// 同じ入力なら同じピクセル
#[test]
fn test_render_is_idempotent() {
    let image = gray_image(200, 120);
    let detections = vec![
        detection("EMAIL", 0.93, BoundingBox::new(10.0, 10.0, 80.0, 20.0)),
        detection("PHONE", 0.71, BoundingBox::new(50.0, 60.0, 100.0, 30.0)),
    ];

    let mut surface = RasterSurface::new();
    render_overlay(&mut surface, &image, &detections);
    let first = surface.image().clone();
    render_overlay(&mut surface, &image, &detections);

    assert_eq!(&first, surface.image());
}

/// 描画面は元画像のネイティブサイズ
#[test]
fn test_surface_matches_native_size() {
    let image = gray_image(1000, 800);
    let mut surface = RasterSurface::new();
    let outcome = render_overlay(&mut surface, &image, &[]);

    assert_eq!(outcome, RenderOutcome::Drawn { boxes: 0, skipped: 0 });
    assert_eq!(surface.image().dimensions(), (1000, 800));
    assert_eq!(*surface.image().get_pixel(999, 799), Rgba([128, 128, 128, 255]));
}

/// 1000px幅では線幅3px（辺の内外1.5px）
#[test]
fn test_stroke_width_scales_with_image() {
    let image = gray_image(1000, 800);
    let detections = vec![detection("NAME", 0.5, BoundingBox::new(300.0, 300.0, 200.0, 100.0))];
    let mut surface = RasterSurface::new();
    render_overlay(&mut surface, &image, &detections);

    let canvas = surface.image();
    // 左辺 x=300 の外側1px・内側1pxは赤系、外側3pxは元の灰色
    assert!(canvas.get_pixel(299, 400)[0] > 200);
    assert!(canvas.get_pixel(300, 400)[0] > 200);
    assert_eq!(*canvas.get_pixel(296, 400), Rgba([128, 128, 128, 255]));
}

/// 描画不能な枠は飛ばすが他は描く
#[test]
fn test_zero_size_box_skipped() {
    let image = gray_image(100, 100);
    let detections = vec![
        detection("EMPTY", 0.9, BoundingBox::default()),
        detection("EMAIL", 0.9, BoundingBox::new(10.0, 10.0, 30.0, 30.0)),
    ];
    let mut surface = RasterSurface::new();

    assert_eq!(
        render_overlay(&mut surface, &image, &detections),
        RenderOutcome::Drawn { boxes: 1, skipped: 1 }
    );
}

/// 保存済み検出結果から描画しファイルに出力
#[test]
fn test_render_file_writes_png() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image_path = dir.path().join("input.png");
    RgbaImage::from_pixel(120, 80, Rgba([255, 255, 255, 255]))
        .save(&image_path)
        .expect("入力画像の保存に失敗");

    let detections_path = dir.path().join("detections.json");
    let response = serde_json::json!({
        "masked_image": "",
        "detected_pii": [
            {"type": "EMAIL", "value": "a@b.c", "confidence": 0.95,
             "coordinates": {"x": 10, "y": 10, "width": 60, "height": 20}, "masked_value": "***"}
        ]
    });
    std::fs::write(&detections_path, response.to_string()).expect("書き込みに失敗");

    let output = dir.path().join("out").join("overlay.png");
    let summary = session::render_file(&image_path, &detections_path, &output, Some(0)).expect("描画に失敗");

    assert!(summary.highlighted);
    assert_eq!(summary.outcome, RenderOutcome::Drawn { boxes: 1, skipped: 0 });
    let written = image::open(&output).expect("出力画像の読み込みに失敗");
    assert_eq!((written.width(), written.height()), (120, 80));
}

/// 範囲外のハイライト番号は何も書かずにエラー
#[test]
fn test_render_file_invalid_highlight() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image_path = dir.path().join("input.png");
    RgbaImage::new(10, 10).save(&image_path).expect("入力画像の保存に失敗");
    let detections_path = dir.path().join("detections.json");
    std::fs::write(&detections_path, "[]").expect("書き込みに失敗");

    let output = dir.path().join("overlay.png");
    let result = session::render_file(&image_path, &detections_path, &output, Some(0));

    assert!(matches!(result, Err(PiiLensError::InvalidDetectionIndex { index: 0, count: 0 })));
    assert!(!output.exists());
}
