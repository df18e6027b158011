//! 設定ファイルテスト

use pii_lens::config::Config;
use pii_lens::error::PiiLensError;
use pii_lens_common::{EndpointMode, StaleMaskPolicy, DEFAULT_API_BASE};
use tempfile::tempdir;

/// 設定ファイルがなければデフォルト
#[test]
fn test_load_missing_returns_default() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config::load_from(&dir.path().join("config.json")).expect("読み込みに失敗");

    assert_eq!(config, Config::default());
    assert_eq!(config.default_mode, EndpointMode::Process);
    assert_eq!(config.stale_mask_policy, StaleMaskPolicy::Keep);
}

/// 保存して読み直す
#[test]
fn test_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.set_api_base("https://pii.example.com/".to_string()).expect("設定に失敗");
    config.default_mode = EndpointMode::Mask;
    config.stale_mask_policy = StaleMaskPolicy::Clear;
    config.save_to(&path).expect("保存に失敗");

    let loaded = Config::load_from(&path).expect("読み込みに失敗");
    assert_eq!(loaded.api_base.as_deref(), Some("https://pii.example.com"));
    assert_eq!(loaded.default_mode, EndpointMode::Mask);
    assert_eq!(loaded.stale_mask_policy, StaleMaskPolicy::Clear);
}

/// 一部だけ書かれた設定ファイル
#[test]
fn test_partial_config_uses_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"default_mode":"detect"}"#).expect("書き込みに失敗");

    let config = Config::load_from(&path).expect("読み込みに失敗");
    assert_eq!(config.default_mode, EndpointMode::Detect);
    assert_eq!(config.timeout_seconds, 60);
    assert!(config.api_base.is_none());
}

/// 接続先の優先順位: 引数 > 環境変数 > 設定ファイル > デフォルト
#[test]
fn test_resolve_service_priority() {
    let mut config = Config::default();
    assert_eq!(config.resolve_service(None, None).api_base, DEFAULT_API_BASE);

    config.api_base = Some("http://file:1".to_string());
    assert_eq!(config.resolve_service(None, None).api_base, "http://file:1");
    assert_eq!(config.resolve_service(None, Some("http://env:2")).api_base, "http://env:2");
    assert_eq!(
        config.resolve_service(Some("http://arg:3"), Some("http://env:2")).api_base,
        "http://arg:3"
    );
    // 空の環境変数は無視
    assert_eq!(config.resolve_service(None, Some("  ")).api_base, "http://file:1");
}

/// http(s)以外は拒否
#[test]
fn test_set_api_base_rejects_non_http() {
    let mut config = Config::default();
    let result = config.set_api_base("ftp://example.com".to_string());

    assert!(matches!(result, Err(PiiLensError::Config(_))));
    assert!(config.api_base.is_none());
}

/// 壊れた設定ファイル
#[test]
fn test_invalid_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").expect("書き込みに失敗");

    assert!(matches!(Config::load_from(&path), Err(PiiLensError::JsonParse(_))));
}
