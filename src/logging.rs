//! ログ設定
//!
//! `RUST_LOG` が設定されていればそれに従う。未設定なら `-v` で debug、
//! それ以外は info を pii_lens クレートにだけ適用する。

use log::LevelFilter;
use std::io::Write;

pub fn setup_logger(verbose: bool) {
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        let level = default_level(verbose);
        builder.filter(None, LevelFilter::Warn);
        builder.filter(Some("pii_lens"), level);
        builder.filter(Some("pii_lens_common"), level);
    }

    builder.format(|buf, record| {
        let level = buf.default_styled_level(record.level());
        let module = record.module_path().unwrap_or("unknown");
        writeln!(buf, "{} {} {}", level, module, record.args())
    });

    // テストから複数回呼ばれても落とさない
    let _ = builder.try_init();
}

fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
