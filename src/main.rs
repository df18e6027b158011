use clap::Parser;
use pii_lens::{cli, client, config, error, logging, session};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use pii_lens_common::EndpointMode;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logger(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Run { image, mode, api_base, output } => {
            println!("🔍 pii-lens - 個人情報検出\n");

            let mode = mode.unwrap_or(config.default_mode);
            let service = config.service(api_base.as_deref());
            let output_dir = output.unwrap_or_else(|| std::path::PathBuf::from("."));

            println!("[1/2] 送信中: {} ({})", image.display(), mode.label());
            let client = client::PiiClient::new(service, config.timeout())?;
            let summary = session::run_image(&client, &image, mode, config.stale_mask_policy, &output_dir).await?;
            println!("✔ 処理完了\n");

            println!("[2/2] 結果を保存");
            if mode != EndpointMode::Mask {
                println!("  検出: {}件", summary.detections);
            }
            for path in [&summary.detections_file, &summary.overlay_file, &summary.masked_file]
                .into_iter()
                .flatten()
            {
                println!("✔ {}", path.display());
            }
            if mode.returns_detections() && summary.detections == 0 {
                println!("  個人情報は検出されませんでした");
            }

            println!("\n✅ 完了");
        }

        Commands::Render { image, detections, output, highlight } => {
            println!("🖼 pii-lens - オーバーレイ描画\n");

            let output = output.unwrap_or_else(|| std::path::PathBuf::from(session::OVERLAY_FILE_NAME));
            let summary = session::render_file(&image, &detections, &output, highlight)?;
            if summary.highlighted {
                println!("✔ ハイライト: #{}", highlight.unwrap_or_default());
            }
            println!("✔ 保存: {}", summary.output.display());
        }

        Commands::Config { set_api_base, set_mode, set_stale_mask, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(api_base) = set_api_base {
                config.set_api_base(api_base)?;
                println!("✔ APIベースURLを設定しました");
                changed = true;
            }
            if let Some(mode) = set_mode {
                config.default_mode = mode;
                println!("✔ 既定モードを設定しました: {}", mode);
                changed = true;
            }
            if let Some(policy) = set_stale_mask {
                config.stale_mask_policy = policy;
                println!("✔ マスク画像の扱いを設定しました");
                changed = true;
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                let service = config.service(None);
                println!("設定:");
                println!("  APIベースURL: {}", service.api_base);
                println!("  既定モード: {} ({})", config.default_mode, config.default_mode.label());
                println!("  検出のみ時のマスク画像: {:?}", config.stale_mask_policy);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}
