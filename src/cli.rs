use clap::{Parser, Subcommand};
use pii_lens_common::{EndpointMode, StaleMaskPolicy};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pii-lens")]
#[command(about = "画像内の個人情報を検出・マスクするクライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像をサービスに送信して結果を保存
    Run {
        /// 画像ファイル
        #[arg(required = true)]
        image: PathBuf,

        /// 処理モード (process/detect/mask)。省略時は設定値
        #[arg(short, long)]
        mode: Option<EndpointMode>,

        /// APIベースURL（設定と環境変数より優先）
        #[arg(long)]
        api_base: Option<String>,

        /// 出力ディレクトリ（デフォルト: カレント）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 保存済みの検出結果を画像に重ねて描画
    Render {
        /// 画像ファイル
        #[arg(required = true)]
        image: PathBuf,

        /// 検出結果JSON（配列、または detected_pii を含むレスポンス）
        #[arg(required = true)]
        detections: PathBuf,

        /// 出力PNG（デフォルト: overlay.png）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ハイライトする検出の番号（0始まり）
        #[arg(long)]
        highlight: Option<usize>,
    },

    /// 設定を表示/編集
    Config {
        /// APIベースURLを設定
        #[arg(long)]
        set_api_base: Option<String>,

        /// 既定の処理モードを設定
        #[arg(long)]
        set_mode: Option<EndpointMode>,

        /// 検出のみモードで古いマスク画像を残すか (keep/clear)
        #[arg(long)]
        set_stale_mask: Option<StaleMaskPolicy>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from(["pii-lens", "run", "a.png", "--mode", "detect", "-o", "out"])
            .expect("引数解析に失敗");
        match cli.command {
            Commands::Run { image, mode, api_base, output } => {
                assert_eq!(image, PathBuf::from("a.png"));
                assert_eq!(mode, Some(EndpointMode::Detect));
                assert!(api_base.is_none());
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_mode_by_endpoint_name() {
        let cli = Cli::try_parse_from(["pii-lens", "run", "a.png", "--mode", "mask-pii"]).expect("引数解析に失敗");
        assert!(matches!(cli.command, Commands::Run { mode: Some(EndpointMode::Mask), .. }));
    }

    #[test]
    fn test_parse_render_with_highlight() {
        let cli = Cli::try_parse_from(["pii-lens", "-v", "render", "a.png", "d.json", "--highlight", "2"])
            .expect("引数解析に失敗");
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Render { highlight: Some(2), .. }));
    }

    #[test]
    fn test_invalid_mode_rejected() {
        assert!(Cli::try_parse_from(["pii-lens", "run", "a.png", "--mode", "blur"]).is_err());
    }

    #[test]
    fn test_parse_config() {
        let cli = Cli::try_parse_from(["pii-lens", "config", "--set-stale-mask", "clear", "--show"])
            .expect("引数解析に失敗");
        match cli.command {
            Commands::Config { set_stale_mask, show, .. } => {
                assert_eq!(set_stale_mask, Some(StaleMaskPolicy::Clear));
                assert!(show);
            }
            _ => panic!("expected config"),
        }
    }
}
