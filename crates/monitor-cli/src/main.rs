//! 전략 모니터링 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 실행 심층 분석 (여러 개 지정 가능)
//! monitor deep-dive momentum-v2
//! monitor deep-dive momentum-v2 mean-reversion
//!
//! # 여러 실행 비교 (결과를 파일로 저장)
//! monitor compare momentum-v2 mean-reversion -o reports/compare.json
//!
//! # 데이터 디렉토리의 모든 실행 검증
//! monitor validate --runs-dir data/runs
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use monitor_analytics::ReportOptions;
use monitor_core::{init_logging, AppConfig, LogConfig, RunId};
use std::path::PathBuf;
use tracing::{debug, error, info};

use monitor_cli::commands::compare::run_compare;
use monitor_cli::commands::deep_dive::run_deep_dives;
use monitor_cli::commands::validate::run_validate;
use monitor_cli::commands::write_output;
use monitor_cli::{JsonDirSeriesSource, MetricCache};

#[derive(Parser)]
#[command(name = "monitor")]
#[command(about = "Strategy monitor CLI - 백테스트 시계열 분석", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (기본: config/monitor.toml, 없으면 기본값)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 실행 JSON 파일 디렉토리 (설정의 data.runs_dir 대신 사용)
    #[arg(long, global = true)]
    runs_dir: Option<PathBuf>,

    /// 출력 파일 경로 (지정하지 않으면 stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 실행별 심층 분석 (낙폭, 롤링 지표, 월별 히트맵, 분포)
    DeepDive {
        /// 실행 식별자 목록 (파일 이름, 하나면 단일 보고서 출력)
        #[arg(required = true)]
        run_ids: Vec<String>,

        /// 롤링 윈도우 목록 (쉼표 구분, 예: 21,63)
        #[arg(long, value_delimiter = ',')]
        windows: Option<Vec<usize>>,

        /// 보고할 상위 낙폭 구간 수
        #[arg(long)]
        top: Option<usize>,
    },

    /// 여러 실행 비교 (정렬 프레임, 상관행렬, 요약)
    Compare {
        /// 실행 식별자 목록 (비우면 전체)
        run_ids: Vec<String>,

        /// 100 기준 리베이스 끄기
        #[arg(long, default_value = "false")]
        no_rebase: bool,
    },

    /// 실행 파일 검증 (데이터 품질 카운트)
    Validate {
        /// 실행 식별자 목록 (비우면 전체)
        run_ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(Some(path))
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::load_default().context("Failed to load config")?,
    };

    init_logging(LogConfig::from_settings(&config.logging))?;
    debug!(?config, "Configuration loaded");

    let mut options = ReportOptions::from_config(&config.analytics)?;
    let runs_dir = cli.runs_dir.unwrap_or_else(|| config.data.runs_dir.clone());
    let source = JsonDirSeriesSource::new(&runs_dir);
    let cache = MetricCache::new();

    info!("Reading runs from: {}", runs_dir.display());

    match cli.command {
        Commands::DeepDive {
            run_ids,
            windows,
            top,
        } => {
            if let Some(windows) = windows {
                if windows.contains(&0) {
                    bail!("Rolling windows must be positive");
                }
                options.rolling_windows = windows;
            }
            if let Some(top) = top {
                options.top_drawdowns = top;
            }

            let run_ids: Vec<RunId> = run_ids.into_iter().map(RunId::new).collect();

            let reports = run_deep_dives(&source, &run_ids, &options, &cache).await?;
            match reports.as_slice() {
                [report] => write_output(report.as_ref(), cli.output.as_deref()).await?,
                _ => {
                    let reports: Vec<&serde_json::Value> =
                        reports.iter().map(|r| r.as_ref()).collect();
                    write_output(&reports, cli.output.as_deref()).await?
                }
            }
        }

        Commands::Compare { run_ids, no_rebase } => {
            if no_rebase {
                options.rebase = false;
            }
            let run_ids: Vec<RunId> = run_ids.into_iter().map(RunId::new).collect();

            let output = run_compare(&source, &run_ids, &options, &cache).await?;
            write_output(&output, cli.output.as_deref()).await?;
        }

        Commands::Validate { run_ids } => {
            let run_ids: Vec<RunId> = run_ids.into_iter().map(RunId::new).collect();

            let report = run_validate(&source, &run_ids).await?;
            write_output(&report, cli.output.as_deref()).await?;

            let failed = report.failed();
            if failed > 0 {
                error!("{} run(s) failed validation", failed);
                bail!("{failed} run(s) failed validation");
            }
        }
    }

    let stats = cache.stats();
    debug!(hits = stats.hits, misses = stats.misses, "Metric cache stats");

    Ok(())
}
