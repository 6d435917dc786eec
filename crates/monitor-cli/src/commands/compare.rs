//! 다중 실행 비교 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! # 데이터 디렉토리의 모든 실행 비교
//! monitor compare
//!
//! # 특정 실행만, 리베이스 없이
//! monitor compare alpha beta gamma --no-rebase
//! ```
//!
//! 읽을 수 없는 실행은 경고 후 건너뛰고 `skipped`에 기록합니다.

use anyhow::Result;
use monitor_analytics::{ComparisonReport, ReportOptions};
use monitor_core::{RunId, SeriesSource};
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::{MetricCache, MetricKey, MetricKind};

/// 건너뛴 실행
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRun {
    pub run_id: RunId,
    pub reason: String,
}

/// 비교 명령 출력
#[derive(Debug, Clone, Serialize)]
pub struct CompareOutput {
    pub report: serde_json::Value,
    pub skipped: Vec<SkippedRun>,
}

/// 선택된 실행들을 비교합니다. 선택이 비어있으면 모든 실행을 사용합니다.
pub async fn run_compare(
    source: &dyn SeriesSource,
    run_ids: &[RunId],
    options: &ReportOptions,
    cache: &MetricCache,
) -> Result<CompareOutput> {
    let selection = if run_ids.is_empty() {
        source.list_runs().await?
    } else {
        run_ids.to_vec()
    };

    let loaded = source.load_runs(&selection).await?;
    let skipped: Vec<SkippedRun> = loaded
        .failures
        .iter()
        .map(|(run_id, e)| SkippedRun {
            run_id: run_id.clone(),
            reason: e.to_string(),
        })
        .collect();
    if !skipped.is_empty() {
        warn!(count = skipped.len(), "Some runs were skipped");
    }

    let loaded_ids: Vec<RunId> = loaded.runs.iter().map(|r| r.run_id.clone()).collect();
    let key = MetricKey::new(
        &loaded_ids,
        MetricKind::Comparison,
        serde_json::to_string(options)?,
    );

    let report = cache.get_or_compute(key, || {
        let report = ComparisonReport::from_series(&loaded.runs, options);
        info!(
            runs = report.run_ids.len(),
            dates = report.values.len(),
            "Comparison complete"
        );
        report
    })?;

    Ok(CompareOutput {
        report: report.as_ref().clone(),
        skipped,
    })
}
