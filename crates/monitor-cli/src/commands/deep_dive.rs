//! 단일 실행 심층 분석 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! monitor deep-dive momentum-v2
//! monitor deep-dive momentum-v2 --windows 21,63 --top 3 -o reports/momentum.json
//!
//! # 여러 실행을 한 번에 (같은 실행은 캐시에서 재사용)
//! monitor deep-dive momentum-v2 mean-reversion momentum-v2
//! ```

use anyhow::{Context, Result};
use monitor_analytics::{DeepDiveReport, ReportOptions};
use monitor_core::{RunId, SeriesSource};
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{MetricCache, MetricKey, MetricKind};

/// 실행 하나를 로드하여 심층 분석 보고서를 만듭니다.
///
/// 단일 실행 요청이므로 로딩 실패는 그대로 에러로 반환합니다.
pub async fn run_deep_dive(
    source: &dyn SeriesSource,
    run_id: &RunId,
    options: &ReportOptions,
    cache: &MetricCache,
) -> Result<Arc<serde_json::Value>> {
    let key = MetricKey::new(
        [run_id],
        MetricKind::DeepDive,
        serde_json::to_string(options)?,
    );
    if let Some(cached) = cache.get(&key) {
        debug!(run_id = %run_id, "Deep-dive served from cache");
        return Ok(cached);
    }

    let series = source
        .load_run(run_id)
        .await
        .with_context(|| format!("Failed to load run {run_id}"))?;

    let report = DeepDiveReport::from_series(&series, options);
    info!(
        run_id = %run_id,
        returns = report.returns.len(),
        issues = report.issues.len(),
        "Deep-dive complete"
    );

    Ok(cache.insert(key, serde_json::to_value(&report)?))
}

/// 여러 실행의 심층 분석 보고서를 선택 순서대로 만듭니다.
///
/// 실행별 캐시 키를 공유하므로 같은 실행이 다시 나오면 재계산하지 않습니다.
/// 하나라도 로딩에 실패하면 에러를 반환합니다.
pub async fn run_deep_dives(
    source: &dyn SeriesSource,
    run_ids: &[RunId],
    options: &ReportOptions,
    cache: &MetricCache,
) -> Result<Vec<Arc<serde_json::Value>>> {
    let mut reports = Vec::with_capacity(run_ids.len());
    for run_id in run_ids {
        reports.push(run_deep_dive(source, run_id, options, cache).await?);
    }
    Ok(reports)
}
