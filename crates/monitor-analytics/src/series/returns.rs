//! 일간 수익률 도출.
//!
//! 명시적 일간 수익률이 유한하면 그대로 사용하고, 없으면 같은 시계열의
//! 직전 포인트 대비 `value[i] / value[i-1] - 1`로 계산합니다.
//! 첫 포인트는 수익률을 만들지 않습니다.

use chrono::NaiveDate;
use monitor_core::{RunId, RunSeries, TimeSeriesPoint};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::sanitize::{sanitize_points, DataQuality};

/// 도출된 일간 수익률 (비율, 0.01 = 1%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReturn {
    /// 날짜
    pub date: NaiveDate,
    /// 수익률
    pub value: f64,
}

/// 정렬된 포인트에서 일간 수익률을 도출합니다.
///
/// 직전 가치가 0이거나 비유한이면, 또는 결과가 비유한이면 해당 날짜는
/// 에러 없이 제외됩니다.
///
/// # 반환값
///
/// (수익률 목록, 제외된 날짜 수)
pub fn derive_returns(points: &[TimeSeriesPoint]) -> (Vec<DailyReturn>, usize) {
    let mut returns = Vec::with_capacity(points.len().saturating_sub(1));
    let mut skipped = 0;

    for w in points.windows(2) {
        let (prev, curr) = (&w[0], &w[1]);

        let value = match curr.explicit_return() {
            Some(r) => Some(r),
            None if prev.portfolio_value == 0.0 || !prev.portfolio_value.is_finite() => None,
            None => Some(curr.portfolio_value / prev.portfolio_value - 1.0),
        };

        match value {
            Some(value) if value.is_finite() => returns.push(DailyReturn {
                date: curr.date,
                value,
            }),
            _ => skipped += 1,
        }
    }

    (returns, skipped)
}

/// 분석 준비가 끝난 실행.
///
/// 정제된 포인트와 한 번 도출된 수익률을 보관하며,
/// 모든 지표 계산이 이 구조체를 공유합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedRun {
    /// 실행 식별자
    pub run_id: RunId,
    /// 정제된 포인트 (날짜순, 날짜 중복 없음)
    pub points: Vec<TimeSeriesPoint>,
    /// 도출된 일간 수익률 (날짜순)
    pub returns: Vec<DailyReturn>,
    /// 데이터 품질 카운트
    pub quality: DataQuality,
}

impl PreparedRun {
    /// 원시 시계열을 정제하고 수익률을 도출합니다.
    pub fn new(series: &RunSeries) -> Self {
        let (points, mut quality) = sanitize_points(&series.points);
        let (returns, skipped) = derive_returns(&points);
        quality.returns_skipped = skipped;

        if quality.malformed() > 0 {
            warn!(
                run_id = %series.run_id,
                non_finite = quality.non_finite_dropped,
                duplicates = quality.duplicate_dropped,
                "Dropped malformed points"
            );
        }
        debug!(
            run_id = %series.run_id,
            points = points.len(),
            returns = returns.len(),
            "Prepared run"
        );

        Self {
            run_id: series.run_id.clone(),
            points,
            returns,
            quality,
        }
    }

    /// 수익률 값만 날짜순으로 반환합니다.
    pub fn return_values(&self) -> Vec<f64> {
        self.returns.iter().map(|r| r.value).collect()
    }

    /// 첫 관측 가치를 반환합니다.
    pub fn first_value(&self) -> Option<f64> {
        self.points.first().map(|p| p.portfolio_value)
    }

    /// 마지막 관측 가치를 반환합니다.
    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.portfolio_value)
    }

    /// 포인트가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 여러 실행을 병렬로 준비합니다.
///
/// 같은 실행 식별자가 반복되면 첫 번째만 사용합니다. 결과는 입력 순서를 유지합니다.
pub fn prepare_runs(runs: &[RunSeries]) -> Vec<PreparedRun> {
    let mut seen = HashSet::new();
    let unique: Vec<&RunSeries> = runs
        .iter()
        .filter(|r| {
            let first = seen.insert(&r.run_id);
            if !first {
                warn!(run_id = %r.run_id, "Ignoring duplicate run in selection");
            }
            first
        })
        .collect();

    unique.par_iter().map(|r| PreparedRun::new(r)).collect()
}
