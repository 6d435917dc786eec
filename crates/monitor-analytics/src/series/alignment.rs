//! 다중 실행 정렬 프레임.
//!
//! 선택된 실행들의 날짜 합집합을 만들고, 실행/날짜 쌍마다 값 또는 `None`을 채웁니다.
//!
//! # 100 기준 리베이스
//!
//! 각 실행을 자기 자신의 첫 관측 가치로 나누고 100을 곱합니다 (실행별 독립).
//! 첫 가치가 0 이하이거나 비유한인 실행은 그 실행만 리베이스를 끄고 원값을 씁니다.

use chrono::NaiveDate;
use monitor_core::RunId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::warn;

use super::returns::PreparedRun;

/// 리베이스 기준값
pub const REBASE_BASE: f64 = 100.0;

/// 정렬 프레임의 한 열 (실행 하나).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedColumn {
    /// 실행 식별자
    pub run_id: RunId,
    /// 프레임 날짜별 값 (해당 날짜가 없으면 None)
    pub values: Vec<Option<f64>>,
    /// 리베이스 적용 여부
    pub rebased: bool,
}

/// 여러 실행을 날짜 합집합으로 정렬한 프레임.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedFrame {
    /// 모든 입력 날짜의 정렬된 합집합
    pub dates: Vec<NaiveDate>,
    /// 실행별 열 (선택 순서 유지)
    pub columns: Vec<AlignedColumn>,
}

impl AlignedFrame {
    /// 포트폴리오 가치 프레임을 생성합니다.
    ///
    /// # 매개변수
    ///
    /// * `runs` - 준비된 실행 목록
    /// * `rebase` - 100 기준 리베이스 여부
    pub fn from_values(runs: &[PreparedRun], rebase: bool) -> Self {
        Self::build(runs, |run| {
            let observations: Vec<(NaiveDate, f64)> = run
                .points
                .iter()
                .map(|p| (p.date, p.portfolio_value))
                .collect();

            if !rebase {
                return (observations, false);
            }

            match run.first_value() {
                Some(base) if base.is_finite() && base > 0.0 => (
                    observations
                        .into_iter()
                        .map(|(d, v)| (d, v / base * REBASE_BASE))
                        .collect(),
                    true,
                ),
                Some(base) => {
                    warn!(run_id = %run.run_id, base, "Rebase disabled for run with non-positive first value");
                    (observations, false)
                }
                None => (observations, false),
            }
        })
    }

    /// 일간 수익률 프레임을 생성합니다 (리베이스 없음).
    pub fn from_returns(runs: &[PreparedRun]) -> Self {
        Self::build(runs, |run| {
            (
                run.returns.iter().map(|r| (r.date, r.value)).collect(),
                false,
            )
        })
    }

    fn build<F>(runs: &[PreparedRun], extract: F) -> Self
    where
        F: Fn(&PreparedRun) -> (Vec<(NaiveDate, f64)>, bool),
    {
        let mut seen = HashSet::new();
        let selected: Vec<(&RunId, Vec<(NaiveDate, f64)>, bool)> = runs
            .iter()
            .filter(|run| seen.insert(&run.run_id))
            .map(|run| {
                let (observations, rebased) = extract(run);
                (&run.run_id, observations, rebased)
            })
            .collect();

        let dates: Vec<NaiveDate> = selected
            .iter()
            .flat_map(|(_, obs, _)| obs.iter().map(|(d, _)| *d))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = selected
            .into_iter()
            .map(|(run_id, observations, rebased)| AlignedColumn {
                run_id: run_id.clone(),
                values: align_to(&dates, &observations),
                rebased,
            })
            .collect();

        Self { dates, columns }
    }

    /// 실행 식별자로 열을 찾습니다.
    pub fn column(&self, run_id: &RunId) -> Option<&AlignedColumn> {
        self.columns.iter().find(|c| &c.run_id == run_id)
    }

    /// 특정 실행/날짜의 값을 반환합니다.
    pub fn value(&self, run_id: &RunId, date: NaiveDate) -> Option<f64> {
        let idx = self.dates.binary_search(&date).ok()?;
        self.column(run_id)?.values[idx]
    }

    /// 날짜 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// 프레임이 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// 날짜순 관측값을 프레임 날짜에 맞춰 펼칩니다 (병합 순회).
fn align_to(dates: &[NaiveDate], observations: &[(NaiveDate, f64)]) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(dates.len());
    let mut cursor = observations.iter().peekable();

    for date in dates {
        while cursor.next_if(|(d, _)| d < date).is_some() {}
        values.push(cursor.next_if(|(d, _)| d == date).map(|(_, v)| *v));
    }

    values
}
