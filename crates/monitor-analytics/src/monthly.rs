//! 월별 수익률 집계 (히트맵용).
//!
//! 일간 수익률을 (UTC 연도, UTC 월)로 묶어 복리 수익률을 계산합니다.
//!
//! # 계산 공식
//!
//! - 월 수익률(%) = (∏(1 + rᵢ) - 1) × 100
//! - 연초 대비(YTD) 기본값: 해당 연도 실현 월들의 복리 곱
//! - `YtdConvention::SummedApproximation`: 월 수익률(%)의 단순 합

use chrono::Datelike;
use monitor_core::YtdConvention;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::series::DailyReturn;

/// 한 달의 복리 수익률.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturnEntry {
    /// 연도
    pub year: i32,
    /// 월 (1-12)
    pub month: u32,
    /// 복리 수익률 (%)
    pub compounded_return_pct: f64,
    /// 해당 월에 포함된 수익률 개수
    pub trading_days: usize,
    /// 색상 강도 (-1.0 ~ 1.0, 최대 절대값 기준 정규화)
    pub intensity: f64,
}

/// 히트맵 한 행 (연도).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearReturnRow {
    pub year: i32,
    /// 1월~12월 (데이터 없는 달은 None)
    pub months: [Option<f64>; 12],
    /// 연초 대비 수익률 (%)
    pub ytd_pct: f64,
}

/// 월별 수익률 그리드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturnGrid {
    /// 날짜순 월별 항목
    pub entries: Vec<MonthlyReturnEntry>,
    /// 연도별 행
    pub years: Vec<YearReturnRow>,
    /// YTD 계산 방식
    pub convention: YtdConvention,
    /// 월 수익률 절대값 최대 (히트맵 스케일)
    pub max_abs_pct: f64,
}

impl MonthlyReturnGrid {
    /// 일간 수익률로부터 월별 그리드를 만듭니다.
    pub fn from_returns(returns: &[DailyReturn], convention: YtdConvention) -> Self {
        // (연, 월) → (성장 배수, 일수)
        let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
        for r in returns {
            let bucket = buckets
                .entry((r.date.year(), r.date.month()))
                .or_insert((1.0, 0));
            bucket.0 *= 1.0 + r.value;
            bucket.1 += 1;
        }

        let max_abs_pct = buckets
            .values()
            .map(|(growth, _)| ((growth - 1.0) * 100.0).abs())
            .fold(0.0_f64, f64::max);

        let entries: Vec<MonthlyReturnEntry> = buckets
            .iter()
            .map(|(&(year, month), &(growth, days))| {
                let pct = (growth - 1.0) * 100.0;
                MonthlyReturnEntry {
                    year,
                    month,
                    compounded_return_pct: pct,
                    trading_days: days,
                    intensity: if max_abs_pct > 0.0 {
                        (pct / max_abs_pct).clamp(-1.0, 1.0)
                    } else {
                        0.0
                    },
                }
            })
            .collect();

        let mut rows: BTreeMap<i32, ([Option<f64>; 12], f64, f64)> = BTreeMap::new();
        for (&(year, month), &(growth, _)) in &buckets {
            let row = rows.entry(year).or_insert(([None; 12], 1.0, 0.0));
            let pct = (growth - 1.0) * 100.0;
            row.0[(month - 1) as usize] = Some(pct);
            row.1 *= growth;
            row.2 += pct;
        }

        let years = rows
            .into_iter()
            .map(|(year, (months, growth, summed))| YearReturnRow {
                year,
                months,
                ytd_pct: match convention {
                    YtdConvention::Compounded => (growth - 1.0) * 100.0,
                    YtdConvention::SummedApproximation => summed,
                },
            })
            .collect();

        Self {
            entries,
            years,
            convention,
            max_abs_pct,
        }
    }

    /// 특정 연/월 항목을 찾습니다.
    pub fn entry(&self, year: i32, month: u32) -> Option<&MonthlyReturnEntry> {
        self.entries
            .iter()
            .find(|e| e.year == year && e.month == month)
    }

    /// 특정 연도 행을 찾습니다.
    pub fn year(&self, year: i32) -> Option<&YearReturnRow> {
        self.years.iter().find(|row| row.year == year)
    }

    /// 양수 수익률 월의 비율. 월이 없으면 None.
    pub fn win_rate(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let wins = self
            .entries
            .iter()
            .filter(|e| e.compounded_return_pct > 0.0)
            .count();
        Some(wins as f64 / self.entries.len() as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
