//! 롤링 윈도우 지표.
//!
//! 도출된 일간 수익률의 후행 윈도우(거래일 수 기준)마다 통계를 계산합니다.
//!
//! # 계산 공식
//!
//! - 연율화 수익률 = 평균 × 252
//! - 변동성 = 표본 표준편차(n - 1) × √252
//! - 샤프 비율 = 연율화 수익률 / 변동성 (변동성이 0이면 null)
//! - 최대낙폭 = 윈도우 수익률을 1.0부터 복리로 누적한 곡선의 최저 낙폭
//!
//! 윈도우를 채우지 못한 인덱스는 포인트를 만들지 않습니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{mean, sample_std, MIN_VOLATILITY, TRADING_DAYS_PER_YEAR};
use crate::series::DailyReturn;

/// 한 윈도우의 롤링 통계.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingWindowPoint {
    /// 윈도우 마지막 날짜
    pub date: NaiveDate,
    /// 일간 수익률 평균
    pub mean: f64,
    /// 연율화 수익률
    pub annualized_return: f64,
    /// 연율화 변동성 (윈도우 1이면 None)
    pub volatility: Option<f64>,
    /// 샤프 비율 (변동성 0 또는 미정의면 None)
    pub sharpe: Option<f64>,
    /// 윈도우 내 최대낙폭 (0 이하)
    pub max_drawdown: f64,
}

/// 한 윈도우 크기의 롤링 통계 시계열.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingWindowSeries {
    pub window_days: usize,
    pub points: Vec<RollingWindowPoint>,
}

/// 추출 가능한 단일 롤링 지표.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollingMetric {
    Sharpe,
    Volatility,
    AnnualizedReturn,
    MaxDrawdown,
}

/// 단일 지표 시계열의 한 점.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// 단일 롤링 지표 시계열.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingMetricSeries {
    pub window_days: usize,
    pub metric: RollingMetric,
    pub points: Vec<MetricPoint>,
}

impl RollingWindowSeries {
    /// 롤링 통계를 계산합니다.
    ///
    /// # 매개변수
    ///
    /// * `returns` - 날짜순 일간 수익률
    /// * `window_days` - 윈도우 크기 (거래일 수). 0이면 빈 시계열
    pub fn compute(returns: &[DailyReturn], window_days: usize) -> Self {
        if window_days == 0 || returns.len() < window_days {
            return Self {
                window_days,
                points: Vec::new(),
            };
        }

        let values: Vec<f64> = returns.iter().map(|r| r.value).collect();

        let points = values
            .windows(window_days)
            .zip(&returns[window_days - 1..])
            .filter_map(|(window, last)| window_point(last.date, window))
            .collect();

        Self {
            window_days,
            points,
        }
    }

    /// 단일 지표 시계열을 추출합니다.
    pub fn metric(&self, metric: RollingMetric) -> RollingMetricSeries {
        let points = self
            .points
            .iter()
            .map(|p| MetricPoint {
                date: p.date,
                value: match metric {
                    RollingMetric::Sharpe => p.sharpe,
                    RollingMetric::Volatility => p.volatility,
                    RollingMetric::AnnualizedReturn => Some(p.annualized_return),
                    RollingMetric::MaxDrawdown => Some(p.max_drawdown),
                },
            })
            .collect();

        RollingMetricSeries {
            window_days: self.window_days,
            metric,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 여러 윈도우 크기를 한 번에 계산합니다.
pub fn rolling_windows(returns: &[DailyReturn], windows: &[usize]) -> Vec<RollingWindowSeries> {
    windows
        .iter()
        .map(|&w| RollingWindowSeries::compute(returns, w))
        .collect()
}

fn window_point(date: NaiveDate, window: &[f64]) -> Option<RollingWindowPoint> {
    let mean = mean(window)?;
    let annualized_return = mean * TRADING_DAYS_PER_YEAR;
    let volatility = sample_std(window).map(|s| s * TRADING_DAYS_PER_YEAR.sqrt());

    let sharpe = volatility
        .filter(|v| *v >= MIN_VOLATILITY)
        .map(|v| annualized_return / v)
        .filter(|s| s.is_finite());

    Some(RollingWindowPoint {
        date,
        mean,
        annualized_return,
        volatility,
        sharpe,
        max_drawdown: compounded_max_drawdown(window),
    })
}

/// 수익률을 1.0부터 복리로 누적했을 때의 최저 낙폭.
pub(crate) fn compounded_max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut worst = 0.0_f64;

    for r in returns {
        equity *= 1.0 + r;
        peak = peak.max(equity);
        worst = worst.min((equity - peak) / peak);
    }

    worst
}
