//! 실행별 성과 요약.
//!
//! 비교 화면의 요약 표 한 행에 해당합니다. 모든 비율 값은 소수 비율입니다 (0.1 = 10%).

use chrono::NaiveDate;
use monitor_core::RunId;
use serde::{Deserialize, Serialize};

use super::{mean, sample_std, DrawdownAnalysis, MIN_VOLATILITY, TRADING_DAYS_PER_YEAR};
use crate::monthly::MonthlyReturnGrid;
use crate::series::PreparedRun;

/// CAGR 계산에 사용하는 연간 달력일 수
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

/// 실행 하나의 성과 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub run_id: RunId,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// 정제 후 포인트 수
    pub observations: usize,
    /// 총 수익률 (마지막 / 첫 가치 - 1)
    pub total_return: Option<f64>,
    /// 연복리 수익률 (달력일 / 365 기준)
    pub cagr: Option<f64>,
    /// 연율화 수익률 (평균 × 252)
    pub annualized_return: Option<f64>,
    /// 연율화 변동성 (표본 표준편차 × √252)
    pub annualized_volatility: Option<f64>,
    pub sharpe: Option<f64>,
    /// 최대 낙폭 (0 이하)
    pub max_drawdown: Option<f64>,
    /// 0이 아닌 일간 수익률 중 양수 비율
    pub daily_win_rate: Option<f64>,
    /// 양수 월 비율
    pub monthly_win_rate: Option<f64>,
    pub best_day: Option<f64>,
    pub worst_day: Option<f64>,
}

impl PerformanceSummary {
    /// 준비된 실행과 이미 계산된 낙폭/월별 결과로 요약을 만듭니다.
    pub fn build(
        run: &PreparedRun,
        drawdown: &DrawdownAnalysis,
        monthly: &MonthlyReturnGrid,
    ) -> Self {
        let returns = run.return_values();

        let first_date = run.points.first().map(|p| p.date);
        let last_date = run.points.last().map(|p| p.date);

        let total_return = match (run.first_value(), run.last_value()) {
            (Some(first), Some(last)) if first > 0.0 => Some(last / first - 1.0),
            _ => None,
        };

        let cagr = match (first_date, last_date, total_return) {
            (Some(start), Some(end), Some(total)) => cagr(total + 1.0, (end - start).num_days()),
            _ => None,
        };

        let annualized_return = mean(&returns).map(|m| m * TRADING_DAYS_PER_YEAR);
        let annualized_volatility =
            sample_std(&returns).map(|s| s * TRADING_DAYS_PER_YEAR.sqrt());
        let sharpe = match (annualized_return, annualized_volatility) {
            (Some(ret), Some(vol)) if vol >= MIN_VOLATILITY => {
                Some(ret / vol).filter(|s| s.is_finite())
            }
            _ => None,
        };

        let (wins, losses) = returns.iter().fold((0usize, 0usize), |(w, l), r| {
            if *r > 0.0 {
                (w + 1, l)
            } else if *r < 0.0 {
                (w, l + 1)
            } else {
                (w, l)
            }
        });
        let daily_win_rate = (wins + losses > 0).then(|| wins as f64 / (wins + losses) as f64);

        Self {
            run_id: run.run_id.clone(),
            first_date,
            last_date,
            observations: run.points.len(),
            total_return,
            cagr,
            annualized_return,
            annualized_volatility,
            sharpe,
            max_drawdown: drawdown.max_drawdown(),
            daily_win_rate,
            monthly_win_rate: monthly.win_rate(),
            best_day: returns.iter().copied().reduce(f64::max),
            worst_day: returns.iter().copied().reduce(f64::min),
        }
    }
}

/// CAGR = ratio^(365 / days) - 1
fn cagr(ratio: f64, days: i64) -> Option<f64> {
    if days < 1 || ratio <= 0.0 || !ratio.is_finite() {
        return None;
    }
    let years = days as f64 / CALENDAR_DAYS_PER_YEAR;
    Some(ratio.powf(1.0 / years) - 1.0).filter(|c| c.is_finite())
}
