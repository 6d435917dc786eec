//! 성과 분석 모듈
//!
//! 준비된 실행(`PreparedRun`)으로부터 실행별 성과 지표를 계산합니다.
//!
//! # 모듈 구성
//!
//! - [`drawdown`]: 고점 대비 낙폭 곡선과 낙폭 구간 순위
//! - [`rolling`]: 롤링 윈도우 샤프/변동성/수익률/최대낙폭
//! - [`distribution`]: 왜도, 첨도, 수익률 히스토그램
//! - [`summary`]: 실행별 요약 지표

pub mod distribution;
pub mod drawdown;
pub mod rolling;
pub mod summary;

pub use distribution::*;
pub use drawdown::*;
pub use rolling::*;
pub use summary::*;

/// 연간 거래일 수 (연율화 기준)
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// 이 값보다 작은 변동성은 0으로 간주
pub const MIN_VOLATILITY: f64 = 1e-12;

/// 산술 평균. 비어있으면 None.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// 표본 표준편차 (n - 1). 2개 미만이거나 계산이 넘치면 None.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt()).filter(|s| s.is_finite())
}
