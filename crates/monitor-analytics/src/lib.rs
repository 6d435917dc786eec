//! 백테스트 시계열 분석 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 시계열 정제 및 일간 수익률 도출
//! - 다중 실행 날짜 정렬 (100 기준 리베이스)
//! - 낙폭 곡선과 낙폭 구간 순위
//! - 롤링 윈도우 지표 (샤프, 변동성, 수익률, 최대낙폭)
//! - 실행 간 상관행렬
//! - 월별 복리 수익률 히트맵
//! - 분포 통계 (왜도, 첨도, 히스토그램)
//!
//! 모든 연산은 불변 입력에 대한 순수 동기 변환이며, 상태를 저장하지 않습니다.
//!
//! # Re-exports
//!
//! - [`series`]: 정제, 수익률, 정렬 프레임
//! - [`performance`]: 낙폭, 롤링, 분포, 요약
//! - [`report`]: 심층 분석/비교 보고서

pub mod correlation;
pub mod error;
pub mod monthly;
pub mod performance;
pub mod report;
pub mod series;

pub use correlation::{
    calculate_correlation, intersect_returns, pairwise_correlation, CorrelationMatrix,
    MIN_OVERLAP,
};
pub use error::{AnalyticsError, AnalyticsResult, DataIssue};
pub use monthly::{MonthlyReturnEntry, MonthlyReturnGrid, YearReturnRow};

// Performance 모듈 re-exports
pub use performance::{
    rolling_windows, DistributionStats, DrawdownAnalysis, DrawdownEpisode, DrawdownPoint,
    HistogramBin, HistogramSpec, MetricPoint, PerformanceSummary, ReturnHistogram,
    RollingMetric, RollingMetricSeries, RollingWindowPoint, RollingWindowSeries,
    DEFAULT_TOP_DRAWDOWNS, TRADING_DAYS_PER_YEAR,
};

// Series 모듈 re-exports
pub use series::{
    derive_returns, prepare_runs, sanitize_points, AlignedColumn, AlignedFrame, DailyReturn,
    DataQuality, PreparedRun,
};

pub use report::{build_deep_dives, ComparisonReport, DeepDiveReport, ReportOptions, RunQuality};
