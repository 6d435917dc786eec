//! 분석 엔진의 에러 및 데이터 품질 이슈 타입.
//!
//! 엔진이 호출자에게 전파하는 에러는 잘못된 파라미터뿐입니다.
//! 데이터 결함은 `DataIssue`로 기록되어 보고서에 함께 실립니다.

use monitor_core::RunId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 분석 엔진 에러.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// 잘못된 계산 파라미터 (히스토그램 범위 등)
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 구조적으로 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 분석 결과에 대한 Result 타입.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// 계산을 중단하지 않는 데이터 품질 이슈.
///
/// 각 이슈는 해당 지표 하나만 `null`로 만들거나 해당 포인트만 제외합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIssue {
    /// 윈도우/표본 크기 부족 → 해당 지표는 null
    InsufficientData {
        run_id: Option<RunId>,
        metric: String,
        required: usize,
        available: usize,
    },
    /// 비유한 값 또는 중복 날짜 → 포인트 제외
    MalformedPoint { run_id: RunId, dropped: usize },
    /// 선택된 실행 없음 또는 겹치는 날짜 없음 → 빈 결과
    EmptySelection { detail: String },
    /// 분산/변동성 0 → 의존 비율은 null
    NumericDegenerate { run_id: Option<RunId>, metric: String },
}

impl DataIssue {
    /// 표본 부족 이슈를 생성합니다.
    pub fn insufficient(
        run_id: Option<&RunId>,
        metric: impl Into<String>,
        required: usize,
        available: usize,
    ) -> Self {
        DataIssue::InsufficientData {
            run_id: run_id.cloned(),
            metric: metric.into(),
            required,
            available,
        }
    }

    /// 수치적 퇴화 이슈를 생성합니다.
    pub fn degenerate(run_id: Option<&RunId>, metric: impl Into<String>) -> Self {
        DataIssue::NumericDegenerate {
            run_id: run_id.cloned(),
            metric: metric.into(),
        }
    }
}
