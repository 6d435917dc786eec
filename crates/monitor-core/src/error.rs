//! 모니터링 시스템의 에러 타입.
//!
//! 구조적으로 잘못된 입력만 에러로 전파됩니다. 개별 포인트의 결함이나
//! 표본 부족은 에러가 아니라 분석 결과의 `null`/카운트로 표현됩니다.

use thiserror::Error;

/// 핵심 모니터링 에러.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력 (시계열 문서 구조가 아님 등)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 모니터링 작업을 위한 Result 타입.
pub type MonitorResult<T> = Result<T, MonitorError>;

impl MonitorError {
    /// 한 실행(run)에 국한된 에러인지 확인합니다.
    ///
    /// 다중 실행 비교에서는 이런 에러가 난 실행만 건너뛰고 계속 진행합니다.
    pub fn is_run_local(&self) -> bool {
        matches!(
            self,
            MonitorError::InvalidInput(_)
                | MonitorError::Io(_)
                | MonitorError::Serialization(_)
                | MonitorError::NotFound(_)
        )
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for MonitorError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            MonitorError::NotFound(err.to_string())
        } else {
            MonitorError::Io(err.to_string())
        }
    }
}

impl From<config::ConfigError> for MonitorError {
    fn from(err: config::ConfigError) -> Self {
        MonitorError::Config(err.to_string())
    }
}
