//! tracing을 사용한 로깅 인프라.
//!
//! 분석 엔진은 로깅 초기화를 하지 않고 `tracing` 이벤트만 발생시킵니다.
//! 바이너리(CLI)가 시작 시 이 모듈로 subscriber를 한 번 설치합니다.
//!
//! 지원 형식:
//! - **pretty**: 개발용 사람이 읽기 쉬운 형식
//! - **json**: 로그 집계용 JSON 형식
//! - **compact**: 한 줄 형식

use crate::config::LoggingConfig;
use crate::error::{MonitorError, MonitorResult};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::Registry,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 색상이 포함된 형식 (개발용)
    #[default]
    Pretty,
    /// JSON 형식 (운영용)
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "monitor_analytics=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// span 종료 이벤트 포함 여부 (실행별 계산 시간 확인용)
    pub with_span_events: bool,
    /// 대상(모듈 경로) 포함 여부
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_span_events: false,
            with_target: true,
        }
    }
}

impl LogConfig {
    /// 새 로그 설정을 생성합니다.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// 로그 형식을 설정합니다.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// span 종료 이벤트를 활성화합니다.
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.with_span_events = enabled;
        self
    }

    /// 애플리케이션 설정의 로깅 섹션에서 생성합니다.
    ///
    /// 알 수 없는 형식은 `Pretty`로 대체됩니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format.parse().unwrap_or_default(),
            ..Default::default()
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = if self.with_span_events {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let base = fmt::layer()
            .with_target(self.with_target)
            .with_span_events(span_events)
            .with_writer(std::io::stderr);

        match self.format {
            LogFormat::Pretty => base.pretty().boxed(),
            LogFormat::Json => base.json().boxed(),
            LogFormat::Compact => base.compact().boxed(),
        }
    }
}

/// 주어진 설정으로 로깅 시스템을 초기화합니다.
///
/// `RUST_LOG`가 설정되어 있으면 설정 파일의 레벨보다 우선합니다.
/// 로그는 stderr로 출력되어 stdout의 JSON 보고서와 섞이지 않습니다.
///
/// # 예제
///
/// ```no_run
/// use monitor_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("debug").with_format(LogFormat::Json)).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> MonitorResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| MonitorError::Config(format!("invalid log level: {e}")))?;

    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(env_filter)
        .try_init()
        .map_err(|e| MonitorError::Internal(format!("logging already initialized: {e}")))?;

    tracing::debug!(
        format = ?config.format,
        level = %config.level,
        "Logging initialized"
    );

    Ok(())
}

/// 실행(run) 식별자 필드가 포함된 span을 생성하는 매크로.
#[macro_export]
macro_rules! run_span {
    ($name:expr, $run_id:expr) => {
        tracing::info_span!($name, run_id = %$run_id)
    };
    ($name:expr, $run_id:expr, $metric:expr) => {
        tracing::info_span!($name, run_id = %$run_id, metric = %$metric)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("invalid".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_config_from_settings() {
        let settings = LoggingConfig {
            level: "monitor_analytics=debug".to_string(),
            format: "compact".to_string(),
        };
        let config = LogConfig::from_settings(&settings);
        assert_eq!(config.level, "monitor_analytics=debug");
        assert_eq!(config.format, LogFormat::Compact);

        let settings = LoggingConfig {
            level: "info".to_string(),
            format: "fancy".to_string(),
        };
        assert_eq!(LogConfig::from_settings(&settings).format, LogFormat::Pretty);
    }
}
