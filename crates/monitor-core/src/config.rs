//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정 파일(TOML)은 선택 사항이며, `MONITOR__` 접두사 환경 변수로
//! 모든 값을 덮어쓸 수 있습니다 (예: `MONITOR__ANALYTICS__TOP_DRAWDOWNS=10`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MonitorError, MonitorResult};

/// 기본 롤링 윈도우 (거래일): 1개월, 3개월, 6개월, 1년
pub const DEFAULT_ROLLING_WINDOWS: [usize; 4] = [21, 63, 126, 252];

/// 기본 상위 낙폭 구간 수
pub const DEFAULT_TOP_DRAWDOWNS: usize = 5;

/// 히스토그램 최대 구간 수
pub const MAX_HISTOGRAM_BINS: usize = 10_000;

/// 구간 수 올림 시 부동소수점 오차 허용치
pub const HISTOGRAM_BIN_EPSILON: f64 = 1e-9;

/// `[lower, upper]`를 `bin_width` 간격으로 나눌 때의 구간 수.
///
/// 범위나 폭이 비정상이면 NaN 또는 무한대를 반환합니다.
pub fn histogram_bins(lower: f64, upper: f64, bin_width: f64) -> f64 {
    ((upper - lower) / bin_width - HISTOGRAM_BIN_EPSILON).ceil()
}

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 분석 엔진 설정
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    /// 데이터 위치 설정
    #[serde(default)]
    pub data: DataConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 연초 대비(YTD) 수익률 집계 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YtdConvention {
    /// 월 수익률을 복리로 누적 (∏(1+m) − 1)
    #[default]
    Compounded,
    /// 월 수익률(%)의 단순 합계 (기존 화면과의 호환용 근사치)
    SummedApproximation,
}

/// 수익률 히스토그램 설정.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct HistogramConfig {
    /// 대칭 범위의 절반 (비율, 0.05 = ±5%)
    pub half_range: f64,
    /// 구간 폭 (비율, 0.005 = 0.5%)
    pub bin_width: f64,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            half_range: 0.05,
            bin_width: 0.005,
        }
    }
}

/// 분석 엔진 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    /// 롤링 지표 윈도우 목록 (거래일 수)
    #[serde(default = "default_rolling_windows")]
    pub rolling_windows: Vec<usize>,
    /// 보고할 상위 낙폭 구간 수
    #[serde(default = "default_top_drawdowns")]
    pub top_drawdowns: usize,
    /// 비교 화면에서 100 기준 리베이스 여부
    #[serde(default = "default_rebase")]
    pub rebase: bool,
    /// YTD 집계 방식
    #[serde(default)]
    pub ytd_convention: YtdConvention,
    /// 히스토그램 설정
    #[serde(default)]
    pub histogram: HistogramConfig,
}

fn default_rolling_windows() -> Vec<usize> {
    DEFAULT_ROLLING_WINDOWS.to_vec()
}
fn default_top_drawdowns() -> usize {
    DEFAULT_TOP_DRAWDOWNS
}
fn default_rebase() -> bool {
    true
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            rolling_windows: default_rolling_windows(),
            top_drawdowns: default_top_drawdowns(),
            rebase: default_rebase(),
            ytd_convention: YtdConvention::default(),
            histogram: HistogramConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    /// 설정 값의 유효성을 검사합니다.
    pub fn validate(&self) -> MonitorResult<()> {
        if self.rolling_windows.iter().any(|&w| w == 0) {
            return Err(MonitorError::Config(
                "rolling_windows must be positive".to_string(),
            ));
        }

        let h = &self.histogram;
        if !h.half_range.is_finite() || h.half_range <= 0.0 {
            return Err(MonitorError::Config(format!(
                "histogram.half_range must be positive and finite, got {}",
                h.half_range
            )));
        }
        if !h.bin_width.is_finite() || h.bin_width <= 0.0 {
            return Err(MonitorError::Config(format!(
                "histogram.bin_width must be positive and finite, got {}",
                h.bin_width
            )));
        }
        let bins = histogram_bins(-h.half_range, h.half_range, h.bin_width);
        if !(bins <= MAX_HISTOGRAM_BINS as f64) {
            return Err(MonitorError::Config(format!(
                "histogram needs {bins} bins, at most {MAX_HISTOGRAM_BINS} allowed"
            )));
        }

        Ok(())
    }
}

/// 데이터 위치 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// 실행 시계열 JSON 파일 디렉토리
    pub runs_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            runs_dir: PathBuf::from("data/runs"),
        }
    }
}

impl AppConfig {
    /// 파일(선택)과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> MonitorResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.as_ref()));
        }

        let config = builder
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("MONITOR")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("analytics.rolling_windows")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.analytics.validate()?;
        Ok(app)
    }

    /// 기본 경로에서 설정을 로드합니다. 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load_default() -> MonitorResult<Self> {
        let default_path = Path::new("config/monitor.toml");
        if default_path.exists() {
            Self::load(Some(default_path))
        } else {
            Self::load(None::<&Path>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_analytics_config() {
        let config = AnalyticsConfig::default();

        assert_eq!(config.rolling_windows, vec![21, 63, 126, 252]);
        assert_eq!(config.top_drawdowns, 5);
        assert!(config.rebase);
        assert_eq!(config.ytd_convention, YtdConvention::Compounded);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AnalyticsConfig::default();
        config.rolling_windows = vec![21, 0];
        assert!(config.validate().is_err());

        let mut config = AnalyticsConfig::default();
        config.histogram.bin_width = 0.0;
        assert!(config.validate().is_err());

        let mut config = AnalyticsConfig::default();
        config.histogram.half_range = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_too_many_bins() {
        let mut config = AnalyticsConfig::default();
        config.histogram.bin_width = 1e-300;
        assert!(config.validate().is_err());

        config.histogram.bin_width = 1e-12;
        assert!(config.validate().is_err());

        // ±1 / 0.0002 = 정확히 상한
        config.histogram = HistogramConfig {
            half_range: 1.0,
            bin_width: 0.0002,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            [analytics]
            top_drawdowns = 3
            ytd_convention = "summed_approximation"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.analytics.top_drawdowns, 3);
        assert_eq!(
            config.analytics.ytd_convention,
            YtdConvention::SummedApproximation
        );
        assert_eq!(config.analytics.rolling_windows, vec![21, 63, 126, 252]);
        assert_eq!(config.logging.level, "info");
    }
}
