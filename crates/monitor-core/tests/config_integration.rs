//! 설정 로딩 통합 테스트
//!
//! 실제 TOML 파일을 통해 AppConfig가 로드되는 과정을 확인

use monitor_core::{AppConfig, MonitorError, YtdConvention};
use std::path::PathBuf;

/// 테스트별 임시 설정 파일 경로
fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "monitor-core-{}-{}.toml",
        name,
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_from_file() {
    let path = write_config(
        "valid",
        r#"
        [logging]
        level = "debug"
        format = "json"

        [analytics]
        rolling_windows = [21, 63]
        top_drawdowns = 10
        rebase = false
        ytd_convention = "compounded"

        [analytics.histogram]
        half_range = 0.1
        bin_width = 0.01

        [data]
        runs_dir = "/tmp/runs"
        "#,
    );

    let config = AppConfig::load(Some(&path)).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.analytics.rolling_windows, vec![21, 63]);
    assert_eq!(config.analytics.top_drawdowns, 10);
    assert!(!config.analytics.rebase);
    assert_eq!(config.analytics.ytd_convention, YtdConvention::Compounded);
    assert_eq!(config.analytics.histogram.bin_width, 0.01);
    assert_eq!(config.data.runs_dir, PathBuf::from("/tmp/runs"));
}

#[test]
fn test_load_rejects_invalid_histogram() {
    let path = write_config(
        "invalid",
        r#"
        [analytics.histogram]
        half_range = 0.05
        bin_width = -0.01
        "#,
    );

    let result = AppConfig::load(Some(&path));
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(MonitorError::Config(_))));
}

#[test]
fn test_missing_file_is_config_error() {
    let path = std::env::temp_dir().join("monitor-core-does-not-exist.toml");
    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(MonitorError::Config(_))));
}
