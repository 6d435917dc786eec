//! 분석 보고서 빌더.
//!
//! 단일 실행 심층 분석(`DeepDiveReport`)과 다중 실행 비교(`ComparisonReport`)를
//! 조립합니다. 실행마다 수익률은 `PreparedRun`에서 한 번만 도출되어
//! 모든 계산이 공유하며, 실행별 계산은 rayon으로 병렬 처리됩니다.
//!
//! 데이터 결함은 에러가 아니라 `issues` 목록으로 보고됩니다.

use monitor_core::{AnalyticsConfig, RunId, RunSeries, YtdConvention, DEFAULT_ROLLING_WINDOWS};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::correlation::{CorrelationMatrix, MIN_OVERLAP};
use crate::error::{AnalyticsResult, DataIssue};
use crate::monthly::MonthlyReturnGrid;
use crate::performance::{
    rolling_windows, DistributionStats, DrawdownAnalysis, DrawdownEpisode, DrawdownPoint,
    HistogramSpec, PerformanceSummary, ReturnHistogram, RollingWindowSeries,
    DEFAULT_TOP_DRAWDOWNS, MIN_MOMENT_SAMPLES,
};
use crate::series::{prepare_runs, AlignedFrame, DailyReturn, DataQuality, PreparedRun};

/// 보고서 계산 옵션.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// 롤링 윈도우 목록 (거래일 수)
    pub rolling_windows: Vec<usize>,
    /// 상위 낙폭 구간 수
    pub top_drawdowns: usize,
    /// 가치 프레임 100 기준 리베이스
    pub rebase: bool,
    pub ytd_convention: YtdConvention,
    pub histogram: HistogramSpec,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            rolling_windows: DEFAULT_ROLLING_WINDOWS.to_vec(),
            top_drawdowns: DEFAULT_TOP_DRAWDOWNS,
            rebase: true,
            ytd_convention: YtdConvention::Compounded,
            histogram: HistogramSpec::default(),
        }
    }
}

impl ReportOptions {
    /// 애플리케이션 설정으로부터 옵션을 만듭니다.
    ///
    /// # Errors
    ///
    /// 히스토그램 범위가 잘못되면 `AnalyticsError::InvalidParameter`
    pub fn from_config(config: &AnalyticsConfig) -> AnalyticsResult<Self> {
        Ok(Self {
            rolling_windows: config.rolling_windows.clone(),
            top_drawdowns: config.top_drawdowns,
            rebase: config.rebase,
            ytd_convention: config.ytd_convention,
            histogram: HistogramSpec::symmetric(
                config.histogram.half_range,
                config.histogram.bin_width,
            )?,
        })
    }
}

/// 단일 실행 심층 분석 보고서.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepDiveReport {
    pub run_id: RunId,
    pub quality: DataQuality,
    pub returns: Vec<DailyReturn>,
    pub drawdown: Vec<DrawdownPoint>,
    /// 깊이 순 상위 낙폭 구간
    pub top_drawdowns: Vec<DrawdownEpisode>,
    pub rolling: Vec<RollingWindowSeries>,
    pub monthly: MonthlyReturnGrid,
    pub distribution: DistributionStats,
    pub histogram: ReturnHistogram,
    pub summary: PerformanceSummary,
    pub issues: Vec<DataIssue>,
}

impl DeepDiveReport {
    /// 준비된 실행으로 보고서를 만듭니다.
    pub fn build(run: &PreparedRun, options: &ReportOptions) -> Self {
        let _span = monitor_core::run_span!("deep_dive", run.run_id).entered();

        let drawdown = DrawdownAnalysis::from_points(&run.points);
        let monthly = MonthlyReturnGrid::from_returns(&run.returns, options.ytd_convention);
        let rolling = rolling_windows(&run.returns, &options.rolling_windows);

        let values = run.return_values();
        let distribution = DistributionStats::compute(&values);
        let histogram = ReturnHistogram::build(&values, &options.histogram);
        let summary = PerformanceSummary::build(run, &drawdown, &monthly);

        let mut issues = run_issues(run, &summary);
        for window in &options.rolling_windows {
            if run.returns.len() < *window {
                issues.push(DataIssue::insufficient(
                    Some(&run.run_id),
                    format!("rolling_{window}"),
                    *window,
                    run.returns.len(),
                ));
            }
        }
        if values.len() < MIN_MOMENT_SAMPLES {
            issues.push(DataIssue::insufficient(
                Some(&run.run_id),
                "distribution_moments",
                MIN_MOMENT_SAMPLES,
                values.len(),
            ));
        } else if distribution.skewness.is_none() {
            issues.push(DataIssue::degenerate(Some(&run.run_id), "distribution_moments"));
        }

        debug!(
            episodes = drawdown.episodes.len(),
            months = monthly.entries.len(),
            issues = issues.len(),
            "Deep-dive report built"
        );

        Self {
            run_id: run.run_id.clone(),
            quality: run.quality,
            returns: run.returns.clone(),
            top_drawdowns: drawdown.top(options.top_drawdowns).to_vec(),
            drawdown: drawdown.points,
            rolling,
            monthly,
            distribution,
            histogram,
            summary,
            issues,
        }
    }

    /// 원시 시계열로부터 바로 보고서를 만듭니다.
    pub fn from_series(series: &RunSeries, options: &ReportOptions) -> Self {
        Self::build(&PreparedRun::new(series), options)
    }
}

/// 여러 실행의 심층 분석 보고서를 병렬로 만듭니다.
pub fn build_deep_dives(runs: &[PreparedRun], options: &ReportOptions) -> Vec<DeepDiveReport> {
    runs.par_iter()
        .map(|run| DeepDiveReport::build(run, options))
        .collect()
}

/// 실행별 데이터 품질.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunQuality {
    pub run_id: RunId,
    pub quality: DataQuality,
}

/// 다중 실행 비교 보고서.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// 비교 대상 실행 (선택 순서, 중복 제거)
    pub run_ids: Vec<RunId>,
    /// 가치 프레임 (옵션에 따라 100 기준 리베이스)
    pub values: AlignedFrame,
    /// 일간 수익률 프레임
    pub returns: AlignedFrame,
    pub correlation: CorrelationMatrix,
    pub summaries: Vec<PerformanceSummary>,
    pub quality: Vec<RunQuality>,
    pub issues: Vec<DataIssue>,
}

impl ComparisonReport {
    /// 준비된 실행들로 비교 보고서를 만듭니다.
    ///
    /// 실행이 없으면 빈 구조와 `EmptySelection` 이슈를 반환합니다.
    pub fn build(runs: &[PreparedRun], options: &ReportOptions) -> Self {
        let values = AlignedFrame::from_values(runs, options.rebase);
        let returns = AlignedFrame::from_returns(runs);
        let correlation = CorrelationMatrix::from_runs(runs);
        let run_ids = correlation.run_ids.clone();

        // 정렬 프레임과 같은 중복 제거 결과를 사용
        let selected: Vec<&PreparedRun> = run_ids
            .iter()
            .filter_map(|id| runs.iter().find(|r| &r.run_id == id))
            .collect();

        let per_run: Vec<(PerformanceSummary, Vec<DataIssue>)> = selected
            .par_iter()
            .map(|run| {
                let drawdown = DrawdownAnalysis::from_points(&run.points);
                let monthly = MonthlyReturnGrid::from_returns(&run.returns, options.ytd_convention);
                let summary = PerformanceSummary::build(run, &drawdown, &monthly);
                let issues = run_issues(run, &summary);
                (summary, issues)
            })
            .collect();

        let mut issues = Vec::new();
        if selected.is_empty() {
            issues.push(DataIssue::EmptySelection {
                detail: "no runs selected".to_string(),
            });
        } else if values.is_empty() {
            issues.push(DataIssue::EmptySelection {
                detail: "selected runs have no valid dates".to_string(),
            });
        }

        let mut summaries = Vec::with_capacity(per_run.len());
        for (summary, run_issues) in per_run {
            summaries.push(summary);
            issues.extend(run_issues);
        }

        for i in 0..correlation.len() {
            for j in (i + 1)..correlation.len() {
                let overlap = correlation.overlaps[i][j];
                if overlap < MIN_OVERLAP {
                    issues.push(DataIssue::insufficient(
                        None,
                        format!("correlation:{}~{}", run_ids[i], run_ids[j]),
                        MIN_OVERLAP,
                        overlap,
                    ));
                }
            }
        }

        info!(
            runs = run_ids.len(),
            dates = values.len(),
            issues = issues.len(),
            "Comparison report built"
        );

        Self {
            quality: selected
                .iter()
                .map(|r| RunQuality {
                    run_id: r.run_id.clone(),
                    quality: r.quality,
                })
                .collect(),
            run_ids,
            values,
            returns,
            correlation,
            summaries,
            issues,
        }
    }

    /// 원시 시계열들로부터 바로 비교 보고서를 만듭니다.
    pub fn from_series(series: &[RunSeries], options: &ReportOptions) -> Self {
        Self::build(&prepare_runs(series), options)
    }

    /// 실행 식별자로 요약을 찾습니다.
    pub fn summary(&self, run_id: &RunId) -> Option<&PerformanceSummary> {
        self.summaries.iter().find(|s| &s.run_id == run_id)
    }
}

/// 실행 단위 공통 이슈 (결함 포인트, 빈 실행, 변동성 0).
fn run_issues(run: &PreparedRun, summary: &PerformanceSummary) -> Vec<DataIssue> {
    let mut issues = Vec::new();

    if run.quality.malformed() > 0 {
        issues.push(DataIssue::MalformedPoint {
            run_id: run.run_id.clone(),
            dropped: run.quality.malformed(),
        });
    }
    if run.is_empty() {
        issues.push(DataIssue::EmptySelection {
            detail: format!("run {} has no valid points", run.run_id),
        });
    }
    if summary.annualized_volatility.is_some() && summary.sharpe.is_none() {
        issues.push(DataIssue::degenerate(Some(&run.run_id), "sharpe"));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use chrono::NaiveDate;
    use monitor_core::{HistogramConfig, TimeSeriesPoint};

    fn series(id: &str, values: &[f64]) -> RunSeries {
        RunSeries::from_values(
            id,
            values.iter().enumerate().map(|(i, v)| {
                (
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64),
                    *v,
                )
            }),
        )
    }

    fn options() -> ReportOptions {
        ReportOptions {
            rolling_windows: vec![2, 10],
            ..Default::default()
        }
    }

    #[test]
    fn test_deep_dive_reference_run() {
        let report =
            DeepDiveReport::from_series(&series("ref", &[100.0, 110.0, 99.0, 126.5]), &options());

        assert_eq!(report.returns.len(), 3);
        assert_eq!(report.drawdown.len(), 4);
        assert_eq!(report.top_drawdowns.len(), 1);
        assert_eq!(report.rolling.len(), 2);
        assert_eq!(report.rolling[0].len(), 2);
        assert!(report.rolling[1].is_empty());
        assert_eq!(report.histogram.total, 3);
        assert_eq!(report.histogram.above, 2);
        assert_eq!(report.summary.run_id, RunId::new("ref"));

        assert!(report.issues.contains(&DataIssue::insufficient(
            Some(&RunId::new("ref")),
            "rolling_10",
            10,
            3
        )));
    }

    #[test]
    fn test_deep_dive_reports_dropped_points() {
        let mut s = series("dirty", &[100.0, 101.0, 102.0]);
        s.points.push(TimeSeriesPoint::new(s.points[1].date, 500.0));
        s.points.push(TimeSeriesPoint::new(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            f64::NAN,
        ));

        let report = DeepDiveReport::from_series(&s, &options());
        assert_eq!(report.quality.malformed(), 2);
        assert!(report.issues.contains(&DataIssue::MalformedPoint {
            run_id: RunId::new("dirty"),
            dropped: 2,
        }));
    }

    #[test]
    fn test_empty_run_deep_dive() {
        let report = DeepDiveReport::from_series(&RunSeries::new("empty", vec![]), &options());

        assert!(report.returns.is_empty());
        assert!(report.top_drawdowns.is_empty());
        assert_eq!(report.summary.max_drawdown, None);
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, DataIssue::EmptySelection { .. })));
    }

    #[test]
    fn test_comparison_of_two_runs() {
        let runs = vec![
            series("a", &[100.0, 102.0, 101.0, 104.0, 103.0]),
            series("b", &[50.0, 49.0, 51.0, 52.0, 50.0]),
        ];
        let report = ComparisonReport::from_series(&runs, &options());

        assert_eq!(report.run_ids, vec![RunId::new("a"), RunId::new("b")]);
        assert_eq!(report.values.len(), 5);
        assert_eq!(report.returns.len(), 4);
        assert_eq!(report.values.columns[1].values[0], Some(100.0));
        assert_eq!(report.summaries.len(), 2);
        assert_eq!(report.quality.len(), 2);
        assert_eq!(report.correlation.matrix[0][0], 1.0);
        assert!(report.summary(&RunId::new("b")).is_some());
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_comparison_with_no_runs() {
        let report = ComparisonReport::build(&[], &ReportOptions::default());

        assert!(report.run_ids.is_empty());
        assert!(report.values.is_empty());
        assert!(report.correlation.is_empty());
        assert_eq!(
            report.issues,
            vec![DataIssue::EmptySelection {
                detail: "no runs selected".to_string()
            }]
        );
    }

    #[test]
    fn test_comparison_flags_thin_overlap() {
        let a = series("a", &[100.0, 101.0, 102.0]);
        let b = RunSeries::from_values(
            "b",
            [
                (NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), 10.0),
                (NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(), 11.0),
            ],
        );
        let report = ComparisonReport::from_series(&[a, b], &options());

        assert_eq!(report.correlation.matrix[0][1], 0.0);
        assert!(report.issues.iter().any(|i| matches!(
            i,
            DataIssue::InsufficientData { metric, available: 0, .. } if metric == "correlation:a~b"
        )));
    }

    #[test]
    fn test_options_from_config() {
        let mut config = AnalyticsConfig::default();
        config.histogram = HistogramConfig {
            half_range: 0.1,
            bin_width: 0.01,
        };
        let options = ReportOptions::from_config(&config).unwrap();
        assert_eq!(options.histogram.bin_count(), 20);
        assert_eq!(options.rolling_windows, DEFAULT_ROLLING_WINDOWS.to_vec());

        config.histogram.bin_width = 0.0;
        assert!(ReportOptions::from_config(&config).is_err());

        config.histogram.bin_width = 1e-300;
        assert!(matches!(
            ReportOptions::from_config(&config),
            Err(AnalyticsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_default_options_match_config_defaults() {
        let from_config = ReportOptions::from_config(&AnalyticsConfig::default()).unwrap();
        assert_eq!(from_config, ReportOptions::default());
        assert_eq!(ReportOptions::default().top_drawdowns, DEFAULT_TOP_DRAWDOWNS);
    }

    #[test]
    fn test_build_deep_dives_keeps_order() {
        let runs = prepare_runs(&[series("x", &[1.0, 2.0]), series("y", &[3.0, 4.0])]);
        let reports = build_deep_dives(&runs, &options());

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].run_id, RunId::new("x"));
        assert_eq!(reports[1].run_id, RunId::new("y"));
    }
}
