//! 낙폭(Drawdown) 분석.
//!
//! 누적 고점 대비 하락률 곡선과 낙폭 구간(episode)을 계산합니다.
//!
//! # 주요 기능
//!
//! - **낙폭 곡선**: `(value - peak) / peak`, 항상 0 이하이며 새 고점에서 정확히 0
//! - **낙폭 구간**: 시작(직전 고점) → 저점 → 회복(고점 이상 복귀)
//! - **순위**: 깊이 오름차순(가장 깊은 것 먼저), 동률이면 시작일이 빠른 것 먼저
//!
//! 가치가 0 이하인 포인트는 고점을 만들 수 없습니다. 양수 고점이 생기기 전까지
//! 낙폭은 0입니다.

use chrono::NaiveDate;
use monitor_core::TimeSeriesPoint;
use serde::{Deserialize, Serialize};

pub use monitor_core::DEFAULT_TOP_DRAWDOWNS;

/// 낙폭 곡선의 한 점.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    /// 고점 대비 하락률 (비율, 0 이하)
    pub drawdown: f64,
}

/// 낙폭 구간.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownEpisode {
    /// 시작일 (직전 고점 날짜)
    pub start_date: NaiveDate,
    /// 저점 날짜
    pub trough_date: NaiveDate,
    /// 회복일 (진행 중이면 None)
    pub end_date: Option<NaiveDate>,
    /// 최대 하락률 (음수 비율)
    pub depth: f64,
    /// 시작일부터 저점까지 일수
    pub duration_days: i64,
    /// 저점부터 회복까지 일수 (미회복이면 None)
    pub recovery_days: Option<i64>,
    /// 고점 가치
    pub peak_value: f64,
    /// 저점 가치
    pub trough_value: f64,
}

impl DrawdownEpisode {
    /// 회복되지 않은 구간인지 확인합니다.
    pub fn is_ongoing(&self) -> bool {
        self.end_date.is_none()
    }
}

/// 열린 구간 추적 상태
struct OpenEpisode {
    start_date: NaiveDate,
    peak_value: f64,
    trough_date: NaiveDate,
    trough_value: f64,
}

impl OpenEpisode {
    fn close(self, end_date: Option<NaiveDate>) -> DrawdownEpisode {
        DrawdownEpisode {
            start_date: self.start_date,
            trough_date: self.trough_date,
            end_date,
            depth: (self.trough_value - self.peak_value) / self.peak_value,
            duration_days: (self.trough_date - self.start_date).num_days(),
            recovery_days: end_date.map(|end| (end - self.trough_date).num_days()),
            peak_value: self.peak_value,
            trough_value: self.trough_value,
        }
    }
}

/// 실행 하나의 낙폭 분석 결과.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawdownAnalysis {
    /// 날짜별 낙폭 곡선
    pub points: Vec<DrawdownPoint>,
    /// 순위가 매겨진 전체 낙폭 구간
    pub episodes: Vec<DrawdownEpisode>,
}

impl DrawdownAnalysis {
    /// 날짜순 포인트로부터 낙폭을 분석합니다.
    pub fn from_points(points: &[TimeSeriesPoint]) -> Self {
        let mut curve = Vec::with_capacity(points.len());
        let mut episodes = Vec::new();
        let mut peak: Option<(f64, NaiveDate)> = None;
        let mut open: Option<OpenEpisode> = None;

        for point in points {
            let value = point.portfolio_value;

            let drawdown = match peak {
                Some((peak_value, peak_date)) if value < peak_value => {
                    match open.as_mut() {
                        Some(episode) if value < episode.trough_value => {
                            episode.trough_value = value;
                            episode.trough_date = point.date;
                        }
                        Some(_) => {}
                        None => {
                            open = Some(OpenEpisode {
                                start_date: peak_date,
                                peak_value,
                                trough_date: point.date,
                                trough_value: value,
                            });
                        }
                    }
                    (value - peak_value) / peak_value
                }
                Some(_) => {
                    // 새 고점 또는 회복
                    if let Some(episode) = open.take() {
                        episodes.push(episode.close(Some(point.date)));
                    }
                    peak = Some((value, point.date));
                    0.0
                }
                None => {
                    if value > 0.0 {
                        peak = Some((value, point.date));
                    }
                    0.0
                }
            };

            curve.push(DrawdownPoint {
                date: point.date,
                drawdown,
            });
        }

        if let Some(episode) = open {
            episodes.push(episode.close(None));
        }

        episodes.sort_by(|a, b| {
            a.depth
                .total_cmp(&b.depth)
                .then_with(|| a.start_date.cmp(&b.start_date))
        });

        Self {
            points: curve,
            episodes,
        }
    }

    /// 최대 낙폭 (낙폭 곡선의 최솟값). 포인트가 없으면 None.
    pub fn max_drawdown(&self) -> Option<f64> {
        self.points.iter().map(|p| p.drawdown).reduce(f64::min)
    }

    /// 상위 `k`개 낙폭 구간.
    pub fn top(&self, k: usize) -> &[DrawdownEpisode] {
        &self.episodes[..k.min(self.episodes.len())]
    }

    /// 현재 진행 중인 낙폭 구간.
    pub fn ongoing(&self) -> Option<&DrawdownEpisode> {
        self.episodes.iter().find(|e| e.is_ongoing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn points(values: &[f64]) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(date(i as u32 + 1), *v))
            .collect()
    }

    #[test]
    fn test_reference_episode() {
        let analysis = DrawdownAnalysis::from_points(&points(&[100.0, 110.0, 99.0, 126.5]));

        let dd: Vec<f64> = analysis.points.iter().map(|p| p.drawdown).collect();
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert!((dd[2] + 0.10).abs() < 1e-12);
        assert_eq!(dd[3], 0.0);

        assert_eq!(analysis.episodes.len(), 1);
        let ep = &analysis.episodes[0];
        assert_eq!(ep.start_date, date(2));
        assert_eq!(ep.trough_date, date(3));
        assert_eq!(ep.end_date, Some(date(4)));
        assert_eq!(ep.duration_days, 1);
        assert_eq!(ep.recovery_days, Some(1));
        assert!((ep.depth + 0.10).abs() < 1e-12);
        assert_eq!(ep.peak_value, 110.0);
        assert_eq!(ep.trough_value, 99.0);
    }

    #[test]
    fn test_monotonic_series_has_no_episodes() {
        let analysis = DrawdownAnalysis::from_points(&points(&[100.0, 100.0, 101.0, 105.0]));
        assert!(analysis.episodes.is_empty());
        assert_eq!(analysis.max_drawdown(), Some(0.0));
    }

    #[test]
    fn test_ongoing_episode() {
        let analysis = DrawdownAnalysis::from_points(&points(&[100.0, 90.0, 80.0, 85.0]));

        let ep = analysis.ongoing().unwrap();
        assert_eq!(ep.start_date, date(1));
        assert_eq!(ep.trough_date, date(3));
        assert_eq!(ep.end_date, None);
        assert_eq!(ep.recovery_days, None);
        assert_eq!(ep.duration_days, 2);
        assert!((analysis.max_drawdown().unwrap() + 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_ranking_deepest_first_then_earlier_start() {
        // 구간1: -10%, 구간2: -20%, 구간3: -10%
        let analysis = DrawdownAnalysis::from_points(&points(&[
            100.0, 90.0, 100.0, 80.0, 100.0, 90.0, 100.0,
        ]));

        assert_eq!(analysis.episodes.len(), 3);
        assert!((analysis.episodes[0].depth + 0.20).abs() < 1e-12);
        assert_eq!(analysis.episodes[1].start_date, date(1));
        assert_eq!(analysis.episodes[2].start_date, date(5));
        assert_eq!(analysis.top(2).len(), 2);
        assert_eq!(analysis.top(10).len(), 3);
    }

    #[test]
    fn test_equal_value_moves_peak_date() {
        // 고점과 같은 값은 회복으로 보고 고점 날짜를 갱신
        let analysis = DrawdownAnalysis::from_points(&points(&[100.0, 95.0, 100.0, 97.0]));

        assert_eq!(analysis.episodes.len(), 2);
        let ongoing = analysis.ongoing().unwrap();
        assert_eq!(ongoing.start_date, date(3));
    }

    #[test]
    fn test_non_positive_values_cannot_set_peak() {
        let analysis = DrawdownAnalysis::from_points(&points(&[0.0, -5.0, 10.0, 5.0]));

        let dd: Vec<f64> = analysis.points.iter().map(|p| p.drawdown).collect();
        assert_eq!(&dd[..3], &[0.0, 0.0, 0.0]);
        assert!((dd[3] + 0.5).abs() < 1e-12);
        assert!(dd.iter().all(|d| d.is_finite()));
    }

    #[test]
    fn test_empty_input() {
        let analysis = DrawdownAnalysis::from_points(&[]);
        assert!(analysis.points.is_empty());
        assert_eq!(analysis.max_drawdown(), None);
        assert!(analysis.top(DEFAULT_TOP_DRAWDOWNS).is_empty());
    }
}
