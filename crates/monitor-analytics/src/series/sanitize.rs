//! 입력 시계열 정제.
//!
//! 저장 계층이 날짜순/중복 제거된 시계열을 보내더라도 엔진은 다시 검증합니다.
//! 결함이 있는 포인트는 조용히 제외하고 개수만 기록합니다.

use monitor_core::TimeSeriesPoint;
use serde::{Deserialize, Serialize};

/// 실행별 데이터 품질 카운트.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    /// 입력 포인트 수
    pub received: usize,
    /// 정제 후 남은 포인트 수
    pub kept: usize,
    /// 비유한 가치로 제외된 포인트 수
    pub non_finite_dropped: usize,
    /// 중복 날짜로 제외된 포인트 수 (첫 포인트 유지)
    pub duplicate_dropped: usize,
    /// 입력에서 날짜 역순으로 나타난 위치 수
    pub reordered: usize,
    /// 비유한 명시적 수익률을 무시한 포인트 수 (가치로 다시 계산)
    pub non_finite_returns_ignored: usize,
    /// 수익률을 도출할 수 없어 제외된 포인트 수 (첫 포인트 제외)
    pub returns_skipped: usize,
}

impl DataQuality {
    /// 제외된 결함 포인트 총수를 반환합니다.
    pub fn malformed(&self) -> usize {
        self.non_finite_dropped + self.duplicate_dropped
    }

    /// 아무 보정도 필요 없었는지 확인합니다.
    pub fn is_clean(&self) -> bool {
        self.malformed() == 0
            && self.reordered == 0
            && self.non_finite_returns_ignored == 0
            && self.returns_skipped == 0
    }
}

/// 포인트를 날짜순으로 재정렬하고 결함 포인트를 제거합니다.
///
/// - 비유한 가치의 포인트는 제외
/// - 같은 날짜가 반복되면 입력 순서상 첫 포인트만 유지
/// - 비유한 명시적 수익률은 `None`으로 낮춤 (포인트는 유지)
/// - 0 이하의 가치는 유지 (수익률 도출/리베이스 단계에서 처리)
pub fn sanitize_points(points: &[TimeSeriesPoint]) -> (Vec<TimeSeriesPoint>, DataQuality) {
    let mut quality = DataQuality {
        received: points.len(),
        reordered: points.windows(2).filter(|w| w[1].date < w[0].date).count(),
        ..Default::default()
    };

    let mut finite: Vec<TimeSeriesPoint> = Vec::with_capacity(points.len());
    for point in points {
        if !point.portfolio_value.is_finite() {
            quality.non_finite_dropped += 1;
            continue;
        }

        let mut point = point.clone();
        if point.daily_return.is_some() && point.explicit_return().is_none() {
            point.daily_return = None;
            quality.non_finite_returns_ignored += 1;
        }
        finite.push(point);
    }

    // 안정 정렬이므로 같은 날짜는 입력 순서를 유지
    finite.sort_by_key(|p| p.date);

    let mut cleaned: Vec<TimeSeriesPoint> = Vec::with_capacity(finite.len());
    for point in finite {
        match cleaned.last() {
            Some(last) if last.date == point.date => quality.duplicate_dropped += 1,
            _ => cleaned.push(point),
        }
    }

    quality.kept = cleaned.len();
    (cleaned, quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn p(day: u32, value: f64) -> TimeSeriesPoint {
        TimeSeriesPoint::new(NaiveDate::from_ymd_opt(2024, 2, day).unwrap(), value)
    }

    #[test]
    fn test_clean_input_passes_through() {
        let points = vec![p(1, 100.0), p(2, 101.0), p(5, 99.0)];
        let (cleaned, quality) = sanitize_points(&points);

        assert_eq!(cleaned, points);
        assert!(quality.is_clean());
        assert_eq!(quality.kept, 3);
    }

    #[test]
    fn test_reorders_and_counts() {
        let points = vec![p(3, 103.0), p(1, 100.0), p(2, 101.0)];
        let (cleaned, quality) = sanitize_points(&points);

        let days: Vec<u32> = cleaned.iter().map(|p| chrono::Datelike::day(&p.date)).collect();
        assert_eq!(days, vec![1, 2, 3]);
        assert_eq!(quality.reordered, 1);
        assert_eq!(quality.malformed(), 0);
    }

    #[test]
    fn test_drops_non_finite_and_duplicates() {
        let points = vec![
            p(1, 100.0),
            p(2, f64::NAN),
            p(2, 102.0),
            p(2, 150.0), // 중복: 첫 유효 포인트(102) 유지
            p(3, f64::INFINITY),
            p(4, 104.0),
        ];
        let (cleaned, quality) = sanitize_points(&points);

        assert_eq!(cleaned.len(), 3);
        assert_eq!(cleaned[1].portfolio_value, 102.0);
        assert_eq!(quality.non_finite_dropped, 2);
        assert_eq!(quality.duplicate_dropped, 1);
        assert_eq!(quality.malformed(), 3);
        assert_eq!(quality.received, 6);
        assert_eq!(quality.kept, 3);
    }

    #[test]
    fn test_non_finite_explicit_return_is_demoted() {
        let points = vec![p(1, 100.0), p(2, 101.0).with_return(f64::NAN)];
        let (cleaned, quality) = sanitize_points(&points);

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[1].daily_return, None);
        assert_eq!(quality.non_finite_returns_ignored, 1);
    }

    #[test]
    fn test_zero_values_are_kept() {
        let points = vec![p(1, 0.0), p(2, 100.0)];
        let (cleaned, quality) = sanitize_points(&points);

        assert_eq!(cleaned.len(), 2);
        assert_eq!(quality.malformed(), 0);
    }

    #[test]
    fn test_empty_input() {
        let (cleaned, quality) = sanitize_points(&[]);
        assert!(cleaned.is_empty());
        assert_eq!(quality, DataQuality::default());
    }
}
